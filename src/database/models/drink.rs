use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sqlx::FromRow;

/// Placeholder quantity shown to anonymous callers in the short form.
pub const REDACTED_PARTS: u32 = 1;

/// One recipe component. `parts` is any JSON number and fields beyond
/// `name`, `color` and `parts` are kept so the long form echoes them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, color: impl Into<String>, parts: impl Into<Number>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            parts: parts.into(),
            extra: Map::new(),
        }
    }
}

/// A recipe is submitted either as a single ingredient or as an ordered list.
/// The shape is preserved so the long form echoes what was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipe {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl Recipe {
    pub fn ingredients(&self) -> &[Ingredient] {
        match self {
            Recipe::Many(list) => list,
            Recipe::One(single) => std::slice::from_ref(single),
        }
    }

    /// Encode for the `recipe` text column.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Row as persisted: `recipe` holds the JSON-encoded recipe.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl DrinkRow {
    pub fn into_drink(self) -> Result<Drink, serde_json::Error> {
        Ok(Drink {
            id: self.id,
            title: self.title,
            recipe: Recipe::decode(&self.recipe)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongDrink {
    pub id: i32,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    /// Public representation with ingredient proportions hidden.
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| ShortIngredient {
                    name: i.name.clone(),
                    color: i.color.clone(),
                    parts: REDACTED_PARTS,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Drink seeded by a database reset.
pub fn seed_drink() -> (String, Recipe) {
    (
        "water".to_string(),
        Recipe::Many(vec![Ingredient::new("water", "blue", 1)]),
    )
}
