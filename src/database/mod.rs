pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDrinkStore;
pub use models::drink::{Drink, Ingredient, Recipe};
pub use repository::{DrinkStore, PgDrinkStore};
