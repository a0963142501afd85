use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. Without one the service keeps drinks in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub reset_on_start: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub jwks_cache_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Report every non-404 handler failure as 401, as the legacy service did.
    pub collapse_errors_to_401: bool,
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        }
    }

    /// Expected `iss` claim; Auth0 issues tokens with a trailing slash.
    pub fn issuer(&self) -> String {
        format!("{}/", self.base_url())
    }

    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.base_url())
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = lookup("AUTH0_DOMAIN")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        let audience = lookup("API_AUDIENCE")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        Self::defaults(domain, audience).with_overrides(lookup)
    }

    fn defaults(domain: String, audience: String) -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain,
                audience,
                algorithms: vec![Algorithm::RS256],
                jwks_cache_secs: 600,
            },
            api: ApiConfig {
                collapse_errors_to_401: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("DRINKS_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("DRINKS_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        self.database.url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_RESET_ON_START") {
            self.database.reset_on_start = v.parse().unwrap_or(self.database.reset_on_start);
        }

        // Auth overrides
        if let Some(v) = lookup("AUTH0_ALGORITHMS") {
            self.auth.algorithms = parse_algorithms(&v)?;
        }
        if let Some(v) = lookup("JWKS_CACHE_SECS") {
            self.auth.jwks_cache_secs = v.parse().unwrap_or(self.auth.jwks_cache_secs);
        }

        // API overrides
        if let Some(v) = lookup("API_COLLAPSE_ERRORS_TO_401") {
            self.api.collapse_errors_to_401 = v.parse().unwrap_or(self.api.collapse_errors_to_401);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.api.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Algorithm::from_str(s).map_err(|_| ConfigError::Invalid {
                name: "AUTH0_ALGORITHMS",
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            name: "AUTH0_ALGORITHMS",
            value: value.to_string(),
        });
    }
    Ok(algorithms)
}
