use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::database::DrinkStore;
use crate::error::ErrorPolicy;

/// Everything a handler needs, built once in `main` and shared by the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DrinkStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            verifier,
        }
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::new(self.config.api.collapse_errors_to_401)
    }
}
