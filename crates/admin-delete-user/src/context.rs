/// Shared state for admin-delete-user invocations
use crate::deletion::DeletionPolicy;
use functions_core::{FirebaseApp, FunctionsError};
use functions_core::config::GoogleConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminContext {
    pub app: FirebaseApp,
    pub policy: DeletionPolicy,
}

impl AdminContext {
    pub fn new(app: FirebaseApp, policy: DeletionPolicy) -> Arc<Self> {
        Arc::new(Self { app, policy })
    }

    /// Initializes Firebase Admin from the environment
    pub async fn from_env() -> Result<Arc<Self>, FunctionsError> {
        let config = GoogleConfig::from_env();
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &GoogleConfig) -> Result<Arc<Self>, FunctionsError> {
        let app = FirebaseApp::initialize(config).await?;
        let policy = DeletionPolicy {
            require_app_id_claim: config.require_app_id_claim,
        };
        Ok(Self::new(app, policy))
    }
}
