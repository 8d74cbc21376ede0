/// Firebase Admin handle
///
/// Built once per function instance and shared by every invocation. It
/// owns the HTTP client, the service account credentials, the ID token
/// verifier and the Firestore and Identity Toolkit clients.
use crate::auth::{AccessTokenSource, IdTokenVerifier, ServiceAccountKey, ServiceAccountTokenSource};
use crate::config::GoogleConfig;
use crate::error::FunctionsError;
use crate::firestore::{FirestoreRoleStore, RoleStore};
use crate::google::build_http_client;
use crate::identity::{AccountDeleter, IdentityToolkitClient};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct FirebaseApp {
    project_id: String,
    verifier: Arc<IdTokenVerifier>,
    role_store: Arc<dyn RoleStore>,
    accounts: Arc<dyn AccountDeleter>,
}

impl FirebaseApp {
    /// Initializes the Admin handle from configuration
    ///
    /// The project id is taken from the configuration, falling back to the
    /// service account key. Signing keys come from `jwks_json` when set and
    /// are downloaded from `jwks_url` otherwise; either way they are
    /// downloaded again when a token names a key that is not known yet.
    pub async fn initialize(config: &GoogleConfig) -> Result<Self, FunctionsError> {
        let service_account_json = config.service_account_json.as_deref().ok_or_else(|| {
            FunctionsError::Config("Missing service account credentials".to_string())
        })?;
        let key = ServiceAccountKey::from_json(service_account_json)?;

        let project_id = match config.project_id.as_deref() {
            Some(project_id) => project_id.to_string(),
            None => key.project_id.clone().ok_or_else(|| {
                FunctionsError::Config(
                    "Project id not configured and not present in service account key"
                        .to_string(),
                )
            })?,
        };

        let http = build_http_client()?;
        let tokens = ServiceAccountTokenSource::new(key, http.clone())?;
        info!(
            project_id = %project_id,
            client_email = %tokens.client_email(),
            "Initializing Firebase Admin"
        );
        let tokens: Arc<dyn AccessTokenSource> = Arc::new(tokens);

        let verifier = match config.jwks_json.as_deref() {
            Some(jwks_json) => IdTokenVerifier::new(jwks_json, project_id.as_str())?
                .with_refresh(http.clone(), config.jwks_url.as_str()),
            None => {
                IdTokenVerifier::fetch_from(&http, config.jwks_url.as_str(), project_id.as_str())
                    .await?
            }
        };

        let role_store = FirestoreRoleStore::with_base_url(
            http.clone(),
            config.firestore_base_url.as_str(),
            project_id.as_str(),
            Arc::clone(&tokens),
        );
        let accounts = IdentityToolkitClient::with_base_url(
            http,
            config.identity_toolkit_base_url.as_str(),
            project_id.as_str(),
            tokens,
        );

        Ok(Self {
            project_id,
            verifier: Arc::new(verifier),
            role_store: Arc::new(role_store),
            accounts: Arc::new(accounts),
        })
    }

    /// Assembles a handle from already built parts
    pub fn from_parts(
        verifier: IdTokenVerifier,
        role_store: Arc<dyn RoleStore>,
        accounts: Arc<dyn AccountDeleter>,
    ) -> Self {
        Self {
            project_id: verifier.project_id().to_string(),
            verifier: Arc::new(verifier),
            role_store,
            accounts,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn verifier(&self) -> &IdTokenVerifier {
        &self.verifier
    }

    pub fn role_store(&self) -> &dyn RoleStore {
        self.role_store.as_ref()
    }

    pub fn accounts(&self) -> &dyn AccountDeleter {
        self.accounts.as_ref()
    }
}
