/// Configuration - endpoints from environment variables, secrets per call
use crate::constants::{
    ENV_FIREBASE_JWKS_JSON, ENV_FIREBASE_JWKS_URL, ENV_FIRESTORE_BASE_URL, ENV_GMAIL_API_BASE_URL,
    ENV_GMAIL_CLIENT_ID, ENV_GMAIL_CLIENT_SECRET, ENV_GMAIL_REFRESH_TOKEN, ENV_GMAIL_TOKEN_URI,
    ENV_GOOGLE_CLOUD_PROJECT, ENV_GOOGLE_SERVICE_ACCOUNT_JSON, ENV_IDENTITY_TOOLKIT_BASE_URL,
    ENV_REQUIRE_APP_ID_CLAIM, FIREBASE_JWKS_URL, FIRESTORE_BASE_URL, GMAIL_API_BASE_URL,
    GMAIL_TOKEN_URI, IDENTITY_TOOLKIT_BASE_URL,
};
use crate::error::FunctionsError;
use std::fmt;

/// OAuth2 client credentials and refresh token for the sending Gmail account
#[derive(Clone, PartialEq, Eq)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

// Secrets must never reach the logs
impl fmt::Debug for GmailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Source of the Gmail secrets
///
/// Secrets are injected by the platform and looked up on every call, so
/// implementations must not cache them between invocations.
pub trait SecretProvider: Send + Sync {
    fn gmail_credentials(&self) -> Result<GmailCredentials, FunctionsError>;
}

/// Reads `GMAIL_CLIENT_ID`, `GMAIL_CLIENT_SECRET` and `GMAIL_REFRESH_TOKEN`
/// from the process environment at call time.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    fn read(name: &str) -> Result<String, FunctionsError> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(FunctionsError::Config(format!("Missing secret {}", name))),
        }
    }
}

impl SecretProvider for EnvSecretProvider {
    fn gmail_credentials(&self) -> Result<GmailCredentials, FunctionsError> {
        Ok(GmailCredentials {
            client_id: Self::read(ENV_GMAIL_CLIENT_ID)?,
            client_secret: Self::read(ENV_GMAIL_CLIENT_SECRET)?,
            refresh_token: Self::read(ENV_GMAIL_REFRESH_TOKEN)?,
        })
    }
}

/// Fixed credentials, for local runs and tests
#[derive(Debug, Clone)]
pub struct StaticSecretProvider {
    credentials: GmailCredentials,
}

impl StaticSecretProvider {
    pub fn new(credentials: GmailCredentials) -> Self {
        Self { credentials }
    }
}

impl SecretProvider for StaticSecretProvider {
    fn gmail_credentials(&self) -> Result<GmailCredentials, FunctionsError> {
        Ok(self.credentials.clone())
    }
}

/// Endpoint and platform settings, loaded once at startup
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Firebase / Google Cloud project id
    pub project_id: Option<String>,

    /// OAuth2 token endpoint for the Gmail refresh flow
    pub gmail_token_uri: String,

    pub gmail_api_base_url: String,
    pub firestore_base_url: String,
    pub identity_toolkit_base_url: String,

    /// Service account key JSON used to call Firestore and Identity Toolkit
    pub service_account_json: Option<String>,

    /// Pre-fetched JWKS for ID token verification
    pub jwks_json: Option<String>,

    /// Where signing keys are downloaded from, at startup without
    /// `jwks_json` and whenever a token names an unknown key
    pub jwks_url: String,

    /// Reject callers whose ID token carries no `app_id` claim instead of
    /// falling back to the default tenant
    pub require_app_id_claim: bool,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            gmail_token_uri: GMAIL_TOKEN_URI.to_string(),
            gmail_api_base_url: GMAIL_API_BASE_URL.to_string(),
            firestore_base_url: FIRESTORE_BASE_URL.to_string(),
            identity_toolkit_base_url: IDENTITY_TOOLKIT_BASE_URL.to_string(),
            service_account_json: None,
            jwks_json: None,
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            require_app_id_claim: false,
        }
    }
}

impl GoogleConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            project_id: get(ENV_GOOGLE_CLOUD_PROJECT),
            gmail_token_uri: get(ENV_GMAIL_TOKEN_URI).unwrap_or(defaults.gmail_token_uri),
            gmail_api_base_url: get(ENV_GMAIL_API_BASE_URL)
                .unwrap_or(defaults.gmail_api_base_url),
            firestore_base_url: get(ENV_FIRESTORE_BASE_URL)
                .unwrap_or(defaults.firestore_base_url),
            identity_toolkit_base_url: get(ENV_IDENTITY_TOOLKIT_BASE_URL)
                .unwrap_or(defaults.identity_toolkit_base_url),
            service_account_json: get(ENV_GOOGLE_SERVICE_ACCOUNT_JSON),
            jwks_json: get(ENV_FIREBASE_JWKS_JSON),
            jwks_url: get(ENV_FIREBASE_JWKS_URL).unwrap_or(defaults.jwks_url),
            require_app_id_claim: get(ENV_REQUIRE_APP_ID_CLAIM)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn project_id(&self) -> Result<&str, FunctionsError> {
        self.project_id.as_deref().ok_or_else(|| {
            FunctionsError::Config(format!("Missing {} env var", ENV_GOOGLE_CLOUD_PROJECT))
        })
    }
}
