/// Service account access tokens (OAuth2 JWT-bearer grant)
///
/// Firestore and Identity Toolkit are called with the function's own
/// service account. A token is minted per call and not cached.
use crate::constants::{SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS, SERVICE_ACCOUNT_SCOPES};
use crate::error::FunctionsError;
use crate::google::error_message;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, FunctionsError>;
}

/// Service account key file as downloaded from the Google Cloud console
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, FunctionsError> {
        serde_json::from_str(json)
            .map_err(|e| FunctionsError::Config(format!("Invalid service account JSON: {}", e)))
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    http: reqwest::Client,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self, FunctionsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            FunctionsError::Config(format!("Invalid service account private key: {}", e))
        })?;

        Ok(Self {
            key,
            encoding_key,
            scope: SERVICE_ACCOUNT_SCOPES.join(" "),
            http,
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self) -> Result<String, FunctionsError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + SERVICE_ACCOUNT_ASSERTION_TTL_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| FunctionsError::OAuth(format!("Failed to sign assertion: {}", e)))
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, FunctionsError> {
        let assertion = self.assertion()?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| FunctionsError::OAuth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!(
                client_email = %self.key.client_email,
                error = %message,
                "Service account token exchange failed"
            );
            return Err(FunctionsError::OAuth(format!(
                "Service account token exchange failed: {}",
                message
            )));
        }

        let body: TokenResponseBody = response
            .json()
            .await
            .map_err(|e| FunctionsError::OAuth(format!("Unexpected token response: {}", e)))?;

        debug!(expires_in = ?body.expires_in, "Obtained service account access token");
        Ok(body.access_token)
    }
}

/// A fixed bearer token, e.g. `owner` for the Firestore emulator
#[derive(Debug, Clone)]
pub struct StaticTokenSource(String);

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, FunctionsError> {
        Ok(self.0.clone())
    }
}
