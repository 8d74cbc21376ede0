/// Firebase ID token verification using JWKS
///
/// Firebase rotates its signing keys. A token naming a key id the verifier
/// does not know triggers one download of the current keys, at most once
/// per [`JWKS_REFRESH_INTERVAL`].
use crate::constants::{FIREBASE_ISSUER_PREFIX, JWKS_REFRESH_INTERVAL};
use crate::error::FunctionsError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Claims of a Firebase ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (Firebase user id)
    pub sub: String,

    /// Audience (Firebase project id)
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: usize,

    /// Issued at time (Unix timestamp)
    pub iat: usize,

    #[serde(default)]
    pub email: Option<String>,

    /// Custom and provider claims, e.g. `app_id`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdTokenClaims {
    /// A custom claim, if present and a string
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

/// JWKS Key structure
#[derive(Debug, Deserialize)]
pub struct JwksKey {
    pub kty: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

/// JWKS structure
#[derive(Debug, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JwksKey>,
}

/// Parses JWKS JSON into decoding keys mapped by kid
fn parse_jwks(jwks_json: &str) -> Result<HashMap<String, DecodingKey>, FunctionsError> {
    let jwks: Jwks = serde_json::from_str(jwks_json)
        .map_err(|e| FunctionsError::Config(format!("Invalid JWKS JSON: {}", e)))?;

    let mut keys = HashMap::new();

    for key in jwks.keys {
        if key.kty == "RSA" {
            let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e).map_err(|e| {
                FunctionsError::Config(format!("Failed to create decoding key: {}", e))
            })?;

            keys.insert(key.kid, decoding_key);
        }
    }

    if keys.is_empty() {
        return Err(FunctionsError::Config(
            "No valid RSA keys found in JWKS".to_string(),
        ));
    }

    Ok(keys)
}

async fn download_jwks(
    http: &reqwest::Client,
    jwks_url: &str,
) -> Result<HashMap<String, DecodingKey>, FunctionsError> {
    let response = http
        .get(jwks_url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| FunctionsError::Config(format!("Failed to fetch JWKS: {}", e)))?;
    let jwks_json = response.text().await?;

    parse_jwks(&jwks_json)
}

/// Where and how often signing keys may be downloaded again
struct KeyRefresh {
    http: reqwest::Client,
    jwks_url: String,
    last_attempt: Mutex<Option<Instant>>,
}

/// Verifies ID tokens issued by Firebase Auth for one project
pub struct IdTokenVerifier {
    /// JWKS keys mapped by kid
    keys: RwLock<HashMap<String, DecodingKey>>,
    project_id: String,
    refresh: Option<KeyRefresh>,
}

impl IdTokenVerifier {
    /// Create a verifier from JWKS JSON; its keys never change unless
    /// [`with_refresh`](Self::with_refresh) is used
    pub fn new(jwks_json: &str, project_id: impl Into<String>) -> Result<Self, FunctionsError> {
        Ok(Self {
            keys: RwLock::new(parse_jwks(jwks_json)?),
            project_id: project_id.into(),
            refresh: None,
        })
    }

    /// Reloads the keys from `jwks_url` when a token names an unknown kid
    pub fn with_refresh(mut self, http: reqwest::Client, jwks_url: impl Into<String>) -> Self {
        self.refresh = Some(KeyRefresh {
            http,
            jwks_url: jwks_url.into(),
            last_attempt: Mutex::new(None),
        });
        self
    }

    /// Downloads the current signing keys and keeps `jwks_url` for later
    /// refreshes
    pub async fn fetch_from(
        http: &reqwest::Client,
        jwks_url: &str,
        project_id: impl Into<String>,
    ) -> Result<Self, FunctionsError> {
        let keys = download_jwks(http, jwks_url).await?;
        info!(keys = keys.len(), "Loaded Firebase signing keys");

        Ok(Self {
            keys: RwLock::new(keys),
            project_id: project_id.into(),
            refresh: None,
        }
        .with_refresh(http.clone(), jwks_url))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Validate an ID token and return its claims
    ///
    /// Checks signature, expiry, audience (project id), issuer and that the
    /// subject is non-empty.
    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, FunctionsError> {
        // Decode header to get kid
        let header = decode_header(token).map_err(|e| {
            FunctionsError::TokenVerification(format!("Failed to decode token header: {}", e))
        })?;

        let kid = header.kid.ok_or_else(|| {
            FunctionsError::TokenVerification("Token header missing 'kid' field".to_string())
        })?;

        let decoding_key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[format!("{}{}", FIREBASE_ISSUER_PREFIX, self.project_id)]);

        let token_data = decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            FunctionsError::TokenVerification(format!("Failed to validate token: {}", e))
        })?;

        let claims = token_data.claims;
        if claims.sub.trim().is_empty() {
            return Err(FunctionsError::TokenVerification(
                "Token has an empty subject".to_string(),
            ));
        }

        Ok(claims)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, FunctionsError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }

        self.refresh_keys().await;

        self.keys.read().await.get(kid).cloned().ok_or_else(|| {
            FunctionsError::TokenVerification(format!("No signing key found for kid: {}", kid))
        })
    }

    async fn refresh_keys(&self) {
        let Some(refresh) = self.refresh.as_ref() else {
            return;
        };

        // Held across the download so concurrent misses fetch once
        let mut last_attempt = refresh.last_attempt.lock().await;
        if last_attempt.is_some_and(|at| at.elapsed() < JWKS_REFRESH_INTERVAL) {
            debug!("Signing keys refreshed recently, not downloading again");
            return;
        }
        *last_attempt = Some(Instant::now());

        match download_jwks(&refresh.http, &refresh.jwks_url).await {
            Ok(keys) => {
                info!(keys = keys.len(), "Refreshed Firebase signing keys");
                *self.keys.write().await = keys;
            }
            Err(e) => warn!(error = %e, "Failed to refresh Firebase signing keys"),
        }
    }

    /// Extract the bearer token from an Authorization header
    pub fn extract_token(auth_header: Option<&str>) -> Result<&str, FunctionsError> {
        let auth_header = auth_header.ok_or_else(|| {
            FunctionsError::TokenVerification("Missing Authorization header".to_string())
        })?;

        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                FunctionsError::TokenVerification(
                    "Authorization header must start with 'Bearer '".to_string(),
                )
            })
    }
}
