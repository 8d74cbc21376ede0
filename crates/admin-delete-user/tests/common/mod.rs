//! Common test utilities and helpers for integration tests
#![allow(dead_code)]

use admin_delete_user::CallableRequest;
use admin_delete_user::callable::AuthContext;
use async_trait::async_trait;
use functions_core::FunctionsError;
use functions_core::auth::{IdTokenClaims, IdTokenVerifier};
use functions_core::firestore::{AuthorizationRecord, RoleStore};
use functions_core::identity::AccountDeleter;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub const PROJECT_ID: &str = "receivables-test";
pub const JWKS_JSON: &str = include_str!("../fixtures/jwks.json");
pub const PRIVATE_KEY: &str = include_str!("../fixtures/test_rsa.pem");
pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../fixtures/service_account.json");

pub fn verifier() -> IdTokenVerifier {
    IdTokenVerifier::new(JWKS_JSON, PROJECT_ID).unwrap()
}

/// Claims of a valid ID token for `uid`, optionally scoped to a tenant
pub fn id_token_claims(uid: &str, app_id: Option<&str>) -> Value {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "sub": uid,
        "aud": PROJECT_ID,
        "iss": format!("https://securetoken.google.com/{}", PROJECT_ID),
        "iat": now,
        "exp": now + 3600,
        "email": format!("{}@example.com", uid),
    });
    if let Some(app_id) = app_id {
        claims["app_id"] = json!(app_id);
    }
    claims
}

/// Signs `claims` with the fixture key
pub fn sign_id_token(claims: &Value) -> String {
    sign_id_token_with_kid(claims, "test-key-1")
}

/// Signs `claims` with the fixture key, published under `kid`
pub fn sign_id_token_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// A callable request from an authenticated caller
pub fn authed_call(uid: &str, app_id: Option<&str>, data: Value) -> CallableRequest {
    let token: IdTokenClaims = serde_json::from_value(id_token_claims(uid, app_id)).unwrap();
    CallableRequest {
        auth: Some(AuthContext {
            uid: uid.to_string(),
            token,
        }),
        data,
    }
}

pub fn anonymous_call(data: Value) -> CallableRequest {
    CallableRequest { auth: None, data }
}

/// In-memory authorization records, recording every lookup
#[derive(Default)]
pub struct FakeRoleStore {
    pub records: HashMap<(String, String), AuthorizationRecord>,
    pub fail_with: Option<String>,
    pub lookups: Mutex<Vec<(String, String)>>,
}

impl FakeRoleStore {
    pub fn with_role(mut self, app_id: &str, uid: &str, role: &str) -> Self {
        self.records.insert(
            (app_id.to_string(), uid.to_string()),
            AuthorizationRecord::with_role(role),
        );
        self
    }

    /// A record without a `role` field
    pub fn with_empty_record(mut self, app_id: &str, uid: &str) -> Self {
        self.records.insert(
            (app_id.to_string(), uid.to_string()),
            AuthorizationRecord::default(),
        );
        self
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn authorization_record(
        &self,
        app_id: &str,
        uid: &str,
    ) -> Result<Option<AuthorizationRecord>, FunctionsError> {
        self.lookups
            .lock()
            .unwrap()
            .push((app_id.to_string(), uid.to_string()));

        if let Some(message) = &self.fail_with {
            return Err(FunctionsError::Firestore(message.clone()));
        }

        Ok(self
            .records
            .get(&(app_id.to_string(), uid.to_string()))
            .cloned())
    }
}

/// Records deleted uids
#[derive(Default)]
pub struct RecordingDeleter {
    pub deleted: Mutex<Vec<String>>,
    pub fail_with: Option<String>,
}

impl RecordingDeleter {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountDeleter for RecordingDeleter {
    async fn delete_user(&self, uid: &str) -> Result<(), FunctionsError> {
        self.deleted.lock().unwrap().push(uid.to_string());
        match &self.fail_with {
            Some(message) => Err(FunctionsError::Identity(message.clone())),
            None => Ok(()),
        }
    }
}

/// Service account key JSON pointing its token endpoint at `token_uri`
pub fn service_account_json(token_uri: &str) -> String {
    let mut key: Map<String, Value> = serde_json::from_str(SERVICE_ACCOUNT_JSON).unwrap();
    key.insert("token_uri".to_string(), json!(token_uri));
    serde_json::to_string(&key).unwrap()
}
