/// Per-tenant authorization records in Firestore
///
/// Records live at `artifacts/{app_id}/users/{uid}` and carry a `role`
/// string field. Only reads are performed here.
use crate::auth::AccessTokenSource;
use crate::constants::{ADMIN_ROLE, FIRESTORE_BASE_URL};
use crate::error::FunctionsError;
use crate::google::error_message;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;

/// The caller's role record within a tenant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizationRecord {
    pub role: Option<String>,
}

impl AuthorizationRecord {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }

    /// Role comparison is exact: `Admin` is not an administrator
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Reads `artifacts/{app_id}/users/{uid}`; `None` when the document
    /// does not exist
    async fn authorization_record(
        &self,
        app_id: &str,
        uid: &str,
    ) -> Result<Option<AuthorizationRecord>, FunctionsError>;
}

/// Firestore REST document, only the parts we read
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl Document {
    fn string_field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|value| value.get("stringValue"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

pub struct FirestoreRoleStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FirestoreRoleStore {
    pub fn new(
        http: reqwest::Client,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self::with_base_url(http, FIRESTORE_BASE_URL, project_id, tokens)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            project_id: project_id.into(),
            tokens,
        }
    }

    /// Document URL with every path segment percent-encoded
    fn document_url(&self, app_id: &str, uid: &str) -> Result<Url, FunctionsError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            FunctionsError::Config(format!("Invalid Firestore base URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                FunctionsError::Config(format!(
                    "Firestore base URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                "artifacts",
                app_id,
                "users",
                uid,
            ]);

        Ok(url)
    }
}

#[async_trait]
impl RoleStore for FirestoreRoleStore {
    async fn authorization_record(
        &self,
        app_id: &str,
        uid: &str,
    ) -> Result<Option<AuthorizationRecord>, FunctionsError> {
        let url = self.document_url(app_id, uid)?;
        let token = self.tokens.access_token().await?;

        debug!(app_id = %app_id, uid = %uid, "Reading authorization record");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FunctionsError::Firestore(format!("Firestore request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(app_id = %app_id, uid = %uid, "No authorization record");
            return Ok(None);
        }

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!(app_id = %app_id, error = %message, "Failed to read authorization record");
            return Err(FunctionsError::Firestore(message));
        }

        let document: Document = response.json().await.map_err(|e| {
            FunctionsError::Firestore(format!("Unexpected Firestore document: {}", e))
        })?;

        Ok(Some(AuthorizationRecord {
            role: document.string_field("role"),
        }))
    }
}
