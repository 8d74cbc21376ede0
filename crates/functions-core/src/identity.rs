/// Firebase Auth account administration (Identity Toolkit REST API)
use crate::auth::AccessTokenSource;
use crate::constants::IDENTITY_TOOLKIT_BASE_URL;
use crate::error::FunctionsError;
use crate::google::error_message;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[async_trait]
pub trait AccountDeleter: Send + Sync {
    /// Deletes the Firebase Auth account `uid`
    async fn delete_user(&self, uid: &str) -> Result<(), FunctionsError>;
}

#[derive(Debug, Serialize)]
struct DeleteAccountRequest<'a> {
    #[serde(rename = "localId")]
    local_id: &'a str,
}

pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl IdentityToolkitClient {
    pub fn new(
        http: reqwest::Client,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self::with_base_url(http, IDENTITY_TOOLKIT_BASE_URL, project_id, tokens)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            tokens,
        }
    }

    fn delete_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/accounts:delete",
            self.base_url, self.project_id
        )
    }
}

#[async_trait]
impl AccountDeleter for IdentityToolkitClient {
    async fn delete_user(&self, uid: &str) -> Result<(), FunctionsError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .post(self.delete_url())
            .bearer_auth(token)
            .json(&DeleteAccountRequest { local_id: uid })
            .send()
            .await
            .map_err(|e| {
                FunctionsError::Identity(format!("Identity Toolkit request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!(uid = %uid, error = %message, "Failed to delete account");
            return Err(FunctionsError::Identity(message));
        }

        info!(uid = %uid, "Deleted Firebase Auth account");
        Ok(())
    }
}
