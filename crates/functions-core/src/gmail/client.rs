/// Gmail send API
use crate::constants::{GMAIL_API_BASE_URL, GMAIL_USER_ME};
use crate::email::envelope::RawEnvelope;
use crate::error::FunctionsError;
use crate::gmail::oauth::OAuthCredential;
use crate::google::error_message;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

/// Gmail's answer to `users.messages.send`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentMessage {
    pub id: String,

    #[serde(rename = "threadId", default)]
    pub thread_id: Option<String>,

    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sends a pre-formed message on behalf of the credential's account
    async fn send(
        &self,
        credential: &OAuthCredential,
        envelope: &RawEnvelope,
    ) -> Result<SentMessage, FunctionsError>;
}

pub struct GmailClient {
    http: reqwest::Client,
    api_base_url: String,
}

impl GmailClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, GMAIL_API_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}/gmail/v1/users/{}/messages/send",
            self.api_base_url, GMAIL_USER_ME
        )
    }
}

#[async_trait]
impl MailSender for GmailClient {
    async fn send(
        &self,
        credential: &OAuthCredential,
        envelope: &RawEnvelope,
    ) -> Result<SentMessage, FunctionsError> {
        let access_token = credential.access_token(&self.http).await?;

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(access_token.secret())
            .json(envelope)
            .send()
            .await
            .map_err(|e| FunctionsError::Gmail(format!("Gmail send request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            error!(error = %message, "Gmail rejected the message");
            return Err(FunctionsError::Gmail(message));
        }

        let sent: SentMessage = response.json().await.map_err(|e| {
            FunctionsError::Gmail(format!("Unexpected Gmail send response: {}", e))
        })?;

        info!(
            message_id = %sent.id,
            thread_id = ?sent.thread_id,
            "Email sent successfully"
        );
        Ok(sent)
    }
}
