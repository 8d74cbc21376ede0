/// Shared state for send-email invocations
use functions_core::FunctionsError;
use functions_core::config::{EnvSecretProvider, GoogleConfig, SecretProvider};
use functions_core::gmail::{GmailClient, MailSender};
use functions_core::google::build_http_client;
use std::sync::Arc;

#[derive(Clone)]
pub struct MailerContext {
    /// Source of the Gmail OAuth2 secrets, consulted on every call
    pub secrets: Arc<dyn SecretProvider>,

    pub sender: Arc<dyn MailSender>,

    /// OAuth2 token endpoint used to refresh the Gmail access token
    pub token_uri: String,
}

impl MailerContext {
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        sender: Arc<dyn MailSender>,
        token_uri: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            secrets,
            sender,
            token_uri: token_uri.into(),
        })
    }

    /// Production context: secrets from the environment, real Gmail client
    pub fn from_env() -> Result<Arc<Self>, FunctionsError> {
        let config = GoogleConfig::from_env();
        let http = build_http_client()?;
        let sender = GmailClient::with_base_url(http, config.gmail_api_base_url.as_str());

        Ok(Self::new(
            Arc::new(EnvSecretProvider),
            Arc::new(sender),
            config.gmail_token_uri,
        ))
    }
}
