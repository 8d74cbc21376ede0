/// OAuth2 refresh-token credential for the Gmail API
use crate::config::GmailCredentials;
use crate::constants::GMAIL_SEND_SCOPE;
use crate::error::FunctionsError;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AccessToken, AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, error};

type TokenClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Short-lived credential built per request from the Gmail secrets
///
/// Construction does no I/O. The access token is obtained by
/// [`OAuthCredential::access_token`] right before the API call.
#[derive(Debug)]
pub struct OAuthCredential {
    client: TokenClient,
    refresh_token: RefreshToken,
    scopes: Vec<Scope>,
}

impl OAuthCredential {
    /// Credential limited to the send-only Gmail scope
    pub fn gmail_send(
        credentials: &GmailCredentials,
        token_uri: &str,
    ) -> Result<Self, FunctionsError> {
        Self::new(credentials, token_uri, &[GMAIL_SEND_SCOPE])
    }

    pub fn new(
        credentials: &GmailCredentials,
        token_uri: &str,
        scopes: &[&str],
    ) -> Result<Self, FunctionsError> {
        let token_url = TokenUrl::new(token_uri.to_string()).map_err(|e| {
            FunctionsError::Config(format!("Invalid token URI '{}': {}", token_uri, e))
        })?;

        let client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url);

        Ok(Self {
            client,
            refresh_token: RefreshToken::new(credentials.refresh_token.clone()),
            scopes: scopes.iter().map(|s| Scope::new(s.to_string())).collect(),
        })
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|s| s.as_str())
    }

    /// Exchanges the refresh token for an access token
    pub async fn access_token(
        &self,
        http_client: &reqwest::Client,
    ) -> Result<AccessToken, FunctionsError> {
        debug!("Refreshing OAuth2 access token");

        let response = self
            .client
            .exchange_refresh_token(&self.refresh_token)
            .add_scopes(self.scopes.iter().cloned())
            .request_async(http_client)
            .await
            .map_err(|e| {
                let detail = describe_refresh_error(&e);
                error!(error = %detail, "OAuth2 token refresh failed");
                FunctionsError::OAuth(format!("Failed to refresh access token: {}", detail))
            })?;

        debug!(
            expires_in = ?response.expires_in().map(|d| d.as_secs()),
            "Obtained OAuth2 access token"
        );

        Ok(response.access_token().clone())
    }
}

fn describe_refresh_error<RE>(err: &RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => match response.error_description() {
            Some(description) => format!("{}: {}", response.error(), description),
            None => response.error().to_string(),
        },
        RequestTokenError::Request(e) => format!("token request failed: {}", e),
        RequestTokenError::Parse(e, _) => format!("unexpected token response: {}", e),
        RequestTokenError::Other(message) => message.clone(),
    }
}
