/// Shared plumbing for Google REST APIs
use crate::error::FunctionsError;
use serde::Deserialize;

/// Google API error body: `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// HTTP client shared by all Google API calls of one function instance
///
/// Redirects are disabled so a token endpoint cannot bounce credentials
/// elsewhere.
pub fn build_http_client() -> Result<reqwest::Client, FunctionsError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("receivables-functions/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FunctionsError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Human readable description of a failed Google API response
pub async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    describe_error(status, &body)
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed.error.message.unwrap_or_default();
            match parsed.error.status {
                Some(code) => format!("{} ({}): {}", status.as_u16(), code, message),
                None => format!("{}: {}", status.as_u16(), message),
            }
        }
        Err(_) if body.trim().is_empty() => format!("{}", status),
        Err(_) => format!("{}: {}", status.as_u16(), body.trim()),
    }
}
