/// send-email error responses
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use functions_core::FunctionsError;

/// Errors surfaced to the caller as plain text
#[derive(Debug, thiserror::Error)]
pub enum SendEmailError {
    #[error("{0}")]
    BadRequest(String),

    #[error("An error occurred: {0}")]
    Internal(String),
}

impl SendEmailError {
    pub fn status(&self) -> StatusCode {
        match self {
            SendEmailError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SendEmailError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SendEmailError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<FunctionsError> for SendEmailError {
    fn from(err: FunctionsError) -> Self {
        if err.is_client_error() {
            SendEmailError::BadRequest(err.to_string())
        } else {
            SendEmailError::Internal(err.to_string())
        }
    }
}
