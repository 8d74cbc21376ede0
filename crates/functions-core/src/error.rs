/// Error types for the receivables functions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Gmail API error: {0}")]
    Gmail(String),

    #[error("Firestore error: {0}")]
    Firestore(String),

    #[error("Identity Toolkit error: {0}")]
    Identity(String),

    #[error("Token verification error: {0}")]
    TokenVerification(String),

    #[error("Email composition error: {0}")]
    Composition(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl FunctionsError {
    /// Determines if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::TokenVerification(_) => true,
            Self::Config(_) => false,
            Self::OAuth(_) => false,
            Self::Gmail(_) => false,
            Self::Firestore(_) => false,
            Self::Identity(_) => false,
            Self::Composition(_) => false,
            Self::Http(_) => false,
        }
    }
}

// Implement conversions for common error types
impl From<serde_json::Error> for FunctionsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::env::VarError> for FunctionsError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for FunctionsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
