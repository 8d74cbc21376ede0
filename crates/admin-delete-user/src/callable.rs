/// Callable function protocol over HTTP
///
/// Requests are `POST` with a JSON body `{"data": ...}` and an optional
/// `Authorization: Bearer <ID token>` header. Results are returned as
/// `{"result": ...}`, failures as `{"error": {"status", "message"}}`.
use axum::{
    Json,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use functions_core::auth::{IdTokenClaims, IdTokenVerifier};
use functions_core::utils::is_json_content_type;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use tracing::warn;

/// Canonical error codes used by this function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionsErrorCode {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    Internal,
}

impl FunctionsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for FunctionsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned to the caller of a callable function
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct CallableError {
    pub code: FunctionsErrorCode,
    pub message: String,
}

impl CallableError {
    pub fn new(code: FunctionsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::InvalidArgument, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Unauthenticated, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::PermissionDenied, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Internal, message)
    }
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "status": self.code,
                "message": self.message,
            }
        }));

        (self.code.http_status(), body).into_response()
    }
}

/// Successful callable result
#[derive(Debug, Serialize)]
pub struct CallableResponse<T: Serialize> {
    pub result: T,
}

impl<T: Serialize> IntoResponse for CallableResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// The verified caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub uid: String,
    pub token: IdTokenClaims,
}

/// A decoded callable invocation
#[derive(Debug, Clone)]
pub struct CallableRequest {
    /// `None` when the request carried no Authorization header
    pub auth: Option<AuthContext>,
    pub data: Value,
}

impl CallableRequest {
    /// Decodes an HTTP request following the callable protocol
    ///
    /// A present but invalid ID token is rejected here with
    /// `UNAUTHENTICATED`; a missing one yields `auth: None`.
    pub async fn from_http(
        verifier: &IdTokenVerifier,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, CallableError> {
        if *method != Method::POST {
            warn!(method = %method, "Callable invoked with a non-POST method");
            return Err(CallableError::invalid_argument("Bad Request"));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if !is_json_content_type(content_type) {
            warn!(content_type = ?content_type, "Callable invoked without JSON body");
            return Err(CallableError::invalid_argument("Bad Request"));
        }

        let mut parsed: Map<String, Value> = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Callable body is not a JSON object");
            CallableError::invalid_argument("Bad Request")
        })?;
        // `null` is a valid payload, only a missing field is rejected
        let data = parsed.remove("data").ok_or_else(|| {
            warn!("Callable body has no 'data' field");
            CallableError::invalid_argument("Bad Request")
        })?;

        let auth = match headers.get(header::AUTHORIZATION) {
            None => None,
            Some(value) => {
                let token = IdTokenVerifier::extract_token(value.to_str().ok());
                let claims = match token {
                    Ok(token) => verifier.verify(token).await,
                    Err(e) => Err(e),
                }
                .map_err(|e| {
                    warn!(error = %e, "Failed to validate auth token");
                    CallableError::unauthenticated("Unauthenticated")
                })?;

                Some(AuthContext {
                    uid: claims.sub.clone(),
                    token: claims,
                })
            }
        };

        Ok(Self { auth, data })
    }
}
