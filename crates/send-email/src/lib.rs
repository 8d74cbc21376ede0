/// send-email - Gmail send function
///
/// Accepts `{to, subject, body, attachment?}` as JSON and sends it from the
/// account owning the configured refresh token.
pub mod context;
pub mod error;
pub mod request;
pub mod send;

pub use context::MailerContext;
pub use error::SendEmailError;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware};
use functions_core::constants::{CORS_ALLOW_ORIGIN, MAX_REQUEST_BODY_BYTES};
use functions_core::lambda::dispatch;
use functions_core::middleware::logging_middleware;
use http::{HeaderValue, header};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

/// The function answers on every path; the platform routes to it by URL
pub fn router(ctx: Arc<MailerContext>) -> Router {
    Router::new()
        .fallback(send::handle)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(ctx)
}

/// Main handler - converts the Lambda HTTP request to an axum call
pub async fn handler(
    ctx: Arc<MailerContext>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    info!("Processing send-email request: {} {}", event.method(), event.uri());
    dispatch(router(ctx), event).await
}
