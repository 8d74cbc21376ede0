/// admin-delete-user - callable function deleting Firebase Auth users
///
/// Only administrators of the caller's tenant may delete accounts, and
/// never their own.
pub mod callable;
pub mod context;
pub mod deletion;

pub use callable::{CallableError, CallableRequest, FunctionsErrorCode};
pub use context::AdminContext;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, header},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use callable::CallableResponse;
use functions_core::constants::MAX_REQUEST_BODY_BYTES;
use functions_core::lambda::dispatch;
use functions_core::middleware::logging_middleware;
use lambda_http::{Body, Error as LambdaError, Request};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Runs one callable invocation
pub async fn handle(
    State(ctx): State<Arc<AdminContext>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match CallableRequest::from_http(ctx.app.verifier(), &method, &headers, &body)
        .await
    {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    match deletion::delete_user(
        &request,
        ctx.app.role_store(),
        ctx.app.accounts(),
        ctx.policy,
    )
    .await
    {
        Ok(result) => CallableResponse { result }.into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn router(ctx: Arc<AdminContext>) -> Router {
    Router::new()
        .fallback(handle)
        .layer(axum_middleware::from_fn(logging_middleware))
        // Callable clients may run in any origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(ctx)
}

/// Main handler - converts the Lambda HTTP request to an axum call
pub async fn handler(
    ctx: Arc<AdminContext>,
    event: Request,
) -> Result<lambda_http::Response<Body>, LambdaError> {
    info!(
        "Processing admin-delete-user request: {} {}",
        event.method(),
        event.uri()
    );
    dispatch(router(ctx), event).await
}
