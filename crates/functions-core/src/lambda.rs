/// Lambda HTTP plumbing shared by the function binaries
use axum::{Router, body::Body as AxumBody};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use tower::ServiceExt;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Installs the JSON tracing subscriber
///
/// The level comes from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .init();
}

/// Converts a Lambda HTTP request into an axum request, runs it through
/// `app` and converts the response back
pub async fn dispatch(app: Router, event: Request) -> Result<Response<Body>, LambdaError> {
    let (parts, body) = event.into_parts();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body.to_vec()));

    match app.oneshot(axum_request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();

            // Convert Axum response body to Lambda response body
            let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

            Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
        }
        Err(err) => {
            error!("Axum router error: {}", err);
            let response = Response::builder()
                .status(500)
                .body(Body::from("Internal server error"))?;
            Ok(response)
        }
    }
}
