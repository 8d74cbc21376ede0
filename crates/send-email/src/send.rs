/// The send-email handler
use crate::context::MailerContext;
use crate::error::SendEmailError;
use crate::request::EmailRequest;
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use functions_core::constants::CORS_MAX_AGE_SECONDS;
use functions_core::email::attachment::prepare_attachment;
use functions_core::email::{RawEnvelope, compose_message};
use functions_core::gmail::{OAuthCredential, SentMessage};
use functions_core::utils::{is_json_content_type, redact_body, redact_email, redact_subject};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handles every invocation: CORS preflight or a send
pub async fn handle(
    State(ctx): State<Arc<MailerContext>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    match send_email(&ctx, &headers, &body).await {
        Ok(sent) => (
            StatusCode::OK,
            format!("Email sent successfully with Message ID: {}", sent.id),
        )
            .into_response(),
        Err(err) => {
            match &err {
                SendEmailError::BadRequest(msg) => {
                    warn!(error = %msg, "Rejected send-email request")
                }
                SendEmailError::Internal(msg) => error!(error = %msg, "Failed to send email"),
            }
            err.into_response()
        }
    }
}

/// 204 with the CORS preflight headers
pub fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST".to_string()),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type".to_string()),
            (header::ACCESS_CONTROL_MAX_AGE, CORS_MAX_AGE_SECONDS.to_string()),
        ],
    )
        .into_response()
}

/// Validates the request, composes the message and hands it to Gmail
pub async fn send_email(
    ctx: &MailerContext,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<SentMessage, SendEmailError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if !is_json_content_type(content_type) {
        return Err(SendEmailError::BadRequest(
            "Request must be JSON".to_string(),
        ));
    }

    let request = EmailRequest::from_slice(body)?;
    let email = request.validate()?;

    info!(
        to = %redact_email(email.to),
        subject = %redact_subject(email.subject),
        body = %redact_body(email.body),
        has_attachment = request.attachment.is_some(),
        "Received send-email request"
    );

    let credentials = ctx.secrets.gmail_credentials()?;
    let credential = OAuthCredential::gmail_send(&credentials, &ctx.token_uri)?;

    let attachment = prepare_attachment(request.attachment.as_ref());
    let message = compose_message(&email, attachment)?;
    let envelope = RawEnvelope::encode(message);

    let sent = ctx.sender.send(&credential, &envelope).await?;

    info!(message_id = %sent.id, "send-email request completed");
    Ok(sent)
}
