/// Integration tests for the send-email function
#[path = "common/mod.rs"]
mod common;

use axum::body::Body;
use common::{FailingSender, RecordingSender, context_with, json_request, read_body};
use functions_core::FunctionsError;
use functions_core::config::{GmailCredentials, SecretProvider};
use mail_parser::{MessageParser, MimeHeaders};
use send_email::{MailerContext, router};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

const PDF_BASE64: &str = "JVBERi0xLjQKJcOkw7zDtsOfCjEgMCBvYmoKPDwvVHlwZS9DYXRhbG9nPj4KZW5kb2JqCg==";

fn valid_payload() -> serde_json::Value {
    json!({
        "to": "customer@example.com",
        "subject": "Invoice INV-0042",
        "body": "Please find your invoice attached."
    })
}

#[tokio::test]
async fn test_options_preflight() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let request = http::Request::builder()
        .method("OPTIONS")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 204);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-max-age"], "3600");
    assert!(read_body(response).await.is_empty());
    assert_eq!(sender.count(), 0);
}

#[tokio::test]
async fn test_non_json_is_rejected() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let request = http::Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "text/plain")
        .body(Body::from("to=customer@example.com"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(read_body(response).await, "Request must be JSON");
    assert_eq!(sender.count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let request = http::Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"to\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 400);
    assert!(read_body(response).await.starts_with("Invalid JSON payload"));
    assert_eq!(sender.count(), 0);
}

#[tokio::test]
async fn test_missing_fields_never_reach_gmail() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let response = app
        .oneshot(json_request(&json!({"body": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(read_body(response).await, "Missing fields: 'to', 'subject'");
    assert_eq!(sender.count(), 0);
}

#[tokio::test]
async fn test_text_only_email_has_one_part() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let response = app.oneshot(json_request(&valid_payload())).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        read_body(response).await,
        "Email sent successfully with Message ID: msg-1"
    );

    assert_eq!(sender.count(), 1);
    let raw = sender.message(0);
    let text = String::from_utf8_lossy(&raw);
    assert!(text.contains("From: me\r\n"));
    assert!(text.contains("To: customer@example.com\r\n"));
    assert!(text.contains("multipart/mixed"));

    let parsed = MessageParser::default().parse(&raw).unwrap();
    assert_eq!(parsed.subject(), Some("Invoice INV-0042"));
    assert_eq!(parsed.attachment_count(), 0);
    assert_eq!(
        parsed.body_text(0).unwrap().trim_end(),
        "Please find your invoice attached."
    );
}

#[tokio::test]
async fn test_attachment_adds_second_part() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["attachment"] = json!({
        "filename": "INV-0042.pdf",
        "data": PDF_BASE64,
        "mimeType": "application/pdf"
    });
    let response = app.oneshot(json_request(&payload)).await.unwrap();
    assert_eq!(response.status(), 200);

    let raw = sender.message(0);
    let parsed = MessageParser::default().parse(&raw).unwrap();
    assert_eq!(parsed.attachment_count(), 1);
    let attachment = parsed.attachment(0).unwrap();
    assert_eq!(attachment.attachment_name(), Some("INV-0042.pdf"));
    assert!(attachment.contents().starts_with(b"%PDF-1.4"));
    assert_eq!(attachment.content_type().unwrap().ctype(), "application");
    assert_eq!(attachment.content_type().unwrap().subtype(), Some("pdf"));
}

#[tokio::test]
async fn test_attachment_defaults() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["attachment"] = json!({ "data": PDF_BASE64 });
    let response = app.oneshot(json_request(&payload)).await.unwrap();
    assert_eq!(response.status(), 200);

    let raw = sender.message(0);
    let parsed = MessageParser::default().parse(&raw).unwrap();
    let attachment = parsed.attachment(0).unwrap();
    assert_eq!(attachment.attachment_name(), Some("attachment.pdf"));
    assert_eq!(
        attachment.content_type().unwrap().subtype(),
        Some("octet-stream")
    );
}

#[tokio::test]
async fn test_corrupt_attachment_still_sends_text() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["attachment"] = json!({
        "filename": "broken.pdf",
        "data": "JVBERi0xLjQ",
        "mimeType": "application/pdf"
    });
    let response = app.oneshot(json_request(&payload)).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(sender.count(), 1);
    let raw = sender.message(0);
    let parsed = MessageParser::default().parse(&raw).unwrap();
    assert_eq!(parsed.attachment_count(), 0);
}

#[tokio::test]
async fn test_sloppy_padding_is_still_attached() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["attachment"] = json!({
        "filename": "hello.txt",
        "data": "SGVs=bG9==",
        "mimeType": "text/plain"
    });
    let response = app.oneshot(json_request(&payload)).await.unwrap();

    assert_eq!(response.status(), 200);
    let raw = sender.message(0);
    let parsed = MessageParser::default().parse(&raw).unwrap();
    assert_eq!(parsed.attachment_count(), 1);
    assert_eq!(parsed.attachment(0).unwrap().contents(), b"Hello");
}

#[tokio::test]
async fn test_empty_attachment_data_is_skipped() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["attachment"] = json!({ "filename": "empty.pdf", "data": "" });
    let response = app.oneshot(json_request(&payload)).await.unwrap();

    assert_eq!(response.status(), 200);
    let raw = sender.message(0);
    let parsed = MessageParser::default().parse(&raw).unwrap();
    assert_eq!(parsed.attachment_count(), 0);
}

#[tokio::test]
async fn test_identical_requests_send_twice() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let first = app
        .clone()
        .oneshot(json_request(&valid_payload()))
        .await
        .unwrap();
    let second = app.oneshot(json_request(&valid_payload())).await.unwrap();

    assert_eq!(first.status(), 200);
    assert_eq!(second.status(), 200);
    assert_eq!(sender.count(), 2);
    assert_eq!(
        read_body(second).await,
        "Email sent successfully with Message ID: msg-2"
    );
}

#[tokio::test]
async fn test_sender_failure_is_500() {
    let app = router(context_with(Arc::new(FailingSender)));

    let response = app.oneshot(json_request(&valid_payload())).await.unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        read_body(response).await,
        "An error occurred: OAuth error: Token refresh rejected: invalid_grant"
    );
}

struct MissingSecrets;

impl SecretProvider for MissingSecrets {
    fn gmail_credentials(&self) -> Result<GmailCredentials, FunctionsError> {
        Err(FunctionsError::Config(
            "Missing secret GMAIL_REFRESH_TOKEN".to_string(),
        ))
    }
}

#[tokio::test]
async fn test_missing_secret_is_500() {
    let sender = Arc::new(RecordingSender::default());
    let ctx = MailerContext::new(Arc::new(MissingSecrets), sender.clone(), common::TOKEN_URI);
    let app = router(ctx);

    let response = app.oneshot(json_request(&valid_payload())).await.unwrap();

    assert_eq!(response.status(), 500);
    assert!(read_body(response).await.contains("GMAIL_REFRESH_TOKEN"));
    assert_eq!(sender.count(), 0);
}

#[tokio::test]
async fn test_header_injection_is_rejected() {
    let sender = Arc::new(RecordingSender::default());
    let app = router(context_with(sender.clone()));

    let mut payload = valid_payload();
    payload["subject"] = json!("Invoice\r\nBcc: attacker@example.com");
    let response = app.oneshot(json_request(&payload)).await.unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(sender.count(), 0);
}
