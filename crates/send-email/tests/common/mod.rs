//! Common test utilities and helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use functions_core::FunctionsError;
use functions_core::config::{GmailCredentials, StaticSecretProvider};
use functions_core::email::RawEnvelope;
use functions_core::gmail::{MailSender, OAuthCredential, SentMessage};
use send_email::MailerContext;
use std::sync::{Arc, Mutex};

pub const TOKEN_URI: &str = "https://accounts.google.com/o/oauth2/token";

pub fn test_credentials() -> GmailCredentials {
    GmailCredentials {
        client_id: "client-id.apps.googleusercontent.com".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "1//refresh-token".to_string(),
    }
}

/// Records every envelope it is asked to send
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<RawEnvelope>>>,
}

impl RecordingSender {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Decoded MIME bytes of the n-th sent message
    pub fn message(&self, index: usize) -> Vec<u8> {
        self.sent.lock().unwrap()[index].decode().unwrap()
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    async fn send(
        &self,
        _credential: &OAuthCredential,
        envelope: &RawEnvelope,
    ) -> Result<SentMessage, FunctionsError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(envelope.clone());
        Ok(SentMessage {
            id: format!("msg-{}", sent.len()),
            thread_id: None,
            label_ids: vec!["SENT".to_string()],
        })
    }
}

/// Always fails like Gmail rejecting the credentials
pub struct FailingSender;

#[async_trait]
impl MailSender for FailingSender {
    async fn send(
        &self,
        _credential: &OAuthCredential,
        _envelope: &RawEnvelope,
    ) -> Result<SentMessage, FunctionsError> {
        Err(FunctionsError::OAuth(
            "Token refresh rejected: invalid_grant".to_string(),
        ))
    }
}

pub fn context_with(sender: Arc<dyn MailSender>) -> Arc<MailerContext> {
    MailerContext::new(
        Arc::new(StaticSecretProvider::new(test_credentials())),
        sender,
        TOKEN_URI,
    )
}

pub fn json_request(body: &serde_json::Value) -> http::Request<Body> {
    http::Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
