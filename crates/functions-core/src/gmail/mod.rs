/// Gmail API access: OAuth2 refresh-token credential and the send call
pub mod client;
pub mod oauth;

pub use client::{GmailClient, MailSender, SentMessage};
pub use oauth::OAuthCredential;
