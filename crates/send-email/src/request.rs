/// Request payload of the send-email function
use crate::error::SendEmailError;
use functions_core::email::{AttachmentRequest, OutgoingEmail};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub to: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub attachment: Option<AttachmentRequest>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl EmailRequest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SendEmailError> {
        serde_json::from_slice(bytes)
            .map_err(|e| SendEmailError::BadRequest(format!("Invalid JSON payload: {}", e)))
    }

    /// Names of the required fields that are missing or empty, in order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("to", &self.to),
            ("subject", &self.subject),
            ("body", &self.body),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Checks the required fields and borrows them as an [`OutgoingEmail`]
    pub fn validate(&self) -> Result<OutgoingEmail<'_>, SendEmailError> {
        match (present(&self.to), present(&self.subject), present(&self.body)) {
            (Some(to), Some(subject), Some(body)) => Ok(OutgoingEmail { to, subject, body }),
            _ => {
                let missing = self
                    .missing_fields()
                    .iter()
                    .map(|name| format!("'{}'", name))
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(SendEmailError::BadRequest(format!(
                    "Missing fields: {}",
                    missing
                )))
            }
        }
    }
}
