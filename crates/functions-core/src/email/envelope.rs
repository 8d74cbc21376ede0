/// Gmail transport envelope: `{"raw": base64url(MIME bytes)}`
use crate::email::composer::ComposedMessage;
use crate::error::FunctionsError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEnvelope {
    pub raw: String,
}

impl RawEnvelope {
    /// Consumes the composed message; only the encoded form outlives this call
    pub fn encode(message: ComposedMessage) -> Self {
        Self {
            raw: URL_SAFE.encode(message.into_bytes()),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, FunctionsError> {
        URL_SAFE
            .decode(self.raw.as_bytes())
            .map_err(|e| FunctionsError::Composition(format!("Invalid raw envelope: {}", e)))
    }
}
