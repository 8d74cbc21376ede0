/// Attachment handling
///
/// Attachments arrive as base64 text inside the JSON request. Decoding is
/// best effort: anything that goes wrong produces
/// [`AttachmentOutcome::Skipped`] and the email is sent without it.
use crate::constants::{DEFAULT_ATTACHMENT_FILENAME, DEFAULT_ATTACHMENT_MIME_TYPE};
use crate::error::FunctionsError;
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use lettre::message::{Attachment, SinglePart, header::ContentType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

// Anything outside the base64 alphabet, padding and whitespace
static BASE64_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9+/=\s]").unwrap());

// Padding is resolved before decoding; leftover bits in the last symbol
// are dropped
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const PAD: char = '=';

/// Attachment as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRequest {
    #[serde(default)]
    pub filename: Option<String>,

    /// Base64-encoded file content
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

impl AttachmentRequest {
    pub fn filename(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_ATTACHMENT_FILENAME)
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or(DEFAULT_ATTACHMENT_MIME_TYPE)
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref().filter(|data| !data.is_empty())
    }
}

/// A decoded attachment ready to become a MIME part
#[derive(Debug, Clone)]
pub struct PreparedAttachment {
    pub filename: String,
    pub content_type: ContentType,
    pub data: Vec<u8>,
}

impl PreparedAttachment {
    pub fn into_part(self) -> SinglePart {
        Attachment::new(self.filename).body(self.data, self.content_type)
    }
}

/// Why an attachment was left out of the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The request carried no attachment
    NotRequested,
    /// `attachment` was present but `data` was empty or missing
    EmptyData,
    InvalidBase64(String),
    InvalidContentType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => write!(f, "no attachment requested"),
            Self::EmptyData => write!(f, "attachment has no data"),
            Self::InvalidBase64(e) => write!(f, "invalid base64 data: {}", e),
            Self::InvalidContentType(e) => write!(f, "invalid content type: {}", e),
        }
    }
}

/// Result of preparing the optional attachment; never fatal to the send
#[derive(Debug, Clone)]
pub enum AttachmentOutcome {
    Attached(PreparedAttachment),
    Skipped(SkipReason),
}

impl AttachmentOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }
}

/// Base64 text with disallowed characters stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedBase64 {
    pub cleaned: String,
    /// Number of characters that were removed
    pub removed: usize,
}

/// Removes every character outside `[A-Za-z0-9+/=\s]`
///
/// # Examples
/// ```
/// use functions_core::email::attachment::sanitize_base64;
///
/// let sanitized = sanitize_base64("SGVs*bG8=");
/// assert_eq!(sanitized.cleaned, "SGVsbG8=");
/// assert_eq!(sanitized.removed, 1);
/// ```
pub fn sanitize_base64(input: &str) -> SanitizedBase64 {
    let cleaned = BASE64_DISALLOWED.replace_all(input, "").into_owned();
    let removed = input.chars().count() - cleaned.chars().count();
    SanitizedBase64 { cleaned, removed }
}

/// Decodes standard base64, ignoring embedded whitespace and line breaks
///
/// Padding is forgiving: `=` before the third symbol of a group is
/// skipped, and the first group completed by padding ends the input, so
/// anything after it is ignored. Unused bits in the final symbol are
/// dropped. Input that ends in an incomplete group without padding is
/// rejected.
///
/// # Examples
/// ```
/// use functions_core::email::attachment::decode_base64;
///
/// assert_eq!(decode_base64("SGVsbG8=").unwrap(), b"Hello".to_vec());
/// assert_eq!(decode_base64("SGVsbG8==").unwrap(), b"Hello".to_vec());
/// assert!(decode_base64("SGVsbG8").is_err());
/// ```
pub fn decode_base64(input: &str) -> Result<Vec<u8>, FunctionsError> {
    let mut symbols = String::with_capacity(input.len());
    let mut pads = 0;
    let mut terminated = false;

    for c in input.chars().filter(|c| !c.is_whitespace()) {
        if c == PAD {
            let group_pos = symbols.len() % 4;
            if group_pos >= 2 {
                pads += 1;
                if group_pos + pads >= 4 {
                    terminated = true;
                    break;
                }
            }
            continue;
        }
        pads = 0;
        symbols.push(c);
    }

    match symbols.len() % 4 {
        0 => {}
        1 => {
            return Err(FunctionsError::Validation(format!(
                "Invalid base64 data: {} symbols cannot be one more than a multiple of 4",
                symbols.len()
            )));
        }
        _ if !terminated => {
            return Err(FunctionsError::Validation(
                "Invalid base64 data: incorrect padding".to_string(),
            ));
        }
        _ => {}
    }

    LENIENT
        .decode(symbols.as_bytes())
        .map_err(|e| FunctionsError::Validation(format!("Invalid base64 data: {}", e)))
}

/// Content type of the attachment part: `application/` plus whatever
/// follows the last `/` of the requested MIME type
pub fn attachment_content_type(mime_type: &str) -> Result<ContentType, FunctionsError> {
    let subtype = mime_type.rsplit('/').next().unwrap_or_default().trim();
    if subtype.is_empty() {
        return Err(FunctionsError::Validation(format!(
            "MIME type '{}' has no subtype",
            mime_type
        )));
    }

    format!("application/{}", subtype)
        .parse::<ContentType>()
        .map_err(|e| {
            FunctionsError::Validation(format!("Invalid content type '{}': {}", mime_type, e))
        })
}

/// Turns the optional request attachment into an [`AttachmentOutcome`]
pub fn prepare_attachment(request: Option<&AttachmentRequest>) -> AttachmentOutcome {
    let Some(request) = request else {
        info!("No attachment info provided in the request");
        return AttachmentOutcome::Skipped(SkipReason::NotRequested);
    };

    let filename = request.filename();
    let mime_type = request.mime_type();
    info!(filename = %filename, mime_type = %mime_type, "Attachment info received");

    let Some(data) = request.data() else {
        warn!(filename = %filename, "No base64 data found for attachment, skipping attachment");
        return AttachmentOutcome::Skipped(SkipReason::EmptyData);
    };

    debug!(
        preview = %data.chars().take(50).collect::<String>(),
        length = data.len(),
        "Raw base64 attachment data"
    );

    let sanitized = sanitize_base64(data);
    if sanitized.removed > 0 {
        warn!(
            removed = sanitized.removed,
            "Invalid characters detected and removed from base64 data"
        );
    }

    let decoded = match decode_base64(&sanitized.cleaned) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                filename = %filename,
                error = %e,
                "Attachment will not be included in the email"
            );
            return AttachmentOutcome::Skipped(SkipReason::InvalidBase64(e.to_string()));
        }
    };
    info!(size = decoded.len(), "Base64 data successfully decoded");

    let content_type = match attachment_content_type(mime_type) {
        Ok(content_type) => content_type,
        Err(e) => {
            warn!(
                filename = %filename,
                error = %e,
                "Attachment will not be included in the email"
            );
            return AttachmentOutcome::Skipped(SkipReason::InvalidContentType(e.to_string()));
        }
    };

    AttachmentOutcome::Attached(PreparedAttachment {
        filename: filename.to_string(),
        content_type,
        data: decoded,
    })
}
