/// MIME composition using the lettre crate
///
/// The message is always `multipart/mixed` with a text/plain body and at
/// most one attachment. `From` is the literal `me`: Gmail substitutes the
/// authenticated account, so it is not a mailbox address and the top-level
/// headers are written as raw header values.
use crate::constants::GMAIL_USER_ME;
use crate::email::attachment::AttachmentOutcome;
use crate::error::FunctionsError;
use crate::utils::logging::{redact_email, redact_subject};
use crate::utils::validation::validate_header_value;
use lettre::message::header::{self, HeaderName, HeaderValue, Headers};
use lettre::message::{MultiPart, SinglePart};
use tracing::{debug, info};

/// Fields of the email that go into the message headers and body
#[derive(Debug, Clone, Copy)]
pub struct OutgoingEmail<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// A formatted MIME message
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    raw: Vec<u8>,
    part_count: usize,
}

impl ComposedMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Number of leaf parts in the multipart body
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    pub fn has_attachment(&self) -> bool {
        self.part_count > 1
    }
}

fn raw_header(name: &'static str, value: &str) -> HeaderValue {
    HeaderValue::new(HeaderName::new_from_ascii_str(name), value.to_string())
}

/// Builds the MIME message for `email`, attaching the file when the
/// attachment outcome carries one
pub fn compose_message(
    email: &OutgoingEmail<'_>,
    attachment: AttachmentOutcome,
) -> Result<ComposedMessage, FunctionsError> {
    validate_header_value("to", email.to)?;
    validate_header_value("subject", email.subject)?;

    let mut headers = Headers::new();
    headers.insert_raw(raw_header("To", email.to));
    headers.insert_raw(raw_header("From", GMAIL_USER_ME));
    headers.set(header::Subject::from(email.subject.to_string()));
    headers.set(header::Date::now());
    headers.set(header::MIME_VERSION_1_0);

    let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(email.body.to_string()));
    let mut part_count = 1;
    debug!("Text body attached to email");

    match attachment {
        AttachmentOutcome::Attached(prepared) => {
            let filename = prepared.filename.clone();
            let size = prepared.data.len();
            multipart = multipart.singlepart(prepared.into_part());
            part_count += 1;
            info!(filename = %filename, size = size, "Attached file to email");
        }
        AttachmentOutcome::Skipped(reason) => {
            debug!(reason = %reason, "Composing email without attachment");
        }
    }

    let mut raw = headers.to_string().into_bytes();
    raw.extend_from_slice(&multipart.formatted());

    info!(
        to = %redact_email(email.to),
        subject = %redact_subject(email.subject),
        parts = part_count,
        size = raw.len(),
        "Composed email"
    );

    Ok(ComposedMessage { raw, part_count })
}
