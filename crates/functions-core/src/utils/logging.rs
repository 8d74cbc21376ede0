/// PII redaction for log fields
///
/// Recipients, subjects and bodies of outgoing mail are customer data and
/// only appear in logs in redacted form.
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<local>[A-Za-z0-9._%+-]+)@(?P<domain>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+)").unwrap()
});

const SUBJECT_PREVIEW_CHARS: usize = 3;
const SUBJECT_MIN_REDACTED_CHARS: usize = 6;

/// Masks the local part of every address in `text`, keeping the domain
///
/// # Examples
/// ```
/// use functions_core::utils::logging::redact_email;
///
/// assert_eq!(redact_email("user@example.com"), "***@example.com");
/// assert_eq!(
///     redact_email("Ops <ops@acme.io>, billing@acme.io"),
///     "Ops <***@acme.io>, ***@acme.io"
/// );
/// ```
pub fn redact_email(text: &str) -> String {
    ADDRESS
        .replace_all(text, |caps: &Captures| format!("***@{}", &caps["domain"]))
        .into_owned()
}

/// Keeps the first few characters of a subject and its length
///
/// # Examples
/// ```
/// use functions_core::utils::logging::redact_subject;
///
/// assert_eq!(redact_subject("Overdue invoice"), "Ove...[15 chars]");
/// assert_eq!(redact_subject("Hi"), "Hi");
/// ```
pub fn redact_subject(subject: &str) -> String {
    let length = subject.chars().count();
    if length < SUBJECT_MIN_REDACTED_CHARS {
        return subject.to_string();
    }

    let preview: String = subject.chars().take(SUBJECT_PREVIEW_CHARS).collect();
    format!("{}...[{} chars]", preview, length)
}

/// Body size only
pub fn redact_body(body: &str) -> String {
    format!("[{} bytes]", body.len())
}
