/// Input validation utilities
use crate::error::FunctionsError;

/// Rejects values that would break out of a single header line
pub fn validate_header_value(field: &str, value: &str) -> Result<(), FunctionsError> {
    if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
        Err(FunctionsError::Validation(format!(
            "Field '{}' must not contain line breaks",
            field
        )))
    } else {
        Ok(())
    }
}

/// Whether a `Content-Type` header denotes JSON (`application/json` or any
/// `application/*+json`)
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };

    match content_type.parse::<mime::Mime>() {
        Ok(mime) => {
            mime.type_() == mime::APPLICATION
                && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
        }
        Err(_) => false,
    }
}
