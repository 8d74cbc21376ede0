/// Email composition: attachment decoding, MIME assembly, Gmail envelope
pub mod attachment;
pub mod composer;
pub mod envelope;

pub use attachment::{AttachmentOutcome, AttachmentRequest, PreparedAttachment, SkipReason};
pub use composer::{ComposedMessage, OutgoingEmail, compose_message};
pub use envelope::RawEnvelope;
