#![allow(dead_code)]

pub mod command;

use bitstore::artifacts::objects::commit::Signature;
use chrono::DateTime;

/// Parse a signature in the serialized `Name <email> <seconds> <+hhmm>` form
pub fn signature(raw: &str) -> Signature {
    Signature::try_from(raw).expect("valid signature")
}

pub fn fixed_signature() -> Signature {
    let timestamp = DateTime::parse_from_rfc3339("2023-01-01T12:00:00+00:00").expect("valid date");
    Signature::new(
        "fake_user".to_string(),
        "fake_email@email.com".to_string(),
        timestamp,
    )
    .expect("valid signature")
}
