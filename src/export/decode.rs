//! Image payload decoding.
//!
//! Payloads are standard base64 text. ASCII whitespace is ignored, since
//! PostgreSQL's `encode(..., 'base64')` wraps its output every 76 characters.

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// Standard alphabet with canonical padding. Trailing bits are tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Why an image payload could not be turned into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The image column is null or absent.
    #[error("image payload is missing")]
    Missing,

    /// The image column holds a number, boolean or other non-text value.
    #[error("image payload is not text")]
    NotText,

    /// The payload decodes to zero bytes.
    #[error("image payload is empty")]
    Empty,

    /// The payload is not valid base64.
    #[error("image payload is not valid base64: {0}")]
    Malformed(#[from] base64::DecodeError),
}

/// Successfully decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// The payload carried whitespace that was skipped
    pub had_whitespace: bool,
}

/// Decodes the image column value of a record.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing why the payload is unusable.
pub fn decode_image(value: Option<&Value>) -> Result<DecodedImage, DecodeError> {
    let text = match value {
        None | Some(Value::Null) => return Err(DecodeError::Missing),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(DecodeError::NotText),
    };

    let compact: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let had_whitespace = compact.len() != text.len();

    let bytes = PAYLOAD_ENGINE.decode(&compact)?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedImage {
        bytes,
        had_whitespace,
    })
}
