//! Metadata sidecar construction.
//!
//! The sidecar is a one-element JSON array holding an object with every
//! non-null field of the record, keys sorted, indented by four spaces and with
//! non-ASCII text left unescaped. The image payload never appears; its field
//! carries a sentinel instead.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::config::{IMAGE_NOT_DECODED, IMAGE_PRESENT, METADATA_INDENT};

use super::record::Record;
use super::types::DecodeOutcome;

/// Builds the sidecar object for `record`.
///
/// Null fields are dropped. The image field is always present afterwards,
/// holding the sentinel for `outcome`.
pub fn build_metadata(
    record: &Record,
    image_column: &str,
    outcome: DecodeOutcome,
) -> BTreeMap<String, Value> {
    let mut fields: BTreeMap<String, Value> = record
        .fields()
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let sentinel = match outcome {
        DecodeOutcome::Decoded => IMAGE_PRESENT,
        DecodeOutcome::Failed => IMAGE_NOT_DECODED,
    };
    fields.insert(image_column.to_string(), Value::String(sentinel.to_string()));
    fields
}

/// Serializes the sidecar document: `[ { ... } ]`, four-space indent.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn render_metadata(fields: &BTreeMap<String, Value>) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(METADATA_INDENT);
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    [fields].serialize(&mut serializer)?;
    Ok(buf)
}
