//! Source rows and identifier handling.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error_handling::ExportError;

/// Longest identifier accepted, in bytes. Matches the usual file name limit.
const MAX_IDENTIFIER_LEN: usize = 255;

/// One row of the source table.
///
/// Field names map to JSON values; nulls are kept here and dropped only when
/// the metadata sidecar is built. A `BTreeMap` keeps names sorted, which is the
/// order the sidecar is written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Extracts the identifier from `column` and checks it is usable as a
    /// directory name.
    ///
    /// Strings are trimmed (fixed-width `char(n)` columns come back padded);
    /// integers are rendered in decimal. Only the directory name uses the
    /// trimmed form: the sidecar keeps the column value exactly as read, so
    /// `"A1   "` is exported to `A1/` with `"identif": "A1   "`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidIdentifier` when the value is missing, not a
    /// string or integer, or fails [`validate_identifier`].
    pub fn identifier(&self, column: &str) -> Result<String, ExportError> {
        let raw = match self.fields.get(column) {
            None | Some(Value::Null) => {
                return Err(ExportError::InvalidIdentifier {
                    value: "null".to_string(),
                    reason: "missing",
                })
            }
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(other) => {
                return Err(ExportError::InvalidIdentifier {
                    value: other.to_string(),
                    reason: "not a string or integer",
                })
            }
        };

        validate_identifier(&raw).map_err(|reason| ExportError::InvalidIdentifier {
            value: raw.clone(),
            reason,
        })?;
        Ok(raw)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Checks that `identifier` names exactly one directory under the base dir.
///
/// # Errors
///
/// Returns the reason the identifier was rejected.
pub fn validate_identifier(identifier: &str) -> Result<(), &'static str> {
    if identifier.is_empty() {
        return Err("empty");
    }
    if identifier == "." || identifier == ".." {
        return Err("reserved path component");
    }
    if identifier.contains(|c: char| c == '/' || c == '\\') {
        return Err("contains a path separator");
    }
    if identifier.chars().any(char::is_control) {
        return Err("contains control characters");
    }
    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err("longer than 255 bytes");
    }
    Ok(())
}
