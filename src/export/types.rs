//! Export types and options.

use std::path::PathBuf;

use crate::config::{CollisionPolicy, Config};

/// Whether a record's image payload was turned into bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Bytes written to `original.jpg`
    Decoded,
    /// Payload missing or malformed; no image written
    Failed,
}

/// Where and how records are written.
#[derive(Clone, Debug)]
pub struct ExportLayout {
    /// Root directory; each record gets `<base_dir>/<identifier>/`
    pub base_dir: PathBuf,
    /// Column holding the record identifier
    pub id_column: String,
    /// Column holding the base64 image payload
    pub image_column: String,
    /// Behaviour on duplicate identifiers within one run
    pub collision_policy: CollisionPolicy,
}

impl From<&Config> for ExportLayout {
    fn from(config: &Config) -> Self {
        Self {
            base_dir: config.base_dir.clone(),
            id_column: config.id_column.clone(),
            image_column: config.image_column.clone(),
            collision_policy: config.collision_policy,
        }
    }
}

/// The files written for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Validated record identifier (the directory name)
    pub identifier: String,
    /// `<base_dir>/<identifier>`
    pub dir: PathBuf,
    /// `original.jpg`, present only when the payload decoded
    pub image_path: Option<PathBuf>,
    /// `personal_data.json`
    pub metadata_path: PathBuf,
    pub outcome: DecodeOutcome,
    /// An `original.jpg` left by an earlier run was deleted
    pub stale_image_removed: bool,
    /// The payload carried whitespace that was skipped while decoding
    pub payload_had_whitespace: bool,
}
