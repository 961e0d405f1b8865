//! Per-record export: directory, image and metadata sidecar.

use std::fs;

use log::debug;

use crate::config::{IMAGE_FILE_NAME, METADATA_FILE_NAME};
use crate::error_handling::ExportError;

use super::decode::decode_image;
use super::metadata::{build_metadata, render_metadata};
use super::record::Record;
use super::registry::{Claim, IdentifierRegistry, WriteLock};
use super::types::{DecodeOutcome, ExportArtifact, ExportLayout};
use super::writer::{remove_if_present, write_atomic};

/// Identifier accepted for export, with how it was claimed.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub identifier: String,
    pub claim: Claim,
    /// Held across [`RecordExporter::write`] so records sharing an identifier
    /// write one after another
    pub write_lock: WriteLock,
}

/// Writes records below a base directory.
///
/// [`prepare`](Self::prepare) is cheap and runs in dispatch order, so duplicate
/// detection is deterministic even when [`write`](Self::write) runs in
/// parallel. Callers writing in parallel must hold the prepared record's
/// write lock for the duration of the write.
pub struct RecordExporter {
    layout: ExportLayout,
    registry: IdentifierRegistry,
}

impl RecordExporter {
    pub fn new(layout: ExportLayout) -> Self {
        let registry = IdentifierRegistry::new(layout.collision_policy);
        Self { layout, registry }
    }

    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }

    /// Validates the record identifier and claims it for this run.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::InvalidIdentifier` or
    /// `ExportError::DuplicateIdentifier`.
    pub fn prepare(&self, record: &Record) -> Result<PreparedRecord, ExportError> {
        let identifier = record.identifier(&self.layout.id_column)?;
        let claimed = self.registry.claim(&identifier)?;
        Ok(PreparedRecord {
            identifier,
            claim: claimed.claim,
            write_lock: claimed.write_lock,
        })
    }

    /// Writes the artifact for a prepared record.
    ///
    /// A payload that cannot be decoded is not an error: the sidecar is still
    /// written and the outcome is [`DecodeOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Io` or `ExportError::Serialize` when the artifact
    /// cannot be written.
    pub fn write(&self, record: &Record, identifier: &str) -> Result<ExportArtifact, ExportError> {
        let dir = self.layout.base_dir.join(identifier);
        fs::create_dir_all(&dir).map_err(|e| ExportError::io(dir.clone(), e))?;

        let mut stale_image_removed = false;
        let mut payload_had_whitespace = false;
        let (outcome, image_path) = match decode_image(record.get(&self.layout.image_column)) {
            Ok(image) => {
                payload_had_whitespace = image.had_whitespace;
                let path = write_atomic(&dir, IMAGE_FILE_NAME, &image.bytes)?;
                (DecodeOutcome::Decoded, Some(path))
            }
            Err(e) => {
                debug!("Image for '{}' not decoded: {}", identifier, e);
                stale_image_removed = remove_if_present(&dir, IMAGE_FILE_NAME)?;
                (DecodeOutcome::Failed, None)
            }
        };

        let fields = build_metadata(record, &self.layout.image_column, outcome);
        let rendered = render_metadata(&fields)?;
        let metadata_path = write_atomic(&dir, METADATA_FILE_NAME, &rendered)?;

        Ok(ExportArtifact {
            identifier: identifier.to_string(),
            dir,
            image_path,
            metadata_path,
            outcome,
            stale_image_removed,
            payload_had_whitespace,
        })
    }

    /// [`prepare`](Self::prepare) followed by [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// Returns the first error from either step.
    pub fn export(&self, record: &Record) -> Result<ExportArtifact, ExportError> {
        let prepared = self.prepare(record)?;
        self.write(record, &prepared.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionPolicy;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn exporter(dir: &TempDir, policy: CollisionPolicy) -> RecordExporter {
        RecordExporter::new(ExportLayout {
            base_dir: dir.path().to_path_buf(),
            id_column: "identif".to_string(),
            image_column: "image".to_string(),
            collision_policy: policy,
        })
    }

    fn record(id: &str, image: Value) -> Record {
        let mut record = Record::new();
        record.insert("identif", json!(id));
        record.insert("image", image);
        record.insert("name", json!("Jo"));
        record
    }

    fn read_sidecar(artifact: &ExportArtifact) -> Value {
        serde_json::from_slice(&fs::read(&artifact.metadata_path).unwrap()).unwrap()
    }

    #[test]
    fn test_export_decodable_record() {
        let dir = TempDir::new().unwrap();
        let artifact = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("A1", json!("/9g=")))
            .unwrap();

        assert_eq!(artifact.outcome, DecodeOutcome::Decoded);
        assert_eq!(artifact.dir, dir.path().join("A1"));
        assert_eq!(
            fs::read(dir.path().join("A1/original.jpg")).unwrap(),
            vec![0xFF, 0xD8]
        );
        assert_eq!(
            read_sidecar(&artifact),
            json!([{"identif": "A1", "image": "Present", "name": "Jo"}])
        );
    }

    #[test]
    fn test_export_undecodable_record() {
        let dir = TempDir::new().unwrap();
        let artifact = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("B2", json!("not-valid-base64!!")))
            .unwrap();

        assert_eq!(artifact.outcome, DecodeOutcome::Failed);
        assert!(artifact.image_path.is_none());
        assert!(!dir.path().join("B2/original.jpg").exists());
        assert_eq!(
            read_sidecar(&artifact),
            json!([{"identif": "B2", "image": "Could not be decoded", "name": "Jo"}])
        );
    }

    #[test]
    fn test_export_removes_stale_image_on_failed_decode() {
        let dir = TempDir::new().unwrap();
        let stale_dir = dir.path().join("A1");
        fs::create_dir_all(&stale_dir).unwrap();
        fs::write(stale_dir.join("original.jpg"), b"old").unwrap();

        let artifact = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("A1", Value::Null))
            .unwrap();

        assert!(artifact.stale_image_removed);
        assert!(!stale_dir.join("original.jpg").exists());
    }

    #[test]
    fn test_export_is_idempotent_across_exporters() {
        let dir = TempDir::new().unwrap();
        let input = record("A1", json!("/9g="));
        let first = exporter(&dir, CollisionPolicy::Fail).export(&input).unwrap();
        let first_json = fs::read(&first.metadata_path).unwrap();

        let second = exporter(&dir, CollisionPolicy::Fail).export(&input).unwrap();
        assert_eq!(fs::read(&second.metadata_path).unwrap(), first_json);
        assert_eq!(
            fs::read(dir.path().join("A1/original.jpg")).unwrap(),
            vec![0xFF, 0xD8]
        );
    }

    #[test]
    fn test_duplicate_in_same_run_rejected() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter(&dir, CollisionPolicy::Fail);
        exporter.export(&record("A1", json!("/9g="))).unwrap();
        let err = exporter
            .export(&record("A1", json!("AAAA")))
            .unwrap_err();
        assert!(matches!(err, ExportError::DuplicateIdentifier(_)));
        assert_eq!(
            fs::read(dir.path().join("A1/original.jpg")).unwrap(),
            vec![0xFF, 0xD8]
        );
    }

    #[test]
    fn test_duplicate_in_same_run_overwritten() {
        let dir = TempDir::new().unwrap();
        let exporter = exporter(&dir, CollisionPolicy::Overwrite);
        exporter.export(&record("A1", json!("/9g="))).unwrap();
        let prepared = exporter.prepare(&record("A1", json!("AAAA"))).unwrap();
        assert_eq!(prepared.claim, Claim::Overwrite);
        exporter
            .write(&record("A1", json!("AAAA")), &prepared.identifier)
            .unwrap();
        assert_eq!(
            fs::read(dir.path().join("A1/original.jpg")).unwrap(),
            vec![0, 0, 0]
        );
    }

    #[test]
    fn test_invalid_identifier_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let err = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("../escape", json!("/9g=")))
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidIdentifier { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_whitespace_payload_flagged() {
        let dir = TempDir::new().unwrap();
        let artifact = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("A1", json!("/9\ng=")))
            .unwrap();
        assert_eq!(artifact.outcome, DecodeOutcome::Decoded);
        assert!(artifact.payload_had_whitespace);
    }

    #[test]
    fn test_padded_identifier_keeps_source_value_in_sidecar() {
        let dir = TempDir::new().unwrap();
        let artifact = exporter(&dir, CollisionPolicy::Fail)
            .export(&record("A1   ", json!("/9g=")))
            .unwrap();

        assert_eq!(artifact.dir, dir.path().join("A1"));
        assert_eq!(artifact.identifier, "A1");
        assert_eq!(read_sidecar(&artifact)[0]["identif"], "A1   ");
    }
}
