//! Record export.
//!
//! Each record becomes a directory named after its identifier holding:
//! - `original.jpg`: the decoded image, only when the payload is valid base64
//! - `personal_data.json`: every non-null field, with the image replaced by a
//!   sentinel string

mod decode;
mod exporter;
mod metadata;
mod record;
mod registry;
mod types;
mod writer;

pub use decode::{decode_image, DecodeError, DecodedImage};
pub use exporter::{PreparedRecord, RecordExporter};
pub use metadata::{build_metadata, render_metadata};
pub use record::{validate_identifier, Record};
pub use registry::{Claim, Claimed, IdentifierRegistry, WriteLock};
pub use types::{DecodeOutcome, ExportArtifact, ExportLayout};
pub use writer::write_atomic;
