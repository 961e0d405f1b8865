//! Artifact file writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error_handling::ExportError;

/// Writes `bytes` to `dir/name` through a temporary file in the same directory.
///
/// Readers never observe a half-written artifact: the file either keeps its
/// previous contents or holds the new ones.
///
/// # Errors
///
/// Returns `ExportError::Io` if the temporary file cannot be created, written
/// or renamed into place.
pub fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let target = dir.join(name);

    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ExportError::io(dir, e))?;
    // Temp files are created 0600; artifacts are meant to be shared.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| ExportError::io(tmp.path().to_path_buf(), e))?;
    }
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_data())
        .map_err(|e| ExportError::io(tmp.path().to_path_buf(), e))?;
    tmp.persist(&target)
        .map_err(|e| ExportError::io(target.clone(), e.error))?;

    Ok(target)
}

/// Deletes `dir/name` if it exists. Returns whether a file was removed.
///
/// # Errors
///
/// Returns `ExportError::Io` for any failure other than the file being absent.
pub fn remove_if_present(dir: &Path, name: &str) -> Result<bool, ExportError> {
    let target = dir.join(name);
    match fs::remove_file(&target) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ExportError::io(target, e)),
    }
}
