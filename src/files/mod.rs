//! Filesystem side of segmentation: reading job logs, naming files and
//! writing per-step artifacts.

pub mod artifacts;
mod error;
pub mod filename;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use artifacts::ArtifactWriter;
pub use error::{ArtifactError, LogError};

/// Read a raw job log.
///
/// With `lossy` set, invalid UTF-8 sequences are replaced with U+FFFD;
/// otherwise they are reported as [`LogError::Undecodable`].
pub fn read_log(path: impl AsRef<Path>, lossy: bool) -> Result<String, LogError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LogError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LogError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if lossy {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    String::from_utf8(bytes).map_err(|e| LogError::Undecodable {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}
