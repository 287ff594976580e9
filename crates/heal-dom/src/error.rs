//! DOM inspection errors

use heal_fs::FsError;
use std::path::PathBuf;

/// Errors during snapshot inspection
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// Trace claims to be extracted but no snapshot could be read
    #[error(
        "trace extracted to {dir} but no HTML snapshot was readable ({scanned} candidates scanned)"
    )]
    NoReadableSnapshots { dir: PathBuf, scanned: usize },

    /// Snapshot enumeration failed
    #[error("snapshot scan failed: {0}")]
    Scan(#[from] FsError),
}
