//! Filesystem errors

use std::path::PathBuf;

/// Errors from filesystem primitives
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// IO error on a path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Blocking scan task failed
    #[error("directory scan aborted: {0}")]
    ScanAborted(String),
}

impl FsError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the underlying IO error is "not found"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias for filesystem operations
pub type FsResult<T> = Result<T, FsError>;
