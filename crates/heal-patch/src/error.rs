//! Error types for resolution and patch operations
//!
//! Neither type escapes [`crate::PatchApplier::apply_patch_plan`]: every
//! failure is rendered into the operation's result record.

use heal_fs::FsError;

/// Logical path could not be mapped to a file on disk
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither location exists
    #[error("File not found: {input} (also tried {prefixed})")]
    NotFound {
        /// Path as given
        input: String,
        /// `tests/`-prefixed form that was tried second
        prefixed: String,
    },
}

/// Why a single patch operation failed
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Target file could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Empty search text or anchor
    #[error("{what} is empty for {path}")]
    EmptyPattern { what: &'static str, path: String },

    /// `replaceText` search text missing from the file
    #[error("Search text not found in {path}")]
    SearchNotFound { path: String },

    /// `insertAfter` anchor missing from the file
    #[error("Anchor not found in {path}")]
    AnchorNotFound { path: String },

    /// `insertAfter` anchor occurs more than once
    #[error("Anchor found {count} times in {path}; expected exactly one")]
    AnchorAmbiguous { path: String, count: usize },

    /// Reading the resolved file failed
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: FsError,
    },

    /// Writing the resolved file failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: FsError,
    },
}

impl PatchError {
    /// Create read error for path
    pub fn read(path: impl Into<String>, source: FsError) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create write error for path
    pub fn write(path: impl Into<String>, source: FsError) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the operation was rejected before touching content
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPattern { .. }
                | Self::SearchNotFound { .. }
                | Self::AnchorNotFound { .. }
                | Self::AnchorAmbiguous { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_both_locations() {
        let err = ResolveError::NotFound {
            input: "login/login.spec.ts".to_string(),
            prefixed: "tests/login/login.spec.ts".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("File not found: login/login.spec.ts"));
        assert!(text.contains("tests/login/login.spec.ts"));
    }

    #[test]
    fn messages_follow_operation_contract() {
        let ambiguous = PatchError::AnchorAmbiguous {
            path: "a.ts".to_string(),
            count: 3,
        };
        assert!(ambiguous.to_string().contains("found 3 times"));
        assert!(ambiguous.is_validation());

        let missing = PatchError::SearchNotFound {
            path: "a.ts".to_string(),
        };
        assert!(missing.to_string().contains("not found"));
    }
}
