//! Report errors

use heal_fs::FsError;

/// Errors writing an apply report
///
/// The id checks run before any I/O, so a consistency error never leaves a
/// file behind.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Proposal set has no id
    #[error("proposal set id is missing")]
    MissingProposalId,

    /// Selection manifest belongs to another proposal set
    #[error("selection manifest proposal id '{found}' does not match proposal set '{expected}'")]
    ManifestMismatch { expected: String, found: String },

    /// Apply summary belongs to another proposal set
    #[error("apply summary proposal set id '{found}' does not match proposal set '{expected}'")]
    SummaryMismatch { expected: String, found: String },

    /// Report could not be encoded
    #[error("failed to serialize apply report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No free report name could be reserved
    #[error("report name already taken: {}", .0.display())]
    NameTaken(std::path::PathBuf),

    /// Report could not be written
    #[error("failed to write apply report: {0}")]
    Io(#[from] FsError),
}

impl ReportError {
    /// Whether this is an id consistency failure
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            Self::MissingProposalId | Self::ManifestMismatch { .. } | Self::SummaryMismatch { .. }
        )
    }
}
