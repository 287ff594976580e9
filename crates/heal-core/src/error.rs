//! Top-level errors

use heal_report::ReportError;
use heal_rules::RuleError;

/// Errors from the self-heal facade
#[derive(Debug, thiserror::Error)]
pub enum HealError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Diagnosis aborted
    #[error("diagnosis failed: {0}")]
    Diagnosis(#[from] RuleError),

    /// Selection belongs to another proposal set
    #[error("selection manifest proposal id '{found}' does not match proposal set '{expected}'")]
    SelectionMismatch { expected: String, found: String },

    /// Proposal set has no id
    #[error("proposal set id is missing")]
    MissingProposalId,

    /// Audit report could not be written
    #[error("report failed: {0}")]
    Report(#[from] ReportError),
}

impl HealError {
    /// Create config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
