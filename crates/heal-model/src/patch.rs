//! Patch plans and apply results

use serde::{Deserialize, Serialize};

/// Prefix on every success message produced in preview mode
pub const PREVIEW_PREFIX: &str = "[PREVIEW]";

/// A proposed multi-file text edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPlan {
    /// What the edit does
    pub description: String,
    /// Why it is believed safe
    pub rationale: String,
    /// Operations, applied strictly in order
    pub operations: Vec<PatchOperation>,
}

impl PatchPlan {
    /// Create plan
    #[inline]
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        rationale: impl Into<String>,
        operations: Vec<PatchOperation>,
    ) -> Self {
        Self {
            description: description.into(),
            rationale: rationale.into(),
            operations,
        }
    }
}

/// One text edit against one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PatchOperation {
    /// Replace the first literal occurrence of `search`
    #[serde(rename_all = "camelCase")]
    ReplaceText {
        /// Logical file path
        file_path: String,
        /// Literal text to find
        search: String,
        /// Replacement text
        replace: String,
    },

    /// Insert text right after the single occurrence of `anchor`
    #[serde(rename_all = "camelCase")]
    InsertAfter {
        /// Logical file path
        file_path: String,
        /// Literal text that must occur exactly once
        anchor: String,
        /// Text to insert
        insert: String,
    },
}

impl PatchOperation {
    /// Create a replace operation
    #[must_use]
    pub fn replace_text(
        file_path: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self::ReplaceText {
            file_path: file_path.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Create an insert operation
    #[must_use]
    pub fn insert_after(
        file_path: impl Into<String>,
        anchor: impl Into<String>,
        insert: impl Into<String>,
    ) -> Self {
        Self::InsertAfter {
            file_path: file_path.into(),
            anchor: anchor.into(),
            insert: insert.into(),
        }
    }

    /// Logical file path the operation targets
    #[inline]
    #[must_use]
    pub fn file_path(&self) -> &str {
        match self {
            Self::ReplaceText { file_path, .. } | Self::InsertAfter { file_path, .. } => file_path,
        }
    }

    /// Short operation name for logs
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReplaceText { .. } => "replaceText",
            Self::InsertAfter { .. } => "insertAfter",
        }
    }
}

/// Outcome of one operation or one rollback step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOperationResult {
    /// Resolved logical path
    pub file_path: String,
    /// Whether the step succeeded
    pub success: bool,
    /// Success message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatchOperationResult {
    /// Successful step
    #[must_use]
    pub fn ok(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Failed step
    #[must_use]
    pub fn failed(file_path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a whole plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    /// False whenever any operation failed, even if rollback succeeded
    pub success: bool,
    /// One entry per attempted operation, in plan order
    pub results: Vec<PatchOperationResult>,
    /// Present only if a rollback ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_results: Option<Vec<PatchOperationResult>>,
}

impl ApplyResult {
    /// Whether a rollback ran
    #[inline]
    #[must_use]
    pub fn rolled_back(&self) -> bool {
        self.rollback_results.is_some()
    }

    /// First operation error, if any
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.results.iter().find_map(|r| r.error.as_deref())
    }
}
