//! Proposal sets, selection manifests and apply summaries
//!
//! The three structures are built independently (diagnosis, review UI,
//! apply run) and tied together only by the proposal id.

use crate::patch::ApplyResult;
use crate::rule::RuleMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every diagnosis item for one failure, under one stable id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSet {
    /// Required, non-empty
    pub id: String,
    /// Failing test this set was built for
    pub source: ProposalSource,
    /// Heal items first, then analysis items
    pub items: Vec<ProposalItem>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Version of the adapter that produced the set
    pub adapter_version: String,
}

impl ProposalSet {
    /// Look up an item by id
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ProposalItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of items carrying a patch plan
    #[must_use]
    pub fn heal_count(&self) -> usize {
        self.items.iter().filter(|item| item.finding.is_heal()).count()
    }
}

/// Failing test identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSource {
    /// Spec file
    pub test_file: String,
    /// Test title
    pub test_title: String,
}

/// A rule match with an item id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalItem {
    /// Stable within the set
    pub id: String,
    /// The finding
    #[serde(flatten)]
    pub finding: RuleMatch,
}

/// Human-approved subset of a proposal set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionManifest {
    /// Must equal the proposal set id
    pub proposal_id: String,
    /// Approved item ids
    pub selected_item_ids: Vec<String>,
    /// Approval time
    pub created_at: DateTime<Utc>,
}

impl SelectionManifest {
    /// Create manifest stamped now
    #[must_use]
    pub fn new(proposal_id: impl Into<String>, selected_item_ids: Vec<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            selected_item_ids,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of applying a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    /// Must equal the proposal set id
    pub proposal_set_id: String,
    /// One entry per selected id, in selection order
    pub results: Vec<ItemApplyResult>,
    /// Apply time
    pub applied_at: DateTime<Utc>,
    /// Selected item count
    pub total_selected: usize,
    /// Items whose plan applied cleanly
    pub total_applied: usize,
    /// Items whose plan failed
    pub total_failed: usize,
    /// Items with nothing to apply
    pub total_skipped: usize,
    /// Whether the run was a preview
    #[serde(default)]
    pub preview: bool,
}

impl ApplySummary {
    /// Build a summary and compute totals from the results
    #[must_use]
    pub fn from_results(
        proposal_set_id: impl Into<String>,
        results: Vec<ItemApplyResult>,
        preview: bool,
    ) -> Self {
        let count = |status: ItemApplyStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            proposal_set_id: proposal_set_id.into(),
            total_selected: results.len(),
            total_applied: count(ItemApplyStatus::Applied),
            total_failed: count(ItemApplyStatus::Failed),
            total_skipped: count(ItemApplyStatus::Skipped),
            results,
            applied_at: Utc::now(),
            preview,
        }
    }
}

/// Per-item apply outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemApplyResult {
    /// Selected item id
    pub item_id: String,
    /// Rule id of the item, when the id resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Outcome
    pub status: ItemApplyStatus,
    /// Patch applier output for heal items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_result: Option<ApplyResult>,
    /// Why the item was skipped or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Item outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemApplyStatus {
    /// Plan applied (or previewed) cleanly
    Applied,
    /// Plan failed and was rolled back
    Failed,
    /// Nothing to apply
    Skipped,
}
