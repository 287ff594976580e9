//! Diagnosis → proposal set

use chrono::Utc;
use heal_model::{FailureContext, ProposalItem, ProposalSet, ProposalSource, RuleMatch};
use heal_rules::Diagnosis;
use ulid::Ulid;

/// Prefix of heal item ids
pub const HEAL_ITEM_PREFIX: &str = "heal";
/// Prefix of analysis item ids
pub const ANALYSIS_ITEM_PREFIX: &str = "analysis";

/// Number a diagnosis into a proposal set with a fresh ULID
///
/// Heal items come first as `heal-1`, `heal-2`, …, then analysis items as
/// `analysis-1`, … in engine order.
#[must_use]
pub fn build_proposal_set(
    diagnosis: Diagnosis,
    failure: &FailureContext,
    adapter_version: &str,
) -> ProposalSet {
    let mut items = numbered(HEAL_ITEM_PREFIX, diagnosis.heal_items);
    items.extend(numbered(ANALYSIS_ITEM_PREFIX, diagnosis.analysis_items));

    ProposalSet {
        id: Ulid::new().to_string(),
        source: ProposalSource {
            test_file: failure.test_file.clone(),
            test_title: failure.test_title.clone(),
        },
        items,
        created_at: Utc::now(),
        adapter_version: adapter_version.to_string(),
    }
}

fn numbered(prefix: &str, findings: Vec<RuleMatch>) -> Vec<ProposalItem> {
    findings
        .into_iter()
        .enumerate()
        .map(|(index, finding)| ProposalItem {
            id: format!("{prefix}-{}", index + 1),
            finding,
        })
        .collect()
}
