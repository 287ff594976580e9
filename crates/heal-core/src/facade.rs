//! The self-heal facade
//!
//! Wires the engine, the applier and the report writer around one injected
//! filesystem.

use crate::config::HealConfig;
use crate::error::HealError;
use crate::proposal::build_proposal_set;
use heal_dom::DomInspector;
use heal_fs::{FileSystem, LocalFs};
use heal_model::{
    AdoContext, ApplySummary, EvidencePacket, FailureContext, ItemApplyResult, ItemApplyStatus,
    ProposalSet, RuleOutcome, SelectionManifest,
};
use heal_patch::PatchApplier;
use heal_report::{ApplyReportInput, ApplyReportWriter};
use heal_rules::{RuleEngine, RuleMatcher};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of applying a selection
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Per-item results and totals
    pub summary: ApplySummary,
    /// Written audit report; `None` for previews
    pub report_path: Option<PathBuf>,
}

/// Diagnosis, selection apply and audit in one place
#[derive(Debug)]
pub struct HealCore {
    config: HealConfig,
    engine: RuleEngine,
    applier: PatchApplier,
    reports: ApplyReportWriter,
}

impl HealCore {
    /// Build from configuration over `fs`
    #[must_use]
    pub fn new(config: HealConfig, fs: Arc<dyn FileSystem>) -> Self {
        let dom = DomInspector::new(Arc::clone(&fs), config.repo_root.clone())
            .with_scan_cap(config.snapshot_scan_cap);
        let engine = RuleEngine::new(dom, config.repo_root.clone())
            .with_min_heal_confidence(config.min_heal_confidence);
        let applier = PatchApplier::new(Arc::clone(&fs), config.repo_root.clone())
            .with_tests_dir(config.tests_dir.clone());
        let reports = ApplyReportWriter::new(fs, config.reports_path());

        Self {
            config,
            engine,
            applier,
            reports,
        }
    }

    /// Build over the local disk
    #[must_use]
    pub fn local(config: HealConfig) -> Self {
        Self::new(config, Arc::new(LocalFs::new()))
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    /// Register an extra matcher after the built-in ones
    pub fn register_matcher(&mut self, matcher: Box<dyn RuleMatcher>) {
        self.engine.register(matcher);
    }

    /// Diagnose one failure into a proposal set
    ///
    /// # Errors
    /// `HealError::Diagnosis` when a matcher aborts the run.
    pub async fn diagnose(
        &self,
        failure: &FailureContext,
        evidence: &EvidencePacket,
    ) -> Result<ProposalSet, HealError> {
        let diagnosis = self.engine.diagnose(failure, evidence).await?;
        let set = build_proposal_set(diagnosis, failure, &self.config.adapter_version);
        tracing::info!(
            proposal_id = %set.id,
            items = set.items.len(),
            heal = set.heal_count(),
            "proposal set ready"
        );
        Ok(set)
    }

    /// Apply the selected items of a proposal set
    ///
    /// Each heal item is its own transaction; a failed item does not stop
    /// the rest. Analysis items, unknown ids and repeated ids are skipped.
    /// Outside preview mode an apply report is written.
    ///
    /// # Errors
    /// - `HealError::MissingProposalId` / `HealError::SelectionMismatch`
    ///   before any patch runs
    /// - `HealError::Report` if the audit report cannot be written
    pub async fn apply_selection(
        &self,
        proposal_set: &ProposalSet,
        manifest: &SelectionManifest,
        preview: bool,
        ado_context: Option<&AdoContext>,
    ) -> Result<ApplyOutcome, HealError> {
        if proposal_set.id.trim().is_empty() {
            return Err(HealError::MissingProposalId);
        }
        if manifest.proposal_id != proposal_set.id {
            return Err(HealError::SelectionMismatch {
                expected: proposal_set.id.clone(),
                found: manifest.proposal_id.clone(),
            });
        }

        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(manifest.selected_item_ids.len());
        for item_id in &manifest.selected_item_ids {
            let result = if seen.insert(item_id.as_str()) {
                self.apply_item(proposal_set, item_id, preview).await
            } else {
                skipped(item_id, None, "item selected more than once")
            };
            results.push(result);
        }

        let summary = ApplySummary::from_results(proposal_set.id.clone(), results, preview);
        tracing::info!(
            proposal_id = %proposal_set.id,
            selected = summary.total_selected,
            applied = summary.total_applied,
            failed = summary.total_failed,
            skipped = summary.total_skipped,
            preview,
            "selection applied"
        );

        let report_path = if preview {
            None
        } else {
            let path = self
                .reports
                .write_apply_report(ApplyReportInput {
                    proposal_set,
                    selection_manifest: manifest,
                    apply_summary: &summary,
                    ado_context,
                })
                .await?;
            Some(path)
        };

        Ok(ApplyOutcome {
            summary,
            report_path,
        })
    }

    async fn apply_item(
        &self,
        proposal_set: &ProposalSet,
        item_id: &str,
        preview: bool,
    ) -> ItemApplyResult {
        let Some(item) = proposal_set.item(item_id) else {
            tracing::warn!(item_id, "selected item not in proposal set");
            return skipped(item_id, None, "unknown item id");
        };
        let rule_id = Some(item.finding.rule_id.clone());

        let plan = match &item.finding.outcome {
            RuleOutcome::PatchPlan(plan) => plan,
            RuleOutcome::AnalysisOnly(_) => {
                return skipped(item_id, rule_id, "analysis item has no patch plan");
            }
        };

        let result = self.applier.apply_patch_plan(plan, preview).await;
        let (status, reason) = if result.success {
            (ItemApplyStatus::Applied, None)
        } else {
            (
                ItemApplyStatus::Failed,
                result.first_error().map(str::to_string),
            )
        };
        ItemApplyResult {
            item_id: item_id.to_string(),
            rule_id,
            status,
            apply_result: Some(result),
            reason,
        }
    }
}

fn skipped(item_id: &str, rule_id: Option<String>, reason: &str) -> ItemApplyResult {
    ItemApplyResult {
        item_id: item_id.to_string(),
        rule_id,
        status: ItemApplyStatus::Skipped,
        apply_result: None,
        reason: Some(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heal_model::{HealTarget, RuleMatch, TargetKind};
    use heal_test_utils::{proposal_set, replace_plan, MemoryFs};
    use pretty_assertions::assert_eq;

    const SPEC: &str = "/repo/tests/a.spec.ts";

    fn core(fs: &Arc<MemoryFs>) -> HealCore {
        HealCore::new(
            HealConfig::default().with_repo_root("/repo"),
            Arc::clone(fs) as Arc<dyn FileSystem>,
        )
    }

    fn heal(search: &str, replace: &str) -> RuleMatch {
        RuleMatch::heal(
            "text-assertion-mismatch",
            0.6,
            "r",
            replace_plan("a.spec.ts", search, replace),
            HealTarget::new(TargetKind::ExpectedText, search, replace),
        )
    }

    fn set() -> ProposalSet {
        proposal_set(
            "P1",
            vec![
                ("heal-1", heal("'Hello'", "'Hi'")),
                ("heal-2", heal("'absent'", "'x'")),
                ("analysis-1", RuleMatch::analysis("test-timeout", 0.35, "r", "s", "d")),
            ],
        )
    }

    #[tokio::test]
    async fn applies_selected_items_and_writes_report() {
        let fs = Arc::new(MemoryFs::new().with_file(SPEC, "expect(t).toHaveText('Hello');"));
        let manifest = SelectionManifest::new(
            "P1",
            vec![
                "heal-1".to_string(),
                "heal-2".to_string(),
                "analysis-1".to_string(),
                "missing".to_string(),
                "heal-1".to_string(),
            ],
        );

        let outcome = core(&fs)
            .apply_selection(&set(), &manifest, false, None)
            .await
            .unwrap();

        let summary = &outcome.summary;
        assert_eq!(summary.total_selected, 5);
        assert_eq!(summary.total_applied, 1);
        assert_eq!(summary.total_failed, 1);
        assert_eq!(summary.total_skipped, 3);
        assert_eq!(fs.contents(SPEC).unwrap(), "expect(t).toHaveText('Hi');");

        let path = outcome.report_path.unwrap();
        assert!(path.starts_with("/repo/.heal/apply-reports"));
        assert!(fs.contents(&path).is_some());
    }

    #[tokio::test]
    async fn preview_writes_nothing() {
        let fs = Arc::new(MemoryFs::new().with_file(SPEC, "expect(t).toHaveText('Hello');"));
        let manifest = SelectionManifest::new("P1", vec!["heal-1".to_string()]);

        let outcome = core(&fs)
            .apply_selection(&set(), &manifest, true, None)
            .await
            .unwrap();

        assert_eq!(outcome.summary.total_applied, 1);
        assert!(outcome.summary.preview);
        assert!(outcome.report_path.is_none());
        assert_eq!(fs.write_count(), 0);
    }

    #[tokio::test]
    async fn mismatched_selection_is_rejected_before_patching() {
        let fs = Arc::new(MemoryFs::new().with_file(SPEC, "expect(t).toHaveText('Hello');"));
        let manifest = SelectionManifest::new("OTHER", vec!["heal-1".to_string()]);

        let err = core(&fs)
            .apply_selection(&set(), &manifest, false, None)
            .await
            .unwrap_err();

        assert!(matches!(err, HealError::SelectionMismatch { .. }));
        assert!(fs.calls().is_empty());
    }
}
