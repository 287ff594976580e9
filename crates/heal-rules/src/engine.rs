//! Rule engine
//!
//! Runs every registered matcher in order, partitions the findings and
//! applies acceptance-criteria suppression.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = RuleEngine::new(inspector, repo_root);
//! let diagnosis = engine.diagnose(&failure, &evidence).await?;
//! for item in &diagnosis.heal_items {
//!     println!("{}: {}", item.rule_id, item.rationale);
//! }
//! ```

use crate::alignment::{AlignmentVerdict, LiteralAlignment, RequirementAlignment};
use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use crate::matchers::default_matchers;
use heal_dom::DomInspector;
use heal_model::{EvidencePacket, FailureContext, RuleMatch, REQUIREMENT_MISMATCH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Findings of one diagnosis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// Findings with an executable patch plan
    pub heal_items: Vec<RuleMatch>,
    /// Findings with an explanation only
    pub analysis_items: Vec<RuleMatch>,
}

impl Diagnosis {
    /// No matcher fired
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heal_items.is_empty() && self.analysis_items.is_empty()
    }

    /// Total findings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heal_items.len() + self.analysis_items.len()
    }
}

/// Deterministic failure classifier
#[derive(Debug)]
pub struct RuleEngine {
    matchers: Vec<Box<dyn RuleMatcher>>,
    alignment: Box<dyn RequirementAlignment>,
    dom: DomInspector,
    repo_root: PathBuf,
    min_heal_confidence: f64,
}

impl RuleEngine {
    /// Engine with the built-in matchers
    #[must_use]
    pub fn new(dom: DomInspector, repo_root: impl Into<PathBuf>) -> Self {
        let mut engine = Self::empty(dom, repo_root);
        engine.matchers = default_matchers();
        engine
    }

    /// Engine with no matchers registered
    #[must_use]
    pub fn empty(dom: DomInspector, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            matchers: Vec::new(),
            alignment: Box::new(LiteralAlignment::default()),
            dom,
            repo_root: repo_root.into(),
            min_heal_confidence: 0.0,
        }
    }

    /// Register a matcher after the existing ones
    pub fn register(&mut self, matcher: Box<dyn RuleMatcher>) {
        tracing::debug!(rule_id = matcher.id(), "registered matcher");
        self.matchers.push(matcher);
    }

    /// With requirement alignment assessor
    #[inline]
    #[must_use]
    pub fn with_alignment(mut self, alignment: Box<dyn RequirementAlignment>) -> Self {
        self.alignment = alignment;
        self
    }

    /// With confidence floor below which heals are demoted to analysis
    #[inline]
    #[must_use]
    pub fn with_min_heal_confidence(mut self, floor: f64) -> Self {
        self.min_heal_confidence = floor.clamp(0.0, 1.0);
        self
    }

    /// Registered rule ids, in evaluation order
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.id()).collect()
    }

    /// Classify one failure
    ///
    /// Matchers run one after another; the first error aborts the run.
    ///
    /// # Errors
    /// [`RuleError`] from any matcher, typically a DOM integrity failure.
    pub async fn diagnose(
        &self,
        failure: &FailureContext,
        evidence: &EvidencePacket,
    ) -> Result<Diagnosis, RuleError> {
        let ctx = MatchContext::new(failure, evidence, &self.dom, &self.repo_root);

        let mut diagnosis = Diagnosis::default();
        for matcher in &self.matchers {
            let Some(found) = matcher.evaluate(&ctx).await? else {
                continue;
            };
            tracing::debug!(
                rule_id = %found.rule_id,
                heal = found.is_heal(),
                confidence = found.confidence,
                "matcher fired"
            );
            if found.is_heal() && found.confidence < self.min_heal_confidence {
                diagnosis.analysis_items.push(demote(found, self.min_heal_confidence));
            } else if found.is_heal() {
                diagnosis.heal_items.push(found);
            } else {
                diagnosis.analysis_items.push(found);
            }
        }

        if let Some(criteria) = evidence.acceptance_criteria() {
            self.suppress(&mut diagnosis, criteria);
        }

        tracing::info!(
            test_file = %failure.test_file,
            heal = diagnosis.heal_items.len(),
            analysis = diagnosis.analysis_items.len(),
            "diagnosis complete"
        );
        Ok(diagnosis)
    }

    /// Move every heal of a conflicting rule into a requirement-mismatch item
    fn suppress(&self, diagnosis: &mut Diagnosis, criteria: &str) {
        let mut conflicts: BTreeMap<String, String> = BTreeMap::new();
        for item in &diagnosis.heal_items {
            let Some(target) = item.target.as_ref() else {
                continue;
            };
            if let AlignmentVerdict::Conflict(reason) = self.alignment.assess(target, criteria) {
                conflicts.entry(item.rule_id.clone()).or_insert(reason);
            }
        }
        if conflicts.is_empty() {
            return;
        }

        let (suppressed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut diagnosis.heal_items)
            .into_iter()
            .partition(|item| conflicts.contains_key(&item.rule_id));
        diagnosis.heal_items = kept;

        for item in suppressed {
            let reason = conflicts.get(&item.rule_id).cloned().unwrap_or_default();
            tracing::warn!(rule_id = %item.rule_id, %reason, "heal suppressed by acceptance criteria");
            diagnosis.analysis_items.push(requirement_mismatch(item, &reason));
        }
    }
}

fn requirement_mismatch(item: RuleMatch, reason: &str) -> RuleMatch {
    let proposed = item
        .patch_plan()
        .map_or_else(String::new, |plan| plan.description.clone());
    RuleMatch::analysis(
        item.rule_id,
        item.confidence,
        item.rationale,
        "Failure may reflect an intentional requirement",
        format!(
            "The proposed fix ({proposed}) conflicts with the acceptance criteria: {reason}. \
             The application may be wrong rather than the test; confirm the requirement \
             before changing either."
        ),
    )
    .with_subtype(REQUIREMENT_MISMATCH)
}

fn demote(item: RuleMatch, floor: f64) -> RuleMatch {
    let description = item
        .patch_plan()
        .map_or_else(String::new, |plan| plan.description.clone());
    RuleMatch::analysis(
        item.rule_id,
        item.confidence,
        item.rationale,
        format!("Fix withheld below confidence {floor:.2}"),
        format!("A fix was found ({description}) but its confidence is too low to propose."),
    )
}
