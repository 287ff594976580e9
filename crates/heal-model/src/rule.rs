//! Rule matches
//!
//! A [`RuleMatch`] is one finding from one matcher. It carries exactly one
//! of a patch plan or an analysis payload; the [`RuleOutcome`] sum type makes
//! the pair unrepresentable.

use crate::patch::PatchPlan;
use serde::{Deserialize, Serialize};

/// Subtype tag on analysis items emitted when acceptance criteria veto a heal
pub const REQUIREMENT_MISMATCH: &str = "requirement-mismatch";

/// One diagnosis finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    /// Id of the matcher that produced this finding
    pub rule_id: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Why the matcher fired
    pub rationale: String,
    /// Patch plan or analysis payload
    #[serde(flatten)]
    pub outcome: RuleOutcome,
    /// Bookkeeping tag, e.g. [`REQUIREMENT_MISMATCH`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// What a heal moves away from and toward; read by suppression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<HealTarget>,
}

impl RuleMatch {
    /// Create a heal finding
    #[must_use]
    pub fn heal(
        rule_id: impl Into<String>,
        confidence: f64,
        rationale: impl Into<String>,
        plan: PatchPlan,
        target: HealTarget,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
            outcome: RuleOutcome::PatchPlan(plan),
            subtype: None,
            target: Some(target),
        }
    }

    /// Create an analysis-only finding
    #[must_use]
    pub fn analysis(
        rule_id: impl Into<String>,
        confidence: f64,
        rationale: impl Into<String>,
        summary: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
            outcome: RuleOutcome::AnalysisOnly(AnalysisOnly {
                summary: summary.into(),
                details: details.into(),
            }),
            subtype: None,
            target: None,
        }
    }

    /// With subtype tag
    #[inline]
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Whether this finding carries a patch plan
    #[inline]
    #[must_use]
    pub fn is_heal(&self) -> bool {
        matches!(self.outcome, RuleOutcome::PatchPlan(_))
    }

    /// Patch plan, if this is a heal
    #[inline]
    #[must_use]
    pub fn patch_plan(&self) -> Option<&PatchPlan> {
        match &self.outcome {
            RuleOutcome::PatchPlan(plan) => Some(plan),
            RuleOutcome::AnalysisOnly(_) => None,
        }
    }

    /// Analysis payload, if this is analysis-only
    #[inline]
    #[must_use]
    pub fn analysis_only(&self) -> Option<&AnalysisOnly> {
        match &self.outcome {
            RuleOutcome::AnalysisOnly(analysis) => Some(analysis),
            RuleOutcome::PatchPlan(_) => None,
        }
    }

    /// Whether this is a requirement-mismatch suppression item
    #[inline]
    #[must_use]
    pub fn is_requirement_mismatch(&self) -> bool {
        self.subtype.as_deref() == Some(REQUIREMENT_MISMATCH)
    }
}

/// Exactly one of a fix or an explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOutcome {
    /// A proposed fix
    PatchPlan(PatchPlan),
    /// No safe fix found
    AnalysisOnly(AnalysisOnly),
}

/// Human-readable diagnostic with no automatic fix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOnly {
    /// One-line summary
    pub summary: String,
    /// Longer explanation
    pub details: String,
}

/// The value a heal changes and what it changes it to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealTarget {
    /// What kind of value is being changed
    pub kind: TargetKind,
    /// Value the test currently asserts or uses
    pub current: String,
    /// Value the heal would put in its place
    pub proposed: String,
}

impl HealTarget {
    /// Create target
    #[inline]
    #[must_use]
    pub fn new(kind: TargetKind, current: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self {
            kind,
            current: current.into(),
            proposed: proposed.into(),
        }
    }
}

/// Kind of value a heal changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// An element selector
    Selector,
    /// Text the test expects to see
    ExpectedText,
}
