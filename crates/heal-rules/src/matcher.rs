//! Matcher trait and the per-run context it reads

use crate::error::RuleError;
use crate::text;
use async_trait::async_trait;
use heal_dom::{DomInspector, SelectorCheck};
use heal_model::{EvidencePacket, FailureContext, RuleMatch};
use std::path::Path;

/// Read-only view of one failure, shared by every matcher in a run
#[derive(Debug)]
pub struct MatchContext<'a> {
    /// Failing test
    pub failure: &'a FailureContext,
    /// Collected evidence
    pub evidence: &'a EvidencePacket,
    /// Combined text blob, see [`text::combined_text`]
    pub text: String,
    dom: &'a DomInspector,
    repo_root: &'a Path,
}

impl<'a> MatchContext<'a> {
    /// Build context for one failure
    #[must_use]
    pub fn new(
        failure: &'a FailureContext,
        evidence: &'a EvidencePacket,
        dom: &'a DomInspector,
        repo_root: &'a Path,
    ) -> Self {
        Self {
            text: text::combined_text(failure, evidence),
            failure,
            evidence,
            dom,
            repo_root,
        }
    }

    /// DOM inspector for existence checks
    #[inline]
    #[must_use]
    pub fn dom(&self) -> &DomInspector {
        self.dom
    }

    /// Source line the runner's code frame points at
    #[must_use]
    pub fn failing_line(&self) -> Option<String> {
        text::failing_line(&self.text)
    }

    /// File a fix should target: first user stack frame, else the spec file
    #[must_use]
    pub fn source_file(&self) -> String {
        text::source_file(&self.failure.stack_trace, self.repo_root)
            .or_else(|| text::source_file(&self.text, self.repo_root))
            .unwrap_or_else(|| self.failure.test_file.clone())
    }

    /// Check a selector, tagging DOM errors with the asking rule
    ///
    /// # Errors
    /// `RuleError::Dom` when the inspector refuses to answer.
    pub async fn check_selector(
        &self,
        rule_id: &str,
        selector: &str,
    ) -> Result<SelectorCheck, RuleError> {
        self.dom
            .check_selector(selector, self.evidence)
            .await
            .map_err(|e| RuleError::dom(rule_id, e))
    }
}

/// An independent failure-pattern detector
///
/// A matcher declines with `Ok(None)`, explains with an analysis-only
/// [`RuleMatch`], or proposes a fix with a patch-plan [`RuleMatch`].
#[async_trait]
pub trait RuleMatcher: Send + Sync + std::fmt::Debug {
    /// Stable rule id
    fn id(&self) -> &'static str;

    /// Inspect one failure
    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError>;
}
