//! Locator never resolved
//!
//! The DOM snapshot decides between "element was there, the wait was the
//! problem" (analysis) and "element is gone" (heal, when a renamed test id
//! can be pinned down).

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use async_trait::async_trait;
use heal_dom::{extract_selector_from_error, SelectorCheck, SelectorMatcher};
use heal_model::{HealTarget, PatchOperation, PatchPlan, RuleMatch, TargetKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

const RULE_ID: &str = "locator-not-found";

static LOCATOR_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(waiting for (?:locator|selector)|locator\.\w+: timeout|locator\.waitfor|element\(s\) not found)",
    )
    .expect("valid regex")
});

/// Test-id similarity floor for proposing a rename
const MIN_SIMILARITY: f64 = 0.5;

/// Locator timeouts and missing elements
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorNotFoundMatcher;

#[async_trait]
impl RuleMatcher for LocatorNotFoundMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        let text = &ctx.text;
        if !LOCATOR_FAILURE.is_match(text)
            || text.contains("strict mode violation")
            || text.contains("page.goto:")
            || is_assertion_on_resolved_element(text)
        {
            return Ok(None);
        }

        let Some(selector) = extract_selector_from_error(text) else {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.3,
                "Locator failure reported without an identifiable selector",
                "Locator failed; selector unknown",
                "The error mentions a locator wait but no selector could be extracted, \
                 so presence in the DOM could not be checked.",
            )));
        };

        let check = ctx.check_selector(RULE_ID, &selector).await?;

        if check.exists() {
            return Ok(Some(present_but_slow(&selector, &check)));
        }
        if !check.verified() {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.25,
                format!("No extracted trace to verify `{selector}` against"),
                format!("Could not verify whether `{selector}` was rendered"),
                "No DOM snapshots were available for this run. Re-run with tracing \
                 enabled to distinguish a missing element from a slow one.",
            )));
        }

        let matcher = SelectorMatcher::parse(&selector);
        if let Some(old_id) = matcher.test_id() {
            let ids = ctx
                .dom()
                .collect_test_ids(ctx.evidence)
                .await
                .map_err(|e| RuleError::dom(RULE_ID, e))?;
            if let Some(found) = propose_rename(ctx, old_id, &ids, &check) {
                return Ok(Some(found));
            }
        }

        Ok(Some(RuleMatch::analysis(
            RULE_ID,
            0.5,
            format!(
                "`{selector}` absent from all {} readable snapshots",
                check.snapshots_read
            ),
            format!("Element `{selector}` was never rendered"),
            "The element is confirmed missing from the captured DOM and no safe \
             replacement selector was found. Check whether the markup changed or \
             the page under test is the wrong one.",
        )))
    }
}

/// `expect(locator).…` failures whose element did resolve; the call log
/// still says "waiting for locator", but the assertion is what failed
fn is_assertion_on_resolved_element(text: &str) -> bool {
    text.contains("expect(locator).") && !text.contains("element(s) not found")
}

fn present_but_slow(selector: &str, check: &SelectorCheck) -> RuleMatch {
    let snapshot = check
        .matched_snapshot
        .as_ref()
        .map_or_else(String::new, |p| format!(" (first seen in {})", p.display()));
    RuleMatch::analysis(
        RULE_ID,
        0.6,
        format!("`{selector}` is present in the DOM snapshot{snapshot}"),
        format!("Element `{selector}` exists; the wait timed out"),
        "The element was rendered during the run, so the selector is right. \
         The failure is more likely timing, visibility or an overlay. Prefer an \
         explicit wait on the state the test needs over changing the selector.",
    )
}

fn propose_rename(
    ctx: &MatchContext<'_>,
    old_id: &str,
    ids: &BTreeSet<String>,
    check: &SelectorCheck,
) -> Option<RuleMatch> {
    let new_id = closest_test_id(old_id, ids)?;
    let line = ctx.failing_line()?;
    if !line.contains(old_id) {
        return None;
    }

    let file = ctx.source_file();
    let replaced = line.replacen(old_id, &new_id, 1);
    let plan = PatchPlan::new(
        format!("Rename test id '{old_id}' to '{new_id}' in {file}"),
        format!(
            "'{old_id}' is absent from {} snapshots while the similar '{new_id}' is present",
            check.snapshots_read
        ),
        vec![PatchOperation::replace_text(file, line, replaced)],
    );

    Some(RuleMatch::heal(
        RULE_ID,
        0.75,
        format!("Test id '{old_id}' appears to have been renamed to '{new_id}'"),
        plan,
        HealTarget::new(TargetKind::Selector, old_id, new_id),
    ))
}

/// The single most similar test id, by shared `-`/`_` separated tokens
///
/// `None` when nothing clears the similarity floor or the best score is tied.
#[must_use]
pub fn closest_test_id(old_id: &str, ids: &BTreeSet<String>) -> Option<String> {
    let old_tokens = tokens(old_id);
    let mut best: Option<(f64, &String)> = None;
    let mut tied = false;

    for id in ids.iter().filter(|id| id.as_str() != old_id) {
        let score = jaccard(&old_tokens, &tokens(id));
        if score < MIN_SIMILARITY {
            continue;
        }
        match best {
            Some((top, _)) if (score - top).abs() < f64::EPSILON => tied = true,
            Some((top, _)) if score < top => {}
            _ => {
                best = Some((score, id));
                tied = false;
            }
        }
    }

    if tied {
        return None;
    }
    best.map(|(_, id)| id.clone())
}

fn tokens(id: &str) -> BTreeSet<String> {
    id.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
