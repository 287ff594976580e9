//! `toHaveText` / `toContainText` mismatches
//!
//! When the expected value is a literal on the failing line, the heal
//! swaps it for what the page actually showed. Acceptance criteria get the
//! final say through suppression in the engine.

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use crate::text::{find_quoted_literal, quoted};
use async_trait::async_trait;
use heal_model::{HealTarget, PatchOperation, PatchPlan, RuleMatch, TargetKind};
use once_cell::sync::Lazy;
use regex::Regex;

const RULE_ID: &str = "text-assertion-mismatch";

static TEXT_ASSERTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"expect\(locator\)\.(toHaveText|toContainText)").expect("valid regex")
});

static EXPECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Expected(?: string| substring)?:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("valid regex")
});

static RECEIVED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Received(?: string)?:\s*"((?:[^"\\]|\\.)*)""#).expect("valid regex")
});

/// Rendered text differs from the asserted text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAssertionMatcher;

#[async_trait]
impl RuleMatcher for TextAssertionMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        let text = &ctx.text;
        let Some(assertion) = TEXT_ASSERTION.captures(text).and_then(|c| c.get(1)) else {
            return Ok(None);
        };
        let assertion = assertion.as_str();
        let (Some(expected), Some(received)) = (capture(&EXPECTED, text), capture(&RECEIVED, text))
        else {
            return Ok(None);
        };

        if received.is_empty() {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.45,
                format!("{assertion} received empty text while expecting \"{expected}\""),
                "Element rendered without text",
                "The element existed but had no text when the assertion ran. This \
                 usually means data had not loaded yet or the wrong element matched.",
            )));
        }

        let literal = ctx
            .failing_line()
            .and_then(|line| find_quoted_literal(&line, &expected).map(|found| (line, found)));

        let Some((line, (literal, quote))) = literal else {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.4,
                format!("{assertion} expected \"{expected}\" but received \"{received}\""),
                "Displayed text changed",
                "The expected value is not a literal on the failing line, so it \
                 cannot be updated in place. Check whether the copy change was \
                 intended.",
            )));
        };

        let fixed = line.replacen(&literal, &quoted(&received, quote), 1);
        let file = ctx.source_file();
        let plan = PatchPlan::new(
            format!("Update expected text in {file}"),
            format!("Page rendered \"{received}\" where the test expected \"{expected}\""),
            vec![PatchOperation::replace_text(file, line, fixed)],
        );

        Ok(Some(RuleMatch::heal(
            RULE_ID,
            0.6,
            format!("{assertion} expected \"{expected}\" but the page shows \"{received}\""),
            plan,
            HealTarget::new(TargetKind::ExpectedText, expected, received),
        )))
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{context, inspector};
    use heal_model::FailureContext;
    use heal_test_utils::{evidence_without_trace, MemoryFs};
    use pretty_assertions::assert_eq;

    fn mismatch(expected: &str, received: &str, line: &str) -> FailureContext {
        FailureContext::new("dash.spec.ts", "greets")
            .with_error(format!(
                "Error: Timed out 5000ms waiting for expect(locator).toHaveText(expected)\n\n\
Expected string: \"{expected}\"\nReceived string: \"{received}\"\n\n> 8 |   {line}\n"
            ))
            .with_stack("    at /repo/tests/dash.spec.ts:8:3")
    }

    async fn run(failure: &FailureContext) -> Option<RuleMatch> {
        let evidence = evidence_without_trace();
        let dom = inspector(MemoryFs::new());
        let ctx = context(failure, &evidence, &dom);
        TextAssertionMatcher.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn swaps_expected_literal_keeping_quote_style() {
        let failure = mismatch(
            "Welcome back",
            "Welcome back, Ada",
            "await expect(page.getByTestId('greeting')).toHaveText('Welcome back');",
        );
        let found = run(&failure).await.unwrap();

        assert_eq!(
            found.patch_plan().unwrap().operations,
            vec![PatchOperation::replace_text(
                "tests/dash.spec.ts",
                "await expect(page.getByTestId('greeting')).toHaveText('Welcome back');",
                "await expect(page.getByTestId('greeting')).toHaveText('Welcome back, Ada');",
            )]
        );
        assert_eq!(
            found.target,
            Some(HealTarget::new(TargetKind::ExpectedText, "Welcome back", "Welcome back, Ada"))
        );
    }

    #[tokio::test]
    async fn empty_received_is_analysis() {
        let failure = mismatch("Total: 3", "", "await expect(total).toHaveText('Total: 3');");
        let found = run(&failure).await.unwrap();
        assert!(!found.is_heal());
        assert!(found.rationale.contains("empty"));
    }

    #[tokio::test]
    async fn expected_not_on_line_is_analysis() {
        let failure = mismatch("Total: 3", "Total: 4", "await expect(total).toHaveText(label);");
        let found = run(&failure).await.unwrap();
        assert!(!found.is_heal());
    }

    #[tokio::test]
    async fn declines_other_assertions() {
        let failure = FailureContext::new("a.spec.ts", "t")
            .with_error("expect(received).toBe(expected)\n\nExpected: 1\nReceived: 2");
        assert!(run(&failure).await.is_none());
    }
}
