//! Whole-test timeouts

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use async_trait::async_trait;
use heal_model::RuleMatch;
use once_cell::sync::Lazy;
use regex::Regex;

const RULE_ID: &str = "test-timeout";

static TEST_TIMEOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Test timeout of (\d+)ms exceeded").expect("valid regex"));

/// The test ran past its overall budget
#[derive(Debug, Clone, Copy, Default)]
pub struct TestTimeoutMatcher;

#[async_trait]
impl RuleMatcher for TestTimeoutMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        let Some(limit) = TEST_TIMEOUT.captures(&ctx.text).and_then(|c| c.get(1)) else {
            return Ok(None);
        };
        let limit = limit.as_str();

        let details = match ctx.failing_line() {
            Some(line) => format!(
                "The test exceeded {limit}ms while running `{line}`. Look at what that step \
                 waits for before raising the timeout."
            ),
            None => format!(
                "The test exceeded {limit}ms. The trace shows which step was still \
                 pending; raising the timeout only hides a slow dependency."
            ),
        };

        Ok(Some(RuleMatch::analysis(
            RULE_ID,
            0.35,
            format!("Test exceeded its {limit}ms timeout"),
            "Test ran out of time",
            details,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{context, inspector};
    use heal_model::FailureContext;
    use heal_test_utils::{evidence_without_trace, MemoryFs};

    #[tokio::test]
    async fn reports_limit_as_analysis() {
        let failure = FailureContext::new("slow.spec.ts", "slow")
            .with_error("Test timeout of 30000ms exceeded.\n\n> 4 |   await page.waitForTimeout(60000);");
        let evidence = evidence_without_trace();
        let dom = inspector(MemoryFs::new());
        let ctx = context(&failure, &evidence, &dom);

        let found = TestTimeoutMatcher.evaluate(&ctx).await.unwrap().unwrap();
        assert!(!found.is_heal());
        assert!(found.rationale.contains("30000ms"));
        assert!(found.analysis_only().unwrap().details.contains("waitForTimeout"));
    }
}
