//! Errors raised by the application rather than the test

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use async_trait::async_trait;
use heal_model::RuleMatch;
use once_cell::sync::Lazy;
use regex::Regex;

const RULE_ID: &str = "application-error";

static APP_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(uncaught|unhandled promise rejection|pageerror|status of 5\d\d)")
        .expect("valid regex")
});

/// Uncaught page errors and server 5xx responses in console or error text
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationErrorMatcher;

#[async_trait]
impl RuleMatcher for ApplicationErrorMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        let Some(line) = ctx.text.lines().find(|line| APP_ERROR.is_match(line)) else {
            return Ok(None);
        };
        let line = line.trim();

        Ok(Some(RuleMatch::analysis(
            RULE_ID,
            0.55,
            format!("Application reported an error: {line}"),
            "The application under test failed",
            "An uncaught exception or a server error was logged during the run. \
             The test is likely reporting a real defect; fix the application \
             before changing the test.",
        )))
    }
}
