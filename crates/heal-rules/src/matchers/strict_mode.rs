//! Strict mode violations: a locator resolved to more than one element

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use async_trait::async_trait;
use heal_model::{HealTarget, PatchOperation, PatchPlan, RuleMatch, TargetKind};
use once_cell::sync::Lazy;
use regex::Regex;

const RULE_ID: &str = "strict-mode-violation";

static STRICT_VIOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"strict mode violation: ((?:locator|getBy\w+)\([^\n]*?\)) resolved to (\d+) elements")
        .expect("valid regex")
});

/// Ambiguous locators
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictModeMatcher;

#[async_trait]
impl RuleMatcher for StrictModeMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        let Some(caps) = STRICT_VIOLATION.captures(&ctx.text) else {
            return Ok(None);
        };
        let call = caps.get(1).map_or("", |m| m.as_str());
        let count = caps.get(2).map_or("", |m| m.as_str());

        let line = ctx
            .failing_line()
            .filter(|line| line.contains(call) && !line.contains(&format!("{call}.first()")));

        let Some(line) = line else {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.4,
                format!("{call} matched {count} elements"),
                "Locator is ambiguous",
                "The locator matched several elements and the failing source line \
                 could not be located. Narrow the locator with a test id, a role \
                 with a name, or a parent scope.",
            )));
        };

        let narrowed = format!("{call}.first()");
        let fixed = line.replacen(call, &narrowed, 1);
        let file = ctx.source_file();
        let plan = PatchPlan::new(
            format!("Pin {call} to its first match in {file}"),
            format!("{call} resolved to {count} elements"),
            vec![PatchOperation::replace_text(file, line, fixed)],
        );

        Ok(Some(RuleMatch::heal(
            RULE_ID,
            0.65,
            format!("{call} matched {count} elements; the test expects one"),
            plan,
            HealTarget::new(TargetKind::Selector, call, narrowed),
        )))
    }
}
