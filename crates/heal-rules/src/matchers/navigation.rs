//! `page.goto` timeouts
//!
//! A navigation timeout never gets an automatic fix. When the app's ready
//! marker is in the DOM the page rendered and only the wait was too strict,
//! so the finding suggests waiting for `domcontentloaded` instead. When the
//! marker is confirmed absent the app never became ready and the test is
//! not at fault.

use crate::error::RuleError;
use crate::matcher::{MatchContext, RuleMatcher};
use async_trait::async_trait;
use heal_model::RuleMatch;
use once_cell::sync::Lazy;
use regex::Regex;

const RULE_ID: &str = "navigation-timeout";

/// Marker the app renders once it is interactive
pub const APP_READY_SELECTOR: &str = r#"[data-testid="app-ready"]"#;

static NAVIGATION_TIMEOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(page\.goto: timeout|navigating to "[^"\n]*", waiting until)"#)
        .expect("valid regex")
});

static SINGLE_ARG_GOTO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"page\.goto\(\s*('[^']*'|"[^"]*"|`[^`]*`)\s*\)"#).expect("valid regex")
});

/// Navigation that never reached its load state
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationTimeoutMatcher;

#[async_trait]
impl RuleMatcher for NavigationTimeoutMatcher {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    async fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Option<RuleMatch>, RuleError> {
        if !NAVIGATION_TIMEOUT.is_match(&ctx.text) {
            return Ok(None);
        }

        let check = ctx.check_selector(RULE_ID, APP_READY_SELECTOR).await?;

        if !check.verified() {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.3,
                "Navigation timed out and no DOM snapshots were captured",
                "Navigation timed out; page state unknown",
                "Without an extracted trace it is impossible to tell whether the app \
                 rendered before the timeout. Re-run with tracing enabled.",
            )));
        }

        if !check.exists() {
            return Ok(Some(RuleMatch::analysis(
                RULE_ID,
                0.6,
                format!(
                    "Ready marker absent from all {} readable snapshots",
                    check.snapshots_read
                ),
                "The app never became ready",
                "The page did not render its ready marker before the navigation \
                 timed out. Check the server, the base URL and any failing requests \
                 in the trace before changing the test.",
            )));
        }

        let suggestion = ctx
            .failing_line()
            .and_then(|line| relaxed_goto(&line).map(|fixed| (line, fixed)));
        let details = match suggestion {
            Some((line, fixed)) => format!(
                "The ready marker is present, so the page loaded far enough to use \
                 but the load event never fired. Consider changing\n  {}\nto\n  {}\n\
                 and then waiting for {APP_READY_SELECTOR} explicitly.",
                line.trim(),
                fixed.trim()
            ),
            None => format!(
                "The ready marker is present, so the page loaded far enough to use \
                 but the load event never fired. Consider waiting for \
                 'domcontentloaded' and then for {APP_READY_SELECTOR} explicitly."
            ),
        };

        Ok(Some(RuleMatch::analysis(
            RULE_ID,
            0.5,
            "App rendered its ready marker but page.goto waited for the load event",
            "The app rendered; navigation waited too long",
            details,
        )))
    }
}

/// Rewrite a single-argument `page.goto(url)` to wait for `domcontentloaded`
fn relaxed_goto(line: &str) -> Option<String> {
    if line.contains("waitUntil") {
        return None;
    }
    let caps = SINGLE_ARG_GOTO.captures(line)?;
    let whole = caps.get(0)?;
    let url = caps.get(1)?.as_str();
    Some(format!(
        "{}page.goto({url}, {{ waitUntil: 'domcontentloaded' }}){}",
        &line[..whole.start()],
        &line[whole.end()..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::{context, inspector};
    use heal_model::FailureContext;
    use heal_test_utils::{evidence_with_trace_dir, evidence_without_trace, MemoryFs};
    use pretty_assertions::assert_eq;

    const GOTO_TIMEOUT: &str = "Error: page.goto: Timeout 30000ms exceeded.\n\
Call log:\n  - navigating to \"http://localhost:3000/\", waiting until \"load\"\n\n\
> 11 |   await page.goto('/');\n";

    fn failure() -> FailureContext {
        FailureContext::new("home.spec.ts", "home loads")
            .with_error(GOTO_TIMEOUT)
            .with_stack("    at /repo/tests/home.spec.ts:11:14")
    }

    fn ready_snapshot() -> MemoryFs {
        MemoryFs::new().with_file(
            "/repo/ev/page@1.html",
            r#"<html><main data-testid="app-ready"></main></html>"#,
        )
    }

    #[test]
    fn relaxed_goto_rewrites_single_argument_calls() {
        assert_eq!(
            relaxed_goto("await page.goto('/');"),
            Some("await page.goto('/', { waitUntil: 'domcontentloaded' });".to_string())
        );
        assert_eq!(
            relaxed_goto("await page.goto(`${base}/cart`);"),
            Some("await page.goto(`${base}/cart`, { waitUntil: 'domcontentloaded' });".to_string())
        );
        assert_eq!(relaxed_goto("await page.goto('/', { waitUntil: 'load' });"), None);
        assert_eq!(relaxed_goto("await page.goto(url);"), None);
    }

    #[tokio::test]
    async fn ready_marker_present_is_analysis_with_suggestion() {
        let failure = failure();
        let evidence = evidence_with_trace_dir("/repo/ev");
        let dom = inspector(ready_snapshot());
        let ctx = context(&failure, &evidence, &dom);

        let found = NavigationTimeoutMatcher.evaluate(&ctx).await.unwrap().unwrap();
        assert!(!found.is_heal());
        assert!(found.patch_plan().is_none());
        assert!(found.target.is_none());
        assert!((found.confidence - 0.5).abs() < f64::EPSILON);
        let details = &found.analysis_only().unwrap().details;
        assert!(details.contains("await page.goto('/', { waitUntil: 'domcontentloaded' });"));
    }

    #[tokio::test]
    async fn ready_marker_absent_is_analysis() {
        let failure = failure();
        let evidence = evidence_with_trace_dir("/repo/ev");
        let dom = inspector(MemoryFs::new().with_file("/repo/ev/page@1.html", "<html></html>"));
        let ctx = context(&failure, &evidence, &dom);

        let found = NavigationTimeoutMatcher.evaluate(&ctx).await.unwrap().unwrap();
        assert!(!found.is_heal());
        assert!((found.confidence - 0.6).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn no_trace_is_low_confidence_analysis() {
        let failure = failure();
        let evidence = evidence_without_trace();
        let dom = inspector(MemoryFs::new());
        let ctx = context(&failure, &evidence, &dom);

        let found = NavigationTimeoutMatcher.evaluate(&ctx).await.unwrap().unwrap();
        assert!(!found.is_heal());
        assert!(found.confidence <= 0.3);
    }

    #[tokio::test]
    async fn goto_with_options_gets_generic_advice() {
        let failure = FailureContext::new("home.spec.ts", "home loads").with_error(
            "Error: page.goto: Timeout 30000ms exceeded.\n\
> 11 |   await page.goto('/', { timeout: 5000 });\n",
        );
        let evidence = evidence_with_trace_dir("/repo/ev");
        let dom = inspector(ready_snapshot());
        let ctx = context(&failure, &evidence, &dom);

        let found = NavigationTimeoutMatcher.evaluate(&ctx).await.unwrap().unwrap();
        assert!(!found.is_heal());
        let details = &found.analysis_only().unwrap().details;
        assert!(!details.contains("Consider changing"));
        assert!(details.contains("'domcontentloaded'"));
    }

    #[tokio::test]
    async fn ignores_locator_timeouts() {
        let failure = FailureContext::new("a.spec.ts", "t")
            .with_error("Error: locator.click: Timeout 30000ms exceeded.");
        let evidence = evidence_without_trace();
        let dom = inspector(MemoryFs::new());
        let ctx = context(&failure, &evidence, &dom);
        assert!(NavigationTimeoutMatcher.evaluate(&ctx).await.unwrap().is_none());
    }
}
