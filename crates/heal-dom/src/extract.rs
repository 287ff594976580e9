//! Selector extraction from runner error text

use once_cell::sync::Lazy;
use regex::Regex;

/// Extraction patterns, strictest first. Order is load-bearing: a looser
/// pattern only gets a say when every earlier one missed.
static PATTERNS: Lazy<[Regex; 5]> = Lazy::new(|| {
    [
        // locator: div.card[data-state="open"]
        Regex::new(r"locator:\s*([^\n]*?\[[^\]\n]*\])").expect("valid regex"),
        // locator('#submit')
        Regex::new(r"locator\('([^'\n]+)'\)").expect("valid regex"),
        // locator.waitFor('#submit')
        Regex::new(r#"locator\.waitFor\(['"]([^'"\n]+)['"]\)"#).expect("valid regex"),
        // waiting for locator("#submit")
        Regex::new(r#"waiting for locator\((?:"([^"\n]+)"|'([^'\n]+)')\)"#).expect("valid regex"),
        // [data-testid="app-ready"] anywhere
        Regex::new(r#"\[data-testid=(?:"[^"\n]*"|'[^'\n]*')\]"#).expect("valid regex"),
    ]
});

/// Pull the selector a runner error complains about
///
/// Returns the first match in priority order, or `None`.
#[must_use]
pub fn extract_selector_from_error(message: &str) -> Option<String> {
    PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(message)?;
        let found = caps
            .iter()
            .skip(1)
            .flatten()
            .next()
            .or_else(|| caps.get(0))?;
        let selector = found.as_str().trim();
        (!selector.is_empty()).then(|| selector.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_from_waiting_for_locator() {
        assert_eq!(
            extract_selector_from_error(r#"Timeout waiting for locator('[data-testid="app-ready"]')"#),
            Some(r#"[data-testid="app-ready"]"#.to_string())
        );
    }

    #[test]
    fn unrelated_message_yields_none() {
        assert_eq!(extract_selector_from_error("net::ERR_CONNECTION_REFUSED"), None);
    }

    #[test]
    fn locator_colon_form_wins_over_later_patterns() {
        let msg = "waiting for locator: div.card[data-state=\"open\"]\n  also locator('#other')";
        assert_eq!(
            extract_selector_from_error(msg),
            Some("div.card[data-state=\"open\"]".to_string())
        );
    }

    #[test]
    fn wait_for_form() {
        assert_eq!(
            extract_selector_from_error("locator.waitFor(\"#spinner\") timed out"),
            Some("#spinner".to_string())
        );
    }

    #[test]
    fn double_quoted_waiting_for_form() {
        assert_eq!(
            extract_selector_from_error(r#"  - waiting for locator(".toast")"#),
            Some(".toast".to_string())
        );
    }

    #[test]
    fn bare_test_id_is_last_resort() {
        assert_eq!(
            extract_selector_from_error("element [data-testid='cart-total'] never appeared"),
            Some("[data-testid='cart-total']".to_string())
        );
    }

    proptest! {
        #[test]
        fn single_quoted_locator_roundtrips(id in "[a-z][a-z0-9-]{0,20}") {
            let msg = format!("locator.click: Timeout 30000ms exceeded.\n  - waiting for locator('#{id}')");
            prop_assert_eq!(extract_selector_from_error(&msg), Some(format!("#{id}")));
        }

        #[test]
        fn text_without_locator_markers_never_extracts(text in "[a-zA-Z0-9 .,:]{0,80}") {
            prop_assume!(!text.contains("locator:"));
            prop_assert_eq!(extract_selector_from_error(&text), None);
        }
    }
}
