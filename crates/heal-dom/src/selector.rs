//! Selector shapes and how each is matched against snapshot HTML

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static TEST_ID_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[data-testid=(?:"([^"]*)"|'([^']*)')\]$"#).expect("valid regex")
});

static SIMPLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").expect("valid regex"));

static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

static TEST_ID_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-testid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// A selector compiled for matching against raw HTML
#[derive(Debug, Clone)]
pub enum SelectorMatcher {
    /// `[data-testid="x"]`: exact attribute value, either quote style
    TestId(String),
    /// `#id`: exact `id` attribute value
    Id { value: String, pattern: Regex },
    /// `.class`: word-boundary match inside any `class` attribute value
    Class { value: String, pattern: Regex },
    /// Anything else: substring search
    Raw(String),
}

impl SelectorMatcher {
    /// Classify and compile a selector
    #[must_use]
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim();

        if let Some(caps) = TEST_ID_SELECTOR.captures(selector) {
            let value = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str());
            return Self::TestId(value.to_string());
        }

        if let Some(id) = selector.strip_prefix('#').filter(|s| SIMPLE_NAME.is_match(s)) {
            let escaped = regex::escape(id);
            if let Ok(pattern) =
                Regex::new(&format!(r#"(?:^|\s)id\s*=\s*(?:"{escaped}"|'{escaped}')"#))
            {
                return Self::Id {
                    value: id.to_string(),
                    pattern,
                };
            }
        }

        if let Some(class) = selector.strip_prefix('.').filter(|s| SIMPLE_NAME.is_match(s)) {
            if let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(class))) {
                return Self::Class {
                    value: class.to_string(),
                    pattern,
                };
            }
        }

        Self::Raw(selector.to_string())
    }

    /// Whether the selector is present in `html`
    #[must_use]
    pub fn matches(&self, html: &str) -> bool {
        match self {
            Self::TestId(value) => {
                html.contains(&format!("data-testid=\"{value}\""))
                    || html.contains(&format!("data-testid='{value}'"))
            }
            Self::Id { pattern, .. } => pattern.is_match(html),
            Self::Class { pattern, .. } => CLASS_ATTR.captures_iter(html).any(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .is_some_and(|attr| pattern.is_match(attr.as_str()))
            }),
            Self::Raw(text) => !text.is_empty() && html.contains(text.as_str()),
        }
    }

    /// Test id value, for `[data-testid=...]` selectors
    #[must_use]
    pub fn test_id(&self) -> Option<&str> {
        match self {
            Self::TestId(value) => Some(value),
            _ => None,
        }
    }
}

/// Every `data-testid` value in `html`
#[must_use]
pub fn test_ids_in(html: &str) -> BTreeSet<String> {
    TEST_ID_ATTR
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
