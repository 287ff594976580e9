//! Helpers for reading runner output
//!
//! Runner errors carry a code frame (`> 12 |   await page.goto('/')`) and a
//! stack; together they tell us which source line failed and in which file.

use heal_model::{EvidencePacket, FailureContext};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static CODE_FRAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*>\s*\d+\s*\|(.*)$").expect("valid regex"));

static STACK_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*at\s+(?:[^\n(]*\()?((?:[A-Za-z]:)?[^\s():]+\.(?:ts|tsx|js|jsx|mjs|cjs)):\d+(?::\d+)?\)?")
        .expect("valid regex")
});

/// Everything a matcher may pattern-match on, newline-joined
///
/// Error message, stack trace, the collector's error message, console lines
/// and attachment paths, in that order.
#[must_use]
pub fn combined_text(failure: &FailureContext, evidence: &EvidencePacket) -> String {
    let mut parts: Vec<&str> = vec![&failure.error_message, &failure.stack_trace];
    if let Some(message) = evidence.error_message.as_deref() {
        parts.push(message);
    }
    parts.extend(evidence.console_lines().iter().map(String::as_str));
    parts.extend(evidence.attachments().iter().map(|a| a.path.as_str()));

    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The source line the runner's code frame points at, trimmed
#[must_use]
pub fn failing_line(text: &str) -> Option<String> {
    CODE_FRAME_LINE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|line| !line.is_empty())
}

/// Repo-relative path of the first user-code stack frame
///
/// Frames inside `node_modules` and absolute paths outside `repo_root` are
/// skipped. Separators are normalized to `/`.
#[must_use]
pub fn source_file(text: &str, repo_root: &Path) -> Option<String> {
    STACK_FRAME
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|path| !path.contains("node_modules"))
        .find_map(|path| relativize(path, repo_root))
}

fn relativize(path: &str, repo_root: &Path) -> Option<String> {
    let candidate = Path::new(path);
    let relative = if candidate.is_absolute() {
        candidate.strip_prefix(repo_root).ok()?
    } else {
        candidate
    };
    let normalized = relative.to_string_lossy().replace('\\', "/");
    Some(normalized.trim_start_matches("./").to_string())
}

/// Quote `value` the way `quote` quotes, escaping that quote character
#[must_use]
pub fn quoted(value: &str, quote: char) -> String {
    let escaped = value.replace(quote, &format!("\\{quote}"));
    format!("{quote}{escaped}{quote}")
}

/// Find `value` as a quoted string literal in `line`
///
/// Returns the literal as written and its quote character.
#[must_use]
pub fn find_quoted_literal(line: &str, value: &str) -> Option<(String, char)> {
    ['\'', '"', '`'].into_iter().find_map(|quote| {
        let literal = quoted(value, quote);
        line.contains(&literal).then_some((literal, quote))
    })
}
