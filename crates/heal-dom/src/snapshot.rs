//! Snapshot discovery inside an extracted trace directory
//!
//! Three stages, most specific first:
//! 1. `*.html` under a `resources/` directory
//! 2. `page@*.html` / `src@*.html` anywhere
//! 3. any other `*.html` that looks like markup, first `cap` candidates only

use crate::error::DomError;
use heal_fs::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const RESOURCE_PATTERNS: &[&str] = &["**/resources/**/*.html"];
const NAMED_PATTERNS: &[&str] = &["**/page@*.html", "**/src@*.html"];
const FALLBACK_PATTERNS: &[&str] = &["**/*.html"];

/// Whether `content` is plausibly an HTML document or fragment
#[must_use]
pub fn looks_like_markup(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<!doctype") || lower.contains("<div")
}

/// Counters from one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Candidate files considered
    pub(crate) scanned: usize,
    /// Candidate files read and accepted as HTML
    pub(crate) read: usize,
    /// Snapshot where the visitor asked to stop
    pub(crate) stopped_at: Option<PathBuf>,
}

/// Walk snapshots in discovery order, handing each readable one to `visit`
///
/// `visit` returns `true` to stop the scan.
pub(crate) async fn scan_snapshots<F>(
    fs: &dyn FileSystem,
    dir: &Path,
    cap: usize,
    mut visit: F,
) -> Result<ScanStats, DomError>
where
    F: FnMut(&Path, &str) -> bool + Send,
{
    let mut stats = ScanStats::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for (stage, patterns) in [RESOURCE_PATTERNS, NAMED_PATTERNS].into_iter().enumerate() {
        for path in candidates(fs, dir, patterns, &mut seen).await? {
            stats.scanned += 1;
            let Some(html) = read_snapshot(fs, &path).await else {
                continue;
            };
            stats.read += 1;
            tracing::debug!(stage = stage + 1, path = %path.display(), "snapshot read");
            if visit(&path, &html) {
                stats.stopped_at = Some(path);
                return Ok(stats);
            }
        }
    }

    let remaining = candidates(fs, dir, FALLBACK_PATTERNS, &mut seen).await?;
    for path in remaining.into_iter().take(cap) {
        stats.scanned += 1;
        let Some(html) = read_snapshot(fs, &path).await else {
            continue;
        };
        if !looks_like_markup(&html) {
            tracing::debug!(path = %path.display(), "skipping non-markup html file");
            continue;
        }
        stats.read += 1;
        tracing::debug!(stage = 3, path = %path.display(), "snapshot read");
        if visit(&path, &html) {
            stats.stopped_at = Some(path);
            return Ok(stats);
        }
    }

    Ok(stats)
}

async fn candidates(
    fs: &dyn FileSystem,
    dir: &Path,
    patterns: &[&str],
    seen: &mut HashSet<PathBuf>,
) -> Result<Vec<PathBuf>, DomError> {
    let mut out = Vec::new();
    for pattern in patterns {
        for path in fs.glob(dir, pattern).await? {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }
    Ok(out)
}

async fn read_snapshot(fs: &dyn FileSystem, path: &Path) -> Option<String> {
    match fs.read_to_string(path).await {
        Ok(html) => Some(html),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "unreadable snapshot");
            None
        }
    }
}
