//! Selector existence checks against extracted trace snapshots

use crate::error::DomError;
use crate::selector::{test_ids_in, SelectorMatcher};
use crate::snapshot::scan_snapshots;
use heal_fs::FileSystem;
use heal_model::EvidencePacket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default cap on fallback-stage snapshot candidates
pub const DEFAULT_SCAN_CAP: usize = 50;

const EXTRACTED_SUBDIR: [&str; 2] = ["evidence", "trace-extracted"];

/// Whether a selector was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectorStatus {
    /// Seen in at least one snapshot
    Exists,
    /// Not seen, or nothing to look at
    NotExists,
}

/// Result of one existence check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorCheck {
    /// Found or not
    pub status: SelectorStatus,
    /// Snapshot files successfully read
    pub snapshots_read: usize,
    /// Snapshot files considered
    pub snapshots_scanned: usize,
    /// Extracted trace directory that was inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_dir: Option<PathBuf>,
    /// Snapshot the selector was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_snapshot: Option<PathBuf>,
}

impl SelectorCheck {
    /// The "no usable data" answer
    #[must_use]
    pub fn unverified() -> Self {
        Self {
            status: SelectorStatus::NotExists,
            snapshots_read: 0,
            snapshots_scanned: 0,
            trace_dir: None,
            matched_snapshot: None,
        }
    }

    /// Found in a snapshot
    #[inline]
    #[must_use]
    pub fn exists(&self) -> bool {
        self.status == SelectorStatus::Exists
    }

    /// At least one snapshot backed the answer
    #[inline]
    #[must_use]
    pub fn verified(&self) -> bool {
        self.snapshots_read > 0
    }

    /// Snapshots were read and the selector was in none of them
    #[inline]
    #[must_use]
    pub fn confirmed_absent(&self) -> bool {
        !self.exists() && self.verified()
    }
}

/// Looks up selectors in DOM snapshots from an extracted trace
#[derive(Debug, Clone)]
pub struct DomInspector {
    fs: Arc<dyn FileSystem>,
    repo_root: PathBuf,
    scan_cap: usize,
}

impl DomInspector {
    /// Create inspector resolving relative evidence paths against `repo_root`
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            repo_root: repo_root.into(),
            scan_cap: DEFAULT_SCAN_CAP,
        }
    }

    /// With fallback-stage candidate cap
    #[inline]
    #[must_use]
    pub fn with_scan_cap(mut self, cap: usize) -> Self {
        self.scan_cap = cap;
        self
    }

    /// Check whether `selector` appears in the run's DOM snapshots
    ///
    /// # Errors
    /// - `DomError::NoReadableSnapshots` if a trace directory exists but no
    ///   snapshot in it could be read
    /// - `DomError::Scan` if enumeration fails
    pub async fn check_selector(
        &self,
        selector: &str,
        evidence: &EvidencePacket,
    ) -> Result<SelectorCheck, DomError> {
        let Some(dir) = self.locate_trace_dir(evidence).await else {
            tracing::debug!(selector, "no extracted trace; selector unverified");
            return Ok(SelectorCheck::unverified());
        };

        let matcher = SelectorMatcher::parse(selector);
        let stats = scan_snapshots(self.fs.as_ref(), &dir, self.scan_cap, |_, html| {
            matcher.matches(html)
        })
        .await?;

        if stats.read == 0 {
            tracing::error!(
                dir = %dir.display(),
                scanned = stats.scanned,
                "extracted trace has no readable snapshots"
            );
            return Err(DomError::NoReadableSnapshots {
                dir,
                scanned: stats.scanned,
            });
        }

        let status = if stats.stopped_at.is_some() {
            SelectorStatus::Exists
        } else {
            SelectorStatus::NotExists
        };
        tracing::debug!(
            selector,
            ?status,
            read = stats.read,
            scanned = stats.scanned,
            "selector check"
        );

        Ok(SelectorCheck {
            status,
            snapshots_read: stats.read,
            snapshots_scanned: stats.scanned,
            trace_dir: Some(dir),
            matched_snapshot: stats.stopped_at,
        })
    }

    /// Every `data-testid` value in the run's snapshots
    ///
    /// Empty when there is no extracted trace.
    ///
    /// # Errors
    /// Same strictness as [`Self::check_selector`].
    pub async fn collect_test_ids(
        &self,
        evidence: &EvidencePacket,
    ) -> Result<BTreeSet<String>, DomError> {
        let Some(dir) = self.locate_trace_dir(evidence).await else {
            return Ok(BTreeSet::new());
        };

        let mut ids = BTreeSet::new();
        let stats = scan_snapshots(self.fs.as_ref(), &dir, self.scan_cap, |_, html| {
            ids.extend(test_ids_in(html));
            false
        })
        .await?;

        if stats.read == 0 {
            return Err(DomError::NoReadableSnapshots {
                dir,
                scanned: stats.scanned,
            });
        }
        Ok(ids)
    }

    /// Find the extracted trace directory for this evidence
    ///
    /// Tried in order: `extractedTraceDir`, an `evidence/trace-extracted`
    /// directory next to (or inside) each source path, then one next to the
    /// first trace archive. `None` if the trace was never extracted.
    pub async fn locate_trace_dir(&self, evidence: &EvidencePacket) -> Option<PathBuf> {
        let meta = &evidence.collection_metadata;
        if !meta.trace_extracted {
            return None;
        }

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(dir) = meta.extracted_trace_dir.as_deref() {
            candidates.push(self.absolute(Path::new(dir)));
        }
        for source in &meta.source_paths {
            let source = self.absolute(Path::new(source));
            candidates.push(extracted_under(&source));
            if let Some(parent) = source.parent() {
                candidates.push(extracted_under(parent));
            }
        }
        if let Some(trace) = evidence.traces.first() {
            if let Some(parent) = self.absolute(Path::new(trace)).parent() {
                candidates.push(extracted_under(parent));
            }
        }

        for candidate in candidates {
            if self.fs.is_dir(&candidate).await {
                return Some(candidate);
            }
        }
        tracing::debug!("trace marked extracted but no directory found");
        None
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }
}

fn extracted_under(base: &Path) -> PathBuf {
    EXTRACTED_SUBDIR.iter().fold(base.to_path_buf(), |p, part| p.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heal_model::CollectionMetadata;
    use heal_test_utils::{evidence_with_trace_dir, evidence_without_trace, MemoryFs};

    fn inspector(fs: MemoryFs) -> DomInspector {
        DomInspector::new(Arc::new(fs), "/repo")
    }

    #[tokio::test]
    async fn no_extracted_trace_is_conservative_not_exists() {
        let check = inspector(MemoryFs::new())
            .check_selector("#x", &evidence_without_trace())
            .await
            .unwrap();
        assert_eq!(check, SelectorCheck::unverified());
        assert!(!check.verified());
    }

    #[tokio::test]
    async fn extracted_flag_without_directory_is_conservative() {
        let evidence = evidence_with_trace_dir("/repo/missing");
        let check = inspector(MemoryFs::new())
            .check_selector("#x", &evidence)
            .await
            .unwrap();
        assert_eq!(check.status, SelectorStatus::NotExists);
        assert_eq!(check.snapshots_scanned, 0);
    }

    #[tokio::test]
    async fn directory_with_only_non_html_files_is_an_error() {
        let fs = MemoryFs::new()
            .with_file("/repo/ev/trace.trace", "{}")
            .with_file("/repo/ev/network.json", "[]");
        let err = inspector(fs)
            .check_selector(r#"[data-testid="app-ready"]"#, &evidence_with_trace_dir("/repo/ev"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomError::NoReadableSnapshots { .. }));
    }

    #[tokio::test]
    async fn single_snapshot_with_test_id_exists() {
        let fs = MemoryFs::new()
            .with_file("/repo/ev/trace.trace", "{}")
            .with_file("/repo/ev/snap.html", r#"<div data-testid="app-ready"></div>"#);
        let check = inspector(fs)
            .check_selector(r#"[data-testid="app-ready"]"#, &evidence_with_trace_dir("/repo/ev"))
            .await
            .unwrap();
        assert!(check.exists());
        assert!(check.snapshots_read >= 1);
        assert_eq!(check.matched_snapshot, Some(PathBuf::from("/repo/ev/snap.html")));
    }

    #[tokio::test]
    async fn repeated_checks_are_identical() {
        let fs = MemoryFs::new()
            .with_file("/repo/ev/resources/a.html", "<html><p id='x'></p></html>")
            .with_file("/repo/ev/page@2.html", "<html></html>");
        let inspector = inspector(fs);
        let evidence = evidence_with_trace_dir("/repo/ev");

        let first = inspector.check_selector("#missing", &evidence).await.unwrap();
        let second = inspector.check_selector("#missing", &evidence).await.unwrap();
        assert_eq!(first, second);
        assert!(first.confirmed_absent());
        assert_eq!(first.snapshots_read, 2);
    }

    #[tokio::test]
    async fn derives_directory_from_source_paths_then_traces() {
        let fs = MemoryFs::new().with_file(
            "/repo/results/login/evidence/trace-extracted/resources/s.html",
            "<html><b class='toast'></b></html>",
        );
        let inspector = inspector(fs);

        let from_sources = EvidencePacket {
            collection_metadata: CollectionMetadata {
                trace_extracted: true,
                source_paths: vec!["results/login/trace.zip".to_string()],
                ..CollectionMetadata::default()
            },
            ..EvidencePacket::default()
        };
        assert_eq!(
            inspector.locate_trace_dir(&from_sources).await,
            Some(PathBuf::from("/repo/results/login/evidence/trace-extracted"))
        );

        let from_trace = EvidencePacket {
            traces: vec!["results/login/trace.zip".to_string()],
            collection_metadata: CollectionMetadata {
                trace_extracted: true,
                ..CollectionMetadata::default()
            },
            ..EvidencePacket::default()
        };
        let check = inspector.check_selector(".toast", &from_trace).await.unwrap();
        assert!(check.exists());
    }

    #[tokio::test]
    async fn collects_test_ids_across_snapshots() {
        let fs = MemoryFs::new()
            .with_file("/repo/ev/resources/a.html", r#"<html data-testid="login-form"></html>"#)
            .with_file("/repo/ev/page@1.html", r#"<html data-testid="submit-button"></html>"#);
        let ids = inspector(fs)
            .collect_test_ids(&evidence_with_trace_dir("/repo/ev"))
            .await
            .unwrap();
        assert!(ids.contains("login-form"));
        assert!(ids.contains("submit-button"));
    }

    #[tokio::test]
    async fn real_directory_strictness() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("trace.network"), "x").unwrap();
        let inspector = DomInspector::new(Arc::new(heal_fs::LocalFs::new()), dir.path());
        let evidence = evidence_with_trace_dir(dir.path());

        assert!(inspector
            .check_selector(r#"[data-testid="app-ready"]"#, &evidence)
            .await
            .is_err());

        std::fs::write(
            dir.path().join("snapshot.html"),
            r#"<!DOCTYPE html><div data-testid="app-ready"></div>"#,
        )
        .unwrap();
        let check = inspector
            .check_selector(r#"[data-testid="app-ready"]"#, &evidence)
            .await
            .unwrap();
        assert_eq!(check.status, SelectorStatus::Exists);
        assert!(check.snapshots_read >= 1);
    }
}
