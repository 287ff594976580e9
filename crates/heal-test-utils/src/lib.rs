//! Testing utilities for the self-heal workspace
//!
//! Shared fakes, fixtures, and assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::Utc;
use heal_fs::{FileSystem, FsError, FsResult};
use heal_model::{
    AdoContext, AdoParent, CollectionMetadata, EvidencePacket, FailureContext, PatchOperation,
    PatchPlan, ProposalItem, ProposalSet, ProposalSource, RuleMatch,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Recorded mutating call on a [`MemoryFs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    Create(PathBuf),
    Write(PathBuf),
    Rename(PathBuf, PathBuf),
    Remove(PathBuf),
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    calls: Vec<FsCall>,
    failing_writes: BTreeSet<PathBuf>,
    partial_writes: BTreeSet<PathBuf>,
    failing_renames: BTreeSet<PathBuf>,
}

/// In-memory filesystem that records every mutating call
#[derive(Debug, Default)]
pub struct MemoryFs {
    state: Mutex<MemoryState>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.state.lock().files.insert(path.into(), contents.into());
    }

    pub fn mkdir(&self, path: impl Into<PathBuf>) {
        self.state.lock().dirs.insert(path.into());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.state.lock().files.get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.lock().files.keys().cloned().collect()
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.state.lock().calls.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, FsCall::Write(_)))
            .count()
    }

    /// Make every write to `path` fail with permission denied
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.state.lock().failing_writes.insert(path.into());
    }

    /// Make every write to `path` leave half the contents behind, then fail
    pub fn fail_writes_partially_to(&self, path: impl Into<PathBuf>) {
        self.state.lock().partial_writes.insert(path.into());
    }

    /// Make every rename onto `path` fail with permission denied
    pub fn fail_renames_to(&self, path: impl Into<PathBuf>) {
        self.state.lock().failing_renames.insert(path.into());
    }

    fn denied(path: &Path) -> FsError {
        FsError::io_error(path, std::io::Error::new(ErrorKind::PermissionDenied, "denied"))
    }

    fn not_found(path: &Path) -> FsError {
        FsError::io_error(path, std::io::Error::new(ErrorKind::NotFound, "not found"))
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock();
        state.files.contains_key(path) || is_dir_locked(&state, path)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        is_dir_locked(&self.state.lock(), path)
    }

    async fn read_to_string(&self, path: &Path) -> FsResult<String> {
        self.state
            .lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn write(&self, path: &Path, contents: &str) -> FsResult<()> {
        let mut state = self.state.lock();
        state.calls.push(FsCall::Write(path.to_path_buf()));
        if state.failing_writes.contains(path) {
            return Err(Self::denied(path));
        }
        if state.partial_writes.contains(path) {
            let cut = contents.len() / 2;
            let partial = contents.get(..cut).unwrap_or_default().to_string();
            state.files.insert(path.to_path_buf(), partial);
            return Err(FsError::io_error(
                path,
                std::io::Error::new(ErrorKind::Other, "no space left on device"),
            ));
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    async fn create_new(&self, path: &Path) -> FsResult<bool> {
        let mut state = self.state.lock();
        state.calls.push(FsCall::Create(path.to_path_buf()));
        if state.files.contains_key(path) || is_dir_locked(&state, path) {
            return Ok(false);
        }
        state.files.insert(path.to_path_buf(), String::new());
        Ok(true)
    }

    async fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        let mut state = self.state.lock();
        state
            .calls
            .push(FsCall::Rename(from.to_path_buf(), to.to_path_buf()));
        if state.failing_renames.contains(to) {
            return Err(Self::denied(to));
        }
        let contents = state.files.remove(from).ok_or_else(|| Self::not_found(from))?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> FsResult<()> {
        let mut state = self.state.lock();
        state.calls.push(FsCall::Remove(path.to_path_buf()));
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    async fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.state.lock().dirs.insert(path.to_path_buf());
        Ok(())
    }

    async fn glob(&self, root: &Path, pattern: &str) -> FsResult<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
        let compiled = glob::Pattern::new(&full).map_err(|e| FsError::Pattern {
            pattern: full.clone(),
            message: e.to_string(),
        })?;

        Ok(self
            .state
            .lock()
            .files
            .keys()
            .filter(|p| compiled.matches_path(p))
            .cloned()
            .collect())
    }
}

fn is_dir_locked(state: &MemoryState, path: &Path) -> bool {
    state.dirs.iter().any(|d| d.starts_with(path))
        || state.files.keys().any(|f| f != path && f.starts_with(path))
}

// Fixtures

pub fn failure(test_file: &str, error: &str) -> FailureContext {
    FailureContext::new(test_file, "user can log in").with_error(error)
}

pub fn evidence_without_trace() -> EvidencePacket {
    EvidencePacket::default()
}

pub fn evidence_with_trace_dir(dir: impl AsRef<Path>) -> EvidencePacket {
    EvidencePacket {
        traces: vec!["test-results/trace.zip".to_string()],
        collection_metadata: CollectionMetadata {
            trace_extracted: true,
            extracted_trace_dir: Some(dir.as_ref().to_string_lossy().into_owned()),
            ..CollectionMetadata::default()
        },
        ..EvidencePacket::default()
    }
}

pub fn with_acceptance_criteria(mut evidence: EvidencePacket, criteria: &str) -> EvidencePacket {
    evidence.ado_context = Some(AdoContext {
        test_id: "T-100".to_string(),
        parent: Some(AdoParent {
            id: 100,
            kind: "User Story".to_string(),
            title: "Login".to_string(),
            acceptance_criteria: Some(criteria.to_string()),
            ..AdoParent::default()
        }),
        ..AdoContext::default()
    });
    evidence
}

pub fn replace_plan(file: &str, search: &str, replace: &str) -> PatchPlan {
    PatchPlan::new(
        format!("replace '{search}'"),
        "fixture",
        vec![PatchOperation::replace_text(file, search, replace)],
    )
}

pub fn proposal_set(id: &str, items: Vec<(&str, RuleMatch)>) -> ProposalSet {
    ProposalSet {
        id: id.to_string(),
        source: ProposalSource {
            test_file: "login/login.spec.ts".to_string(),
            test_title: "user can log in".to_string(),
        },
        items: items
            .into_iter()
            .map(|(id, finding)| ProposalItem {
                id: id.to_string(),
                finding,
            })
            .collect(),
        created_at: Utc::now(),
        adapter_version: "test".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_fs_glob_matches_nested_paths() {
        let fs = MemoryFs::new()
            .with_file("/t/resources/a.html", "<html>")
            .with_file("/t/x/page@1.html", "<html>")
            .with_file("/t/trace.json", "{}");

        let html = fs.glob(Path::new("/t"), "**/*.html").await.unwrap();
        assert_eq!(html.len(), 2);

        let pages = fs.glob(Path::new("/t"), "**/page@*.html").await.unwrap();
        assert_eq!(pages, vec![PathBuf::from("/t/x/page@1.html")]);
        assert!(fs.is_dir(Path::new("/t/resources")).await);
    }

    #[tokio::test]
    async fn memory_fs_records_writes_and_injected_failures() {
        let fs = MemoryFs::new();
        fs.fail_writes_to("/a.tmp");

        assert!(fs.write(Path::new("/b"), "x").await.is_ok());
        assert!(fs.write(Path::new("/a.tmp"), "x").await.is_err());
        assert_eq!(fs.write_count(), 2);
        assert_eq!(fs.contents("/b").as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn atomic_write_removes_partial_temp_file() {
        let fs = MemoryFs::new().with_file("/out.json", "old");
        fs.fail_writes_partially_to("/out.json.tmp");

        let err = heal_fs::write_atomic(&fs, Path::new("/out.json"), "{\"complete\":true}")
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(fs.contents("/out.json.tmp"), None);
        assert_eq!(fs.contents("/out.json").as_deref(), Some("old"));
        assert!(fs.calls().contains(&FsCall::Remove(PathBuf::from("/out.json.tmp"))));
    }

    #[tokio::test]
    async fn create_new_refuses_taken_paths() {
        let fs = MemoryFs::new().with_file("/taken", "x");
        assert!(!fs.create_new(Path::new("/taken")).await.unwrap());
        assert!(fs.create_new(Path::new("/free")).await.unwrap());
        assert_eq!(fs.contents("/free").as_deref(), Some(""));
        assert_eq!(fs.contents("/taken").as_deref(), Some("x"));
    }
}
