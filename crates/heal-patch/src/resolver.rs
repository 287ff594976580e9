//! Logical path → file on disk

use crate::error::ResolveError;
use heal_fs::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default directory tried as a prefix for unqualified paths
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// A logical path that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Repo-relative path that matched, forward slashes
    pub resolved_path: String,
    /// Absolute path used for reads and writes
    pub absolute: PathBuf,
}

/// Maps a logical file path to a real one
///
/// The path is tried as given, then under the tests directory. Pure lookup,
/// no side effects.
#[derive(Debug, Clone)]
pub struct TargetFileResolver {
    fs: Arc<dyn FileSystem>,
    repo_root: PathBuf,
    tests_dir: String,
}

impl TargetFileResolver {
    /// Create resolver rooted at `repo_root`
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            repo_root: repo_root.into(),
            tests_dir: DEFAULT_TESTS_DIR.to_string(),
        }
    }

    /// With tests directory prefix
    #[inline]
    #[must_use]
    pub fn with_tests_dir(mut self, tests_dir: impl Into<String>) -> Self {
        self.tests_dir = tests_dir.into();
        self
    }

    /// Repository root
    #[inline]
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Resolve `input`
    ///
    /// # Returns
    /// `input` unchanged if it exists as given, else the tests-prefixed form.
    ///
    /// # Errors
    /// `ResolveError::NotFound` naming both locations tried.
    pub async fn resolve(&self, input: &str) -> Result<ResolvedTarget, ResolveError> {
        let prefixed = self.prefixed(input);

        if !input.trim().is_empty() {
            let direct = self.repo_root.join(input);
            if self.is_file(&direct).await {
                return Ok(ResolvedTarget {
                    resolved_path: input.to_string(),
                    absolute: direct,
                });
            }

            let under_tests = self.repo_root.join(&prefixed);
            if self.is_file(&under_tests).await {
                tracing::debug!(input, resolved = %prefixed, "resolved under tests dir");
                return Ok(ResolvedTarget {
                    resolved_path: prefixed,
                    absolute: under_tests,
                });
            }
        }

        Err(ResolveError::NotFound {
            input: input.to_string(),
            prefixed,
        })
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.fs.exists(path).await && !self.fs.is_dir(path).await
    }

    fn prefixed(&self, input: &str) -> String {
        let dir = self.tests_dir.replace('\\', "/");
        let rest = input.replace('\\', "/");
        format!(
            "{}/{}",
            dir.trim_end_matches('/'),
            rest.trim_start_matches("./")
        )
    }
}
