//! tokio-backed filesystem

use crate::error::{FsError, FsResult};
use crate::FileSystem;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create handle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn read_to_string(&self, path: &Path) -> FsResult<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FsError::io_error(path, e))
    }

    async fn write(&self, path: &Path, contents: &str) -> FsResult<()> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| FsError::io_error(path, e))
    }

    async fn create_new(&self, path: &Path) -> FsResult<bool> {
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(FsError::io_error(path, e)),
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        tokio::fs::rename(from, to)
            .await
            .map_err(|e| FsError::io_error(to, e))
    }

    async fn remove_file(&self, path: &Path) -> FsResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| FsError::io_error(path, e))
    }

    async fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| FsError::io_error(path, e))
    }

    async fn glob(&self, root: &Path, pattern: &str) -> FsResult<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let full_pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);

        tokio::task::spawn_blocking(move || {
            let paths = glob::glob(&full_pattern).map_err(|e| FsError::Pattern {
                pattern: full_pattern.clone(),
                message: e.to_string(),
            })?;

            let mut files: Vec<PathBuf> = paths
                .filter_map(Result::ok)
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            Ok(files)
        })
        .await
        .map_err(|e| FsError::ScanAborted(e.to_string()))?
    }
}
