//! Self-Heal Filesystem Boundary
//!
//! Every read, write, rename and directory scan the core performs goes
//! through [`FileSystem`]. Production wiring hands in [`LocalFs`]; tests hand
//! in an in-memory fake and count writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use heal_fs::{write_atomic, FileSystem, LocalFs};
//!
//! let fs = LocalFs::new();
//! write_atomic(&fs, Path::new("out/report.json"), "{}").await?;
//! assert!(!fs.exists(Path::new("out/report.json.tmp")).await);
//! ```

#![warn(unreachable_pub)]

mod atomic;
mod error;
mod local;

pub use atomic::{temp_path_for, write_atomic, TEMP_SUFFIX};
pub use error::{FsError, FsResult};
pub use local::LocalFs;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Async filesystem primitives, scoped by the caller to a repository root
///
/// Each call is an independent suspend point. Implementations must be safe
/// to share across tasks.
#[async_trait]
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Whether anything exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory
    async fn is_dir(&self, path: &Path) -> bool;

    /// Read a UTF-8 file
    async fn read_to_string(&self, path: &Path) -> FsResult<String>;

    /// Create or truncate a file with `contents`
    async fn write(&self, path: &Path, contents: &str) -> FsResult<()>;

    /// Create an empty file at `path` unless something already exists there
    ///
    /// The check and the create are one atomic step. Returns `false` when
    /// `path` was taken.
    async fn create_new(&self, path: &Path) -> FsResult<bool>;

    /// Rename `from` over `to`
    async fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Remove a file
    async fn remove_file(&self, path: &Path) -> FsResult<()>;

    /// Create a directory and its parents
    async fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Files under `root` matching a glob `pattern` (relative to `root`), sorted
    async fn glob(&self, root: &Path, pattern: &str) -> FsResult<Vec<PathBuf>>;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
