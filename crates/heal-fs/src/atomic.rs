//! Temp-then-rename writes

use crate::error::FsResult;
use crate::FileSystem;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to a target path for its temporary sibling
pub const TEMP_SUFFIX: &str = ".tmp";

/// `<path>.tmp`
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Write `contents` to `<path>.tmp`, then rename it over `path`
///
/// The temporary file never survives: it is removed if either the write or
/// the rename fails. A failed write may already have created a partial file.
///
/// # Errors
/// Returns the write or rename error.
pub async fn write_atomic<F>(fs: &F, path: &Path, contents: &str) -> FsResult<()>
where
    F: FileSystem + ?Sized,
{
    let tmp = temp_path_for(path);
    if let Err(err) = fs.write(&tmp, contents).await {
        discard(fs, &tmp).await;
        return Err(err);
    }

    if let Err(err) = fs.rename(&tmp, path).await {
        discard(fs, &tmp).await;
        return Err(err);
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "atomic write");
    Ok(())
}

async fn discard<F>(fs: &F, tmp: &Path)
where
    F: FileSystem + ?Sized,
{
    match fs.remove_file(tmp).await {
        Ok(()) => {}
        Err(err) if err.is_not_found() => {}
        Err(err) => {
            tracing::warn!(path = %tmp.display(), error = %err, "failed to remove temp file");
        }
    }
}
