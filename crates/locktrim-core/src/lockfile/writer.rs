//! File-system boundary of the codec.
//!
//! Reading is a single blocking call. Writing goes to a sibling temporary
//! file that is renamed over the destination, so a failed run never leaves a
//! half-written lockfile behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::{Lockfile, LockfileError};

/// Read and parse the lockfile at `path`.
///
/// # Errors
///
/// Returns [`LockfileError::Read`] if the file cannot be read as UTF-8.
#[instrument]
pub fn read_lockfile(path: &Path) -> Result<Lockfile, LockfileError> {
    let text = fs::read_to_string(path).map_err(|source| LockfileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let lock = Lockfile::parse(&text);
    debug!(
        packages = lock.len(),
        anomalies = lock.anomalies.len(),
        "lockfile parsed"
    );
    Ok(lock)
}

/// Write `contents` to `path` through a temporary file and rename.
///
/// # Errors
///
/// Returns [`LockfileError::Write`] if the temporary file cannot be written
/// or moved into place. The temporary file is removed on rename failure.
#[instrument(skip(contents), fields(bytes = contents.len()))]
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), LockfileError> {
    let tmp_path = temp_path_for(path);
    let write_err = |source| LockfileError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    fs::write(&tmp_path, contents).map_err(write_err)?;
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(source));
    }

    debug!(path = %path.display(), "output written");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
