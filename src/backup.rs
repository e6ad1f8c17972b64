//! Backup copies of input files
//!
//! Before a document is rewritten the original bytes are copied next to it as
//! `<name>.backup`. Existing backups are never overwritten: when the name is
//! taken the next free `<name>.backup.N` (N = 1, 2, ...) is used.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, FileTimes};
use std::path::{Path, PathBuf};

/// Suffix appended to the input file name
pub const BACKUP_SUFFIX: &str = "backup";

/// First unused backup path for `path`.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let base = append_suffix(path, BACKUP_SUFFIX);
    if !base.exists() {
        return base;
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = append_suffix(&base, &counter.to_string());
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Copy `path` to a fresh backup path and return that path.
///
/// Contents and permissions are always copied. Access and modification times
/// are copied when the platform allows it.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path_for(path);
    let backup_error = |source| Error::Backup {
        path: path.display().to_string(),
        source,
    };

    fs::copy(path, &backup).map_err(backup_error)?;

    if let Err(e) = copy_times(path, &backup) {
        tracing::debug!(error = %e, backup = %backup.display(), "could not preserve file times");
    }

    tracing::info!(backup = %backup.display(), "Backup created");
    Ok(backup)
}

fn copy_times(from: &Path, to: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::File::options().write(true).open(to)?.set_times(times)
}
