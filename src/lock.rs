//! Database lock detection
//!
//! Access keeps a sibling lock-marker file next to an open database
//! (`.laccdb` for the `.accdb` family, `.ldb` for the `.mdb` family).
//! Before any exclusive operation we check for the marker, then probe for
//! an open handle. Locked databases fail fast rather than block.

use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{AccdevError, AccdevResult};

/// Sibling lock-marker path for a database, if its extension is recognized
pub fn lock_marker_path(database: &Path) -> Option<PathBuf> {
    let ext = database.extension()?.to_str()?.to_ascii_lowercase();
    let marker_ext = match ext.as_str() {
        "accdb" | "accde" => "laccdb",
        "mdb" | "mde" => "ldb",
        _ => return None,
    };
    Some(database.with_extension(marker_ext))
}

/// Check whether the database is currently open elsewhere
pub fn is_locked(database: &Path) -> bool {
    if let Some(marker) = lock_marker_path(database) {
        if marker.exists() {
            return true;
        }
    }
    has_open_handle(database)
}

/// Fail with [`AccdevError::Locked`] if the database is open elsewhere
pub fn ensure_unlocked(database: &Path) -> AccdevResult<()> {
    if is_locked(database) {
        return Err(AccdevError::Locked {
            path: database.to_path_buf(),
        });
    }
    Ok(())
}

/// Probe for an open handle: a rename onto itself fails on Windows while the
/// file is held open, and an exclusive flock fails where advisory locks are
/// honored. Either signal counts as locked.
fn has_open_handle(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    if fs::rename(path, path).is_err() {
        return true;
    }
    match fs::OpenOptions::new().write(true).open(path) {
        Ok(file) => FileExt::try_lock_exclusive(&file).is_err(),
        // Unopenable for write (e.g. read-only file) is not "in use"
        Err(_) => false,
    }
}
