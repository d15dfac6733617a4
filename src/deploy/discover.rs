//! Target discovery
//!
//! Walks the target tree collecting every file whose name matches the
//! source file name case-insensitively. Lock-marker siblings (Office-style
//! `~$` prefixes) are never deploy targets.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{AccdevError, AccdevResult};

/// Prefix marking transient Office lock files
pub const TRANSIENT_LOCK_PREFIX: &str = "~$";

/// Find every file under `target_root` named like `source`, case-insensitively.
///
/// Results are sorted for deterministic replacement and event order.
pub fn find_targets(source: &Path, target_root: &Path) -> AccdevResult<Vec<PathBuf>> {
    let file_name = source
        .file_name()
        .ok_or_else(|| AccdevError::FileNotFound {
            path: source.to_path_buf(),
        })?;
    let wanted = file_name.to_string_lossy().to_lowercase();

    let mut found = Vec::new();
    // Standard filters off: hidden directories and ignore files in the
    // target tree must not hide deploy targets.
    let walker = WalkBuilder::new(target_root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable subtrees are skipped, not fatal; their targets
            // simply are not discovered.
            Err(_) => continue,
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(TRANSIENT_LOCK_PREFIX) {
            continue;
        }
        if name.to_lowercase() == wanted {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}
