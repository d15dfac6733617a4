//! Atomic file replacement
//!
//! Replaces a target with the source content without ever exposing a
//! partially-written target: the content is copied to a sibling temp file in
//! the target's directory, the old target is removed, and the temp file is
//! renamed onto the target path. The rename is the atomicity boundary, so
//! the temp file must live on the same filesystem as the target.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::cancel::CancelToken;
use crate::fingerprint::fingerprint_file;

/// Outcome of one replacement attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Source and target fingerprints matched; nothing written
    UpToDate,
    /// Target now carries the source content
    Replaced,
    /// I/O failure left the target in its prior state; retry later
    Transient { message: String },
    /// Unrecoverable for this target; do not retry
    Fatal { message: String },
}

impl ReplaceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReplaceOutcome::UpToDate | ReplaceOutcome::Replaced)
    }
}

/// Replace `target` with the content of `source`.
///
/// Fingerprints are compared first; equal content is reported as
/// [`ReplaceOutcome::UpToDate`] without touching the target. A fingerprint
/// that cannot be computed (missing file, read error, cancellation) is never
/// treated as equal.
pub fn replace_file(source: &Path, target: &Path, cancel: &CancelToken) -> ReplaceOutcome {
    let source_print = fingerprint_file(source, cancel);

    if source_print.is_none() && !source.exists() {
        return ReplaceOutcome::Fatal {
            message: "source file no longer exists".to_string(),
        };
    }

    if let (Some(source_print), Some(target_print)) =
        (&source_print, &fingerprint_file(target, cancel))
    {
        if source_print.matches(target_print) {
            return ReplaceOutcome::UpToDate;
        }
    }

    if cancel.is_cancelled() {
        return ReplaceOutcome::Transient {
            message: "cancelled before copy".to_string(),
        };
    }

    // Past this point the attempt runs to completion; an interrupted copy
    // only ever touches the temp file, never the target.
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = match NamedTempFile::new_in(parent) {
        Ok(temp) => temp,
        Err(e) => return transient("create temp file", &e),
    };

    if let Err(e) = fs::copy(source, temp.path()) {
        if e.kind() == ErrorKind::NotFound {
            // Source vanished between the fingerprint and the copy
            return ReplaceOutcome::Fatal {
                message: format!("copy failed: {e}"),
            };
        }
        return transient("copy", &e);
    }

    // A target that disappeared on its own is fine; the rename below still
    // produces the desired end state.
    if let Err(e) = fs::remove_file(target) {
        if e.kind() != ErrorKind::NotFound {
            return transient("remove target", &e);
        }
    }

    match temp.persist(target) {
        Ok(_) => ReplaceOutcome::Replaced,
        Err(e) => transient("rename", &e.error),
    }
}

fn transient(step: &str, error: &std::io::Error) -> ReplaceOutcome {
    ReplaceOutcome::Transient {
        message: format!("{step} failed: {error}"),
    }
}
