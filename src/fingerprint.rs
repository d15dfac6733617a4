//! Content Fingerprint Value Object
//!
//! A fixed-length digest of a file's byte content, used to decide whether a
//! deploy target needs replacing. Files are read in fixed-size blocks so the
//! memory footprint is bounded regardless of database size.
//!
//! A missing file, a read failure, or a cancellation mid-read all yield
//! "no fingerprint" (`None`). Callers must treat `None` as "cannot confirm
//! equality", never as "equal".

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::cancel::CancelToken;

/// Read granularity for hashing
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Content fingerprint value object
///
/// Wraps a SHA-256 digest string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Prefix for SHA-256 fingerprints
    pub const PREFIX: &'static str = "sha256:";

    /// Compute the fingerprint of an in-memory buffer
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(format!("{}{:x}", Self::PREFIX, digest))
    }

    /// Full fingerprint string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digest without the prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Check if this fingerprint matches another
    pub fn matches(&self, other: &Fingerprint) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint a file on disk, reading block by block.
///
/// Returns `None` if the file cannot be opened or read, or if `cancel` is
/// signalled before the final block.
pub fn fingerprint_file(path: &Path, cancel: &CancelToken) -> Option<Fingerprint> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; BLOCK_SIZE];

    loop {
        if cancel.is_cancelled() {
            return None;
        }
        let read = file.read(&mut block).ok()?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Some(Fingerprint(format!(
        "{}{:x}",
        Fingerprint::PREFIX,
        hasher.finalize()
    )))
}
