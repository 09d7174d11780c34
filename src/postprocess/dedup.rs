//! Content-hash deduplication
//!
//! Keeps the first file seen for each distinct content hash, in listing order,
//! and deletes the rest best-effort. Running it twice over the same directory
//! yields the same retained set as running it once.

use super::{safe_remove, CandidateFile};
use crate::services::FailureLog;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Drop files whose content hash was already seen, deleting them on disk.
///
/// A file that cannot be read cannot be proven a duplicate; it is kept and
/// the failure recorded.
pub(crate) fn retain_unique(
    files: Vec<CandidateFile>,
    failure_log: &FailureLog,
) -> Vec<CandidateFile> {
    let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(files.len());
    let mut retained = Vec::with_capacity(files.len());

    for file in files {
        match std::fs::read(&file.path) {
            Ok(bytes) => {
                let digest: [u8; 32] = Sha256::digest(&bytes).into();
                if seen.insert(digest) {
                    retained.push(file);
                } else {
                    log::debug!("duplicate content: {}", file.path.display());
                    safe_remove(&file.path, failure_log);
                }
            },
            Err(e) => {
                let message = format!("Unable to hash {}: {e}", file.path.display());
                log::warn!("{message}");
                failure_log.record(&message);
                retained.push(file);
            },
        }
    }

    retained
}
