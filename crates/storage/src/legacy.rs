//! One-shot migration of the previous storage generation.
//!
//! The old app kept every record in a single serialized JSON array. On each
//! read or sweep we check for that blob, upsert its contents into the keyed
//! store, and delete the blob only after the transaction commits. Malformed
//! blobs are left intact so a fixed build can retry.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use vanlog_core::DailyRecord;

use crate::error::StorageError;
use crate::sqlite::LocalStore;

/// Returns the number of records migrated; `0` when there is nothing to do.
/// Safe to call repeatedly: upsert-by-id never duplicates records.
pub fn migrate_legacy<S: LocalStore>(store: &mut S, path: &Path) -> Result<usize, StorageError> {
    if !path.exists() {
        return Ok(0);
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read legacy blob");
            return Ok(0);
        }
    };

    let records: Vec<DailyRecord> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "legacy blob is malformed, leaving it in place");
            return Ok(0);
        }
    };

    // Storage failures propagate and keep the blob around for the next run.
    store.put_all(&records)?;

    if let Err(e) = fs::remove_file(path) {
        // Harmless: the next run re-upserts the same records.
        warn!(path = %path.display(), error = %e, "could not delete migrated legacy blob");
    }

    info!(count = records.len(), "migrated legacy records");
    Ok(records.len())
}
