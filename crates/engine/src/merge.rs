//! Reconciliation of the local and remote record sets into one view.

use std::collections::HashMap;

use vanlog_core::{DailyRecord, RecordId};

/// Merge the freshly fetched remote set with the local set. Remote rows are
/// authoritative for any id whose local copy is already synced; a local copy
/// with unsynced edits wins over the stale remote row, and local-only ids
/// are kept.
pub fn merge_views(remote: Vec<DailyRecord>, local: Vec<DailyRecord>) -> Vec<DailyRecord> {
    let mut merged = remote;
    let mut index: HashMap<RecordId, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, record)| (record.id, i))
        .collect();

    for record in local {
        match index.get(&record.id) {
            Some(&i) if record.sync_state.needs_sync() => merged[i] = record,
            Some(_) => {}
            None => {
                index.insert(record.id, merged.len());
                merged.push(record);
            }
        }
    }

    sort_by_date_desc(&mut merged);
    merged
}

/// The offline view: everything we have locally, newest first.
pub fn local_only(local: Vec<DailyRecord>) -> Vec<DailyRecord> {
    let mut records = local;
    sort_by_date_desc(&mut records);
    records
}

/// Newest first. The sort is stable, so same-date records keep their
/// relative order and the result is deterministic for a fixed input.
fn sort_by_date_desc(records: &mut [DailyRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}
