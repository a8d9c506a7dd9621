//! Record service facade: the one entry point UI collaborators use.
//!
//! Every mutation lands in the local durable store before the call returns;
//! that local write is the authority on whether a save succeeded. Remote
//! writes are best-effort and only upgrade the per-record sync marker.

pub mod attachments;
pub mod error;
pub mod merge;

pub use error::ServiceError;

use std::path::PathBuf;

use tracing::{debug, warn};

use vanlog_core::{
    wire, DailyRecord, RecordDraft, RecordId, RecordPatch, RecordRow, SyncState,
};
use vanlog_remote::RemoteStore;
use vanlog_storage::{migrate_legacy, LocalStore, SqliteStore};

const FETCH_LIMIT: usize = 100;

/// Merged view returned by [`RecordService::get_all`].
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub records: Vec<DailyRecord>,
    /// True when the last read could not reach the backend at all.
    pub offline: bool,
}

pub struct RecordService {
    store: SqliteStore,
    remote: Box<dyn RemoteStore>,
    legacy_path: Option<PathBuf>,
}

impl RecordService {
    pub fn new(store: SqliteStore, remote: Box<dyn RemoteStore>) -> Self {
        Self {
            store,
            remote,
            legacy_path: None,
        }
    }

    /// Location of the previous storage generation's blob, checked on every
    /// read and sweep until it is gone.
    pub fn with_legacy_path(mut self, path: PathBuf) -> Self {
        self.legacy_path = Some(path);
        self
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SqliteStore {
        &mut self.store
    }

    fn run_legacy_migration(&mut self) {
        if let Some(path) = self.legacy_path.clone() {
            if let Err(e) = migrate_legacy(&mut self.store, &path) {
                warn!(error = %e, "legacy migration failed, will retry on next read");
            }
        }
    }

    /// Create a record from a submitted draft. Assigns id, timestamp and
    /// lifecycle flags; attempts an immediate remote write when a session
    /// exists; always persists locally before returning.
    pub fn create(&mut self, draft: RecordDraft) -> Result<DailyRecord, ServiceError> {
        let mut record = DailyRecord::from_draft(draft);

        if let Some(session) = self.remote.session() {
            record.attachments =
                attachments::process_for_sync(self.remote.as_ref(), record.attachments);
            let row = RecordRow::from_record(&record, &session.user_id, session.email.as_deref());
            match self.remote.upsert_row(&row) {
                Ok(()) => record.sync_state = SyncState::Synced,
                Err(e) => {
                    warn!(id = %record.id, error = %e, "remote create failed, record stays pending")
                }
            }
        } else {
            debug!(id = %record.id, "no session, saving record locally only");
        }

        self.store.put(&record)?;
        Ok(record)
    }

    /// Apply a partial edit. When no local copy exists the update degrades
    /// to a remote-only patch and the result is `None`; otherwise the merged
    /// record is persisted locally regardless of the remote outcome.
    pub fn update(
        &mut self,
        id: RecordId,
        patch: RecordPatch,
    ) -> Result<Option<DailyRecord>, ServiceError> {
        let mut patch = patch;
        let mut merged = self.store.get(id)?.map(|existing| patch.apply(&existing));

        if self.remote.session().is_some() {
            if let Some(atts) = patch.attachments.take() {
                let processed = attachments::process_for_sync(self.remote.as_ref(), atts);
                if let Some(m) = merged.as_mut() {
                    m.attachments = processed.clone();
                }
                patch.attachments = Some(processed);
            }

            let payload = wire::row_patch(&patch);
            match self.remote.update_row(id, &payload) {
                Ok(()) => {
                    if let Some(m) = merged.as_mut() {
                        m.sync_state = SyncState::Synced;
                    }
                }
                Err(e) => warn!(id = %id, error = %e, "remote update failed, record stays pending"),
            }
        }

        if let Some(m) = &merged {
            self.store.put(m)?;
        }
        Ok(merged)
    }

    /// Local copy first for responsiveness, then one remote attempt; a
    /// successful remote fetch refreshes the cache and wins.
    pub fn get_by_id(&mut self, id: RecordId) -> Result<Option<DailyRecord>, ServiceError> {
        let local = self.store.get(id)?;

        match self.remote.fetch_by_id(id) {
            Ok(Some(row)) => {
                let record = row.into_record();
                if let Err(e) = self.store.put(&record) {
                    warn!(id = %id, error = %e, "cache refresh failed");
                }
                Ok(Some(record))
            }
            Ok(None) => Ok(local),
            Err(e) => {
                debug!(id = %id, error = %e, "remote fetch failed, using local copy");
                Ok(local)
            }
        }
    }

    /// The merged, date-descending view over both stores. Never fails on
    /// remote trouble: the result degrades to local data with the offline
    /// flag set.
    pub fn get_all(&mut self) -> Result<RecordSet, ServiceError> {
        self.run_legacy_migration();

        let fetched = self.remote.fetch_recent(FETCH_LIMIT);
        let local = self.store.get_all()?;

        match fetched {
            Ok(rows) => {
                let remote_records: Vec<DailyRecord> =
                    rows.into_iter().map(RecordRow::into_record).collect();

                // Best-effort cache refresh; a failure here must not break
                // the read.
                for record in &remote_records {
                    if let Err(e) = self.store.put(record) {
                        warn!(id = %record.id, error = %e, "cache refresh failed");
                    }
                }

                Ok(RecordSet {
                    records: merge::merge_views(remote_records, local),
                    offline: false,
                })
            }
            Err(e) => {
                debug!(error = %e, "remote fetch failed, serving local records");
                Ok(RecordSet {
                    records: merge::local_only(local),
                    offline: true,
                })
            }
        }
    }

    /// Push every record whose marker is not synced. Records are processed
    /// one at a time; a failure on one is logged and the sweep moves on.
    /// Returns how many records reached the synced state.
    pub fn sync_pending(&mut self) -> Result<usize, ServiceError> {
        self.run_legacy_migration();

        let Some(session) = self.remote.session() else {
            return Ok(0);
        };

        let pending: Vec<DailyRecord> = self
            .store
            .get_all()?
            .into_iter()
            .filter(|r| r.sync_state.needs_sync())
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        debug!(count = pending.len(), "pushing pending records");
        let mut synced = 0;

        for mut record in pending {
            record.attachments =
                attachments::process_for_sync(self.remote.as_ref(), record.attachments);
            let row = RecordRow::from_record(&record, &session.user_id, session.email.as_deref());
            match self.remote.upsert_row(&row) {
                Ok(()) => {
                    record.sync_state = SyncState::Synced;
                    match self.store.put(&record) {
                        Ok(()) => synced += 1,
                        Err(e) => {
                            warn!(id = %record.id, error = %e, "could not persist synced marker")
                        }
                    }
                }
                Err(e) => warn!(id = %record.id, error = %e, "record failed to sync, will retry"),
            }
        }

        Ok(synced)
    }

    /// `None` on any failure; callers fall back to inline storage of the
    /// image.
    pub fn upload_image(&self, image: &[u8]) -> Option<String> {
        match self.remote.upload_blob(image) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "image upload failed");
                None
            }
        }
    }
}
