use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use vanlog_core::{RecordId, RecordRow};
use vanlog_remote::{RemoteError, RemoteStore, Session};

#[derive(Default)]
struct State {
    rows: BTreeMap<String, RecordRow>,
    blobs: Vec<Vec<u8>>,
    session: Option<Session>,
    fail_fetches: bool,
    fail_uploads: bool,
    fail_all_upserts: bool,
    fail_upsert_ids: HashSet<String>,
}

/// Scripted in-memory stand-in for the hosted backend. Clones share state,
/// so several devices can point at the same remote and failures can be
/// injected per scenario.
#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<State>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(user_id: &str, email: Option<&str>) -> Self {
        let remote = Self::new();
        remote.sign_in(user_id, email);
        remote
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn sign_in(&self, user_id: &str, email: Option<&str>) {
        self.lock().session = Some(Session::new(user_id, email));
    }

    pub fn sign_out(&self) {
        self.lock().session = None;
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.lock().fail_fetches = fail;
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.lock().fail_uploads = fail;
    }

    pub fn set_fail_upserts(&self, fail: bool) {
        self.lock().fail_all_upserts = fail;
    }

    /// Every upsert of this record id fails until cleared.
    pub fn fail_upserts_for(&self, id: RecordId) {
        self.lock().fail_upsert_ids.insert(id.to_string());
    }

    pub fn clear_upsert_failures(&self) {
        self.lock().fail_upsert_ids.clear();
    }

    /// Seed server-side state directly, as if another device had synced.
    pub fn insert_row(&self, row: RecordRow) {
        self.lock().rows.insert(row.id.to_string(), row);
    }

    pub fn rows(&self) -> Vec<RecordRow> {
        self.lock().rows.values().cloned().collect()
    }

    pub fn row(&self, id: RecordId) -> Option<RecordRow> {
        self.lock().rows.get(&id.to_string()).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.lock().blobs.len()
    }
}

impl RemoteStore for MemoryRemote {
    fn session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    fn fetch_recent(&self, limit: usize) -> Result<Vec<RecordRow>, RemoteError> {
        let state = self.lock();
        if state.fail_fetches {
            return Err(RemoteError::Transport("scripted fetch failure".into()));
        }
        let mut rows: Vec<RecordRow> = state.rows.values().cloned().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(limit);
        Ok(rows)
    }

    fn fetch_by_id(&self, id: RecordId) -> Result<Option<RecordRow>, RemoteError> {
        let state = self.lock();
        if state.fail_fetches {
            return Err(RemoteError::Transport("scripted fetch failure".into()));
        }
        Ok(state.rows.get(&id.to_string()).cloned())
    }

    fn upsert_row(&self, row: &RecordRow) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if state.session.is_none() {
            return Err(RemoteError::NoSession);
        }
        let key = row.id.to_string();
        if state.fail_all_upserts || state.fail_upsert_ids.contains(&key) {
            return Err(RemoteError::Api {
                status: 500,
                message: "scripted upsert failure".into(),
            });
        }
        state.rows.insert(key, row.clone());
        Ok(())
    }

    fn update_row(&self, id: RecordId, patch: &Map<String, Value>) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if state.session.is_none() {
            return Err(RemoteError::NoSession);
        }
        let key = id.to_string();
        let Some(existing) = state.rows.get(&key) else {
            // A patch matching no row succeeds with zero rows affected.
            return Ok(());
        };

        let mut value = serde_json::to_value(existing)
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| RemoteError::Serialization("row is not an object".into()))?;
        for (column, new_value) in patch {
            object.insert(column.clone(), new_value.clone());
        }
        let updated: RecordRow = serde_json::from_value(value)
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;
        state.rows.insert(key, updated);
        Ok(())
    }

    fn upload_blob(&self, image: &[u8]) -> Result<String, RemoteError> {
        let mut state = self.lock();
        if state.fail_uploads {
            return Err(RemoteError::UploadFailed("scripted upload failure".into()));
        }
        state.blobs.push(image.to_vec());
        let n = state.blobs.len();
        Ok(format!("https://remote.test/app-images/blob-{n}.jpg"))
    }
}
