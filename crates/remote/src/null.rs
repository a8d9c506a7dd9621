use serde_json::{Map, Value};

use vanlog_core::{RecordId, RecordRow};

use crate::error::RemoteError;
use crate::session::Session;
use crate::RemoteStore;

/// Stand-in for installs with no hosted backend configured. Always
/// sessionless, so the facade keeps every record local; fetches fail so
/// reads serve the local set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRemote;

impl RemoteStore for NullRemote {
    fn session(&self) -> Option<Session> {
        None
    }

    fn fetch_recent(&self, _limit: usize) -> Result<Vec<RecordRow>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    fn fetch_by_id(&self, _id: RecordId) -> Result<Option<RecordRow>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    fn upsert_row(&self, _row: &RecordRow) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    fn update_row(&self, _id: RecordId, _patch: &Map<String, Value>) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    fn upload_blob(&self, _image: &[u8]) -> Result<String, RemoteError> {
        Err(RemoteError::NotConfigured)
    }
}
