use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;

use vanlog_core::record::RecordDraft;
use vanlog_core::Attachment;
use vanlog_engine::RecordService;
use vanlog_storage::{SqliteStore, StorageError};

use crate::remote::MemoryRemote;

/// One simulated app install: a record service over an in-memory local
/// store, pointed at a (possibly shared) scripted remote.
pub struct TestDevice {
    pub service: RecordService,
    pub remote: MemoryRemote,
}

impl TestDevice {
    pub fn new(remote: MemoryRemote) -> Result<Self, StorageError> {
        let store = SqliteStore::open_in_memory()?;
        Ok(Self {
            service: RecordService::new(store, Box::new(remote.clone())),
            remote,
        })
    }

    /// A device that still carries a legacy storage blob at `path`.
    pub fn with_legacy_blob(remote: MemoryRemote, path: PathBuf) -> Result<Self, StorageError> {
        let store = SqliteStore::open_in_memory()?;
        Ok(Self {
            service: RecordService::new(store, Box::new(remote.clone())).with_legacy_path(path),
            remote,
        })
    }

    /// Minimal draft for a given day.
    pub fn draft(date: &str) -> RecordDraft {
        let date: NaiveDate = date.parse().expect("test date");
        RecordDraft::for_date(date)
    }

    /// An inline attachment wrapping the given image bytes.
    pub fn inline_attachment(image: &[u8]) -> Attachment {
        Attachment::Inline(format!("data:image/jpeg;base64,{}", STANDARD.encode(image)))
    }
}
