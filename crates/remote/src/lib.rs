pub mod error;
pub mod http;
pub mod null;
pub mod session;

pub use error::RemoteError;
pub use http::{HttpRemote, RemoteConfig};
pub use null::NullRemote;
pub use session::{Session, SessionHandle};

use serde_json::{Map, Value};
use vanlog_core::{RecordId, RecordRow};

/// Boundary to the hosted table store and blob store.
///
/// Having no session is an expected condition meaning "operate local-only";
/// it is surfaced through [`RemoteStore::session`], never as an error.
/// Fetches fail with an error rather than an empty result when the backend
/// cannot be reached, so callers can tell the two apart.
pub trait RemoteStore {
    /// Current login state, read fresh on every call.
    fn session(&self) -> Option<Session>;

    /// Up to `limit` rows, newest date first.
    fn fetch_recent(&self, limit: usize) -> Result<Vec<RecordRow>, RemoteError>;

    fn fetch_by_id(&self, id: RecordId) -> Result<Option<RecordRow>, RemoteError>;

    /// Idempotent by row id.
    fn upsert_row(&self, row: &RecordRow) -> Result<(), RemoteError>;

    /// Field-level partial update of one row.
    fn update_row(&self, id: RecordId, patch: &Map<String, Value>) -> Result<(), RemoteError>;

    /// Store an image and return its durable public URL.
    fn upload_blob(&self, image: &[u8]) -> Result<String, RemoteError>;
}
