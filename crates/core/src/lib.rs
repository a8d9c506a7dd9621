pub mod attachment;
pub mod coerce;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod record;
pub mod wire;

pub use attachment::Attachment;
pub use coerce::NumericInput;
pub use error::CoreError;
pub use ids::RecordId;
pub use record::{DailyRecord, RecordDraft, RecordPatch, RecordStatus, SyncState};
pub use wire::RecordRow;
