pub mod error;
pub mod legacy;
pub mod schema;
pub mod sqlite;

pub use error::StorageError;
pub use legacy::migrate_legacy;
pub use sqlite::{LocalStore, SqliteStore};
