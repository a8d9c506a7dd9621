use thiserror::Error;

/// Errors the facade actually raises. Remote failures never show up here:
/// they are logged and downgraded to "record stays pending" by contract.
/// Local persistence failures do surface, because the caller must know a
/// save may be device-only or lost.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error: {0}")]
    Storage(#[from] vanlog_storage::StorageError),
}
