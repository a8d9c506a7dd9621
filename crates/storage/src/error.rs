use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform denied storage access (permissions, quota, corrupt
    /// file). Offline capability is gone; callers degrade to remote-only.
    #[error("local store unavailable: {0}")]
    Unavailable(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
