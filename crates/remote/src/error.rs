use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// This install has no hosted backend at all.
    #[error("no remote backend configured")]
    NotConfigured,

    #[error("no active session")]
    NoSession,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server rejected request: status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("blob upload failed: {0}")]
    UploadFailed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
