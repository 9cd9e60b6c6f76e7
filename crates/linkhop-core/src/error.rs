use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short token: {0}")]
    InvalidShortToken(String),
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
}

/// Errors surfaced by repository backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// A unique constraint rejected the write (short token or email).
    #[error("value already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Errors returned by the link management service.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("could not allocate a unique short token after {attempts} attempts")]
    AllocationExhausted { attempts: usize },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("link not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}
