use linkhop_core::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedirectorError {
    /// The token is unknown or its link is inactive.
    #[error("short url not found or inactive")]
    NotFound,
    #[error("storage operation failed: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for RedirectorError {
    fn from(error: StorageError) -> Self {
        match error {
            // The record went away or was deactivated between lookup and increment.
            StorageError::NotFound => RedirectorError::NotFound,
            other => RedirectorError::Storage(other),
        }
    }
}
