use linkhop_core::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input. The message is safe to show to the client.
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("No token provided")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token encoding failed: {0}")]
    Token(#[source] jsonwebtoken::errors::Error),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}
