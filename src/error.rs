//! Error types for AvtoTest Core

use thiserror::Error;

/// Main error type for store and account operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backing store could not be opened or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Registration rejected, the name is already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Login rejected, no account with this name
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Login rejected, password does not match
    #[error("Wrong password")]
    WrongPassword,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::StorageError(err.to_string())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
