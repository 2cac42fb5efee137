use thiserror::Error;

/// Core error type for dbmend operations.
#[derive(Error, Debug)]
pub enum MendError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration reset error: {0}")]
    Reset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Process error: {0}")]
    Process(String),
}

/// Result type alias using MendError.
pub type Result<T> = std::result::Result<T, MendError>;
