//! Error types for the execution core

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the execution core
///
/// Stays `Clone` so errors can travel through ports like any other message
/// (fan-out clones the envelope per downstream).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Type error: {0}")]
    Type(String),

    #[error("Column not found: {0}")]
    UnknownColumn(String),

    #[error("Database not found: {0}")]
    UnknownDatabase(String),

    #[error("Table not found: {0}")]
    UnknownTable(String),

    #[error("Block is immutable")]
    Immutable,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Fatal IO error: {0}")]
    Fatal(String),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Fatal(e.to_string())
    }
}
