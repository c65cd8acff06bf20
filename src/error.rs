//! Error types for CubbyKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CubbyError
pub type Result<T> = std::result::Result<T, CubbyError>;

/// Unified error type for CubbyKV operations
#[derive(Debug, Error)]
pub enum CubbyError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Malformed transport encoding: {0}")]
    MalformedTransport(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CubbyError {
    /// True for per-request decode failures that are absorbed by closing
    /// the connection without a reply (never surfaced to the accept loop).
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CubbyError::MalformedTransport(_) | CubbyError::UnknownCommand(_)
        )
    }
}
