//! Error types for bufsync
//!
//! Provides a unified error type for all operations. The four protocol
//! variants terminate only the current exchange; none of them touch the
//! registries.

use thiserror::Error;

/// Result type alias using BufSyncError
pub type Result<T> = std::result::Result<T, BufSyncError>;

/// Unified error type for bufsync operations
#[derive(Debug, Error)]
pub enum BufSyncError {
    // -------------------------------------------------------------------------
    // Exchange Errors
    // -------------------------------------------------------------------------
    #[error("Missing X-Type header")]
    TypeMissing,

    #[error("Expected X-Type header to be {expected}, got {received}")]
    TypeMismatch { expected: String, received: String },

    #[error("Invalid checksum: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: u16 },

    #[error("Invalid binary size: expected {expected} bytes, got {received}")]
    SizeMismatch { expected: usize, received: usize },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BufSyncError {
    /// Numeric status value surfaced to the request/response transport
    ///
    /// Only the exchange errors carry one; everything else is a transport
    /// failure and has no per-exchange status.
    pub fn status_code(&self) -> Option<i8> {
        match self {
            BufSyncError::TypeMissing => Some(-1),
            BufSyncError::TypeMismatch { .. } => Some(-2),
            BufSyncError::ChecksumMismatch { .. } => Some(-3),
            BufSyncError::SizeMismatch { .. } => Some(-4),
            _ => None,
        }
    }

    /// Plain-text reason sent with a 400 reply
    pub fn reason(&self) -> String {
        match self {
            BufSyncError::TypeMissing => "Missing X-Type header".to_string(),
            BufSyncError::TypeMismatch { expected, .. } => {
                format!("Expected X-Type header to be {}", expected)
            }
            BufSyncError::ChecksumMismatch { .. } => "Invalid checksum".to_string(),
            BufSyncError::SizeMismatch { .. } => "Invalid binary size".to_string(),
            other => other.to_string(),
        }
    }

    /// True for the four failure kinds that end a single exchange
    pub fn is_exchange_error(&self) -> bool {
        self.status_code().is_some()
    }
}
