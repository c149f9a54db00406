//! Error types for tinyftp
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::ErrorCode;

/// Result type alias using FtpError
pub type Result<T> = std::result::Result<T, FtpError>;

/// Unified error type for tinyftp operations
#[derive(Debug, Error)]
pub enum FtpError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    /// A name or size cannot be represented on the wire. Raised before any
    /// bytes are sent.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A received frame could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The peer answered with an `Error` response.
    #[error("Server reported failure: {0}")]
    Application(ErrorCode),

    // -------------------------------------------------------------------------
    // File Store Errors
    // -------------------------------------------------------------------------
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // User Input / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid command: {0}")]
    Command(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FtpError {
    /// Fatal errors abandon the connection; everything else is reported and
    /// the session carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FtpError::Protocol(_) | FtpError::Transport(_))
    }

    /// True when the underlying stream ended or was torn down by the peer.
    pub fn is_disconnect(&self) -> bool {
        match self {
            FtpError::Transport(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
