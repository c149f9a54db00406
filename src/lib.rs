//! # tinyftp
//!
//! A minimal file-transfer protocol with:
//! - One-byte bit-packed headers (3-bit opcode, 5-bit name length)
//! - Chunked bulk transfer terminated by an all-zero sentinel chunk
//! - Symmetric request/response state machines over one TCP connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐                ┌──────────────────────┐
//! │        Client        │   PUT / GET    │        Server        │
//! │ (command → request)  │ ─────────────► │ (request → dispatch) │
//! │                      │ ◄───────────── │                      │
//! └──────────┬───────────┘ ACK / FILEDATA └──────────┬───────────┘
//!            │              ERROR / HELP             │
//!            ▼                                       ▼
//!   ┌─────────────────┐                     ┌─────────────────┐
//!   │   File Store    │                     │   File Store    │
//!   └─────────────────┘                     └─────────────────┘
//!
//!            both sides:  protocol (frame · chunk · codec)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod client;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FtpError, Result};
pub use config::{Config, Termination, WireConfig};
pub use client::{Client, UserCommand};
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tinyftp
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
