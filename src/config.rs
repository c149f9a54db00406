//! Configuration for tinyftp
//!
//! Centralized configuration with sensible defaults. The wire settings
//! (`chunk_size`) must match on both ends of a connection; changing them
//! breaks compatibility with peers using the defaults.

use std::path::PathBuf;

use crate::error::{FtpError, Result};
use crate::protocol::frame::{MAX_NAME_LEN, SIZE_FIELD_LEN};

/// Reference chunk size for bulk transfers
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Reference port of the legacy server
pub const DEFAULT_ADDR: &str = "127.0.0.1:32323";

/// Main configuration for a client or server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address (server)
    pub listen_addr: String,

    /// Address to connect to (client)
    pub server_addr: String,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory backing the file store
    pub root_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Wire Configuration
    // -------------------------------------------------------------------------
    pub wire: WireConfig,
}

/// Settings both peers must agree on, plus the local receive policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConfig {
    /// Size of every chunk in a chunked transfer, sentinel included
    pub chunk_size: usize,

    /// How the end of a chunked transfer is detected
    pub termination: Termination,
}

/// Receive-side policy for chunked transfers.
///
/// Senders always emit the same bytes; this only changes how a reader
/// decides the transfer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// Read exactly the chunks covered by the frame's size field, then
    /// require the all-zero sentinel chunk.
    #[default]
    DeclaredLength,

    /// Stop at the first all-zero chunk. A payload whose last chunk is all
    /// zeros is truncated.
    Sentinel,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            termination: Termination::default(),
        }
    }
}

impl WireConfig {
    /// Smallest chunk that can hold the largest Put/FileData preamble
    pub const MIN_CHUNK_SIZE: usize = 1 + MAX_NAME_LEN + SIZE_FIELD_LEN;

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < Self::MIN_CHUNK_SIZE {
            return Err(FtpError::Config(format!(
                "chunk size {} is below the minimum of {} bytes",
                self.chunk_size,
                Self::MIN_CHUNK_SIZE
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_ADDR.to_string(),
            server_addr: DEFAULT_ADDR.to_string(),
            root_dir: PathBuf::from("."),
            wire: WireConfig::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.wire.validate()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the server address the client connects to
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the directory backing the file store
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.wire.chunk_size = size;
        self
    }

    /// Set the receive-side termination policy
    pub fn termination(mut self, termination: Termination) -> Self {
        self.config.wire.termination = termination;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
