//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use crate::config::WireConfig;
use crate::error::{FtpError, Result};
use crate::protocol::{read_request, write_response, ErrorCode, Request, Response};
use crate::store::FileStore;
use super::help::HELP_TEXT;

/// Where the connection is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingRequest,
    Dispatching,
    Responding,
    Closed,
}

/// Handles a single client connection
pub struct Connection<'a, S: FileStore> {
    /// TCP stream reader (buffered so the header byte can be peeked)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Files served by this connection
    store: &'a S,

    wire: WireConfig,

    state: ConnectionState,

    /// Peer address for logging
    peer_addr: String,
}

impl<'a, S: FileStore> Connection<'a, S> {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: &'a S, wire: WireConfig) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store,
            wire,
            state: ConnectionState::AwaitingRequest,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads one request per iteration and answers it. Returns `Ok` when the
    /// client disconnects; a frame that cannot be decoded ends the
    /// connection with an error, since there is no point to resynchronize at.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);
        let result = self.serve();
        self.transition(ConnectionState::Closed);
        result
    }

    fn serve(&mut self) -> Result<()> {
        loop {
            self.transition(ConnectionState::AwaitingRequest);
            let request = match read_request(&mut self.reader, &self.wire) {
                Ok(Some(request)) => request,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) if e.is_disconnect() => {
                    tracing::debug!("Client {} went away mid-request: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::debug!("Received {:?} request from {}", request.kind(), self.peer_addr);

            self.transition(ConnectionState::Dispatching);
            let response = self.dispatch(request);

            self.transition(ConnectionState::Responding);
            if let Err(e) = write_response(&mut self.writer, &response, &self.wire) {
                if e.is_disconnect() {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a request against the store and build its response
    fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Put { name, data } => self.handle_put(&name, &data),
            Request::Get { name } => self.handle_get(name),
            Request::Change { old_name, new_name } => self.handle_change(&old_name, &new_name),
            Request::Help => Response::HelpData {
                text: HELP_TEXT.as_bytes().to_vec(),
            },
        }
    }

    fn handle_put(&self, name: &str, data: &[u8]) -> Response {
        match self.store.write(name, data) {
            Ok(()) => {
                tracing::info!(
                    "Stored {} ({} bytes, crc32 {:08x})",
                    name,
                    data.len(),
                    crc32fast::hash(data)
                );
                Response::Ack
            }
            Err(e) => {
                tracing::warn!("Put {} failed: {}", name, e);
                Response::Error {
                    code: ErrorCode::Failed,
                }
            }
        }
    }

    fn handle_get(&self, name: String) -> Response {
        let read = self
            .store
            .size(&name)
            .and_then(|_| self.store.read(&name));

        match read {
            Ok(data) => {
                tracing::info!(
                    "Sending {} ({} bytes, crc32 {:08x})",
                    name,
                    data.len(),
                    crc32fast::hash(&data)
                );
                Response::FileData { name, data }
            }
            Err(FtpError::FileNotFound(_)) => {
                tracing::debug!("Get {}: not found", name);
                Response::Error {
                    code: ErrorCode::Failed,
                }
            }
            Err(e) => {
                tracing::warn!("Get {} failed: {}", name, e);
                Response::Error {
                    code: ErrorCode::Failed,
                }
            }
        }
    }

    fn handle_change(&self, old_name: &str, new_name: &str) -> Response {
        if !self.store.exists(old_name) {
            tracing::debug!("Change {}: not found", old_name);
            return Response::Error {
                code: ErrorCode::Failed,
            };
        }

        match self.store.rename(old_name, new_name) {
            Ok(()) => {
                tracing::info!("Renamed {} -> {}", old_name, new_name);
                Response::Ack
            }
            Err(FtpError::FileNotFound(_)) => Response::Error {
                code: ErrorCode::Failed,
            },
            Err(e) => {
                tracing::warn!("Change {} -> {} failed: {}", old_name, new_name, e);
                Response::Error {
                    code: ErrorCode::Failed,
                }
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!("Connection {}: {:?} -> {:?}", self.peer_addr, self.state, next);
        self.state = next;
    }

    /// Current position in the request/response cycle; `Closed` once
    /// [`handle`](Self::handle) has returned
    pub fn state(&self) -> ConnectionState {
        self.state
    }
}
