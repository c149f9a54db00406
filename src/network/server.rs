//! TCP Server
//!
//! Accepts connections and serves them one at a time.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::store::FileStore;
use super::Connection;

/// TCP server for tinyftp
///
/// A second client waits in the listen backlog until the current connection
/// ends.
pub struct Server<S: FileStore> {
    config: Config,
    listener: TcpListener,
    local_addr: SocketAddr,
    store: S,
    shutdown: Arc<AtomicBool>,
}

/// Stops a running [`Server`] from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop once the current connection ends
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Wake a blocking accept()
        if let Err(e) = TcpStream::connect(self.addr) {
            tracing::debug!("Shutdown wake-up of {} failed: {}", self.addr, e);
        }
    }
}

impl<S: FileStore> Server<S> {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, store: S) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            listener,
            local_addr,
            store,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr,
        }
    }

    /// Accept one connection and serve it until the client goes away
    pub fn serve_next(&mut self) -> Result<()> {
        let (stream, addr) = self.listener.accept()?;
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Accepted connection from {}", addr);

        let mut connection = Connection::new(stream, &self.store, self.config.wire)?;
        let result = connection.handle();
        tracing::info!("Connection from {} closed", addr);
        result
    }

    /// Start the server (blocking)
    ///
    /// Connection errors are logged and the server goes back to accepting.
    pub fn run(&mut self) -> Result<()> {
        while !self.shutdown.load(Ordering::SeqCst) {
            if let Err(e) = self.serve_next() {
                tracing::warn!("Connection ended with error: {}", e);
            }
        }
        tracing::info!("Server on {} shut down", self.local_addr);
        Ok(())
    }
}
