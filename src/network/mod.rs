//! Network Module
//!
//! TCP server and per-connection request handling.
//!
//! ## Architecture
//! - Single thread, blocking I/O
//! - One connection served at a time; the accept loop resumes when the
//!   client disconnects
//! - Each request is answered by exactly one response
//!
//! ## Connection States
//! ```text
//! AwaitingRequest ──► Dispatching ──► Responding ──┐
//!        ▲                                         │
//!        └─────────────────────────────────────────┘
//!        │ EOF / fatal frame error
//!        ▼
//!      Closed
//! ```

mod server;
mod connection;
mod help;

pub use server::{Server, ShutdownHandle};
pub use connection::{Connection, ConnectionState};
pub use help::HELP_TEXT;
