//! Client Module
//!
//! Turns user commands into requests and interprets the server's answers.
//!
//! ## State Machine
//! ```text
//! Disconnected ──► Connected ──► AwaitingCommand ◄──────────┐
//!                                   │        │               │
//!                                   │ bye    │ put/get/...   │
//!                                   ▼        ▼               │
//!                                Closed   AwaitingResponse ──┘
//! ```

mod command;
mod session;

pub use command::UserCommand;
pub use session::{Client, ClientState, Outcome};
