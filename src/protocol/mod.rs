//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Header Byte
//! ```text
//! ┌───────────────┬──────────────────────────┐
//! │ Opcode (3 bit)│   Name length (5 bit)    │
//! └───────────────┴──────────────────────────┘
//! ```
//!
//! ### Requests
//! - 000: PUT    - name · size (4) · data       (chunked)
//! - 001: GET    - name
//! - 010: CHANGE - old name · new len (1) · new name
//! - 011: HELP   - empty
//!
//! ### Responses
//! - 000: ACK       - single 0x00 byte
//! - 001: FILEDATA  - name · size (4) · data    (chunked)
//! - 010: ERROR     - error code in the length bits
//! - 110: HELPDATA  - text                      (chunked)
//!
//! Chunked messages are split into fixed-size, zero-padded chunks followed
//! by an all-zero sentinel chunk (see [`chunk`]).

pub mod frame;
pub mod chunk;
mod request;
mod response;
mod codec;

pub use request::{Request, RequestKind};
pub use response::{ErrorCode, Response, ResponseKind};
pub use codec::{read_request, write_request, read_response, write_response};
