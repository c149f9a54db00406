//! Request definitions
//!
//! Represents requests sent by clients.

use bytes::{BufMut, BytesMut};

use crate::error::{FtpError, Result};
use super::frame::{
    check_name, check_new_name, decode_header, encode_header, encode_size, put_named_header,
    read_name, read_size, SIZE_FIELD_LEN,
};

/// Request opcodes (high 3 bits of the header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestKind {
    Put = 0b000,
    Get = 0b001,
    Change = 0b010,
    Help = 0b011,
}

impl RequestKind {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0b000 => Some(RequestKind::Put),
            0b001 => Some(RequestKind::Get),
            0b010 => Some(RequestKind::Change),
            0b011 => Some(RequestKind::Help),
            _ => None,
        }
    }

    /// Only Put requests travel over the chunk transport
    pub fn is_chunked(self) -> bool {
        matches!(self, RequestKind::Put)
    }
}

/// A client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Upload a file
    Put { name: String, data: Vec<u8> },

    /// Download a file
    Get { name: String },

    /// Rename a file on the server
    Change { old_name: String, new_name: String },

    /// Ask for the command listing
    Help,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Put { .. } => RequestKind::Put,
            Request::Get { .. } => RequestKind::Get,
            Request::Change { .. } => RequestKind::Change,
            Request::Help => RequestKind::Help,
        }
    }

    /// Serialize to wire bytes (before any chunking).
    ///
    /// ```text
    /// Put:    header · name · size(4) · data
    /// Get:    header · name
    /// Change: header · old_name · new_len(1) · new_name
    /// Help:   header
    /// ```
    pub fn encode(&self) -> Result<BytesMut> {
        let opcode = self.kind() as u8;
        let mut buf = BytesMut::new();

        match self {
            Request::Put { name, data } => {
                check_name(name)?;
                let size = encode_size(data.len() as u64)?;
                buf.reserve(1 + name.len() + SIZE_FIELD_LEN + data.len());
                put_named_header(&mut buf, opcode, name)?;
                buf.put_slice(&size);
                buf.put_slice(data);
            }
            Request::Get { name } => {
                check_name(name)?;
                put_named_header(&mut buf, opcode, name)?;
            }
            Request::Change { old_name, new_name } => {
                check_name(old_name)?;
                check_new_name(new_name)?;
                put_named_header(&mut buf, opcode, old_name)?;
                buf.put_u8(new_name.len() as u8);
                buf.put_slice(new_name.as_bytes());
            }
            Request::Help => {
                buf.put_u8(encode_header(opcode, 0)?);
            }
        }

        Ok(buf)
    }

    /// Decode a complete request frame.
    ///
    /// Put frames may carry trailing zero padding from the chunk transport;
    /// data is cut to the declared size.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let first = *bytes
            .first()
            .ok_or_else(|| FtpError::Protocol("empty request frame".to_string()))?;
        let (opcode, name_len) = decode_header(first);

        let kind = RequestKind::from_opcode(opcode).ok_or_else(|| {
            FtpError::Protocol(format!("unknown request opcode 0b{:03b}", opcode))
        })?;

        match kind {
            RequestKind::Put => {
                let name = read_name(bytes, 1, name_len)?;
                let size = read_size(bytes, 1 + name_len)? as usize;
                let start = 1 + name_len + SIZE_FIELD_LEN;
                let data = bytes.get(start..start + size).ok_or_else(|| {
                    FtpError::Protocol(format!(
                        "Put '{}': declared {} bytes, received {}",
                        name,
                        size,
                        bytes.len().saturating_sub(start)
                    ))
                })?;
                Ok(Request::Put {
                    name,
                    data: data.to_vec(),
                })
            }
            RequestKind::Get => Ok(Request::Get {
                name: read_name(bytes, 1, name_len)?,
            }),
            RequestKind::Change => {
                let old_name = read_name(bytes, 1, name_len)?;
                let new_len = *bytes.get(1 + name_len).ok_or_else(|| {
                    FtpError::Protocol("Change: missing new name length".to_string())
                })? as usize;
                let new_name = read_name(bytes, 2 + name_len, new_len)?;
                Ok(Request::Change { old_name, new_name })
            }
            RequestKind::Help => Ok(Request::Help),
        }
    }
}
