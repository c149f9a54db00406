//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{FtpError, Result};
use super::frame::{
    check_name, decode_header, encode_header, encode_size, put_named_header, read_name,
    read_size, SIZE_FIELD_LEN,
};

/// Response opcodes (high 3 bits of the header)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseKind {
    Ack = 0b000,
    FileData = 0b001,
    Error = 0b010,
    HelpData = 0b110,
}

impl ResponseKind {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0b000 => Some(ResponseKind::Ack),
            0b001 => Some(ResponseKind::FileData),
            0b010 => Some(ResponseKind::Error),
            0b110 => Some(ResponseKind::HelpData),
            _ => None,
        }
    }

    /// FileData and HelpData travel over the chunk transport
    pub fn is_chunked(self) -> bool {
        matches!(self, ResponseKind::FileData | ResponseKind::HelpData)
    }
}

/// Failure reported by an `Error` response
///
/// The low 5 bits of an `Error` header are always zero, so the wire carries
/// no reason. Whether a file was missing or the store failed is only visible
/// in the server log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// The server could not carry out the request
    Failed = 0,
}

impl ErrorCode {
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            0 => Some(ErrorCode::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Failed => write!(f, "request failed"),
        }
    }
}

/// A server response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Put or Change succeeded
    Ack,

    /// Contents of a requested file
    FileData { name: String, data: Vec<u8> },

    /// Command listing. Must not contain NUL bytes, which are read back as
    /// chunk padding.
    HelpData { text: Vec<u8> },

    /// The request failed
    Error { code: ErrorCode },
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Ack => ResponseKind::Ack,
            Response::FileData { .. } => ResponseKind::FileData,
            Response::HelpData { .. } => ResponseKind::HelpData,
            Response::Error { .. } => ResponseKind::Error,
        }
    }

    /// Serialize to wire bytes (before any chunking).
    ///
    /// ```text
    /// Ack:      0x00
    /// FileData: header · name · size(4) · data
    /// HelpData: header(len & 0x1f) · text
    /// Error:    0x40
    /// ```
    pub fn encode(&self) -> Result<BytesMut> {
        let opcode = self.kind() as u8;
        let mut buf = BytesMut::new();

        match self {
            Response::Ack => buf.put_u8(encode_header(opcode, 0)?),
            Response::FileData { name, data } => {
                check_name(name)?;
                let size = encode_size(data.len() as u64)?;
                buf.reserve(1 + name.len() + SIZE_FIELD_LEN + data.len());
                put_named_header(&mut buf, opcode, name)?;
                buf.put_slice(&size);
                buf.put_slice(data);
            }
            Response::HelpData { text } => {
                if text.contains(&0) {
                    return Err(FtpError::Encoding(
                        "help text must not contain NUL bytes".to_string(),
                    ));
                }
                buf.reserve(1 + text.len());
                buf.put_u8(encode_header(opcode, text.len() & 0x1f)?);
                buf.put_slice(text);
            }
            Response::Error { .. } => buf.put_u8(encode_header(opcode, 0)?),
        }

        Ok(buf)
    }

    /// Decode a complete response frame.
    ///
    /// Chunked frames may carry trailing zero padding: FileData data is cut
    /// to the declared size, HelpData text has trailing NULs trimmed.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let first = *bytes
            .first()
            .ok_or_else(|| FtpError::Protocol("empty response frame".to_string()))?;
        let (opcode, len_bits) = decode_header(first);

        let kind = ResponseKind::from_opcode(opcode).ok_or_else(|| {
            FtpError::Protocol(format!("unknown response opcode 0b{:03b}", opcode))
        })?;

        match kind {
            ResponseKind::Ack if len_bits == 0 => Ok(Response::Ack),
            ResponseKind::Ack => Err(FtpError::Protocol(format!(
                "Ack carries unexpected length bits {}",
                len_bits
            ))),
            ResponseKind::FileData => {
                let name = read_name(bytes, 1, len_bits)?;
                let size = read_size(bytes, 1 + len_bits)? as usize;
                let start = 1 + len_bits + SIZE_FIELD_LEN;
                let data = bytes.get(start..start + size).ok_or_else(|| {
                    FtpError::Protocol(format!(
                        "FileData '{}': declared {} bytes, received {}",
                        name,
                        size,
                        bytes.len().saturating_sub(start)
                    ))
                })?;
                Ok(Response::FileData {
                    name,
                    data: data.to_vec(),
                })
            }
            ResponseKind::HelpData => {
                let body = &bytes[1..];
                let end = body.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                let text = &body[..end];
                if text.len() & 0x1f != len_bits {
                    return Err(FtpError::Protocol(format!(
                        "HelpData length bits {} do not match {} text bytes",
                        len_bits,
                        text.len()
                    )));
                }
                Ok(Response::HelpData {
                    text: text.to_vec(),
                })
            }
            ResponseKind::Error => {
                let code = ErrorCode::from_bits(len_bits).ok_or_else(|| {
                    FtpError::Protocol(format!(
                        "Error carries unexpected length bits {}",
                        len_bits
                    ))
                })?;
                Ok(Response::Error { code })
            }
        }
    }
}
