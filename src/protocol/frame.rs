//! Frame codec
//!
//! Bit-level helpers shared by every message.
//!
//! ## Header Byte
//! ```text
//!   7   6   5   4   3   2   1   0
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │  opcode   │     name length   │
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//! ```
//!
//! Names are raw UTF-8 bytes whose length comes from the header (or, for a
//! Change request's new name, from a full length byte). Sizes are 4 bytes,
//! big-endian.

use bytes::{BufMut, BytesMut};

use crate::error::{FtpError, Result};

/// Longest name the 5-bit header field can describe
pub const MAX_NAME_LEN: usize = 31;

/// Longest new name in a Change request (full length byte)
pub const MAX_NEW_NAME_LEN: usize = 255;

/// Width of the size field
pub const SIZE_FIELD_LEN: usize = 4;

/// Largest opcode that fits in 3 bits
pub const MAX_OPCODE: u8 = 0b111;

const OPCODE_SHIFT: u32 = 5;
const LENGTH_MASK: u8 = 0b1_1111;

/// Pack an opcode and a primary name length into a header byte
pub fn encode_header(opcode: u8, name_len: usize) -> Result<u8> {
    if opcode > MAX_OPCODE {
        return Err(FtpError::Encoding(format!(
            "opcode {} does not fit in 3 bits",
            opcode
        )));
    }
    if name_len > MAX_NAME_LEN {
        return Err(FtpError::Encoding(format!(
            "name is {} bytes long, the limit is {}",
            name_len, MAX_NAME_LEN
        )));
    }
    Ok((opcode << OPCODE_SHIFT) | name_len as u8)
}

/// Split a header byte into `(opcode, name_len)`
pub fn decode_header(byte: u8) -> (u8, usize) {
    (byte >> OPCODE_SHIFT, (byte & LENGTH_MASK) as usize)
}

/// Encode a size as 4 big-endian bytes
pub fn encode_size(size: u64) -> Result<[u8; SIZE_FIELD_LEN]> {
    let size = u32::try_from(size).map_err(|_| {
        FtpError::Encoding(format!("size {} does not fit in 32 bits", size))
    })?;
    Ok(size.to_be_bytes())
}

pub fn decode_size(bytes: [u8; SIZE_FIELD_LEN]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Check a primary name (one whose length lives in the header)
pub fn check_name(name: &str) -> Result<()> {
    check_len("name", name, MAX_NAME_LEN)
}

/// Check the new name of a Change request
pub fn check_new_name(name: &str) -> Result<()> {
    check_len("new name", name, MAX_NEW_NAME_LEN)
}

fn check_len(what: &str, name: &str, limit: usize) -> Result<()> {
    if name.len() > limit {
        return Err(FtpError::Encoding(format!(
            "{} '{}' is {} bytes long, the limit is {}",
            what,
            name,
            name.len(),
            limit
        )));
    }
    Ok(())
}

/// Write `header(opcode, len(name)) · name`
pub(crate) fn put_named_header(buf: &mut BytesMut, opcode: u8, name: &str) -> Result<()> {
    buf.put_u8(encode_header(opcode, name.len())?);
    buf.put_slice(name.as_bytes());
    Ok(())
}

/// Read a UTF-8 name field from `bytes[start..start + len]`
pub(crate) fn read_name(bytes: &[u8], start: usize, len: usize) -> Result<String> {
    let field = bytes.get(start..start + len).ok_or_else(|| {
        FtpError::Protocol(format!(
            "truncated name: expected {} bytes at offset {}, frame has {}",
            len,
            start,
            bytes.len()
        ))
    })?;
    String::from_utf8(field.to_vec())
        .map_err(|e| FtpError::Protocol(format!("name is not valid UTF-8: {}", e)))
}

/// Read the 4-byte size field at `bytes[start..]`
pub(crate) fn read_size(bytes: &[u8], start: usize) -> Result<u32> {
    let field: [u8; SIZE_FIELD_LEN] = bytes
        .get(start..start + SIZE_FIELD_LEN)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            FtpError::Protocol(format!(
                "truncated size field at offset {}, frame has {} bytes",
                start,
                bytes.len()
            ))
        })?;
    Ok(decode_size(field))
}
