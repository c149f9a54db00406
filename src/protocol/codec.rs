//! Protocol codec
//!
//! Reads and writes whole messages on a byte stream.
//!
//! Reading is header driven: the first byte is peeked without consuming it,
//! and the opcode plus length bits decide how many more bytes to read and
//! whether the chunk transport is involved. Chunked frames start with that
//! same header byte, so it must still be in the stream when the chunk
//! reader starts.
//!
//! Each call owns its receive buffer; nothing survives from one message to
//! the next.

use std::io::{BufRead, Write};

use bytes::BytesMut;

use crate::config::{Termination, WireConfig};
use crate::error::{FtpError, Result};
use super::chunk;
use super::frame::{decode_header, read_size, SIZE_FIELD_LEN};
use super::{Request, RequestKind, Response, ResponseKind};

/// Look at the next byte without consuming it. `None` on end of stream.
fn peek_byte<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    let buf = reader.fill_buf()?;
    Ok(buf.first().copied())
}

/// Read exactly `len` bytes into a fresh buffer
fn read_frame<R: BufRead>(reader: &mut R, len: usize) -> Result<BytesMut> {
    let mut frame = BytesMut::zeroed(len);
    reader.read_exact(&mut frame)?;
    Ok(frame)
}

/// Total length of a `header · name · size · data` frame, from its first chunk
fn sized_frame_len(first_chunk: &[u8]) -> Result<usize> {
    let (_, name_len) = decode_header(first_chunk[0]);
    let size = read_size(first_chunk, 1 + name_len)? as usize;
    Ok(1 + name_len + SIZE_FIELD_LEN + size)
}

/// Receive a chunked frame that carries a size field
fn receive_sized_frame<R: BufRead>(reader: &mut R, wire: &WireConfig) -> Result<BytesMut> {
    match wire.termination {
        Termination::DeclaredLength => {
            chunk::receive_sized(reader, wire.chunk_size, sized_frame_len)
        }
        Termination::Sentinel => chunk::receive(reader, wire.chunk_size),
    }
}

/// Send encoded bytes either chunked or in a single write
fn send_frame<W: Write>(writer: &mut W, frame: &[u8], chunked: bool, wire: &WireConfig) -> Result<()> {
    if chunked {
        chunk::send(writer, frame, wire.chunk_size)?;
    } else {
        writer.write_all(frame)?;
        writer.flush()?;
    }
    Ok(())
}

// =============================================================================
// Requests
// =============================================================================

/// Read one request from a stream.
///
/// Returns `Ok(None)` if the stream ends cleanly before a header byte.
pub fn read_request<R: BufRead>(reader: &mut R, wire: &WireConfig) -> Result<Option<Request>> {
    let header = match peek_byte(reader)? {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let (opcode, name_len) = decode_header(header);

    let kind = RequestKind::from_opcode(opcode).ok_or_else(|| {
        FtpError::Protocol(format!("unknown request opcode 0b{:03b}", opcode))
    })?;

    let frame = match kind {
        RequestKind::Put => receive_sized_frame(reader, wire)?,
        RequestKind::Get => read_frame(reader, 1 + name_len)?,
        RequestKind::Change => {
            let mut frame = read_frame(reader, 2 + name_len)?;
            let new_len = frame[1 + name_len] as usize;
            frame.extend_from_slice(&read_frame(reader, new_len)?);
            frame
        }
        RequestKind::Help => read_frame(reader, 1)?,
    };

    Request::decode(&frame).map(Some)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request, wire: &WireConfig) -> Result<()> {
    let frame = request.encode()?;
    send_frame(writer, &frame, request.kind().is_chunked(), wire)
}

// =============================================================================
// Responses
// =============================================================================

/// Read one response from a stream
pub fn read_response<R: BufRead>(reader: &mut R, wire: &WireConfig) -> Result<Response> {
    let header = peek_byte(reader)?.ok_or_else(|| {
        FtpError::Transport(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed while awaiting a response",
        ))
    })?;

    if header == 0x00 {
        reader.consume(1);
        return Ok(Response::Ack);
    }

    let (opcode, _) = decode_header(header);
    let kind = ResponseKind::from_opcode(opcode).ok_or_else(|| {
        FtpError::Protocol(format!("unknown response opcode 0b{:03b}", opcode))
    })?;

    let frame = match kind {
        ResponseKind::FileData => receive_sized_frame(reader, wire)?,
        // No size field; the text has no NULs so the sentinel is unambiguous
        ResponseKind::HelpData => chunk::receive(reader, wire.chunk_size)?,
        ResponseKind::Ack | ResponseKind::Error => read_frame(reader, 1)?,
    };

    Response::decode(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response, wire: &WireConfig) -> Result<()> {
    let frame = response.encode()?;
    send_frame(writer, &frame, response.kind().is_chunked(), wire)
}
