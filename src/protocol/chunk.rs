//! Chunk transport
//!
//! Streams a payload as fixed-size chunks over an ordered byte stream.
//!
//! ```text
//! ┌────────────┬────────────┬─────────────────┬────────────┐
//! │  chunk 0   │  chunk 1   │ chunk n (0-pad) │ 00 00 .. 00│
//! └────────────┴────────────┴─────────────────┴────────────┘
//!                                               sentinel
//! ```
//!
//! Every chunk, sentinel included, is exactly `chunk_size` bytes. The sender
//! always appends the sentinel, even when the last data chunk is full.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{FtpError, Result};

/// Upper bound on chunks reserved ahead of a sized receive; larger frames
/// grow the buffer as their chunks arrive
pub const MAX_RESERVED_CHUNKS: usize = 1024;

/// True if `chunk` is entirely zero bytes
pub fn is_sentinel(chunk: &[u8]) -> bool {
    chunk.iter().all(|&b| b == 0)
}

/// Send `payload` as zero-padded chunks followed by the sentinel chunk.
///
/// Returns the number of data chunks written (the sentinel is not counted).
pub fn send<W: Write>(writer: &mut W, payload: &[u8], chunk_size: usize) -> Result<usize> {
    let mut sent = 0;
    for piece in payload.chunks(chunk_size) {
        writer.write_all(piece)?;
        if piece.len() < chunk_size {
            writer.write_all(&vec![0u8; chunk_size - piece.len()])?;
        }
        sent += 1;
    }
    writer.write_all(&vec![0u8; chunk_size])?;
    writer.flush()?;

    tracing::debug!(
        "Sent {} bytes as {} chunks of {} plus sentinel",
        payload.len(),
        sent,
        chunk_size
    );
    Ok(sent)
}

/// Read chunks until the first all-zero chunk.
///
/// The result keeps the zero padding of the last data chunk; the payload's
/// real length has to come from a size field inside it. A payload whose
/// final chunk is all zeros is cut short here, since that chunk is
/// indistinguishable from the sentinel.
pub fn receive<R: Read>(reader: &mut R, chunk_size: usize) -> Result<BytesMut> {
    let mut payload = BytesMut::new();
    let mut chunk = vec![0u8; chunk_size];

    loop {
        reader.read_exact(&mut chunk)?;
        if is_sentinel(&chunk) {
            break;
        }
        payload.put_slice(&chunk);
    }

    tracing::trace!("Received {} chunked bytes (sentinel terminated)", payload.len());
    Ok(payload)
}

/// Read a chunked frame whose total length is declared inside its first
/// chunk.
///
/// `frame_len` inspects the first chunk and returns the frame's real length.
/// Exactly the chunks covering that length are read, then one sentinel chunk
/// is required. The result is truncated to the declared length.
pub fn receive_sized<R, F>(reader: &mut R, chunk_size: usize, frame_len: F) -> Result<BytesMut>
where
    R: Read,
    F: FnOnce(&[u8]) -> Result<usize>,
{
    let mut chunk = vec![0u8; chunk_size];
    reader.read_exact(&mut chunk)?;

    let total = frame_len(&chunk)?;
    let data_chunks = total.div_ceil(chunk_size).max(1);

    // The size field is unverified until the data arrives
    let reserve = data_chunks.min(MAX_RESERVED_CHUNKS) * chunk_size;
    let mut payload = BytesMut::with_capacity(reserve);
    payload.put_slice(&chunk);
    for _ in 1..data_chunks {
        reader.read_exact(&mut chunk)?;
        payload.put_slice(&chunk);
    }

    reader.read_exact(&mut chunk)?;
    if !is_sentinel(&chunk) {
        return Err(FtpError::Protocol(format!(
            "expected end-of-transfer chunk after {} data chunks",
            data_chunks
        )));
    }

    payload.truncate(total);
    tracing::trace!("Received {} chunked bytes ({} chunks)", total, data_chunks);
    Ok(payload)
}
