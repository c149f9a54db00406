//! Chunk Transport Tests
//!
//! Tests for chunked send/receive, padding, and the sentinel chunk.

use std::io::Cursor;

use tinyftp::protocol::chunk::{
    is_sentinel, receive, receive_sized, send, MAX_RESERVED_CHUNKS,
};
use tinyftp::FtpError;

const C: usize = 1024;

fn send_to_vec(payload: &[u8], chunk_size: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let chunks = send(&mut out, payload, chunk_size).unwrap();
    (out, chunks)
}

// =============================================================================
// Send Tests
// =============================================================================

#[test]
fn test_send_empty_payload_is_only_sentinel() {
    let (wire, chunks) = send_to_vec(&[], C);
    assert_eq!(chunks, 0);
    assert_eq!(wire.len(), C);
    assert!(is_sentinel(&wire));
}

#[test]
fn test_send_pads_last_chunk() {
    let payload: Vec<u8> = (0..2500).map(|i| (i % 251) as u8 + 1).collect();
    let (wire, chunks) = send_to_vec(&payload, C);

    assert_eq!(chunks, 3);
    assert_eq!(wire.len(), 4 * C);
    assert_eq!(&wire[..2500], &payload[..]);
    assert!(wire[2500..3 * C].iter().all(|&b| b == 0));
    assert!(is_sentinel(&wire[3 * C..]));
}

#[test]
fn test_send_full_last_chunk_still_gets_sentinel() {
    let payload = vec![0xAB; 2 * C];
    let (wire, chunks) = send_to_vec(&payload, C);

    assert_eq!(chunks, 2);
    assert_eq!(wire.len(), 3 * C);
    assert!(is_sentinel(&wire[2 * C..]));
}

// =============================================================================
// Receive Tests
// =============================================================================

#[test]
fn test_receive_returns_padded_payload() {
    let payload = b"hello chunked world".to_vec();
    let (wire, _) = send_to_vec(&payload, C);

    let received = receive(&mut Cursor::new(wire), C).unwrap();
    assert_eq!(received.len(), C);
    assert_eq!(&received[..payload.len()], &payload[..]);
    assert!(received[payload.len()..].iter().all(|&b| b == 0));
}

#[test]
fn test_receive_exact_multiple_of_chunk_size() {
    let payload: Vec<u8> = (0..3 * C).map(|i| (i % 7) as u8 + 1).collect();
    let (wire, _) = send_to_vec(&payload, C);

    let received = receive(&mut Cursor::new(wire), C).unwrap();
    assert_eq!(&received[..], &payload[..]);
}

#[test]
fn test_receive_empty_payload() {
    let (wire, _) = send_to_vec(&[], C);
    let received = receive(&mut Cursor::new(wire), C).unwrap();
    assert!(received.is_empty());
}

#[test]
fn test_receive_leaves_following_bytes_in_stream() {
    let (mut wire, _) = send_to_vec(b"first", 64);
    wire.extend_from_slice(b"next");

    let mut cursor = Cursor::new(wire);
    receive(&mut cursor, 64).unwrap();
    assert_eq!(cursor.position(), 128);
}

#[test]
fn test_receive_truncates_payload_ending_in_zero_chunk() {
    // A final data chunk of all zeros looks exactly like the sentinel
    let mut payload = vec![0x11; C];
    payload.extend_from_slice(&[0u8; C]);
    let (wire, chunks) = send_to_vec(&payload, C);
    assert_eq!(chunks, 2);

    let received = receive(&mut Cursor::new(wire), C).unwrap();
    assert_eq!(received.len(), C);
    assert_eq!(&received[..], &payload[..C]);
}

#[test]
fn test_receive_truncated_stream_is_transport_error() {
    let (wire, _) = send_to_vec(b"data", C);
    let cut = wire[..C / 2].to_vec();

    match receive(&mut Cursor::new(cut), C) {
        Err(FtpError::Transport(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
}

// =============================================================================
// Declared-Length Receive Tests
// =============================================================================

#[test]
fn test_receive_sized_keeps_trailing_zero_chunk() {
    let mut payload = vec![0x11; C];
    payload.extend_from_slice(&[0u8; C]);
    let (wire, _) = send_to_vec(&payload, C);

    let received = receive_sized(&mut Cursor::new(wire), C, |_| Ok(2 * C)).unwrap();
    assert_eq!(&received[..], &payload[..]);
}

#[test]
fn test_receive_sized_truncates_padding() {
    let payload = vec![0x22; 1500];
    let (wire, _) = send_to_vec(&payload, C);

    let mut cursor = Cursor::new(wire);
    let received = receive_sized(&mut cursor, C, |_| Ok(1500)).unwrap();
    assert_eq!(&received[..], &payload[..]);
    assert_eq!(cursor.position() as usize, 3 * C);
}

#[test]
fn test_receive_sized_requires_sentinel() {
    // Declaring one chunk puts the second data chunk where the sentinel belongs
    let payload = vec![0x33; 2 * C];
    let (wire, _) = send_to_vec(&payload, C);

    match receive_sized(&mut Cursor::new(wire), C, |_| Ok(C)) {
        Err(FtpError::Protocol(_)) => {}
        other => panic!("expected Protocol error, got {:?}", other),
    }
}

#[test]
fn test_receive_sized_propagates_length_error() {
    let (wire, _) = send_to_vec(b"abc", C);
    let result = receive_sized(&mut Cursor::new(wire), C, |_| {
        Err(FtpError::Protocol("bad preamble".to_string()))
    });
    assert!(matches!(result, Err(FtpError::Protocol(_))));
}

#[test]
fn test_receive_sized_huge_declared_size_fails_on_eof() {
    // Put "a" declaring u32::MAX data bytes, then the peer hangs up
    let mut wire = vec![0x01, b'a', 0xFF, 0xFF, 0xFF, 0xFF];
    wire.resize(C, 0x7F);

    let result = receive_sized(&mut Cursor::new(wire), C, |chunk| {
        let size = u32::from_be_bytes([chunk[2], chunk[3], chunk[4], chunk[5]]);
        Ok(6 + size as usize)
    });
    match result {
        Err(FtpError::Transport(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
}

#[test]
fn test_receive_sized_grows_past_reserved_chunks() {
    let chunk_size = 8;
    let payload: Vec<u8> = (0..(MAX_RESERVED_CHUNKS + 3) * chunk_size)
        .map(|i| (i % 251) as u8 + 1)
        .collect();
    let (wire, _) = send_to_vec(&payload, chunk_size);

    let total = payload.len();
    let received = receive_sized(&mut Cursor::new(wire), chunk_size, |_| Ok(total)).unwrap();
    assert_eq!(&received[..], &payload[..]);
}
