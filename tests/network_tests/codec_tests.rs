//! Codec Tests
//!
//! Tests for fragment and reply framing on the TCP transport.

use std::io::Cursor;

use bufsync::network::{
    decode_fragment, encode_fragment, encode_reply, read_fragment, read_reply, write_fragment,
    write_reply, FRAGMENT_HEADER_SIZE, REPLY_HEADER_SIZE,
};
use bufsync::stream::{split_fragments, Fragment};
use bufsync::BufSyncError;

const MAX: usize = 64 * 1024;

// =============================================================================
// Fragment Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_fragment_layout() {
    let encoded = encode_fragment(&Fragment::new(b"abc", 5, 8));

    assert_eq!(encoded.len(), FRAGMENT_HEADER_SIZE + 3);
    assert_eq!(&encoded[0..4], &[0, 0, 0, 8]);
    assert_eq!(&encoded[4..8], &[0, 0, 0, 5]);
    assert_eq!(&encoded[8..12], &[0, 0, 0, 3]);
    assert_eq!(&encoded[12..], b"abc");
}

#[test]
fn test_encode_decode_fragment() {
    let encoded = encode_fragment(&Fragment::new(b"set;3;\x01", 0, 10));
    let decoded = decode_fragment(&encoded, MAX).unwrap();

    assert_eq!(decoded.data, b"set;3;\x01");
    assert_eq!(decoded.offset, 0);
    assert_eq!(decoded.total, 10);
    assert!(decoded.as_fragment().is_first());
    assert!(!decoded.as_fragment().is_last());
}

#[test]
fn test_decode_incomplete_header() {
    let result = decode_fragment(&[0, 0, 0, 1], MAX);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_body() {
    let encoded = encode_fragment(&Fragment::new(b"abcdef", 0, 6));

    let result = decode_fragment(&encoded[..encoded.len() - 2], MAX);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

#[test]
fn test_decode_rejects_oversized_fragment() {
    let encoded = encode_fragment(&Fragment::new(&[0u8; 32], 0, 32));

    let result = decode_fragment(&encoded, 16);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

#[test]
fn test_decode_rejects_fragment_past_total() {
    let encoded = encode_fragment(&Fragment::new(b"abcd", 4, 6));

    let result = decode_fragment(&encoded, MAX);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

#[test]
fn test_decode_rejects_empty_message() {
    let encoded = encode_fragment(&Fragment::new(&[], 0, 0));

    let result = decode_fragment(&encoded, MAX);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_reply_layout() {
    let encoded = encode_reply(b"ping;0;1");

    assert_eq!(encoded.len(), REPLY_HEADER_SIZE + 8);
    assert_eq!(&encoded[..4], &[0, 0, 0, 8]);
    assert_eq!(&encoded[4..], b"ping;0;1");
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_read_fragments() {
    let message = b"settings;Settings;0123456789";
    let mut wire = Vec::new();
    for fragment in split_fragments(message, 8) {
        write_fragment(&mut wire, &fragment).unwrap();
    }

    let mut reader = Cursor::new(wire);
    let mut joined = Vec::new();
    loop {
        let fragment = read_fragment(&mut reader, MAX).unwrap();
        assert_eq!(fragment.offset, joined.len());
        joined.extend_from_slice(&fragment.data);
        if fragment.as_fragment().is_last() {
            break;
        }
    }

    assert_eq!(joined, message.to_vec());
}

#[test]
fn test_read_fragment_eof() {
    let mut reader = Cursor::new(Vec::new());

    let result = read_fragment(&mut reader, MAX);

    assert!(matches!(result, Err(BufSyncError::Io(_))));
}

#[test]
fn test_read_fragment_rejects_oversized() {
    let mut wire = Vec::new();
    write_fragment(&mut wire, &Fragment::new(&[7u8; 100], 0, 100)).unwrap();

    let result = read_fragment(&mut Cursor::new(wire), 50);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}

#[test]
fn test_write_read_replies() {
    let mut wire = Vec::new();
    write_reply(&mut wire, b"first").unwrap();
    write_reply(&mut wire, b"").unwrap();
    write_reply(&mut wire, b"third;1;\x00").unwrap();

    let mut reader = Cursor::new(wire);

    assert_eq!(&read_reply(&mut reader, MAX).unwrap()[..], b"first");
    assert!(read_reply(&mut reader, MAX).unwrap().is_empty());
    assert_eq!(&read_reply(&mut reader, MAX).unwrap()[..], b"third;1;\x00");
}

#[test]
fn test_read_reply_rejects_oversized() {
    let mut wire = Vec::new();
    write_reply(&mut wire, &[1u8; 64]).unwrap();

    let result = read_reply(&mut Cursor::new(wire), 10);

    assert!(matches!(result, Err(BufSyncError::Protocol(_))));
}
