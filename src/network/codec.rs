//! Transport codec
//!
//! Physical framing for the reference TCP transport. Each fragment carries
//! the metadata a WebSocket-style transport hands to the dispatch engine.
//!
//! ## Wire Format
//!
//! ### Fragment (client -> device)
//! ```text
//! ┌────────────┬────────────┬────────────┬──────────────────────┐
//! │ Total (4)  │ Offset (4) │  Len (4)   │  Fragment bytes      │
//! └────────────┴────────────┴────────────┴──────────────────────┘
//! ```
//!
//! ### Reply (device -> client)
//! ```text
//! ┌────────────┬───────────────────────────────────────────────┐
//! │  Len (4)   │  Complete logical message                     │
//! └────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BufSyncError, Result};
use crate::stream::Fragment;

/// Fragment header size: total (4) + offset (4) + len (4)
pub const FRAGMENT_HEADER_SIZE: usize = 12;

/// Reply header size: len (4)
pub const REPLY_HEADER_SIZE: usize = 4;

/// A fragment read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFragment {
    pub data: Vec<u8>,
    pub offset: usize,
    pub total: usize,
}

impl OwnedFragment {
    pub fn as_fragment(&self) -> Fragment<'_> {
        Fragment::new(&self.data, self.offset, self.total)
    }
}

// =============================================================================
// Fragment Encoding/Decoding
// =============================================================================

/// Encode a fragment to bytes
pub fn encode_fragment(fragment: &Fragment<'_>) -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAGMENT_HEADER_SIZE + fragment.data.len());
    buf.put_u32(fragment.total as u32);
    buf.put_u32(fragment.offset as u32);
    buf.put_u32(fragment.data.len() as u32);
    buf.put_slice(fragment.data);
    buf.freeze()
}

/// Validate fragment metadata
fn check_fragment_header(total: usize, offset: usize, len: usize, max_len: usize) -> Result<()> {
    if len > max_len {
        return Err(BufSyncError::Protocol(format!(
            "Fragment too large: {} bytes (max {})",
            len, max_len
        )));
    }
    if total == 0 {
        return Err(BufSyncError::Protocol("Fragment of an empty message".to_string()));
    }
    if offset.checked_add(len).map_or(true, |end| end > total) {
        return Err(BufSyncError::Protocol(format!(
            "Fragment {}..{} exceeds message length {}",
            offset,
            offset.saturating_add(len),
            total
        )));
    }
    Ok(())
}

/// Decode a fragment from a complete byte slice
pub fn decode_fragment(bytes: &[u8], max_len: usize) -> Result<OwnedFragment> {
    if bytes.len() < FRAGMENT_HEADER_SIZE {
        return Err(BufSyncError::Protocol(format!(
            "Incomplete fragment header: expected {} bytes, got {}",
            FRAGMENT_HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..FRAGMENT_HEADER_SIZE];
    let total = header.get_u32() as usize;
    let offset = header.get_u32() as usize;
    let len = header.get_u32() as usize;
    check_fragment_header(total, offset, len, max_len)?;

    let end = FRAGMENT_HEADER_SIZE + len;
    if bytes.len() < end {
        return Err(BufSyncError::Protocol(format!(
            "Incomplete fragment: expected {} bytes, got {}",
            end,
            bytes.len()
        )));
    }

    Ok(OwnedFragment {
        data: bytes[FRAGMENT_HEADER_SIZE..end].to_vec(),
        offset,
        total,
    })
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(message: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(REPLY_HEADER_SIZE + message.len());
    buf.put_u32(message.len() as u32);
    buf.put_slice(message);
    buf.freeze()
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one fragment from a stream
///
/// Blocks until a complete fragment is received or an error occurs
pub fn read_fragment<R: Read>(reader: &mut R, max_len: usize) -> Result<OwnedFragment> {
    let mut header = [0u8; FRAGMENT_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut cursor = &header[..];
    let total = cursor.get_u32() as usize;
    let offset = cursor.get_u32() as usize;
    let len = cursor.get_u32() as usize;
    check_fragment_header(total, offset, len, max_len)?;

    let mut data = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut data)?;
    }

    Ok(OwnedFragment { data, offset, total })
}

/// Write one fragment to a stream
pub fn write_fragment<W: Write>(writer: &mut W, fragment: &Fragment<'_>) -> Result<()> {
    writer.write_all(&encode_fragment(fragment))?;
    writer.flush()?;
    Ok(())
}

/// Read one reply from a stream
pub fn read_reply<R: Read>(reader: &mut R, max_len: usize) -> Result<Bytes> {
    let mut header = [0u8; REPLY_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = u32::from_be_bytes(header) as usize;
    if len > max_len {
        return Err(BufSyncError::Protocol(format!(
            "Reply too large: {} bytes (max {})",
            len, max_len
        )));
    }

    let mut data = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut data)?;
    }
    Ok(Bytes::from(data))
}

/// Write one reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, message: &[u8]) -> Result<()> {
    writer.write_all(&encode_reply(message))?;
    writer.flush()?;
    Ok(())
}
