//! Logical message layout
//!
//! ```text
//! ┌───────────┬───┬──────────────┬───┬──────────────────────────┐
//! │ command   │ ; │ type token   │ ; │ body (raw bytes)         │
//! └───────────┴───┴──────────────┴───┴──────────────────────────┘
//! ```
//!
//! The two leading fields are ASCII. Everything after the second `;` is raw
//! and may be split across any number of fragments.

use bytes::{BufMut, Bytes, BytesMut};

use crate::types::TypeId;

/// Field delimiter
pub const DELIMITER: u8 = b';';

/// Shortest first fragment that can carry a header
pub const MIN_HEADER_FRAGMENT: usize = 3;

/// One physically delivered piece of a logical message
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    /// Bytes of this piece
    pub data: &'a [u8],

    /// Offset of this piece within the logical message
    pub offset: usize,

    /// Length of the whole logical message
    pub total: usize,
}

impl<'a> Fragment<'a> {
    pub fn new(data: &'a [u8], offset: usize, total: usize) -> Self {
        Self { data, offset, total }
    }

    /// A message delivered in one piece
    pub fn whole(data: &'a [u8]) -> Self {
        Self::new(data, 0, data.len())
    }

    /// Starts a new logical message
    pub fn is_first(&self) -> bool {
        self.offset == 0
    }

    /// Ends the logical message
    pub fn is_last(&self) -> bool {
        self.offset.saturating_add(self.data.len()) == self.total
    }
}

/// The two text fields at the start of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub command: String,
    pub type_token: String,

    /// Bytes consumed by the header, delimiters included
    pub len: usize,
}

impl MessageHeader {
    /// Parse the header from the start of a first fragment
    ///
    /// Parsing stops after the second delimiter or at the end of the input,
    /// whichever comes first. A fragment without two delimiters is all header.
    pub fn parse(data: &[u8]) -> Self {
        let mut fields: [&[u8]; 2] = [&[], &[]];
        let mut field = 0;
        let mut start = 0;
        let mut len = data.len();

        for (i, &b) in data.iter().enumerate() {
            if b != DELIMITER {
                continue;
            }
            fields[field] = &data[start..i];
            field += 1;
            start = i + 1;
            if field == 2 {
                len = start;
                break;
            }
        }
        if field < 2 {
            fields[field] = &data[start..];
        }

        Self {
            command: String::from_utf8_lossy(fields[0]).into_owned(),
            type_token: String::from_utf8_lossy(fields[1]).into_owned(),
            len,
        }
    }
}

/// Split a complete message into header and body
pub fn parse_message(data: &[u8]) -> (MessageHeader, &[u8]) {
    let header = MessageHeader::parse(data);
    let body = &data[header.len..];
    (header, body)
}

/// Build `<command>;<token>;<body>`
pub fn encode_message_with_token(command: &str, type_token: &str, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(command.len() + type_token.len() + 2 + body.len());
    buf.put_slice(command.as_bytes());
    buf.put_u8(DELIMITER);
    buf.put_slice(type_token.as_bytes());
    buf.put_u8(DELIMITER);
    buf.put_slice(body);
    buf.freeze()
}

/// Build `<command>;<type id>;<body>`, the data reply layout
pub fn encode_message(command: &str, type_id: TypeId, body: &[u8]) -> Bytes {
    encode_message_with_token(command, &type_id.to_string(), body)
}

/// Build the bare acknowledgement `<command>;0;1`
pub fn encode_ack(command: &str) -> Bytes {
    encode_message(command, TypeId::UNKNOWN, b"1")
}

/// Cut a message into fragments of at most `max_len` bytes
///
/// A `max_len` of zero yields the message as a single fragment.
pub fn split_fragments(message: &[u8], max_len: usize) -> Vec<Fragment<'_>> {
    let total = message.len();
    if max_len == 0 || total <= max_len {
        return vec![Fragment::whole(message)];
    }
    message
        .chunks(max_len)
        .enumerate()
        .map(|(i, data)| Fragment::new(data, i * max_len, total))
        .collect()
}
