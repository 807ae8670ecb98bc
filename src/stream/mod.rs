//! Streaming Module
//!
//! Synchronizes buffers over a persistent, bidirectional connection that
//! delivers messages in fragments.
//!
//! ## Message Format
//! ```text
//! <command>;<type name or id>;<raw body>
//! ```
//!
//! ### Replies
//! - Data: `<command>;<type id>;<buffer bytes>`
//! - Ack:  `<command>;0;1`
//!
//! ### Command Status
//! - -1: TYPE_HEADER_MISMATCH
//! - -2: BUFFER_SIZE_MISMATCH
//! -  2: GET (empty body)
//! -  3: SET

mod binding;
mod dispatch;
mod message;

use bytes::Bytes;

use crate::error::Result;

pub use binding::{CommandBinding, CommandCallback, CommandEvent, CommandRegistry, CommandStatus};
pub use dispatch::{Dispatcher, StreamSession, TransferProgress};
pub use message::{
    encode_ack, encode_message, encode_message_with_token, parse_message, split_fragments,
    Fragment, MessageHeader, DELIMITER, MIN_HEADER_FRAGMENT,
};

/// Per-connection binary send capability
pub trait FrameSink {
    /// Send one complete logical message to the peer
    fn send_binary(&mut self, message: Bytes) -> Result<()>;
}

/// Collects messages in memory
impl FrameSink for Vec<Bytes> {
    fn send_binary(&mut self, message: Bytes) -> Result<()> {
        self.push(message);
        Ok(())
    }
}
