//! Command dispatch engine
//!
//! `Dispatcher` holds what every connection shares (types and bindings) and
//! is immutable once built. Each connection drives its own `StreamSession`,
//! which keeps the progress of the logical message currently arriving.
//!
//! ## Session states
//! ```text
//!            first fragment                    last fragment
//!   IDLE ─────────────────────▶ RECEIVING ─────────────────────▶ IDLE
//!                               (command, type, received, total)
//! ```
//!
//! There is no timeout: an abandoned message stays in RECEIVING until the
//! next first fragment on the same connection replaces it. A first fragment
//! too short to hold a header drops the session back to IDLE.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{TypeId, TypeRegistry};

use super::binding::{CommandBinding, CommandEvent, CommandRegistry, CommandStatus};
use super::message::{encode_ack, encode_message, Fragment, MessageHeader, MIN_HEADER_FRAGMENT};
use super::FrameSink;

/// Progress of the logical message being received on one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Command name from the header
    pub command: String,

    /// Type token as sent
    pub type_token: String,

    /// Type resolved from the token
    pub type_id: TypeId,

    /// Body length (message total minus header)
    pub length: usize,

    /// Body bytes received so far
    pub received: usize,
}

impl TransferProgress {
    pub fn is_complete(&self) -> bool {
        self.received == self.length
    }
}

/// Shared routing state
#[derive(Debug)]
pub struct Dispatcher {
    types: Arc<TypeRegistry>,
    commands: CommandRegistry,
}

impl Dispatcher {
    pub fn new(types: Arc<TypeRegistry>, commands: CommandRegistry) -> Self {
        Self { types, commands }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Start a session for a new connection
    pub fn session(self: &Arc<Self>) -> StreamSession {
        StreamSession::new(Arc::clone(self))
    }
}

/// Per-connection dispatch state
#[derive(Debug)]
pub struct StreamSession {
    dispatcher: Arc<Dispatcher>,
    progress: Option<TransferProgress>,
}

impl StreamSession {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            progress: None,
        }
    }

    /// Message currently being received, if any
    pub fn progress(&self) -> Option<&TransferProgress> {
        self.progress.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.progress.is_none()
    }

    /// Handle one fragment of a logical message
    ///
    /// Fragments of one connection must arrive in order. Replies produced by
    /// completed messages go to `sink`.
    pub fn on_fragment(&mut self, fragment: Fragment<'_>, sink: &mut dyn FrameSink) -> Result<()> {
        let body = if fragment.is_first() {
            // A new message starts here even if it is unusable; its
            // continuations must not land on the previous one
            self.progress = None;
            if fragment.data.len() < MIN_HEADER_FRAGMENT {
                tracing::trace!("Ignoring {} byte message", fragment.data.len());
                return Ok(());
            }

            let header = MessageHeader::parse(fragment.data);
            let type_id = self.dispatcher.types.id_of(&header.type_token);
            let body_offset = header.len;

            tracing::trace!(
                "Message start: command={} type={} total={}",
                header.command,
                self.dispatcher.types.name_of(type_id),
                fragment.total
            );

            self.progress = Some(TransferProgress {
                command: header.command,
                type_token: header.type_token,
                type_id,
                length: fragment.total.saturating_sub(body_offset),
                received: 0,
            });
            &fragment.data[body_offset..]
        } else {
            fragment.data
        };

        let progress = match self.progress.as_mut() {
            Some(p) => p,
            None => {
                tracing::trace!(
                    "Ignoring continuation fragment at offset {} with no message in progress",
                    fragment.offset
                );
                return Ok(());
            }
        };

        let is_last = fragment.is_last();
        let result = dispatch_body(&self.dispatcher, progress, body, fragment.data.len(), is_last, sink);

        progress.received += body.len();
        if is_last {
            tracing::debug!(
                "Message complete: command={} body={} bytes",
                progress.command,
                progress.received
            );
            self.progress = None;
        }
        result
    }
}

/// Run one body slice past every binding registered for the command
fn dispatch_body(
    dispatcher: &Dispatcher,
    progress: &TransferProgress,
    body: &[u8],
    fragment_len: usize,
    is_last: bool,
    sink: &mut dyn FrameSink,
) -> Result<()> {
    for binding in dispatcher.commands.matching(&progress.command) {
        let status = binding.evaluate(progress.type_id, progress.length);

        match status {
            CommandStatus::Set => {
                if let Some(buffer) = binding.bound_buffer() {
                    if !buffer.write_at(progress.received, body) {
                        tracing::warn!(
                            "{}: {} bytes at offset {} do not fit {} byte buffer",
                            progress.command,
                            body.len(),
                            progress.received,
                            buffer.len()
                        );
                    }
                }
            }
            CommandStatus::TypeHeaderMismatch if is_last => {
                tracing::warn!(
                    "{}: invalid type, expected {} but received {}",
                    progress.command,
                    dispatcher.types.name_of(binding.reply_type()),
                    dispatcher.types.name_of(progress.type_id)
                );
            }
            CommandStatus::BufferSizeMismatch if is_last => {
                tracing::warn!(
                    "{}: invalid buffer size, expected {} but received {}",
                    progress.command,
                    binding.declared_len(),
                    progress.length
                );
            }
            _ => {}
        }

        if is_last {
            complete(binding, progress, body, fragment_len, status, sink)?;
        }
    }
    Ok(())
}

/// Run the binding's callback and send the default reply unless suppressed
fn complete(
    binding: &CommandBinding,
    progress: &TransferProgress,
    body: &[u8],
    fragment_len: usize,
    status: CommandStatus,
    sink: &mut dyn FrameSink,
) -> Result<()> {
    let verdict = binding.run_callback(CommandEvent {
        command: &progress.command,
        type_id: progress.type_id,
        body,
        fragment_len,
        status,
        buffer: binding.bound_buffer(),
        client: &mut *sink,
    });

    if !verdict.should_send() {
        return Ok(());
    }

    let reply = match binding.bound_buffer() {
        Some(buffer) => {
            let bytes = buffer.lock();
            encode_message(&progress.command, binding.reply_type(), &bytes)
        }
        None => encode_ack(&progress.command),
    };
    sink.send_binary(reply)
}
