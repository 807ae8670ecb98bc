//! Command bindings
//!
//! A binding maps a command name to an optional type constraint, an optional
//! destination buffer and a completion callback. Names are not unique: every
//! binding registered under a name sees every message for that name, in
//! registration order.

use crate::buffer::BufferHandle;
use crate::reply::Reply;
use crate::types::TypeId;

use super::FrameSink;

/// Per-binding outcome of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum CommandStatus {
    TypeHeaderMismatch = -1,
    BufferSizeMismatch = -2,
    /// Empty body: a read of the bound buffer
    Get = 2,
    /// Body accepted (and copied, if the binding has a buffer)
    Set = 3,
}

impl CommandStatus {
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            CommandStatus::TypeHeaderMismatch | CommandStatus::BufferSizeMismatch
        )
    }
}

/// What a completion callback gets to see
pub struct CommandEvent<'a> {
    /// Command name from the message header
    pub command: &'a str,

    /// Type id resolved from the message header
    pub type_id: TypeId,

    /// Body bytes carried by the final fragment
    pub body: &'a [u8],

    /// Length of the final fragment
    pub fragment_len: usize,

    /// Outcome for this binding
    pub status: CommandStatus,

    /// The binding's buffer, already updated when `status` is `Set`
    pub buffer: Option<&'a BufferHandle>,

    /// Reply channel of the sending connection
    pub client: &'a mut dyn FrameSink,
}

/// Completion callback; its verdict decides whether the default reply goes out
pub type CommandCallback = Box<dyn Fn(CommandEvent<'_>) -> Reply + Send + Sync>;

/// One registered command rule
pub struct CommandBinding {
    command: String,
    type_id: TypeId,
    buffer: Option<BufferHandle>,
    expected_len: usize,
    callback: Option<CommandCallback>,
}

impl CommandBinding {
    /// A bare command: any type, no buffer, no size expectation
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            type_id: TypeId::UNKNOWN,
            buffer: None,
            expected_len: 0,
            callback: None,
        }
    }

    /// Require messages to carry this type
    pub fn type_id(mut self, type_id: TypeId) -> Self {
        self.type_id = type_id;
        self
    }

    /// Copy accepted bodies into `buffer`; the expected length becomes its size
    pub fn buffer(mut self, buffer: BufferHandle) -> Self {
        self.expected_len = buffer.len();
        self.buffer = Some(buffer);
        self
    }

    /// Expect bodies of exactly `len` bytes (0 = any length, unless a buffer is bound)
    ///
    /// Ignored when a buffer is bound; the buffer's size wins.
    pub fn expected_len(mut self, len: usize) -> Self {
        if self.buffer.is_none() {
            self.expected_len = len;
        }
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(CommandEvent<'_>) -> Reply + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn required_type(&self) -> Option<TypeId> {
        if self.type_id.is_unknown() {
            None
        } else {
            Some(self.type_id)
        }
    }

    /// Type used to tag data replies (`UNKNOWN` for bare commands)
    pub fn reply_type(&self) -> TypeId {
        self.type_id
    }

    pub fn bound_buffer(&self) -> Option<&BufferHandle> {
        self.buffer.as_ref()
    }

    pub fn declared_len(&self) -> usize {
        self.expected_len
    }

    pub(crate) fn run_callback(&self, event: CommandEvent<'_>) -> Reply {
        match &self.callback {
            Some(cb) => cb(event),
            None => Reply::AutoReply,
        }
    }

    /// Judge a message against this binding
    ///
    /// An empty body is a read and never mismatches.
    pub fn evaluate(&self, type_id: TypeId, body_len: usize) -> CommandStatus {
        if body_len == 0 {
            return CommandStatus::Get;
        }
        if let Some(required) = self.required_type() {
            if required != type_id {
                return CommandStatus::TypeHeaderMismatch;
            }
        }
        // A bound buffer always fixes the size, even at zero bytes
        let sized = self.buffer.is_some() || self.expected_len != 0;
        if sized && self.expected_len != body_len {
            return CommandStatus::BufferSizeMismatch;
        }
        CommandStatus::Set
    }
}

impl std::fmt::Debug for CommandBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBinding")
            .field("command", &self.command)
            .field("type_id", &self.type_id)
            .field("expected_len", &self.expected_len)
            .field("has_buffer", &self.buffer.is_some())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Append-only, ordered collection of bindings
#[derive(Debug, Default)]
pub struct CommandRegistry {
    bindings: Vec<CommandBinding>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding (builder style)
    pub fn with(mut self, binding: CommandBinding) -> Self {
        self.register(binding);
        self
    }

    /// Register a binding; duplicate names are allowed
    pub fn register(&mut self, binding: CommandBinding) {
        tracing::debug!("Registered command binding {:?}", binding);
        self.bindings.push(binding);
    }

    /// All bindings for `command`, in registration order
    pub fn matching<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a CommandBinding> + 'a {
        self.bindings.iter().filter(move |b| b.command == command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
