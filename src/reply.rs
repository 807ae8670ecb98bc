//! Completion hook verdict
//!
//! Hooks on both transports run synchronously once an exchange completes and
//! return one of these to the engine that called them.

/// What the engine does after a completion hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Send the default reply (the bound buffer, or a bare acknowledgement)
    AutoReply,

    /// The hook handled replying itself (or wants none)
    Suppress,
}

impl Reply {
    pub fn should_send(self) -> bool {
        matches!(self, Reply::AutoReply)
    }
}

impl From<bool> for Reply {
    fn from(send: bool) -> Self {
        if send {
            Reply::AutoReply
        } else {
            Reply::Suppress
        }
    }
}
