//! # bufsync
//!
//! Exposes fixed-size in-memory buffers of a constrained device to remote
//! clients for reading and writing, over:
//! - a stateless request/response transport (chunked bodies, `X-Type` /
//!   `X-Checksum` headers)
//! - a persistent streaming transport (fragmented `<command>;<type>;<body>`
//!   messages routed to registered command bindings)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────────┐
//! │  Request/Response glue   │        │  Streaming transport (TCP)   │
//! │  (headers, body chunks)  │        │  (fragments, per-conn send)  │
//! └────────────┬─────────────┘        └──────────────┬───────────────┘
//!              │                                     │
//! ┌────────────▼─────────────┐        ┌──────────────▼───────────────┐
//! │  BufferRoute             │        │  StreamSession (per conn)    │
//! │  process_chunk           │        │  Dispatcher + CommandRegistry│
//! └────────────┬─────────────┘        └──────────────┬───────────────┘
//!              │                                     │
//!              └──────────────┬──────────────────────┘
//!                             ▼
//!        ┌───────────────┬───────────────┬────────────────┐
//!        │ TypeRegistry  │   Checksum    │  BufferHandle  │
//!        └───────────────┴───────────────┴────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod types;
pub mod checksum;
pub mod buffer;
pub mod reply;
pub mod http;
pub mod stream;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BufSyncError, Result};
pub use config::Config;
pub use types::{TypeId, TypeRegistry};
pub use checksum::{Checksum, NO_CHECKSUM};
pub use buffer::BufferHandle;
pub use reply::Reply;
pub use stream::{CommandBinding, CommandRegistry, Dispatcher, StreamSession};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bufsync
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
