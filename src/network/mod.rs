//! Network Module
//!
//! Reference streaming transport over TCP.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool, one connection per worker
//! - Each connection owns a `StreamSession`; the `Dispatcher` is shared
//! - `ClientHub` tracks reply writers for server pushes

mod codec;
mod connection;
mod hub;
mod server;

pub use codec::{
    decode_fragment, encode_fragment, encode_reply, read_fragment, read_reply, write_fragment,
    write_reply, OwnedFragment, FRAGMENT_HEADER_SIZE, REPLY_HEADER_SIZE,
};
pub use connection::Connection;
pub use hub::{ClientHub, ClientId, ClientWriter};
pub use server::{Server, ShutdownHandle};
