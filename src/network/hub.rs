//! Client hub
//!
//! Tracks the reply side of every live connection so the device can push
//! buffers to one client or to all of them.

use std::collections::HashMap;
use std::io::BufWriter;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::stream::FrameSink;

use super::codec::write_reply;

/// Identifier assigned to each accepted connection
pub type ClientId = u32;

/// Shared, serialized writer for one connection
#[derive(Debug, Clone)]
pub struct ClientWriter {
    writer: Arc<Mutex<BufWriter<TcpStream>>>,

    /// Second handle on the socket, so closing never waits on a writer
    control: Arc<TcpStream>,
}

impl ClientWriter {
    pub fn new(stream: TcpStream) -> Result<Self> {
        let control = stream.try_clone()?;
        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(stream))),
            control: Arc::new(control),
        })
    }

    /// Send one complete logical message
    pub fn send(&self, message: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        write_reply(&mut *writer, message)
    }

    /// Close both directions of the underlying socket
    pub fn close(&self) {
        let _ = self.control.shutdown(Shutdown::Both);
    }
}

impl FrameSink for ClientWriter {
    fn send_binary(&mut self, message: Bytes) -> Result<()> {
        self.send(&message)
    }
}

/// Registry of connected clients
#[derive(Debug, Default)]
pub struct ClientHub {
    clients: RwLock<HashMap<ClientId, ClientWriter>>,
    next_id: AtomicU32,

    /// Set by `close_all`; only changed under the `clients` write lock
    closed: AtomicBool,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and assign it an id
    ///
    /// After `close_all` the writer is closed straight away instead, so a
    /// connection that raced shutdown sees EOF rather than waiting for input.
    pub fn register(&self, writer: ClientWriter) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut clients = self.clients.write();
        if self.closed.load(Ordering::Relaxed) {
            tracing::debug!("Client {} arrived after shutdown, closing", id);
            writer.close();
        } else {
            clients.insert(id, writer);
        }
        id
    }

    pub fn unregister(&self, id: ClientId) {
        self.clients.write().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    pub fn ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<_> = self.clients.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Push a message to one client
    ///
    /// Returns false if no such client is connected.
    pub fn send_to(&self, id: ClientId, message: &[u8]) -> Result<bool> {
        let writer = match self.clients.read().get(&id) {
            Some(w) => w.clone(),
            None => return Ok(false),
        };
        writer.send(message)?;
        Ok(true)
    }

    /// Push a message to every connected client
    ///
    /// Returns how many clients it reached. Failed sends are logged and skipped.
    pub fn send_all(&self, message: &[u8]) -> usize {
        let writers: Vec<(ClientId, ClientWriter)> = self
            .clients
            .read()
            .iter()
            .map(|(id, w)| (*id, w.clone()))
            .collect();

        let mut delivered = 0;
        for (id, writer) in writers {
            match writer.send(message) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!("Push to client {} failed: {}", id, e),
            }
        }
        delivered
    }

    /// Close every registered connection and any registered later
    pub fn close_all(&self) {
        let clients = self.clients.write();
        self.closed.store(true, Ordering::Relaxed);
        for writer in clients.values() {
            writer.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}
