//! Connection Handler
//!
//! Handles individual client connections. Every connection owns its own
//! `StreamSession`, so interleaved multi-fragment messages on different
//! connections never see each other's progress.

use std::io::{BufReader, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BufSyncError, Result};
use crate::stream::{Dispatcher, StreamSession};

use super::codec::read_fragment;
use super::hub::{ClientId, ClientHub, ClientWriter};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// Reply side, shared with the hub for server pushes
    writer: ClientWriter,

    /// Dispatch state for the message in flight
    session: StreamSession,

    /// Largest fragment accepted from this client
    max_fragment_len: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and a fresh dispatch session
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>, max_fragment_len: usize) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let writer = ClientWriter::new(stream)?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer,
            session: StreamSession::new(dispatcher),
            max_fragment_len,
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let stream = self.reader.get_ref();

        if read_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Writer handle for registering with a `ClientHub`
    pub fn writer(&self) -> ClientWriter {
        self.writer.clone()
    }

    /// Register with the hub, serve until closed, then unregister
    pub fn serve(mut self, hub: &ClientHub) -> Result<()> {
        let id: ClientId = hub.register(self.writer());
        tracing::debug!("Client {} connected from {}", id, self.peer_addr);

        let result = self.handle();

        hub.unregister(id);
        tracing::debug!("Client {} ({}) closed", id, self.peer_addr);
        result
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads fragments in a loop and feeds them to the session.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        loop {
            let fragment = match read_fragment(&mut self.reader, self.max_fragment_len) {
                Ok(f) => f,
                Err(BufSyncError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(BufSyncError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!(
                "Fragment from {}: {} bytes at {}/{}",
                self.peer_addr,
                fragment.data.len(),
                fragment.offset,
                fragment.total
            );

            if let Err(e) = self.session.on_fragment(fragment.as_fragment(), &mut self.writer) {
                // If the client disconnected before we could send the reply,
                // log and exit gracefully rather than treating it as a server error.
                if let BufSyncError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
    )
}
