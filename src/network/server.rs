//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads. There is one
//! worker per allowed connection. A connection that arrives while
//! `max_connections` are already live is closed right after accept.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, TrySendError};

use crate::config::Config;
use crate::error::{BufSyncError, Result};
use crate::stream::Dispatcher;

use super::connection::Connection;
use super::hub::ClientHub;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// TCP server for the streaming transport
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    hub: Arc<ClientHub>,
    listener: TcpListener,
    shutdown: ShutdownHandle,

    /// Connections handed to a worker and not yet finished
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(BufSyncError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            dispatcher,
            hub: Arc::new(ClientHub::new()),
            listener,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Connected clients, for server pushes
    pub fn hub(&self) -> Arc<ClientHub> {
        Arc::clone(&self.hub)
    }

    /// Connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Run the accept loop (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        let workers = self.config.max_connections;
        let (tx, rx) = channel::bounded::<TcpStream>(workers);

        let handles: Vec<_> = (0..workers)
            .map(|n| {
                let rx = rx.clone();
                let dispatcher = Arc::clone(&self.dispatcher);
                let hub = Arc::clone(&self.hub);
                let config = self.config.clone();
                let shutdown = self.shutdown.clone();
                let active = Arc::clone(&self.active);
                thread::Builder::new()
                    .name(format!("bufsync-worker-{}", n))
                    .spawn(move || {
                        for stream in rx.iter() {
                            if !shutdown.is_shutdown() {
                                serve_stream(stream, &dispatcher, &hub, &config);
                            }
                            active.fetch_sub(1, Ordering::SeqCst);
                        }
                    })
            })
            .collect::<std::io::Result<_>>()?;
        drop(rx);

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if self.active.load(Ordering::SeqCst) >= workers {
                        tracing::warn!("Refusing {}: connection limit reached", addr);
                        drop(stream);
                        continue;
                    }
                    // Only this thread increments, so the count stays <= workers
                    // and the queue always has room
                    self.active.fetch_add(1, Ordering::SeqCst);
                    match tx.try_send(stream) {
                        Ok(()) => tracing::trace!("Accepted {}", addr),
                        Err(TrySendError::Full(_)) => {
                            self.active.fetch_sub(1, Ordering::SeqCst);
                            tracing::warn!("Refusing {}: connection limit reached", addr);
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL);
                }
            }
        }

        tracing::info!("Shutting down, closing {} connection(s)", self.hub.len());
        drop(tx);
        self.hub.close_all();
        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// Run one connection to completion on a worker thread
fn serve_stream(stream: TcpStream, dispatcher: &Arc<Dispatcher>, hub: &ClientHub, config: &Config) {
    // Accepted sockets may inherit non-blocking mode from the listener
    if let Err(e) = stream.set_nonblocking(false) {
        tracing::warn!("Failed to configure connection: {}", e);
        return;
    }

    let result = Connection::new(stream, Arc::clone(dispatcher), config.max_fragment_len)
        .and_then(|mut conn| {
            conn.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
            Ok(conn)
        })
        .and_then(|conn| conn.serve(hub));

    if let Err(e) = result {
        tracing::debug!("Connection ended with error: {}", e);
    }
}
