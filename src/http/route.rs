//! Buffer routes
//!
//! A route binds one typed buffer to a path. Reads publish the buffer; writes
//! feed body chunks through the transfer state machine and, once the body is
//! complete, hand control to an optional hook that decides whether the
//! default reply (the updated buffer) goes out.

use std::sync::Arc;

use crate::buffer::BufferHandle;
use crate::checksum::Checksum;
use crate::reply::Reply;
use crate::types::{TypeId, TypeRegistry};

use super::headers::RequestHeaders;
use super::response::{publish_buffer, BufferResponse};
use super::transfer::{process_chunk, Chunk, ChunkOutcome};

/// Completion hook for a route
pub type RouteHook = Box<dyn Fn(&dyn RequestHeaders) -> Reply + Send + Sync>;

/// A typed buffer exposed at a path
pub struct BufferRoute {
    /// Request path
    uri: String,

    /// Type every exchange on this route must carry
    type_id: TypeId,

    /// Destination and source of all exchanges
    buffer: BufferHandle,

    types: Arc<TypeRegistry>,
    checksum: Checksum,

    /// Runs before a read is answered
    get_hook: Option<RouteHook>,

    /// Runs after a write completed
    set_hook: Option<RouteHook>,

    /// Reply with the buffer after a write when no set hook is installed
    handle_response: bool,
}

impl BufferRoute {
    pub fn new(
        uri: impl Into<String>,
        type_id: TypeId,
        buffer: BufferHandle,
        types: Arc<TypeRegistry>,
        checksum: Checksum,
    ) -> Self {
        Self {
            uri: uri.into(),
            type_id,
            buffer,
            types,
            checksum,
            get_hook: None,
            set_hook: None,
            handle_response: true,
        }
    }

    /// Install the read hook
    pub fn on_get_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn RequestHeaders) -> Reply + Send + Sync + 'static,
    {
        self.get_hook = Some(Box::new(hook));
        self
    }

    /// Install the write-completed hook
    pub fn on_set_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn RequestHeaders) -> Reply + Send + Sync + 'static,
    {
        self.set_hook = Some(Box::new(hook));
        self
    }

    /// Default verdict after a write when no set hook is installed
    pub fn handle_response(mut self, send: bool) -> Self {
        self.handle_response = send;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn buffer(&self) -> &BufferHandle {
        &self.buffer
    }

    /// Answer a read request
    pub fn on_get<H: RequestHeaders>(&self, headers: &H) -> BufferResponse {
        let verdict = self
            .get_hook
            .as_ref()
            .map(|hook| hook(headers as &dyn RequestHeaders))
            .unwrap_or(Reply::AutoReply);

        if !verdict.should_send() {
            return BufferResponse::acknowledged();
        }
        self.publish(headers)
    }

    /// Feed one body chunk of a write request
    ///
    /// Returns `None` while more chunks are expected.
    pub fn on_body<H: RequestHeaders>(&self, headers: &H, chunk: Chunk<'_>) -> Option<BufferResponse> {
        let result = {
            let mut guard = self.buffer.lock();
            process_chunk(
                headers,
                &self.types,
                &self.checksum,
                self.type_id,
                &mut guard[..],
                chunk,
            )
        };

        match result {
            Ok(ChunkOutcome::Pending) => None,
            Ok(ChunkOutcome::Complete) => {
                tracing::debug!("{}: received {} bytes", self.uri, chunk.total);
                let verdict = match &self.set_hook {
                    Some(hook) => hook(headers as &dyn RequestHeaders),
                    None => Reply::from(self.handle_response),
                };
                if verdict.should_send() {
                    Some(self.publish(headers))
                } else {
                    Some(BufferResponse::acknowledged())
                }
            }
            Err(e) => {
                tracing::warn!("{}: {}", self.uri, e);
                Some(BufferResponse::from_error(&e))
            }
        }
    }

    fn publish<H: RequestHeaders>(&self, headers: &H) -> BufferResponse {
        let guard = self.buffer.lock();
        match publish_buffer(headers, &self.types, &self.checksum, self.type_id, &guard[..]) {
            Ok(response) => response,
            Err(e) => BufferResponse::from_error(&e),
        }
    }
}

impl std::fmt::Debug for BufferRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferRoute")
            .field("uri", &self.uri)
            .field("type_id", &self.type_id)
            .field("len", &self.buffer.len())
            .field("handle_response", &self.handle_response)
            .finish()
    }
}
