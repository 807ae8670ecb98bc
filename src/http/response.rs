//! Reply construction
//!
//! The transport sends whatever `BufferResponse` the core hands back.

use bytes::Bytes;

use crate::checksum::Checksum;
use crate::config::Config;
use crate::error::{BufSyncError, Result};
use crate::types::{TypeId, TypeRegistry};

use super::headers::{RequestHeaders, CHECKSUM_HEADER, TYPE_HEADER};

/// Content type of buffer bodies
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content type of status messages
pub const TEXT_PLAIN: &str = "text/plain";

/// A reply to send to the client
#[derive(Debug, Clone)]
pub struct BufferResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type of the body
    pub content_type: &'static str,

    /// Extra reply headers
    pub headers: Vec<(String, String)>,

    /// Reply body
    pub body: Bytes,
}

impl BufferResponse {
    /// 200 with raw buffer bytes
    pub fn buffer(type_name: &str, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: OCTET_STREAM,
            headers: vec![(TYPE_HEADER.to_string(), type_name.to_string())],
            body: body.into(),
        }
    }

    /// Plain-text reply
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            headers: Vec::new(),
            body: Bytes::from(message.into()),
        }
    }

    /// Reply sent when a completion hook suppressed the buffer reply
    pub fn acknowledged() -> Self {
        Self::text(200, "SUCCESS!")
    }

    /// 400 carrying the error's reason
    pub fn from_error(err: &BufSyncError) -> Self {
        Self::text(400, err.reason())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a reply header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build the reply that publishes `buffer` to the caller
///
/// An `X-Type` on the request is optional but must match when present.
/// `X-Checksum` is added iff the request carried one.
pub fn publish_buffer<H>(
    headers: &H,
    types: &TypeRegistry,
    checksum: &Checksum,
    type_id: TypeId,
    buffer: &[u8],
) -> Result<BufferResponse>
where
    H: RequestHeaders + ?Sized,
{
    let type_name = types.name_of(type_id);

    if let Some(token) = headers.header(TYPE_HEADER) {
        if types.id_of(token.trim()) != type_id {
            return Err(BufSyncError::TypeMismatch {
                expected: type_name.to_string(),
                received: token.to_string(),
            });
        }
    }

    let mut response = BufferResponse::buffer(type_name, Bytes::copy_from_slice(buffer));
    if headers.has_header(CHECKSUM_HEADER) {
        response = response.with_header(CHECKSUM_HEADER, checksum.compute(buffer).to_string());
    }
    Ok(response)
}

/// Default cross-origin headers, empty unless enabled in the config
pub fn cors_headers(config: &Config) -> Vec<(&'static str, &'static str)> {
    if !config.allow_cross_origin {
        return Vec::new();
    }
    vec![
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "*"),
        ("Access-Control-Allow-Methods", "*"),
        ("Access-Control-Expose-Headers", "*"),
    ]
}

/// Reply to a bare `OPTIONS` preflight
pub fn preflight_response(config: &Config) -> BufferResponse {
    cors_headers(config)
        .into_iter()
        .fold(BufferResponse::text(200, ""), |resp, (n, v)| resp.with_header(n, v))
}
