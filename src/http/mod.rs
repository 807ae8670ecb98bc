//! Request/Response Module
//!
//! Synchronizes one buffer per route over a stateless request/response
//! transport. Progress lives entirely in the transport's own chunk
//! parameters (`index`, `total`), so nothing is kept between calls.
//!
//! ## Headers
//! - `X-Type`:     type name or decimal id (required on write, optional on read)
//! - `X-Checksum`: decimal Fletcher-16 of the body on write; on read its mere
//!                 presence asks for the checksum of the reply body
//!
//! ## Transfer Status
//! - -1: TYPE_HEADER_MISSING
//! - -2: TYPE_HEADER_MISMATCH
//! - -3: CHECKSUM_HEADER_MISMATCH
//! - -4: BUFFER_SIZE_MISMATCH
//! -  0: PROCESSING_BUFFER_CHUNK
//! -  1: SUCCESS

mod headers;
mod transfer;
mod response;
mod route;

pub use headers::{Headers, RequestHeaders, CHECKSUM_HEADER, TYPE_HEADER};
pub use transfer::{process_chunk, Chunk, ChunkOutcome, TransferStatus};
pub use response::{cors_headers, preflight_response, publish_buffer, BufferResponse};
pub use route::{BufferRoute, RouteHook};
