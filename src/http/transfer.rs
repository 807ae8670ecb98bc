//! Chunked transfer state machine
//!
//! Drives one buffer write across one or more request body chunks. Each call
//! validates the type tag and total size, then copies the chunk straight into
//! the caller's buffer at `index`.
//!
//! The final chunk is never copied before its checksum has been verified.
//! For multi-chunk bodies the checksum is streamed over the bytes already in
//! the destination followed by the incoming chunk, so a corrupt final chunk
//! leaves the tail of the destination untouched. Earlier chunks of a failed
//! exchange have already been written in place.

use crate::checksum::Checksum;
use crate::error::{BufSyncError, Result};
use crate::types::{TypeId, TypeRegistry};

use super::headers::{RequestHeaders, CHECKSUM_HEADER, TYPE_HEADER};

/// One piece of a request body
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Bytes of this piece
    pub data: &'a [u8],

    /// Offset of this piece within the whole body
    pub index: usize,

    /// Length of the whole body
    pub total: usize,
}

impl<'a> Chunk<'a> {
    pub fn new(data: &'a [u8], index: usize, total: usize) -> Self {
        Self { data, index, total }
    }

    /// A body delivered in one piece
    pub fn whole(data: &'a [u8]) -> Self {
        Self::new(data, 0, data.len())
    }

    /// Offset one past the last byte of this piece
    pub fn end(&self) -> usize {
        self.index.saturating_add(self.data.len())
    }

    /// More pieces follow this one
    pub fn has_more(&self) -> bool {
        self.end() < self.total
    }
}

/// Result of a chunk that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Copied; more chunks are expected
    Pending,

    /// Final chunk copied and verified
    Complete,
}

/// Status values surfaced to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum TransferStatus {
    TypeHeaderMissing = -1,
    TypeHeaderMismatch = -2,
    ChecksumHeaderMismatch = -3,
    BufferSizeMismatch = -4,
    ProcessingBufferChunk = 0,
    Success = 1,
}

impl TransferStatus {
    /// Collapse a `process_chunk` result into its status value
    pub fn of(result: &Result<ChunkOutcome>) -> Option<Self> {
        match result {
            Ok(ChunkOutcome::Pending) => Some(TransferStatus::ProcessingBufferChunk),
            Ok(ChunkOutcome::Complete) => Some(TransferStatus::Success),
            Err(BufSyncError::TypeMissing) => Some(TransferStatus::TypeHeaderMissing),
            Err(BufSyncError::TypeMismatch { .. }) => Some(TransferStatus::TypeHeaderMismatch),
            Err(BufSyncError::ChecksumMismatch { .. }) => {
                Some(TransferStatus::ChecksumHeaderMismatch)
            }
            Err(BufSyncError::SizeMismatch { .. }) => Some(TransferStatus::BufferSizeMismatch),
            Err(_) => None,
        }
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

/// Process one request body chunk into `buffer`
///
/// Steps:
/// 1. `X-Type` must be present
/// 2. `X-Type` must resolve to `expected`
/// 3. `total` must equal the buffer's capacity, and the chunk must fit
/// 4. Non-final chunk: copy, `Pending`
/// 5. Final chunk without `X-Checksum` (or checksums disabled): copy, `Complete`
/// 6. Final chunk with `X-Checksum`: verify over the whole buffer as it will
///    be once this chunk lands, copy only on match
pub fn process_chunk<H>(
    headers: &H,
    types: &TypeRegistry,
    checksum: &Checksum,
    expected: TypeId,
    buffer: &mut [u8],
    chunk: Chunk<'_>,
) -> Result<ChunkOutcome>
where
    H: RequestHeaders + ?Sized,
{
    // Step 1: Type tag present
    let token = headers.header(TYPE_HEADER).ok_or(BufSyncError::TypeMissing)?;

    // Step 2: Type tag matches
    let received = types.id_of(token.trim());
    if received != expected {
        return Err(BufSyncError::TypeMismatch {
            expected: types.name_of(expected).to_string(),
            received: token.to_string(),
        });
    }

    // Step 3: Total size is fixed by the destination
    if chunk.total != buffer.len() {
        return Err(BufSyncError::SizeMismatch {
            expected: buffer.len(),
            received: chunk.total,
        });
    }
    let end = chunk.end();
    if end > chunk.total {
        return Err(BufSyncError::SizeMismatch {
            expected: chunk.total,
            received: end,
        });
    }

    // Step 4: Intermediate chunk
    if chunk.has_more() {
        buffer[chunk.index..end].copy_from_slice(chunk.data);
        tracing::trace!(
            "Chunk {}..{} of {} stored for type {}",
            chunk.index,
            end,
            chunk.total,
            expected
        );
        return Ok(ChunkOutcome::Pending);
    }

    // Step 5: Final chunk, nothing to verify
    let claimed = match headers.header(CHECKSUM_HEADER) {
        Some(value) if checksum.is_enabled() => value.trim(),
        _ => {
            buffer[chunk.index..end].copy_from_slice(chunk.data);
            return Ok(ChunkOutcome::Complete);
        }
    };

    // Step 6: Final chunk, verify before committing it
    let computed = checksum.compute_parts(&[&buffer[..chunk.index], chunk.data]);
    if claimed.parse::<u16>().ok() != Some(computed) {
        tracing::debug!(
            "Checksum mismatch for type {}: claimed {}, computed {}",
            expected,
            claimed,
            computed
        );
        return Err(BufSyncError::ChecksumMismatch {
            expected: claimed.to_string(),
            computed,
        });
    }

    buffer[chunk.index..end].copy_from_slice(chunk.data);
    Ok(ChunkOutcome::Complete)
}
