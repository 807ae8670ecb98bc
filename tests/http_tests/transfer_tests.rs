//! Tests for the chunked transfer state machine
//!
//! These tests verify:
//! - Single-chunk and multi-chunk writes
//! - Checksum verification over the whole destination
//! - Type and size validation leave the destination untouched
//! - A corrupt final chunk is never committed

use bufsync::checksum::{fletcher16, Checksum};
use bufsync::http::{process_chunk, Chunk, ChunkOutcome, Headers, TransferStatus};
use bufsync::types::{TypeId, TypeRegistry};
use bufsync::BufSyncError;

// =============================================================================
// Helper Functions
// =============================================================================

fn registry() -> TypeRegistry {
    TypeRegistry::builder().register("Settings").build()
}

fn settings_id(types: &TypeRegistry) -> TypeId {
    types.id_of("Settings")
}

fn headers_for(type_token: &str) -> Headers {
    Headers::new().with("X-Type", type_token)
}

// =============================================================================
// Single Chunk Tests
// =============================================================================

#[test]
fn test_single_chunk_with_checksum() {
    let types = registry();
    let data = b"0123456789";
    let headers = headers_for("Settings").with("X-Checksum", fletcher16(data).to_string());
    let mut dest = [0u8; 10];

    let result = process_chunk(
        &headers,
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(data),
    );

    assert_eq!(result.unwrap(), ChunkOutcome::Complete);
    assert_eq!(&dest, data);
}

#[test]
fn test_single_chunk_without_checksum() {
    let types = registry();
    let mut dest = [0u8; 4];

    let result = process_chunk(
        &headers_for("Settings"),
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2, 3, 4]),
    );

    assert_eq!(result.unwrap(), ChunkOutcome::Complete);
    assert_eq!(dest, [1, 2, 3, 4]);
}

#[test]
fn test_single_chunk_bad_checksum_not_copied() {
    let types = registry();
    let headers = headers_for("Settings").with("X-Checksum", "1234");
    let mut dest = [9u8; 4];

    let result = process_chunk(
        &headers,
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2, 3, 4]),
    );

    assert!(matches!(result, Err(BufSyncError::ChecksumMismatch { .. })));
    assert_eq!(TransferStatus::of(&result), Some(TransferStatus::ChecksumHeaderMismatch));
    assert_eq!(dest, [9u8; 4]);
}

#[test]
fn test_unparsable_checksum_is_mismatch() {
    let types = registry();
    let headers = headers_for("Settings").with("X-Checksum", "not-a-number");
    let mut dest = [0u8; 2];

    let result = process_chunk(
        &headers,
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2]),
    );

    assert!(matches!(result, Err(BufSyncError::ChecksumMismatch { .. })));
}

#[test]
fn test_disabled_checksum_skips_verification() {
    let types = registry();
    let headers = headers_for("Settings").with("X-Checksum", "1");
    let mut dest = [0u8; 3];

    let result = process_chunk(
        &headers,
        &types,
        &Checksum::disabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[7, 8, 9]),
    );

    assert_eq!(result.unwrap(), ChunkOutcome::Complete);
    assert_eq!(dest, [7, 8, 9]);
}

// =============================================================================
// Multi Chunk Tests
// =============================================================================

#[test]
fn test_multi_chunk_with_valid_checksum() {
    let types = registry();
    let id = settings_id(&types);
    let data: Vec<u8> = (10..20).collect();
    let headers = headers_for("Settings").with("X-Checksum", fletcher16(&data).to_string());
    let checksum = Checksum::enabled();
    let mut dest = [0u8; 10];

    let first = process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[0..4], 0, 10));
    let second = process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[4..8], 4, 10));
    let last = process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[8..10], 8, 10));

    assert_eq!(TransferStatus::of(&first), Some(TransferStatus::ProcessingBufferChunk));
    assert_eq!(TransferStatus::of(&second), Some(TransferStatus::ProcessingBufferChunk));
    assert_eq!(TransferStatus::of(&last), Some(TransferStatus::Success));
    assert_eq!(&dest[..], &data[..]);
}

#[test]
fn test_intermediate_chunks_skip_checksum() {
    let types = registry();
    let headers = headers_for("Settings").with("X-Checksum", "0");
    let mut dest = [0u8; 10];

    let result = process_chunk(
        &headers,
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::new(&[1, 2, 3, 4], 0, 10),
    );

    assert_eq!(result.unwrap(), ChunkOutcome::Pending);
    assert_eq!(&dest[..4], &[1, 2, 3, 4]);
}

#[test]
fn test_multi_chunk_bad_checksum_keeps_final_chunk_out() {
    let types = registry();
    let id = settings_id(&types);
    let data: Vec<u8> = (10..20).collect();
    let headers = headers_for("Settings").with("X-Checksum", (fletcher16(&data) ^ 1).to_string());
    let checksum = Checksum::enabled();
    let mut dest = [0u8; 10];

    process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[0..4], 0, 10)).unwrap();
    process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[4..8], 4, 10)).unwrap();
    let last = process_chunk(&headers, &types, &checksum, id, &mut dest, Chunk::new(&data[8..10], 8, 10));

    assert_eq!(TransferStatus::of(&last), Some(TransferStatus::ChecksumHeaderMismatch));
    // Earlier chunks landed, the final one did not
    assert_eq!(&dest[..8], &data[..8]);
    assert_eq!(&dest[8..], &[0, 0]);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_missing_type_header() {
    let types = registry();
    let mut dest = [0u8; 2];

    let result = process_chunk(
        &Headers::new(),
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2]),
    );

    assert!(matches!(result, Err(BufSyncError::TypeMissing)));
    assert_eq!(TransferStatus::of(&result), Some(TransferStatus::TypeHeaderMissing));
    assert_eq!(dest, [0, 0]);
}

#[test]
fn test_type_mismatch_leaves_destination() {
    let types = registry();
    let mut dest = [5u8; 4];

    let result = process_chunk(
        &headers_for("float"),
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2, 3, 4]),
    );

    assert_eq!(TransferStatus::of(&result), Some(TransferStatus::TypeHeaderMismatch));
    assert_eq!(result.unwrap_err().reason(), "Expected X-Type header to be Settings");
    assert_eq!(dest, [5u8; 4]);
}

#[test]
fn test_type_header_accepts_numeric_id() {
    let types = registry();
    let id = settings_id(&types);
    let mut dest = [0u8; 1];

    let result = process_chunk(
        &headers_for(&id.to_string()),
        &types,
        &Checksum::enabled(),
        id,
        &mut dest,
        Chunk::whole(&[42]),
    );

    assert_eq!(result.unwrap(), ChunkOutcome::Complete);
    assert_eq!(dest, [42]);
}

#[test]
fn test_size_mismatch_leaves_destination() {
    let types = registry();
    let mut dest = [5u8; 4];

    let result = process_chunk(
        &headers_for("Settings"),
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::whole(&[1, 2, 3]),
    );

    assert_eq!(TransferStatus::of(&result), Some(TransferStatus::BufferSizeMismatch));
    assert_eq!(dest, [5u8; 4]);
}

#[test]
fn test_chunk_past_total_rejected() {
    let types = registry();
    let mut dest = [0u8; 4];

    let result = process_chunk(
        &headers_for("Settings"),
        &types,
        &Checksum::enabled(),
        settings_id(&types),
        &mut dest,
        Chunk::new(&[1, 2, 3], 2, 4),
    );

    assert!(matches!(result, Err(BufSyncError::SizeMismatch { .. })));
    assert_eq!(dest, [0u8; 4]);
}

#[test]
fn test_status_codes() {
    assert_eq!(TransferStatus::TypeHeaderMissing.code(), -1);
    assert_eq!(TransferStatus::TypeHeaderMismatch.code(), -2);
    assert_eq!(TransferStatus::ChecksumHeaderMismatch.code(), -3);
    assert_eq!(TransferStatus::BufferSizeMismatch.code(), -4);
    assert_eq!(TransferStatus::ProcessingBufferChunk.code(), 0);
    assert_eq!(TransferStatus::Success.code(), 1);
}
