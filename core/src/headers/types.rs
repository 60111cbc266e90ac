// ## 📂 File: `src/headers/types.rs`

//! headers/types.rs
//! Chunk headers of the streaming formats.
//!
//! Industry notes:
//! - Fixed-size headers enable deterministic IO: a reader always knows how
//!   many bytes to pull before it can parse.
//! - Multi-byte integers are little-endian.
//! - `ChunkHeader` (v4, v8) is repeated in front of every chunk and is part
//!   of the AEAD associated data in v8.
//! - `SessionHeader` (v11) is written once per stream; every chunk carries
//!   its encoded bytes as associated data.

use thiserror::Error;

use crate::constants::{
    versions, CHUNK_SIZE_LEN, COMPOSITE_RESOURCE_ID_LEN, IV_LEN, MAC_LEN, RESOURCE_ID_LEN, VERSION_LEN,
};
use crate::crypto::AeadIv;
use crate::resource_id::{CompositeResourceId, SimpleResourceId};

/// Per-chunk header of v4 and v8 streams.
///
/// Layout: `[version:1][encrypted_chunk_size:4][resource_id:16][iv_seed:24]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub version: u8,
    pub encrypted_chunk_size: u32,
    pub resource_id: SimpleResourceId,
    /// Random per chunk; the data IV is derived from it and the chunk index.
    pub seed: AeadIv,
}

impl ChunkHeader {
    pub const LEN: usize = VERSION_LEN + CHUNK_SIZE_LEN + RESOURCE_ID_LEN + IV_LEN;
    pub const VERSIONS: [u8; 2] = [versions::V4, versions::V8];
    /// A chunk must at least hold its header and a tag.
    pub const MIN_CHUNK_SIZE: u32 = (Self::LEN + MAC_LEN) as u32;

    pub fn new(version: u8, encrypted_chunk_size: u32, resource_id: SimpleResourceId, seed: AeadIv) -> Self {
        Self { version, encrypted_chunk_size, resource_id, seed }
    }

    /// Fields that must not change between the chunks of one stream.
    pub fn check_same_stream(&self, first: &ChunkHeader) -> Result<(), HeaderMismatch> {
        if self.version != first.version {
            return Err(HeaderMismatch::Version { expected: first.version, actual: self.version });
        }
        if self.resource_id != first.resource_id {
            return Err(HeaderMismatch::ResourceId { expected: first.resource_id, actual: self.resource_id });
        }
        if self.encrypted_chunk_size != first.encrypted_chunk_size {
            return Err(HeaderMismatch::ChunkSize {
                expected: first.encrypted_chunk_size,
                actual: self.encrypted_chunk_size,
            });
        }
        Ok(())
    }
}

/// Stream header of v11 (transparent session) streams.
///
/// Layout: `[version:1][session_id:16][subkey_seed:16][encrypted_chunk_size:4]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHeader {
    pub version: u8,
    pub encrypted_chunk_size: u32,
    pub resource_id: CompositeResourceId,
}

impl SessionHeader {
    pub const LEN: usize = VERSION_LEN + (COMPOSITE_RESOURCE_ID_LEN - 1) + CHUNK_SIZE_LEN;
    pub const VERSIONS: [u8; 1] = [versions::V11];
    /// Padding size prefix plus tag.
    pub const MIN_CHUNK_SIZE: u32 = (4 + MAC_LEN) as u32;

    pub fn new(version: u8, encrypted_chunk_size: u32, resource_id: CompositeResourceId) -> Self {
        Self { version, encrypted_chunk_size, resource_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("truncated buffer: header needs {need} bytes, have {have}")]
    BufferTooShort { have: usize, need: usize },

    #[error("unsupported header version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid encrypted chunk size in header: {size} (minimum {min})")]
    InvalidChunkSize { size: u32, min: u32 },
}

/// A later chunk header disagrees with the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderMismatch {
    #[error("version mismatch in headers: expected {expected}, got {actual}")]
    Version { expected: u8, actual: u8 },

    #[error("resourceId mismatch in headers: expected {expected}, got {actual}")]
    ResourceId { expected: SimpleResourceId, actual: SimpleResourceId },

    #[error("encryptedChunkSize mismatch in headers: expected {expected}, got {actual}")]
    ChunkSize { expected: u32, actual: u32 },
}
