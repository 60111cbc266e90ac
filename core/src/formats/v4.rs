//! v4: chunked, no padding.
//!
//! Every chunk is `[header:45][ciphertext][mac:16]`, header as in
//! `ChunkHeader`. Chunks are `encrypted_chunk_size` bytes long except the
//! last one, which is always shorter (empty if the clear data fills the
//! previous chunks exactly).

use futures::io::Cursor;

use crate::config::EncryptionOptions;
use crate::constants::{versions, MAC_LEN};
use crate::crypto::SymmetricKey;
use crate::formats::{
    check_output_size, chunked_decrypted_size, chunked_encrypted_size, complete, EncryptionMetadata, KeyFinder,
};
use crate::headers::{decode_chunk_header, ChunkHeader};
use crate::padding::Padding;
use crate::resource_id::SimpleResourceId;
use crate::stream::{ChunkDecryptionStream, EncryptionStreamV4};
use crate::types::Result;

pub const VERSION: u8 = versions::V4;
/// Header and tag of one chunk.
pub const CHUNK_OVERHEAD: usize = ChunkHeader::LEN + MAC_LEN;

pub fn encrypted_size(clear_size: u64, encrypted_chunk_size: u32) -> Result<u64> {
    EncryptionOptions::new(Padding::Off, encrypted_chunk_size).validate(CHUNK_OVERHEAD as u32)?;
    Ok(chunked_encrypted_size(clear_size, u64::from(encrypted_chunk_size), CHUNK_OVERHEAD as u64))
}

/// Chunk size is read from the first header.
pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    let header = decode_chunk_header(encrypted)?;
    chunked_decrypted_size(
        encrypted.len() as u64,
        u64::from(header.encrypted_chunk_size),
        CHUNK_OVERHEAD as u64,
    )
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    resource_id: &SimpleResourceId,
    key: &SymmetricKey,
    encrypted_chunk_size: u32,
) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64, encrypted_chunk_size)?)?;
    let options = EncryptionOptions::new(Padding::Off, encrypted_chunk_size);
    let mut stream = EncryptionStreamV4::with_key(Cursor::new(clear), *resource_id, *key, options)?;
    complete(stream.read_into(&mut out[..total]))?;
    Ok(EncryptionMetadata::new(*resource_id, *key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let mut stream = ChunkDecryptionStream::create(Cursor::new(encrypted), finder).await?;
    stream.read_into(out).await
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    Ok(decode_chunk_header(encrypted)?.resource_id)
}
