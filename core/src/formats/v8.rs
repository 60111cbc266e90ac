//! v8: chunked, padded.
//!
//! Same framing as v4. Each chunk's plaintext is its data followed by
//! `0x80` and zeros; the encoded chunk header is the associated data. Once
//! a chunk carries less than a full chunk of data, the following chunks
//! carry padding only.

use futures::io::Cursor;

use crate::config::EncryptionOptions;
use crate::constants::{versions, MAC_LEN};
use crate::crypto::SymmetricKey;
use crate::formats::{
    check_output_size, chunked_decrypted_size, chunked_encrypted_size, complete, EncryptionMetadata, KeyFinder,
};
use crate::headers::{decode_chunk_header, ChunkHeader};
use crate::padding::{padded_from_clear_size, Padding};
use crate::resource_id::SimpleResourceId;
use crate::stream::{ChunkDecryptionStream, EncryptionStreamV8};
use crate::types::Result;

pub const VERSION: u8 = versions::V8;
/// Header, sentinel byte and tag of one chunk.
pub const CHUNK_OVERHEAD: usize = ChunkHeader::LEN + 1 + MAC_LEN;

pub fn encrypted_size(clear_size: u64, padding: Padding, encrypted_chunk_size: u32) -> Result<u64> {
    EncryptionOptions::new(padding, encrypted_chunk_size).validate(CHUNK_OVERHEAD as u32)?;
    Ok(chunked_encrypted_size(
        padded_from_clear_size(clear_size, padding) - 1,
        u64::from(encrypted_chunk_size),
        CHUNK_OVERHEAD as u64,
    ))
}

/// Upper bound: padding zeros are counted as data.
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
    options: EncryptionOptions,
) -> Result<EncryptionMetadata> {
    let size = encrypted_size(clear.len() as u64, options.padding, options.encrypted_chunk_size)?;
    let total = check_output_size(out, size)?;
    let mut stream = EncryptionStreamV8::with_key(Cursor::new(clear), *resource_id, *key, options)?;
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
