//! v11: transparent session, chunked, padded.
//!
//! `[session header:37]` once, then chunks of `encrypted_chunk_size` bytes
//! (the last one shorter). A chunk's plaintext is
//! `[padding size:u32 LE][zeros][data]`.
//! - key: `derive_subkey(session_key, seed)`
//! - IV: `derive_iv(session id || 8 zero bytes, chunk index)`
//! - associated data: `make_mac_data`, identical for every chunk

use futures::io::Cursor;

use crate::config::EncryptionOptions;
use crate::constants::{versions, MAC_LEN};
use crate::crypto::SymmetricKey;
use crate::formats::{
    check_output_size, chunked_decrypted_size, chunked_encrypted_size, complete, EncryptionMetadata, KeyFinder,
};
use crate::headers::{decode_session_header, encode_session_header, SessionHeader};
use crate::padding::{padded_from_clear_size, Padding};
use crate::resource_id::{CompositeResourceId, SimpleResourceId, SubkeySeed};
use crate::stream::{EncryptionStreamV11, SessionDecryptionStream};
use crate::types::Result;

pub const VERSION: u8 = versions::V11;
pub const PADDING_SIZE_LEN: usize = 4;
/// Padding size prefix and tag of one chunk.
pub const CHUNK_OVERHEAD: usize = PADDING_SIZE_LEN + MAC_LEN;

/// Associated data of every chunk: the encoded session header.
pub fn make_mac_data(
    session_id: &SimpleResourceId,
    seed: &SubkeySeed,
    encrypted_chunk_size: u32,
) -> [u8; SessionHeader::LEN] {
    let resource_id = CompositeResourceId::new_transparent_session_id(session_id, seed);
    encode_session_header(&SessionHeader::new(VERSION, encrypted_chunk_size, resource_id))
}

/// Size without validation; `encrypted_chunk_size` must exceed the overhead.
pub(crate) fn encrypted_size_unchecked(clear_size: u64, padding: Padding, encrypted_chunk_size: u32) -> u64 {
    SessionHeader::LEN as u64
        + chunked_encrypted_size(
            padded_from_clear_size(clear_size, padding) - 1,
            u64::from(encrypted_chunk_size),
            CHUNK_OVERHEAD as u64,
        )
}

pub fn encrypted_size(clear_size: u64, padding: Padding, encrypted_chunk_size: u32) -> Result<u64> {
    EncryptionOptions::new(padding, encrypted_chunk_size).validate(CHUNK_OVERHEAD as u32)?;
    Ok(encrypted_size_unchecked(clear_size, padding, encrypted_chunk_size))
}

/// Upper bound: padding zeros are counted as data.
pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    let header = decode_session_header(encrypted)?;
    chunked_decrypted_size(
        (encrypted.len() - SessionHeader::LEN) as u64,
        u64::from(header.encrypted_chunk_size),
        CHUNK_OVERHEAD as u64,
    )
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    session_id: &SimpleResourceId,
    session_key: &SymmetricKey,
    seed: &SubkeySeed,
    options: EncryptionOptions,
) -> Result<EncryptionMetadata> {
    let size = encrypted_size(clear.len() as u64, options.padding, options.encrypted_chunk_size)?;
    let total = check_output_size(out, size)?;
    let mut stream = EncryptionStreamV11::with_seed(Cursor::new(clear), *session_id, *session_key, *seed, options)?;
    complete(stream.read_into(&mut out[..total]))?;
    Ok(EncryptionMetadata::new(*session_id, *session_key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let mut stream = SessionDecryptionStream::create(Cursor::new(encrypted), finder).await?;
    stream.read_into(out).await
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<CompositeResourceId> {
    Ok(decode_session_header(encrypted)?.resource_id)
}
