// ## 📂 File: `src/headers/decode.rs`
//! src/headers/decode.rs
//!
//! Header decoding.
//!
//! Design notes:
//! - Reads the fixed prefix of `buf`; trailing bytes are the chunk body and
//!   are ignored here.
//! - Version and chunk size are validated so a corrupted header never drives
//!   an allocation or a division by a bogus chunk size.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{CHUNK_SIZE_LEN, IV_LEN, RESOURCE_ID_LEN, SUBKEY_SEED_LEN};
use crate::crypto::AeadIv;
use crate::headers::types::{ChunkHeader, HeaderError, SessionHeader};
use crate::resource_id::{CompositeResourceId, SimpleResourceId};

#[inline]
fn ensure_len(buf: &[u8], need: usize) -> Result<(), HeaderError> {
    if buf.len() < need {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need });
    }
    Ok(())
}

#[inline]
fn get_bytes<const N: usize>(buf: &[u8], i: &mut usize) -> [u8; N] {
    let mut dst = [0u8; N];
    dst.copy_from_slice(&buf[*i..*i + N]);
    *i += N;
    dst
}

#[inline]
fn get_u32(buf: &[u8], i: &mut usize) -> u32 {
    let v = LittleEndian::read_u32(&buf[*i..*i + CHUNK_SIZE_LEN]);
    *i += CHUNK_SIZE_LEN;
    v
}

/// Parse a v4/v8 chunk header from the start of `buf`.
pub fn decode_chunk_header(buf: &[u8]) -> Result<ChunkHeader, HeaderError> {
    // The version is checked before the length so that a stray byte of
    // another format reports the version, not a truncation.
    let version = *buf.first().ok_or(HeaderError::BufferTooShort { have: 0, need: ChunkHeader::LEN })?;
    if !ChunkHeader::VERSIONS.contains(&version) {
        return Err(HeaderError::UnsupportedVersion(version));
    }
    ensure_len(buf, ChunkHeader::LEN)?;

    let mut i = 1usize;
    let encrypted_chunk_size = get_u32(buf, &mut i);
    if encrypted_chunk_size < ChunkHeader::MIN_CHUNK_SIZE {
        return Err(HeaderError::InvalidChunkSize { size: encrypted_chunk_size, min: ChunkHeader::MIN_CHUNK_SIZE });
    }
    let resource_id = SimpleResourceId::new(get_bytes::<RESOURCE_ID_LEN>(buf, &mut i));
    let seed = AeadIv::new(get_bytes::<IV_LEN>(buf, &mut i));

    debug_assert_eq!(i, ChunkHeader::LEN);
    Ok(ChunkHeader { version, encrypted_chunk_size, resource_id, seed })
}

/// Parse a v11 session header from the start of `buf`.
pub fn decode_session_header(buf: &[u8]) -> Result<SessionHeader, HeaderError> {
    let version = *buf.first().ok_or(HeaderError::BufferTooShort { have: 0, need: SessionHeader::LEN })?;
    if !SessionHeader::VERSIONS.contains(&version) {
        return Err(HeaderError::UnsupportedVersion(version));
    }
    ensure_len(buf, SessionHeader::LEN)?;

    let mut i = 1usize;
    let session_id = SimpleResourceId::new(get_bytes::<RESOURCE_ID_LEN>(buf, &mut i));
    let seed = get_bytes::<SUBKEY_SEED_LEN>(buf, &mut i);
    let encrypted_chunk_size = get_u32(buf, &mut i);
    if encrypted_chunk_size < SessionHeader::MIN_CHUNK_SIZE {
        return Err(HeaderError::InvalidChunkSize { size: encrypted_chunk_size, min: SessionHeader::MIN_CHUNK_SIZE });
    }

    debug_assert_eq!(i, SessionHeader::LEN);
    Ok(SessionHeader {
        version,
        encrypted_chunk_size,
        resource_id: CompositeResourceId::new_transparent_session_id(&session_id, &seed.into()),
    })
}
