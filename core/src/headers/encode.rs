// ## 📂 File: `src/headers/encode.rs`
//! src/headers/encode.rs
//!
//! Header encoding.
//!
//! Design notes:
//! - Fixed output arrays; field order matches `types.rs` documentation.
//! - v8 authenticates these exact bytes, so encoding must be canonical.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{CHUNK_SIZE_LEN, IV_LEN, RESOURCE_ID_LEN, VERSION_LEN};
use crate::headers::types::{ChunkHeader, SessionHeader};

#[inline]
fn put_bytes(out: &mut [u8], i: &mut usize, b: &[u8]) {
    out[*i..*i + b.len()].copy_from_slice(b);
    *i += b.len();
}

#[inline]
fn put_u32(out: &mut [u8], i: &mut usize, v: u32) {
    LittleEndian::write_u32(&mut out[*i..*i + CHUNK_SIZE_LEN], v);
    *i += CHUNK_SIZE_LEN;
}

/// Serialize a v4/v8 chunk header.
pub fn encode_chunk_header(h: &ChunkHeader) -> [u8; ChunkHeader::LEN] {
    let mut out = [0u8; ChunkHeader::LEN];
    let mut i = 0usize;

    put_bytes(&mut out, &mut i, &[h.version]);          // 0..1   version
    put_u32(&mut out, &mut i, h.encrypted_chunk_size);  // 1..5   chunk size
    put_bytes(&mut out, &mut i, h.resource_id.as_ref()); // 5..21  resource id
    put_bytes(&mut out, &mut i, h.seed.as_ref());       // 21..45 iv seed

    debug_assert_eq!(i, VERSION_LEN + CHUNK_SIZE_LEN + RESOURCE_ID_LEN + IV_LEN);
    out
}

/// Serialize a v11 session header.
pub fn encode_session_header(h: &SessionHeader) -> [u8; SessionHeader::LEN] {
    let mut out = [0u8; SessionHeader::LEN];
    let mut i = 0usize;

    put_bytes(&mut out, &mut i, &[h.version]);
    put_bytes(&mut out, &mut i, h.resource_id.session_id().as_ref());
    put_bytes(&mut out, &mut i, h.resource_id.individual_resource_id().as_ref());
    put_u32(&mut out, &mut i, h.encrypted_chunk_size);

    debug_assert_eq!(i, SessionHeader::LEN);
    out
}
