// ## 📂 File: `src/crypto/nonce.rs`

//! Per-chunk IV derivation.
//!
//! Design:
//! - `iv = BLAKE2b-24(seed || chunk_index as u64 little-endian)`.
//! - The seed is random per chunk header (v4/v8) or the zero-extended
//!   session id (v11); the running index keeps IVs distinct inside a stream.
//!
//! Security notes:
//! - Encryption and decryption must walk chunks in the same order; the index
//!   is not transmitted.

use crate::constants::RESOURCE_ID_LEN;
use crate::crypto::kdf::generichash_24;
use crate::crypto::types::AeadIv;
use crate::resource_id::SimpleResourceId;

/// Derive the AEAD IV of chunk `index` from `seed`.
#[inline]
pub fn derive_iv(seed: &AeadIv, index: u64) -> AeadIv {
    AeadIv::new(generichash_24(&[seed.as_ref(), &index.to_le_bytes()]))
}

/// Session id in the first 16 bytes, zeros in the last 8. Used as the IV of
/// whole-buffer session formats and as the IV seed of session streams.
#[inline]
pub fn session_iv(session_id: &SimpleResourceId) -> AeadIv {
    let mut iv = [0u8; AeadIv::LEN];
    iv[..RESOURCE_ID_LEN].copy_from_slice(session_id.as_ref());
    AeadIv::new(iv)
}
