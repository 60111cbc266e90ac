// ## src/crypto/kdf.rs

//! crypto/kdf.rs
//! Unkeyed BLAKE2b hashing and transparent-session subkey derivation.
//!
//! Design:
//! - Output length is a BLAKE2b parameter, not a truncation: a 24-byte
//!   digest differs from the first 24 bytes of a 32-byte one.
//! - subkey = BLAKE2b-32(session_key || subkey_seed)

use blake2::digest::consts::{U24, U32};
use blake2::digest::Digest;
use blake2::Blake2b;

use crate::constants::{IV_LEN, KEY_LEN};
use crate::crypto::types::SymmetricKey;
use crate::resource_id::SubkeySeed;

/// BLAKE2b with a 24-byte output over the concatenation of `parts`.
#[inline]
pub fn generichash_24(parts: &[&[u8]]) -> [u8; IV_LEN] {
    let mut hasher = Blake2b::<U24>::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; IV_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// BLAKE2b with a 32-byte output over the concatenation of `parts`.
#[inline]
pub fn generichash_32(parts: &[&[u8]]) -> [u8; KEY_LEN] {
    let mut hasher = Blake2b::<U32>::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Derive the per-resource key of a transparent session.
///
/// Anyone holding the session key derives the same subkey from the seed
/// carried in the composite resource id.
#[inline]
pub fn derive_subkey(session_key: &SymmetricKey, seed: &SubkeySeed) -> SymmetricKey {
    SymmetricKey::new(generichash_32(&[session_key.as_ref(), seed.as_ref()]))
}
