// ## 📂 File: `src/crypto/aead.rs`

//! src/crypto/aead.rs
//! XChaCha20-Poly1305 over caller-provided slices.
//!
//! Design notes:
//! - Ciphertext layout is `ciphertext || tag`, tag is 16 bytes.
//! - Output slices are sized by the caller; an undersized slice is a
//!   programming error and reported as `Error::Assertion`.
//! - Tag verification fails closed: on error the output slice content is
//!   unspecified and must be discarded.

use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{Key, Tag, XChaCha20Poly1305, XNonce};

use crate::constants::MAC_LEN;
use crate::crypto::types::{AeadIv, Mac, SymmetricKey};
use crate::types::{Error, Result};

/// Size of the ciphertext (with tag) produced from `clear_size` bytes.
#[inline]
pub const fn encrypted_size(clear_size: u64) -> u64 {
    clear_size + MAC_LEN as u64
}

/// Size of the clear data inside `encrypted_size` bytes of ciphertext.
/// Saturates at zero for inputs shorter than a tag.
#[inline]
pub const fn decrypted_size(encrypted_size: u64) -> u64 {
    encrypted_size.saturating_sub(MAC_LEN as u64)
}

#[inline]
fn cipher(key: &SymmetricKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}

/// Encrypt `clear` into `out[..clear.len() + 16]` and return the tag.
///
/// # Errors
/// - `Error::Assertion` if `out` cannot hold `clear` plus the tag.
pub fn encrypt_aead(
    key: &SymmetricKey,
    iv: &AeadIv,
    out: &mut [u8],
    clear: &[u8],
    associated_data: &[u8],
) -> Result<Mac> {
    let needed = clear.len() + MAC_LEN;
    if out.len() < needed {
        return Err(Error::Assertion(format!(
            "encrypt_aead: output buffer is too short ({} < {})",
            out.len(),
            needed
        )));
    }

    let (body, rest) = out.split_at_mut(clear.len());
    body.copy_from_slice(clear);
    let tag = cipher(key)
        .encrypt_in_place_detached(XNonce::from_slice(iv.as_bytes()), associated_data, body)
        .map_err(|_| Error::Assertion("encrypt_aead: AEAD seal failed".into()))?;
    rest[..MAC_LEN].copy_from_slice(&tag);

    let mut mac = [0u8; MAC_LEN];
    mac.copy_from_slice(&tag);
    Ok(Mac::new(mac))
}

/// Decrypt `encrypted` (`ciphertext || tag`) into `out[..encrypted.len() - 16]`.
///
/// # Errors
/// - `Error::TruncatedBuffer` if `encrypted` is shorter than a tag.
/// - `Error::Assertion` if `out` is too short.
/// - `Error::DecryptionFailed` on tag mismatch.
pub fn decrypt_aead(
    key: &SymmetricKey,
    iv: &AeadIv,
    out: &mut [u8],
    encrypted: &[u8],
    associated_data: &[u8],
) -> Result<usize> {
    if encrypted.len() < MAC_LEN {
        return Err(Error::truncated("ciphertext shorter than the authentication tag"));
    }
    let clear_len = encrypted.len() - MAC_LEN;
    if out.len() < clear_len {
        return Err(Error::Assertion(format!(
            "decrypt_aead: output buffer is too short ({} < {})",
            out.len(),
            clear_len
        )));
    }

    let (body, tag) = encrypted.split_at(clear_len);
    let out = &mut out[..clear_len];
    out.copy_from_slice(body);
    cipher(key)
        .decrypt_in_place_detached(
            XNonce::from_slice(iv.as_bytes()),
            associated_data,
            out,
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::decryption("MAC verification failed"))?;
    Ok(clear_len)
}

/// Allocating variant of [`encrypt_aead`].
pub fn seal(key: &SymmetricKey, iv: &AeadIv, clear: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; clear.len() + MAC_LEN];
    encrypt_aead(key, iv, &mut out, clear, associated_data)?;
    Ok(out)
}

/// Allocating variant of [`decrypt_aead`].
pub fn open(key: &SymmetricKey, iv: &AeadIv, encrypted: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; decrypted_size(encrypted.len() as u64) as usize];
    decrypt_aead(key, iv, &mut out, encrypted, associated_data)?;
    Ok(out)
}

/// Trailing tag of an AEAD ciphertext. Formats without an explicit resource
/// id use it as the id.
pub fn extract_mac(encrypted: &[u8]) -> Result<Mac> {
    if encrypted.len() < MAC_LEN {
        return Err(Error::truncated("ciphertext shorter than the authentication tag"));
    }
    Mac::try_from(&encrypted[encrypted.len() - MAC_LEN..])
}
