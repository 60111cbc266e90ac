//! v9: `[9][session_id:16][subkey_seed:16][ciphertext][mac:16]`
//!
//! Transparent session, whole buffer, no padding.
//! - key: `derive_subkey(session_key, seed)`
//! - IV: session id followed by 8 zero bytes
//! - associated data: the 33 header bytes

use crate::constants::{versions, MAC_LEN, RESOURCE_ID_LEN, SUBKEY_SEED_LEN, VERSION_LEN};
use crate::crypto::{self, derive_subkey, session_iv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_session_key, EncryptionMetadata, KeyFinder};
use crate::resource_id::{CompositeResourceId, SimpleResourceId, SubkeySeed};
use crate::types::Result;

pub const VERSION: u8 = versions::V9;
pub(crate) const HEADER_LEN: usize = VERSION_LEN + RESOURCE_ID_LEN + SUBKEY_SEED_LEN;
const OVERHEAD: usize = HEADER_LEN + MAC_LEN;

pub fn encrypted_size(clear_size: u64) -> u64 {
    clear_size + OVERHEAD as u64
}

pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    Ok((encrypted.len() - OVERHEAD) as u64)
}

/// Write `[version][session id][seed]` and return it as associated data.
pub(crate) fn write_session_header(
    out: &mut [u8],
    version: u8,
    session_id: &SimpleResourceId,
    seed: &SubkeySeed,
) {
    out[0] = version;
    out[VERSION_LEN..VERSION_LEN + RESOURCE_ID_LEN].copy_from_slice(session_id.as_ref());
    out[VERSION_LEN + RESOURCE_ID_LEN..HEADER_LEN].copy_from_slice(seed.as_ref());
}

pub(crate) fn session_resource_id(encrypted: &[u8]) -> Result<CompositeResourceId> {
    CompositeResourceId::from_session_parts(&encrypted[VERSION_LEN..HEADER_LEN])
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    session_id: &SimpleResourceId,
    session_key: &SymmetricKey,
    seed: &SubkeySeed,
) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64))?;
    let out = &mut out[..total];
    let key = derive_subkey(session_key, seed);

    write_session_header(out, VERSION, session_id, seed);
    let (header, body) = out.split_at_mut(HEADER_LEN);
    crypto::encrypt_aead(&key, &session_iv(session_id), body, clear, header)?;
    Ok(EncryptionMetadata::new(*session_id, *session_key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let clear_size = check_output_size(out, decrypted_size(encrypted)?)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_session_key(finder, &resource_id).await?;

    let (header, body) = encrypted.split_at(HEADER_LEN);
    crypto::decrypt_aead(&key, &session_iv(&resource_id.session_id()), &mut out[..clear_size], body, header)
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<CompositeResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    session_resource_id(encrypted)
}
