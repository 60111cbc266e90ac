//! v10: `[10][session_id:16][subkey_seed:16][ciphertext][mac:16]`,
//! ciphertext is padded clear data.
//!
//! Same key, IV and associated data rules as v9.

use crate::constants::{versions, MAC_LEN};
use crate::crypto::{self, derive_subkey, session_iv, SymmetricKey};
use crate::formats::v9::{session_resource_id, write_session_header, HEADER_LEN};
use crate::formats::{check_encrypted_format, check_output_size, require_session_key, EncryptionMetadata, KeyFinder};
use crate::padding::{pad_clear_data, padded_from_clear_size, unpadded_size, Padding};
use crate::resource_id::{CompositeResourceId, SimpleResourceId, SubkeySeed};
use crate::types::Result;

pub const VERSION: u8 = versions::V10;
const OVERHEAD: usize = HEADER_LEN + MAC_LEN;

pub fn encrypted_size(clear_size: u64, padding: Padding) -> u64 {
    padded_from_clear_size(clear_size, padding) + OVERHEAD as u64
}

/// Upper bound: the padded size without its sentinel byte.
pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    Ok((encrypted.len() - OVERHEAD - 1) as u64)
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    session_id: &SimpleResourceId,
    session_key: &SymmetricKey,
    seed: &SubkeySeed,
    padding: Padding,
) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64, padding))?;
    let out = &mut out[..total];
    let key = derive_subkey(session_key, seed);
    let padded = pad_clear_data(clear, padding);

    write_session_header(out, VERSION, session_id, seed);
    let (header, body) = out.split_at_mut(HEADER_LEN);
    crypto::encrypt_aead(&key, &session_iv(session_id), body, &padded, header)?;
    Ok(EncryptionMetadata::new(*session_id, *session_key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_session_key(finder, &resource_id).await?;

    let (header, body) = encrypted.split_at(HEADER_LEN);
    let padded = crypto::open(&key, &session_iv(&resource_id.session_id()), body, header)?;
    let clear_size = unpadded_size(&padded)?;
    check_output_size(out, clear_size as u64)?;
    out[..clear_size].copy_from_slice(&padded[..clear_size]);
    Ok(clear_size)
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<CompositeResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    session_resource_id(encrypted)
}
