//! v7: `[7][resource_id:16][iv:24][ciphertext][mac:16]`, ciphertext is
//! padded clear data.
//!
//! Caller-chosen resource id and key. The associated data is the version
//! byte followed by the resource id.

use crate::constants::{versions, IV_LEN, MAC_LEN, RESOURCE_ID_LEN, VERSION_LEN};
use crate::crypto::{self, AeadIv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_key, EncryptionMetadata, KeyFinder};
use crate::padding::{pad_clear_data, padded_from_clear_size, unpadded_size, Padding};
use crate::resource_id::SimpleResourceId;
use crate::types::Result;

pub const VERSION: u8 = versions::V7;
const IV_OFFSET: usize = VERSION_LEN + RESOURCE_ID_LEN;
const DATA_OFFSET: usize = IV_OFFSET + IV_LEN;
const OVERHEAD: usize = DATA_OFFSET + MAC_LEN;

pub fn encrypted_size(clear_size: u64, padding: Padding) -> u64 {
    DATA_OFFSET as u64 + crypto::encrypted_size(padded_from_clear_size(clear_size, padding))
}

/// Upper bound: the padded size without its sentinel byte.
pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    Ok((encrypted.len() - OVERHEAD - 1) as u64)
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    resource_id: &SimpleResourceId,
    key: &SymmetricKey,
    padding: Padding,
) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64, padding))?;
    let out = &mut out[..total];
    let iv = AeadIv::random();
    let padded = pad_clear_data(clear, padding);

    out[0] = VERSION;
    out[VERSION_LEN..IV_OFFSET].copy_from_slice(resource_id.as_ref());
    out[IV_OFFSET..DATA_OFFSET].copy_from_slice(iv.as_ref());
    let (head, body) = out.split_at_mut(DATA_OFFSET);
    crypto::encrypt_aead(key, &iv, body, &padded, &head[..IV_OFFSET])?;
    Ok(EncryptionMetadata::new(*resource_id, *key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_key(finder, &resource_id).await?;

    let iv = AeadIv::try_from(&encrypted[IV_OFFSET..DATA_OFFSET])?;
    let padded = crypto::open(&key, &iv, &encrypted[DATA_OFFSET..], &encrypted[..IV_OFFSET])?;
    let clear_size = unpadded_size(&padded)?;
    check_output_size(out, clear_size as u64)?;
    out[..clear_size].copy_from_slice(&padded[..clear_size]);
    Ok(clear_size)
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    SimpleResourceId::try_from(&encrypted[VERSION_LEN..IV_OFFSET])
}
