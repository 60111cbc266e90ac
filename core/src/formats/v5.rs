//! v5: `[5][resource_id:16][iv:24][ciphertext][mac:16]`
//!
//! Caller-chosen resource id and key; the resource id is the associated data.

use crate::constants::{versions, IV_LEN, MAC_LEN, RESOURCE_ID_LEN, VERSION_LEN};
use crate::crypto::{self, AeadIv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_key, EncryptionMetadata, KeyFinder};
use crate::resource_id::SimpleResourceId;
use crate::types::Result;

pub const VERSION: u8 = versions::V5;
const IV_OFFSET: usize = VERSION_LEN + RESOURCE_ID_LEN;
const DATA_OFFSET: usize = IV_OFFSET + IV_LEN;
const OVERHEAD: usize = DATA_OFFSET + MAC_LEN;

pub fn encrypted_size(clear_size: u64) -> u64 {
    clear_size + OVERHEAD as u64
}

pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    Ok((encrypted.len() - OVERHEAD) as u64)
}

pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    resource_id: &SimpleResourceId,
    key: &SymmetricKey,
) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64))?;
    let out = &mut out[..total];
    let iv = AeadIv::random();

    out[0] = VERSION;
    out[VERSION_LEN..IV_OFFSET].copy_from_slice(resource_id.as_ref());
    out[IV_OFFSET..DATA_OFFSET].copy_from_slice(iv.as_ref());
    crypto::encrypt_aead(key, &iv, &mut out[DATA_OFFSET..], clear, resource_id.as_ref())?;
    Ok(EncryptionMetadata::new(*resource_id, *key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let clear_size = check_output_size(out, decrypted_size(encrypted)?)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_key(finder, &resource_id).await?;
    let iv = AeadIv::try_from(&encrypted[IV_OFFSET..DATA_OFFSET])?;
    crypto::decrypt_aead(
        &key,
        &iv,
        &mut out[..clear_size],
        &encrypted[DATA_OFFSET..],
        resource_id.as_ref(),
    )
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    SimpleResourceId::try_from(&encrypted[VERSION_LEN..IV_OFFSET])
}
