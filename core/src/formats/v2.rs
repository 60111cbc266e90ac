//! v2: `[2][iv:24][ciphertext][mac:16]`
//!
//! Random key and IV, no associated data. The resource id is the MAC.

use crate::constants::{versions, IV_LEN, MAC_LEN, VERSION_LEN};
use crate::crypto::{self, AeadIv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_key, EncryptionMetadata, KeyFinder};
use crate::resource_id::SimpleResourceId;
use crate::types::Result;

pub const VERSION: u8 = versions::V2;
const OVERHEAD: usize = VERSION_LEN + IV_LEN + MAC_LEN;

pub fn encrypted_size(clear_size: u64) -> u64 {
    clear_size + OVERHEAD as u64
}

pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    Ok((encrypted.len() - OVERHEAD) as u64)
}

pub fn encrypt(out: &mut [u8], clear: &[u8]) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64))?;
    let out = &mut out[..total];
    let key = SymmetricKey::random();
    let iv = AeadIv::random();

    out[0] = VERSION;
    out[VERSION_LEN..VERSION_LEN + IV_LEN].copy_from_slice(iv.as_ref());
    let mac = crypto::encrypt_aead(&key, &iv, &mut out[VERSION_LEN + IV_LEN..], clear, &[])?;
    Ok(EncryptionMetadata::new(mac.into(), key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let clear_size = check_output_size(out, decrypted_size(encrypted)?)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_key(finder, &resource_id).await?;
    let iv = AeadIv::try_from(&encrypted[VERSION_LEN..VERSION_LEN + IV_LEN])?;
    crypto::decrypt_aead(&key, &iv, &mut out[..clear_size], &encrypted[VERSION_LEN + IV_LEN..], &[])
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    Ok(crypto::extract_mac(encrypted)?.into())
}
