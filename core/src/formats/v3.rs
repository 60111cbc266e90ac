//! v3: `[3][ciphertext][mac:16]`
//!
//! Random key, all-zero IV (each key encrypts exactly one buffer). The
//! resource id is the MAC.

use crate::constants::{versions, MAC_LEN, VERSION_LEN};
use crate::crypto::{self, AeadIv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_key, EncryptionMetadata, KeyFinder};
use crate::resource_id::SimpleResourceId;
use crate::types::Result;

pub const VERSION: u8 = versions::V3;
const OVERHEAD: usize = VERSION_LEN + MAC_LEN;

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

    out[0] = VERSION;
    let mac = crypto::encrypt_aead(&key, &AeadIv::default(), &mut out[VERSION_LEN..], clear, &[])?;
    Ok(EncryptionMetadata::new(mac.into(), key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let clear_size = check_output_size(out, decrypted_size(encrypted)?)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_key(finder, &resource_id).await?;
    crypto::decrypt_aead(&key, &AeadIv::default(), &mut out[..clear_size], &encrypted[VERSION_LEN..], &[])
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD)?;
    Ok(crypto::extract_mac(encrypted)?.into())
}
