//! v6: `[6][ciphertext][mac:16]`, ciphertext is padded clear data.
//!
//! Random key, all-zero IV, the version byte is the associated data. The
//! resource id is the MAC.

use crate::constants::{versions, MAC_LEN, VERSION_LEN};
use crate::crypto::{self, AeadIv, SymmetricKey};
use crate::formats::{check_encrypted_format, check_output_size, require_key, EncryptionMetadata, KeyFinder};
use crate::padding::{pad_clear_data, padded_from_clear_size, unpadded_size, Padding};
use crate::resource_id::SimpleResourceId;
use crate::types::Result;

pub const VERSION: u8 = versions::V6;
const OVERHEAD: usize = VERSION_LEN + MAC_LEN;

pub fn encrypted_size(clear_size: u64, padding: Padding) -> u64 {
    VERSION_LEN as u64 + crypto::encrypted_size(padded_from_clear_size(clear_size, padding))
}

/// Upper bound: the padded size without its sentinel byte.
pub fn decrypted_size(encrypted: &[u8]) -> Result<u64> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    Ok((encrypted.len() - OVERHEAD - 1) as u64)
}

pub fn encrypt(out: &mut [u8], clear: &[u8], padding: Padding) -> Result<EncryptionMetadata> {
    let total = check_output_size(out, encrypted_size(clear.len() as u64, padding))?;
    let out = &mut out[..total];
    let key = SymmetricKey::random();
    let padded = pad_clear_data(clear, padding);

    out[0] = VERSION;
    let (ad, body) = out.split_at_mut(VERSION_LEN);
    let mac = crypto::encrypt_aead(&key, &AeadIv::default(), body, &padded, ad)?;
    Ok(EncryptionMetadata::new(mac.into(), key))
}

pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    let resource_id = extract_resource_id(encrypted)?;
    let key = require_key(finder, &resource_id).await?;

    let (ad, body) = encrypted.split_at(VERSION_LEN);
    let padded = crypto::open(&key, &AeadIv::default(), body, ad)?;
    let clear_size = unpadded_size(&padded)?;
    check_output_size(out, clear_size as u64)?;
    out[..clear_size].copy_from_slice(&padded[..clear_size]);
    Ok(clear_size)
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<SimpleResourceId> {
    check_encrypted_format(encrypted, VERSION, OVERHEAD + 1)?;
    Ok(crypto::extract_mac(encrypted)?.into())
}
