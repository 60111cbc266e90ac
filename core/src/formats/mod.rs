// ## 📂 File: `src/formats/mod.rs`

//! Versioned envelope formats.
//!
//! Whole-buffer formats: v2, v3, v5, v6, v7, v9, v10.
//! Chunked formats, driven by the streaming engine: v4, v8, v11.
//!
//! Every format module exposes the same free functions: `encrypted_size`,
//! `decrypted_size`, `encrypt`, `decrypt`, `extract_resource_id`.
//! `decrypted_size` is pure arithmetic; for padded formats it is an upper
//! bound and `decrypt` returns the exact length.

use std::collections::HashMap;
use std::future::Future;

use futures::FutureExt;
use tracing::debug;

use crate::crypto::{derive_subkey, SymmetricKey};
use crate::resource_id::{CompositeResourceId, ResourceId, SimpleResourceId};
use crate::types::{Error, Result};

pub mod v2;
pub mod v3;
pub mod v4;
pub mod v5;
pub mod v6;
pub mod v7;
pub mod v8;
pub mod v9;
pub mod v10;
pub mod v11;

/// What an encryption hands back to the caller for the key store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionMetadata {
    /// Id under which `key` must be stored. For session formats this is the
    /// session id and `key` is the session key.
    pub resource_id: SimpleResourceId,
    pub key: SymmetricKey,
}

impl EncryptionMetadata {
    pub fn new(resource_id: SimpleResourceId, key: SymmetricKey) -> Self {
        Self { resource_id, key }
    }
}

/// Resolves a resource id to its key.
///
/// `Ok(None)` means the key is unknown and is reported as
/// `Error::KeyNotFound`; `Err` is a failed lookup and is propagated as is.
/// Neither is retried.
#[allow(async_fn_in_trait)]
pub trait KeyFinder {
    async fn find_key(&self, resource_id: &SimpleResourceId) -> Result<Option<SymmetricKey>>;
}

impl<F> KeyFinder for F
where
    F: Fn(&SimpleResourceId) -> Option<SymmetricKey>,
{
    async fn find_key(&self, resource_id: &SimpleResourceId) -> Result<Option<SymmetricKey>> {
        Ok(self(resource_id))
    }
}

impl KeyFinder for HashMap<SimpleResourceId, SymmetricKey> {
    async fn find_key(&self, resource_id: &SimpleResourceId) -> Result<Option<SymmetricKey>> {
        Ok(self.get(resource_id).copied())
    }
}

/// Finder that answers every lookup with the same key.
#[derive(Debug, Clone, Copy)]
pub struct FixedKey(pub SymmetricKey);

impl KeyFinder for FixedKey {
    async fn find_key(&self, _resource_id: &SimpleResourceId) -> Result<Option<SymmetricKey>> {
        Ok(Some(self.0))
    }
}

/// Look up `resource_id`, failing with `KeyNotFound` when absent.
pub(crate) async fn require_key<F: KeyFinder>(finder: &F, resource_id: &SimpleResourceId) -> Result<SymmetricKey> {
    match finder.find_key(resource_id).await? {
        Some(key) => Ok(key),
        None => {
            debug!(resource_id = %resource_id, "no key for resource");
            Err(Error::KeyNotFound(ResourceId::Simple(*resource_id)))
        }
    }
}

/// Key of a transparent-session resource: the session key (subkey derived
/// locally) when known, else the individual resource key.
pub(crate) async fn try_get_session_key<F: KeyFinder>(
    finder: &F,
    resource_id: &CompositeResourceId,
) -> Result<Option<SymmetricKey>> {
    if let Some(session_key) = finder.find_key(&resource_id.session_id()).await? {
        return Ok(Some(derive_subkey(&session_key, &resource_id.subkey_seed())));
    }
    debug!(
        session_id = %resource_id.session_id(),
        "session key unknown, trying the individual resource key"
    );
    finder.find_key(&resource_id.individual_resource_id()).await
}

/// `try_get_session_key`, failing with `KeyNotFound` when both lookups miss.
pub(crate) async fn require_session_key<F: KeyFinder>(
    finder: &F,
    resource_id: &CompositeResourceId,
) -> Result<SymmetricKey> {
    try_get_session_key(finder, resource_id)
        .await?
        .ok_or(Error::KeyNotFound(ResourceId::Composite(*resource_id)))
}

/// Reject buffers shorter than the format overhead. The version byte is the
/// dispatcher's responsibility and only asserted in debug builds.
#[inline]
pub(crate) fn check_encrypted_format(encrypted: &[u8], version: u8, overhead: usize) -> Result<()> {
    if encrypted.len() < overhead {
        return Err(Error::truncated(format!(
            "truncated encrypted buffer: v{} needs at least {} bytes, got {}",
            version,
            overhead,
            encrypted.len()
        )));
    }
    debug_assert_eq!(encrypted[0], version, "format routed to the wrong codec");
    Ok(())
}

/// Reject caller buffers that cannot hold `needed` bytes.
#[inline]
pub(crate) fn check_output_size(out: &[u8], needed: u64) -> Result<usize> {
    let needed = usize::try_from(needed)
        .map_err(|_| Error::InvalidArgument(format!("size {} does not fit in memory", needed)))?;
    if out.len() < needed {
        return Err(Error::InvalidArgument(format!(
            "output buffer too small: need {} bytes, got {}",
            needed,
            out.len()
        )));
    }
    Ok(needed)
}

/// Encrypted size of `total` bytes of chunk content cut into chunks of
/// `chunk` bytes with `overhead` bytes of framing each. The last chunk is
/// always short, possibly empty. Requires `chunk > overhead`.
pub(crate) fn chunked_encrypted_size(total: u64, chunk: u64, overhead: u64) -> u64 {
    let content = chunk - overhead;
    (total / content) * chunk + total % content + overhead
}

/// Inverse of [`chunked_encrypted_size`].
pub(crate) fn chunked_decrypted_size(encrypted_len: u64, chunk: u64, overhead: u64) -> Result<u64> {
    let remainder = encrypted_len % chunk;
    if remainder < overhead {
        return Err(Error::truncated(format!(
            "last chunk is {} bytes, framing alone is {}",
            remainder, overhead
        )));
    }
    Ok((encrypted_len / chunk) * (chunk - overhead) + remainder - overhead)
}

/// Run a stream future over an in-memory source to completion. Such
/// futures never suspend.
pub(crate) fn complete<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    fut.now_or_never()
        .ok_or_else(|| Error::Assertion("in-memory stream suspended".into()))?
}
