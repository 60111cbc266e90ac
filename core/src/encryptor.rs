// ## 📂 File: `src/encryptor.rs`

//! Version dispatch.
//!
//! The first byte of every envelope is its format version. Decryption reads
//! it once and hands the whole buffer (or stream) to the matching codec.
//! Encryption always produces a transparent-session format:
//! - v11 when the padded size reaches `STREAM_THRESHOLD`,
//! - v9 when padding is off,
//! - v10 otherwise.

use futures::io::AsyncRead;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use tracing::debug;

use crate::config::EncryptionOptions;
use crate::constants::{DEFAULT_ENCRYPTED_CHUNK_SIZE, STREAM_THRESHOLD};
use crate::crypto::SymmetricKey;
use crate::formats::{v10, v11, v2, v3, v4, v5, v6, v7, v8, v9, EncryptionMetadata, FixedKey, KeyFinder};
use crate::padding::{padded_from_clear_size, Padding};
use crate::resource_id::{ResourceId, SimpleResourceId, SubkeySeed};
use crate::stream::{
    read_all, ChunkDecryptionStream, EncryptionStreamV4, EncryptionStreamV8, PeekableInputSource,
    SessionDecryptionStream,
};
use crate::types::{Error, Result};

/// Every envelope format, by version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum EncryptionFormat {
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    V6 = 6,
    V7 = 7,
    V8 = 8,
    V9 = 9,
    V10 = 10,
    V11 = 11,
}

impl EncryptionFormat {
    /// Format of an envelope, from its first byte.
    ///
    /// # Errors
    /// - `InvalidArgument` on empty input.
    /// - `UnsupportedVersion` on an unknown tag.
    pub fn of(encrypted: &[u8]) -> Result<Self> {
        let version = *encrypted
            .first()
            .ok_or_else(|| Error::InvalidArgument("encrypted data is empty".into()))?;
        Self::from_version(version)
    }

    pub fn from_version(version: u8) -> Result<Self> {
        Self::try_from(version).map_err(|e| Error::UnsupportedVersion(e.number))
    }

    #[inline]
    pub fn version(self) -> u8 {
        self.into()
    }

    /// Padded formats hide the clear size; only decryption reveals it.
    pub fn is_padded(self) -> bool {
        matches!(
            self,
            EncryptionFormat::V6 | EncryptionFormat::V7 | EncryptionFormat::V8 | EncryptionFormat::V10 | EncryptionFormat::V11
        )
    }

    pub fn is_chunked(self) -> bool {
        matches!(self, EncryptionFormat::V4 | EncryptionFormat::V8 | EncryptionFormat::V11)
    }
}

fn select_format(clear_size: u64, padding: Padding) -> EncryptionFormat {
    if padded_from_clear_size(clear_size, padding) >= STREAM_THRESHOLD {
        EncryptionFormat::V11
    } else if padding.step_value() == Some(1) {
        EncryptionFormat::V9
    } else {
        EncryptionFormat::V10
    }
}

/// Size of the envelope `encrypt` produces for `clear_size` bytes.
pub fn encrypted_size(clear_size: u64, padding: Padding) -> u64 {
    match select_format(clear_size, padding) {
        EncryptionFormat::V11 => v11::encrypted_size_unchecked(clear_size, padding, DEFAULT_ENCRYPTED_CHUNK_SIZE),
        EncryptionFormat::V9 => v9::encrypted_size(clear_size),
        _ => v10::encrypted_size(clear_size, padding),
    }
}

/// Encrypt `clear` as a new resource of the session `session_id`, under a
/// fresh subkey seed. `out` must hold `encrypted_size(clear.len(), padding)`
/// bytes.
pub fn encrypt(
    out: &mut [u8],
    clear: &[u8],
    padding: Padding,
    session_id: &SimpleResourceId,
    session_key: &SymmetricKey,
) -> Result<EncryptionMetadata> {
    let seed = SubkeySeed::random();
    let format = select_format(clear.len() as u64, padding);
    debug!(format = ?format, clear_len = clear.len(), session_id = %session_id, "encrypting");
    match format {
        EncryptionFormat::V11 => {
            let options = EncryptionOptions::new(padding, DEFAULT_ENCRYPTED_CHUNK_SIZE);
            v11::encrypt(out, clear, session_id, session_key, &seed, options)
        }
        EncryptionFormat::V9 => v9::encrypt(out, clear, session_id, session_key, &seed),
        _ => v10::encrypt(out, clear, session_id, session_key, &seed, padding),
    }
}

/// Allocating variant of [`encrypt`].
pub fn encrypt_to_vec(
    clear: &[u8],
    padding: Padding,
    session_id: &SimpleResourceId,
    session_key: &SymmetricKey,
) -> Result<(Vec<u8>, EncryptionMetadata)> {
    let mut out = vec![0u8; encrypted_size(clear.len() as u64, padding) as usize];
    let metadata = encrypt(&mut out, clear, padding, session_id, session_key)?;
    Ok((out, metadata))
}

/// Clear size bound without decrypting. Exact for unpadded formats.
pub fn max_decrypted_size(encrypted: &[u8]) -> Result<u64> {
    match EncryptionFormat::of(encrypted)? {
        EncryptionFormat::V2 => v2::decrypted_size(encrypted),
        EncryptionFormat::V3 => v3::decrypted_size(encrypted),
        EncryptionFormat::V4 => v4::decrypted_size(encrypted),
        EncryptionFormat::V5 => v5::decrypted_size(encrypted),
        EncryptionFormat::V6 => v6::decrypted_size(encrypted),
        EncryptionFormat::V7 => v7::decrypted_size(encrypted),
        EncryptionFormat::V8 => v8::decrypted_size(encrypted),
        EncryptionFormat::V9 => v9::decrypted_size(encrypted),
        EncryptionFormat::V10 => v10::decrypted_size(encrypted),
        EncryptionFormat::V11 => v11::decrypted_size(encrypted),
    }
}

/// Exact clear size. Padded formats are decrypted to find it.
pub async fn decrypted_size<F: KeyFinder>(encrypted: &[u8], finder: &F) -> Result<u64> {
    if EncryptionFormat::of(encrypted)?.is_padded() {
        return Ok(decrypt_to_vec(finder, encrypted).await?.len() as u64);
    }
    max_decrypted_size(encrypted)
}

/// Decrypt any envelope into `out` and return the clear size. `out` must
/// hold `max_decrypted_size(encrypted)` bytes.
pub async fn decrypt<F: KeyFinder>(out: &mut [u8], finder: &F, encrypted: &[u8]) -> Result<usize> {
    let format = EncryptionFormat::of(encrypted)?;
    debug!(format = ?format, len = encrypted.len(), "decrypting");
    match format {
        EncryptionFormat::V2 => v2::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V3 => v3::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V4 => v4::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V5 => v5::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V6 => v6::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V7 => v7::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V8 => v8::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V9 => v9::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V10 => v10::decrypt(out, finder, encrypted).await,
        EncryptionFormat::V11 => v11::decrypt(out, finder, encrypted).await,
    }
}

/// Decrypt with a known key, skipping resolution.
pub async fn decrypt_with_key(out: &mut [u8], key: &SymmetricKey, encrypted: &[u8]) -> Result<usize> {
    decrypt(out, &FixedKey(*key), encrypted).await
}

/// Allocating variant of [`decrypt`].
pub async fn decrypt_to_vec<F: KeyFinder>(finder: &F, encrypted: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; max_decrypted_size(encrypted)? as usize];
    let len = decrypt(&mut out, finder, encrypted).await?;
    out.truncate(len);
    Ok(out)
}

pub fn extract_resource_id(encrypted: &[u8]) -> Result<ResourceId> {
    Ok(match EncryptionFormat::of(encrypted)? {
        EncryptionFormat::V2 => v2::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V3 => v3::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V4 => v4::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V5 => v5::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V6 => v6::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V7 => v7::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V8 => v8::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V9 => v9::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V10 => v10::extract_resource_id(encrypted)?.into(),
        EncryptionFormat::V11 => v11::extract_resource_id(encrypted)?.into(),
    })
}

/// Single-resource encryption stream: v4 when padding is off, v8 otherwise.
#[derive(Debug)]
pub enum EncryptionStream<R> {
    V4(EncryptionStreamV4<R>),
    V8(EncryptionStreamV8<R>),
}

impl<R: AsyncRead + Unpin> EncryptionStream<R> {
    pub fn new(source: R, options: EncryptionOptions) -> Result<Self> {
        if options.padding.step_value() == Some(1) {
            Ok(Self::V4(EncryptionStreamV4::new(source, options)?))
        } else {
            Ok(Self::V8(EncryptionStreamV8::new(source, options)?))
        }
    }

    pub async fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        match self {
            Self::V4(s) => s.read(out).await,
            Self::V8(s) => s.read(out).await,
        }
    }

    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        match self {
            Self::V4(s) => s.read_to_end().await,
            Self::V8(s) => s.read_to_end().await,
        }
    }

    pub fn resource_id(&self) -> SimpleResourceId {
        match self {
            Self::V4(s) => s.resource_id(),
            Self::V8(s) => s.resource_id(),
        }
    }

    pub fn symmetric_key(&self) -> SymmetricKey {
        match self {
            Self::V4(s) => s.symmetric_key(),
            Self::V8(s) => s.symmetric_key(),
        }
    }
}

/// Decryption stream over any envelope.
///
/// Chunked formats decrypt chunk by chunk; whole-buffer formats are read to
/// the end and decrypted at once by `open`.
#[derive(Debug)]
pub enum DecryptionStream<R> {
    Chunk(ChunkDecryptionStream<PeekableInputSource<R>>),
    Session(SessionDecryptionStream<PeekableInputSource<R>>),
    Buffer {
        resource_id: ResourceId,
        clear: Vec<u8>,
        position: usize,
    },
}

impl<R: AsyncRead + Unpin> DecryptionStream<R> {
    /// Peek the version and build the matching decryptor.
    ///
    /// # Errors
    /// - `InvalidArgument` on empty input.
    /// - `UnsupportedVersion` on an unknown tag.
    /// - whatever the selected decryptor reports for its first chunk.
    pub async fn open<F: KeyFinder>(source: R, finder: &F) -> Result<Self> {
        let mut source = PeekableInputSource::new(source);
        let version = match source.peek(1).await?.first() {
            Some(&version) => version,
            None => return Err(Error::InvalidArgument("encrypted data is empty".into())),
        };
        let format = EncryptionFormat::from_version(version)?;
        debug!(format = ?format, "opening decryption stream");

        match format {
            EncryptionFormat::V4 | EncryptionFormat::V8 => {
                Ok(Self::Chunk(ChunkDecryptionStream::create(source, finder).await?))
            }
            EncryptionFormat::V11 => Ok(Self::Session(SessionDecryptionStream::create(source, finder).await?)),
            _ => {
                let encrypted = read_all(&mut source).await?;
                let resource_id = extract_resource_id(&encrypted)?;
                let clear = decrypt_to_vec(finder, &encrypted).await?;
                Ok(Self::Buffer { resource_id, clear, position: 0 })
            }
        }
    }

    pub async fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        match self {
            Self::Chunk(s) => s.read(out).await,
            Self::Session(s) => s.read(out).await,
            Self::Buffer { clear, position, .. } => {
                let n = out.len().min(clear.len() - *position);
                out[..n].copy_from_slice(&clear[*position..*position + n]);
                *position += n;
                Ok(n)
            }
        }
    }

    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        match self {
            Self::Chunk(s) => s.read_to_end().await,
            Self::Session(s) => s.read_to_end().await,
            Self::Buffer { clear, position, .. } => {
                let rest = clear[*position..].to_vec();
                *position = clear.len();
                Ok(rest)
            }
        }
    }

    pub fn resource_id(&self) -> ResourceId {
        match self {
            Self::Chunk(s) => s.resource_id().into(),
            Self::Session(s) => s.resource_id().into(),
            Self::Buffer { resource_id, .. } => *resource_id,
        }
    }
}
