// ## 📂 File: `src/types.rs`

use std::io;
use thiserror::Error;

use crate::headers::HeaderError;
use crate::resource_id::ResourceId;

/// Unified error for every envelope operation.
/// - `From` impls enable `?` across codecs and streams.
/// - Every cause of a failed decryption (bad tag, bad padding, mismatched
///   chunk headers) is folded into `DecryptionFailed`.
#[derive(Debug, Error)]
pub enum Error {
    /// Encrypted input shorter than the format overhead.
    #[error("truncated buffer: {0}")]
    TruncatedBuffer(String),

    /// Version tag not handled by the dispatcher.
    #[error("unhandled format version {0} used in encrypted data")]
    UnsupportedVersion(u8),

    /// Tag mismatch, malformed padding or chunk header tampering.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// The key resolver has no key for this resource.
    #[error("key not found for resource: {0}")]
    KeyNotFound(ResourceId),

    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Byte span of a length no resource id has.
    #[error("invalid buffer size for {what}: {actual}")]
    InvalidBufferSize { what: &'static str, actual: usize },

    /// Underlying input source failure, or a stream already in its error state.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Internal invariant violation.
    #[error("assertion failed: {0}")]
    Assertion(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn truncated(what: impl Into<String>) -> Self {
        Error::TruncatedBuffer(what.into())
    }

    pub(crate) fn decryption(what: impl Into<String>) -> Self {
        Error::DecryptionFailed(what.into())
    }

    /// True for every error that means "this ciphertext does not decrypt".
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Error::DecryptionFailed(_))
    }
}

impl From<HeaderError> for Error {
    /// Buffer-level mapping. Streams remap header errors to `DecryptionFailed`
    /// themselves.
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::BufferTooShort { .. } => Error::TruncatedBuffer(e.to_string()),
            HeaderError::UnsupportedVersion(v) => Error::UnsupportedVersion(v),
            HeaderError::InvalidChunkSize { .. } => Error::InvalidArgument(e.to_string()),
        }
    }
}
