// ## 📂 File: `src/config.rs`

//! Encryption options.
//!
//! The library reads no environment or files. Callers build
//! `EncryptionOptions` (or deserialize them from their own config) and pass
//! them to stream constructors.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENCRYPTED_CHUNK_SIZE;
use crate::padding::Padding;
use crate::types::{Error, Result};

/// Options of one encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionOptions {
    /// Padding applied to the clear data.
    pub padding: Padding,

    /// Size of every encrypted chunk but the last (streaming formats only).
    pub encrypted_chunk_size: u32,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        Self {
            padding: Padding::Auto,
            encrypted_chunk_size: DEFAULT_ENCRYPTED_CHUNK_SIZE,
        }
    }
}

impl EncryptionOptions {
    pub fn new(padding: Padding, encrypted_chunk_size: u32) -> Self {
        Self { padding, encrypted_chunk_size }
    }

    pub fn with_padding(padding: Padding) -> Self {
        Self { padding, ..Self::default() }
    }

    /// Check that chunks of this size carry at least one clear byte once
    /// `chunk_overhead` bytes of framing are removed.
    pub fn validate(&self, chunk_overhead: u32) -> Result<()> {
        if self.encrypted_chunk_size <= chunk_overhead {
            return Err(Error::InvalidArgument(format!(
                "invalid encrypted chunk size: {} (must be greater than {})",
                self.encrypted_chunk_size, chunk_overhead
            )));
        }
        Ok(())
    }
}
