//! envelope-core
//!
//! Versioned encryption envelopes and streaming codecs.
//! Pure Rust, no FFI, no global state.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Primitives
pub mod crypto;
pub mod padding;
pub mod resource_id;
pub mod headers;

// Codecs
pub mod formats;
pub mod stream;
pub mod encryptor;

pub use types::{Error, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::EncryptionOptions;
    pub use crate::crypto::SymmetricKey;
    pub use crate::encryptor::{
        decrypt, decrypt_to_vec, decrypt_with_key, decrypted_size, encrypt, encrypt_to_vec, encrypted_size,
        extract_resource_id, max_decrypted_size, DecryptionStream, EncryptionFormat, EncryptionStream,
    };
    pub use crate::formats::{EncryptionMetadata, FixedKey, KeyFinder};
    pub use crate::padding::Padding;
    pub use crate::resource_id::{CompositeResourceId, ResourceId, SimpleResourceId, SubkeySeed};
    pub use crate::stream::{EncryptionStreamV11, EncryptionStreamV4, EncryptionStreamV8};
    pub use crate::types::{Error, Result};
}
