// ## 📂 File: `src/constants.rs`

//! Wire-level sizes and defaults shared by every envelope format.
//!
//! All sizes are fixed by XChaCha20-Poly1305 and by ciphertexts already in
//! circulation. Changing any of them breaks decoding of existing data.

/// Symmetric key length (XChaCha20-Poly1305).
pub const KEY_LEN: usize = 32;
/// AEAD IV length (XChaCha20-Poly1305 extended nonce).
pub const IV_LEN: usize = 24;
/// AEAD authentication tag length.
pub const MAC_LEN: usize = 16;

/// Simple resource id length.
pub const RESOURCE_ID_LEN: usize = 16;
/// Subkey seed length (transparent sessions).
pub const SUBKEY_SEED_LEN: usize = 16;
/// Composite resource id: type byte + session id + subkey seed.
pub const COMPOSITE_RESOURCE_ID_LEN: usize = 1 + RESOURCE_ID_LEN + SUBKEY_SEED_LEN;

/// Every version tag fits in one byte.
pub const VERSION_LEN: usize = 1;
/// Chunk size field in chunk headers.
pub const CHUNK_SIZE_LEN: usize = 4;

/// Default encrypted chunk size for streaming formats (1 MiB).
pub const DEFAULT_ENCRYPTED_CHUNK_SIZE: u32 = 1024 * 1024;

/// Buffers whose padded size reaches this threshold are encrypted with the
/// chunked transparent-session format instead of a whole-buffer one.
pub const STREAM_THRESHOLD: u64 = 1024 * 1024;

/// Smallest padded size produced by automatic padding (excluding the 0x80 byte).
pub const MINIMAL_PADDING: u64 = 10;

/// Padding sentinel byte.
pub const PADDING_BYTE: u8 = 0x80;

/// Envelope version tags.
pub mod versions {
    pub const V2: u8 = 2;
    pub const V3: u8 = 3;
    pub const V4: u8 = 4;
    pub const V5: u8 = 5;
    pub const V6: u8 = 6;
    pub const V7: u8 = 7;
    pub const V8: u8 = 8;
    pub const V9: u8 = 9;
    pub const V10: u8 = 10;
    pub const V11: u8 = 11;
}
