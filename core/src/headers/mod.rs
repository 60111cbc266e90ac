// ## src/headers/mod.rs

//! headers/mod.rs
//! Chunk and session headers of the streaming formats.
//!
//! Industry notes:
//! - v8 binds the encoded chunk header as AEAD associated data and v11
//!   binds the encoded session header to every chunk. v4 headers are not
//!   authenticated; decoders compare them across chunks instead.
//! - The resource id sits in clear so the key can be looked up before
//!   anything is decrypted.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
