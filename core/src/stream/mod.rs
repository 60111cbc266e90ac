// ## 📂 File: `src/stream/mod.rs`

//! Streaming engine and the chunked codecs built on it.

pub mod io;
pub mod buffered;
pub mod encrypt;
pub mod decrypt;

pub use io::*;
pub use buffered::*;
pub use encrypt::*;
pub use decrypt::*;
