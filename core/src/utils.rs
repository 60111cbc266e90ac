// ## 📂 File: `src/utils.rs`

use rand::rngs::OsRng;
use rand::RngCore;

/// Fill `buf` from the operating system RNG.
#[inline]
pub fn random_fill(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Lowercase hex, used by `Display`/`Debug` of identifiers and in log fields.
#[inline]
pub fn fmt_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Fixed-size byte array newtype with the conversions every wire field needs.
///
/// The `hex` arm also derives hex `Debug`/`Display`; without it the caller
/// provides its own (keys must not print their bytes).
macro_rules! byte_array_type {
    (hex $(#[$meta:meta])* $name:ident, $len:expr) => {
        $crate::utils::byte_array_type!($(#[$meta])* $name, $len);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::utils::fmt_hex(&self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            #[inline]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            #[inline]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Fresh value from the OS RNG.
            pub fn random() -> Self {
                let mut bytes = [0u8; $len];
                $crate::utils::random_fill(&mut bytes);
                Self(bytes)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = $crate::types::Error;

            fn try_from(bytes: &[u8]) -> ::core::result::Result<Self, Self::Error> {
                <[u8; $len]>::try_from(bytes)
                    .map(Self)
                    .map_err(|_| $crate::types::Error::InvalidBufferSize {
                        what: stringify!($name),
                        actual: bytes.len(),
                    })
            }
        }
    };
}

pub(crate) use byte_array_type;
