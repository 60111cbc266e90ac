// ## 📂 File: `src/crypto/types.rs`

use std::fmt;

use crate::constants::{IV_LEN, KEY_LEN, MAC_LEN};
use crate::utils::byte_array_type;

byte_array_type!(
    /// 32-byte XChaCha20-Poly1305 key. `Debug` never shows the bytes.
    SymmetricKey,
    KEY_LEN
);

byte_array_type!(hex
    /// 24-byte AEAD IV, also used as a per-chunk IV seed.
    AeadIv,
    IV_LEN
);

byte_array_type!(hex
    /// 16-byte Poly1305 tag.
    Mac,
    MAC_LEN
);

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}
