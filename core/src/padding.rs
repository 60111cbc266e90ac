// ## 📂 File: `src/padding.rs`

//! Length-hiding padding.
//!
//! Padded data is `clear || 0x80 || 0x00*`. The padded size is a pure
//! function of the clear size and the `Padding` setting:
//! - `Auto`: PADME, never below `MINIMAL_PADDING`.
//! - `Step(s)`: next multiple of `s`.
//! - `Off`: the sentinel byte only.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::constants::{MINIMAL_PADDING, PADDING_BYTE};
use crate::types::{Error, Result};

/// Padding setting of an encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// PADME with a floor of `MINIMAL_PADDING`.
    #[default]
    Auto,
    /// No padding beyond the sentinel byte. Same sizes as `Step(1)`.
    Off,
    /// Round the clear size up to a multiple of the step.
    Step(NonZeroU32),
}

impl Padding {
    /// Build a step padding; `1` is `Off`, `0` is rejected.
    pub fn step(step: u32) -> Result<Self> {
        match NonZeroU32::new(step) {
            None => Err(Error::InvalidArgument("padding step must be greater than 0".into())),
            Some(s) if s.get() == 1 => Ok(Padding::Off),
            Some(s) => Ok(Padding::Step(s)),
        }
    }

    /// Step value, `None` for automatic padding.
    #[inline]
    pub fn step_value(&self) -> Option<u32> {
        match self {
            Padding::Auto => None,
            Padding::Off => Some(1),
            Padding::Step(s) => Some(s.get()),
        }
    }
}

/// PADME: round `n` up to a value with O(log log n) significant bits.
///
/// `padme(0) == padme(1) == 0`.
pub fn padme(n: u64) -> u64 {
    if n <= 1 {
        return 0;
    }
    let e = 63 - u64::from(n.leading_zeros());
    let s = 64 - u64::from(e.leading_zeros());
    let mask = (1u64 << (e - s)) - 1;
    (n + mask) & !mask
}

/// Total padded size (sentinel byte included) for `clear_size` bytes.
pub fn padded_from_clear_size(clear_size: u64, padding: Padding) -> u64 {
    match padding.step_value() {
        None => padme(clear_size).max(MINIMAL_PADDING) + 1,
        Some(step) => {
            let step = u64::from(step);
            if clear_size == 0 {
                step + 1
            } else {
                clear_size.div_ceil(step) * step + 1
            }
        }
    }
}

/// `clear || 0x80 || 0x00*` up to `padded_from_clear_size`.
pub fn pad_clear_data(clear: &[u8], padding: Padding) -> Vec<u8> {
    let padded_size = padded_from_clear_size(clear.len() as u64, padding) as usize;
    let mut out = Vec::with_capacity(padded_size);
    out.extend_from_slice(clear);
    out.push(PADDING_BYTE);
    out.resize(padded_size, 0x00);
    out
}

/// Clear size inside padded data: offset of the last non-zero byte, which
/// must be `0x80`.
///
/// # Errors
/// `Error::DecryptionFailed` when no sentinel terminates the data.
pub fn unpadded_size(padded: &[u8]) -> Result<usize> {
    match padded.iter().rposition(|&b| b != 0x00) {
        Some(pos) if padded[pos] == PADDING_BYTE => Ok(pos),
        _ => Err(Error::decryption("unable to remove padding")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_constructor() {
        assert_eq!(Padding::step(1).unwrap(), Padding::Off);
        assert!(matches!(Padding::step(0), Err(Error::InvalidArgument(_))));
        assert_eq!(Padding::step(5).unwrap().step_value(), Some(5));
    }

    #[test]
    fn off_floor_is_two() {
        assert_eq!(padded_from_clear_size(0, Padding::Off), 2);
        assert_eq!(padded_from_clear_size(1, Padding::Off), 2);
        assert_eq!(padded_from_clear_size(130, Padding::Off), 131);
    }
}
