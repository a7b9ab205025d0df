//! A [`Scaling`] maps raw field integers to physical values and back.
//!
//! Decoding computes `raw * scale + add`. Encoding inverts it as
//! `(value - add) / scale` and truncates toward zero, so with a positive scale a
//! decoded value is never greater than the encoded one and may be up to one step below.

use crate::{bits, errors::CodecError};

/// Linear transform between a raw unsigned field value and a physical value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling {
    /// Size of one raw step in physical units.
    pub scale: f32,
    /// Physical value of raw 0.
    pub add: f32,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            scale: 1.0,
            add: 0.0,
        }
    }
}

impl Scaling {
    pub fn new(scale: f32, add: f32) -> Self {
        Self { scale, add }
    }

    /// Converts a raw value into its physical value. A zero scale always yields `add`.
    pub fn apply(&self, raw: u32) -> f32 {
        raw as f32 * self.scale + self.add
    }

    /// Converts a physical value into the raw value for a `bit_length`-bit field.
    ///
    /// Fails with [`CodecError::InvalidScale`] if the scale is zero or non-finite and
    /// with [`CodecError::ValueOutOfRange`] if the truncated result is negative, NaN,
    /// or wider than the field.
    pub fn invert(&self, value: f32, bit_length: usize) -> Result<u32, CodecError> {
        if bit_length == 0 || bit_length > bits::MAX_BITS {
            return Err(CodecError::InvalidLength);
        }
        self.validate()?;

        let adjusted = (value - self.add) / self.scale;
        if adjusted.is_nan() || adjusted <= -1.0 {
            return Err(CodecError::ValueOutOfRange);
        }

        let raw = adjusted.trunc();
        if f64::from(raw) > f64::from(bits::max_value(bit_length)) {
            return Err(CodecError::ValueOutOfRange);
        }

        Ok(raw as u32)
    }

    /// Checks that the scaling can be inverted.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(CodecError::InvalidScale);
        }

        Ok(())
    }
}
