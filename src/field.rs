//! Typed fields on top of the bit codec: booleans and scaled numbers.

use crate::{bits, errors::CodecError, transform::Scaling};

/// Where a field lives in a frame and how its raw bits are interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDescriptor {
    /// A single bit.
    Bool { offset: usize },
    /// An unsigned integer of `length` bits mapped through `raw * scale + add`.
    Scaled {
        offset: usize,
        length: usize,
        scale: f32,
        add: f32,
    },
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Bool(bool),
    Float(f32),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl FieldDescriptor {
    /// Bit offset of the field's first bit.
    pub fn offset(&self) -> usize {
        match *self {
            FieldDescriptor::Bool { offset } => offset,
            FieldDescriptor::Scaled { offset, .. } => offset,
        }
    }

    /// Width of the field in bits.
    pub fn length(&self) -> usize {
        match *self {
            FieldDescriptor::Bool { .. } => 1,
            FieldDescriptor::Scaled { length, .. } => length,
        }
    }

    /// One past the field's last bit, or `None` if that overflows `usize`.
    pub fn end(&self) -> Option<usize> {
        self.offset().checked_add(self.length())
    }

    pub fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        match *self {
            FieldDescriptor::Bool { offset } => decode_bool(offset, data).map(Value::Bool),
            FieldDescriptor::Scaled {
                offset,
                length,
                scale,
                add,
            } => decode_scaled(offset, length, scale, add, data).map(Value::Float),
        }
    }

    /// Encodes `value` into `data`. The field's bits must be zero beforehand.
    pub fn encode(&self, value: &Value, data: &mut [u8]) -> Result<(), CodecError> {
        match (*self, *value) {
            (FieldDescriptor::Bool { offset }, Value::Bool(v)) => encode_bool(offset, v, data),
            (
                FieldDescriptor::Scaled {
                    offset,
                    length,
                    scale,
                    add,
                },
                Value::Float(v),
            ) => encode_scaled(offset, length, scale, add, v, data),
            _ => Err(CodecError::TypeMismatch),
        }
    }
}

/// Reads the bit at `offset`.
pub fn decode_bool(offset: usize, data: &[u8]) -> Result<bool, CodecError> {
    Ok(bits::decode_bits(data, offset, 1)? == 1)
}

/// Sets the bit at `offset` when `value` is true. A false value writes nothing.
pub fn encode_bool(offset: usize, value: bool, data: &mut [u8]) -> Result<(), CodecError> {
    bits::encode_bits(u32::from(value), data, offset, 1)
}

/// Reads a `length`-bit field and returns `raw * scale + add`.
pub fn decode_scaled(
    offset: usize,
    length: usize,
    scale: f32,
    add: f32,
    data: &[u8],
) -> Result<f32, CodecError> {
    let raw = bits::decode_bits(data, offset, length)?;
    Ok(Scaling::new(scale, add).apply(raw))
}

/// Writes `(value - add) / scale`, truncated toward zero, as a `length`-bit field.
pub fn encode_scaled(
    offset: usize,
    length: usize,
    scale: f32,
    add: f32,
    value: f32,
    data: &mut [u8],
) -> Result<(), CodecError> {
    bits::check_span(data.len(), offset, length)?;
    let raw = Scaling::new(scale, add).invert(value, length)?;
    bits::encode_bits(raw, data, offset, length)
}
