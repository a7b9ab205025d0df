//! Schema: an ordered, validated set of named fields describing one fixed-size frame.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace, warn};

use crate::{
    bits::{self, MAX_BITS},
    errors::{FrameError, LayoutError},
    field::{FieldDescriptor, Value},
};

/// A named field placed at a fixed bit offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key used in decoded and encoded value maps.
    pub name: String,
    pub descriptor: FieldDescriptor,
}

impl Field {
    pub fn new(name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

/// How to size a field whose offset is assigned by [Schema::compile].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSpec {
    /// A single bit.
    Bool { name: String },
    /// `bits` wide, spreading `min..=max` evenly over the raw range.
    BitLength {
        name: String,
        min: f32,
        max: f32,
        bits: usize,
    },
    /// As few bits as needed to cover `min..=max` in steps of `resolution`.
    Resolution {
        name: String,
        min: f32,
        max: f32,
        resolution: f32,
    },
    /// Explicit length, scale and add.
    Manual {
        name: String,
        length: usize,
        scale: f32,
        add: f32,
    },
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Bool { name }
            | FieldSpec::BitLength { name, .. }
            | FieldSpec::Resolution { name, .. }
            | FieldSpec::Manual { name, .. } => name,
        }
    }

    /// Builds the descriptor for this field starting at `offset`.
    fn place(&self, offset: usize) -> Result<FieldDescriptor, LayoutError> {
        let invalid = || LayoutError::InvalidFieldSpec(self.name().to_string());

        let descriptor = match *self {
            FieldSpec::Bool { .. } => FieldDescriptor::Bool { offset },
            FieldSpec::BitLength {
                min,
                max,
                bits: width,
                ..
            } => {
                if width == 0 || width > MAX_BITS {
                    return Err(LayoutError::InvalidFieldSize(self.name().to_string()));
                }
                if !(min.is_finite() && max.is_finite() && max > min) {
                    return Err(invalid());
                }

                let steps = f64::from(bits::max_value(width));
                FieldDescriptor::Scaled {
                    offset,
                    length: width,
                    scale: ((f64::from(max) - f64::from(min)) / steps) as f32,
                    add: min,
                }
            }
            FieldSpec::Resolution {
                min,
                max,
                resolution,
                ..
            } => {
                if !(min.is_finite() && max.is_finite() && max > min) {
                    return Err(invalid());
                }
                if !(resolution.is_finite() && resolution > 0.0) {
                    return Err(invalid());
                }

                let steps = (f64::from(max) - f64::from(min)) / f64::from(resolution);
                let length = (steps + 1.0).log2().ceil() as usize;
                if length == 0 || length > MAX_BITS {
                    return Err(LayoutError::InvalidFieldSize(self.name().to_string()));
                }

                FieldDescriptor::Scaled {
                    offset,
                    length,
                    scale: resolution,
                    add: min,
                }
            }
            FieldSpec::Manual {
                length, scale, add, ..
            } => {
                if length == 0 || length > MAX_BITS {
                    return Err(LayoutError::InvalidFieldSize(self.name().to_string()));
                }
                if !(scale.is_finite() && add.is_finite()) {
                    return Err(invalid());
                }

                FieldDescriptor::Scaled {
                    offset,
                    length,
                    scale,
                    add,
                }
            }
        };

        Ok(descriptor)
    }
}

/// A compiled frame layout. Build it with [Schema::compile] or [Schema::new], then
/// [Schema::decode] frames into named [Value]s or [Schema::encode] values into frames.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    description: String,
    total_bits: usize,
    fields: Vec<Field>,
}

impl Schema {
    /// Places `specs` back to back from bit 0 in declaration order.
    pub fn compile(
        name: impl Into<String>,
        description: impl Into<String>,
        specs: &[FieldSpec],
    ) -> Result<Self, LayoutError> {
        let mut fields = Vec::with_capacity(specs.len());
        let mut start_bit = 0;

        for spec in specs {
            let descriptor = spec.place(start_bit)?;
            start_bit = descriptor
                .end()
                .ok_or_else(|| LayoutError::InvalidFieldSize(spec.name().to_string()))?;
            fields.push(Field::new(spec.name(), descriptor));
        }

        Self::new(name, description, fields)
    }

    /// Builds a schema from fields with explicit offsets.
    ///
    /// Fails if a name is empty or repeated, a field is not 1..=32 bits wide or ends
    /// past `usize::MAX`, a scaled field has a non-finite scale or add, or two fields
    /// share a bit.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        fields: Vec<Field>,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let mut names = HashSet::with_capacity(fields.len());
        let mut spans = Vec::with_capacity(fields.len());
        let mut total_bits = 0;

        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(LayoutError::InvalidFieldName);
            }
            if !names.insert(field.name.as_str()) {
                return Err(LayoutError::DuplicateFieldName(field.name.clone()));
            }

            let length = field.descriptor.length();
            if length == 0 || length > MAX_BITS {
                return Err(LayoutError::InvalidFieldSize(field.name.clone()));
            }
            let offset = field.descriptor.offset();
            let end = field
                .descriptor
                .end()
                .ok_or_else(|| LayoutError::InvalidFieldSize(field.name.clone()))?;

            if let FieldDescriptor::Scaled { scale, add, .. } = field.descriptor {
                if !(scale.is_finite() && add.is_finite()) {
                    return Err(LayoutError::InvalidFieldSpec(field.name.clone()));
                }
                if scale == 0.0 {
                    warn!(schema = %name, field = %field.name, "zero scale, field is decode-only");
                }
            }

            debug!(
                schema = %name,
                field = %field.name,
                offset,
                length,
                "placed field"
            );
            total_bits = total_bits.max(end);
            spans.push((offset, end, field.name.as_str()));
        }

        check_overlaps(spans)?;
        debug!(schema = %name, fields = fields.len(), total_bits, "schema built");

        Ok(Self {
            name,
            description: description.into(),
            total_bits,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Fields in definition order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// One past the last bit used by any field.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Number of bytes in a frame.
    pub fn byte_len(&self) -> usize {
        bits::div_up(self.total_bits, 8)
    }

    /// Decodes every field of `frame`. Fails if `frame` is shorter than [Schema::byte_len].
    pub fn decode(&self, frame: &[u8]) -> Result<BTreeMap<String, Value>, FrameError> {
        self.check_len(frame.len())?;

        let mut map = BTreeMap::new();
        for field in &self.fields {
            let value = field
                .descriptor
                .decode(frame)
                .map_err(|source| FrameError::Field {
                    name: field.name.clone(),
                    source,
                })?;

            trace!(schema = %self.name, field = %field.name, ?value, "decoded field");
            map.insert(field.name.clone(), value);
        }

        Ok(map)
    }

    /// Encodes `values` into a new zeroed frame of [Schema::byte_len] bytes.
    pub fn encode(&self, values: &BTreeMap<String, Value>) -> Result<Vec<u8>, FrameError> {
        let mut frame = vec![0u8; self.byte_len()];
        self.encode_fields(values, &mut frame)?;
        Ok(frame)
    }

    /// Encodes `values` into `frame`, zeroing its first [Schema::byte_len] bytes first.
    ///
    /// Bytes past the schema are left untouched. On error the frame is left zeroed.
    pub fn encode_into(
        &self,
        values: &BTreeMap<String, Value>,
        frame: &mut [u8],
    ) -> Result<(), FrameError> {
        self.check_len(frame.len())?;

        let frame = &mut frame[..self.byte_len()];
        frame.fill(0);

        self.encode_fields(values, frame).inspect_err(|_| frame.fill(0))
    }

    fn encode_fields(
        &self,
        values: &BTreeMap<String, Value>,
        frame: &mut [u8],
    ) -> Result<(), FrameError> {
        for field in &self.fields {
            let value = values
                .get(&field.name)
                .ok_or_else(|| FrameError::MissingField(field.name.clone()))?;

            trace!(schema = %self.name, field = %field.name, ?value, "encoding field");
            field
                .descriptor
                .encode(value, frame)
                .map_err(|source| FrameError::Field {
                    name: field.name.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), FrameError> {
        let expected = self.byte_len();
        if actual < expected {
            return Err(FrameError::FrameTooShort { expected, actual });
        }

        Ok(())
    }
}

/// Fails on the first pair of `(offset, end, name)` spans claiming a common bit.
fn check_overlaps(mut spans: Vec<(usize, usize, &str)>) -> Result<(), LayoutError> {
    spans.sort_by_key(|&(offset, ..)| offset);

    for pair in spans.windows(2) {
        let (_, end, first) = pair[0];
        let (offset, _, second) = pair[1];
        if offset < end {
            return Err(LayoutError::OverlappingFields(
                first.to_string(),
                second.to_string(),
            ));
        }
    }

    Ok(())
}
