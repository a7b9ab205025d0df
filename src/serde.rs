//! Deserializable schema description.
//!
//! These types describe the layout of a frame. They are intended to be loaded from
//! JSON (for example a layout file shipped with your application) and then compiled
//! into a [`Schema`] with [`Schema::try_from`]. Fields are placed back to back in
//! the order they are listed.

use serde::{Deserialize, Serialize};

use crate::{
    errors::LayoutError,
    schema::{FieldSpec, Schema},
};

/// Top-level layout definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Name of the frame layout.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fields in frame order; the first starts at bit 0.
    pub fields: Vec<FieldSpecDef>,
}

/// Sizing rule for a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldSpecDef {
    /// Single bit flag.
    Bool { name: String },
    /// Fixed bit count spread evenly over `min..=max`.
    BitLength {
        name: String,
        min: f32,
        max: f32,
        bits: usize,
    },
    /// Smallest bit count covering `min..=max` at the given resolution.
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
        #[serde(default)]
        add: f32,
    },
}

impl From<FieldSpecDef> for FieldSpec {
    fn from(value: FieldSpecDef) -> Self {
        match value {
            FieldSpecDef::Bool { name } => FieldSpec::Bool { name },
            FieldSpecDef::BitLength {
                name,
                min,
                max,
                bits,
            } => FieldSpec::BitLength {
                name,
                min,
                max,
                bits,
            },
            FieldSpecDef::Resolution {
                name,
                min,
                max,
                resolution,
            } => FieldSpec::Resolution {
                name,
                min,
                max,
                resolution,
            },
            FieldSpecDef::Manual {
                name,
                length,
                scale,
                add,
            } => FieldSpec::Manual {
                name,
                length,
                scale,
                add,
            },
        }
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = LayoutError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        let specs: Vec<FieldSpec> = value.fields.into_iter().map(Into::into).collect();
        Schema::compile(value.name, value.description, &specs)
    }
}
