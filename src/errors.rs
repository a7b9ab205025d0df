//! Error types for the bit codec, schema construction and frame encoding.

/// Errors produced by [crate::bits] and [crate::field] operations.
///
/// Every check runs before the first byte is written, so a failed encode leaves
/// the buffer untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Bit length is 0 or greater than 32.
    #[error("bit length must be between 1 and 32")]
    InvalidLength,
    /// Requested bit range is beyond the end of the buffer.
    #[error("bit range exceeds the buffer")]
    OutOfBounds,
    /// Scale is zero or non-finite, so the value cannot be encoded.
    #[error("scale must be finite and non-zero to encode")]
    InvalidScale,
    /// Value does not fit in the field's bit length.
    #[error("value does not fit in the field")]
    ValueOutOfRange,
    /// Value kind (bool or number) does not match the field kind.
    #[error("value kind does not match the field")]
    TypeMismatch,
}

/// Errors produced when building a [crate::schema::Schema].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Field name is empty.
    #[error("field name must not be empty")]
    InvalidFieldName,
    /// Two fields share the same name.
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
    /// Field length is 0 or greater than 32 bits.
    #[error("field `{0}` must be between 1 and 32 bits wide")]
    InvalidFieldSize(String),
    /// Sizing parameters cannot produce a field (empty range, bad resolution, ...).
    #[error("field `{0}` has invalid sizing parameters")]
    InvalidFieldSpec(String),
    /// Two fields claim the same bits.
    #[error("fields `{0}` and `{1}` overlap")]
    OverlappingFields(String, String),
}

/// Errors produced when decoding or encoding a whole frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Input frame is shorter than the schema's byte length.
    #[error("frame is {actual} bytes, schema needs {expected}")]
    FrameTooShort { expected: usize, actual: usize },
    /// A field of the schema has no value to encode.
    #[error("missing value for field `{0}`")]
    MissingField(String),
    /// Decoding or encoding a single field failed.
    #[error("field `{name}`: {source}")]
    Field { name: String, source: CodecError },
}
