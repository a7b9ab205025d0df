//! # bitframe
//!
//! Packs fixed-width numeric fields into byte buffers at arbitrary bit offsets.
//!
//! The [bits] module reads and writes unsigned integers of 1 to 32 bits anywhere in
//! a byte slice. The [field] module layers booleans and linearly scaled numbers
//! (`physical = raw * scale + add`) on top. A [schema::Schema] names and places a
//! set of fields so whole frames can be decoded and encoded at once.
//!
//! ## Example
//!
//! ```
//! use bitframe::bits::{decode_bits, encode_bits};
//! use bitframe::field::{decode_scaled, encode_scaled};
//!
//! let mut frame = [0u8; 8];
//! encode_bits(600, &mut frame, 14, 10).unwrap();
//! assert_eq!(decode_bits(&frame, 14, 10).unwrap(), 600);
//!
//! let mut frame = [0u8; 8];
//! encode_scaled(14, 10, 0.05, -10.0, 2.81, &mut frame).unwrap();
//! let temperature = decode_scaled(14, 10, 0.05, -10.0, &frame).unwrap();
//! assert!((temperature - 2.80).abs() < 1e-4);
//! ```

pub mod bits;
pub mod errors;
pub mod field;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod transform;

pub use errors::{CodecError, FrameError, LayoutError};
pub use field::{FieldDescriptor, Value};
pub use schema::{Field, FieldSpec, Schema};
