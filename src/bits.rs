//! Low-level bit packing for byte slices.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! A field spanning several bytes is assembled little-endian by position: the bits
//! taken from its first byte are the least significant bits of the value, and the
//! bits taken from its last byte are the most significant.

use crate::errors::CodecError;

/// Widest field the codec can read or write.
pub const MAX_BITS: usize = 32;

/// Integer division rounding up. `y` must be non-zero.
#[inline]
pub(crate) fn div_up(x: usize, y: usize) -> usize {
    x / y + usize::from(x % y != 0)
}

/// Checks that `bit_length` is supported and that the field fits in `len` bytes.
pub(crate) fn check_span(len: usize, bit_offset: usize, bit_length: usize) -> Result<(), CodecError> {
    if bit_length == 0 || bit_length > MAX_BITS {
        return Err(CodecError::InvalidLength);
    }

    if bit_offset
        .checked_add(bit_length)
        .map_or(true, |end| end > len * 8)
    {
        return Err(CodecError::OutOfBounds);
    }

    Ok(())
}

/// Largest value representable in `bit_length` bits (1..=32).
#[inline]
pub(crate) fn max_value(bit_length: usize) -> u32 {
    (u64::MAX >> (64 - bit_length)) as u32
}

/// Reads `bit_length` bits (1..=32) starting at `bit_offset` as an unsigned value.
pub fn decode_bits(data: &[u8], bit_offset: usize, bit_length: usize) -> Result<u32, CodecError> {
    check_span(data.len(), bit_offset, bit_length)?;

    let end = bit_offset + bit_length;
    let start_byte = bit_offset / 8;
    let stop_byte = end / 8;

    let start_mask = 0xFFu8 >> (bit_offset % 8);
    let used_bits = end - stop_byte * 8;
    let stop_mask = !(0xFFu8 >> used_bits);

    if start_byte == stop_byte {
        // field ends before the byte does
        let byte = data[start_byte] & start_mask & stop_mask;
        return Ok(u32::from(byte >> (8 - used_bits)));
    }

    let mut decoded = u32::from(data[start_byte] & start_mask);
    let mut bits_read = 8 - bit_offset % 8;

    for &byte in &data[start_byte + 1..stop_byte] {
        decoded |= u32::from(byte) << bits_read;
        bits_read += 8;
    }

    if used_bits > 0 {
        let tail = (data[stop_byte] & stop_mask) >> (8 - used_bits);
        decoded |= u32::from(tail) << bits_read;
    }

    Ok(decoded)
}

/// Writes the low `bit_length` bits of `value` at `bit_offset`.
///
/// Bits are OR-ed into the buffer and never cleared: the target bits must be zero
/// beforehand for the field to read back unchanged. Other bits are left alone.
pub fn encode_bits(
    value: u32,
    data: &mut [u8],
    bit_offset: usize,
    bit_length: usize,
) -> Result<(), CodecError> {
    check_span(data.len(), bit_offset, bit_length)?;

    if value > max_value(bit_length) {
        return Err(CodecError::ValueOutOfRange);
    }

    let end = bit_offset + bit_length;
    let start_byte = bit_offset / 8;
    let stop_byte = end / 8;

    let start_mask = 0xFFu8 >> (bit_offset % 8);
    let used_bits = end - stop_byte * 8;
    let stop_mask = !(0xFFu8 >> used_bits);

    if start_byte == stop_byte {
        let shifted = (value << (8 - used_bits)) as u8;
        data[start_byte] |= shifted & start_mask & stop_mask;
        return Ok(());
    }

    data[start_byte] |= (value as u8) & start_mask;
    let mut bits_written = 8 - bit_offset % 8;

    for byte in &mut data[start_byte + 1..stop_byte] {
        *byte |= (value >> bits_written) as u8;
        bits_written += 8;
    }

    if used_bits > 0 {
        let tail = ((value >> bits_written) as u8) << (8 - used_bits);
        data[stop_byte] |= tail & stop_mask;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Byte range `[first, last)` touched by a field.
    fn byte_span(bit_offset: usize, bit_length: usize) -> (usize, usize) {
        (bit_offset / 8, div_up(bit_offset + bit_length, 8))
    }

    #[test]
    fn test_div_up() {
        assert_eq!(div_up(0, 8), 0);
        assert_eq!(div_up(1, 8), 1);
        assert_eq!(div_up(8, 8), 1);
        assert_eq!(div_up(24, 8), 3);
        assert_eq!(div_up(25, 8), 4);
        assert_eq!(div_up(usize::MAX, 8), usize::MAX / 8 + 1);
    }

    #[test]
    fn test_byte_span() {
        assert_eq!(byte_span(0, 8), (0, 1));
        assert_eq!(byte_span(14, 10), (1, 3));
        assert_eq!(byte_span(3, 32), (0, 5));
    }

    #[test]
    fn test_max_value() {
        assert_eq!(max_value(1), 1);
        assert_eq!(max_value(10), 1023);
        assert_eq!(max_value(32), u32::MAX);
    }

    #[test]
    fn test_decode_bits_aligned() {
        let data = [0b11111111];
        assert_eq!(decode_bits(&data, 0, 8).unwrap(), 0b11111111);
    }

    #[test]
    fn test_decode_bits_inside_byte() {
        let data = [0b0010_1100];
        assert_eq!(decode_bits(&data, 2, 3).unwrap(), 0b101);
        assert_eq!(decode_bits(&data, 0, 1).unwrap(), 0);
        assert_eq!(decode_bits(&data, 2, 1).unwrap(), 1);
    }

    #[test]
    fn test_decode_bits_first_byte_is_least_significant() {
        // low nibble of byte 0 holds bits 0..4, high nibble of byte 1 holds bits 4..8
        let data = [0x0B, 0xA0];
        assert_eq!(decode_bits(&data, 4, 8).unwrap(), 0xAB);
    }

    #[test]
    fn test_encode_bits_across_boundary() {
        let mut data = [0u8; 2];
        encode_bits(0xAB, &mut data, 4, 8).unwrap();
        assert_eq!(data, [0x0B, 0xA0]);
    }

    #[test]
    fn test_encode_bits_consecutive_bytes() {
        let mut data = [0u8; 8];
        encode_bits(1, &mut data, 0, 8).unwrap();
        encode_bits(2, &mut data, 8, 8).unwrap();

        assert_eq!(decode_bits(&data, 0, 8).unwrap(), 1);
        assert_eq!(decode_bits(&data, 8, 8).unwrap(), 2);
        assert_eq!(data[..2], [1, 2]);
    }

    #[test]
    fn test_encode_bits_ending_on_byte_boundary() {
        let mut data = [0u8; 8];
        encode_bits(600, &mut data, 14, 10).unwrap();

        // 600 = 0b10_0101_1000: low two bits end byte 1, the rest fill byte 2
        assert_eq!(data, [0, 0, 0x96, 0, 0, 0, 0, 0]);
        assert_eq!(decode_bits(&data, 14, 10).unwrap(), 600);
    }

    #[test]
    fn test_encode_bits_32_unaligned() {
        let mut data = [0u8; 5];
        encode_bits(u32::MAX, &mut data, 3, 32).unwrap();

        assert_eq!(data, [0x1F, 0xFF, 0xFF, 0xFF, 0xE0]);
        assert_eq!(decode_bits(&data, 3, 32).unwrap(), u32::MAX);
    }

    #[test]
    fn test_encode_bits_32_aligned() {
        let mut data = [0u8; 4];
        encode_bits(0x1234_5678, &mut data, 0, 32).unwrap();

        assert_eq!(data, [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(decode_bits(&data, 0, 32).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_encode_bits_keeps_neighbours() {
        let mut data = [0b1000_0001];
        encode_bits(0b11, &mut data, 3, 2).unwrap();
        assert_eq!(data, [0b1001_1001]);
    }

    #[test]
    fn test_decode_bits_invalid_length() {
        let data = [0u8; 8];
        assert_eq!(decode_bits(&data, 0, 0).unwrap_err(), CodecError::InvalidLength);
        assert_eq!(decode_bits(&data, 0, 33).unwrap_err(), CodecError::InvalidLength);
    }

    #[test]
    fn test_decode_bits_out_of_bounds() {
        let data = [0b11111111];
        assert_eq!(decode_bits(&data, 0, 9).unwrap_err(), CodecError::OutOfBounds);
        assert_eq!(decode_bits(&data, 8, 1).unwrap_err(), CodecError::OutOfBounds);
        assert_eq!(
            decode_bits(&data, usize::MAX, 1).unwrap_err(),
            CodecError::OutOfBounds
        );
    }

    #[test]
    fn test_encode_bits_rejects_without_writing() {
        let mut data = [0u8; 2];

        assert_eq!(
            encode_bits(1, &mut data, 0, 33).unwrap_err(),
            CodecError::InvalidLength
        );
        assert_eq!(
            encode_bits(1, &mut data, 10, 8).unwrap_err(),
            CodecError::OutOfBounds
        );
        assert_eq!(
            encode_bits(1024, &mut data, 4, 10).unwrap_err(),
            CodecError::ValueOutOfRange
        );
        assert_eq!(data, [0, 0]);
    }

    fn field_and_value() -> impl Strategy<Value = (usize, usize, u32)> {
        (1usize..=32).prop_flat_map(|len| (0..=64 - len, Just(len), 0..=max_value(len)))
    }

    proptest! {
        #[test]
        fn prop_round_trip((offset, len, value) in field_and_value()) {
            let mut data = [0u8; 8];
            encode_bits(value, &mut data, offset, len).unwrap();
            prop_assert_eq!(decode_bits(&data, offset, len).unwrap(), value);
        }

        #[test]
        fn prop_touches_only_own_bits((offset, len, _) in field_and_value()) {
            let mut data = [0u8; 8];
            encode_bits(max_value(len), &mut data, offset, len).unwrap();

            let (first, last) = byte_span(offset, len);
            for (index, byte) in data.iter().enumerate() {
                if index < first || index >= last {
                    prop_assert_eq!(*byte, 0);
                }
            }

            let set: u32 = data.iter().map(|b| b.count_ones()).sum();
            prop_assert_eq!(set as usize, len);
            for bit in 0..64 {
                let inside = bit >= offset && bit < offset + len;
                prop_assert_eq!(decode_bits(&data, bit, 1).unwrap() == 1, inside);
            }
        }
    }
}
