//! EBML variable-size integers.
//!
//! The width of a VINT is announced by the position of the first set bit in
//! its leading byte: `1xxxxxxx` is one byte wide, `01xxxxxx xxxxxxxx` two
//! bytes wide and so on up to `00000001` followed by seven bytes.
//!
//! See <https://github.com/ietf-wg-cellar/ebml-specification/blob/master/specification.markdown#variable-size-integer>.

use std::io::{self, Read};

use super::EbmlError;

/// Widest VINT accepted, in bytes.
pub const MAX_VINT_WIDTH: u8 = 8;

/// One decoded VINT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vint {
    /// Numeric value with the width marker stripped.
    pub value: u64,
    /// Encoded form, marker included. Element ids are compared against this.
    pub raw: u64,
    /// Number of bytes the integer occupied in the stream.
    pub width: u8,
}

impl Vint {
    /// Whether every value bit is set, which EBML reserves for "unknown size".
    pub fn is_all_ones(&self) -> bool {
        self.value == max_value(self.width) + 1
    }

    /// Encoded bytes in stream order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let width = self.width as usize;
        self.raw.to_be_bytes()[8 - width..].to_vec()
    }
}

/// Largest value representable at `width` without colliding with the
/// reserved all-ones pattern.
pub fn max_value(width: u8) -> u64 {
    (1u64 << (7 * width as u32)) - 2
}

/// Reads one VINT from `reader`.
///
/// Returns [`EbmlError::Eof`] when the reader is exhausted before the first
/// byte and [`EbmlError::UnexpectedEof`] when it ends inside the integer.
pub fn read_vint<R: Read + ?Sized>(reader: &mut R) -> Result<Vint, EbmlError> {
    let mut first = [0u8; 1];
    loop {
        match reader.read(&mut first) {
            Ok(0) => return Err(EbmlError::Eof),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let leading = first[0];
    if leading == 0 {
        return Err(EbmlError::VintTooLong);
    }

    let width = leading.leading_zeros() as u8 + 1;
    let marker_mask = ((1u16 << (8 - width)) - 1) as u8;

    let mut value = u64::from(leading & marker_mask);
    let mut raw = u64::from(leading);

    let mut rest = [0u8; (MAX_VINT_WIDTH - 1) as usize];
    let rest = &mut rest[..(width - 1) as usize];
    reader.read_exact(rest).map_err(EbmlError::from_short_read)?;

    for byte in rest.iter() {
        value = (value << 8) | u64::from(*byte);
        raw = (raw << 8) | u64::from(*byte);
    }

    Ok(Vint { value, raw, width })
}

/// Encodes `value` using the smallest width that can hold it.
pub fn encode(value: u64) -> Result<Vint, EbmlError> {
    let width = (1..=MAX_VINT_WIDTH)
        .find(|w| value <= max_value(*w))
        .ok_or(EbmlError::ValueTooLarge(value))?;
    encode_with_width(value, width)
}

/// Encodes `value` using exactly `width` bytes.
pub fn encode_with_width(value: u64, width: u8) -> Result<Vint, EbmlError> {
    if width == 0 || width > MAX_VINT_WIDTH {
        return Err(EbmlError::VintTooLong);
    }
    if value > max_value(width) {
        return Err(EbmlError::ValueTooLarge(value));
    }

    let marker = 1u64 << (7 * width as u32);
    Ok(Vint {
        value,
        raw: marker | value,
        width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_single_byte() {
        let vint = read_vint(&mut Cursor::new([0x81u8])).unwrap();
        assert_eq!(vint.value, 1);
        assert_eq!(vint.raw, 0x81);
        assert_eq!(vint.width, 1);
    }

    #[test]
    fn decodes_element_id_in_raw_form() {
        // EBML magic, a four byte element id.
        let vint = read_vint(&mut Cursor::new([0x1A, 0x45, 0xDF, 0xA3])).unwrap();
        assert_eq!(vint.raw, 0x1A45_DFA3);
        assert_eq!(vint.value, 0x0A45_DFA3);
        assert_eq!(vint.width, 4);
    }

    #[test]
    fn decodes_eight_byte_width() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00];
        let vint = read_vint(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(vint.value, 256);
        assert_eq!(vint.width, 8);
    }

    #[test]
    fn round_trips_every_width() {
        for width in 1..=MAX_VINT_WIDTH {
            for value in [0, 1, max_value(width) / 2, max_value(width)] {
                let encoded = encode_with_width(value, width).unwrap();
                let bytes = encoded.to_bytes();
                assert_eq!(bytes.len(), width as usize);

                let decoded = read_vint(&mut Cursor::new(&bytes)).unwrap();
                assert_eq!(decoded.value, value, "width {width}");
                assert_eq!(decoded.to_bytes(), bytes, "width {width}");
                assert_eq!(decoded, encoded);
            }
        }
    }

    #[test]
    fn encode_picks_smallest_width() {
        assert_eq!(encode(0).unwrap().width, 1);
        assert_eq!(encode(126).unwrap().width, 1);
        assert_eq!(encode(127).unwrap().width, 2);
        assert_eq!(encode(max_value(8)).unwrap().width, 8);
        assert!(matches!(
            encode(u64::MAX),
            Err(EbmlError::ValueTooLarge(_))
        ));
    }

    #[test]
    fn zero_leading_byte_is_too_long() {
        let err = read_vint(&mut Cursor::new([0x00u8, 0xFF])).unwrap_err();
        assert!(matches!(err, EbmlError::VintTooLong));
    }

    #[test]
    fn empty_input_is_clean_eof() {
        let err = read_vint(&mut Cursor::new(Vec::<u8>::new())).unwrap_err();
        assert!(matches!(err, EbmlError::Eof));
    }

    #[test]
    fn truncated_input_is_unexpected_eof() {
        let err = read_vint(&mut Cursor::new([0x40u8])).unwrap_err();
        assert!(matches!(err, EbmlError::UnexpectedEof));
    }

    #[test]
    fn all_ones_marks_unknown_size() {
        let vint = read_vint(&mut Cursor::new([0xFFu8])).unwrap();
        assert!(vint.is_all_ones());
        let vint = read_vint(&mut Cursor::new([0x01u8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]))
            .unwrap();
        assert!(vint.is_all_ones());
        assert!(!encode(5).unwrap().is_all_ones());
    }
}
