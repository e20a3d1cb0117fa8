//! Binary-coded decimal helpers.
//!
//! Every time, date and alarm register of the DS3231 stores its value as
//! BCD: the tens digit in the upper nibble and the ones digit in the lower
//! nibble, with some of the upper bits reused as flags. The register types in
//! [`crate::registers`] expose the two digits as separate fields; these
//! helpers do the arithmetic and the validation on both sides.

/// Errors produced while packing or unpacking BCD values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BcdError {
    /// The value does not fit the target field (above 99, or above the
    /// field-specific maximum)
    ValueTooLarge(u32),
    /// A nibble held a digit above 9
    InvalidDigit(u8),
}

/// Packs a value in `0..=99` into a single BCD byte.
///
/// # Errors
///
/// Returns [`BcdError::ValueTooLarge`] for values above 99. The codec never
/// clamps; callers validate upstream.
pub fn to_bcd(value: u32) -> Result<u8, BcdError> {
    let (tens, ones) = split(value, 99)?;
    Ok((tens << 4) | ones)
}

/// Splits `value` into its `(tens, ones)` digits, rejecting anything above
/// `max`.
///
/// # Errors
///
/// Returns [`BcdError::ValueTooLarge`] when `value > max` or `value > 99`.
pub fn split(value: u32, max: u32) -> Result<(u8, u8), BcdError> {
    if value > max || value > 99 {
        return Err(BcdError::ValueTooLarge(value));
    }
    let tens = u8::try_from(value / 10).map_err(|_| BcdError::ValueTooLarge(value))?;
    let ones = u8::try_from(value % 10).map_err(|_| BcdError::ValueTooLarge(value))?;
    Ok((tens, ones))
}

/// Combines two already field-width-constrained digits.
#[must_use]
pub const fn from_bcd_nibbles(tens: u8, ones: u8) -> u8 {
    tens * 10 + ones
}

/// Combines two digits read from a register, checking that both are decimal
/// digits and that the result does not exceed `max`.
///
/// # Errors
///
/// [`BcdError::InvalidDigit`] if either nibble is above 9,
/// [`BcdError::ValueTooLarge`] if the combined value is above `max`.
pub fn checked_from_nibbles(tens: u8, ones: u8, max: u8) -> Result<u8, BcdError> {
    if tens > 9 {
        return Err(BcdError::InvalidDigit(tens));
    }
    if ones > 9 {
        return Err(BcdError::InvalidDigit(ones));
    }
    let value = from_bcd_nibbles(tens, ones);
    if value > max {
        return Err(BcdError::ValueTooLarge(u32::from(value)));
    }
    Ok(value)
}

/// Unpacks a full BCD byte.
///
/// # Errors
///
/// [`BcdError::InvalidDigit`] if either nibble is above 9.
pub fn from_bcd(byte: u8) -> Result<u8, BcdError> {
    checked_from_nibbles(byte >> 4, byte & 0x0F, 99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bcd_and_back_for_all_values() {
        for value in 0..=99u32 {
            let byte = to_bcd(value).unwrap();
            assert_eq!(u32::from(from_bcd_nibbles(byte >> 4, byte & 0x0F)), value);
            assert_eq!(u32::from(from_bcd(byte).unwrap()), value);
        }
    }

    #[test]
    fn test_to_bcd_known_values() {
        assert_eq!(to_bcd(0).unwrap(), 0x00);
        assert_eq!(to_bcd(9).unwrap(), 0x09);
        assert_eq!(to_bcd(10).unwrap(), 0x10);
        assert_eq!(to_bcd(59).unwrap(), 0x59);
        assert_eq!(to_bcd(99).unwrap(), 0x99);
    }

    #[test]
    fn test_to_bcd_rejects_large_values() {
        assert_eq!(to_bcd(100), Err(BcdError::ValueTooLarge(100)));
        assert_eq!(to_bcd(255), Err(BcdError::ValueTooLarge(255)));
        assert_eq!(to_bcd(u32::MAX), Err(BcdError::ValueTooLarge(u32::MAX)));
    }

    #[test]
    fn test_split_respects_field_max() {
        assert_eq!(split(31, 31).unwrap(), (3, 1));
        assert_eq!(split(32, 31), Err(BcdError::ValueTooLarge(32)));
        assert_eq!(split(12, 12).unwrap(), (1, 2));
        assert_eq!(split(0, 12).unwrap(), (0, 0));
    }

    #[test]
    fn test_checked_from_nibbles() {
        assert_eq!(checked_from_nibbles(5, 9, 59).unwrap(), 59);
        assert_eq!(checked_from_nibbles(6, 0, 59), Err(BcdError::ValueTooLarge(60)));
        assert_eq!(checked_from_nibbles(0, 0xA, 59), Err(BcdError::InvalidDigit(0xA)));
        assert_eq!(checked_from_nibbles(0xF, 0, 99), Err(BcdError::InvalidDigit(0xF)));
    }

    #[test]
    fn test_from_bcd_rejects_invalid_digits() {
        assert_eq!(from_bcd(0x6A), Err(BcdError::InvalidDigit(0xA)));
        assert_eq!(from_bcd(0xA0), Err(BcdError::InvalidDigit(0xA)));
        assert_eq!(from_bcd(0x42).unwrap(), 42);
    }
}
