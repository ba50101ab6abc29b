//! Built-in numeric radices.

use super::{FormatResult, Formatter, UNKNOWN_GLYPH};
use crate::model::width_mask;

/// Zero-padded bit string, most significant bit first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl Formatter for Binary {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        Ok((0..width)
            .rev()
            .map(|bit| {
                if unknown_mask >> bit & 1 == 1 {
                    UNKNOWN_GLYPH
                } else if value >> bit & 1 == 1 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect())
    }
}

/// Zero-padded octal digits; a digit with any unknown bit is drawn as unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Octal;

impl Formatter for Octal {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        Ok(grouped_digits(value, unknown_mask, width, 3, true).into_iter().collect())
    }
}

/// Unsigned decimal. Values with unknown bits are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal;

impl Formatter for Decimal {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        reject_unknown(unknown_mask, width)?;
        Ok((value & width_mask(width)).to_string())
    }
}

/// Two's complement signed decimal. Values with unknown bits are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedDecimal;

impl Formatter for SignedDecimal {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        reject_unknown(unknown_mask, width)?;
        let shift = 128 - width.clamp(1, 128);
        let signed = ((value << shift) as i128) >> shift;
        Ok(signed.to_string())
    }
}

/// Display options for hexadecimal labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexStyle {
    /// Keep leading zero digits up to the node width
    pub zero_padding: bool,
    /// Use `A-F` rather than `a-f`
    pub uppercase: bool,
    /// Prepend `0x`
    pub prefix: bool,
}

impl Default for HexStyle {
    fn default() -> Self {
        Self {
            zero_padding: true,
            uppercase: true,
            prefix: false,
        }
    }
}

/// Hexadecimal digits; a nibble with any unknown bit is drawn as unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hexadecimal {
    style: HexStyle,
}

impl Hexadecimal {
    /// Create a hexadecimal formatter with the given style.
    pub fn new(style: HexStyle) -> Self {
        Self { style }
    }
}

impl Formatter for Hexadecimal {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        let digits = grouped_digits(value, unknown_mask, width, 4, self.style.uppercase);
        let mut digits: &[char] = &digits;
        if !self.style.zero_padding {
            while digits.len() > 1 && digits[0] == '0' {
                digits = &digits[1..];
            }
        }

        let mut out = String::with_capacity(digits.len() + 2);
        if self.style.prefix {
            out.push_str("0x");
        }
        out.extend(digits);
        Ok(out)
    }
}

/// Split `width` bits into digits of `bits_per_digit` bits, most significant first.
fn grouped_digits(
    value: u128,
    unknown_mask: u128,
    width: u32,
    bits_per_digit: u32,
    uppercase: bool,
) -> Vec<char> {
    let digit_count = (width + bits_per_digit - 1) / bits_per_digit;
    let valid = width_mask(width);
    let digit_mask = (1u128 << bits_per_digit) - 1;

    (0..digit_count)
        .rev()
        .map(|digit| {
            let shift = digit * bits_per_digit;
            if (unknown_mask & valid) >> shift & digit_mask != 0 {
                return UNKNOWN_GLYPH;
            }
            let d = ((value & valid) >> shift & digit_mask) as u32;
            let c = std::char::from_digit(d, 16).unwrap_or(UNKNOWN_GLYPH);
            if uppercase {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Integer radices have no notation for partially known values.
pub(super) fn reject_unknown(unknown_mask: u128, width: u32) -> Result<(), String> {
    if unknown_mask & width_mask(width) != 0 {
        Err(format!(
            "value has unknown bits (mask {:#b}) and no canonical representation",
            unknown_mask & width_mask(width)
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_pads_and_marks_unknown() {
        assert_eq!(Binary.format(0b101, 0, 6).unwrap(), "000101");
        assert_eq!(Binary.format(0xB, 0b0001, 4).unwrap(), "101X");
    }

    #[test]
    fn test_hex_unknown_nibble() {
        assert_eq!(Hexadecimal::default().format(0xA, 0, 4).unwrap(), "A");
        assert_eq!(Hexadecimal::default().format(0xB, 0b0001, 4).unwrap(), "X");
        // Only the affected nibble turns unknown
        assert_eq!(Hexadecimal::default().format(0x3C, 0x10, 8).unwrap(), "XC");
        // Partial top nibble of a 6-bit value
        assert_eq!(Hexadecimal::default().format(0x2F, 0x20, 6).unwrap(), "XF");
    }

    #[test]
    fn test_hex_styles() {
        let bare = Hexadecimal::new(HexStyle {
            zero_padding: false,
            uppercase: false,
            prefix: false,
        });
        assert_eq!(bare.format(0x0F, 0, 16).unwrap(), "f");
        assert_eq!(bare.format(0, 0, 16).unwrap(), "0");
        assert_eq!(Hexadecimal::default().format(0x0F, 0, 16).unwrap(), "000F");
    }

    #[test]
    fn test_octal_groups() {
        assert_eq!(Octal.format(0o755, 0, 9).unwrap(), "755");
        assert_eq!(Octal.format(0o755, 0b000_001_000, 9).unwrap(), "7X5");
        assert_eq!(Octal.format(0o5, 0, 4).unwrap(), "05");
    }

    #[test]
    fn test_decimal_rejects_unknown() {
        assert_eq!(Decimal.format(200, 0, 8).unwrap(), "200");
        assert!(Decimal.format(200, 0b1, 8).is_err());
        assert!(SignedDecimal.format(200, 0b10, 8).is_err());
    }

    #[test]
    fn test_signed_decimal() {
        assert_eq!(SignedDecimal.format(0xFF, 0, 8).unwrap(), "-1");
        assert_eq!(SignedDecimal.format(0x7F, 0, 8).unwrap(), "127");
        assert_eq!(SignedDecimal.format(0x80, 0, 8).unwrap(), "-128");
        assert_eq!(SignedDecimal.format(1, 0, 1).unwrap(), "-1");
        assert_eq!(SignedDecimal.format(u128::MAX, 0, 128).unwrap(), "-1");
    }

    #[test]
    fn test_wide_values() {
        let value = u128::MAX;
        assert_eq!(Hexadecimal::default().format(value, 0, 128).unwrap().len(), 32);
        assert_eq!(Decimal.format(value, 0, 128).unwrap(), u128::MAX.to_string());
    }
}
