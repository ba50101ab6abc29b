//! ASCII character labels.

use super::radix::reject_unknown;
use super::{FormatResult, Formatter};

/// Mnemonics for the C0 control characters.
const CONTROL_NAMES: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC",
    "FS", "GS", "RS", "US",
];

/// One token per 8-bit group, most significant group first.
///
/// Like the decimal radices, a value with any unknown bit is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

impl Formatter for Ascii {
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        reject_unknown(unknown_mask, width)?;

        let groups = (width + 7) / 8;
        let tokens: Vec<String> = (0..groups)
            .rev()
            .map(|group| {
                let byte = (value >> (group * 8)) as u8;
                let byte = if group == groups - 1 && width % 8 != 0 {
                    byte & ((1u8 << (width % 8)) - 1)
                } else {
                    byte
                };
                character(byte)
            })
            .collect();
        Ok(tokens.join(" "))
    }
}

fn character(byte: u8) -> String {
    match byte {
        0..=31 => CONTROL_NAMES[byte as usize].to_string(),
        127 => "DEL".to_string(),
        128..=255 => format!("0x{:02X}", byte),
        _ => format!("'{}'", byte as char),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_and_control() {
        assert_eq!(Ascii.format(0x41, 0, 8).unwrap(), "'A'");
        assert_eq!(Ascii.format(0x0A, 0, 8).unwrap(), "LF");
        assert_eq!(Ascii.format(0x7F, 0, 8).unwrap(), "DEL");
        assert_eq!(Ascii.format(0xE9, 0, 8).unwrap(), "0xE9");
    }

    #[test]
    fn test_multiple_groups() {
        assert_eq!(Ascii.format(0x4142, 0, 16).unwrap(), "'A' 'B'");
        // 12-bit value: top group holds 4 bits
        assert_eq!(Ascii.format(0x141, 0, 12).unwrap(), "SOH 'A'");
    }

    #[test]
    fn test_unknown_rejected() {
        assert!(Ascii.format(0x41, 0x01, 8).is_err());
    }
}
