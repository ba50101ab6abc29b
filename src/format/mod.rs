//! Value formatters for bus labels.
//!
//! A [`Formatter`] maps a raw bus value, its unknown mask and the node width
//! to the label drawn inside a data block. Built-in radices and user hooks
//! implement the same trait and are looked up by radix through a
//! [`FormatterRegistry`], which is fixed when the model is built.
//!
//! Formatters must be pure: the renderer may call them several times for the
//! same value.

mod ascii;
mod radix;

pub use ascii::Ascii;
pub use radix::{Binary, Decimal, HexStyle, Hexadecimal, Octal, SignedDecimal};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::Radix;

/// Glyph drawn for an unknown bit or digit group.
pub const UNKNOWN_GLYPH: char = 'X';

/// Outcome of formatting one value: the label, or a reason for rejecting it.
pub type FormatResult = std::result::Result<String, String>;

/// Capability to render a bus value as text.
pub trait Formatter: Send + Sync {
    /// Format `value` (only the low `width` bits are meaningful). Bits set in
    /// `unknown_mask` are indeterminate.
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult;
}

impl<F> Formatter for F
where
    F: Fn(u128, u128, u32) -> FormatResult + Send + Sync,
{
    fn format(&self, value: u128, unknown_mask: u128, width: u32) -> FormatResult {
        self(value, unknown_mask, width)
    }
}

/// Radix name to formatter mapping.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    hexadecimal: Hexadecimal,
    custom: HashMap<String, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    /// Create a registry holding only the built-in radices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom formatter under a radix name.
    ///
    /// A name that matches a built-in radix is shadowed by the built-in.
    pub fn register(&mut self, name: impl Into<String>, formatter: impl Formatter + 'static) {
        self.custom.insert(name.into(), Arc::new(formatter));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_formatter(mut self, name: impl Into<String>, formatter: impl Formatter + 'static) -> Self {
        self.register(name, formatter);
        self
    }

    /// Set the hexadecimal style.
    pub fn with_hex_style(mut self, style: HexStyle) -> Self {
        self.hexadecimal = Hexadecimal::new(style);
        self
    }

    /// Whether a custom formatter is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Resolve a radix name to a [`Radix`], built-ins first.
    pub fn radix_for(&self, name: &str) -> Option<Radix> {
        Radix::from_name(name).or_else(|| {
            self.contains(name).then(|| Radix::Custom(name.to_string()))
        })
    }

    /// Look up the formatter for a radix.
    pub fn resolve(&self, radix: &Radix) -> Option<&dyn Formatter> {
        match radix {
            Radix::Binary => Some(&Binary),
            Radix::Octal => Some(&Octal),
            Radix::Decimal => Some(&Decimal),
            Radix::SignedDecimal => Some(&SignedDecimal),
            Radix::Hexadecimal => Some(&self.hexadecimal),
            Radix::Ascii => Some(&Ascii),
            Radix::Custom(name) => self.custom.get(name).map(|f| f.as_ref()),
        }
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry")
            .field("hexadecimal", &self.hexadecimal)
            .field("custom", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_builtins() {
        let registry = FormatterRegistry::new();
        let hex = registry.resolve(&Radix::Hexadecimal).unwrap();
        assert_eq!(hex.format(0xA, 0, 4).unwrap(), "A");
        assert!(registry.resolve(&Radix::Custom("Gray".into())).is_none());
    }

    #[test]
    fn test_custom_formatter_closure() {
        let registry = FormatterRegistry::new().with_formatter(
            "Gray",
            |value: u128, _mask: u128, _width: u32| -> FormatResult {
                Ok(format!("g{}", value ^ (value >> 1)))
            },
        );
        assert_eq!(registry.radix_for("Gray"), Some(Radix::Custom("Gray".into())));
        assert_eq!(registry.radix_for("Signed"), Some(Radix::SignedDecimal));
        assert_eq!(registry.radix_for("Roman"), None);

        let gray = registry.resolve(&Radix::Custom("Gray".into())).unwrap();
        assert_eq!(gray.format(3, 0, 2).unwrap(), "g2");
        // Deterministic across calls
        assert_eq!(gray.format(3, 0, 2), gray.format(3, 0, 2));
    }

    #[test]
    fn test_hex_style_applies() {
        let registry = FormatterRegistry::new().with_hex_style(HexStyle {
            zero_padding: true,
            uppercase: false,
            prefix: true,
        });
        let hex = registry.resolve(&Radix::Hexadecimal).unwrap();
        assert_eq!(hex.format(0xB, 0, 8).unwrap(), "0x0b");
    }
}
