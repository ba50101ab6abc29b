//! Rendering options.

use std::collections::HashMap;

use crate::format::{Formatter, FormatterRegistry, HexStyle};
use crate::model::TimingConfig;

/// Default name of the clock node.
pub const DEFAULT_CLOCK_NODE: &str = "clk";

/// Clock edge used to place vertical help lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEdge {
    /// Low-to-high transitions
    Rising,
    /// High-to-low transitions
    Falling,
}

/// Options controlling model building and rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Viewport start in ticks, overriding the file's data offset.
    pub start_time: Option<u64>,
    /// Viewport end in ticks, overriding the end of the file's data.
    pub end_time: Option<u64>,
    /// Ticks per slot, overriding the file's grid period.
    pub scale: Option<f64>,
    /// Grid visibility, overriding the file's flag.
    pub grid: Option<bool>,
    /// Nodes drawn in clock mode; they are always drawn as bits.
    pub clock_nodes: Vec<String>,
    /// Draw clock toggles without slope.
    pub clock_no_slope: bool,
    /// Vertical help lines at clock edges.
    pub clock_lines: Option<ClockEdge>,
    /// Single-bit nodes drawn as width-1 buses.
    pub bit_as_bus: Vec<String>,
    /// Minimum slots for a bus label to be drawn.
    pub label_hide_threshold: f64,
    /// Extra slots required per label character.
    pub label_char_width: f64,
    /// Label length beyond which `label_char_width` stops adding up.
    pub label_char_limit: usize,
    /// Raw tikz-timing fragments appended to a node's row.
    pub extra_rows: HashMap<String, String>,
    /// Raw fragments emitted once after the rows.
    pub extra_global: Vec<String>,
    /// Built-in and custom value formatters.
    pub formatters: FormatterRegistry,
    /// Per-node radix names replacing the file's display radix.
    pub radix_overrides: HashMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            start_time: None,
            end_time: None,
            scale: None,
            grid: None,
            clock_nodes: vec![DEFAULT_CLOCK_NODE.to_string()],
            clock_no_slope: true,
            clock_lines: Some(ClockEdge::Rising),
            bit_as_bus: Vec::new(),
            label_hide_threshold: 0.0,
            label_char_width: 0.0,
            label_char_limit: 16,
            extra_rows: HashMap::new(),
            extra_global: Vec::new(),
            formatters: FormatterRegistry::new(),
            radix_overrides: HashMap::new(),
        }
    }
}

impl RenderOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict rendering to `[start, end]` ticks.
    pub fn with_viewport(mut self, start: u64, end: u64) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Move the viewport start only.
    pub fn with_start_time(mut self, start: u64) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Move the viewport end only.
    pub fn with_end_time(mut self, end: u64) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Set the number of ticks per slot.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Force the grid on or off.
    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Replace the set of clock nodes.
    pub fn with_clock_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clock_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable flat clock toggles.
    pub fn with_clock_no_slope(mut self, no_slope: bool) -> Self {
        self.clock_no_slope = no_slope;
        self
    }

    /// Choose the clock edge for help lines, or none.
    pub fn with_clock_lines(mut self, edge: Option<ClockEdge>) -> Self {
        self.clock_lines = edge;
        self
    }

    /// Draw a single-bit node as a bus.
    pub fn with_bit_as_bus(mut self, node: impl Into<String>) -> Self {
        self.bit_as_bus.push(node.into());
        self
    }

    /// Set the label hiding rule: a label is hidden when the slot count is
    /// below `threshold + min(len, char_limit) * char_width`.
    pub fn with_label_hiding(mut self, threshold: f64, char_width: f64, char_limit: usize) -> Self {
        self.label_hide_threshold = threshold;
        self.label_char_width = char_width;
        self.label_char_limit = char_limit;
        self
    }

    /// Append a raw fragment to a node's row.
    pub fn with_row_extra(mut self, node: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.extra_rows.insert(node.into(), fragment.into());
        self
    }

    /// Add a raw fragment emitted after the rows.
    pub fn with_global_extra(mut self, fragment: impl Into<String>) -> Self {
        self.extra_global.push(fragment.into());
        self
    }

    /// Register a custom formatter under a radix name.
    pub fn with_formatter(mut self, radix: impl Into<String>, formatter: impl Formatter + 'static) -> Self {
        self.formatters.register(radix, formatter);
        self
    }

    /// Set the style of the built-in hexadecimal formatter.
    pub fn with_hex_style(mut self, style: HexStyle) -> Self {
        self.formatters = self.formatters.with_hex_style(style);
        self
    }

    /// Display a node with another radix than the file says.
    pub fn with_radix_override(mut self, node: impl Into<String>, radix: impl Into<String>) -> Self {
        self.radix_overrides.insert(node.into(), radix.into());
        self
    }

    /// Whether a node is drawn in clock mode.
    pub fn is_clock(&self, node: &str) -> bool {
        self.clock_nodes.iter().any(|n| n == node)
    }

    /// Whether a single-bit node is drawn as a bus.
    pub fn is_bit_as_bus(&self, node: &str) -> bool {
        !self.is_clock(node) && self.bit_as_bus.iter().any(|n| n == node)
    }

    /// Minimum slot count for a label of `label_len` characters.
    pub fn label_threshold(&self, label_len: usize) -> f64 {
        self.label_hide_threshold + label_len.min(self.label_char_limit) as f64 * self.label_char_width
    }

    /// Apply the viewport, scale and grid overrides to a file's timing.
    pub fn apply_timing(&self, base: &TimingConfig) -> TimingConfig {
        TimingConfig {
            start_time: self.start_time.unwrap_or(base.start_time),
            end_time: self.end_time.unwrap_or(base.end_time),
            scale: self.scale.unwrap_or(base.scale),
            grid_enabled: self.grid.unwrap_or(base.grid_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert!(options.is_clock("clk"));
        assert!(options.clock_no_slope);
        assert_eq!(options.clock_lines, Some(ClockEdge::Rising));
        assert_relative_eq!(options.label_threshold(5), 0.0);
    }

    #[test]
    fn test_label_threshold_grows_with_length() {
        let options = RenderOptions::new().with_label_hiding(1.0, 0.5, 4);
        assert_relative_eq!(options.label_threshold(2), 2.0);
        assert_relative_eq!(options.label_threshold(10), 3.0);
    }

    #[test]
    fn test_clock_is_never_bus() {
        let options = RenderOptions::new()
            .with_bit_as_bus("clk")
            .with_bit_as_bus("en");
        assert!(!options.is_bit_as_bus("clk"));
        assert!(options.is_bit_as_bus("en"));
    }

    #[test]
    fn test_apply_timing_overrides() {
        let base = TimingConfig::new(0, 100_000, 10_000.0);
        let options = RenderOptions::new().with_viewport(20_000, 60_000).with_grid(true);
        let timing = options.apply_timing(&base);
        assert_eq!((timing.start_time, timing.end_time), (20_000, 60_000));
        assert_relative_eq!(timing.scale, 10_000.0);
        assert!(timing.grid_enabled);

        let timing = RenderOptions::new().with_end_time(50_000).apply_timing(&base);
        assert_eq!((timing.start_time, timing.end_time), (0, 50_000));
    }
}
