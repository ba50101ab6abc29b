//! WASM bindings for vwf2tikz.
//!
//! Lets a browser-based document toolchain convert waveform files without a
//! native binary.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { render_vwf, WasmConverter } from 'vwf2tikz';
//!
//! await init();
//!
//! // Defaults
//! const tikz = render_vwf(vwfText, "graphic");
//!
//! // Custom options
//! const converter = new WasmConverter();
//! converter.set_clock_nodes(["clk", "clk_slow"]);
//! converter.set_viewport(0, 200);
//! const doc = converter.render(vwfText, "document");
//! ```

use wasm_bindgen::prelude::*;

use crate::document::{render_vwf, OutputMode};
use crate::model::TICKS_PER_UNIT;
use crate::render::{ClockEdge, RenderOptions};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn parse_mode(mode: &str) -> Result<OutputMode, JsValue> {
    mode.parse::<OutputMode>().map_err(|e| JsValue::from_str(&e))
}

fn to_ticks(time: f64) -> Result<u64, JsValue> {
    if !time.is_finite() || time < 0.0 {
        return Err(JsValue::from_str(&format!("invalid time {}", time)));
    }
    Ok((time * TICKS_PER_UNIT as f64).round() as u64)
}

/// Convert VWF text with default options.
///
/// `mode` is one of `"rows"`, `"graphic"` or `"document"`.
#[wasm_bindgen(js_name = render_vwf)]
pub fn render_vwf_js(text: &str, mode: &str) -> Result<String, JsValue> {
    render_vwf(text, &RenderOptions::default(), parse_mode(mode)?).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Converter with configurable options.
///
/// Times are given in the file's time unit.
#[wasm_bindgen]
pub struct WasmConverter {
    options: RenderOptions,
}

#[wasm_bindgen]
impl WasmConverter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmConverter {
        WasmConverter {
            options: RenderOptions::default(),
        }
    }

    /// Restrict the drawing to `[start, end]`.
    #[wasm_bindgen]
    pub fn set_viewport(&mut self, start: f64, end: f64) -> Result<(), JsValue> {
        self.options.start_time = Some(to_ticks(start)?);
        self.options.end_time = Some(to_ticks(end)?);
        Ok(())
    }

    /// Time covered by one diagram slot.
    #[wasm_bindgen]
    pub fn set_scale(&mut self, scale: f64) -> Result<(), JsValue> {
        self.options.scale = Some(to_ticks(scale)? as f64);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_grid(&mut self, grid: bool) {
        self.options.grid = Some(grid);
    }

    #[wasm_bindgen]
    pub fn set_clock_nodes(&mut self, nodes: Vec<String>) {
        self.options.clock_nodes = nodes;
    }

    /// `"rising"`, `"falling"` or anything else for no help lines.
    #[wasm_bindgen]
    pub fn set_clock_lines(&mut self, edge: &str) {
        self.options.clock_lines = match edge {
            "rising" => Some(ClockEdge::Rising),
            "falling" => Some(ClockEdge::Falling),
            _ => None,
        };
    }

    #[wasm_bindgen]
    pub fn set_label_threshold(&mut self, slots: f64) {
        self.options.label_hide_threshold = slots;
    }

    /// Convert VWF text.
    #[wasm_bindgen]
    pub fn render(&self, text: &str, mode: &str) -> Result<String, JsValue> {
        render_vwf(text, &self.options, parse_mode(mode)?).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for WasmConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
