//! # vwf2tikz
//!
//! Converts Quartus vector waveform files (`.vwf`) into `tikz-timing`
//! diagrams for LaTeX documents.
//!
//! This library provides:
//! - A parser for the VWF section syntax
//! - A validated waveform model with per-node transitions and timing
//! - Value formatters for the Quartus display radices, plus custom hooks
//! - A timing quantizer mapping transitions onto whole diagram slots
//! - Row emission and document assembly in three output modes
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`vwf`] - Lexer and parser for the waveform file syntax
//! - [`model`] - Waveform model construction and validation
//! - [`format`] - Radix formatters and the formatter registry
//! - [`render`] - Quantizer and row emitter
//! - [`document`] - Output modes and templates
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! vwf2tikz counter.vwf counter.tex --mode document --clock clk
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use vwf2tikz::{render_vwf, OutputMode, RenderOptions};
//!
//! let text = std::fs::read_to_string("counter.vwf").unwrap();
//! let options = RenderOptions::new().with_clock_nodes(["clk"]);
//! let tikz = render_vwf(&text, &options, OutputMode::Graphic).unwrap();
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { render_vwf } from 'vwf2tikz';
//!
//! const tikz = render_vwf(vwfText, "graphic");
//! ```
//!
//! ## Time Quantization
//!
//! `tikz-timing` expresses durations as integer repeat counts. Times are kept
//! as integer ticks (1000 per file time unit) and every transition is mapped
//! to the slot boundary nearest to its exact position in the viewport:
//!
//! 1. Split the viewport into constant-value intervals
//! 2. Round each interval boundary to the nearest slot
//! 3. Drop intervals that collapse to zero slots and merge equal neighbours
//!
//! Rounding boundaries instead of durations keeps the total length exact and
//! the drift of any edge below half a slot.

pub mod document;
pub mod error;
pub mod format;
pub mod model;
pub mod render;
pub mod vwf;

// Re-export main types for convenience
pub use document::{render_vwf, render_vwf_with, OutputMode, Templates};
pub use error::{ErrorKind, Result, VwfError};
pub use format::{Formatter, FormatterRegistry, HexStyle};
pub use model::WaveformModel;
pub use render::{ClockEdge, RenderOptions, Renderer};

#[cfg(feature = "cli")]
pub use document::convert_file;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{render_vwf_js, version, WasmConverter};
