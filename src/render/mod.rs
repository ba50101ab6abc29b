//! Rendering of a waveform model into tikz-timing rows.
//!
//! Each visible node goes through two stages:
//!
//! 1. [`quantize`] maps its transitions onto whole slots of the timing scale
//! 2. [`emit_row`] serializes the slots as one `tikztimingtable` row
//!
//! Nodes are independent of each other; rows come out in display order.
//! Clock edge help lines are collected separately and placed by the document
//! assembler.

mod options;
mod quantize;
mod row;

pub use options::{ClockEdge, RenderOptions, DEFAULT_CLOCK_NODE};
pub use quantize::{quantize, BusSegment, Edge, Slot, SlotPayload};
pub use row::{emit_row, tex_escape};

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Result, VwfError};
use crate::model::{BitState, Node, NodeKind, WaveformModel};

/// Rows and drawing decorations of one waveform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    /// One row per visible node, in display order
    pub rows: Vec<String>,
    /// Slot positions of clock edges, strictly inside the viewport
    pub help_lines: Vec<u64>,
    /// Draw the table grid
    pub grid: bool,
    /// Raw fragments emitted after the rows
    pub extra_global: Vec<String>,
}

/// Renders a model with a fixed set of options.
pub struct Renderer<'a> {
    model: &'a WaveformModel,
    options: &'a RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(model: &'a WaveformModel, options: &'a RenderOptions) -> Self {
        Self { model, options }
    }

    /// Quantize one node.
    pub fn slots(&self, node: &Node) -> Result<Vec<Slot>> {
        let formatter = self
            .model
            .formatters()
            .resolve(&node.radix)
            .ok_or_else(|| VwfError::UnknownRadix {
                node: node.name.clone(),
                radix: node.radix.name().to_string(),
            })?;
        quantize(node, self.model.timing(), self.options, formatter)
    }

    /// Emit the rows of all visible nodes.
    pub fn rows(&self) -> Result<Vec<String>> {
        self.model
            .visible_nodes()
            .map(|node| {
                let slots = self.slots(node)?;
                let extra = self.options.extra_rows.get(&node.name).map(String::as_str);
                Ok(emit_row(node, &slots, extra))
            })
            .collect()
    }

    /// Slot positions of the selected edge of every clock node.
    ///
    /// Edges are read from the quantized slots, so a line always sits on a
    /// level change that is actually drawn.
    pub fn help_lines(&self) -> Result<Vec<u64>> {
        let edge = match self.options.clock_lines {
            Some(edge) => edge,
            None => return Ok(Vec::new()),
        };
        let target = match edge {
            ClockEdge::Rising => BitState::High,
            ClockEdge::Falling => BitState::Low,
        };

        let mut positions = BTreeSet::new();

        for node in self.model.nodes() {
            if node.kind != NodeKind::Bit || !self.options.is_clock(&node.name) {
                continue;
            }
            let mut position = 0;
            let mut previous = None;
            for slot in self.slots(node)? {
                let state = match slot.payload {
                    SlotPayload::Bit { state, .. } => state,
                    SlotPayload::Bus(_) => continue,
                };
                if position > 0 && state == target && previous != Some(target) {
                    positions.insert(position);
                }
                previous = Some(state);
                position += slot.duration;
            }
        }

        Ok(positions.into_iter().collect())
    }

    /// Render everything the document assembler needs.
    pub fn render(&self) -> Result<Rendering> {
        let rows = self.rows()?;
        let help_lines = self.help_lines()?;
        debug!(rows = rows.len(), help_lines = help_lines.len(), "rendered waveform");

        Ok(Rendering {
            rows,
            help_lines,
            grid: self.model.timing().grid_enabled,
            extra_global: self.options.extra_global.clone(),
        })
    }
}
