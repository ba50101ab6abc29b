//! Row emitter: slots to tikz-timing table syntax.

use std::fmt::Write;

use super::quantize::{BusSegment, Edge, Slot, SlotPayload};
use crate::model::{BitState, Node};

/// Escape text for use in TeX.
pub fn tex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\^{}"),
            '~' => out.push_str("\\~{}"),
            _ => out.push(c),
        }
    }
    out
}

fn glyph(payload: &SlotPayload) -> String {
    match payload {
        SlotPayload::Bit {
            state: BitState::Low | BitState::High,
            edge: Edge::Flat,
        } => "C".to_string(),
        SlotPayload::Bit { state, .. } => match state {
            BitState::Low => "L",
            BitState::High => "H",
            BitState::Unknown => "X",
            BitState::HighZ => "Z",
        }
        .to_string(),
        SlotPayload::Bus(BusSegment::Data {
            label,
            show_label: true,
            ..
        }) => format!("D{{{}}}", tex_escape(label)),
        SlotPayload::Bus(BusSegment::Data { .. }) => "D{}".to_string(),
        SlotPayload::Bus(BusSegment::Undefined) => "U".to_string(),
    }
}

/// Emit one table row: `name & 2L 1H ... [extra] \\`.
pub fn emit_row(node: &Node, slots: &[Slot], extra: Option<&str>) -> String {
    let mut row = tex_escape(&node.name);
    row.push_str(" &");
    for slot in slots {
        // Writing to a String cannot fail
        let _ = write!(row, " {}{}", slot.duration, glyph(&slot.payload));
    }
    if let Some(extra) = extra.filter(|e| !e.is_empty()) {
        row.push(' ');
        row.push_str(extra);
    }
    row.push_str(" \\\\");
    row
}
