//! Timing quantizer.
//!
//! Turns one node's transitions into a sequence of [`Slot`]s whose durations
//! are whole multiples of the timing scale. Interval boundaries are rounded
//! from their exact position in the viewport rather than interval by
//! interval, so rounding errors never accumulate: the emitted position of
//! every boundary is within half a slot of its source time, and the slot
//! counts of a node always add up to the viewport's slot count.

use tracing::{debug, warn};

use super::RenderOptions;
use crate::error::{Result, VwfError};
use crate::format::Formatter;
use crate::model::{BitState, Node, NodeKind, TimingConfig, Transition, Value};

/// How a level change is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Regular level glyph with a sloped transition
    Sloped,
    /// Flat clock toggle
    Flat,
}

/// A bus interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusSegment {
    /// A known (or partially known) value
    Data {
        /// Formatted value
        label: String,
        /// Raw value, with unknown bits cleared
        raw: u128,
        /// Unknown bits
        mask: u128,
        /// Whether the label is wide enough to be drawn
        show_label: bool,
    },
    /// No value has been assigned yet
    Undefined,
}

/// What a slot draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotPayload {
    Bit { state: BitState, edge: Edge },
    Bus(BusSegment),
}

/// A run of identical payload lasting `duration` scale units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub duration: u64,
    pub payload: SlotPayload,
}

/// An interval of constant value before rounding.
struct Interval<'a> {
    start: u64,
    end: u64,
    /// `None` before the node's first transition
    transition: Option<&'a Transition>,
}

/// Split the viewport into constant-value intervals.
fn intervals<'a>(node: &'a Node, timing: &TimingConfig) -> Vec<Interval<'a>> {
    let initial = node
        .transitions
        .iter()
        .take_while(|t| t.time <= timing.start_time)
        .last();

    let mut out = Vec::new();
    let mut current = Interval {
        start: timing.start_time,
        end: timing.end_time,
        transition: initial,
    };
    for t in node
        .transitions
        .iter()
        .filter(|t| t.time > timing.start_time && t.time < timing.end_time)
    {
        current.end = t.time;
        out.push(current);
        current = Interval {
            start: t.time,
            end: timing.end_time,
            transition: Some(t),
        };
    }
    out.push(current);
    out
}

/// Quantize a node's transitions into slots.
///
/// `formatter` renders bus values; it is not called for bit nodes.
pub fn quantize(
    node: &Node,
    timing: &TimingConfig,
    options: &RenderOptions,
    formatter: &dyn Formatter,
) -> Result<Vec<Slot>> {
    let mut slots: Vec<Slot> = Vec::new();

    for interval in intervals(node, timing) {
        let payload = payload(node, &interval, formatter)?;
        let duration = timing.slot_position(interval.end) - timing.slot_position(interval.start);
        if duration == 0 {
            warn!(
                node = %node.name,
                start = interval.start,
                end = interval.end,
                "interval narrower than one slot dropped"
            );
            continue;
        }

        match slots.last_mut() {
            Some(last) if last.payload == payload => last.duration += duration,
            _ => slots.push(Slot { duration, payload }),
        }
    }

    if node.kind == NodeKind::Bus {
        hide_narrow_labels(&mut slots, options);
    } else if options.is_clock(&node.name) && options.clock_no_slope {
        flatten_clock(&mut slots);
    }

    debug!(node = %node.name, slots = slots.len(), "quantized node");
    Ok(slots)
}

fn payload(node: &Node, interval: &Interval<'_>, formatter: &dyn Formatter) -> Result<SlotPayload> {
    let transition = match interval.transition {
        Some(t) => t,
        None if node.kind == NodeKind::Bus => return Ok(SlotPayload::Bus(BusSegment::Undefined)),
        None => {
            return Ok(SlotPayload::Bit {
                state: BitState::Unknown,
                edge: Edge::Sloped,
            })
        }
    };

    match (node.kind, transition.value) {
        (NodeKind::Bit, Value::Bit(state)) => Ok(SlotPayload::Bit {
            state,
            edge: Edge::Sloped,
        }),
        (NodeKind::Bus, Value::Bus(value)) => {
            let mask = transition.unknown_mask;
            let label = formatter
                .format(value, mask, node.width)
                .map_err(|message| VwfError::FormatterError {
                    node: node.name.clone(),
                    time: interval.start,
                    radix: node.radix.name().to_string(),
                    message,
                })?;
            Ok(SlotPayload::Bus(BusSegment::Data {
                label,
                raw: value & !mask,
                mask,
                show_label: true,
            }))
        }
        (kind, value) => Err(VwfError::InvalidSignal {
            name: node.name.clone(),
            message: format!("{:?} node holds value {}", kind, value),
        }),
    }
}

/// Clear labels of data blocks too short to hold them.
fn hide_narrow_labels(slots: &mut [Slot], options: &RenderOptions) {
    for slot in slots {
        if let SlotPayload::Bus(BusSegment::Data {
            label, show_label, ..
        }) = &mut slot.payload
        {
            *show_label = slot.duration as f64 >= options.label_threshold(label.chars().count());
        }
    }
}

/// Draw every low/high toggle after the first slot as a flat clock edge.
fn flatten_clock(slots: &mut [Slot]) {
    let mut previous = None;
    for slot in slots {
        if let SlotPayload::Bit { state, edge } = &mut slot.payload {
            let toggles = matches!(
                (previous, *state),
                (Some(BitState::Low), BitState::High) | (Some(BitState::High), BitState::Low)
            );
            if toggles {
                *edge = Edge::Flat;
            }
            previous = Some(*state);
        }
    }
}
