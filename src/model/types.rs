//! Core types of the waveform model.

use std::fmt;

/// Model time ticks per file time unit. Durations are stored as integer
/// ticks so that decimal VWF durations such as `12.5` add up exactly.
pub const TICKS_PER_UNIT: u64 = 1000;

/// Widest supported node, in bits.
pub const MAX_WIDTH: u32 = 128;

/// All-ones mask covering `width` bits.
pub fn width_mask(width: u32) -> u128 {
    if width >= MAX_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// State of a single-bit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitState {
    /// Logic low
    Low,
    /// Logic high
    High,
    /// Undefined or unknown
    Unknown,
    /// High impedance
    HighZ,
}

impl fmt::Display for BitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "0",
            Self::High => "1",
            Self::Unknown => "X",
            Self::HighZ => "Z",
        })
    }
}

/// Value carried by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// State of a single-bit node
    Bit(BitState),
    /// Raw value of a bus; bits set in the unknown mask are meaningless
    Bus(u128),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit(state) => state.fmt(f),
            Self::Bus(v) => write!(f, "{:#x}", v),
        }
    }
}

/// A recorded value change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Time in ticks
    pub time: u64,
    /// New value
    pub value: Value,
    /// Set bits are indeterminate at this transition
    pub unknown_mask: u128,
}

impl Transition {
    /// A single-bit transition. Unknown and high-impedance states set the mask.
    pub fn bit(time: u64, state: BitState) -> Self {
        let unknown_mask = match state {
            BitState::Low | BitState::High => 0,
            BitState::Unknown | BitState::HighZ => 1,
        };
        Self {
            time,
            value: Value::Bit(state),
            unknown_mask,
        }
    }

    /// A bus transition.
    pub fn bus(time: u64, value: u128, unknown_mask: u128) -> Self {
        Self {
            time,
            value: Value::Bus(value),
            unknown_mask,
        }
    }

    /// Whether two transitions carry the same logical value.
    ///
    /// Bus bits under the unknown mask are ignored.
    pub fn same_value(&self, other: &Transition) -> bool {
        match (self.value, other.value) {
            (Value::Bus(a), Value::Bus(b)) => {
                self.unknown_mask == other.unknown_mask
                    && (a & !self.unknown_mask) == (b & !other.unknown_mask)
            }
            (a, b) => a == b,
        }
    }
}

/// How a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Level waveform (L/H/X/Z)
    Bit,
    /// Data blocks with value labels
    Bus,
}

impl NodeKind {
    /// Kind implied by a width.
    pub fn from_width(width: u32) -> Self {
        if width == 1 {
            Self::Bit
        } else {
            Self::Bus
        }
    }
}

/// Numeral system used to display a bus value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    SignedDecimal,
    Hexadecimal,
    Ascii,
    /// A formatter registered under this name
    Custom(String),
}

impl Radix {
    /// Resolve a built-in radix from its VWF name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Binary" => Some(Self::Binary),
            "Octal" => Some(Self::Octal),
            "Unsigned" | "Decimal" => Some(Self::Decimal),
            "Signed" => Some(Self::SignedDecimal),
            "Hexadecimal" => Some(Self::Hexadecimal),
            "ASCII" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// Name as used in VWF files and the formatter registry.
    pub fn name(&self) -> &str {
        match self {
            Self::Binary => "Binary",
            Self::Octal => "Octal",
            Self::Decimal => "Unsigned",
            Self::SignedDecimal => "Signed",
            Self::Hexadecimal => "Hexadecimal",
            Self::Ascii => "ASCII",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signal or bus being visualized.
#[derive(Debug, Clone)]
pub struct Node {
    /// Display name
    pub name: String,
    /// Width in bits (1..=128)
    pub width: u32,
    /// Display radix for bus values
    pub radix: Radix,
    /// Hidden by the saved UI state
    pub collapsed: bool,
    /// Bit or bus rendering
    pub kind: NodeKind,
    /// Transitions, strictly increasing in time
    pub transitions: Vec<Transition>,
}

impl Node {
    /// Create a node whose kind follows from its width.
    pub fn new(name: impl Into<String>, width: u32, radix: Radix) -> Self {
        Self {
            name: name.into(),
            width,
            radix,
            collapsed: false,
            kind: NodeKind::from_width(width),
            transitions: Vec::new(),
        }
    }

    /// Set the transitions.
    pub fn with_transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions = transitions;
        self
    }

    /// Set the collapse flag.
    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    /// Override the kind, e.g. to draw a single bit as a bus.
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Global timing and viewport configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingConfig {
    /// Viewport start, in ticks
    pub start_time: u64,
    /// Viewport end, in ticks
    pub end_time: u64,
    /// Ticks per drawing slot
    pub scale: f64,
    /// Draw the table grid
    pub grid_enabled: bool,
}

impl TimingConfig {
    /// Create a timing configuration without grid.
    pub fn new(start_time: u64, end_time: u64, scale: f64) -> Self {
        Self {
            start_time,
            end_time,
            scale,
            grid_enabled: false,
        }
    }

    /// Viewport length in ticks.
    pub fn duration(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Number of slots covering the whole viewport.
    pub fn total_slots(&self) -> u64 {
        self.slot_position(self.end_time)
    }

    /// Slot boundary closest to an absolute time inside the viewport.
    ///
    /// Boundaries are rounded from their exact source position: emitted and
    /// source time never differ by more than half a slot at any boundary.
    pub fn slot_position(&self, time: u64) -> u64 {
        let offset = time.clamp(self.start_time, self.end_time) - self.start_time;
        (offset as f64 / self.scale).round() as u64
    }
}
