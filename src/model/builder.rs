//! Lowering of the VWF syntax tree into a [`WaveformModel`].

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::types::*;
use super::WaveformModel;
use crate::error::{Result, VwfError};
use crate::render::RenderOptions;
use crate::vwf::{Assignment, Literal, NodeBlock, Section, SectionKind, Stanza, VwfAst};

/// Time units accepted in `TIME_UNIT`.
const TIME_UNITS: [&str; 6] = ["fs", "ps", "ns", "us", "ms", "s"];

/// Decimal places of a time that fit in one tick.
const TICK_DIGITS: usize = 3;

/// Build a model from a parsed VWF file.
pub fn build_model(ast: &VwfAst, options: &RenderOptions) -> Result<WaveformModel> {
    let header = parse_header(ast)?;
    let signals = parse_signals(ast)?;
    let levels = parse_transition_lists(ast, &signals)?;
    let lines = parse_display_lines(ast)?;

    let specs = if lines.is_empty() {
        default_display(&signals)
    } else {
        flatten_display_tree(lines)?
    };

    let builder = NodeBuilder {
        start: header.start,
        signals: &signals,
        levels: &levels,
        options,
    };
    let nodes = specs
        .iter()
        .map(|spec| builder.build(spec))
        .collect::<Result<Vec<_>>>()?;

    let base = TimingConfig {
        start_time: header.start,
        end_time: header.end,
        scale: header.grid_period as f64,
        grid_enabled: header.grid,
    };
    let timing = options.apply_timing(&base);

    debug!(
        nodes = nodes.len(),
        start = timing.start_time,
        end = timing.end_time,
        scale = timing.scale,
        "built waveform model"
    );

    WaveformModel::new(nodes, timing, options.formatters.clone())
        .map(|model| model.with_time_unit(header.time_unit))
}

/// Convert a non-negative decimal in file time units to ticks.
///
/// Returns `None` for negative numbers, malformed text, overflow, or
/// precision finer than one tick.
pub fn parse_ticks(text: &str) -> Option<u64> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (kept, rest) = frac_part.split_at(frac_part.len().min(TICK_DIGITS));
    if rest.bytes().any(|b| b != b'0') {
        return None;
    }

    let whole: u64 = int_part.parse().ok()?;
    let frac: u64 = if kept.is_empty() {
        0
    } else {
        format!("{:0<width$}", kept, width = TICK_DIGITS).parse().ok()?
    };
    whole.checked_mul(TICKS_PER_UNIT)?.checked_add(frac)
}

// ============ Attribute access ============

/// The assignments of one section, checked for duplicates.
struct Attributes<'a> {
    section: String,
    line: usize,
    map: HashMap<&'a str, &'a Assignment>,
}

impl<'a> Attributes<'a> {
    fn collect(section: &'a Section, mandatory: &[&str], optional: &[&str]) -> Result<Self> {
        let name = match &section.index {
            Some(index) => format!("{}({})", section.kind, index),
            None => section.kind.to_string(),
        };
        let mut map = HashMap::new();

        for stanza in &section.body {
            let assignment = match stanza {
                Stanza::Assignment(a) => a,
                _ => {
                    return Err(VwfError::attribute(&name, "NODE", section.line, "unexpected block"));
                }
            };
            let key = assignment.key.as_str();
            if !mandatory.contains(&key) && !optional.contains(&key) {
                return Err(VwfError::attribute(&name, key, assignment.line, "unknown field"));
            }
            if map.insert(key, assignment).is_some() {
                return Err(VwfError::attribute(&name, key, assignment.line, "duplicate field"));
            }
        }

        if let Some(missing) = mandatory.iter().find(|k| !map.contains_key(*k)) {
            return Err(VwfError::attribute(&name, *missing, section.line, "missing mandatory field"));
        }

        Ok(Self {
            section: name,
            line: section.line,
            map,
        })
    }

    fn error(&self, key: &str, message: impl Into<String>) -> VwfError {
        let line = self.map.get(key).map(|a| a.line).unwrap_or(self.line);
        VwfError::attribute(&self.section, key, line, message)
    }

    fn single(&self, key: &str) -> Result<Option<&'a Literal>> {
        match self.map.get(key).copied() {
            None => Ok(None),
            Some(a) if a.values.len() == 1 => Ok(Some(&a.values[0])),
            Some(_) => Err(self.error(key, "expected a single value")),
        }
    }

    fn required(&self, key: &str) -> Result<&'a Literal> {
        self.single(key)?
            .ok_or_else(|| self.error(key, "missing mandatory field"))
    }

    fn ident(&self, key: &str) -> Result<&'a str> {
        match self.required(key)? {
            Literal::Ident(s) => Ok(s.as_str()),
            other => Err(self.error(key, format!("expected identifier, found {}", other.type_name()))),
        }
    }

    fn string(&self, key: &str) -> Result<&'a str> {
        match self.required(key)? {
            Literal::Str(s) => Ok(s.as_str()),
            other => Err(self.error(key, format!("expected string, found {}", other.type_name()))),
        }
    }

    fn integer(&self, key: &str) -> Result<i64> {
        match self.required(key)? {
            Literal::Number(s) => s
                .parse()
                .map_err(|_| self.error(key, format!("expected integer, found '{}'", s))),
            other => Err(self.error(key, format!("expected integer, found {}", other.type_name()))),
        }
    }

    fn optional_integer(&self, key: &str) -> Result<Option<i64>> {
        match self.map.contains_key(key) {
            true => self.integer(key).map(Some),
            false => Ok(None),
        }
    }

    fn ticks(&self, key: &str) -> Result<u64> {
        match self.required(key)? {
            Literal::Number(s) => {
                parse_ticks(s).ok_or_else(|| self.error(key, format!("invalid time '{}'", s)))
            }
            other => Err(self.error(key, format!("expected time, found {}", other.type_name()))),
        }
    }

    fn integer_list(&self, key: &str) -> Result<Option<Vec<i64>>> {
        let assignment = match self.map.get(key) {
            Some(a) => a,
            None => return Ok(None),
        };
        assignment
            .values
            .iter()
            .map(|v| match v {
                Literal::Number(s) => s
                    .parse()
                    .map_err(|_| self.error(key, format!("expected integer, found '{}'", s))),
                other => Err(self.error(key, format!("expected integer, found {}", other.type_name()))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// Name given in `SECTION("name")`.
fn section_name(section: &Section) -> Result<&str> {
    match &section.index {
        Some(Literal::Str(name)) => Ok(name.as_str()),
        _ => Err(VwfError::attribute(
            section.kind.to_string(),
            "index",
            section.line,
            "expected a quoted signal name",
        )),
    }
}

// ============ Header ============

struct Header {
    time_unit: String,
    start: u64,
    end: u64,
    grid_period: u64,
    grid: bool,
}

fn parse_header(ast: &VwfAst) -> Result<Header> {
    let mut headers = ast.sections_of(SectionKind::Header);
    let section = headers.next().ok_or(VwfError::MissingHeader)?;
    if headers.next().is_some() {
        return Err(VwfError::UnsupportedHeader {
            message: "more than one HEADER section".to_string(),
        });
    }

    let attrs = Attributes::collect(
        section,
        &[
            "VERSION",
            "TIME_UNIT",
            "DATA_OFFSET",
            "DATA_DURATION",
            "SIMULATION_TIME",
            "GRID_PHASE",
            "GRID_PERIOD",
            "GRID_DUTY_CYCLE",
        ],
        &["PRINT_OPTIONS", "SHOW_GRID"],
    )?;

    let version = attrs.integer("VERSION")?;
    if version != 1 {
        return Err(VwfError::UnsupportedHeader {
            message: format!("VERSION {} (only 1 is supported)", version),
        });
    }

    let time_unit = attrs.ident("TIME_UNIT")?;
    if !TIME_UNITS.contains(&time_unit) {
        return Err(VwfError::UnsupportedHeader {
            message: format!("TIME_UNIT '{}'", time_unit),
        });
    }

    // Parsed for type checking only
    attrs.ticks("SIMULATION_TIME")?;
    attrs.ticks("GRID_PHASE")?;
    attrs.integer("GRID_DUTY_CYCLE")?;
    if attrs.map.contains_key("PRINT_OPTIONS") {
        attrs.string("PRINT_OPTIONS")?;
    }

    let grid = match attrs.single("SHOW_GRID")? {
        None => false,
        Some(Literal::Ident(s)) if s == "ON" => true,
        Some(Literal::Ident(s)) if s == "OFF" => false,
        Some(other) => {
            return Err(attrs.error("SHOW_GRID", format!("expected ON or OFF, found {}", other)));
        }
    };

    let start = attrs.ticks("DATA_OFFSET")?;
    let end = start
        .checked_add(attrs.ticks("DATA_DURATION")?)
        .ok_or_else(|| attrs.error("DATA_DURATION", "data ends past the largest representable time"))?;

    Ok(Header {
        time_unit: time_unit.to_string(),
        start,
        end,
        grid_period: attrs.ticks("GRID_PERIOD")?,
        grid,
    })
}

// ============ Signals ============

struct SignalDecl {
    name: String,
    width: u32,
    parent: Option<String>,
}

/// Declared signals in file order, with a name index.
struct Signals {
    decls: Vec<SignalDecl>,
    index: HashMap<String, usize>,
}

impl Signals {
    fn get(&self, name: &str) -> Result<&SignalDecl> {
        self.index
            .get(name)
            .map(|&i| &self.decls[i])
            .ok_or_else(|| VwfError::UnknownSignal {
                name: name.to_string(),
            })
    }
}

fn parse_signals(ast: &VwfAst) -> Result<Signals> {
    let mut signals = Signals {
        decls: Vec::new(),
        index: HashMap::new(),
    };

    for section in ast.sections_of(SectionKind::Signal) {
        let name = section_name(section)?;
        let attrs = Attributes::collect(
            section,
            &["VALUE_TYPE", "SIGNAL_TYPE", "WIDTH", "LSB_INDEX", "DIRECTION", "PARENT"],
            &[],
        )?;
        let invalid = |message: String| VwfError::InvalidSignal {
            name: name.to_string(),
            message,
        };

        let value_type = attrs.ident("VALUE_TYPE")?;
        if value_type != "NINE_LEVEL_BIT" {
            return Err(invalid(format!("unsupported VALUE_TYPE {}", value_type)));
        }

        let width = attrs.integer("WIDTH")?;
        if width < 1 || width > i64::from(MAX_WIDTH) {
            return Err(invalid(format!("WIDTH {} is outside 1..={}", width, MAX_WIDTH)));
        }
        let width = width as u32;

        match (attrs.ident("SIGNAL_TYPE")?, width) {
            ("SINGLE_BIT", 1) => {}
            ("BUS", w) if w > 1 => {}
            (signal_type, w) => {
                return Err(invalid(format!("SIGNAL_TYPE {} with WIDTH {}", signal_type, w)));
            }
        }

        attrs.integer("LSB_INDEX")?;
        let direction = attrs.ident("DIRECTION")?;
        if !matches!(direction, "INPUT" | "OUTPUT" | "BIDIR") {
            return Err(invalid(format!("unknown DIRECTION {}", direction)));
        }

        let parent = attrs.string("PARENT")?;
        if signals.index.contains_key(name) {
            return Err(VwfError::DuplicateSignal {
                section: SectionKind::Signal.to_string(),
                name: name.to_string(),
            });
        }
        signals.index.insert(name.to_string(), signals.decls.len());
        signals.decls.push(SignalDecl {
            name: name.to_string(),
            width,
            parent: (!parent.is_empty()).then(|| parent.to_string()),
        });
    }

    Ok(signals)
}

// ============ Transition lists ============

/// One `LEVEL` statement after repeat expansion.
#[derive(Debug, Clone)]
struct Level<'a> {
    value: &'a Literal,
    duration: u64,
    text: &'a str,
    line: usize,
}

fn parse_transition_lists<'a>(
    ast: &'a VwfAst,
    signals: &Signals,
) -> Result<HashMap<String, Vec<Level<'a>>>> {
    let mut lists = HashMap::new();

    for section in ast.sections_of(SectionKind::TransitionList) {
        let name = section_name(section)?;
        signals.get(name)?;
        if lists.contains_key(name) {
            return Err(VwfError::DuplicateSignal {
                section: SectionKind::TransitionList.to_string(),
                name: name.to_string(),
            });
        }

        let root = match section.body.as_slice() {
            [Stanza::Node(node)] => node,
            _ => {
                return Err(VwfError::InvalidSignal {
                    name: name.to_string(),
                    message: "TRANSITION_LIST must hold exactly one NODE block".to_string(),
                });
            }
        };

        let mut levels = Vec::new();
        flatten_node(name, root, &mut levels)?;
        lists.insert(name.to_string(), levels);
    }

    Ok(lists)
}

/// Expand a `NODE` block and its `REPEAT` count into a flat level list.
/// Upper bound on the levels one transition list may expand to.
const MAX_LEVELS: usize = 1 << 20;

fn flatten_node<'a>(name: &str, node: &'a NodeBlock, out: &mut Vec<Level<'a>>) -> Result<()> {
    let mut repeat = 1u64;
    let mut once = Vec::new();

    for stanza in &node.body {
        match stanza {
            Stanza::Assignment(a) if a.key == "REPEAT" => {
                repeat = match a.values.as_slice() {
                    [Literal::Number(n)] => n.parse().map_err(|_| {
                        VwfError::attribute("NODE", "REPEAT", a.line, format!("invalid count '{}'", n))
                    })?,
                    _ => {
                        return Err(VwfError::attribute("NODE", "REPEAT", a.line, "expected a count"));
                    }
                };
            }
            Stanza::Assignment(a) => {
                return Err(VwfError::attribute("NODE", &a.key, a.line, "unknown field"));
            }
            Stanza::Node(inner) => flatten_node(name, inner, &mut once)?,
            Stanza::Level(level) => {
                let duration = parse_ticks(&level.duration).ok_or_else(|| VwfError::InvalidDuration {
                    node: name.to_string(),
                    duration: level.duration.clone(),
                    line: level.line,
                })?;
                once.push(Level {
                    value: &level.value,
                    duration,
                    text: &level.duration,
                    line: level.line,
                });
            }
        }
    }

    let total = usize::try_from(repeat)
        .ok()
        .and_then(|r| once.len().checked_mul(r))
        .filter(|n| out.len().saturating_add(*n) <= MAX_LEVELS)
        .ok_or_else(|| VwfError::InvalidSignal {
            name: name.to_string(),
            message: format!("transition list expands to more than {} levels", MAX_LEVELS),
        })?;
    out.extend(once.iter().cycle().take(total).cloned());
    Ok(())
}

// ============ Display lines ============

#[derive(Debug)]
struct DisplayLine {
    channel: String,
    expanded: bool,
    radix: String,
    index: i64,
    level: i64,
    parent: Option<i64>,
    children: Option<Vec<i64>>,
}

/// A display line in tree order, ready to become a node.
#[derive(Debug)]
struct NodeSpec {
    channel: String,
    radix: Option<String>,
    /// Channels of the child bits, most significant first
    children: Option<Vec<String>>,
    collapsed: bool,
}

fn parse_display_lines(ast: &VwfAst) -> Result<Vec<DisplayLine>> {
    ast.sections_of(SectionKind::DisplayLine)
        .map(|section| {
            let attrs = Attributes::collect(
                section,
                &["CHANNEL", "EXPAND_STATUS", "RADIX", "TREE_INDEX", "TREE_LEVEL"],
                &["PARENT", "CHILDREN"],
            )?;
            let expanded = match attrs.ident("EXPAND_STATUS")? {
                "EXPANDED" => true,
                "COLLAPSED" => false,
                other => {
                    return Err(attrs.error("EXPAND_STATUS", format!("unknown status {}", other)));
                }
            };
            Ok(DisplayLine {
                channel: attrs.string("CHANNEL")?.to_string(),
                expanded,
                radix: attrs.ident("RADIX")?.to_string(),
                index: attrs.integer("TREE_INDEX")?,
                level: attrs.integer("TREE_LEVEL")?,
                parent: attrs.optional_integer("PARENT")?,
                children: attrs.integer_list("CHILDREN")?,
            })
        })
        .collect()
}

/// Turn the saved display tree into a pre-order node list.
fn flatten_display_tree(lines: Vec<DisplayLine>) -> Result<Vec<NodeSpec>> {
    let tree_error = |message: String| VwfError::InvalidDisplayTree { message };

    let mut top_level = Vec::new();
    let mut by_index = HashMap::new();
    for line in lines {
        if line.parent.is_none() {
            top_level.push(line.index);
        }
        let index = line.index;
        if by_index.insert(index, line).is_some() {
            return Err(tree_error(format!("duplicate TREE_INDEX {}", index)));
        }
    }

    struct Walk {
        lines: HashMap<i64, DisplayLine>,
        out: Vec<NodeSpec>,
    }

    impl Walk {
        fn visit(&mut self, index: i64, parent: Option<i64>, level: i64, hidden: bool) -> Result<()> {
            let line = self.lines.remove(&index).ok_or_else(|| VwfError::InvalidDisplayTree {
                message: format!("TREE_INDEX {} is missing or referenced twice", index),
            })?;
            if line.level != level || line.parent != parent {
                return Err(VwfError::InvalidDisplayTree {
                    message: format!(
                        "line {} ('{}') has level {} and parent {:?}, expected {} and {:?}",
                        index, line.channel, line.level, line.parent, level, parent
                    ),
                });
            }

            let slot = self.out.len();
            self.out.push(NodeSpec {
                channel: line.channel.clone(),
                radix: Some(line.radix.clone()),
                children: None,
                collapsed: hidden,
            });

            if let Some(children) = &line.children {
                let mut channels = Vec::with_capacity(children.len());
                for &child in children {
                    let channel = self
                        .lines
                        .get(&child)
                        .map(|l| l.channel.clone())
                        .unwrap_or_default();
                    if self.lines.get(&child).map_or(false, |l| l.children.is_some()) {
                        return Err(VwfError::InvalidDisplayTree {
                            message: format!("bus bit '{}' has children of its own", channel),
                        });
                    }
                    self.visit(child, Some(index), level + 1, hidden || !line.expanded)?;
                    channels.push(channel);
                }
                self.out[slot].children = Some(channels);
            }
            Ok(())
        }
    }

    let mut walk = Walk {
        lines: by_index,
        out: Vec::new(),
    };
    for index in top_level {
        walk.visit(index, None, 0, false)?;
    }

    if !walk.lines.is_empty() {
        let mut orphans: Vec<i64> = walk.lines.keys().copied().collect();
        orphans.sort_unstable();
        return Err(tree_error(format!("orphan display lines {:?}", orphans)));
    }
    Ok(walk.out)
}

/// One row per top-level signal when the file has no display lines.
fn default_display(signals: &Signals) -> Vec<NodeSpec> {
    signals
        .decls
        .iter()
        .filter(|s| s.parent.is_none())
        .map(|s| {
            let bits: Vec<String> = signals
                .decls
                .iter()
                .filter(|c| c.parent.as_deref() == Some(s.name.as_str()))
                .map(|c| c.name.clone())
                .collect();
            NodeSpec {
                channel: s.name.clone(),
                radix: None,
                children: (s.width > 1 && !bits.is_empty()).then(|| bits),
                collapsed: false,
            }
        })
        .collect()
}

// ============ Nodes ============

struct NodeBuilder<'a> {
    start: u64,
    signals: &'a Signals,
    levels: &'a HashMap<String, Vec<Level<'a>>>,
    options: &'a RenderOptions,
}

impl<'a> NodeBuilder<'a> {
    fn build(&self, spec: &NodeSpec) -> Result<Node> {
        let signal = self.signals.get(&spec.channel)?;
        let name = spec.channel.as_str();

        let radix_name = self
            .options
            .radix_overrides
            .get(name)
            .cloned()
            .or_else(|| spec.radix.clone());
        let radix = match radix_name {
            Some(r) => self
                .options
                .formatters
                .radix_for(&r)
                .ok_or_else(|| VwfError::UnknownRadix {
                    node: name.to_string(),
                    radix: r.clone(),
                })?,
            None if signal.width > 1 => Radix::Hexadecimal,
            None => Radix::Binary,
        };

        let node = match &spec.children {
            Some(children) => {
                if children.len() as u32 != signal.width {
                    return Err(VwfError::InvalidSignal {
                        name: name.to_string(),
                        message: format!(
                            "WIDTH {} but the display line has {} bits",
                            signal.width,
                            children.len()
                        ),
                    });
                }
                let bits = children
                    .iter()
                    .map(|child| {
                        self.signals.get(child)?;
                        self.bit_transitions(child)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Node::new(name, signal.width, radix).with_transitions(zip_bits(&bits))
            }
            None if signal.width > 1 => {
                Node::new(name, signal.width, radix).with_transitions(self.bus_transitions(name, signal.width)?)
            }
            None if self.options.is_bit_as_bus(name) => {
                let transitions = self
                    .bit_transitions(name)?
                    .into_iter()
                    .map(|t| {
                        let value = matches!(t.value, Value::Bit(BitState::High)) as u128;
                        Transition::bus(t.time, value, t.unknown_mask)
                    })
                    .collect();
                Node::new(name, 1, radix)
                    .with_kind(NodeKind::Bus)
                    .with_transitions(transitions)
            }
            None => Node::new(name, 1, radix).with_transitions(self.bit_transitions(name)?),
        };

        Ok(node.with_collapsed(spec.collapsed))
    }

    fn levels(&self, name: &str) -> &[Level<'a>] {
        self.levels.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn bit_transitions(&self, name: &str) -> Result<Vec<Transition>> {
        let mut time = self.start;
        let mut out = Vec::new();
        for level in self.levels(name) {
            out.push(Transition::bit(time, bit_level(name, level, time)?));
            time = advance(name, level, time)?;
        }
        super::validate::normalize_transitions(name, out)
    }

    fn bus_transitions(&self, name: &str, width: u32) -> Result<Vec<Transition>> {
        let mut time = self.start;
        let mut out = Vec::new();
        for level in self.levels(name) {
            let (value, mask) = bus_level(name, width, level, time)?;
            out.push(Transition::bus(time, value, mask));
            time = advance(name, level, time)?;
        }
        super::validate::normalize_transitions(name, out)
    }
}

/// End time of a level starting at `time`.
fn advance(name: &str, level: &Level<'_>, time: u64) -> Result<u64> {
    time.checked_add(level.duration).ok_or_else(|| VwfError::InvalidDuration {
        node: name.to_string(),
        duration: level.text.to_string(),
        line: level.line,
    })
}

fn malformed(name: &str, level: &Level<'_>, message: &str) -> VwfError {
    VwfError::MalformedLevel {
        node: name.to_string(),
        level: level.value.to_string(),
        line: level.line,
        message: message.to_string(),
    }
}

fn bit_level(name: &str, level: &Level<'_>, time: u64) -> Result<BitState> {
    match level.value {
        Literal::Number(n) => match n.parse::<u128>() {
            Ok(0) => Ok(BitState::Low),
            Ok(1) => Ok(BitState::High),
            Ok(_) => Err(VwfError::ValueExceedsWidth {
                node: name.to_string(),
                time,
                value: n.clone(),
                width: 1,
            }),
            Err(_) => Err(malformed(name, level, "expected 0, 1 or a nine-level identifier")),
        },
        Literal::Ident(s) => match s.as_str() {
            "X" | "U" | "W" | "DC" => Ok(BitState::Unknown),
            "Z" => Ok(BitState::HighZ),
            "L" => Ok(BitState::Low),
            "H" => Ok(BitState::High),
            _ => Err(malformed(name, level, "unknown nine-level value")),
        },
        _ => Err(malformed(name, level, "expected 0, 1 or a nine-level identifier")),
    }
}

fn bus_level(name: &str, width: u32, level: &Level<'_>, time: u64) -> Result<(u128, u128)> {
    let valid = width_mask(width);
    match level.value {
        Literal::Number(n) => {
            let value: u128 = n
                .parse()
                .map_err(|_| malformed(name, level, "bus values must be non-negative integers"))?;
            if value & !valid != 0 {
                return Err(VwfError::ValueExceedsWidth {
                    node: name.to_string(),
                    time,
                    value: n.clone(),
                    width,
                });
            }
            Ok((value, 0))
        }
        Literal::Str(bits) => {
            if bits.len() != width as usize {
                return Err(malformed(name, level, "bit string length differs from WIDTH"));
            }
            let mut value = 0u128;
            let mut mask = 0u128;
            for c in bits.chars() {
                value <<= 1;
                mask <<= 1;
                match c {
                    '0' => {}
                    '1' => value |= 1,
                    'X' | 'x' | 'Z' | 'z' | 'U' | 'u' => mask |= 1,
                    _ => return Err(malformed(name, level, "invalid unknown-bit marker")),
                }
            }
            Ok((value, mask))
        }
        Literal::Ident(s) if matches!(s.as_str(), "X" | "U" | "Z" | "W" | "DC") => Ok((0, valid)),
        Literal::Ident(_) => Err(malformed(name, level, "unknown bus level")),
    }
}

/// Merge per-bit transition lists (most significant first) into bus transitions.
///
/// A bit with no transition yet is unknown; high impedance is unknown on a bus.
fn zip_bits(bits: &[Vec<Transition>]) -> Vec<Transition> {
    let times: BTreeSet<u64> = bits.iter().flatten().map(|t| t.time).collect();
    let width = bits.len();
    let mut cursors = vec![0usize; width];
    let mut out: Vec<Transition> = Vec::with_capacity(times.len());

    for time in times {
        let mut value = 0u128;
        let mut mask = 0u128;
        for (i, list) in bits.iter().enumerate() {
            while cursors[i] < list.len() && list[cursors[i]].time <= time {
                cursors[i] += 1;
            }
            let state = match cursors[i] {
                0 => BitState::Unknown,
                c => match list[c - 1].value {
                    Value::Bit(state) => state,
                    Value::Bus(_) => BitState::Unknown,
                },
            };
            let bit = 1u128 << (width - 1 - i);
            match state {
                BitState::High => value |= bit,
                BitState::Low => {}
                BitState::Unknown | BitState::HighZ => mask |= bit,
            }
        }
        let transition = Transition::bus(time, value, mask);
        if out.last().map_or(true, |prev| !prev.same_value(&transition)) {
            out.push(transition);
        }
    }
    out
}
