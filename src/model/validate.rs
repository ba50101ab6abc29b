//! Model validation.

use tracing::debug;

use super::types::{width_mask, Node, NodeKind, TimingConfig, Transition, Value, MAX_WIDTH};
use crate::error::{Result, VwfError};
use crate::format::FormatterRegistry;

/// Validate the global timing configuration.
///
/// Checks:
/// - The viewport is not empty
/// - The scale is a positive finite number
/// - The viewport spans at least one slot
pub fn validate_timing(timing: &TimingConfig) -> Result<()> {
    if timing.end_time <= timing.start_time {
        return Err(VwfError::config(format!(
            "end time {} must be after start time {}",
            timing.end_time, timing.start_time
        )));
    }

    if !timing.scale.is_finite() || timing.scale <= 0.0 {
        return Err(VwfError::config(format!(
            "scale must be positive, got {}",
            timing.scale
        )));
    }

    if timing.total_slots() == 0 {
        return Err(VwfError::config(format!(
            "viewport of {} ticks is narrower than one slot of {} ticks",
            timing.duration(),
            timing.scale
        )));
    }

    Ok(())
}

/// Sort a node's transitions and drop redundant ones.
///
/// Transitions sharing a timestamp must agree on the value; otherwise the
/// source file is corrupt. A transition that repeats the previous value is
/// not a change and is dropped.
pub fn normalize_transitions(node: &str, mut transitions: Vec<Transition>) -> Result<Vec<Transition>> {
    transitions.sort_by_key(|t| t.time);

    let mut out: Vec<Transition> = Vec::with_capacity(transitions.len());
    for transition in transitions {
        match out.last() {
            Some(prev) if prev.time == transition.time => {
                if !prev.same_value(&transition) {
                    return Err(VwfError::ConflictingTransition {
                        node: node.to_string(),
                        time: transition.time,
                    });
                }
            }
            Some(prev) if prev.same_value(&transition) => {
                debug!(node, time = transition.time, "dropping repeated value");
            }
            _ => out.push(transition),
        }
    }
    Ok(out)
}

/// Validate a node's shape and its transitions' values.
pub fn validate_node(node: &Node, formatters: &FormatterRegistry) -> Result<()> {
    if node.width == 0 || node.width > MAX_WIDTH {
        return Err(VwfError::InvalidSignal {
            name: node.name.clone(),
            message: format!("width {} is outside 1..={}", node.width, MAX_WIDTH),
        });
    }

    if node.kind == NodeKind::Bit && node.width != 1 {
        return Err(VwfError::InvalidSignal {
            name: node.name.clone(),
            message: format!("a {}-bit node cannot be drawn as a single bit", node.width),
        });
    }

    if node.kind == NodeKind::Bus && formatters.resolve(&node.radix).is_none() {
        return Err(VwfError::UnknownRadix {
            node: node.name.clone(),
            radix: node.radix.name().to_string(),
        });
    }

    let valid = width_mask(node.width);
    for pair in node.transitions.windows(2) {
        if pair[1].time <= pair[0].time {
            return Err(VwfError::ConflictingTransition {
                node: node.name.clone(),
                time: pair[1].time,
            });
        }
    }

    for t in &node.transitions {
        let fits = match (node.kind, t.value) {
            (NodeKind::Bit, Value::Bit(_)) => true,
            (NodeKind::Bus, Value::Bus(v)) => v & !valid == 0,
            _ => {
                return Err(VwfError::InvalidSignal {
                    name: node.name.clone(),
                    message: format!("{:?} node holds value {} at time {}", node.kind, t.value, t.time),
                });
            }
        };
        if !fits || t.unknown_mask & !valid != 0 {
            return Err(VwfError::ValueExceedsWidth {
                node: node.name.clone(),
                time: t.time,
                value: t.value.to_string(),
                width: node.width,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{BitState, Radix};

    #[test]
    fn test_timing_rejects_empty_viewport() {
        let err = validate_timing(&TimingConfig::new(10, 10, 1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_timing_rejects_bad_scale() {
        assert!(validate_timing(&TimingConfig::new(0, 10, 0.0)).is_err());
        assert!(validate_timing(&TimingConfig::new(0, 10, -2.0)).is_err());
        assert!(validate_timing(&TimingConfig::new(0, 10, f64::NAN)).is_err());
        assert!(validate_timing(&TimingConfig::new(0, 10, 100.0)).is_err());
        assert!(validate_timing(&TimingConfig::new(0, 10, 5.0)).is_ok());
    }

    #[test]
    fn test_normalize_sorts_and_merges() {
        let transitions = vec![
            Transition::bit(10, BitState::High),
            Transition::bit(0, BitState::Low),
            Transition::bit(10, BitState::High),
            Transition::bit(20, BitState::High),
        ];
        let out = normalize_transitions("a", transitions).unwrap();
        assert_eq!(
            out,
            vec![Transition::bit(0, BitState::Low), Transition::bit(10, BitState::High)]
        );
    }

    #[test]
    fn test_normalize_rejects_conflicts() {
        let transitions = vec![
            Transition::bit(5, BitState::High),
            Transition::bit(5, BitState::Low),
        ];
        let err = normalize_transitions("a", transitions).unwrap_err();
        assert!(matches!(err, VwfError::ConflictingTransition { time: 5, .. }));
    }

    #[test]
    fn test_node_value_must_fit_width() {
        let registry = FormatterRegistry::new();
        let node = Node::new("d", 4, Radix::Hexadecimal)
            .with_transitions(vec![Transition::bus(0, 0x1F, 0)]);
        let err = validate_node(&node, &registry).unwrap_err();
        assert!(matches!(err, VwfError::ValueExceedsWidth { width: 4, .. }));

        let node = Node::new("d", 4, Radix::Hexadecimal)
            .with_transitions(vec![Transition::bus(0, 0xF, 0x10)]);
        assert!(validate_node(&node, &registry).is_err());
    }

    #[test]
    fn test_bus_needs_known_radix() {
        let registry = FormatterRegistry::new();
        let node = Node::new("d", 4, Radix::Custom("Gray".into()));
        assert!(matches!(
            validate_node(&node, &registry).unwrap_err(),
            VwfError::UnknownRadix { .. }
        ));
    }
}
