//! Waveform model.
//!
//! The model is the validated, syntax-free view of a waveform: a list of
//! nodes in display order, each with strictly increasing transitions, plus
//! the timing configuration of the drawing.

mod builder;
mod types;
mod validate;

pub use builder::{build_model, parse_ticks};
pub use types::*;
pub use validate::{normalize_transitions, validate_node, validate_timing};

use crate::error::Result;
use crate::format::FormatterRegistry;
use crate::render::RenderOptions;
use crate::vwf::VwfAst;

/// Validated waveform ready for rendering.
#[derive(Debug, Clone)]
pub struct WaveformModel {
    nodes: Vec<Node>,
    timing: TimingConfig,
    time_unit: String,
    formatters: FormatterRegistry,
}

impl WaveformModel {
    /// Create a model from nodes in display order.
    ///
    /// Transitions are sorted and deduplicated; every node and the timing
    /// configuration are validated.
    pub fn new(nodes: Vec<Node>, timing: TimingConfig, formatters: FormatterRegistry) -> Result<Self> {
        validate_timing(&timing)?;

        let nodes = nodes
            .into_iter()
            .map(|mut node| {
                let transitions = std::mem::take(&mut node.transitions);
                node.transitions = normalize_transitions(&node.name, transitions)?;
                validate_node(&node, &formatters)?;
                Ok(node)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            nodes,
            timing,
            time_unit: "ns".to_string(),
            formatters,
        })
    }

    /// Build a model from a parsed VWF file.
    pub fn from_ast(ast: &VwfAst, options: &RenderOptions) -> Result<Self> {
        build_model(ast, options)
    }

    pub(crate) fn with_time_unit(mut self, unit: impl Into<String>) -> Self {
        self.time_unit = unit.into();
        self
    }

    /// All nodes in display order, collapsed ones included.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes that produce a row.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.collapsed)
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Time unit of the source file.
    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_transitions() {
        let node = Node::new("a", 1, Radix::Binary).with_transitions(vec![
            Transition::bit(20, BitState::Low),
            Transition::bit(0, BitState::High),
            Transition::bit(10, BitState::High),
        ]);
        let model = WaveformModel::new(vec![node], TimingConfig::new(0, 30, 10.0), FormatterRegistry::new())
            .unwrap();
        let times: Vec<u64> = model.nodes()[0].transitions.iter().map(|t| t.time).collect();
        assert_eq!(times, vec![0, 20]);
        assert!(model.node("a").is_some());
        assert!(model.node("b").is_none());
    }

    #[test]
    fn test_new_rejects_bad_timing() {
        let err = WaveformModel::new(Vec::new(), TimingConfig::new(5, 5, 1.0), FormatterRegistry::new())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
