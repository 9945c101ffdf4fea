//! Pull-based render graph.
//!
//! Nodes live in a [`Graph`] arena and refer to their inputs by [`NodeId`].
//! Rendering a node first renders each of its inputs, depth-first and in
//! the order they were connected, into the same buffer, then lets the node
//! apply its own effect. Every stage works in place on one shared block, so
//! a chain composes the same way no matter how it is split up.
//!
//! Wiring happens before rendering starts. Connections that would close a
//! loop are rejected. A node feeding several others is pulled once per
//! consumer in each pass.

/// Feedback delay node and its wet-mix handle.
pub mod delay;
/// Exponential gate node and its trigger/damp handle.
pub mod envelope;
/// Ladder filter node and its cutoff/resonance handle.
pub mod filter;
/// Render contract and the closed set of node kinds.
pub mod node;
/// Wavetable oscillator node and its frequency handle.
pub mod oscillator;
/// Graph root that sums its inputs.
pub mod output;

use std::fmt;

use crate::error::GraphError;

pub use delay::{DelayHandle, DelayNode};
pub use envelope::{EnvNode, EnvelopeHandle};
pub use filter::{FilterHandle, FilterNode};
pub use node::{Node, UGen};
pub use oscillator::{OscHandle, OscNode};
pub use output::OutputNode;

/// Index of a node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    node: Node,
    inputs: Vec<NodeId>,
}

#[derive(Default)]
pub struct Graph {
    slots: Vec<Slot>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: impl Into<Node>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node: node.into(),
            inputs: Vec::new(),
        });
        id
    }

    /// Make `source` an input of `dest`. Connecting twice is a no-op.
    pub fn connect(&mut self, source: NodeId, dest: NodeId) -> Result<(), GraphError> {
        self.check(source)?;
        self.check(dest)?;
        if source == dest {
            return Err(GraphError::SelfLoop(source));
        }
        if self.slots[dest.0].inputs.contains(&source) {
            return Ok(());
        }
        if self.is_upstream(dest, source) {
            return Err(GraphError::CycleDetected {
                from: source,
                to: dest,
            });
        }

        tracing::debug!(
            "connect {} {source} -> {} {dest}",
            self.slots[source.0].node.kind(),
            self.slots[dest.0].node.kind()
        );
        self.slots[dest.0].inputs.push(source);
        Ok(())
    }

    /// Remove `source` from the inputs of `dest`. Returns whether it was there.
    pub fn disconnect(&mut self, source: NodeId, dest: NodeId) -> Result<bool, GraphError> {
        self.check(source)?;
        self.check(dest)?;
        let inputs = &mut self.slots[dest.0].inputs;
        match inputs.iter().position(|&id| id == source) {
            Some(index) => {
                inputs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wire `nodes` into a chain: each one feeds the next.
    pub fn chain(&mut self, nodes: &[NodeId]) -> Result<(), GraphError> {
        for pair in nodes.windows(2) {
            self.connect(pair[0], pair[1])?;
        }
        Ok(())
    }

    pub fn inputs(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        self.check(id)?;
        Ok(&self.slots[id.0].inputs)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.node)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Render `id` and everything upstream of it into `buffer`.
    ///
    /// Returns true when the node wrote its signal into the buffer. On false
    /// the buffer is exactly as it was before the call. Unknown ids render
    /// nothing.
    pub fn render(&mut self, id: NodeId, buffer: &mut [f32]) -> bool {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return false;
        };
        slot.node.sync();
        if !slot.node.is_open() {
            return false;
        }

        let mut inputs_rendered = false;
        for i in 0..self.slots[id.0].inputs.len() {
            let input = self.slots[id.0].inputs[i];
            inputs_rendered |= self.render(input, buffer);
        }

        self.slots[id.0].node.process(buffer, inputs_rendered)
    }

    fn check(&self, id: NodeId) -> Result<(), GraphError> {
        if id.0 < self.slots.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    /// Whether `candidate` is reachable by walking inputs back from `from`.
    fn is_upstream(&self, candidate: NodeId, from: NodeId) -> bool {
        let mut visited = vec![false; self.slots.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == candidate {
                return true;
            }
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            stack.extend(self.slots[id.0].inputs.iter().copied());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::{EnvelopeSettings, FACTOR_HARD};
    use crate::dsp::oscillator::Waveform;
    use crate::BLOCK_SIZE;

    struct Chain {
        graph: Graph,
        osc: NodeId,
        env: NodeId,
        filter: NodeId,
        delay: NodeId,
        out: NodeId,
        envelope: EnvelopeHandle,
    }

    fn chain() -> Chain {
        let mut graph = Graph::new();
        let (osc, _) = OscNode::shared(Waveform::Saw, 110.0);
        let (env, envelope) = EnvNode::shared(EnvelopeSettings::new(FACTOR_HARD));
        let (filter, _) = FilterNode::shared(1_000.0, 0.6);
        let (delay, _) = DelayNode::shared(1_000, 0.3);

        let osc = graph.add(osc);
        let env = graph.add(env);
        let filter = graph.add(filter);
        let delay = graph.add(delay);
        let out = graph.add(OutputNode::new());
        graph.chain(&[osc, env, filter, delay, out]).unwrap();

        Chain {
            graph,
            osc,
            env,
            filter,
            delay,
            out,
            envelope,
        }
    }

    #[test]
    fn closed_envelope_silences_whole_chain() {
        let mut c = chain();
        for fill in [0.0f32, 0.5, -3.0] {
            let mut buffer = vec![fill; BLOCK_SIZE];
            assert!(!c.graph.render(c.out, &mut buffer));
            assert!(buffer.iter().all(|s| s.to_bits() == fill.to_bits()));
        }
    }

    #[test]
    fn triggered_chain_renders_signal() {
        let mut c = chain();
        c.envelope.trigger();

        let mut heard = false;
        for _ in 0..8 {
            let mut buffer = vec![0.0f32; BLOCK_SIZE];
            assert!(c.graph.render(c.out, &mut buffer));
            assert!(buffer.iter().all(|s| s.is_finite()));
            heard |= buffer.iter().any(|&s| s != 0.0);
        }
        assert!(heard);
    }

    #[test]
    fn inputs_render_in_connection_order() {
        let mut graph = Graph::new();
        let (a, _) = OscNode::shared(Waveform::Square, 100.0);
        let (b, _) = OscNode::shared(Waveform::Saw, 300.0);
        let a = graph.add(a);
        let b = graph.add(b);
        let out = graph.add(OutputNode::new());
        graph.connect(a, out).unwrap();
        graph.connect(b, out).unwrap();

        assert_eq!(graph.inputs(out).unwrap(), &[a, b]);

        let mut mixed = vec![0.0f32; BLOCK_SIZE];
        assert!(graph.render(out, &mut mixed));

        let (mut a_alone, _) = OscNode::shared(Waveform::Square, 100.0);
        let (mut b_alone, _) = OscNode::shared(Waveform::Saw, 300.0);
        let mut expected = vec![0.0f32; BLOCK_SIZE];
        a_alone.process(&mut expected, false);
        b_alone.process(&mut expected, false);
        assert_eq!(mixed, expected);
    }

    #[test]
    fn output_without_inputs_is_silent() {
        let mut graph = Graph::new();
        let out = graph.add(OutputNode::new());
        let mut buffer = vec![1.0f32; 4];
        assert!(!graph.render(out, &mut buffer));
        assert_eq!(buffer, vec![1.0; 4]);
    }

    #[test]
    fn connect_is_idempotent_and_disconnect_undoes_it() {
        let mut c = chain();
        c.graph.connect(c.osc, c.env).unwrap();
        assert_eq!(c.graph.inputs(c.env).unwrap(), &[c.osc]);

        assert_eq!(c.graph.disconnect(c.osc, c.env), Ok(true));
        assert_eq!(c.graph.disconnect(c.osc, c.env), Ok(false));
        assert!(c.graph.inputs(c.env).unwrap().is_empty());
    }

    #[test]
    fn rejects_cycles_and_self_loops() {
        let mut c = chain();
        assert_eq!(
            c.graph.connect(c.delay, c.env),
            Err(GraphError::CycleDetected {
                from: c.delay,
                to: c.env
            })
        );
        assert_eq!(c.graph.connect(c.filter, c.filter), Err(GraphError::SelfLoop(c.filter)));
        assert_eq!(c.graph.inputs(c.env).unwrap(), &[c.osc]);
    }

    #[test]
    fn rejects_unknown_nodes() {
        let mut c = chain();
        let stranger = NodeId::from_index(42);
        assert_eq!(c.graph.connect(stranger, c.out), Err(GraphError::UnknownNode(stranger)));
        let mut buffer = vec![0.0f32; 4];
        assert!(!c.graph.render(stranger, &mut buffer));
    }

    #[test]
    fn reports_node_kinds() {
        let c = chain();
        assert_eq!(c.graph.len(), 5);
        assert_eq!(c.graph.node(c.osc).map(Node::kind), Some("oscillator"));
        assert_eq!(c.graph.node(c.out).map(Node::kind), Some("output"));
    }
}
