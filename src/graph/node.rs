use super::{
    delay::DelayNode, envelope::EnvNode, filter::FilterNode, oscillator::OscNode,
    output::OutputNode,
};

/// Render contract shared by every unit generator.
///
/// A render pass visits a node in three steps: [`sync`](UGen::sync) picks up
/// parameters published by control threads, [`is_open`](UGen::is_open) may
/// cut the pass short, and [`process`](UGen::process) runs after the node's
/// inputs have been pulled into the same buffer.
pub trait UGen: Send {
    /// Pick up parameter changes made through the node's handle.
    fn sync(&mut self) {}

    /// Whether this pass should pull inputs at all.
    ///
    /// Returning false ends the pass for this node: its inputs are not
    /// rendered and the buffer is left exactly as it was.
    fn is_open(&self) -> bool {
        true
    }

    /// Apply this node's own effect to `buffer`.
    ///
    /// `inputs_rendered` is true when at least one input wrote into the
    /// buffer during this pass. Returns true when the buffer now carries this
    /// node's output; false means the buffer was not touched.
    fn process(&mut self, buffer: &mut [f32], inputs_rendered: bool) -> bool;
}

/// The closed set of node kinds a graph can hold.
pub enum Node {
    Oscillator(OscNode),
    Envelope(EnvNode),
    Filter(FilterNode),
    Delay(DelayNode),
    Output(OutputNode),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Oscillator(_) => "oscillator",
            Node::Envelope(_) => "envelope",
            Node::Filter(_) => "filter",
            Node::Delay(_) => "delay",
            Node::Output(_) => "output",
        }
    }
}

impl UGen for Node {
    #[inline]
    fn sync(&mut self) {
        match self {
            Node::Oscillator(node) => node.sync(),
            Node::Envelope(node) => node.sync(),
            Node::Filter(node) => node.sync(),
            Node::Delay(node) => node.sync(),
            Node::Output(node) => node.sync(),
        }
    }

    #[inline]
    fn is_open(&self) -> bool {
        match self {
            Node::Oscillator(node) => node.is_open(),
            Node::Envelope(node) => node.is_open(),
            Node::Filter(node) => node.is_open(),
            Node::Delay(node) => node.is_open(),
            Node::Output(node) => node.is_open(),
        }
    }

    #[inline]
    fn process(&mut self, buffer: &mut [f32], inputs_rendered: bool) -> bool {
        match self {
            Node::Oscillator(node) => node.process(buffer, inputs_rendered),
            Node::Envelope(node) => node.process(buffer, inputs_rendered),
            Node::Filter(node) => node.process(buffer, inputs_rendered),
            Node::Delay(node) => node.process(buffer, inputs_rendered),
            Node::Output(node) => node.process(buffer, inputs_rendered),
        }
    }
}

impl From<OscNode> for Node {
    fn from(node: OscNode) -> Self {
        Node::Oscillator(node)
    }
}

impl From<EnvNode> for Node {
    fn from(node: EnvNode) -> Self {
        Node::Envelope(node)
    }
}

impl From<FilterNode> for Node {
    fn from(node: FilterNode) -> Self {
        Node::Filter(node)
    }
}

impl From<DelayNode> for Node {
    fn from(node: DelayNode) -> Self {
        Node::Delay(node)
    }
}

impl From<OutputNode> for Node {
    fn from(node: OutputNode) -> Self {
        Node::Output(node)
    }
}
