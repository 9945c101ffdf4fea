use crate::graph::node::UGen;

/// Graph root: mixes whatever its inputs rendered and adds nothing itself.
#[derive(Debug, Default)]
pub struct OutputNode;

impl OutputNode {
    pub fn new() -> Self {
        Self
    }
}

impl UGen for OutputNode {
    fn process(&mut self, _buffer: &mut [f32], inputs_rendered: bool) -> bool {
        inputs_rendered
    }
}
