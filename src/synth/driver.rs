use crate::error::EngineError;
use crate::graph::{Graph, NodeId};
use crate::io::converter::convert_block;
use crate::io::AudioDevice;
use crate::BLOCK_SIZE;

/// One render-loop tick at a time: pull the graph, convert, write.
///
/// The driver owns the graph and the device for the lifetime of a render
/// thread. It can also be ticked by hand for offline rendering.
pub struct OutputDriver<D: AudioDevice> {
    graph: Graph,
    root: NodeId,
    device: D,
    buffer: [f32; BLOCK_SIZE],
    pcm: [i16; BLOCK_SIZE],
    silence: [i16; BLOCK_SIZE],
    clean: bool,
}

impl<D: AudioDevice> OutputDriver<D> {
    pub fn new(graph: Graph, root: NodeId, device: D) -> Self {
        Self {
            graph,
            root,
            device,
            buffer: [0.0; BLOCK_SIZE],
            pcm: [0; BLOCK_SIZE],
            silence: [0; BLOCK_SIZE],
            clean: true,
        }
    }

    pub fn open(&mut self) -> Result<(), EngineError> {
        self.device.open()
    }

    pub fn close(&mut self) -> Result<(), EngineError> {
        self.device.close()
    }

    /// Render one block and hand it to the device.
    ///
    /// Blocks for as long as the device write does. Returns whether the
    /// graph produced signal; a silent pass writes a zero block.
    pub fn tick(&mut self) -> Result<bool, EngineError> {
        if !self.clean {
            self.buffer.fill(0.0);
        }

        if self.graph.render(self.root, &mut self.buffer) {
            self.clean = false;
            convert_block(&self.buffer, &mut self.pcm);
            self.device.write(&self.pcm)?;
            Ok(true)
        } else {
            self.clean = true;
            self.device.write(&self.silence)?;
            Ok(false)
        }
    }

    /// Whether the local buffer is known to be all zeros.
    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
