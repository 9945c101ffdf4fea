//! Error types for the engine.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while wiring a render graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} cannot feed itself")]
    SelfLoop(NodeId),

    #[error("connecting {from} -> {to} would create a cycle")]
    CycleDetected { from: NodeId, to: NodeId },
}

/// Errors surfaced by a [`Voice`](crate::Voice) and its output device.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("output device has no configuration supporting {sample_rate} Hz")]
    UnsupportedConfig { sample_rate: u32 },

    #[error("device init error: {0}")]
    DeviceInit(String),

    #[error("stream create error: {0}")]
    StreamCreate(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("device write error: {0}")]
    DeviceWrite(String),

    #[error("voice is already running")]
    AlreadyRunning,

    #[error("voice is not running")]
    NotRunning,

    #[error("failed to spawn render thread: {0}")]
    ThreadSpawn(String),

    #[error("render thread panicked")]
    RenderThreadPanicked,

    #[error(transparent)]
    Graph(#[from] GraphError),
}
