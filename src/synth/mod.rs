// Voice composition: initial settings, the tick loop body and the render
// thread that drives it.

pub mod config;
pub mod driver;
pub mod voice;

pub use config::{VoiceConfig, Waveform};
pub use driver::OutputDriver;
pub use voice::Voice;
