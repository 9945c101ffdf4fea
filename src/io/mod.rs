//! Output devices and sample-format conversion.
//!
//! The render loop only talks to the [`AudioDevice`] trait. A device is
//! opened once when the render thread starts, receives one PCM block per
//! tick, and is closed when the thread winds down.

pub mod converter;
pub mod cpal_device;
pub mod memory;

pub use cpal_device::CpalDevice;
pub use memory::MemoryDevice;

use crate::error::EngineError;

/// A sink for mono, signed 16-bit PCM at [`SAMPLE_RATE`](crate::SAMPLE_RATE).
pub trait AudioDevice {
    /// Start the underlying stream.
    fn open(&mut self) -> Result<(), EngineError>;

    /// Hand one block to the device, blocking until it has been accepted.
    ///
    /// This call paces the render loop to the device's consumption rate.
    fn write(&mut self, block: &[i16]) -> Result<(), EngineError>;

    /// Stop the stream and release the device.
    fn close(&mut self) -> Result<(), EngineError>;
}

impl<D: AudioDevice + ?Sized> AudioDevice for Box<D> {
    fn open(&mut self) -> Result<(), EngineError> {
        (**self).open()
    }

    fn write(&mut self, block: &[i16]) -> Result<(), EngineError> {
        (**self).write(block)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        (**self).close()
    }
}
