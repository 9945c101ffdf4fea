use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::error::EngineError;
use crate::io::AudioDevice;

#[derive(Debug, Default)]
struct Recording {
    blocks: Vec<Vec<i16>>,
    opened: bool,
    closed: bool,
}

/// Device that records every block in memory.
///
/// Clones share one recording, so a caller can keep a clone to inspect what
/// a render thread wrote. Useful for offline bounces and tests. Optionally
/// sleeps after each write to mimic a device draining in real time, and can
/// be told to fail on open or after a number of writes.
#[derive(Clone, Default)]
pub struct MemoryDevice {
    recording: Arc<Mutex<Recording>>,
    pace: Option<Duration>,
    fail_open: bool,
    fail_after: Option<usize>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `pace` after every accepted block.
    pub fn paced(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }

    /// Refuse to open.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Accept `writes` blocks, then fail every write after that.
    pub fn failing_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }

    pub fn blocks(&self) -> Vec<Vec<i16>> {
        self.lock().blocks.clone()
    }

    pub fn block_count(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Every recorded sample, in order.
    pub fn samples(&self) -> Vec<i16> {
        self.lock().blocks.concat()
    }

    pub fn is_open(&self) -> bool {
        let recording = self.lock();
        recording.opened && !recording.closed
    }

    pub fn was_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        // writes push whole blocks, so a poisoned recording is still consistent
        self.recording
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioDevice for MemoryDevice {
    fn open(&mut self) -> Result<(), EngineError> {
        if self.fail_open {
            return Err(EngineError::DeviceInit("memory device refused to open".into()));
        }
        let mut recording = self.lock();
        recording.opened = true;
        recording.closed = false;
        Ok(())
    }

    fn write(&mut self, block: &[i16]) -> Result<(), EngineError> {
        {
            let mut recording = self.lock();
            if !recording.opened || recording.closed {
                return Err(EngineError::DeviceWrite("memory device is not open".into()));
            }
            if let Some(limit) = self.fail_after {
                if recording.blocks.len() >= limit {
                    return Err(EngineError::DeviceWrite(format!(
                        "memory device full after {limit} blocks"
                    )));
                }
            }
            recording.blocks.push(block.to_vec());
        }

        if let Some(pace) = self.pace {
            thread::sleep(pace);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.lock().closed = true;
        Ok(())
    }
}
