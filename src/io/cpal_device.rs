//! CPAL-based audio output.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info, warn};

use crate::error::EngineError;
use crate::io::AudioDevice;
use crate::{BLOCK_SIZE, SAMPLE_RATE};

/// Blocks of headroom between the render thread and the device callback.
const RING_BLOCKS: usize = 4;
/// How long a blocked `write` sleeps before checking for room again.
const WRITE_POLL: Duration = Duration::from_millis(1);
/// A ring that does not drain for this long means the device is gone.
const STALL_LIMIT: Duration = Duration::from_secs(2);

/// First stream error reported by the device callback, if any.
type LatchedError = Arc<Mutex<Option<String>>>;

/// Plays PCM blocks on the default output device.
///
/// The render thread pushes samples into a ring buffer that the device
/// callback drains, so `write` blocks exactly as long as the device needs
/// to make room. The stream is created in [`open`](AudioDevice::open);
/// construct and use the device on the thread that will render.
pub struct CpalDevice {
    stream: Option<Stream>,
    writer: Option<BlockWriter>,
    stream_error: LatchedError,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self {
            stream: None,
            writer: None,
            stream_error: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for CpalDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDevice for CpalDevice {
    fn open(&mut self) -> Result<(), EngineError> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host.default_output_device().ok_or(EngineError::NoDevice)?;
        if let Ok(name) = device.name() {
            info!("Audio device: {}", name);
        }

        let rate = SampleRate(SAMPLE_RATE);
        let supported = device
            .supported_output_configs()
            .map_err(|e| EngineError::DeviceInit(e.to_string()))?
            .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
            .min_by_key(|range| range.channels())
            .ok_or(EngineError::UnsupportedConfig {
                sample_rate: SAMPLE_RATE,
            })?
            .with_sample_rate(rate);
        debug!("Audio config: {:?}", supported);

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let (producer, consumer) = RingBuffer::<i16>::new(BLOCK_SIZE * RING_BLOCKS);
        let errors = Arc::clone(&self.stream_error);

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer, errors),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer, errors),
            SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer, errors),
            other => {
                return Err(EngineError::DeviceInit(format!(
                    "unsupported sample format {other}"
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| EngineError::Playback(e.to_string()))?;
        info!(
            "Audio stream started at {} Hz, {} channel(s)",
            SAMPLE_RATE, config.channels
        );

        self.stream = Some(stream);
        self.writer = Some(BlockWriter::new(
            producer,
            Arc::clone(&self.stream_error),
            STALL_LIMIT,
        ));
        Ok(())
    }

    fn write(&mut self, block: &[i16]) -> Result<(), EngineError> {
        self.writer
            .as_mut()
            .ok_or_else(|| EngineError::DeviceWrite("stream is not open".into()))?
            .write(block)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.writer = None;
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| EngineError::Playback(e.to_string()))?;
            info!("Audio stream stopped");
        }
        Ok(())
    }
}

/// Producer half of the ring, pushing whole blocks for the device callback.
///
/// `write` returns once the block is in the ring. It gives up with an error
/// when the callback reports a stream error, drops its consumer, or stops
/// draining for longer than the stall limit.
struct BlockWriter {
    producer: Producer<i16>,
    errors: LatchedError,
    stall_limit: Duration,
}

impl BlockWriter {
    fn new(producer: Producer<i16>, errors: LatchedError, stall_limit: Duration) -> Self {
        Self {
            producer,
            errors,
            stall_limit,
        }
    }

    fn take_error(&self) -> Option<String> {
        self.errors
            .lock()
            .ok()
            .and_then(|mut latched| latched.take())
    }

    fn write(&mut self, block: &[i16]) -> Result<(), EngineError> {
        let mut remaining = block;
        let mut last_progress = Instant::now();

        loop {
            if let Some(message) = self.take_error() {
                return Err(EngineError::DeviceWrite(message));
            }
            if remaining.is_empty() {
                return Ok(());
            }
            if self.producer.is_abandoned() {
                return Err(EngineError::DeviceWrite("audio callback went away".into()));
            }

            let n = self.producer.slots().min(remaining.len());
            if n == 0 {
                if last_progress.elapsed() >= self.stall_limit {
                    return Err(EngineError::DeviceWrite(format!(
                        "device stopped draining for {:?}",
                        self.stall_limit
                    )));
                }
                thread::sleep(WRITE_POLL);
                continue;
            }

            let Ok(mut chunk) = self.producer.write_chunk(n) else {
                continue;
            };
            let (first, second) = chunk.as_mut_slices();
            let split = first.len();
            first.copy_from_slice(&remaining[..split]);
            second.copy_from_slice(&remaining[split..n]);
            chunk.commit_all();

            remaining = &remaining[n..];
            last_progress = Instant::now();
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<i16>,
    errors: LatchedError,
) -> Result<Stream, EngineError>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let mut underruns: u64 = 0;
    let mut next_report = SAMPLE_RATE as u64;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = match consumer.pop() {
                        Ok(sample) => sample,
                        Err(_) => {
                            underruns += 1;
                            0
                        }
                    };
                    // mono to every channel
                    let value = T::from_sample(value);
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
                if underruns >= next_report {
                    warn!("Audio underrun: {} samples of silence so far", underruns);
                    next_report = underrun_report_after(underruns);
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
                if let Ok(mut latched) = errors.lock() {
                    latched.get_or_insert_with(|| err.to_string());
                }
            },
            None,
        )
        .map_err(|e| EngineError::StreamCreate(e.to_string()))
}

/// Next underrun count worth a warning: the following whole second.
fn underrun_report_after(underruns: u64) -> u64 {
    let second = SAMPLE_RATE as u64;
    (underruns / second + 1) * second
}
