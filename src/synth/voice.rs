use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use crate::dsp::envelope::EnvelopeSettings;
use crate::dsp::filter::LadderSettings;
use crate::dsp::oscillator::Wavetable;
use crate::error::{EngineError, GraphError};
use crate::graph::{
    DelayHandle, DelayNode, EnvNode, EnvelopeHandle, FilterHandle, FilterNode, Graph, NodeId,
    OscHandle, OscNode, OutputNode,
};
use crate::io::{AudioDevice, CpalDevice};
use crate::synth::config::VoiceConfig;
use crate::synth::driver::OutputDriver;

/// A monophonic two-oscillator voice and its render thread.
///
/// ```text
/// osc1 ─┐
///       ├─> envelope ─> filter ─> delay ─> output
/// osc2 ─┘
/// ```
///
/// The setters are safe to call from any thread, before or during
/// playback. Each [`start`](Self::start) builds a fresh graph, so filter
/// and delay state never carry over from one run to the next; parameter
/// values do.
pub struct Voice {
    config: VoiceConfig,
    osc1: OscHandle,
    osc2: OscHandle,
    envelope: EnvelopeHandle,
    filter: FilterHandle,
    delay: DelayHandle,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<(), EngineError>>>,
}

impl Voice {
    pub fn new(config: VoiceConfig) -> Self {
        let envelope = EnvelopeSettings::new(config.envelope_factor).with_gain(config.gain);
        Self {
            osc1: OscHandle::new(config.frequency1),
            osc2: OscHandle::new(config.frequency2),
            envelope: EnvelopeHandle::new(envelope),
            filter: FilterHandle::new(LadderSettings::new(config.cutoff_hz, config.resonance)),
            delay: DelayHandle::new(config.wet),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
            config,
        }
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    // --- parameter surface ---

    pub fn set_frequency1(&self, freq_hz: f32) {
        self.osc1.set_frequency(freq_hz);
    }

    pub fn set_frequency2(&self, freq_hz: f32) {
        self.osc2.set_frequency(freq_hz);
    }

    /// Envelope level in [0, 1]. Takes effect on the next trigger.
    pub fn set_gain(&self, gain: f32) {
        self.envelope.set_gain(gain);
    }

    pub fn set_cutoff(&self, cutoff_hz: f32) {
        self.filter.set_cutoff(cutoff_hz);
    }

    pub fn set_resonance(&self, resonance: f32) {
        self.filter.set_resonance(resonance);
    }

    /// Per-sample approach rate of the envelope, e.g.
    /// [`FACTOR_HARD`](crate::dsp::FACTOR_HARD).
    pub fn set_envelope_factor(&self, factor: f32) {
        self.envelope.set_factor(factor);
    }

    pub fn set_wet(&self, wet: f32) {
        self.delay.set_wet(wet);
    }

    pub fn trigger(&self) {
        self.envelope.trigger();
    }

    pub fn damp(&self) {
        self.envelope.damp();
    }

    pub fn frequencies(&self) -> (f32, f32) {
        (self.osc1.frequency(), self.osc2.frequency())
    }

    pub fn envelope_settings(&self) -> EnvelopeSettings {
        self.envelope.settings()
    }

    pub fn filter_settings(&self) -> LadderSettings {
        self.filter.settings()
    }

    pub fn wet(&self) -> f32 {
        self.delay.wet()
    }

    // --- rendering ---

    /// Build the voice's graph, wired to this voice's handles.
    pub fn build_graph(&self) -> Result<(Graph, NodeId), GraphError> {
        let mut graph = Graph::new();
        let osc1 = graph.add(OscNode::new(
            Wavetable::from_waveform(self.config.waveform1),
            &self.osc1,
        ));
        let osc2 = graph.add(OscNode::new(
            Wavetable::from_waveform(self.config.waveform2),
            &self.osc2,
        ));
        let env = graph.add(EnvNode::new(&self.envelope));
        let filter = graph.add(FilterNode::new(&self.filter));
        let delay = graph.add(DelayNode::new(self.config.delay_samples, &self.delay));
        let out = graph.add(OutputNode::new());

        graph.connect(osc1, env)?;
        graph.connect(osc2, env)?;
        graph.chain(&[env, filter, delay, out])?;
        Ok((graph, out))
    }

    /// A driver over a fresh graph, for rendering on the caller's thread.
    ///
    /// The driver shares this voice's parameters but not its render thread.
    pub fn driver<D: AudioDevice>(&self, device: D) -> Result<OutputDriver<D>, EngineError> {
        let (graph, root) = self.build_graph()?;
        Ok(OutputDriver::new(graph, root, device))
    }

    // --- lifecycle ---

    /// Play on the default output device.
    pub fn start_default(&mut self) -> Result<(), EngineError> {
        self.start(CpalDevice::new)
    }

    /// Spawn the render thread and open the device that `factory` makes.
    ///
    /// The device is built and opened on the render thread. This call
    /// returns once the device is open, or with the error that kept it
    /// from opening.
    pub fn start<D, F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        D: AudioDevice + 'static,
        F: FnOnce() -> D + Send + 'static,
    {
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        if let Some(finished) = self.thread.take() {
            // a previous run ended on its own and nobody collected it
            match finished.join() {
                Ok(Err(e)) => error!("Previous render thread failed: {}", e),
                Err(_) => error!("Previous render thread panicked"),
                Ok(Ok(())) => {}
            }
        }

        let (graph, root) = self.build_graph()?;
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), EngineError>>(1);

        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("spaceage-render".into())
            .spawn(move || {
                elevate_priority();

                let mut driver = OutputDriver::new(graph, root, factory());
                if let Err(e) = driver.open() {
                    flag.store(false, Ordering::Release);
                    let _ = ready_tx.send(Err(e));
                    return Ok(());
                }
                let _ = ready_tx.send(Ok(()));

                render_loop(&mut driver, &flag)
            })
            .map_err(|e| EngineError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("Voice started");
                self.running = running;
                self.thread = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Failed to open output device: {}", e);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(EngineError::RenderThreadPanicked)
            }
        }
    }

    /// Ask the render thread to finish its current tick, close the device
    /// and exit, then wait for it.
    ///
    /// Returns the error that ended the thread early, if there was one.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let handle = self.thread.take().ok_or(EngineError::NotRunning)?;
        self.running.store(false, Ordering::Release);

        let outcome = handle
            .join()
            .map_err(|_| EngineError::RenderThreadPanicked)?;
        info!("Voice stopped");
        outcome
    }

    /// Whether the render thread is alive and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(VoiceConfig::default())
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        if self.thread.is_some() {
            if let Err(e) = self.stop() {
                error!("Voice stopped with error: {}", e);
            }
        }
    }
}

fn render_loop<D: AudioDevice>(
    driver: &mut OutputDriver<D>,
    running: &AtomicBool,
) -> Result<(), EngineError> {
    let mut outcome = Ok(());
    while running.load(Ordering::Acquire) {
        if let Err(e) = driver.tick() {
            error!("Render thread stopping: {}", e);
            outcome = Err(e);
            break;
        }
    }
    running.store(false, Ordering::Release);

    let closed = driver.close();
    if let Err(e) = &closed {
        error!("Failed to close output device: {}", e);
    }
    outcome.and(closed)
}

/// Move the calling thread to real-time FIFO scheduling at top priority.
#[cfg(unix)]
fn elevate_priority() {
    // SAFETY: plain libc calls on the current thread with a zeroed, then
    // filled, sched_param that outlives the call.
    let rc = unsafe {
        let mut param: libc::sched_param = std::mem::zeroed();
        param.sched_priority = libc::sched_get_priority_max(libc::SCHED_FIFO);
        libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param)
    };
    if rc == 0 {
        debug!("Render thread running with SCHED_FIFO priority");
    } else {
        warn!(
            "Could not raise render thread priority: {}",
            std::io::Error::from_raw_os_error(rc)
        );
    }
}

#[cfg(not(unix))]
fn elevate_priority() {
    debug!("Real-time thread priority not available on this platform");
}
