use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::dsp::filter::{LadderFilter, LadderSettings};
use crate::graph::node::UGen;

/// Control-side handle to a ladder filter.
///
/// Setters recompute the derived coefficients on the calling thread and
/// publish cutoff, resonance and coefficients together.
#[derive(Clone)]
pub struct FilterHandle {
    shared: Arc<ArcSwap<LadderSettings>>,
}

impl FilterHandle {
    pub fn new(settings: LadderSettings) -> Self {
        Self {
            shared: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    /// Cutoff in Hz, clamped to the filter's stable range.
    pub fn set_cutoff(&self, cutoff_hz: f32) {
        self.shared.rcu(|settings| (**settings).with_cutoff(cutoff_hz));
    }

    /// Resonance in [0, 1].
    pub fn set_resonance(&self, resonance: f32) {
        self.shared.rcu(|settings| (**settings).with_resonance(resonance));
    }

    pub fn settings(&self) -> LadderSettings {
        **self.shared.load()
    }
}

pub struct FilterNode {
    filter: LadderFilter,
    shared: Arc<ArcSwap<LadderSettings>>,
}

impl FilterNode {
    pub fn new(handle: &FilterHandle) -> Self {
        Self {
            filter: LadderFilter::with_settings(handle.settings()),
            shared: Arc::clone(&handle.shared),
        }
    }

    pub fn shared(cutoff_hz: f32, resonance: f32) -> (Self, FilterHandle) {
        let handle = FilterHandle::new(LadderSettings::new(cutoff_hz, resonance));
        (Self::new(&handle), handle)
    }
}

impl UGen for FilterNode {
    fn sync(&mut self) {
        self.filter.apply(**self.shared.load());
    }

    fn process(&mut self, buffer: &mut [f32], inputs_rendered: bool) -> bool {
        if !inputs_rendered {
            return false;
        }
        self.filter.render(buffer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::filter::{MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
    use crate::BLOCK_SIZE;

    #[test]
    fn idle_inputs_skip_processing() {
        let (mut node, _handle) = FilterNode::shared(1_000.0, 0.6);
        let mut buffer = vec![0.25f32; BLOCK_SIZE];

        node.sync();
        assert!(!node.process(&mut buffer, false));
        assert!(buffer.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn transforms_rendered_input() {
        let (mut node, _handle) = FilterNode::shared(1_000.0, 0.0);
        let mut buffer = vec![0.25f32; BLOCK_SIZE];

        node.sync();
        assert!(node.process(&mut buffer, true));
        assert!(buffer[0] < 0.25);
    }

    #[test]
    fn handle_publishes_clamped_settings() {
        let (_node, handle) = FilterNode::shared(1_000.0, 0.6);

        handle.set_cutoff(2_500.0);
        assert_eq!(handle.settings(), LadderSettings::new(2_500.0, 0.6));

        handle.set_cutoff(1.0e6);
        assert_eq!(handle.settings().cutoff_hz, MAX_CUTOFF_HZ);

        handle.set_cutoff(0.0);
        assert_eq!(handle.settings().cutoff_hz, MIN_CUTOFF_HZ);

        handle.set_resonance(0.2);
        assert_eq!(handle.settings().resonance, 0.2);
    }

    #[test]
    fn render_thread_sees_whole_snapshots() {
        let handle = FilterHandle::new(LadderSettings::new(500.0, 0.5));
        let writer = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for i in 0..2_000 {
                    handle.set_cutoff(if i % 2 == 0 { 500.0 } else { 5_000.0 });
                }
            })
        };

        let low = LadderSettings::new(500.0, 0.5);
        let high = LadderSettings::new(5_000.0, 0.5);
        for _ in 0..2_000 {
            let seen = handle.settings();
            assert!(seen == low || seen == high, "torn settings: {seen:?}");
        }
        writer.join().unwrap();
    }
}
