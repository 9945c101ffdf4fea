//! spaceage - play the voice on the default output device
//!
//! Run with: cargo run
//! Set RUST_LOG=debug to see device and graph details.

use std::thread;
use std::time::Duration;

use spaceage::{Voice, VoiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Control-surface steps per phrase.
const STEPS: usize = 64;
const STEP: Duration = Duration::from_millis(60);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut voice = Voice::new(VoiceConfig::default());
    voice.start_default()?;

    // Stand-in for a sensor: sweep the cutoff while two detuned notes play.
    let notes = [(100.0, 100.5), (150.0, 149.0), (75.0, 75.3), (112.5, 225.0)];
    for (phrase, &(f1, f2)) in notes.iter().enumerate() {
        info!("phrase {} at {} / {} Hz", phrase + 1, f1, f2);
        voice.set_frequency1(f1);
        voice.set_frequency2(f2);
        voice.trigger();

        for step in 0..STEPS {
            let v = step as f32 / STEPS as f32;
            voice.set_cutoff(500.0 + v * 4_500.0);
            if step == STEPS * 3 / 4 {
                voice.damp();
            }
            thread::sleep(STEP);
        }
    }

    // let the delay ring out
    thread::sleep(Duration::from_secs(1));
    voice.stop()?;
    Ok(())
}
