//! Crowd-noise detection.
//!
//! Finds moments where the audio gets much louder than usual and turns them
//! into clip intervals. Every stage is a pure function over immutable input.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ AudioSignal  │───►│ Envelope     │───►│ Spikes       │───►│ Resolver     │
//! │ (mono f32)   │    │ (RMS/window) │    │ (vs. median) │    │ (intervals)  │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cclip_media::crowd_detection::{analyze_signal, DetectionConfig};
//!
//! let analysis = analyze_signal(&signal, &DetectionConfig::default(), &run_config)?;
//! for clip in &analysis.clips {
//!     println!("{:.1}s - {:.1}s", clip.start, clip.end);
//! }
//! ```

mod config;
mod envelope;
mod resolver;
mod spikes;

use cclip_models::{AudioSignal, ClipInterval, RunConfig};
use thiserror::Error;
use tracing::debug;

pub use config::DetectionConfig;
pub use envelope::{compute_envelope, EnergyEnvelope, EnergyFrame};
pub use resolver::resolve_clips;
pub use spikes::{detect_spikes, drop_short_spikes, merge_nearby_spikes, Spike};

/// Errors from the detection stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("audio signal contains no samples")]
    EmptyInput,

    #[error("{name} must be a positive number of seconds, got {value}")]
    InvalidWindow { name: &'static str, value: f64 },

    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,
}

/// Result type for detection operations.
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Everything the detector learned about one signal.
#[derive(Debug, Clone)]
pub struct CrowdAnalysis {
    pub envelope: EnergyEnvelope,
    pub baseline: f64,
    pub spikes: Vec<Spike>,
    pub clips: Vec<ClipInterval>,
    pub duration_secs: f64,
}

/// Run envelope, spike detection and clip resolution over one signal.
pub fn analyze_signal(
    signal: &AudioSignal,
    detection: &DetectionConfig,
    run: &RunConfig,
) -> DetectionResult<CrowdAnalysis> {
    let envelope = compute_envelope(signal, detection.window_secs, detection.hop_secs)?;
    let baseline = envelope.baseline();
    let spikes = detect_spikes(&envelope, run.threshold);
    let spikes = drop_short_spikes(spikes, run.min_spike_duration);
    let spikes = merge_nearby_spikes(spikes, run.merge_gap);
    let duration_secs = signal.duration_secs();
    let clips = resolve_clips(&spikes, &envelope, run, duration_secs);

    debug!(
        frames = envelope.len(),
        baseline = format!("{:.5}", baseline),
        spikes = spikes.len(),
        clips = clips.len(),
        "Crowd analysis complete"
    );

    Ok(CrowdAnalysis {
        envelope,
        baseline,
        spikes,
        clips,
        duration_secs,
    })
}
