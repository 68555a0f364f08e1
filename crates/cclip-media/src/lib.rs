//! FFmpeg CLI wrapper and crowd-noise detection.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A runner with timeouts and stderr capture
//! - FFprobe stream inspection
//! - Audio decoding to mono f32 samples and clip cutting
//! - The `MediaBackend` capability trait the pipeline is written against
//! - Pure crowd-noise detection: energy envelope, spikes, clip boundaries

pub mod audio;
pub mod backend;
pub mod clip;
pub mod command;
pub mod crowd_detection;
pub mod error;
pub mod probe;

pub use audio::{load_audio, AudioExtractOptions, DEFAULT_ANALYSIS_SAMPLE_RATE};
pub use backend::{FfmpegBackend, MediaBackend};
pub use clip::extract_clip;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use crowd_detection::{
    compute_envelope, detect_spikes, drop_short_spikes, merge_nearby_spikes, resolve_clips,
    DetectionConfig, DetectionError, EnergyEnvelope, EnergyFrame, Spike,
};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, MediaInfo};
