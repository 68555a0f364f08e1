//! Extraction and analysis configuration.

use std::path::PathBuf;
use std::time::Duration;

use cclip_media::{AudioExtractOptions, DetectionConfig, DEFAULT_ANALYSIS_SAMPLE_RATE};
use cclip_models::CutMode;

/// Default FFmpeg timeout per invocation.
pub const DEFAULT_FFMPEG_TIMEOUT_SECS: u64 = 300;

/// Upper bound for the default number of parallel cuts.
const MAX_DEFAULT_JOBS: usize = 4;

/// How clips are written.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Replace existing files instead of picking a free name
    pub overwrite: bool,
    /// Maximum concurrent FFmpeg cuts
    pub jobs: usize,
    /// Timeout per FFmpeg invocation
    pub ffmpeg_timeout: Duration,
    /// Stream copy or re-encode
    pub cut_mode: CutMode,
    /// Detect and report only, write nothing
    pub dry_run: bool,
    /// Where to write the JSON run report
    pub report: Option<PathBuf>,
    /// Retries for a timed-out cut
    pub max_retries: u32,
    /// Base backoff delay between retries
    pub retry_delay: Duration,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            jobs: default_jobs(),
            ffmpeg_timeout: Duration::from_secs(DEFAULT_FFMPEG_TIMEOUT_SECS),
            cut_mode: CutMode::default(),
            dry_run: false,
            report: None,
            max_retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Available CPU cores, capped at 4.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_JOBS)
}

/// Analysis knobs that have no command-line flag.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Envelope window/hop
    pub detection: DetectionConfig,
    /// Decode sample rate in Hz
    pub sample_rate: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            sample_rate: DEFAULT_ANALYSIS_SAMPLE_RATE,
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    ///
    /// - `CCLIP_WINDOW_SECS`: RMS window length
    /// - `CCLIP_HOP_SECS`: hop between windows
    /// - `CCLIP_SAMPLE_RATE`: decode sample rate
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            detection: DetectionConfig {
                window_secs: std::env::var("CCLIP_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.detection.window_secs),
                hop_secs: std::env::var("CCLIP_HOP_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.detection.hop_secs),
            },
            sample_rate: std::env::var("CCLIP_SAMPLE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&rate: &u32| rate > 0)
                .unwrap_or(defaults.sample_rate),
        }
    }

    /// Decode options for the FFmpeg backend.
    pub fn audio_options(&self, crowd_filter: bool, timeout: Duration) -> AudioExtractOptions {
        AudioExtractOptions {
            sample_rate: self.sample_rate,
            crowd_filter,
            timeout_secs: Some(timeout.as_secs()),
        }
    }
}
