//! Run configuration.
//!
//! One immutable bundle of the user-tunable parameters, built once from the
//! command line and validated before any media is touched.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default spike multiplier over the baseline loudness.
pub const DEFAULT_THRESHOLD: f64 = 2.0;
/// Default seconds of lead-in before a spike.
pub const DEFAULT_PRE_ROLL_SECS: f64 = 1.5;
/// Default seconds kept after the loud passage ends.
pub const DEFAULT_POST_ROLL_SECS: f64 = 0.0;
/// Default minimum clip length.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 5.0;
/// Default maximum clip length.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 15.0;
/// Default shortest loud run that counts as a spike (0 keeps every run).
pub const DEFAULT_MIN_SPIKE_DURATION_SECS: f64 = 0.0;
/// Default gap within which spikes merge (0 disables merging).
pub const DEFAULT_MERGE_GAP_SECS: f64 = 0.0;
/// Default cap on the number of clips.
pub const DEFAULT_MAX_CLIPS: usize = 10;
/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./clips";

/// Invalid run configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),

    #[error("{name} must be zero or positive, got {value}")]
    NegativeSeconds { name: &'static str, value: f64 },

    #[error("{name} must be greater than zero, got {value}")]
    NonPositiveDuration { name: &'static str, value: f64 },

    #[error("min duration ({min}s) exceeds max duration ({max}s)")]
    MinExceedsMax { min: f64, max: f64 },

    #[error("max clips must be at least 1")]
    ZeroMaxClips,
}

/// Parameters for spike detection and clip resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Multiplier over the median baseline a window must reach to count as a spike.
    ///
    /// - 1.5: sensitive, picks up moderate reactions
    /// - 2.0: default, "twice the usual loudness"
    /// - 3.0+: only the loudest moments
    pub threshold: f64,

    /// Seconds to include before each spike (captures the setup).
    pub pre_roll: f64,

    /// Seconds to include after the loud passage dies down.
    pub post_roll: f64,

    /// Loud runs shorter than this many seconds are ignored.
    #[serde(default)]
    pub min_spike_duration: f64,

    /// Spikes whose runs are at most this many seconds apart merge into one.
    #[serde(default)]
    pub merge_gap: f64,

    /// Shortest clip worth exporting, in seconds.
    pub min_duration: f64,

    /// Longest clip to export, in seconds.
    pub max_duration: f64,

    /// Maximum number of clips; the loudest ones win.
    pub max_clips: usize,

    /// Directory clips are written into.
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            pre_roll: DEFAULT_PRE_ROLL_SECS,
            post_roll: DEFAULT_POST_ROLL_SECS,
            min_spike_duration: DEFAULT_MIN_SPIKE_DURATION_SECS,
            merge_gap: DEFAULT_MERGE_GAP_SECS,
            min_duration: DEFAULT_MIN_DURATION_SECS,
            max_duration: DEFAULT_MAX_DURATION_SECS,
            max_clips: DEFAULT_MAX_CLIPS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl RunConfig {
    /// Builder-style setter for the spike threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder-style setter for pre-roll seconds.
    pub fn with_pre_roll(mut self, secs: f64) -> Self {
        self.pre_roll = secs;
        self
    }

    /// Builder-style setter for post-roll seconds.
    pub fn with_post_roll(mut self, secs: f64) -> Self {
        self.post_roll = secs;
        self
    }

    /// Builder-style setter for the minimum spike length.
    pub fn with_min_spike_duration(mut self, secs: f64) -> Self {
        self.min_spike_duration = secs;
        self
    }

    /// Builder-style setter for the spike merge gap.
    pub fn with_merge_gap(mut self, secs: f64) -> Self {
        self.merge_gap = secs;
        self
    }

    /// Builder-style setter for both duration bounds.
    pub fn with_durations(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_duration = min_secs;
        self.max_duration = max_secs;
        self
    }

    /// Builder-style setter for the clip cap.
    pub fn with_max_clips(mut self, max_clips: usize) -> Self {
        self.max_clips = max_clips;
        self
    }

    /// Builder-style setter for the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Check every parameter, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        for (name, value) in [
            ("pre-roll", self.pre_roll),
            ("post-roll", self.post_roll),
            ("min spike duration", self.min_spike_duration),
            ("merge gap", self.merge_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeSeconds { name, value });
            }
        }

        for (name, value) in [
            ("min duration", self.min_duration),
            ("max duration", self.max_duration),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveDuration { name, value });
            }
        }

        if self.min_duration > self.max_duration {
            return Err(ConfigError::MinExceedsMax {
                min: self.min_duration,
                max: self.max_duration,
            });
        }

        if self.max_clips == 0 {
            return Err(ConfigError::ZeroMaxClips);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.threshold - 2.0).abs() < f64::EPSILON);
        assert!((config.pre_roll - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.max_clips, 10);
        assert_eq!(config.output_dir, PathBuf::from("./clips"));
    }

    #[test]
    fn test_min_exceeds_max() {
        let config = RunConfig::default().with_durations(20.0, 10.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MinExceedsMax {
                min: 20.0,
                max: 10.0
            })
        );
    }

    #[test]
    fn test_negative_threshold() {
        let config = RunConfig::default().with_threshold(-1.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(-1.0)));

        let config = RunConfig::default().with_threshold(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_zero_max_clips() {
        let config = RunConfig::default().with_max_clips(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxClips));
    }

    #[test]
    fn test_negative_pre_roll() {
        let config = RunConfig::default().with_pre_roll(-0.5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeSeconds { name: "pre-roll", .. })
        ));
    }

    #[test]
    fn test_spike_refinements() {
        let config = RunConfig::default();
        assert_eq!(config.min_spike_duration, 0.0);
        assert_eq!(config.merge_gap, 0.0);

        let config = RunConfig::default()
            .with_min_spike_duration(0.5)
            .with_merge_gap(2.0);
        assert!(config.validate().is_ok());

        let config = RunConfig::default().with_merge_gap(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeSeconds { name: "merge gap", .. })
        ));

        let config = RunConfig::default().with_min_spike_duration(f64::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeSeconds { name: "min spike duration", .. })
        ));
    }

    #[test]
    fn test_equal_durations_allowed() {
        let config = RunConfig::default().with_durations(8.0, 8.0);
        assert!(config.validate().is_ok());
    }
}
