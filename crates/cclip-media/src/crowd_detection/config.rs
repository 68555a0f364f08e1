//! Configuration for envelope analysis.

use serde::{Deserialize, Serialize};

use super::{DetectionError, DetectionResult};

/// Window/hop sizes for the loudness envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Length of each RMS window in seconds.
    ///
    /// - 20-30ms: very responsive, noisy envelope
    /// - Default (50ms): smooth enough for crowd swells
    /// - 100ms+: coarse, may blur short cheers
    pub window_secs: f64,

    /// Distance between window starts in seconds. Half the window gives 50% overlap.
    pub hop_secs: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_secs: 0.050,
            hop_secs: 0.025,
        }
    }
}

impl DetectionConfig {
    /// Builder-style setter for the window length.
    pub fn with_window_secs(mut self, secs: f64) -> Self {
        self.window_secs = secs;
        self
    }

    /// Builder-style setter for the hop length.
    pub fn with_hop_secs(mut self, secs: f64) -> Self {
        self.hop_secs = secs;
        self
    }

    /// Both lengths must be positive and finite.
    pub fn validate(&self) -> DetectionResult<()> {
        for (name, value) in [("window", self.window_secs), ("hop", self.hop_secs)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DetectionError::InvalidWindow { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_half_overlap() {
        let config = DetectionConfig::default();
        assert!((config.window_secs - 2.0 * config.hop_secs).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DetectionConfig::default()
            .with_window_secs(0.1)
            .with_hop_secs(0.1);
        assert!((config.window_secs - 0.1).abs() < f64::EPSILON);
        assert!((config.hop_secs - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate() {
        assert!(DetectionConfig::default().validate().is_ok());
        assert!(matches!(
            DetectionConfig::default().with_hop_secs(-1.0).validate(),
            Err(DetectionError::InvalidWindow { name: "hop", .. })
        ));
    }
}
