//! Clip interval model.

use serde::{Deserialize, Serialize};

/// A time range of the source video to export as one clip.
///
/// Produced by the clip boundary resolver, consumed once by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipInterval {
    /// Start time in seconds (never negative).
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Loudest envelope value inside the interval.
    pub peak_loudness: f64,
    /// Timestamp of that loudest value.
    pub peak_time: f64,
}

impl ClipInterval {
    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether two intervals share any time (touching endpoints do not count).
    pub fn overlaps(&self, other: &ClipInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}
