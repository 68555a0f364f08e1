//! Spike detection against the median baseline.
//!
//! A frame is a candidate when it is both at least `threshold` times the
//! baseline and strictly above it. Each run of consecutive candidates becomes
//! one spike at its loudest frame; ties go to the earliest frame.
//!
//! Two optional passes refine the raw spikes: runs shorter than a minimum
//! length are dropped, and spikes separated by a small gap are merged into
//! one event.

use tracing::debug;

use super::envelope::EnergyEnvelope;

/// Peak of one loud passage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spike {
    /// Timestamp of the loudest frame, in seconds.
    pub timestamp: f64,
    /// Loudness of that frame.
    pub loudness: f64,
    /// Index of that frame in the envelope it was detected in.
    pub frame_index: usize,
    /// Timestamp of the first frame of the run.
    pub start_time: f64,
    /// Timestamp of the last frame of the run.
    pub end_time: f64,
    /// Index of the last frame of the run.
    pub end_frame: usize,
}

impl Spike {
    /// A spike covering the single frame `index`.
    pub fn at_frame(index: usize, timestamp: f64, loudness: f64) -> Self {
        Self {
            timestamp,
            loudness,
            frame_index: index,
            start_time: timestamp,
            end_time: timestamp,
            end_frame: index,
        }
    }

    /// Seconds between the first and last frame of the run (zero for one frame).
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Find loud passages in `envelope`.
///
/// Returns spikes in timestamp order; empty when nothing clears the threshold.
pub fn detect_spikes(envelope: &EnergyEnvelope, threshold: f64) -> Vec<Spike> {
    let baseline = envelope.baseline();
    let trigger = baseline * threshold;

    let mut spikes = Vec::new();
    let mut current: Option<Spike> = None;

    for (index, frame) in envelope.frames().iter().enumerate() {
        // The strict check keeps flat or silent audio (baseline == loudness) spike-free
        let is_candidate = frame.loudness >= trigger && frame.loudness > baseline;

        if !is_candidate {
            if let Some(peak) = current.take() {
                spikes.push(peak);
            }
            continue;
        }

        match current.as_mut() {
            None => current = Some(Spike::at_frame(index, frame.timestamp, frame.loudness)),
            Some(spike) => {
                if frame.loudness > spike.loudness {
                    spike.timestamp = frame.timestamp;
                    spike.loudness = frame.loudness;
                    spike.frame_index = index;
                }
                spike.end_time = frame.timestamp;
                spike.end_frame = index;
            }
        }
    }
    spikes.extend(current);

    debug!(
        baseline = format!("{:.5}", baseline),
        threshold,
        spikes = spikes.len(),
        "Spike detection complete"
    );

    spikes
}

/// Drop spikes whose run lasts less than `min_secs`.
///
/// Duration is measured between the first and last frame of the run, so a
/// single-frame spike is zero seconds long and only `min_secs == 0` keeps it.
pub fn drop_short_spikes(spikes: Vec<Spike>, min_secs: f64) -> Vec<Spike> {
    if min_secs <= 0.0 {
        return spikes;
    }
    let before = spikes.len();
    let kept: Vec<Spike> = spikes
        .into_iter()
        .filter(|spike| spike.duration() >= min_secs)
        .collect();

    debug!(min_secs, dropped = before - kept.len(), "Short spikes dropped");
    kept
}

/// Merge spikes whose runs are at most `max_gap` seconds apart.
///
/// The gap is measured from the end of one run to the start of the next. A
/// merged spike spans both runs and keeps the louder peak (the earlier one on
/// a tie). A `max_gap` of zero disables merging.
pub fn merge_nearby_spikes(spikes: Vec<Spike>, max_gap: f64) -> Vec<Spike> {
    if max_gap <= 0.0 {
        return spikes;
    }
    let before = spikes.len();
    let mut merged: Vec<Spike> = Vec::with_capacity(spikes.len());

    for spike in spikes {
        if let Some(last) = merged.last_mut() {
            if spike.start_time - last.end_time <= max_gap {
                if spike.loudness > last.loudness {
                    last.timestamp = spike.timestamp;
                    last.loudness = spike.loudness;
                    last.frame_index = spike.frame_index;
                }
                if spike.end_frame > last.end_frame {
                    last.end_time = spike.end_time;
                    last.end_frame = spike.end_frame;
                }
                continue;
            }
        }
        merged.push(spike);
    }

    debug!(max_gap, before, after = merged.len(), "Nearby spikes merged");
    merged
}
