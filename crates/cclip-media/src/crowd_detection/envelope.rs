//! Short-time loudness envelope.

use cclip_models::AudioSignal;

use super::{DetectionConfig, DetectionError, DetectionResult};

/// Loudness of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyFrame {
    /// Window start in seconds.
    pub timestamp: f64,
    /// RMS amplitude of the window (non-negative).
    pub loudness: f64,
}

/// RMS loudness over evenly spaced windows of one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyEnvelope {
    frames: Vec<EnergyFrame>,
    window_secs: f64,
    hop_secs: f64,
}

impl EnergyEnvelope {
    /// Build an envelope from precomputed loudness values spaced `hop_secs` apart.
    pub fn from_loudness(values: &[f64], hop_secs: f64) -> Self {
        let frames = values
            .iter()
            .enumerate()
            .map(|(i, &loudness)| EnergyFrame {
                timestamp: i as f64 * hop_secs,
                loudness,
            })
            .collect();
        Self {
            frames,
            window_secs: hop_secs,
            hop_secs,
        }
    }

    pub fn frames(&self) -> &[EnergyFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Effective window length after rounding to whole samples.
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Effective hop length after rounding to whole samples.
    pub fn hop_secs(&self) -> f64 {
        self.hop_secs
    }

    /// Median loudness; the reference level spikes are measured against.
    ///
    /// A handful of loud windows cannot drag the median up, which keeps the
    /// baseline honest in videos with only a few big moments. Zero for an
    /// empty envelope.
    pub fn baseline(&self) -> f64 {
        let values: Vec<f64> = self.frames.iter().map(|f| f.loudness).collect();
        median(&values)
    }
}

/// Compute the RMS envelope of `signal`.
///
/// Windows of `window_secs` start every `hop_secs` (both rounded to whole
/// samples). At most one trailing partial window is kept, and only if it holds
/// at least half a window of samples. A signal shorter than half a window becomes a single
/// frame spanning all of it.
///
/// # Errors
/// - `EmptyInput` for a signal without samples
/// - `InvalidWindow` for a non-positive or non-finite window or hop
/// - `ZeroSampleRate` when the signal has no sample rate
pub fn compute_envelope(
    signal: &AudioSignal,
    window_secs: f64,
    hop_secs: f64,
) -> DetectionResult<EnergyEnvelope> {
    DetectionConfig {
        window_secs,
        hop_secs,
    }
    .validate()?;
    if signal.is_empty() {
        return Err(DetectionError::EmptyInput);
    }
    if signal.sample_rate() == 0 {
        return Err(DetectionError::ZeroSampleRate);
    }

    let rate = signal.sample_rate() as f64;
    let window_len = ((window_secs * rate).round() as usize).max(1);
    let hop_len = ((hop_secs * rate).round() as usize).max(1);
    let samples = signal.samples();

    let mut frames = Vec::with_capacity(samples.len() / hop_len + 1);
    let mut start = 0usize;
    while start < samples.len() {
        let end = (start + window_len).min(samples.len());
        let len = end - start;
        if len < window_len && len * 2 < window_len {
            break;
        }
        frames.push(EnergyFrame {
            // Derived from the index so spacing never drifts
            timestamp: (frames.len() * hop_len) as f64 / rate,
            loudness: rms(&samples[start..end]),
        });
        if len < window_len {
            break;
        }
        start += hop_len;
    }

    if frames.is_empty() {
        frames.push(EnergyFrame {
            timestamp: 0.0,
            loudness: rms(samples),
        });
    }

    Ok(EnergyEnvelope {
        frames,
        window_secs: window_len as f64 / rate,
        hop_secs: hop_len as f64 / rate,
    })
}

/// Root-mean-square amplitude, accumulated in f64.
fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Median of `values`; the mean of the two middle values for an even count.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
