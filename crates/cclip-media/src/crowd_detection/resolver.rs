//! Turning spikes into clip intervals.

use cclip_models::{ClipInterval, RunConfig};
use tracing::debug;

use super::envelope::EnergyEnvelope;
use super::spikes::Spike;

/// Slack for floating-point duration comparisons.
const DURATION_EPSILON: f64 = 1e-9;

/// Resolve spikes into non-overlapping clip intervals.
///
/// For each spike, in order:
/// - start `pre_roll` seconds early, never before zero
/// - end where loudness falls back to the baseline (plus `post_roll`), capped
///   at `max_duration` and the end of the video
/// - stretch to `min_duration` when the passage is shorter
/// - fold into the previous interval when they overlap and the peak still
///   fits within its `max_duration`; otherwise start right after it
/// - drop it when the video ends before `min_duration` is reached
///
/// When more than `max_clips` intervals survive, the loudest are kept (ties go
/// to the earlier one) and returned in start order.
pub fn resolve_clips(
    spikes: &[Spike],
    envelope: &EnergyEnvelope,
    config: &RunConfig,
    total_duration: f64,
) -> Vec<ClipInterval> {
    let baseline = envelope.baseline();
    let total_duration = total_duration.max(0.0);

    let mut accepted: Vec<ClipInterval> = Vec::new();
    let mut merged = 0usize;
    let mut discarded = 0usize;

    for spike in spikes {
        let mut start = (spike.timestamp - config.pre_roll).max(0.0);
        let passage_end = passage_end(envelope, spike.end_frame, baseline, total_duration);

        if let Some(prev) = accepted.last_mut() {
            if start < prev.end {
                let capped_end = prev.start + config.max_duration;
                if spike.timestamp < capped_end {
                    let end = clip_end(start, passage_end, config, total_duration);
                    prev.end = prev.end.max(end).min(capped_end);
                    if spike.loudness > prev.peak_loudness {
                        prev.peak_loudness = spike.loudness;
                        prev.peak_time = spike.timestamp;
                    }
                    merged += 1;
                    continue;
                }
                // The previous clip is full before this peak; continue after it
                start = prev.end;
            }
        }

        let end = clip_end(start, passage_end, config, total_duration);
        if end - start + DURATION_EPSILON < config.min_duration {
            discarded += 1;
            continue;
        }

        accepted.push(ClipInterval {
            start,
            end,
            peak_loudness: spike.loudness,
            peak_time: spike.timestamp,
        });
    }

    let candidates = accepted.len();
    if candidates > config.max_clips {
        accepted.sort_by(|a, b| {
            b.peak_loudness
                .total_cmp(&a.peak_loudness)
                .then(a.start.total_cmp(&b.start))
        });
        accepted.truncate(config.max_clips);
        accepted.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    debug!(
        spikes = spikes.len(),
        merged,
        discarded,
        candidates,
        kept = accepted.len(),
        "Clip boundaries resolved"
    );

    accepted
}

/// End of a clip starting at `start` for a passage calming at `passage_end`,
/// stretched to `min_duration` where the video allows.
fn clip_end(start: f64, passage_end: f64, config: &RunConfig, total_duration: f64) -> f64 {
    let end = (passage_end + config.post_roll)
        .min(start + config.max_duration)
        .min(total_duration);
    if end - start < config.min_duration {
        (start + config.min_duration).min(total_duration)
    } else {
        end
    }
}

/// Timestamp of the first frame at or after `from` that is no louder than the
/// baseline. The end of the video when the passage never calms down.
fn passage_end(envelope: &EnergyEnvelope, from: usize, baseline: f64, total_duration: f64) -> f64 {
    envelope
        .frames()
        .iter()
        .skip(from)
        .find(|frame| frame.loudness <= baseline)
        .map(|frame| frame.timestamp)
        .unwrap_or(total_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crowd_detection::detect_spikes;

    const HOP: f64 = 0.5;

    fn spike_at(envelope: &EnergyEnvelope, index: usize) -> Spike {
        let frame = envelope.frames()[index];
        Spike::at_frame(index, frame.timestamp, frame.loudness)
    }

    /// `len` frames at 1.0 with the listed `(index, loudness)` overrides.
    fn envelope(len: usize, loud: &[(usize, f64)]) -> EnergyEnvelope {
        let mut values = vec![1.0; len];
        for &(i, v) in loud {
            values[i] = v;
        }
        EnergyEnvelope::from_loudness(&values, HOP)
    }

    fn total(envelope: &EnergyEnvelope) -> f64 {
        envelope.len() as f64 * HOP
    }

    fn assert_well_formed(clips: &[ClipInterval], config: &RunConfig) {
        for clip in clips {
            assert!(clip.start >= 0.0);
            assert!(clip.duration() + DURATION_EPSILON >= config.min_duration, "{clip:?}");
            assert!(clip.duration() <= config.max_duration + DURATION_EPSILON, "{clip:?}");
        }
        for (i, a) in clips.iter().enumerate() {
            for b in clips.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                assert!(a.start < b.start);
            }
        }
    }

    #[test]
    fn test_burst_scenario() {
        let loud: Vec<(usize, f64)> = (40..=45).map(|i| (i, 5.0)).collect();
        let env = envelope(100, &loud);
        let spikes = detect_spikes(&env, 2.0);
        let config = RunConfig::default();

        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_eq!(clips.len(), 1);

        // Spike at 20.0s, passage calms at frame 46 (23.0s), stretched to min duration
        let clip = clips[0];
        assert!((clip.start - 18.5).abs() < 1e-9);
        assert!((clip.end - 23.5).abs() < 1e-9);
        assert!((clip.peak_time - 20.0).abs() < 1e-9);
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_pre_roll_clamped_at_zero() {
        let env = envelope(100, &[(1, 5.0)]);
        let spike = spike_at(&env, 1);
        assert!((spike.timestamp - 0.5).abs() < 1e-9);

        let config = RunConfig::default().with_pre_roll(1.5);
        let clips = resolve_clips(&[spike], &env, &config, total(&env));
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].start, 0.0);
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_long_passage_capped_at_max() {
        let loud: Vec<(usize, f64)> = (20..60).map(|i| (i, 5.0)).collect();
        let env = envelope(100, &loud);
        let config = RunConfig::default();

        let clips = resolve_clips(&[spike_at(&env, 20)], &env, &config, total(&env));
        assert_eq!(clips.len(), 1);
        assert!((clips[0].duration() - config.max_duration).abs() < 1e-9);
    }

    #[test]
    fn test_post_roll_extends_end() {
        let loud: Vec<(usize, f64)> = (40..56).map(|i| (i, 5.0)).collect();
        let env = envelope(100, &loud);

        let plain = resolve_clips(&[spike_at(&env, 40)], &env, &RunConfig::default(), total(&env));
        let padded = resolve_clips(
            &[spike_at(&env, 40)],
            &env,
            &RunConfig::default().with_post_roll(2.0),
            total(&env),
        );
        // Passage ends at frame 56 (28.0s)
        assert!((plain[0].end - 28.0).abs() < 1e-9);
        assert!((padded[0].end - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlapping_spikes_merge() {
        let env = envelope(100, &[(40, 5.0), (44, 8.0)]);
        let spikes = detect_spikes(&env, 2.0);
        assert_eq!(spikes.len(), 2);

        let config = RunConfig::default();
        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_eq!(clips.len(), 1);
        assert!((clips[0].peak_loudness - 8.0).abs() < f64::EPSILON);
        assert!((clips[0].peak_time - 22.0).abs() < 1e-9);
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_merge_respects_max_duration() {
        let loud: Vec<(usize, f64)> = [10, 30, 50, 70].iter().map(|&i| (i, 5.0)).collect();
        let env = envelope(120, &loud);
        let spikes = detect_spikes(&env, 2.0);
        let config = RunConfig::default()
            .with_durations(12.0, 15.0)
            .with_pre_roll(0.0);

        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_clip_near_end_discarded() {
        let env = envelope(100, &[(98, 5.0)]);
        let config = RunConfig::default().with_pre_roll(0.5);

        // Spike at 49.0s of a 50.0s video: at most 1.5s available
        let clips = resolve_clips(&[spike_at(&env, 98)], &env, &config, total(&env));
        assert!(clips.is_empty());
    }

    #[test]
    fn test_clip_near_end_clamped_when_long_enough() {
        let env = envelope(100, &[(90, 5.0)]);
        let config = RunConfig::default().with_pre_roll(1.5);

        let clips = resolve_clips(&[spike_at(&env, 90)], &env, &config, total(&env));
        assert_eq!(clips.len(), 1);
        assert!(clips[0].end <= 50.0 + 1e-9);
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_cap_keeps_loudest() {
        let loud = [(10, 3.0), (50, 9.0), (90, 4.0), (130, 7.0), (170, 5.0)];
        let env = envelope(200, &loud);
        let spikes = detect_spikes(&env, 2.0);
        assert_eq!(spikes.len(), 5);

        let config = RunConfig::default().with_max_clips(3);
        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_eq!(clips.len(), 3);

        let peaks: Vec<f64> = clips.iter().map(|c| c.peak_loudness).collect();
        assert_eq!(peaks, vec![9.0, 7.0, 5.0]);
        assert_well_formed(&clips, &config);
    }

    #[test]
    fn test_cap_tie_prefers_earlier() {
        let loud = [(10, 6.0), (50, 6.0), (90, 6.0)];
        let env = envelope(120, &loud);
        let spikes = detect_spikes(&env, 2.0);

        let config = RunConfig::default().with_max_clips(2);
        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        let peak_times: Vec<f64> = clips.iter().map(|c| c.peak_time).collect();
        assert_eq!(peak_times, vec![5.0, 25.0]);
    }

    #[test]
    fn test_spike_past_full_clip_gets_own_clip() {
        // A 15s passage fills the first clip; a louder burst follows one quiet frame later
        let mut loud: Vec<(usize, f64)> = (0..30).map(|i| (i, 5.0)).collect();
        loud.extend((31..36).map(|i| (i, 9.0)));
        let env = envelope(100, &loud);
        let spikes = detect_spikes(&env, 2.0);
        let stamps: Vec<f64> = spikes.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 15.5]);

        let config = RunConfig::default();
        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_well_formed(&clips, &config);
        for spike in &spikes {
            assert!(
                clips
                    .iter()
                    .any(|c| c.start <= spike.timestamp && spike.timestamp < c.end),
                "spike at {} not covered by {clips:?}",
                spike.timestamp
            );
        }

        assert_eq!(clips.len(), 2);
        assert!((clips[0].end - 15.0).abs() < 1e-9);
        assert!((clips[1].start - 15.0).abs() < 1e-9);
        assert!((clips[1].peak_time - 15.5).abs() < 1e-9);
    }

    #[test]
    fn test_merged_spike_extends_to_last_run() {
        let env = envelope(100, &[(40, 8.0), (41, 8.0), (48, 5.0)]);
        let spikes = crate::crowd_detection::merge_nearby_spikes(detect_spikes(&env, 2.0), 4.0);
        assert_eq!(spikes.len(), 1);
        assert_eq!(spikes[0].frame_index, 40);

        let config = RunConfig::default().with_durations(1.0, 15.0).with_pre_roll(0.0);
        let clips = resolve_clips(&spikes, &env, &config, total(&env));
        assert_eq!(clips.len(), 1);
        // Peak at 20.0s; the merged run calms only at frame 49 (24.5s)
        assert!((clips[0].start - 20.0).abs() < 1e-9);
        assert!((clips[0].end - 24.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_spikes_no_clips() {
        let env = envelope(100, &[]);
        assert!(resolve_clips(&[], &env, &RunConfig::default(), total(&env)).is_empty());
    }

    #[test]
    fn test_dense_spikes_stay_well_formed() {
        let loud: Vec<(usize, f64)> = (0..400)
            .step_by(7)
            .map(|i| (i, 2.0 + (i % 5) as f64))
            .collect();
        let env = envelope(400, &loud);
        let spikes = detect_spikes(&env, 2.0);

        for config in [
            RunConfig::default(),
            RunConfig::default().with_durations(3.0, 4.0).with_max_clips(4),
            RunConfig::default().with_pre_roll(0.0).with_post_roll(5.0),
        ] {
            let clips = resolve_clips(&spikes, &env, &config, total(&env));
            assert!(clips.len() <= config.max_clips);
            assert_well_formed(&clips, &config);
        }
    }
}
