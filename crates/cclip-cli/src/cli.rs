//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cclip_models::config::{
    DEFAULT_MAX_CLIPS, DEFAULT_MAX_DURATION_SECS, DEFAULT_MERGE_GAP_SECS,
    DEFAULT_MIN_DURATION_SECS, DEFAULT_MIN_SPIKE_DURATION_SECS, DEFAULT_OUTPUT_DIR,
    DEFAULT_POST_ROLL_SECS, DEFAULT_PRE_ROLL_SECS, DEFAULT_THRESHOLD,
};
use cclip_models::{CutMode, EncodingConfig, RunConfig};

use crate::config::{default_jobs, ExtractionOptions, DEFAULT_FFMPEG_TIMEOUT_SECS};

/// Find crowd reactions in a video and cut them into clips.
#[derive(Debug, Parser)]
#[command(name = "crowd-clipper", version, about, long_about = None)]
pub struct Cli {
    /// Input video file.
    #[arg(env = "CCLIP_VIDEO")]
    pub video: PathBuf,

    /// Directory clips are written into (created if absent).
    #[arg(short, long, env = "CCLIP_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Spike multiplier over the median loudness.
    #[arg(short, long, env = "CCLIP_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Seconds to include before each spike.
    #[arg(long, env = "CCLIP_PRE_ROLL", default_value_t = DEFAULT_PRE_ROLL_SECS)]
    pub pre_roll: f64,

    /// Seconds to keep after the loud passage ends.
    #[arg(long, env = "CCLIP_POST_ROLL", default_value_t = DEFAULT_POST_ROLL_SECS)]
    pub post_roll: f64,

    /// Ignore loud passages shorter than this many seconds.
    #[arg(long, env = "CCLIP_MIN_SPIKE_DURATION", default_value_t = DEFAULT_MIN_SPIKE_DURATION_SECS)]
    pub min_spike_duration: f64,

    /// Merge spikes at most this many seconds apart (0 = no merge).
    #[arg(long, env = "CCLIP_MERGE_GAP", default_value_t = DEFAULT_MERGE_GAP_SECS)]
    pub merge_gap: f64,

    /// Minimum clip length in seconds.
    #[arg(long, env = "CCLIP_MIN_DURATION", default_value_t = DEFAULT_MIN_DURATION_SECS)]
    pub min_duration: f64,

    /// Maximum clip length in seconds.
    #[arg(long, env = "CCLIP_MAX_DURATION", default_value_t = DEFAULT_MAX_DURATION_SECS)]
    pub max_duration: f64,

    /// Maximum number of clips; the loudest are kept.
    #[arg(short = 'n', long, env = "CCLIP_MAX_CLIPS", default_value_t = DEFAULT_MAX_CLIPS)]
    pub max_clips: usize,

    /// Re-encode clips (libx264/aac) for frame-accurate cuts.
    #[arg(long, env = "CCLIP_REENCODE")]
    pub reencode: bool,

    /// Band-pass the audio to 500-4000 Hz before analysis.
    #[arg(long, env = "CCLIP_CROWD_FILTER")]
    pub crowd_filter: bool,

    /// Replace existing clip files instead of picking a free name.
    #[arg(long, env = "CCLIP_OVERWRITE")]
    pub overwrite: bool,

    /// Detect and list clips without cutting anything.
    #[arg(long, env = "CCLIP_DRY_RUN")]
    pub dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long, env = "CCLIP_REPORT")]
    pub report: Option<PathBuf>,

    /// Parallel FFmpeg cuts [default: CPU cores, at most 4].
    #[arg(short, long, env = "CCLIP_JOBS", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Timeout per FFmpeg invocation, in seconds.
    #[arg(
        long,
        env = "CCLIP_FFMPEG_TIMEOUT",
        default_value_t = DEFAULT_FFMPEG_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub ffmpeg_timeout: u64,

    /// Debug logging and per-file listing.
    #[arg(short, long, env = "CCLIP_VERBOSE")]
    pub verbose: bool,
}

impl Cli {
    /// Detection and resolution parameters. Not yet validated.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::default()
            .with_threshold(self.threshold)
            .with_pre_roll(self.pre_roll)
            .with_post_roll(self.post_roll)
            .with_min_spike_duration(self.min_spike_duration)
            .with_merge_gap(self.merge_gap)
            .with_durations(self.min_duration, self.max_duration)
            .with_max_clips(self.max_clips)
            .with_output_dir(&self.output_dir)
    }

    /// Output handling.
    pub fn extraction_options(&self) -> ExtractionOptions {
        let cut_mode = if self.reencode {
            CutMode::Reencode(EncodingConfig::default())
        } else {
            CutMode::StreamCopy
        };

        ExtractionOptions {
            overwrite: self.overwrite,
            jobs: self.jobs.map(usize::from).unwrap_or_else(default_jobs),
            ffmpeg_timeout: Duration::from_secs(self.ffmpeg_timeout),
            cut_mode,
            dry_run: self.dry_run,
            report: self.report.clone(),
            ..Default::default()
        }
    }
}
