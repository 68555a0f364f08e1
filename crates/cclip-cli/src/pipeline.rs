//! End-to-end clipping run.
//!
//! Stages run in order; each consumes the previous stage's output:
//!
//! 1. validate configuration (before touching any file)
//! 2. decode the audio track
//! 3. envelope, spikes and clip boundaries
//! 4. create the output directory and plan file names
//! 5. cut clips with bounded parallelism
//! 6. summarize (and optionally write the JSON report)

use std::path::Path;

use cclip_media::crowd_detection::analyze_signal;
use cclip_media::{DetectionConfig, MediaBackend};
use cclip_models::{format_seconds, RunConfig};
use tracing::Instrument;

use crate::config::ExtractionOptions;
use crate::error::{ClipperError, ClipperResult};
use crate::extraction::{extract_all, ClipJob};
use crate::logging::RunLogger;
use crate::naming::plan_output_paths;
use crate::report::{ClipOutcome, ClipStatus, RunSummary};

/// Run detection and extraction for one video.
///
/// # Errors
/// - `Configuration` / `Detection` for invalid settings, before any IO
/// - `InputNotFound`, `MediaRead`, `EmptyInput` when the audio cannot be analyzed
/// - `OutputDir` when the output directory cannot be created
/// - `Report` when the report cannot be written
/// - `AllClipsFailed` when clips were attempted and none was written
pub async fn run_pipeline<B>(
    backend: &B,
    video: &Path,
    run: &RunConfig,
    detection: &DetectionConfig,
    extraction: &ExtractionOptions,
) -> ClipperResult<RunSummary>
where
    B: MediaBackend + ?Sized,
{
    run.validate()?;
    detection.validate().map_err(ClipperError::from_detection)?;

    let logger = RunLogger::new(video);
    let span = logger.create_span();
    execute(backend, video, run, detection, extraction, &logger)
        .instrument(span)
        .await
}

async fn execute<B>(
    backend: &B,
    video: &Path,
    run: &RunConfig,
    detection: &DetectionConfig,
    extraction: &ExtractionOptions,
    logger: &RunLogger,
) -> ClipperResult<RunSummary>
where
    B: MediaBackend + ?Sized,
{
    if !video.exists() {
        return Err(ClipperError::InputNotFound(video.to_path_buf()));
    }

    logger.log_start(&format!(
        "threshold {:.2}, clips {:.1}-{:.1}s, max {}",
        run.threshold, run.min_duration, run.max_duration, run.max_clips
    ));

    let signal = backend
        .load_audio(video)
        .await
        .map_err(ClipperError::from_read)?;
    logger.log_progress(&format!(
        "Decoded {} of audio at {} Hz",
        format_seconds(signal.duration_secs()),
        signal.sample_rate()
    ));

    let analysis = analyze_signal(&signal, detection, run).map_err(ClipperError::from_detection)?;
    drop(signal);
    logger.log_progress(&format!(
        "Baseline {:.5}, {} spike(s), {} clip(s)",
        analysis.baseline,
        analysis.spikes.len(),
        analysis.clips.len()
    ));

    let mut summary = RunSummary {
        video: video.to_path_buf(),
        output_dir: run.output_dir.clone(),
        duration_secs: analysis.duration_secs,
        baseline: analysis.baseline,
        spikes: analysis.spikes.len(),
        dry_run: extraction.dry_run,
        clips: Vec::new(),
    };

    if !extraction.dry_run {
        tokio::fs::create_dir_all(&run.output_dir)
            .await
            .map_err(|source| ClipperError::OutputDir {
                path: run.output_dir.clone(),
                source,
            })?;
    }

    let paths = plan_output_paths(&run.output_dir, &analysis.clips, extraction.overwrite);
    let jobs: Vec<ClipJob> = analysis
        .clips
        .iter()
        .zip(paths)
        .enumerate()
        .map(|(index, (interval, output))| ClipJob {
            index,
            interval: *interval,
            output,
        })
        .collect();

    summary.clips = if extraction.dry_run {
        jobs.into_iter()
            .map(|job| ClipOutcome {
                index: job.index,
                interval: job.interval,
                path: job.output,
                status: ClipStatus::Planned,
            })
            .collect()
    } else {
        extract_all(backend, video, jobs, extraction, logger).await
    };

    if let Some(report) = &extraction.report {
        summary.write_json(report)?;
    }

    if summary.all_failed() {
        logger.log_error("No clip could be written");
        return Err(ClipperError::AllClipsFailed {
            failed: summary.failed(),
        });
    }
    if summary.failed() > 0 {
        logger.log_warning(&format!(
            "{} of {} clip(s) failed",
            summary.failed(),
            summary.clips.len()
        ));
    }

    logger.log_completion(&format!(
        "{} clip(s) written, {} failed",
        summary.succeeded(),
        summary.failed()
    ));

    Ok(summary)
}
