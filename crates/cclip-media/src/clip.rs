//! Clip cutting.
//!
//! A clip is first written to a hidden `.partial` sibling of the target and
//! renamed into place only after FFmpeg succeeds, so a failed or killed cut
//! never leaves a truncated file under the final name.

use std::path::{Path, PathBuf};

use cclip_models::CutMode;
use tracing::{debug, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Cut `[start_secs, end_secs)` out of `input` into `output`.
///
/// # Errors
/// - `InvalidRange` when the range is empty or starts before zero
/// - `FfmpegFailed` / `Timeout` from the FFmpeg run
/// - `Io` when the finished file cannot be moved into place
pub async fn extract_clip(
    input: &Path,
    start_secs: f64,
    end_secs: f64,
    output: &Path,
    mode: &CutMode,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    if !(start_secs >= 0.0 && end_secs > start_secs) {
        return Err(MediaError::InvalidRange {
            start: start_secs,
            end: end_secs,
        });
    }
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    let partial = partial_path(output);
    let cmd = build_cut_command(input, start_secs, end_secs, &partial, mode);

    debug!(
        input = %input.display(),
        output = %output.display(),
        start = start_secs,
        end = end_secs,
        reencode = mode.is_reencode(),
        "Cutting clip"
    );

    if let Err(e) = runner.run(&cmd).await {
        if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %partial.display(), "Failed to remove partial clip: {}", cleanup);
            }
        }
        return Err(e);
    }

    tokio::fs::rename(&partial, output).await?;

    debug!(
        output = %output.display(),
        duration = format!("{:.2}s", end_secs - start_secs),
        "Clip renamed into place"
    );
    Ok(())
}

/// Build the FFmpeg invocation for one cut.
fn build_cut_command(
    input: &Path,
    start_secs: f64,
    end_secs: f64,
    output: &Path,
    mode: &CutMode,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(end_secs - start_secs);

    match mode {
        CutMode::StreamCopy => cmd
            .codec_copy()
            .output_args(["-avoid_negative_ts", "make_zero"]),
        CutMode::Reencode(encoding) => cmd
            .video_codec(&encoding.codec)
            .preset(&encoding.preset)
            .crf(encoding.crf)
            .audio_codec(&encoding.audio_codec)
            .audio_bitrate(&encoding.audio_bitrate),
    }
}

/// Hidden sibling path used while FFmpeg is writing.
///
/// The extension is kept so FFmpeg still infers the container from it.
fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());
    let name = match output.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    output.with_file_name(name)
}
