//! FFprobe stream inspection.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// What FFprobe reports about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration in seconds (0.0 when unknown)
    pub duration: f64,
    /// Whether at least one video stream is present
    pub has_video: bool,
    /// First audio stream, if any
    pub audio: Option<AudioStreamInfo>,
}

/// The first audio stream of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

impl MediaInfo {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Probe a media file for its streams and duration.
///
/// FFprobe is killed and `MediaError::Timeout` returned if it runs longer
/// than `timeout_secs`.
pub async fn probe_media(
    path: impl AsRef<Path>,
    timeout_secs: Option<u64>,
) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let ffprobe = check_ffprobe()?;

    let mut command = Command::new(ffprobe);
    command.args([
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
    ]);
    command.arg(path);

    let output = collect_output(command, timeout_secs).await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe could not read {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Run a command to completion, capturing its output.
async fn collect_output(mut command: Command, timeout_secs: Option<u64>) -> MediaResult<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout_secs {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), command.output()).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(MediaError::Timeout(secs)),
            }
        }
        None => Ok(command.output().await?),
    }
}

/// Parse FFprobe's `-print_format json` output.
fn parse_probe_output(json: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    if probe.format.is_none() && probe.streams.is_empty() {
        return Err(MediaError::invalid_media("no format or streams reported"));
    }

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_video = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video"));

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone().unwrap_or_default(),
            sample_rate: s.sample_rate.as_ref().and_then(|r| r.parse().ok()),
            channels: s.channels,
        });

    Ok(MediaInfo {
        duration,
        has_video,
        audio,
    })
}
