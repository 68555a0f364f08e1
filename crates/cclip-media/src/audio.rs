//! Audio decoding for analysis.
//!
//! This module handles:
//! 1. Checking the input has an audio stream
//! 2. Decoding it with FFmpeg to mono raw f32 PCM
//! 3. Loading the samples into an `AudioSignal`

use std::path::Path;

use cclip_models::AudioSignal;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Sample rate used for analysis. Plenty for loudness, small enough to keep
/// hour-long videos in memory.
pub const DEFAULT_ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Band-pass that keeps the range crowd cheers sit in and drops most of the
/// low-end of commentary.
pub const CROWD_BAND_FILTER: &str = "highpass=f=500,lowpass=f=4000";

/// Options for decoding audio out of a video.
#[derive(Debug, Clone)]
pub struct AudioExtractOptions {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Apply `CROWD_BAND_FILTER` while decoding
    pub crowd_filter: bool,
    /// Timeout for the FFmpeg decode, in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for AudioExtractOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_ANALYSIS_SAMPLE_RATE,
            crowd_filter: false,
            timeout_secs: None,
        }
    }
}

/// Decode the audio track of `input_path` into mono f32 samples.
///
/// # Errors
/// - `FileNotFound` if the path does not exist
/// - `NoAudioStream` if FFprobe finds no audio stream
/// - `Timeout` if probing or decoding runs past `timeout_secs`
/// - `FfmpegFailed` if decoding fails
pub async fn load_audio(input_path: &Path, options: &AudioExtractOptions) -> MediaResult<AudioSignal> {
    if !input_path.exists() {
        return Err(MediaError::FileNotFound(input_path.to_path_buf()));
    }

    let info = probe_media(input_path, options.timeout_secs).await?;
    let Some(stream) = info.audio.as_ref() else {
        return Err(MediaError::NoAudioStream(input_path.to_path_buf()));
    };

    debug!(
        path = %input_path.display(),
        codec = %stream.codec,
        source_rate = ?stream.sample_rate,
        channels = ?stream.channels,
        duration = info.duration,
        "Decoding audio for analysis"
    );

    let temp_audio = tempfile::Builder::new()
        .prefix("cclip-audio-")
        .suffix(".f32")
        .tempfile()?;

    let mut cmd = FfmpegCommand::new(input_path, temp_audio.path())
        .no_video()
        .audio_channels(1)
        .audio_sample_rate(options.sample_rate);
    if options.crowd_filter {
        cmd = cmd.audio_filter(CROWD_BAND_FILTER);
    }
    let cmd = cmd.format("f32le");

    let mut runner = FfmpegRunner::new();
    if let Some(secs) = options.timeout_secs {
        runner = runner.with_timeout(secs);
    }
    runner.run(&cmd).await?;

    let samples = load_samples(temp_audio.path()).await?;
    let signal = AudioSignal::new(samples, options.sample_rate);

    info!(
        path = %input_path.display(),
        samples = signal.len(),
        duration_secs = format!("{:.1}", signal.duration_secs()),
        "Audio decoded"
    );

    Ok(signal)
}

/// Load raw f32le samples from a file. A trailing partial sample is ignored.
async fn load_samples(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_samples_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let samples = load_samples(temp.path()).await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_load_samples_ignores_partial_tail() {
        let temp = NamedTempFile::new().unwrap();

        let mut bytes: Vec<u8> = [0.25f32, -0.5, 1.0]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        bytes.extend_from_slice(&[0x00, 0x01]);
        tokio::fs::write(temp.path(), &bytes).await.unwrap();

        let loaded = load_samples(temp.path()).await.unwrap();
        assert_eq!(loaded, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_load_audio_missing_file() {
        let result = load_audio(
            Path::new("/no/such/video.mp4"),
            &AudioExtractOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[test]
    fn test_default_options() {
        let options = AudioExtractOptions::default();
        assert_eq!(options.sample_rate, 22050);
        assert!(!options.crowd_filter);
        assert!(options.timeout_secs.is_none());
    }
}
