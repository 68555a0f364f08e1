//! Media capability interface.
//!
//! The clipping pipeline only needs two things from the outside world: decode
//! a video's audio, and cut a time range into a new file. `MediaBackend`
//! captures exactly that, so the pipeline can run against FFmpeg in
//! production and an in-memory fake in tests.

use std::path::Path;

use async_trait::async_trait;
use cclip_models::{AudioSignal, CutMode};

use crate::audio::{load_audio, AudioExtractOptions};
use crate::clip::extract_clip;
use crate::command::FfmpegRunner;
use crate::error::MediaResult;

/// Decode-to-samples and cut-interval-to-file.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Decode the audio track of `video` to mono samples.
    async fn load_audio(&self, video: &Path) -> MediaResult<AudioSignal>;

    /// Write `[start_secs, end_secs)` of `video` to `output`.
    async fn extract_clip(
        &self,
        video: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()>;
}

/// `MediaBackend` that shells out to `ffmpeg`/`ffprobe`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    audio: AudioExtractOptions,
    cut_mode: CutMode,
    runner: FfmpegRunner,
}

impl FfmpegBackend {
    pub fn new(audio: AudioExtractOptions, cut_mode: CutMode) -> Self {
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = audio.timeout_secs {
            runner = runner.with_timeout(secs);
        }
        Self {
            audio,
            cut_mode,
            runner,
        }
    }

    pub fn cut_mode(&self) -> &CutMode {
        &self.cut_mode
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn load_audio(&self, video: &Path) -> MediaResult<AudioSignal> {
        load_audio(video, &self.audio).await
    }

    async fn extract_clip(
        &self,
        video: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> MediaResult<()> {
        extract_clip(video, start_secs, end_secs, output, &self.cut_mode, &self.runner).await
    }
}
