//! Run-level error types.

use std::path::PathBuf;

use cclip_media::{DetectionError, MediaError};
use cclip_models::ConfigError;
use thiserror::Error;

pub type ClipperResult<T> = Result<T, ClipperError>;

#[derive(Debug, Error)]
pub enum ClipperError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid analysis settings: {0}")]
    Detection(DetectionError),

    #[error("Input video not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to read media: {0}")]
    MediaRead(#[source] MediaError),

    #[error("Audio track contains no samples")]
    EmptyInput,

    #[error("Failed to write clip {} ({start:.1}s-{end:.1}s): {source}", .index + 1)]
    MediaWrite {
        index: usize,
        start: f64,
        end: f64,
        #[source]
        source: MediaError,
    },

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("All {failed} clips failed to write")]
    AllClipsFailed { failed: usize },

    #[error("Failed to write report {}: {message}", .path.display())]
    Report { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipperError {
    pub fn media_write(index: usize, start: f64, end: f64, source: MediaError) -> Self {
        Self::MediaWrite {
            index,
            start,
            end,
            source,
        }
    }

    pub fn report(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map a media failure while reading the input.
    pub fn from_read(error: MediaError) -> Self {
        match error {
            MediaError::FileNotFound(path) => Self::InputNotFound(path),
            other => Self::MediaRead(other),
        }
    }

    /// Map a detection failure.
    pub fn from_detection(error: DetectionError) -> Self {
        match error {
            DetectionError::EmptyInput => Self::EmptyInput,
            other => Self::Detection(other),
        }
    }

    /// Process exit code for this error.
    ///
    /// Every fatal run error exits 1; clap exits 2 on usage errors by itself.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Check if another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClipperError::MediaWrite { source, .. } | ClipperError::MediaRead(source) => {
                source.is_retryable()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_errors_map_missing_file() {
        let err = ClipperError::from_read(MediaError::FileNotFound(PathBuf::from("/x.mp4")));
        assert!(matches!(err, ClipperError::InputNotFound(_)));

        let err = ClipperError::from_read(MediaError::NoAudioStream(PathBuf::from("/x.mp4")));
        assert!(matches!(err, ClipperError::MediaRead(_)));
    }

    #[test]
    fn test_detection_errors_map_empty_input() {
        assert!(matches!(
            ClipperError::from_detection(DetectionError::EmptyInput),
            ClipperError::EmptyInput
        ));
        assert!(matches!(
            ClipperError::from_detection(DetectionError::ZeroSampleRate),
            ClipperError::Detection(_)
        ));
    }

    #[test]
    fn test_retryable_only_on_timeout() {
        assert!(ClipperError::media_write(0, 1.0, 6.0, MediaError::Timeout(30)).is_retryable());
        assert!(!ClipperError::media_write(
            0,
            1.0,
            6.0,
            MediaError::ffmpeg_failed("boom", None, Some(1))
        )
        .is_retryable());
        assert!(!ClipperError::EmptyInput.is_retryable());
    }

    #[test]
    fn test_media_write_message_is_one_based() {
        let err = ClipperError::media_write(2, 10.0, 15.5, MediaError::Timeout(30));
        let msg = err.to_string();
        assert!(msg.contains("clip 3"));
        assert!(msg.contains("10.0s-15.5s"));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(ClipperError::AllClipsFailed { failed: 3 }.exit_code(), 1);
    }
}
