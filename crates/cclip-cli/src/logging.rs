//! Tracing setup and structured run logging.

use std::path::Path;

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// Colored human-readable output by default, JSON when `LOG_FORMAT=json`.
/// `RUST_LOG` takes precedence over the default filter.
pub fn init_tracing(verbose: bool) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(verbose)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,cclip=debug"
    } else {
        "warn,cclip=info"
    }
}

/// Run logger that tags every message with the video being clipped.
#[derive(Debug, Clone)]
pub struct RunLogger {
    video: String,
}

impl RunLogger {
    pub fn new(video: &Path) -> Self {
        let video = video
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| video.display().to_string());
        Self { video }
    }

    pub fn log_start(&self, message: &str) {
        info!(video = %self.video, "Run started: {}", message);
    }

    pub fn log_progress(&self, message: &str) {
        info!(video = %self.video, "{}", message);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(video = %self.video, "{}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(video = %self.video, "{}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(video = %self.video, "Run completed: {}", message);
    }

    /// Video label used in log fields.
    pub fn video(&self) -> &str {
        &self.video
    }

    /// Span covering a whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("run", video = %self.video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_uses_file_name() {
        let logger = RunLogger::new(Path::new("/videos/final/match.mp4"));
        assert_eq!(logger.video(), "match.mp4");
    }

    #[test]
    fn test_run_logger_without_file_name() {
        let logger = RunLogger::new(Path::new("/"));
        assert_eq!(logger.video(), "/");
    }

    #[test]
    fn test_logger_methods_do_not_panic() {
        let logger = RunLogger::new(Path::new("match.mp4"));
        logger.log_start("start");
        logger.log_progress("progress");
        logger.log_warning("warning");
        logger.log_error("error");
        logger.log_completion("done");
        let _span = logger.create_span();
    }

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("cclip=debug"));
        assert!(default_filter(false).contains("cclip=info"));
    }
}
