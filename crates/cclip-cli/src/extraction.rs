//! Bounded-parallel clip extraction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cclip_media::{MediaBackend, MediaError};
use cclip_models::ClipInterval;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::ExtractionOptions;
use crate::error::ClipperError;
use crate::logging::RunLogger;
use crate::report::{ClipOutcome, ClipStatus};
use crate::retry::{retry_async, RetryConfig, RetryResult};

/// One interval paired with the path it will be written to.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub index: usize,
    pub interval: ClipInterval,
    pub output: PathBuf,
}

/// Cut every job out of `video`, at most `options.jobs` at a time.
///
/// Returns one outcome per job, in job order. A failed cut never stops the
/// others; timeouts are retried per `options.max_retries`.
pub async fn extract_all<B>(
    backend: &B,
    video: &Path,
    jobs: Vec<ClipJob>,
    options: &ExtractionOptions,
    logger: &RunLogger,
) -> Vec<ClipOutcome>
where
    B: MediaBackend + ?Sized,
{
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let retry = RetryConfig::new("extract_clip")
        .with_max_retries(options.max_retries)
        .with_base_delay(options.retry_delay);
    let total = jobs.len();

    let futures: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let semaphore = Arc::clone(&semaphore);
            let retry = &retry;

            async move {
                let attempt = match semaphore.acquire().await {
                    Ok(_permit) => {
                        debug!(
                            clip = job.index + 1,
                            start = job.interval.start,
                            end = job.interval.end,
                            "Cutting clip"
                        );
                        retry_async(retry, MediaError::is_retryable, || {
                            backend.extract_clip(
                                video,
                                job.interval.start,
                                job.interval.end,
                                &job.output,
                            )
                        })
                        .await
                    }
                    Err(_) => RetryResult::Failed {
                        error: MediaError::invalid_media("extraction slots closed"),
                        attempts: 0,
                    },
                };
                finish(job, attempt, total, logger)
            }
        })
        .collect();

    join_all(futures).await
}

fn finish(
    job: ClipJob,
    result: RetryResult<(), MediaError>,
    total: usize,
    logger: &RunLogger,
) -> ClipOutcome {
    let attempts = result.attempts();
    let status = match result.into_result() {
        Ok(()) => {
            info!(
                "Clip {}/{} written: {}",
                job.index + 1,
                total,
                job.output.display()
            );
            ClipStatus::Written { attempts }
        }
        Err(e) => {
            let error = ClipperError::media_write(job.index, job.interval.start, job.interval.end, e);
            logger.log_error(&error.to_string());
            ClipStatus::Failed {
                attempts,
                error: error.to_string(),
            }
        }
    };

    ClipOutcome {
        index: job.index,
        interval: job.interval,
        path: job.output,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cclip_media::MediaResult;
    use cclip_models::AudioSignal;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend whose cuts fail according to a per-start script.
    #[derive(Default)]
    struct ScriptedBackend {
        /// Remaining timeouts to return for a clip start (in whole seconds).
        timeouts: Mutex<HashMap<u64, u32>>,
        /// Clip starts that always fail.
        broken: Vec<u64>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl MediaBackend for ScriptedBackend {
        async fn load_audio(&self, _video: &Path) -> MediaResult<AudioSignal> {
            Ok(AudioSignal::new(vec![0.0; 10], 10))
        }

        async fn extract_clip(
            &self,
            _video: &Path,
            start_secs: f64,
            _end_secs: f64,
            _output: &Path,
        ) -> MediaResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let key = start_secs as u64;
            if self.broken.contains(&key) {
                return Err(MediaError::ffmpeg_failed("bad cut", None, Some(1)));
            }
            let mut timeouts = self.timeouts.lock().unwrap();
            if let Some(left) = timeouts.get_mut(&key) {
                if *left > 0 {
                    *left -= 1;
                    return Err(MediaError::Timeout(1));
                }
            }
            Ok(())
        }
    }

    fn jobs(count: usize) -> Vec<ClipJob> {
        (0..count)
            .map(|i| {
                let start = i as f64 * 10.0;
                ClipJob {
                    index: i,
                    interval: ClipInterval {
                        start,
                        end: start + 5.0,
                        peak_loudness: 1.0,
                        peak_time: start,
                    },
                    output: PathBuf::from(format!("out/clip_{i}.mp4")),
                }
            })
            .collect()
    }

    fn options(jobs: usize) -> ExtractionOptions {
        ExtractionOptions {
            jobs,
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn logger() -> RunLogger {
        RunLogger::new(Path::new("match.mp4"))
    }

    #[tokio::test]
    async fn test_outcomes_in_job_order() {
        let backend = ScriptedBackend::default();
        let outcomes =
            extract_all(&backend, Path::new("in.mp4"), jobs(6), &options(3), &logger()).await;

        let indices: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(outcomes.iter().all(|o| o.is_written()));
    }

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let backend = ScriptedBackend::default();
        extract_all(&backend, Path::new("in.mp4"), jobs(8), &options(2), &logger()).await;
        assert!(backend.max_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_others() {
        let backend = ScriptedBackend {
            broken: vec![10],
            ..Default::default()
        };
        let outcomes =
            extract_all(&backend, Path::new("in.mp4"), jobs(3), &options(2), &logger()).await;

        assert!(outcomes[0].is_written());
        assert!(outcomes[1].is_failed());
        assert!(outcomes[2].is_written());
        // Non-retryable failures are not retried
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_retried_once() {
        let backend = ScriptedBackend::default();
        backend.timeouts.lock().unwrap().insert(0, 1);
        backend.timeouts.lock().unwrap().insert(10, 5);

        let outcomes =
            extract_all(&backend, Path::new("in.mp4"), jobs(2), &options(1), &logger()).await;

        assert_eq!(outcomes[0].status, ClipStatus::Written { attempts: 2 });
        match &outcomes[1].status {
            ClipStatus::Failed { attempts, error } => {
                assert_eq!(*attempts, 2);
                assert!(error.contains("timed out"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
