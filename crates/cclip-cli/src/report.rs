//! Run summary and JSON report.

use std::path::{Path, PathBuf};

use cclip_models::{format_seconds, ClipInterval};
use serde::Serialize;

use crate::error::{ClipperError, ClipperResult};

/// What happened to one clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClipStatus {
    /// Dry run; nothing was cut.
    Planned,
    Written { attempts: u32 },
    Failed { attempts: u32, error: String },
}

/// One resolved interval and its fate.
#[derive(Debug, Clone, Serialize)]
pub struct ClipOutcome {
    /// Zero-based position in resolver order.
    pub index: usize,
    pub interval: ClipInterval,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: ClipStatus,
}

impl ClipOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ClipStatus::Written { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ClipStatus::Failed { .. })
    }
}

/// Result of one clipping run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub video: PathBuf,
    pub output_dir: PathBuf,
    pub duration_secs: f64,
    pub baseline: f64,
    pub spikes: usize,
    pub dry_run: bool,
    pub clips: Vec<ClipOutcome>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.clips.iter().filter(|c| c.is_written()).count()
    }

    pub fn failed(&self) -> usize {
        self.clips.iter().filter(|c| c.is_failed()).count()
    }

    /// Whether cuts were attempted and none of them produced a file.
    pub fn all_failed(&self) -> bool {
        !self.dry_run && !self.clips.is_empty() && self.succeeded() == 0
    }

    /// Serialize the summary as pretty JSON to `path`.
    pub fn write_json(&self, path: &Path) -> ClipperResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClipperError::report(path, e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ClipperError::report(path, e.to_string()))
    }

    /// Human-readable summary lines for stdout.
    pub fn render(&self, verbose: bool) -> String {
        let mut lines = Vec::new();

        if self.clips.is_empty() {
            lines.push(format!(
                "No crowd reactions found in {} ({} analyzed).",
                self.video.display(),
                format_seconds(self.duration_secs)
            ));
            return lines.join("\n");
        }

        for clip in &self.clips {
            let range = format!(
                "{} - {}",
                format_seconds(clip.interval.start),
                format_seconds(clip.interval.end)
            );
            let line = match &clip.status {
                ClipStatus::Planned => format!("  [{:02}] {}", clip.index + 1, range),
                ClipStatus::Written { .. } if verbose => format!(
                    "  [{:02}] {} -> {}",
                    clip.index + 1,
                    range,
                    clip.path.display()
                ),
                ClipStatus::Written { .. } => format!("  [{:02}] {}", clip.index + 1, range),
                ClipStatus::Failed { error, .. } => {
                    format!("  [{:02}] {} FAILED: {}", clip.index + 1, range, error)
                }
            };
            lines.push(line);
        }

        if self.dry_run {
            lines.push(format!(
                "Dry run: {} clip(s) would be written to {}.",
                self.clips.len(),
                self.output_dir.display()
            ));
        } else {
            lines.push(format!(
                "{} clip(s) written to {}, {} failed.",
                self.succeeded(),
                self.output_dir.display(),
                self.failed()
            ));
        }

        lines.join("\n")
    }
}
