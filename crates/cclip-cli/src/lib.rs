//! Crowd-noise clip detector.
//!
//! This crate provides:
//! - Command-line parsing and configuration layering
//! - The end-to-end pipeline: decode, detect, plan names, cut
//! - Bounded-parallel extraction with retry on timeouts
//! - Run summary, JSON report and structured logging

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod retry;

pub use cli::Cli;
pub use config::{AnalysisConfig, ExtractionOptions};
pub use error::{ClipperError, ClipperResult};
pub use logging::{init_tracing, RunLogger};
pub use pipeline::run_pipeline;
pub use report::{ClipOutcome, ClipStatus, RunSummary};
