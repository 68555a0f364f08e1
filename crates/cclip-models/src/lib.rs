//! Shared data models for the crowd clip detector.
//!
//! This crate provides plain types for:
//! - Decoded audio (`AudioSignal`)
//! - Resolved clip intervals
//! - Run configuration and its validation
//! - Encoding settings for clip cutting
//! - Timestamp formatting

pub mod audio;
pub mod clip;
pub mod config;
pub mod encoding;
pub mod timestamp;

// Re-export common types
pub use audio::AudioSignal;
pub use clip::ClipInterval;
pub use config::{ConfigError, RunConfig};
pub use encoding::{CutMode, EncodingConfig};
pub use timestamp::format_seconds;
