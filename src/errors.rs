/*!
 * Error types for the srtcombine application.
 *
 * This module contains custom error types for the parsing, timing and
 * duration-resolution parts of the application, using the thiserror crate
 * for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing or shifting subtitles
#[derive(Error, Debug, PartialEq)]
pub enum SubtitleError {
    /// Timestamp does not follow the HH:MM:SS,mmm layout
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    /// Shifting a timestamp would move it before 00:00:00,000
    #[error("Timestamp {timestamp} shifted by {offset_ms} ms would become negative")]
    NegativeTimestamp {
        /// Timestamp as read from the file
        timestamp: String,
        /// Offset that was applied
        offset_ms: i64,
    },

    /// Block index line is not an integer
    #[error("Block {block}: invalid subtitle index '{line}'")]
    InvalidIndex {
        /// 1-based block number within the file
        block: usize,
        /// Offending line
        line: String,
    },

    /// Block timing line lacks the " --> " separator
    #[error("Block {block}: invalid timing line '{line}'")]
    InvalidTimingLine {
        /// 1-based block number within the file
        block: usize,
        /// Offending line
        line: String,
    },
}

/// Errors that can occur while looking up a video's duration
#[derive(Error, Debug)]
pub enum DurationError {
    /// The video file does not exist
    #[error("Could not extract duration from {0}: file not found")]
    VideoNotFound(PathBuf),

    /// The probe ran but could not produce a duration
    #[error("Could not extract duration from {path}: {reason}")]
    ProbeFailed {
        /// Video that was probed
        path: PathBuf,
        /// Why the probe failed
        reason: String,
    },

    /// No duration probe is installed or enabled
    #[error("Could not extract duration from {path}: {reason}")]
    Unavailable {
        /// Video that was requested
        path: PathBuf,
        /// Why the capability is missing
        reason: String,
    },
}

/// Errors in the combine request itself, detected before any file is touched
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// None of --durations, --videos or --use-srt-duration was given
    #[error("Please specify either --durations, --videos, or --use-srt-duration")]
    NoDurationMode,

    /// More than one duration mode was given
    #[error("Only one of --durations, --videos, or --use-srt-duration may be given")]
    MultipleDurationModes,

    /// Number of durations or videos does not match the number of subtitle files
    #[error("If {kind} are provided, there must be one for each SRT file ({given} given for {expected} files)")]
    CountMismatch {
        /// "durations" or "videos"
        kind: &'static str,
        /// Number of values given
        given: usize,
        /// Number of subtitle files
        expected: usize,
    },

    /// No subtitle files were given
    #[error("At least one subtitle file is required")]
    NoSubtitles,

    /// Invalid value in the configuration file
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error resolving a segment duration
    #[error("Duration error: {0}")]
    Duration(#[from] DurationError),

    /// Error in the combine request
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error, already carrying its context
    #[error("{0}")]
    Other(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Context-wrapped errors keep their whole chain as the message
        if error.chain().count() > 1 {
            return Self::Other(format!("{:#}", error));
        }
        let error = match error.downcast::<ConfigError>() {
            Ok(config) => return Self::Config(config),
            Err(error) => error,
        };
        let error = match error.downcast::<DurationError>() {
            Ok(duration) => return Self::Duration(duration),
            Err(error) => error,
        };
        match error.downcast::<SubtitleError>() {
            Ok(subtitle) => Self::Subtitle(subtitle),
            Err(error) => Self::Other(error.to_string()),
        }
    }
}
