/*!
 * # srtcombine - SRT subtitle combiner
 *
 * A Rust library for merging several independently timed SubRip (SRT)
 * files into a single, continuously timed subtitle track.
 *
 * ## Features
 *
 * - Parse and serialize SRT files, keeping timestamps and text verbatim
 * - Shift timestamps by signed millisecond offsets
 * - Resolve segment durations from:
 *   - explicit millisecond values
 *   - paired video files (via ffprobe)
 *   - the last subtitle end time of each file
 * - Concatenate segments with cumulative offsets and re-index the result
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing, serialization and timestamp arithmetic
 * - `duration`: Segment duration resolution and the video probe capability
 * - `timeline`: Cumulative-offset combination of segments
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod duration;
pub mod timeline;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, NegativeTimePolicy};
pub use app_controller::{CombineRequest, CombineSummary, Controller};
pub use duration::{DurationCapability, DurationMode, DurationProbe, DurationResolver};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, add_time_offset};
pub use timeline::{Segment, TimelineCombiner, combine_files};
pub use errors::{AppError, ConfigError, DurationError, SubtitleError};
