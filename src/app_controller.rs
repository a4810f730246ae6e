use anyhow::{Result, Context};
use log::{info, debug, Level};
use std::path::PathBuf;
use crate::app_config::Config;
use crate::duration::{DurationCapability, DurationMode, DurationResolver};
use crate::errors::ConfigError;
use crate::subtitle_processor::SubtitleCollection;
use crate::timeline::{pair_segments, TimelineCombiner};

// @module: Application controller for subtitle combination

/// Everything needed for one combine run
#[derive(Debug, Clone, Default)]
pub struct CombineRequest {
    /// SRT files in timeline order
    pub subtitles: Vec<PathBuf>,
    /// Explicit durations in milliseconds
    pub durations: Option<Vec<u64>>,
    /// Videos to probe for durations
    pub videos: Option<Vec<PathBuf>>,
    /// Use each file's last end time as its duration
    pub use_srt_duration: bool,
    /// Combined SRT destination
    pub output: PathBuf,
}

/// Outcome of a successful combine run
#[derive(Debug, Clone, PartialEq)]
pub struct CombineSummary {
    /// Number of input segments
    pub segments: usize,
    /// Number of entries written
    pub entries: usize,
    /// Resolved duration of each segment
    pub durations_ms: Vec<u64>,
    /// Written file
    pub output: PathBuf,
}

impl CombineSummary {
    /// Sum of all segment durations
    pub fn total_duration_ms(&self) -> u64 {
        self.durations_ms.iter().fold(0u64, |total, d| total.saturating_add(*d))
    }
}

/// Main application controller for subtitle combination
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Segment duration source
    resolver: DurationResolver,
}

impl Controller {
    // @method: Create a controller using the configured ffprobe capability
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()
            .context("Configuration validation failed")?;

        let capability = DurationCapability::from_config(&config.video_probe);
        Ok(Self::with_capability(config, capability))
    }

    /// Create a controller with an explicit duration capability
    pub fn with_capability(config: Config, capability: DurationCapability) -> Self {
        Self {
            config,
            resolver: DurationResolver::new(capability),
        }
    }

    /// Run the combine workflow: validate, parse, resolve, combine, write
    pub async fn run(&self, request: CombineRequest) -> Result<CombineSummary> {
        let start_time = std::time::Instant::now();

        // Request errors must surface before any file is read or written
        if request.subtitles.is_empty() {
            return Err(ConfigError::NoSubtitles.into());
        }
        let mode = DurationMode::select(
            request.durations,
            request.videos,
            request.use_srt_duration,
            request.subtitles.len(),
        )?;

        let skip_level = if self.config.warn_on_skipped_blocks { Level::Warn } else { Level::Debug };
        let sequences = request.subtitles
            .iter()
            .map(|path| SubtitleCollection::parse_srt_file_with(path, skip_level))
            .collect::<Result<Vec<_>>>()?;

        info!("{}", mode.describe());
        let durations = self.resolver.resolve(&mode, &sequences).await?;

        info!("Combining {} SRT files...", sequences.len());
        let segments = pair_segments(sequences, &durations)?;
        let mut combined = TimelineCombiner::new(self.config.negative_time_policy)
            .combine(segments)?;

        combined.write_to_srt(&request.output)?;
        info!("Combined SRT file written to: {}", request.output.display());
        debug!("Combine finished in {:.2?}", start_time.elapsed());

        Ok(CombineSummary {
            segments: durations.len(),
            entries: combined.entries.len(),
            durations_ms: durations,
            output: request.output,
        })
    }
}
