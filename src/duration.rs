/*!
 * Segment duration resolution.
 *
 * Every segment gets exactly one duration in milliseconds, taken from one of
 * three sources: explicit values, a video-duration probe, or the end time of
 * the segment's last subtitle.
 */

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::app_config::VideoProbeConfig;
use crate::errors::{ConfigError, DurationError};
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleCollection;

/// Where segment durations come from
#[derive(Debug, Clone, PartialEq)]
pub enum DurationMode {
    /// Caller-supplied milliseconds, one per segment
    Explicit(Vec<u64>),
    /// Probe one video per segment
    Videos(Vec<PathBuf>),
    /// End time of each segment's last subtitle
    SubtitleEnd,
}

impl DurationMode {
    /// Pick the single requested mode and check its argument count.
    ///
    /// Touches no files, so it can run before anything else.
    pub fn select(
        durations: Option<Vec<u64>>,
        videos: Option<Vec<PathBuf>>,
        use_srt_duration: bool,
        segment_count: usize,
    ) -> Result<Self, ConfigError> {
        let chosen = usize::from(durations.is_some()) + usize::from(videos.is_some()) + usize::from(use_srt_duration);
        match chosen {
            0 => return Err(ConfigError::NoDurationMode),
            1 => {}
            _ => return Err(ConfigError::MultipleDurationModes),
        }

        if let Some(durations) = durations {
            check_count("durations", durations.len(), segment_count)?;
            return Ok(Self::Explicit(durations));
        }

        if let Some(videos) = videos {
            check_count("videos", videos.len(), segment_count)?;
            return Ok(Self::Videos(videos));
        }

        Ok(Self::SubtitleEnd)
    }

    /// Short description for progress output
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "Using explicit durations...",
            Self::Videos(_) => "Extracting durations from videos...",
            Self::SubtitleEnd => "Using SRT end times as durations...",
        }
    }
}

fn check_count(kind: &'static str, given: usize, expected: usize) -> Result<(), ConfigError> {
    if given != expected {
        return Err(ConfigError::CountMismatch { kind, given, expected });
    }
    Ok(())
}

/// Looks up the duration of a video file
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of `video` in whole milliseconds
    async fn probe_duration_ms(&self, video: &Path) -> Result<u64, DurationError>;
}

/// Video-duration lookup, injected into the resolver
pub enum DurationCapability {
    Available(Box<dyn DurationProbe>),
    /// No probe can be used; the string says why
    Unavailable(String),
}

impl DurationCapability {
    /// Build the ffprobe-backed capability described by `config`
    pub fn from_config(config: &VideoProbeConfig) -> Self {
        if !config.enabled {
            return Self::Unavailable("video duration probing is disabled in the configuration".to_string());
        }

        Self::Available(Box::new(FfprobeDurationProbe::new(
            config.ffprobe_path.clone(),
            Duration::from_secs(config.timeout_secs),
        )))
    }
}

/// Reads the container duration with ffprobe
pub struct FfprobeDurationProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeDurationProbe {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Self {
        Self { ffprobe_path, timeout }
    }

    /// Convert ffprobe's `format=duration` output (seconds) to milliseconds
    pub fn parse_duration_output(stdout: &str) -> Option<u64> {
        let seconds: f64 = stdout.trim().parse().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        // Truncates, matching how durations are counted elsewhere
        Some((seconds * 1000.0) as u64)
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe_duration_ms(&self, video: &Path) -> Result<u64, DurationError> {
        if !FileManager::file_exists(video) {
            return Err(DurationError::VideoNotFound(video.to_path_buf()));
        }

        let ffprobe_future = Command::new(&self.ffprobe_path)
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(video)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| match e.kind() {
                    ErrorKind::NotFound => DurationError::Unavailable {
                        path: video.to_path_buf(),
                        reason: format!("'{}' is not installed", self.ffprobe_path),
                    },
                    _ => DurationError::ProbeFailed {
                        path: video.to_path_buf(),
                        reason: format!("failed to execute {}: {}", self.ffprobe_path, e),
                    },
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(DurationError::ProbeFailed {
                    path: video.to_path_buf(),
                    reason: format!("ffprobe timed out after {} seconds", self.timeout.as_secs()),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("ffprobe exited with an error")
                .to_string();
            return Err(DurationError::ProbeFailed { path: video.to_path_buf(), reason });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_duration_output(&stdout).ok_or_else(|| DurationError::ProbeFailed {
            path: video.to_path_buf(),
            reason: format!("unexpected ffprobe output '{}'", stdout.trim()),
        })
    }
}

/// Produces one duration per segment
pub struct DurationResolver {
    capability: DurationCapability,
}

impl DurationResolver {
    pub fn new(capability: DurationCapability) -> Self {
        Self { capability }
    }

    /// Resolve durations for `segments` in order.
    ///
    /// Video probing stops at the first failure.
    pub async fn resolve(&self, mode: &DurationMode, segments: &[SubtitleCollection]) -> Result<Vec<u64>> {
        let durations = match mode {
            DurationMode::Explicit(durations) => {
                check_count("durations", durations.len(), segments.len())?;
                durations.clone()
            }
            DurationMode::Videos(videos) => {
                check_count("videos", videos.len(), segments.len())?;
                let mut durations = Vec::with_capacity(videos.len());
                for video in videos {
                    let duration = self.probe(video).await?;
                    info!("{}: {} ms", video.display(), duration);
                    durations.push(duration);
                }
                durations
            }
            DurationMode::SubtitleEnd => segments
                .iter()
                .map(|segment| -> Result<u64> {
                    let duration = segment.last_end_time_ms()?;
                    debug!("{}: {} ms from last subtitle", segment.source_file.display(), duration);
                    Ok(duration)
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(durations)
    }

    async fn probe(&self, video: &Path) -> Result<u64, DurationError> {
        match &self.capability {
            DurationCapability::Available(probe) => probe.probe_duration_ms(video).await,
            DurationCapability::Unavailable(reason) => Err(DurationError::Unavailable {
                path: video.to_path_buf(),
                reason: reason.clone(),
            }),
        }
    }
}
