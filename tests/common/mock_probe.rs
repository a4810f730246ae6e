/*!
 * Mock duration probe for testing
 *
 * Returns predetermined durations per video path so tests never need
 * ffprobe installed.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use srtcombine::DurationProbe;
use srtcombine::errors::DurationError;

/// Duration probe answering from a fixed table
#[derive(Debug, Default, Clone)]
pub struct MockDurationProbe {
    durations: HashMap<PathBuf, u64>,
    /// Videos probed so far, in call order
    pub calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockDurationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `duration_ms` for `video`
    pub fn with_duration(mut self, video: impl Into<PathBuf>, duration_ms: u64) -> Self {
        self.durations.insert(video.into(), duration_ms);
        self
    }

    /// Videos probed so far
    pub fn probed(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DurationProbe for MockDurationProbe {
    async fn probe_duration_ms(&self, video: &Path) -> Result<u64, DurationError> {
        self.calls.lock().unwrap().push(video.to_path_buf());
        self.durations
            .get(video)
            .copied()
            .ok_or_else(|| DurationError::ProbeFailed {
                path: video.to_path_buf(),
                reason: "no duration stream found".to_string(),
            })
    }
}
