/*!
 * Timeline combination of subtitle segments.
 *
 * Each segment is shifted by the sum of the durations of every segment
 * before it and appended in caller order. A segment's duration, not its
 * content, decides where the next segment starts.
 */

use std::path::{Path, PathBuf};
use anyhow::Result;
use log::debug;

use crate::app_config::NegativeTimePolicy;
use crate::errors::{ConfigError, SubtitleError};
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};

/// One subtitle source and the time it occupies in the combined timeline
#[derive(Debug, Clone)]
pub struct Segment {
    /// Parsed subtitles of this segment
    pub subtitles: SubtitleCollection,
    /// Time occupied by this segment in milliseconds
    pub duration_ms: u64,
}

impl Segment {
    pub fn new(subtitles: SubtitleCollection, duration_ms: u64) -> Self {
        Self { subtitles, duration_ms }
    }
}

/// Pair each sequence with its duration, rejecting mismatched counts
pub fn pair_segments(sequences: Vec<SubtitleCollection>, durations: &[u64]) -> Result<Vec<Segment>, ConfigError> {
    if sequences.len() != durations.len() {
        return Err(ConfigError::CountMismatch {
            kind: "durations",
            given: durations.len(),
            expected: sequences.len(),
        });
    }

    Ok(sequences
        .into_iter()
        .zip(durations.iter().copied())
        .map(|(subtitles, duration_ms)| Segment::new(subtitles, duration_ms))
        .collect())
}

/// Concatenates segments into one continuous timeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineCombiner {
    negative_time_policy: NegativeTimePolicy,
}

impl TimelineCombiner {
    pub fn new(negative_time_policy: NegativeTimePolicy) -> Self {
        Self { negative_time_policy }
    }

    /// Shift and concatenate segments in order, renumbering the result from 1
    pub fn combine(&self, segments: Vec<Segment>) -> Result<SubtitleCollection, SubtitleError> {
        let (end_offset, entries) = segments.into_iter().try_fold(
            (0i64, Vec::new()),
            |(offset, entries), segment| self.append_segment(offset, entries, segment),
        )?;

        debug!("Combined timeline spans {} ms", end_offset);

        let mut combined = SubtitleCollection::from_entries(PathBuf::new(), entries);
        combined.renumber();
        Ok(combined)
    }

    // One fold step: returns the next offset and the grown entry list
    fn append_segment(
        &self,
        offset: i64,
        mut entries: Vec<SubtitleEntry>,
        segment: Segment,
    ) -> Result<(i64, Vec<SubtitleEntry>), SubtitleError> {
        debug!(
            "Shifting {} entries from {} by {} ms",
            segment.subtitles.entries.len(),
            segment.subtitles.source_file.display(),
            offset
        );

        for entry in segment.subtitles.entries {
            entries.push(entry.shift_time(offset, self.negative_time_policy)?);
        }

        let duration = i64::try_from(segment.duration_ms).unwrap_or(i64::MAX);
        Ok((offset.saturating_add(duration), entries))
    }
}

/// Parse, combine and write a set of SRT files using explicit durations.
///
/// Returns the number of entries written.
pub fn combine_files<P: AsRef<Path>>(srt_files: &[P], durations: &[u64], output_file: &Path) -> Result<usize> {
    if srt_files.len() != durations.len() {
        return Err(ConfigError::CountMismatch {
            kind: "durations",
            given: durations.len(),
            expected: srt_files.len(),
        }
        .into());
    }

    let sequences = srt_files
        .iter()
        .map(SubtitleCollection::parse_srt_file)
        .collect::<Result<Vec<_>>>()?;

    let segments = pair_segments(sequences, durations)?;
    let mut combined = TimelineCombiner::default().combine(segments)?;
    combined.write_to_srt(output_file)?;

    Ok(combined.entries.len())
}
