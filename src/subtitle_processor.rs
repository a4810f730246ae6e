use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{debug, log, warn, Level};
use crate::app_config::NegativeTimePolicy;
use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: Subtitle parsing, serialization and timestamp arithmetic

// @const: SRT timestamp regex (hours unbounded, seconds may carry a fraction)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+):(\d+):(\d+(?:[,.]\d+)?)$").unwrap()
});

// @const: Separator between start and end time on a timing line
const TIMING_SEPARATOR: &str = " --> ";

// @const: One or more blank (or whitespace-only) lines between blocks
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n(?:[ \t]*\n)+").unwrap()
});

/// Parse an SRT timestamp (`HH:MM:SS,mmm`) into milliseconds.
///
/// Hours and minutes are integers; the seconds field is a decimal value
/// using either a comma or a dot, rounded to the nearest millisecond.
pub fn timestamp_to_ms(timestamp: &str) -> Result<i64, SubtitleError> {
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

    let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;

    let negative = caps[1].starts_with('-');
    let hours: i64 = caps[1].trim_start_matches('-').parse().map_err(|_| invalid())?;
    let minutes: i64 = caps[2].parse().map_err(|_| invalid())?;
    let seconds: f64 = caps[3].replace(',', ".").parse().map_err(|_| invalid())?;

    // i64::MAX as f64 rounds up, so the bound itself is already out of range
    let seconds_ms = (seconds * 1000.0).round();
    if !seconds_ms.is_finite() || seconds_ms >= i64::MAX as f64 {
        return Err(invalid());
    }

    let magnitude = hours
        .checked_mul(3_600_000)
        .and_then(|ms| minutes.checked_mul(60_000).and_then(|m| ms.checked_add(m)))
        .and_then(|ms| ms.checked_add(seconds_ms as i64))
        .ok_or_else(invalid)?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Format milliseconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Hours use at least two digits and grow wider past 99.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Add a signed millisecond offset to an SRT timestamp, rejecting negative results.
pub fn add_time_offset(timestamp: &str, offset_ms: i64) -> Result<String, SubtitleError> {
    add_time_offset_with_policy(timestamp, offset_ms, NegativeTimePolicy::Error)
}

/// Add a signed millisecond offset to an SRT timestamp.
///
/// A result before `00:00:00,000` is handled according to `policy`.
pub fn add_time_offset_with_policy(
    timestamp: &str,
    offset_ms: i64,
    policy: NegativeTimePolicy,
) -> Result<String, SubtitleError> {
    let total = timestamp_to_ms(timestamp)?.saturating_add(offset_ms);

    if total < 0 {
        return match policy {
            NegativeTimePolicy::Error => Err(SubtitleError::NegativeTimestamp {
                timestamp: timestamp.to_string(),
                offset_ms,
            }),
            NegativeTimePolicy::Clamp => Ok(format_timestamp(0)),
        };
    }

    Ok(format_timestamp(total as u64))
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Display order within its file
    pub index: usize,

    // @field: Start timestamp as written in the file
    pub start_time: String,

    // @field: End timestamp as written in the file
    pub end_time: String,

    // @field: Subtitle text, possibly several lines
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(index: usize, start_time: impl Into<String>, end_time: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }

    /// Shift both timestamps by `offset_ms`; index and text are kept
    pub fn shift_time(self, offset_ms: i64, policy: NegativeTimePolicy) -> Result<Self, SubtitleError> {
        Ok(SubtitleEntry {
            start_time: add_time_offset_with_policy(&self.start_time, offset_ms, policy)?,
            end_time: add_time_offset_with_policy(&self.end_time, offset_ms, policy)?,
            ..self
        })
    }

    /// Start time in milliseconds
    pub fn start_ms(&self) -> Result<i64, SubtitleError> {
        timestamp_to_ms(&self.start_time)
    }

    /// End time in milliseconds
    pub fn end_ms(&self) -> Result<i64, SubtitleError> {
        timestamp_to_ms(&self.end_time)
    }

    // Render as one SRT block under the given index
    fn write_block<W: fmt::Write>(&self, out: &mut W, index: usize) -> fmt::Result {
        writeln!(out, "{}", index)?;
        writeln!(out, "{}{}{}", self.start_time, TIMING_SEPARATOR, self.end_time)?;
        writeln!(out, "{}", self.text)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_block(f, self.index)
    }
}

/// Why a block was left out of the parsed sequence
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Fewer than the index, timing and text lines
    TooFewLines(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::TooFewLines(count) => write!(f, "expected at least 3 lines, found {}", count),
        }
    }
}

/// Classification of one blank-line delimited SRT block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Valid(SubtitleEntry),
    Skipped {
        /// 1-based block number
        block: usize,
        reason: SkipReason,
    },
}

/// Classify a single block. `block` is its 1-based position in the file.
pub fn classify_block(block: usize, content: &str) -> Result<BlockOutcome, SubtitleError> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() < 3 {
        return Ok(BlockOutcome::Skipped {
            block,
            reason: SkipReason::TooFewLines(lines.len()),
        });
    }

    let index = lines[0].trim().parse::<usize>().map_err(|_| SubtitleError::InvalidIndex {
        block,
        line: lines[0].to_string(),
    })?;

    let mut timing = lines[1].split(TIMING_SEPARATOR);
    let (start_time, end_time) = match (timing.next(), timing.next(), timing.next()) {
        (Some(start), Some(end), None) => (start, end),
        _ => {
            return Err(SubtitleError::InvalidTimingLine {
                block,
                line: lines[1].to_string(),
            });
        }
    };

    Ok(BlockOutcome::Valid(SubtitleEntry::new(
        index,
        start_time,
        end_time,
        lines[2..].join("\n"),
    )))
}

/// Split SRT content into blocks and classify each of them, in file order
pub fn classify_blocks(content: &str) -> Result<Vec<BlockOutcome>, SubtitleError> {
    let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");

    BLOCK_SEPARATOR
        .split(normalized.trim())
        .filter(|block| !block.trim().is_empty())
        .enumerate()
        .map(|(i, block)| classify_block(i + 1, block))
        .collect()
}

/// Ordered subtitle entries read from one SRT file
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Create a collection from already parsed entries
    pub fn from_entries(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection { source_file, entries }
    }

    /// Parse an SRT file, warning about skipped blocks.
    ///
    /// A missing file is not an error: it yields an empty collection.
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse_srt_file_with(path, Level::Warn)
    }

    /// Parse an SRT file, logging skipped blocks at `skip_level`
    pub fn parse_srt_file_with<P: AsRef<Path>>(path: P, skip_level: Level) -> Result<Self> {
        let path = path.as_ref();

        if !FileManager::file_exists(path) {
            warn!("SRT file not found: {}", path.display());
            return Ok(Self::new(path.to_path_buf()));
        }

        let content = FileManager::read_to_string(path)?;
        let entries = Self::parse_srt_string_with(&content, skip_level)
            .with_context(|| format!("Failed to parse SRT file: {}", path.display()))?;

        debug!("Parsed {} entries from {}", entries.len(), path.display());

        Ok(Self::from_entries(path.to_path_buf(), entries))
    }

    /// Parse SRT format string into subtitle entries, warning about skipped blocks
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        Self::parse_srt_string_with(content, Level::Warn)
    }

    /// Parse SRT format string into subtitle entries, logging skipped blocks at `skip_level`
    pub fn parse_srt_string_with(content: &str, skip_level: Level) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let mut entries = Vec::new();

        for outcome in classify_blocks(content)? {
            match outcome {
                BlockOutcome::Valid(entry) => entries.push(entry),
                BlockOutcome::Skipped { block, reason } => {
                    log!(skip_level, "Skipping malformed subtitle block {}: {}", block, reason);
                }
            }
        }

        Ok(entries)
    }

    /// End time of the last entry in milliseconds, or 0 when empty
    pub fn last_end_time_ms(&self) -> Result<u64, SubtitleError> {
        let Some(last) = self.entries.last() else {
            return Ok(0);
        };

        let ms = last.end_ms()?;
        u64::try_from(ms).map_err(|_| SubtitleError::InvalidTimestamp(last.end_time.clone()))
    }

    /// Reassign indices 1..N in sequence order
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.index = i + 1;
        }
    }

    /// Render the collection as SRT text, numbering entries from 1.
    ///
    /// Blocks are separated by exactly one blank line and nothing follows the last one.
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            // Writing into a String cannot fail
            let _ = entry.write_block(&mut out, i + 1);
        }

        out
    }

    /// Renumber and write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        self.renumber();
        FileManager::write_to_file(path, &self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
