/*!
 * Tests for cumulative-offset combination of subtitle segments
 */

use std::fs;
use anyhow::Result;
use srtcombine::NegativeTimePolicy;
use srtcombine::errors::{ConfigError, SubtitleError};
use srtcombine::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use srtcombine::timeline::{Segment, TimelineCombiner, combine_files, pair_segments};
use crate::common;

fn collection(name: &str, entries: Vec<SubtitleEntry>) -> SubtitleCollection {
    SubtitleCollection::from_entries(name.into(), entries)
}

#[test]
fn test_combine_withTwoSegments_shouldShiftSecondByFirstDuration() -> Result<()> {
    let a = collection("a.srt", vec![SubtitleEntry::new(1, "00:00:00,000", "00:00:02,000", "Hello")]);
    let b = collection("b.srt", vec![SubtitleEntry::new(1, "00:00:00,000", "00:00:01,500", "World")]);

    let combined = TimelineCombiner::default().combine(vec![Segment::new(a, 2000), Segment::new(b, 1500)])?;

    assert_eq!(
        combined.to_srt_string(),
        "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n2\n00:00:02,000 --> 00:00:03,500\nWorld\n"
    );
    Ok(())
}

#[test]
fn test_combine_withShortContent_shouldAdvanceByDurationNotContent() -> Result<()> {
    // First segment's subtitles end at 1s but it occupies 60s
    let a = collection("a.srt", vec![SubtitleEntry::new(1, "00:00:00,000", "00:00:01,000", "Intro")]);
    let b = collection("b.srt", vec![SubtitleEntry::new(1, "00:00:00,500", "00:00:01,000", "Body")]);
    let c = collection("c.srt", vec![SubtitleEntry::new(1, "00:00:00,000", "00:00:00,250", "Outro")]);

    let combined = TimelineCombiner::default().combine(vec![
        Segment::new(a, 60_000),
        Segment::new(b, 30_000),
        Segment::new(c, 0),
    ])?;

    assert_eq!(combined.entries[1].start_time, "00:01:00,500");
    assert_eq!(combined.entries[2].start_time, "00:01:30,000");
    assert_eq!(combined.entries[2].end_time, "00:01:30,250");
    Ok(())
}

#[test]
fn test_combine_withEmptySegment_shouldStillAdvanceOffset() -> Result<()> {
    let empty = collection("missing.srt", vec![]);
    let real = collection("real.srt", vec![SubtitleEntry::new(3, "00:00:01,000", "00:00:02,000", "Real")]);

    let combined = TimelineCombiner::default().combine(vec![Segment::new(empty, 5000), Segment::new(real, 3000)])?;

    assert_eq!(combined.entries, vec![SubtitleEntry::new(1, "00:00:06,000", "00:00:07,000", "Real")]);
    Ok(())
}

#[test]
fn test_combine_withUnorderedSegmentContent_shouldNotSort() -> Result<()> {
    let a = collection("a.srt", vec![
        SubtitleEntry::new(1, "00:00:05,000", "00:00:06,000", "Second in time"),
        SubtitleEntry::new(2, "00:00:01,000", "00:00:02,000", "First in time"),
    ]);
    let b = collection("b.srt", vec![SubtitleEntry::new(1, "00:00:00,000", "00:00:00,500", "Overlaps")]);

    let combined = TimelineCombiner::default().combine(vec![Segment::new(a, 1000), Segment::new(b, 1000)])?;

    let texts: Vec<&str> = combined.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Second in time", "First in time", "Overlaps"]);
    let indices: Vec<usize> = combined.entries.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_combine_withinSegment_shouldPreserveRelativeTiming() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let first = SubtitleCollection::parse_srt_file(&path)?;
    let second = first.clone();

    let combined = TimelineCombiner::default().combine(vec![
        Segment::new(first.clone(), 123_457),
        Segment::new(second, 0),
    ])?;

    let original_gaps: Vec<i64> = first.entries.windows(2)
        .map(|w| w[1].start_ms().unwrap() - w[0].start_ms().unwrap())
        .collect();
    let shifted_gaps: Vec<i64> = combined.entries[3..].windows(2)
        .map(|w| w[1].start_ms().unwrap() - w[0].start_ms().unwrap())
        .collect();
    assert_eq!(original_gaps, shifted_gaps);
    assert_eq!(combined.entries[3].start_ms()? - first.entries[0].start_ms()?, 123_457);
    Ok(())
}

#[test]
fn test_combine_withBadTimestamp_shouldFail() {
    let a = collection("a.srt", vec![SubtitleEntry::new(1, "later", "00:00:01,000", "Broken")]);

    let err = TimelineCombiner::new(NegativeTimePolicy::Clamp)
        .combine(vec![Segment::new(a, 1000)])
        .unwrap_err();

    assert_eq!(err, SubtitleError::InvalidTimestamp("later".to_string()));
}

#[test]
fn test_pair_segments_withCountMismatch_shouldFail() {
    let sequences = vec![collection("a.srt", vec![]), collection("b.srt", vec![])];

    let err = pair_segments(sequences, &[1000]).unwrap_err();

    assert_eq!(err, ConfigError::CountMismatch { kind: "durations", given: 1, expected: 2 });
}

#[test]
fn test_combine_files_withMissingFirstFile_shouldShiftRealEntries() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("missingFile.srt");
    let real = common::create_test_file(
        temp_dir.path(),
        "real.srt",
        "4\n00:00:00,000 --> 00:00:01,000\nOne\n\n8\n00:00:02,000 --> 00:00:03,000\nTwo\n",
    )?;
    let output = temp_dir.path().join("combined.srt");

    let written = combine_files(&[missing, real], &[5000, 3000], &output)?;

    assert_eq!(written, 2);
    assert_eq!(
        fs::read_to_string(&output)?,
        "1\n00:00:05,000 --> 00:00:06,000\nOne\n\n2\n00:00:07,000 --> 00:00:08,000\nTwo\n"
    );
    Ok(())
}

#[test]
fn test_combine_files_withCountMismatch_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_subtitle(temp_dir.path(), "a.srt")?;
    let b = common::create_test_subtitle(temp_dir.path(), "b.srt")?;
    let output = temp_dir.path().join("combined.srt");

    let result = combine_files(&[a, b], &[1000], &output);

    assert!(result.is_err());
    assert!(!output.exists());
    Ok(())
}
