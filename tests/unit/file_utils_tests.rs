/*!
 * Tests for file utility functions
 */

use std::fs;
use anyhow::Result;
use srtcombine::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files and directories
#[test]
fn test_file_exists_withNonExistentFileOrDir_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    assert!(!FileManager::file_exists(temp_dir.path().join("non_existent_file.tmp")));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("test_subdir").join("deeper");

    FileManager::ensure_dir(&test_subdir)?;

    assert!(test_subdir.is_dir());
    Ok(())
}

/// Test that an empty parent (bare file name) is accepted
#[test]
fn test_ensure_dir_withEmptyPath_shouldDoNothing() -> Result<()> {
    FileManager::ensure_dir("")?;
    Ok(())
}

/// Test that write_to_file and read_to_string round trip content
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParentAndWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.srt");

    FileManager::write_to_file(&path, "1\n00:00:00,000 --> 00:00:01,000\nÄrger über Ü\n")?;

    assert_eq!(FileManager::read_to_string(&path)?, "1\n00:00:00,000 --> 00:00:01,000\nÄrger über Ü\n");
    assert_eq!(fs::metadata(&path)?.len() as usize, "1\n00:00:00,000 --> 00:00:01,000\nÄrger über Ü\n".len());
    Ok(())
}

/// Test that read_to_string reports the missing path
#[test]
fn test_read_to_string_withMissingFile_shouldFailWithPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("gone.srt");

    let err = FileManager::read_to_string(&missing).unwrap_err();

    assert!(err.to_string().contains("gone.srt"));
    Ok(())
}
