/*!
 * Tests for file and folder utilities
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use gornikeaf::file_utils::FileManager;
use crate::common;

#[test]
fn test_participantId_withEafFile_shouldStripExtension() {
    assert_eq!(FileManager::participant_id("recordings/P01.eaf"), "P01");
    assert_eq!(FileManager::participant_id("P01.EAF"), "P01");
    assert_eq!(FileManager::participant_id("Family 12.session.eaf"), "Family 12.session");
}

#[test]
fn test_participantId_withOtherExtension_shouldKeepFullName() {
    assert_eq!(FileManager::participant_id("P01.txt"), "P01.txt");
    assert_eq!(FileManager::participant_id("P01"), "P01");
}

#[test]
fn test_fileAndDirExists_shouldDistinguishKinds() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.eaf", "x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.eaf")));
    Ok(())
}

#[test]
fn test_collectEafFiles_withDirectory_shouldFindSortedEafFilesRecursively() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("family");
    fs::create_dir_all(&nested)?;
    common::create_test_file(temp_dir.path(), "P02.eaf", "x")?;
    common::create_test_file(temp_dir.path(), "P01.eaf", "x")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "x")?;
    common::create_test_file(&nested, "P03.EAF", "x")?;

    let files = FileManager::collect_eaf_files(&[temp_dir.path().to_path_buf()])?;

    let names: Vec<String> = files.iter().map(FileManager::participant_id).collect();
    assert_eq!(names, vec!["P01", "P02", "P03"]);
    Ok(())
}

/// Non-directory inputs are kept so the loader can report them
#[test]
fn test_collectEafFiles_withPlainPaths_shouldPassThroughInOrder() -> Result<()> {
    let inputs = vec![PathBuf::from("b.eaf"), PathBuf::from("missing/a.eaf")];

    let files = FileManager::collect_eaf_files(&inputs)?;

    assert_eq!(files, inputs);
    Ok(())
}

#[test]
fn test_ensureDir_withNestedPath_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir("")?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}
