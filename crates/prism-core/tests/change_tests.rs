use super::*;
use std::fs;

#[test]
fn test_unchanged_file_is_not_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    fs::write(&path, "<?php class User {}").unwrap();

    let detector = ContentHashDetector::for_file(&path).unwrap();
    assert!(!detector.has_changed());
    assert_eq!(detector.path(), path.as_path());
}

#[test]
fn test_edited_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    fs::write(&path, "<?php class User {}").unwrap();
    let detector = ContentHashDetector::for_file(&path).unwrap();

    fs::write(&path, "<?php final class User {}").unwrap();
    assert!(detector.has_changed());
}

#[test]
fn test_deleted_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    fs::write(&path, "<?php class User {}").unwrap();
    let detector = ContentHashDetector::for_file(&path).unwrap();

    fs::remove_file(&path).unwrap();
    assert!(detector.has_changed());
}

#[test]
fn test_missing_file_cannot_be_recorded() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ContentHashDetector::for_file(dir.path().join("missing.php")).is_err());
}

#[test]
fn test_recorded_contents_match_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("User.php");
    fs::write(&path, "<?php class User {}").unwrap();

    let from_file = ContentHashDetector::for_file(&path).unwrap();
    let from_contents = ContentHashDetector::for_contents(path.clone(), b"<?php class User {}");
    assert_eq!(from_file, from_contents);
    assert!(!from_contents.has_changed());
}

#[test]
fn test_detector_handles_compare_by_stamp() {
    let a = Detector::new(ContentHashDetector::for_contents("a.php", b"x"));
    let same = Detector::new(ContentHashDetector::for_contents("a.php", b"x"));
    let other = Detector::new(ContentHashDetector::for_contents("a.php", b"y"));
    assert_eq!(a, same);
    assert_ne!(a, other);
    assert_eq!(a, a.clone());
    assert!(a.stamp().starts_with("a.php#"));
}
