//! Scanner behavior: base-dir computation, deterministic ordering, and the
//! estimation fallback.

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use volpack::estimate::SizeEstimator;
use volpack::filter::{GlobFilter, MatchAll};
use volpack::scan::{common_parent, estimate_entries, scan_paths};

#[test]
fn common_parent_of_siblings_is_their_directory() {
    let paths = vec![
        PathBuf::from("/data/photos/2023"),
        PathBuf::from("/data/photos/2024"),
        PathBuf::from("/data/photos/misc"),
    ];
    assert_eq!(common_parent(&paths), PathBuf::from("/data/photos"));
}

#[test]
fn common_parent_of_unrelated_paths_is_the_root() {
    let paths = vec![PathBuf::from("/data/a"), PathBuf::from("/var/b")];
    assert_eq!(common_parent(&paths), PathBuf::from("/"));
}

#[test]
fn common_parent_of_nothing_is_empty() {
    assert_eq!(common_parent(&[]), PathBuf::new());
}

#[test]
fn scan_collects_relative_paths_in_sorted_order() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("b.txt"), b"bb").unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    fs::write(dir.path().join("sub/c.txt"), b"ccc").unwrap();

    let outcome = scan_paths(&[dir.path().to_path_buf()], &MatchAll).unwrap();
    let names: Vec<String> = outcome
        .files
        .iter()
        .map(|(p, _)| p.display().to_string())
        .collect();
    assert_eq!(names, ["a.txt", "b.txt", "sub/c.txt"]);
    assert_eq!(outcome.files[0].1, 1);
    assert_eq!(outcome.files[1].1, 2);
    assert_eq!(outcome.files[2].1, 3);
    assert!(outcome.ignored.is_empty());
}

#[test]
fn scan_records_filtered_files_as_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("keep.txt"), b"k").unwrap();
    fs::write(dir.path().join("drop.tmp"), b"d").unwrap();

    let filter = GlobFilter::new(&["*.txt".to_string()], &[]).unwrap();
    let outcome = scan_paths(&[dir.path().to_path_buf()], &filter).unwrap();
    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.files[0].0, PathBuf::from("keep.txt"));
    assert_eq!(outcome.ignored.len(), 1);
    assert!(outcome.ignored[0].ends_with("drop.tmp"));
}

#[test]
fn single_file_input_keeps_its_name_relative_to_the_parent() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.dat"), b"data").unwrap();

    let outcome = scan_paths(&[dir.path().join("only.dat")], &MatchAll).unwrap();
    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.files[0].0, PathBuf::from("only.dat"));
}

#[test]
fn missing_input_is_an_error() {
    assert!(scan_paths(&[PathBuf::from("/no/such/input")], &MatchAll).is_err());
}

#[test]
fn without_an_estimator_the_raw_size_is_the_estimate() {
    let entries = estimate_entries(
        &PathBuf::from("/base"),
        vec![(PathBuf::from("a"), 42), (PathBuf::from("b"), 0)],
        None,
    );
    assert_eq!(entries[0].size, 42);
    assert_eq!(entries[0].est_size, 42);
    assert_eq!(entries[1].est_size, 0);
}

#[test]
fn failed_estimation_falls_back_to_the_raw_size() {
    // The files do not exist under this base, so every estimate errors and
    // degrades to the raw size.
    let estimator = SizeEstimator::default();
    let entries = estimate_entries(
        &PathBuf::from("/nonexistent-base"),
        vec![(PathBuf::from("ghost.bin"), 1234)],
        Some(&estimator),
    );
    assert_eq!(entries[0].est_size, 1234);
}

#[test]
fn real_estimation_runs_when_an_estimator_is_given() {
    let dir = tempdir().unwrap();
    let data = vec![b'a'; 50 * 1024];
    fs::write(dir.path().join("rep.txt"), &data).unwrap();

    let estimator = SizeEstimator::default();
    let entries = estimate_entries(
        dir.path(),
        vec![(PathBuf::from("rep.txt"), data.len() as u64)],
        Some(&estimator),
    );
    assert_eq!(entries[0].size, data.len() as u64);
    assert!(entries[0].est_size < data.len() as u64 / 2);
}
