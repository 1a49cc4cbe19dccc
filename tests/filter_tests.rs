//! File-selection predicates.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::tempdir;

use volpack::filter::{
    AllOf, GlobFilter, MatchAll, NoneOf, Predicate, RegexFilter, SizeFilter, TimeFilter,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_include_list_matches_everything() {
    let f = GlobFilter::new(&[], &[]).unwrap();
    assert!(f.matches(Path::new("/some/deep/path/file.bin")));
}

#[test]
fn glob_star_and_question_mark() {
    let f = GlobFilter::new(&strings(&["*.txt"]), &[]).unwrap();
    assert!(f.matches(Path::new("/tmp/notes.txt")));
    assert!(!f.matches(Path::new("/tmp/notes.txt.bak")));

    let f = GlobFilter::new(&strings(&["*/file?.dat"]), &[]).unwrap();
    assert!(f.matches(Path::new("/tmp/file1.dat")));
    assert!(!f.matches(Path::new("/tmp/file12.dat")));
}

#[test]
fn glob_character_classes() {
    let f = GlobFilter::new(&strings(&["*/img[0-9].png"]), &[]).unwrap();
    assert!(f.matches(Path::new("/x/img3.png")));
    assert!(!f.matches(Path::new("/x/imgA.png")));

    let f = GlobFilter::new(&strings(&["*/img[!0-9].png"]), &[]).unwrap();
    assert!(f.matches(Path::new("/x/imgA.png")));
    assert!(!f.matches(Path::new("/x/img3.png")));
}

#[test]
fn glob_exclusions_win_over_inclusions() {
    let f = GlobFilter::new(&strings(&["*.log"]), &strings(&["*debug*"])).unwrap();
    assert!(f.matches(Path::new("/var/app.log")));
    assert!(!f.matches(Path::new("/var/debug.log")));
}

#[test]
fn glob_special_regex_chars_are_literal() {
    let f = GlobFilter::new(&strings(&["*file+(1).txt"]), &[]).unwrap();
    assert!(f.matches(Path::new("/tmp/file+(1).txt")));
    assert!(!f.matches(Path::new("/tmp/fileX1X.txt")));
}

#[test]
fn bad_glob_is_a_config_error() {
    assert!(GlobFilter::new(&strings(&["[z-a]"]), &[]).is_err());
}

#[test]
fn regex_matches_from_path_start() {
    let f = RegexFilter::new(&strings(&["/home/.*\\.rs"]), &[]).unwrap();
    assert!(f.matches(Path::new("/home/user/main.rs")));
    // Not a substring search: the pattern must match at offset zero.
    assert!(!f.matches(Path::new("/mnt/home/user/main.rs")));
}

#[test]
fn regex_exclusions_win() {
    let f = RegexFilter::new(&[], &strings(&[".*\\.tmp$"])).unwrap();
    assert!(f.matches(Path::new("/a/keep.txt")));
    assert!(!f.matches(Path::new("/a/drop.tmp")));
}

#[test]
fn bad_regex_is_a_config_error() {
    assert!(RegexFilter::new(&strings(&["(unclosed"]), &[]).is_err());
}

#[test]
fn size_filter_bounds_are_inclusive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ten.bin");
    fs::write(&path, vec![0u8; 10]).unwrap();

    let within = SizeFilter { min_size: Some(10), max_size: Some(10) };
    assert!(within.matches(&path));

    let too_small = SizeFilter { min_size: Some(11), max_size: None };
    assert!(!too_small.matches(&path));

    let too_big = SizeFilter { min_size: None, max_size: Some(9) };
    assert!(!too_big.matches(&path));
}

#[test]
fn size_filter_rejects_unreadable_paths() {
    let f = SizeFilter { min_size: None, max_size: None };
    assert!(!f.matches(Path::new("/nonexistent/whatever")));
}

#[test]
fn time_filter_brackets_the_mtime() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("now.txt");
    fs::write(&path, b"x").unwrap();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let recent = TimeFilter { after: Some(now - 3600), before: None };
    assert!(recent.matches(&path));

    let ancient = TimeFilter { after: None, before: Some(now - 3600) };
    assert!(!ancient.matches(&path));

    let window = TimeFilter { after: Some(now - 3600), before: Some(now + 3600) };
    assert!(window.matches(&path));
}

#[test]
fn all_of_requires_every_predicate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, vec![0u8; 100]).unwrap();

    let mut f = AllOf::new();
    assert!(f.is_empty());
    f.push(Box::new(GlobFilter::new(&strings(&["*.txt"]), &[]).unwrap()));
    f.push(Box::new(SizeFilter { min_size: Some(50), max_size: None }));
    assert!(f.matches(&path));

    f.push(Box::new(SizeFilter { min_size: Some(1000), max_size: None }));
    assert!(!f.matches(&path));
}

#[test]
fn none_of_inverts_its_predicates() {
    let mut f = NoneOf::new();
    f.push(Box::new(GlobFilter::new(&strings(&["*.bak"]), &[]).unwrap()));
    assert!(f.matches(Path::new("/a/file.txt")));
    assert!(!f.matches(Path::new("/a/file.bak")));
}

#[test]
fn match_all_accepts_anything() {
    assert!(MatchAll.matches(Path::new("/no/such/file")));
    assert!(MatchAll.matches(&PathBuf::new()));
}
