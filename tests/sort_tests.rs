//! Within-partition ordering policies.

use std::path::PathBuf;

use volpack::packer::FileEntry;
use volpack::sort::{sort_entries, SortPolicy};

fn entry(path: &str) -> FileEntry {
    FileEntry::new(PathBuf::from(path), 1, 1)
}

fn paths(entries: &[FileEntry]) -> Vec<String> {
    entries.iter().map(|e| e.path.display().to_string()).collect()
}

#[test]
fn none_preserves_input_order() {
    let mut v = vec![entry("b.txt"), entry("a.txt"), entry("c.txt")];
    sort_entries(&mut v, SortPolicy::None);
    assert_eq!(paths(&v), ["b.txt", "a.txt", "c.txt"]);
}

#[test]
fn lexicographic_sorts_by_full_path() {
    let mut v = vec![entry("dir/z.txt"), entry("a.txt"), entry("dir/a.txt")];
    sort_entries(&mut v, SortPolicy::Lexicographic);
    assert_eq!(paths(&v), ["a.txt", "dir/a.txt", "dir/z.txt"]);
}

#[test]
fn ext_local_groups_types_within_each_directory() {
    let mut v = vec![
        entry("d1/readme.txt"),
        entry("d1/photo.jpg"),
        entry("d0/notes.txt"),
        entry("d1/data.7z"),
    ];
    sort_entries(&mut v, SortPolicy::ExtLocal);
    // Directories first, then extension rank inside each: 7z and jpg rank
    // before txt.
    assert_eq!(
        paths(&v),
        ["d0/notes.txt", "d1/data.7z", "d1/photo.jpg", "d1/readme.txt"]
    );
}

#[test]
fn ext_global_ignores_directories() {
    let mut v = vec![
        entry("d1/readme.txt"),
        entry("d0/notes.txt"),
        entry("d1/photo.jpg"),
    ];
    sort_entries(&mut v, SortPolicy::ExtGlobal);
    // jpg ranks before txt regardless of directory; same-extension files
    // order by basename.
    assert_eq!(paths(&v), ["d1/photo.jpg", "d0/notes.txt", "d1/readme.txt"]);
}

#[test]
fn extensionless_files_sort_before_ranked_ones() {
    let mut v = vec![entry("archive.7z"), entry("Makefile")];
    sort_entries(&mut v, SortPolicy::ExtGlobal);
    assert_eq!(paths(&v), ["Makefile", "archive.7z"]);
}

#[test]
fn extension_case_is_ignored() {
    let mut v = vec![entry("b.TXT"), entry("a.JPG")];
    sort_entries(&mut v, SortPolicy::ExtGlobal);
    assert_eq!(paths(&v), ["a.JPG", "b.TXT"]);
}

#[test]
fn sorting_never_changes_membership_or_totals() {
    let mut v = vec![
        FileEntry::new(PathBuf::from("x/a.mp3"), 10, 9),
        FileEntry::new(PathBuf::from("y/b.txt"), 20, 5),
        FileEntry::new(PathBuf::from("z/c"), 30, 30),
    ];
    let total: u64 = v.iter().map(|e| e.est_size).sum();
    sort_entries(&mut v, SortPolicy::ExtLocal);
    assert_eq!(v.len(), 3);
    assert_eq!(v.iter().map(|e| e.est_size).sum::<u64>(), total);
}
