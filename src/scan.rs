//! File discovery and the estimation phase.
//!
//! The scanner walks the input paths, applies the selection predicate, and
//! produces the ordered `(relative path, raw size)` list the dispatch core
//! consumes. Paths are made relative to the longest common ancestor of the
//! inputs so volumes reproduce the original layout. Unreadable files are
//! logged and skipped; a failed estimation falls back to the raw size and
//! never aborts the run.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::PackError;
use crate::estimate::SizeEstimator;
use crate::filter::Predicate;
use crate::packer::FileEntry;

/// The result of scanning the input paths.
pub struct ScanOutcome {
    /// Longest common ancestor of the inputs; all file paths are relative to
    /// this directory.
    pub base_dir: PathBuf,
    /// Selected files in discovery order, as `(relative path, raw size)`.
    pub files: Vec<(PathBuf, u64)>,
    /// Files rejected by the filter, for the index trailer.
    pub ignored: Vec<PathBuf>,
}

/// Returns the longest common ancestor directory shared by all provided
/// paths. If the slice is empty, an empty `PathBuf` is returned.
pub fn common_parent(paths: &[PathBuf]) -> PathBuf {
    use std::path::Component;

    if paths.is_empty() {
        return PathBuf::new();
    }

    let mut prefix: Vec<Component> = paths[0].components().collect();
    for p in &paths[1..] {
        let comps: Vec<Component> = p.components().collect();
        let mut idx = 0usize;
        while idx < prefix.len() && idx < comps.len() && prefix[idx] == comps[idx] {
            idx += 1;
        }
        prefix.truncate(idx);
        if prefix.is_empty() {
            break;
        }
    }

    let mut out = PathBuf::new();
    for c in prefix {
        out.push(c.as_os_str());
    }

    // Edge-case: if the common prefix is a file itself (single input file),
    // use its parent so the relative path keeps the file name.
    if out.as_os_str().is_empty() || out.is_file() {
        if let Some(par) = paths[0].parent() {
            return par.to_path_buf();
        }
    }

    out
}

/// Walks `inputs`, applying `filter` to every regular file.
///
/// Directories are traversed with `walkdir` in its deterministic
/// depth-first order; symlinks are not followed. Per-file stat failures are
/// logged and the file skipped.
pub fn scan_paths(inputs: &[PathBuf], filter: &dyn Predicate) -> Result<ScanOutcome, PackError> {
    let absolute: Vec<PathBuf> = inputs
        .iter()
        .map(|p| {
            std::fs::canonicalize(p).map_err(|e| PackError::Io { source: e, path: p.clone() })
        })
        .collect::<Result<_, _>>()?;
    let base_dir = common_parent(&absolute);

    info!("Scanning files...");
    let mut files = Vec::new();
    let mut ignored = Vec::new();
    for path in &absolute {
        if path.is_file() {
            collect_file(path, &base_dir, filter, &mut files, &mut ignored)?;
        } else {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!("Can't access {}", e.path().unwrap_or(Path::new("?")).display());
                        continue;
                    }
                };
                if entry.file_type().is_file() {
                    collect_file(entry.path(), &base_dir, filter, &mut files, &mut ignored)?;
                }
            }
        }
    }
    Ok(ScanOutcome { base_dir, files, ignored })
}

fn collect_file(
    path: &Path,
    base_dir: &Path,
    filter: &dyn Predicate,
    files: &mut Vec<(PathBuf, u64)>,
    ignored: &mut Vec<PathBuf>,
) -> Result<(), PackError> {
    if !filter.matches(path) {
        ignored.push(path.to_path_buf());
        return Ok(());
    }
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("Can't access {}: {}", path.display(), e);
            return Ok(());
        }
    };
    let rel = path
        .strip_prefix(base_dir)
        .map_err(|_| PackError::StripPrefix {
            prefix: base_dir.to_path_buf(),
            path: path.to_path_buf(),
        })?
        .to_path_buf();
    files.push((rel, size));
    Ok(())
}

/// Runs the estimation phase over a scanned file list, producing the
/// immutable entries the packer dispatches.
///
/// When `estimator` is `None` (non-compressing output formats) the raw size
/// is used as the estimate. Estimation I/O errors degrade to the raw size
/// with a warning; the file is still packed.
pub fn estimate_entries(
    base_dir: &Path,
    files: Vec<(PathBuf, u64)>,
    estimator: Option<&SizeEstimator>,
) -> Vec<FileEntry> {
    let Some(estimator) = estimator else {
        return files
            .into_iter()
            .map(|(path, size)| FileEntry::new(path, size, size))
            .collect();
    };
    info!("Calculating estimated compressed sizes...");
    files
        .into_iter()
        .map(|(path, size)| {
            let est = match estimator.estimate(&base_dir.join(&path), size) {
                Ok(est) => est,
                Err(e) => {
                    warn!("Estimation failed, using raw size: {}", e);
                    size
                }
            };
            FileEntry::new(path, size, est)
        })
        .collect()
}
