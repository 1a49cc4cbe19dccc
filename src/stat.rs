//! Pre-flight statistics over input trees.
//!
//! Answers "what am I about to pack?" before choosing volume limits: entry
//! counts, file-size distribution, modification-time spread, and the top
//! extensions by count and by aggregate size.

use chrono::{Local, TimeZone};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::config::format_size;

/// Aggregated statistics over a set of paths.
#[derive(Debug, Default)]
pub struct PathStats {
    pub files: u64,
    pub dirs: u64,
    pub symlinks: u64,
    pub errors: u64,
    pub sizes: Vec<u64>,
    pub mtimes: Vec<i64>,
    pub by_ext_count: HashMap<String, u64>,
    pub by_ext_size: HashMap<String, u64>,
}

impl PathStats {
    pub fn total_size(&self) -> u64 {
        self.sizes.iter().sum()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Walks `paths` and accumulates statistics. Unreadable entries are counted
/// as errors rather than aborting.
pub fn collect_stats(paths: &[PathBuf]) -> PathStats {
    let mut stats = PathStats::default();
    for path in paths {
        for entry in WalkDir::new(path) {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => {
                    stats.errors += 1;
                    continue;
                }
            };
            let ftype = entry.file_type();
            if ftype.is_symlink() {
                stats.symlinks += 1;
                continue;
            }
            if ftype.is_dir() {
                stats.dirs += 1;
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(_) => {
                    stats.errors += 1;
                    continue;
                }
            };
            stats.files += 1;
            let size = meta.len();
            stats.sizes.push(size);
            if let Ok(mtime) = meta.modified() {
                let secs = match mtime.duration_since(UNIX_EPOCH) {
                    Ok(d) => d.as_secs() as i64,
                    Err(e) => -(e.duration().as_secs() as i64),
                };
                stats.mtimes.push(secs);
            }
            let ext = extension_of(entry.path());
            *stats.by_ext_count.entry(ext.clone()).or_insert(0) += 1;
            *stats.by_ext_size.entry(ext).or_insert(0) += size;
        }
    }
    stats
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<u64>() as f64 / values.len() as f64
}

fn median(sorted: &[u64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2] as f64,
        n => (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0,
    }
}

fn pstdev(values: &[u64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

fn top5(map: &HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut items: Vec<_> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // Deterministic order: count descending, then extension.
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(5);
    items
}

fn fmt_epoch(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("@{}", secs),
    }
}

/// Renders the statistics report the way the CLI prints it.
pub fn render(stats: &PathStats) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} files, {} directories, {} symlinks, {} errors. {} data.\n",
        stats.files,
        stats.dirs,
        stats.symlinks,
        stats.errors,
        format_size(stats.total_size())
    ));
    if stats.sizes.is_empty() {
        return out;
    }

    let mut sorted = stats.sizes.clone();
    sorted.sort_unstable();
    let avg = mean(&sorted);
    let dev = pstdev(&sorted, avg);
    out.push_str(&format!(
        "File size: max {}, mean {}, median {}, stdev {}\n",
        format_size(*sorted.last().unwrap_or(&0)),
        format_size(avg as u64),
        format_size(median(&sorted) as u64),
        format_size(dev as u64)
    ));

    if let (Some(&min_t), Some(&max_t)) = (stats.mtimes.iter().min(), stats.mtimes.iter().max()) {
        out.push_str("Modification time:\n");
        out.push_str(&format!(" min    {}\n", fmt_epoch(min_t)));
        out.push_str(&format!(" max    {}\n", fmt_epoch(max_t)));
    }

    let count_total: u64 = stats.by_ext_count.values().sum();
    if count_total > 0 {
        out.push_str("File type by number:\n");
        for (ext, n) in top5(&stats.by_ext_count) {
            let label = if ext.is_empty() { "<N/A>".to_string() } else { ext };
            out.push_str(&format!(
                " {:>6}: {:.2}%\n",
                label,
                n as f64 / count_total as f64 * 100.0
            ));
        }
    }
    let size_total: u64 = stats.by_ext_size.values().sum();
    if size_total > 0 {
        out.push_str("File type by size:\n");
        for (ext, n) in top5(&stats.by_ext_size) {
            let label = if ext.is_empty() { "<N/A>".to_string() } else { ext };
            out.push_str(&format!(
                " {:>6}: {:.2}%\n",
                label,
                n as f64 / size_total as f64 * 100.0
            ));
        }
    }
    out
}
