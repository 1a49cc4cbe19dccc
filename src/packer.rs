//! # The Partition Dispatch Engine
//!
//! Assigns files to bounded-size partitions ("volumes"). Three strategies sit
//! behind one [`Packer::dispatch`] entry point:
//!
//! 1. **SingleVolume**: no constraints, everything in one partition.
//! 2. **Constrained**: bounded by a maximum aggregate estimated size and/or a
//!    maximum entry count, with an unbounded partition count. Files larger
//!    than the size limit go through a multi-pass overflow-resolution loop
//!    that widens the effective limit until every file lands somewhere.
//! 3. **FixedCount**: exactly N partitions, balanced with the classic
//!    Longest-Processing-Time-first greedy heuristic.
//!
//! Packing is deterministic and pure given its inputs: dispatching the same
//! ordered entry list twice yields bit-identical partitions. Bin-packing is
//! NP-hard; these are documented heuristics, not optimal solutions.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::PackError;
use crate::sort::{self, SortPolicy};

/// A single file to be packed: its archive-relative path, its raw size, and
/// the estimated post-compression size the packer actually bins by.
///
/// Created once during the estimation phase and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the scan base directory. Unique per scan.
    pub path: PathBuf,
    /// Raw size in bytes.
    pub size: u64,
    /// Estimated compressed size in bytes. Equals `size` when no estimation
    /// ran (non-compressing output formats, or estimation I/O failure).
    pub est_size: u64,
}

impl FileEntry {
    pub fn new(path: PathBuf, size: u64, est_size: u64) -> Self {
        FileEntry { path, size, est_size }
    }
}

/// An ordered accumulator of [`FileEntry`] values with a running aggregate of
/// their estimated sizes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    entries: Vec<FileEntry>,
    total_size: u64,
}

impl Partition {
    pub fn new() -> Self {
        Partition::default()
    }

    /// Appends an entry, maintaining the `total_size == sum(est_size)`
    /// invariant incrementally.
    pub fn push(&mut self, entry: FileEntry) {
        self.total_size += entry.est_size;
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<FileEntry> {
        self.entries
    }

    /// Reorders this partition's entries according to `policy`. Membership
    /// and `total_size` are unaffected.
    pub fn sort_entries(&mut self, policy: SortPolicy) {
        sort::sort_entries(&mut self.entries, policy);
    }
}

/// A partition-dispatch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packer {
    /// Everything into one partition.
    SingleVolume,
    /// Bounded partitions, unbounded partition count. A zero limit means
    /// "unbounded" for that axis; at least one must be non-zero.
    Constrained { max_size: u64, max_entries: usize },
    /// Exactly `count` partitions, greedily balanced by estimated size.
    FixedCount { count: usize },
}

impl Packer {
    /// Consumes an ordered entry list and produces the ordered partition
    /// list. The multiset of entries across the output always equals the
    /// input; no internal sentinel ever appears in the result.
    pub fn dispatch(&self, entries: Vec<FileEntry>) -> Result<Vec<Partition>, PackError> {
        match *self {
            Packer::SingleVolume => {
                let mut part = Partition::new();
                for entry in entries {
                    part.push(entry);
                }
                Ok(vec![part])
            }
            Packer::Constrained { max_size, max_entries } => {
                if max_size == 0 && max_entries == 0 {
                    return Err(PackError::Config(
                        "constrained packing needs a size or entry limit".into(),
                    ));
                }
                dispatch_constrained(entries, max_size, max_entries)
            }
            Packer::FixedCount { count } => {
                if count == 0 {
                    return Err(PackError::Config(
                        "partition count must be positive".into(),
                    ));
                }
                Ok(dispatch_fixed(entries, count))
            }
        }
    }
}

/// One greedy pass over `entries`.
///
/// When `max_size > 0`, partition 0 is a sentinel overflow bucket holding
/// files that individually exceed the limit; normal partitions start at
/// index 1. The fill cursor rescans from the first normal partition for
/// every file, so earlier partitions are topped up by later small files.
fn single_pass(entries: Vec<FileEntry>, max_size: u64, max_entries: usize) -> Vec<Partition> {
    let (mut partitions, first_normal) = if max_size > 0 {
        (vec![Partition::new(), Partition::new()], 1)
    } else {
        (vec![Partition::new()], 0)
    };

    for entry in entries {
        if max_size > 0 && entry.est_size > max_size {
            partitions[0].push(entry);
            continue;
        }
        let mut pn = first_normal;
        loop {
            let over_entries = max_entries > 0 && partitions[pn].len() + 1 > max_entries;
            let over_size =
                max_size > 0 && partitions[pn].total_size() + entry.est_size > max_size;
            if over_entries || over_size {
                // Chain a new partition once the scan runs off the end.
                if pn == partitions.len() - 1 {
                    partitions.push(Partition::new());
                }
                pn += 1;
            } else {
                partitions[pn].push(entry);
                break;
            }
        }
    }
    partitions
}

/// Constrained dispatch with multi-pass overflow resolution.
///
/// A single pass strands files bigger than `max_size` in the overflow
/// sentinel. Those are re-dispatched with the effective limit widened to
/// `max_size * k` for k = 2, 3, 4, ...; each round's non-overflow partitions
/// are kept and only the still-oversized remainder feeds the next round.
/// Partitions holding ordinary files stay near the true target; only volumes
/// built for outsized files grow.
///
/// Terminates once `max_size * k` reaches the largest single estimate. If it
/// somehow does not, that is reported as a defect rather than looping
/// forever.
fn dispatch_constrained(
    entries: Vec<FileEntry>,
    max_size: u64,
    max_entries: usize,
) -> Result<Vec<Partition>, PackError> {
    let mut partitions = single_pass(entries, max_size, max_entries);

    if max_size > 0 {
        let largest = partitions[0]
            .entries()
            .iter()
            .map(|e| e.est_size)
            .max()
            .unwrap_or(0);
        let pass_limit = largest / max_size + 2;
        let mut factor: u64 = 1;
        while !partitions[0].is_empty() {
            factor += 1;
            if factor > pass_limit {
                return Err(PackError::Convergence { passes: factor });
            }
            let widened = max_size.checked_mul(factor).ok_or(PackError::Convergence {
                passes: factor,
            })?;
            let overflow = std::mem::take(&mut partitions[0]);
            let mut widened_parts = single_pass(overflow.into_entries(), widened, max_entries);
            partitions[0] = widened_parts.remove(0);
            partitions.extend(widened_parts.into_iter().filter(|p| !p.is_empty()));
        }
        // Drop the (now empty) sentinel.
        partitions.remove(0);
    }

    partitions.retain(|p| !p.is_empty());
    Ok(partitions)
}

/// Fixed-count dispatch: Longest-Processing-Time-first load balancing.
///
/// Always returns exactly `count` partitions, empty ones included. Non-zero
/// files are placed largest-first into the currently lightest partition
/// (lowest index on ties); the descending sort is stable, so files of equal
/// estimated size keep their input order. Zero-size files are then spread
/// round-robin, the remainder landing in the first partitions.
///
/// LPT is a 4/3-approximation to the optimal makespan; good enough here.
fn dispatch_fixed(entries: Vec<FileEntry>, count: usize) -> Vec<Partition> {
    let mut partitions = vec![Partition::new(); count];
    let (mut sized, zero_sized): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.est_size > 0);
    sized.sort_by(|a, b| b.est_size.cmp(&a.est_size));

    for entry in sized {
        let lightest = partitions
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.total_size())
            .map(|(i, _)| i)
            .unwrap_or(0);
        partitions[lightest].push(entry);
    }

    for (i, entry) in zero_sized.into_iter().enumerate() {
        partitions[i % count].push(entry);
    }
    partitions
}
