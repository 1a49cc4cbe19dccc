//! # Compressed-Size Estimation
//!
//! Predicts a file's post-compression size from a small sample instead of
//! compressing the whole file. The sample is taken from the middle of the
//! file so that headers and footers do not bias the ratio, then run through
//! a fast zstd pass. The measured ratio is sanity-checked against the
//! sample's normalized Shannon entropy: when the quick compressor does worse
//! than the entropy bound the data is treated as incompressible and no
//! downward correction is applied.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::PackError;

/// Default number of bytes sampled per file.
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// Default safety margin subtracted from the quick-compressor estimate, so
/// that the real archiver beating the quick pass does not leave volumes
/// half-empty.
pub const DEFAULT_ERROR_MARGIN: f64 = 0.1;

// Level 1: this pass exists only to measure a ratio, not to compress well.
const ESTIMATE_ZSTD_LEVEL: i32 = 1;

/// Sample-based compressed-size estimator.
#[derive(Debug, Clone)]
pub struct SizeEstimator {
    sample_size: usize,
    error_margin: f64,
}

impl Default for SizeEstimator {
    fn default() -> Self {
        SizeEstimator::new(DEFAULT_SAMPLE_SIZE, DEFAULT_ERROR_MARGIN)
    }
}

impl SizeEstimator {
    pub fn new(sample_size: usize, error_margin: f64) -> Self {
        SizeEstimator { sample_size, error_margin }
    }

    /// Estimates the post-compression size of `path`, whose raw size is
    /// already known to be `raw_size` bytes.
    ///
    /// Zero-size files are estimated at 0 without any I/O. I/O failures
    /// (vanished file, permission denied) are returned to the caller, which
    /// is expected to fall back to `raw_size` and keep packing.
    pub fn estimate(&self, path: &Path, raw_size: u64) -> Result<u64, PackError> {
        if raw_size == 0 {
            return Ok(0);
        }
        let sample = self.read_sample(path, raw_size)?;
        let compressed = zstd::bulk::compress(&sample, ESTIMATE_ZSTD_LEVEL)
            .map_err(|e| PackError::Io { source: e, path: path.to_path_buf() })?;
        let ratio = compressed.len() as f64 / sample.len() as f64;
        let entropy = normalized_entropy(&sample);
        let estimate = if ratio > entropy {
            // Quick compressor underperforms the entropy bound: the data is
            // not easily compressible, so stay pessimistic.
            raw_size as f64 * ratio
        } else {
            raw_size as f64 * ratio / (1.0 + self.error_margin)
        };
        Ok(estimate as u64)
    }

    /// Reads the whole file if it fits in one sample, otherwise a centered
    /// window of `sample_size` bytes.
    fn read_sample(&self, path: &Path, raw_size: u64) -> Result<Vec<u8>, PackError> {
        let mut file = File::open(path)
            .map_err(|e| PackError::Io { source: e, path: path.to_path_buf() })?;
        let mut sample = Vec::with_capacity(self.sample_size.min(raw_size as usize));
        if raw_size <= self.sample_size as u64 {
            file.read_to_end(&mut sample)
                .map_err(|e| PackError::Io { source: e, path: path.to_path_buf() })?;
        } else {
            let offset = (raw_size - self.sample_size as u64) / 2;
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| PackError::Io { source: e, path: path.to_path_buf() })?;
            let mut window = file.take(self.sample_size as u64);
            window
                .read_to_end(&mut sample)
                .map_err(|e| PackError::Io { source: e, path: path.to_path_buf() })?;
        }
        if sample.is_empty() {
            // File shrank to nothing between stat and read.
            return Err(PackError::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "file is empty despite non-zero reported size",
                ),
                path: path.to_path_buf(),
            });
        }
        Ok(sample)
    }
}

/// Normalized Shannon entropy of `data` over byte-value frequencies.
///
/// Returns a value in `[0, 1]`: the theoretical minimum compressed fraction
/// (1.0 = uniformly random bytes, 0.0 = a single repeated value).
pub fn normalized_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    let len = data.len() as f64;
    let mut bits = 0.0;
    for &count in counts.iter().filter(|&&c| c > 0) {
        let p = count as f64 / len;
        bits -= p * p.log2();
    }
    bits / 8.0
}
