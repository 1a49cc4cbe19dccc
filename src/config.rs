//! Packing configuration and human-readable size strings.

use crate::error::PackError;
use crate::estimate::{DEFAULT_ERROR_MARGIN, DEFAULT_SAMPLE_SIZE};
use crate::packer::Packer;
use crate::sort::SortPolicy;

/// The configuration surface consumed by the dispatch core.
///
/// A zero `max_size` or `max_entries` means "unbounded". When `fixed_count`
/// is set it overrides both limits and selects the load-balancing packer.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Maximum aggregate estimated size per partition, in bytes. 0 = unbounded.
    pub max_size: u64,
    /// Maximum number of entries per partition. 0 = unbounded.
    pub max_entries: usize,
    /// Exact number of partitions to produce, overriding the two limits above.
    pub fixed_count: Option<usize>,
    /// Within-partition ordering applied after packing.
    pub sort_policy: SortPolicy,
    /// Safety margin subtracted from the quick-compressor estimate.
    pub error_margin: f64,
    /// Number of bytes sampled from each file for estimation.
    pub sample_size: usize,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            max_size: 0,
            max_entries: 0,
            fixed_count: None,
            sort_policy: SortPolicy::None,
            error_margin: DEFAULT_ERROR_MARGIN,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl PackConfig {
    /// Validates the configuration. Called once at startup; any violation is
    /// fatal before packing begins.
    pub fn validate(&self) -> Result<(), PackError> {
        if let Some(n) = self.fixed_count {
            if n == 0 {
                return Err(PackError::Config(
                    "partition count must be positive".into(),
                ));
            }
        }
        if !self.error_margin.is_finite() || self.error_margin < 0.0 {
            return Err(PackError::Config(format!(
                "error margin must be a non-negative number, got {}",
                self.error_margin
            )));
        }
        if self.sample_size == 0 {
            return Err(PackError::Config("sample size must be positive".into()));
        }
        Ok(())
    }

    /// Selects the packing strategy implied by this configuration.
    pub fn packer(&self) -> Packer {
        if let Some(count) = self.fixed_count {
            Packer::FixedCount { count }
        } else if self.max_size > 0 || self.max_entries > 0 {
            Packer::Constrained { max_size: self.max_size, max_entries: self.max_entries }
        } else {
            Packer::SingleVolume
        }
    }
}

const SIZE_SUFFIXES: &[char] = &['B', 'K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Parses a human-readable size string with binary-prefix semantics.
///
/// Bare integers are raw byte counts; a trailing suffix scales by powers of
/// 1024 (`K` = 2^10 .. `Y` = 2^80, case-insensitive). Values that overflow
/// `u64` saturate.
///
/// ```
/// assert_eq!(volpack::config::parse_size("1G").unwrap(), 1073741824);
/// assert_eq!(volpack::config::parse_size("500M").unwrap(), 524288000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, PackError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PackError::Config("empty size string".into()));
    }
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    // Reject "-5" and friends before splitting off the suffix.
    if let Ok(n) = s.parse::<i64>() {
        return Err(PackError::Config(format!("size must be non-negative: {}", n)));
    }
    // Split on a char boundary; the suffix may be any (possibly multi-byte)
    // character, rejected below if unrecognized.
    let (last_idx, last) = s
        .char_indices()
        .last()
        .ok_or_else(|| PackError::Config("empty size string".into()))?;
    let num_part = &s[..last_idx];
    let letter = last.to_ascii_uppercase();
    let exp = SIZE_SUFFIXES
        .iter()
        .position(|&c| c == letter)
        .ok_or_else(|| PackError::Config(format!("unknown size suffix in '{}'", s)))?;
    let num: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| PackError::Config(format!("invalid size string '{}'", s)))?;
    if !num.is_finite() || num < 0.0 {
        return Err(PackError::Config(format!("size must be non-negative: '{}'", s)));
    }
    Ok((num * 2f64.powi(10 * exp as i32)) as u64)
}

/// Formats a byte count with binary units, matching the index header style
/// ("3.5KiB", "1.2GiB").
pub fn format_size(num: u64) -> String {
    let mut val = num as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"] {
        if val < 1024.0 {
            return format!("{:.1}{}B", val, unit);
        }
        val /= 1024.0;
    }
    format!("{:.1}YiB", val)
}
