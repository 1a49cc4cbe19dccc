//! Sample-based size estimation against real files.

use std::fs;
use std::io::Write;
use std::path::Path;

use rand::{rngs::StdRng, RngCore, SeedableRng};
use tempfile::tempdir;

use volpack::estimate::{normalized_entropy, SizeEstimator};

fn write_file(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(data).unwrap();
    path
}

#[test]
fn zero_size_file_estimates_zero_without_io() {
    let estimator = SizeEstimator::default();
    // The path does not even exist; raw_size == 0 must short-circuit.
    let est = estimator.estimate(Path::new("/nonexistent/empty"), 0).unwrap();
    assert_eq!(est, 0);
}

#[test]
fn repetitive_data_estimates_well_below_raw_size() {
    let dir = tempdir().unwrap();
    let data = vec![b'a'; 100 * 1024];
    let path = write_file(dir.path(), "repeat.txt", &data);
    let estimator = SizeEstimator::default();
    let est = estimator.estimate(&path, data.len() as u64).unwrap();
    assert!(
        est < data.len() as u64 / 2,
        "expected a strong compression estimate, got {est}"
    );
}

#[test]
fn random_data_estimates_near_raw_size() {
    let dir = tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut data = vec![0u8; 64 * 1024];
    rng.fill_bytes(&mut data);
    let path = write_file(dir.path(), "noise.bin", &data);
    let estimator = SizeEstimator::default();
    let est = estimator.estimate(&path, data.len() as u64).unwrap();
    // Incompressible data hits the pessimistic path: no downward correction.
    assert!(
        est >= data.len() as u64 * 9 / 10,
        "random data should not look compressible, got {est}"
    );
}

#[test]
fn estimation_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = vec![0u8; 10 * 1024];
    rng.fill_bytes(&mut data);
    // Make it partially compressible.
    data[..4096].fill(b'x');
    let path = write_file(dir.path(), "mixed.dat", &data);
    let estimator = SizeEstimator::default();
    let a = estimator.estimate(&path, data.len() as u64).unwrap();
    let b = estimator.estimate(&path, data.len() as u64).unwrap();
    assert_eq!(a, b);
}

#[test]
fn larger_error_margin_lowers_the_estimate() {
    let dir = tempdir().unwrap();
    // Repeated multi-byte pattern: the quick compressor beats the order-0
    // entropy bound, so the margin-corrected branch is taken.
    let data: Vec<u8> = b"abcdefghijklmnopqrstuvwxyz0123456789"
        .iter()
        .copied()
        .cycle()
        .take(32 * 1024)
        .collect();
    let path = write_file(dir.path(), "margin.txt", &data);
    let tight = SizeEstimator::new(1024, 0.0).estimate(&path, data.len() as u64).unwrap();
    let loose = SizeEstimator::new(1024, 0.5).estimate(&path, data.len() as u64).unwrap();
    assert!(loose < tight);
}

#[test]
fn whole_file_is_sampled_when_smaller_than_sample_size() {
    let dir = tempdir().unwrap();
    let data = b"tiny but compressible compressible compressible".to_vec();
    let path = write_file(dir.path(), "tiny.txt", &data);
    let estimator = SizeEstimator::default();
    let est = estimator.estimate(&path, data.len() as u64).unwrap();
    assert!(est > 0);
}

#[test]
fn missing_file_is_a_recoverable_error() {
    let estimator = SizeEstimator::default();
    let res = estimator.estimate(Path::new("/nonexistent/file.bin"), 1234);
    assert!(res.is_err());
}

// ---------- entropy ----------

#[test]
fn entropy_of_constant_data_is_zero() {
    let data = vec![0x41u8; 4096];
    assert!(normalized_entropy(&data).abs() < 1e-12);
}

#[test]
fn entropy_of_uniform_bytes_is_one() {
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let h = normalized_entropy(&data);
    assert!((h - 1.0).abs() < 1e-9, "got {h}");
}

#[test]
fn entropy_is_normalized_between_zero_and_one() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut data = vec![0u8; 2048];
    rng.fill_bytes(&mut data);
    let h = normalized_entropy(&data);
    assert!(h > 0.9 && h <= 1.0, "got {h}");
}
