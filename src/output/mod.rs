//! Output backends that realize a partition list on disk.
//!
//! Each backend consumes the read-only partition list: an ordered sequence
//! of partitions, each exposing its ordered file entries and aggregate
//! size. The zero-based partition index becomes the volume name suffix
//! (`000`, `001.zip`, ...). Backends never mutate partitions.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use xz2::write::XzEncoder;
use zip::write::FileOptions;

use crate::error::PackError;
use crate::packer::Partition;

const XZ_PRESET: u32 = 6;

/// The output format selected on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Dry run: partition and index only, no volume output.
    None,
    /// Copy each partition into a numbered directory.
    Copy,
    /// Hardlink each partition into a numbered directory.
    Link,
    /// Invoke an external 7-Zip binary per partition.
    #[value(name = "7z")]
    SevenZip,
    /// Write one deflate zip archive per partition.
    Zip,
    /// Write one uncompressed tar archive per partition.
    Tar,
    /// Write one gzip-compressed tar archive per partition.
    #[value(name = "tar.gz")]
    TarGz,
    /// Write one xz-compressed tar archive per partition.
    #[value(name = "tar.xz")]
    TarXz,
}

impl OutputFormat {
    /// Whether this format compresses, and size estimation is therefore
    /// worth running before packing.
    pub fn compresses(&self) -> bool {
        matches!(
            self,
            OutputFormat::SevenZip | OutputFormat::Zip | OutputFormat::TarGz | OutputFormat::TarXz
        )
    }
}

/// A partition-list consumer.
pub trait OutputBackend {
    /// Realizes every partition under the destination. `base_dir` is the
    /// scan base all entry paths are relative to.
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError>;
}

/// Builds the backend for `format`. `p7z_cmd`/`p7z_args`/`volume_size` only
/// apply to the external-7z backend.
pub fn backend_for(
    format: OutputFormat,
    dest: &Path,
    p7z_cmd: &str,
    p7z_args: &[String],
    volume_size: u64,
) -> Box<dyn OutputBackend> {
    let dest = dest.to_path_buf();
    match format {
        OutputFormat::None => Box::new(NullOutput),
        OutputFormat::Copy => Box::new(CopyOutput { dest }),
        OutputFormat::Link => Box::new(LinkOutput { dest }),
        OutputFormat::Zip => Box::new(ZipOutput { dest }),
        OutputFormat::Tar => Box::new(TarOutput { dest, codec: TarCodec::Plain }),
        OutputFormat::TarGz => Box::new(TarOutput { dest, codec: TarCodec::Gzip }),
        OutputFormat::TarXz => Box::new(TarOutput { dest, codec: TarCodec::Xz }),
        OutputFormat::SevenZip => Box::new(SevenZipOutput {
            dest,
            command: p7z_cmd.to_string(),
            extra_args: p7z_args.to_vec(),
            volume_size,
        }),
    }
}

fn volume_name(pn: usize, ext: &str) -> String {
    if ext.is_empty() {
        format!("{:03}", pn)
    } else {
        format!("{:03}.{}", pn, ext)
    }
}

fn io_err(source: io::Error, path: &Path) -> PackError {
    PackError::Io { source, path: path.to_path_buf() }
}

/// Produces nothing; useful to preview the partition layout via the index.
pub struct NullOutput;

impl OutputBackend for NullOutput {
    fn write(&self, _base_dir: &Path, _partitions: &[Partition]) -> Result<(), PackError> {
        Ok(())
    }
}

/// Copies each partition's files into `dest/NNN/`, preserving the relative
/// directory layout.
pub struct CopyOutput {
    pub dest: PathBuf,
}

impl OutputBackend for CopyOutput {
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError> {
        for (pn, part) in partitions.iter().enumerate() {
            let volume_dir = self.dest.join(volume_name(pn, ""));
            info!("Copying to {}", volume_dir.display());
            for entry in part.entries() {
                let dst = volume_dir.join(&entry.path);
                if let Some(parent) = dst.parent() {
                    fs::create_dir_all(parent).map_err(|e| io_err(e, parent))?;
                }
                fs::copy(base_dir.join(&entry.path), &dst).map_err(|e| io_err(e, &dst))?;
            }
        }
        Ok(())
    }
}

/// Hardlinks each partition's files into `dest/NNN/`. Volumes cost no extra
/// space but must live on the same filesystem as the source.
pub struct LinkOutput {
    pub dest: PathBuf,
}

impl OutputBackend for LinkOutput {
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError> {
        info!("Linking...");
        for (pn, part) in partitions.iter().enumerate() {
            let volume_dir = self.dest.join(volume_name(pn, ""));
            for entry in part.entries() {
                let dst = volume_dir.join(&entry.path);
                if let Some(parent) = dst.parent() {
                    fs::create_dir_all(parent).map_err(|e| io_err(e, parent))?;
                }
                fs::hard_link(base_dir.join(&entry.path), &dst).map_err(|e| io_err(e, &dst))?;
            }
        }
        Ok(())
    }
}

/// Writes one deflate-compressed zip archive per partition.
pub struct ZipOutput {
    pub dest: PathBuf,
}

impl OutputBackend for ZipOutput {
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError> {
        for (pn, part) in partitions.iter().enumerate() {
            let archive_path = self.dest.join(volume_name(pn, "zip"));
            warn_if_exists(&archive_path);
            info!("Creating archive {}...", archive_path.display());
            let file = File::create(&archive_path).map_err(|e| io_err(e, &archive_path))?;
            let mut zip = zip::ZipWriter::new(file);
            let options: FileOptions =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for entry in part.entries() {
                let name = entry.path.to_string_lossy().replace('\\', "/");
                zip.start_file(name, options)?;
                let src_path = base_dir.join(&entry.path);
                let mut src = File::open(&src_path).map_err(|e| io_err(e, &src_path))?;
                io::copy(&mut src, &mut zip).map_err(|e| io_err(e, &src_path))?;
            }
            zip.finish()?;
        }
        Ok(())
    }
}

/// Compression wrapped around a tar stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TarCodec {
    Plain,
    Gzip,
    Xz,
}

impl TarCodec {
    fn extension(&self) -> &'static str {
        match self {
            TarCodec::Plain => "tar",
            TarCodec::Gzip => "tar.gz",
            TarCodec::Xz => "tar.xz",
        }
    }
}

/// Writes one tar archive per partition, optionally compressed.
pub struct TarOutput {
    pub dest: PathBuf,
    pub codec: TarCodec,
}

impl OutputBackend for TarOutput {
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError> {
        for (pn, part) in partitions.iter().enumerate() {
            let archive_path = self.dest.join(volume_name(pn, self.codec.extension()));
            warn_if_exists(&archive_path);
            info!("Creating archive {}...", archive_path.display());
            let file = File::create(&archive_path).map_err(|e| io_err(e, &archive_path))?;
            match self.codec {
                TarCodec::Plain => {
                    let mut builder = tar::Builder::new(file);
                    append_partition(&mut builder, base_dir, part)?;
                    builder.finish().map_err(|e| io_err(e, &archive_path))?;
                }
                TarCodec::Gzip => {
                    let mut builder =
                        tar::Builder::new(GzEncoder::new(file, Compression::default()));
                    append_partition(&mut builder, base_dir, part)?;
                    let encoder = builder.into_inner().map_err(|e| io_err(e, &archive_path))?;
                    encoder.finish().map_err(|e| io_err(e, &archive_path))?;
                }
                TarCodec::Xz => {
                    let mut builder = tar::Builder::new(XzEncoder::new(file, XZ_PRESET));
                    append_partition(&mut builder, base_dir, part)?;
                    let encoder = builder.into_inner().map_err(|e| io_err(e, &archive_path))?;
                    encoder.finish().map_err(|e| io_err(e, &archive_path))?;
                }
            }
        }
        Ok(())
    }
}

fn append_partition<W: Write>(
    builder: &mut tar::Builder<W>,
    base_dir: &Path,
    part: &Partition,
) -> Result<(), PackError> {
    for entry in part.entries() {
        let src = base_dir.join(&entry.path);
        builder
            .append_path_with_name(&src, &entry.path)
            .map_err(|e| io_err(e, &src))?;
    }
    Ok(())
}

/// Shells out to 7-Zip (`7za a -t7z`) with a temporary list file per
/// partition. When a partition's estimated size still exceeds
/// `volume_size`, the archiver's own `-v` splitting is engaged so no single
/// output file breaks the media limit.
pub struct SevenZipOutput {
    pub dest: PathBuf,
    pub command: String,
    pub extra_args: Vec<String>,
    pub volume_size: u64,
}

impl OutputBackend for SevenZipOutput {
    fn write(&self, base_dir: &Path, partitions: &[Partition]) -> Result<(), PackError> {
        // The child runs with base_dir as its working directory, so the
        // destination must be absolute.
        let dest = self.dest.canonicalize().map_err(|e| io_err(e, &self.dest))?;
        for (pn, part) in partitions.iter().enumerate() {
            let archive_path = dest.join(volume_name(pn, "7z"));
            warn_if_exists(&archive_path);

            let mut list_file = NamedTempFile::new()?;
            for entry in part.entries() {
                writeln!(list_file, "{}", entry.path.display())?;
            }
            list_file.flush()?;

            let mut cmd = Command::new(&self.command);
            cmd.arg("a").arg("-t7z").args(&self.extra_args);
            if self.volume_size > 0 && part.total_size() > self.volume_size {
                cmd.arg(format!("-v{}b", self.volume_size));
            }
            cmd.arg("--")
                .arg(&archive_path)
                .arg(format!("@{}", list_file.path().display()))
                .current_dir(base_dir);

            info!("Creating archive {}...", archive_path.display());
            let status = cmd
                .status()
                .map_err(|e| io_err(e, Path::new(&self.command)))?;
            if !status.success() {
                return Err(PackError::Archiver {
                    command: self.command.clone(),
                    status: status.code(),
                });
            }
        }
        Ok(())
    }
}

fn warn_if_exists(path: &Path) {
    if path.is_file() {
        warn!("Archive already exists, overwriting: {}", path.display());
    }
}
