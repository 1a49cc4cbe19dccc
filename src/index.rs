//! Index-file emission.
//!
//! The index records which volume each file landed in, so single volumes can
//! be located and restored independently. Two formats:
//!
//! - text (default): one `NNN<TAB>path` line per file with a `#` summary
//!   header and a trailer listing ignored files;
//! - JSON: a structured document via serde, selected when the index file
//!   name ends in `.json`.

use chrono::Local;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::format_size;
use crate::error::PackError;
use crate::packer::Partition;

/// Everything the index needs to know about one run.
pub struct IndexReport<'a> {
    pub inputs: &'a [PathBuf],
    pub partitions: &'a [Partition],
    pub ignored: &'a [PathBuf],
}

impl IndexReport<'_> {
    fn total_files(&self) -> usize {
        self.partitions.iter().map(|p| p.len()).sum()
    }

    fn total_size(&self) -> u64 {
        self.partitions
            .iter()
            .flat_map(|p| p.entries())
            .map(|e| e.size)
            .sum()
    }
}

#[derive(Serialize)]
struct JsonIndex<'a> {
    generated: String,
    inputs: &'a [PathBuf],
    total_files: usize,
    total_size: u64,
    partitions: &'a [Partition],
    ignored: &'a [PathBuf],
}

/// Writes the index to `writer`, choosing the format from the index file
/// name (`.json` selects the structured form).
pub fn write_index<W: Write>(
    writer: &mut W,
    index_name: &Path,
    report: &IndexReport,
) -> Result<(), PackError> {
    if index_name.extension().is_some_and(|e| e == "json") {
        write_json_index(writer, report)
    } else {
        write_text_index(writer, report)
    }
}

fn write_text_index<W: Write>(writer: &mut W, report: &IndexReport) -> Result<(), PackError> {
    for input in report.inputs {
        writeln!(writer, "# {}", input.display())?;
    }
    writeln!(
        writer,
        "# {} Total {} files, {}, {} partitions, {} ignored.",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        report.total_files(),
        format_size(report.total_size()),
        report.partitions.len(),
        report.ignored.len()
    )?;
    for (pn, part) in report.partitions.iter().enumerate() {
        for entry in part.entries() {
            writeln!(writer, "{:03}\t{}", pn, entry.path.display())?;
        }
    }
    writeln!(writer, "# Ignored files:")?;
    for path in report.ignored {
        writeln!(writer, "#\t{}", path.display())?;
    }
    Ok(())
}

fn write_json_index<W: Write>(writer: &mut W, report: &IndexReport) -> Result<(), PackError> {
    let doc = JsonIndex {
        generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        inputs: report.inputs,
        total_files: report.total_files(),
        total_size: report.total_size(),
        partitions: report.partitions,
        ignored: report.ignored,
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writer.write_all(b"\n")?;
    Ok(())
}
