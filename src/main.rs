//! Main entry point for the volpack CLI app

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::info;

use volpack::cli::{self, Commands};
use volpack::config::{parse_size, PackConfig};
use volpack::error::PackError;
use volpack::estimate::SizeEstimator;
use volpack::filter::{AllOf, GlobFilter, Predicate, RegexFilter, SizeFilter, TimeFilter};
use volpack::index::{self, IndexReport};
use volpack::output::{self, OutputFormat};
use volpack::sort::SortPolicy;
use volpack::{scan, stat};

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();
    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match command {
        Commands::Pack {
            inputs,
            output,
            index,
            format,
            p7z_args,
            p7z_cmd,
            sort,
            max_file_size,
            min_file_size,
            exclude,
            include,
            exclude_re,
            include_re,
            after,
            before,
            max_part_size,
            max_file_num,
            parts,
            sample_size,
            error_margin,
        } => {
            let config = PackConfig {
                max_size: parse_size(&max_part_size)?,
                max_entries: max_file_num,
                fixed_count: parts,
                sort_policy: sort,
                error_margin,
                sample_size,
            };
            config.validate()?;

            let filter = build_filter(
                &include,
                &exclude,
                &include_re,
                &exclude_re,
                min_file_size.as_deref(),
                max_file_size.as_deref(),
                after.as_deref(),
                before.as_deref(),
            )?;

            run_pack(&inputs, &output, &index, format, &p7z_cmd, p7z_args.as_deref(), &config, &filter)?;
        }
        Commands::Stat { paths } => {
            let stats = stat::collect_stats(&paths);
            print!("{}", stat::render(&stats));
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_pack(
    inputs: &[PathBuf],
    output: &PathBuf,
    index_name: &str,
    format: OutputFormat,
    p7z_cmd: &str,
    p7z_args: Option<&str>,
    config: &PackConfig,
    filter: &dyn Predicate,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = scan::scan_paths(inputs, filter)?;

    let estimator = format
        .compresses()
        .then(|| SizeEstimator::new(config.sample_size, config.error_margin));
    let entries = scan::estimate_entries(&outcome.base_dir, outcome.files, estimator.as_ref());

    info!("Dispatching {} files...", entries.len());
    let mut partitions = config.packer().dispatch(entries)?;
    if config.sort_policy != SortPolicy::None {
        for part in &mut partitions {
            part.sort_entries(config.sort_policy);
        }
    }
    info!("Dispatched into {} partitions.", partitions.len());

    std::fs::create_dir_all(output)
        .map_err(|e| PackError::Io { source: e, path: output.clone() })?;

    let index_path = output.join(index_name);
    let file = File::create(&index_path)
        .map_err(|e| PackError::Io { source: e, path: index_path.clone() })?;
    let mut writer = BufWriter::new(file);
    index::write_index(
        &mut writer,
        index_path.as_path(),
        &IndexReport {
            inputs,
            partitions: &partitions,
            ignored: &outcome.ignored,
        },
    )?;
    writer
        .flush()
        .map_err(|e| PackError::Io { source: e, path: index_path.clone() })?;

    let extra_args: Vec<String> = p7z_args
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    let backend = output::backend_for(format, output, p7z_cmd, &extra_args, config.max_size);
    backend.write(&outcome.base_dir, &partitions)?;

    info!("Done.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_filter(
    include: &[String],
    exclude: &[String],
    include_re: &[String],
    exclude_re: &[String],
    min_file_size: Option<&str>,
    max_file_size: Option<&str>,
    after: Option<&str>,
    before: Option<&str>,
) -> Result<AllOf, PackError> {
    let mut filter = AllOf::new();
    if !include.is_empty() || !exclude.is_empty() {
        filter.push(Box::new(GlobFilter::new(include, exclude)?));
    }
    if !include_re.is_empty() || !exclude_re.is_empty() {
        filter.push(Box::new(RegexFilter::new(include_re, exclude_re)?));
    }
    if min_file_size.is_some() || max_file_size.is_some() {
        filter.push(Box::new(SizeFilter {
            min_size: min_file_size.map(parse_size).transpose()?,
            max_size: max_file_size.map(parse_size).transpose()?,
        }));
    }
    if after.is_some() || before.is_some() {
        filter.push(Box::new(TimeFilter {
            after: after.map(parse_local_time).transpose()?,
            before: before.map(parse_local_time).transpose()?,
        }));
    }
    Ok(filter)
}

/// Parses a `%Y%m%d%H%M%S` timestamp in the local time zone to epoch seconds.
fn parse_local_time(s: &str) -> Result<i64, PackError> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S")
        .map_err(|e| PackError::Config(format!("invalid time '{}': {}", s, e)))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| PackError::Config(format!("ambiguous local time '{}'", s)))
}
