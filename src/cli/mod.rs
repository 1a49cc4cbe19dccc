use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::sort::SortPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Partition files into bounded-size volumes and realize them.
    #[command(alias = "p")]
    Pack {
        /// One or more input files or directories to pack.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output location for volumes and the index file.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Index file name, written inside the output location. A `.json`
        /// extension selects the structured format.
        #[arg(short, long, default_value = "index.txt")]
        index: String,

        /// Output format realizing each partition.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::SevenZip)]
        format: OutputFormat,

        /// Extra arguments passed to the external 7z program (only for -f 7z).
        /// TIP: use --p7z-args='-xxx' to avoid confusing the argument parser.
        #[arg(long, allow_hyphen_values = true)]
        p7z_args: Option<String>,

        /// 7z program to invoke (only for -f 7z).
        #[arg(long, default_value = "7za")]
        p7z_cmd: String,

        /// Sort files within each partition after packing.
        #[arg(long, value_enum, default_value_t = SortPolicy::None)]
        sort: SortPolicy,

        /// Select only files at most this large (accepts suffixes like 500M).
        #[arg(long)]
        max_file_size: Option<String>,

        /// Select only files at least this large.
        #[arg(short = 'm', long)]
        min_file_size: Option<String>,

        /// Exclude files matching the glob pattern. Repeatable.
        #[arg(long)]
        exclude: Vec<String>,

        /// Include only files matching the glob pattern. Repeatable.
        #[arg(long)]
        include: Vec<String>,

        /// Exclude files matching the regex pattern. Repeatable.
        #[arg(long)]
        exclude_re: Vec<String>,

        /// Include only files matching the regex pattern. Repeatable.
        #[arg(long)]
        include_re: Vec<String>,

        /// Select files modified after this local time (format: %Y%m%d%H%M%S,
        /// e.g. 20240101120000).
        #[arg(short, long)]
        after: Option<String>,

        /// Select files modified before this local time (same format as --after).
        #[arg(short, long)]
        before: Option<String>,

        /// Max partition size (accepts suffixes like 1G). 0 = unbounded.
        #[arg(short = 's', long, default_value = "0")]
        max_part_size: String,

        /// Max file count per partition. 0 = unbounded.
        #[arg(long, default_value_t = 0)]
        max_file_num: usize,

        /// Exact partition count (overrides -s and --max-file-num).
        #[arg(short, long)]
        parts: Option<usize>,

        /// Bytes sampled per file for compressed-size estimation.
        #[arg(long, default_value_t = crate::estimate::DEFAULT_SAMPLE_SIZE)]
        sample_size: usize,

        /// Safety margin subtracted from the quick-compressor estimate.
        #[arg(long, default_value_t = crate::estimate::DEFAULT_ERROR_MARGIN)]
        error_margin: f64,
    },

    /// Print statistics about the given paths without packing anything.
    #[command(alias = "s")]
    Stat {
        /// Paths to inspect.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Parses command-line arguments using `clap` and returns the command to
/// execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
