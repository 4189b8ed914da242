use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the external detector on a video and persist the daily count record
    Detect {
        /// URI of the kitchen video to analyze
        #[arg(short, long)]
        video: String,
        /// Detection model name (defaults to the first available model)
        #[arg(short, long)]
        model: Option<String>,
        /// Directory holding accumulated counts_*.csv records
        #[arg(long, default_value = "detection_records")]
        records_dir: PathBuf,
    },
    /// Generate the monthly procurement report from accumulated records
    Report {
        /// Target year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Target month 1-12 (defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Directory holding accumulated counts_*.csv records
        #[arg(long, default_value = "detection_records")]
        records_dir: PathBuf,
        /// Write the rendered report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the three report tables as CSV files into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// JSON recipe table overriding the built-in one
        #[arg(long)]
        recipes: Option<PathBuf>,
    },
    /// List accumulated detection record files and their status
    Status {
        /// Directory holding accumulated counts_*.csv records
        #[arg(long, default_value = "detection_records")]
        records_dir: PathBuf,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
