use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-signal-sim")]
#[command(about = "Simulate satellite signal strength from hourly weather observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize signal strength for every row of a weather CSV
    Simulate {
        #[arg(short, long, help = "Input weather CSV file")]
        input: PathBuf,

        #[arg(short, long, help = "Output signal CSV file")]
        output: PathBuf,

        #[arg(short, long, help = "Configuration file (TOML, YAML or JSON)")]
        config: Option<PathBuf>,

        #[arg(long, allow_hyphen_values = true)]
        base_dbm: Option<f64>,

        #[arg(long)]
        missing_rate: Option<f64>,

        #[arg(long)]
        outlier_rate: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, help = "Skip missing value and outlier injection")]
        no_degrade: bool,

        #[arg(long, help = "Fill weather gaps per location before simulating")]
        fill_gaps: bool,

        #[arg(long, help = "Replace unsafe characters in location names with '_'")]
        normalize_locations: bool,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long, help = "Disable the parallel worker pool")]
        sequential: bool,

        #[arg(long, help = "Print signal statistics as JSON")]
        json: bool,
    },

    /// Check a weather CSV for schema, null and range problems
    Validate {
        #[arg(short, long, help = "Input weather CSV file")]
        input: PathBuf,

        #[arg(long, help = "Fail on the first out-of-range row")]
        strict: bool,
    },

    /// Display statistics about a simulated signal CSV
    Info {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(long, help = "Print signal statistics as JSON")]
        json: bool,
    },
}
