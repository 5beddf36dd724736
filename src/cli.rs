use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nimbus radar rainfall field analysis.
#[derive(Parser)]
#[command(
    name = "nimbus",
    version,
    about = "Spectral and motion analysis of radar rainfall field sequences"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Analyze an archive of rainfall grids and write daily statistics.
    Analyze(AnalyzeArgs),
    /// Write a synthetic sequence of moving rain cells as ASCII grids.
    Synth(SynthArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "nimbus.toml")]
    pub config: PathBuf,

    /// Override the input grid directory from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the output directory from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the first timestamp (e.g. 2023-05-09T00:00).
    #[arg(long)]
    pub start: Option<String>,

    /// Override the last timestamp, inclusive.
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for the `synth` subcommand.
#[derive(clap::Args)]
pub struct SynthArgs {
    /// Directory to write grids into.
    #[arg(short, long)]
    pub output: PathBuf,

    /// First timestamp.
    #[arg(long, default_value = "2023-05-09T00:00")]
    pub start: String,

    /// Number of fields to write.
    #[arg(short = 'n', long, default_value_t = 24)]
    pub steps: usize,

    /// Minutes between fields.
    #[arg(long, default_value_t = 5)]
    pub step_minutes: i64,

    /// Grid side length in pixels.
    #[arg(long, default_value_t = 128)]
    pub size: usize,

    /// Number of rain cells.
    #[arg(long, default_value_t = 40)]
    pub cells: usize,

    /// Eastward cell motion in pixels per step.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub u: f64,

    /// Southward cell motion (increasing row) in pixels per step.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub v: f64,

    /// Standard deviation of the log-normal multiplicative noise.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Step indices written as completely dry fields.
    #[arg(long, value_delimiter = ',')]
    pub dry: Vec<usize>,

    /// Step indices for which no file is written.
    #[arg(long, value_delimiter = ',')]
    pub missing: Vec<usize>,

    /// File name prefix.
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// RNG seed (random if omitted).
    #[arg(short, long)]
    pub seed: Option<u64>,
}
