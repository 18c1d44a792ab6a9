//! Command-line parsing for the puzzle rating reseeder.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the sampling/reseeding code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{
    DEFAULT_MEAN, DEFAULT_MIN_RATING, DEFAULT_RATING, DEFAULT_STDDEV, ReseedParams, SamplerMethod,
    StoreFormat,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "reseed",
    version,
    about = "Reseed default puzzle ratings from a normal distribution"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Give every puzzle still at the default rating a normally distributed one.
    Run(RunArgs),
    /// Draw samples and print their statistics (no store involved).
    Sample(SampleArgs),
    /// Print rating statistics for a store.
    Summary(SummaryArgs),
}

/// Distribution and selection settings shared by `run` and `sample`.
#[derive(Debug, Parser, Clone)]
pub struct RatingArgs {
    /// Only puzzles rated exactly this are reseeded.
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_RATING)]
    pub filter: f64,

    /// Mean of the new ratings.
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MEAN)]
    pub mean: f64,

    /// Standard deviation of the new ratings.
    #[arg(long, default_value_t = DEFAULT_STDDEV)]
    pub stddev: f64,

    /// Lowest rating a puzzle can be given.
    #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_MIN_RATING)]
    pub min: f64,
}

impl RatingArgs {
    pub fn params(&self) -> ReseedParams {
        ReseedParams {
            filter_rating: self.filter,
            mean: self.mean,
            stddev: self.stddev,
            min: self.min,
        }
    }
}

/// Options for `reseed run`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Puzzle store file (falls back to PUZZLE_STORE, also read from .env).
    #[arg(short = 's', long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Store file layout.
    #[arg(long, value_enum, default_value_t = StoreFormat::Auto)]
    pub format: StoreFormat,

    #[command(flatten)]
    pub rating: RatingArgs,

    /// Random seed (omit for OS entropy).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Normal sampler to use.
    #[arg(long, value_enum, default_value_t = SamplerMethod::BoxMuller)]
    pub method: SamplerMethod,

    /// Compute and print new ratings without writing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run report (default: `<store>.reseed.json`).
    #[arg(long, value_name = "JSON")]
    pub report: Option<Option<PathBuf>>,

    /// Number of changes to list in the summary.
    #[arg(long, default_value_t = 10)]
    pub preview: usize,
}

/// Options for `reseed sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Number of draws.
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub count: usize,

    /// Random seed (omit for OS entropy).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Normal sampler to use.
    #[arg(long, value_enum, default_value_t = SamplerMethod::BoxMuller)]
    pub method: SamplerMethod,

    /// Map draws onto the rating scale (`--mean`, `--stddev`, `--min`).
    #[arg(long)]
    pub as_ratings: bool,

    #[command(flatten)]
    pub rating: RatingArgs,

    #[command(flatten)]
    pub histogram: HistogramArgs,
}

/// Options for `reseed summary`.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Puzzle store file (falls back to PUZZLE_STORE, also read from .env).
    #[arg(short = 's', long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Store file layout.
    #[arg(long, value_enum, default_value_t = StoreFormat::Auto)]
    pub format: StoreFormat,

    /// Rating counted as "unrated".
    #[arg(long, default_value_t = DEFAULT_RATING)]
    pub filter: f64,

    #[command(flatten)]
    pub histogram: HistogramArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct HistogramArgs {
    /// Histogram bins.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Histogram bar width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Skip the histogram.
    #[arg(long)]
    pub no_histogram: bool,
}
