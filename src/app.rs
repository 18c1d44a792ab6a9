//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the store location (flag, then `PUZZLE_STORE` / `.env`)
//! - runs the reseed sweep, or draws samples, or summarizes a store
//! - prints reports/histograms
//! - writes the optional JSON run report

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, HistogramArgs, RunArgs, SampleArgs, SummaryArgs};
use crate::domain::{RatingFilter, ReseedConfig, ReseedMode};
use crate::error::AppError;
use crate::sampler::{RunningStats, build_sampler, draw_samples};
use crate::store::{FileStore, RatingStore};

pub mod pipeline;

/// Environment variable naming the default store file.
pub const STORE_ENV: &str = "PUZZLE_STORE";

/// Entry point for the `reseed` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Sample(args) => handle_sample(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = reseed_config_from_args(&args)?;
    let outcome = pipeline::run_reseed(&config)?;

    println!(
        "{}",
        crate::report::format_reseed_summary(&outcome, &config.store_path)
    );

    if let Some(path) = &config.report_path {
        crate::io::write_reseed_report(path, &outcome, &config)?;
        println!("Report: {}", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let params = args.rating.params();
    if args.as_ratings {
        params.validate()?;
    }

    let mut sampler = build_sampler(args.method, args.seed);
    let mut draws = draw_samples(&mut *sampler, args.count)?;
    if args.as_ratings {
        for z in draws.iter_mut() {
            *z = crate::reseed::reseeded_rating(*z, &params)?;
        }
    }

    let stats: RunningStats = draws.iter().copied().collect();
    let scale = args.as_ratings.then_some(&params);
    println!(
        "{}",
        crate::report::format_sample_summary(args.method, stats.summary().as_ref(), scale)
    );

    let reference = match scale {
        Some(p) => (p.mean, p.stddev),
        None => (0.0, 1.0),
    };
    print_histogram(&draws, &args.histogram, Some(reference));
    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let path = resolve_store_path(args.store.as_deref())?;
    let store = FileStore::open(&path, args.format)?;

    let at_filter = store.find(&RatingFilter::exact(args.filter))?.count();
    let ratings = store.ratings();
    let stats: RunningStats = ratings.iter().copied().collect();

    println!(
        "{}",
        crate::report::format_store_summary(
            &path,
            store.len(),
            at_filter,
            args.filter,
            stats.summary().as_ref()
        )
    );
    print_histogram(&ratings, &args.histogram, None);
    Ok(())
}

fn print_histogram(values: &[f64], args: &HistogramArgs, reference: Option<(f64, f64)>) {
    if args.no_histogram {
        return;
    }
    println!(
        "{}",
        crate::plot::render_histogram(values, args.bins, args.width, reference)
    );
}

pub fn reseed_config_from_args(args: &RunArgs) -> Result<ReseedConfig, AppError> {
    let store_path = resolve_store_path(args.store.as_deref())?;
    let store_format = crate::store::file::resolve_format(&store_path, args.format)?;
    let params = args.rating.params();
    params.validate()?;

    let report_path = args
        .report
        .clone()
        .map(|p| p.unwrap_or_else(|| crate::io::default_report_path(&store_path)));

    Ok(ReseedConfig {
        store_path,
        store_format,
        params,
        seed: args.seed,
        method: args.method,
        mode: if args.dry_run {
            ReseedMode::DryRun
        } else {
            ReseedMode::Apply
        },
        report_path,
        preview: args.preview,
    })
}

/// `--store` wins; otherwise `PUZZLE_STORE` from the environment or `.env`.
pub fn resolve_store_path(arg: Option<&Path>) -> Result<PathBuf, AppError> {
    if arg.is_none() {
        dotenvy::dotenv().ok();
    }
    store_path_from(arg, std::env::var(STORE_ENV).ok())
}

fn store_path_from(arg: Option<&Path>, env_value: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(path) = arg {
        return Ok(path.to_path_buf());
    }
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            AppError::usage(format!(
                "No puzzle store given; pass --store or set {STORE_ENV} (.env)."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{SamplerMethod, StoreFormat};

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["reseed", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn flag_beats_environment() {
        let path = store_path_from(Some(Path::new("a.csv")), Some("b.csv".to_string())).unwrap();
        assert_eq!(path, PathBuf::from("a.csv"));
    }

    #[test]
    fn environment_is_the_fallback() {
        assert_eq!(
            store_path_from(None, Some(" puzzles.json ".to_string())).unwrap(),
            PathBuf::from("puzzles.json")
        );
        assert!(store_path_from(None, Some("  ".to_string())).is_err());
        assert!(store_path_from(None, None).is_err());
    }

    #[test]
    fn config_resolves_format_mode_and_report() {
        let args = run_args(&[
            "--store", "/data/puzzles.csv", "--dry-run", "--report", "--seed", "7", "--method", "ziggurat",
        ]);
        let config = reseed_config_from_args(&args).unwrap();
        assert_eq!(config.store_format, StoreFormat::Csv);
        assert_eq!(config.mode, ReseedMode::DryRun);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.method, SamplerMethod::Ziggurat);
        assert_eq!(config.report_path, Some(PathBuf::from("/data/puzzles.csv.reseed.json")));
    }

    #[test]
    fn config_rejects_bad_distribution() {
        let args = run_args(&["--store", "p.json", "--stddev=-5"]);
        let err = reseed_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
