//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the sampling/reseeding code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use std::path::Path;

use crate::domain::{ReseedMode, ReseedParams, SamplerMethod};
use crate::reseed::ReseedOutcome;
use crate::sampler::StatsSummary;

/// Summary of one `reseed run`.
pub fn format_reseed_summary(outcome: &ReseedOutcome, store: &Path) -> String {
    let mut out = String::new();
    let params = &outcome.params;

    out.push_str("=== reseed - Puzzle rating reseed ===\n");
    out.push_str(&format!("Store: {}\n", store.display()));
    out.push_str(&format!(
        "Mode: {}\n",
        match outcome.mode {
            ReseedMode::Apply => "apply",
            ReseedMode::DryRun => "dry run (no writes)",
        }
    ));
    out.push_str(&format!("Sampler: {}\n", outcome.method.display_name()));
    out.push_str(&format_params(params));
    out.push_str(&format!(
        "Matched: {} | Updated: {} | At floor: {}\n",
        outcome.matched, outcome.updated, outcome.clamped
    ));

    if let Some(stats) = &outcome.new_ratings {
        out.push_str(&format!("New ratings: {}\n", format_stats(stats)));
    }

    let elapsed = outcome.finished_at - outcome.started_at;
    out.push_str(&format!("Elapsed: {} ms\n", elapsed.num_milliseconds()));

    if !outcome.preview.is_empty() {
        out.push_str("\nPreview:\n");
        out.push_str(&format!("{:<12} {:>10} {:>10}\n", "Puzzle", "Old", "New"));
        for change in &outcome.preview {
            out.push_str(&format!("{:<12} {:>10.1} {:>10.1}\n", change.id, change.old, change.new));
        }
    }

    out
}

/// Summary of `reseed sample`.
pub fn format_sample_summary(
    method: SamplerMethod,
    stats: Option<&StatsSummary>,
    as_ratings: Option<&ReseedParams>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== reseed - {} samples ===\n", method.display_name()));
    match as_ratings {
        Some(params) => out.push_str(&format_params(params)),
        None => out.push_str("Scale: standard normal\n"),
    }
    match stats {
        Some(stats) => out.push_str(&format!("Draws: {}\n", format_stats(stats))),
        None => out.push_str("Draws: none\n"),
    }
    out
}

/// Summary of `reseed summary`.
pub fn format_store_summary(
    store: &Path,
    total: usize,
    at_filter: usize,
    filter: f64,
    stats: Option<&StatsSummary>,
) -> String {
    let mut out = String::new();
    out.push_str("=== reseed - Store summary ===\n");
    out.push_str(&format!("Store: {}\n", store.display()));
    out.push_str(&format!("Puzzles: {total} | Rated {filter}: {at_filter}\n"));
    if let Some(stats) = stats {
        out.push_str(&format!("Ratings: {}\n", format_stats(stats)));
    }
    out
}

fn format_params(params: &ReseedParams) -> String {
    format!(
        "Filter: r == {} | N(mean={}, stddev={}) | floor={}\n",
        params.filter_rating, params.mean, params.stddev, params.min
    )
}

fn format_stats(stats: &StatsSummary) -> String {
    format!(
        "n={} mean={:.3} stddev={:.3} min={:.3} max={:.3}",
        stats.count, stats.mean, stats.stddev, stats.min, stats.max
    )
}
