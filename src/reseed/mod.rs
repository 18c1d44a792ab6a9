//! Batch reseeding of default ratings.
//!
//! One synchronous pass over the entities whose rating equals the filter
//! value. Each one gets
//!
//! `new = max(min, z * stddev + mean)` with `z ~ N(0, 1)`
//!
//! and is written back immediately. A failed write stops the sweep and is
//! returned to the caller; updates already written stay written. Stores that
//! buffer writes are flushed every `CHECKPOINT_EVERY` updates, so a run that
//! dies midway still leaves most of its progress on disk. Because
//! reseeded entities no longer match the filter, running the sweep again only
//! picks up what is left.

use chrono::{DateTime, Local};
use log::{debug, info};
use serde::Serialize;

use crate::domain::{
    RatedEntity, RatingChange, RatingUpdate, ReseedMode, ReseedParams, SamplerMethod,
};
use crate::error::AppError;
use crate::sampler::{NormalSampler, RunningStats, StatsSummary};
use crate::store::RatingStore;

/// Log progress and flush the store every this many updates.
pub const CHECKPOINT_EVERY: usize = 10_000;

/// What a sweep did.
#[derive(Debug, Clone, Serialize)]
pub struct ReseedOutcome {
    pub mode: ReseedMode,
    pub method: SamplerMethod,
    pub params: ReseedParams,
    /// Entities that matched the filter.
    pub matched: usize,
    /// Entities written back (0 for a dry run).
    pub updated: usize,
    /// New ratings that ended on the floor.
    pub clamped: usize,
    pub new_ratings: Option<StatsSummary>,
    /// The first few changes, for display.
    pub preview: Vec<RatingChange>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

/// Map a standard normal draw onto the rating scale.
pub fn reseeded_rating(z: f64, params: &ReseedParams) -> Result<f64, AppError> {
    // f64::max would quietly turn a NaN draw into the floor.
    if !z.is_finite() {
        return Err(AppError::numeric_domain(format!("Non-finite normal draw: {z}.")));
    }
    let rating = (z * params.stddev + params.mean).max(params.min);
    if !rating.is_finite() {
        return Err(AppError::numeric_domain(format!(
            "Computed rating is not finite (z={z}, mean={}, stddev={}).",
            params.mean, params.stddev
        )));
    }
    Ok(rating)
}

/// The change one entity receives for draw `z`.
pub fn reseed_entity(
    entity: &RatedEntity,
    z: f64,
    params: &ReseedParams,
) -> Result<RatingChange, AppError> {
    let new =
        reseeded_rating(z, params).map_err(|e| e.context(format!("Puzzle {}", entity.id)))?;
    Ok(RatingChange {
        id: entity.id.clone(),
        old: entity.rating(),
        new,
    })
}

/// Run one sweep over `store`.
pub fn reseed<S, N>(
    store: &mut S,
    sampler: &mut N,
    params: &ReseedParams,
    mode: ReseedMode,
    preview_limit: usize,
) -> Result<ReseedOutcome, AppError>
where
    S: RatingStore + ?Sized,
    N: NormalSampler + ?Sized,
{
    params.validate()?;

    let started_at = Local::now();
    info!(
        "reseeding puzzles rated {} with N({}, {}^2), floor {} ({:?}, {})",
        params.filter_rating,
        params.mean,
        params.stddev,
        params.min,
        mode,
        sampler.method().display_name()
    );

    let cursor = store
        .find(&params.filter())
        .map_err(|e| e.context("Failed to query puzzles"))?;

    let mut matched = 0usize;
    let mut updated = 0usize;
    let mut clamped = 0usize;
    let mut stats = RunningStats::new();
    let mut preview = Vec::with_capacity(preview_limit.min(64));

    for item in cursor {
        let entity = item
            .map_err(|e| e.context(format!("Failed to read puzzle after {updated} updates")))?;
        matched += 1;

        let z = sampler.try_sample()?;
        let change = reseed_entity(&entity, z, params)?;

        if mode == ReseedMode::Apply {
            store
                .update(&change.id, &RatingUpdate { r: change.new })
                .map_err(|e| {
                    e.context(format!(
                        "Failed to update puzzle {} after {updated} successful updates",
                        change.id
                    ))
                })?;
            updated += 1;
            if updated % CHECKPOINT_EVERY == 0 {
                store.flush().map_err(|e| {
                    e.context(format!("Failed to save progress after {updated} updates"))
                })?;
                info!("{updated} puzzles reseeded");
            }
        }

        debug!("{}: {} -> {:.1}", change.id, change.old, change.new);

        if change.new <= params.min {
            clamped += 1;
        }
        stats.push(change.new);
        if preview.len() < preview_limit {
            preview.push(change);
        }
    }

    let finished_at = Local::now();
    info!("matched {matched}, updated {updated}, clamped {clamped}");

    Ok(ReseedOutcome {
        mode,
        method: sampler.method(),
        params: *params,
        matched,
        updated,
        clamped,
        new_ratings: stats.summary(),
        preview,
        started_at,
        finished_at,
    })
}
