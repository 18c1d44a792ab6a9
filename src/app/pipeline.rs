//! Shared "reseed pipeline" used by `reseed run`.
//!
//! open store -> build sampler -> sweep -> flush
//!
//! The flush runs whether or not the sweep succeeded: updates written before
//! a failure stay written.

use log::warn;

use crate::domain::ReseedConfig;
use crate::error::AppError;
use crate::reseed::{ReseedOutcome, reseed};
use crate::sampler::{NormalSampler, build_sampler};
use crate::store::{FileStore, RatingStore};

/// Execute a full sweep against the configured store file.
pub fn run_reseed(config: &ReseedConfig) -> Result<ReseedOutcome, AppError> {
    let mut store = FileStore::open(&config.store_path, config.store_format)?;
    let mut sampler = build_sampler(config.method, config.seed);

    run_reseed_with_store(&mut store, &mut *sampler, config)
}

/// Execute a sweep against an already opened store.
pub fn run_reseed_with_store<S, N>(
    store: &mut S,
    sampler: &mut N,
    config: &ReseedConfig,
) -> Result<ReseedOutcome, AppError>
where
    S: RatingStore + ?Sized,
    N: NormalSampler + ?Sized,
{
    let sweep = reseed(store, sampler, &config.params, config.mode, config.preview);
    let flushed = store.flush();

    match (sweep, flushed) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(e)) => Err(e.context("Failed to save reseeded ratings")),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(flush_err)) => {
            warn!("could not save partial progress: {flush_err}");
            Err(e)
        }
    }
}
