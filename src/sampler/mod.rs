//! Normal random sampling.
//!
//! - uniform entropy sources (`source`)
//! - the Box-Muller sampler (`box_muller`)
//! - summary statistics over draws (`stats`)
//!
//! The reseeder only sees the `NormalSampler` trait, so the entropy source and
//! the transform can be swapped without touching the sweep.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::domain::SamplerMethod;
use crate::error::AppError;

pub mod box_muller;
pub mod source;
pub mod stats;

pub use box_muller::{BoxMuller, GaussianSampler, MAX_REDRAWS, box_muller};
pub use source::{FixedSource, RngSource, UniformSource, new_rng};
pub use stats::{RunningStats, StatsSummary};

/// Fallible source of N(0, 1) draws.
pub trait NormalSampler {
    fn try_sample(&mut self) -> Result<f64, AppError>;

    fn method(&self) -> SamplerMethod;
}

impl<S: UniformSource> NormalSampler for GaussianSampler<S> {
    fn try_sample(&mut self) -> Result<f64, AppError> {
        GaussianSampler::try_sample(self)
    }

    fn method(&self) -> SamplerMethod {
        SamplerMethod::BoxMuller
    }
}

/// `rand_distr::StandardNormal` behind the `NormalSampler` seam.
#[derive(Debug, Clone)]
pub struct ZigguratSampler<R> {
    rng: R,
}

impl<R: Rng> ZigguratSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NormalSampler for ZigguratSampler<R> {
    fn try_sample(&mut self) -> Result<f64, AppError> {
        let z: f64 = self.rng.sample(StandardNormal);
        if !z.is_finite() {
            return Err(AppError::numeric_domain("StandardNormal produced a non-finite value."));
        }
        Ok(z)
    }

    fn method(&self) -> SamplerMethod {
        SamplerMethod::Ziggurat
    }
}

/// Build the sampler for `method`. `seed = None` draws from OS entropy.
pub fn build_sampler(method: SamplerMethod, seed: Option<u64>) -> Box<dyn NormalSampler> {
    match method {
        SamplerMethod::BoxMuller => Box::new(GaussianSampler::new(RngSource::seeded(seed))),
        SamplerMethod::Ziggurat => Box::new(ZigguratSampler::new(new_rng(seed))),
    }
}

/// Largest up-front allocation `draw_samples` makes; bigger requests grow.
const MAX_PREALLOC: usize = 1 << 20;

/// Draw `count` values.
pub fn draw_samples<N>(sampler: &mut N, count: usize) -> Result<Vec<f64>, AppError>
where
    N: NormalSampler + ?Sized,
{
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        out.push(sampler.try_sample()?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_methods_are_standard_normal() {
        for method in [SamplerMethod::BoxMuller, SamplerMethod::Ziggurat] {
            let mut sampler = build_sampler(method, Some(2024));
            assert_eq!(sampler.method(), method);
            let draws = draw_samples(&mut *sampler, 20_000).unwrap();
            let summary = draws.iter().copied().collect::<RunningStats>().summary().unwrap();
            assert!(summary.mean.abs() < 0.05, "{method:?} mean {}", summary.mean);
            assert!((summary.stddev - 1.0).abs() < 0.05, "{method:?} stddev {}", summary.stddev);
        }
    }

    #[test]
    fn huge_count_does_not_preallocate() {
        struct Failing;

        impl NormalSampler for Failing {
            fn try_sample(&mut self) -> Result<f64, AppError> {
                Err(AppError::numeric_domain("exhausted"))
            }

            fn method(&self) -> SamplerMethod {
                SamplerMethod::BoxMuller
            }
        }

        // Would abort with a capacity overflow if the whole count were reserved.
        let err = draw_samples(&mut Failing, usize::MAX).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NumericDomain);
    }

    #[test]
    fn same_seed_same_draws() {
        let a = draw_samples(&mut *build_sampler(SamplerMethod::BoxMuller, Some(9)), 50).unwrap();
        let b = draw_samples(&mut *build_sampler(SamplerMethod::BoxMuller, Some(9)), 50).unwrap();
        assert_eq!(a, b);
    }
}
