//! Box-Muller transform: two uniform draws in, one standard normal draw out.
//!
//! `z = sqrt(-2 ln u) * cos(2 pi v)`
//!
//! A uniform value of exactly 0 is re-drawn so `ln(0)` is never evaluated.
//! Exactly 1 is not re-drawn; the sources used here return `[0, 1)`, and
//! `v = 1` would only give `cos(2 pi)` anyway.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::Distribution;

use crate::error::AppError;
use crate::sampler::source::UniformSource;

/// Consecutive zero draws tolerated by `try_sample` before giving up.
pub const MAX_REDRAWS: usize = 64;

/// The bare transform. `u` must be in `(0, 1]`.
pub fn box_muller(u: f64, v: f64) -> f64 {
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// Standard normal sampler over an injected uniform source.
#[derive(Debug, Clone)]
pub struct GaussianSampler<S> {
    source: S,
    redraws: u64,
}

impl<S: UniformSource> GaussianSampler<S> {
    pub fn new(source: S) -> Self {
        Self { source, redraws: 0 }
    }

    /// One draw from N(0, 1).
    pub fn sample(&mut self) -> f64 {
        let u = self.draw_nonzero();
        let v = self.draw_nonzero();
        box_muller(u, v)
    }

    /// Like `sample`, but bounds the zero re-draw loop and rejects
    /// non-finite results instead of passing them on.
    pub fn try_sample(&mut self) -> Result<f64, AppError> {
        let u = self.draw_nonzero_bounded()?;
        let v = self.draw_nonzero_bounded()?;
        let z = box_muller(u, v);
        if !z.is_finite() {
            return Err(AppError::numeric_domain(format!(
                "Box-Muller produced a non-finite value (u={u}, v={v})."
            )));
        }
        Ok(z)
    }

    /// How many zero draws have been discarded so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn draw_nonzero(&mut self) -> f64 {
        loop {
            let x = self.source.next_unit();
            if x != 0.0 {
                return x;
            }
            self.redraws += 1;
        }
    }

    fn draw_nonzero_bounded(&mut self) -> Result<f64, AppError> {
        for _ in 0..=MAX_REDRAWS {
            let x = self.source.next_unit();
            if x != 0.0 {
                return Ok(x);
            }
            self.redraws += 1;
        }
        Err(AppError::numeric_domain(format!(
            "Uniform source returned 0 more than {MAX_REDRAWS} times in a row."
        )))
    }
}

/// Box-Muller as a `rand_distr` distribution, usable with any `Rng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxMuller;

impl Distribution<f64> for BoxMuller {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = nonzero_unit(rng);
        let v = nonzero_unit(rng);
        box_muller(u, v)
    }
}

fn nonzero_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let x: f64 = rng.r#gen();
        if x != 0.0 {
            return x;
        }
    }
}
