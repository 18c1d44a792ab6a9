//! ASCII histograms for terminal output.
//!
//! This is intentionally "dumb" (fixed-width bars), optimized for:
//! - quick visual sanity checks of a rating distribution
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed counts: `#` bar
//! - optional reference normal curve: `*` at the expected count

use std::f64::consts::PI;

/// Render a histogram of `values` with `bins` equal-width bins.
///
/// `reference = Some((mean, stddev))` marks the count a normal distribution
/// with those parameters would put in each bin.
pub fn render_histogram(
    values: &[f64],
    bins: usize,
    width: usize,
    reference: Option<(f64, f64)>,
) -> String {
    let bins = bins.max(1);
    let width = width.max(10);

    let Some((lo, hi)) = value_range(values) else {
        return "Histogram: no values\n".to_string();
    };
    // A single distinct value still gets a visible bin.
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let step = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    let mut n = 0usize;
    for &v in values {
        if v.is_finite() {
            counts[bin_index(v, lo, step, bins)] += 1;
            n += 1;
        }
    }

    let expected: Option<Vec<f64>> = reference
        .filter(|&(mean, sd)| mean.is_finite() && sd.is_finite() && sd > 0.0)
        .map(|(mean, sd)| {
            (0..bins)
                .map(|i| {
                    let mid = lo + (i as f64 + 0.5) * step;
                    n as f64 * normal_pdf(mid, mean, sd) * step
                })
                .collect()
        });

    let mut scale = counts.iter().copied().max().unwrap_or(0) as f64;
    if let Some(expected) = &expected {
        scale = expected.iter().copied().fold(scale, f64::max);
    }

    let mut out = String::new();
    out.push_str(&format!("Histogram: n={n} | range=[{lo:.2}, {hi:.2}] | bins={bins}\n"));

    for (i, &count) in counts.iter().enumerate() {
        let mut bar = vec![' '; width];
        for cell in bar.iter_mut().take(bar_len(count as f64, scale, width)) {
            *cell = '#';
        }
        if let Some(expected) = &expected {
            let pos = bar_len(expected[i], scale, width);
            if pos > 0 {
                bar[pos - 1] = '*';
            }
        }

        let edge = lo + i as f64 * step;
        out.push_str(&format!("{edge:>8.2} |{}| {count}\n", bar.into_iter().collect::<String>()));
    }

    out
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn bin_index(v: f64, lo: f64, step: f64, bins: usize) -> usize {
    // The top edge belongs to the last bin.
    let idx = ((v - lo) / step).floor() as isize;
    idx.clamp(0, bins as isize - 1) as usize
}

fn bar_len(count: f64, scale: f64, width: usize) -> usize {
    if scale <= 0.0 {
        return 0;
    }
    ((count / scale) * width as f64).round().clamp(0.0, width as f64) as usize
}

fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let u = (x - mean) / sd;
    (-0.5 * u * u).exp() / (sd * (2.0 * PI).sqrt())
}
