//! Histogram binning for the distribution plots
//!
//! Features are treated as quantitative. Bin edges use a "nice" step
//! (1, 2 or 5 times a power of ten) so that integer codes line up with
//! bin boundaries, with at most `max_bins` bins.

use anyhow::Result;
use polars::prelude::*;

/// Default upper bound on the number of bins per panel
pub const DEFAULT_MAX_BINS: usize = 40;

/// A single histogram bar
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Lower edge (inclusive)
    pub lower: f64,
    /// Upper edge (exclusive, except for the last bin)
    pub upper: f64,
    pub count: usize,
}

/// Binned distribution of one feature
#[derive(Debug, Clone)]
pub struct FeatureHistogram {
    pub feature: String,
    pub bins: Vec<HistogramBin>,
    /// Cells that were null or not numeric
    pub skipped: usize,
}

impl FeatureHistogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Horizontal extent covered by the bins
    pub fn x_range(&self) -> (f64, f64) {
        match (self.bins.first(), self.bins.last()) {
            (Some(first), Some(last)) => (first.lower, last.upper),
            _ => (0.0, 1.0),
        }
    }
}

/// Smallest step of the form {1, 2, 5} x 10^k whose aligned bins cover
/// `[min, max]` in at most `max_bins` bins. Returns (start, step, n_bins).
///
/// Integer data never gets a step below 1.
fn bin_layout(min: f64, max: f64, max_bins: usize, integral: bool) -> (f64, f64, usize) {
    if max_bins <= 1 {
        return (min, max - min, 1);
    }

    let raw = (max - min) / max_bins as f64;
    let mut magnitude = 10f64.powf(raw.log10().floor());

    // Once the step reaches the span, two aligned bins always suffice.
    loop {
        for m in [1.0, 2.0, 5.0] {
            let step = m * magnitude;
            if integral && step < 1.0 {
                continue;
            }
            let start = (min / step).floor() * step;
            let n_bins = ((max - start) / step).floor() as usize + 1;
            if n_bins <= max_bins {
                return (start, step, n_bins);
            }
        }
        magnitude *= 10.0;
    }
}

/// Compute bins over `[min, max]` of the finite values.
pub fn compute_bins(values: &[f64], max_bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let integral = finite.iter().all(|v| v.fract() == 0.0);

    let (start, step, n_bins) = if max > min {
        bin_layout(min, max, max_bins, integral)
    } else {
        (min, 1.0, 1)
    };

    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            lower: start + i as f64 * step,
            upper: start + (i + 1) as f64 * step,
            count: 0,
        })
        .collect();

    // The last bin is closed and must reach `max` despite rounding in `start + n * step`.
    if let Some(last) = bins.last_mut() {
        last.upper = last.upper.max(max);
    }

    for v in finite {
        let idx = (((v - start) / step).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Build a histogram for each feature, restricted to rows where `label == class`.
pub fn class_histograms(
    df: &DataFrame,
    features: &[String],
    labels: &[Option<u8>],
    class: u8,
    max_bins: usize,
) -> Result<Vec<FeatureHistogram>> {
    let mut histograms = Vec::with_capacity(features.len());

    for feature in features {
        let column = df.column(feature)?.cast(&DataType::Float64)?;
        let ca = column.f64()?;

        let mut values = Vec::new();
        let mut skipped = 0usize;
        for (value, label) in ca.into_iter().zip(labels.iter()) {
            if *label != Some(class) {
                continue;
            }
            match value {
                Some(v) if v.is_finite() => values.push(v),
                _ => skipped += 1,
            }
        }

        histograms.push(FeatureHistogram {
            feature: feature.clone(),
            bins: compute_bins(&values, max_bins),
            skipped,
        });
    }

    Ok(histograms)
}
