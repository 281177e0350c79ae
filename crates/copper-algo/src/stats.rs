//! Quantiles and interquartile fences for color-scale normalization.
//!
//! A handful of extreme buses (scarcity prices, huge interconnector nodes)
//! would otherwise stretch a color scale until every other bus shares one
//! color. Values outside Tukey's fences `Q1 - 1.5·IQR < x < Q3 + 1.5·IQR`
//! are either removed from the table or clipped out of the color range.

use copper_core::SnapshotFrame;
use serde::Serialize;
use tracing::info;

/// `q`-th quantile of the finite values, interpolating linearly between
/// the two closest ranks. `None` when there is no finite value or `q` is
/// outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        let q1 = quantile(&values, 0.25)?;
        let q3 = quantile(&values, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - 1.5 * iqr,
            upper: q3 + 1.5 * iqr,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Strictly inside both fences.
    pub fn contains(&self, value: f64) -> bool {
        self.lower < value && value < self.upper
    }
}

/// Clears every cell outside the interquartile fences of the whole table.
pub fn remove_extremes(frame: &SnapshotFrame) -> SnapshotFrame {
    let Some(fences) = Fences::from_values(frame.present_values()) else {
        return frame.clone();
    };
    info!(
        "Removing extremes outside of Q1 - 1.5*IQR < x < Q3 + 1.5*IQR ({:.2} < x < {:.2})",
        fences.lower, fences.upper
    );
    frame.mask(|v| fences.contains(v))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorRange {
    pub cmin: f64,
    pub cmax: f64,
}

/// Zero-centred range for diverging color scales.
///
/// The half-width is the larger fence magnitude, capped at the largest
/// absolute value present so tame data is not compressed into the middle.
pub fn symmetric_color_range(values: impl IntoIterator<Item = f64>) -> Option<ColorRange> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    let fences = Fences::from_values(values.iter().copied())?;
    let extent = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let mut bound = fences.lower.abs().max(fences.upper.abs()).min(extent);
    if bound <= 0.0 {
        bound = 1.0;
    }
    Some(ColorRange {
        cmin: -bound,
        cmax: bound,
    })
}
