//! Piecewise-linear normalization anchored at the historical mean.
//!
//! Heat, rainfall and humidity live on incomparable scales. Each reading is
//! mapped so that the historical minimum lands on 0.0, the mean on 0.5 and
//! the maximum on 1.0, with a straight line on either side of the mean.

use serde::Serialize;

/// Value returned whenever the side of the baseline a reading falls on has
/// zero width.
pub const DEGENERATE_FALLBACK: f64 = 0.5;

/// Mean, minimum and maximum of a reference window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Baseline {
    /// Statistics over `values`, or `None` if there are none.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Baseline> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            return None;
        }
        Some(Baseline {
            mean: sum / count as f64,
            min,
            max,
        })
    }

    /// True when the mean coincides with either bound.
    pub fn is_degenerate(&self) -> bool {
        self.mean - self.min <= 0.0 || self.max - self.mean <= 0.0
    }

    pub fn normalize(&self, x: f64) -> f64 {
        normalize(x, self.mean, self.min, self.max)
    }

    /// [`normalize`] clamped to [0, 1], for readings that may fall outside
    /// the window the baseline was computed over.
    pub fn normalize_clipped(&self, x: f64) -> f64 {
        self.normalize(x).clamp(0.0, 1.0)
    }
}

/// Map `x` onto [0, 1] with `mean` at 0.5.
///
/// Readings at or below the mean scale linearly over `[min, mean]` into
/// `[0, 0.5]`, readings above it over `[mean, max]` into `[0.5, 1]`. If the
/// interval used has zero width the result is [`DEGENERATE_FALLBACK`].
/// The result is not clamped.
pub fn normalize(x: f64, mean: f64, min: f64, max: f64) -> f64 {
    if x <= mean {
        let span = mean - min;
        if span <= 0.0 {
            return DEGENERATE_FALLBACK;
        }
        0.5 * (x - min) / span
    } else {
        let span = max - mean;
        if span <= 0.0 {
            return DEGENERATE_FALLBACK;
        }
        0.5 + 0.5 * (x - mean) / span
    }
}
