//! Correlation between weekly audio features and weekly weather.

use crate::aggregate::WeeklyWeatherAggregate;
use crate::features::weekly_feature_means;
use serde::Serialize;
use wxtune_core::chart::{AudioFeature, ChartRecord};

/// Column names of the weather side of a correlation matrix.
pub const WEATHER_COLUMNS: [&str; 3] = ["avg_heat", "avg_rainfall", "avg_humidity"];

/// Correlation for a pair of variables. `None` when either side has no
/// variance or there are fewer than two observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationEntry {
    pub variable1: String,
    pub variable2: String,
    pub correlation: Option<f64>,
}

/// Pairwise correlations over `[feature, avg_heat, avg_rainfall, avg_humidity]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub feature: AudioFeature,
    /// Number of weeks the correlations were computed over.
    pub weeks: usize,
    /// Row-major, 4×4.
    pub entries: Vec<CorrelationEntry>,
}

impl CorrelationMatrix {
    pub fn labels(&self) -> [&str; 4] {
        [
            self.feature.name(),
            WEATHER_COLUMNS[0],
            WEATHER_COLUMNS[1],
            WEATHER_COLUMNS[2],
        ]
    }

    pub fn get(&self, variable1: &str, variable2: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.variable1 == variable1 && e.variable2 == variable2)
            .and_then(|e| e.correlation)
    }
}

/// Pearson correlation coefficient of two equally long samples.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Inner-join the weekly mean of `feature` with the weekly weather and
/// correlate every pair of the four resulting columns.
pub fn correlate_feature(
    chart: &[ChartRecord],
    weekly_weather: &[WeeklyWeatherAggregate],
    feature: AudioFeature,
) -> CorrelationMatrix {
    let feature_means = weekly_feature_means(chart, feature);
    let mut columns: [Vec<f64>; 4] = Default::default();
    for week in weekly_weather {
        if let Some(value) = feature_means.get(&week.week_key) {
            columns[0].push(*value);
            columns[1].push(week.avg_heat);
            columns[2].push(week.avg_rainfall);
            columns[3].push(week.avg_humidity);
        }
    }

    let labels = [
        feature.name(),
        WEATHER_COLUMNS[0],
        WEATHER_COLUMNS[1],
        WEATHER_COLUMNS[2],
    ];
    let mut entries = Vec::with_capacity(16);
    for (i, label_i) in labels.iter().enumerate() {
        for (j, label_j) in labels.iter().enumerate() {
            entries.push(CorrelationEntry {
                variable1: label_i.to_string(),
                variable2: label_j.to_string(),
                correlation: pearson(&columns[i], &columns[j]),
            });
        }
    }
    log::debug!(
        "[wxtune] correlation: {} over {} weeks",
        feature,
        columns[0].len()
    );

    CorrelationMatrix {
        feature,
        weeks: columns[0].len(),
        entries,
    }
}
