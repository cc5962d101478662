//! Weather matching.
//!
//! The live weather is normalized against each series' baseline to form a
//! target vector; every merged row is scored by its L1 distance to that
//! target and the closest distinct tracks win.

use crate::merge::MergedRow;
use crate::normalize::Baseline;
use serde::Serialize;
use std::collections::HashSet;
use wxtune_core::live::{LiveWeather, LiveWeatherError};

/// The current weather as three normalized values in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetWeatherVector {
    pub heat: f64,
    pub rainfall: f64,
    pub humidity: f64,
}

impl TargetWeatherVector {
    /// Normalize live readings against the historical baselines. Live
    /// readings routinely fall outside the reference window, so each value
    /// is clipped to [0, 1].
    pub fn from_live(
        live: &LiveWeather,
        heat: &Baseline,
        rainfall: &Baseline,
        humidity: &Baseline,
    ) -> Result<TargetWeatherVector, LiveWeatherError> {
        let (temperature, rain, relative_humidity) = live.complete()?;
        Ok(TargetWeatherVector {
            heat: heat.normalize_clipped(temperature),
            rainfall: rainfall.normalize_clipped(rain),
            humidity: humidity.normalize_clipped(relative_humidity),
        })
    }
}

/// A merged row and its distance to the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub row: MergedRow,
    pub score: f64,
}

/// Sum of absolute differences between the row's weekly weather and the target.
pub fn score(row: &MergedRow, target: &TargetWeatherVector) -> f64 {
    (row.weather.avg_heat - target.heat).abs()
        + (row.weather.avg_rainfall - target.rainfall).abs()
        + (row.weather.avg_humidity - target.humidity).abs()
}

/// The `k` best-matching distinct tracks, ascending by score.
///
/// Each track is represented by its lowest-scoring row. Equal scores keep
/// their input order. Fewer than `k` distinct tracks yields all of them.
pub fn top_matches(rows: &[MergedRow], target: &TargetWeatherVector, k: usize) -> Vec<ScoredRow> {
    let mut scored = rows
        .iter()
        .map(|row| ScoredRow {
            score: score(row, target),
            row: row.clone(),
        })
        .collect::<Vec<_>>();
    // sort_by is stable
    scored.sort_by(|a, b| a.score.total_cmp(&b.score));

    let mut seen: HashSet<String> = HashSet::new();
    scored
        .into_iter()
        .filter(|s| seen.insert(s.row.chart.uri.clone()))
        .take(k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::WeeklyWeatherAggregate;
    use crate::merge::tests::chart_record;

    const ORIGIN: TargetWeatherVector = TargetWeatherVector {
        heat: 0.0,
        rainfall: 0.0,
        humidity: 0.0,
    };

    fn merged(uri: &str, heat: f64, rainfall: f64, humidity: f64) -> MergedRow {
        let chart = chart_record("2022-05", uri, 1);
        MergedRow {
            weather: WeeklyWeatherAggregate {
                week_key: chart.week_key,
                avg_heat: heat,
                avg_rainfall: rainfall,
                avg_humidity: humidity,
            },
            chart,
        }
    }

    #[test]
    fn test_score_is_l1_distance() {
        let row = merged("uri:a", 0.2, 0.9, 0.5);
        let target = TargetWeatherVector {
            heat: 0.5,
            rainfall: 0.5,
            humidity: 0.5,
        };
        assert!((score(&row, &target) - 0.7).abs() < 1e-12);
        assert!((score(&row, &ORIGIN) - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![
            merged("uri:a", 0.1, 0.0, 0.0),
            merged("uri:b", 0.05, 0.0, 0.0),
            merged("uri:c", 0.3, 0.0, 0.0),
            merged("uri:d", 0.05, 0.0, 0.0),
            merged("uri:e", 0.2, 0.0, 0.0),
        ];
        let top = top_matches(&rows, &ORIGIN, 3);
        let uris: Vec<&str> = top.iter().map(|s| s.row.chart.uri.as_str()).collect();
        assert_eq!(uris, vec!["uri:b", "uri:d", "uri:a"]);
        let scores: Vec<f64> = top.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![0.05, 0.05, 0.1]);
    }

    #[test]
    fn test_each_track_once_with_best_score() {
        let rows = vec![
            merged("uri:a", 0.9, 0.0, 0.0),
            merged("uri:b", 0.4, 0.0, 0.0),
            merged("uri:a", 0.2, 0.0, 0.0),
            merged("uri:b", 0.6, 0.0, 0.0),
        ];
        let top = top_matches(&rows, &ORIGIN, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].row.chart.uri, "uri:a");
        assert_eq!(top[0].score, 0.2);
        assert_eq!(top[1].row.chart.uri, "uri:b");
        assert_eq!(top[1].score, 0.4);
    }

    #[test]
    fn test_result_sorted_and_bounded() {
        let rows = (0..30)
            .map(|i| merged(&format!("uri:{}", i % 12), (i * 7 % 11) as f64 / 11.0, 0.3, 0.6))
            .collect::<Vec<_>>();
        let target = TargetWeatherVector {
            heat: 0.5,
            rainfall: 0.5,
            humidity: 0.5,
        };
        for k in [0, 1, 5, 12, 40] {
            let top = top_matches(&rows, &target, k);
            assert_eq!(top.len(), k.min(12));
            assert!(top.windows(2).all(|w| w[0].score <= w[1].score));
            let unique: HashSet<&str> = top.iter().map(|s| s.row.chart.uri.as_str()).collect();
            assert_eq!(unique.len(), top.len());
        }
    }

    #[test]
    fn test_empty_rows() {
        assert!(top_matches(&[], &ORIGIN, 20).is_empty());
    }

    #[test]
    fn test_target_from_live() {
        let heat = Baseline {
            mean: 20.0,
            min: 10.0,
            max: 30.0,
        };
        let rain = Baseline {
            mean: 5.0,
            min: 0.0,
            max: 100.0,
        };
        let humidity = Baseline {
            mean: 80.0,
            min: 40.0,
            max: 100.0,
        };
        let live = LiveWeather {
            temperature: Some(25.0),
            rainfall: Some(0.0),
            humidity: Some(110.0),
        };
        let target = TargetWeatherVector::from_live(&live, &heat, &rain, &humidity).unwrap();
        assert!((target.heat - 0.75).abs() < 1e-12);
        assert_eq!(target.rainfall, 0.0);
        assert_eq!(target.humidity, 1.0);

        let partial = LiveWeather {
            rainfall: None,
            ..live
        };
        assert_eq!(
            TargetWeatherVector::from_live(&partial, &heat, &rain, &humidity),
            Err(LiveWeatherError::MissingReading("rainfall"))
        );
    }
}
