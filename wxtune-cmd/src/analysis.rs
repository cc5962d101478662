//! Exploratory commands: correlations, feature trends, daily and weekly
//! weather, weekly charts and ingestion summaries.

use crate::input::DataArgs;
use crate::output::print_csv;
use anyhow::anyhow;
use clap::ValueEnum;
use log::info;
use serde::Serialize;
use wxtune_core::{chart::AudioFeature, source::WeatherSeries, week_key::WeekKey};
use wxtune_data::config::DEFAULT_TOP_K;
use wxtune_data::clean::CleanedSeries;
use wxtune_data::correlation::CorrelationMatrix;
use wxtune_data::features::{chart_weeks, feature_series, top_tracks_for_week};
use wxtune_utils::dates::{format_date, week_label};
use wxtune_utils::format::format_duration;

#[derive(Debug, Serialize, PartialEq)]
pub struct CorrelationRow {
    pub feature: String,
    pub weeks: usize,
    pub variable1: String,
    pub variable2: String,
    pub correlation: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WeeklyWeatherRow {
    pub week: String,
    pub week_start: String,
    pub avg_heat: f64,
    pub avg_rainfall: f64,
    pub avg_humidity: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeatureTrendRow {
    pub week: String,
    pub week_start: String,
    pub value: f64,
    pub normalized: f64,
    pub festival: bool,
}

/// Weather series selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeriesArg {
    Heat,
    Rainfall,
    Humidity,
}

impl From<SeriesArg> for WeatherSeries {
    fn from(arg: SeriesArg) -> WeatherSeries {
        match arg {
            SeriesArg::Heat => WeatherSeries::HeatIndex,
            SeriesArg::Rainfall => WeatherSeries::Rainfall,
            SeriesArg::Humidity => WeatherSeries::RelativeHumidity,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WeatherReadingRow {
    pub week: String,
    pub date: String,
    pub value: f64,
    pub unit: &'static str,
    pub normalized_value: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TopTrackRow {
    pub rank: u32,
    pub track: String,
    pub artist: String,
    pub release_date: String,
    pub duration: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SeriesRow {
    pub collection: String,
    pub documents: i64,
    pub kept: Option<usize>,
    pub dropped: Option<usize>,
    pub baseline_mean: Option<f64>,
    pub baseline_min: Option<f64>,
    pub baseline_max: Option<f64>,
}

fn correlation_rows(matrix: &CorrelationMatrix) -> Vec<CorrelationRow> {
    matrix
        .entries
        .iter()
        .map(|e| CorrelationRow {
            feature: matrix.feature.to_string(),
            weeks: matrix.weeks,
            variable1: e.variable1.clone(),
            variable2: e.variable2.clone(),
            correlation: e.correlation,
        })
        .collect()
}

/// Parse a feature name, listing the valid ones on failure.
pub fn parse_feature(name: &str) -> anyhow::Result<AudioFeature> {
    AudioFeature::from_name(name).ok_or_else(|| {
        let valid = AudioFeature::ALL
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown audio feature {:?}; expected one of {}", name, valid)
    })
}

pub fn run_correlate(data: &DataArgs, feature: Option<&str>) -> anyhow::Result<()> {
    let features = match feature {
        Some(name) => vec![parse_feature(name)?],
        None => AudioFeature::ALL.to_vec(),
    };
    let session = data.session(DEFAULT_TOP_K)?;
    let mut rows = Vec::new();
    for feature in features {
        let matrix = session.correlation(feature)?;
        rows.extend(correlation_rows(&matrix));
    }
    print_csv(&rows)
}

/// Weekly mean of one audio feature over the chart, with its min-max
/// normalized value.
pub fn run_feature_trend(data: &DataArgs, feature: &str) -> anyhow::Result<()> {
    let feature = parse_feature(feature)?;
    let session = data.session(DEFAULT_TOP_K)?;
    let chart = session.chart_records()?;
    let rows = feature_series(&chart, feature)
        .into_iter()
        .map(|p| {
            let week = p.week_key.to_string();
            FeatureTrendRow {
                week_start: week_label(&week),
                week,
                value: p.value,
                normalized: p.normalized,
                festival: p.festival,
            }
        })
        .collect::<Vec<_>>();
    info!("{} weekly {} means", rows.len(), feature);
    print_csv(&rows)
}

/// Cleaned daily readings of one series, ordered by week then date.
fn weather_reading_rows(cleaned: &CleanedSeries) -> Vec<WeatherReadingRow> {
    let mut records = cleaned.records.iter().collect::<Vec<_>>();
    records.sort_by_key(|r| (r.week_key, r.date));
    records
        .into_iter()
        .map(|r| WeatherReadingRow {
            week: r.week_key.to_string(),
            date: format_date(&r.date),
            value: r.value,
            unit: cleaned.series.unit(),
            normalized_value: r.normalized_value,
        })
        .collect()
}

pub fn run_weather_series(data: &DataArgs, series: SeriesArg) -> anyhow::Result<()> {
    let session = data.session(DEFAULT_TOP_K)?;
    let cleaned = session.weather(series.into())?;
    let rows = weather_reading_rows(&cleaned);
    info!("{} cleaned {:?} readings", rows.len(), cleaned.series);
    print_csv(&rows)
}

pub fn run_weekly_weather(data: &DataArgs) -> anyhow::Result<()> {
    let session = data.session(DEFAULT_TOP_K)?;
    let weekly = session.weekly_weather()?;
    let rows = weekly
        .iter()
        .map(|w| {
            let week = w.week_key.to_string();
            WeeklyWeatherRow {
                week_start: week_label(&week),
                week,
                avg_heat: w.avg_heat,
                avg_rainfall: w.avg_rainfall,
                avg_humidity: w.avg_humidity,
            }
        })
        .collect::<Vec<_>>();
    info!("{} weeks have all three weather series", rows.len());
    print_csv(&rows)
}

/// Top tracks for a week; the most recent chart week when none is given.
pub fn run_top_tracks(data: &DataArgs, week: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let session = data.session(DEFAULT_TOP_K)?;
    let chart = session.chart_records()?;
    let week = match week {
        Some(w) => w.parse::<WeekKey>()?,
        None => *chart_weeks(&chart)
            .last()
            .ok_or_else(|| anyhow!("the chart dataset has no usable rows"))?,
    };
    info!("Top {} tracks for week {}", limit, week_label(&week.to_string()));
    let rows = top_tracks_for_week(&chart, week, limit)
        .into_iter()
        .map(|r| TopTrackRow {
            rank: r.rank,
            track: r.track_name,
            artist: r.artist_individual,
            release_date: r.release_date,
            duration: format_duration(r.duration_ms),
        })
        .collect::<Vec<_>>();
    print_csv(&rows)
}

/// Ingest the exports and report what survived typing and cleaning.
pub fn run_ingest(data: &DataArgs) -> anyhow::Result<()> {
    let session = data.session(DEFAULT_TOP_K)?;
    let summaries = session.source().summaries()?;
    let documents = |name: &str| {
        summaries
            .iter()
            .find(|s| s.collection == name)
            .map_or(0, |s| s.documents)
    };

    let chart = session.chart_records()?;
    let chart_name = wxtune_core::source::Dataset::Chart.collection_name();
    let chart_documents = documents(chart_name);
    let mut rows = vec![SeriesRow {
        collection: chart_name.to_string(),
        documents: chart_documents,
        kept: Some(chart.len()),
        dropped: Some((chart_documents as usize).saturating_sub(chart.len())),
        baseline_mean: None,
        baseline_min: None,
        baseline_max: None,
    }];
    for series in WeatherSeries::ALL {
        let cleaned = session.weather(series)?;
        let name = wxtune_core::source::Dataset::Weather(series).collection_name();
        rows.push(SeriesRow {
            collection: name.to_string(),
            documents: documents(name),
            kept: Some(cleaned.report.kept),
            dropped: Some(cleaned.report.dropped()),
            baseline_mean: cleaned.baseline.map(|b| b.mean),
            baseline_min: cleaned.baseline.map(|b| b.min),
            baseline_max: cleaned.baseline.map(|b| b.max),
        });
    }
    print_csv(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::RangeInclusive;
    use wxtune_core::weather::RawWeatherRecord;
    use wxtune_data::clean::clean_records;
    use wxtune_data::correlation::CorrelationEntry;

    const REFERENCE: RangeInclusive<i32> = 2021..=2022;

    #[test]
    fn test_weather_reading_rows_sorted_by_week() {
        let raw = vec![
            RawWeatherRecord::new("2022", 1, 11, Some("30.0")),
            RawWeatherRecord::new("2022", 1, 3, Some("10.0")),
            RawWeatherRecord::new("2022", 1, 10, Some("20.0")),
            RawWeatherRecord::new("2022", 1, 4, Some("***")),
        ];
        let cleaned = clean_records(WeatherSeries::HeatIndex, &raw, &REFERENCE);
        let rows = weather_reading_rows(&cleaned);
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2022-01-03", "2022-01-10", "2022-01-11"]);
        assert_eq!(rows[0].week, "2022-01");
        assert_eq!(rows[2].week, "2022-02");
        assert_eq!(rows[0].unit, "°C");
        assert_eq!(rows[0].normalized_value, 0.0);
        assert_eq!(rows[1].normalized_value, 0.5);
        assert_eq!(rows[2].normalized_value, 1.0);
    }

    #[test]
    fn test_series_arg_maps_to_weather_series() {
        assert_eq!(WeatherSeries::from(SeriesArg::Heat), WeatherSeries::HeatIndex);
        assert_eq!(
            WeatherSeries::from(SeriesArg::Humidity),
            WeatherSeries::RelativeHumidity
        );
        let parsed = SeriesArg::from_str("rainfall", true).unwrap();
        assert_eq!(WeatherSeries::from(parsed), WeatherSeries::Rainfall);
    }

    #[test]
    fn test_parse_feature() {
        assert_eq!(parse_feature("valence").unwrap(), AudioFeature::Valence);
        let err = parse_feature("bpm").unwrap_err().to_string();
        assert!(err.contains("danceability"));
    }

    #[test]
    fn test_correlation_rows() {
        let matrix = CorrelationMatrix {
            feature: AudioFeature::Tempo,
            weeks: 3,
            entries: vec![CorrelationEntry {
                variable1: "tempo".to_string(),
                variable2: "avg_heat".to_string(),
                correlation: Some(-0.25),
            }],
        };
        let rows = correlation_rows(&matrix);
        assert_eq!(
            rows,
            vec![CorrelationRow {
                feature: "tempo".to_string(),
                weeks: 3,
                variable1: "tempo".to_string(),
                variable2: "avg_heat".to_string(),
                correlation: Some(-0.25),
            }]
        );
    }
}
