//! Weekly audio-feature series and per-week chart listings.

use crate::aggregate::aggregate;
use serde::Serialize;
use std::collections::BTreeMap;
use wxtune_core::{
    chart::{AudioFeature, ChartRecord},
    week_key::WeekKey,
};

/// Value given to every week of a series whose weekly means are all equal.
pub const FLAT_SERIES_VALUE: f64 = 0.5;

/// Weeks of the 2021 year-end holidays and the 2022 Lunar New Year.
pub const FESTIVAL_WEEKS: [(i32, u32); 4] = [(2021, 51), (2021, 52), (2022, 5), (2022, 6)];

pub fn is_festival_week(week: WeekKey) -> bool {
    FESTIVAL_WEEKS.contains(&(week.year, week.week))
}

/// One week of an audio feature series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturePoint {
    pub week_key: WeekKey,
    /// Mean of the feature over the week's chart entries.
    pub value: f64,
    /// `value` min-max scaled across all weeks of the series.
    pub normalized: f64,
    pub festival: bool,
}

/// Weekly mean of `feature` over chart entries.
pub fn weekly_feature_means(
    records: &[ChartRecord],
    feature: AudioFeature,
) -> BTreeMap<WeekKey, f64> {
    aggregate(records, |r| r.week_key, |r| r.features.get(feature))
}

/// Weekly means of `feature` with a min-max normalized copy for plotting
/// features of different scales on one axis.
pub fn feature_series(records: &[ChartRecord], feature: AudioFeature) -> Vec<FeaturePoint> {
    let weekly = weekly_feature_means(records, feature);
    let min = weekly.values().copied().fold(f64::INFINITY, f64::min);
    let max = weekly.values().copied().fold(f64::NEG_INFINITY, f64::max);
    weekly
        .into_iter()
        .map(|(week_key, value)| FeaturePoint {
            week_key,
            value,
            normalized: if max > min {
                (value - min) / (max - min)
            } else {
                FLAT_SERIES_VALUE
            },
            festival: is_festival_week(week_key),
        })
        .collect()
}

/// Distinct chart weeks, ascending.
pub fn chart_weeks(records: &[ChartRecord]) -> Vec<WeekKey> {
    let mut weeks = records.iter().map(|r| r.week_key).collect::<Vec<_>>();
    weeks.sort();
    weeks.dedup();
    weeks
}

/// The `n` highest-ranked entries of `week`, best first.
pub fn top_tracks_for_week(
    records: &[ChartRecord],
    week: WeekKey,
    n: usize,
) -> Vec<ChartRecord> {
    let mut weekly = records
        .iter()
        .filter(|r| r.week_key == week)
        .cloned()
        .collect::<Vec<_>>();
    weekly.sort_by_key(|r| r.rank);
    weekly.truncate(n);
    weekly
}
