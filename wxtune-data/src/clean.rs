//! Weather row cleaning.
//!
//! Turns raw weather documents into dated, week-keyed, normalized records.
//! Rows that cannot be used are dropped and counted, never propagated.

use crate::normalize::Baseline;
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::ops::RangeInclusive;
use wxtune_core::{
    source::{RawRow, WeatherSeries},
    weather::{RawWeatherRecord, WeatherValue},
    week_key::WeekKey,
};

/// A weather reading that survived cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedWeatherRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub date: NaiveDate,
    /// ISO week number of `date`, 1..=53.
    pub iso_week: u32,
    pub week_key: WeekKey,
    /// The reading in the series' own unit.
    pub value: f64,
    /// The reading normalized against the series baseline, in [0, 1].
    pub normalized_value: f64,
}

/// Per-reason counts of rows dropped by [`clean_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub kept: usize,
    pub bad_year: usize,
    pub bad_date: usize,
    pub missing_value: usize,
    pub invalid_value: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.bad_year + self.bad_date + self.missing_value + self.invalid_value
    }
}

/// A cleaned series together with the baseline its records were
/// normalized against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedSeries {
    pub series: WeatherSeries,
    /// `None` only when no row survived cleaning.
    pub baseline: Option<Baseline>,
    pub records: Vec<CleanedWeatherRecord>,
    pub report: CleanReport,
}

/// Clean untyped weather documents. See [`clean_records`].
pub fn clean(
    series: WeatherSeries,
    rows: &[RawRow],
    reference_years: &RangeInclusive<i32>,
) -> CleanedSeries {
    let records = rows.iter().map(RawWeatherRecord::from_row).collect::<Vec<_>>();
    clean_records(series, &records, reference_years)
}

/// Clean typed weather records.
///
/// In order: keep rows with a 4-digit year, build the calendar date from
/// (year, month, day) with missing parts already zero-filled, derive the
/// ISO week and the week key, drop sentinel and non-numeric values, then
/// normalize every survivor against the mean/min/max of the survivors whose
/// year lies in `reference_years`. If no survivor lies in that window the
/// baseline is taken over all survivors.
pub fn clean_records(
    series: WeatherSeries,
    raw: &[RawWeatherRecord],
    reference_years: &RangeInclusive<i32>,
) -> CleanedSeries {
    let mut report = CleanReport::default();
    let mut staged: Vec<(i32, NaiveDate, WeekKey, f64)> = Vec::with_capacity(raw.len());

    for record in raw {
        let year = match record.coerced_year() {
            Some(y) => y,
            None => {
                report.bad_year += 1;
                continue;
            }
        };
        let date = match NaiveDate::from_ymd_opt(year, record.month, record.day) {
            Some(d) => d,
            None => {
                report.bad_date += 1;
                continue;
            }
        };
        let week_key = WeekKey::from_year_and_date(year, &date);
        let value = match record.value {
            WeatherValue::Reading(v) => v,
            WeatherValue::Missing => {
                report.missing_value += 1;
                continue;
            }
            WeatherValue::Invalid => {
                report.invalid_value += 1;
                continue;
            }
        };
        staged.push((year, date, week_key, value));
    }

    let baseline = Baseline::from_values(
        staged
            .iter()
            .filter(|(year, ..)| reference_years.contains(year))
            .map(|(.., value)| *value),
    )
    .or_else(|| {
        if !staged.is_empty() {
            warn!(
                "[wxtune] clean: {:?} has no readings in {}..={}, baseline uses all {}",
                series,
                reference_years.start(),
                reference_years.end(),
                staged.len()
            );
        }
        Baseline::from_values(staged.iter().map(|(.., value)| *value))
    });

    if let Some(b) = baseline.filter(Baseline::is_degenerate) {
        warn!(
            "[wxtune] clean: {:?} baseline is degenerate (mean={}, min={}, max={})",
            series, b.mean, b.min, b.max
        );
    }

    let records = match baseline {
        Some(b) => staged
            .into_iter()
            .map(|(year, date, week_key, value)| CleanedWeatherRecord {
                year,
                month: date.month(),
                day: date.day(),
                date,
                iso_week: date.iso_week().week(),
                week_key,
                value,
                normalized_value: b.normalize_clipped(value),
            })
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };
    report.kept = records.len();

    info!(
        "[wxtune] clean: {:?} kept {}, dropped {} (year {}, date {}, missing {}, bad {})",
        series,
        report.kept,
        report.dropped(),
        report.bad_year,
        report.bad_date,
        report.missing_value,
        report.invalid_value
    );

    CleanedSeries {
        series,
        baseline,
        records,
        report,
    }
}
