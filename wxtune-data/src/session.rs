//! Per-session snapshot cache.
//!
//! Each dataset (and each table derived from them) is computed the first
//! time it is asked for and then shared as an `Rc` snapshot for the rest of
//! the session. `reset` drops everything so the next access reloads from the
//! record source.

use crate::aggregate::{weekly_normalized, weekly_weather, WeeklyWeatherAggregate};
use crate::clean::{clean, CleanedSeries};
use crate::config::PipelineConfig;
use crate::correlation::{correlate_feature, CorrelationMatrix};
use crate::merge::{dedup_chart_records, merge, MergedRow};
use crate::rank::{top_matches, ScoredRow, TargetWeatherVector};
use anyhow::anyhow;
use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use wxtune_core::{
    chart::{AudioFeature, ChartRecord, ChartRowError},
    live::LiveWeather,
    source::{Dataset, RecordSource, WeatherSeries},
};

/// Name of a cached table.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SessionKey {
    Source(Dataset),
    WeeklyWeather,
    Merged,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKey::Source(dataset) => write!(f, "data_{}", dataset.collection_name()),
            SessionKey::WeeklyWeather => f.write_str("data_weekly_weather"),
            SessionKey::Merged => f.write_str("data_weather_spotify"),
        }
    }
}

#[derive(Clone)]
enum Snapshot {
    Chart(Rc<Vec<ChartRecord>>),
    Weather(Rc<CleanedSeries>),
    WeeklyWeather(Rc<Vec<WeeklyWeatherAggregate>>),
    Merged(Rc<Vec<MergedRow>>),
}

/// One analysis session over a record source.
pub struct Session<S> {
    source: S,
    config: PipelineConfig,
    cache: RefCell<HashMap<SessionKey, Snapshot>>,
}

impl<S: RecordSource> Session<S> {
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Session {
            source,
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_cached(&self, key: SessionKey) -> bool {
        self.cache.borrow().contains_key(&key)
    }

    /// Forget every snapshot.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
        debug!("[wxtune] session: cache cleared");
    }

    fn cached<T>(
        &self,
        key: SessionKey,
        wrap: fn(Rc<T>) -> Snapshot,
        unwrap: fn(&Snapshot) -> Option<Rc<T>>,
        compute: impl FnOnce() -> anyhow::Result<T>,
    ) -> anyhow::Result<Rc<T>> {
        if let Some(hit) = self.cache.borrow().get(&key).and_then(unwrap) {
            return Ok(hit);
        }
        // The borrow above is released before computing, which may itself
        // read other snapshots.
        let value = Rc::new(compute()?);
        self.cache.borrow_mut().insert(key, wrap(Rc::clone(&value)));
        debug!("[wxtune] session: cached {}", key);
        Ok(value)
    }

    /// Typed, deduplicated chart entries.
    pub fn chart_records(&self) -> anyhow::Result<Rc<Vec<ChartRecord>>> {
        self.cached(
            SessionKey::Source(Dataset::Chart),
            Snapshot::Chart,
            |s| match s {
                Snapshot::Chart(v) => Some(Rc::clone(v)),
                _ => None,
            },
            || {
                let rows = self.source.fetch_rows(Dataset::Chart)?;
                let mut rejected: HashMap<ChartRowError, usize> = HashMap::new();
                let records = rows
                    .iter()
                    .filter_map(|row| match ChartRecord::try_from(row) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            *rejected.entry(e).or_default() += 1;
                            None
                        }
                    })
                    .collect::<Vec<_>>();
                for (reason, count) in &rejected {
                    info!("[wxtune] session: rejected {} chart rows: {}", count, reason);
                }
                Ok(dedup_chart_records(records))
            },
        )
    }

    /// A cleaned, normalized weather series.
    pub fn weather(&self, series: WeatherSeries) -> anyhow::Result<Rc<CleanedSeries>> {
        self.cached(
            SessionKey::Source(Dataset::Weather(series)),
            Snapshot::Weather,
            |s| match s {
                Snapshot::Weather(v) => Some(Rc::clone(v)),
                _ => None,
            },
            || {
                let rows = self.source.fetch_rows(Dataset::Weather(series))?;
                Ok(clean(series, &rows, &self.config.reference_years))
            },
        )
    }

    /// Weeks covered by all three weather series.
    pub fn weekly_weather(&self) -> anyhow::Result<Rc<Vec<WeeklyWeatherAggregate>>> {
        self.cached(
            SessionKey::WeeklyWeather,
            Snapshot::WeeklyWeather,
            |s| match s {
                Snapshot::WeeklyWeather(v) => Some(Rc::clone(v)),
                _ => None,
            },
            || {
                let heat = weekly_normalized(&self.weather(WeatherSeries::HeatIndex)?.records);
                let rain = weekly_normalized(&self.weather(WeatherSeries::Rainfall)?.records);
                let humidity =
                    weekly_normalized(&self.weather(WeatherSeries::RelativeHumidity)?.records);
                Ok(weekly_weather(&heat, &rain, &humidity))
            },
        )
    }

    /// Chart entries joined with the weather of their week.
    pub fn merged(&self) -> anyhow::Result<Rc<Vec<MergedRow>>> {
        self.cached(
            SessionKey::Merged,
            Snapshot::Merged,
            |s| match s {
                Snapshot::Merged(v) => Some(Rc::clone(v)),
                _ => None,
            },
            || {
                let chart = self.chart_records()?;
                let heat = weekly_normalized(&self.weather(WeatherSeries::HeatIndex)?.records);
                let rain = weekly_normalized(&self.weather(WeatherSeries::Rainfall)?.records);
                let humidity =
                    weekly_normalized(&self.weather(WeatherSeries::RelativeHumidity)?.records);
                Ok(merge(&chart, &heat, &rain, &humidity))
            },
        )
    }

    /// Normalize live readings against this session's weather baselines.
    pub fn target_for(&self, live: &LiveWeather) -> anyhow::Result<TargetWeatherVector> {
        let baseline = |series: WeatherSeries| -> anyhow::Result<_> {
            self.weather(series)?
                .baseline
                .ok_or_else(|| anyhow!("no usable {:?} readings to normalize against", series))
        };
        let heat = baseline(WeatherSeries::HeatIndex)?;
        let rain = baseline(WeatherSeries::Rainfall)?;
        let humidity = baseline(WeatherSeries::RelativeHumidity)?;
        Ok(TargetWeatherVector::from_live(live, &heat, &rain, &humidity)?)
    }

    /// The configured number of best weather matches for a target.
    pub fn playlist_for_target(
        &self,
        target: &TargetWeatherVector,
    ) -> anyhow::Result<Vec<ScoredRow>> {
        let merged = self.merged()?;
        let top = top_matches(&merged, target, self.config.top_k);
        info!(
            "[wxtune] session: playlist of {} tracks from {} merged rows",
            top.len(),
            merged.len()
        );
        Ok(top)
    }

    /// The configured number of best weather matches for live readings.
    /// Fails when any reading is missing.
    pub fn playlist(&self, live: &LiveWeather) -> anyhow::Result<Vec<ScoredRow>> {
        let target = self.target_for(live)?;
        self.playlist_for_target(&target)
    }

    pub fn correlation(&self, feature: AudioFeature) -> anyhow::Result<CorrelationMatrix> {
        let chart = self.chart_records()?;
        let weekly = self.weekly_weather()?;
        Ok(correlate_feature(&chart, &weekly, feature))
    }
}
