//! Record source abstraction.
//!
//! A record source hands back untyped documents (field name -> JSON value)
//! for one of four named collections. Typed conversion happens in
//! [`crate::weather`] and [`crate::chart`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single untyped document as stored in the record source.
pub type RawRow = Map<String, Value>;

/// The three weather observation series.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum WeatherSeries {
    Rainfall,
    HeatIndex,
    RelativeHumidity,
}

impl WeatherSeries {
    pub const ALL: [WeatherSeries; 3] = [
        WeatherSeries::HeatIndex,
        WeatherSeries::Rainfall,
        WeatherSeries::RelativeHumidity,
    ];

    /// Unit label for display.
    pub fn unit(&self) -> &'static str {
        match self {
            WeatherSeries::Rainfall => "mm",
            WeatherSeries::HeatIndex => "°C",
            WeatherSeries::RelativeHumidity => "%",
        }
    }
}

/// A named collection in the record source.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Dataset {
    Chart,
    Weather(WeatherSeries),
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Chart,
        Dataset::Weather(WeatherSeries::Rainfall),
        Dataset::Weather(WeatherSeries::HeatIndex),
        Dataset::Weather(WeatherSeries::RelativeHumidity),
    ];

    /// Collection name used by the document store.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Dataset::Chart => "spotify_hk",
            Dataset::Weather(WeatherSeries::Rainfall) => "weather_hk_rf",
            Dataset::Weather(WeatherSeries::HeatIndex) => "weather_hk_heat",
            Dataset::Weather(WeatherSeries::RelativeHumidity) => "weather_hk_rh",
        }
    }

    pub fn from_collection_name(name: &str) -> Option<Dataset> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.collection_name() == name)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// Anything that can supply raw documents for a dataset.
pub trait RecordSource {
    fn fetch_rows(&self, dataset: Dataset) -> anyhow::Result<Vec<RawRow>>;
}

/// Look up a field by name, falling back to a case-insensitive match.
pub fn field<'a>(row: &'a RawRow, name: &str) -> Option<&'a Value> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Render a scalar field as a trimmed string. Null and missing fields give `None`.
pub fn field_str(row: &RawRow, name: &str) -> Option<String> {
    match field(row, name)? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a numeric field, accepting both JSON numbers and numeric strings.
pub fn field_f64(row: &RawRow, name: &str) -> Option<f64> {
    match field(row, name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
