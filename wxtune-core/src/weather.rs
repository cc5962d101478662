use crate::source::{field, field_str, RawRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tokens the weather feeds use for "no reading".
pub const MISSING_SENTINELS: [&str; 4] = ["***", "---", "N/A", ""];

/// Field names of a weather document.
pub const YEAR_FIELD: &str = "Year";
pub const MONTH_FIELD: &str = "Month";
pub const DAY_FIELD: &str = "Day";
pub const VALUE_FIELD: &str = "Value";

/// Represents a weather reading value.
/// - `Missing`: a sentinel token ("***" and friends) or an absent field
/// - `Reading(f64)`: a finite numeric value
/// - `Invalid`: present but not a finite number (e.g. "Trace")
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum WeatherValue {
    Missing,
    Invalid,
    Reading(f64),
}

impl WeatherValue {
    pub fn parse(token: Option<&str>) -> WeatherValue {
        let token = match token {
            None => return WeatherValue::Missing,
            Some(t) => t.trim(),
        };
        if MISSING_SENTINELS.contains(&token) {
            return WeatherValue::Missing;
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => WeatherValue::Reading(v),
            _ => WeatherValue::Invalid,
        }
    }
}

/// A weather document after typed extraction, before any validation of the
/// calendar date. Month and day are zero when absent or unparseable.
#[derive(Debug, PartialEq, Clone)]
pub struct RawWeatherRecord {
    pub year: String,
    pub month: u32,
    pub day: u32,
    pub value: WeatherValue,
}

impl RawWeatherRecord {
    pub fn new(year: &str, month: u32, day: u32, value: Option<&str>) -> RawWeatherRecord {
        RawWeatherRecord {
            year: year.to_string(),
            month,
            day,
            value: WeatherValue::parse(value),
        }
    }

    /// Build from an untyped document. Never fails; bad fields surface as
    /// zero month/day, an empty year or a non-`Reading` value.
    pub fn from_row(row: &RawRow) -> RawWeatherRecord {
        let year = field_str(row, YEAR_FIELD).unwrap_or_default();
        let month = zero_fill(row, MONTH_FIELD);
        let day = zero_fill(row, DAY_FIELD);
        let value = match field(row, VALUE_FIELD) {
            None | Some(Value::Null) => WeatherValue::Missing,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => WeatherValue::Reading(v),
                _ => WeatherValue::Invalid,
            },
            Some(Value::String(s)) => WeatherValue::parse(Some(s)),
            Some(_) => WeatherValue::Invalid,
        };
        RawWeatherRecord {
            year,
            month,
            day,
            value,
        }
    }

    /// The year coerced to four digits, if the raw field is a well-formed
    /// year. Accepts float renderings such as `2021.0`.
    pub fn coerced_year(&self) -> Option<i32> {
        coerce_year(&self.year)
    }
}

/// Coerce a year token to a 4-digit year. `"2021"`, `"2021.0"` and
/// `" 2021 "` are accepted, anything else is rejected.
pub fn coerce_year(token: &str) -> Option<i32> {
    let token = token.trim();
    let digits = match token.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.chars().all(|c| c == '0') => whole,
        Some(_) => return None,
        None => token,
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i32>().ok()
}

fn zero_fill(row: &RawRow, name: &str) -> u32 {
    field_str(row, name)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u32)
        .unwrap_or(0)
}
