//! Weekly averaging.

use crate::clean::CleanedWeatherRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use wxtune_core::week_key::WeekKey;

/// Weekly means of the three normalized weather series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyWeatherAggregate {
    pub week_key: WeekKey,
    pub avg_heat: f64,
    pub avg_rainfall: f64,
    pub avg_humidity: f64,
}

/// Group `records` by week key and average the value of each group.
///
/// The result has exactly one entry per distinct key, in ascending key order.
pub fn aggregate<T, K, V>(records: &[T], key: K, value: V) -> BTreeMap<WeekKey, f64>
where
    K: Fn(&T) -> WeekKey,
    V: Fn(&T) -> f64,
{
    let mut sums: BTreeMap<WeekKey, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(key(record)).or_insert((0.0, 0));
        entry.0 += value(record);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(week, (sum, count))| (week, sum / count as f64))
        .collect()
}

/// Weekly mean of the normalized values of a cleaned weather series.
pub fn weekly_normalized(records: &[CleanedWeatherRecord]) -> BTreeMap<WeekKey, f64> {
    aggregate(records, |r| r.week_key, |r| r.normalized_value)
}

/// One row per week present in all three weekly series, ascending by week.
pub fn weekly_weather(
    heat: &BTreeMap<WeekKey, f64>,
    rainfall: &BTreeMap<WeekKey, f64>,
    humidity: &BTreeMap<WeekKey, f64>,
) -> Vec<WeeklyWeatherAggregate> {
    heat.iter()
        .filter_map(|(week, avg_heat)| {
            Some(WeeklyWeatherAggregate {
                week_key: *week,
                avg_heat: *avg_heat,
                avg_rainfall: *rainfall.get(week)?,
                avg_humidity: *humidity.get(week)?,
            })
        })
        .collect()
}
