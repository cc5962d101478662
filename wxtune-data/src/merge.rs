//! Joining chart entries with weekly weather.

use crate::aggregate::WeeklyWeatherAggregate;
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use wxtune_core::{chart::ChartRecord, week_key::WeekKey};

/// A chart entry with the weather of its week attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRow {
    pub chart: ChartRecord,
    pub weather: WeeklyWeatherAggregate,
}

/// Drop repeated (week, uri) pairs, keeping the first occurrence and the
/// original order of everything kept.
pub fn dedup_chart_records(records: Vec<ChartRecord>) -> Vec<ChartRecord> {
    let before = records.len();
    let mut seen: HashSet<(WeekKey, String)> = HashSet::with_capacity(before);
    let kept = records
        .into_iter()
        .filter(|r| seen.insert((r.week_key, r.uri.clone())))
        .collect::<Vec<_>>();
    if kept.len() != before {
        info!(
            "[wxtune] merge: collapsed {} duplicate chart entries",
            before - kept.len()
        );
    }
    kept
}

/// Inner-join chart entries against each weekly weather series in turn:
/// heat, then rainfall, then humidity.
///
/// Entries whose week is missing from any of the three are dropped, so the
/// result never has more rows than `chart`. Chart order is preserved.
pub fn merge(
    chart: &[ChartRecord],
    weekly_heat: &BTreeMap<WeekKey, f64>,
    weekly_rain: &BTreeMap<WeekKey, f64>,
    weekly_humidity: &BTreeMap<WeekKey, f64>,
) -> Vec<MergedRow> {
    let with_heat = chart
        .iter()
        .filter_map(|record| Some((record, *weekly_heat.get(&record.week_key)?)))
        .collect::<Vec<_>>();

    let with_rain = with_heat
        .into_iter()
        .filter_map(|(record, heat)| Some((record, heat, *weekly_rain.get(&record.week_key)?)))
        .collect::<Vec<_>>();

    let merged = with_rain
        .into_iter()
        .filter_map(|(record, heat, rain)| {
            let humidity = *weekly_humidity.get(&record.week_key)?;
            Some(MergedRow {
                chart: record.clone(),
                weather: WeeklyWeatherAggregate {
                    week_key: record.week_key,
                    avg_heat: heat,
                    avg_rainfall: rain,
                    avg_humidity: humidity,
                },
            })
        })
        .collect::<Vec<_>>();

    info!(
        "[wxtune] merge: {} of {} chart entries have full weather coverage",
        merged.len(),
        chart.len()
    );
    merged
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wxtune_core::chart::AudioFeatures;

    pub(crate) fn chart_record(week: &str, uri: &str, rank: u32) -> ChartRecord {
        ChartRecord {
            week_key: week.parse().unwrap(),
            uri: uri.to_string(),
            track_name: format!("track {}", uri),
            artist_names: "artist".to_string(),
            artist_individual: "artist".to_string(),
            release_date: "2021-01-01".to_string(),
            duration_ms: 180_000,
            rank,
            features: AudioFeatures::default(),
            album_cover: String::new(),
        }
    }

    fn wk(s: &str) -> WeekKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let records = vec![
            chart_record("2022-05", "uri:a", 1),
            chart_record("2022-05", "uri:b", 2),
            chart_record("2022-05", "uri:a", 7),
            chart_record("2022-06", "uri:a", 3),
        ];
        let deduped = dedup_chart_records(records);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].rank, 1);
        assert_eq!(deduped[1].uri, "uri:b");
        assert_eq!(deduped[2].week_key, wk("2022-06"));
    }

    #[test]
    fn test_merge_full_coverage_keeps_everything() {
        let chart = vec![
            chart_record("2022-01", "uri:a", 1),
            chart_record("2022-02", "uri:b", 1),
        ];
        let heat = BTreeMap::from([(wk("2022-01"), 0.1), (wk("2022-02"), 0.2)]);
        let rain = BTreeMap::from([(wk("2022-01"), 0.3), (wk("2022-02"), 0.4)]);
        let humidity = BTreeMap::from([(wk("2022-01"), 0.5), (wk("2022-02"), 0.6)]);
        let merged = merge(&chart, &heat, &rain, &humidity);
        assert_eq!(merged.len(), chart.len());
        assert_eq!(merged[1].chart.uri, "uri:b");
        assert_eq!(merged[1].weather.avg_rainfall, 0.4);
        assert_eq!(merged[1].weather.avg_humidity, 0.6);
    }

    #[test]
    fn test_merge_drops_weeks_without_weather() {
        let chart = vec![
            chart_record("2021-53", "uri:a", 1),
            chart_record("2022-01", "uri:b", 1),
            chart_record("2022-02", "uri:c", 1),
        ];
        let heat = BTreeMap::from([(wk("2022-01"), 0.1), (wk("2022-02"), 0.2)]);
        let rain = BTreeMap::from([(wk("2022-01"), 0.3), (wk("2022-02"), 0.4)]);
        // 2022-02 lacks humidity
        let humidity = BTreeMap::from([(wk("2022-01"), 0.5)]);
        let merged = merge(&chart, &heat, &rain, &humidity);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].chart.uri, "uri:b");
        assert!(merged.iter().all(|m| m.chart.week_key != wk("2021-53")));
        assert!(merged.len() <= chart.len());
    }

    #[test]
    fn test_merge_empty_weather() {
        let chart = vec![chart_record("2022-01", "uri:a", 1)];
        let empty = BTreeMap::new();
        assert!(merge(&chart, &empty, &empty, &empty).is_empty());
    }
}
