//! Dataset inputs shared by every subcommand.

use anyhow::Context;
use clap::Args;
use flate2::read::GzDecoder;
use log::info;
use std::io::Read;
use std::path::{Path, PathBuf};
use wxtune_core::source::{Dataset, WeatherSeries};
use wxtune_data::config::{PipelineConfig, REFERENCE_END_YEAR, REFERENCE_START_YEAR};
use wxtune_data::session::Session;
use wxtune_db::Database;

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Weekly chart export (CSV, optionally .gz)
    #[arg(short = 'c', long)]
    pub chart_csv: PathBuf,

    /// Daily total rainfall export (CSV, optionally .gz)
    #[arg(short = 'r', long)]
    pub rainfall_csv: PathBuf,

    /// Daily mean heat index export (CSV, optionally .gz)
    #[arg(short = 't', long)]
    pub heat_csv: PathBuf,

    /// Daily mean relative humidity export (CSV, optionally .gz)
    #[arg(short = 'u', long)]
    pub humidity_csv: PathBuf,

    /// First year of the baseline window
    #[arg(long, default_value_t = REFERENCE_START_YEAR)]
    pub reference_start: i32,

    /// Last year of the baseline window
    #[arg(long, default_value_t = REFERENCE_END_YEAR)]
    pub reference_end: i32,
}

/// Read a text file, gunzipping it first when the name ends in `.gz`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if is_gzip {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut text = String::new();
        GzDecoder::new(file)
            .read_to_string(&mut text)
            .with_context(|| format!("failed to decompress {}", path.display()))?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

impl DataArgs {
    fn paths(&self) -> [(Dataset, &Path); 4] {
        [
            (Dataset::Chart, self.chart_csv.as_path()),
            (Dataset::Weather(WeatherSeries::Rainfall), self.rainfall_csv.as_path()),
            (Dataset::Weather(WeatherSeries::HeatIndex), self.heat_csv.as_path()),
            (
                Dataset::Weather(WeatherSeries::RelativeHumidity),
                self.humidity_csv.as_path(),
            ),
        ]
    }

    /// Ingest all four exports into a fresh document store.
    pub fn load_database(&self) -> anyhow::Result<Database> {
        let db = Database::new()?;
        for (dataset, path) in self.paths() {
            let text = read_input(path)?;
            let count = db
                .load_csv(dataset, &text)
                .with_context(|| format!("failed to ingest {}", path.display()))?;
            info!("Ingested {} documents from {}", count, path.display());
        }
        Ok(db)
    }

    pub fn config(&self, top_k: usize) -> anyhow::Result<PipelineConfig> {
        if self.reference_start > self.reference_end {
            anyhow::bail!(
                "baseline window {}..={} is empty",
                self.reference_start,
                self.reference_end
            );
        }
        Ok(PipelineConfig {
            reference_years: self.reference_start..=self.reference_end,
            top_k,
        })
    }

    pub fn session(&self, top_k: usize) -> anyhow::Result<Session<Database>> {
        let config = self.config(top_k)?;
        Ok(Session::new(self.load_database()?, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn data_args(start: i32, end: i32) -> DataArgs {
        DataArgs {
            chart_csv: PathBuf::from("chart.csv"),
            rainfall_csv: PathBuf::from("rf.csv"),
            heat_csv: PathBuf::from("heat.csv"),
            humidity_csv: PathBuf::from("rh.csv"),
            reference_start: start,
            reference_end: end,
        }
    }

    #[test]
    fn test_read_plain_and_gzip() {
        let dir = std::env::temp_dir().join(format!("wxtune-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let text = "Year,Month,Day,Value\n2022,1,3,1.5\n";

        let plain = dir.join("rf.csv");
        std::fs::write(&plain, text).unwrap();
        assert_eq!(read_input(&plain).unwrap(), text);

        let gz = dir.join("rf.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_input(&gz).unwrap(), text);

        assert!(read_input(&dir.join("missing.csv")).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_validates_window() {
        let config = data_args(2019, 2020).config(5).unwrap();
        assert_eq!(config.reference_years, 2019..=2020);
        assert_eq!(config.top_k, 5);
        assert!(data_args(2023, 2021).config(5).is_err());
    }
}
