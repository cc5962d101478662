//! Weather-matched playlist.

use crate::input::DataArgs;
use crate::output::print_csv;
use anyhow::anyhow;
use chrono::Local;
use clap::Args;
use log::{info, warn};
use serde::Serialize;
use std::time::Duration;
use wxtune_core::live::{fetch_live_weather, LiveWeather, LiveWeatherConfig, RHRREAD_URL};
use wxtune_data::config::DEFAULT_TOP_K;
use wxtune_data::rank::ScoredRow;
use wxtune_utils::format::format_duration;

const LIVE_UNAVAILABLE: &str =
    "live weather source unavailable; pass --temperature, --rainfall and --humidity to run offline";

/// Parse a weather override, rejecting NaN and infinities.
fn parse_finite(s: &str) -> Result<f64, String> {
    let value = s
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("{:?} is not a number: {}", s, e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{:?} is not a finite number", s))
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlaylistArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Use this temperature (°C) instead of the live reading
    #[arg(long, value_parser = parse_finite)]
    pub temperature: Option<f64>,

    /// Use this hourly rainfall (mm) instead of the live reading
    #[arg(long, value_parser = parse_finite)]
    pub rainfall: Option<f64>,

    /// Use this relative humidity (%) instead of the live reading
    #[arg(long, value_parser = parse_finite)]
    pub humidity: Option<f64>,

    /// Number of tracks in the playlist
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Give up on the live weather source after this many seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Live weather endpoint
    #[arg(long, default_value = RHRREAD_URL)]
    pub url: String,
}

/// One line of the printed playlist.
#[derive(Debug, Serialize, PartialEq)]
pub struct PlaylistEntry {
    pub position: usize,
    pub track_name: String,
    pub artist_names: String,
    pub release_date: String,
    pub duration: String,
    pub week: String,
    pub score: f64,
    pub uri: String,
    pub album_cover: String,
}

impl PlaylistEntry {
    pub fn from_scored(position: usize, scored: &ScoredRow) -> PlaylistEntry {
        let chart = &scored.row.chart;
        PlaylistEntry {
            position,
            track_name: chart.track_name.clone(),
            artist_names: chart.artist_names.clone(),
            release_date: chart.release_date.clone(),
            duration: format_duration(chart.duration_ms),
            week: chart.week_key.to_string(),
            score: scored.score,
            uri: chart.uri.clone(),
            album_cover: chart.album_cover.clone(),
        }
    }
}

impl PlaylistArgs {
    fn overrides(&self) -> LiveWeather {
        LiveWeather {
            temperature: self.temperature,
            rainfall: self.rainfall,
            humidity: self.humidity,
        }
    }

    fn live_config(&self) -> LiveWeatherConfig {
        LiveWeatherConfig {
            url: self.url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..LiveWeatherConfig::default()
        }
    }
}

/// Overrides win over fetched readings, field by field.
fn combine(overrides: LiveWeather, fetched: LiveWeather) -> LiveWeather {
    LiveWeather {
        temperature: overrides.temperature.or(fetched.temperature),
        rainfall: overrides.rainfall.or(fetched.rainfall),
        humidity: overrides.humidity.or(fetched.humidity),
    }
}

/// Resolve the current conditions, only calling the live source when the
/// overrides leave a reading unset.
async fn current_weather(args: &PlaylistArgs) -> anyhow::Result<LiveWeather> {
    let overrides = args.overrides();
    if overrides.complete().is_ok() {
        info!("Using weather given on the command line");
        return Ok(overrides);
    }
    let config = args.live_config();
    let client = reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .build()?;
    match fetch_live_weather(&client, &config).await {
        Ok(fetched) => Ok(combine(overrides, fetched)),
        Err(e) => {
            warn!("Live weather unavailable: {}", e);
            Err(anyhow!(e).context(LIVE_UNAVAILABLE))
        }
    }
}

pub async fn run_playlist(args: &PlaylistArgs) -> anyhow::Result<()> {
    let live = current_weather(args).await?;
    let session = args.data.session(args.top_k)?;

    info!(
        "Conditions on {}: temperature={:?}°C rainfall={:?}mm humidity={:?}%",
        Local::now().format("%A, %B %d, %Y"),
        live.temperature,
        live.rainfall,
        live.humidity
    );

    let playlist = session.playlist(&live)?;
    let entries = playlist
        .iter()
        .enumerate()
        .map(|(i, scored)| PlaylistEntry::from_scored(i + 1, scored))
        .collect::<Vec<_>>();
    print_csv(&entries)
}
