//! Command implementations for the wxtune CLI.
//!
//! Every subcommand ingests the four CSV exports into an in-memory document
//! store, opens an analysis session over it and prints its result as CSV.

use clap::Subcommand;

pub mod analysis;
pub mod input;
pub mod output;
pub mod playlist;

use analysis::SeriesArg;
use input::DataArgs;
use playlist::PlaylistArgs;
use wxtune_data::config::DEFAULT_TOP_TRACKS;

#[derive(Subcommand)]
pub enum Command {
    /// Rank chart tracks by how closely their week's weather matches now
    Playlist(PlaylistArgs),

    /// Correlate weekly audio features with weekly weather
    Correlate {
        #[command(flatten)]
        data: DataArgs,

        /// Only this audio feature (default: all eight)
        #[arg(short = 'f', long)]
        feature: Option<String>,
    },

    /// Print the weekly mean of one audio feature across the chart
    FeatureTrend {
        #[command(flatten)]
        data: DataArgs,

        /// Audio feature name, e.g. danceability
        #[arg(short = 'f', long)]
        feature: String,
    },

    /// Print the cleaned daily readings of one weather series
    WeatherSeries {
        #[command(flatten)]
        data: DataArgs,

        /// Which series to print
        #[arg(short = 's', long, value_enum)]
        series: SeriesArg,
    },

    /// Print the weekly weather averages used for matching
    WeeklyWeather {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Print the top of the chart for one week
    TopTracks {
        #[command(flatten)]
        data: DataArgs,

        /// Week as YYYY-WW (default: the most recent chart week)
        #[arg(short = 'w', long)]
        week: Option<String>,

        /// Number of tracks
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_TRACKS)]
        limit: usize,
    },

    /// Ingest the exports and report what survived cleaning
    Ingest {
        #[command(flatten)]
        data: DataArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Playlist(args) => playlist::run_playlist(&args).await,
        Command::Correlate { data, feature } => analysis::run_correlate(&data, feature.as_deref()),
        Command::FeatureTrend { data, feature } => analysis::run_feature_trend(&data, &feature),
        Command::WeatherSeries { data, series } => analysis::run_weather_series(&data, series),
        Command::WeeklyWeather { data } => analysis::run_weekly_weather(&data),
        Command::TopTracks { data, week, limit } => {
            analysis::run_top_tracks(&data, week.as_deref(), limit)
        }
        Command::Ingest { data } => analysis::run_ingest(&data),
    }
}
