use crate::source::{field_f64, field_str, RawRow};
use crate::week_key::WeekKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format of the chart's `report_date` column: "YYYY-MM-DD"
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// The eight audio features carried by every chart entry.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum AudioFeature {
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Liveness,
    Valence,
    Tempo,
}

impl AudioFeature {
    pub const ALL: [AudioFeature; 8] = [
        AudioFeature::Danceability,
        AudioFeature::Energy,
        AudioFeature::Loudness,
        AudioFeature::Speechiness,
        AudioFeature::Acousticness,
        AudioFeature::Liveness,
        AudioFeature::Valence,
        AudioFeature::Tempo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AudioFeature::Danceability => "danceability",
            AudioFeature::Energy => "energy",
            AudioFeature::Loudness => "loudness",
            AudioFeature::Speechiness => "speechiness",
            AudioFeature::Acousticness => "acousticness",
            AudioFeature::Liveness => "liveness",
            AudioFeature::Valence => "valence",
            AudioFeature::Tempo => "tempo",
        }
    }

    pub fn from_name(name: &str) -> Option<AudioFeature> {
        let name = name.trim();
        AudioFeature::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Audio analysis values for a track.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    /// Loudness in dB
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub liveness: f64,
    pub valence: f64,
    /// Tempo in BPM
    pub tempo: f64,
}

impl AudioFeatures {
    pub fn get(&self, feature: AudioFeature) -> f64 {
        match feature {
            AudioFeature::Danceability => self.danceability,
            AudioFeature::Energy => self.energy,
            AudioFeature::Loudness => self.loudness,
            AudioFeature::Speechiness => self.speechiness,
            AudioFeature::Acousticness => self.acousticness,
            AudioFeature::Liveness => self.liveness,
            AudioFeature::Valence => self.valence,
            AudioFeature::Tempo => self.tempo,
        }
    }
}

/// One entry of a weekly chart.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ChartRecord {
    pub week_key: WeekKey,
    /// Streaming service track URI, unique per track.
    pub uri: String,
    pub track_name: String,
    pub artist_names: String,
    pub artist_individual: String,
    pub release_date: String,
    pub duration_ms: u64,
    /// Chart position, 1 is the top.
    pub rank: u32,
    pub features: AudioFeatures,
    pub album_cover: String,
}

/// Reasons a chart document is rejected at the ingestion boundary.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ChartRowError {
    MissingWeekKey,
    MissingUri,
    InvalidRank,
    MissingFeature(AudioFeature),
}

impl fmt::Display for ChartRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartRowError::MissingWeekKey => write!(f, "no usable report_date_YW or report_date"),
            ChartRowError::MissingUri => write!(f, "missing uri"),
            ChartRowError::InvalidRank => write!(f, "rank is not a positive integer"),
            ChartRowError::MissingFeature(feature) => {
                write!(f, "missing audio feature {}", feature)
            }
        }
    }
}

impl std::error::Error for ChartRowError {}

impl TryFrom<&RawRow> for ChartRecord {
    type Error = ChartRowError;

    fn try_from(row: &RawRow) -> Result<Self, Self::Error> {
        let week_key = field_str(row, "report_date_YW")
            .and_then(|s| s.parse::<WeekKey>().ok())
            .or_else(|| {
                field_str(row, "report_date")
                    .and_then(|s| NaiveDate::parse_from_str(&s, REPORT_DATE_FORMAT).ok())
                    .map(|d| WeekKey::from_date(&d))
            })
            .ok_or(ChartRowError::MissingWeekKey)?;

        let uri = field_str(row, "uri")
            .filter(|s| !s.is_empty())
            .ok_or(ChartRowError::MissingUri)?;

        let rank = field_f64(row, "rank")
            .filter(|r| *r >= 1.0 && r.fract() == 0.0 && *r <= u32::MAX as f64)
            .map(|r| r as u32)
            .ok_or(ChartRowError::InvalidRank)?;

        let feature = |f: AudioFeature| {
            field_f64(row, f.name()).ok_or(ChartRowError::MissingFeature(f))
        };
        let features = AudioFeatures {
            danceability: feature(AudioFeature::Danceability)?,
            energy: feature(AudioFeature::Energy)?,
            loudness: feature(AudioFeature::Loudness)?,
            speechiness: feature(AudioFeature::Speechiness)?,
            acousticness: feature(AudioFeature::Acousticness)?,
            liveness: feature(AudioFeature::Liveness)?,
            valence: feature(AudioFeature::Valence)?,
            tempo: feature(AudioFeature::Tempo)?,
        };

        let duration_ms = field_f64(row, "duration")
            .filter(|d| *d >= 0.0)
            .map(|d| d as u64)
            .unwrap_or(0);

        Ok(ChartRecord {
            week_key,
            uri,
            track_name: field_str(row, "track_name").unwrap_or_default(),
            artist_names: field_str(row, "artist_names").unwrap_or_default(),
            artist_individual: field_str(row, "artist_individual").unwrap_or_default(),
            release_date: field_str(row, "release_date").unwrap_or_default(),
            duration_ms,
            rank,
            features,
            album_cover: field_str(row, "album_cover").unwrap_or_default(),
        })
    }
}
