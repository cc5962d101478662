use std::ops::RangeInclusive;

/// First and last year of the window baselines are computed over.
pub const REFERENCE_START_YEAR: i32 = 2021;
pub const REFERENCE_END_YEAR: i32 = 2022;

/// Default number of tracks in a playlist.
pub const DEFAULT_TOP_K: usize = 20;

/// Default number of rows in a per-week chart listing.
pub const DEFAULT_TOP_TRACKS: usize = 10;

/// Tunables for one analysis session.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Years (inclusive) whose readings define each series' baseline.
    pub reference_years: RangeInclusive<i32>,
    /// Playlist length.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            reference_years: REFERENCE_START_YEAR..=REFERENCE_END_YEAR,
            top_k: DEFAULT_TOP_K,
        }
    }
}
