//! Shared utility functions for wxtune crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, Weekday};

    /// Oldest and newest years accepted in a week key for display.
    pub const MIN_DISPLAY_YEAR: i32 = 1900;
    pub const MAX_DISPLAY_YEAR: i32 = 2100;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Monday of the ISO week named by a "YYYY-WW" string.
    ///
    /// Returns `None` for malformed input, years outside 1900..=2100, weeks
    /// outside 1..=53, or week 53 in a year that has only 52 ISO weeks.
    pub fn week_key_to_monday(year_week: &str) -> Option<NaiveDate> {
        let (year_str, week_str) = year_week.trim().split_once('-')?;
        let year = year_str.parse::<i32>().ok()?;
        let week = week_str.parse::<u32>().ok()?;
        if !(MIN_DISPLAY_YEAR..=MAX_DISPLAY_YEAR).contains(&year) || !(1..=53).contains(&week) {
            return None;
        }
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
    }

    /// "YYYY-WW (YYYY-MM-DD)" label for a week key, falling back to
    /// "Unknown date" when the key has no Monday.
    pub fn week_label(year_week: &str) -> String {
        let monday = week_key_to_monday(year_week)
            .map(|d| format_date(&d))
            .unwrap_or_else(|| "Unknown date".to_string());
        format!("{} ({})", year_week, monday)
    }

}

/// Display formatting helpers
pub mod format {
    /// Format a track length in milliseconds as "m:ss".
    pub fn format_duration(ms: u64) -> String {
        let seconds = ms / 1000;
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    #[cfg(test)]
    mod tests {
        use super::format_duration;

        #[test]
        fn test_format_duration() {
            assert_eq!(format_duration(201_000), "3:21");
            assert_eq!(format_duration(59_999), "0:59");
            assert_eq!(format_duration(0), "0:00");
            assert_eq!(format_duration(3_600_000), "60:00");
        }
    }
}
