//! In-memory SQLite document store for chart and weather records.
//!
//! Each dataset is a named collection of JSON documents, one per CSV row,
//! mirroring how the raw exports are ingested into a document database.
//! The store implements [`wxtune_core::source::RecordSource`] so an analysis
//! session can pull untyped rows from it.
//!
//! # Usage
//!
//! ```rust
//! use wxtune_core::source::{Dataset, RecordSource, WeatherSeries};
//! use wxtune_db::Database;
//!
//! let db = Database::new().unwrap();
//! let rainfall = Dataset::Weather(WeatherSeries::Rainfall);
//! db.load_csv(rainfall, "Year,Month,Day,Value\n2022,1,3,0.4\n2022,1,4,***\n").unwrap();
//!
//! let rows = db.fetch_rows(rainfall).unwrap();
//! assert_eq!(rows.len(), 2);
//! ```

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding the raw document collections.
///
/// This struct is cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxtune_core::source::Dataset;

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_csv(Dataset::Chart, "uri,rank\nspotify:track:a,1\n")
            .unwrap();
        assert_eq!(
            db2.count(Dataset::Chart).unwrap(),
            1,
            "Clone should see same data via shared Rc"
        );
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        for dataset in Dataset::ALL {
            assert_eq!(db.count(dataset).unwrap(), 0);
        }
    }
}
