//! Reading collections back out of the document store.

use crate::models::CollectionSummary;
use crate::Database;
use anyhow::Context;
use rusqlite::params;
use wxtune_core::source::{Dataset, RawRow, RecordSource};

impl Database {
    /// Number of documents in a dataset's collection.
    pub fn count(&self, dataset: Dataset) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![dataset.collection_name()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Remove every document of a dataset. Returns how many were removed.
    pub fn clear(&self, dataset: Dataset) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1",
            params![dataset.collection_name()],
        )?;
        log::info!("[wxtune] query: cleared {} documents from {}", removed, dataset);
        Ok(removed)
    }

    /// Document counts of every non-empty collection, by name.
    pub fn summaries(&self) -> anyhow::Result<Vec<CollectionSummary>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT collection, COUNT(*) FROM documents
             GROUP BY collection
             ORDER BY collection",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CollectionSummary {
                    collection: row.get(0)?,
                    documents: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RecordSource for Database {
    fn fetch_rows(&self, dataset: Dataset) -> anyhow::Result<Vec<RawRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT body FROM documents
             WHERE collection = ?1
             ORDER BY seq",
        )?;
        let bodies = stmt
            .query_map(params![dataset.collection_name()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let rows = bodies
            .iter()
            .map(|body| {
                serde_json::from_str::<RawRow>(body)
                    .with_context(|| format!("corrupt document in {}", dataset))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::info!(
            "[wxtune] query: fetch_rows({}) returned {} documents",
            dataset,
            rows.len()
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use wxtune_core::source::{Dataset, RecordSource, WeatherSeries};

    #[test]
    fn clear_only_touches_one_collection() {
        let db = Database::new().unwrap();
        let rain = Dataset::Weather(WeatherSeries::Rainfall);
        db.load_csv(Dataset::Chart, "uri,rank\na,1\n").unwrap();
        db.load_csv(rain, "Year,Month,Day,Value\n2022,1,3,1.0\n2022,1,4,2.0\n")
            .unwrap();
        assert_eq!(db.clear(rain).unwrap(), 2);
        assert_eq!(db.count(rain).unwrap(), 0);
        assert_eq!(db.count(Dataset::Chart).unwrap(), 1);
        assert!(db.fetch_rows(rain).unwrap().is_empty());
    }

    #[test]
    fn summaries_list_non_empty_collections() {
        let db = Database::new().unwrap();
        db.load_csv(Dataset::Chart, "uri,rank\na,1\nb,2\n").unwrap();
        db.load_csv(
            Dataset::Weather(WeatherSeries::HeatIndex),
            "Year,Month,Day,Value\n2022,1,3,1.0\n",
        )
        .unwrap();
        let summaries = db.summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].collection, "spotify_hk");
        assert_eq!(summaries[0].documents, 2);
        assert_eq!(summaries[1].collection, "weather_hk_heat");
    }
}
