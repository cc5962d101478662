//! Loading documents into collections.
//!
//! CSV exports (with a header row) are turned into one JSON document per
//! record, keyed by header name. Cells are typed the way a dataframe export
//! would type them: integers, then finite floats, then strings; empty cells
//! become `null`.
//!
//! # Example CSV
//! ```text
//! Year,Month,Day,Value
//! 2022,1,3,28.4
//! 2022,1,4,***
//! ```

use crate::Database;
use rusqlite::{params, Connection};
use serde_json::{Number, Value};
use wxtune_core::source::{Dataset, RawRow};

/// Convert one CSV cell to a JSON value.
pub(crate) fn cell_to_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = cell
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(cell.to_string())
}

fn next_seq(conn: &Connection, collection: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(seq) + 1, 0) FROM documents WHERE collection = ?1",
        params![collection],
        |row| row.get(0),
    )
}

impl Database {
    /// Append CSV records to a dataset's collection. Returns the number of
    /// documents inserted. Records with the wrong number of fields are
    /// skipped.
    pub fn load_csv(&self, dataset: Dataset, csv_data: &str) -> anyhow::Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(csv_data.as_bytes());
        let headers = rdr.headers()?.clone();

        let mut rows: Vec<RawRow> = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            if r.len() != headers.len() {
                skipped += 1;
                continue;
            }
            let row = headers
                .iter()
                .zip(r.iter())
                .map(|(name, cell)| (name.to_string(), cell_to_value(cell)))
                .collect::<RawRow>();
            rows.push(row);
        }
        let count = self.load_rows(dataset, &rows)?;
        log::info!(
            "[wxtune] loader: Loaded {} {} documents, skipped {} malformed",
            count,
            dataset,
            skipped
        );
        Ok(count)
    }

    /// Append already-built documents to a dataset's collection.
    pub fn load_rows(&self, dataset: Dataset, rows: &[RawRow]) -> anyhow::Result<usize> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let collection = dataset.collection_name();
        let mut seq = next_seq(&tx, collection)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO documents (collection, seq, body) VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                let body = serde_json::to_string(row)?;
                stmt.execute(params![collection, seq, body])?;
                seq += 1;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::cell_to_value;
    use crate::Database;
    use serde_json::{json, Value};
    use wxtune_core::source::{Dataset, RecordSource, WeatherSeries};

    #[test]
    fn cell_typing() {
        assert_eq!(cell_to_value("2021"), json!(2021));
        assert_eq!(cell_to_value(" 28.5 "), json!(28.5));
        assert_eq!(cell_to_value("***"), json!("***"));
        assert_eq!(cell_to_value("NaN"), json!("NaN"));
        assert_eq!(cell_to_value(""), Value::Null);
        assert_eq!(cell_to_value("spotify:track:1"), json!("spotify:track:1"));
    }

    #[test]
    fn load_weather_csv() {
        let db = Database::new().unwrap();
        let heat = Dataset::Weather(WeatherSeries::HeatIndex);
        let csv = "\
Year,Month,Day,Value
2022,1,3,28.4
2022,1,4,***
2022,,5,27.0
";
        assert_eq!(db.load_csv(heat, csv).unwrap(), 3);
        let rows = db.fetch_rows(heat).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["Value"], json!(28.4));
        assert_eq!(rows[1]["Value"], json!("***"));
        assert_eq!(rows[2]["Month"], Value::Null);
        // other collections untouched
        assert_eq!(db.count(Dataset::Chart).unwrap(), 0);
    }

    #[test]
    fn load_appends_in_order() {
        let db = Database::new().unwrap();
        db.load_csv(Dataset::Chart, "uri,rank\na,1\nb,2\n").unwrap();
        db.load_csv(Dataset::Chart, "uri,rank\nc,3\n").unwrap();
        let uris: Vec<Value> = db
            .fetch_rows(Dataset::Chart)
            .unwrap()
            .into_iter()
            .map(|r| r["uri"].clone())
            .collect();
        assert_eq!(uris, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn load_skips_ragged_records() {
        let db = Database::new().unwrap();
        let csv = "uri,rank\na,1\nb\nc,3,extra\nd,4\n";
        assert_eq!(db.load_csv(Dataset::Chart, csv).unwrap(), 2);
    }
}
