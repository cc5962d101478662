//! CSV rendering of command results to stdout.

use serde::Serialize;
use std::io::Write;

/// Write `rows` as CSV with a header row.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `rows` as CSV to stdout.
pub fn print_csv<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    write_csv(stdout.lock(), rows)
}

#[cfg(test)]
mod tests {
    use super::write_csv;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        week: String,
        value: Option<f64>,
    }

    #[test]
    fn test_write_csv() {
        let rows = vec![
            Row {
                week: "2022-01".to_string(),
                value: Some(0.5),
            },
            Row {
                week: "2022-02".to_string(),
                value: None,
            },
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "week,value\n2022-01,0.5\n2022-02,\n"
        );
    }
}
