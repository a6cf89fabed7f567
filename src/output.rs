use crate::error::Result;
use crate::types::Row;
use log::info;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Write a ragged grid of cells as CSV, one record per row.
pub fn write_sheet(path: impl AsRef<Path>, rows: &[Row]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    info!("wrote sheet {} ({} rows)", path.display(), rows.len());
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Render a grid of cells, padding short rows so every record has the same width.
pub fn render_sheet(rows: &[Row]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut builder = Builder::default();
    for row in rows {
        let mut record: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        record.resize(width, String::new());
        builder.push_record(record);
    }
    builder.build().with(Style::psql()).to_string()
}

pub fn preview_sheet(title: &str, rows: &[Row]) {
    println!("{}\n", title);
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_sheet(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, QuarterlyStat};

    #[test]
    fn sheet_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let rows: Vec<Row> = vec![
            vec![Cell::from("Title")],
            vec![Cell::from("Count:"), Cell::Int(3)],
        ];
        write_sheet(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Title\nCount:,3\n");
    }

    #[test]
    fn csv_rows_use_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarters.csv");
        let rows = vec![QuarterlyStat {
            quarter: "Q1".into(),
            tithes: 10.0,
            offerings: 2.5,
            total: 12.5,
        }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "quarter,tithes,offerings,total\nQ1,10.0,2.5,12.5\n");
    }

    #[test]
    fn rendered_sheet_pads_rows() {
        let rows: Vec<Row> = vec![
            vec![Cell::from("Key Metrics")],
            vec![Cell::from("Total:"), Cell::from("K10.00")],
        ];
        let rendered = render_sheet(&rows);
        assert!(rendered.contains("Key Metrics"));
        assert!(rendered.contains("K10.00"));
    }
}
