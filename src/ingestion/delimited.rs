//! Delimited-text (CSV) source reader.

use std::path::Path;

use crate::error::IngestResult;
use crate::types::{CellValue, RawRecord};

/// Read a headered CSV file into raw records.
///
/// Rules:
///
/// - The first row is the header; data cells are kept as text.
/// - No schema is enforced here; column resolution happens per row, later.
pub fn read_delimited_records(path: impl AsRef<Path>) -> IngestResult<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_from_reader(&mut rdr)
}

/// Read raw records from an existing CSV reader.
pub fn read_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestResult<Vec<RawRecord>> {
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let mut record = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            let raw = row.get(idx).unwrap_or("");
            let value = if raw.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(raw.to_string())
            };
            record.push(header, value);
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::read_from_reader;
    use crate::types::CellValue;

    #[test]
    fn reads_headered_rows_in_order() {
        let input = "Item Name,Qty,Rate\nSteel Pipe,10,500\nDoor,0,100\n";
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());

        let records = read_from_reader(&mut rdr).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("Item Name"),
            Some(&CellValue::Text("Steel Pipe".to_string()))
        );
        assert_eq!(records[1].get("Qty"), Some(&CellValue::Text("0".to_string())));
    }

    #[test]
    fn empty_cells_become_null() {
        let input = "Item Name,Qty\n,5\n";
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());

        let records = read_from_reader(&mut rdr).unwrap();
        assert_eq!(records[0].get("Item Name"), Some(&CellValue::Null));
    }

    #[test]
    fn short_rows_pad_with_null() {
        let input = "Item Name,Qty,Rate\nDoor,2\n";
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input.as_bytes());

        let records = read_from_reader(&mut rdr).unwrap();
        assert_eq!(records[0].get("Rate"), Some(&CellValue::Null));
    }
}
