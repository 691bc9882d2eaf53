//! Spreadsheet source reader.
//!
//! Behavior:
//! - Reads the first sheet in the workbook
//! - Detects the first non-empty row as the header row
//! - Keeps numeric cells numeric and empty cells null; no schema is enforced

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::IngestResult;
use crate::types::{CellValue, RawRecord};

/// Read the first sheet of a workbook (`.xlsx`, `.xls`, `.ods`, ...) into raw
/// records.
///
/// A workbook with no sheets yields zero records rather than an error; the
/// pipeline reports that as "no usable rows", not a hard failure.
pub fn read_spreadsheet_records(path: impl AsRef<Path>) -> IngestResult<Vec<RawRecord>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets = workbook.sheet_names().to_vec();
    let Some(first) = sheets.first() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(first)?;
    Ok(records_from_range(&range))
}

fn records_from_range(range: &calamine::Range<Data>) -> Vec<RawRecord> {
    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for row in range.rows() {
        let Some(headers) = header.as_ref() else {
            if row.iter().any(|c| !matches!(c, Data::Empty)) {
                header = Some(row.iter().map(cell_to_header_string).collect());
            }
            continue;
        };

        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        let mut record = RawRecord::new();
        for (idx, name) in headers.iter().enumerate() {
            if name.trim().is_empty() {
                continue;
            }
            let cell = row.get(idx).unwrap_or(&Data::Empty);
            record.push(name.clone(), convert_cell(cell));
        }
        records.push(record);
    }

    records
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Formula error cells carry no usable value.
        Data::Error(_) => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::records_from_range;
    use crate::types::CellValue;
    use calamine::{Data, Range};

    fn range_from(rows: &[&[Data]]) -> Range<Data> {
        let mut range = Range::new(
            (0, 0),
            (
                rows.len().saturating_sub(1) as u32,
                rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32 - 1,
            ),
        );
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    #[test]
    fn first_non_empty_row_becomes_the_header() {
        let range = range_from(&[
            &[Data::Empty, Data::Empty],
            &[Data::String("Material".into()), Data::String("Qty".into())],
            &[Data::String("Door".into()), Data::Float(4.0)],
        ]);

        let records = records_from_range(&range);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("Material"),
            Some(&CellValue::Text("Door".to_string()))
        );
        assert_eq!(records[0].get("Qty"), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn blank_data_rows_are_skipped() {
        let range = range_from(&[
            &[Data::String("Material".into())],
            &[Data::Empty],
            &[Data::String("Tile".into())],
        ]);

        let records = records_from_range(&range);
        assert_eq!(records.len(), 1);
    }
}
