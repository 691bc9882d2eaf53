//! Best-effort table recovery from unstructured PDF text.
//!
//! The PDF path has no machine-readable structure: text extraction yields a
//! stream of lines with no delimiters and no cell boundaries. Everything in
//! this module is heuristic pattern matching aimed at a useful approximation,
//! not a guarantee; callers should treat recovered rows as fuzzy.
//!
//! The recovery loop:
//!
//! 1. Scan lines until one matches a known header signature.
//! 2. Accumulate subsequent lines into a "current item" buffer.
//! 3. Close the item when the buffer already holds enough data (at least one
//!    text-like field, one numeric field, and five fields total) *and* the next
//!    line looks like the start of a new material name.
//! 4. Classify each buffered field as a unit label, an inventory-type code, a
//!    condition keyword, a number, or free text; rebuild the item from those.
//!
//! Numeric role assignment is the shakiest rule of all: the smallest whole
//! number under 1000 is assumed to be the quantity (falling back to the second
//! smallest, then to a quantity of 1), and the extremes of the remaining
//! numbers become purchase price and MRP. This mirrors observed seller PDFs;
//! it is not validated business logic.

use std::path::Path;

use crate::error::IngestResult;
use crate::normalize::category_for_type_code;
use crate::types::{CellValue, RawRecord};

/// Header words that mark the start of the tabular region.
const HEADER_NAME_HINTS: &[&str] = &["material", "item", "product", "description"];
const HEADER_VALUE_HINTS: &[&str] = &["qty", "quantity", "price", "rate", "mrp", "unit"];

/// Material nouns used to spot the first line of a new item.
const MATERIAL_KEYWORDS: &[&str] = &[
    "door", "tile", "window", "handle", "lock", "hinge", "pipe", "tap", "faucet", "basin",
    "toilet", "marble", "granite", "light", "lamp", "switch", "wire", "cable", "paint",
    "plywood", "panel", "sheet", "frame", "glass", "steel", "wood", "cement", "sofa", "chair",
    "table", "wardrobe",
];

const UNIT_LABELS: &[&str] = &[
    "pcs", "nos", "no", "kg", "kgs", "sqft", "sq.ft", "sft", "box", "boxes", "set", "sets",
    "ltr", "litre", "mtr", "rft", "pair", "pairs", "unit", "units", "bag", "bags", "roll",
    "rolls",
];

const CONDITION_KEYWORDS: &[&str] = &[
    "new", "used", "good", "fair", "excellent", "refurbished", "old",
];

/// Extract text from a PDF and recover raw records from it.
pub fn read_pdf_records(path: impl AsRef<Path>) -> IngestResult<Vec<RawRecord>> {
    let text = pdf_extract::extract_text(path.as_ref())?;
    Ok(extract_table_from_text(&text))
}

/// Recover raw records from freeform line-based text.
///
/// Produces the same record shape as the delimited and spreadsheet readers:
/// canonical header names (`Material`, `Qty`, `Price`, ...) so the same row
/// processing applies downstream.
pub fn extract_table_from_text(text: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut in_table = false;
    let mut buffer: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !in_table {
            in_table = is_header_line(line);
            continue;
        }
        if has_enough_data(&buffer) && looks_like_material_start(line) {
            if let Some(record) = classify_item_fields(&buffer) {
                records.push(record);
            }
            buffer.clear();
        }
        buffer.push(line.to_string());
    }

    if let Some(record) = classify_item_fields(&buffer) {
        records.push(record);
    }
    records
}

/// A line reads as a table header when it names the material column and at
/// least one value column.
pub fn is_header_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    HEADER_NAME_HINTS.iter().any(|h| lower.contains(h))
        && HEADER_VALUE_HINTS.iter().any(|h| lower.contains(h))
}

/// Whether the buffer already holds enough to stand as one item.
pub fn has_enough_data(buffer: &[String]) -> bool {
    buffer.len() >= 5
        && buffer.iter().any(|f| is_text_field(f))
        && buffer.iter().any(|f| numeric_value(f).is_some())
}

/// Whether a line plausibly starts a new material: either it contains a known
/// material noun, or it is a reasonably long, mostly-alphabetic plain line.
pub fn looks_like_material_start(line: &str) -> bool {
    let lower = line.to_lowercase();
    if MATERIAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
    line.len() >= 8 && alpha * 2 >= line.len() && numeric_value(line).is_none()
}

/// Parse a field as a plain number after stripping currency noise.
fn numeric_value(field: &str) -> Option<f64> {
    let cleaned: String = field
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | '€' | '£' | ','))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_text_field(field: &str) -> bool {
    numeric_value(field).is_none() && field.chars().any(|c| c.is_alphabetic())
}

fn is_plausible_quantity(n: f64) -> bool {
    n > 0.0 && n < 1000.0 && n.fract() == 0.0
}

/// Split sorted numbers into (quantity, remaining prices).
///
/// The smallest plausible count is taken as quantity; if neither of the two
/// smallest qualifies, quantity defaults to 1 and every number is a price.
fn assign_quantity(sorted: &[f64]) -> (f64, Vec<f64>) {
    for idx in 0..sorted.len().min(2) {
        if is_plausible_quantity(sorted[idx]) {
            let mut rest = sorted.to_vec();
            rest.remove(idx);
            return (sorted[idx], rest);
        }
    }
    (1.0, sorted.to_vec())
}

/// (purchase, today, mrp) from the sorted remaining numbers: extremes become
/// purchase and MRP, the middle (or only) value is the current price.
fn assign_prices(sorted: &[f64]) -> (f64, f64, f64) {
    match sorted {
        [] => (0.0, 0.0, 0.0),
        [v] => (*v, *v, *v),
        [a, b] => (*a, *b, *b),
        _ => {
            let min = sorted[0];
            let max = sorted[sorted.len() - 1];
            let mid = sorted[sorted.len() / 2];
            (min, mid, max)
        }
    }
}

/// Rebuild one item from a buffer of classified fields.
///
/// Returns `None` (discarding the buffer) when no material name or no price
/// could be recovered.
pub fn classify_item_fields(buffer: &[String]) -> Option<RawRecord> {
    if buffer.is_empty() {
        return None;
    }

    let mut unit: Option<String> = None;
    let mut type_code: Option<String> = None;
    let mut condition: Option<String> = None;
    let mut numbers: Vec<f64> = Vec::new();
    let mut texts: Vec<&str> = Vec::new();

    for field in buffer {
        let field = field.trim();
        let lower = field.to_lowercase();
        if unit.is_none() && UNIT_LABELS.contains(&lower.as_str()) {
            unit = Some(lower);
            continue;
        }
        if type_code.is_none() && category_for_type_code(field).is_some() {
            type_code = Some(field.to_uppercase());
            continue;
        }
        if condition.is_none() && CONDITION_KEYWORDS.contains(&lower.as_str()) {
            condition = Some(field.to_string());
            continue;
        }
        if let Some(n) = numeric_value(field) {
            numbers.push(n);
            continue;
        }
        if !field.is_empty() {
            texts.push(field);
        }
    }

    // Material is the longest free-text field; a remaining short alphabetic
    // field becomes the brand.
    let material = texts
        .iter()
        .max_by_key(|t| t.len())
        .map(|t| t.to_string())?;
    let brand = texts
        .iter()
        .filter(|t| **t != material)
        .find(|t| t.len() <= 12 && t.chars().all(|c| c.is_alphabetic() || c == ' '))
        .map(|t| t.to_string());

    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let (quantity, prices) = assign_quantity(&numbers);
    if prices.is_empty() {
        return None;
    }
    let (purchase, today, mrp) = assign_prices(&prices);

    let mut record = RawRecord::new();
    record.push("Material", CellValue::Text(material));
    record.push("Qty", CellValue::Number(quantity));
    if let Some(unit) = unit {
        record.push("Unit", CellValue::Text(unit));
    }
    if let Some(brand) = brand {
        record.push("Brand", CellValue::Text(brand));
    }
    if let Some(condition) = condition {
        record.push("Condition", CellValue::Text(condition));
    }
    if let Some(code) = type_code {
        record.push("Type", CellValue::Text(code));
    }
    record.push("Price", CellValue::Number(today));
    record.push("MRP", CellValue::Number(mrp));
    record.push("Purchase Price", CellValue::Number(purchase));
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn buffer(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn header_signature_needs_name_and_value_columns() {
        assert!(is_header_line("Material  Qty  Rate"));
        assert!(is_header_line("Item Description | Quantity | MRP"));
        assert!(!is_header_line("Material list"));
        assert!(!is_header_line("Qty Rate MRP"));
    }

    #[test]
    fn enough_data_needs_five_fields_text_and_number() {
        assert!(!has_enough_data(&buffer(&["Teak Door", "450", "500"])));
        assert!(!has_enough_data(&buffer(&["a", "b", "c", "d", "e"])));
        assert!(has_enough_data(&buffer(&[
            "Teak Door", "4", "pcs", "450", "500"
        ])));
    }

    #[test]
    fn material_start_by_keyword_or_plain_text() {
        assert!(looks_like_material_start("Teak Door"));
        assert!(looks_like_material_start("Decorative ceiling piece"));
        assert!(!looks_like_material_start("450"));
        assert!(!looks_like_material_start("ab"));
    }

    #[test]
    fn classifier_assigns_numeric_roles() {
        // 4 is the quantity; 400/500/600 become purchase/today/mrp.
        let record =
            classify_item_fields(&buffer(&["Teak Door", "4", "pcs", "400", "500", "600"]))
                .unwrap();

        assert_eq!(
            record.get("Material"),
            Some(&CellValue::Text("Teak Door".to_string()))
        );
        assert_eq!(record.get("Qty"), Some(&CellValue::Number(4.0)));
        assert_eq!(record.get("Purchase Price"), Some(&CellValue::Number(400.0)));
        assert_eq!(record.get("Price"), Some(&CellValue::Number(500.0)));
        assert_eq!(record.get("MRP"), Some(&CellValue::Number(600.0)));
        assert_eq!(record.get("Unit"), Some(&CellValue::Text("pcs".to_string())));
    }

    #[test]
    fn classifier_falls_back_to_quantity_one() {
        // Both numbers are >= 1000, so neither can be the quantity.
        let record = classify_item_fields(&buffer(&["Marble Slab", "1500", "2000"])).unwrap();
        assert_eq!(record.get("Qty"), Some(&CellValue::Number(1.0)));
        assert_eq!(record.get("Purchase Price"), Some(&CellValue::Number(1500.0)));
        assert_eq!(record.get("MRP"), Some(&CellValue::Number(2000.0)));
    }

    #[test]
    fn classifier_tries_second_smallest_quantity() {
        // 2.5 is not a whole count; 10 is.
        let record = classify_item_fields(&buffer(&["Wall Tile", "2.5", "10", "800"])).unwrap();
        assert_eq!(record.get("Qty"), Some(&CellValue::Number(10.0)));
    }

    #[test]
    fn classifier_picks_brand_and_condition() {
        let record = classify_item_fields(&buffer(&[
            "Brass door handle set",
            "Godrej",
            "used",
            "12",
            "250",
            "300",
        ]))
        .unwrap();

        assert_eq!(
            record.get("Material"),
            Some(&CellValue::Text("Brass door handle set".to_string()))
        );
        assert_eq!(
            record.get("Brand"),
            Some(&CellValue::Text("Godrej".to_string()))
        );
        assert_eq!(
            record.get("Condition"),
            Some(&CellValue::Text("used".to_string()))
        );
    }

    #[test]
    fn buffers_without_material_or_price_are_discarded() {
        assert!(classify_item_fields(&buffer(&["450", "500"])).is_none());
        assert!(classify_item_fields(&buffer(&["Teak Door"])).is_none());
        assert!(classify_item_fields(&[]).is_none());
    }

    #[test]
    fn table_extraction_splits_items_on_material_boundaries() {
        let text = "\
Acme Demolition Pvt Ltd
Salvage inventory list

Material  Qty  Unit  Purchase  Price  MRP
Teak Door
4
pcs
400
500
600
Ceramic Wall Tile
12
box
300
450
600
";
        let records = extract_table_from_text(text);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("Material"),
            Some(&CellValue::Text("Teak Door".to_string()))
        );
        assert_eq!(records[1].get("Qty"), Some(&CellValue::Number(12.0)));
    }

    #[test]
    fn nothing_is_extracted_without_a_header() {
        let text = "Teak Door\n4\npcs\n400\n500\n600\n";
        assert!(extract_table_from_text(text).is_empty());
    }
}
