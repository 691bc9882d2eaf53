//! Core data model types for inventory ingestion.
//!
//! Source readers produce [`RawRecord`]s (ordered column-name/value pairs with no
//! fixed schema). Row processing turns each raw record into an [`InventoryRecord`],
//! and the pipeline reports everything back through an [`IngestionReport`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project id used when the caller does not supply one.
pub const DEFAULT_PROJECT: &str = "default";

/// Unit label used when a row carries none.
pub const DEFAULT_UNIT: &str = "pcs";

/// Listing type assigned to every ingested record.
pub const DEFAULT_LISTING_TYPE: &str = "resale";

/// Price recorded when no usable price exists anywhere on a row.
///
/// Paired with `inventory_value = 0` so downstream consumers can detect
/// "no real price" without a separate flag.
pub const SENTINEL_PRICE: f64 = 1.0;

/// A single raw cell value as produced by a source reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing/empty cell.
    Null,
    /// Numeric cell (spreadsheet numbers, reconstructed PDF values).
    Number(f64),
    /// Text cell.
    Text(String),
}

impl CellValue {
    /// Render the cell as text, or `None` for [`CellValue::Null`].
    ///
    /// Whole numbers render without a trailing `.0` so that `Number(10.0)` and
    /// `Text("10")` resolve identically downstream.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
    }
}

/// One raw tabular row: an ordered mapping from raw column names to cell values.
///
/// Raw records have no identity beyond their position in the source sequence;
/// the 1-based row index is assigned by the pipeline and used for image
/// correlation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    columns: Vec<(String, CellValue)>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from ordered column pairs.
    pub fn from_pairs(pairs: Vec<(String, CellValue)>) -> Self {
        Self { columns: pairs }
    }

    /// Append a column.
    pub fn push(&mut self, key: impl Into<String>, value: CellValue) {
        self.columns.push((key.into(), value));
    }

    /// Exact (case-sensitive) key lookup; first match wins.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate columns in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A normalized, validated inventory record ready for bulk insertion.
///
/// Invariant: `material` is non-empty and `quantity > 0`; every other field has
/// a safe default. Created once by row processing and immutable afterward
/// (ownership passes to the persistence layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: String,
    pub owner_id: String,
    pub project_id: String,
    pub material: String,
    pub brand: String,
    /// Always a member of the fixed category taxonomy.
    pub category: String,
    pub condition: String,
    pub quantity: i64,
    pub unit: String,
    pub price_today: f64,
    pub mrp: f64,
    pub price_purchased: f64,
    /// `price_today * quantity` when a real price was found, otherwise `0`.
    pub inventory_value: f64,
    pub inventory_type: String,
    pub listing_type: String,
    pub specs: String,
    /// URL, stored path, or inline data URL; empty string means "no image".
    pub photo: String,
    pub specs_photo: String,
    pub dimensions: String,
    pub weight: String,
    pub created_at: DateTime<Utc>,
}

/// An image pulled from a spreadsheet's embedded media or a bundle folder.
///
/// `reference` is either an inline `data:` URL or a stored path, depending on
/// the active image store. Ephemeral: only the final photo reference on the
/// [`InventoryRecord`] survives ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedImage {
    /// Original filename inside the container/folder.
    pub original_name: String,
    /// Inline data URL or stored path.
    pub reference: String,
    /// Sequence number inferred from trailing digits in the filename.
    pub sequence: Option<usize>,
}

/// Mapping from 1-based row index to a photo reference, built once per run.
pub type ImageRowMap = HashMap<usize, String>;

/// The result of one ingestion run; the sole object crossing the
/// pipeline/caller boundary.
///
/// `success` is `false` only when the top-level read failed (unreadable file,
/// unsupported type, unusable archive). A run where every row was rejected
/// still reports `success = true` with `successful_rows = 0`, so callers can
/// distinguish a schema mismatch from a hard failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    pub success: bool,
    pub records: Vec<InventoryRecord>,
    pub total_rows: usize,
    pub successful_rows: usize,
    pub failed_rows: usize,
    /// Human-readable per-row error strings, in row order.
    pub errors: Vec<String>,
}

impl IngestionReport {
    /// An empty, successful report for `total` raw rows.
    pub fn empty(total: usize) -> Self {
        Self {
            success: true,
            records: Vec::new(),
            total_rows: total,
            successful_rows: 0,
            failed_rows: 0,
            errors: Vec::new(),
        }
    }

    /// A hard top-level failure with a single descriptive message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            records: Vec::new(),
            total_rows: 0,
            successful_rows: 0,
            failed_rows: 0,
            errors: vec![message.into()],
        }
    }
}
