//! Unified inventory ingestion entrypoint.
//!
//! [`ingest_inventory`] dispatches by declared file type to the matching source
//! reader, runs row processing over every raw record, reconciles images with
//! rows, and assembles the final [`IngestionReport`]. One bad row never aborts
//! the batch; only a failed top-level read produces `success = false`.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{IngestError, IngestResult};
use crate::resolve::{LogicalField, resolve};
use crate::row::{RowOutcome, process_row};
use crate::storage::{ImageStore, InlineImageStore};
use crate::types::{DEFAULT_PROJECT, ImageRowMap, IngestionReport, RawRecord};

use super::archive::{self, BundleOptions};
use super::images;
use super::observability::{IngestContext, IngestObserver, IngestSeverity, IngestStats};
use super::{delimited, spreadsheet, text};

/// Supported source formats, keyed by the caller's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Header row + data rows, comma-separated.
    Delimited,
    /// First sheet of a workbook, optionally with embedded media.
    Spreadsheet,
    /// Freeform text requiring heuristic table recovery.
    TextExtract,
    /// Compressed bundle: one tabular member + optional images folder.
    Bundle,
}

impl SourceFormat {
    /// Parse a declared type string (case-insensitive).
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Delimited),
            "xlsx" | "xls" | "spreadsheet" => Some(Self::Spreadsheet),
            "pdf" => Some(Self::TextExtract),
            "zip" | "bundle" => Some(Self::Bundle),
            _ => None,
        }
    }
}

/// Options controlling an ingestion run.
///
/// Use [`Default`] for common cases: inline image storage, a 30s bundle
/// extraction limit, sequential row processing, no observer.
#[derive(Clone)]
pub struct IngestOptions {
    /// Where bundled images are persisted.
    pub image_store: Arc<dyn ImageStore>,
    /// Bundle extraction limits.
    pub bundle: BundleOptions,
    /// Process rows in parallel. Rows are independent, so this does not change
    /// observable results.
    pub parallel_rows: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestSeverity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("bundle", &self.bundle)
            .field("parallel_rows", &self.parallel_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            image_store: Arc::new(InlineImageStore),
            bundle: BundleOptions::default(),
            parallel_rows: false,
            observer: None,
            alert_at_or_above: IngestSeverity::Critical,
        }
    }
}

/// Ingest one seller-supplied file into normalized inventory records.
///
/// - `declared_type` selects the reader (`csv`, `xlsx`, `pdf`, `zip`, ...);
///   an unknown type is a hard failure, not a partial result.
/// - `project_id` defaults to `"default"` when `None`.
///
/// The returned report always carries the full row accounting; `success` is
/// `false` only for top-level failures (unreadable file, unsupported type,
/// unusable archive), in which case `errors` holds one descriptive message.
///
/// # Examples
///
/// ```no_run
/// use inventory_ingest::ingestion::{IngestOptions, ingest_inventory};
///
/// let report = ingest_inventory("inventory.csv", "csv", "seller-42", None, &IngestOptions::default());
/// println!(
///     "imported {} of {} rows ({} failed)",
///     report.successful_rows, report.total_rows, report.failed_rows
/// );
/// for error in &report.errors {
///     eprintln!("{error}");
/// }
/// ```
pub fn ingest_inventory(
    path: impl AsRef<Path>,
    declared_type: &str,
    owner_id: &str,
    project_id: Option<&str>,
    options: &IngestOptions,
) -> IngestionReport {
    let path = path.as_ref();
    let format = SourceFormat::from_declared(declared_type);
    let ctx = IngestContext {
        path: path.to_path_buf(),
        format,
    };

    match run(path, declared_type, format, owner_id, project_id, options, &ctx) {
        Ok(report) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(
                    &ctx,
                    IngestStats {
                        total_rows: report.total_rows,
                        successful_rows: report.successful_rows,
                        failed_rows: report.failed_rows,
                    },
                );
            }
            report
        }
        Err(err) => {
            if let Some(obs) = options.observer.as_ref() {
                let severity = severity_for_error(&err);
                obs.on_failure(&ctx, severity, &err);
                if severity >= options.alert_at_or_above {
                    obs.on_alert(&ctx, severity, &err);
                }
            }
            IngestionReport::failure(err.to_string())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    path: &Path,
    declared_type: &str,
    format: Option<SourceFormat>,
    owner_id: &str,
    project_id: Option<&str>,
    options: &IngestOptions,
    ctx: &IngestContext,
) -> IngestResult<IngestionReport> {
    let format = format.ok_or_else(|| IngestError::UnsupportedType {
        declared: declared_type.to_string(),
    })?;

    let mut warnings: Vec<String> = Vec::new();
    let (records, image_map) = match format {
        SourceFormat::Delimited => (
            delimited::read_delimited_records(path)?,
            ImageRowMap::new(),
        ),
        SourceFormat::Spreadsheet => {
            let records = spreadsheet::read_spreadsheet_records(path)?;
            // Image failures degrade the result, they never fail it.
            let map = match images::extract_embedded_images(path) {
                Ok(embedded) => map_embedded_images(&embedded, &records),
                Err(err) => {
                    warnings.push(format!("embedded image extraction failed: {err}"));
                    ImageRowMap::new()
                }
            };
            (records, map)
        }
        SourceFormat::TextExtract => (text::read_pdf_records(path)?, ImageRowMap::new()),
        SourceFormat::Bundle => {
            let contents =
                archive::ingest_bundle(path, options.image_store.as_ref(), &options.bundle)?;
            warnings.extend(contents.warnings);
            (contents.records, contents.image_map)
        }
    };

    if let Some(obs) = options.observer.as_ref() {
        for warning in &warnings {
            obs.on_warning(ctx, warning);
        }
    }

    Ok(process_records(
        &records,
        &image_map,
        owner_id,
        project_id.unwrap_or(DEFAULT_PROJECT),
        options.parallel_rows,
    ))
}

/// Positional mapping first; when no image carries a usable sequence number,
/// fall back to matching image filenames against material names.
fn map_embedded_images(
    embedded: &[crate::types::ExtractedImage],
    records: &[RawRecord],
) -> ImageRowMap {
    let map = images::map_images_to_rows(embedded, records.len());
    if !map.is_empty() || embedded.is_empty() {
        return map;
    }
    let materials: Vec<(usize, String)> = records
        .iter()
        .enumerate()
        .filter_map(|(idx0, record)| {
            resolve(record, LogicalField::Material).map(|m| (idx0 + 1, m))
        })
        .collect();
    images::map_images_by_material_name(embedded, &materials)
}

/// Run row processing over every raw record, in original order, and fold the
/// per-row outcomes into the report.
fn process_records(
    records: &[RawRecord],
    image_map: &ImageRowMap,
    owner_id: &str,
    project_id: &str,
    parallel: bool,
) -> IngestionReport {
    let outcomes: Vec<RowOutcome> = if parallel {
        records
            .par_iter()
            .map(|record| process_row(record, owner_id, project_id))
            .collect()
    } else {
        records
            .iter()
            .map(|record| process_row(record, owner_id, project_id))
            .collect()
    };

    let mut report = IngestionReport::empty(records.len());
    for (idx0, outcome) in outcomes.into_iter().enumerate() {
        let row_index = idx0 + 1;
        match outcome {
            RowOutcome::Record(mut record) => {
                // Mapped images win over whatever the row itself carried.
                if let Some(reference) = image_map.get(&row_index) {
                    record.photo = reference.clone();
                }
                report.successful_rows += 1;
                report.records.push(*record);
            }
            RowOutcome::MissingMaterial => {
                report.failed_rows += 1;
                report
                    .errors
                    .push(format!("Row {row_index}: Material name is required"));
            }
            // Zero-stock rows are routine for sellers; count them but keep
            // the error list clean.
            RowOutcome::NoQuantity => {
                report.failed_rows += 1;
            }
        }
    }
    report
}

fn severity_for_error(e: &IngestError) -> IngestSeverity {
    match e {
        IngestError::Io(_) => IngestSeverity::Critical,
        IngestError::Csv(err) => match err.kind() {
            csv::ErrorKind::Io(_) => IngestSeverity::Critical,
            _ => IngestSeverity::Error,
        },
        IngestError::Archive(zip::result::ZipError::Io(_)) => IngestSeverity::Critical,
        IngestError::Spreadsheet(_)
        | IngestError::Archive(_)
        | IngestError::PdfText(_)
        | IngestError::UnsupportedType { .. }
        | IngestError::NoDataFile
        | IngestError::EmptyArchive
        | IngestError::ExtractionTimeout { .. } => IngestSeverity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::{SourceFormat, process_records};
    use crate::types::{CellValue, ImageRowMap, RawRecord};

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| {
                    let value = if v.trim().is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::Text((*v).to_string())
                    };
                    ((*k).to_string(), value)
                })
                .collect(),
        )
    }

    #[test]
    fn declared_types_dispatch() {
        assert_eq!(SourceFormat::from_declared("CSV"), Some(SourceFormat::Delimited));
        assert_eq!(
            SourceFormat::from_declared("xlsx"),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(SourceFormat::from_declared("pdf"), Some(SourceFormat::TextExtract));
        assert_eq!(SourceFormat::from_declared("bundle"), Some(SourceFormat::Bundle));
        assert_eq!(SourceFormat::from_declared("docx"), None);
    }

    #[test]
    fn parallel_and_sequential_row_processing_agree() {
        let records: Vec<RawRecord> = (0..50)
            .map(|i| {
                record(&[
                    ("Material", &format!("Item {i}")),
                    ("Qty", "2"),
                    ("Price", "10"),
                ])
            })
            .collect();
        let map = ImageRowMap::new();

        let sequential = process_records(&records, &map, "o", "p", false);
        let parallel = process_records(&records, &map, "o", "p", true);

        assert_eq!(sequential.successful_rows, parallel.successful_rows);
        assert_eq!(sequential.failed_rows, parallel.failed_rows);
        assert_eq!(
            sequential
                .records
                .iter()
                .map(|r| r.material.clone())
                .collect::<Vec<_>>(),
            parallel
                .records
                .iter()
                .map(|r| r.material.clone())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn unnumbered_embedded_images_fall_back_to_name_matching() {
        use crate::types::ExtractedImage;

        let records = vec![
            record(&[("Material", "Teak Door"), ("Qty", "1"), ("Price", "10")]),
            record(&[("Material", "Wall Tile"), ("Qty", "1"), ("Price", "10")]),
        ];
        let embedded = vec![ExtractedImage {
            original_name: "teak-door.jpg".to_string(),
            reference: "data:image/jpeg;base64,BBBB".to_string(),
            sequence: None,
        }];

        let map = super::map_embedded_images(&embedded, &records);
        assert_eq!(map.get(&1).map(String::as_str), Some("data:image/jpeg;base64,BBBB"));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn mapped_image_overrides_row_photo() {
        let records = vec![record(&[
            ("Material", "Teak Door"),
            ("Qty", "1"),
            ("Price", "100"),
            ("Photo", "https://cdn.example.com/old.jpg"),
        ])];
        let mut map = ImageRowMap::new();
        map.insert(1, "data:image/png;base64,AAAA".to_string());

        let report = process_records(&records, &map, "o", "p", false);
        assert_eq!(report.records[0].photo, "data:image/png;base64,AAAA");
    }

    #[test]
    fn error_list_stays_clean_for_zero_quantity_rows() {
        let records = vec![
            record(&[("Material", "Steel Pipe"), ("Qty", "10"), ("Rate", "500")]),
            record(&[("Material", ""), ("Qty", "5"), ("Rate", "300")]),
            record(&[("Material", "Door"), ("Qty", "0"), ("Rate", "100")]),
        ];

        let report = process_records(&records, &ImageRowMap::new(), "o", "p", false);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.successful_rows, 1);
        assert_eq!(report.failed_rows, 2);
        assert_eq!(report.errors, vec!["Row 2: Material name is required"]);
    }
}
