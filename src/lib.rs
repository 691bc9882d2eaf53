//! `inventory-ingest` turns arbitrary seller-supplied inventory files into
//! clean, validated records ready for bulk insertion.
//!
//! The primary entrypoint is [`ingestion::ingest_inventory`], which dispatches
//! on the caller's declared file type and always returns a
//! [`types::IngestionReport`]; one bad row never aborts a batch.
//!
//! ## What you can ingest
//!
//! **File types (selected by the declared type string):**
//!
//! - **Delimited text**: `csv`: header row + data rows
//! - **Spreadsheets**: `xlsx`, `xls`, `spreadsheet`: first sheet, with
//!   embedded images mapped to rows by their sequence numbers
//! - **PDF**: `pdf`: heuristic, best-effort table recovery from extracted
//!   text (see [`ingestion::text`])
//! - **Bundles**: `zip`, `bundle`: one spreadsheet-or-CSV member plus an
//!   optional images folder, reconciled by filename
//!
//! Uploaded files have no fixed schema: headers are matched against a synonym
//! table ([`resolve`]), and cell values are normalized ([`normalize`]) into a
//! fixed category taxonomy and currency-tolerant numbers.
//!
//! ## Quick example
//!
//! ```no_run
//! use inventory_ingest::ingestion::{IngestOptions, ingest_inventory};
//!
//! let report = ingest_inventory("upload.xlsx", "xlsx", "seller-42", Some("site-7"), &IngestOptions::default());
//! if report.success {
//!     println!(
//!         "imported {} of {} rows ({} failed)",
//!         report.successful_rows, report.total_rows, report.failed_rows
//!     );
//!     for error in &report.errors {
//!         eprintln!("{error}");
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified entrypoint and format-specific source readers
//! - [`types`]: raw records, normalized records, and the ingestion report
//! - [`resolve`]: logical-field resolution over arbitrary raw headers
//! - [`normalize`]: numeric parsing and the category taxonomy
//! - [`row`]: per-row record assembly
//! - [`storage`]: the image persistence port
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod ingestion;
pub mod normalize;
pub mod resolve;
pub mod row;
pub mod storage;
pub mod types;

pub use error::{IngestError, IngestResult};
