//! Ingestion entrypoints and per-format source readers.
//!
//! Most callers should use [`ingest_inventory`] (from [`unified`]) which:
//!
//! - dispatches by the caller's declared file type
//! - runs row processing and image reconciliation
//! - optionally reports outcomes to an [`IngestObserver`]
//!
//! Format-specific readers are also available under:
//! - [`delimited`]
//! - [`spreadsheet`]
//! - [`text`]
//! - [`archive`]

pub mod archive;
pub mod delimited;
pub mod images;
pub mod observability;
pub mod spreadsheet;
pub mod text;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestContext, IngestObserver, IngestSeverity, IngestStats,
    StdErrObserver,
};
pub use unified::{IngestOptions, SourceFormat, ingest_inventory};
