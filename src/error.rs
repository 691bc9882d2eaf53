use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across the delimited, spreadsheet, PDF-text,
/// and bundle ingestion paths.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text parsing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet parsing error.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// ZIP container error (bundles and embedded spreadsheet media).
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// PDF text extraction error.
    #[error("pdf extraction error: {0}")]
    PdfText(#[from] pdf_extract::OutputError),

    /// The caller declared a file type the pipeline does not support.
    #[error("unsupported file type '{declared}' (expected csv, xlsx, pdf, or zip)")]
    UnsupportedType { declared: String },

    /// A bundle was opened but no tabular member was found inside it.
    #[error("archive contains no tabular data file (expected one .xlsx/.xls/.csv member)")]
    NoDataFile,

    /// A bundle was opened but it has no members at all.
    #[error("archive is empty")]
    EmptyArchive,

    /// Bundle extraction ran past its wall-clock limit.
    #[error("archive extraction exceeded the {limit_secs}s time limit")]
    ExtractionTimeout { limit_secs: u64 },
}
