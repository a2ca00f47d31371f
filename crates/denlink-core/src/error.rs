//! Error types for the denlink-core library.

use thiserror::Error;

/// Main error type for the denlink library.
#[derive(Error, Debug)]
pub enum DenlinkError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Report field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// CSV export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The input file is missing or is not a PDF.
    #[error("not a readable PDF file: {0}")]
    InvalidFile(String),
}

/// Errors related to report field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// No report data could be extracted.
    #[error("no report data found")]
    NoData,
}

/// Errors related to CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV serialization failure.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Output file/directory failure.
    #[error("output I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the denlink library.
pub type Result<T> = std::result::Result<T, DenlinkError>;
