//! Core library for envelope-density report ingestion.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Regex-rule-driven field extraction into a structured report record
//! - Measurement-cycle table scanning
//! - Node mapping of the record into an OPC UA write-set
//! - CSV mirror export

pub mod error;
pub mod export;
pub mod models;
pub mod pdf;
pub mod report;

pub use error::{DenlinkError, ExportError, ExtractionError, PdfError, Result};
pub use export::csv::CsvReportWriter;
pub use export::mapping::{NodeMapper, WriteItem, WriteValue};
pub use models::config::{DenlinkConfig, ExportSettings, FieldTag, NodeMappings, OpcSettings};
pub use models::report::{
    InstrumentInfo, Measured, MeasurementCycle, MeasurementParameters, MeasurementResults,
    ReportInfo, ReportRecord, SampleInfo, NOT_FOUND,
};
pub use pdf::PdfExtractor;
pub use report::{ReportParser, parse_cycles};
