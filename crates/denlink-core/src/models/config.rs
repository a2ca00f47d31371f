//! Configuration structures for the extraction/export pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the denlink pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DenlinkConfig {
    /// OPC UA connection settings.
    pub opc: OpcSettings,

    /// Destination node-id table.
    pub nodes: NodeMappings,

    /// CSV export settings.
    pub export: ExportSettings,
}

/// OPC UA endpoint and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpcSettings {
    /// Server endpoint URL.
    pub endpoint_url: String,

    /// Client application name announced to the server.
    pub application_name: String,

    /// Session timeout in milliseconds.
    pub session_timeout_ms: u32,

    /// Operation timeout in milliseconds (bounds the diagnostic TCP probe).
    pub operation_timeout_ms: u32,

    /// Accept server certificates without a trust-store match.
    pub auto_accept_untrusted_certs: bool,

    /// Require a signed+encrypted endpoint instead of SecurityPolicy None.
    pub use_security: bool,

    /// Username for the session identity. Empty = anonymous.
    pub username: String,

    /// Password for the session identity.
    pub password: String,

    /// Client PKI directory (certificates and keys).
    pub pki_dir: PathBuf,
}

impl Default for OpcSettings {
    fn default() -> Self {
        Self {
            endpoint_url: "opc.tcp://localhost:49320".to_string(),
            application_name: "Denlink Report Uploader".to_string(),
            session_timeout_ms: 60_000,
            operation_timeout_ms: 15_000,
            auto_accept_untrusted_certs: true,
            use_security: false,
            username: String::new(),
            password: String::new(),
            pki_dir: PathBuf::from("pki"),
        }
    }
}

/// Closed set of scalar report fields that can be mapped to a node id.
///
/// The mapper iterates [`FieldTag::ALL`] in this declaration order, which is
/// also the CSV row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTag {
    ReportGenerated,
    SourceFile,
    ReportDate,
    ReportSerialNumber,
    ReportType,
    InstrumentName,
    InstrumentSerialNumber,
    InstrumentVersion,
    SampleRecord,
    SampleOperator,
    SampleSubmitter,
    StartedTime,
    CompletedTime,
    ReportTime,
    SampleMass,
    AbsoluteDensity,
    ChamberDiameter,
    PreparationCycles,
    MeasurementCycleCount,
    BlankData,
    ConsolidationForce,
    ConversionFactor,
    ZeroDepth,
    AverageEnvelopeVolume,
    AverageEnvelopeDensity,
    SpecificPoreVolume,
    Porosity,
    PercentSampleVolume,
    StandardDeviationVolume,
    StandardDeviationDensity,
}

impl FieldTag {
    /// All scalar fields in mapping/export order: report info → instrument →
    /// sample → parameters → results.
    pub const ALL: &'static [FieldTag] = &[
        FieldTag::ReportGenerated,
        FieldTag::SourceFile,
        FieldTag::ReportDate,
        FieldTag::ReportSerialNumber,
        FieldTag::ReportType,
        FieldTag::InstrumentName,
        FieldTag::InstrumentSerialNumber,
        FieldTag::InstrumentVersion,
        FieldTag::SampleRecord,
        FieldTag::SampleOperator,
        FieldTag::SampleSubmitter,
        FieldTag::StartedTime,
        FieldTag::CompletedTime,
        FieldTag::ReportTime,
        FieldTag::SampleMass,
        FieldTag::AbsoluteDensity,
        FieldTag::ChamberDiameter,
        FieldTag::PreparationCycles,
        FieldTag::MeasurementCycleCount,
        FieldTag::BlankData,
        FieldTag::ConsolidationForce,
        FieldTag::ConversionFactor,
        FieldTag::ZeroDepth,
        FieldTag::AverageEnvelopeVolume,
        FieldTag::AverageEnvelopeDensity,
        FieldTag::SpecificPoreVolume,
        FieldTag::Porosity,
        FieldTag::PercentSampleVolume,
        FieldTag::StandardDeviationVolume,
        FieldTag::StandardDeviationDensity,
    ];

    /// CSV category label for this field.
    pub fn category(self) -> &'static str {
        use FieldTag::*;
        match self {
            ReportGenerated | SourceFile | ReportDate | ReportSerialNumber | ReportType => {
                "Report Info"
            }
            InstrumentName | InstrumentSerialNumber | InstrumentVersion => "Instrument",
            SampleRecord | SampleOperator | SampleSubmitter | StartedTime | CompletedTime
            | ReportTime | SampleMass | AbsoluteDensity => "Sample",
            ChamberDiameter | PreparationCycles | MeasurementCycleCount | BlankData
            | ConsolidationForce | ConversionFactor | ZeroDepth => "Parameters",
            AverageEnvelopeVolume | AverageEnvelopeDensity | SpecificPoreVolume | Porosity
            | PercentSampleVolume | StandardDeviationVolume | StandardDeviationDensity => {
                "Results"
            }
        }
    }

    /// Human-readable field label, used for CSV rows and write-item
    /// descriptions.
    pub fn label(self) -> &'static str {
        use FieldTag::*;
        match self {
            ReportGenerated => "Generated",
            SourceFile => "Source File",
            ReportDate => "Report Date",
            ReportSerialNumber => "Serial Number",
            ReportType => "Report Type",
            InstrumentName => "Instrument",
            InstrumentSerialNumber => "Serial number",
            InstrumentVersion => "Version",
            SampleRecord => "Record",
            SampleOperator => "Operator",
            SampleSubmitter => "Submitter",
            StartedTime => "Started",
            CompletedTime => "Completed",
            ReportTime => "Report time",
            SampleMass => "Sample mass",
            AbsoluteDensity => "Absolute density",
            ChamberDiameter => "Chamber diameter",
            PreparationCycles => "Preparation cycles",
            MeasurementCycleCount => "Measurement cycles",
            BlankData => "Blank data",
            ConsolidationForce => "Consolidation force",
            ConversionFactor => "Conversion factor",
            ZeroDepth => "Zero depth",
            AverageEnvelopeVolume => "Average envelope volume",
            AverageEnvelopeDensity => "Average envelope density",
            SpecificPoreVolume => "Specific pore volume",
            Porosity => "Porosity",
            PercentSampleVolume => "Percent sample volume",
            StandardDeviationVolume => "Standard deviation (Volume)",
            StandardDeviationDensity => "Standard deviation (Density)",
        }
    }
}

/// Destination node ids, keyed by [`FieldTag`], plus the ten individually
/// configured cycle-row slots and the typed-array slot.
///
/// Node ids are opaque server-defined strings and pass through unmodified;
/// an empty string means "not mapped, skip this field".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMappings {
    pub report_generated: String,
    pub source_file: String,
    pub report_date: String,
    pub report_serial_number: String,
    pub report_type: String,
    pub instrument_name: String,
    pub instrument_serial_number: String,
    pub instrument_version: String,
    pub sample_record: String,
    pub sample_operator: String,
    pub sample_submitter: String,
    pub started_time: String,
    pub completed_time: String,
    pub report_time: String,
    pub sample_mass: String,
    pub absolute_density: String,
    pub chamber_diameter: String,
    pub preparation_cycles: String,
    pub measurement_cycles: String,
    pub blank_data: String,
    pub consolidation_force: String,
    pub conversion_factor: String,
    pub zero_depth: String,
    pub average_envelope_volume: String,
    pub average_envelope_density: String,
    pub specific_pore_volume: String,
    pub porosity: String,
    pub percent_sample_volume: String,
    pub standard_deviation_volume: String,
    pub standard_deviation_density: String,

    /// Per-row slots for the first ten measurement cycles.
    pub cycle_rows: [String; 10],

    /// Typed double-array slot carrying the first cycle.
    pub data_import_array: String,
}

impl Default for NodeMappings {
    fn default() -> Self {
        let node = |suffix: &str| format!("ns=2;s=pdf_extractor.{suffix}");
        Self {
            report_generated: node("ReportInfo.generated"),
            source_file: node("ReportInfo.source_file"),
            report_date: node("ReportInfo.report_date"),
            report_serial_number: node("ReportInfo.serial_number"),
            report_type: node("ReportInfo.report_type"),
            instrument_name: node("Instrument.instrument_name"),
            instrument_serial_number: node("Instrument.serial_number"),
            instrument_version: node("Instrument.version"),
            sample_record: node("Sample.record"),
            sample_operator: node("Sample.operator"),
            sample_submitter: node("Sample.submitter"),
            started_time: node("Data_import.started"),
            completed_time: node("Data_import.completed"),
            report_time: node("Sample.report_time"),
            sample_mass: node("Data_import.sample_mass"),
            absolute_density: node("Data_import.absolute_density"),
            chamber_diameter: node("Parameters.chamber_diameter"),
            preparation_cycles: node("Parameters.preparation_cycles"),
            measurement_cycles: node("Parameters.measurement_cycles"),
            blank_data: node("Parameters.blank_data"),
            consolidation_force: node("Parameters.consolidation_force"),
            conversion_factor: node("Parameters.conversion_factor"),
            zero_depth: node("Parameters.zero_depth"),
            average_envelope_volume: node("Results.average_envelope_volume"),
            average_envelope_density: node("Results.average_envelope_density"),
            specific_pore_volume: node("Results.specific_pore_volume"),
            porosity: node("Results.porosity"),
            percent_sample_volume: node("Results.percent_sample_volume"),
            standard_deviation_volume: node("Results.standard_deviation_volume"),
            standard_deviation_density: node("Results.standard_deviation_density"),
            cycle_rows: std::array::from_fn(|i| node(&format!("Data_import.cycle_row{}", i + 1))),
            data_import_array: node("Data_import.Data_import"),
        }
    }
}

impl NodeMappings {
    /// Node id configured for a scalar field. Empty string = unmapped.
    pub fn node_id(&self, tag: FieldTag) -> &str {
        use FieldTag::*;
        match tag {
            ReportGenerated => &self.report_generated,
            SourceFile => &self.source_file,
            ReportDate => &self.report_date,
            ReportSerialNumber => &self.report_serial_number,
            ReportType => &self.report_type,
            InstrumentName => &self.instrument_name,
            InstrumentSerialNumber => &self.instrument_serial_number,
            InstrumentVersion => &self.instrument_version,
            SampleRecord => &self.sample_record,
            SampleOperator => &self.sample_operator,
            SampleSubmitter => &self.sample_submitter,
            StartedTime => &self.started_time,
            CompletedTime => &self.completed_time,
            ReportTime => &self.report_time,
            SampleMass => &self.sample_mass,
            AbsoluteDensity => &self.absolute_density,
            ChamberDiameter => &self.chamber_diameter,
            PreparationCycles => &self.preparation_cycles,
            MeasurementCycleCount => &self.measurement_cycles,
            BlankData => &self.blank_data,
            ConsolidationForce => &self.consolidation_force,
            ConversionFactor => &self.conversion_factor,
            ZeroDepth => &self.zero_depth,
            AverageEnvelopeVolume => &self.average_envelope_volume,
            AverageEnvelopeDensity => &self.average_envelope_density,
            SpecificPoreVolume => &self.specific_pore_volume,
            Porosity => &self.porosity,
            PercentSampleVolume => &self.percent_sample_volume,
            StandardDeviationVolume => &self.standard_deviation_volume,
            StandardDeviationDensity => &self.standard_deviation_density,
        }
    }

    /// Node id for a 1-based cycle row number, if one is configured.
    pub fn cycle_row(&self, row: usize) -> Option<&str> {
        match row {
            1..=10 => {
                let id = self.cycle_rows[row - 1].as_str();
                (!id.is_empty()).then_some(id)
            }
            _ => None,
        }
    }
}

/// CSV output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory the CSV mirror is written into.
    pub output_dir: PathBuf,

    /// CSV file name.
    pub csv_file_name: String,

    /// Maximum number of individual cycle-row node writes.
    pub max_cycle_rows: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            csv_file_name: "ExtractedData.csv".to_string(),
            max_cycle_rows: 10,
        }
    }
}

impl DenlinkConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Load from `path` if it exists, otherwise persist and return defaults.
    pub fn load_or_init(path: &std::path::Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            config.save(path)?;
            Ok(config)
        }
    }
}
