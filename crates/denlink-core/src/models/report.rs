//! Report data models for envelope-density measurement reports.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Canonical placeholder for fields the extractor could not locate.
///
/// Text fields never hold an empty string: downstream formatting relies on
/// every field carrying either a real value or this sentinel.
pub const NOT_FOUND: &str = "Not found";

fn not_found() -> String {
    NOT_FOUND.to_string()
}

/// A value carried in two representations: the unit-suffixed text as it
/// appeared in the report (authoritative) and the numeric value derived from
/// it. The numeric side is absent whenever derivation failed; it is never
/// populated independently of the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measured {
    /// Original text, e.g. `"12.3400 g"`. Sentinel [`NOT_FOUND`] when absent.
    pub text: String,
    /// Derived numeric value, e.g. `12.34`.
    pub value: Option<f64>,
}

impl Default for Measured {
    fn default() -> Self {
        Self {
            text: not_found(),
            value: None,
        }
    }
}

impl Measured {
    /// Whether extraction produced a real text value.
    pub fn is_found(&self) -> bool {
        !self.text.is_empty() && self.text != NOT_FOUND
    }

    /// Value to export: numeric-first, raw text as fallback, `None` when the
    /// field was never found.
    pub fn export_value(&self) -> Option<String> {
        if let Some(v) = self.value {
            return Some(v.to_string());
        }
        self.is_found().then(|| self.text.clone())
    }
}

/// Root aggregate produced by one extraction run. Created fresh per run,
/// fully populated in one pass, then handed immutably to the mapper and the
/// CSV writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report: ReportInfo,
    pub instrument: InstrumentInfo,
    pub sample: SampleInfo,
    pub parameters: MeasurementParameters,
    pub results: MeasurementResults,
    /// Measurement cycles in document order. The parser does not re-sort;
    /// list position need not equal the cycle number.
    pub cycles: Vec<MeasurementCycle>,
    /// Raw extracted text, retained for secondary parsing.
    pub full_text: String,
}

impl Default for ReportRecord {
    fn default() -> Self {
        Self {
            report: ReportInfo::default(),
            instrument: InstrumentInfo::default(),
            sample: SampleInfo::default(),
            parameters: MeasurementParameters::default(),
            results: MeasurementResults::default(),
            cycles: Vec::new(),
            full_text: String::new(),
        }
    }
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInfo {
    /// When this record was generated (extraction time, not report time).
    pub generated: DateTime<Local>,
    pub source_file: String,
    pub report_date: String,
    pub serial_number: String,
    pub report_type: String,
}

impl Default for ReportInfo {
    fn default() -> Self {
        Self {
            generated: Local::now(),
            source_file: String::new(),
            report_date: not_found(),
            serial_number: not_found(),
            report_type: not_found(),
        }
    }
}

/// Instrument identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub name: String,
    pub serial_number: String,
    pub version: String,
}

impl Default for InstrumentInfo {
    fn default() -> Self {
        Self {
            name: not_found(),
            serial_number: not_found(),
            version: not_found(),
        }
    }
}

/// Sample identification and run timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleInfo {
    pub record: String,
    pub operator: String,
    pub submitter: String,
    pub started: Option<NaiveDateTime>,
    pub completed: Option<NaiveDateTime>,
    pub report_time: Option<NaiveDateTime>,
    /// Sample mass in grams.
    pub sample_mass: Measured,
    /// Absolute density in g/cm³.
    pub absolute_density: Measured,
}

impl Default for SampleInfo {
    fn default() -> Self {
        Self {
            record: not_found(),
            operator: not_found(),
            submitter: not_found(),
            started: None,
            completed: None,
            report_time: None,
            sample_mass: Measured::default(),
            absolute_density: Measured::default(),
        }
    }
}

/// Measurement run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementParameters {
    /// Chamber diameter in mm.
    pub chamber_diameter: Measured,
    pub preparation_cycles: Option<u32>,
    pub measurement_cycles: Option<u32>,
    pub blank_data: String,
    /// Consolidation force in N.
    pub consolidation_force: Measured,
    /// Conversion factor in cm³/mm.
    pub conversion_factor: Measured,
    /// Zero depth in mm.
    pub zero_depth: Measured,
}

impl Default for MeasurementParameters {
    fn default() -> Self {
        Self {
            chamber_diameter: Measured::default(),
            preparation_cycles: None,
            measurement_cycles: None,
            blank_data: not_found(),
            consolidation_force: Measured::default(),
            conversion_factor: Measured::default(),
            zero_depth: Measured::default(),
        }
    }
}

/// Aggregate measurement results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementResults {
    /// Average envelope volume in cm³.
    pub average_envelope_volume: Measured,
    /// Average envelope density in g/cm³.
    pub average_envelope_density: Measured,
    /// Specific pore volume in cm³/g.
    pub specific_pore_volume: Measured,
    /// Porosity in percent.
    pub porosity: Measured,
    /// Percent sample volume.
    pub percent_sample_volume: Measured,
    /// Standard deviation of the envelope volume, cm³.
    pub standard_deviation_volume: Measured,
    /// Standard deviation of the envelope density, g/cm³.
    pub standard_deviation_density: Measured,
}

/// One repeated trial row of the measurement: counts, volume, and density
/// plus their deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementCycle {
    pub cycle_number: u32,
    pub blank_counts: u32,
    pub sample_counts: u32,
    /// Envelope volume in cm³.
    pub volume: f64,
    /// Volume deviation in cm³.
    pub volume_deviation: f64,
    /// Envelope density in g/cm³.
    pub density: f64,
    /// Density deviation in g/cm³.
    pub density_deviation: f64,
}

impl MeasurementCycle {
    /// Comma-joined representation of all seven values, used for the
    /// per-row node writes.
    pub fn to_comma_separated(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.cycle_number,
            self.blank_counts,
            self.sample_counts,
            self.volume,
            self.volume_deviation,
            self.density,
            self.density_deviation
        )
    }

    /// The six non-index values as a double array, for the typed-array
    /// compatibility slot.
    pub fn to_double_array(&self) -> Vec<f64> {
        vec![
            f64::from(self.blank_counts),
            f64::from(self.sample_counts),
            self.volume,
            self.volume_deviation,
            self.density,
            self.density_deviation,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cycle() -> MeasurementCycle {
        MeasurementCycle {
            cycle_number: 3,
            blank_counts: 1024,
            sample_counts: 2048,
            volume: 10.1234,
            volume_deviation: -0.0012,
            density: 1.2345,
            density_deviation: 0.0003,
        }
    }

    #[test]
    fn measured_defaults_to_sentinel() {
        let m = Measured::default();
        assert_eq!(m.text, NOT_FOUND);
        assert!(m.value.is_none());
        assert!(!m.is_found());
        assert_eq!(m.export_value(), None);
    }

    #[test]
    fn measured_export_prefers_numeric() {
        let m = Measured {
            text: "12.3400 g".to_string(),
            value: Some(12.34),
        };
        assert_eq!(m.export_value(), Some("12.34".to_string()));
    }

    #[test]
    fn measured_export_falls_back_to_text() {
        let m = Measured {
            text: "12.3400 g".to_string(),
            value: None,
        };
        assert_eq!(m.export_value(), Some("12.3400 g".to_string()));
    }

    #[test]
    fn cycle_comma_separated_keeps_order() {
        assert_eq!(
            cycle().to_comma_separated(),
            "3,1024,2048,10.1234,-0.0012,1.2345,0.0003"
        );
    }

    #[test]
    fn cycle_double_array_excludes_cycle_number() {
        assert_eq!(
            cycle().to_double_array(),
            vec![1024.0, 2048.0, 10.1234, -0.0012, 1.2345, 0.0003]
        );
    }

    #[test]
    fn record_text_fields_default_to_sentinel() {
        let record = ReportRecord::default();
        assert_eq!(record.report.report_type, NOT_FOUND);
        assert_eq!(record.instrument.name, NOT_FOUND);
        assert_eq!(record.sample.record, NOT_FOUND);
        assert_eq!(record.parameters.blank_data, NOT_FOUND);
        assert_eq!(record.results.porosity.text, NOT_FOUND);
    }
}
