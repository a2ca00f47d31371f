//! Regex rule table for envelope-density report extraction.
//!
//! Rules run against whitespace-normalized text, in table order, with one
//! capture group each. Several fields carry a second, looser rule for older
//! report layouts; the engine keeps the first successful match per field.

use lazy_static::lazy_static;
use regex::Regex;

/// Closed set of text fields the rule table can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    ReportDate,
    ReportSerialNumber,
    ReportType,
    InstrumentName,
    InstrumentSerialNumber,
    InstrumentVersion,
    SampleRecord,
    SampleOperator,
    SampleSubmitter,
    Started,
    Completed,
    ReportTime,
    SampleMass,
    AbsoluteDensity,
    ChamberDiameter,
    PreparationCycles,
    MeasurementCycles,
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

/// One extraction rule: destination field plus its pattern.
pub struct Rule {
    pub field: RuleField,
    pub pattern: &'static Regex,
}

macro_rules! rules {
    ($(($field:ident, $pattern:ident)),* $(,)?) => {
        vec![$(Rule { field: RuleField::$field, pattern: &$pattern }),*]
    };
}

lazy_static! {
    // Report header. The date/serial/type block sits on the banner line of
    // every page, e.g. "19/06/2025, 11:21 Multiple Reports (S/N: 158)".
    static ref RE_REPORT_DATE: Regex =
        Regex::new(r"(?i)(\d{1,2}/\d{1,2}/\d{4}, \d{1,2}:\d{2})").unwrap();
    static ref RE_REPORT_SERIAL: Regex =
        Regex::new(r"(?i)Multiple Reports \(S/N: (\d+)\)").unwrap();
    static ref RE_REPORT_TYPE: Regex =
        Regex::new(r"(?i)(Envelope Density Report)").unwrap();

    // Instrument block.
    static ref RE_INSTRUMENT_NAME: Regex = Regex::new(r"(?i)Instrument (GeoPyc)").unwrap();
    static ref RE_INSTRUMENT_NAME_ANY: Regex = Regex::new(r"(?i)Instrument (\w+)").unwrap();
    static ref RE_INSTRUMENT_SERIAL: Regex = Regex::new(r"(?i)Serial number (\d+)").unwrap();
    static ref RE_INSTRUMENT_VERSION: Regex =
        Regex::new(r"(?i)Version (GeoPyc \d+ v[\d.]+)").unwrap();

    // Sample block. The record id runs until the "Operator" label; the
    // regex crate has no lookahead, so the label is matched and the lazy
    // group keeps it out of the capture.
    static ref RE_SAMPLE_RECORD: Regex =
        Regex::new(r"(?i)Record ([A-Z0-9][A-Z0-9\- ]*?) Operator").unwrap();
    static ref RE_SAMPLE_OPERATOR: Regex = Regex::new(r"(?i)Operator (\w+)").unwrap();
    static ref RE_SAMPLE_SUBMITTER: Regex = Regex::new(r"(?i)Submitter (\w+)").unwrap();
    static ref RE_STARTED: Regex =
        Regex::new(r"(?i)Started ([A-Za-z]{3} \d{1,2}, \d{4} \d{1,2}:\d{2} [AP]M)").unwrap();
    static ref RE_STARTED_LOOSE: Regex =
        Regex::new(r"(?i)Started:? ([A-Za-z]{3} \d{1,2},? \d{4} \d{1,2}:\d{2}(?: [AP]M)?)")
            .unwrap();
    static ref RE_COMPLETED: Regex =
        Regex::new(r"(?i)Completed ([A-Za-z]{3} \d{1,2}, \d{4} \d{1,2}:\d{2} [AP]M)").unwrap();
    static ref RE_COMPLETED_LOOSE: Regex =
        Regex::new(r"(?i)Completed:? ([A-Za-z]{3} \d{1,2},? \d{4} \d{1,2}:\d{2}(?: [AP]M)?)")
            .unwrap();
    static ref RE_REPORT_TIME: Regex =
        Regex::new(r"(?i)Report time ([A-Za-z]{3} \d{1,2}, \d{4} \d{1,2}:\d{2} [AP]M)").unwrap();
    static ref RE_SAMPLE_MASS: Regex = Regex::new(r"(?i)Sample mass:? ([\d.]+ g)").unwrap();
    static ref RE_ABSOLUTE_DENSITY: Regex =
        Regex::new(r"(?i)Absolute density:? ([\d.]+ g/cm.)").unwrap();

    // Parameters block.
    static ref RE_CHAMBER_DIAMETER: Regex =
        Regex::new(r"(?i)Chamber diameter ([\d.]+ mm)").unwrap();
    static ref RE_PREPARATION_CYCLES: Regex =
        Regex::new(r"(?i)Preparation cycles (\d+)").unwrap();
    static ref RE_MEASUREMENT_CYCLES: Regex =
        Regex::new(r"(?i)Measurement cycles (\d+)").unwrap();
    static ref RE_BLANK_DATA: Regex = Regex::new(r"(?i)Blank data (\w+)").unwrap();
    static ref RE_CONSOLIDATION_FORCE: Regex =
        Regex::new(r"(?i)Consolidation force ([\d.]+ N)").unwrap();
    static ref RE_CONVERSION_FACTOR: Regex =
        Regex::new(r"(?i)Conversion factor ([\d.]+ cm./mm)").unwrap();
    static ref RE_ZERO_DEPTH: Regex = Regex::new(r"(?i)Zero depth ([\d.]+ mm)").unwrap();

    // Results block. The ³ superscript survives extraction unreliably, so
    // the unit patterns accept any character in its place.
    static ref RE_AVG_VOLUME: Regex =
        Regex::new(r"(?i)Average envelope volume ([\d.]+ cm.)").unwrap();
    static ref RE_AVG_DENSITY: Regex =
        Regex::new(r"(?i)Average envelope density ([\d.]+ g/cm.)").unwrap();
    static ref RE_PORE_VOLUME: Regex =
        Regex::new(r"(?i)Specific pore volume ([\d.]+ cm./g)").unwrap();
    static ref RE_POROSITY: Regex = Regex::new(r"(?i)Porosity ([\d.]+) %").unwrap();
    static ref RE_PERCENT_SAMPLE_VOLUME: Regex =
        Regex::new(r"(?i)Percent sample volume ([\d.]+)%").unwrap();
    static ref RE_STDDEV_VOLUME: Regex =
        Regex::new(r"(?i)Average envelope volume [\d.]+ cm. Standard deviation ([\d.]+ cm.)")
            .unwrap();
    static ref RE_STDDEV_DENSITY: Regex =
        Regex::new(r"(?i)Average envelope density [\d.]+ g/cm. Standard deviation ([\d.]+ g/cm.)")
            .unwrap();

    // First decimal number in a unit-suffixed value, for numeric derivation.
    pub static ref RE_FIRST_DECIMAL: Regex = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();

    /// The ordered rule table. Loose variants sit directly after their
    /// primary rule and only take effect when the primary found nothing.
    pub static ref RULES: Vec<Rule> = rules![
        (ReportDate, RE_REPORT_DATE),
        (ReportSerialNumber, RE_REPORT_SERIAL),
        (ReportType, RE_REPORT_TYPE),
        (InstrumentName, RE_INSTRUMENT_NAME),
        (InstrumentName, RE_INSTRUMENT_NAME_ANY),
        (InstrumentSerialNumber, RE_INSTRUMENT_SERIAL),
        (InstrumentVersion, RE_INSTRUMENT_VERSION),
        (SampleRecord, RE_SAMPLE_RECORD),
        (SampleOperator, RE_SAMPLE_OPERATOR),
        (SampleSubmitter, RE_SAMPLE_SUBMITTER),
        (Started, RE_STARTED),
        (Started, RE_STARTED_LOOSE),
        (Completed, RE_COMPLETED),
        (Completed, RE_COMPLETED_LOOSE),
        (ReportTime, RE_REPORT_TIME),
        (SampleMass, RE_SAMPLE_MASS),
        (AbsoluteDensity, RE_ABSOLUTE_DENSITY),
        (ChamberDiameter, RE_CHAMBER_DIAMETER),
        (PreparationCycles, RE_PREPARATION_CYCLES),
        (MeasurementCycles, RE_MEASUREMENT_CYCLES),
        (BlankData, RE_BLANK_DATA),
        (ConsolidationForce, RE_CONSOLIDATION_FORCE),
        (ConversionFactor, RE_CONVERSION_FACTOR),
        (ZeroDepth, RE_ZERO_DEPTH),
        (AverageEnvelopeVolume, RE_AVG_VOLUME),
        (AverageEnvelopeDensity, RE_AVG_DENSITY),
        (SpecificPoreVolume, RE_PORE_VOLUME),
        (Porosity, RE_POROSITY),
        (PercentSampleVolume, RE_PERCENT_SAMPLE_VOLUME),
        (StandardDeviationVolume, RE_STDDEV_VOLUME),
        (StandardDeviationDensity, RE_STDDEV_DENSITY),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn capture(re: &Regex, text: &str) -> Option<String> {
        re.captures(text).map(|c| c[1].trim().to_string())
    }

    #[test]
    fn report_banner_fields() {
        let text = "19/06/2025, 11:21 Multiple Reports (S/N: 158) Envelope Density Report";
        assert_eq!(
            capture(&RE_REPORT_DATE, text),
            Some("19/06/2025, 11:21".to_string())
        );
        assert_eq!(capture(&RE_REPORT_SERIAL, text), Some("158".to_string()));
        assert_eq!(
            capture(&RE_REPORT_TYPE, text),
            Some("Envelope Density Report".to_string())
        );
    }

    #[test]
    fn instrument_fields() {
        let text = "Instrument GeoPyc Serial number 158 Version GeoPyc 1360 v2.01";
        assert_eq!(capture(&RE_INSTRUMENT_NAME, text), Some("GeoPyc".to_string()));
        assert_eq!(capture(&RE_INSTRUMENT_SERIAL, text), Some("158".to_string()));
        assert_eq!(
            capture(&RE_INSTRUMENT_VERSION, text),
            Some("GeoPyc 1360 v2.01".to_string())
        );
    }

    #[test]
    fn sample_record_stops_at_operator_label() {
        let text = "Record ED-2025-0419 A Operator jsmith Submitter lab";
        assert_eq!(
            capture(&RE_SAMPLE_RECORD, text),
            Some("ED-2025-0419 A".to_string())
        );
    }

    #[test]
    fn started_primary_requires_meridian() {
        assert_eq!(
            capture(&RE_STARTED, "Started Mar 5, 2025 1:21 PM"),
            Some("Mar 5, 2025 1:21 PM".to_string())
        );
        assert_eq!(capture(&RE_STARTED, "Started Mar 5, 2025 13:21"), None);
    }

    #[test]
    fn started_loose_accepts_legacy_layout() {
        assert_eq!(
            capture(&RE_STARTED_LOOSE, "Started: Mar 5 2025 13:21"),
            Some("Mar 5 2025 13:21".to_string())
        );
    }

    #[test]
    fn measured_fields_keep_unit_suffix() {
        let text = "Sample mass 12.3400 g Absolute density 2.5000 g/cm³";
        assert_eq!(
            capture(&RE_SAMPLE_MASS, text),
            Some("12.3400 g".to_string())
        );
        assert_eq!(
            capture(&RE_ABSOLUTE_DENSITY, text),
            Some("2.5000 g/cm³".to_string())
        );
    }

    #[test]
    fn density_unit_tolerates_ascii_superscript() {
        assert_eq!(
            capture(&RE_ABSOLUTE_DENSITY, "Absolute density 2.5000 g/cm3"),
            Some("2.5000 g/cm3".to_string())
        );
    }

    #[test]
    fn results_fields() {
        let text = "Average envelope volume 10.1234 cm³ Standard deviation 0.0021 cm³ \
                    Average envelope density 1.2345 g/cm³ Standard deviation 0.0004 g/cm³ \
                    Specific pore volume 0.4100 cm³/g Porosity 50.6 % Percent sample volume 49.4%";
        assert_eq!(capture(&RE_AVG_VOLUME, text), Some("10.1234 cm³".to_string()));
        assert_eq!(
            capture(&RE_AVG_DENSITY, text),
            Some("1.2345 g/cm³".to_string())
        );
        assert_eq!(
            capture(&RE_PORE_VOLUME, text),
            Some("0.4100 cm³/g".to_string())
        );
        assert_eq!(capture(&RE_POROSITY, text), Some("50.6".to_string()));
        assert_eq!(
            capture(&RE_PERCENT_SAMPLE_VOLUME, text),
            Some("49.4".to_string())
        );
        assert_eq!(
            capture(&RE_STDDEV_VOLUME, text),
            Some("0.0021 cm³".to_string())
        );
        assert_eq!(
            capture(&RE_STDDEV_DENSITY, text),
            Some("0.0004 g/cm³".to_string())
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            capture(&RE_BLANK_DATA, "BLANK DATA Measured"),
            Some("Measured".to_string())
        );
    }

    #[test]
    fn first_decimal_pulls_leading_number() {
        assert_eq!(
            capture(&RE_FIRST_DECIMAL, "12.3400 g"),
            Some("12.3400".to_string())
        );
        assert_eq!(capture(&RE_FIRST_DECIMAL, "no digits"), None);
    }
}
