//! Rule-driven report parser.
//!
//! Applies the ordered rule table to whitespace-normalized text, then runs
//! the numeric and date derivation passes. A rule that fails to match leaves
//! its field at the "Not found" sentinel; nothing in here is fatal.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::cycles::parse_cycles;
use super::rules::{RE_FIRST_DECIMAL, RULES, RuleField};
use crate::models::report::{Measured, ReportRecord, NOT_FOUND};

/// Explicit date formats tried in order, matching the report generations in
/// the field: meridian form with optional zero padding first, then legacy
/// fallbacks. chrono accepts unpadded day/hour digits for the padded
/// specifiers, so each entry covers its zero-padded variant too.
const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y %I:%M %p",
    "%b %d %Y %I:%M %p",
    "%b %d, %Y %H:%M",
    "%b %d %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parser turning extracted PDF text into a [`ReportRecord`].
pub struct ReportParser;

impl ReportParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the full report text. `source_file` is recorded verbatim in the
    /// report info block.
    pub fn parse(&self, text: &str, source_file: &str) -> ReportRecord {
        info!("parsing report from {} characters of text", text.len());

        let clean = normalize_whitespace(text);
        let fields = self.apply_rules(&clean);

        let mut record = ReportRecord::default();
        record.full_text = text.to_string();
        record.report.source_file = source_file.to_string();

        let take =
            |field: RuleField| -> String { fields.get(&field).cloned().unwrap_or_else(|| NOT_FOUND.to_string()) };
        let measured = |field: RuleField| -> Measured {
            match fields.get(&field) {
                Some(text) => Measured {
                    value: derive_numeric(text),
                    text: text.clone(),
                },
                None => Measured::default(),
            }
        };
        let date = |field: RuleField| fields.get(&field).and_then(|t| parse_report_datetime(t));
        let int = |field: RuleField| fields.get(&field).and_then(|t| t.parse::<u32>().ok());

        record.report.report_date = take(RuleField::ReportDate);
        record.report.serial_number = take(RuleField::ReportSerialNumber);
        record.report.report_type = take(RuleField::ReportType);

        record.instrument.name = take(RuleField::InstrumentName);
        record.instrument.serial_number = take(RuleField::InstrumentSerialNumber);
        record.instrument.version = take(RuleField::InstrumentVersion);

        record.sample.record = take(RuleField::SampleRecord);
        record.sample.operator = take(RuleField::SampleOperator);
        record.sample.submitter = take(RuleField::SampleSubmitter);
        record.sample.started = date(RuleField::Started);
        record.sample.completed = date(RuleField::Completed);
        record.sample.report_time = date(RuleField::ReportTime);
        record.sample.sample_mass = measured(RuleField::SampleMass);
        record.sample.absolute_density = measured(RuleField::AbsoluteDensity);

        record.parameters.chamber_diameter = measured(RuleField::ChamberDiameter);
        record.parameters.preparation_cycles = int(RuleField::PreparationCycles);
        record.parameters.measurement_cycles = int(RuleField::MeasurementCycles);
        record.parameters.blank_data = take(RuleField::BlankData);
        record.parameters.consolidation_force = measured(RuleField::ConsolidationForce);
        record.parameters.conversion_factor = measured(RuleField::ConversionFactor);
        record.parameters.zero_depth = measured(RuleField::ZeroDepth);

        record.results.average_envelope_volume = measured(RuleField::AverageEnvelopeVolume);
        record.results.average_envelope_density = measured(RuleField::AverageEnvelopeDensity);
        record.results.specific_pore_volume = measured(RuleField::SpecificPoreVolume);
        record.results.porosity = measured(RuleField::Porosity);
        record.results.percent_sample_volume = measured(RuleField::PercentSampleVolume);
        record.results.standard_deviation_volume = measured(RuleField::StandardDeviationVolume);
        record.results.standard_deviation_density = measured(RuleField::StandardDeviationDensity);

        // Cycle rows need the original line structure, not the normalized text.
        record.cycles = parse_cycles(text);

        debug!(
            "extracted report type '{}' with {} cycles",
            record.report.report_type,
            record.cycles.len()
        );
        record
    }

    /// Run the rule table in order. The first rule that matches a field
    /// wins; later rules for the same field are no-ops.
    fn apply_rules(&self, clean: &str) -> HashMap<RuleField, String> {
        let mut fields = HashMap::new();

        for rule in RULES.iter() {
            if fields.contains_key(&rule.field) {
                continue;
            }
            if let Some(caps) = rule.pattern.captures(clean) {
                let value = caps[1].trim();
                if !value.is_empty() {
                    fields.insert(rule.field, value.to_string());
                }
            }
        }

        fields
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse all whitespace runs (including line breaks) to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First decimal number in a unit-suffixed value, e.g. "12.3400 g" → 12.34.
pub fn derive_numeric(text: &str) -> Option<f64> {
    RE_FIRST_DECIMAL
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse a report timestamp against the ordered format list, then a last
/// general attempt with the comma stripped.
pub fn parse_report_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    // Locale-general fallback: some renderers drop the comma.
    let without_comma = text.replace(',', "");
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&without_comma, format) {
            return Some(parsed);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    const SAMPLE_TEXT: &str = "\
19/06/2025, 11:21 Multiple Reports (S/N: 158)
Envelope Density Report
Instrument GeoPyc Serial number 158 Version GeoPyc 1360 v2.01
Record ED-2025-0419 Operator jsmith Submitter lab
Started Mar 5, 2025 1:21 PM Completed Mar 5, 2025 2:47 PM
Report time Jun 19, 2025 11:21 AM
Sample mass 12.3400 g Absolute density 2.5000 g/cm³
Chamber diameter 25.4000 mm Preparation cycles 3 Measurement cycles 5
Blank data Measured Consolidation force 51.0 N
Conversion factor 0.1284 cm³/mm Zero depth 5.1234 mm
Average envelope volume 10.1234 cm³ Standard deviation 0.0021 cm³
Average envelope density 1.2345 g/cm³ Standard deviation 0.0004 g/cm³
Specific pore volume 0.4100 cm³/g Porosity 50.6 % Percent sample volume 49.4%
Cycle # Blank Sample Volume Deviation Density Deviation
1 1000 2000 10.1230 -0.0004 1.2346 0.0001
2 1001 2003 10.1238 0.0004 1.2344 -0.0001
";

    #[test]
    fn parses_all_field_groups() {
        let record = ReportParser::new().parse(SAMPLE_TEXT, "report.pdf");

        assert_eq!(record.report.source_file, "report.pdf");
        assert_eq!(record.report.report_date, "19/06/2025, 11:21");
        assert_eq!(record.report.serial_number, "158");
        assert_eq!(record.report.report_type, "Envelope Density Report");

        assert_eq!(record.instrument.name, "GeoPyc");
        assert_eq!(record.instrument.serial_number, "158");
        assert_eq!(record.instrument.version, "GeoPyc 1360 v2.01");

        assert_eq!(record.sample.record, "ED-2025-0419");
        assert_eq!(record.sample.operator, "jsmith");
        assert_eq!(record.sample.submitter, "lab");
        assert_eq!(record.sample.sample_mass.text, "12.3400 g");
        assert_eq!(record.sample.sample_mass.value, Some(12.34));
        assert_eq!(record.sample.absolute_density.value, Some(2.5));

        assert_eq!(record.parameters.preparation_cycles, Some(3));
        assert_eq!(record.parameters.measurement_cycles, Some(5));
        assert_eq!(record.parameters.blank_data, "Measured");
        assert_eq!(record.parameters.conversion_factor.text, "0.1284 cm³/mm");

        assert_eq!(record.results.porosity.value, Some(50.6));
        assert_eq!(record.results.standard_deviation_volume.text, "0.0021 cm³");

        assert_eq!(record.cycles.len(), 2);
        assert_eq!(record.cycles[1].sample_counts, 2003);
        assert_eq!(record.full_text, SAMPLE_TEXT);
    }

    #[test]
    fn started_timestamp_parses_to_datetime() {
        let record = ReportParser::new().parse(SAMPLE_TEXT, "report.pdf");
        let started = record.sample.started.expect("started time");
        assert_eq!(
            (started.year(), started.month(), started.day()),
            (2025, 3, 5)
        );
        assert_eq!((started.hour(), started.minute()), (13, 21));
    }

    #[test]
    fn unmatched_fields_keep_sentinel_without_error() {
        let record = ReportParser::new().parse("nothing recognizable here", "x.pdf");
        assert_eq!(record.report.report_type, NOT_FOUND);
        assert_eq!(record.sample.sample_mass.text, NOT_FOUND);
        assert_eq!(record.sample.sample_mass.value, None);
        assert!(record.sample.started.is_none());
        assert!(record.cycles.is_empty());
    }

    #[test]
    fn first_matching_rule_wins_for_a_field() {
        // The specific rule only matches the second label; a later, looser
        // rule would capture "Acme" from the first. Table order decides.
        let record = ReportParser::new().parse("Instrument Acme Instrument GeoPyc", "x.pdf");
        assert_eq!(record.instrument.name, "GeoPyc");
    }

    #[test]
    fn loose_rule_fills_in_when_primary_misses() {
        let record = ReportParser::new().parse("Started: Mar 5 2025 13:21", "x.pdf");
        let started = record.sample.started.expect("legacy started time");
        assert_eq!((started.hour(), started.minute()), (13, 21));
    }

    #[test]
    fn numeric_derivation_is_stable() {
        assert_eq!(derive_numeric("12.3400 g"), Some(12.34));
        assert_eq!(derive_numeric("12.3400 g"), Some(12.34));
        assert_eq!(derive_numeric("g only"), None);
        assert_eq!(derive_numeric("51.0 N"), Some(51.0));
    }

    #[test]
    fn datetime_formats_cover_padding_variants() {
        assert!(parse_report_datetime("Mar 5, 2025 1:21 PM").is_some());
        assert!(parse_report_datetime("Mar 05, 2025 01:21 PM").is_some());
        assert!(parse_report_datetime("Mar 15, 2025 11:47 AM").is_some());
        assert!(parse_report_datetime("2025-03-05 13:21:00").is_some());
        assert!(parse_report_datetime("not a date").is_none());
    }

    #[test]
    fn normalization_collapses_runs() {
        assert_eq!(
            normalize_whitespace("a  b\t c\r\nd"),
            "a b c d"
        );
    }
}
