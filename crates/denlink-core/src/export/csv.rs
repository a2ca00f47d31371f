//! CSV mirror of the report record.
//!
//! Layout: a `Category,Field,Value` header, one always-quoted row per scalar
//! leaf field in export order, then a marker row, the seven-column cycle
//! header, and one row per measurement cycle with numerics at four decimal
//! places.

use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::info;

use crate::error::ExportError;
use crate::models::config::FieldTag;
use crate::models::report::{ReportRecord, NOT_FOUND};

/// Marker row introducing the cycle table section.
pub const CYCLE_TABLE_MARKER: &str = "MEASUREMENT CYCLES TABLE";

/// Cycle table column header.
pub const CYCLE_TABLE_HEADER: [&str; 7] = [
    "Cycle #",
    "Blank (counts)",
    "Sample (counts)",
    "Volume (cm³)",
    "Volume Deviation (cm³)",
    "Density (g/cm³)",
    "Density Deviation (g/cm³)",
];

const CSV_DATETIME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Serializer for the CSV mirror of a [`ReportRecord`].
pub struct CsvReportWriter;

impl CsvReportWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the CSV mirror to `path`, creating parent directories.
    pub fn export(&self, record: &ReportRecord, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .flexible(true)
            .from_path(path)?;

        writer.write_record(["Category", "Field", "Value"])?;
        for triple in self.triples(record) {
            writer.write_record(&triple)?;
        }

        if !record.cycles.is_empty() {
            writer.write_record([CYCLE_TABLE_MARKER])?;
            writer.write_record(CYCLE_TABLE_HEADER)?;
            for cycle in &record.cycles {
                writer.write_record([
                    cycle.cycle_number.to_string(),
                    cycle.blank_counts.to_string(),
                    cycle.sample_counts.to_string(),
                    format!("{:.4}", cycle.volume),
                    format!("{:.4}", cycle.volume_deviation),
                    format!("{:.4}", cycle.density),
                    format!("{:.4}", cycle.density_deviation),
                ])?;
            }
        }

        writer.flush()?;
        info!("CSV export written to {}", path.display());
        Ok(())
    }

    /// `(Category, Field, Value)` rows for every scalar leaf field, in
    /// export order. Values are the authoritative text representations;
    /// fields never found carry the sentinel so no cell is ambiguously
    /// blank.
    pub fn triples(&self, record: &ReportRecord) -> Vec<[String; 3]> {
        FieldTag::ALL
            .iter()
            .map(|&tag| {
                [
                    tag.category().to_string(),
                    tag.label().to_string(),
                    sanitize(&csv_value(record, tag)),
                ]
            })
            .collect()
    }
}

impl Default for CsvReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip embedded line breaks; quote doubling is the csv writer's job.
fn sanitize(value: &str) -> String {
    value.replace('\r', "").replace('\n', " ")
}

/// CSV cell text for a scalar field. Unlike the node mapper this is
/// text-authoritative: the unit-suffixed originals go out as extracted.
fn csv_value(record: &ReportRecord, tag: FieldTag) -> String {
    use FieldTag::*;

    let datetime = |value: Option<chrono::NaiveDateTime>| {
        value
            .map(|t| t.format(CSV_DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string())
    };
    let int = |value: Option<u32>| {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string())
    };

    match tag {
        ReportGenerated => record.report.generated.format("%Y-%m-%d %H:%M:%S").to_string(),
        SourceFile => record.report.source_file.clone(),
        ReportDate => record.report.report_date.clone(),
        ReportSerialNumber => record.report.serial_number.clone(),
        ReportType => record.report.report_type.clone(),
        InstrumentName => record.instrument.name.clone(),
        InstrumentSerialNumber => record.instrument.serial_number.clone(),
        InstrumentVersion => record.instrument.version.clone(),
        SampleRecord => record.sample.record.clone(),
        SampleOperator => record.sample.operator.clone(),
        SampleSubmitter => record.sample.submitter.clone(),
        StartedTime => datetime(record.sample.started),
        CompletedTime => datetime(record.sample.completed),
        ReportTime => datetime(record.sample.report_time),
        SampleMass => record.sample.sample_mass.text.clone(),
        AbsoluteDensity => record.sample.absolute_density.text.clone(),
        ChamberDiameter => record.parameters.chamber_diameter.text.clone(),
        PreparationCycles => int(record.parameters.preparation_cycles),
        MeasurementCycleCount => int(record.parameters.measurement_cycles),
        BlankData => record.parameters.blank_data.clone(),
        ConsolidationForce => record.parameters.consolidation_force.text.clone(),
        ConversionFactor => record.parameters.conversion_factor.text.clone(),
        ZeroDepth => record.parameters.zero_depth.text.clone(),
        AverageEnvelopeVolume => record.results.average_envelope_volume.text.clone(),
        AverageEnvelopeDensity => record.results.average_envelope_density.text.clone(),
        SpecificPoreVolume => record.results.specific_pore_volume.text.clone(),
        Porosity => record.results.porosity.text.clone(),
        PercentSampleVolume => record.results.percent_sample_volume.text.clone(),
        StandardDeviationVolume => record.results.standard_deviation_volume.text.clone(),
        StandardDeviationDensity => record.results.standard_deviation_density.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{Measured, MeasurementCycle};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn measured(text: &str, value: f64) -> Measured {
        Measured {
            text: text.to_string(),
            value: Some(value),
        }
    }

    fn populated_record() -> ReportRecord {
        let mut record = ReportRecord::default();
        record.report.source_file = "report.pdf".to_string();
        record.report.report_date = "19/06/2025, 11:21".to_string();
        record.report.serial_number = "158".to_string();
        record.report.report_type = "Envelope Density Report".to_string();
        record.instrument.name = "GeoPyc".to_string();
        record.instrument.serial_number = "158".to_string();
        record.instrument.version = "GeoPyc 1360 v2.01".to_string();
        record.sample.record = "ED-2025-0419".to_string();
        record.sample.operator = "jsmith".to_string();
        record.sample.submitter = "lab".to_string();
        record.sample.started = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(13, 21, 0);
        record.sample.completed = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(14, 47, 0);
        record.sample.report_time = NaiveDate::from_ymd_opt(2025, 6, 19)
            .unwrap()
            .and_hms_opt(11, 21, 0);
        record.sample.sample_mass = measured("12.3400 g", 12.34);
        record.sample.absolute_density = measured("2.5000 g/cm³", 2.5);
        record.parameters.chamber_diameter = measured("25.4000 mm", 25.4);
        record.parameters.preparation_cycles = Some(3);
        record.parameters.measurement_cycles = Some(5);
        record.parameters.blank_data = "Measured".to_string();
        record.parameters.consolidation_force = measured("51.0 N", 51.0);
        record.parameters.conversion_factor = measured("0.1284 cm³/mm", 0.1284);
        record.parameters.zero_depth = measured("5.1234 mm", 5.1234);
        record.results.average_envelope_volume = measured("10.1234 cm³", 10.1234);
        record.results.average_envelope_density = measured("1.2345 g/cm³", 1.2345);
        record.results.specific_pore_volume = measured("0.4100 cm³/g", 0.41);
        record.results.porosity = measured("50.6", 50.6);
        record.results.percent_sample_volume = measured("49.4", 49.4);
        record.results.standard_deviation_volume = measured("0.0021 cm³", 0.0021);
        record.results.standard_deviation_density = measured("0.0004 g/cm³", 0.0004);
        record.cycles = vec![
            MeasurementCycle {
                cycle_number: 1,
                blank_counts: 1000,
                sample_counts: 2000,
                volume: 10.1230,
                volume_deviation: -0.0004,
                density: 1.2346,
                density_deviation: 0.0001,
            },
            MeasurementCycle {
                cycle_number: 2,
                blank_counts: 1001,
                sample_counts: 2003,
                volume: 10.1238,
                volume_deviation: 0.0004,
                density: 1.2344,
                density_deviation: -0.0001,
            },
        ];
        record
    }

    #[test]
    fn triples_cover_every_field_in_order() {
        let record = populated_record();
        let triples = CsvReportWriter::new().triples(&record);
        assert_eq!(triples.len(), FieldTag::ALL.len());
        assert_eq!(triples[0][0], "Report Info");
        assert_eq!(triples[0][1], "Generated");
        let last = triples.last().unwrap();
        assert_eq!(last[0], "Results");
        assert_eq!(last[1], "Standard deviation (Density)");
        assert_eq!(last[2], "0.0004 g/cm³");
    }

    #[test]
    fn datetimes_render_in_report_style() {
        let record = populated_record();
        let triples = CsvReportWriter::new().triples(&record);
        let started = triples
            .iter()
            .find(|t| t[1] == "Started")
            .map(|t| t[2].clone())
            .unwrap();
        assert_eq!(started, "Mar 5, 2025 1:21 PM");
    }

    #[test]
    fn sanitize_strips_line_breaks() {
        assert_eq!(sanitize("a\r\nb\nc"), "a b c");
    }

    #[test]
    fn csv_round_trips_triples_and_cycles() {
        let record = populated_record();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ExtractedData.csv");

        CsvReportWriter::new().export(&record, &path).unwrap();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .unwrap();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let row = result.unwrap();
            rows.push(row.iter().map(|s| s.to_string()).collect());
        }

        assert_eq!(rows[0], vec!["Category", "Field", "Value"]);

        let marker_pos = rows
            .iter()
            .position(|r| r.first().map(String::as_str) == Some(CYCLE_TABLE_MARKER))
            .expect("cycle table marker");

        let triples: Vec<[String; 3]> = rows[1..marker_pos]
            .iter()
            .map(|r| [r[0].clone(), r[1].clone(), r[2].clone()])
            .collect();
        assert_eq!(triples, CsvReportWriter::new().triples(&record));

        assert_eq!(rows[marker_pos + 1], CYCLE_TABLE_HEADER.to_vec());

        let cycles: Vec<MeasurementCycle> = rows[marker_pos + 2..]
            .iter()
            .map(|r| MeasurementCycle {
                cycle_number: r[0].parse().unwrap(),
                blank_counts: r[1].parse().unwrap(),
                sample_counts: r[2].parse().unwrap(),
                volume: r[3].parse().unwrap(),
                volume_deviation: r[4].parse().unwrap(),
                density: r[5].parse().unwrap(),
                density_deviation: r[6].parse().unwrap(),
            })
            .collect();
        assert_eq!(cycles, record.cycles);
    }

    #[test]
    fn empty_cycle_list_omits_the_table_section() {
        let mut record = populated_record();
        record.cycles.clear();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ExtractedData.csv");

        CsvReportWriter::new().export(&record, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains(CYCLE_TABLE_MARKER));
    }
}
