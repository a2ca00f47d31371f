//! Mapping of a report record onto the configured node-id table.

use tracing::debug;

use crate::models::config::{FieldTag, NodeMappings};
use crate::models::report::ReportRecord;

/// Value payload of one node write.
///
/// Strings pass through as-is; the one designated array slot carries a
/// native double array. The distinction matters for wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    Text(String),
    DoubleArray(Vec<f64>),
}

/// One (node id, value, description) unit destined for a single node write.
/// Created transiently per export.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteItem {
    pub node_id: String,
    pub value: WriteValue,
    pub description: String,
}

impl WriteItem {
    fn text(node_id: &str, value: String, description: impl Into<String>) -> Self {
        Self {
            node_id: node_id.to_string(),
            value: WriteValue::Text(value),
            description: description.into(),
        }
    }
}

/// Deterministic record → write-set conversion.
///
/// Fields walk in [`FieldTag::ALL`] order, cycles follow. A field with no
/// configured node id or no real value is skipped, never written.
pub struct NodeMapper<'a> {
    mappings: &'a NodeMappings,
    max_cycle_rows: usize,
}

impl<'a> NodeMapper<'a> {
    pub fn new(mappings: &'a NodeMappings, max_cycle_rows: usize) -> Self {
        Self {
            mappings,
            max_cycle_rows,
        }
    }

    /// Build the ordered write-set for one record.
    pub fn map_record(&self, record: &ReportRecord) -> Vec<WriteItem> {
        let mut items = Vec::new();

        for &tag in FieldTag::ALL {
            let node_id = self.mappings.node_id(tag);
            if node_id.is_empty() {
                continue;
            }
            if let Some(value) = scalar_write_value(record, tag) {
                items.push(WriteItem::text(node_id, value, tag.label()));
            }
        }

        self.map_cycles(record, &mut items);

        debug!("mapped record to {} write items", items.len());
        items
    }

    fn map_cycles(&self, record: &ReportRecord, items: &mut Vec<WriteItem>) {
        let row_count = record.cycles.len().min(self.max_cycle_rows);
        for (index, cycle) in record.cycles.iter().take(row_count).enumerate() {
            if let Some(node_id) = self.mappings.cycle_row(index + 1) {
                items.push(WriteItem::text(
                    node_id,
                    cycle.to_comma_separated(),
                    format!("Cycle Row {}", index + 1),
                ));
            }
        }

        // Typed-array compatibility slot: the first cycle only.
        if let Some(first) = record.cycles.first() {
            let node_id = &self.mappings.data_import_array;
            if !node_id.is_empty() {
                items.push(WriteItem {
                    node_id: node_id.clone(),
                    value: WriteValue::DoubleArray(first.to_double_array()),
                    description: "Data Import Array".to_string(),
                });
            }
        }
    }

    /// Advisory pre-flight check: the minimum id set a useful export needs.
    /// Does not block writing.
    pub fn validate_mappings(&self) -> bool {
        let m = self.mappings;
        let required = [
            m.started_time.as_str(),
            m.completed_time.as_str(),
            m.sample_mass.as_str(),
            m.absolute_density.as_str(),
            &m.cycle_rows[0],
            m.data_import_array.as_str(),
        ];
        required.iter().all(|id| !id.is_empty())
    }
}

/// Exportable string form of a scalar field, `None` when the field carries
/// no real value. `Measured` fields are numeric-first with text fallback.
fn scalar_write_value(record: &ReportRecord, tag: FieldTag) -> Option<String> {
    use FieldTag::*;

    fn found(text: &str) -> Option<String> {
        (!text.is_empty() && text != crate::models::report::NOT_FOUND).then(|| text.to_string())
    }

    match tag {
        ReportGenerated => Some(record.report.generated.format("%Y-%m-%d %H:%M:%S").to_string()),
        SourceFile => found(&record.report.source_file),
        ReportDate => found(&record.report.report_date),
        ReportSerialNumber => found(&record.report.serial_number),
        ReportType => found(&record.report.report_type),
        InstrumentName => found(&record.instrument.name),
        InstrumentSerialNumber => found(&record.instrument.serial_number),
        InstrumentVersion => found(&record.instrument.version),
        SampleRecord => found(&record.sample.record),
        SampleOperator => found(&record.sample.operator),
        SampleSubmitter => found(&record.sample.submitter),
        StartedTime => record
            .sample
            .started
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        CompletedTime => record
            .sample
            .completed
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        ReportTime => record
            .sample
            .report_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        SampleMass => record.sample.sample_mass.export_value(),
        AbsoluteDensity => record.sample.absolute_density.export_value(),
        ChamberDiameter => record.parameters.chamber_diameter.export_value(),
        PreparationCycles => record.parameters.preparation_cycles.map(|v| v.to_string()),
        MeasurementCycleCount => record.parameters.measurement_cycles.map(|v| v.to_string()),
        BlankData => found(&record.parameters.blank_data),
        ConsolidationForce => record.parameters.consolidation_force.export_value(),
        ConversionFactor => record.parameters.conversion_factor.export_value(),
        ZeroDepth => record.parameters.zero_depth.export_value(),
        AverageEnvelopeVolume => record.results.average_envelope_volume.export_value(),
        AverageEnvelopeDensity => record.results.average_envelope_density.export_value(),
        SpecificPoreVolume => record.results.specific_pore_volume.export_value(),
        Porosity => record.results.porosity.export_value(),
        PercentSampleVolume => record.results.percent_sample_volume.export_value(),
        StandardDeviationVolume => record.results.standard_deviation_volume.export_value(),
        StandardDeviationDensity => record.results.standard_deviation_density.export_value(),
    }
}
