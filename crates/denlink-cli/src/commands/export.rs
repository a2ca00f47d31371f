//! Export command - extract a report PDF and push it to CSV and OPC UA.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use denlink_core::export::csv::CsvReportWriter;
use denlink_core::export::mapping::NodeMapper;
use denlink_core::models::config::DenlinkConfig;
use denlink_core::models::report::ReportRecord;
use denlink_core::pdf::PdfExtractor;
use denlink_core::report::ReportParser;
use denlink_opc::OpcClient;

use super::load_config;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Input report PDF
    #[arg(required = true)]
    input: PathBuf,

    /// CSV output file (default: <output_dir>/<csv_file_name> from config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<u8> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    println!(
        "{} {}",
        style("Exporting").green().bold(),
        args.input.display()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );

    // Step 1: extraction. The only step allowed to abort the run.
    pb.set_message("extracting report data...");
    let record = extract_record(&args.input)?;
    pb.finish_and_clear();
    print_extraction_summary(&record);

    // Step 2: CSV mirror.
    let csv_path = args.output.clone().unwrap_or_else(|| {
        config
            .export
            .output_dir
            .join(&config.export.csv_file_name)
    });
    let csv_ok = match CsvReportWriter::new().export(&record, &csv_path) {
        Ok(()) => {
            println!(
                "{} CSV written to {}",
                style("✓").green(),
                csv_path.display()
            );
            true
        }
        Err(e) => {
            warn!("CSV export failed: {e}");
            println!("{} CSV export failed: {e}", style("✗").red());
            false
        }
    };

    // Step 3: OPC UA. The sync client must not run on the async executor.
    let opc_record = record.clone();
    let opc_config = config.clone();
    let opc_ok = tokio::task::spawn_blocking(move || export_opc(&opc_config, &opc_record)).await?;

    // Summary. Overall success = at least one channel made it out.
    let status = |ok: bool| {
        if ok {
            style("success").green()
        } else {
            style("failed").red()
        }
    };
    println!();
    println!("{}", style("Export summary").bold());
    println!("  PDF processing: {}", style("success").green());
    println!("  CSV export:     {}", status(csv_ok));
    println!("  OPC UA export:  {}", status(opc_ok));
    info!("export finished in {:.2}s", start.elapsed().as_secs_f64());

    Ok(if csv_ok || opc_ok { 0 } else { 2 })
}

/// Read the PDF and parse the record. Errors here are fatal: without a
/// record there is nothing to export.
fn extract_record(input: &std::path::Path) -> anyhow::Result<ReportRecord> {
    let mut extractor = PdfExtractor::new();
    extractor.load_file(input)?;
    let text = extractor.extract_text()?;

    let source_file = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    Ok(ReportParser::new().parse(&text, source_file))
}

fn print_extraction_summary(record: &ReportRecord) {
    println!("{} extraction completed", style("✓").green());
    println!("  report type: {}", record.report.report_type);
    println!(
        "  instrument:  {} (S/N: {})",
        record.instrument.name, record.instrument.serial_number
    );
    println!("  sample:      {}", record.sample.record);
    println!("  cycles:      {}", record.cycles.len());
}

/// Map and write the record over one OPC UA session. Failures are reported,
/// never propagated: a dead server must not sink the CSV channel.
fn export_opc(config: &DenlinkConfig, record: &ReportRecord) -> bool {
    let mapper = NodeMapper::new(&config.nodes, config.export.max_cycle_rows);
    if !mapper.validate_mappings() {
        // Advisory only; individual unmapped fields are skipped anyway.
        warn!("node mapping table is missing required entries");
    }
    let items = mapper.map_record(record);
    println!(
        "{} writing {} items to {}",
        style("→").cyan(),
        items.len(),
        config.opc.endpoint_url
    );

    let mut client = OpcClient::new(config.opc.clone());
    let result = match client.connect() {
        Ok(()) => client.write_batch(&items),
        Err(e) => Err(e),
    };
    // Session closes on every path, success or not.
    client.disconnect();

    match result {
        Ok(outcome) => {
            for item in &outcome.outcomes {
                if item.good {
                    println!("  {} {}", style("✓").green(), item.description);
                } else {
                    println!(
                        "  {} {}: {}",
                        style("✗").red(),
                        item.description,
                        item.status
                    );
                }
            }
            println!(
                "{} batch write: {}/{} successful",
                style("→").cyan(),
                outcome.succeeded(),
                outcome.outcomes.len()
            );
            outcome.all_good()
        }
        Err(e) => {
            warn!("OPC UA export failed: {e}");
            println!("{} OPC UA export failed: {e}", style("✗").red());
            false
        }
    }
}
