//! Line scanner for the measurement-cycle table.
//!
//! The cycle table's header row renders differently across PDF producers, so
//! this is a lenient scanner over data rows rather than a table parser:
//! any line shaped like `cycle# blank# sample# vol volDev dens densDev` is
//! taken as a cycle, everything else is skipped.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::report::MeasurementCycle;

lazy_static! {
    // Three non-negative integers followed by four signed decimals.
    static ref RE_CYCLE_ROW: Regex = Regex::new(
        r"^(\d+)\s+(\d+)\s+(\d+)\s+(-?[\d.]+)\s+(-?[\d.]+)\s+(-?[\d.]+)\s+(-?[\d.]+)$"
    )
    .unwrap();
}

/// Scan raw (line-broken) report text for measurement-cycle rows, in
/// document order. Rows whose tokens fail numeric parsing are dropped; no
/// cap is applied here.
pub fn parse_cycles(text: &str) -> Vec<MeasurementCycle> {
    let mut cycles = Vec::new();

    for line in text.lines() {
        let Some(caps) = RE_CYCLE_ROW.captures(line.trim()) else {
            continue;
        };
        match parse_row(&caps) {
            Some(cycle) => cycles.push(cycle),
            None => debug!("skipping malformed cycle row: {}", line.trim()),
        }
    }

    debug!("parsed {} measurement cycles", cycles.len());
    cycles
}

fn parse_row(caps: &regex::Captures<'_>) -> Option<MeasurementCycle> {
    Some(MeasurementCycle {
        cycle_number: caps[1].parse().ok()?,
        blank_counts: caps[2].parse().ok()?,
        sample_counts: caps[3].parse().ok()?,
        volume: caps[4].parse().ok()?,
        volume_deviation: caps[5].parse().ok()?,
        density: caps[6].parse().ok()?,
        density_deviation: caps[7].parse().ok()?,
    })
}
