//! CSV export of the audited load schedule.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::load::LoadList;

const HEADER: [&str; 6] = [
    "appliance",
    "unit_watt",
    "quantity",
    "total_watt",
    "hours_per_day",
    "daily_wh",
];

/// Writes the load schedule as CSV, one row per appliance plus a TOTAL row.
///
/// # Errors
///
/// Returns any underlying I/O error.
pub fn write_csv<W: Write>(loads: &LoadList, writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for entry in loads.entries() {
        wtr.write_record([
            entry.name().to_string(),
            format!("{:.1}", entry.unit_watt()),
            entry.quantity().to_string(),
            format!("{:.1}", entry.total_watt()),
            format!("{:.1}", entry.hours_per_day()),
            format!("{:.1}", entry.daily_energy_wh()),
        ])?;
    }
    wtr.write_record([
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        format!("{:.1}", loads.total_power_w()),
        String::new(),
        format!("{:.1}", loads.total_energy_wh()),
    ])?;
    wtr.flush()?;
    Ok(())
}

/// Writes the load schedule to a CSV file at `path`.
///
/// # Errors
///
/// Returns any underlying I/O error.
pub fn export_csv(loads: &LoadList, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(loads, file)?;
    info!(path = %path.display(), rows = loads.len(), "load schedule exported");
    Ok(())
}
