//! CSV export of the attendance matrix.

use std::io::Write;
use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use tracing::{info, warn};

use crate::merger::AttendanceTable;
use crate::reader::input_dir;

/// Name of the output subdirectory created next to the input.
pub const RESULTS_DIR: &str = "results";

/// `<input dir>/results`.
pub fn results_dir(input: &Path) -> PathBuf {
    input_dir(input).join(RESULTS_DIR)
}

/// `attendance_from_{start}_to_{end}.csv`, or `attendance_empty.csv` when no
/// session was merged.
pub fn export_file_name(table: &AttendanceTable) -> String {
    match table.date_range() {
        Some((start, end)) => format!("attendance_from_{}_to_{}.csv", start, end),
        None => "attendance_empty.csv".to_string(),
    }
}

/// Serialise `table` as CSV: `Email` plus one column per session, cells
/// `True` / `False`.
pub fn write_csv<W: Write>(table: &AttendanceTable, writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec!["Email"];
    header.extend(table.session_dates());
    out.write_record(&header)?;

    for row in table.rows() {
        let mut record: Vec<&str> = Vec::with_capacity(row.presence.len() + 1);
        record.push(&row.email);
        record.extend(row.presence.iter().map(|p| bool_literal(*p)));
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

/// Write `table` into `out_dir` (created if absent) and return the file path.
pub fn export_table(table: &AttendanceTable, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir).map_err(|source| AttendanceError::Export {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let path = out_dir.join(export_file_name(table));
    match table.date_range() {
        Some((start, end)) => info!("From: {} to {}", start, end),
        None => warn!("No sessions were found; writing an empty attendance list"),
    }

    let file = std::fs::File::create(&path).map_err(|source| AttendanceError::Export {
        path: path.clone(),
        source,
    })?;
    write_csv(table, std::io::BufWriter::new(file)).map_err(|e| AttendanceError::Export {
        path: path.clone(),
        source: std::io::Error::other(e),
    })?;

    info!(
        "Wrote {} emails x {} sessions to {}",
        table.email_count(),
        table.session_count(),
        path.display()
    );
    Ok(path)
}

fn bool_literal(present: bool) -> &'static str {
    if present {
        "True"
    } else {
        "False"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
