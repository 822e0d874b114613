mod bootstrap;

use anyhow::{Context, Result};
use attendance_core::settings::Settings;
use attendance_data::pipeline::{run_attendance, RunOptions};
use attendance_data::reporter::TracingReporter;

fn main() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|e| e.exit());

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Attendance Tracker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, mode: {}, dedup: {}",
        settings.input.display(),
        settings.parse_mode(),
        settings.dedup_policy()
    );

    let options = RunOptions {
        mode: settings.parse_mode(),
        dedup: settings.dedup_policy(),
        output_dir: settings.output_dir.clone(),
    };

    let mut reporter = TracingReporter;
    let (summary, _table) = run_attendance(&settings.input, &options, &mut reporter)
        .with_context(|| format!("Couldn't build attendance from {}", settings.input.display()))?;

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
