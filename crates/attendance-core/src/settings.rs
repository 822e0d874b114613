use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::identity::DedupPolicy;
use crate::models::ParseMode;

/// Environment variable that supplies the input path when none is given.
pub const INPUT_PATH_ENV: &str = "ATTENDANCE_REPORT_PATH";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build an attendance list
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attendance-tracker",
    about = "Build an attendance matrix from per-session email lists or meeting reports",
    version
)]
pub struct Settings {
    /// A .csv file, or a folder containing .csv files
    #[arg(value_name = "RAW_DATA_FILE_OR_FOLDER", env = INPUT_PATH_ENV)]
    pub input: PathBuf,

    /// Parse exported meeting attendance reports instead of plain email lists
    #[arg(short, long)]
    pub report: bool,

    /// How addresses within one session are judged to be the same person
    #[arg(long, default_value = "local-part", value_parser = DedupPolicy::VARIANTS)]
    pub dedup: String,

    /// Directory for the exported matrix (defaults to <input dir>/results)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Load `.env` files, then parse the process arguments.
    pub fn load() -> Result<Self, clap::Error> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        load_env_files(&env_file_candidates(&cwd, dirs::config_dir().as_deref()));
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] without touching `.env` files, so tests can
    /// pass an explicit argument list.
    pub fn load_from_args(args: Vec<OsString>) -> Result<Self, clap::Error> {
        let settings = Settings::try_parse_from(args)?;
        Ok(settings.resolve())
    }

    /// Apply the `--debug` flag.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    pub fn parse_mode(&self) -> ParseMode {
        ParseMode::from_report_flag(self.report)
    }

    /// The dedup policy; `--dedup` is already restricted to known names.
    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup.parse().unwrap_or_default()
    }
}

// ── .env loading ───────────────────────────────────────────────────────────────

/// `.env` files consulted before argument parsing, in priority order.
///
/// The working directory comes first, then `<config_dir>/attendance-tracker`.
pub fn env_file_candidates(cwd: &Path, config_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![cwd.join(".env")];
    if let Some(dir) = config_dir {
        candidates.push(dir.join("attendance-tracker").join(".env"));
    }
    candidates
}

/// Load every existing file in `candidates`. Variables already present in
/// the environment are never overridden, so earlier files win.
///
/// Returns the files that were loaded.
pub fn load_env_files(candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(path) {
            Ok(()) => loaded.push(path.clone()),
            Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
        }
    }
    loaded
}

// ── Tests ──────────────────────────────────────────────────────────────────────
