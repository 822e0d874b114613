//! Progress reporting for a pipeline run.
//!
//! The pipeline never logs on its own; it reports through a [`Reporter`]
//! handed in by the caller. A run calls `begin` once, then `session_merged`
//! or `file_skipped` once per file, then `finish` once.

use std::path::Path;

use attendance_core::error::AttendanceError;
use attendance_core::models::{ParseMode, Session};
use tracing::{debug, info, warn};

use crate::pipeline::RunSummary;

pub trait Reporter {
    fn begin(&mut self, _mode: ParseMode, _file_count: usize) {}

    fn session_merged(&mut self, _session: &Session) {}

    /// A session label that an earlier file already produced; attendance for
    /// the two files is combined.
    fn session_label_reused(&mut self, _session: &Session) {}

    fn file_skipped(&mut self, _path: &Path, _error: &AttendanceError) {}

    fn finish(&mut self, _summary: &RunSummary) {}
}

/// Reports through `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn begin(&mut self, mode: ParseMode, file_count: usize) {
        info!("Processing {} file(s) in {} mode", file_count, mode);
    }

    fn session_merged(&mut self, session: &Session) {
        match &session.title {
            Some(title) => debug!(
                "Merged \"{}\" ({}): {} attendees from {}",
                title,
                session.session_date,
                session.attendance_count(),
                session.source.display()
            ),
            None => debug!(
                "Merged {}: {} attendees from {}",
                session.session_date,
                session.attendance_count(),
                session.source.display()
            ),
        }
    }

    fn session_label_reused(&mut self, session: &Session) {
        warn!(
            "Session {} appears in more than one file ({}); attendance is combined",
            session.session_date,
            session.source.display()
        );
    }

    fn file_skipped(&mut self, path: &Path, error: &AttendanceError) {
        warn!("Skipping {}: {}", path.display(), error);
    }

    fn finish(&mut self, summary: &RunSummary) {
        if summary.files_skipped > 0 {
            warn!(
                "{} of {} file(s) skipped",
                summary.files_skipped, summary.files_discovered
            );
        }
        match (&summary.start_date, &summary.end_date) {
            (Some(start), Some(end)) => info!(
                "{} unique emails across {} session(s), from {} to {}",
                summary.unique_emails, summary.sessions, start, end
            ),
            _ => warn!("No sessions found"),
        }
        info!("Attendance written to {}", summary.output_path.display());
    }
}

/// Event log kept by [`RecordingReporter`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportEvent {
    Begin(usize),
    Merged(String),
    Reused(String),
    Skipped(std::path::PathBuf),
    Finish,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub events: Vec<ReportEvent>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn skipped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReportEvent::Skipped(_)))
            .count()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn begin(&mut self, _mode: ParseMode, file_count: usize) {
        self.events.push(ReportEvent::Begin(file_count));
    }

    fn session_merged(&mut self, session: &Session) {
        self.events
            .push(ReportEvent::Merged(session.session_date.clone()));
    }

    fn session_label_reused(&mut self, session: &Session) {
        self.events
            .push(ReportEvent::Reused(session.session_date.clone()));
    }

    fn file_skipped(&mut self, path: &Path, _error: &AttendanceError) {
        self.events.push(ReportEvent::Skipped(path.to_path_buf()));
    }

    fn finish(&mut self, _summary: &RunSummary) {
        self.events.push(ReportEvent::Finish);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
