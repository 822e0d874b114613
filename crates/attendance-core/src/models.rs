use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Selects how each input file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// One email per line, session label taken from the filename.
    #[default]
    Simple,
    /// Exported meeting report with `Title` / `Meeting Start Time` fields.
    Report,
}

impl ParseMode {
    /// Map the `--report` CLI switch onto a mode.
    pub fn from_report_flag(report: bool) -> Self {
        if report {
            Self::Report
        } else {
            Self::Simple
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Report => write!(f, "report"),
        }
    }
}

/// One attendance-taking event, parsed from a single input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Ordered column label: a filename token or `YYYY-MMDD`.
    pub session_date: String,
    /// Canonical, deduplicated, sorted attendee emails.
    pub attendees: Vec<String>,
    /// Meeting title, when the source was a structured report.
    #[serde(default)]
    pub title: Option<String>,
    /// File this session was read from.
    pub source: PathBuf,
}

impl Session {
    pub fn new(session_date: impl Into<String>, attendees: Vec<String>, source: PathBuf) -> Self {
        Self {
            session_date: session_date.into(),
            attendees,
            title: None,
            source,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of attendees recorded for the session.
    pub fn attendance_count(&self) -> usize {
        self.attendees.len()
    }
}
