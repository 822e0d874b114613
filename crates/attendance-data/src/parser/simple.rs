//! Plain attendance lists: one email per line, no header.
//!
//! The session label comes from the filename, e.g. `2021-01-01_cohort.csv`
//! is the `2021-01-01` session.

use std::path::Path;

use attendance_core::error::{AttendanceError, Result};
use attendance_core::identity::{normalize_emails, DedupPolicy};
use attendance_core::models::Session;
use tracing::debug;

use super::SessionParser;

pub struct SimpleListParser {
    policy: DedupPolicy,
}

impl SimpleListParser {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }
}

impl Default for SimpleListParser {
    fn default() -> Self {
        Self::new(DedupPolicy::default())
    }
}

impl SessionParser for SimpleListParser {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn parse_text(&self, path: &Path, text: &str) -> Result<Session> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut emails: Vec<String> = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let fallback_line = idx as u64 + 1;
            let record = record.map_err(|e| AttendanceError::MalformedRow {
                path: path.to_path_buf(),
                line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

            let values: Vec<&str> = record.iter().filter(|v| !v.is_empty()).collect();
            match values.as_slice() {
                [] => continue,
                [email] if email.contains('@') => emails.push(email.to_string()),
                [other] => {
                    return Err(AttendanceError::MalformedRow {
                        path: path.to_path_buf(),
                        line,
                        reason: format!("{:?} is not an email address", other),
                    })
                }
                many => {
                    return Err(AttendanceError::MalformedRow {
                        path: path.to_path_buf(),
                        line,
                        reason: format!("expected a single column, found {}", many.len()),
                    })
                }
            }
        }

        if emails.is_empty() {
            return Err(AttendanceError::EmptySession(path.to_path_buf()));
        }

        let read = emails.len();
        let attendees = normalize_emails(emails, self.policy);
        debug!(
            "{}: {} rows, {} unique attendees",
            path.display(),
            read,
            attendees.len()
        );

        Ok(Session::new(session_label(path), attendees, path.to_path_buf()))
    }
}

/// The filename up to its first underscore, or the file stem when the name
/// has no underscore or starts with one.
pub fn session_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('_') {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
