//! Exported meeting attendance reports.
//!
//! A report is tab-separated text with a summary block of labelled fields
//! followed by the participant list:
//!
//! ```text
//! Meeting Summary
//! Title	Weekly Cohort Session
//! Meeting Start Time	01/05/2022, 10:00:12 AM
//! ...
//! Full Name	Join Time	Leave Time	Email
//! Alice Example	01/05/2022, 10:00:20 AM	01/05/2022, 11:00:02 AM	alice@x.com
//! ```
//!
//! Only the `Title` and `Meeting Start Time` fields and the email addresses
//! are used; the rest of the layout is ignored.

use std::path::Path;

use attendance_core::error::{AttendanceError, Result};
use attendance_core::identity::{normalize_emails, DedupPolicy};
use attendance_core::models::Session;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use super::SessionParser;

const TITLE_FIELD: &str = "Title";
const START_TIME_FIELD: &str = "Meeting Start Time";

pub struct ReportParser {
    policy: DedupPolicy,
    title_re: Regex,
    start_time_re: Regex,
    email_re: Regex,
}

impl ReportParser {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            title_re: field_regex(TITLE_FIELD),
            start_time_re: field_regex(START_TIME_FIELD),
            email_re: Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}\b")
                .expect("regex is valid"),
        }
    }

    /// Every email-shaped substring of `text`, in order of appearance.
    pub fn extract_emails<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.email_re.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new(DedupPolicy::default())
    }
}

impl SessionParser for ReportParser {
    fn name(&self) -> &'static str {
        "report"
    }

    fn parse_text(&self, path: &Path, text: &str) -> Result<Session> {
        let title = capture_field(&self.title_re, text).ok_or_else(|| {
            AttendanceError::UnrecognizedFormat {
                path: path.to_path_buf(),
                field: TITLE_FIELD,
            }
        })?;

        let start_time = capture_field(&self.start_time_re, text).ok_or_else(|| {
            AttendanceError::UnrecognizedFormat {
                path: path.to_path_buf(),
                field: START_TIME_FIELD,
            }
        })?;

        let session_date =
            parse_start_date(start_time).ok_or_else(|| AttendanceError::MalformedStartTime {
                path: path.to_path_buf(),
                value: start_time.to_string(),
            })?;

        let found = self.extract_emails(text);
        let found_count = found.len();
        let attendees = normalize_emails(found, self.policy);
        debug!(
            "{}: \"{}\" on {}, {} addresses, {} unique attendees",
            path.display(),
            title,
            session_date,
            found_count,
            attendees.len()
        );

        Ok(Session::new(session_date, attendees, path.to_path_buf()).with_title(title))
    }
}

/// Turn a `MM/DD/YYYY, hh:mm AM` start time into the `YYYY-MMDD` session
/// label. Anything after the first comma is ignored.
///
/// Returns `None` when the date part is not a real calendar date.
pub fn parse_start_date(value: &str) -> Option<String> {
    let date_part = value.split(',').next().unwrap_or(value).trim();
    let date = NaiveDate::parse_from_str(date_part, "%m/%d/%Y").ok()?;
    Some(date.format("%Y-%m%d").to_string())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `<label><TAB><value>` at the start of a line.
fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?m)^{}\t([^\r\n]*)", regex::escape(label))).expect("regex is valid")
}

/// The trimmed value of a labelled field, `None` when absent or blank.
fn capture_field<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
