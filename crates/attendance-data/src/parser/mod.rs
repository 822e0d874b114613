//! Session parsers.
//!
//! Each input layout implements [`SessionParser`]; the pipeline picks one per
//! run from the [`ParseMode`].

mod report;
mod simple;

pub use report::{parse_start_date, ReportParser};
pub use simple::{session_label, SimpleListParser};

use std::path::Path;

use attendance_core::error::Result;
use attendance_core::identity::DedupPolicy;
use attendance_core::models::{ParseMode, Session};

use crate::reader::read_text;

/// Trait for attendance file layouts.
pub trait SessionParser {
    /// Layout identifier (e.g. "simple", "report").
    fn name(&self) -> &'static str;

    /// Build a session from already-decoded file content.
    fn parse_text(&self, path: &Path, text: &str) -> Result<Session>;

    /// Read, decode and parse one file.
    fn parse_file(&self, path: &Path) -> Result<Session> {
        let text = read_text(path)?;
        self.parse_text(path, &text)
    }
}

/// Parser for `mode`, deduplicating attendees with `policy`.
pub fn parser_for(mode: ParseMode, policy: DedupPolicy) -> Box<dyn SessionParser> {
    match mode {
        ParseMode::Simple => Box::new(SimpleListParser::new(policy)),
        ParseMode::Report => Box::new(ReportParser::new(policy)),
    }
}
