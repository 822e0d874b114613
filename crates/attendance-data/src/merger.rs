//! Attendance matrix accumulation.
//!
//! Sessions are folded one at a time into an [`AttendanceTable`]. The table
//! keeps only the cells where someone was present; every other
//! (email, session) cell reads as absent. The dense matrix is built once, at
//! export time, by [`AttendanceTable::rows`].

use std::collections::{BTreeMap, BTreeSet};

use attendance_core::models::Session;

// ── AttendanceRow ─────────────────────────────────────────────────────────────

/// One materialised row of the attendance matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRow {
    pub email: String,
    /// Presence per session, in ascending session order.
    pub presence: Vec<bool>,
}

impl AttendanceRow {
    /// Number of sessions attended.
    pub fn attended(&self) -> usize {
        self.presence.iter().filter(|p| **p).count()
    }
}

// ── AttendanceTable ───────────────────────────────────────────────────────────

/// Email → sessions attended, plus the set of every session merged so far.
///
/// Merging is an OR over presence, so the result does not depend on the order
/// sessions arrive in and re-merging a session changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceTable {
    sessions: BTreeSet<String>,
    attended: BTreeMap<String, BTreeSet<String>>,
}

impl AttendanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every session into a fresh table.
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut table = Self::new();
        for session in sessions {
            table.merge_session(session);
        }
        table
    }

    /// Add a session column and mark each attendee present in it.
    ///
    /// The column is added even when the session has no attendees.
    pub fn merge_session(&mut self, session: &Session) {
        self.sessions.insert(session.session_date.clone());
        for email in &session.attendees {
            self.record(email, &session.session_date, true);
        }
    }

    /// OR another table into this one.
    pub fn merge_table(&mut self, other: &AttendanceTable) {
        self.sessions.extend(other.sessions.iter().cloned());
        for (email, dates) in &other.attended {
            self.attended
                .entry(email.clone())
                .or_default()
                .extend(dates.iter().cloned());
        }
    }

    /// Record a single cell. `present == false` only registers the row and
    /// the column: it never clears a `true` already recorded.
    pub fn record(&mut self, email: &str, session_date: &str, present: bool) {
        if !self.sessions.contains(session_date) {
            self.sessions.insert(session_date.to_string());
        }
        let dates = self.attended.entry(email.to_string()).or_default();
        if present {
            dates.insert(session_date.to_string());
        }
    }

    pub fn is_present(&self, email: &str, session_date: &str) -> bool {
        self.attended
            .get(email)
            .map(|dates| dates.contains(session_date))
            .unwrap_or(false)
    }

    /// Session labels in ascending order.
    pub fn session_dates(&self) -> impl Iterator<Item = &str> {
        self.sessions.iter().map(String::as_str)
    }

    /// Emails in ascending order.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.attended.keys().map(String::as_str)
    }

    pub fn has_session(&self, session_date: &str) -> bool {
        self.sessions.contains(session_date)
    }

    /// `(first, last)` session label, or `None` when nothing was merged.
    pub fn date_range(&self) -> Option<(&str, &str)> {
        let first = self.sessions.first()?;
        let last = self.sessions.last()?;
        Some((first.as_str(), last.as_str()))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn email_count(&self) -> usize {
        self.attended.len()
    }

    /// `true` when no session has been merged.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The dense matrix: one row per email, one cell per session.
    pub fn rows(&self) -> Vec<AttendanceRow> {
        self.attended
            .iter()
            .map(|(email, dates)| AttendanceRow {
                email: email.clone(),
                presence: self.sessions.iter().map(|s| dates.contains(s)).collect(),
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
