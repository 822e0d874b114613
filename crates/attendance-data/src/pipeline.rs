//! End-to-end attendance consolidation.
//!
//! 1. Discover the input files.
//! 2. Parse each one into a [`Session`] with the parser for the run's mode.
//! 3. Merge every parsed session into one [`AttendanceTable`].
//! 4. Export the table and summarise the run.
//!
//! A file that fails to parse is reported and skipped; only unusable input
//! (no file at all) or a failed export ends the run with an error.

use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use attendance_core::identity::DedupPolicy;
use attendance_core::models::{ParseMode, Session};
use serde::Serialize;

use crate::export::{export_table, results_dir};
use crate::merger::AttendanceTable;
use crate::parser::{parser_for, SessionParser};
use crate::reader::discover_input_files;
use crate::reporter::Reporter;

// ── Public types ──────────────────────────────────────────────────────────────

/// Options for one [`run_attendance`] call.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: ParseMode,
    pub dedup: DedupPolicy,
    /// Overrides `<input dir>/results`.
    pub output_dir: Option<PathBuf>,
}

/// A file that could not be turned into a session.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: AttendanceError,
}

/// Result of merging a batch of files.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub table: AttendanceTable,
    pub sessions_merged: usize,
    pub skipped: Vec<SkippedFile>,
}

/// What a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub mode: ParseMode,
    pub dedup: DedupPolicy,
    pub files_discovered: usize,
    pub sessions_merged: usize,
    pub files_skipped: usize,
    /// Distinct session columns in the output.
    pub sessions: usize,
    pub unique_emails: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub output_path: PathBuf,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Parses files with a single layout and folds them into a table.
pub struct Pipeline {
    parser: Box<dyn SessionParser>,
}

impl Pipeline {
    pub fn new(mode: ParseMode, dedup: DedupPolicy) -> Self {
        Self {
            parser: parser_for(mode, dedup),
        }
    }

    pub fn parse_file(&self, path: &Path) -> Result<Session> {
        self.parser.parse_file(path)
    }

    /// Parse and merge every file. Failures are collected, never returned.
    pub fn run(&self, files: &[PathBuf], reporter: &mut dyn Reporter) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();

        for path in files {
            match self.parse_file(path) {
                Ok(session) => {
                    if outcome.table.has_session(&session.session_date) {
                        reporter.session_label_reused(&session);
                    }
                    outcome.table.merge_session(&session);
                    outcome.sessions_merged += 1;
                    reporter.session_merged(&session);
                }
                Err(error) => {
                    reporter.file_skipped(path, &error);
                    outcome.skipped.push(SkippedFile {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        outcome
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the whole consolidation for `input` (a file or a directory).
///
/// Returns the summary together with the merged table.
pub fn run_attendance(
    input: &Path,
    options: &RunOptions,
    reporter: &mut dyn Reporter,
) -> Result<(RunSummary, AttendanceTable)> {
    let files = discover_input_files(input)?;
    reporter.begin(options.mode, files.len());

    let pipeline = Pipeline::new(options.mode, options.dedup);
    let outcome = pipeline.run(&files, reporter);

    let out_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| results_dir(input));
    let output_path = export_table(&outcome.table, &out_dir)?;

    let (start_date, end_date) = match outcome.table.date_range() {
        Some((start, end)) => (Some(start.to_string()), Some(end.to_string())),
        None => (None, None),
    };
    let summary = RunSummary {
        input: input.to_path_buf(),
        mode: options.mode,
        dedup: options.dedup,
        files_discovered: files.len(),
        sessions_merged: outcome.sessions_merged,
        files_skipped: outcome.skipped.len(),
        sessions: outcome.table.session_count(),
        unique_emails: outcome.table.email_count(),
        start_date,
        end_date,
        output_path,
    };

    reporter.finish(&summary);
    Ok((summary, outcome.table))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{RecordingReporter, ReportEvent};
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn utf16le_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    fn report(title: Option<&str>, start: &str, emails: &str) -> String {
        let mut text = String::from("Meeting Summary\n");
        if let Some(title) = title {
            text.push_str(&format!("Title\t{}\n", title));
        }
        text.push_str(&format!("Meeting Start Time\t{}\n\n", start));
        text.push_str(emails);
        text.push('\n');
        text
    }

    fn run(input: &Path, options: &RunOptions) -> (RunSummary, AttendanceTable, RecordingReporter) {
        let mut reporter = RecordingReporter::default();
        let (summary, table) = run_attendance(input, options, &mut reporter).unwrap();
        (summary, table, reporter)
    }

    fn simple() -> RunOptions {
        RunOptions::default()
    }

    fn reports() -> RunOptions {
        RunOptions {
            mode: ParseMode::Report,
            ..RunOptions::default()
        }
    }

    // ── simple mode ───────────────────────────────────────────────────────────

    #[test]
    fn test_simple_two_session_scenario() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "2021-01-01_a.csv", "a@x.com\nb@x.com\n");
        write(dir.path(), "2021-01-02_a.csv", "b@x.com\n");

        let (summary, _, _) = run(dir.path(), &simple());

        let expected = dir
            .path()
            .join("results")
            .join("attendance_from_2021-01-01_to_2021-01-02.csv");
        assert_eq!(summary.output_path, expected);
        assert_eq!(
            std::fs::read_to_string(&expected).unwrap(),
            "Email,2021-01-01,2021-01-02\na@x.com,True,False\nb@x.com,True,True\n"
        );
        assert_eq!(summary.unique_emails, 2);
        assert_eq!(summary.start_date.as_deref(), Some("2021-01-01"));
        assert_eq!(summary.end_date.as_deref(), Some("2021-01-02"));
    }

    #[test]
    fn test_case_variants_merge_into_one_row_across_sessions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "Alice@X.com\n");
        write(dir.path(), "d2_a.csv", "alice@x.com\n");

        let (_, table, _) = run(dir.path(), &simple());

        assert_eq!(table.emails().collect::<Vec<_>>(), vec!["alice@x.com"]);
        assert_eq!(table.rows()[0].presence, vec![true, true]);
    }

    #[test]
    fn test_prefix_local_parts_both_kept() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "alice@x.com\nal@x.com\n");

        let (_, table, _) = run(dir.path(), &simple());
        assert_eq!(
            table.emails().collect::<Vec<_>>(),
            vec!["al@x.com", "alice@x.com"]
        );
    }

    #[test]
    fn test_legacy_dedup_drops_contained_local_part() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "alice@x.com\nlice@x.com\n");
        let options = RunOptions {
            dedup: DedupPolicy::Legacy,
            ..RunOptions::default()
        };

        let (_, table, _) = run(dir.path(), &options);
        assert_eq!(table.emails().collect::<Vec<_>>(), vec!["alice@x.com"]);
    }

    #[test]
    fn test_bad_simple_file_is_skipped_and_run_continues() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "a@x.com\n");
        let bad = write(dir.path(), "d2_a.csv", "a@x.com,b@x.com\n");

        let (summary, table, reporter) = run(dir.path(), &simple());

        assert_eq!(summary.files_discovered, 2);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(table.session_dates().collect::<Vec<_>>(), vec!["d1"]);
        assert!(reporter.events.contains(&ReportEvent::Skipped(bad)));
    }

    #[test]
    fn test_single_file_input_writes_next_to_it() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "2021-1102_Cohort_1.csv", "a@x.com\n");

        let (summary, _, _) = run(&file, &simple());
        assert_eq!(
            summary.output_path,
            dir.path()
                .join("results")
                .join("attendance_from_2021-1102_to_2021-1102.csv")
        );
    }

    #[test]
    fn test_output_dir_override() {
        let dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "a@x.com\n");
        let options = RunOptions {
            output_dir: Some(out.path().to_path_buf()),
            ..RunOptions::default()
        };

        let (summary, _, _) = run(dir.path(), &options);
        assert_eq!(summary.output_path, out.path().join("attendance_from_d1_to_d1.csv"));
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn test_reused_session_label_is_reported_and_combined() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_morning.csv", "a@x.com\n");
        write(dir.path(), "d1_evening.csv", "b@x.com\n");

        let (summary, table, reporter) = run(dir.path(), &simple());

        assert_eq!(summary.sessions_merged, 2);
        assert_eq!(summary.sessions, 1);
        assert!(table.is_present("a@x.com", "d1"));
        assert!(table.is_present("b@x.com", "d1"));
        assert!(reporter.events.contains(&ReportEvent::Reused("d1".to_string())));
    }

    // ── report mode ───────────────────────────────────────────────────────────

    #[test]
    fn test_report_mode_session_date_and_attendees() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "meeting.csv",
            &report(
                Some("Session A"),
                "01/05/2022, 10:00 AM",
                "attendee1@x.com attendee2@y.com",
            ),
        );

        let (summary, table, _) = run(dir.path(), &reports());

        assert_eq!(table.session_dates().collect::<Vec<_>>(), vec!["2022-0105"]);
        assert_eq!(
            table.emails().collect::<Vec<_>>(),
            vec!["attendee1@x.com", "attendee2@y.com"]
        );
        assert_eq!(
            summary.output_path.file_name().unwrap(),
            "attendance_from_2022-0105_to_2022-0105.csv"
        );
    }

    #[test]
    fn test_report_without_title_is_skipped() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a.csv",
            &report(Some("Session A"), "01/05/2022, 10:00 AM", "a@x.com"),
        );
        let untitled = write(
            dir.path(),
            "b.csv",
            &report(None, "01/12/2022, 10:00 AM", "b@x.com"),
        );

        let (summary, table, reporter) = run(dir.path(), &reports());

        assert_eq!(table.session_dates().collect::<Vec<_>>(), vec!["2022-0105"]);
        assert!(!table.emails().any(|e| e == "b@x.com"));
        assert_eq!(summary.files_skipped, 1);
        assert!(reporter.events.contains(&ReportEvent::Skipped(untitled)));
    }

    #[test]
    fn test_utf16_report_is_decoded() {
        let dir = TempDir::new().unwrap();
        let text = report(Some("Session B"), "02/01/2022, 9:00 AM", "c@x.com");
        std::fs::write(dir.path().join("teams.csv"), utf16le_with_bom(&text)).unwrap();

        let (summary, table, _) = run(dir.path(), &reports());

        assert_eq!(summary.files_skipped, 0);
        assert!(table.is_present("c@x.com", "2022-0201"));
    }

    #[test]
    fn test_reports_merge_chronologically() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "z.csv",
            &report(Some("S1"), "01/05/2022, 10:00 AM", "a@x.com b@x.com"),
        );
        write(
            dir.path(),
            "a.csv",
            &report(Some("S3"), "03/01/2022, 10:00 AM", "a@x.com"),
        );
        write(
            dir.path(),
            "m.csv",
            &report(Some("S2"), "02/10/2022, 10:00 AM", "b@x.com"),
        );

        let (_, table, _) = run(dir.path(), &reports());

        assert_eq!(
            table.session_dates().collect::<Vec<_>>(),
            vec!["2022-0105", "2022-0210", "2022-0301"]
        );
        let rows = table.rows();
        assert_eq!(rows[0].presence, vec![true, false, true]);
        assert_eq!(rows[1].presence, vec![true, true, false]);
    }

    // ── lifecycle and failure modes ───────────────────────────────────────────

    #[test]
    fn test_reporter_lifecycle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "a@x.com\n");
        write(dir.path(), "d2_a.csv", "\n");

        let (_, _, reporter) = run(dir.path(), &simple());

        assert_eq!(reporter.events.first(), Some(&ReportEvent::Begin(2)));
        assert_eq!(reporter.events.last(), Some(&ReportEvent::Finish));
        assert_eq!(reporter.skipped(), 1);
    }

    #[test]
    fn test_all_files_failing_still_exports_empty_matrix() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "not an email\n");

        let (summary, table, _) = run(dir.path(), &simple());

        assert!(table.is_empty());
        assert_eq!(summary.files_skipped, 1);
        assert!(summary.start_date.is_none());
        assert_eq!(
            std::fs::read_to_string(&summary.output_path).unwrap(),
            "Email\n"
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let mut reporter = RecordingReporter::default();
        let err = run_attendance(
            Path::new("/tmp/does-not-exist-attendance-xyz"),
            &simple(),
            &mut reporter,
        )
        .unwrap_err();

        assert!(err.is_fatal());
        assert!(reporter.events.is_empty());
    }

    #[test]
    fn test_directory_without_csv_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "a@x.com\n");

        let mut reporter = RecordingReporter::default();
        let err = run_attendance(dir.path(), &simple(), &mut reporter).unwrap_err();
        assert!(matches!(err, AttendanceError::NoInputFiles(_)));
    }

    // ── properties ────────────────────────────────────────────────────────────

    #[test]
    fn test_file_order_does_not_change_the_table() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(dir.path(), "d1_a.csv", "a@x.com\nb@x.com\n"),
            write(dir.path(), "d2_a.csv", "b@x.com\nc@x.com\n"),
            write(dir.path(), "d3_a.csv", "a@x.com\n"),
        ];
        let pipeline = Pipeline::new(ParseMode::Simple, DedupPolicy::LocalPart);

        let forward = pipeline.run(&files, &mut RecordingReporter::default());
        let reversed: Vec<PathBuf> = files.iter().rev().cloned().collect();
        let backward = pipeline.run(&reversed, &mut RecordingReporter::default());

        assert_eq!(forward.table, backward.table);
    }

    #[test]
    fn test_same_file_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "d1_a.csv", "a@x.com\nb@x.com\n");
        let pipeline = Pipeline::new(ParseMode::Simple, DedupPolicy::LocalPart);

        let once = pipeline.run(std::slice::from_ref(&file), &mut RecordingReporter::default());
        let twice = pipeline.run(&[file.clone(), file], &mut RecordingReporter::default());

        assert_eq!(once.table, twice.table);
    }

    #[test]
    fn test_export_round_trips_through_simple_mode() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "2021-01-01_a.csv", "a@x.com\nb@x.com\n");
        write(dir.path(), "2021-01-02_a.csv", "b@x.com\nc@y.com\n");
        write(dir.path(), "2021-01-03_a.csv", "a@x.com\nc@y.com\n");
        let (summary, original, _) = run(dir.path(), &simple());

        // Split the exported matrix back into one simple list per column.
        let replay = TempDir::new().unwrap();
        let mut reader = csv::Reader::from_path(&summary.output_path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        for (col, date) in header.iter().enumerate().skip(1) {
            let present: Vec<&str> = rows
                .iter()
                .filter(|r| &r[col] == "True")
                .map(|r| &r[0])
                .collect();
            write(
                replay.path(),
                &format!("{}_replay.csv", date),
                &present.join("\n"),
            );
        }

        let (_, replayed, _) = run(replay.path(), &simple());
        assert_eq!(replayed, original);
    }

    #[test]
    fn test_summary_serializes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "d1_a.csv", "a@x.com\n");

        let (summary, _, _) = run(dir.path(), &simple());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["mode"], "simple");
        assert_eq!(json["dedup"], "local-part");
        assert_eq!(json["unique_emails"], 1);
        assert_eq!(json["start_date"], "d1");
    }
}
