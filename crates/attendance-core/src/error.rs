use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the attendance tracker.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// The input path is neither a file nor a directory.
    #[error("Couldn't find a valid file from the path provided: {0}")]
    InputNotFound(PathBuf),

    /// The input directory holds no `.csv` files.
    #[error("No .csv files in {0}")]
    NoInputFiles(PathBuf),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is neither valid UTF-8 nor valid UTF-16.
    #[error("Failed to decode {0} as UTF-8 or UTF-16")]
    FileDecode(PathBuf),

    /// A structured report lacks one of its required labelled fields.
    #[error("Unrecognized report format in {path}: missing `{field}` field")]
    UnrecognizedFormat { path: PathBuf, field: &'static str },

    /// The `Meeting Start Time` field is absent or not a `MM/DD/YYYY` date.
    #[error("Malformed meeting start time in {path}: {value:?}")]
    MalformedStartTime { path: PathBuf, value: String },

    /// A simple attendance list has a row that is not a single email column.
    #[error("Malformed row {line} in {path}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// A simple attendance list contains no emails at all.
    #[error("No attendees found in {0}")]
    EmptySession(PathBuf),

    /// The attendance matrix could not be written.
    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AttendanceError {
    /// Whether this error aborts the whole run.
    ///
    /// Everything that concerns a single input file is recoverable: the file
    /// is skipped and the run continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::FileRead { .. }
                | Self::FileDecode(_)
                | Self::UnrecognizedFormat { .. }
                | Self::MalformedStartTime { .. }
                | Self::MalformedRow { .. }
                | Self::EmptySession(_)
        )
    }
}

/// Convenience alias used throughout the attendance crates.
pub type Result<T> = std::result::Result<T, AttendanceError>;
