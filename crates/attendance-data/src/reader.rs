//! Input discovery and text decoding.
//!
//! Resolves the user-supplied path into the list of files to process and
//! reads each one fully into memory, decoding it as UTF-8 or UTF-16.

use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `input` into the files to process.
///
/// * A file is returned as-is, whatever its extension.
/// * A directory yields every `.csv` file directly inside it, sorted by path.
///
/// Fails with [`AttendanceError::InputNotFound`] when `input` is neither, and
/// with [`AttendanceError::NoInputFiles`] for a directory without `.csv` files.
pub fn discover_input_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(AttendanceError::InputNotFound(input.to_path_buf()));
    }

    debug!("Adding all .csv files in {}", input.display());
    let files = find_csv_files(input);
    if files.is_empty() {
        return Err(AttendanceError::NoInputFiles(input.to_path_buf()));
    }
    Ok(files)
}

/// Find the `.csv` files directly inside `dir` (non-recursive), sorted.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_csv_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Directory the input lives in: the input itself when it is a directory,
/// otherwise the parent of the input file.
pub fn input_dir(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.to_path_buf();
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Read `path` fully and decode it with [`decode_text`].
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| AttendanceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    decode_text(&bytes).ok_or_else(|| {
        warn!("Couldn't decode {} as UTF-8 or UTF-16", path.display());
        AttendanceError::FileDecode(path.to_path_buf())
    })
}

/// Decode as UTF-8, falling back to UTF-16.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    decode_utf8(bytes).or_else(|| decode_utf16(bytes))
}

/// Strict UTF-8 decode with the byte-order mark removed.
///
/// Text containing NUL characters is rejected: a BOM-less UTF-16 file of
/// ASCII characters is valid UTF-8 byte-wise but decodes to NUL-interleaved
/// garbage.
pub fn decode_utf8(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).ok()?;
    if text.contains('\0') {
        return None;
    }
    Some(text.to_string())
}

/// UTF-16 decode. The BOM selects the byte order; without one the data is
/// read as little-endian.
pub fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
