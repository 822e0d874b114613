//! Data layer of the attendance tracker.
//!
//! Discovers and decodes input files, parses them into sessions, merges the
//! sessions into an attendance matrix and exports it as CSV.

pub mod export;
pub mod merger;
pub mod parser;
pub mod pipeline;
pub mod reader;
pub mod reporter;
