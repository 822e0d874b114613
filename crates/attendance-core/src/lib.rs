//! Core types for the attendance tracker.
//!
//! Holds the session model, participant identity normalisation, the error
//! taxonomy and the command-line settings shared by the data and binary
//! crates.

pub mod error;
pub mod identity;
pub mod models;
pub mod settings;
