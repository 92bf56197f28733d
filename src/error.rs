//! Error types for the putaway crate.
//!
//! Rule evaluation never fails with an error: a putaway that finds no
//! location is a normal, traced outcome. These errors cover the I/O and
//! editing seams around the engine (repositories, rule-set edits, defect
//! sinks).

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias for fallible crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the pure evaluation path.
#[derive(Debug, Error)]
pub enum Error {
    /// File access failed (JSON repository).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A rule set or record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Defect CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A rule set failed authoring validation.
    #[error("Invalid rule set: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidRuleSet(Vec<ValidationError>),

    /// No rule with the given ID exists.
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// A reorder/move referenced a position outside the preference list.
    #[error("Index {index} out of range for {len} preference(s)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// The defect sink rejected a record.
    #[error("Defect sink error: {0}")]
    DefectSink(String),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("none")
}
