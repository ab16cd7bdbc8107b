//! Core error types for paleotag-core.
//!
//! This module defines the error hierarchy using thiserror. The shape engine
//! raises [`ShapeError`]; malformed input of any kind is a [`ValidationError`];
//! configuration and archive persistence have their own enums. Everything
//! folds into [`CoreError`] for callers that do not care about the source.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for paleotag-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Event-shape engine errors
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Archive record errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the resampler, fit engine and reconstructor.
///
/// None of these are retried: the caller is expected to correct its input
/// and call again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Fewer than two distinct time points to interpolate between
    #[error("Insufficient data: need at least 2 distinct time points, got {points}")]
    InsufficientData { points: usize },

    /// A breakpoint time that is not an exact entry of the time axis
    #[error("Time {time} for '{name}' is not on the time axis (was the series resampled?)")]
    MisalignedTime { name: String, time: f64 },

    /// A segment whose end index does not lie after its start index
    #[error("Degenerate segment '{name}': ends at index {end} but starts at index {start}")]
    DegenerateSegment {
        name: String,
        start: usize,
        end: usize,
    },

    /// The event start is not present on the reconstruction axis
    #[error("Event start {time} is outside the supplied time axis")]
    OutOfRange { time: f64 },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Time and value arrays differ in length
    #[error("Length mismatch: {times} times but {values} values")]
    LengthMismatch { times: usize, values: usize },

    /// Time axis is not strictly increasing
    #[error("Time axis is not strictly increasing at index {index} ({prev} then {next})")]
    NonMonotonicTime { index: usize, prev: f64, next: f64 },

    /// NaN or infinite sample
    #[error("Non-finite {field} at index {index}")]
    NonFinite { field: String, index: usize },

    /// Resampling step is not usable
    #[error("Invalid resampling step {step}: must be finite and greater than zero")]
    InvalidStep { step: f64 },

    /// Unrecognised time unit label
    #[error("Unknown time unit '{0}'")]
    UnknownTimeUnit(String),

    /// Breakpoint with only one of time/amplitude supplied
    #[error("Breakpoint '{name}' has {present} but no {missing}")]
    IncompleteBreakpoint {
        name: String,
        present: String,
        missing: String,
    },

    /// Two breakpoints sharing a name
    #[error("Duplicate breakpoint name '{0}'")]
    DuplicateBreakpoint(String),

    /// A stats record that cannot be interpreted
    #[error("Malformed stats record: {0}")]
    MalformedStats(String),

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Archive record errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchiveError {
    /// Column index does not exist
    #[error("No column at index {index} (record has {len} columns)")]
    NoSuchColumn { index: usize, len: usize },

    /// Same column chosen for time and value
    #[error("Time and value columns are identical (index {0})")]
    SameColumn(usize),

    /// Column holds something other than numbers
    #[error("Column '{column}' has a non-numeric value at row {row}")]
    NonNumeric { column: String, row: usize },

    /// Label array length differs from the record's data columns
    #[error("Label array for '{event}' has {got} entries, expected {expected}")]
    LabelLength {
        event: String,
        got: usize,
        expected: usize,
    },

    /// Structural check failed
    #[error("Record failed validation: {0}")]
    Invalid(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_error_messages_name_the_offender() {
        let err = ShapeError::MisalignedTime {
            name: "second".into(),
            time: 12.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("second"));
        assert!(msg.contains("12.5"));
    }

    #[test]
    fn shape_error_converts_into_core_error() {
        let core: CoreError = ShapeError::OutOfRange { time: 3.0 }.into();
        assert!(matches!(core, CoreError::Shape(ShapeError::OutOfRange { .. })));
        assert!(core.to_string().starts_with("Shape error:"));
    }
}
