//! I/O error types for trajdiff-io.

use std::path::PathBuf;

use trajdiff_dtw::SignalError;
use trajdiff_metrics::{ComparisonError, MetricError, Quantity};

/// Errors from trace loading, manifest parsing and report writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}: {source}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when no header matches any accepted name for a column.
    #[error("missing column in {path}: none of [{aliases}] present")]
    MissingColumn {
        /// Path to the CSV file (or the files searched, comma separated).
        path: PathBuf,
        /// Accepted column names, comma separated.
        aliases: String,
    },

    /// Returned when a column exists but has no rows (for example after an
    /// actor filter removed every row).
    #[error("column \"{column}\" in {path} is empty")]
    EmptyColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Matched column name.
        column: String,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column name.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when timestamps and values of a quantity cannot form a signal.
    #[error("invalid {quantity} signal in {path}: {source}")]
    Signal {
        /// Path to the CSV file.
        path: PathBuf,
        /// Quantity being loaded.
        quantity: Quantity,
        /// Underlying signal error.
        source: SignalError,
    },

    /// Returned when no readable file of a source provides a quantity and at
    /// least one of its files could not be read.
    #[error("no {quantity} column available: {cause}")]
    Unavailable {
        /// Quantity being loaded.
        quantity: Quantity,
        /// Why the unreadable file failed.
        cause: String,
    },

    /// Returned when the source manifest is not valid JSON for the expected schema.
    #[error("cannot parse manifest {path}: {source}")]
    Manifest {
        /// Path to the manifest.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a manifest entry is well-formed JSON but semantically invalid.
    #[error("invalid manifest: {reason}")]
    InvalidManifest {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when a source name is rejected.
    #[error(transparent)]
    Source(#[from] MetricError),

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV result file cannot be written.
    #[error("cannot write CSV {path}: {source}")]
    CsvWrite {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON artifact cannot be serialized.
    #[error("cannot serialize {path}: {source}")]
    Serialize {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl From<IoError> for ComparisonError {
    fn from(err: IoError) -> Self {
        ComparisonError::DataFormat(err.to_string())
    }
}
