//! Error types for rescleaner library.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for rescleaner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rescleaner library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist or is not a regular file.
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// None of the candidate encodings could decode the input.
    #[error("Failed to read CSV with supported encodings: {}", .0.join(", "))]
    UnreadableEncoding(Vec<String>),

    /// The input had no usable rows after structural cleanup.
    #[error("No valid data rows found in CSV input")]
    NoData,

    /// Required columns are absent from the header.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Empty or absent text was passed where content is required.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed CSV structure.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Face-mark configuration could not be used.
    #[error("Face-mark config error: {0}")]
    FaceMarkConfig(String),

    /// A face-mark pattern failed to compile.
    #[error("Invalid face-mark pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// ZIP archive writing error.
    #[error("ZIP archive error: {0}")]
    Archive(String),

    /// A run did not finish before its deadline.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other internal fault.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Returns true for conditions caused by the input data rather than the
    /// environment (missing columns, no rows, undecodable bytes).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoData
                | Error::MissingColumns(_)
                | Error::UnreadableEncoding(_)
                | Error::InvalidInput(_)
                | Error::Csv(_)
        )
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Error::Csv(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            kind => Error::Csv(format!("{:?}", kind)),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::FaceMarkConfig(err.to_string())
    }
}
