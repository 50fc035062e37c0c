//! Error types for the eqconvert library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while locating, converting or deleting statements.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read, write or delete operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading the CSV export.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing the OFX document.
    #[error("XML serialization error: {0}")]
    Xml(String),

    /// The account number could not be read from the file name.
    #[error("Could not detect account number from csv file name: {}", file.display())]
    InvalidAccountNumber { file: PathBuf },

    /// Invalid date format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid amount format.
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Missing required column.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Unsupported OFX version requested.
    #[error("Invalid OFX version: {0}")]
    InvalidOfxVersion(String),

    /// Neither a Downloads folder nor a home directory could be found.
    #[error("Could not determine a default search directory")]
    NoDefaultDirectory,
}
