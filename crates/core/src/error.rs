use std::path::PathBuf;

use thiserror::Error;

/// Malformed sales CSV.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Required header is absent.
    #[error("missing required column '{column}' (expected header: Year,Make,Model,Quantity,Region,Price)")]
    MissingColumn { column: String },
    /// Numeric field does not parse.
    #[error("line {line}: cannot parse {column} '{value}'")]
    InvalidNumber { line: u64, column: String, value: String },
    /// Quantity or price below zero.
    #[error("line {line}: {column} must not be negative (got '{value}')")]
    Negative { line: u64, column: String, value: String },
    /// Value is valid on its own but the file's totals no longer fit in 64 bits.
    #[error("line {line}: {column} '{value}' pushes the file totals out of range")]
    OutOfRange { line: u64, column: String, value: String },
    /// Underlying CSV reader error (unbalanced quotes, ragged rows, bad UTF-8).
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Failure loading a sales file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FormatError),
}
