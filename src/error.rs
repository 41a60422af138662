//! Error type shared by the converter, the line counter and the cleaner.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a ratings dataset.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unknown kind of dataset: {0} (expected amazon or googlelocal)")]
    UnsupportedDataset(String),

    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing field '{key}' in record at line {line}")]
    MissingField { line: usize, key: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConvertError {
    /// Wrap an I/O error raised while opening or reading `path`.
    pub fn file_access<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        ConvertError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
