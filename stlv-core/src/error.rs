/// Error taxonomy for loading and preparing a model for display
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure here is terminal for a viewer run.
#[derive(Debug, Error)]
pub enum Error {
    /// The model file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The declared triangle count needs more bytes than the source holds.
    #[error("truncated STL file: expected {expected} bytes, got {actual}")]
    TruncatedFile {
        /// Bytes implied by the header and triangle count.
        expected: u64,
        /// Bytes actually available.
        actual: u64,
    },

    /// The mesh has no triangles, so it has no bounding box.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A bed dimension argument is not a finite number.
    #[error("invalid bed dimension: {value:?}")]
    InvalidBedDimension {
        /// The offending argument.
        value: String,
    },

    /// More view arguments were given than the command surface accepts.
    #[error("expected at most 3 arguments after the file name, got {count}")]
    UnexpectedArguments {
        /// Number of view arguments received.
        count: usize,
    },
}
