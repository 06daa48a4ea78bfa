//! Error types for the Quarry library.
//!
//! All errors are represented by the [`QuarryError`] enum. Shape and bounds
//! violations (writing a field twice, reading a numeric companion from a
//! non-tuple field, walking a list cursor past its end) have dedicated
//! variants so callers can match on them; everything else carries a message.
//!
//! # Examples
//!
//! ```
//! use quarry::error::{QuarryError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(QuarryError::type_mismatch("field 3 is not a tuple"))
//! }
//!
//! match example_operation() {
//!     Err(QuarryError::TypeMismatch(msg)) => assert!(msg.contains("tuple")),
//!     _ => unreachable!(),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// I/O errors (file storage).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value was read or a match was built with the wrong field shape.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A cursor or element index went past the end of its sequence.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// The destination buffer cannot hold the encoded entry.
    #[error("Capacity exceeded: needed {needed} bytes, buffer holds {available}")]
    CapacityExceeded { needed: usize, available: usize },

    /// The same field was written twice into one entry.
    #[error("Field {0} was already written")]
    FieldAlreadyWritten(u16),

    /// Stored bytes could not be decoded.
    #[error("Corrupted data: {0}")]
    Corrupted(String),

    /// A requested identity or key does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Index-related errors.
    #[error("Index error: {0}")]
    Index(String),

    /// Schema-related errors.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Analysis-related errors.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors.
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with QuarryError.
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Create a new type mismatch error.
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        QuarryError::TypeMismatch(msg.into())
    }

    /// Create a new out of range error.
    pub fn out_of_range<S: Into<String>>(msg: S) -> Self {
        QuarryError::OutOfRange(msg.into())
    }

    /// Create a new corrupted data error.
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        QuarryError::Corrupted(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        QuarryError::NotFound(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        QuarryError::Index(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        QuarryError::Schema(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        QuarryError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        QuarryError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        QuarryError::Storage(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QuarryError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        QuarryError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        QuarryError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
