//! Error types for catalog construction, encoding and queries.
//!
//! This module provides a unified error type [`SkyError`] that covers the failure
//! modes of the star index: degenerate geometry, values that do not fit their
//! binary field, corrupt or truncated catalog streams, and malformed raw records.
//!
//! # Error Categories
//!
//! | Variant | Use Case | Recoverable? |
//! |---------|----------|--------------|
//! | [`DegenerateVector`](SkyError::DegenerateVector) | Normalizing a zero-length vector | No |
//! | [`EncodingRange`](SkyError::EncodingRange) | Value outside a field's representable range | No |
//! | [`CorruptCatalog`](SkyError::CorruptCatalog) | Truncated stream, bad header, size past EOF | No |
//! | [`MalformedRecord`](SkyError::MalformedRecord) | Unusable raw catalog line | Yes (skip it) |
//! | [`BucketTooDeep`](SkyError::BucketTooDeep) | Insertion deeper than the mesh | No |
//! | [`InvalidParameter`](SkyError::InvalidParameter) | Query parameter out of domain | No |
//! | [`Io`](SkyError::Io) | Underlying file or stream failure | Yes |
//!
//! # Usage
//!
//! Most functions return [`SkyResult<T>`], which is `Result<T, SkyError>`.
//! Use the constructor methods for consistent error creation:
//!
//! ```
//! use skyview_core::SkyError;
//!
//! fn check_width(length: usize) -> Result<(), SkyError> {
//!     if length == 0 || length > 8 {
//!         return Err(SkyError::encoding_range(length as f64, length, "field width"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for the star index.
#[derive(Error, Debug)]
pub enum SkyError {
    /// Attempted to normalize a vector of zero length.
    #[error("Degenerate vector in {operation}: cannot normalize a zero-length vector")]
    DegenerateVector { operation: String },

    /// Value cannot be represented in the target field.
    #[error("Encoding range error: {value} does not fit a {width}-byte {mode} field")]
    EncodingRange {
        value: f64,
        width: usize,
        mode: String,
    },

    /// Catalog stream ended early or contains inconsistent structure.
    #[error("Corrupt catalog while reading {field}: {message}")]
    CorruptCatalog { field: String, message: String },

    /// Raw ingestion record that cannot be turned into a star.
    ///
    /// Ingestion skips these and continues.
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    /// Insertion requested a bucket below the deepest mesh level.
    #[error("Bucket level {bucket_level} exceeds catalog depth {max_level}")]
    BucketTooDeep { bucket_level: u8, max_level: u8 },

    /// Query or build parameter outside its valid domain.
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Underlying I/O failure that is not a truncation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, SkyError>`.
pub type SkyResult<T> = Result<T, SkyError>;

impl SkyError {
    /// Creates a [`DegenerateVector`](Self::DegenerateVector) error.
    pub fn degenerate_vector(operation: &str) -> Self {
        Self::DegenerateVector {
            operation: operation.to_string(),
        }
    }

    /// Creates an [`EncodingRange`](Self::EncodingRange) error.
    pub fn encoding_range(value: f64, width: usize, mode: &str) -> Self {
        Self::EncodingRange {
            value,
            width,
            mode: mode.to_string(),
        }
    }

    /// Creates a [`CorruptCatalog`](Self::CorruptCatalog) error.
    pub fn corrupt_catalog(field: &str, reason: &str) -> Self {
        Self::CorruptCatalog {
            field: field.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`MalformedRecord`](Self::MalformedRecord) error.
    pub fn malformed_record(line: usize, reason: &str) -> Self {
        Self::MalformedRecord {
            line,
            message: reason.to_string(),
        }
    }

    /// Creates an [`InvalidParameter`](Self::InvalidParameter) error.
    pub fn invalid_parameter(name: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            message: reason.to_string(),
        }
    }

    /// Maps a read failure on `field` to the catalog taxonomy.
    ///
    /// Running out of bytes means the catalog is corrupt; anything else is
    /// passed through as [`Io`](Self::Io).
    pub fn from_read(err: std::io::Error, field: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::corrupt_catalog(field, "stream ended before the field was complete")
        } else {
            Self::Io(err)
        }
    }

    /// Returns `true` if skipping the offending input or retrying might succeed.
    ///
    /// Malformed records are skipped by ingestion; I/O failures may be retried
    /// by the caller. Everything else indicates a bug or a corrupt file.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MalformedRecord { .. } | Self::Io(_) => true,
            _ => false,
        }
    }
}
