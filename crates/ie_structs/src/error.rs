//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Resource carries a signature or version this library has no layout for
    #[error("unsupported {rtype} resource: signature {signature:?} version {version:?}")]
    UnsupportedVersion {
        /// Resource type extension, e.g. `DLG`
        rtype: String,
        /// Signature bytes as text
        signature: String,
        /// Version bytes as text
        version: String,
    },

    /// A declared offset, count or length does not fit the buffer
    #[error("malformed layout at {offset:#x} ({field}): {detail}")]
    MalformedLayout {
        /// Field whose declared position or extent is broken
        field: String,
        /// Absolute offset of the problem
        offset: usize,
        /// What exactly does not fit
        detail: String,
    },

    /// Numeric fields are stored in 1, 2, 3 or 4 bytes only
    #[error("cannot write a numeric field {0} bytes wide")]
    UnsupportedFieldWidth(usize),

    /// Edit input was not applied; the field keeps its previous value
    #[error("rejected edit: {0}")]
    ValueRejected(String),

    /// Removal target is still referenced by an index field
    #[error("{referrer} still references the entry being removed at index {index}")]
    ReferentialIntegrity {
        /// Name of the referencing field
        referrer: String,
        /// Section index the referrer points at
        index: i64,
    },

    /// No schema is registered for this resource type
    #[error("unknown resource type {0:?}")]
    UnknownResourceType(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
