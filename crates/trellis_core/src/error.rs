//! Error types for trellis_core

use thiserror::Error;

use crate::value::FieldKind;

/// Errors raised by value paths and the form store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A dotted path was empty or contained an empty segment
    #[error("Invalid field path: {path:?}")]
    InvalidPath { path: String },

    /// A write tried to descend through a value that is not an object
    #[error("Cannot write {path}: a parent value is not an object")]
    NotAnObject { path: String },

    /// A write targeted a path that is not a leaf of the schema
    #[error("Unknown field: {path}")]
    UnknownField { path: String },

    /// A write carried a value the leaf's kind does not accept
    #[error("Cannot write a {found} value to {expected} field {path}")]
    KindMismatch {
        path: String,
        expected: FieldKind,
        found: &'static str,
    },
}

/// Result type for trellis_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
