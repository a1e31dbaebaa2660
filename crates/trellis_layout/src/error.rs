//! Error types for trellis_layout

use thiserror::Error;
use trellis_core::{FieldKind, FieldPath};

/// Errors raised while building a form definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A node descriptor carried a discriminant the compiler does not know
    #[error("Unrecognized layout node: {kind}")]
    UnrecognizedNode { kind: String },

    /// An input is bound to a path that is not a schema leaf
    #[error("Input bound to unknown field: {path}")]
    UnknownField { path: FieldPath },

    /// An input selected a presentation that was never registered
    #[error("Unknown presentation {name:?} for field {path}")]
    UnknownPresentation { name: String, path: FieldPath },

    /// The presentation cannot display the field's kind
    #[error("Presentation {presentation:?} expects {expected} but field {path} is {found}")]
    PresentationMismatch {
        path: FieldPath,
        presentation: String,
        expected: FieldKind,
        found: FieldKind,
    },

    /// Layout configuration could not be parsed
    #[error("Invalid layout config: {0}")]
    Config(String),
}

/// Result type for trellis_layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
