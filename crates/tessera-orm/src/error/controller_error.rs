//! Reasons a controller operation is rejected.

use thiserror::Error;

use tessera::TesseraError;
use tessera_core::{FormatError, identifier::Id};

/// Internal failure of a controller operation.
///
/// Every variant is detected before the tree is touched, except
/// [`ControllerError::Model`] which forwards a failure of the object model
/// itself (a locked value, for example).
#[derive(Debug, Error)]
pub(crate) enum ControllerError {
    #[error("document has no ORM design")]
    NoDesign,

    #[error("element `{0}` not found")]
    NotFound(Id),

    #[error("element `{id}` is a {actual}, expected a {expected}")]
    WrongKind {
        id: Id,
        expected: &'static str,
        actual: String,
    },

    #[error("name must not be empty")]
    EmptyName,

    #[error("a {kind} named `{name}` already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} has no property `{property}`")]
    UnknownProperty { kind: String, property: String },

    #[error("a {kind} cannot be moved there")]
    UnsupportedMove { kind: String },

    #[error("property `{0}` is maintained by the designer")]
    ReadOnly(&'static str),

    /// The operation would leave the model inconsistent.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Model(#[from] TesseraError),
}
