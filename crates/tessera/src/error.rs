//! Error types for Tessera model operations.
//!
//! This module provides the main error type [`TesseraError`] which wraps the
//! failures that can occur while mutating, reading, or writing a model.

use std::{fmt, io};

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use tessera_core::{FormatError, identifier::Id, value::ValueType};

/// The main error type for Tessera operations.
///
/// Deserialization stops at the first failure: a load that returns one of
/// these never leaves a partially reconstructed tree behind.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] fmt::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] AttrError),

    /// The input is well-formed XML but not a well-formed document.
    #[error("Malformed document: {0}")]
    Structure(String),

    #[error("Element `{0}` not found")]
    NotFound(Id),

    /// A write to a property whose stored value is locked.
    #[error("Property `{property}` is locked")]
    Locked { property: String },

    #[error("Property `{property}` expects a {expected} value, got {actual}")]
    TypeMismatch {
        property: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// An operation that would break tree ownership.
    #[error("Tree error: {0}")]
    Tree(String),
}

impl TesseraError {
    /// Create a new `Structure` error.
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}
