//! The validation issue type.

use std::fmt;

use tessera_core::identifier::Id;

use crate::validation::Severity;

/// One observation about a design.
///
/// An issue carries the identity and name of the element it is about, a
/// message, and optionally the offending property and a stable code.
///
/// ```text
/// error[T201]: table name `Users` is used more than once (Users, property Name)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    severity: Severity,
    code: Option<&'static str>,
    element_id: Id,
    element_name: String,
    message: String,
    property: Option<String>,
}

impl ValidationIssue {
    /// Create an error issue.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning issue.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            element_id: Id::EMPTY,
            element_name: String::new(),
            message: message.into(),
            property: None,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    /// Identity of the offending element ([`Id::EMPTY`] for design-level
    /// issues without an element).
    pub fn element_id(&self) -> Id {
        self.element_id
    }

    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Set the issue code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the offending element.
    pub fn with_element(mut self, id: Id, name: impl Into<String>) -> Self {
        self.element_id = id;
        self.element_name = name.into();
        self
    }

    /// Set the offending property.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)?;
        match (&self.element_name, &self.property) {
            (name, Some(property)) if !name.is_empty() => write!(f, " ({name}, property {property})"),
            (name, None) if !name.is_empty() => write!(f, " ({name})"),
            (_, Some(property)) => write!(f, " (property {property})"),
            _ => Ok(()),
        }
    }
}
