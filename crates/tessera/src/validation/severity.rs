//! Severity levels for validation issues.

use std::fmt;

/// The severity level of a validation issue.
///
/// - [`Severity::Error`] marks a design that is broken and must be fixed
/// - [`Severity::Warning`] marks something legal but probably unintended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The design is invalid.
    Error,

    /// The design is valid but suspicious (an empty design, a table that
    /// references itself).
    Warning,
}

impl Severity {
    /// Returns `true` if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns `true` if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display_and_flags() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert!(Severity::Error.is_error());
        assert!(Severity::Warning.is_warning());
        assert!(!Severity::Warning.is_error());
    }
}
