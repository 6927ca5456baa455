//! Error codes for ORM validation issues.
//!
//! Codes are organized by subject:
//! - `T1xx` - Design
//! - `T2xx` - Naming
//! - `T3xx` - Keys
//! - `T4xx` - References

use std::fmt;

/// Codes attached to [`tessera::validation::ValidationIssue`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Design (T1xx)
    // =========================================================================
    /// Empty design.
    ///
    /// The design contains no tables.
    T100,

    // =========================================================================
    // Naming (T2xx)
    // =========================================================================
    /// Empty table name.
    T200,

    /// Duplicate table name.
    ///
    /// Table names are compared case-insensitively: `Users` and `users`
    /// collide.
    T201,

    /// Empty field name.
    T202,

    /// Duplicate field name within one table.
    T203,

    // =========================================================================
    // Keys (T3xx)
    // =========================================================================
    /// Table without a primary key.
    T300,

    // =========================================================================
    // References (T4xx)
    // =========================================================================
    /// Reference endpoint not set.
    ///
    /// A reference has no source or no target table.
    T400,

    /// Unresolved reference endpoint.
    ///
    /// The source or target identifier names no element in the document.
    T401,

    /// Reference endpoint is not a table.
    T402,

    /// Self-reference.
    ///
    /// Source and target are the same table. Legal, but usually a mistake.
    T403,

    /// Unresolved field link.
    ///
    /// A reference's source or target field list names a missing element.
    T404,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "T201").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Design
            ErrorCode::T100 => "T100",
            // Naming
            ErrorCode::T200 => "T200",
            ErrorCode::T201 => "T201",
            ErrorCode::T202 => "T202",
            ErrorCode::T203 => "T203",
            // Keys
            ErrorCode::T300 => "T300",
            // References
            ErrorCode::T400 => "T400",
            ErrorCode::T401 => "T401",
            ErrorCode::T402 => "T402",
            ErrorCode::T403 => "T403",
            ErrorCode::T404 => "T404",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::T100 => "empty design",
            ErrorCode::T200 => "empty table name",
            ErrorCode::T201 => "duplicate table name",
            ErrorCode::T202 => "empty field name",
            ErrorCode::T203 => "duplicate field name",
            ErrorCode::T300 => "missing primary key",
            ErrorCode::T400 => "reference endpoint not set",
            ErrorCode::T401 => "unresolved reference endpoint",
            ErrorCode::T402 => "reference endpoint is not a table",
            ErrorCode::T403 => "self-reference",
            ErrorCode::T404 => "unresolved field link",
        }
    }

    /// Looks up a code by its string form.
    pub fn from_code(code: &str) -> Option<Self> {
        const ALL: [ErrorCode; 11] = [
            ErrorCode::T100,
            ErrorCode::T200,
            ErrorCode::T201,
            ErrorCode::T202,
            ErrorCode::T203,
            ErrorCode::T300,
            ErrorCode::T400,
            ErrorCode::T401,
            ErrorCode::T402,
            ErrorCode::T403,
            ErrorCode::T404,
        ];
        ALL.into_iter().find(|candidate| candidate.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::T100.to_string(), "T100");
        assert_eq!(ErrorCode::T201.to_string(), "T201");
        assert_eq!(ErrorCode::T404.to_string(), "T404");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::T201.description(), "duplicate table name");
        assert_eq!(ErrorCode::T403.description(), "self-reference");
    }

    #[test]
    fn test_from_code() {
        assert_eq!(ErrorCode::from_code("T300"), Some(ErrorCode::T300));
        assert_eq!(ErrorCode::from_code("E001"), None);
    }
}
