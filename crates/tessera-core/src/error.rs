//! Error type for malformed textual values.

use thiserror::Error;

use crate::value::ValueType;

/// A textual value could not be converted to its declared type.
///
/// Format errors are always surfaced to the caller of the conversion entry
/// point; no conversion in this crate silently falls back to a default when
/// its input is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {value_type} value `{input}`: {reason}")]
pub struct FormatError {
    value_type: ValueType,
    input: String,
    reason: String,
}

impl FormatError {
    /// Create a new format error for the given type and offending input.
    pub fn new(value_type: ValueType, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value_type,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// The type the input was being converted to.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The text that failed to convert.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Why the conversion failed.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_display() {
        let err = FormatError::new(ValueType::Point, "1|2|3", "expected exactly one `|`");
        assert_eq!(
            err.to_string(),
            "invalid Point value `1|2|3`: expected exactly one `|`"
        );
        assert_eq!(err.value_type(), ValueType::Point);
        assert_eq!(err.input(), "1|2|3");
    }
}
