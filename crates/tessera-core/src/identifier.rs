//! Element identity and element kind tags.
//!
//! This module provides two identifier types:
//!
//! - [`Id`] - a globally unique identifier backed by a UUID, with a reserved
//!   [`Id::EMPTY`] sentinel. Every element, property and link target is
//!   addressed by an `Id`.
//! - [`ClassName`] - the kind tag of an element (`"Table"`, `"Values"`, ...),
//!   interned so that tags are `Copy` and compare in constant time.

use std::{
    fmt,
    str::FromStr,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};
use uuid::Uuid;

use crate::{error::FormatError, value::ValueType};

/// Globally unique identifier of an element or property.
///
/// # Examples
///
/// ```
/// use tessera_core::identifier::Id;
///
/// let id = Id::generate();
/// assert!(!id.is_empty());
///
/// let parsed = Id::parse(&id.to_string()).unwrap();
/// assert_eq!(parsed, id);
///
/// assert!(Id::parse("").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Uuid);

impl Id {
    /// The reserved "no identity" sentinel.
    pub const EMPTY: Id = Id(Uuid::nil());

    /// Creates an identifier from a constant, used for property identifiers.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier from its textual form.
    ///
    /// Accepts hyphenated, simple and braced forms. An empty (or all
    /// whitespace) string parses to [`Id::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the text is not a valid identifier.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::EMPTY);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|err| FormatError::new(ValueType::Guid, text, err.to_string()))
    }

    /// Returns `true` for the [`Id::EMPTY`] sentinel.
    pub fn is_empty(self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Id {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Global string interner for element kind tags.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// Interned element kind tag.
///
/// # Examples
///
/// ```
/// use tessera_core::identifier::ClassName;
///
/// let table = ClassName::new("Table");
/// assert_eq!(table, ClassName::new("Table"));
/// assert_eq!(table, "Table");
/// assert_eq!(table.to_string(), "Table");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassName(DefaultSymbol);

impl ClassName {
    /// Interns `name` and returns its tag.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the tag text.
    pub fn as_string(self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_string())
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for ClassName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for ClassName {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for ClassName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<Id> = (0..100).map(|_| Id::generate()).collect();
        assert_eq!(ids.len(), 100);
        assert!(!ids.contains(&Id::EMPTY));
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(Id::EMPTY.is_empty());
        assert!(Id::default().is_empty());
        assert_eq!(
            Id::EMPTY.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_parse_forms() {
        let hyphenated = Id::parse("6f1f8a52-2a7e-4c8b-9b1e-0c2d3e4f5a6b").unwrap();
        let braced = Id::parse("{6f1f8a52-2a7e-4c8b-9b1e-0c2d3e4f5a6b}").unwrap();
        let upper = Id::parse("6F1F8A52-2A7E-4C8B-9B1E-0C2D3E4F5A6B").unwrap();

        assert_eq!(hyphenated, braced);
        assert_eq!(hyphenated, upper);
        assert_eq!(
            hyphenated.to_string(),
            "6f1f8a52-2a7e-4c8b-9b1e-0c2d3e4f5a6b"
        );
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert_eq!(Id::parse("").unwrap(), Id::EMPTY);
        assert_eq!(Id::parse("   ").unwrap(), Id::EMPTY);
    }

    #[test]
    fn test_parse_invalid() {
        let err = Id::parse("not-an-id").unwrap_err();
        assert_eq!(err.value_type(), ValueType::Guid);
        assert_eq!(err.input(), "not-an-id");
    }

    #[test]
    fn test_from_u128_is_const() {
        const PROPERTY: Id = Id::from_u128(0x1234);
        assert!(!PROPERTY.is_empty());
        assert_eq!(PROPERTY, Id::from_u128(0x1234));
    }

    #[test]
    fn test_class_name_interning() {
        let a = ClassName::new("Table");
        let b: ClassName = "Table".into();
        let c = ClassName::new("Field");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a == "Table");
        assert!(c != "Table");
        assert_eq!(format!("{}", c), "Field");
    }
}
