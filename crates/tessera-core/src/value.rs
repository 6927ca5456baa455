//! Typed property values and their type tags.
//!
//! A [`ValueType`] is the tag written to the `Type` attribute of every stored
//! data node; it selects the converter used to read and write the value's
//! canonical text (see [`crate::convert`]). A [`Value`] is the tagged runtime
//! value itself.

use std::{fmt, str::FromStr};

use crate::{
    convert,
    error::FormatError,
    geometry::{Point, Rect, Size, Thickness},
    identifier::Id,
};

/// Type tag of a stored property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Boolean,
    Int32,
    Double,
    Guid,
    Point,
    Size,
    Rect,
    Thickness,
    PointArray,
    /// A single reference to another element by identifier.
    Link,
    /// An ordered list of references to other elements.
    LinkArray,
}

impl ValueType {
    /// The tag as written on the wire.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "String",
            ValueType::Boolean => "Boolean",
            ValueType::Int32 => "Int32",
            ValueType::Double => "Double",
            ValueType::Guid => "Guid",
            ValueType::Point => "Point",
            ValueType::Size => "Size",
            ValueType::Rect => "Rect",
            ValueType::Thickness => "Thickness",
            ValueType::PointArray => "PointArray",
            ValueType::Link => "Link",
            ValueType::LinkArray => "LinkArray",
        }
    }

    /// Returns `true` for link-typed values.
    pub fn is_link(self) -> bool {
        matches!(self, ValueType::Link | ValueType::LinkArray)
    }

    /// Returns `true` only for the "array of identifier" link type.
    pub fn is_link_array(self) -> bool {
        matches!(self, ValueType::LinkArray)
    }

    /// The value a property of this type holds when nothing else is declared.
    pub fn default_value(self) -> Value {
        match self {
            ValueType::String => Value::String(String::new()),
            ValueType::Boolean => Value::Boolean(false),
            ValueType::Int32 => Value::Int32(0),
            ValueType::Double => Value::Double(0.0),
            ValueType::Guid => Value::Guid(Id::EMPTY),
            ValueType::Point => Value::Point(Point::default()),
            ValueType::Size => Value::Size(Size::default()),
            ValueType::Rect => Value::Rect(Rect::default()),
            ValueType::Thickness => Value::Thickness(Thickness::default()),
            ValueType::PointArray => Value::PointArray(Vec::new()),
            ValueType::Link => Value::Link(Id::EMPTY),
            ValueType::LinkArray => Value::LinkArray(Vec::new()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value_type = match s {
            "String" => ValueType::String,
            "Boolean" => ValueType::Boolean,
            "Int32" => ValueType::Int32,
            "Double" => ValueType::Double,
            "Guid" => ValueType::Guid,
            "Point" => ValueType::Point,
            "Size" => ValueType::Size,
            "Rect" => ValueType::Rect,
            "Thickness" => ValueType::Thickness,
            "PointArray" => ValueType::PointArray,
            "Link" => ValueType::Link,
            "LinkArray" => ValueType::LinkArray,
            _ => {
                return Err(FormatError::new(
                    ValueType::String,
                    s,
                    "unknown value type tag",
                ));
            }
        };
        Ok(value_type)
    }
}

/// A typed runtime value.
///
/// Equality is type-aware: values of different types are never equal, and
/// values of the same type compare field by field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Int32(i32),
    Double(f64),
    Guid(Id),
    Point(Point),
    Size(Size),
    Rect(Rect),
    Thickness(Thickness),
    PointArray(Vec<Point>),
    Link(Id),
    LinkArray(Vec<Id>),
}

impl Value {
    /// The type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Int32(_) => ValueType::Int32,
            Value::Double(_) => ValueType::Double,
            Value::Guid(_) => ValueType::Guid,
            Value::Point(_) => ValueType::Point,
            Value::Size(_) => ValueType::Size,
            Value::Rect(_) => ValueType::Rect,
            Value::Thickness(_) => ValueType::Thickness,
            Value::PointArray(_) => ValueType::PointArray,
            Value::Link(_) => ValueType::Link,
            Value::LinkArray(_) => ValueType::LinkArray,
        }
    }

    /// Parses canonical text as a value of the given type.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when `text` is not a valid encoding of
    /// `value_type`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tessera_core::{geometry::Point, value::{Value, ValueType}};
    /// let value = Value::parse(ValueType::Point, "100|200").unwrap();
    /// assert_eq!(value, Value::Point(Point::new(100.0, 200.0)));
    /// assert_eq!(value.to_text(), "100|200");
    ///
    /// assert!(Value::parse(ValueType::Point, "100").is_err());
    /// ```
    pub fn parse(value_type: ValueType, text: &str) -> Result<Self, FormatError> {
        let value = match value_type {
            ValueType::String => Value::String(text.to_string()),
            ValueType::Boolean => Value::Boolean(convert::parse_bool(text)?),
            ValueType::Int32 => Value::Int32(convert::parse_int(text)?),
            ValueType::Double => Value::Double(convert::parse_number(ValueType::Double, text)?),
            ValueType::Guid => Value::Guid(Id::parse(text)?),
            ValueType::Point => Value::Point(text.parse()?),
            ValueType::Size => Value::Size(text.parse()?),
            ValueType::Rect => Value::Rect(text.parse()?),
            ValueType::Thickness => Value::Thickness(text.parse()?),
            ValueType::PointArray => Value::PointArray(convert::parse_point_array(text)?),
            ValueType::Link => Value::Link(Id::parse(text)?),
            ValueType::LinkArray => Value::LinkArray(convert::parse_id_list(text)?),
        };
        Ok(value)
    }

    /// Writes the value's canonical text.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(text) => text.clone(),
            Value::Boolean(value) => value.to_string(),
            Value::Int32(value) => value.to_string(),
            Value::Double(value) => convert::format_number(*value),
            Value::Guid(id) | Value::Link(id) => id.to_string(),
            Value::Point(point) => point.to_string(),
            Value::Size(size) => size.to_string(),
            Value::Rect(rect) => rect.to_string(),
            Value::Thickness(thickness) => thickness.to_string(),
            Value::PointArray(points) => convert::format_point_array(points),
            Value::LinkArray(ids) => convert::format_id_list(ids),
        }
    }
}

/// A Rust type that can be stored as a property value.
///
/// Implemented for every scalar type a property descriptor can declare.
pub trait PropertyType: Sized + Clone {
    /// The type tag this Rust type is stored under.
    const VALUE_TYPE: ValueType;

    /// Wraps the value.
    fn into_value(self) -> Value;

    /// Unwraps a value of the matching type, `None` otherwise.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_property_type {
    ($ty:ty, $variant:ident) => {
        impl PropertyType for $ty {
            const VALUE_TYPE: ValueType = ValueType::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_property_type!(String, String);
impl_property_type!(bool, Boolean);
impl_property_type!(i32, Int32);
impl_property_type!(f64, Double);
impl_property_type!(Id, Guid);
impl_property_type!(Point, Point);
impl_property_type!(Size, Size);
impl_property_type!(Rect, Rect);
impl_property_type!(Thickness, Thickness);
impl_property_type!(Vec<Point>, PointArray);
