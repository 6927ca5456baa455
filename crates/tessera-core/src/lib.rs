//! Tessera Core Types and Definitions
//!
//! This crate provides the foundational types shared by every Tessera
//! designer model. It includes:
//!
//! - **Identifiers**: Globally unique element identifiers ([`identifier::Id`])
//!   and interned element kind tags ([`identifier::ClassName`])
//! - **Geometry**: Points, sizes, rectangles and thicknesses ([`geometry`] module)
//! - **Values**: Typed property values and their type tags ([`value`] module)
//! - **Conversion**: Canonical text forms for every value type ([`convert`] module)

pub mod convert;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod value;

pub use error::FormatError;
