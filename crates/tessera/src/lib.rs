//! Tessera - a persistent, hierarchical object model for visual designers.
//!
//! Tessera backs entity/relationship style diagram editors with:
//!
//! - an owned element [`tree`] with typed traversal and root discovery
//! - per-element stored property values in the [`data`] layer, including
//!   links to other elements resolved by identifier
//! - typed [`property`] descriptors registered once per element kind
//! - lossless XML persistence of whole [`document`]s with default-value
//!   suppression
//! - a [`validation`] framework that collects severity-tagged issues
//!
//! Designer-specific kinds, rules and controllers live in their own crates
//! (see `tessera-orm`).
//!
//! # Examples
//!
//! ```
//! use tessera::{Document, property::Property};
//! use tessera_core::{geometry::Point, identifier::{ClassName, Id}};
//!
//! const POSITION: Property<Point> =
//!     Property::new(Id::from_u128(0x1001), "Position", Point::default);
//!
//! let mut document = Document::new("notes.tdm");
//! let design = document
//!     .create_design(ClassName::new("Design"), "Design")
//!     .unwrap();
//! let note = document.tree_mut().create(ClassName::new("Note"), "Note1");
//! document.tree_mut().append_child(design, note).unwrap();
//! POSITION
//!     .set(document.tree_mut(), note, Point::new(100.0, 200.0))
//!     .unwrap();
//!
//! let xml = document.to_xml().unwrap();
//! assert!(xml.contains("100|200"));
//!
//! let restored = Document::from_xml(&xml).unwrap();
//! let id = document.tree().element(note).id();
//! let note = restored.find(id).unwrap();
//! assert_eq!(POSITION.get(restored.tree(), note), Point::new(100.0, 200.0));
//! ```

pub mod data;
pub mod document;
pub mod property;
pub mod tree;
pub mod validation;

mod error;
mod serialize;

pub use tessera_core::{convert, geometry, identifier, value};

pub use document::Document;
pub use error::TesseraError;
pub use serialize::DOCUMENT_TAG;
