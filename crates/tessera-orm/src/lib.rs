//! ORM table designer on top of the Tessera object model.
//!
//! - [`model`] declares the ORM element kinds (design, table, field,
//!   reference) and their properties
//! - [`controller`] applies structural changes while keeping references
//!   consistent
//! - [`validate`] reports naming, key and reference problems
//! - [`routing`] is the contract for connector routing engines
//! - [`config`] holds naming, layout and validation settings
//!
//! # Examples
//!
//! ```
//! use tessera::{Document, validation::Validator};
//! use tessera_core::geometry::Point;
//! use tessera_orm::{
//!     controller::{AddField, AddTable, Controller},
//!     model,
//!     validate::OrmValidator,
//! };
//!
//! let mut document = model::new_document("shop.tdm").unwrap();
//! let controller = Controller::default();
//!
//! let users = controller
//!     .execute(&mut document, AddTable::new(Point::new(100.0, 200.0)).with_name("Users"))
//!     .element_id()
//!     .unwrap();
//! controller.execute(&mut document, AddField::new(users).with_name("Id").primary_key());
//!
//! let report = OrmValidator::default().validate(&document);
//! assert!(report.is_empty());
//!
//! let restored = Document::from_xml(&document.to_xml().unwrap()).unwrap();
//! assert!(restored.find(users).is_some());
//! ```

pub mod config;
pub mod controller;
pub mod model;
pub mod routing;
pub mod validate;

mod error;

pub use error::ErrorCode;
