//! Validation framework.
//!
//! A [`Validator`] walks a design and reports [`ValidationIssue`]s through an
//! [`IssueCollector`]. Issues are observations, not failures: one bad element
//! never stops the rest of the design from being checked, and the result of
//! a validation run is always a complete [`ValidationReport`].
//!
//! # Example
//!
//! ```
//! # use tessera::validation::{IssueCollector, ValidationIssue};
//! # use tessera_core::identifier::Id;
//! let table = Id::generate();
//!
//! let mut issues = IssueCollector::new(Id::EMPTY, "orders.tdm");
//! issues.emit(
//!     ValidationIssue::error("table name `Users` is used more than once")
//!         .with_code("T201")
//!         .with_element(table, "Users")
//!         .with_property("Name"),
//! );
//! issues.emit(ValidationIssue::warning("table `Users` has no primary key").with_element(table, "Users"));
//!
//! let report = issues.finish();
//! assert!(report.has_errors());
//! assert_eq!(report.warnings().count(), 1);
//! ```

mod collector;
mod issue;
mod severity;
mod validator;

pub use collector::{IssueCollector, ValidationReport};
pub use issue::ValidationIssue;
pub use severity::Severity;
pub use validator::Validator;
