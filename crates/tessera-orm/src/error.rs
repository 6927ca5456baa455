//! Error types for the ORM designer.
//!
//! - [`ErrorCode`] tags validation issues so that reports are searchable.
//! - `ControllerError` describes why a controller operation was rejected.
//!   It never leaves the crate: [`crate::controller::Controller`] turns it
//!   into a failed [`crate::controller::OperationResult`].

mod controller_error;
mod error_code;

pub(crate) use controller_error::ControllerError;

pub use error_code::ErrorCode;
