//! Error type for CLI runs.

use std::io;

use thiserror::Error;

use tessera::TesseraError;

use crate::config::ConfigError;

/// Anything that stops a command before it produces a result.
///
/// Validation issues are not errors: a `validate` run that finds problems
/// still succeeds and returns them.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Model(#[from] TesseraError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
