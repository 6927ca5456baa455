//! CLI logic for the Tessera designer tool.
//!
//! Every command loads one design document. `validate` returns the issues
//! it found for the caller to render; `normalize` writes the document back
//! in canonical form; `tree` prints the element hierarchy without the
//! stored property values.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::{Args, Command};
pub use config::ConfigError;
pub use error::CliError;

use std::io::Write;

use log::info;

use tessera::{
    Document,
    identifier::ClassName,
    tree::{ElementKey, Tree, VALUES_CLASS},
    validation::{ValidationIssue, Validator},
};
use tessera_orm::{model, validate::OrmValidator};

/// Run one CLI command.
///
/// Output meant for the user (the element tree) is written to `out`.
/// Validation issues are returned rather than printed; every other
/// command returns an empty list.
///
/// # Errors
///
/// Returns `CliError` for:
/// - Configuration loading errors
/// - File I/O errors
/// - Malformed documents
pub fn run(args: &Args, out: &mut impl Write) -> Result<Vec<ValidationIssue>, CliError> {
    let config = config::load_config(args.config.as_ref())?;

    model::ensure_registered();
    let input = args.command.input();
    info!(input_path = input, command:? = args.command; "Processing document");
    let document = Document::load(input)?;

    match &args.command {
        Command::Validate { .. } => {
            let report = OrmValidator::new(config.validation().clone()).validate(&document);
            info!(
                errors = report.errors().count(),
                warnings = report.warnings().count();
                "Validation finished"
            );
            Ok(report.into_issues())
        }
        Command::Normalize { output, .. } => {
            let output = output.as_deref().unwrap_or(input);
            document.save(output)?;
            info!(output_path = output; "Document normalized");
            Ok(Vec::new())
        }
        Command::Tree { .. } => {
            let tree = document.tree();
            for root in tree.roots() {
                write_element(tree, *root, 0, out)?;
            }
            Ok(Vec::new())
        }
    }
}

fn write_element(tree: &Tree, key: ElementKey, depth: usize, out: &mut impl Write) -> Result<(), CliError> {
    let element = tree.element(key);
    writeln!(
        out,
        "{:indent$}{} {} [{}]",
        "",
        element.class_name(),
        element.name(),
        element.id(),
        indent = depth * 2
    )?;
    let values = ClassName::new(VALUES_CLASS);
    for child in tree.children(key) {
        if !tree.element(*child).is_kind(values) {
            write_element(tree, *child, depth + 1, out)?;
        }
    }
    Ok(())
}
