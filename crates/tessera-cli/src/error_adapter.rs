//! Adapters that render CLI errors and validation issues as miette
//! diagnostics.
//!
//! Validation issues carry no source spans; the adapter maps their severity,
//! code and a help line looked up from [`ErrorCode`]. Each issue becomes its
//! own report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, Severity as MietteSeverity};

use tessera::validation::{Severity, ValidationIssue};
use tessera_orm::ErrorCode;

use crate::{CliError, config::ConfigError};

/// Adapter for a single validation issue.
pub struct IssueAdapter<'a>(pub &'a ValidationIssue);

impl fmt::Debug for IssueAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueAdapter").field("issue", &self.0).finish()
    }
}

impl fmt::Display for IssueAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let issue = self.0;
        write!(f, "{}", issue.message())?;
        match (issue.element_name(), issue.property()) {
            ("", Some(property)) => write!(f, " (property {property})"),
            ("", None) => Ok(()),
            (name, Some(property)) => write!(f, " ({name}, property {property})"),
            (name, None) => write!(f, " ({name})"),
        }
    }
}

impl std::error::Error for IssueAdapter<'_> {}

impl MietteDiagnostic for IssueAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.0.code().map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.0.severity() {
            Severity::Error => MietteSeverity::Error,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.0
            .code()
            .and_then(ErrorCode::from_code)
            .map(|code| Box::new(code.description()) as Box<dyn fmt::Display>)
    }
}

/// Adapter for a [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Io(_) => "tessera::io",
            CliError::Model(_) => "tessera::model",
            CliError::Config(_) => "tessera::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            CliError::Config(ConfigError::MissingFile(_)) => {
                Some(Box::new("omit --config to fall back to the default configuration"))
            }
            _ => None,
        }
    }
}

/// A report that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    Issue(IssueAdapter<'a>),
    Error(ErrorAdapter<'a>),
}

impl Reportable<'_> {
    pub fn is_error(&self) -> bool {
        match self {
            Reportable::Issue(issue) => issue.0.severity().is_error(),
            Reportable::Error(_) => true,
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Issue(i) => fmt::Display::fmt(i, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Issue(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Issue(i) => i.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Issue(i) => i.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Issue(i) => i.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// One report per validation issue, in the order they were found.
pub fn issue_reportables(issues: &[ValidationIssue]) -> Vec<Reportable<'_>> {
    issues
        .iter()
        .map(|issue| Reportable::Issue(IssueAdapter(issue)))
        .collect()
}

pub fn error_reportable(err: &CliError) -> Reportable<'_> {
    Reportable::Error(ErrorAdapter(err))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tessera_core::identifier::Id;

    use super::*;

    #[test]
    fn test_issue_maps_severity_code_and_help() {
        let issue = ValidationIssue::error("a table named `Users` already exists")
            .with_code("T201")
            .with_element(Id::generate(), "Users")
            .with_property("Name");

        let reportables = issue_reportables(std::slice::from_ref(&issue));

        assert_eq!(reportables.len(), 1);
        let report = &reportables[0];
        assert!(report.is_error());
        assert_eq!(report.severity(), Some(MietteSeverity::Error));
        assert_eq!(report.code().unwrap().to_string(), "T201");
        assert_eq!(
            report.help().unwrap().to_string(),
            ErrorCode::T201.description()
        );
        assert_eq!(
            report.to_string(),
            "a table named `Users` already exists (Users, property Name)"
        );
    }

    #[test]
    fn test_warning_without_code() {
        let issue = ValidationIssue::warning("design has no tables");
        let reportables = issue_reportables(std::slice::from_ref(&issue));

        let report = &reportables[0];
        assert!(!report.is_error());
        assert_eq!(report.severity(), Some(MietteSeverity::Warning));
        assert!(report.code().is_none());
        assert!(report.help().is_none());
        assert_eq!(report.to_string(), "design has no tables");
    }

    #[test]
    fn test_config_error_report() {
        let err = CliError::from(ConfigError::MissingFile(PathBuf::from("absent.toml")));

        let report = error_reportable(&err);

        assert!(report.is_error());
        assert_eq!(report.code().unwrap().to_string(), "tessera::config");
        assert!(report.help().is_some());
        assert_eq!(report.to_string(), "Missing configuration file: absent.toml");
    }
}
