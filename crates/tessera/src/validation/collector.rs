//! Collector for accumulating issues during a validation run.

use tessera_core::identifier::Id;

use crate::validation::{Severity, ValidationIssue};

/// Accumulates issues while a validator walks a design.
#[derive(Debug, Default)]
pub struct IssueCollector {
    document_id: Id,
    document_name: String,
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    /// Create an empty collector for a document.
    pub fn new(document_id: Id, document_name: impl Into<String>) -> Self {
        Self {
            document_id,
            document_name: document_name.into(),
            issues: Vec::new(),
        }
    }

    /// Emit an issue to this collector.
    pub fn emit(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity().is_error())
    }

    /// Finish collection and return every issue, in emission order.
    pub fn finish(self) -> ValidationReport {
        ValidationReport {
            document_id: self.document_id,
            document_name: self.document_name,
            issues: self.issues,
        }
    }
}

/// Every issue found in one validation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    document_id: Id,
    document_name: String,
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn document_id(&self) -> Id {
        self.document_id
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_empty_report() {
        let report = IssueCollector::new(Id::EMPTY, "doc").finish();
        assert!(report.is_empty());
        assert!(!report.has_errors());
        assert_eq!(report.document_name(), "doc");
    }

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut collector = IssueCollector::new(Id::EMPTY, "doc");
        collector.emit(ValidationIssue::warning("warning 1"));
        assert!(!collector.has_errors());
        collector.emit(ValidationIssue::error("error 1"));
        collector.emit(ValidationIssue::error("error 2"));
        assert!(collector.has_errors());

        let report = collector.finish();
        let messages: Vec<_> = report.issues().iter().map(ValidationIssue::message).collect();
        assert_eq!(messages, vec!["warning 1", "error 1", "error 2"]);
        assert_eq!(report.errors().count(), 2);
        assert_eq!(report.warnings().count(), 1);
    }
}
