//! The validator contract.

use tessera_core::identifier::Id;

use crate::validation::{IssueCollector, ValidationIssue, ValidationReport};

/// A designer-specific validator.
///
/// Implementors provide the three hooks that locate the design and name the
/// document, and override [`Validator::validate_design`] and
/// [`Validator::validate_elements`] with their rules. [`Validator::validate`]
/// runs both over the whole design and never stops early.
pub trait Validator {
    /// The document type being validated.
    type Document;

    /// Handle of the design inside a document.
    type Design: Copy;

    /// The active design of `document`, if any.
    fn design(&self, document: &Self::Document) -> Option<Self::Design>;

    fn document_id(&self, document: &Self::Document) -> Id;

    fn document_name<'d>(&self, document: &'d Self::Document) -> &'d str;

    /// Rules about the design as a whole.
    fn validate_design(&self, _document: &Self::Document, _design: Self::Design, _issues: &mut IssueCollector) {}

    /// Rules about individual elements.
    fn validate_elements(&self, _document: &Self::Document, _design: Self::Design, _issues: &mut IssueCollector) {}

    /// Validates the whole design of `document`.
    fn validate(&self, document: &Self::Document) -> ValidationReport {
        let mut issues = IssueCollector::new(self.document_id(document), self.document_name(document));
        match self.design(document) {
            Some(design) => {
                self.validate_design(document, design, &mut issues);
                self.validate_elements(document, design, &mut issues);
            }
            None => issues.emit(ValidationIssue::error("document has no design")),
        }
        issues.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names {
        id: Id,
        name: String,
        items: Option<Vec<&'static str>>,
    }

    struct NonEmptyNames;

    impl Validator for NonEmptyNames {
        type Document = Names;
        type Design = usize;

        fn design(&self, document: &Names) -> Option<usize> {
            document.items.as_ref().map(Vec::len)
        }

        fn document_id(&self, document: &Names) -> Id {
            document.id
        }

        fn document_name<'d>(&self, document: &'d Names) -> &'d str {
            &document.name
        }

        fn validate_design(&self, _document: &Names, design: usize, issues: &mut IssueCollector) {
            if design == 0 {
                issues.emit(ValidationIssue::warning("no items"));
            }
        }

        fn validate_elements(&self, document: &Names, _design: usize, issues: &mut IssueCollector) {
            for item in document.items.iter().flatten() {
                if item.is_empty() {
                    issues.emit(ValidationIssue::error("empty item"));
                }
            }
        }
    }

    #[test]
    fn test_validate_runs_every_rule() {
        let document = Names {
            id: Id::generate(),
            name: "names".to_string(),
            items: Some(vec!["a", "", "b", ""]),
        };
        let report = NonEmptyNames.validate(&document);
        assert_eq!(report.errors().count(), 2);
        assert_eq!(report.document_id(), document.id);
        assert_eq!(report.document_name(), "names");
    }

    #[test]
    fn test_validate_without_design() {
        let document = Names {
            id: Id::EMPTY,
            name: String::new(),
            items: None,
        };
        let report = NonEmptyNames.validate(&document);
        assert_eq!(report.errors().count(), 1);
    }

    #[test]
    fn test_validate_empty_design_warns() {
        let document = Names {
            id: Id::EMPTY,
            name: String::new(),
            items: Some(Vec::new()),
        };
        let report = NonEmptyNames.validate(&document);
        assert!(!report.has_errors());
        assert_eq!(report.warnings().count(), 1);
    }
}
