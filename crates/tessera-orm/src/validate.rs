//! ORM design validation.
//!
//! [`OrmValidator`] checks a document against the ORM rules:
//!
//! | Rule | Severity | Code |
//! |---|---|---|
//! | design has no tables | Warning | `T100` |
//! | table name empty | Error | `T200` |
//! | table name used twice (case-insensitive) | Error | `T201` |
//! | field name empty | Error | `T202` |
//! | field name used twice in one table | Error | `T203` |
//! | table without primary key | Warning | `T300` |
//! | reference source/target not set | Error | `T400` |
//! | reference source/target not found | Error | `T401` |
//! | reference source/target not a table | Error | `T402` |
//! | reference from a table to itself | Warning | `T403` |
//! | field list names a missing element | Error | `T404` |
//!
//! Warnings can be switched off through [`ValidationConfig`].

use indexmap::IndexMap;
use log::debug;

use tessera::{
    Document,
    property::{LinkArrayProperty, LinkProperty},
    tree::{ElementKey, Tree},
    validation::{IssueCollector, ValidationIssue, Validator},
};
use tessera_core::identifier::Id;

use crate::{
    config::ValidationConfig,
    error::ErrorCode,
    model::{
        self, FieldRole, design_kind,
        reference::{SOURCE, SOURCE_FIELDS, TARGET, TARGET_FIELDS},
        table_kind,
    },
};

/// Validator for ORM designs.
#[derive(Debug, Clone, Default)]
pub struct OrmValidator {
    config: ValidationConfig,
}

impl OrmValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    fn check_table_names(&self, tree: &Tree, tables: &[ElementKey], issues: &mut IssueCollector) {
        let mut seen: IndexMap<String, usize> = IndexMap::new();
        for table in tables {
            let element = tree.element(*table);
            let name = element.name().trim();
            if name.is_empty() {
                issues.emit(
                    ValidationIssue::error("table name is empty")
                        .with_code(ErrorCode::T200.as_str())
                        .with_element(element.id(), element.name())
                        .with_property("Name"),
                );
                continue;
            }

            let count = seen.entry(name.to_lowercase()).or_default();
            *count += 1;
            if *count > 1 {
                issues.emit(
                    ValidationIssue::error(format!("table name `{name}` is used more than once"))
                        .with_code(ErrorCode::T201.as_str())
                        .with_element(element.id(), element.name())
                        .with_property("Name"),
                );
            }
        }
    }

    fn check_fields(&self, tree: &Tree, table: ElementKey, issues: &mut IssueCollector) {
        let table_element = tree.element(table);
        let fields = model::fields(tree, table);
        let mut seen: IndexMap<String, usize> = IndexMap::new();
        let mut has_primary_key = false;

        for field in &fields {
            let element = tree.element(*field);
            has_primary_key |= FieldRole::of(tree, *field).is_primary_key();

            let name = element.name().trim();
            if name.is_empty() {
                issues.emit(
                    ValidationIssue::error(format!("table `{}` has a field with an empty name", table_element.name()))
                        .with_code(ErrorCode::T202.as_str())
                        .with_element(element.id(), element.name())
                        .with_property("Name"),
                );
                continue;
            }

            let count = seen.entry(name.to_lowercase()).or_default();
            *count += 1;
            if *count > 1 {
                issues.emit(
                    ValidationIssue::error(format!(
                        "field name `{name}` is used more than once in table `{}`",
                        table_element.name()
                    ))
                    .with_code(ErrorCode::T203.as_str())
                    .with_element(element.id(), element.name())
                    .with_property("Name"),
                );
            }
        }

        if !has_primary_key && self.config.warn_on_missing_primary_key() {
            issues.emit(
                ValidationIssue::warning(format!("table `{}` has no primary key", table_element.name()))
                    .with_code(ErrorCode::T300.as_str())
                    .with_element(table_element.id(), table_element.name()),
            );
        }
    }

    fn check_reference(&self, tree: &Tree, reference: ElementKey, issues: &mut IssueCollector) {
        let element = tree.element(reference);
        let source = self.check_endpoint(tree, reference, SOURCE, issues);
        let target = self.check_endpoint(tree, reference, TARGET, issues);

        if let (Some(source), Some(target)) = (source, target)
            && source == target
            && self.config.warn_on_self_reference()
        {
            issues.emit(
                ValidationIssue::warning(format!(
                    "reference `{}` connects table `{}` to itself",
                    element.name(),
                    tree.element(source).name()
                ))
                .with_code(ErrorCode::T403.as_str())
                .with_element(element.id(), element.name()),
            );
        }

        for property in [SOURCE_FIELDS, TARGET_FIELDS] {
            self.check_field_links(tree, reference, property, issues);
        }
    }

    /// Resolves one endpoint, reporting why it is unusable.
    fn check_endpoint(
        &self,
        tree: &Tree,
        reference: ElementKey,
        property: LinkProperty,
        issues: &mut IssueCollector,
    ) -> Option<ElementKey> {
        let element = tree.element(reference);
        let issue = |message: String, code: ErrorCode| {
            ValidationIssue::error(message)
                .with_code(code.as_str())
                .with_element(element.id(), element.name())
                .with_property(property.name())
        };

        let target = property.target(tree, reference);
        if target.is_empty() {
            issues.emit(issue(
                format!("reference `{}` has no {} table", element.name(), property.name().to_lowercase()),
                ErrorCode::T400,
            ));
            return None;
        }

        let Some(resolved) = property.load(tree, reference) else {
            issues.emit(issue(
                format!(
                    "{} `{target}` of reference `{}` does not exist",
                    property.name().to_lowercase(),
                    element.name()
                ),
                ErrorCode::T401,
            ));
            return None;
        };

        if !model::is_kind(tree, resolved, table_kind()) {
            issues.emit(issue(
                format!(
                    "{} of reference `{}` is a {}, not a table",
                    property.name().to_lowercase(),
                    element.name(),
                    tree.element(resolved).class_name()
                ),
                ErrorCode::T402,
            ));
            return None;
        }
        Some(resolved)
    }

    fn check_field_links(
        &self,
        tree: &Tree,
        reference: ElementKey,
        property: LinkArrayProperty,
        issues: &mut IssueCollector,
    ) {
        let element = tree.element(reference);
        let unresolved: Vec<Id> = property.status(tree, reference).unresolved();
        for missing in unresolved {
            issues.emit(
                ValidationIssue::error(format!(
                    "{} of reference `{}` names missing field `{missing}`",
                    property.name(),
                    element.name()
                ))
                .with_code(ErrorCode::T404.as_str())
                .with_element(element.id(), element.name())
                .with_property(property.name()),
            );
        }
    }
}

impl Validator for OrmValidator {
    type Document = Document;
    type Design = ElementKey;

    fn design(&self, document: &Document) -> Option<ElementKey> {
        document
            .design()
            .filter(|design| model::is_kind(document.tree(), *design, design_kind()))
    }

    fn document_id(&self, document: &Document) -> Id {
        document.id()
    }

    fn document_name<'d>(&self, document: &'d Document) -> &'d str {
        document.name()
    }

    fn validate_design(&self, document: &Document, design: ElementKey, issues: &mut IssueCollector) {
        let tree = document.tree();
        let tables = model::tables(tree, design);
        debug!(tables = tables.len(); "Validating ORM design");

        if tables.is_empty() && self.config.warn_on_empty_design() {
            let element = tree.element(design);
            issues.emit(
                ValidationIssue::warning("design contains no tables")
                    .with_code(ErrorCode::T100.as_str())
                    .with_element(element.id(), element.name()),
            );
        }
        self.check_table_names(tree, &tables, issues);
    }

    fn validate_elements(&self, document: &Document, design: ElementKey, issues: &mut IssueCollector) {
        let tree = document.tree();
        for table in model::tables(tree, design) {
            self.check_fields(tree, table, issues);
        }
        for reference in model::references(tree, design) {
            self.check_reference(tree, reference, issues);
        }
    }
}
