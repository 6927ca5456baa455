//! The referential controller.
//!
//! [`Controller`] is the sanctioned way for a designer to change an ORM
//! design. Every operation checks its preconditions against the current
//! tree before touching it, so a rejected operation leaves the document as
//! it was. Operations never panic and never return `Err`: the outcome is
//! always an [`OperationResult`].
//!
//! Beyond plain tree edits the controller keeps the model consistent:
//!
//! - removing a table first removes every reference that starts or ends at
//!   it, and removing a field drops it from every reference's field lists
//! - moving or resizing a table snaps the touching ends of its references to
//!   the new bounds
//! - names are unique among sibling tables and among the fields of a table,
//!   compared case-insensitively
//!
//! # Example
//!
//! ```
//! use tessera_core::geometry::Point;
//! use tessera_orm::{
//!     controller::{AddField, AddTable, Controller},
//!     model,
//! };
//!
//! let mut document = model::new_document("shop.tdm").unwrap();
//! let controller = Controller::default();
//!
//! let added = controller.execute(&mut document, AddTable::new(Point::new(100.0, 200.0)));
//! assert!(added.is_success());
//! let table = added.element_id().unwrap();
//!
//! let field = controller.execute(&mut document, AddField::new(table).with_name("Id").primary_key());
//! assert!(field.is_success());
//!
//! let design = document.design().unwrap();
//! let tables = model::tables(document.tree(), design);
//! assert_eq!(document.tree().element(tables[0]).name(), "Table1");
//! ```

mod operation;

use log::{debug, info, warn};

use tessera::{
    Document, TesseraError, property,
    tree::{ElementKey, Tree},
};
use tessera_core::{
    geometry::{Point, Rect},
    identifier::{ClassName, Id},
    value::Value,
};

use crate::{
    config::ModelConfig,
    error::ControllerError,
    model::{
        self, design_kind, field, field_kind,
        reference::{POINTS, SOURCE, SOURCE_FIELDS, TARGET, TARGET_FIELDS},
        reference_kind,
        table::{self, BOUNDS},
        table_kind,
    },
    routing::{self, NoRouter, PathEnd, Router, ShapeDescriptor},
};

pub use operation::{
    AddField, AddReference, AddTable, Destination, MoveElement, Operation, RemoveElement, RenameElement,
    UpdateProperty,
};

/// Outcome of a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    success: bool,
    element_id: Option<Id>,
    message: Option<String>,
}

impl OperationResult {
    /// A successful operation that affected `element_id`.
    pub fn success(element_id: Id) -> Self {
        Self {
            success: true,
            element_id: Some(element_id),
            message: None,
        }
    }

    /// A rejected operation.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            element_id: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The element created, changed or removed.
    pub fn element_id(&self) -> Option<Id> {
        self.element_id
    }

    /// Why the operation was rejected.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

type Outcome = Result<Id, ControllerError>;

/// Applies operations to ORM documents.
#[derive(Debug, Clone)]
pub struct Controller<R = NoRouter> {
    config: ModelConfig,
    router: R,
}

impl Controller {
    /// A controller without a routing engine.
    pub fn new(config: ModelConfig) -> Self {
        Self::with_router(config, NoRouter)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl<R: Router> Controller<R> {
    pub fn with_router(config: ModelConfig, router: R) -> Self {
        model::ensure_registered();
        Self { config, router }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Applies `operation` to `document`.
    pub fn execute(&self, document: &mut Document, operation: impl Into<Operation>) -> OperationResult {
        let operation = operation.into();
        let name = operation.name();
        let outcome = match operation {
            Operation::AddTable(payload) => self.add_table(document, payload),
            Operation::AddField(payload) => self.add_field(document, payload),
            Operation::AddReference(payload) => self.add_reference(document, payload),
            Operation::RemoveElement(payload) => self.remove_element(document, payload),
            Operation::UpdateProperty(payload) => self.update_property(document, payload),
            Operation::MoveElement(payload) => self.move_element(document, payload),
            Operation::RenameElement(payload) => self.rename_element(document, payload),
        };

        match outcome {
            Ok(id) => {
                info!(operation = name, element_id:% = id; "Operation applied");
                OperationResult::success(id)
            }
            Err(err) => {
                warn!(operation = name, err:% = err; "Operation rejected");
                OperationResult::failure(err.to_string())
            }
        }
    }

    fn add_table(&self, document: &mut Document, payload: AddTable) -> Outcome {
        let design = active_design(document)?;
        let tree = document.tree();
        let taken = names_of(tree, &model::tables(tree, design), None);
        let name = claim_name(payload.name.as_deref(), self.config.naming().table_prefix(), &taken, "table")?;
        let size = payload
            .size
            .unwrap_or_else(|| self.config.layout().table_size());

        let tree = document.tree_mut();
        let table = tree.create(table_kind(), name);
        tree.append_child(design, table)?;
        BOUNDS.set(tree, table, Rect::from_position(payload.position, size))?;
        Ok(tree.element(table).id())
    }

    fn add_field(&self, document: &mut Document, payload: AddField) -> Outcome {
        let table = find_kind(document, payload.table, table_kind(), "table")?;
        let tree = document.tree();
        let taken = names_of(tree, &model::fields(tree, table), None);
        let name = claim_name(payload.name.as_deref(), self.config.naming().field_prefix(), &taken, "field")?;

        let tree = document.tree_mut();
        let field = tree.create(field_kind(), name);
        tree.append_child(table, field)?;
        field::TABLE.set(tree, field, payload.table)?;
        if let Some(data_type) = payload.data_type {
            field::DATA_TYPE.set(tree, field, data_type)?;
        }
        if payload.primary_key {
            field::IS_PRIMARY_KEY.set(tree, field, true)?;
        }
        Ok(tree.element(field).id())
    }

    fn add_reference(&self, document: &mut Document, payload: AddReference) -> Outcome {
        let design = active_design(document)?;
        let source = find_kind(document, payload.source, table_kind(), "table")?;
        let target = find_kind(document, payload.target, table_kind(), "table")?;
        check_fields_belong(document, &payload.source_fields, source, "source")?;
        check_fields_belong(document, &payload.target_fields, target, "target")?;

        let tree = document.tree();
        let taken = names_of(tree, &model::references(tree, design), None);
        let name = claim_name(
            payload.name.as_deref(),
            self.config.naming().reference_prefix(),
            &taken,
            "reference",
        )?;
        let points = self.route(tree, design, source, target);

        let tree = document.tree_mut();
        let reference = tree.create(reference_kind(), name);
        tree.append_child(design, reference)?;
        SOURCE.set(tree, reference, payload.source)?;
        TARGET.set(tree, reference, payload.target)?;
        POINTS.set(tree, reference, points)?;
        SOURCE_FIELDS.set(tree, reference, payload.source_fields)?;
        TARGET_FIELDS.set(tree, reference, payload.target_fields)?;
        Ok(tree.element(reference).id())
    }

    /// Asks the router for a path, falling back to a straight one.
    fn route(&self, tree: &Tree, design: ElementKey, source: ElementKey, target: ElementKey) -> Vec<Point> {
        let source_bounds = BOUNDS.get(tree, source);
        let target_bounds = BOUNDS.get(tree, target);
        let obstacles: Vec<Rect> = model::tables(tree, design)
            .into_iter()
            .filter(|table| *table != source && *table != target)
            .map(|table| BOUNDS.get(tree, table))
            .collect();

        let routed = self.router.route(
            &ShapeDescriptor::new(source_bounds),
            &ShapeDescriptor::new(target_bounds),
            &obstacles,
        );
        routed.into_points().unwrap_or_else(|| {
            debug!(obstacles = obstacles.len(); "No usable route, using a straight path");
            routing::straight_route(source_bounds, target_bounds)
        })
    }

    fn remove_element(&self, document: &mut Document, payload: RemoveElement) -> Outcome {
        let key = find(document, payload.id)?;
        if document.designs().contains(&key) {
            return Err(ControllerError::Integrity("the design cannot be removed".to_string()));
        }
        let design = active_design(document)?;

        let tree = document.tree();
        let kind = tree.element(key).class_name();
        let references = model::references(tree, design);
        let mut doomed = Vec::new();
        let mut purged_fields = Vec::new();
        if kind == table_kind() {
            doomed = references
                .iter()
                .copied()
                .filter(|reference| {
                    SOURCE.target(tree, *reference) == payload.id || TARGET.target(tree, *reference) == payload.id
                })
                .collect();
            purged_fields = model::fields(tree, key)
                .into_iter()
                .map(|field| tree.element(field).id())
                .collect();
        } else if kind == field_kind() {
            purged_fields.push(payload.id);
        }

        let tree = document.tree_mut();
        for reference in &doomed {
            debug!(reference_id:% = tree.element(*reference).id(); "Removing dependent reference");
            tree.delete(*reference);
        }
        for reference in references.into_iter().filter(|reference| !doomed.contains(reference)) {
            for field_id in &purged_fields {
                SOURCE_FIELDS.remove(tree, reference, *field_id)?;
                TARGET_FIELDS.remove(tree, reference, *field_id)?;
            }
        }
        tree.delete(key);
        Ok(payload.id)
    }

    fn update_property(&self, document: &mut Document, payload: UpdateProperty) -> Outcome {
        if payload.property.trim().eq_ignore_ascii_case("Name") {
            return self.rename_element(document, RenameElement::new(payload.id, payload.value));
        }

        let key = find(document, payload.id)?;
        let kind = document.tree().element(key).class_name();
        let descriptor = property::registration(kind)
            .and_then(|registration| registration.descriptor_named(payload.property.trim()).cloned())
            .ok_or_else(|| ControllerError::UnknownProperty {
                kind: kind.to_string(),
                property: payload.property.clone(),
            })?;
        if descriptor.is_parent_link() {
            return Err(ControllerError::ReadOnly(descriptor.name()));
        }
        let value = Value::parse(descriptor.value_type(), &payload.value)?;
        let snap = kind == table_kind() && descriptor.id() == BOUNDS.id();
        let design = active_design(document)?;

        let tree = document.tree_mut();
        descriptor.set(tree, key, value)?;
        if snap {
            snap_references(tree, design, key)?;
        }
        Ok(payload.id)
    }

    fn move_element(&self, document: &mut Document, payload: MoveElement) -> Outcome {
        let key = find(document, payload.id)?;
        let design = active_design(document)?;
        let kind = document.tree().element(key).class_name();

        match payload.destination {
            Destination::Position { position, size } if kind == table_kind() => {
                let tree = document.tree_mut();
                let size = size.unwrap_or_else(|| BOUNDS.get(tree, key).size());
                BOUNDS.set(tree, key, Rect::from_position(position, size))?;
                snap_references(tree, design, key)?;
            }
            Destination::Table(table_id) if kind == field_kind() => {
                let table = find_kind(document, table_id, table_kind(), "table")?;
                let tree = document.tree();
                if model::owning_table(tree, key) == Some(table) {
                    return Ok(payload.id);
                }
                let name = tree.element(key).name().to_string();
                let taken = names_of(tree, &model::fields(tree, table), None);
                if taken.iter().any(|existing| model::names_match(existing, &name)) {
                    return Err(ControllerError::DuplicateName { kind: "field", name });
                }
                let references = model::references(tree, design);

                let tree = document.tree_mut();
                for reference in references {
                    if SOURCE.target(tree, reference) != table_id {
                        SOURCE_FIELDS.remove(tree, reference, payload.id)?;
                    }
                    if TARGET.target(tree, reference) != table_id {
                        TARGET_FIELDS.remove(tree, reference, payload.id)?;
                    }
                }
                tree.append_child(table, key)?;
                field::TABLE.set(tree, key, table_id)?;
            }
            _ => {
                return Err(ControllerError::UnsupportedMove { kind: kind.to_string() });
            }
        }
        Ok(payload.id)
    }

    fn rename_element(&self, document: &mut Document, payload: RenameElement) -> Outcome {
        let key = find(document, payload.id)?;

        let tree = document.tree();
        let kind = tree.element(key).class_name();
        let (label, siblings) = match tree.parent(key) {
            Some(parent) if kind == table_kind() => ("table", model::tables(tree, parent)),
            Some(parent) if kind == field_kind() => ("field", model::fields(tree, parent)),
            Some(parent) if kind == reference_kind() => ("reference", model::references(tree, parent)),
            _ => ("element", Vec::new()),
        };
        let taken = names_of(tree, &siblings, Some(key));
        let name = claim_name(Some(payload.name.as_str()), "", &taken, label)?;

        document.tree_mut().set_name(key, name)?;
        Ok(payload.id)
    }
}

/// The design operations apply to.
fn active_design(document: &Document) -> Result<ElementKey, ControllerError> {
    document
        .design()
        .filter(|design| model::is_kind(document.tree(), *design, design_kind()))
        .ok_or(ControllerError::NoDesign)
}

fn find(document: &Document, id: Id) -> Result<ElementKey, ControllerError> {
    document.find(id).ok_or(ControllerError::NotFound(id))
}

fn find_kind(document: &Document, id: Id, kind: ClassName, label: &'static str) -> Result<ElementKey, ControllerError> {
    let key = find(document, id)?;
    let actual = document.tree().element(key).class_name();
    if actual != kind {
        return Err(ControllerError::WrongKind {
            id,
            expected: label,
            actual: actual.to_string(),
        });
    }
    Ok(key)
}

fn check_fields_belong(
    document: &Document,
    fields: &[Id],
    table: ElementKey,
    side: &str,
) -> Result<(), ControllerError> {
    for id in fields {
        let field = find_kind(document, *id, field_kind(), "field")?;
        if model::owning_table(document.tree(), field) != Some(table) {
            return Err(ControllerError::Integrity(format!(
                "field `{id}` does not belong to the {side} table"
            )));
        }
    }
    Ok(())
}

fn names_of(tree: &Tree, elements: &[ElementKey], except: Option<ElementKey>) -> Vec<String> {
    elements
        .iter()
        .filter(|key| Some(**key) != except)
        .map(|key| tree.element(*key).name().to_string())
        .collect()
}

/// The requested name if it is free, otherwise a generated one.
fn claim_name(
    requested: Option<&str>,
    prefix: &str,
    taken: &[String],
    kind: &'static str,
) -> Result<String, ControllerError> {
    let Some(requested) = requested else {
        return Ok(next_name(prefix, taken));
    };
    let name = requested.trim();
    if name.is_empty() {
        return Err(ControllerError::EmptyName);
    }
    if taken.iter().any(|existing| model::names_match(existing, name)) {
        return Err(ControllerError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// `prefix` followed by the smallest positive number not already taken.
fn next_name(prefix: &str, taken: &[String]) -> String {
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{prefix}{suffix}");
        if !taken.iter().any(|existing| model::names_match(existing, &candidate)) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Re-attaches the paths of every reference touching `table` to its bounds.
fn snap_references(tree: &mut Tree, design: ElementKey, table: ElementKey) -> Result<(), TesseraError> {
    let table_id = tree.element(table).id();
    let bounds = table::BOUNDS.get(tree, table);

    for reference in model::references(tree, design) {
        let starts = SOURCE.target(tree, reference) == table_id;
        let ends = TARGET.target(tree, reference) == table_id;
        if !starts && !ends {
            continue;
        }

        let mut points = POINTS.get(tree, reference);
        if points.len() < 2 {
            let (Some(source), Some(target)) = (SOURCE.load(tree, reference), TARGET.load(tree, reference)) else {
                continue;
            };
            points = routing::straight_route(BOUNDS.get(tree, source), BOUNDS.get(tree, target));
        } else {
            if starts {
                routing::snap_endpoint(&mut points, bounds, PathEnd::Start);
            }
            if ends {
                routing::snap_endpoint(&mut points, bounds, PathEnd::End);
            }
        }
        POINTS.set(tree, reference, points)?;
    }
    Ok(())
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum Step {
        AddTable,
        AddReference(usize, usize),
        RemoveTable(usize),
    }

    // ===================
    // Strategies
    // ===================

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::AddTable),
            (0..8usize, 0..8usize).prop_map(|(source, target)| Step::AddReference(source, target)),
            (0..8usize).prop_map(Step::RemoveTable),
        ]
    }

    // ===================
    // Property Test Functions
    // ===================

    /// After any mix of additions and removals, every reference still
    /// resolves both ends and the design holds exactly the live tables.
    fn check_references_never_outlive_tables(steps: Vec<Step>) -> Result<(), TestCaseError> {
        let mut document = model::new_document("cascade").unwrap();
        let controller = Controller::default();
        let mut tables: Vec<Id> = Vec::new();

        for (index, step) in steps.into_iter().enumerate() {
            match step {
                Step::AddTable => {
                    let position = Point::new(250.0 * index as f64, 0.0);
                    let result = controller.execute(&mut document, AddTable::new(position));
                    prop_assert!(result.is_success());
                    tables.extend(result.element_id());
                }
                Step::AddReference(source, target) if !tables.is_empty() => {
                    let source = tables[source % tables.len()];
                    let target = tables[target % tables.len()];
                    let result = controller.execute(&mut document, AddReference::new(source, target));
                    prop_assert!(result.is_success(), "{:?}", result.message());
                }
                Step::RemoveTable(index) if !tables.is_empty() => {
                    let id = tables.remove(index % tables.len());
                    let result = controller.execute(&mut document, RemoveElement::new(id));
                    prop_assert!(result.is_success(), "{:?}", result.message());
                }
                _ => {}
            }

            let tree = document.tree();
            let design = document.design().unwrap();
            for reference in model::references(tree, design) {
                prop_assert!(SOURCE.load(tree, reference).is_some());
                prop_assert!(TARGET.load(tree, reference).is_some());
            }
            prop_assert_eq!(model::tables(tree, design).len(), tables.len());
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn references_never_outlive_tables(steps in prop::collection::vec(step_strategy(), 1..40)) {
            check_references_never_outlive_tables(steps)?;
        }
    }
}
