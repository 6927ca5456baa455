//! ORM designer element kinds and their properties.
//!
//! An ORM design is a tree of four kinds:
//!
//! ```text
//! OrmDesign
//! ├── Table           Bounds, Schema, Description
//! │   └── Field       DataType, IsNullable, Length, IsPrimaryKey, Description, Table
//! └── Reference       Source, Target, Points, SourceFields, TargetFields, Description
//! ```
//!
//! Properties are declared as typed `const` handles in [`table`], [`field`]
//! and [`reference`]. [`ensure_registered`] publishes them to the property
//! registry; every entry point of this crate calls it, so a document read
//! through this crate always sees the ORM defaults and initializers.

pub mod field;
pub mod reference;
pub mod table;

use tessera::{
    Document, TesseraError,
    property::{self, KindRegistration, Property},
    tree::{ElementKey, Matcher, Tree},
};
use tessera_core::identifier::{ClassName, Id};

pub use field::FieldRole;

/// Tag of the design root.
pub const DESIGN_KIND: &str = "OrmDesign";

pub const TABLE_KIND: &str = "Table";

pub const FIELD_KIND: &str = "Field";

pub const REFERENCE_KIND: &str = "Reference";

/// Free-form notes, shared by tables, fields and references.
pub const DESCRIPTION: Property<String> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0000_0001),
    "Description",
    String::new,
);

pub fn design_kind() -> ClassName {
    ClassName::new(DESIGN_KIND)
}

pub fn table_kind() -> ClassName {
    ClassName::new(TABLE_KIND)
}

pub fn field_kind() -> ClassName {
    ClassName::new(FIELD_KIND)
}

pub fn reference_kind() -> ClassName {
    ClassName::new(REFERENCE_KIND)
}

/// Registers the ORM kinds with the property registry.
///
/// Kinds that are already registered are left alone.
pub fn ensure_registered() {
    let kinds: [(ClassName, fn() -> KindRegistration); 4] = [
        (design_kind(), KindRegistration::new),
        (table_kind(), table::registration),
        (field_kind(), field::registration),
        (reference_kind(), reference::registration),
    ];
    for (kind, registration) in kinds {
        if !property::is_registered(kind) {
            property::register(kind, registration());
        }
    }
}

/// Creates a document holding an empty ORM design.
pub fn new_document(name: impl Into<String>) -> Result<Document, TesseraError> {
    ensure_registered();
    let mut document = Document::new(name);
    document.create_design(design_kind(), "Design")?;
    Ok(document)
}

/// Tables of `design`, in document order.
pub fn tables(tree: &Tree, design: ElementKey) -> Vec<ElementKey> {
    tree.children_matching(design, Matcher::kind(table_kind()))
        .collect()
}

/// Fields of `table`, in document order.
pub fn fields(tree: &Tree, table: ElementKey) -> Vec<ElementKey> {
    tree.children_matching(table, Matcher::kind(field_kind()))
        .collect()
}

/// References of `design`, in document order.
pub fn references(tree: &Tree, design: ElementKey) -> Vec<ElementKey> {
    tree.children_matching(design, Matcher::kind(reference_kind()))
        .collect()
}

/// The table a field belongs to.
pub fn owning_table(tree: &Tree, field: ElementKey) -> Option<ElementKey> {
    tree.owner(field, &Matcher::kind(table_kind()))
}

/// Element names are compared case-insensitively.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Returns `true` if `key` is a live element of `kind`.
pub fn is_kind(tree: &Tree, key: ElementKey, kind: ClassName) -> bool {
    tree.get(key).is_some_and(|element| element.is_kind(kind))
}
