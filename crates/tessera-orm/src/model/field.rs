//! Field properties and primary-key behavior.
//!
//! A field is a primary key when its `IsPrimaryKey` value is `true`. Turning
//! a field into a primary key also forces `IsNullable` to `false` and locks
//! both values: a primary key cannot be demoted nor made nullable afterwards.
//! Locks are not persisted, so the kind's initializer re-establishes them
//! after a document is loaded.

use log::debug;

use tessera::{
    TesseraError,
    property::{KindRegistration, ParentLinkProperty, Property, PropertyDescriptor},
    tree::{ElementKey, Tree},
};
use tessera_core::{identifier::Id, value::Value};

use super::{DESCRIPTION, owning_table};

/// Database type name, free-form.
pub const DATA_TYPE: Property<String> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0002_0001),
    "DataType",
    || "String".to_string(),
);

pub const IS_NULLABLE: Property<bool> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0002_0002),
    "IsNullable",
    || true,
);

/// Maximum length; `0` means unbounded.
pub const LENGTH: Property<i32> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0002_0003),
    "Length",
    || 0,
);

pub const IS_PRIMARY_KEY: Property<bool> = Property::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0002_0004),
    "IsPrimaryKey",
    || false,
);

/// Back-reference to the owning table.
pub const TABLE: ParentLinkProperty = ParentLinkProperty::new(
    Id::from_u128(0x7e55_0000_0000_4000_8000_0000_0002_0005),
    "Table",
);

/// What a field is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Regular,
    PrimaryKey,
}

impl FieldRole {
    /// The role of `field`, derived from its `IsPrimaryKey` value.
    pub fn of(tree: &Tree, field: ElementKey) -> Self {
        if IS_PRIMARY_KEY.get(tree, field) {
            FieldRole::PrimaryKey
        } else {
            FieldRole::Regular
        }
    }

    pub fn is_primary_key(self) -> bool {
        self == FieldRole::PrimaryKey
    }
}

pub(super) fn registration() -> KindRegistration {
    KindRegistration::new()
        .property(DATA_TYPE.descriptor())
        .property(IS_NULLABLE.descriptor())
        .property(LENGTH.descriptor())
        .property(IS_PRIMARY_KEY.descriptor().with_setter(set_primary_key))
        .property(DESCRIPTION.descriptor())
        .property(TABLE.descriptor())
        .initializer(initialize)
}

/// Setter of `IsPrimaryKey`.
fn set_primary_key(
    tree: &mut Tree,
    field: ElementKey,
    descriptor: &PropertyDescriptor,
    value: Value,
) -> Result<(), TesseraError> {
    if value != Value::Boolean(true) {
        return tree.store_value(field, descriptor, value);
    }
    promote(tree, field, descriptor)
}

fn promote(tree: &mut Tree, field: ElementKey, descriptor: &PropertyDescriptor) -> Result<(), TesseraError> {
    let nullable = IS_NULLABLE.descriptor();
    tree.store_value(field, &nullable, Value::Boolean(false))?;
    tree.lock_value(field, &nullable)?;
    tree.store_value(field, descriptor, Value::Boolean(true))?;
    tree.lock_value(field, descriptor)
}

fn initialize(tree: &mut Tree, field: ElementKey) -> Result<(), TesseraError> {
    if IS_PRIMARY_KEY.get(tree, field) {
        promote(tree, field, &IS_PRIMARY_KEY.descriptor())?;
    }

    if let Some(table) = owning_table(tree, field) {
        let table_id = tree.element(table).id();
        if TABLE.target(tree, field) == table_id {
            TABLE.refresh(tree, field);
        } else {
            debug!(field_id:% = tree.element(field).id(), table_id:% = table_id; "Repointing field to its table");
            TABLE.set(tree, field, table_id)?;
        }
    }
    Ok(())
}
