//! Operation payloads.
//!
//! Each structural change has its own payload type. All of them convert
//! into [`Operation`], which is what [`super::Controller::execute`] takes.

use tessera_core::{
    geometry::{Point, Size},
    identifier::Id,
};

/// Adds a table to the design.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTable {
    pub(crate) name: Option<String>,
    pub(crate) position: Point,
    pub(crate) size: Option<Size>,
}

impl AddTable {
    /// A table at `position` with a generated name and the configured size.
    pub fn new(position: Point) -> Self {
        Self {
            name: None,
            position,
            size: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }
}

/// Adds a field to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct AddField {
    pub(crate) table: Id,
    pub(crate) name: Option<String>,
    pub(crate) data_type: Option<String>,
    pub(crate) primary_key: bool,
}

impl AddField {
    pub fn new(table: Id) -> Self {
        Self {
            table,
            name: None,
            data_type: None,
            primary_key: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Makes the new field a primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Connects two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct AddReference {
    pub(crate) source: Id,
    pub(crate) target: Id,
    pub(crate) name: Option<String>,
    pub(crate) source_fields: Vec<Id>,
    pub(crate) target_fields: Vec<Id>,
}

impl AddReference {
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            source,
            target,
            name: None,
            source_fields: Vec::new(),
            target_fields: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fields of the source table taking part in the reference.
    pub fn with_source_fields(mut self, fields: impl IntoIterator<Item = Id>) -> Self {
        self.source_fields = fields.into_iter().collect();
        self
    }

    /// Fields of the target table taking part in the reference.
    pub fn with_target_fields(mut self, fields: impl IntoIterator<Item = Id>) -> Self {
        self.target_fields = fields.into_iter().collect();
        self
    }
}

/// Removes a table, field or reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveElement {
    pub(crate) id: Id,
}

impl RemoveElement {
    pub fn new(id: Id) -> Self {
        Self { id }
    }
}

/// Writes one property from its canonical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProperty {
    pub(crate) id: Id,
    pub(crate) property: String,
    pub(crate) value: String,
}

impl UpdateProperty {
    /// `property` is matched case-insensitively; `Name` renames the element.
    pub fn new(id: Id, property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Where a [`MoveElement`] puts its element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination {
    /// New table position, optionally with a new size.
    Position { position: Point, size: Option<Size> },
    /// The table a field moves into.
    Table(Id),
}

/// Moves a table on the surface or a field to another table.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveElement {
    pub(crate) id: Id,
    pub(crate) destination: Destination,
}

impl MoveElement {
    pub fn to_position(id: Id, position: Point) -> Self {
        Self {
            id,
            destination: Destination::Position { position, size: None },
        }
    }

    pub fn to_bounds(id: Id, position: Point, size: Size) -> Self {
        Self {
            id,
            destination: Destination::Position {
                position,
                size: Some(size),
            },
        }
    }

    pub fn to_table(id: Id, table: Id) -> Self {
        Self {
            id,
            destination: Destination::Table(table),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameElement {
    pub(crate) id: Id,
    pub(crate) name: String,
}

impl RenameElement {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Any structural change to an ORM design.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddTable(AddTable),
    AddField(AddField),
    AddReference(AddReference),
    RemoveElement(RemoveElement),
    UpdateProperty(UpdateProperty),
    MoveElement(MoveElement),
    RenameElement(RenameElement),
}

impl Operation {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddTable(_) => "add_table",
            Operation::AddField(_) => "add_field",
            Operation::AddReference(_) => "add_reference",
            Operation::RemoveElement(_) => "remove_element",
            Operation::UpdateProperty(_) => "update_property",
            Operation::MoveElement(_) => "move_element",
            Operation::RenameElement(_) => "rename_element",
        }
    }
}

impl From<AddTable> for Operation {
    fn from(payload: AddTable) -> Self {
        Operation::AddTable(payload)
    }
}

impl From<AddField> for Operation {
    fn from(payload: AddField) -> Self {
        Operation::AddField(payload)
    }
}

impl From<AddReference> for Operation {
    fn from(payload: AddReference) -> Self {
        Operation::AddReference(payload)
    }
}

impl From<RemoveElement> for Operation {
    fn from(payload: RemoveElement) -> Self {
        Operation::RemoveElement(payload)
    }
}

impl From<UpdateProperty> for Operation {
    fn from(payload: UpdateProperty) -> Self {
        Operation::UpdateProperty(payload)
    }
}

impl From<MoveElement> for Operation {
    fn from(payload: MoveElement) -> Self {
        Operation::MoveElement(payload)
    }
}

impl From<RenameElement> for Operation {
    fn from(payload: RenameElement) -> Self {
        Operation::RenameElement(payload)
    }
}
