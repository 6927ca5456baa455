//! Stored property values: values containers, data nodes and links.
//!
//! Every element that has written at least one property owns a values
//! container (kind `Values`, always its first child). The container's
//! children are data nodes (kind `Data`), one per populated property, whose
//! identifier and name mirror the declaring [`PropertyDescriptor`].
//!
//! Data nodes come in four shapes (see [`DataKind`]). Links store the raw
//! target identifier eagerly and resolve the live element on demand; a link
//! is healthy only when both its owning document and its target are found.

use log::{debug, trace};

use tessera_core::{
    identifier::{ClassName, Id},
    value::{Value, ValueType},
};

use crate::{
    error::TesseraError,
    property::PropertyDescriptor,
    tree::{DATA_CLASS, ElementKey, Matcher, Tree, VALUES_CLASS},
};

/// Shape of a stored property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// A primitive or converted value held inline.
    Scalar,
    /// A single reference by identifier.
    Link,
    /// An ordered list of link members, each a child data node.
    LinkArray,
    /// A required parent-style back-reference with a refreshable status.
    ParentLink,
}

impl DataKind {
    /// The shape used to store `descriptor`'s values.
    pub fn for_descriptor(descriptor: &PropertyDescriptor) -> Self {
        if descriptor.is_parent_link() {
            DataKind::ParentLink
        } else if descriptor.value_type().is_link_array() {
            DataKind::LinkArray
        } else if descriptor.is_linked() {
            DataKind::Link
        } else {
            DataKind::Scalar
        }
    }

    /// The `Type` tag written for this shape, for link shapes.
    pub fn link_tag(self) -> Option<&'static str> {
        match self {
            DataKind::Scalar => None,
            DataKind::Link => Some(ValueType::Link.name()),
            DataKind::LinkArray => Some(ValueType::LinkArray.name()),
            DataKind::ParentLink => Some(PARENT_LINK_TAG),
        }
    }
}

/// `Type` tag of parent-link data nodes.
pub const PARENT_LINK_TAG: &str = "ParentLink";

/// Cross-document provenance carried by a link.
///
/// Preserved through load and save; never consulted for resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkProvenance {
    document_id: Option<Id>,
    document_name: Option<String>,
    module_id: Option<Id>,
    module_name: Option<String>,
    data_ex: Option<String>,
}

impl LinkProvenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, id: Option<Id>, name: Option<String>) -> Self {
        self.document_id = id;
        self.document_name = name;
        self
    }

    pub fn with_module(mut self, id: Option<Id>, name: Option<String>) -> Self {
        self.module_id = id;
        self.module_name = name;
        self
    }

    pub fn with_data_ex(mut self, data_ex: Option<String>) -> Self {
        self.data_ex = data_ex;
        self
    }

    pub fn document_id(&self) -> Option<Id> {
        self.document_id
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn module_id(&self) -> Option<Id> {
        self.module_id
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    pub fn data_ex(&self) -> Option<&str> {
        self.data_ex.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of resolving a link.
///
/// The two health flags are independent: a link inside a detached subtree
/// can still find its target, and a rooted link can point at a deleted
/// element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatus {
    element: Option<ElementKey>,
    document_found: bool,
    element_found: bool,
}

impl LinkStatus {
    /// The resolved target, if found.
    pub fn element(&self) -> Option<ElementKey> {
        self.element
    }

    /// Whether the link's owning document is reachable.
    pub fn is_document_found(&self) -> bool {
        self.document_found
    }

    /// Whether the target element was found.
    pub fn is_element_found(&self) -> bool {
        self.element_found
    }

    pub fn is_valid(&self) -> bool {
        self.document_found && self.element_found
    }
}

/// Result of resolving every member of a link array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkArrayStatus {
    document_found: bool,
    members: Vec<(Id, LinkStatus)>,
}

impl LinkArrayStatus {
    pub fn is_document_found(&self) -> bool {
        self.document_found
    }

    /// Member identifiers with their resolution, in order.
    pub fn members(&self) -> &[(Id, LinkStatus)] {
        &self.members
    }

    /// Identifiers of members whose target was not found.
    pub fn unresolved(&self) -> Vec<Id> {
        self.members
            .iter()
            .filter(|(_, status)| !status.is_element_found())
            .map(|(id, _)| *id)
            .collect()
    }

    /// `true` only if the document is reachable and every member resolves.
    pub fn is_valid(&self) -> bool {
        self.document_found && self.members.iter().all(|(_, status)| status.is_element_found())
    }
}

/// Payload of a data node.
#[derive(Debug, Clone, PartialEq)]
pub struct DataNode {
    kind: DataKind,
    value_type: ValueType,
    data: Option<Value>,
    inner_text: String,
    order: Option<i32>,
    provenance: LinkProvenance,
    locked: bool,
    status: Option<LinkStatus>,
}

impl DataNode {
    fn with_kind(kind: DataKind, value_type: ValueType, data: Option<Value>) -> Self {
        Self {
            kind,
            value_type,
            data,
            inner_text: String::new(),
            order: None,
            provenance: LinkProvenance::default(),
            locked: false,
            status: None,
        }
    }

    pub fn scalar(value: Value) -> Self {
        Self::with_kind(DataKind::Scalar, value.value_type(), Some(value))
    }

    pub fn link(target: Id) -> Self {
        Self::with_kind(DataKind::Link, ValueType::Link, Some(Value::Link(target)))
    }

    pub fn parent_link(target: Id) -> Self {
        Self::with_kind(DataKind::ParentLink, ValueType::Link, Some(Value::Link(target)))
    }

    pub fn link_array() -> Self {
        Self::with_kind(DataKind::LinkArray, ValueType::LinkArray, None)
    }

    /// A link-array member at position `order`.
    pub fn member(target: Id, order: i32) -> Self {
        Self {
            order: Some(order),
            ..Self::link(target)
        }
    }

    /// The empty node used to store `descriptor`.
    pub fn for_descriptor(descriptor: &PropertyDescriptor) -> Self {
        match DataKind::for_descriptor(descriptor) {
            DataKind::Scalar => Self::scalar(descriptor.default_value().clone()),
            DataKind::Link => Self::link(Id::EMPTY),
            DataKind::LinkArray => Self::link_array(),
            DataKind::ParentLink => Self::parent_link(Id::EMPTY),
        }
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The raw payload. Link arrays keep theirs in member nodes.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn inner_text(&self) -> &str {
        &self.inner_text
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    pub fn provenance(&self) -> &LinkProvenance {
        &self.provenance
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The raw target of a link or parent link.
    pub fn target(&self) -> Option<Id> {
        match self.data {
            Some(Value::Link(id)) => Some(id),
            _ => None,
        }
    }

    pub(crate) fn set_inner_text(&mut self, text: String) {
        self.inner_text = text;
    }

    pub(crate) fn set_order(&mut self, order: Option<i32>) {
        self.order = order;
    }

    pub(crate) fn set_provenance(&mut self, provenance: LinkProvenance) {
        self.provenance = provenance;
    }
}

impl Tree {
    /// The values container of `element`, if one was created.
    pub fn values(&self, element: ElementKey) -> Option<ElementKey> {
        self.find_child(element, &Matcher::kind(ClassName::new(VALUES_CLASS)))
    }

    /// Every values container of `element`. More than one only appears in
    /// freshly deserialized input.
    pub fn values_containers(&self, element: ElementKey) -> Vec<ElementKey> {
        self.children_matching(element, Matcher::kind(ClassName::new(VALUES_CLASS)))
            .collect()
    }

    /// The values container of `element`, created (as first child) if absent.
    pub fn ensure_values(&mut self, element: ElementKey) -> Result<ElementKey, TesseraError> {
        if let Some(values) = self.values(element) {
            return Ok(values);
        }
        let values = self.create_with_id(Id::EMPTY, ClassName::new(VALUES_CLASS), "");
        self.insert_child(element, 0, values)?;
        Ok(values)
    }

    /// Data nodes of `element`, in stored order.
    pub fn data_nodes(&self, element: ElementKey) -> Vec<ElementKey> {
        let data = ClassName::new(DATA_CLASS);
        self.values(element)
            .map(|values| self.children_matching(values, Matcher::kind(data)).collect())
            .unwrap_or_default()
    }

    /// The data node storing property `id` on `element`.
    pub fn find_value(&self, element: ElementKey, id: Id) -> Option<ElementKey> {
        let values = self.values(element)?;
        self.children(values)
            .iter()
            .copied()
            .find(|key| self.get(*key).is_some_and(|node| node.data.is_some() && node.id() == id))
    }

    /// The data node addressed by a raw identifier string.
    pub fn find_value_raw(&self, element: ElementKey, raw_id: &str) -> Option<ElementKey> {
        let id = Id::parse(raw_id).ok()?;
        self.find_value(element, id)
    }

    pub fn data_node(&self, key: ElementKey) -> Option<&DataNode> {
        self.get(key).and_then(|element| element.data.as_ref())
    }

    fn data_node_mut(&mut self, key: ElementKey) -> Option<&mut DataNode> {
        self.get_mut(key).and_then(|element| element.data.as_mut())
    }

    /// Appends a data node with the given payload to `element`'s values
    /// container.
    pub fn insert_data_node(
        &mut self,
        element: ElementKey,
        id: Id,
        name: &str,
        node: DataNode,
    ) -> Result<ElementKey, TesseraError> {
        let values = self.ensure_values(element)?;
        let key = self.create_with_id(id, ClassName::new(DATA_CLASS), name);
        self.element_mut(key).data = Some(node);
        self.append_child(values, key)?;
        Ok(key)
    }

    /// Creates the data node for `descriptor` on `element`.
    ///
    /// Link properties get a link or link-array node, everything else a
    /// scalar node holding the default. Returns the existing node if the
    /// property is already populated.
    pub fn add_value(
        &mut self,
        element: ElementKey,
        descriptor: &PropertyDescriptor,
    ) -> Result<ElementKey, TesseraError> {
        if let Some(existing) = self.find_value(element, descriptor.id()) {
            return Ok(existing);
        }
        trace!(property = descriptor.name(); "Adding value");
        self.insert_data_node(
            element,
            descriptor.id(),
            descriptor.name(),
            DataNode::for_descriptor(descriptor),
        )
    }

    /// Removes the stored value of property `id`. Returns `false` if the
    /// property was not populated.
    pub fn remove_value(&mut self, element: ElementKey, id: Id) -> bool {
        match self.find_value(element, id) {
            Some(key) => self.delete(key),
            None => false,
        }
    }

    /// The stored value of property `id`, or `None` if never written.
    pub fn stored_value_by_id(&self, element: ElementKey, id: Id) -> Option<Value> {
        let key = self.find_value(element, id)?;
        self.data_value(key)
    }

    /// The value held by data node `key`, assembling link-array members.
    pub fn data_value(&self, key: ElementKey) -> Option<Value> {
        let node = self.data_node(key)?;
        match node.kind {
            DataKind::LinkArray => Some(Value::LinkArray(self.link_array_members(key))),
            _ => node.data.clone(),
        }
    }

    fn link_array_members(&self, key: ElementKey) -> Vec<Id> {
        let mut members: Vec<(i32, usize, Id)> = self
            .children(key)
            .iter()
            .filter_map(|member| self.data_node(*member))
            .enumerate()
            .filter_map(|(position, node)| {
                let target = node.target()?;
                Some((node.order.unwrap_or(i32::MAX), position, target))
            })
            .collect();
        members.sort_by_key(|(order, position, _)| (*order, *position));
        members.into_iter().map(|(_, _, target)| target).collect()
    }

    /// Generic getter: the stored value, or the descriptor default.
    pub fn stored_value(&self, element: ElementKey, descriptor: &PropertyDescriptor) -> Value {
        self.stored_value_by_id(element, descriptor.id())
            .unwrap_or_else(|| descriptor.default_value().clone())
    }

    /// Generic setter: stores `value` for `descriptor`, creating the data
    /// node on first write.
    ///
    /// # Errors
    ///
    /// Fails with [`TesseraError::TypeMismatch`] if `value` has the wrong
    /// type, and with [`TesseraError::Locked`] if the stored value is locked
    /// to a different value. The tree is unchanged on failure.
    pub fn store_value(
        &mut self,
        element: ElementKey,
        descriptor: &PropertyDescriptor,
        value: Value,
    ) -> Result<(), TesseraError> {
        if value.value_type() != descriptor.value_type() {
            return Err(TesseraError::TypeMismatch {
                property: descriptor.name().to_string(),
                expected: descriptor.value_type(),
                actual: value.value_type(),
            });
        }

        if let Some(existing) = self.find_value(element, descriptor.id())
            && self.data_node(existing).is_some_and(DataNode::is_locked)
        {
            if self.data_value(existing).as_ref() == Some(&value) {
                return Ok(());
            }
            return Err(TesseraError::Locked {
                property: descriptor.name().to_string(),
            });
        }

        let key = self.add_value(element, descriptor)?;
        match value {
            Value::LinkArray(targets) => self.replace_members(key, &targets)?,
            value => {
                if let Some(node) = self.data_node_mut(key) {
                    node.value_type = value.value_type();
                    node.data = Some(value);
                    node.status = None;
                }
            }
        }
        Ok(())
    }

    /// Rewrites the members of `key` in place; only a length difference
    /// creates or deletes member nodes.
    fn replace_members(&mut self, key: ElementKey, targets: &[Id]) -> Result<(), TesseraError> {
        let existing = self.children(key).to_vec();
        for surplus in existing.iter().skip(targets.len()) {
            self.delete(*surplus);
        }
        for (index, target) in targets.iter().enumerate() {
            let order = i32::try_from(index)
                .map_err(|_| TesseraError::Tree("link array is too long".to_string()))?;
            match existing.get(index) {
                Some(member) => self.element_mut(*member).data = Some(DataNode::member(*target, order)),
                None => {
                    self.append_member(key, *target, order)?;
                }
            }
        }
        Ok(())
    }

    /// Appends a link member with an explicit order to a link-array node.
    pub fn append_member(&mut self, array: ElementKey, target: Id, order: i32) -> Result<ElementKey, TesseraError> {
        let member = self.create_with_id(Id::EMPTY, ClassName::new(DATA_CLASS), "");
        self.element_mut(member).data = Some(DataNode::member(target, order));
        self.append_child(array, member)?;
        Ok(member)
    }

    /// Locks `descriptor`'s stored value at its current value.
    ///
    /// Locking is once-settable: a locked value stays locked for the life of
    /// the node. Locks are not serialized.
    pub fn lock_value(&mut self, element: ElementKey, descriptor: &PropertyDescriptor) -> Result<(), TesseraError> {
        let key = self.add_value(element, descriptor)?;
        if let Some(node) = self.data_node_mut(key)
            && !node.locked
        {
            node.locked = true;
            debug!(property = descriptor.name(); "Locked property value");
        }
        Ok(())
    }

    pub fn is_value_locked(&self, element: ElementKey, id: Id) -> bool {
        self.find_value(element, id)
            .and_then(|key| self.data_node(key))
            .is_some_and(DataNode::is_locked)
    }

    /// Replaces the provenance of link property `id`.
    pub fn set_link_provenance(
        &mut self,
        element: ElementKey,
        id: Id,
        provenance: LinkProvenance,
    ) -> Result<(), TesseraError> {
        let key = self.find_value(element, id).ok_or(TesseraError::NotFound(id))?;
        if let Some(node) = self.data_node_mut(key) {
            node.provenance = provenance;
        }
        Ok(())
    }

    /// Resolves the link stored in data node `key`.
    pub fn load_element(&self, key: ElementKey) -> LinkStatus {
        let document_found = self.is_rooted(key);
        let Some(target) = self.data_node(key).and_then(DataNode::target) else {
            return LinkStatus {
                document_found,
                ..LinkStatus::default()
            };
        };
        let element = if document_found {
            self.find_rooted(target)
        } else {
            self.find_by_id(self.top(key), target)
        };
        LinkStatus {
            element,
            document_found,
            element_found: element.is_some(),
        }
    }

    /// Resolves link property `id` of `element`.
    pub fn link_status(&self, element: ElementKey, id: Id) -> LinkStatus {
        match self.find_value(element, id) {
            Some(key) => self.load_element(key),
            None => LinkStatus {
                document_found: self.is_rooted(element),
                ..LinkStatus::default()
            },
        }
    }

    /// Resolves every member of link-array property `id` of `element`.
    pub fn link_array_status(&self, element: ElementKey, id: Id) -> LinkArrayStatus {
        let Some(key) = self.find_value(element, id) else {
            return LinkArrayStatus {
                document_found: self.is_rooted(element),
                members: Vec::new(),
            };
        };

        let mut members: Vec<(i32, usize, Id, LinkStatus)> = self
            .children(key)
            .iter()
            .enumerate()
            .filter_map(|(position, member)| {
                let node = self.data_node(*member)?;
                let target = node.target()?;
                Some((node.order.unwrap_or(i32::MAX), position, target, self.load_element(*member)))
            })
            .collect();
        members.sort_by_key(|(order, position, _, _)| (*order, *position));

        LinkArrayStatus {
            document_found: self.is_rooted(key),
            members: members
                .into_iter()
                .map(|(_, _, target, status)| (target, status))
                .collect(),
        }
    }

    /// Re-resolves parent link `id` of `element` and records the result.
    pub fn refresh_parent_link(&mut self, element: ElementKey, id: Id) -> LinkStatus {
        let Some(key) = self.find_value(element, id) else {
            return LinkStatus::default();
        };
        let status = self.load_element(key);
        if let Some(node) = self.data_node_mut(key) {
            node.status = Some(status);
        }
        status
    }

    /// The status recorded by the last [`Tree::refresh_parent_link`].
    pub fn parent_link_status(&self, element: ElementKey, id: Id) -> LinkStatus {
        self.find_value(element, id)
            .and_then(|key| self.data_node(key))
            .and_then(|node| node.status)
            .unwrap_or_default()
    }

    /// Folds every extra values container of `element` into the first one.
    ///
    /// Data nodes whose property is already stored in the first container
    /// are dropped. Returns the number of containers removed.
    pub fn merge_values_containers(&mut self, element: ElementKey) -> Result<usize, TesseraError> {
        let containers = self.values_containers(element);
        let Some((primary, extras)) = containers.split_first() else {
            return Ok(0);
        };

        for extra in extras {
            for node in self.children(*extra).to_vec() {
                let id = self.element(node).id();
                if self.find_value(element, id).is_some() {
                    continue;
                }
                self.append_child(*primary, node)?;
            }
            self.delete(*extra);
        }
        if !extras.is_empty() {
            debug!(removed = extras.len(); "Merged duplicate values containers");
        }
        Ok(extras.len())
    }
}
