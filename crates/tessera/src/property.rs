//! Property descriptors and the process-wide property registry.
//!
//! A [`PropertyDescriptor`] binds a property identifier and name to a default
//! value and an accessor pair. Descriptors are registered once per element
//! kind in a [`KindRegistration`]; the registry is lazily created on first
//! access and never changes after a kind is registered.
//!
//! Typed handles ([`Property`], [`LinkProperty`], [`LinkArrayProperty`],
//! [`ParentLinkProperty`]) are `const` values that domain code declares next
//! to its kinds. They read and write through the registered descriptor, so an
//! overridden setter applies no matter which path performs the write.

use std::{
    marker::PhantomData,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use indexmap::IndexMap;
use log::{debug, warn};

use tessera_core::{
    identifier::{ClassName, Id},
    value::{PropertyType, Value, ValueType},
};

use crate::{
    data::{LinkArrayStatus, LinkStatus},
    error::TesseraError,
    tree::{ElementKey, Tree},
};

/// Reads a property of an element.
pub type Getter = fn(&Tree, ElementKey, &PropertyDescriptor) -> Value;

/// Writes a property of an element.
pub type Setter = fn(&mut Tree, ElementKey, &PropertyDescriptor, Value) -> Result<(), TesseraError>;

/// Repairs an element after generic deserialization.
pub type Initializer = fn(&mut Tree, ElementKey) -> Result<(), TesseraError>;

/// Immutable description of one property of one element kind.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    id: Id,
    name: &'static str,
    default: Value,
    parent_link: bool,
    getter: Getter,
    setter: Setter,
}

impl PropertyDescriptor {
    /// Creates a descriptor with the generic storage accessors.
    pub fn new(id: Id, name: &'static str, default: Value) -> Self {
        Self {
            id,
            name,
            default,
            parent_link: false,
            getter: Tree::stored_value,
            setter: Tree::store_value,
        }
    }

    /// Creates a descriptor for a required parent-style back-reference.
    pub fn parent_link(id: Id, name: &'static str) -> Self {
        Self {
            parent_link: true,
            ..Self::new(id, name, Value::Link(Id::EMPTY))
        }
    }

    /// Replaces the setter. The replacement is responsible for storing the
    /// value, usually by delegating to [`Tree::store_value`].
    pub fn with_setter(mut self, setter: Setter) -> Self {
        self.setter = setter;
        self
    }

    pub fn with_getter(mut self, getter: Getter) -> Self {
        self.getter = getter;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn value_type(&self) -> ValueType {
        self.default.value_type()
    }

    /// Returns `true` for link-typed properties, including parent links.
    pub fn is_linked(&self) -> bool {
        self.value_type().is_link()
    }

    pub fn is_parent_link(&self) -> bool {
        self.parent_link
    }

    /// The type name distinguishing a single link from an array of links,
    /// or `None` for non-link properties.
    pub fn link_type_name(&self) -> Option<&'static str> {
        self.is_linked().then(|| self.value_type().name())
    }

    /// Reads the property through the registered getter.
    pub fn get(&self, tree: &Tree, element: ElementKey) -> Value {
        (self.getter)(tree, element, self)
    }

    /// Writes the property through the registered setter.
    ///
    /// # Errors
    ///
    /// Fails if the value's type does not match the property, or the stored
    /// value is locked.
    pub fn set(&self, tree: &mut Tree, element: ElementKey, value: Value) -> Result<(), TesseraError> {
        (self.setter)(tree, element, self, value)
    }
}

/// The properties and initializer hook of one element kind.
#[derive(Debug, Clone, Default)]
pub struct KindRegistration {
    properties: Vec<PropertyDescriptor>,
    initializer: Option<Initializer>,
}

impl KindRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property. A later descriptor with the same identifier replaces
    /// the earlier one.
    pub fn property(mut self, descriptor: PropertyDescriptor) -> Self {
        self.properties
            .retain(|existing| existing.id() != descriptor.id());
        self.properties.push(descriptor);
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn initializer_hook(&self) -> Option<Initializer> {
        self.initializer
    }

    pub fn descriptor(&self, id: Id) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|property| property.id() == id)
    }

    /// Looks a property up by name, ignoring ASCII case.
    pub fn descriptor_named(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|property| property.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Default)]
struct PropertyRegistry {
    kinds: IndexMap<ClassName, Arc<KindRegistration>>,
}

static REGISTRY: OnceLock<RwLock<PropertyRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<PropertyRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(PropertyRegistry::default()))
}

/// Registers the properties of `kind`.
///
/// Registration happens once per kind: if `kind` is already registered the
/// call changes nothing and returns `false`.
pub fn register(kind: ClassName, registration: KindRegistration) -> bool {
    let mut registry = registry().write().unwrap_or_else(PoisonError::into_inner);
    if registry.kinds.contains_key(&kind) {
        return false;
    }
    debug!(
        kind:% = kind,
        properties = registration.properties().len();
        "Registered element kind"
    );
    registry.kinds.insert(kind, Arc::new(registration));
    true
}

pub fn is_registered(kind: ClassName) -> bool {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .kinds
        .contains_key(&kind)
}

/// The registration of `kind`, if any.
pub fn registration(kind: ClassName) -> Option<Arc<KindRegistration>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .kinds
        .get(&kind)
        .cloned()
}

/// The descriptor of property `id` on `kind`, if registered.
pub fn descriptor(kind: ClassName, id: Id) -> Option<PropertyDescriptor> {
    registration(kind).and_then(|registration| registration.descriptor(id).cloned())
}

/// Clears every registration.
///
/// Only for tests that need a pristine registry. Production code never
/// calls this.
#[doc(hidden)]
pub fn reset_for_tests() {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .kinds
        .clear();
}

/// The registered descriptor for `id` on `element`'s kind, falling back to
/// `fallback` when the kind does not declare it.
fn resolve_descriptor(tree: &Tree, element: ElementKey, fallback: impl FnOnce() -> PropertyDescriptor) -> PropertyDescriptor {
    let fallback = fallback();
    tree.get(element)
        .and_then(|element| descriptor(element.class_name(), fallback.id()))
        .unwrap_or(fallback)
}

/// Typed handle of a scalar property.
///
/// # Examples
///
/// ```
/// use tessera::{property::Property, tree::Tree};
/// use tessera_core::identifier::{ClassName, Id};
///
/// const SCHEMA: Property<String> =
///     Property::new(Id::from_u128(0x5c4e_0001), "Schema", || "dbo".to_string());
///
/// let mut tree = Tree::new();
/// let table = tree.create(ClassName::new("Table"), "Users");
/// assert_eq!(SCHEMA.get(&tree, table), "dbo");
///
/// SCHEMA.set(&mut tree, table, "sales".to_string()).unwrap();
/// assert_eq!(SCHEMA.get(&tree, table), "sales");
/// ```
pub struct Property<T> {
    id: Id,
    name: &'static str,
    default: fn() -> T,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyType> Property<T> {
    pub const fn new(id: Id, name: &'static str, default: fn() -> T) -> Self {
        Self {
            id,
            name,
            default,
            _marker: PhantomData,
        }
    }

    pub const fn id(&self) -> Id {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }

    /// The descriptor to register for this property.
    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor::new(self.id, self.name, self.default_value().into_value())
    }

    /// Reads the property, returning the default when it was never written.
    pub fn get(&self, tree: &Tree, element: ElementKey) -> T {
        let descriptor = resolve_descriptor(tree, element, || self.descriptor());
        let value = descriptor.get(tree, element);
        T::from_value(&value).unwrap_or_else(|| {
            warn!(
                property = self.name,
                expected:% = T::VALUE_TYPE,
                actual:% = value.value_type();
                "Stored property has an unexpected type, using default"
            );
            self.default_value()
        })
    }

    /// Writes the property through the registered setter.
    ///
    /// # Errors
    ///
    /// Fails if the stored value is locked to a different value.
    pub fn set(&self, tree: &mut Tree, element: ElementKey, value: T) -> Result<(), TesseraError> {
        let descriptor = resolve_descriptor(tree, element, || self.descriptor());
        descriptor.set(tree, element, value.into_value())
    }

    /// Locks the property at its current value.
    pub fn lock(&self, tree: &mut Tree, element: ElementKey) -> Result<(), TesseraError> {
        tree.lock_value(element, &self.descriptor())
    }

    pub fn is_locked(&self, tree: &Tree, element: ElementKey) -> bool {
        tree.is_value_locked(element, self.id)
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

/// Typed handle of a single-link property.
#[derive(Debug, Clone, Copy)]
pub struct LinkProperty {
    id: Id,
    name: &'static str,
}

impl LinkProperty {
    pub const fn new(id: Id, name: &'static str) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> Id {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor::new(self.id, self.name, Value::Link(Id::EMPTY))
    }

    /// The raw target identifier ([`Id::EMPTY`] when unset).
    pub fn target(&self, tree: &Tree, element: ElementKey) -> Id {
        match tree.stored_value_by_id(element, self.id) {
            Some(Value::Link(id)) => id,
            _ => Id::EMPTY,
        }
    }

    pub fn set(&self, tree: &mut Tree, element: ElementKey, target: Id) -> Result<(), TesseraError> {
        let descriptor = resolve_descriptor(tree, element, || self.descriptor());
        descriptor.set(tree, element, Value::Link(target))
    }

    /// Resolves the link and reports its health.
    pub fn status(&self, tree: &Tree, element: ElementKey) -> LinkStatus {
        tree.link_status(element, self.id)
    }

    /// The resolved target element, if one was found.
    ///
    /// This only reflects the element flag of [`LinkStatus`]: inside a
    /// detached subtree the target is still found among its siblings while
    /// the document flag is `false`. Use [`LinkProperty::status`] and
    /// [`LinkStatus::is_valid`] when both must hold.
    pub fn load(&self, tree: &Tree, element: ElementKey) -> Option<ElementKey> {
        self.status(tree, element).element()
    }
}

/// Typed handle of an ordered link-array property.
#[derive(Debug, Clone, Copy)]
pub struct LinkArrayProperty {
    id: Id,
    name: &'static str,
}

impl LinkArrayProperty {
    pub const fn new(id: Id, name: &'static str) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> Id {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor::new(self.id, self.name, Value::LinkArray(Vec::new()))
    }

    /// Member identifiers in order.
    pub fn targets(&self, tree: &Tree, element: ElementKey) -> Vec<Id> {
        match tree.stored_value_by_id(element, self.id) {
            Some(Value::LinkArray(ids)) => ids,
            _ => Vec::new(),
        }
    }

    pub fn set(&self, tree: &mut Tree, element: ElementKey, targets: Vec<Id>) -> Result<(), TesseraError> {
        let descriptor = resolve_descriptor(tree, element, || self.descriptor());
        descriptor.set(tree, element, Value::LinkArray(targets))
    }

    /// Appends a member.
    pub fn push(&self, tree: &mut Tree, element: ElementKey, target: Id) -> Result<(), TesseraError> {
        let mut targets = self.targets(tree, element);
        targets.push(target);
        self.set(tree, element, targets)
    }

    /// Removes every member equal to `target`. Returns `true` if any was
    /// removed.
    pub fn remove(&self, tree: &mut Tree, element: ElementKey, target: Id) -> Result<bool, TesseraError> {
        let mut targets = self.targets(tree, element);
        let before = targets.len();
        targets.retain(|id| *id != target);
        if targets.len() == before {
            return Ok(false);
        }
        self.set(tree, element, targets)?;
        Ok(true)
    }

    pub fn status(&self, tree: &Tree, element: ElementKey) -> LinkArrayStatus {
        tree.link_array_status(element, self.id)
    }
}

/// Typed handle of a parent-style back-reference.
#[derive(Debug, Clone, Copy)]
pub struct ParentLinkProperty {
    id: Id,
    name: &'static str,
}

impl ParentLinkProperty {
    pub const fn new(id: Id, name: &'static str) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> Id {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor::parent_link(self.id, self.name)
    }

    pub fn target(&self, tree: &Tree, element: ElementKey) -> Id {
        match tree.stored_value_by_id(element, self.id) {
            Some(Value::Link(id)) => id,
            _ => Id::EMPTY,
        }
    }

    /// Points the back-reference at `target` and refreshes its status.
    pub fn set(&self, tree: &mut Tree, element: ElementKey, target: Id) -> Result<LinkStatus, TesseraError> {
        let descriptor = resolve_descriptor(tree, element, || self.descriptor());
        descriptor.set(tree, element, Value::Link(target))?;
        Ok(self.refresh(tree, element))
    }

    /// Re-resolves the back-reference and stores the result.
    pub fn refresh(&self, tree: &mut Tree, element: ElementKey) -> LinkStatus {
        tree.refresh_parent_link(element, self.id)
    }

    /// The status recorded by the last refresh.
    pub fn status(&self, tree: &Tree, element: ElementKey) -> LinkStatus {
        tree.parent_link_status(element, self.id)
    }
}
