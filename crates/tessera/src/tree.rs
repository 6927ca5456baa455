//! Element tree: ownership, traversal and root discovery.
//!
//! Elements live in an arena owned by a [`Tree`] and are addressed by
//! [`ElementKey`]. Ownership flows strictly from parent to child through each
//! element's child list; the child's back-reference to its owner is a plain
//! key, never a shared pointer.
//!
//! # Architecture
//!
//! - [`Element`]: identity, name, kind tag, children, and optional stored
//!   property payload ([`crate::data::DataNode`])
//! - [`Owner`]: an element's owner, either another element or the tree root
//! - [`Matcher`]: kind filter plus optional predicate used by every traversal
//! - [`Children`] / [`Descendants`]: lazy, finite, restartable iterators over
//!   direct children and pre-order descendants
//!
//! Invariant: for every attached element `c` with owner `Owner::Element(p)`,
//! `p`'s child list contains `c` exactly once, and every key in a child list
//! points back at its parent.

use std::fmt;

use log::trace;

use tessera_core::identifier::{ClassName, Id};

use crate::{data::DataNode, error::TesseraError};

/// Kind tag of the per-element values container.
pub const VALUES_CLASS: &str = "Values";

/// Kind tag of stored property nodes.
pub const DATA_CLASS: &str = "Data";

/// Arena index of an element.
///
/// Keys are only meaningful for the tree that issued them. A key whose
/// element was deleted is stale: [`Tree::get`] returns `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(usize);

/// The owner of an attached element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Owned by another element.
    Element(ElementKey),
    /// Attached directly to the tree root (the document).
    Root,
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub struct Element {
    id: Id,
    name: String,
    class_name: ClassName,
    owner: Option<Owner>,
    children: Vec<ElementKey>,
    pub(crate) data: Option<DataNode>,
}

impl Element {
    fn new(id: Id, class_name: ClassName, name: String) -> Self {
        Self {
            id,
            name,
            class_name,
            owner: None,
            children: Vec::new(),
            data: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> ClassName {
        self.class_name
    }

    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    /// The owning element, if the owner is an element.
    pub fn parent(&self) -> Option<ElementKey> {
        match self.owner {
            Some(Owner::Element(parent)) => Some(parent),
            _ => None,
        }
    }

    pub fn children(&self) -> &[ElementKey] {
        &self.children
    }

    /// The stored property payload, for data nodes.
    pub fn data(&self) -> Option<&DataNode> {
        self.data.as_ref()
    }

    /// Returns `true` if this element is of `kind`.
    pub fn is_kind(&self, kind: ClassName) -> bool {
        self.class_name == kind
    }

    /// Capability query behind every traversal: kind filter plus predicate.
    ///
    /// A `None` kind matches every kind; a `None` predicate accepts every
    /// element of the matching kind.
    pub fn matches(&self, kind: Option<ClassName>, predicate: Option<&dyn Fn(&Element) -> bool>) -> bool {
        kind.is_none_or(|kind| self.class_name == kind) && predicate.is_none_or(|predicate| predicate(self))
    }
}

/// Kind filter plus optional predicate.
///
/// # Examples
///
/// ```
/// use tessera::tree::{Matcher, Tree};
/// use tessera_core::identifier::ClassName;
///
/// let table = ClassName::new("Table");
/// let mut tree = Tree::new();
/// let design = tree.create(ClassName::new("Design"), "Design");
/// let users = tree.create(table, "Users");
/// tree.append_child(design, users).unwrap();
///
/// let named_users = |element: &tessera::tree::Element| element.name() == "Users";
/// let matcher = Matcher::kind(table).filter(&named_users);
/// assert_eq!(tree.find_child(design, &matcher), Some(users));
/// ```
#[derive(Clone, Copy, Default)]
pub struct Matcher<'p> {
    kind: Option<ClassName>,
    predicate: Option<&'p dyn Fn(&Element) -> bool>,
}

impl<'p> Matcher<'p> {
    /// Matches every element.
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches elements of `kind`.
    pub fn kind(kind: ClassName) -> Self {
        Self {
            kind: Some(kind),
            predicate: None,
        }
    }

    /// Adds a predicate on top of the kind filter.
    pub fn filter(mut self, predicate: &'p dyn Fn(&Element) -> bool) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn matches(&self, element: &Element) -> bool {
        element.matches(self.kind, self.predicate)
    }
}

impl fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("kind", &self.kind)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// One entry of an element's full ancestor chain.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// A segment contributed by the root holder (a document, or a
    /// container of documents).
    Root { id: Id, name: String },
    /// An element of the tree.
    Element(ElementKey),
}

/// Holder of a tree's root, asked to contribute the front of every path.
///
/// The tree does not know what owns it; whatever does (a document, or a
/// solution of documents) supplies its own prefix.
pub trait TreeRoot {
    fn tree_prefix(&self) -> Vec<PathSegment>;
}

/// Arena of elements with parent/child ownership.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    slots: Vec<Option<Element>>,
    live: usize,
    roots: Vec<ElementKey>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element with a freshly generated identifier.
    pub fn create(&mut self, class_name: ClassName, name: impl Into<String>) -> ElementKey {
        self.create_with_id(Id::generate(), class_name, name)
    }

    /// Creates a detached element with the given identifier.
    pub fn create_with_id(
        &mut self,
        id: Id,
        class_name: ClassName,
        name: impl Into<String>,
    ) -> ElementKey {
        let key = ElementKey(self.slots.len());
        self.slots
            .push(Some(Element::new(id, class_name, name.into())));
        self.live += 1;
        key
    }

    /// Returns the element for `key`, or `None` if it was deleted.
    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.slots.get(key.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.slots.get_mut(key.0).and_then(Option::as_mut)
    }

    /// Returns the element for `key`.
    ///
    /// # Panics
    /// Panics if the key is stale. Keys handed out by this tree stay valid
    /// until [`Tree::delete`] removes their element.
    pub fn element(&self, key: ElementKey) -> &Element {
        self.get(key).expect("element key is stale")
    }

    pub(crate) fn element_mut(&mut self, key: ElementKey) -> &mut Element {
        self.get_mut(key).expect("element key is stale")
    }

    fn checked(&self, key: ElementKey) -> Result<&Element, TesseraError> {
        self.get(key)
            .ok_or_else(|| TesseraError::Tree(format!("element key {} is stale", key.0)))
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of live elements, attached or not.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Number of slots ever handed out, deleted ones included.
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements attached directly to the root, in order.
    pub fn roots(&self) -> &[ElementKey] {
        &self.roots
    }

    /// Direct children of `key` (empty for stale keys).
    pub fn children(&self, key: ElementKey) -> &[ElementKey] {
        self.get(key).map(Element::children).unwrap_or_default()
    }

    pub fn parent(&self, key: ElementKey) -> Option<ElementKey> {
        self.get(key).and_then(Element::parent)
    }

    pub fn set_name(&mut self, key: ElementKey, name: impl Into<String>) -> Result<(), TesseraError> {
        self.checked(key)?;
        self.element_mut(key).name = name.into();
        Ok(())
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `key`.
    pub fn is_ancestor(&self, ancestor: ElementKey, key: ElementKey) -> bool {
        let mut current = self.parent(key);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// Idempotent if `child` is already a direct child of `parent`.
    /// Otherwise `child` is first detached from any current owner.
    ///
    /// # Errors
    ///
    /// Fails for stale keys and when the append would create a cycle.
    pub fn append_child(&mut self, parent: ElementKey, child: ElementKey) -> Result<(), TesseraError> {
        let index = self.checked(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` among the children of `parent`.
    ///
    /// If `child` is already a direct child of `parent` it stays where it is.
    pub fn insert_child(
        &mut self,
        parent: ElementKey,
        index: usize,
        child: ElementKey,
    ) -> Result<(), TesseraError> {
        self.checked(parent)?;
        if self.checked(child)?.parent() == Some(parent) {
            return Ok(());
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TesseraError::Tree(
                "an element cannot be appended to itself or its descendant".to_string(),
            ));
        }

        self.detach(child);
        let parent_element = self.element_mut(parent);
        let index = index.min(parent_element.children.len());
        parent_element.children.insert(index, child);
        self.element_mut(child).owner = Some(Owner::Element(parent));
        trace!(parent = parent.0, child = child.0; "Appended child");
        Ok(())
    }

    /// Removes `child` from `parent`'s children.
    ///
    /// Returns `false` (and changes nothing) if `child` is not a direct child
    /// of `parent`. The removed element stays alive, detached.
    pub fn remove_child(&mut self, parent: ElementKey, child: ElementKey) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Attaches `child` directly to the root, detaching it first.
    pub fn attach_root(&mut self, child: ElementKey) -> Result<(), TesseraError> {
        if self.checked(child)?.owner == Some(Owner::Root) {
            return Ok(());
        }
        self.detach(child);
        self.roots.push(child);
        self.element_mut(child).owner = Some(Owner::Root);
        Ok(())
    }

    /// Detaches `key` from its owner, if any.
    pub fn detach(&mut self, key: ElementKey) {
        let Some(owner) = self.get(key).and_then(Element::owner) else {
            return;
        };
        match owner {
            Owner::Element(parent) => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.children.retain(|existing| *existing != key);
                }
            }
            Owner::Root => self.roots.retain(|existing| *existing != key),
        }
        self.element_mut(key).owner = None;
    }

    /// Detaches `key` and destroys it together with its whole subtree.
    ///
    /// Returns `false` for stale keys.
    pub fn delete(&mut self, key: ElementKey) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.detach(key);
        let mut pending = vec![key];
        while let Some(current) = pending.pop() {
            if let Some(element) = self.slots.get_mut(current.0).and_then(Option::take) {
                self.live -= 1;
                pending.extend(element.children);
            }
        }
        true
    }

    /// The top-most element ancestor of `key` (`key` itself if detached or
    /// attached to the root).
    pub fn top(&self, key: ElementKey) -> ElementKey {
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Returns `true` if `key` is reachable from the root.
    pub fn is_rooted(&self, key: ElementKey) -> bool {
        self.get(self.top(key))
            .is_some_and(|top| top.owner == Some(Owner::Root))
    }

    /// First direct child of `parent` accepted by `matcher`.
    pub fn find_child(&self, parent: ElementKey, matcher: &Matcher<'_>) -> Option<ElementKey> {
        self.children_matching(parent, *matcher).next()
    }

    /// First descendant of `parent`, in pre-order, accepted by `matcher`.
    pub fn find_descendant(&self, parent: ElementKey, matcher: &Matcher<'_>) -> Option<ElementKey> {
        self.descendants_matching(parent, *matcher).next()
    }

    /// All direct children of `parent` accepted by `matcher`.
    pub fn children_matching<'t, 'p>(
        &'t self,
        parent: ElementKey,
        matcher: Matcher<'p>,
    ) -> Children<'t, 'p> {
        Children {
            tree: self,
            matcher,
            keys: self.children(parent).iter(),
        }
    }

    /// All descendants of `parent`, depth-first pre-order, accepted by
    /// `matcher`. `parent` itself is not visited.
    pub fn descendants_matching<'t, 'p>(
        &'t self,
        parent: ElementKey,
        matcher: Matcher<'p>,
    ) -> Descendants<'t, 'p> {
        Descendants {
            tree: self,
            matcher,
            stack: self.children(parent).iter().rev().copied().collect(),
        }
    }

    /// Nearest strict element ancestor of `key` accepted by `matcher`.
    ///
    /// Walks upward through element owners only and stops at the root.
    pub fn owner(&self, key: ElementKey, matcher: &Matcher<'_>) -> Option<ElementKey> {
        let mut current = self.parent(key);
        while let Some(parent) = current {
            if matcher.matches(self.element(parent)) {
                return Some(parent);
            }
            current = self.parent(parent);
        }
        None
    }

    pub fn has_owner(&self, key: ElementKey, matcher: &Matcher<'_>) -> bool {
        self.owner(key, matcher).is_some()
    }

    /// Depth-first search for a model element with identifier `id`, starting
    /// at (and including) `scope`.
    ///
    /// Values containers are not searched: data nodes carry their property's
    /// identifier, which is shared across elements of a kind.
    pub fn find_by_id(&self, scope: ElementKey, id: Id) -> Option<ElementKey> {
        if id.is_empty() {
            return None;
        }
        let values = ClassName::new(VALUES_CLASS);
        let mut stack = vec![scope];
        while let Some(current) = stack.pop() {
            let Some(element) = self.get(current) else {
                continue;
            };
            if element.class_name == values {
                continue;
            }
            if element.id == id {
                return Some(current);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        None
    }

    /// [`Tree::find_by_id`] over every root-attached element, in order.
    pub fn find_rooted(&self, id: Id) -> Option<ElementKey> {
        self.roots
            .iter()
            .find_map(|root| self.find_by_id(*root, id))
    }

    /// Full ancestor chain of `key`, front (root) to back (`key`).
    ///
    /// When the chain ends at the tree root, `root` contributes the prefix.
    pub fn path(&self, key: ElementKey, root: Option<&dyn TreeRoot>) -> Vec<PathSegment> {
        let mut chain = vec![key];
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }

        let mut path = match root {
            Some(root) if self.is_rooted(key) => root.tree_prefix(),
            _ => Vec::new(),
        };
        path.extend(chain.into_iter().rev().map(PathSegment::Element));
        path
    }
}

/// Lazy iterator over matching direct children.
#[derive(Clone)]
pub struct Children<'t, 'p> {
    tree: &'t Tree,
    matcher: Matcher<'p>,
    keys: std::slice::Iter<'t, ElementKey>,
}

impl Iterator for Children<'_, '_> {
    type Item = ElementKey;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let matcher = self.matcher;
        self.keys
            .by_ref()
            .copied()
            .find(|key| tree.get(*key).is_some_and(|element| matcher.matches(element)))
    }
}

/// Lazy pre-order cursor over matching descendants.
///
/// Holds an explicit stack of pending keys, so iteration is finite for any
/// tree and can be restarted by cloning the cursor before advancing it.
#[derive(Clone)]
pub struct Descendants<'t, 'p> {
    tree: &'t Tree,
    matcher: Matcher<'p>,
    stack: Vec<ElementKey>,
}

impl Iterator for Descendants<'_, '_> {
    type Item = ElementKey;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.stack.pop() {
            let Some(element) = self.tree.get(key) else {
                continue;
            };
            self.stack.extend(element.children.iter().rev().copied());
            if self.matcher.matches(element) {
                return Some(key);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRoot;

    impl TreeRoot for TestRoot {
        fn tree_prefix(&self) -> Vec<PathSegment> {
            vec![PathSegment::Root {
                id: Id::EMPTY,
                name: "doc".to_string(),
            }]
        }
    }

    fn kinds() -> (ClassName, ClassName, ClassName) {
        (
            ClassName::new("Design"),
            ClassName::new("Table"),
            ClassName::new("Field"),
        )
    }

    /// design
    /// ├── t1
    /// │   ├── f1
    /// │   └── f2
    /// └── t2
    ///     └── f3
    fn sample() -> (Tree, [ElementKey; 6]) {
        let (design_kind, table, field) = kinds();
        let mut tree = Tree::new();
        let design = tree.create(design_kind, "Design");
        let t1 = tree.create(table, "Users");
        let t2 = tree.create(table, "Orders");
        let f1 = tree.create(field, "Id");
        let f2 = tree.create(field, "Name");
        let f3 = tree.create(field, "Id");
        tree.attach_root(design).unwrap();
        tree.append_child(design, t1).unwrap();
        tree.append_child(design, t2).unwrap();
        tree.append_child(t1, f1).unwrap();
        tree.append_child(t1, f2).unwrap();
        tree.append_child(t2, f3).unwrap();
        (tree, [design, t1, t2, f1, f2, f3])
    }

    #[test]
    fn test_append_sets_parent_and_child_list() {
        let (_, table, _) = kinds();
        let mut tree = Tree::new();
        let parent = tree.create(table, "Users");
        let child = tree.create(table, "Child");

        tree.append_child(parent, child).unwrap();

        assert_eq!(tree.parent(child), Some(parent));
        assert_eq!(tree.children(parent), &[child]);
    }

    #[test]
    fn test_append_is_idempotent() {
        let (_, table, _) = kinds();
        let mut tree = Tree::new();
        let parent = tree.create(table, "a");
        let other = tree.create(table, "b");
        let child = tree.create(table, "c");

        tree.append_child(parent, child).unwrap();
        tree.append_child(parent, other).unwrap();
        tree.append_child(parent, child).unwrap();

        assert_eq!(tree.children(parent), &[child, other]);
    }

    #[test]
    fn test_reparent_detaches_first() {
        let (_, table, _) = kinds();
        let mut tree = Tree::new();
        let first = tree.create(table, "a");
        let second = tree.create(table, "b");
        let child = tree.create(table, "c");

        tree.append_child(first, child).unwrap();
        tree.append_child(second, child).unwrap();

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), &[child]);
        assert_eq!(tree.parent(child), Some(second));
    }

    #[test]
    fn test_remove_child() {
        let (tree_before, [_, t1, t2, f1, _, _]) = sample();
        let mut tree = tree_before;

        assert!(!tree.remove_child(t2, f1));
        assert!(tree.remove_child(t1, f1));
        assert_eq!(tree.parent(f1), None);
        assert!(!tree.children(t1).contains(&f1));
        assert!(tree.contains(f1));
        assert!(!tree.remove_child(t1, f1));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let (mut tree, [design, t1, _, f1, _, _]) = sample();
        assert!(tree.append_child(f1, t1).is_err());
        assert!(tree.append_child(t1, t1).is_err());
        assert!(tree.append_child(f1, design).is_err());
        assert_eq!(tree.parent(t1), Some(design));
    }

    #[test]
    fn test_root_and_parent_are_exclusive() {
        let (mut tree, [design, t1, _, _, _, _]) = sample();
        tree.attach_root(t1).unwrap();
        assert_eq!(tree.element(t1).owner(), Some(Owner::Root));
        assert!(!tree.children(design).contains(&t1));
        assert_eq!(tree.roots(), &[design, t1]);

        tree.append_child(design, t1).unwrap();
        assert_eq!(tree.roots(), &[design]);
    }

    #[test]
    fn test_find_child_and_descendant() {
        let (tree, [design, t1, t2, f1, _, f3]) = sample();
        let (_, table, field) = kinds();

        assert_eq!(tree.find_child(design, &Matcher::kind(table)), Some(t1));
        assert_eq!(tree.find_child(design, &Matcher::kind(field)), None);
        assert_eq!(tree.find_descendant(design, &Matcher::kind(field)), Some(f1));

        let in_orders = |element: &Element| element.name() == "Orders";
        assert_eq!(
            tree.find_child(design, &Matcher::kind(table).filter(&in_orders)),
            Some(t2)
        );

        let id_fields: Vec<_> = {
            let named_id = |element: &Element| element.name() == "Id";
            tree.descendants_matching(design, Matcher::kind(field).filter(&named_id))
                .collect()
        };
        assert_eq!(id_fields, vec![f1, f3]);
    }

    #[test]
    fn test_descendants_pre_order_and_restartable() {
        let (tree, [design, t1, t2, f1, f2, f3]) = sample();

        let cursor = tree.descendants_matching(design, Matcher::any());
        let first: Vec<_> = cursor.clone().collect();
        let second: Vec<_> = cursor.collect();

        assert_eq!(first, vec![t1, f1, f2, t2, f3]);
        assert_eq!(first, second);

        let children: Vec<_> = tree.children_matching(design, Matcher::any()).collect();
        assert_eq!(children, vec![t1, t2]);
    }

    #[test]
    fn test_owner_queries() {
        let (tree, [design, t1, _, f1, _, _]) = sample();
        let (design_kind, table, field) = kinds();

        assert_eq!(tree.owner(f1, &Matcher::kind(table)), Some(t1));
        assert_eq!(tree.owner(f1, &Matcher::kind(design_kind)), Some(design));
        assert!(!tree.has_owner(f1, &Matcher::kind(field)));
        assert!(!tree.has_owner(design, &Matcher::any()));
    }

    #[test]
    fn test_find_by_id() {
        let (tree, [design, _, t2, _, f2, _]) = sample();
        let id = tree.element(f2).id();

        assert_eq!(tree.find_by_id(design, id), Some(f2));
        assert_eq!(tree.find_by_id(t2, id), None);
        assert_eq!(tree.find_rooted(id), Some(f2));
        assert_eq!(tree.find_rooted(Id::EMPTY), None);
    }

    #[test]
    fn test_path_with_root_prefix() {
        let (tree, [design, t1, _, f1, _, _]) = sample();

        let path = tree.path(f1, Some(&TestRoot));
        assert_eq!(path.len(), 4);
        assert!(matches!(&path[0], PathSegment::Root { name, .. } if name == "doc"));
        assert_eq!(
            &path[1..],
            &[
                PathSegment::Element(design),
                PathSegment::Element(t1),
                PathSegment::Element(f1)
            ]
        );
    }

    #[test]
    fn test_path_detached_has_no_prefix() {
        let (mut tree, [_, t1, _, f1, _, _]) = sample();
        tree.detach(t1);
        assert_eq!(
            tree.path(f1, Some(&TestRoot)),
            vec![PathSegment::Element(t1), PathSegment::Element(f1)]
        );
        assert!(!tree.is_rooted(f1));
    }

    #[test]
    fn test_delete_subtree() {
        let (mut tree, [design, t1, t2, f1, f2, f3]) = sample();
        assert!(tree.delete(t1));

        assert!(!tree.contains(t1));
        assert!(!tree.contains(f1));
        assert!(!tree.contains(f2));
        assert_eq!(tree.children(design), &[t2]);
        assert!(tree.contains(f3));
        assert!(!tree.delete(t1));
        assert_eq!(tree.len(), 3);
    }
}
