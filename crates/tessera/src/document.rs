//! Documents: the root of an element tree and its persistence.
//!
//! A [`Document`] owns one [`Tree`] whose root-attached elements are design
//! subtrees. Exactly one design is active; duplicates that arrive through
//! deserialization are folded into the first one by
//! [`Document::reconcile_designs`].
//!
//! Loading replaces the whole tree at once: a document is either fully read,
//! initialized and swapped in, or left exactly as it was.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};
use tempfile::NamedTempFile;

use tessera_core::identifier::{ClassName, Id};

use crate::{
    error::TesseraError,
    property,
    serialize::{self, ParsedDocument},
    tree::{DATA_CLASS, Element, ElementKey, Matcher, PathSegment, Tree, TreeRoot, VALUES_CLASS},
};

/// A persistent designer document.
#[derive(Debug, Clone)]
pub struct Document {
    id: Id,
    name: String,
    tree: Tree,
}

impl Document {
    /// Creates an empty document with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::generate(),
            name: name.into(),
            tree: Tree::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access to the tree.
    ///
    /// Direct mutation bypasses any controller invariants (cascades,
    /// renames); designer-facing callers go through a controller.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The active design.
    pub fn design(&self) -> Option<ElementKey> {
        self.tree.roots().first().copied()
    }

    /// Every root-attached design, in document order.
    pub fn designs(&self) -> &[ElementKey] {
        self.tree.roots()
    }

    /// Creates a design of `kind` and makes it the only design.
    pub fn create_design(&mut self, kind: ClassName, name: impl Into<String>) -> Result<ElementKey, TesseraError> {
        let design = self.tree.create(kind, name);
        self.set_design(design)?;
        Ok(design)
    }

    /// Makes `design` the only design, deleting any other.
    pub fn set_design(&mut self, design: ElementKey) -> Result<(), TesseraError> {
        for existing in self.tree.roots().to_vec() {
            if existing != design {
                self.tree.delete(existing);
            }
        }
        self.tree.attach_root(design)
    }

    /// Depth-first search for an element by identifier across the document.
    pub fn find(&self, id: Id) -> Option<ElementKey> {
        self.tree.find_rooted(id)
    }

    /// Full chain from the document to `key`.
    pub fn path(&self, key: ElementKey) -> Vec<PathSegment> {
        self.tree.path(key, Some(self))
    }

    /// Collapses duplicate designs into the first one.
    ///
    /// The first design in document order is kept. Children of every other
    /// design are moved into it in document order, skipping children whose
    /// identifier the kept design already contains; the other designs are
    /// then deleted. Returns the number of designs removed.
    pub fn reconcile_designs(&mut self) -> Result<usize, TesseraError> {
        let designs = self.tree.roots().to_vec();
        let Some((primary, duplicates)) = designs.split_first() else {
            return Ok(0);
        };

        let values = ClassName::new(VALUES_CLASS);
        for duplicate in duplicates {
            for child in self.tree.children(*duplicate).to_vec() {
                let element = self.tree.element(child);
                if element.class_name() == values {
                    continue;
                }
                if self.tree.find_by_id(*primary, element.id()).is_some() {
                    trace!(id:% = element.id(); "Skipping duplicate design child");
                    continue;
                }
                self.tree.append_child(*primary, child)?;
            }
            self.tree.delete(*duplicate);
        }

        if !duplicates.is_empty() {
            info!(removed = duplicates.len(); "Reconciled duplicate designs");
        }
        Ok(duplicates.len())
    }

    /// Repairs structural artifacts left by generic reconstruction.
    ///
    /// Reconciles designs, folds duplicate values containers, then runs the
    /// registered initializer of every element's kind, in pre-order.
    pub fn initialize(&mut self) -> Result<(), TesseraError> {
        self.reconcile_designs()?;

        let values = ClassName::new(VALUES_CLASS);
        let data = ClassName::new(DATA_CLASS);
        let is_model = |element: &Element| element.class_name() != values && element.class_name() != data;

        let mut elements = Vec::new();
        for root in self.tree.roots() {
            elements.push(*root);
            elements.extend(
                self.tree
                    .descendants_matching(*root, Matcher::any().filter(&is_model)),
            );
        }

        for key in elements {
            self.tree.merge_values_containers(key)?;
            let kind = self.tree.element(key).class_name();
            if let Some(initializer) = property::registration(kind).and_then(|r| r.initializer_hook()) {
                initializer(&mut self.tree, key)?;
            }
        }
        debug!(document_id:% = self.id; "Initialized document");
        Ok(())
    }

    /// Serializes the document.
    pub fn to_xml(&self) -> Result<String, TesseraError> {
        serialize::write_document(self.id, &self.name, &self.tree)
    }

    /// Reads and initializes a document.
    ///
    /// # Errors
    ///
    /// Fails with the first problem found; nothing is returned on failure.
    pub fn from_xml(xml: &str) -> Result<Self, TesseraError> {
        let ParsedDocument { id, name, tree } = serialize::read_document(xml)?;
        let mut document = Self { id, name, tree };
        document.initialize()?;
        Ok(document)
    }

    /// Loads a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TesseraError> {
        let path = path.as_ref();
        info!(path:? = path; "Loading document");
        let xml = fs::read_to_string(path)?;
        let document = Self::from_xml(&xml)?;
        debug!(
            path:? = path,
            elements = document.tree.len();
            "Document loaded"
        );
        Ok(document)
    }

    /// Replaces this document with the one stored at `path`.
    ///
    /// On failure this document is left untouched.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), TesseraError> {
        *self = Self::load(path)?;
        Ok(())
    }

    /// Writes the document to `path` atomically.
    ///
    /// The document is written to a temporary file next to `path` and then
    /// renamed over it, so readers never observe a partial file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TesseraError> {
        let path = path.as_ref();
        let xml = self.to_xml()?;

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut file = NamedTempFile::new_in(&directory)?;
        file.write_all(xml.as_bytes())?;
        file.flush()?;
        file.persist(path).map_err(|err| err.error)?;

        info!(path:? = path, bytes = xml.len(); "Document saved");
        Ok(())
    }
}

impl TreeRoot for Document {
    fn tree_prefix(&self) -> Vec<PathSegment> {
        vec![PathSegment::Root {
            id: self.id,
            name: self.name.clone(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds() -> (ClassName, ClassName) {
        (ClassName::new("DocTestDesign"), ClassName::new("DocTestShape"))
    }

    #[test]
    fn test_create_design_replaces_existing() {
        let (design_kind, _) = kinds();
        let mut document = Document::new("doc");
        let first = document.create_design(design_kind, "First").unwrap();
        let second = document.create_design(design_kind, "Second").unwrap();

        assert_eq!(document.designs(), &[second]);
        assert!(!document.tree().contains(first));
    }

    #[test]
    fn test_path_starts_at_document() {
        let (design_kind, shape) = kinds();
        let mut document = Document::new("doc");
        let design = document.create_design(design_kind, "Design").unwrap();
        let element = document.tree_mut().create(shape, "A");
        document.tree_mut().append_child(design, element).unwrap();

        let path = document.path(element);
        assert_eq!(
            path,
            vec![
                PathSegment::Root {
                    id: document.id(),
                    name: "doc".to_string()
                },
                PathSegment::Element(design),
                PathSegment::Element(element),
            ]
        );
    }

    #[test]
    fn test_reconcile_merges_into_first_design() {
        let (design_kind, shape) = kinds();
        let mut document = Document::new("doc");
        let tree = document.tree_mut();

        let primary = tree.create(design_kind, "Design");
        let duplicate = tree.create(design_kind, "Design");
        let third = tree.create(design_kind, "Design");
        let shared_id = Id::generate();
        let a = tree.create_with_id(shared_id, shape, "A");
        let a_again = tree.create_with_id(shared_id, shape, "A");
        let b = tree.create(shape, "B");
        let c = tree.create(shape, "C");
        for root in [primary, duplicate, third] {
            tree.attach_root(root).unwrap();
        }
        tree.append_child(primary, a).unwrap();
        tree.append_child(duplicate, a_again).unwrap();
        tree.append_child(duplicate, b).unwrap();
        tree.append_child(third, c).unwrap();

        assert_eq!(document.reconcile_designs().unwrap(), 2);
        assert_eq!(document.designs(), &[primary]);
        assert_eq!(document.tree().children(primary), &[a, b, c]);
        assert!(!document.tree().contains(a_again));
    }

    #[test]
    fn test_xml_round_trip_keeps_identity() {
        let (design_kind, shape) = kinds();
        let mut document = Document::new("round & trip");
        let design = document.create_design(design_kind, "Design").unwrap();
        let element = document.tree_mut().create(shape, "A");
        document.tree_mut().append_child(design, element).unwrap();
        let element_id = document.tree().element(element).id();

        let xml = document.to_xml().unwrap();
        let restored = Document::from_xml(&xml).unwrap();

        assert_eq!(restored.id(), document.id());
        assert_eq!(restored.name(), "round & trip");
        let found = restored.find(element_id).unwrap();
        assert_eq!(restored.tree().element(found).name(), "A");
        assert_eq!(restored.tree().element(found).class_name(), shape);
    }
}
