//! Document to XML.

use std::fmt::Write;

use log::trace;
use quick_xml::escape::escape;

use tessera_core::{
    identifier::{ClassName, Id},
    value::Value,
};

use crate::{
    data::{DataKind, DataNode, LinkProvenance},
    error::TesseraError,
    property,
    serialize::{
        ATTR_DATA_EX, ATTR_DOCUMENT_ID, ATTR_DOCUMENT_NAME, ATTR_ELEMENT_ID, ATTR_ID,
        ATTR_MODULE_ID, ATTR_MODULE_NAME, ATTR_NAME, ATTR_ORDER, ATTR_TYPE, DOCUMENT_TAG,
    },
    tree::{DATA_CLASS, ElementKey, Tree, VALUES_CLASS},
};

const INDENT: &str = "  ";

/// Serializes the root-attached elements of `tree` as a document.
pub(crate) fn write_document(id: Id, name: &str, tree: &Tree) -> Result<String, TesseraError> {
    let mut xml = String::new();
    writeln!(xml, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(
        xml,
        r#"<{DOCUMENT_TAG} {ATTR_ID}="{id}" {ATTR_NAME}="{}">"#,
        escape(name)
    )?;
    for root in tree.roots() {
        write_element(&mut xml, tree, *root, 1)?;
    }
    writeln!(xml, "</{DOCUMENT_TAG}>")?;
    Ok(xml)
}

fn write_element(xml: &mut String, tree: &Tree, key: ElementKey, depth: usize) -> Result<(), TesseraError> {
    let element = tree.element(key);
    let class_name = element.class_name();
    let tag = class_name.as_string();
    let indent = INDENT.repeat(depth);

    let data: Vec<ElementKey> = tree
        .data_nodes(key)
        .into_iter()
        .filter(|node| !is_suppressed(tree, element.class_name(), *node))
        .collect();
    let children: Vec<ElementKey> = tree
        .children(key)
        .iter()
        .copied()
        .filter(|child| {
            let child_class = tree.element(*child).class_name();
            child_class != VALUES_CLASS && child_class != DATA_CLASS
        })
        .collect();

    write!(
        xml,
        r#"{indent}<{tag} {ATTR_ID}="{}" {ATTR_NAME}="{}""#,
        element.id(),
        escape(element.name())
    )?;
    if data.is_empty() && children.is_empty() {
        writeln!(xml, " />")?;
        return Ok(());
    }
    writeln!(xml, ">")?;

    if !data.is_empty() {
        writeln!(xml, "{indent}{INDENT}<{VALUES_CLASS}>")?;
        for node in data {
            write_data(xml, tree, node, depth + 2)?;
        }
        writeln!(xml, "{indent}{INDENT}</{VALUES_CLASS}>")?;
    }
    for child in children {
        write_element(xml, tree, child, depth + 1)?;
    }
    writeln!(xml, "{indent}</{tag}>")?;
    Ok(())
}

/// A stored value equal to its registered default is not written.
///
/// Values of unregistered properties are always written so that unknown
/// content survives a load/save cycle.
fn is_suppressed(tree: &Tree, owner_class: ClassName, key: ElementKey) -> bool {
    let Some(node) = tree.data_node(key) else {
        return true;
    };
    let Some(descriptor) = property::descriptor(owner_class, tree.element(key).id()) else {
        return false;
    };
    let suppressed = node.provenance().is_empty()
        && node.inner_text().is_empty()
        && tree.data_value(key).as_ref() == Some(descriptor.default_value());
    if suppressed {
        trace!(property = descriptor.name(); "Suppressed default value");
    }
    suppressed
}

fn write_data(xml: &mut String, tree: &Tree, key: ElementKey, depth: usize) -> Result<(), TesseraError> {
    let element = tree.element(key);
    let Some(node) = element.data() else {
        return Ok(());
    };
    let indent = INDENT.repeat(depth);

    write!(
        xml,
        r#"{indent}<{DATA_CLASS} {ATTR_NAME}="{}" {ATTR_ID}="{}""#,
        escape(element.name()),
        element.id()
    )?;

    match node.kind() {
        DataKind::Scalar => {
            write!(xml, r#" {ATTR_TYPE}="{}""#, node.value_type())?;
            let text = node.data().map(Value::to_text).unwrap_or_default();
            close_with_text(xml, &text)?;
        }
        DataKind::Link | DataKind::ParentLink => {
            if let Some(tag) = node.kind().link_tag() {
                write!(xml, r#" {ATTR_TYPE}="{tag}""#)?;
            }
            write_link_attributes(xml, node)?;
            close_with_text(xml, node.inner_text())?;
        }
        DataKind::LinkArray => {
            write!(xml, r#" {ATTR_TYPE}="{}""#, node.value_type())?;
            let members = ordered_members(tree, key);
            if members.is_empty() {
                writeln!(xml, " />")?;
                return Ok(());
            }
            writeln!(xml, ">")?;
            for (order, member) in members.into_iter().enumerate() {
                write!(
                    xml,
                    r#"{indent}{INDENT}<{DATA_CLASS} {ATTR_ORDER}="{order}" {ATTR_TYPE}="{}""#,
                    DataKind::Link.link_tag().unwrap_or_default()
                )?;
                write_link_attributes(xml, member)?;
                close_with_text(xml, member.inner_text())?;
            }
            writeln!(xml, "{indent}</{DATA_CLASS}>")?;
        }
    }
    Ok(())
}

fn ordered_members(tree: &Tree, key: ElementKey) -> Vec<&DataNode> {
    let mut members: Vec<&DataNode> = tree
        .children(key)
        .iter()
        .filter_map(|member| tree.data_node(*member))
        .collect();
    members.sort_by_key(|member| member.order().unwrap_or(i32::MAX));
    members
}

fn write_link_attributes(xml: &mut String, node: &DataNode) -> Result<(), TesseraError> {
    write!(
        xml,
        r#" {ATTR_ELEMENT_ID}="{}""#,
        node.target().unwrap_or(Id::EMPTY)
    )?;
    let provenance: &LinkProvenance = node.provenance();
    if let Some(id) = provenance.document_id() {
        write!(xml, r#" {ATTR_DOCUMENT_ID}="{id}""#)?;
    }
    if let Some(name) = provenance.document_name() {
        write!(xml, r#" {ATTR_DOCUMENT_NAME}="{}""#, escape(name))?;
    }
    if let Some(id) = provenance.module_id() {
        write!(xml, r#" {ATTR_MODULE_ID}="{id}""#)?;
    }
    if let Some(name) = provenance.module_name() {
        write!(xml, r#" {ATTR_MODULE_NAME}="{}""#, escape(name))?;
    }
    if let Some(data_ex) = provenance.data_ex() {
        write!(xml, r#" {ATTR_DATA_EX}="{}""#, escape(data_ex))?;
    }
    Ok(())
}

fn close_with_text(xml: &mut String, text: &str) -> Result<(), TesseraError> {
    if text.is_empty() {
        writeln!(xml, " />")?;
    } else {
        writeln!(xml, ">{}</{DATA_CLASS}>", escape(text))?;
    }
    Ok(())
}
