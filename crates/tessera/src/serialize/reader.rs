//! XML to document.
//!
//! Reading is strict about structure and value encodings and tolerant of
//! attributes it does not recognize. The first failure aborts the read; the
//! partially built tree is discarded with the reader.

use std::collections::HashMap;

use log::{debug, trace};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use tessera_core::{
    convert,
    identifier::{ClassName, Id},
    value::{Value, ValueType},
};

use crate::{
    data::{DataKind, DataNode, LinkProvenance, PARENT_LINK_TAG},
    error::TesseraError,
    property,
    serialize::{
        ATTR_DATA_EX, ATTR_DOCUMENT_ID, ATTR_DOCUMENT_NAME, ATTR_ELEMENT_ID, ATTR_ID,
        ATTR_MODULE_ID, ATTR_MODULE_NAME, ATTR_NAME, ATTR_ORDER, ATTR_TYPE, DOCUMENT_TAG,
    },
    tree::{DATA_CLASS, ElementKey, Tree, VALUES_CLASS},
};

/// The result of reading a document.
#[derive(Debug)]
pub(crate) struct ParsedDocument {
    pub id: Id,
    pub name: String,
    pub tree: Tree,
}

/// Where the reader currently is.
enum Frame {
    Document,
    Element(ElementKey),
    Values(ElementKey),
    /// A scalar, link or parent-link data node waiting for its text.
    Data(PendingData),
    LinkArray(ElementKey),
    /// A link-array member waiting for its text.
    Member(PendingMember),
}

struct PendingData {
    container: ElementKey,
    id: Id,
    name: String,
    kind: DataKind,
    value_type: ValueType,
    target: Id,
    provenance: LinkProvenance,
    text: String,
}

struct PendingMember {
    array: ElementKey,
    target: Id,
    order: i32,
    provenance: LinkProvenance,
    text: String,
}

/// Attributes of one start tag, unescaped.
struct Attributes(HashMap<String, String>);

impl Attributes {
    fn read(start: &BytesStart<'_>) -> Result<Self, TesseraError> {
        let mut attributes = HashMap::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = utf8(attribute.key.as_ref())?.to_string();
            let value = attribute.unescape_value()?.into_owned();
            attributes.insert(key, value);
        }
        Ok(Self(attributes))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn id(&self, name: &str) -> Result<Option<Id>, TesseraError> {
        self.get(name).map(Id::parse).transpose().map_err(Into::into)
    }

    fn provenance(&self) -> Result<LinkProvenance, TesseraError> {
        Ok(LinkProvenance::new()
            .with_document(
                self.id(ATTR_DOCUMENT_ID)?,
                self.get(ATTR_DOCUMENT_NAME).map(str::to_string),
            )
            .with_module(
                self.id(ATTR_MODULE_ID)?,
                self.get(ATTR_MODULE_NAME).map(str::to_string),
            )
            .with_data_ex(self.get(ATTR_DATA_EX).map(str::to_string)))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, TesseraError> {
    std::str::from_utf8(bytes).map_err(|err| TesseraError::structure(format!("invalid UTF-8: {err}")))
}

struct DocumentReader {
    tree: Tree,
    id: Id,
    name: String,
    stack: Vec<Frame>,
    finished: bool,
}

/// Reads a whole document.
///
/// # Errors
///
/// Fails on malformed XML, on structure that is not a document, and on any
/// value that does not parse as its declared type.
pub(crate) fn read_document(xml: &str) -> Result<ParsedDocument, TesseraError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut state = DocumentReader {
        tree: Tree::new(),
        id: Id::EMPTY,
        name: String::new(),
        stack: Vec::new(),
        finished: false,
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => state.start(&start)?,
            Event::Empty(start) => {
                state.start(&start)?;
                state.end()?;
            }
            Event::End(_) => state.end()?,
            Event::Text(text) => state.text(&text.unescape()?)?,
            Event::CData(data) => state.text(utf8(&data)?)?,
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !state.finished {
        return Err(TesseraError::structure("missing <Document> root"));
    }
    debug!(document_id:% = state.id, elements = state.tree.len(); "Read document");
    Ok(ParsedDocument {
        id: state.id,
        name: state.name,
        tree: state.tree,
    })
}

impl DocumentReader {
    fn start(&mut self, start: &BytesStart<'_>) -> Result<(), TesseraError> {
        let tag = utf8(start.name().as_ref())?.to_string();
        let attributes = Attributes::read(start)?;

        let frame = match self.stack.last() {
            None if self.finished => {
                return Err(TesseraError::structure(format!(
                    "unexpected <{tag}> after the document root"
                )));
            }
            None => {
                if tag != DOCUMENT_TAG {
                    return Err(TesseraError::structure(format!(
                        "expected <{DOCUMENT_TAG}> root, found <{tag}>"
                    )));
                }
                self.id = attributes.id(ATTR_ID)?.unwrap_or(Id::EMPTY);
                self.name = attributes.get(ATTR_NAME).unwrap_or_default().to_string();
                Frame::Document
            }
            Some(Frame::Document) => {
                let key = self.element(&tag, &attributes)?;
                self.tree.attach_root(key)?;
                Frame::Element(key)
            }
            Some(Frame::Element(parent)) => {
                let parent = *parent;
                if tag == VALUES_CLASS {
                    let container = self.tree.create_with_id(Id::EMPTY, ClassName::new(VALUES_CLASS), "");
                    self.tree.append_child(parent, container)?;
                    Frame::Values(container)
                } else {
                    let key = self.element(&tag, &attributes)?;
                    self.tree.append_child(parent, key)?;
                    Frame::Element(key)
                }
            }
            Some(Frame::Values(container)) => {
                let container = *container;
                expect_data(&tag, VALUES_CLASS)?;
                self.data(container, &attributes)?
            }
            Some(Frame::LinkArray(array)) => {
                let array = *array;
                expect_data(&tag, "link array")?;
                Frame::Member(member(array, &attributes)?)
            }
            Some(Frame::Data(pending)) => {
                return Err(TesseraError::structure(format!(
                    "unexpected <{tag}> inside property `{}`",
                    pending.name
                )));
            }
            Some(Frame::Member(_)) => {
                return Err(TesseraError::structure(format!(
                    "unexpected <{tag}> inside a link-array member"
                )));
            }
        };
        self.stack.push(frame);
        Ok(())
    }

    fn element(&mut self, tag: &str, attributes: &Attributes) -> Result<ElementKey, TesseraError> {
        if tag == DATA_CLASS || tag == VALUES_CLASS || tag == DOCUMENT_TAG {
            return Err(TesseraError::structure(format!("unexpected <{tag}> element")));
        }
        let id = match attributes.id(ATTR_ID)? {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = Id::generate();
                debug!(kind = tag, id:% = id; "Element without identifier, generated one");
                id
            }
        };
        let name = attributes.get(ATTR_NAME).unwrap_or_default();
        trace!(kind = tag, name = name; "Read element");
        Ok(self.tree.create_with_id(id, ClassName::new(tag), name))
    }

    /// Starts a data node inside the values container `container`.
    fn data(&mut self, container: ElementKey, attributes: &Attributes) -> Result<Frame, TesseraError> {
        let id = attributes.id(ATTR_ID)?.unwrap_or(Id::EMPTY);
        let name = attributes.get(ATTR_NAME).unwrap_or_default().to_string();

        let owner = self
            .tree
            .parent(container)
            .ok_or_else(|| TesseraError::structure("values block without an owner"))?;
        let descriptor = property::descriptor(self.tree.element(owner).class_name(), id);

        let (kind, value_type) = match attributes.get(ATTR_TYPE) {
            Some(PARENT_LINK_TAG) => (DataKind::ParentLink, ValueType::Link),
            Some(tag) => {
                let value_type: ValueType = tag.parse()?;
                let kind = match value_type {
                    ValueType::Link => DataKind::Link,
                    ValueType::LinkArray => DataKind::LinkArray,
                    _ => DataKind::Scalar,
                };
                (kind, value_type)
            }
            None => match &descriptor {
                Some(descriptor) => (DataKind::for_descriptor(descriptor), descriptor.value_type()),
                None => {
                    return Err(TesseraError::structure(format!(
                        "property `{name}` has no {ATTR_TYPE}"
                    )));
                }
            },
        };

        if let Some(descriptor) = &descriptor
            && (DataKind::for_descriptor(descriptor) != kind || descriptor.value_type() != value_type)
        {
            return Err(TesseraError::structure(format!(
                "property `{name}` is declared as {}, stored as {value_type}",
                descriptor.value_type()
            )));
        }

        if kind == DataKind::LinkArray {
            let key = self.tree.create_with_id(id, ClassName::new(DATA_CLASS), &name);
            self.tree.element_mut(key).data = Some(DataNode::link_array());
            self.tree.append_child(container, key)?;
            return Ok(Frame::LinkArray(key));
        }

        Ok(Frame::Data(PendingData {
            container,
            id,
            name,
            kind,
            value_type,
            target: attributes.id(ATTR_ELEMENT_ID)?.unwrap_or(Id::EMPTY),
            provenance: attributes.provenance()?,
            text: String::new(),
        }))
    }

    fn text(&mut self, text: &str) -> Result<(), TesseraError> {
        match self.stack.last_mut() {
            Some(Frame::Data(pending)) => pending.text.push_str(text),
            Some(Frame::Member(pending)) => pending.text.push_str(text),
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), TesseraError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| TesseraError::structure("unbalanced end tag"))?;
        match frame {
            Frame::Document => self.finished = true,
            Frame::Element(_) | Frame::Values(_) | Frame::LinkArray(_) => {}
            Frame::Data(pending) => self.finish_data(pending)?,
            Frame::Member(pending) => {
                let mut node = DataNode::member(pending.target, pending.order);
                node.set_provenance(pending.provenance);
                node.set_inner_text(pending.text);
                let key = self.tree.create_with_id(Id::EMPTY, ClassName::new(DATA_CLASS), "");
                self.tree.element_mut(key).data = Some(node);
                self.tree.append_child(pending.array, key)?;
            }
        }
        Ok(())
    }

    fn finish_data(&mut self, pending: PendingData) -> Result<(), TesseraError> {
        let mut node = match pending.kind {
            DataKind::Scalar => DataNode::scalar(Value::parse(pending.value_type, &pending.text)?),
            DataKind::Link => DataNode::link(pending.target),
            DataKind::ParentLink => DataNode::parent_link(pending.target),
            DataKind::LinkArray => DataNode::link_array(),
        };
        if pending.kind != DataKind::Scalar {
            node.set_provenance(pending.provenance);
            node.set_inner_text(pending.text);
        }
        let key = self
            .tree
            .create_with_id(pending.id, ClassName::new(DATA_CLASS), pending.name);
        self.tree.element_mut(key).data = Some(node);
        self.tree.append_child(pending.container, key)?;
        Ok(())
    }
}

fn expect_data(tag: &str, context: &str) -> Result<(), TesseraError> {
    if tag == DATA_CLASS {
        Ok(())
    } else {
        Err(TesseraError::structure(format!(
            "unexpected <{tag}> inside {context}"
        )))
    }
}

fn member(array: ElementKey, attributes: &Attributes) -> Result<PendingMember, TesseraError> {
    if let Some(tag) = attributes.get(ATTR_TYPE)
        && tag != ValueType::Link.name()
    {
        return Err(TesseraError::structure(format!(
            "link-array member has {ATTR_TYPE} `{tag}`"
        )));
    }
    let order = match attributes.get(ATTR_ORDER) {
        Some(order) => convert::parse_int(order)?,
        None => i32::MAX,
    };
    Ok(PendingMember {
        array,
        target: attributes.id(ATTR_ELEMENT_ID)?.unwrap_or(Id::EMPTY),
        order,
        provenance: attributes.provenance()?,
        text: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use tessera_core::geometry::{Point, Rect};

    use super::*;
    use crate::tree::Matcher;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Document ID="6f1c1c43-6f0a-4c55-9d2c-2a4d3b7c2e10" Name="sample">
  <ReaderTestDesign ID="0b8c2a9e-4cde-4f0a-8b0e-0f5b9e3b9a01" Name="Design">
    <ReaderTestShape ID="1d2e3f40-0000-4000-8000-000000000001" Name="A &amp; B" Color="red">
      <Values>
        <Data Name="Bounds" ID="00000000-0000-0000-0000-0000000000b1" Type="Rect">{X=100;Y=200;Width=10;Height=20}</Data>
        <Data Name="Points" ID="00000000-0000-0000-0000-0000000000b2" Type="PointArray">{X=1;Y=2}|{X=3;Y=4}</Data>
        <Data Name="Note" ID="00000000-0000-0000-0000-0000000000b3" Type="String">  padded  </Data>
        <Data Name="Peer" ID="00000000-0000-0000-0000-0000000000b4" Type="Link" ElementID="1d2e3f40-0000-4000-8000-000000000002" DocumentName="other.tdm" Unknown="x" />
        <Data Name="Peers" ID="00000000-0000-0000-0000-0000000000b5" Type="LinkArray">
          <Data Order="1" Type="Link" ElementID="1d2e3f40-0000-4000-8000-000000000001" />
          <Data Order="0" Type="Link" ElementID="1d2e3f40-0000-4000-8000-000000000002" />
        </Data>
      </Values>
    </ReaderTestShape>
    <ReaderTestShape ID="1d2e3f40-0000-4000-8000-000000000002" Name="C" />
  </ReaderTestDesign>
</Document>
"#;

    fn shape(tree: &Tree, name: &str) -> ElementKey {
        let named = |element: &crate::tree::Element| element.name() == name;
        tree.find_descendant(
            tree.roots()[0],
            &Matcher::kind(ClassName::new("ReaderTestShape")).filter(&named),
        )
        .unwrap()
    }

    #[test]
    fn test_read_structure_and_values() {
        let parsed = read_document(SAMPLE).unwrap();
        assert_eq!(parsed.name, "sample");
        assert_eq!(parsed.tree.roots().len(), 1);

        let tree = &parsed.tree;
        let a = shape(tree, "A & B");
        let c = shape(tree, "C");
        let bounds = Id::from_u128(0xb1);

        assert_eq!(
            tree.stored_value_by_id(a, bounds),
            Some(Value::Rect(Rect::new(100.0, 200.0, 10.0, 20.0)))
        );
        assert_eq!(
            tree.stored_value_by_id(a, Id::from_u128(0xb2)),
            Some(Value::PointArray(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]))
        );
        assert_eq!(
            tree.stored_value_by_id(a, Id::from_u128(0xb3)),
            Some(Value::String("  padded  ".to_string()))
        );

        let peer = tree.link_status(a, Id::from_u128(0xb4));
        assert!(peer.is_valid());
        assert_eq!(peer.element(), Some(c));
        let peer_node = tree.data_node(tree.find_value(a, Id::from_u128(0xb4)).unwrap()).unwrap();
        assert_eq!(peer_node.provenance().document_name(), Some("other.tdm"));

        let c_id = tree.element(c).id();
        let a_id = tree.element(a).id();
        assert_eq!(
            tree.stored_value_by_id(a, Id::from_u128(0xb5)),
            Some(Value::LinkArray(vec![c_id, a_id]))
        );
    }

    #[test]
    fn test_malformed_scalar_is_format_error() {
        let xml = r#"<Document ID="" Name="x">
  <ReaderTestShape ID="1d2e3f40-0000-4000-8000-000000000001" Name="A">
    <Values>
      <Data Name="Position" ID="00000000-0000-0000-0000-0000000000c1" Type="Point">100</Data>
    </Values>
  </ReaderTestShape>
</Document>"#;
        let err = read_document(xml).unwrap_err();
        assert!(matches!(err, TesseraError::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_structure_errors() {
        assert!(matches!(
            read_document("<Design ID=\"\" Name=\"x\" />").unwrap_err(),
            TesseraError::Structure(_)
        ));
        assert!(matches!(
            read_document("<?xml version=\"1.0\"?>").unwrap_err(),
            TesseraError::Structure(_)
        ));
        assert!(matches!(
            read_document("<Document><Values /></Document>").unwrap_err(),
            TesseraError::Structure(_)
        ));
        assert!(matches!(
            read_document(
                "<Document><A><Values><Data Name=\"n\" ID=\"\" Type=\"String\"><B /></Data></Values></A></Document>"
            )
            .unwrap_err(),
            TesseraError::Structure(_)
        ));
    }

    #[test]
    fn test_unbalanced_xml_is_rejected() {
        assert!(read_document("<Document><A></B></Document>").is_err());
    }

    #[test]
    fn test_missing_identifier_is_generated() {
        let parsed = read_document("<Document><A Name=\"x\" /></Document>").unwrap();
        let root = parsed.tree.roots()[0];
        assert!(!parsed.tree.element(root).id().is_empty());
    }
}
