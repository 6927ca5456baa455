//! XML serialization of documents.
//!
//! The wire format has one tagged node per element. The tag is the element's
//! kind; `ID` and `Name` are attributes. Stored properties live in a nested
//! `<Values>` block of `<Data>` nodes:
//!
//! ```xml
//! <Document ID="..." Name="orders.tdm">
//!   <Design ID="..." Name="Design">
//!     <Table ID="..." Name="Users">
//!       <Values>
//!         <Data Name="Bounds" ID="..." Type="Rect">{X=100;Y=200;Width=200;Height=120}</Data>
//!       </Values>
//!     </Table>
//!     <Reference ID="..." Name="Reference1">
//!       <Values>
//!         <Data Name="Source" ID="..." Type="Link" ElementID="..." />
//!         <Data Name="SourceFields" ID="..." Type="LinkArray">
//!           <Data Order="0" Type="Link" ElementID="..." />
//!         </Data>
//!       </Values>
//!     </Reference>
//!   </Design>
//! </Document>
//! ```
//!
//! Properties equal to their registered default are not written; reading
//! an absent property yields the default again.

mod reader;
mod writer;

pub(crate) use reader::{ParsedDocument, read_document};
pub(crate) use writer::write_document;

/// Root tag of a serialized document.
pub const DOCUMENT_TAG: &str = "Document";

pub(crate) const ATTR_ID: &str = "ID";
pub(crate) const ATTR_NAME: &str = "Name";
pub(crate) const ATTR_TYPE: &str = "Type";
pub(crate) const ATTR_ORDER: &str = "Order";
pub(crate) const ATTR_ELEMENT_ID: &str = "ElementID";
pub(crate) const ATTR_DOCUMENT_ID: &str = "DocumentID";
pub(crate) const ATTR_DOCUMENT_NAME: &str = "DocumentName";
pub(crate) const ATTR_MODULE_ID: &str = "ModuleID";
pub(crate) const ATTR_MODULE_NAME: &str = "ModuleName";
pub(crate) const ATTR_DATA_EX: &str = "DataEx";
