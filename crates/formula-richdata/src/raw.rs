//! Verbatim capture of XML subtrees this crate does not model.
//!
//! `extLst` blocks, the metadata type/string tables, mdx metadata and rich-value fallbacks are
//! stored as [`RawXml`]: the tag as written, the raw attribute text of the start tag and the exact
//! bytes between the start and end tags. Nothing inside is inspected, so content from schema
//! versions newer than this crate survives a read/write cycle untouched.

use std::io::Write;

use quick_xml::events::BytesStart;
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::RichDataError;

/// An uninterpreted XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawXml {
    /// Qualified element name as it appeared in the source (e.g. `extLst`, `x:extLst`).
    pub name: String,
    /// Everything in the start tag after the name, leading whitespace included
    /// (e.g. ` count="1"`). Empty when the element had no attributes.
    pub raw_attributes: String,
    /// Raw markup between the start and end tags, entities and whitespace untouched.
    pub inner_xml: String,
}

impl RawXml {
    pub fn new(name: impl Into<String>, inner_xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_attributes: String::new(),
            inner_xml: inner_xml.into(),
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    /// Element name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Whether the element has no inner content (it is written self-closing).
    pub fn is_empty(&self) -> bool {
        self.inner_xml.is_empty()
    }

    /// The full element as text.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(
            2 * self.name.len() + self.raw_attributes.len() + self.inner_xml.len() + 5,
        );
        out.push('<');
        out.push_str(&self.name);
        out.push_str(&self.raw_attributes);
        if self.inner_xml.is_empty() {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&self.inner_xml);
            out.push_str("</");
            out.push_str(&self.name);
            out.push('>');
        }
        out
    }

    /// Capture the element whose start tag was just read, consuming its subtree.
    pub(crate) fn capture(
        reader: &mut Reader<&[u8]>,
        start: &BytesStart<'_>,
        empty: bool,
    ) -> Result<Self, RichDataError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let raw_attributes = std::str::from_utf8(start.attributes_raw())?.to_string();
        let inner_xml = if empty {
            String::new()
        } else {
            reader.read_text(start.name())?.into_owned()
        };
        Ok(Self {
            name,
            raw_attributes,
            inner_xml,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), RichDataError> {
        writer.get_mut().write_all(self.to_xml().as_bytes())?;
        Ok(())
    }
}
