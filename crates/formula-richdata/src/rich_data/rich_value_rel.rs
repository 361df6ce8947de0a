//! `xl/richData/richValueRel.xml` (rich-value relationship index table).
//!
//! Rich values avoid embedding raw `rId*` strings in every instance. A payload stores a 0-based
//! index into this table, which holds `r:id="rIdN"` strings that the part's `.rels` resolves.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::xml::{self, set_once};
use crate::{RawXml, RichDataError};

pub const RICH_VALUE_REL_NS: &str =
    "http://schemas.microsoft.com/office/spreadsheetml/2022/richvaluerel";
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Parsed `<richValueRels>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichValueRels {
    pub root_attributes: Vec<(String, String)>,
    /// `<rel>` entries; position is the index rich value payloads use.
    pub rels: Vec<RichValueRel>,
    pub ext_lst: Option<RawXml>,
}

impl RichValueRels {
    /// Append a relationship id and return its 0-based index.
    pub fn push(&mut self, id: impl Into<String>) -> u32 {
        self.rels.push(RichValueRel::new(id));
        u32::try_from(self.rels.len() - 1).unwrap_or(u32::MAX)
    }

    pub fn id_at(&self, idx: u32) -> Option<&str> {
        self.rels.get(idx as usize).map(|rel| rel.id.as_str())
    }
}

/// One `<rel r:id=".."/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RichValueRel {
    /// Relationship id in the owning part's `.rels` (e.g. `rId1`). Not resolved here.
    pub id: String,
    /// Attributes other than the id, in document order, namespace declarations included.
    pub attributes: Vec<(String, String)>,
}

impl RichValueRel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }
}

/// Parse `xl/richData/richValueRel.xml`.
///
/// The id attribute is matched by local name, so both `r:id` and a bare `id` are accepted.
pub fn parse_rich_value_rels_xml(xml: &[u8]) -> Result<RichValueRels, RichDataError> {
    let mut reader = xml::reader(xml)?;
    let (root, empty) = xml::expect_root(&mut reader, "richValueRels")?;

    let mut rels = RichValueRels {
        root_attributes: xml::unmodeled_attributes(&root, &[])?,
        ..Default::default()
    };

    xml::for_each_child(&mut reader, "richValueRels", empty, |reader, e, empty| {
        match e.local_name().as_ref() {
            b"rel" => {
                let attrs = xml::attributes(e)?;
                let id = xml::find_attr(&attrs, "id").ok_or(
                    RichDataError::MissingRequiredAttribute {
                        element: "rel",
                        attribute: "id",
                    },
                )?;
                rels.rels.push(RichValueRel {
                    id: id.to_string(),
                    attributes: xml::unmodeled_attributes(e, &["id"])?,
                });
                if !empty {
                    reader.read_to_end(e.name())?;
                }
            }
            b"extLst" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut rels.ext_lst, raw, "extLst", "rich value relationship part");
            }
            _ => xml::skip_unknown(reader, "richValueRels", e, empty)?,
        }
        Ok(())
    })?;

    xml::expect_eof(&mut reader)?;
    Ok(rels)
}

/// Serialize `xl/richData/richValueRel.xml`.
///
/// Ids are written as `r:id`; `xmlns:r` is declared on the root unless the preserved root
/// attributes already do.
pub fn write_rich_value_rels_xml(rels: &RichValueRels) -> Result<Vec<u8>, RichDataError> {
    let mut writer = xml::new_writer();
    xml::write_decl(&mut writer)?;

    let root = xml::root_start(
        "richValueRels",
        &rels.root_attributes,
        &[("xmlns", RICH_VALUE_REL_NS), ("xmlns:r", RELATIONSHIPS_NS)],
    );
    writer.write_event(Event::Start(root))?;

    for rel in &rels.rels {
        let mut start = BytesStart::new("rel");
        start.push_attribute(("r:id", rel.id.as_str()));
        xml::push_attributes(&mut start, &rel.attributes);
        writer.write_event(Event::Empty(start))?;
    }
    if let Some(ext_lst) = &rels.ext_lst {
        ext_lst.write_to(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new("richValueRels")))?;
    Ok(xml::finish(writer))
}
