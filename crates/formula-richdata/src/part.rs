//! Dispatch between the three part kinds by part name or root element.

use serde::{Deserialize, Serialize};

use crate::metadata::{parse_metadata_xml, write_metadata_xml_with_options, MetadataDocument};
use crate::rich_data::{
    parse_rich_value_data_xml, parse_rich_value_rels_xml, write_rich_value_data_xml_with_options,
    write_rich_value_rels_xml, RichValueData, RichValueRels,
};
use crate::xml;
use crate::{RichDataError, WriteOptions};

/// Conventional part name for the metadata part.
pub const METADATA_XML: &str = "xl/metadata.xml";
/// Conventional part name for the rich value data part.
pub const RICH_VALUE_DATA_XML: &str = "xl/richData/rdrichvalue.xml";
/// Conventional part name for the rich value relationship part.
pub const RICH_VALUE_REL_XML: &str = "xl/richData/richValueRel.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    Metadata,
    RichValueData,
    RichValueRels,
}

impl PartKind {
    pub const ALL: [PartKind; 3] = [Self::Metadata, Self::RichValueData, Self::RichValueRels];

    pub fn part_name(self) -> &'static str {
        match self {
            Self::Metadata => METADATA_XML,
            Self::RichValueData => RICH_VALUE_DATA_XML,
            Self::RichValueRels => RICH_VALUE_REL_XML,
        }
    }

    pub fn root_element(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::RichValueData => "rvData",
            Self::RichValueRels => "richValueRels",
        }
    }

    /// Match a package part name. Case-insensitive; a leading `/` is ignored.
    pub fn from_part_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix('/').unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.part_name().eq_ignore_ascii_case(name))
    }

    pub fn from_root_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.root_element() == name)
    }

    /// Identify a part from the local name of its document element.
    pub fn sniff(xml: &[u8]) -> Result<Self, RichDataError> {
        let mut reader = xml::reader(xml)?;
        let (root, _) = xml::read_root(&mut reader)?;
        let local = std::str::from_utf8(root.local_name().into_inner())?;
        Self::from_root_local_name(local).ok_or_else(|| RichDataError::UnexpectedRoot {
            expected: "<metadata>, <rvData> or <richValueRels>",
            found: local.to_string(),
        })
    }
}

/// Any one of the parsed parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RichDataPart {
    Metadata(MetadataDocument),
    RichValueData(RichValueData),
    RichValueRels(RichValueRels),
}

impl RichDataPart {
    /// Parse a part, choosing the document type from its root element.
    pub fn parse(xml: &[u8]) -> Result<Self, RichDataError> {
        let kind = PartKind::sniff(xml)?;
        Self::parse_as(kind, xml)
    }

    pub fn parse_as(kind: PartKind, xml: &[u8]) -> Result<Self, RichDataError> {
        log::trace!("parsing {} ({} bytes)", kind.part_name(), xml.len());
        Ok(match kind {
            PartKind::Metadata => Self::Metadata(parse_metadata_xml(xml)?),
            PartKind::RichValueData => Self::RichValueData(parse_rich_value_data_xml(xml)?),
            PartKind::RichValueRels => Self::RichValueRels(parse_rich_value_rels_xml(xml)?),
        })
    }

    pub fn kind(&self) -> PartKind {
        match self {
            Self::Metadata(_) => PartKind::Metadata,
            Self::RichValueData(_) => PartKind::RichValueData,
            Self::RichValueRels(_) => PartKind::RichValueRels,
        }
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, RichDataError> {
        self.to_xml_with_options(WriteOptions::default())
    }

    pub fn to_xml_with_options(&self, options: WriteOptions) -> Result<Vec<u8>, RichDataError> {
        match self {
            Self::Metadata(doc) => write_metadata_xml_with_options(doc, options),
            Self::RichValueData(data) => write_rich_value_data_xml_with_options(data, options),
            Self::RichValueRels(rels) => write_rich_value_rels_xml(rels),
        }
    }
}
