//! SpreadsheetML metadata part (`xl/metadata.xml`).
//!
//! Excel stores additional metadata for cells and values in this workbook-level part. Worksheet
//! `<c>` elements reference it through `cm` (cell metadata) and `vm` (value metadata) indices.
//! Cell metadata follows the cell around (insert, shift, copy/paste, merge); value metadata follows
//! the value as it is referenced from formulas.
//!
//! Only the `<rc>` index records are modeled. The type/string tables, mdx metadata and every
//! `extLst` are kept as [`RawXml`] so they survive a round trip unchanged.

mod parse;
mod write;

use serde::{Deserialize, Serialize};

use crate::options::len_to_count;
use crate::RawXml;

pub use parse::parse_metadata_xml;
pub use write::{write_metadata_xml, write_metadata_xml_with_options};

pub const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Parsed `xl/metadata.xml`.
///
/// Children are written in schema order (types, strings, mdx, future metadata, cell metadata,
/// value metadata, extLst) no matter how the tree was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Root attributes other than the modeled ones, mostly namespace declarations used by
    /// the passthrough blocks.
    pub root_attributes: Vec<(String, String)>,
    pub metadata_types: Option<RawXml>,
    pub metadata_strings: Option<RawXml>,
    pub mdx_metadata: Option<RawXml>,
    /// `<futureMetadata>` buckets in document order.
    ///
    /// Entries are addressed by position; `name` is carried along but this crate never looks
    /// anything up by it.
    pub future_metadata: Vec<FutureMetadata>,
    /// `<cellMetadata>`, referenced via `cm` on worksheet cells.
    pub cell_metadata: Option<MetadataTable>,
    /// `<valueMetadata>`, referenced via `vm` on worksheet cells.
    pub value_metadata: Option<MetadataTable>,
    pub ext_lst: Option<RawXml>,
}

impl MetadataDocument {
    pub fn future_metadata_by_position(&self, idx: usize) -> Option<&FutureMetadata> {
        self.future_metadata.get(idx)
    }
}

/// One `<futureMetadata>` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMetadata {
    pub name: Option<String>,
    pub count: Option<i64>,
    /// Other attributes in document order, `xmlns:*` declarations included. Written after
    /// `name`/`count`.
    pub attributes: Vec<(String, String)>,
    pub blocks: Vec<FutureMetadataBlock>,
    pub ext_lst: Option<RawXml>,
}

/// `<futureMetadata><bk>`: a slot for feature extension data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMetadataBlock {
    pub attributes: Vec<(String, String)>,
    /// Every `<extLst>` child in document order. Producers normally write at most one.
    pub ext_lst: Vec<RawXml>,
}

/// `<cellMetadata>` / `<valueMetadata>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTable {
    /// `count=`; `None` when the attribute was absent, which is not the same as `Some(0)`.
    pub count: Option<i64>,
    /// Attributes other than `count`, in document order.
    pub attributes: Vec<(String, String)>,
    pub blocks: Vec<MetadataBlock>,
}

impl MetadataTable {
    /// An empty table without a `count` attribute.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table that writes a `count` attribute.
    pub fn with_count() -> Self {
        Self {
            count: Some(0),
            ..Self::default()
        }
    }

    /// Append a block and return the 1-based index a worksheet `cm=`/`vm=` attribute uses for it.
    pub fn push_block(&mut self, block: MetadataBlock) -> u32 {
        self.blocks.push(block);
        self.sync_count();
        u32::try_from(self.blocks.len()).unwrap_or(u32::MAX)
    }

    /// Look up a block by the 1-based index stored in `cm=`/`vm=`. Index 0 means "no metadata".
    pub fn block(&self, one_based: u32) -> Option<&MetadataBlock> {
        let idx = one_based.checked_sub(1)?;
        self.blocks.get(idx as usize)
    }

    /// `true` when `count` is absent or matches the number of blocks.
    pub fn is_count_consistent(&self) -> bool {
        self.count
            .map_or(true, |count| count == len_to_count(self.blocks.len()))
    }

    /// Bring a present `count` in line with the block list. An absent count stays absent.
    pub fn sync_count(&mut self) {
        if let Some(count) = self.count.as_mut() {
            *count = len_to_count(self.blocks.len());
        }
    }
}

/// `<bk>`: a group of metadata records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBlock {
    pub attributes: Vec<(String, String)>,
    pub records: Vec<MetadataRecord>,
}

impl MetadataBlock {
    pub fn new(records: impl IntoIterator<Item = MetadataRecord>) -> Self {
        Self {
            attributes: Vec::new(),
            records: records.into_iter().collect(),
        }
    }
}

/// `<rc t=".." v=".."/>`.
///
/// Both indices point into stores outside this part (`t` into `metadataTypes`, `v` into the
/// type-specific value list) and are neither bounds nor sign checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// `t=`
    pub type_index: i64,
    /// `v=`
    pub value_index: i64,
}

impl MetadataRecord {
    pub fn new(type_index: i64, value_index: i64) -> Self {
        Self {
            type_index,
            value_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_block_returns_one_based_index_and_keeps_count_in_sync() {
        let mut table = MetadataTable::with_count();
        let first = table.push_block(MetadataBlock::new([MetadataRecord::new(1, 0)]));
        let second = table.push_block(MetadataBlock::default());
        assert_eq!((first, second), (1, 2));
        assert_eq!(table.count, Some(2));
        assert_eq!(table.block(1).unwrap().records, vec![MetadataRecord::new(1, 0)]);
        assert!(table.block(0).is_none());
        assert!(table.block(3).is_none());
    }

    #[test]
    fn absent_count_stays_absent() {
        let mut table = MetadataTable::new();
        table.push_block(MetadataBlock::default());
        assert_eq!(table.count, None);
        assert!(table.is_count_consistent());
    }

    #[test]
    fn detects_stale_count() {
        let table = MetadataTable {
            count: Some(5),
            blocks: vec![MetadataBlock::default()],
            ..MetadataTable::default()
        };
        assert!(!table.is_count_consistent());
    }
}
