//! Lossless document model for the SpreadsheetML metadata and rich-value parts.
//!
//! Three parts are covered:
//!
//! - `xl/metadata.xml` ([`MetadataDocument`]): cell/value metadata records referenced by the `cm`
//!   and `vm` attributes on worksheet cells, plus `futureMetadata` extension buckets.
//! - `xl/richData/rdrichvalue.xml` ([`RichValueData`]): rich value instances.
//! - `xl/richData/richValueRel.xml` ([`RichValueRels`]): the relationship-id table rich values
//!   index into.
//!
//! Each part parses into a plain, mutable tree and writes back in schema order. Regions the model
//! does not interpret (`extLst` anywhere, the metadata type/string tables, mdx metadata, rich
//! value fallbacks) are kept as [`RawXml`] and replayed byte for byte. Reading and writing the
//! ZIP container is left to the caller; everything here works on in-memory byte slices.

mod error;
pub mod metadata;
mod options;
pub mod part;
mod raw;
pub mod rich_data;
mod xml;

pub use error::RichDataError;
pub use metadata::{
    parse_metadata_xml, write_metadata_xml, write_metadata_xml_with_options, FutureMetadata,
    FutureMetadataBlock, MetadataBlock, MetadataDocument, MetadataRecord, MetadataTable,
};
pub use options::{CountPolicy, WriteOptions};
pub use part::{PartKind, RichDataPart, METADATA_XML, RICH_VALUE_DATA_XML, RICH_VALUE_REL_XML};
pub use raw::RawXml;
pub use rich_data::{
    parse_rich_value_data_xml, parse_rich_value_rels_xml, write_rich_value_data_xml,
    write_rich_value_data_xml_with_options, write_rich_value_rels_xml, RichValue, RichValueData,
    RichValueRel, RichValueRels,
};
