use quick_xml::events::BytesStart;
use quick_xml::Reader;

use super::{
    FutureMetadata, FutureMetadataBlock, MetadataBlock, MetadataDocument, MetadataRecord,
    MetadataTable,
};
use crate::xml::{self, set_once};
use crate::{RawXml, RichDataError};

const PART: &str = "metadata part";

/// Parse `xl/metadata.xml`.
///
/// - element and attribute names are matched by local name
/// - `metadataTypes`, `metadataStrings`, `mdxMetadata` and `extLst` are captured verbatim
/// - unknown elements elsewhere are skipped
/// - `count=` attributes are recorded as given, never checked against the list length
/// - attributes the model has no field for are kept on their element, namespace declarations
///   included
pub fn parse_metadata_xml(xml: &[u8]) -> Result<MetadataDocument, RichDataError> {
    let mut reader = xml::reader(xml)?;
    let (root, empty) = xml::expect_root(&mut reader, "metadata")?;

    let mut doc = MetadataDocument {
        root_attributes: xml::unmodeled_attributes(&root, &[])?,
        ..Default::default()
    };

    xml::for_each_child(&mut reader, "metadata", empty, |reader, e, empty| {
        match e.local_name().as_ref() {
            b"metadataTypes" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut doc.metadata_types, raw, "metadataTypes", PART);
            }
            b"metadataStrings" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut doc.metadata_strings, raw, "metadataStrings", PART);
            }
            b"mdxMetadata" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut doc.mdx_metadata, raw, "mdxMetadata", PART);
            }
            b"futureMetadata" => {
                doc.future_metadata
                    .push(parse_future_metadata(reader, e, empty)?);
            }
            b"cellMetadata" => {
                let table = parse_metadata_table(reader, e, empty, "cellMetadata")?;
                set_once(&mut doc.cell_metadata, table, "cellMetadata", PART);
            }
            b"valueMetadata" => {
                let table = parse_metadata_table(reader, e, empty, "valueMetadata")?;
                set_once(&mut doc.value_metadata, table, "valueMetadata", PART);
            }
            b"extLst" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut doc.ext_lst, raw, "extLst", PART);
            }
            _ => xml::skip_unknown(reader, "metadata", e, empty)?,
        }
        Ok(())
    })?;

    xml::expect_eof(&mut reader)?;
    Ok(doc)
}

fn parse_future_metadata(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<FutureMetadata, RichDataError> {
    let attrs = xml::attributes(start)?;
    let mut entry = FutureMetadata {
        name: xml::find_attr(&attrs, "name").map(str::to_string),
        count: xml::optional_int(&attrs, "futureMetadata", "count")?,
        attributes: xml::unmodeled_attributes(start, &["name", "count"])?,
        ..Default::default()
    };

    xml::for_each_child(reader, "futureMetadata", empty, |reader, e, empty| {
        match e.local_name().as_ref() {
            b"bk" => entry
                .blocks
                .push(parse_future_metadata_block(reader, e, empty)?),
            b"extLst" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut entry.ext_lst, raw, "extLst", "<futureMetadata>");
            }
            _ => xml::skip_unknown(reader, "futureMetadata", e, empty)?,
        }
        Ok(())
    })?;

    Ok(entry)
}

fn parse_future_metadata_block(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<FutureMetadataBlock, RichDataError> {
    let mut block = FutureMetadataBlock {
        attributes: xml::unmodeled_attributes(start, &[])?,
        ext_lst: Vec::new(),
    };
    xml::for_each_child(reader, "bk", empty, |reader, e, empty| {
        if e.local_name().as_ref() == b"extLst" {
            block.ext_lst.push(RawXml::capture(reader, e, empty)?);
            Ok(())
        } else {
            xml::skip_unknown(reader, "bk", e, empty)
        }
    })?;
    Ok(block)
}

fn parse_metadata_table(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
    element: &'static str,
) -> Result<MetadataTable, RichDataError> {
    let attrs = xml::attributes(start)?;
    let mut table = MetadataTable {
        count: xml::optional_int(&attrs, element, "count")?,
        attributes: xml::unmodeled_attributes(start, &["count"])?,
        blocks: Vec::new(),
    };

    xml::for_each_child(reader, element, empty, |reader, e, empty| {
        if e.local_name().as_ref() == b"bk" {
            table.blocks.push(parse_metadata_block(reader, e, empty)?);
            Ok(())
        } else {
            xml::skip_unknown(reader, element, e, empty)
        }
    })?;

    Ok(table)
}

fn parse_metadata_block(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<MetadataBlock, RichDataError> {
    let attributes = xml::unmodeled_attributes(start, &[])?;
    let mut records = Vec::new();
    xml::for_each_child(reader, "bk", empty, |reader, e, empty| {
        if e.local_name().as_ref() == b"rc" {
            records.push(parse_record(e)?);
            if !empty {
                // `<rc>` has no content model; drop anything nested.
                reader.read_to_end(e.name())?;
            }
            Ok(())
        } else {
            xml::skip_unknown(reader, "bk", e, empty)
        }
    })?;
    Ok(MetadataBlock {
        attributes,
        records,
    })
}

fn parse_record(e: &BytesStart<'_>) -> Result<MetadataRecord, RichDataError> {
    let attrs = xml::attributes(e)?;
    Ok(MetadataRecord {
        type_index: xml::required_int(&attrs, "rc", "t")?,
        value_index: xml::required_int(&attrs, "rc", "v")?,
    })
}
