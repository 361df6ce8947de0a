use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::{FutureMetadata, MetadataBlock, MetadataDocument, MetadataTable, SPREADSHEETML_NS};
use crate::xml;
use crate::{CountPolicy, RichDataError, WriteOptions};

/// Serialize `xl/metadata.xml` with the default [`WriteOptions`].
pub fn write_metadata_xml(doc: &MetadataDocument) -> Result<Vec<u8>, RichDataError> {
    write_metadata_xml_with_options(doc, WriteOptions::default())
}

pub fn write_metadata_xml_with_options(
    doc: &MetadataDocument,
    options: WriteOptions,
) -> Result<Vec<u8>, RichDataError> {
    let mut writer = xml::new_writer();
    xml::write_decl(&mut writer)?;

    let root = xml::root_start("metadata", &doc.root_attributes, &[("xmlns", SPREADSHEETML_NS)]);
    writer.write_event(Event::Start(root))?;

    for raw in [&doc.metadata_types, &doc.metadata_strings, &doc.mdx_metadata]
        .into_iter()
        .flatten()
    {
        raw.write_to(&mut writer)?;
    }
    for entry in &doc.future_metadata {
        write_future_metadata(&mut writer, entry, options.count_policy)?;
    }
    if let Some(table) = &doc.cell_metadata {
        write_metadata_table(&mut writer, "cellMetadata", table, options.count_policy)?;
    }
    if let Some(table) = &doc.value_metadata {
        write_metadata_table(&mut writer, "valueMetadata", table, options.count_policy)?;
    }
    if let Some(ext_lst) = &doc.ext_lst {
        ext_lst.write_to(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(xml::finish(writer))
}

fn write_future_metadata<W: Write>(
    writer: &mut Writer<W>,
    entry: &FutureMetadata,
    policy: CountPolicy,
) -> Result<(), RichDataError> {
    let mut start = BytesStart::new("futureMetadata");
    if let Some(name) = &entry.name {
        start.push_attribute(("name", name.as_str()));
    }
    if let Some(count) = policy.resolve(entry.count, entry.blocks.len()) {
        start.push_attribute(("count", count.to_string().as_str()));
    }
    xml::push_attributes(&mut start, &entry.attributes);

    if entry.blocks.is_empty() && entry.ext_lst.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for block in &entry.blocks {
        let mut bk = BytesStart::new("bk");
        xml::push_attributes(&mut bk, &block.attributes);
        if block.ext_lst.is_empty() {
            writer.write_event(Event::Empty(bk))?;
            continue;
        }
        writer.write_event(Event::Start(bk))?;
        for ext_lst in &block.ext_lst {
            ext_lst.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("bk")))?;
    }
    if let Some(ext_lst) = &entry.ext_lst {
        ext_lst.write_to(writer)?;
    }
    writer.write_event(Event::End(BytesEnd::new("futureMetadata")))?;
    Ok(())
}

fn write_metadata_table<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    table: &MetadataTable,
    policy: CountPolicy,
) -> Result<(), RichDataError> {
    let mut start = BytesStart::new(element);
    if let Some(count) = policy.resolve(table.count, table.blocks.len()) {
        start.push_attribute(("count", count.to_string().as_str()));
    }
    xml::push_attributes(&mut start, &table.attributes);

    if table.blocks.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for block in &table.blocks {
        write_metadata_block(writer, block)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_metadata_block<W: Write>(
    writer: &mut Writer<W>,
    block: &MetadataBlock,
) -> Result<(), RichDataError> {
    let mut bk = BytesStart::new("bk");
    xml::push_attributes(&mut bk, &block.attributes);
    if block.records.is_empty() {
        writer.write_event(Event::Empty(bk))?;
        return Ok(());
    }

    writer.write_event(Event::Start(bk))?;
    for record in &block.records {
        let mut rc = BytesStart::new("rc");
        rc.push_attribute(("t", record.type_index.to_string().as_str()));
        rc.push_attribute(("v", record.value_index.to_string().as_str()));
        writer.write_event(Event::Empty(rc))?;
    }
    writer.write_event(Event::End(BytesEnd::new("bk")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FutureMetadataBlock, MetadataRecord};
    use crate::RawXml;
    use pretty_assertions::assert_eq;

    const DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

    fn to_string(doc: &MetadataDocument) -> String {
        String::from_utf8(write_metadata_xml(doc).expect("write metadata.xml")).unwrap()
    }

    #[test]
    fn writes_records_as_t_v_pairs() {
        let doc = MetadataDocument {
            cell_metadata: Some(MetadataTable {
                count: Some(1),
                blocks: vec![MetadataBlock::new([MetadataRecord::new(3, 7)])],
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            to_string(&doc),
            format!(
                "{DECL}<metadata xmlns=\"{SPREADSHEETML_NS}\"><cellMetadata count=\"1\"><bk><rc t=\"3\" v=\"7\"/></bk></cellMetadata></metadata>"
            )
        );
    }

    #[test]
    fn writes_children_in_schema_order() {
        // Fields set "backwards" to make sure output order does not follow construction order.
        let mut doc = MetadataDocument::default();
        doc.ext_lst = Some(RawXml::new("extLst", "<ext uri=\"{X}\"/>"));
        doc.value_metadata = Some(MetadataTable::new());
        doc.cell_metadata = Some(MetadataTable::new());
        doc.future_metadata.push(FutureMetadata {
            name: Some("XLDAPR".into()),
            blocks: vec![FutureMetadataBlock::default()],
            ..Default::default()
        });
        doc.mdx_metadata = Some(RawXml::empty("mdxMetadata"));
        doc.metadata_strings = Some(RawXml::empty("metadataStrings"));
        doc.metadata_types = Some(RawXml::empty("metadataTypes"));

        assert_eq!(
            to_string(&doc),
            format!(
                "{DECL}<metadata xmlns=\"{SPREADSHEETML_NS}\"><metadataTypes/><metadataStrings/><mdxMetadata/><futureMetadata name=\"XLDAPR\"><bk/></futureMetadata><cellMetadata/><valueMetadata/><extLst><ext uri=\"{{X}}\"/></extLst></metadata>"
            )
        );
    }

    #[test]
    fn absent_parts_are_not_written() {
        assert_eq!(
            to_string(&MetadataDocument::default()),
            format!("{DECL}<metadata xmlns=\"{SPREADSHEETML_NS}\"></metadata>")
        );
    }

    #[test]
    fn count_policy_controls_stale_counts() {
        let doc = MetadataDocument {
            value_metadata: Some(MetadataTable {
                count: Some(4),
                blocks: vec![MetadataBlock::default()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let recomputed = to_string(&doc);
        assert!(
            recomputed.contains(r#"<valueMetadata count="1"><bk/></valueMetadata>"#),
            "{recomputed}"
        );

        let preserved = String::from_utf8(
            write_metadata_xml_with_options(&doc, WriteOptions::PRESERVE_COUNTS).unwrap(),
        )
        .unwrap();
        assert!(
            preserved.contains(r#"<valueMetadata count="4"><bk/></valueMetadata>"#),
            "{preserved}"
        );
    }

    #[test]
    fn keeps_root_namespace_declarations() {
        let doc = MetadataDocument {
            root_attributes: vec![
                ("xmlns".into(), SPREADSHEETML_NS.into()),
                ("xmlns:xda".into(), "urn:xda".into()),
            ],
            ..Default::default()
        };
        assert!(to_string(&doc).contains(&format!(
            "<metadata xmlns=\"{SPREADSHEETML_NS}\" xmlns:xda=\"urn:xda\">"
        )));
    }

    #[test]
    fn writes_unmodeled_attributes_after_modeled_ones() {
        let doc = MetadataDocument {
            future_metadata: vec![FutureMetadata {
                name: Some("XLDAPR".into()),
                count: Some(1),
                attributes: vec![("xmlns:xda".into(), "urn:xda".into())],
                blocks: vec![FutureMetadataBlock {
                    attributes: vec![("a".into(), "1 & 2".into())],
                    ext_lst: vec![RawXml::empty("extLst"), RawXml::new("extLst", "<ext/>")],
                }],
                ext_lst: None,
            }],
            value_metadata: Some(MetadataTable {
                count: Some(-1),
                attributes: vec![("x:flag".into(), "y".into())],
                blocks: vec![MetadataBlock {
                    attributes: vec![("b".into(), "2".into())],
                    records: vec![MetadataRecord::new(-1, 4_294_967_296)],
                }],
            }),
            ..Default::default()
        };

        let out = String::from_utf8(
            write_metadata_xml_with_options(&doc, WriteOptions::PRESERVE_COUNTS).unwrap(),
        )
        .unwrap();
        assert!(
            out.contains(concat!(
                r#"<futureMetadata name="XLDAPR" count="1" xmlns:xda="urn:xda">"#,
                r#"<bk a="1 &amp; 2"><extLst/><extLst><ext/></extLst></bk></futureMetadata>"#
            )),
            "{out}"
        );
        assert!(
            out.contains(concat!(
                r#"<valueMetadata count="-1" x:flag="y">"#,
                r#"<bk b="2"><rc t="-1" v="4294967296"/></bk></valueMetadata>"#
            )),
            "{out}"
        );
    }
}
