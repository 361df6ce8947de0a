use formula_richdata::{
    parse_metadata_xml, parse_rich_value_data_xml, parse_rich_value_rels_xml, write_metadata_xml,
    write_metadata_xml_with_options, write_rich_value_data_xml, write_rich_value_rels_xml,
    FutureMetadata, FutureMetadataBlock, MetadataBlock, MetadataDocument, MetadataRecord,
    MetadataTable, RawXml, RichValue, RichValueData, RichValueRel, RichValueRels, WriteOptions,
};
use proptest::prelude::*;

const CASES: u32 = 64;

/// Inner payloads in the shapes Excel actually writes into passthrough positions, plus a few
/// that no schema version defines.
fn raw_inner() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(r#"<metadataType name="XLDAPR" minSupportedVersion="120000" copy="1"/>"#.to_string()),
        Just(r#"<ext uri="{bdbb8cdc-fa1e-496e-a857-3c3f30c029c3}"><xda:dynamicArrayProperties fDynamic="1" fCollapsed="0"/></ext>"#.to_string()),
        Just("\n  <future:unknown a='1'>t &amp; u<![CDATA[<x>]]></future:unknown>\n".to_string()),
        Just("plain text".to_string()),
    ]
}

fn raw_attributes() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just(r#" count="1""#.to_string())]
}

fn raw(name: &'static str) -> impl Strategy<Value = RawXml> {
    (raw_attributes(), raw_inner()).prop_map(move |(raw_attributes, inner_xml)| RawXml {
        name: name.to_string(),
        raw_attributes,
        inner_xml,
    })
}

/// Element-level attributes the model does not interpret: namespace declarations and foreign
/// attributes, with values that need escaping.
fn extra_attributes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop_oneof![
        Just(Vec::new()),
        Just(vec![("xmlns:xda".to_string(), "urn:xda".to_string())]),
        Just(vec![
            ("xmlns:q".to_string(), "urn:q".to_string()),
            ("q:note".to_string(), "a < b & \"c\"".to_string()),
        ]),
    ]
}

fn metadata_table() -> impl Strategy<Value = MetadataTable> {
    let record = (any::<i64>(), any::<i64>()).prop_map(|(t, v)| MetadataRecord::new(t, v));
    let block = (extra_attributes(), prop::collection::vec(record, 0..4))
        .prop_map(|(attributes, records)| MetadataBlock {
            attributes,
            records,
        });
    (
        prop::option::of(any::<i64>()),
        extra_attributes(),
        prop::collection::vec(block, 0..4),
    )
        .prop_map(|(count, attributes, blocks)| MetadataTable {
            count,
            attributes,
            blocks,
        })
}

fn future_metadata() -> impl Strategy<Value = FutureMetadata> {
    let block = (extra_attributes(), prop::collection::vec(raw("extLst"), 0..3))
        .prop_map(|(attributes, ext_lst)| FutureMetadataBlock {
            attributes,
            ext_lst,
        });
    (
        prop::option::of("[A-Z]{1,12}"),
        prop::option::of(-1i64..10),
        extra_attributes(),
        prop::collection::vec(block, 0..3),
        prop::option::of(raw("extLst")),
    )
        .prop_map(|(name, count, attributes, blocks, ext_lst)| FutureMetadata {
            name,
            count,
            attributes,
            blocks,
            ext_lst,
        })
}

fn metadata_document() -> impl Strategy<Value = MetadataDocument> {
    (
        prop::option::of(raw("metadataTypes")),
        prop::option::of(raw("metadataStrings")),
        prop::option::of(raw("mdxMetadata")),
        prop::collection::vec(future_metadata(), 0..3),
        prop::option::of(metadata_table()),
        prop::option::of(metadata_table()),
        prop::option::of(raw("extLst")),
    )
        .prop_map(|(types, strings, mdx, future, cells, values, ext_lst)| MetadataDocument {
            root_attributes: Vec::new(),
            metadata_types: types,
            metadata_strings: strings,
            mdx_metadata: mdx,
            future_metadata: future,
            cell_metadata: cells,
            value_metadata: values,
            ext_lst,
        })
}

fn rich_value_data() -> impl Strategy<Value = RichValueData> {
    let rv = (
        any::<i64>(),
        extra_attributes(),
        prop::collection::vec("[ a-zA-Z0-9<>&'\"_.-]{0,12}", 0..4),
        prop::option::of(raw("fb")),
    )
        .prop_map(|(style_index, attributes, values, fallback)| RichValue {
            style_index,
            attributes,
            values,
            fallback,
        });
    (
        prop::option::of(any::<i64>()),
        prop::collection::vec(rv, 0..5),
        prop::option::of(raw("extLst")),
    )
        .prop_map(|(count, values, ext_lst)| RichValueData {
            root_attributes: Vec::new(),
            count,
            values,
            ext_lst,
        })
}

fn rich_value_rels() -> impl Strategy<Value = RichValueRels> {
    let rel = ("rId[0-9]{1,4}", extra_attributes())
        .prop_map(|(id, attributes)| RichValueRel { id, attributes });
    (
        prop::collection::vec(rel, 0..6),
        prop::option::of(raw("extLst")),
    )
        .prop_map(|(rels, ext_lst)| RichValueRels {
            root_attributes: Vec::new(),
            rels,
            ext_lst,
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn metadata_tree_survives_preserving_write(doc in metadata_document()) {
        let bytes = write_metadata_xml_with_options(&doc, WriteOptions::PRESERVE_COUNTS).unwrap();
        let mut reparsed = parse_metadata_xml(&bytes).unwrap();
        // The writer declares the default namespace for trees built without one.
        prop_assert_eq!(reparsed.root_attributes.len(), 1);
        reparsed.root_attributes.clear();
        prop_assert_eq!(&reparsed, &doc);
    }

    #[test]
    fn metadata_parse_is_idempotent(doc in metadata_document()) {
        let first = parse_metadata_xml(&write_metadata_xml(&doc).unwrap()).unwrap();
        let second = parse_metadata_xml(&write_metadata_xml(&first).unwrap()).unwrap();
        prop_assert_eq!(&second, &first);
        for table in [&first.cell_metadata, &first.value_metadata].into_iter().flatten() {
            prop_assert!(table.is_count_consistent());
        }
    }

    #[test]
    fn rich_value_parse_is_idempotent(data in rich_value_data()) {
        let first = parse_rich_value_data_xml(&write_rich_value_data_xml(&data).unwrap()).unwrap();
        prop_assert_eq!(&first.values, &data.values);
        prop_assert_eq!(first.count.is_some(), data.count.is_some());
        let second =
            parse_rich_value_data_xml(&write_rich_value_data_xml(&first).unwrap()).unwrap();
        prop_assert_eq!(&second, &first);
    }

    #[test]
    fn rich_value_rels_parse_is_idempotent(rels in rich_value_rels()) {
        let first = parse_rich_value_rels_xml(&write_rich_value_rels_xml(&rels).unwrap()).unwrap();
        prop_assert_eq!(&first.rels, &rels.rels);
        prop_assert_eq!(&first.ext_lst, &rels.ext_lst);
        let second =
            parse_rich_value_rels_xml(&write_rich_value_rels_xml(&first).unwrap()).unwrap();
        prop_assert_eq!(&second, &first);
    }
}
