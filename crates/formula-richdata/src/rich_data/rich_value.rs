//! `xl/richData/rdrichvalue.xml`.
//!
//! Each `<rv s="..">` is one rich value: `s` selects a structure from `rdrichvaluestructure.xml`
//! and the `<v>` children are the structure's key values in order. The values are kept as plain
//! strings; typing them needs the structure part, which lives outside this crate.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::options::len_to_count;
use crate::xml::{self, set_once};
use crate::{RawXml, RichDataError, WriteOptions};

pub const RICHDATA_NS: &str = "http://schemas.microsoft.com/office/spreadsheetml/2017/richdata";

const PART: &str = "rich value part";

/// Parsed `<rvData>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichValueData {
    pub root_attributes: Vec<(String, String)>,
    /// `count=`; `None` when absent.
    pub count: Option<i64>,
    pub values: Vec<RichValue>,
    pub ext_lst: Option<RawXml>,
}

impl RichValueData {
    /// Append a rich value and return its 0-based index (the index `vm` metadata resolves to).
    pub fn push(&mut self, value: RichValue) -> u32 {
        self.values.push(value);
        if self.count.is_some() {
            self.count = Some(len_to_count(self.values.len()));
        }
        u32::try_from(self.values.len() - 1).unwrap_or(u32::MAX)
    }

    pub fn get(&self, idx: u32) -> Option<&RichValue> {
        self.values.get(idx as usize)
    }
}

/// One `<rv>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichValue {
    /// `s=`: structure index.
    pub style_index: i64,
    /// Attributes other than `s`, in document order, `xmlns:*` declarations included.
    pub attributes: Vec<(String, String)>,
    /// `<v>` payloads in document order.
    pub values: Vec<String>,
    /// `<fb>` fallback shown by consumers that do not understand the structure.
    pub fallback: Option<RawXml>,
}

impl RichValue {
    pub fn new(style_index: i64, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            style_index,
            attributes: Vec::new(),
            values: values.into_iter().map(Into::into).collect(),
            fallback: None,
        }
    }
}

/// Parse `xl/richData/rdrichvalue.xml`.
pub fn parse_rich_value_data_xml(xml: &[u8]) -> Result<RichValueData, RichDataError> {
    let mut reader = xml::reader(xml)?;
    let (root, empty) = xml::expect_root(&mut reader, "rvData")?;

    let attrs = xml::attributes(&root)?;
    let mut data = RichValueData {
        root_attributes: xml::unmodeled_attributes(&root, &["count"])?,
        count: xml::optional_int(&attrs, "rvData", "count")?,
        ..Default::default()
    };

    xml::for_each_child(&mut reader, "rvData", empty, |reader, e, empty| {
        match e.local_name().as_ref() {
            b"rv" => data.values.push(parse_rich_value(reader, e, empty)?),
            b"extLst" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut data.ext_lst, raw, "extLst", PART);
            }
            _ => xml::skip_unknown(reader, "rvData", e, empty)?,
        }
        Ok(())
    })?;

    xml::expect_eof(&mut reader)?;
    Ok(data)
}

fn parse_rich_value(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<RichValue, RichDataError> {
    let attrs = xml::attributes(start)?;
    let mut rv = RichValue {
        style_index: xml::required_int(&attrs, "rv", "s")?,
        attributes: xml::unmodeled_attributes(start, &["s"])?,
        ..Default::default()
    };

    xml::for_each_child(reader, "rv", empty, |reader, e, empty| {
        match e.local_name().as_ref() {
            b"v" => {
                let value = if empty {
                    String::new()
                } else {
                    xml::read_text_content(reader, "v")?
                };
                rv.values.push(value);
            }
            b"fb" => {
                let raw = RawXml::capture(reader, e, empty)?;
                set_once(&mut rv.fallback, raw, "fb", "<rv>");
            }
            _ => xml::skip_unknown(reader, "rv", e, empty)?,
        }
        Ok(())
    })?;

    Ok(rv)
}

/// Serialize `xl/richData/rdrichvalue.xml` with the default [`WriteOptions`].
pub fn write_rich_value_data_xml(data: &RichValueData) -> Result<Vec<u8>, RichDataError> {
    write_rich_value_data_xml_with_options(data, WriteOptions::default())
}

pub fn write_rich_value_data_xml_with_options(
    data: &RichValueData,
    options: WriteOptions,
) -> Result<Vec<u8>, RichDataError> {
    let mut writer = xml::new_writer();
    xml::write_decl(&mut writer)?;

    let mut root = xml::root_start("rvData", &data.root_attributes, &[("xmlns", RICHDATA_NS)]);
    let count = options
        .count_policy
        .resolve(data.count, data.values.len())
        .map(|count| count.to_string());
    if let Some(count) = &count {
        root.push_attribute(("count", count.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    for rv in &data.values {
        write_rich_value(&mut writer, rv)?;
    }
    if let Some(ext_lst) = &data.ext_lst {
        ext_lst.write_to(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new("rvData")))?;
    Ok(xml::finish(writer))
}

fn write_rich_value<W: Write>(writer: &mut Writer<W>, rv: &RichValue) -> Result<(), RichDataError> {
    let mut start = BytesStart::new("rv");
    start.push_attribute(("s", rv.style_index.to_string().as_str()));
    xml::push_attributes(&mut start, &rv.attributes);

    if rv.values.is_empty() && rv.fallback.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    // CT_RichValue: `fb` precedes the `v` sequence.
    if let Some(fallback) = &rv.fallback {
        fallback.write_to(writer)?;
    }
    for value in &rv.values {
        writer.write_event(Event::Start(BytesStart::new("v")))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new("v")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("rv")))?;
    Ok(())
}
