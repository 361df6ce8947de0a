//! Shared quick-xml plumbing for the part parsers and writers.
//!
//! Element and attribute names are matched on local name only; SpreadsheetML producers disagree on
//! prefixes, and the namespace declarations themselves are carried through as root attributes.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::RichDataError;

pub(crate) type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub(crate) fn reader(xml: &[u8]) -> Result<Reader<&[u8]>, RichDataError> {
    let xml = std::str::from_utf8(xml)?;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    Ok(reader)
}

/// Advance to the document element. The flag is `true` for a self-closing root.
pub(crate) fn read_root<'a>(
    reader: &mut Reader<&'a [u8]>,
) -> Result<(BytesStart<'a>, bool), RichDataError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => return Ok((e, false)),
            Event::Empty(e) => return Ok((e, true)),
            Event::Eof => return Err(RichDataError::Malformed("missing root element".into())),
            _ => {}
        }
    }
}

pub(crate) fn expect_root<'a>(
    reader: &mut Reader<&'a [u8]>,
    expected: &'static str,
) -> Result<(BytesStart<'a>, bool), RichDataError> {
    let (root, empty) = read_root(reader)?;
    if root.local_name().as_ref() != expected.as_bytes() {
        return Err(RichDataError::UnexpectedRoot {
            expected,
            found: String::from_utf8_lossy(root.name().as_ref()).into_owned(),
        });
    }
    Ok((root, empty))
}

/// Consume whatever follows the root element, rejecting a second document element.
pub(crate) fn expect_eof(reader: &mut Reader<&[u8]>) -> Result<(), RichDataError> {
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Start(_) | Event::Empty(_) | Event::End(_) => {
                return Err(RichDataError::Malformed(
                    "unexpected content after root element".into(),
                ))
            }
            _ => {}
        }
    }
}

/// Walk the direct children of an element whose start tag was just read.
///
/// `on_child` receives each child start tag (flagged `true` when self-closing) and must consume the
/// child's whole subtree. Text, comments and processing instructions between children are dropped.
pub(crate) fn for_each_child<'a, F>(
    reader: &mut Reader<&'a [u8]>,
    parent: &'static str,
    empty: bool,
    mut on_child: F,
) -> Result<(), RichDataError>
where
    F: FnMut(&mut Reader<&'a [u8]>, &BytesStart<'a>, bool) -> Result<(), RichDataError>,
{
    if empty {
        return Ok(());
    }
    loop {
        match reader.read_event()? {
            Event::Start(e) => on_child(reader, &e, false)?,
            Event::Empty(e) => on_child(reader, &e, true)?,
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(RichDataError::Malformed(format!(
                    "unexpected eof in <{parent}>"
                )))
            }
            _ => {}
        }
    }
}

/// Skip an element this model has no slot for.
pub(crate) fn skip_unknown(
    reader: &mut Reader<&[u8]>,
    parent: &'static str,
    e: &BytesStart<'_>,
    empty: bool,
) -> Result<(), RichDataError> {
    log::debug!(
        "skipping unrecognized <{}> inside <{parent}>",
        String::from_utf8_lossy(e.name().as_ref())
    );
    if !empty {
        reader.read_to_end(e.name())?;
    }
    Ok(())
}

/// Text content of a simple element (entities resolved, CDATA kept literally). Nested elements are
/// skipped.
pub(crate) fn read_text_content(
    reader: &mut Reader<&[u8]>,
    element: &'static str,
) -> Result<String, RichDataError> {
    let mut out = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => out.push_str(&t.unescape()?),
            Event::CData(c) => out.push_str(std::str::from_utf8(&c)?),
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(out),
            Event::Eof => {
                return Err(RichDataError::Malformed(format!(
                    "unexpected eof in <{element}>"
                )))
            }
            _ => {}
        }
    }
}

/// Attributes as `(qualified name, unescaped value)` pairs in document order.
pub(crate) fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, RichDataError> {
    let mut out = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

/// Root attributes minus the ones the document models itself (matched by local name).
pub(crate) fn unmodeled_attributes(
    e: &BytesStart<'_>,
    modeled: &[&str],
) -> Result<Vec<(String, String)>, RichDataError> {
    let mut attrs = attributes(e)?;
    attrs.retain(|(key, _)| !modeled.iter().any(|local| is_local(key, local)));
    Ok(attrs)
}

fn is_local(key: &str, local: &str) -> bool {
    if key == "xmlns" || key.starts_with("xmlns:") {
        return false;
    }
    key.rsplit_once(':').map_or(key, |(_, name)| name) == local
}

pub(crate) fn find_attr<'x>(attrs: &'x [(String, String)], local: &str) -> Option<&'x str> {
    attrs
        .iter()
        .find(|(key, _)| is_local(key, local))
        .map(|(_, value)| value.as_str())
}

/// Integer attribute value. Only non-numeric text is rejected; the range is left to the stores
/// the value points into.
pub(crate) fn parse_int(
    element: &'static str,
    attribute: &'static str,
    value: &str,
) -> Result<i64, RichDataError> {
    value
        .trim()
        .parse()
        .map_err(|_| RichDataError::InvalidIntegerAttribute {
            element,
            attribute,
            value: value.to_string(),
        })
}

pub(crate) fn required_int(
    attrs: &[(String, String)],
    element: &'static str,
    attribute: &'static str,
) -> Result<i64, RichDataError> {
    let value = find_attr(attrs, attribute).ok_or(RichDataError::MissingRequiredAttribute {
        element,
        attribute,
    })?;
    parse_int(element, attribute, value)
}

pub(crate) fn optional_int(
    attrs: &[(String, String)],
    element: &'static str,
    attribute: &'static str,
) -> Result<Option<i64>, RichDataError> {
    find_attr(attrs, attribute)
        .map(|value| parse_int(element, attribute, value))
        .transpose()
}

/// Store `value` in a singleton slot, keeping the first occurrence.
pub(crate) fn set_once<T>(slot: &mut Option<T>, value: T, element: &str, part: &str) {
    if slot.is_some() {
        log::warn!("duplicate <{element}> in {part}; keeping the first occurrence");
    } else {
        *slot = Some(value);
    }
}

pub(crate) fn new_writer() -> XmlWriter {
    Writer::new(Cursor::new(Vec::new()))
}

pub(crate) fn write_decl(writer: &mut XmlWriter) -> Result<(), RichDataError> {
    writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

pub(crate) fn finish(writer: XmlWriter) -> Vec<u8> {
    writer.into_inner().into_inner()
}

/// Re-emit attributes preserved from the source element.
pub(crate) fn push_attributes(start: &mut BytesStart<'_>, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
}

/// Root start tag: `defaults` fill in declarations the preserved root attributes do not carry.
pub(crate) fn root_start<'x>(
    name: &'x str,
    root_attributes: &'x [(String, String)],
    defaults: &[(&'x str, &'x str)],
) -> BytesStart<'x> {
    let mut start = BytesStart::new(name);
    for (key, value) in defaults {
        if !root_attributes.iter().any(|(k, _)| k == key) {
            start.push_attribute((*key, *value));
        }
    }
    push_attributes(&mut start, root_attributes);
    start
}
