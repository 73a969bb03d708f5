//! Minimal element tree built from `quick-xml` events.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

/// An XML element with its attributes, character data and children.
#[derive(Debug, Default)]
pub(crate) struct Element {
    /// Tag name.
    pub(crate) name: String,
    /// Attributes in document order, unescaped.
    attributes: Vec<(String, String)>,
    /// Character data directly inside this element, unescaped.
    pub(crate) text: String,
    /// Child elements in document order.
    pub(crate) children: Vec<Element>,
}

impl Element {
    /// Returns the value of the named attribute.
    pub(crate) fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.0 == key)
            .map(|attr| attr.1.as_str())
    }

    /// Returns the first child with the given name.
    pub(crate) fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns every child with the given name, in document order.
    pub(crate) fn children_named<'doc>(
        &'doc self,
        name: &'doc str,
    ) -> impl Iterator<Item = &'doc Self> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Reads a whole document and returns its root element.
///
/// Comments, processing instructions and the XML declaration are skipped.
/// Whitespace is kept as-is so string values survive byte for byte.
#[allow(
    clippy::wildcard_enum_match_arm,
    reason = "declarations, comments, PIs and doctypes carry no data"
)]
pub(crate) fn read_document<R: BufRead>(input: R) -> Result<Element, ParseError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(source) => return Err(xml_error(&reader, source)),
        };

        match event {
            Event::Start(start) => stack.push(open_element(&reader, &start)?),
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Malformed("unbalanced end tag".to_owned()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|err| xml_error(&reader, quick_xml::Error::from(err)))?;
                    current.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let raw = core::str::from_utf8(&data).map_err(|err| {
                        ParseError::Malformed(format!("CDATA section is not UTF-8: {err}"))
                    })?;
                    current.text.push_str(raw);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed(format!(
            "document ended inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ParseError::Malformed("document has no root element".to_owned()))
}

/// Builds an element (without children) from a start or empty tag.
fn open_element<R>(reader: &Reader<R>, start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let name = utf8(start.name().as_ref())?.to_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, quick_xml::Error::from(err)))?;
        let key = utf8(attr.key.as_ref())?.to_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(reader, quick_xml::Error::from(err)))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

/// Appends a closed element to its parent, or makes it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ParseError::Malformed(
            "document has more than one root element".to_owned(),
        ));
    }
    *root = Some(element);
    Ok(())
}

/// Decodes a tag or attribute name.
fn utf8(raw: &[u8]) -> Result<&str, ParseError> {
    core::str::from_utf8(raw)
        .map_err(|err| ParseError::Malformed(format!("name is not UTF-8: {err}")))
}

/// Wraps a reader error with the current byte position.
fn xml_error<R>(reader: &Reader<R>, source: quick_xml::Error) -> ParseError {
    ParseError::Xml {
        position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree() {
        let root = read_document(
            br#"<?xml version="1.0"?><a><b id="1">x &amp; y</b><!-- note --><b id="2"/></a>"#
                .as_slice(),
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.children.len(), 2);
        let first = root.child("b").unwrap();
        assert_eq!(first.attribute("id"), Some("1"));
        assert_eq!(first.text, "x & y");
        assert_eq!(root.children_named("b").count(), 2);
    }

    #[test]
    fn keeps_cdata_and_whitespace() {
        let root = read_document(b"<a><b>  padded <![CDATA[<raw>]]></b></a>".as_slice()).unwrap();
        assert_eq!(root.child("b").unwrap().text, "  padded <raw>");
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = read_document(b"<a><b></a>".as_slice()).unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
    }

    #[test]
    fn rejects_truncated_document() {
        let err = read_document(b"<a><b>text</b>".as_slice()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Malformed(_) | ParseError::Xml { .. }
        ));
    }

    #[test]
    fn rejects_empty_document() {
        let err = read_document(b"   ".as_slice()).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }
}
