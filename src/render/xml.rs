//! Thin layer over `quick_xml::Writer` for emitting OWPML fragments.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

/// An element start tag under construction.
#[derive(Debug, Clone)]
pub struct Tag(BytesStart<'static>);

impl Tag {
    /// Start a tag with a qualified name such as `hp:p`.
    pub fn new(name: &'static str) -> Self {
        Tag(BytesStart::new(name))
    }

    /// Start a tag whose name is only known at run time.
    pub fn owned(name: String) -> Self {
        Tag(BytesStart::new(name))
    }

    /// Append an attribute. The value is escaped.
    pub fn attr(mut self, key: &str, value: impl Display) -> Self {
        let value = value.to_string();
        self.0.push_attribute((key, value.as_str()));
        self
    }
}

/// Writes XML fragments into a byte buffer.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    /// Write a start tag.
    pub fn start(&mut self, tag: Tag) -> Result<()> {
        self.emit(Event::Start(tag.0))
    }

    /// Write a self-closing element.
    pub fn empty(&mut self, tag: Tag) -> Result<()> {
        self.emit(Event::Empty(tag.0))
    }

    /// Write an end tag.
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// Write escaped character data.
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    /// Write a line break between top-level fragments.
    pub fn newline(&mut self) -> Result<()> {
        self.emit(Event::Text(BytesText::from_escaped("\n")))
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the written text.
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| Error::Xml(e.to_string()))
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| Error::Xml(e.to_string()))
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_attributes_and_text() {
        let mut xml = XmlWriter::new();
        xml.start(Tag::new("hp:t").attr("name", "a\"b<c")).unwrap();
        xml.text("R&D <draft>").unwrap();
        xml.end("hp:t").unwrap();

        assert_eq!(
            xml.into_string().unwrap(),
            r#"<hp:t name="a&quot;b&lt;c">R&amp;D &lt;draft&gt;</hp:t>"#
        );
    }

    #[test]
    fn test_empty_element() {
        let mut xml = XmlWriter::new();
        assert!(xml.is_empty());
        xml.empty(Tag::new("hp:cellSpan").attr("colSpan", 1).attr("rowSpan", 1))
            .unwrap();
        assert_eq!(
            xml.into_string().unwrap(),
            r#"<hp:cellSpan colSpan="1" rowSpan="1"/>"#
        );
    }
}
