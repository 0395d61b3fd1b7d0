//! The part of a section member that survives body replacement.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Leading content of a section member.
///
/// A section starts with the XML prolog and the root start tag, followed by
/// the paragraph carrying the section definition (`secPr`) and sometimes
/// other setup nodes. All of that is kept verbatim; everything from the
/// first ordinary paragraph onwards is body and gets replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPreamble {
    text: String,
    prolog_len: usize,
    nodes: Vec<String>,
    root_name: String,
}

impl SectionPreamble {
    /// Parse the preamble out of a section member.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let (root_name, prolog_end) = loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    break (qualified_name(&e)?, position(&reader));
                }
                Ok(Event::Empty(_)) => {
                    return Err(Error::Xml("section root element is empty".to_string()));
                }
                Ok(Event::Eof) => {
                    return Err(Error::Xml("section has no root element".to_string()));
                }
                Err(e) => return Err(xml_error(&reader, e)),
                Ok(_) => {}
            }
        };

        let mut nodes = Vec::new();
        let mut node_start = prolog_end;
        // open child: (is paragraph, contains secPr, depth)
        let mut open: Option<(bool, bool, usize)> = None;

        let body_start = loop {
            let before = position(&reader);
            let event = reader.read_event().map_err(|e| xml_error(&reader, e))?;

            if let Some((is_para, has_sec, depth)) = open.as_mut() {
                match &event {
                    Event::Start(e) => {
                        *has_sec |= is_sec_pr(e);
                        *depth += 1;
                    }
                    Event::Empty(e) => *has_sec |= is_sec_pr(e),
                    Event::End(_) => {
                        *depth -= 1;
                        if *depth == 0 {
                            if *is_para && !*has_sec {
                                break node_start;
                            }
                            nodes.push(xml[node_start..position(&reader)].to_string());
                            open = None;
                        }
                    }
                    Event::Eof => {
                        return Err(Error::Xml("section ends inside an element".to_string()));
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(e) => {
                    node_start = before;
                    open = Some((is_paragraph(&e), is_sec_pr(&e), 1));
                }
                Event::Empty(e) => {
                    if is_paragraph(&e) {
                        break before;
                    }
                    nodes.push(xml[before..position(&reader)].to_string());
                }
                // root closed without any body paragraph
                Event::End(_) => break before,
                Event::Eof => {
                    return Err(Error::Xml(format!("unclosed <{}>", root_name)));
                }
                Event::Text(_) => {}
                _ => nodes.push(xml[before..position(&reader)].to_string()),
            }
        };

        Ok(Self {
            text: xml[..body_start].to_string(),
            prolog_len: prolog_end,
            nodes,
            root_name,
        })
    }

    /// Preamble text, byte for byte as in the member.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Prolog up to and including the root start tag.
    pub fn prolog(&self) -> &str {
        &self.text[..self.prolog_len]
    }

    /// Kept top-level nodes, each as raw text.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Qualified name of the root element, e.g. `hs:sec`.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Closing tag of the root element.
    pub fn terminator(&self) -> String {
        format!("</{}>", self.root_name)
    }

    /// Complete member text around a new body.
    pub fn render(&self, body: &str) -> String {
        let terminator = self.terminator();
        let mut out = String::with_capacity(self.text.len() + body.len() + terminator.len() + 2);
        out.push_str(&self.text);
        if !self.text.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(body);
        if !body.is_empty() && !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&terminator);
        out
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

fn qualified_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| Error::Xml(err.to_string()))
}

fn is_paragraph(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"p"
}

fn is_sec_pr(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"secPr"
}

fn xml_error(reader: &Reader<&[u8]>, e: quick_xml::Error) -> Error {
    Error::Xml(format!("at byte {}: {}", reader.buffer_position(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
        r#"<hs:sec xmlns:hs="urn:s" xmlns:hp="urn:p">"#,
        r#"<hp:p id="0" paraPrIDRef="0"><hp:run charPrIDRef="0"><hp:secPr id="" textDirection="HORIZONTAL"><hp:grid lineGrid="0"/></hp:secPr><hp:ctrl/></hp:run></hp:p>"#,
        r#"<hp:p id="1"><hp:run charPrIDRef="0"><hp:t>old body</hp:t></hp:run></hp:p>"#,
        r#"<hp:p id="2"><hp:run charPrIDRef="0"><hp:t>more</hp:t></hp:run></hp:p>"#,
        r#"</hs:sec>"#,
    );

    #[test]
    fn test_keeps_sec_pr_paragraph() {
        let preamble = SectionPreamble::parse(SECTION).unwrap();
        assert_eq!(preamble.root_name(), "hs:sec");
        assert_eq!(preamble.nodes().len(), 1);
        assert!(preamble.nodes()[0].contains("<hp:secPr"));
        assert!(preamble.as_str().ends_with("</hp:p>"));
        assert!(!preamble.as_str().contains("old body"));
        assert!(preamble
            .prolog()
            .ends_with(r#"<hs:sec xmlns:hs="urn:s" xmlns:hp="urn:p">"#));
        assert!(SECTION.starts_with(preamble.as_str()));
    }

    #[test]
    fn test_render_replaces_body() {
        let preamble = SectionPreamble::parse(SECTION).unwrap();
        let out = preamble.render("<hp:p id=\"9\"/>\n");
        assert!(out.starts_with(preamble.as_str()));
        assert!(out.ends_with("<hp:p id=\"9\"/>\n</hs:sec>"));
        assert!(!out.contains("old body"));
        crate::package::validate_xml(&out).unwrap();
    }

    #[test]
    fn test_section_without_body() {
        let xml = r#"<hs:sec xmlns:hs="urn:s" xmlns:hp="urn:p"><hp:p><hp:secPr/></hp:p></hs:sec>"#;
        let preamble = SectionPreamble::parse(xml).unwrap();
        assert_eq!(preamble.nodes().len(), 1);
        assert_eq!(preamble.terminator(), "</hs:sec>");
    }

    #[test]
    fn test_rejects_bad_sections() {
        assert!(SectionPreamble::parse("").is_err());
        assert!(SectionPreamble::parse("<hs:sec/>").is_err());
        assert!(SectionPreamble::parse("<hs:sec><hp:p><hp:secPr/>").is_err());
    }
}
