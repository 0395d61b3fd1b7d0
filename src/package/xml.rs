//! Well-formedness checks for rewritten members.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Check that `xml` is a single well-formed element tree.
///
/// Tags must nest and match, and exactly one root element must be present.
/// Namespaces are not resolved.
pub fn validate_xml(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::Empty(_)) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            Ok(_) => {}
        }
    }

    if depth != 0 {
        return Err(Error::Xml(format!("{} unclosed element(s)", depth)));
    }
    match roots {
        1 => Ok(()),
        0 => Err(Error::Xml("no root element".to_string())),
        n => Err(Error::Xml(format!("{} root elements", n))),
    }
}
