//! The package manifest (`Contents/content.hpf`).

use super::validate_xml;
use crate::error::{Error, Result};
use crate::model::ImageAsset;
use crate::render::{Tag, XmlWriter};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parsed view of the manifest member.
///
/// Only two things matter here: the ids of the items already listed and
/// where the manifest's closing tag sits, since new items go right before it.
#[derive(Debug, Clone)]
pub struct Manifest {
    text: String,
    close_at: usize,
    prefix: String,
    item_ids: Vec<String>,
}

impl Manifest {
    /// Parse manifest XML.
    ///
    /// Fails with [`Error::MissingInput`] if there is no `</…:manifest>` tag.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        // an unclosed manifest is reported as a missing tag
        reader.config_mut().check_end_names = false;
        let mut item_ids = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                Error::Xml(format!("manifest at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"item" => {
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| Error::Xml(err.to_string()))?;
                        if attr.key.local_name().as_ref() == b"id" {
                            item_ids.push(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"manifest" => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let prefix = match name.split_once(':') {
                        Some((prefix, _)) => prefix.to_string(),
                        None => String::new(),
                    };
                    return Ok(Self {
                        text: xml.to_string(),
                        close_at: before,
                        prefix,
                        item_ids,
                    });
                }
                Event::Eof => {
                    return Err(Error::MissingInput(
                        "manifest closing tag".to_string(),
                    ));
                }
                _ => {}
            }
        }
    }

    /// Namespace prefix of the manifest element, e.g. `opf`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Ids of the listed items.
    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    /// Highest `image{N}` number among listed items, 0 if none.
    pub fn highest_asset_id(&self) -> u32 {
        self.item_ids
            .iter()
            .filter_map(|id| image_number(id))
            .max()
            .unwrap_or(0)
    }

    /// Manifest text with one item per asset inserted before the closing
    /// tag. Existing items are left untouched.
    pub fn with_items(&self, assets: &[ImageAsset], bin_dir: &str) -> Result<String> {
        if assets.is_empty() {
            return Ok(self.text.clone());
        }

        let name = if self.prefix.is_empty() {
            "item".to_string()
        } else {
            format!("{}:item", self.prefix)
        };

        let mut xml = XmlWriter::new();
        for asset in assets {
            xml.empty(
                Tag::owned(name.clone())
                    .attr("id", asset.item_id())
                    .attr("href", asset.href(bin_dir))
                    .attr("media-type", asset.media_type.mime_type())
                    .attr("isEmbeded", 1)
                    .attr("hashkey", &asset.content_hash),
            )?;
            xml.newline()?;
        }
        let items = xml.into_string()?;

        let mut out = String::with_capacity(self.text.len() + items.len());
        out.push_str(&self.text[..self.close_at]);
        out.push_str(&items);
        out.push_str(&self.text[self.close_at..]);

        validate_xml(&out)?;
        Ok(out)
    }
}

/// Number in an `image{N}` item id or file name, e.g. 12 for
/// `BinData/image12.png`.
pub fn image_number(name: &str) -> Option<u32> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let rest = file.strip_prefix("image")?;
    let digits: &str = match rest.find(|c: char| !c.is_ascii_digit()) {
        Some(end) => &rest[..end],
        None => rest,
    };
    let tail = &rest[digits.len()..];
    if digits.is_empty() || !(tail.is_empty() || tail.starts_with('.')) {
        return None;
    }
    digits.parse().ok()
}
