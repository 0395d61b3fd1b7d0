//! Serialization of blocks into section body XML.

use super::xml::{Tag, XmlWriter};
use super::{LayoutOptions, SectionStats};
use crate::error::Result;
use crate::model::{Block, Document, ImageAsset, Section, TableBlock};
use crate::style::{StyleKey, StyleResolver, StyleTriple, TableCellPosition};
use std::collections::BTreeMap;

/// Serialized body of a section member.
#[derive(Debug, Clone, Default)]
pub struct SectionBody {
    /// Body XML, to be placed between the preamble and the terminator
    pub xml: String,

    /// Statistics per written section, in order
    pub sections: Vec<SectionStats>,

    /// Figure ids written as placeholders
    pub placeholders: Vec<String>,
}

/// Writes blocks as `<hp:p>` paragraphs.
///
/// Paragraph and table ids are assigned sequentially from the layout's seeds.
/// Image references are resolved against `assets`, keyed by figure id; a
/// reference with no asset is written as an empty placeholder paragraph.
pub struct SectionWriter<'a> {
    xml: XmlWriter,
    resolver: &'a StyleResolver,
    layout: &'a LayoutOptions,
    assets: &'a BTreeMap<String, ImageAsset>,
    next_paragraph_id: u64,
    next_table_id: u64,
    sections: Vec<SectionStats>,
    placeholders: Vec<String>,
}

impl<'a> SectionWriter<'a> {
    /// Create a writer.
    pub fn new(
        resolver: &'a StyleResolver,
        layout: &'a LayoutOptions,
        assets: &'a BTreeMap<String, ImageAsset>,
    ) -> Self {
        Self {
            xml: XmlWriter::new(),
            resolver,
            layout,
            assets,
            next_paragraph_id: layout.paragraph_id_start,
            next_table_id: layout.table_id_start,
            sections: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    /// Write the body sections, then a page break and the appendix sections.
    pub fn write_document(&mut self, doc: &Document) -> Result<()> {
        for section in doc.body_sections() {
            self.write_section(section)?;
        }

        let mut appendix = doc.appendix_sections().peekable();
        if appendix.peek().is_some() {
            self.write_page_break()?;
        }
        for section in appendix {
            self.write_section(section)?;
        }
        Ok(())
    }

    /// Write one section.
    pub fn write_section(&mut self, section: &Section) -> Result<()> {
        log::debug!(
            "writing section '{}' ({} blocks)",
            section.label,
            section.blocks.len()
        );
        let mut stats = SectionStats::new(&section.label);
        for block in &section.blocks {
            self.write_block(block, &mut stats)?;
        }
        self.sections.push(stats);
        Ok(())
    }

    /// Write one block, counting it into `stats`.
    pub fn write_block(&mut self, block: &Block, stats: &mut SectionStats) -> Result<()> {
        stats.count_block(block);
        match block {
            Block::Table(table) => {
                self.write_table(table)?;
                stats.add_table();
            }
            Block::ImageRef { figure_id } => {
                let assets = self.assets;
                match assets.get(figure_id) {
                    Some(asset) => {
                        self.write_picture(asset)?;
                        stats.add_image();
                    }
                    None => {
                        log::debug!("figure {} has no image, writing placeholder", figure_id);
                        self.write_styled(StyleKey::Empty, "")?;
                        stats.add_placeholder();
                        self.placeholders.push(figure_id.clone());
                    }
                }
            }
            _ => {
                let style = self.resolver.resolve(block);
                let id = self.paragraph_id();
                self.write_paragraph(id, style, block.text().unwrap_or(""), false)?;
            }
        }
        self.xml.newline()
    }

    /// Write an empty paragraph that starts a new page.
    pub fn write_page_break(&mut self) -> Result<()> {
        let style = self.resolver.resolve_key(StyleKey::Empty);
        let id = self.paragraph_id();
        self.write_paragraph(id, style, "", true)?;
        self.xml.newline()
    }

    /// Write a paragraph in the style registered for `key`.
    pub fn write_styled(&mut self, key: StyleKey, text: &str) -> Result<()> {
        let style = self.resolver.resolve_key(key);
        let id = self.paragraph_id();
        self.write_paragraph(id, style, text, false)
    }

    /// Write a paragraph whose text ends in a right-aligned dot-leader tab.
    pub fn write_tab_entry(&mut self, key: StyleKey, text: &str, tab_width: u32) -> Result<()> {
        let style = self.resolver.resolve_key(key);
        let id = self.paragraph_id();
        self.open_paragraph(id, style, false)?;
        self.xml
            .start(Tag::new("hp:run").attr("charPrIDRef", style.run_style_id))?;
        self.xml.start(Tag::new("hp:t"))?;
        self.xml.text(text)?;
        self.xml.empty(
            Tag::new("hp:tab")
                .attr("width", tab_width)
                .attr("leader", 3)
                .attr("type", 2),
        )?;
        self.xml.end("hp:t")?;
        self.xml.end("hp:run")?;
        self.xml.end("hp:p")?;
        self.xml.newline()
    }

    /// Finish writing and return the body.
    pub fn finish(self) -> Result<SectionBody> {
        Ok(SectionBody {
            xml: self.xml.into_string()?,
            sections: self.sections,
            placeholders: self.placeholders,
        })
    }

    fn paragraph_id(&mut self) -> u64 {
        let id = self.next_paragraph_id;
        self.next_paragraph_id += 1;
        id
    }

    fn open_paragraph(&mut self, id: u64, style: StyleTriple, page_break: bool) -> Result<()> {
        self.xml.start(
            Tag::new("hp:p")
                .attr("id", id)
                .attr("paraPrIDRef", style.paragraph_style_id)
                .attr("styleIDRef", style.block_style_id)
                .attr("pageBreak", u8::from(page_break))
                .attr("columnBreak", 0)
                .attr("merged", 0),
        )
    }

    fn write_paragraph(
        &mut self,
        id: u64,
        style: StyleTriple,
        text: &str,
        page_break: bool,
    ) -> Result<()> {
        self.open_paragraph(id, style, page_break)?;
        let run = Tag::new("hp:run").attr("charPrIDRef", style.run_style_id);
        if text.is_empty() {
            self.xml.empty(run)?;
        } else {
            self.xml.start(run)?;
            self.xml.start(Tag::new("hp:t"))?;
            self.xml.text(text)?;
            self.xml.end("hp:t")?;
            self.xml.end("hp:run")?;
        }
        self.xml.end("hp:p")
    }

    fn write_table(&mut self, table: &TableBlock) -> Result<()> {
        let layout = self.layout;
        let resolver = self.resolver;
        let host = resolver.resolve_key(StyleKey::TableHost);
        let rows = table.row_count();
        let cols = table.column_count();
        let table_id = self.next_table_id;
        self.next_table_id += 1;

        if table.is_ragged() {
            log::debug!("table {} has ragged rows", table_id);
        }

        let id = self.paragraph_id();
        self.open_paragraph(id, host, false)?;
        self.xml
            .start(Tag::new("hp:run").attr("charPrIDRef", host.run_style_id))?;
        self.xml.start(
            Tag::new("hp:tbl")
                .attr("id", table_id)
                .attr("zOrder", 5)
                .attr("numberingType", "TABLE")
                .attr("textWrap", "TOP_AND_BOTTOM")
                .attr("textFlow", "BOTH_SIDES")
                .attr("lock", 0)
                .attr("dropcapstyle", "None")
                .attr("pageBreak", "TABLE")
                .attr("repeatHeader", 1)
                .attr("rowCnt", rows)
                .attr("colCnt", cols)
                .attr("cellSpacing", 0)
                .attr("borderFillIDRef", resolver.borders().table)
                .attr("noAdjust", 0),
        )?;
        self.xml.empty(
            Tag::new("hp:sz")
                .attr("width", layout.table_width)
                .attr("widthRelTo", "ABSOLUTE")
                .attr("height", rows as u64 * u64::from(layout.row_height))
                .attr("heightRelTo", "ABSOLUTE")
                .attr("protect", 0),
        )?;
        self.xml.empty(position("PARA"))?;
        self.xml.empty(margins("hp:outMargin", layout.cell_margin))?;
        self.xml.empty(margins("hp:inMargin", layout.cell_margin))?;

        let cell_width = layout.cell_width(cols);
        for (row, cells) in table.all_rows().enumerate() {
            self.xml.start(Tag::new("hp:tr"))?;
            for (col, text) in cells.iter().enumerate() {
                let position = TableCellPosition::new(row, col, rows, cols);
                self.write_cell(position, text, cell_width)?;
            }
            self.xml.end("hp:tr")?;
        }

        self.xml.end("hp:tbl")?;
        self.xml.empty(Tag::new("hp:t"))?;
        self.xml.end("hp:run")?;
        self.xml.end("hp:p")
    }

    fn write_cell(&mut self, position: TableCellPosition, text: &str, width: u32) -> Result<()> {
        let layout = self.layout;
        let resolver = self.resolver;
        let style = resolver.resolve_key(StyleKey::TableCell);

        self.xml.start(
            Tag::new("hp:tc")
                .attr("name", "")
                .attr("header", u8::from(position.row == 0))
                .attr("hasMargin", 0)
                .attr("protect", 0)
                .attr("editable", 0)
                .attr("dirty", 0)
                .attr("borderFillIDRef", resolver.borders().fill_for(position)),
        )?;
        self.xml.start(
            Tag::new("hp:subList")
                .attr("id", "")
                .attr("textDirection", "HORIZONTAL")
                .attr("lineWrap", "BREAK")
                .attr("vertAlign", "CENTER")
                .attr("linkListIDRef", 0)
                .attr("linkListNextIDRef", 0)
                .attr("textWidth", 0)
                .attr("textHeight", 0)
                .attr("hasTextRef", 0)
                .attr("hasNumRef", 0),
        )?;
        self.write_paragraph(layout.cell_paragraph_id, style, text, false)?;
        self.xml.end("hp:subList")?;
        self.xml.empty(
            Tag::new("hp:cellAddr")
                .attr("colAddr", position.col)
                .attr("rowAddr", position.row),
        )?;
        self.xml
            .empty(Tag::new("hp:cellSpan").attr("colSpan", 1).attr("rowSpan", 1))?;
        self.xml.empty(
            Tag::new("hp:cellSz")
                .attr("width", width)
                .attr("height", layout.row_height),
        )?;
        self.xml.empty(margins("hp:cellMargin", layout.cell_margin))?;
        self.xml.end("hp:tc")
    }

    fn write_picture(&mut self, asset: &ImageAsset) -> Result<()> {
        let layout = self.layout;
        let host = self.resolver.resolve_key(StyleKey::ImageHost);
        let id = u64::from(asset.asset_id);
        let (dw, dh) = (asset.display_width, asset.display_height);
        let (nw, nh) = (asset.natural_width, asset.natural_height);

        let pid = self.paragraph_id();
        self.open_paragraph(pid, host, false)?;
        self.xml
            .start(Tag::new("hp:run").attr("charPrIDRef", host.run_style_id))?;
        self.xml.start(
            Tag::new("hp:pic")
                .attr("id", layout.picture_id_base + id)
                .attr("zOrder", layout.picture_z_order_base + id)
                .attr("numberingType", "PICTURE")
                .attr("textWrap", "TOP_AND_BOTTOM")
                .attr("textFlow", "BOTH_SIDES")
                .attr("lock", 0)
                .attr("dropcapstyle", "None")
                .attr("href", "")
                .attr("groupLevel", 0)
                .attr("instid", layout.picture_instid_base + id)
                .attr("reverse", 0),
        )?;
        self.xml
            .empty(Tag::new("hp:offset").attr("x", 0).attr("y", 0))?;
        self.xml
            .empty(Tag::new("hp:orgSz").attr("width", dw).attr("height", dh))?;
        self.xml
            .empty(Tag::new("hp:curSz").attr("width", dw).attr("height", dh))?;
        self.xml.empty(
            Tag::new("hp:flip")
                .attr("horizontal", 0)
                .attr("vertical", 0),
        )?;
        self.xml.empty(
            Tag::new("hp:rotationInfo")
                .attr("angle", 0)
                .attr("centerX", dw / 2)
                .attr("centerY", dh / 2)
                .attr("rotateimage", 1),
        )?;

        self.xml.start(Tag::new("hp:renderingInfo"))?;
        self.xml.empty(matrix("hc:transMatrix", "1", "1"))?;
        self.xml.empty(matrix(
            "hc:scaMatrix",
            &ratio(asset.scale_x()),
            &ratio(asset.scale_y()),
        ))?;
        self.xml.empty(matrix("hc:rotMatrix", "1", "1"))?;
        self.xml.end("hp:renderingInfo")?;

        self.xml.empty(
            Tag::new("hc:img")
                .attr("binaryItemIDRef", asset.item_id())
                .attr("bright", 0)
                .attr("contrast", 0)
                .attr("effect", "REAL_PIC")
                .attr("alpha", 0),
        )?;
        self.xml.start(Tag::new("hp:imgRect"))?;
        self.xml
            .empty(Tag::new("hc:pt0").attr("x", 0).attr("y", 0))?;
        self.xml
            .empty(Tag::new("hc:pt1").attr("x", nw).attr("y", 0))?;
        self.xml
            .empty(Tag::new("hc:pt2").attr("x", nw).attr("y", nh))?;
        self.xml
            .empty(Tag::new("hc:pt3").attr("x", 0).attr("y", nh))?;
        self.xml.end("hp:imgRect")?;
        self.xml.empty(
            Tag::new("hp:imgClip")
                .attr("left", 0)
                .attr("right", nw)
                .attr("top", 0)
                .attr("bottom", nh),
        )?;
        self.xml.empty(margins("hp:inMargin", 0))?;
        self.xml.empty(
            Tag::new("hp:imgDim")
                .attr("dimwidth", nw)
                .attr("dimheight", nh),
        )?;
        self.xml.empty(Tag::new("hp:effects"))?;
        self.xml.empty(
            Tag::new("hp:sz")
                .attr("width", dw)
                .attr("widthRelTo", "ABSOLUTE")
                .attr("height", dh)
                .attr("heightRelTo", "ABSOLUTE")
                .attr("protect", 0),
        )?;
        self.xml.empty(position("COLUMN"))?;
        self.xml.empty(margins("hp:outMargin", 0))?;
        self.xml.end("hp:pic")?;
        self.xml.empty(Tag::new("hp:t"))?;
        self.xml.end("hp:run")?;

        let line = layout.picture_line;
        self.xml.start(Tag::new("hp:linesegarray"))?;
        self.xml.empty(
            Tag::new("hp:lineseg")
                .attr("textpos", 0)
                .attr("vertpos", line.vertpos)
                .attr("vertsize", line.vertsize)
                .attr("textheight", line.textheight)
                .attr("baseline", line.baseline)
                .attr("spacing", line.spacing)
                .attr("horzpos", 0)
                .attr("horzsize", line.horzsize)
                .attr("flags", line.flags),
        )?;
        self.xml.end("hp:linesegarray")?;
        self.xml.end("hp:p")
    }
}

/// Inline, centered object position.
fn position(horz_rel_to: &str) -> Tag {
    Tag::new("hp:pos")
        .attr("treatAsChar", 1)
        .attr("affectLSpacing", 0)
        .attr("flowWithText", 1)
        .attr("allowOverlap", 0)
        .attr("holdAnchorAndSO", 0)
        .attr("vertRelTo", "PARA")
        .attr("horzRelTo", horz_rel_to)
        .attr("vertAlign", "TOP")
        .attr("horzAlign", "CENTER")
        .attr("vertOffset", 0)
        .attr("horzOffset", 0)
}

fn margins(name: &'static str, value: u32) -> Tag {
    Tag::new(name)
        .attr("left", value)
        .attr("right", value)
        .attr("top", value)
        .attr("bottom", value)
}

fn matrix(name: &'static str, e1: &str, e5: &str) -> Tag {
    Tag::new(name)
        .attr("e1", e1)
        .attr("e2", 0)
        .attr("e3", 0)
        .attr("e4", 0)
        .attr("e5", e5)
        .attr("e6", 0)
}

/// Shortest decimal form with at most six fraction digits.
fn ratio(value: f64) -> String {
    let s = format!("{:.6}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
