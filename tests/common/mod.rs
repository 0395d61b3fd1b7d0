//! Shared fixtures: a synthetic HWPX template and minimal images.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const SECTION_MEMBER: &str = "Contents/section2.xml";
pub const TOC_MEMBER: &str = "Contents/section1.xml";
pub const MANIFEST_MEMBER: &str = "Contents/content.hpf";

pub const SECTION_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
    r#"<hs:sec xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph" "#,
    r#"xmlns:hs="http://www.hancom.co.kr/hwpml/2011/section" "#,
    r#"xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core">"#,
    r#"<hp:p id="0" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0">"#,
    r#"<hp:run charPrIDRef="0"><hp:secPr id="" textDirection="HORIZONTAL"/></hp:run>"#,
    r#"</hp:p>"#,
    r#"<hp:p id="1" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0">"#,
    r#"<hp:run charPrIDRef="0"><hp:t>템플릿 본문</hp:t></hp:run>"#,
    r#"</hp:p>"#,
    r#"</hs:sec>"#,
);

pub const MANIFEST_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
    r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf/">"#,
    r#"<opf:manifest>"#,
    r#"<opf:item id="header" href="Contents/header.xml" media-type="application/xml"/>"#,
    r#"<opf:item id="section1" href="Contents/section1.xml" media-type="application/xml"/>"#,
    r#"<opf:item id="section2" href="Contents/section2.xml" media-type="application/xml"/>"#,
    r#"<opf:item id="image1" href="BinData/image1.png" media-type="image/png" isEmbeded="1"/>"#,
    r#"</opf:manifest>"#,
    r#"<opf:spine><opf:itemref idref="section1"/><opf:itemref idref="section2"/></opf:spine>"#,
    r#"</opf:package>"#,
);

/// Write a template package with the standard members.
pub fn write_template(path: &Path) {
    write_template_with(path, SECTION_XML, MANIFEST_XML);
}

/// Write a template package with custom section and manifest XML.
pub fn write_template_with(path: &Path, section: &str, manifest: &str) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/hwp+zip").unwrap();

    let members: [(&str, &[u8]); 5] = [
        ("Contents/header.xml", b"<hh:head xmlns:hh=\"urn:head\"/>"),
        (TOC_MEMBER, SECTION_XML.as_bytes()),
        (SECTION_MEMBER, section.as_bytes()),
        (MANIFEST_MEMBER, manifest.as_bytes()),
        ("BinData/image1.png", &[0x89, b'P', b'N', b'G']),
    ];
    for (name, data) in members {
        zip.start_file(name, deflated).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Black RGB PNG encoded with the `image` crate.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut std::io::Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    data
}

/// Read one member of a package as text.
pub fn read_member(package: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(package).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    std::io::Read::read_to_string(&mut entry, &mut text).unwrap();
    text
}
