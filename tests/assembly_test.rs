//! Integration tests for package assembly against a synthetic template.

mod common;

use common::*;
use mdhwpx::assets::content_hash;
use mdhwpx::package::{validate_xml, Manifest, PackageAssembler};
use mdhwpx::{
    AssembleOptions, AssemblyStage, Block, ConversionJob, ConvertOptions, Converter, Document,
    Error, Progress, RendererKind, Section, SectionKind,
};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipArchive};

const REPORT: &str = "# Ⅰ. 서론

본문 문단입니다.

[표Ⅰ-1] 응답자 현황

| 구분 | 명 |
|---|---|
| 남 | 10 |
| 여 | 12 |

[그림Ⅰ-1] 연구 모형

```mermaid
graph TD; A-->B
```

[그림Ⅰ-2] 분석 절차

```mermaid
graph LR; C-->D
```
";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    template: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let template = root.join("template.hwpx");
    write_template(&template);
    Fixture {
        output: root.join("out/report.hwpx"),
        template,
        root,
        _dir: dir,
    }
}

fn member_names(package: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(package).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_convert_round_trip() {
    let fx = fixture();
    let section = fx.root.join("01.md");
    fs::write(&section, REPORT).unwrap();

    // only the first diagram has a rendered image
    let diagrams = fx.root.join("diagrams");
    fs::create_dir_all(&diagrams).unwrap();
    let png = png(1920, 1080);
    fs::write(diagrams.join("diagram_1_1.png"), &png).unwrap();

    let job = ConversionJob::new(&fx.template)
        .with_section("Ⅰ. 서론", &section)
        .with_toc_member(TOC_MEMBER)
        .with_output(&fx.output);
    let converter = Converter::new(
        ConvertOptions::new()
            .with_renderer(RendererKind::Directory(diagrams))
            .with_workers(2),
    );

    let mut events = Vec::new();
    let summary = converter.run_with(&job, &mut |p| events.push(p)).unwrap();

    assert_eq!(events.len(), Progress::COUNT);
    assert_eq!(events.last(), Some(&Progress::Stage(AssemblyStage::Done)));
    assert_eq!(summary.asset_count, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].figure_id, "1-2");
    assert_eq!(summary.placeholders, vec!["1-2".to_string()]);
    assert_eq!(summary.toc_entries, 1);
    let totals = summary.totals();
    assert_eq!(totals.table_count, 1);
    assert_eq!(totals.image_count, 1);
    assert_eq!(totals.placeholder_count, 1);

    // mimetype first and stored
    let names = member_names(&fx.output);
    assert_eq!(names[0], "mimetype");
    let mut archive = ZipArchive::new(File::open(&fx.output).unwrap()).unwrap();
    assert_eq!(
        archive.by_index(0).unwrap().compression(),
        CompressionMethod::Stored
    );
    assert!(names.contains(&"BinData/image2.png".to_string()));
    assert!(names.contains(&"BinData/image1.png".to_string()));

    // well-formed section with preamble kept and template body replaced
    let section_xml = read_member(&fx.output, SECTION_MEMBER);
    validate_xml(&section_xml).unwrap();
    assert!(section_xml.contains("<hp:secPr"));
    assert!(!section_xml.contains("템플릿 본문"));
    assert!(section_xml.contains("본문 문단입니다."));
    assert!(section_xml.contains(r#"binaryItemIDRef="image2""#));
    assert!(section_xml.ends_with("</hs:sec>"));

    // one manifest entry per rendered diagram
    let manifest = Manifest::parse(&read_member(&fx.output, MANIFEST_MEMBER)).unwrap();
    let original = Manifest::parse(MANIFEST_XML).unwrap();
    assert_eq!(
        manifest.item_ids().len() - original.item_ids().len(),
        summary.asset_count
    );
    assert_eq!(manifest.highest_asset_id(), 2);

    let toc_xml = read_member(&fx.output, TOC_MEMBER);
    validate_xml(&toc_xml).unwrap();
    assert!(toc_xml.contains("목 차"));
    assert!(toc_xml.contains("Ⅰ. 서론"));
}

#[test]
fn test_missing_manifest_close_tag_writes_nothing() {
    let fx = fixture();
    let broken = MANIFEST_XML.replace("</opf:manifest>", "");
    write_template_with(&fx.template, SECTION_XML, &broken);
    let before = content_hash(&fs::read(&fx.template).unwrap());

    let mut doc = Document::new();
    doc.add_section(Section::new(
        "Ⅰ",
        SectionKind::Body,
        vec![Block::paragraph("본문")],
    ));

    let mut stages = Vec::new();
    let err = PackageAssembler::new(AssembleOptions::default())
        .assemble_with(
            &fx.template,
            &doc,
            &BTreeMap::new(),
            &fx.output,
            &mut |s| stages.push(s),
        )
        .unwrap_err();

    assert!(matches!(err, Error::MissingInput(_)), "{:?}", err);
    assert!(stages.is_empty());
    assert!(!fx.output.exists());
    assert_eq!(content_hash(&fs::read(&fx.template).unwrap()), before);
}

#[test]
fn test_failure_keeps_existing_output() {
    let fx = fixture();
    fs::create_dir_all(fx.output.parent().unwrap()).unwrap();
    fs::write(&fx.output, b"previous").unwrap();

    let doc = Document::new();
    let options = AssembleOptions::new().with_section_member("Contents/section9.xml");
    let err = PackageAssembler::new(options)
        .assemble(&fx.template, &doc, &BTreeMap::new(), &fx.output)
        .unwrap_err();

    assert!(matches!(err, Error::MissingInput(_)));
    assert_eq!(fs::read(&fx.output).unwrap(), b"previous");
}

#[test]
fn test_appendix_after_page_break() {
    let fx = fixture();
    let mut doc = Document::new();
    doc.add_section(Section::new(
        "Ⅰ",
        SectionKind::Body,
        vec![Block::heading(1, "서론"), Block::paragraph("본문")],
    ));
    doc.add_section(Section::new(
        "부록",
        SectionKind::Appendix,
        vec![Block::heading(1, "부록 1. 설문지")],
    ));

    let report = PackageAssembler::default()
        .assemble(&fx.template, &doc, &BTreeMap::new(), &fx.output)
        .unwrap();
    assert_eq!(report.sections.len(), 2);
    assert!(report.assets.is_empty());

    let xml = read_member(&fx.output, SECTION_MEMBER);
    validate_xml(&xml).unwrap();
    let body = xml.find("본문").unwrap();
    let page_break = xml.find(r#"pageBreak="1""#).unwrap();
    let appendix = xml.find("부록 1. 설문지").unwrap();
    assert!(body < page_break && page_break < appendix);

    // no new images, manifest untouched
    assert_eq!(read_member(&fx.output, MANIFEST_MEMBER), MANIFEST_XML);
}

#[test]
fn test_identical_diagrams_get_distinct_ids() {
    let fx = fixture();
    let png = png(800, 600);
    let a = fx.root.join("a.png");
    let b = fx.root.join("b.png");
    fs::write(&a, &png).unwrap();
    fs::write(&b, &png).unwrap();

    let mut doc = Document::new();
    doc.add_section(Section::new(
        "Ⅰ",
        SectionKind::Body,
        vec![Block::image("1-1"), Block::image("1-2")],
    ));
    let rendered = BTreeMap::from([("1-1".to_string(), a), ("1-2".to_string(), b)]);

    let report = PackageAssembler::default()
        .assemble(&fx.template, &doc, &rendered, &fx.output)
        .unwrap();
    assert_eq!(report.assets.len(), 2);
    assert_eq!(report.assets[0].asset_id, 2);
    assert_eq!(report.assets[1].asset_id, 3);
    assert_eq!(report.assets[0].content_hash, report.assets[1].content_hash);

    let names = member_names(&fx.output);
    assert!(names.contains(&"BinData/image2.png".to_string()));
    assert!(names.contains(&"BinData/image3.png".to_string()));
}

#[test]
fn test_repeated_figure_across_sections_written_once() {
    let fx = fixture();
    let first = fx.root.join("01.md");
    let second = fx.root.join("02.md");
    fs::write(&first, REPORT).unwrap();
    fs::write(
        &second,
        "# Ⅱ. 방법

[그림Ⅰ-1] 연구 모형

```mermaid
graph TD; A-->B
```

[그림Ⅱ-1] 표본 설계

```mermaid
graph TD; E-->F
```
",
    )
    .unwrap();

    let diagrams = fx.root.join("diagrams");
    fs::create_dir_all(&diagrams).unwrap();
    for stem in ["diagram_1_1", "diagram_1_2", "diagram_2_1"] {
        fs::write(diagrams.join(format!("{}.png", stem)), png(640, 480)).unwrap();
    }

    let job = ConversionJob::new(&fx.template)
        .with_section("Ⅰ. 서론", &first)
        .with_section("Ⅱ. 방법", &second)
        .with_output(&fx.output);
    let summary = Converter::new(
        ConvertOptions::new().with_renderer(RendererKind::Directory(diagrams)),
    )
    .run(&job)
    .unwrap();

    assert_eq!(summary.dropped_diagrams, 1);
    assert!(summary.failures.is_empty());
    assert!(summary.placeholders.is_empty());
    assert_eq!(summary.asset_count, 3);
    assert_eq!(summary.totals().image_count, 3);

    // pictures, manifest items and rendered diagrams agree
    let section_xml = read_member(&fx.output, SECTION_MEMBER);
    validate_xml(&section_xml).unwrap();
    let pictures: Vec<&str> = section_xml
        .match_indices("<hp:pic id=\"")
        .map(|(at, tag)| {
            let rest = &section_xml[at + tag.len()..];
            &rest[..rest.find('"').unwrap()]
        })
        .collect();
    assert_eq!(pictures.len(), summary.asset_count);
    let unique: std::collections::BTreeSet<&str> = pictures.iter().copied().collect();
    assert_eq!(unique.len(), pictures.len());

    let manifest = Manifest::parse(&read_member(&fx.output, MANIFEST_MEMBER)).unwrap();
    let original = Manifest::parse(MANIFEST_XML).unwrap();
    assert_eq!(
        manifest.item_ids().len() - original.item_ids().len(),
        summary.asset_count
    );
    for id in ["image2", "image3", "image4"] {
        assert_eq!(section_xml.matches(&format!("binaryItemIDRef=\"{}\"", id)).count(), 1);
    }
}
