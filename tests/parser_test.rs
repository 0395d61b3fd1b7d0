//! Integration tests for Markdown parsing and the pure helpers around it.

use mdhwpx::parser::HeadingNumbering;
use mdhwpx::style::{BorderCatalog, TableCellPosition};
use mdhwpx::{
    classify, parse_markdown, scale_to_fit, Block, BlockParser, BorderClass, CaptionKind,
    ParseOptions,
};

fn diagram_after_gap(gap: usize) -> String {
    format!(
        "[그림Ⅰ-1] 연구 모형\n{}\n```mermaid\ngraph TD; A-->B\n```\n",
        "가".repeat(gap)
    )
}

#[test]
fn test_diagram_caption_within_lookback() {
    let parser = BlockParser::new(ParseOptions::default()).unwrap();
    let parsed = parser.parse_document(&diagram_after_gap(100));

    assert_eq!(parsed.diagrams.len(), 1);
    assert_eq!(parsed.diagrams[0].figure_id, "1-1");
    assert_eq!(parsed.diagrams[0].source, "graph TD; A-->B");
    assert_eq!(parsed.dropped_diagrams, 0);
    assert!(parsed
        .blocks
        .iter()
        .any(|b| matches!(b, Block::ImageRef { figure_id } if figure_id == "1-1")));
    assert_eq!(parsed.captions.figure_title("1-1"), Some("연구 모형"));
}

#[test]
fn test_diagram_caption_too_far_is_dropped() {
    let parser = BlockParser::new(ParseOptions::default()).unwrap();
    let parsed = parser.parse_document(&diagram_after_gap(900));

    assert!(parsed.diagrams.is_empty());
    assert_eq!(parsed.dropped_diagrams, 1);
    assert!(!parsed
        .blocks
        .iter()
        .any(|b| matches!(b, Block::ImageRef { .. })));

    // a wider window picks it up again
    let wide = BlockParser::new(ParseOptions::new().with_caption_lookback(1200)).unwrap();
    assert_eq!(wide.parse_document(&diagram_after_gap(900)).diagrams.len(), 1);
}

#[test]
fn test_report_blocks() {
    let blocks = parse_markdown(
        "# Ⅱ. 연구 방법\n\n## 1. 조사 설계\n\n[표Ⅱ-1] 표본\n\n| 구분 | 명 |\n|---|---|\n| 남 | 10 |\n\n1. 첫째\n- 둘째",
    )
    .unwrap();

    assert_eq!(blocks[0], Block::heading(1, "연구 방법"));
    assert!(blocks.contains(&Block::heading(2, "조사 설계")));
    assert!(blocks
        .iter()
        .any(|b| matches!(b, Block::Caption { kind: CaptionKind::Table, .. })));
    let table = blocks
        .iter()
        .find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
        .unwrap();
    assert_eq!(table.headers, vec!["구분", "명"]);
    assert_eq!(table.rows, vec![vec!["남".to_string(), "10".to_string()]]);
    assert_eq!(
        blocks
            .iter()
            .filter(|b| matches!(b, Block::ListItem { .. }))
            .count(),
        2
    );
}

#[test]
fn test_heading_strip_is_idempotent() {
    let numbering = HeadingNumbering::new().unwrap();
    let samples = [
        (1, "Ⅲ. 결과"),
        (1, "IV. 논의"),
        (2, "1.2. 표본"),
        (3, "가. 현황"),
        (4, "1) 세부"),
        (5, "가) 항목"),
        (2, "번호 없음"),
    ];
    for (level, text) in samples {
        let once = numbering.strip(level, text);
        assert_eq!(numbering.strip(level, &once), once, "{}", text);
    }
}

#[test]
fn test_classify_total_and_deterministic() {
    for total_rows in 1..=6 {
        for total_cols in 1..=6 {
            for row in 0..total_rows + 2 {
                for col in 0..total_cols + 2 {
                    let class = classify(row, col, total_rows, total_cols);
                    assert!(BorderClass::ALL.contains(&class));
                    assert_eq!(class, classify(row, col, total_rows, total_cols));
                }
            }
        }
    }
}

#[test]
fn test_classify_two_by_two() {
    // 1x2 grid: the data row is clamped into the header band
    assert_eq!(classify(0, 0, 1, 2), BorderClass::HeaderLeft);
    assert_eq!(classify(0, 1, 1, 2), BorderClass::HeaderRight);
    assert_eq!(classify(1, 0, 1, 2), BorderClass::HeaderLeft);
    assert_eq!(classify(1, 1, 1, 2), BorderClass::HeaderRight);
    // with the real total the data row is the footer
    assert_eq!(classify(1, 0, 2, 2), BorderClass::FooterLeft);

    let borders = BorderCatalog::default();
    assert_eq!(borders.fill_for(TableCellPosition::new(1, 0, 1, 2)), 19);
    assert_eq!(borders.fill_for(TableCellPosition::new(1, 0, 2, 2)), 16);
}

#[test]
fn test_scale_to_fit_properties() {
    let max = 43936u32;
    for (w, h) in [(100, 50), (43936, 20000), (1, 1)] {
        assert_eq!(scale_to_fit(w, h, max), (w, h));
    }
    for (w, h) in [(144000, 81000), (43937, 1), (90000, 120000), (500000, 3)] {
        let (dw, dh) = scale_to_fit(w, h, max);
        assert_eq!(dw, max);
        let expected = h as f64 * max as f64 / w as f64;
        assert!((dh as f64 - expected).abs() <= 1.0, "{}x{}", w, h);
    }
}
