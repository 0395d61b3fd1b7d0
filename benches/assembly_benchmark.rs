//! Benchmarks for mdhwpx parsing and serialization.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic report sections.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdhwpx::render::{render_document, LayoutOptions};
use mdhwpx::{classify, BlockParser, Document, ParseOptions, Section, SectionKind, StyleResolver};
use std::collections::BTreeMap;

/// Creates a synthetic report section with the given number of chapters.
fn create_report(chapters: usize) -> String {
    let mut text = String::new();
    for i in 1..=chapters {
        text.push_str(&format!("## {}. 조사 결과 {}\n\n", i, i));
        text.push_str("본 절에서는 응답자의 특성과 주요 결과를 정리한다.\n\n");
        text.push_str("- 주요 발견: 응답자의 과반이 만족한다고 답하였다.\n");
        text.push_str("- 보조 발견\n\n");
        text.push_str(&format!("[표Ⅰ-{}] 응답 분포\n\n", i));
        text.push_str("| 구분 | 빈도 | 비율 |\n|---|---|---|\n");
        for row in 0..5 {
            text.push_str(&format!("| 항목{} | {} | {}.0 |\n", row, row * 3, row * 10));
        }
        text.push('\n');
        text.push_str(&format!(
            "[그림Ⅰ-{}] 절차\n\n```mermaid\ngraph TD; A-->B\n```\n\n",
            i
        ));
    }
    text
}

fn bench_parsing(c: &mut Criterion) {
    let parser = BlockParser::new(ParseOptions::default()).unwrap();
    let mut group = c.benchmark_group("markdown_parsing");

    for chapters in [1, 10, 50] {
        let text = create_report(chapters);
        group.bench_function(format!("{}_chapters", chapters), |b| {
            b.iter(|| parser.parse_document(black_box(&text)))
        });
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let parser = BlockParser::new(ParseOptions::default()).unwrap();
    let resolver = StyleResolver::default();
    let layout = LayoutOptions::default();
    let assets = BTreeMap::new();

    let mut doc = Document::new();
    doc.add_section(Section::new(
        "Ⅰ",
        SectionKind::Body,
        parser.parse(&create_report(20)),
    ));

    c.bench_function("section_serialization", |b| {
        b.iter(|| render_document(black_box(&doc), &resolver, &layout, &assets).unwrap())
    });
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_20x10", |b| {
        b.iter(|| {
            for row in 0..20 {
                for col in 0..10 {
                    black_box(classify(row, col, 20, 10));
                }
            }
        })
    });
}

criterion_group!(benches, bench_parsing, bench_serialization, bench_classify);
criterion_main!(benches);
