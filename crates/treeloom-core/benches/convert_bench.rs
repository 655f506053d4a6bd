// SPDX-License-Identifier: AGPL-3.0-or-later
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use treeloom_core::mdast::{to_flat_options, to_nested_options};
use treeloom_core::{to_flat, to_nested_document, FlatNode, Mark};

fn document(paragraphs: usize) -> FlatNode {
    let em = Mark::new("em");
    let strong = Mark::new("strong");
    let link = Mark::new("link").with_attr("href", "https://example.com");

    let paragraph = FlatNode::new("paragraph").with_children(vec![
        FlatNode::text("Plain text, then "),
        FlatNode::text("emphasis").with_marks(vec![em.clone()]),
        FlatNode::text(" running into ").with_marks(vec![em.clone(), strong.clone()]),
        FlatNode::text("a link").with_marks(vec![em, link.clone()]),
        FlatNode::text(" and back.").with_marks(vec![link]),
    ]);

    FlatNode::new("doc").with_children(vec![paragraph; paragraphs])
}

fn bench_to_nested(c: &mut Criterion) {
    let options = to_nested_options();
    let mut group = c.benchmark_group("to_nested");
    for size in [10, 100, 1000] {
        let doc = document(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| to_nested_document(black_box(doc), &options))
        });
    }
    group.finish();
}

fn bench_to_flat(c: &mut Criterion) {
    let nested_options = to_nested_options();
    let flat_options = to_flat_options();
    let mut group = c.benchmark_group("to_flat");
    for size in [10, 100, 1000] {
        let Ok(nested) = to_nested_document(&document(size), &nested_options) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(size), &nested, |b, nested| {
            b.iter(|| to_flat(black_box(nested), &flat_options))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_to_nested, bench_to_flat);
criterion_main!(benches);
