use criterion::{Criterion, criterion_group, criterion_main};
use rst_guides_engine::Parser;
mod common;

fn bench_document_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = common::generate_guide_content(100);
    group.bench_function("guide_100_sections", |b| {
        b.iter(|| {
            let mut parser = Parser::default();
            let doc = parser.parse(std::hint::black_box(&content));
            std::hint::black_box(doc);
        });
    });

    let table = common::generate_table(200);
    group.bench_function("grid_table_200_rows", |b| {
        b.iter(|| {
            let mut parser = Parser::default();
            std::hint::black_box(parser.parse(std::hint::black_box(&table)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_document_parse);
criterion_main!(benches);
