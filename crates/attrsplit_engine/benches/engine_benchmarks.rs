//! Benchmarks for the CRUD split rewrites.
//!
//! Run with: `cargo bench --package attrsplit_engine`

use attrsplit_engine::{Anchor, Conventions, DeclIndex, Refactorer, derive_body, synthesize_crud};
use attrsplit_syntax::{File, parse_file, print_file};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const HANDLER: &str = include_str!("../../../tests/fixtures/acl.go");

fn handler() -> File {
    parse_file(HANDLER).unwrap()
}

// =============================================================================
// Anchor Benchmarks
// =============================================================================

fn bench_index(c: &mut Criterion) {
    let file = handler();
    let refactorer = Refactorer::new();
    c.bench_function("index/acl", |b| b.iter(|| refactorer.index(black_box(&file))));
}

// =============================================================================
// Synthesis Benchmarks
// =============================================================================

fn bench_crud(c: &mut Criterion) {
    let file = handler();
    let conventions = Conventions::default();
    let index = DeclIndex::build(&file, Refactorer::new().policy()).unwrap();
    let process = file.func(index.position(Anchor::Process)).unwrap();

    c.bench_function("crud/acl", |b| {
        b.iter(|| synthesize_crud(black_box(process), index.handler(), &conventions))
    });

    let mut group = c.benchmark_group("derive_body");
    for stmts in [1, 10, 100] {
        let body: String = (0..stmts)
            .map(|i| format!("\t\tcreate(resource, latestVersion + {})\n", i + 1))
            .collect();
        let source = format!(
            "package fastly\n\nfunc f() {{\n\tresource := r\n{body}\tmodified = nil\n}}\n"
        );
        let block = parse_file(&source).unwrap().funcs().next().unwrap().1.body.clone().unwrap();
        group.throughput(Throughput::Elements(stmts as u64));
        group.bench_with_input(BenchmarkId::new("stmts", stmts), &block, |b, block| {
            b.iter(|| derive_body(black_box(block), &conventions))
        });
    }
    group.finish();
}

// =============================================================================
// Pipeline Benchmarks
// =============================================================================

fn bench_refactor(c: &mut Criterion) {
    let file = handler();
    let refactorer = Refactorer::new();
    c.bench_function("refactor/acl", |b| {
        b.iter(|| {
            let mut tree = file.clone();
            let report = refactorer.refactor(black_box(&mut tree)).unwrap();
            (report, print_file(&tree))
        })
    });
}

criterion_group!(benches, bench_index, bench_crud, bench_refactor);

criterion_main!(benches);
