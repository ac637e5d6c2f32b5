use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linkcheck::{
    create_index, extract_references, CheckerConfig, LinkageChecker, LinkageResolver,
};
use linkcheck_classfile::{parse_class, ClassFileWriter, ACC_PUBLIC};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Library of `size` classes, each calling a method on the next one.
fn write_library(root: &Path, size: usize) -> PathBuf {
    let dir = root.join(format!("lib-{size}"));
    for i in 0..size {
        let next = format!("bench.C{}", (i + 1) % size);
        let class = ClassFileWriter::new(format!("bench.C{i}"))
            .method("work", "(I)V", ACC_PUBLIC)
            .field("value", "J", ACC_PUBLIC)
            .method_ref(&next, "work", "(I)V")
            .method_ref(&next, "missing", "()V")
            .field_ref(&next, "value", "J");
        let path = dir.join(class.entry_name());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, class.build()).unwrap();
    }
    dir
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    let temp_dir = TempDir::new().unwrap();

    for size in [100, 1000].iter() {
        let library = write_library(temp_dir.path(), *size);
        group.bench_with_input(BenchmarkId::new("directory", size), size, |b, _| {
            b.iter(|| {
                black_box(create_index([&library]).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_extract_references(c: &mut Criterion) {
    let bytes = ClassFileWriter::new("bench.Client")
        .method("run", "(Ljava/lang/String;[I)Ljava/util/List;", ACC_PUBLIC)
        .method_ref("bench.Service", "call", "()V")
        .field_ref("bench.Service", "state", "I")
        .class_ref("bench.Other")
        .build();
    let class = parse_class(&bytes).unwrap();

    c.bench_function("extract_references", |b| {
        b.iter(|| {
            black_box(extract_references(&class).unwrap());
        });
    });
}

fn bench_check_artifact(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_artifact");
    let temp_dir = TempDir::new().unwrap();

    for size in [100, 1000].iter() {
        let library = write_library(temp_dir.path(), *size);
        let checker = LinkageChecker::create([&library], CheckerConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("resolve_all", size), size, |b, _| {
            b.iter(|| {
                black_box(checker.check_artifact(&library).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_resolver_cache(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let library = write_library(temp_dir.path(), 100);
    let index = create_index([&library]).unwrap();
    let references = linkcheck::scan_symbol_references_in_artifact(&library).unwrap();

    c.bench_function("resolve_with_fresh_resolver", |b| {
        b.iter(|| {
            let mut resolver = LinkageResolver::new(&index);
            for reference in references.iter() {
                black_box(resolver.resolve(&reference).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_index_build,
    bench_extract_references,
    bench_check_artifact,
    bench_resolver_cache
);
criterion_main!(benches);
