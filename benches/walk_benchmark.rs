use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use tplwalker::walker::{TemplateWalker, TplWalker};
use tplwalker::writer::copy_plain;

/// Create a source tree with N files, every `template_every`-th one a template
fn create_test_tree(dir: &TempDir, count: usize, template_every: usize) -> PathBuf {
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    for i in 0..count {
        let subdir = src.join(format!("dir{}", i % 10));
        fs::create_dir_all(&subdir).unwrap();
        if template_every > 0 && i % template_every == 0 {
            fs::write(subdir.join(format!("file{}.conf.tpl", i)), "host={{ host }}\n").unwrap();
        } else {
            fs::write(subdir.join(format!("file{}.txt", i)), format!("content {}", i)).unwrap();
        }
    }

    src
}

/// Benchmark a single durable copy
fn bench_copy_plain(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("source.txt");
    let dst = temp.path().join("dest.txt");

    fs::write(&src, vec![b'x'; 1024]).unwrap();

    c.bench_function("copy_plain_1kb", |b| {
        b.iter(|| copy_plain(black_box(&src), black_box(&dst), 0o644).unwrap())
    });
}

/// Benchmark whole walks with different file counts and template ratios
fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk_templates");
    let ctx = json!({ "host": "db1" });

    for (file_count, template_every) in [(100, 0), (100, 2), (500, 4)] {
        let temp = TempDir::new().unwrap();
        let src = create_test_tree(&temp, file_count, template_every);
        let dst = temp.path().join("dst");
        let walker = TplWalker::new(&src, ".tpl").unwrap();

        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("every_{}", template_every), file_count),
            &file_count,
            |b, _| {
                b.iter(|| {
                    let _ = fs::remove_dir_all(&dst);
                    walker.walk_templates(black_box(&dst), &ctx).unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_copy_plain, bench_walk);
criterion_main!(benches);
