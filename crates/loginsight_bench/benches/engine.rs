//! Query and deletion benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use loginsight_bench::generate_lines;
use loginsight_core::{Config, DeleteConditions, LogQuery, LogStore};
use loginsight_storage::{join_lines, FileLineStore, InMemoryLineStore, LineStore};
use tempfile::TempDir;

const SIZES: [usize; 3] = [1_000, 10_000, 50_000];

/// Benchmark unfiltered first-page queries over in-memory content.
fn bench_query_first_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_first_page");

    for size in SIZES.iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let content = join_lines(&generate_lines(size, 50));
            let store = LogStore::with_stores(Config::default(), |_| {
                Box::new(InMemoryLineStore::with_content(content.clone()))
            });
            let query = LogQuery::new();

            b.iter(|| {
                let page = store.query("general", black_box(&query)).unwrap();
                black_box(page);
            });
        });
    }

    group.finish();
}

/// Benchmark search queries, which serialize every record.
fn bench_query_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_search");

    for size in SIZES.iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let content = join_lines(&generate_lines(size, 50));
            let store = LogStore::with_stores(Config::default(), |_| {
                Box::new(InMemoryLineStore::with_content(content.clone()))
            });
            let query = LogQuery::new().search("ERROR");

            b.iter(|| {
                let page = store.query("general", black_box(&query)).unwrap();
                black_box(page);
            });
        });
    }

    group.finish();
}

/// Benchmark a delete that rewrites a file on disk.
fn bench_delete_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_rewrite");
    group.sample_size(20);

    for size in [1_000usize, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let lines = generate_lines(size, 50);
            let store = LogStore::open(
                Config::new()
                    .log_dir(temp_dir.path())
                    .sync_on_write(false),
            )
            .unwrap();
            let file = FileLineStore::open(&temp_dir.path().join("general.log")).with_sync(false);
            let conditions = DeleteConditions::new().search("\"level\":\"debug\"");

            b.iter(|| {
                file.replace_lines(&lines).unwrap();
                let outcome = store.delete_where("general", black_box(&conditions)).unwrap();
                black_box(outcome);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query_first_page,
    bench_query_search,
    bench_delete_rewrite
);
criterion_main!(benches);
