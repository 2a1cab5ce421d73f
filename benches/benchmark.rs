//! Benchmarks for seglog performance.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use seglog::{Log, OptionsBuilder, Position};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn bench_log(dir: &TempDir) -> Arc<Log> {
    Log::open(
        OptionsBuilder::new(dir.path())
            .segment_size(1024 * 1024 * 1024)
            .sync_interval(Duration::from_secs(3600))
            .build()
            .unwrap(),
    )
    .unwrap()
}

/// Benchmark small entry writes.
fn bench_write_small(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let log = bench_log(&dir);

    let mut group = c.benchmark_group("write_small");
    group.throughput(Throughput::Bytes(11));
    group.bench_function("11_bytes", |b| {
        b.iter(|| {
            let pos = log.write(black_box(b"Hello World")).unwrap();
            black_box(pos)
        })
    });
    group.finish();

    log.close().unwrap();
}

/// Benchmark writes that fragment across many blocks.
fn bench_write_large(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let log = bench_log(&dir);

    let content = vec![b'X'; 256 * 1024 + 500];

    let mut group = c.benchmark_group("write_large");
    group.throughput(Throughput::Bytes(content.len() as u64));
    group.bench_function("256k_plus_500", |b| {
        b.iter(|| {
            let pos = log.write(black_box(&content)).unwrap();
            black_box(pos)
        })
    });
    group.finish();

    log.close().unwrap();
}

/// Benchmark positional reads over a pre-populated log.
fn bench_read(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let log = bench_log(&dir);

    let mut positions: Vec<Position> = Vec::with_capacity(100_000);
    for _ in 0..100_000 {
        positions.push(log.write(b"Hello World").unwrap());
    }
    log.sync().unwrap();

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Bytes(11));
    group.bench_function("random_position", |b| {
        // Walk the positions in a fixed pseudo-random order.
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 99991) % positions.len();
            let entry = log.read(positions[i]).unwrap();
            black_box(entry)
        })
    });
    group.finish();

    log.close().unwrap();
}

/// Benchmark sequential streaming over a pre-populated log.
fn bench_stream(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let log = bench_log(&dir);

    let first = log.write(b"entry 0").unwrap();
    for i in 1..10_000 {
        log.write(format!("entry {}", i).as_bytes()).unwrap();
    }
    log.sync().unwrap();

    c.bench_function("stream_10k_entries", |b| {
        b.iter(|| {
            let reader = log.reader(first).unwrap();
            let mut count = 0usize;
            while let Some(entry) = reader.next_entry().unwrap() {
                black_box(entry);
                count += 1;
            }
            assert_eq!(count, 10_000);
        })
    });

    log.close().unwrap();
}

criterion_group!(
    benches,
    bench_write_small,
    bench_write_large,
    bench_read,
    bench_stream
);
criterion_main!(benches);
