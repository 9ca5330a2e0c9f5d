//! Benchmarks for BGZF stream throughput.
//!
//! Measures writing and reading across data patterns, plus random seeks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use bgzfstream::{BgzfStream, MemoryDevice, StreamConfig, VirtualOffset};

/// Generate random (incompressible) data
fn generate_random_data(size: usize) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut data = Vec::with_capacity(size);
    let mut hasher = DefaultHasher::new();

    for i in 0..size {
        i.hash(&mut hasher);
        data.push((hasher.finish() & 0xFF) as u8);
    }
    data
}

/// Generate repetitive (highly compressible) data
fn generate_repetitive_data(size: usize) -> Vec<u8> {
    b"ABCDABCDABCDABCD".iter().cycle().take(size).copied().collect()
}

fn compress(data: &[u8], config: StreamConfig) -> Vec<u8> {
    let mut stream = BgzfStream::writer(MemoryDevice::default(), config).unwrap();
    stream.write(data).unwrap();
    stream.close().unwrap().unwrap().into_inner()
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    let size = 4 * 1024 * 1024;

    let inputs =
        [("random", generate_random_data(size)), ("repetitive", generate_repetitive_data(size))];
    for (name, data) in &inputs {
        group.throughput(Throughput::Bytes(data.len() as u64));
        for write_compressed in [true, false] {
            let config = StreamConfig { write_compressed, ..Default::default() };
            let mode = if write_compressed { "compressed" } else { "stored" };
            let id = BenchmarkId::new(*name, mode);
            group.bench_with_input(id, data, |b, data| b.iter(|| compress(data, config.clone())));
        }
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let size = 4 * 1024 * 1024;

    let inputs =
        [("random", generate_random_data(size)), ("repetitive", generate_repetitive_data(size))];
    for (name, data) in &inputs {
        let bgzf = compress(data, StreamConfig::default());
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &bgzf, |b, bgzf| {
            b.iter(|| {
                let mut stream = BgzfStream::reader(MemoryDevice::new(bgzf.clone())).unwrap();
                let mut buf = vec![0u8; 64 * 1024];
                let mut total = 0;
                loop {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    total += n;
                }
                total
            })
        });
    }
    group.finish();
}

fn bench_seek(c: &mut Criterion) {
    let data = generate_repetitive_data(4 * 1024 * 1024);
    let config = StreamConfig { build_index: true, ..Default::default() };
    let mut stream = BgzfStream::writer(MemoryDevice::default(), config).unwrap();
    stream.write(&data).unwrap();
    let bgzf = stream.close().unwrap().unwrap().into_inner();
    let index = stream.take_index().unwrap();

    let targets: Vec<VirtualOffset> = (0..64u64)
        .filter_map(|i| index.virtual_offset(i * 65_521 % data.len() as u64))
        .collect();

    c.bench_function("seek_and_read_record", |b| {
        let mut reader = BgzfStream::reader(MemoryDevice::new(bgzf.clone())).unwrap();
        let mut record = [0u8; 100];
        b.iter(|| {
            for target in &targets {
                reader.seek(*target).unwrap();
                reader.read(&mut record).unwrap();
            }
        })
    });
}

criterion_group!(benches, bench_write, bench_read, bench_seek);
criterion_main!(benches);
