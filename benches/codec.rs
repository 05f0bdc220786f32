//! Criterion benchmarks for the typed codec layer.
//!
//! Run with:
//!   cargo bench --bench codec
//!
//! Measures the scalar fast paths against the generic N-byte decoder, the
//! varint decoder, and coverage summarisation over a dense log.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use binview::{Accessor, CoverageForce, Endianness};

fn bench_scalar_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_reads");

    for &size in &[65_536usize, 262_144] {
        let data = vec![0x5au8; size];
        group.throughput(Throughput::Bytes(size as u64));

        // ── width-specialised u32 path ──────────────────────────────────────
        group.bench_with_input(BenchmarkId::new("read_u32", size), &data, |b, data| {
            b.iter(|| {
                let mut a = Accessor::open_reading_bytes(data, 0, None).unwrap();
                let mut acc = 0u64;
                for _ in 0..data.len() / 4 {
                    acc = acc.wrapping_add(u64::from(
                        a.read_u32_endian(Endianness::Little).unwrap(),
                    ));
                }
                acc
            })
        });

        // ── generic decoder at the same width ───────────────────────────────
        group.bench_with_input(
            BenchmarkId::new("read_uint_4", size),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut a = Accessor::open_reading_bytes(data, 0, None).unwrap();
                    let mut acc = 0u64;
                    for _ in 0..data.len() / 4 {
                        acc = acc
                            .wrapping_add(a.read_uint_endian(4, Endianness::Little).unwrap());
                    }
                    acc
                })
            },
        );
    }

    group.finish();
}

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");

    // A spread of encoded lengths from 1 to 10 bytes.
    let values: Vec<u64> = (0..10_000u64)
        .map(|i| 1u64.wrapping_shl((i % 64) as u32).wrapping_add(i))
        .collect();
    let encoded = {
        let mut w = Accessor::open_writing_memory(0, 0).unwrap();
        for &v in &values {
            w.write_varint(v).unwrap();
        }
        let total = w.window_size();
        w.seek(std::io::SeekFrom::Start(0)).unwrap();
        w.read_allocated_bytes(total).unwrap()
    };
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("read_varint_10k", |b| {
        b.iter(|| {
            let mut a = Accessor::open_reading_bytes(&encoded, 0, None).unwrap();
            let mut acc = 0u64;
            for _ in 0..values.len() {
                acc = acc.wrapping_add(a.read_varint().unwrap());
            }
            acc
        })
    });

    group.finish();
}

fn bench_coverage_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage");

    for &records in &[1_000usize, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("summarize", records),
            &records,
            |b, &records| {
                let data = vec![0u8; records];
                b.iter(|| {
                    let mut a = Accessor::open_reading_bytes(&data, 0, None).unwrap();
                    a.allow_coverage(true);
                    // Dense interleaved log: every other byte, two passes.
                    for pass in 0..2 {
                        for off in (pass..records).step_by(2) {
                            a.add_coverage_record(
                                off,
                                Some(1),
                                0,
                                0,
                                CoverageForce::OnlyIfEnabled,
                            );
                        }
                    }
                    a.summarize_coverage();
                    a.coverage_records().len()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scalar_reads,
    bench_varint,
    bench_coverage_summarize
);
criterion_main!(benches);
