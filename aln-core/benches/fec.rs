use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use aln_core::{
    constants::{ControlFlags, FLAG_MASK},
    fec::{ControlWordCodec, HammingCodec},
};

fn bench_hamming_encode(c: &mut Criterion) {
    let codec = HammingCodec;
    let mut group = c.benchmark_group("fec_hamming_encode");
    group.throughput(Throughput::Elements(FLAG_MASK as u64 + 1));
    group.bench_function("all_flag_sets", |b| {
        b.iter(|| {
            let mut acc = 0u16;
            for bits in 0..=FLAG_MASK {
                acc ^= codec.encode(ControlFlags::new(black_box(bits)));
            }
            acc
        })
    });
    group.finish();
}

fn bench_hamming_decode(c: &mut Criterion) {
    let codec = HammingCodec;
    let clean: Vec<u16> = (0..=FLAG_MASK)
        .map(|bits| codec.encode(ControlFlags::new(bits)))
        .collect();
    let damaged: Vec<u16> = clean
        .iter()
        .enumerate()
        .map(|(i, word)| word ^ (1 << (i % 16)))
        .collect();

    let mut group = c.benchmark_group("fec_hamming_decode");
    group.throughput(Throughput::Elements(clean.len() as u64));
    for (name, words) in [("clean", &clean), ("single_bit_error", &damaged)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut acc = 0u16;
                for &word in words.iter() {
                    acc ^= codec.decode(black_box(word)).flags.bits();
                }
                acc
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hamming_encode, bench_hamming_decode);
criterion_main!(benches);
