use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use aln_core::{
    decoder::decode_packet,
    encoder::{encode_frame_body, encode_packet, stuff, PacketBuilder},
    fec::HammingCodec,
    ParserConfig,
};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [16, 256, 1024, 16384] {
        let payload = Bytes::from(vec![0x42u8; size]);
        let packet = PacketBuilder::new()
            .src_addr(1)
            .dest_addr(2)
            .seq_num(3)
            .data(payload)
            .with_crc()
            .build()
            .unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &packet, |b, packet| {
            b.iter(|| encode_packet(black_box(packet)).unwrap());
        });
    }

    group.finish();
}

fn bench_stuff(c: &mut Criterion) {
    let mut group = c.benchmark_group("stuff");
    let config = ParserConfig::default();

    // Worst case: every byte is a leader
    for (name, fill) in [("plain", 0x42u8), ("all_leaders", config.leader)] {
        let body = vec![fill; 4096];
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, body.len()), &body, |b, body| {
            b.iter(|| stuff(black_box(body), &config));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [16, 256, 1024, 16384] {
        let packet = PacketBuilder::new()
            .seq_num(1)
            .data(Bytes::from(vec![0x42u8; size]))
            .with_crc()
            .build()
            .unwrap();
        let body = encode_frame_body(&packet, &HammingCodec).unwrap();

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| decode_packet(black_box(body)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_stuff, bench_decode);
criterion_main!(benches);
