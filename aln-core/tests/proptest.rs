//! Property-based tests using proptest

use aln_core::{
    constants::{FRAME_ESCAPE, FRAME_LEADER},
    decoder::decode_packet,
    encoder::{encode_packet, stuff, PacketBuilder},
    parser::parse_stream,
    FrameParser, Packet, PacketQueue, ParserConfig,
};
use bytes::Bytes;
use proptest::prelude::*;

/// Payloads biased towards leader and escape bytes
fn framing_heavy_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(FRAME_LEADER),
            1 => Just(FRAME_ESCAPE),
            2 => any::<u8>(),
        ],
        0..max_len,
    )
}

/// Noise that cannot leave a partial leader run behind
fn leaderless_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        any::<u8>().prop_filter("leader byte", |b| *b != FRAME_LEADER),
        0..max_len,
    )
}

fn packet_with(seq: u16, data: Vec<u8>) -> Packet {
    PacketBuilder::new()
        .seq_num(seq)
        .data(Bytes::from(data))
        .with_crc()
        .build()
        .unwrap()
}

fn collect(chunks: &[&[u8]]) -> (PacketQueue<Packet>, aln_core::ParserStats) {
    let mut parser = FrameParser::<Packet, _>::collecting(ParserConfig::default()).unwrap();
    for chunk in chunks {
        parser.ingest(chunk);
    }
    let stats = parser.stats().clone();
    (parser.into_sink(), stats)
}

proptest! {
    #[test]
    fn prop_chunking_is_invisible(
        payloads in prop::collection::vec(framing_heavy_bytes(64), 1..6),
        noise in prop::collection::vec(any::<u8>(), 0..32),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8)
    ) {
        let mut stream = noise;
        for (seq, data) in payloads.into_iter().enumerate() {
            stream.extend_from_slice(&encode_packet(&packet_with(seq as u16, data)).unwrap());
        }

        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(stream.len() + 1)).collect();
        points.sort_unstable();
        let mut chunks = Vec::new();
        let mut start = 0;
        for point in points {
            chunks.push(&stream[start..point]);
            start = point;
        }
        chunks.push(&stream[start..]);

        let (whole, whole_stats) = collect(&[stream.as_slice()]);
        let (split, split_stats) = collect(&chunks);

        prop_assert_eq!(whole, split);
        prop_assert_eq!(whole_stats, split_stats);
    }

    #[test]
    fn prop_ingest_never_panics(data in prop::collection::vec(any::<u8>(), 0..8192)) {
        let (_, stats) = parse_stream(&data);
        prop_assert_eq!(stats.bytes_ingested, data.len() as u64);
        prop_assert!(stats.frames_dispatched <= stats.frames_started);
    }

    #[test]
    fn prop_framing_heavy_noise_never_panics(data in framing_heavy_bytes(4096)) {
        let mut parser = FrameParser::<Packet, _>::collecting(ParserConfig::default()).unwrap();
        parser.ingest(&data);
        parser.close();
        prop_assert!(parser.buffered().is_empty());
    }

    #[test]
    fn prop_resync_after_garbage(
        garbage in leaderless_bytes(256),
        data in framing_heavy_bytes(128),
        seq in any::<u16>()
    ) {
        let packet = packet_with(seq, data.clone());
        let wire = encode_packet(&packet).unwrap();

        let mut stream = garbage;
        stream.extend_from_slice(&wire);
        let (packets, _) = parse_stream(&stream);

        prop_assert_eq!(packets.len(), 1);
        prop_assert_eq!(packets[0].seq_num, Some(seq));
        prop_assert_eq!(packets[0].data.as_ref(), data.as_slice());
    }

    #[test]
    fn prop_escape_round_trip(data in framing_heavy_bytes(256)) {
        let wire = encode_packet(&packet_with(0, data.clone())).unwrap();
        let (packets, stats) = parse_stream(&wire);

        prop_assert_eq!(packets.len(), 1);
        prop_assert_eq!(packets[0].data.as_ref(), data.as_slice());
        prop_assert_eq!(stats.frames_started, 1);
    }

    #[test]
    fn prop_stuffed_body_has_no_leader_run(body in framing_heavy_bytes(512)) {
        let config = ParserConfig::default();
        let stuffed = stuff(&body, &config);

        let mut run = 0u8;
        for byte in stuffed.iter() {
            if *byte == config.leader {
                run += 1;
                prop_assert!(run < config.leader_len);
            } else {
                run = 0;
            }
        }
    }

    #[test]
    fn prop_checksum_gate(
        data in framing_heavy_bytes(128),
        index in any::<prop::sample::Index>(),
        value in any::<u8>()
    ) {
        let wire = encode_packet(&packet_with(1, data)).unwrap();
        let next = packet_with(2, b"next".to_vec());

        // Any byte after the leader run, except a closing escape
        let closing = usize::from(wire.last() == Some(&FRAME_ESCAPE));
        let offset = 4 + index.index(wire.len() - 4 - closing);
        prop_assume!(wire[offset] != value);

        let mut stream = wire.to_vec();
        stream[offset] = value;
        stream.extend_from_slice(&encode_packet(&next).unwrap());

        let (packets, _) = parse_stream(&stream);

        // A damaged word can decode to flags without a checksum, so only
        // checksummed frames are held to the gate
        let checked: Vec<&Packet> = packets.iter().filter(|p| p.crc.is_some()).collect();
        prop_assert_eq!(checked.len(), 1);
        prop_assert_eq!(checked[0].seq_num, Some(2));
        prop_assert_eq!(checked[0].data.as_ref(), b"next");
    }

    #[test]
    fn prop_strict_decode_never_panics(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_packet(&body);
    }
}
