//! Simulated noisy link: frames interleaved with garbage, bit flips and a
//! dropped tail, fed to the parser in random-sized chunks

use aln_core::{
    encoder::{encode_packet, PacketBuilder},
    FrameError, FrameParser, Packet, PacketSink, ParserConfig,
};
use bytes::Bytes;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Prints each packet and each dropped frame as it happens
struct Console;

impl PacketSink<Packet> for Console {
    fn on_packet(&mut self, packet: Packet) {
        println!(
            "  packet seq {:?}: {:?}",
            packet.seq_num,
            String::from_utf8_lossy(&packet.data)
        );
    }

    fn on_discard(&mut self, reason: &FrameError) {
        println!("  dropped: {}", reason);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ALN Noisy Link Example\n");

    let mut rng = StdRng::seed_from_u64(42);
    let mut wire = Vec::new();

    for seq in 0..20u16 {
        let encoded = PacketBuilder::new()
            .seq_num(seq)
            .data(Bytes::from(format!("reading {}", seq * 3)))
            .with_crc()
            .encode()?;

        // Line noise between frames
        for _ in 0..rng.gen_range(0..16) {
            wire.push(rng.gen::<u8>());
        }

        let mut frame = encoded.to_vec();
        if rng.gen_bool(0.2) {
            let index = rng.gen_range(4..frame.len());
            frame[index] ^= 1u8 << rng.gen_range(0..8u32);
        }
        wire.extend_from_slice(&frame);
    }

    // Last frame is cut off by the link going down
    let lost = PacketBuilder::new()
        .seq_num(99)
        .data(Bytes::from("lost"))
        .with_crc()
        .build()?;
    let tail = encode_packet(&lost)?;
    wire.extend_from_slice(&tail[..tail.len() / 2]);

    println!("Feeding {} bytes in random chunks", wire.len());

    let mut parser = FrameParser::<Packet, _>::new(ParserConfig::default(), Console)?;
    let mut pos = 0;
    while pos < wire.len() {
        let len = rng.gen_range(1..=32).min(wire.len() - pos);
        parser.ingest(&wire[pos..pos + len]);
        pos += len;
    }
    parser.close();

    let stats = parser.stats();
    println!("\n=== Link Statistics ===");
    println!("Frames started:     {}", stats.frames_started);
    println!("Packets delivered:  {}", stats.frames_dispatched);
    println!("Frames dropped:     {}", stats.frames_dropped());
    println!("FEC corrections:    {}", stats.control_words_corrected);
    println!("Delivery rate:      {:.1}%", stats.delivery_rate());

    Ok(())
}
