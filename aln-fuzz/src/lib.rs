//! Fuzz entry points for aln-core
//!
//! Each function takes arbitrary bytes and must never panic. Hook them up
//! to a cargo-fuzz target (`fuzz_target!(|data: &[u8]| fuzz_ingest(data))`).

use aln_core::{
    decoder::decode_packet, parser::parse_stream, FrameParser, Packet, ParserConfig,
};

/// Feed the bytes to a parser in one piece, then byte by byte, and require
/// identical output
pub fn fuzz_ingest(data: &[u8]) {
    let (whole, stats) = parse_stream(data);

    let mut split = Vec::new();
    if let Ok(mut parser) =
        FrameParser::<Packet, _>::new(ParserConfig::default(), |p: Packet| split.push(p))
    {
        for byte in data.chunks(1) {
            parser.ingest(byte);
        }
        parser.close();
    }

    assert_eq!(whole, split);
    assert!(stats.frames_dispatched <= stats.frames_started);
}

/// Strict one-shot decode of a frame body
pub fn fuzz_decode(data: &[u8]) {
    let _ = decode_packet(data);
}

/// Use the first byte to pick a leader length so short runs get exercised
pub fn fuzz_config(data: &[u8]) {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };

    let config = ParserConfig::default()
        .leader_len(2 + selector % 6)
        .max_header_len(2 + (selector as usize >> 3) % 21)
        .max_data_len(u16::from(selector) * 4);

    if let Ok(mut parser) = FrameParser::<Packet, _>::collecting(config) {
        parser.ingest(rest);
        parser.close();
        assert!(parser.buffered().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aln_core::encoder::PacketBuilder;

    #[test]
    fn test_fuzz_ingest_empty() {
        fuzz_ingest(&[]);
    }

    #[test]
    fn test_fuzz_ingest_leaders() {
        fuzz_ingest(&[0x3C; 1024]);
    }

    #[test]
    fn test_fuzz_ingest_valid_frame() {
        let wire = PacketBuilder::new().seq_num(1).with_crc().encode().unwrap();
        fuzz_ingest(&wire);
    }

    #[test]
    fn test_fuzz_decode_random() {
        fuzz_decode(&[0x12, 0x34, 0x56, 0x78]);
        fuzz_decode(&[0xFF; 64]);
    }

    #[test]
    fn test_fuzz_config() {
        fuzz_config(&[]);
        fuzz_config(&[0x00, 0x3C, 0x3C, 0x00, 0x00]);
        fuzz_config(&[0xFF; 300]);
    }
}
