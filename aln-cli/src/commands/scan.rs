use crate::{load_config, read_input};
use aln_core::{FrameParser, Packet, PacketQueue, ParserStats};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// A recovered packet in JSON-friendly form
#[derive(Debug, Serialize, Deserialize)]
pub struct RecoveredPacket {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_state: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_addr: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_addr: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_addr: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_num: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_block: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<u8>,
    pub data_len: usize,
    pub data_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc: Option<u32>,
}

impl RecoveredPacket {
    fn new(index: usize, packet: &Packet) -> Self {
        Self {
            index,
            net_state: packet.net_state,
            service_id: packet.service_id,
            src_addr: packet.src_addr,
            dest_addr: packet.dest_addr,
            next_addr: packet.next_addr,
            seq_num: packet.seq_num,
            ack_block: packet.ack_block,
            context_id: packet.context_id,
            data_type: packet.data_type,
            data_len: packet.data.len(),
            data_hex: hex::encode(&packet.data),
            crc: packet.crc,
        }
    }
}

/// Scan output document
#[derive(Debug, Serialize, Deserialize)]
pub struct ScanReport {
    pub stats: ParserStats,
    pub packets: Vec<RecoveredPacket>,
}

/// Run the streaming parser over a capture, optionally in fixed-size chunks
pub fn parse_capture(
    data: &[u8],
    chunk_size: Option<usize>,
    config_path: Option<&str>,
) -> Result<(PacketQueue<Packet>, ParserStats)> {
    let config = load_config(config_path)?;
    let mut parser = FrameParser::<Packet, _>::collecting(config)
        .context("Failed to create parser")?;

    match chunk_size {
        Some(size) if size > 0 => {
            for chunk in data.chunks(size) {
                parser.ingest(chunk);
            }
        }
        _ => parser.ingest(data),
    }
    parser.close();

    let stats = parser.stats().clone();
    Ok((parser.into_sink(), stats))
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    stats_only: bool,
    chunk_size: Option<usize>,
    config_path: Option<&str>,
) -> Result<()> {
    info!("Scanning capture: {}", input);

    let data = read_input(input)?;

    info!("Capture size: {} bytes", data.len());

    let (queue, stats) = parse_capture(&data, chunk_size, config_path)?;

    println!("\n=== Scan Results ===");
    println!("Bytes ingested:      {} bytes", stats.bytes_ingested);
    println!("Frames started:      {}", stats.frames_started);
    println!("Packets recovered:   {}", stats.frames_dispatched);
    println!("Frames dropped:      {}", stats.frames_dropped());
    println!("  checksum:          {}", stats.checksum_failures);
    println!("  resync:            {}", stats.resync_discards);
    println!("  oversize:          {}", stats.oversize_discards);
    println!("  deserialize:       {}", stats.deserialize_failures);
    println!("  truncated:         {}", stats.truncated_discards);
    println!("Escapes dropped:     {}", stats.escapes_dropped);
    println!("FEC corrections:     {}", stats.control_words_corrected);
    println!("Delivery rate:       {:.2}%", stats.delivery_rate());
    println!();

    if stats_only {
        return Ok(());
    }

    let packets: Vec<RecoveredPacket> = queue
        .packets
        .iter()
        .enumerate()
        .map(|(i, packet)| RecoveredPacket::new(i, packet))
        .collect();

    if let Some(output_path) = output {
        let report = ScanReport { stats, packets };
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize recovered packets")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Recovered packets written to: {}", output_path);
    } else {
        println!("=== Recovered Packets ===");
        for packet in &packets {
            println!(
                "Packet {}: seq {:?}, {} data bytes",
                packet.index, packet.seq_num, packet.data_len
            );
        }
    }

    Ok(())
}
