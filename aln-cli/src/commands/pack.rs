use crate::load_config;
use aln_core::{encoder::encode_packet_with, fec::HammingCodec, Packet};
use anyhow::{bail, Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// One packet as described in a pack input document
///
/// Header fields left out of the JSON are left out of the frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketSpec {
    pub net_state: Option<u8>,
    pub service_id: Option<u16>,
    pub src_addr: Option<u16>,
    pub dest_addr: Option<u16>,
    pub next_addr: Option<u16>,
    pub seq_num: Option<u16>,
    pub ack_block: Option<u32>,
    pub context_id: Option<u16>,
    pub data_type: Option<u8>,

    /// Data as UTF-8 text
    pub data: Option<String>,

    /// Data as hex, for binary payloads
    pub data_hex: Option<String>,

    /// Append a CRC-32C trailer
    pub crc: bool,
}

impl Default for PacketSpec {
    fn default() -> Self {
        Self {
            net_state: None,
            service_id: None,
            src_addr: None,
            dest_addr: None,
            next_addr: None,
            seq_num: None,
            ack_block: None,
            context_id: None,
            data_type: None,
            data: None,
            data_hex: None,
            crc: true,
        }
    }
}

impl PacketSpec {
    /// Build the packet this spec describes
    pub fn to_packet(&self) -> Result<Packet> {
        let data = match (&self.data, &self.data_hex) {
            (Some(_), Some(_)) => bail!("Specify either data or data_hex, not both"),
            (Some(text), None) => Bytes::from(text.clone().into_bytes()),
            (None, Some(hex_str)) => {
                Bytes::from(hex::decode(hex_str).context("Failed to decode data_hex")?)
            }
            (None, None) => Bytes::new(),
        };

        Ok(Packet {
            net_state: self.net_state,
            service_id: self.service_id,
            src_addr: self.src_addr,
            dest_addr: self.dest_addr,
            next_addr: self.next_addr,
            seq_num: self.seq_num,
            ack_block: self.ack_block,
            context_id: self.context_id,
            data_type: self.data_type,
            data,
            crc: self.crc.then_some(0),
        })
    }
}

pub fn execute(input: &str, output: &str, config_path: Option<&str>) -> Result<()> {
    info!("Packing packets from {} to {}", input, output);

    let config = load_config(config_path)?;

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let specs: Vec<PacketSpec> =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON input")?;

    info!("Found {} packets to pack", specs.len());

    let mut output_data = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        let packet = spec
            .to_packet()
            .with_context(|| format!("Invalid packet spec {}", i))?;

        let encoded = encode_packet_with(&packet, &config, &HammingCodec)
            .with_context(|| format!("Failed to encode packet {}", i))?;

        output_data.extend_from_slice(&encoded);

        info!("Packed packet {} ({} bytes)", i, encoded.len());
    }

    fs::write(output, &output_data)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Successfully packed {} packets ({} bytes total)",
        specs.len(),
        output_data.len()
    );

    Ok(())
}
