//! Packet encoding

use crate::checksum::compute_crc;
use crate::config::ParserConfig;
use crate::constants::{CRC_FIELD_SIZE, MAX_DATA_SIZE};
use crate::error::FrameError;
use crate::fec::{ControlWordCodec, HammingCodec};
use crate::layout::header_length;
use crate::types::Packet;
use bytes::{BufMut, Bytes, BytesMut};

/// Encode the frame body of a packet: no leader, no stuffing
///
/// The body is laid out as:
/// 1. Control word (2 bytes, big-endian, Hamming protected)
/// 2. Header fields present in the flags, in wire order (big-endian)
/// 3. Data segment (variable length)
/// 4. CRC-32C over everything above (optional, 4 bytes, big-endian)
pub fn encode_frame_body<C: ControlWordCodec>(
    packet: &Packet,
    codec: &C,
) -> Result<Bytes, FrameError> {
    if packet.data.len() > MAX_DATA_SIZE as usize {
        return Err(FrameError::PayloadTooLarge(
            packet.data.len(),
            MAX_DATA_SIZE as usize,
        ));
    }

    let flags = packet.control_flags();
    let mut buf = BytesMut::with_capacity(
        header_length(flags) + packet.data.len() + CRC_FIELD_SIZE,
    );

    buf.put_u16(codec.encode(flags));

    if let Some(net_state) = packet.net_state {
        buf.put_u8(net_state);
    }
    if let Some(service_id) = packet.service_id {
        buf.put_u16(service_id);
    }
    if let Some(src_addr) = packet.src_addr {
        buf.put_u16(src_addr);
    }
    if let Some(dest_addr) = packet.dest_addr {
        buf.put_u16(dest_addr);
    }
    if let Some(next_addr) = packet.next_addr {
        buf.put_u16(next_addr);
    }
    if let Some(seq_num) = packet.seq_num {
        buf.put_u16(seq_num);
    }
    if let Some(ack_block) = packet.ack_block {
        buf.put_u32(ack_block);
    }
    if let Some(context_id) = packet.context_id {
        buf.put_u16(context_id);
    }
    if let Some(data_type) = packet.data_type {
        buf.put_u8(data_type);
    }
    if flags.has_data() {
        buf.put_u16(packet.data.len() as u16);
        buf.put_slice(&packet.data);
    }

    if flags.has_crc() {
        let checksum = compute_crc(&buf);
        buf.put_u32(checksum);
    }

    Ok(buf.freeze())
}

/// Insert escape bytes so no leader run can appear inside `body`
///
/// After every `leader_len - 1` consecutive leader bytes an escape byte is
/// written; the receiver drops it and restarts its run count. A body that
/// ends in a partial leader run gets one more escape, so a receiver that
/// dropped the frame early cannot carry that run into the next leader run.
pub fn stuff(body: &[u8], config: &ParserConfig) -> Bytes {
    let threshold = config.leader_len.saturating_sub(1);
    let mut buf = BytesMut::with_capacity(body.len() + body.len() / 2 + 1);
    let mut run = 0u8;

    for &byte in body {
        buf.put_u8(byte);
        if byte == config.leader {
            run += 1;
            if run >= threshold {
                buf.put_u8(config.escape);
                run = 0;
            }
        } else {
            run = 0;
        }
    }

    if run > 0 {
        buf.put_u8(config.escape);
    }

    buf.freeze()
}

/// Encode a packet into wire bytes with the default framing
pub fn encode_packet(packet: &Packet) -> Result<Bytes, FrameError> {
    encode_packet_with(packet, &ParserConfig::default(), &HammingCodec)
}

/// Encode a packet into wire bytes: leader run followed by the stuffed body
pub fn encode_packet_with<C: ControlWordCodec>(
    packet: &Packet,
    config: &ParserConfig,
    codec: &C,
) -> Result<Bytes, FrameError> {
    config.validate()?;

    let body = encode_frame_body(packet, codec)?;
    let stuffed = stuff(&body, config);

    let mut buf = BytesMut::with_capacity(config.leader_len as usize + stuffed.len());
    buf.put_bytes(config.leader, config.leader_len as usize);
    buf.put_slice(&stuffed);

    Ok(buf.freeze())
}

/// Builder for constructing packets with various options
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    packet: Packet,
}

impl PacketBuilder {
    /// Create a new packet builder with no optional fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network state selector
    pub fn net_state(mut self, net_state: u8) -> Self {
        self.packet.net_state = Some(net_state);
        self
    }

    /// Set the service identifier
    pub fn service_id(mut self, service_id: u16) -> Self {
        self.packet.service_id = Some(service_id);
        self
    }

    /// Set the source address
    pub fn src_addr(mut self, addr: u16) -> Self {
        self.packet.src_addr = Some(addr);
        self
    }

    /// Set the destination address
    pub fn dest_addr(mut self, addr: u16) -> Self {
        self.packet.dest_addr = Some(addr);
        self
    }

    /// Set the next-hop address
    pub fn next_addr(mut self, addr: u16) -> Self {
        self.packet.next_addr = Some(addr);
        self
    }

    /// Set the sequence number
    pub fn seq_num(mut self, seq_num: u16) -> Self {
        self.packet.seq_num = Some(seq_num);
        self
    }

    /// Set the acknowledge block
    pub fn ack_block(mut self, ack_block: u32) -> Self {
        self.packet.ack_block = Some(ack_block);
        self
    }

    /// Set the context identifier
    pub fn context_id(mut self, context_id: u16) -> Self {
        self.packet.context_id = Some(context_id);
        self
    }

    /// Set the data type
    pub fn data_type(mut self, data_type: u8) -> Self {
        self.packet.data_type = Some(data_type);
        self
    }

    /// Set the data segment
    pub fn data(mut self, data: Bytes) -> Self {
        self.packet.data = data;
        self
    }

    /// Enable the CRC-32C trailer
    pub fn with_crc(mut self) -> Self {
        self.packet.crc = Some(0);
        self
    }

    /// Build the packet, checking that it fits the wire format
    pub fn build(self) -> Result<Packet, FrameError> {
        if self.packet.data.len() > MAX_DATA_SIZE as usize {
            return Err(FrameError::PayloadTooLarge(
                self.packet.data.len(),
                MAX_DATA_SIZE as usize,
            ));
        }
        Ok(self.packet)
    }

    /// Build and encode the packet with the default framing
    pub fn encode(self) -> Result<Bytes, FrameError> {
        encode_packet(&self.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FRAME_ESCAPE, FRAME_LEADER};

    #[test]
    fn test_encode_minimal_packet() {
        let encoded = PacketBuilder::new().encode().unwrap();

        assert_eq!(
            &encoded[..],
            &[FRAME_LEADER, FRAME_LEADER, FRAME_LEADER, FRAME_LEADER, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_data_with_crc() {
        let packet = PacketBuilder::new()
            .data(Bytes::from_static(&[0xAA, 0xBB]))
            .with_crc()
            .build()
            .unwrap();

        let body = encode_frame_body(&packet, &HammingCodec).unwrap();

        // Control word for DATA|CRC, length 2, data, CRC-32C
        assert_eq!(&body[..6], &[0x30, 0x03, 0x00, 0x02, 0xAA, 0xBB]);
        assert_eq!(body.len(), 10);
        let crc = u32::from_be_bytes([body[6], body[7], body[8], body[9]]);
        assert_eq!(crc, compute_crc(&body[..6]));
    }

    #[test]
    fn test_stuff_breaks_leader_runs() {
        let config = ParserConfig::default();
        let body = [FRAME_LEADER; 7];

        let stuffed = stuff(&body, &config);

        assert_eq!(
            &stuffed[..],
            &[
                FRAME_LEADER,
                FRAME_LEADER,
                FRAME_LEADER,
                FRAME_ESCAPE,
                FRAME_LEADER,
                FRAME_LEADER,
                FRAME_LEADER,
                FRAME_ESCAPE,
                FRAME_LEADER,
                FRAME_ESCAPE,
            ]
        );
    }

    #[test]
    fn test_stuff_closes_trailing_leader_run() {
        let config = ParserConfig::default();

        let stuffed = stuff(&[0x01, FRAME_LEADER, FRAME_LEADER], &config);
        assert_eq!(
            &stuffed[..],
            &[0x01, FRAME_LEADER, FRAME_LEADER, FRAME_ESCAPE]
        );

        // A run already closed by a stuffing escape needs nothing more
        let stuffed = stuff(&[FRAME_LEADER; 3], &config);
        assert_eq!(
            &stuffed[..],
            &[FRAME_LEADER, FRAME_LEADER, FRAME_LEADER, FRAME_ESCAPE]
        );
    }

    #[test]
    fn test_stuff_leaves_short_runs_alone() {
        let config = ParserConfig::default();
        let body = [FRAME_LEADER, FRAME_LEADER, 0x00, FRAME_LEADER, FRAME_ESCAPE];

        assert_eq!(&stuff(&body, &config)[..], &body[..]);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let result = PacketBuilder::new()
            .data(Bytes::from(alloc::vec![0u8; MAX_DATA_SIZE as usize + 1]))
            .build();

        assert!(matches!(result, Err(FrameError::PayloadTooLarge(_, _))));
    }
}
