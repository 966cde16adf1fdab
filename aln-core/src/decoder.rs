//! Packet deserialization (strict mode)

use crate::checksum;
use crate::constants::{ControlFlags, HeaderField, CONTROL_WORD_SIZE};
use crate::error::FrameError;
use crate::fec::{ControlWordCodec, HammingCodec};
use crate::layout::{field_offset, header_length};
use crate::types::{FromFrame, Packet, RawFrame};
use bytes::Bytes;

fn read_u8(header: &[u8], flags: ControlFlags, field: HeaderField) -> Option<u8> {
    field_offset(flags, field).map(|offset| header[offset])
}

fn read_u16(header: &[u8], flags: ControlFlags, field: HeaderField) -> Option<u16> {
    field_offset(flags, field)
        .map(|offset| u16::from_be_bytes([header[offset], header[offset + 1]]))
}

fn read_u32(header: &[u8], flags: ControlFlags, field: HeaderField) -> Option<u32> {
    field_offset(flags, field).map(|offset| {
        u32::from_be_bytes([
            header[offset],
            header[offset + 1],
            header[offset + 2],
            header[offset + 3],
        ])
    })
}

impl FromFrame for Packet {
    /// Parse header fields, data and trailer out of a frame
    ///
    /// The frame length must match the layout exactly; the checksum is
    /// assumed to have been verified by the caller.
    fn from_frame(frame: &RawFrame<'_>) -> Result<Self, FrameError> {
        frame.check_len()?;

        let flags = frame.flags;
        let header = frame.header();
        if header.len() != header_length(flags) {
            return Err(FrameError::IncompleteFrame {
                expected: header_length(flags),
                actual: header.len(),
            });
        }

        let crc = match frame.trailer() {
            Some(trailer) => Some(checksum::read_trailer(trailer)?),
            None => None,
        };

        Ok(Packet {
            net_state: read_u8(header, flags, HeaderField::NetState),
            service_id: read_u16(header, flags, HeaderField::ServiceId),
            src_addr: read_u16(header, flags, HeaderField::SrcAddr),
            dest_addr: read_u16(header, flags, HeaderField::DestAddr),
            next_addr: read_u16(header, flags, HeaderField::NextAddr),
            seq_num: read_u16(header, flags, HeaderField::SeqNum),
            ack_block: read_u32(header, flags, HeaderField::AckBlock),
            context_id: read_u16(header, flags, HeaderField::ContextId),
            data_type: read_u8(header, flags, HeaderField::DataType),
            data: Bytes::copy_from_slice(frame.data()),
            crc,
        })
    }
}

/// Resolve the layout of a complete frame body with a specific codec
///
/// `body` is one de-stuffed frame without its leader run.
pub fn frame_view<'a, C: ControlWordCodec>(
    body: &'a [u8],
    codec: &C,
) -> Result<RawFrame<'a>, FrameError> {
    if body.len() < CONTROL_WORD_SIZE {
        return Err(FrameError::IncompleteFrame {
            expected: CONTROL_WORD_SIZE,
            actual: body.len(),
        });
    }

    let flags = codec.decode(u16::from_be_bytes([body[0], body[1]])).flags;
    let header_len = header_length(flags);
    if body.len() < header_len {
        return Err(FrameError::IncompleteFrame {
            expected: header_len,
            actual: body.len(),
        });
    }

    let data_len = match read_u16(body, flags, HeaderField::DataLength) {
        Some(len) => len as usize,
        None => 0,
    };

    let frame = RawFrame {
        bytes: body,
        flags,
        header_len,
        data_len,
    };
    frame.check_len()?;

    Ok(frame)
}

/// Decode one de-stuffed frame body into a packet
///
/// This function performs strict validation:
/// - Corrects the control word
/// - Validates the exact frame length
/// - Validates the checksum if present
pub fn decode_packet(body: &[u8]) -> Result<Packet, FrameError> {
    decode_packet_with(body, &HammingCodec)
}

/// Decode one de-stuffed frame body using a specific control-word codec
pub fn decode_packet_with<C: ControlWordCodec>(
    body: &[u8],
    codec: &C,
) -> Result<Packet, FrameError> {
    let frame = frame_view(body, codec)?;

    if frame.flags.has_crc() {
        checksum::verify_frame(frame.bytes)?;
    }

    Packet::from_frame(&frame)
}
