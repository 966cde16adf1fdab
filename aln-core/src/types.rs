//! Core types for ALN packets

use crate::constants::{ControlFlags, NetState, CONTROL_WORD_SIZE, CRC_FIELD_SIZE};
use crate::error::FrameError;
use alloc::vec::Vec;
use bytes::Bytes;

/// A structured ALN packet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packet {
    /// Network state selector
    pub net_state: Option<u8>,

    /// Destination service identifier
    pub service_id: Option<u16>,

    /// Source address
    pub src_addr: Option<u16>,

    /// Final destination address
    pub dest_addr: Option<u16>,

    /// Next-hop address
    pub next_addr: Option<u16>,

    /// Sequence number
    pub seq_num: Option<u16>,

    /// Acknowledge block
    pub ack_block: Option<u32>,

    /// Context identifier
    pub context_id: Option<u16>,

    /// Application data type
    pub data_type: Option<u8>,

    /// Application data
    pub data: Bytes,

    /// CRC-32C trailer as received; `Some` on encode requests a trailer
    pub crc: Option<u32>,
}

impl Packet {
    /// Flags announcing the fields this packet carries
    pub fn control_flags(&self) -> ControlFlags {
        let mut bits = ControlFlags::NONE;
        let mut set = |present: bool, flag: u16| {
            if present {
                bits |= flag;
            }
        };

        set(self.net_state.is_some(), ControlFlags::NETSTATE);
        set(self.service_id.is_some(), ControlFlags::SERVICEID);
        set(self.src_addr.is_some(), ControlFlags::SRCADDR);
        set(self.dest_addr.is_some(), ControlFlags::DESTADDR);
        set(self.next_addr.is_some(), ControlFlags::NEXTADDR);
        set(self.seq_num.is_some(), ControlFlags::SEQNUM);
        set(self.ack_block.is_some(), ControlFlags::ACKBLOCK);
        set(self.context_id.is_some(), ControlFlags::CONTEXTID);
        set(self.data_type.is_some(), ControlFlags::DATATYPE);
        set(!self.data.is_empty(), ControlFlags::DATA);
        set(self.crc.is_some(), ControlFlags::CRC);

        ControlFlags::new(bits)
    }

    /// Typed network state, if the field is present and known
    pub fn net_state(&self) -> Option<NetState> {
        self.net_state.and_then(NetState::from_u8)
    }
}

/// A complete, de-stuffed frame as handed to a deserializer
///
/// `bytes` holds the control word, header, data and (if flagged) the trailer,
/// exactly as they were checksummed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// Frame bytes without leader or escape bytes
    pub bytes: &'a [u8],

    /// Flags decoded from the control word
    pub flags: ControlFlags,

    /// Header length, control word included
    pub header_len: usize,

    /// Data segment length
    pub data_len: usize,
}

impl<'a> RawFrame<'a> {
    /// Frame length the flags and data length account for
    pub fn expected_len(&self) -> usize {
        let trailer = if self.flags.has_crc() { CRC_FIELD_SIZE } else { 0 };
        self.header_len + self.data_len + trailer
    }

    /// Check that the buffer is exactly as long as the layout requires
    pub fn check_len(&self) -> Result<(), FrameError> {
        let expected = self.expected_len();
        let actual = self.bytes.len();
        if actual < expected {
            return Err(FrameError::IncompleteFrame { expected, actual });
        }
        if actual > expected {
            return Err(FrameError::TrailingBytes { expected, actual });
        }
        Ok(())
    }

    /// Raw control word bytes
    pub fn control_word(&self) -> &'a [u8] {
        &self.bytes[..CONTROL_WORD_SIZE.min(self.bytes.len())]
    }

    /// Header bytes, control word included
    pub fn header(&self) -> &'a [u8] {
        &self.bytes[..self.header_len.min(self.bytes.len())]
    }

    /// Data segment
    pub fn data(&self) -> &'a [u8] {
        let start = self.header_len.min(self.bytes.len());
        let end = (self.header_len + self.data_len).min(self.bytes.len());
        &self.bytes[start..end]
    }

    /// Checksum trailer, if flagged
    pub fn trailer(&self) -> Option<&'a [u8]> {
        if !self.flags.has_crc() {
            return None;
        }
        let start = (self.header_len + self.data_len).min(self.bytes.len());
        Some(&self.bytes[start..])
    }
}

/// Trait for types that can be built from a received frame
pub trait FromFrame: Sized {
    /// Deserialize from a complete, verified frame
    fn from_frame(frame: &RawFrame<'_>) -> Result<Self, FrameError>;
}

impl FromFrame for Vec<u8> {
    fn from_frame(frame: &RawFrame<'_>) -> Result<Self, FrameError> {
        Ok(frame.bytes.to_vec())
    }
}

impl FromFrame for Bytes {
    fn from_frame(frame: &RawFrame<'_>) -> Result<Self, FrameError> {
        Ok(Bytes::copy_from_slice(frame.bytes))
    }
}
