//! Wire constants and flag definitions for the ALN frame format

use serde::{Deserialize, Serialize};

/// Default frame leader byte (`'<'`)
pub const FRAME_LEADER: u8 = 0x3C;

/// Default number of consecutive leader bytes that mark a frame start
pub const FRAME_LEADER_LENGTH: u8 = 4;

/// Default escape (stuffing) byte
pub const FRAME_ESCAPE: u8 = 0xC3;

/// Size of the Hamming-protected control word in bytes
pub const CONTROL_WORD_SIZE: usize = 2;

/// Size of the CRC-32C trailer in bytes
pub const CRC_FIELD_SIZE: usize = 4;

/// Size of the data-length header field in bytes
pub const DATA_LENGTH_FIELD_SIZE: usize = 2;

/// Largest possible header: control word plus every optional field
/// 2 + 1 + 2 + 2 + 2 + 2 + 2 + 4 + 2 + 1 + 2 = 22 bytes
pub const MAX_HEADER_SIZE: usize = 22;

/// Largest data segment the 16-bit length field can describe
pub const MAX_DATA_SIZE: u16 = u16::MAX;

/// Mask of the 11 flag bits carried by the control word
pub const FLAG_MASK: u16 = 0x07FF;

/// Optional header fields, in the order they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    /// Network state selector (route/service/query)
    NetState,
    /// Destination service identifier
    ServiceId,
    /// Source address
    SrcAddr,
    /// Final destination address
    DestAddr,
    /// Next-hop address
    NextAddr,
    /// Sequence number
    SeqNum,
    /// Acknowledge block
    AckBlock,
    /// Context identifier
    ContextId,
    /// Application data type
    DataType,
    /// Length of the data segment
    DataLength,
}

impl HeaderField {
    /// Every field in wire order
    pub const ALL: [HeaderField; 10] = [
        HeaderField::NetState,
        HeaderField::ServiceId,
        HeaderField::SrcAddr,
        HeaderField::DestAddr,
        HeaderField::NextAddr,
        HeaderField::SeqNum,
        HeaderField::AckBlock,
        HeaderField::ContextId,
        HeaderField::DataType,
        HeaderField::DataLength,
    ];

    /// Width of the field in bytes
    pub const fn size(&self) -> usize {
        match self {
            HeaderField::NetState => 1,
            HeaderField::ServiceId => 2,
            HeaderField::SrcAddr => 2,
            HeaderField::DestAddr => 2,
            HeaderField::NextAddr => 2,
            HeaderField::SeqNum => 2,
            HeaderField::AckBlock => 4,
            HeaderField::ContextId => 2,
            HeaderField::DataType => 1,
            HeaderField::DataLength => DATA_LENGTH_FIELD_SIZE,
        }
    }

    /// Control flag bit that announces this field
    pub const fn flag(&self) -> u16 {
        match self {
            HeaderField::NetState => ControlFlags::NETSTATE,
            HeaderField::ServiceId => ControlFlags::SERVICEID,
            HeaderField::SrcAddr => ControlFlags::SRCADDR,
            HeaderField::DestAddr => ControlFlags::DESTADDR,
            HeaderField::NextAddr => ControlFlags::NEXTADDR,
            HeaderField::SeqNum => ControlFlags::SEQNUM,
            HeaderField::AckBlock => ControlFlags::ACKBLOCK,
            HeaderField::ContextId => ControlFlags::CONTEXTID,
            HeaderField::DataType => ControlFlags::DATATYPE,
            HeaderField::DataLength => ControlFlags::DATA,
        }
    }

    /// Flag name as used in dumps
    pub const fn name(&self) -> &'static str {
        match self {
            HeaderField::NetState => "NETSTATE",
            HeaderField::ServiceId => "SERVICEID",
            HeaderField::SrcAddr => "SRCADDR",
            HeaderField::DestAddr => "DESTADDR",
            HeaderField::NextAddr => "NEXTADDR",
            HeaderField::SeqNum => "SEQNUM",
            HeaderField::AckBlock => "ACKBLOCK",
            HeaderField::ContextId => "CONTEXTID",
            HeaderField::DataType => "DATATYPE",
            HeaderField::DataLength => "DATA",
        }
    }
}

/// Flags decoded from the control word (11 significant bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlFlags(u16);

impl ControlFlags {
    /// No optional fields
    pub const NONE: u16 = 0x0000;

    /// Frame carries a CRC-32C trailer
    pub const CRC: u16 = 0x0001;

    /// Frame carries a data-length field and a data segment
    pub const DATA: u16 = 0x0002;

    /// Header carries a data type
    pub const DATATYPE: u16 = 0x0004;

    /// Header carries a context identifier
    pub const CONTEXTID: u16 = 0x0008;

    /// Header carries an acknowledge block
    pub const ACKBLOCK: u16 = 0x0010;

    /// Header carries a sequence number
    pub const SEQNUM: u16 = 0x0020;

    /// Header carries a next-hop address
    pub const NEXTADDR: u16 = 0x0040;

    /// Header carries a destination address
    pub const DESTADDR: u16 = 0x0080;

    /// Header carries a source address
    pub const SRCADDR: u16 = 0x0100;

    /// Header carries a service identifier
    pub const SERVICEID: u16 = 0x0200;

    /// Header carries a network state selector
    pub const NETSTATE: u16 = 0x0400;

    /// Create flags from raw bits; parity bits are masked off
    pub const fn new(bits: u16) -> Self {
        Self(bits & FLAG_MASK)
    }

    /// Get the raw flag bits
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Check whether every bit of `flag` is set
    pub const fn contains(&self, flag: u16) -> bool {
        (self.0 & flag) == flag
    }

    /// Check if a data segment follows the header
    pub const fn has_data(&self) -> bool {
        (self.0 & Self::DATA) != 0
    }

    /// Check if a CRC-32C trailer ends the frame
    pub const fn has_crc(&self) -> bool {
        (self.0 & Self::CRC) != 0
    }

    /// Check if a header field is present
    pub const fn has_field(&self, field: HeaderField) -> bool {
        (self.0 & field.flag()) != 0
    }

    /// Return a copy with `flag` set
    pub const fn with(self, flag: u16) -> Self {
        Self::new(self.0 | flag)
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self(Self::NONE)
    }
}

/// Network state values carried in the NETSTATE header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetState {
    /// Packet contains a route entry
    Route,
    /// Packet contains a service entry
    Service,
    /// Packet is a request for routes and services
    Query,
}

impl NetState {
    /// Wire value of the state
    pub const fn as_u8(&self) -> u8 {
        match self {
            NetState::Route => 0x01,
            NetState::Service => 0x02,
            NetState::Query => 0x03,
        }
    }

    /// Interpret a wire value; unknown values yield `None`
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(NetState::Route),
            0x02 => Some(NetState::Service),
            0x03 => Some(NetState::Query),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sizes_sum_to_max_header() {
        let sum: usize = HeaderField::ALL.iter().map(|f| f.size()).sum();
        assert_eq!(CONTROL_WORD_SIZE + sum, MAX_HEADER_SIZE);
    }

    #[test]
    fn test_field_flags_are_distinct() {
        let mut seen = 0u16;
        for field in HeaderField::ALL {
            assert_eq!(seen & field.flag(), 0);
            seen |= field.flag();
        }
        assert_eq!(seen | ControlFlags::CRC, FLAG_MASK);
    }

    #[test]
    fn test_flags_mask_parity_bits() {
        let flags = ControlFlags::new(0xFFFF);
        assert_eq!(flags.bits(), FLAG_MASK);
        assert!(flags.has_data());
        assert!(flags.has_crc());
    }

    #[test]
    fn test_net_state_values() {
        for state in [NetState::Route, NetState::Service, NetState::Query] {
            assert_eq!(NetState::from_u8(state.as_u8()), Some(state));
        }
        assert_eq!(NetState::from_u8(0x00), None);
    }
}
