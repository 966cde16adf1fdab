//! Forward error correction for the control word
//!
//! The control word decides how every later byte of a frame is interpreted,
//! so it travels with its own parity. The default codec is an extended
//! Hamming(16,11) code: the 11 flag bits occupy bits 0..=10, four parity
//! bits occupy bits 11..=14 and bit 15 makes the parity of the whole word
//! even. Any single flipped bit is corrected; two flipped bits are detected
//! but cannot be repaired.

use crate::constants::{ControlFlags, FLAG_MASK};

/// Parity column assigned to each flag bit: the 4-bit values of weight >= 2,
/// ascending. Weight-one values are the parity bits themselves.
const DATA_COLUMNS: [u16; 11] = [3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

const PARITY_SHIFT: u16 = 11;
const PARITY_MASK: u16 = 0x000F;
const OVERALL_PARITY_BIT: u16 = 0x8000;

/// Outcome of decoding a control word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The word arrived intact
    Clean,
    /// A single bit error was repaired
    Corrected,
    /// More errors than the code can repair; flags are best effort
    Uncorrectable,
}

/// Flags recovered from a raw control word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Best available flags
    pub flags: ControlFlags,

    /// How the flags were obtained
    pub status: DecodeStatus,
}

/// Trait for control-word error correction codecs
///
/// Decoding never fails: an uncorrectable word still yields flags so the
/// receiver keeps parsing, and framing bounds catch any nonsense that follows.
pub trait ControlWordCodec {
    /// Protect a flag set for transmission
    fn encode(&self, flags: ControlFlags) -> u16;

    /// Recover flags from a received word
    fn decode(&self, raw: u16) -> Decoded;
}

/// Extended Hamming(16,11) SECDED codec
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingCodec;

impl HammingCodec {
    fn parity_nibble(data: u16) -> u16 {
        DATA_COLUMNS
            .iter()
            .enumerate()
            .filter(|(bit, _)| data & (1 << bit) != 0)
            .fold(0, |acc, (_, column)| acc ^ column)
    }
}

impl ControlWordCodec for HammingCodec {
    fn encode(&self, flags: ControlFlags) -> u16 {
        let data = flags.bits() & FLAG_MASK;
        let word = data | (Self::parity_nibble(data) << PARITY_SHIFT);
        if word.count_ones() % 2 == 1 {
            word | OVERALL_PARITY_BIT
        } else {
            word
        }
    }

    fn decode(&self, raw: u16) -> Decoded {
        let data = raw & FLAG_MASK;
        let received = (raw >> PARITY_SHIFT) & PARITY_MASK;
        let syndrome = received ^ Self::parity_nibble(data);
        let odd = raw.count_ones() % 2 == 1;

        let (data, status) = match (syndrome, odd) {
            (0, false) => (data, DecodeStatus::Clean),
            // Only the overall parity bit flipped
            (0, true) => (data, DecodeStatus::Corrected),
            // A parity bit flipped; the flags are intact
            (s, true) if s.count_ones() == 1 => (data, DecodeStatus::Corrected),
            (s, true) => match DATA_COLUMNS.iter().position(|&column| column == s) {
                Some(bit) => (data ^ (1 << bit), DecodeStatus::Corrected),
                None => (data, DecodeStatus::Uncorrectable),
            },
            (_, false) => (data, DecodeStatus::Uncorrectable),
        };

        Decoded {
            flags: ControlFlags::new(data),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_words_decode_exactly() {
        let codec = HammingCodec;
        for bits in 0..=FLAG_MASK {
            let flags = ControlFlags::new(bits);
            let decoded = codec.decode(codec.encode(flags));
            assert_eq!(decoded.flags, flags);
            assert_eq!(decoded.status, DecodeStatus::Clean);
        }
    }

    #[test]
    fn test_every_single_bit_error_is_corrected() {
        let codec = HammingCodec;
        for bits in 0..=FLAG_MASK {
            let flags = ControlFlags::new(bits);
            let word = codec.encode(flags);
            for bit in 0..16 {
                let decoded = codec.decode(word ^ (1 << bit));
                assert_eq!(decoded.flags, flags, "flags {bits:#x} bit {bit}");
                assert_eq!(decoded.status, DecodeStatus::Corrected);
            }
        }
    }

    #[test]
    fn test_double_bit_errors_are_detected() {
        let codec = HammingCodec;
        let word = codec.encode(ControlFlags::new(ControlFlags::DATA | ControlFlags::CRC));
        for a in 0..16 {
            for b in (a + 1)..16 {
                let decoded = codec.decode(word ^ (1 << a) ^ (1 << b));
                assert_eq!(decoded.status, DecodeStatus::Uncorrectable);
            }
        }
    }

    #[test]
    fn test_known_encodings() {
        let codec = HammingCodec;
        assert_eq!(codec.encode(ControlFlags::new(0)), 0x0000);
        // DATA|CRC: columns 5 ^ 3 = 6, word 0x3003 has even weight
        assert_eq!(
            codec.encode(ControlFlags::new(ControlFlags::DATA | ControlFlags::CRC)),
            0x3003
        );
    }
}
