//! Protocol-variant configuration shared by the parser and the encoder

use crate::constants::{
    CONTROL_WORD_SIZE, FRAME_ESCAPE, FRAME_LEADER, FRAME_LEADER_LENGTH, MAX_DATA_SIZE,
    MAX_HEADER_SIZE,
};
use crate::error::FrameError;
use alloc::format;
use serde::{Deserialize, Serialize};

/// Immutable framing parameters for one link
///
/// Every field has a default matching the standard wire format, so a JSON
/// document only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Byte that forms the frame leader run
    pub leader: u8,

    /// Consecutive leader bytes required to start a frame
    pub leader_len: u8,

    /// Stuffing byte that breaks a leader run inside frame content
    pub escape: u8,

    /// Largest header (control word included) accepted before resynchronizing
    pub max_header_len: usize,

    /// Largest data segment accepted before resynchronizing
    pub max_data_len: u16,
}

impl ParserConfig {
    /// Set the leader byte
    pub fn leader(mut self, leader: u8) -> Self {
        self.leader = leader;
        self
    }

    /// Set the leader run length
    pub fn leader_len(mut self, leader_len: u8) -> Self {
        self.leader_len = leader_len;
        self
    }

    /// Set the escape byte
    pub fn escape(mut self, escape: u8) -> Self {
        self.escape = escape;
        self
    }

    /// Set the header bound
    pub fn max_header_len(mut self, max_header_len: usize) -> Self {
        self.max_header_len = max_header_len;
        self
    }

    /// Set the data bound
    pub fn max_data_len(mut self, max_data_len: u16) -> Self {
        self.max_data_len = max_data_len;
        self
    }

    /// Check that the parameters describe a usable framing
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.leader == self.escape {
            return Err(FrameError::InvalidConfig(format!(
                "leader and escape must differ (both 0x{:02x})",
                self.leader
            )));
        }

        if self.leader_len < 2 {
            return Err(FrameError::InvalidConfig(format!(
                "leader_len must be at least 2, got {}",
                self.leader_len
            )));
        }

        if self.max_header_len < CONTROL_WORD_SIZE {
            return Err(FrameError::InvalidConfig(format!(
                "max_header_len must be at least {}, got {}",
                CONTROL_WORD_SIZE, self.max_header_len
            )));
        }

        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            leader: FRAME_LEADER,
            leader_len: FRAME_LEADER_LENGTH,
            escape: FRAME_ESCAPE,
            max_header_len: MAX_HEADER_SIZE,
            max_data_len: MAX_DATA_SIZE,
        }
    }
}
