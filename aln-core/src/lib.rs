//! # ALN Core
//!
//! Receive-side framing for the ALN byte-stream link protocol, built for
//! serial and radio channels that split, merge or corrupt frames.
//!
//! ## Modules
//!
//! - `constants`: Wire constants, control flags and header fields
//! - `config`: Per-link framing parameters
//! - `fec`: Control-word forward error correction
//! - `layout`: Header length and field offsets from flags
//! - `checksum`: CRC-32C trailer verification
//! - `types`: Core types (Packet, RawFrame, FromFrame)
//! - `decoder`: Strict one-shot frame decoding
//! - `encoder`: Packet encoding and byte stuffing
//! - `parser`: Streaming byte-at-a-time frame parser

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod checksum;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fec;
pub mod layout;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use config::ParserConfig;
pub use constants::ControlFlags;
pub use error::FrameError;
pub use parser::{FrameParser, PacketQueue, PacketSink, ParserState, ParserStats};
pub use types::{FromFrame, Packet, RawFrame};

/// Result type alias for ALN operations
pub type Result<T> = core::result::Result<T, FrameError>;
