//! Streaming frame parser for noisy byte links
//!
//! Bytes arrive in arbitrary chunks. Each byte first passes the leader and
//! escape filter, which detects frame starts and drops stuffing bytes; what
//! survives drives a state machine that collects the control word, header,
//! data and trailer of the current frame. Completed frames are verified,
//! deserialized and handed to a [`PacketSink`]. Every failure ends the
//! current frame only: the parser resets and waits for the next leader run.

use crate::checksum;
use crate::config::ParserConfig;
use crate::constants::{ControlFlags, HeaderField, CONTROL_WORD_SIZE, CRC_FIELD_SIZE};
use crate::error::FrameError;
use crate::fec::{ControlWordCodec, DecodeStatus, HammingCodec};
use crate::layout::{field_end, header_length};
use crate::types::{FromFrame, Packet, RawFrame};
use alloc::vec::Vec;
use core::marker::PhantomData;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Stage of the frame currently being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for a leader run
    FindStart,
    /// Collecting the two control-word bytes
    ReadControlWord,
    /// Collecting the optional header fields
    ReadHeader,
    /// Collecting the data segment
    ReadData,
    /// Collecting the checksum trailer
    ReadChecksum,
}

/// Receiver of parser output
///
/// Both hooks run synchronously on the call stack of [`FrameParser::ingest`]
/// and delay the bytes that follow, so they must not block.
pub trait PacketSink<P> {
    /// Called once per verified and deserialized frame, in arrival order
    fn on_packet(&mut self, packet: P);

    /// Called once per dropped frame with the reason it was dropped
    fn on_discard(&mut self, _reason: &FrameError) {}
}

impl<P, F: FnMut(P)> PacketSink<P> for F {
    fn on_packet(&mut self, packet: P) {
        self(packet)
    }
}

/// Sink that keeps every packet and every discard reason
#[derive(Debug, Clone, PartialEq)]
pub struct PacketQueue<P> {
    /// Packets in arrival order
    pub packets: Vec<P>,

    /// Discard reasons in arrival order
    pub discards: Vec<FrameError>,
}

impl<P> PacketQueue<P> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            packets: Vec::new(),
            discards: Vec::new(),
        }
    }

    /// Take every queued packet, leaving the queue empty
    pub fn drain(&mut self) -> Vec<P> {
        core::mem::take(&mut self.packets)
    }
}

impl<P> Default for PacketQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PacketSink<P> for PacketQueue<P> {
    fn on_packet(&mut self, packet: P) {
        self.packets.push(packet);
    }

    fn on_discard(&mut self, reason: &FrameError) {
        self.discards.push(reason.clone());
    }
}

/// Parser statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserStats {
    /// Total bytes fed to the parser
    pub bytes_ingested: u64,

    /// Leader runs detected
    pub frames_started: u64,

    /// Frames handed to the sink
    pub frames_dispatched: u64,

    /// Frames dropped for a checksum mismatch
    pub checksum_failures: u64,

    /// Checksum-valid frames the deserializer rejected
    pub deserialize_failures: u64,

    /// Frames abandoned because a new leader run arrived
    pub resync_discards: u64,

    /// Frames dropped for an oversized header or data segment
    pub oversize_discards: u64,

    /// Frames abandoned when the channel closed
    pub truncated_discards: u64,

    /// Stuffing bytes removed from the stream
    pub escapes_dropped: u64,

    /// Control words repaired by the FEC codec
    pub control_words_corrected: u64,

    /// Control words the FEC codec could not repair
    pub control_words_uncorrectable: u64,
}

impl ParserStats {
    /// Frames that started but were never dispatched
    pub fn frames_dropped(&self) -> u64 {
        self.checksum_failures
            + self.deserialize_failures
            + self.resync_discards
            + self.oversize_discards
            + self.truncated_discards
    }

    /// Dispatched frames as a percentage of started frames
    pub fn delivery_rate(&self) -> f64 {
        if self.frames_started == 0 {
            0.0
        } else {
            (self.frames_dispatched as f64 / self.frames_started as f64) * 100.0
        }
    }
}

/// Streaming frame parser for one link
///
/// One instance per channel; the parser owns all partial-frame state and is
/// not meant to be shared between concurrent feeders.
pub struct FrameParser<P, S, C = HammingCodec> {
    config: ParserConfig,
    codec: C,
    sink: S,
    stats: ParserStats,

    state: ParserState,
    // De-stuffed bytes of the current frame; never holds leader runs or escapes
    buffer: Vec<u8>,
    leader_run: u8,
    flags: ControlFlags,

    header_index: usize,
    header_len: usize,
    data_len_end: Option<usize>,

    data_index: usize,
    data_len: usize,

    crc_index: usize,

    _packet: PhantomData<fn() -> P>,
}

impl<P, S> FrameParser<P, S, HammingCodec>
where
    P: FromFrame,
    S: PacketSink<P>,
{
    /// Create a parser with the default Hamming control-word codec
    pub fn new(config: ParserConfig, sink: S) -> Result<Self, FrameError> {
        Self::with_codec(config, HammingCodec, sink)
    }
}

impl<P> FrameParser<P, PacketQueue<P>, HammingCodec>
where
    P: FromFrame,
{
    /// Create a parser that collects its output in a [`PacketQueue`]
    pub fn collecting(config: ParserConfig) -> Result<Self, FrameError> {
        Self::new(config, PacketQueue::new())
    }
}

impl<P, S, C> FrameParser<P, S, C>
where
    P: FromFrame,
    S: PacketSink<P>,
    C: ControlWordCodec,
{
    /// Create a parser with a specific control-word codec
    pub fn with_codec(config: ParserConfig, codec: C, sink: S) -> Result<Self, FrameError> {
        config.validate()?;
        Ok(Self::build(config, codec, sink))
    }

    fn build(config: ParserConfig, codec: C, sink: S) -> Self {
        Self {
            config,
            codec,
            sink,
            stats: ParserStats::default(),
            state: ParserState::FindStart,
            buffer: Vec::new(),
            leader_run: 0,
            flags: ControlFlags::default(),
            header_index: 0,
            header_len: 0,
            data_len_end: None,
            data_index: 0,
            data_len: 0,
            crc_index: 0,
            _packet: PhantomData,
        }
    }

    /// Feed a chunk of received bytes
    ///
    /// Chunk boundaries never affect the outcome: feeding `a` then `b` is
    /// identical to feeding their concatenation.
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.stats.bytes_ingested += bytes.len() as u64;

        let mut pos = 0;
        while pos < bytes.len() {
            if self.state == ParserState::FindStart && self.leader_run == 0 {
                // Nothing before the next leader byte can change state
                match memchr::memchr(self.config.leader, &bytes[pos..]) {
                    Some(skip) => pos += skip,
                    None => break,
                }
            }

            let byte = bytes[pos];
            pos += 1;

            if let Some(content) = self.filter(byte) {
                self.step(content);
            }
        }
    }

    /// Drop any partial frame without reporting it
    pub fn reset(&mut self) {
        self.clear();
    }

    /// Notify the parser that the channel closed
    ///
    /// A frame still in progress is reported as [`FrameError::Truncated`].
    pub fn close(&mut self) {
        if self.state != ParserState::FindStart {
            let buffered = self.buffer.len();
            self.discard(FrameError::Truncated { buffered });
        } else {
            self.clear();
        }
    }

    /// Current stage of the frame being assembled
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// De-stuffed bytes of the frame being assembled
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Statistics since construction
    pub fn stats(&self) -> &ParserStats {
        &self.stats
    }

    /// Framing parameters
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Borrow the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the parser and return the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Leader and escape detection; returns the byte if it is frame content
    fn filter(&mut self, byte: u8) -> Option<u8> {
        if byte == self.config.escape {
            if self.leader_run >= self.config.leader_len - 1 {
                self.leader_run = 0;
                self.stats.escapes_dropped += 1;
                return None;
            }
            self.leader_run = 0;
        } else if byte == self.config.leader {
            self.leader_run += 1;
            if self.leader_run >= self.config.leader_len {
                self.start_frame();
                return None;
            }
        } else {
            self.leader_run = 0;
        }

        Some(byte)
    }

    fn start_frame(&mut self) {
        if self.state != ParserState::FindStart {
            let discarded = self.buffer.len();

            #[cfg(feature = "logging")]
            debug!(
                "Leader run interrupted {:?}, discarding {} buffered bytes",
                self.state, discarded
            );

            self.discard(FrameError::Resync { discarded });
        } else {
            self.clear();
        }

        #[cfg(feature = "logging")]
        debug!("Frame start detected");

        self.stats.frames_started += 1;
        self.state = ParserState::ReadControlWord;
    }

    fn step(&mut self, byte: u8) {
        match self.state {
            ParserState::FindStart => {}

            ParserState::ReadControlWord => {
                if self.header_index >= self.config.max_header_len {
                    self.discard(FrameError::HeaderTooLarge {
                        len: self.header_index + 1,
                        max: self.config.max_header_len,
                    });
                    return;
                }

                self.buffer.push(byte);
                self.header_index += 1;
                if self.header_index == CONTROL_WORD_SIZE {
                    self.resolve_layout();
                }
            }

            ParserState::ReadHeader => {
                if self.header_index >= self.config.max_header_len {
                    self.discard(FrameError::HeaderTooLarge {
                        len: self.header_len,
                        max: self.config.max_header_len,
                    });
                    return;
                }

                self.buffer.push(byte);
                self.header_index += 1;

                if Some(self.header_index) == self.data_len_end && !self.read_data_len() {
                    return;
                }

                if self.header_index >= self.header_len {
                    self.end_header();
                }
            }

            ParserState::ReadData => {
                self.buffer.push(byte);
                self.data_index += 1;
                if self.data_index >= self.data_len {
                    self.end_data();
                }
            }

            ParserState::ReadChecksum => {
                self.buffer.push(byte);
                self.crc_index += 1;
                if self.crc_index >= CRC_FIELD_SIZE {
                    self.verify_checksum();
                }
            }
        }
    }

    /// Decode the control word and fix the header layout for this frame
    fn resolve_layout(&mut self) {
        let raw = u16::from_be_bytes([self.buffer[0], self.buffer[1]]);
        let decoded = self.codec.decode(raw);

        match decoded.status {
            DecodeStatus::Clean => {}
            DecodeStatus::Corrected => self.stats.control_words_corrected += 1,
            DecodeStatus::Uncorrectable => {
                #[cfg(feature = "logging")]
                debug!("Uncorrectable control word {:#06x}, using best-effort flags", raw);

                self.stats.control_words_uncorrectable += 1;
            }
        }

        self.flags = decoded.flags;
        self.header_len = header_length(self.flags);
        self.data_len_end = field_end(self.flags, HeaderField::DataLength);

        if self.header_len > self.config.max_header_len {
            #[cfg(feature = "logging")]
            debug!(
                "Flags {:#06x} imply a {} byte header, maximum is {}",
                self.flags.bits(),
                self.header_len,
                self.config.max_header_len
            );

            self.discard(FrameError::HeaderTooLarge {
                len: self.header_len,
                max: self.config.max_header_len,
            });
            return;
        }

        if self.header_index >= self.header_len {
            self.end_header();
        } else {
            self.state = ParserState::ReadHeader;
        }
    }

    /// Extract the data length; returns false if the frame was dropped
    fn read_data_len(&mut self) -> bool {
        let end = self.header_index;
        let len = u16::from_be_bytes([self.buffer[end - 2], self.buffer[end - 1]]);

        if len > self.config.max_data_len {
            #[cfg(feature = "logging")]
            debug!(
                "Data length {} exceeds maximum {}",
                len, self.config.max_data_len
            );

            self.discard(FrameError::DataTooLarge {
                len,
                max: self.config.max_data_len,
            });
            return false;
        }

        self.data_len = len as usize;
        true
    }

    fn end_header(&mut self) {
        if self.flags.has_data() && self.data_len > 0 {
            self.data_index = 0;
            self.state = ParserState::ReadData;
        } else {
            self.end_data();
        }
    }

    fn end_data(&mut self) {
        if self.flags.has_crc() {
            self.crc_index = 0;
            self.state = ParserState::ReadChecksum;
        } else {
            self.dispatch();
        }
    }

    fn verify_checksum(&mut self) {
        let split = self.buffer.len() - CRC_FIELD_SIZE;
        let (covered, trailer) = self.buffer.split_at(split);

        match checksum::verify(covered, trailer) {
            Ok(()) => self.dispatch(),
            Err(e) => {
                #[cfg(feature = "logging")]
                warn!("Dropping frame of {} bytes: {:?}", self.buffer.len(), e);

                self.discard(e);
            }
        }
    }

    fn dispatch(&mut self) {
        let frame = RawFrame {
            bytes: &self.buffer,
            flags: self.flags,
            header_len: self.header_len,
            data_len: self.data_len,
        };

        match P::from_frame(&frame) {
            Ok(packet) => {
                #[cfg(feature = "logging")]
                trace!(
                    "Dispatching frame: flags {:#06x}, {} bytes",
                    self.flags.bits(),
                    self.buffer.len()
                );

                self.stats.frames_dispatched += 1;
                self.sink.on_packet(packet);
                self.clear();
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                warn!("Checksum-valid frame failed to deserialize: {:?}", e);

                self.stats.deserialize_failures += 1;
                self.sink.on_discard(&e);
                self.clear();
            }
        }
    }

    /// Report a dropped frame and reset
    fn discard(&mut self, reason: FrameError) {
        match reason {
            FrameError::ChecksumMismatch { .. } => self.stats.checksum_failures += 1,
            FrameError::Resync { .. } => self.stats.resync_discards += 1,
            FrameError::Truncated { .. } => self.stats.truncated_discards += 1,
            FrameError::HeaderTooLarge { .. } | FrameError::DataTooLarge { .. } => {
                self.stats.oversize_discards += 1
            }
            // Deserializer errors are counted in `dispatch`; the rest never
            // come from the parser itself
            FrameError::IncompleteFrame { .. }
            | FrameError::TrailingBytes { .. }
            | FrameError::PayloadTooLarge(..)
            | FrameError::InvalidConfig(_)
            | FrameError::Serialization(_) => {}
        }

        self.sink.on_discard(&reason);
        self.clear();
    }

    /// Reset every piece of per-frame state
    fn clear(&mut self) {
        self.buffer.clear();
        self.state = ParserState::FindStart;
        self.leader_run = 0;
        self.flags = ControlFlags::default();
        self.header_index = 0;
        self.header_len = 0;
        self.data_len_end = None;
        self.data_index = 0;
        self.data_len = 0;
        self.crc_index = 0;
    }
}

/// Parse a complete capture with the default framing
pub fn parse_stream(data: &[u8]) -> (Vec<Packet>, ParserStats) {
    let mut parser = FrameParser::<Packet, _, _>::build(
        ParserConfig::default(),
        HammingCodec,
        PacketQueue::new(),
    );
    parser.ingest(data);
    let stats = parser.stats().clone();
    (parser.into_sink().packets, stats)
}

/// Parse a complete capture with a specific framing
pub fn parse_stream_with(
    data: &[u8],
    config: &ParserConfig,
) -> Result<(Vec<Packet>, ParserStats), FrameError> {
    let mut parser = FrameParser::<Packet, _>::collecting(config.clone())?;
    parser.ingest(data);
    let stats = parser.stats().clone();
    Ok((parser.into_sink().packets, stats))
}
