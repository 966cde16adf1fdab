//! Error types for ALN framing operations

use alloc::string::String;

/// Errors that can occur while encoding, decoding or streaming ALN frames
///
/// The streaming parser never returns these; it reports every dropped frame
/// to the sink's discard hook instead.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Checksum mismatch
    #[cfg_attr(
        feature = "std",
        error("Checksum mismatch: expected {expected:08x}, got {actual:08x}")
    )]
    ChecksumMismatch {
        /// The checksum carried by the frame trailer.
        expected: u32,
        /// The checksum computed over the received bytes.
        actual: u32,
    },

    /// Header length implied by the control flags exceeds the configured bound
    #[cfg_attr(feature = "std", error("Header length {len} exceeds maximum {max}"))]
    HeaderTooLarge {
        /// Header length implied by the flags.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Data length read from the header exceeds the configured bound
    #[cfg_attr(feature = "std", error("Data length {len} exceeds maximum {max}"))]
    DataTooLarge {
        /// Data length read from the header.
        len: u16,
        /// Configured maximum.
        max: u16,
    },

    /// A new leader run interrupted a frame in progress
    #[cfg_attr(feature = "std", error("Resynchronized, discarded {discarded} buffered bytes"))]
    Resync {
        /// Bytes of the abandoned frame.
        discarded: usize,
    },

    /// The channel closed while a frame was in progress
    #[cfg_attr(
        feature = "std",
        error("Channel closed with {buffered} bytes of an unfinished frame")
    )]
    Truncated {
        /// Bytes of the abandoned frame.
        buffered: usize,
    },

    /// Incomplete frame - not enough data
    #[cfg_attr(feature = "std", error("Incomplete frame: expected {expected} bytes, got {actual}"))]
    IncompleteFrame {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// More bytes than the flags and data length account for
    #[cfg_attr(feature = "std", error("Trailing bytes: expected {expected} bytes, got {actual}"))]
    TrailingBytes {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Payload does not fit the 16-bit data-length field
    #[cfg_attr(feature = "std", error("Payload size {0} exceeds maximum {1}"))]
    PayloadTooLarge(usize, usize),

    /// Parser configuration is unusable
    #[cfg_attr(feature = "std", error("Invalid configuration: {0}"))]
    InvalidConfig(String),

    /// Deserialization error
    #[cfg_attr(feature = "std", error("Serialization error: {0}"))]
    Serialization(String),
}

impl FrameError {
    /// Whether the error reports a frame lost to synchronization rather than content
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            FrameError::Resync { .. }
                | FrameError::Truncated { .. }
                | FrameError::HeaderTooLarge { .. }
                | FrameError::DataTooLarge { .. }
        )
    }
}
