//! CRC-32C trailer computation and verification
//!
//! The trailer uses the Castagnoli polynomial (CRC-32C, as in iSCSI and
//! ext4), not the IEEE polynomial of zlib and Ethernet. A peer computing
//! `crc32.ChecksumIEEE` or `zlib.crc32` will not interoperate; every
//! trailer from such a peer fails verification.

use crate::constants::CRC_FIELD_SIZE;
use crate::error::FrameError;

/// Compute the CRC-32C checksum of data
pub fn compute_crc(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Read a big-endian trailer value
///
/// `trailer` must be exactly [`CRC_FIELD_SIZE`] bytes long.
pub fn read_trailer(trailer: &[u8]) -> Result<u32, FrameError> {
    let bytes: [u8; CRC_FIELD_SIZE] = trailer
        .try_into()
        .map_err(|_| FrameError::IncompleteFrame {
            expected: CRC_FIELD_SIZE,
            actual: trailer.len(),
        })?;
    Ok(u32::from_be_bytes(bytes))
}

/// Verify that `covered` hashes to the value carried by `trailer`
pub fn verify(covered: &[u8], trailer: &[u8]) -> Result<(), FrameError> {
    let expected = read_trailer(trailer)?;
    let actual = compute_crc(covered);

    if actual != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(())
}

/// Verify a whole frame whose last [`CRC_FIELD_SIZE`] bytes are the trailer
pub fn verify_frame(frame: &[u8]) -> Result<(), FrameError> {
    if frame.len() < CRC_FIELD_SIZE {
        return Err(FrameError::IncompleteFrame {
            expected: CRC_FIELD_SIZE,
            actual: frame.len(),
        });
    }

    let (covered, trailer) = frame.split_at(frame.len() - CRC_FIELD_SIZE);
    verify(covered, trailer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        // Standard CRC-32C check value
        assert_eq!(compute_crc(b"123456789"), 0xE306_9283);
    }

    #[test]
    fn test_verify_frame_accepts_own_trailer() {
        let mut frame = b"ALN frame body".to_vec();
        let crc = compute_crc(&frame);
        frame.extend_from_slice(&crc.to_be_bytes());

        assert!(verify_frame(&frame).is_ok());
    }

    #[test]
    fn test_verify_frame_rejects_flipped_byte() {
        let mut frame = b"ALN frame body".to_vec();
        let crc = compute_crc(&frame);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame[3] ^= 0x10;

        assert!(matches!(
            verify_frame(&frame),
            Err(FrameError::ChecksumMismatch { expected, .. }) if expected == crc
        ));
    }

    #[test]
    fn test_short_frame_is_incomplete() {
        assert!(matches!(
            verify_frame(&[1, 2]),
            Err(FrameError::IncompleteFrame { expected: 4, actual: 2 })
        ));
    }
}
