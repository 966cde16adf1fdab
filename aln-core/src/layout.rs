//! Header layout resolution from control flags
//!
//! Pure functions: the header length and the offset of each optional field
//! follow directly from which flags are set.

use crate::constants::{ControlFlags, HeaderField, CONTROL_WORD_SIZE};

/// Total header length in bytes, control word included
pub fn header_length(flags: ControlFlags) -> usize {
    CONTROL_WORD_SIZE
        + HeaderField::ALL
            .iter()
            .filter(|field| flags.has_field(**field))
            .map(|field| field.size())
            .sum::<usize>()
}

/// Byte offset of `field` from the start of the frame
///
/// Returns `None` when the flags do not announce the field.
pub fn field_offset(flags: ControlFlags, field: HeaderField) -> Option<usize> {
    if !flags.has_field(field) {
        return None;
    }

    let preceding: usize = HeaderField::ALL
        .iter()
        .take_while(|f| **f != field)
        .filter(|f| flags.has_field(**f))
        .map(|f| f.size())
        .sum();

    Some(CONTROL_WORD_SIZE + preceding)
}

/// Offset one past the last byte of `field`, if present
pub fn field_end(flags: ControlFlags, field: HeaderField) -> Option<usize> {
    field_offset(flags, field).map(|offset| offset + field.size())
}
