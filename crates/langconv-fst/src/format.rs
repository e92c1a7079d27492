// pFST binary format: header validation and fixed layout constants.

use crate::FstError;

/// Magic bytes at the start of every compiled pFST file.
pub const MAGIC: [u8; 8] = *b"pFST\0WM\0";

/// Size of the pFST header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Byte offset of the initial state.
///
/// The two bytes between the header and the initial state hold the EOF
/// sentinel state (edge width 0, edge count 0). Execution terminates as
/// soon as the state pointer drops below this offset, so jumping into the
/// sentinel region is how an automaton accepts.
pub const STATE_INITIAL: usize = HEADER_SIZE + 2;

/// Validates the header of a compiled pFST image.
///
/// The buffer must be long enough to hold the header plus the sentinel
/// and initial states, and must begin with [`MAGIC`]. A failure here means
/// the compiled asset is corrupt or mis-deployed; there is no recovery.
pub fn validate(data: &[u8]) -> Result<(), FstError> {
    if data.len() <= STATE_INITIAL {
        return Err(FstError::TooShort {
            expected: STATE_INITIAL + 1,
            actual: data.len(),
        });
    }
    if data[..HEADER_SIZE] != MAGIC {
        return Err(FstError::InvalidMagic);
    }
    Ok(())
}
