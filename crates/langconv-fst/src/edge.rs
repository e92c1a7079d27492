// Edge layout and pseudo-byte constants.
//
// An edge occupies a fixed number of bytes within its state (the state's
// edge width): input byte, output byte, then a signed varint giving the
// target state's offset relative to the end of the edge. The varint is
// minimally encoded; any bytes left over up to the edge width are padding
// and are never read.

use crate::{FstError, varint};

/// Input pseudo-byte: consume nothing. Sorts before every real byte, so an
/// epsilon edge always sits at index 0 of its state.
pub const BYTE_EPSILON: u8 = 0x00;

/// Input pseudo-byte standing in for end-of-input. 0xF8 never occurs in
/// well-formed UTF-8 and is above every legal input byte, so it sorts last
/// and binary search lands on it exactly when the input is exhausted.
pub const BYTE_EOF: u8 = 0xF8;

/// Output pseudo-byte: emit the input byte that was just consumed.
pub const BYTE_IDENTITY: u8 = 0xFF;

/// Output pseudo-byte: record a right (closing) span boundary.
pub const BYTE_RBRACKET: u8 = 0xFE;

/// Output pseudo-byte: record a left (opening) span boundary.
pub const BYTE_LBRACKET: u8 = 0xFD;

/// Output pseudo-byte: no such transition; forces a backtrack.
pub const BYTE_FAIL: u8 = 0xFC;

/// A decoded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub input: u8,
    pub output: u8,
    /// Absolute byte offset of the target state.
    pub target: usize,
}

/// Decodes the edge of width `width` starting at `start`.
///
/// The caller has already bounds-checked the state's whole edge block, but
/// the varint read re-checks against the buffer end and must not spill
/// past the edge. The resolved target must land inside the buffer;
/// anything else means the image is corrupt.
pub fn decode(pfst: &[u8], start: usize, width: usize) -> Result<Edge, FstError> {
    if start + width > pfst.len() || width < 3 {
        return Err(FstError::Truncated { offset: start });
    }
    let input = pfst[start];
    let output = pfst[start + 1];
    let mut pos = start + 2;
    let delta = varint::read_signed(pfst, &mut pos)?;
    if pos > start + width {
        return Err(FstError::BadVarint { offset: start + 2 });
    }
    let target = (start + width) as isize + delta;
    if target < 0 || target as usize >= pfst.len() {
        return Err(FstError::BadTarget {
            offset: start + 2,
            target,
        });
    }
    Ok(Edge {
        input,
        output,
        target: target as usize,
    })
}
