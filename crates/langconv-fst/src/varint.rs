// Variable-length integer codec used throughout the pFST format.
//
// Unsigned values are encoded MSB-first, seven bits per byte, with the
// high bit as a continuation flag. The encoding is non-redundant: each
// continuation adds one to the accumulated value, so every integer has
// exactly one representation. Signed values fold the sign into bit 0
// (zig-zag).

use crate::FstError;

/// Longest accepted encoding. Nine bytes cover 63 bits of payload, which
/// is already far beyond any plausible state offset.
const MAX_LEN: usize = 9;

#[inline]
fn next_byte(buf: &[u8], pos: &mut usize) -> Result<u8, FstError> {
    let b = *buf.get(*pos).ok_or(FstError::Truncated { offset: *pos })?;
    *pos += 1;
    Ok(b)
}

/// Reads an unsigned varint at `*pos`, advancing `*pos` past it.
///
/// Decoding rule: start with the low seven bits of the first byte; for
/// each continuation byte, add one, shift left by seven and add the next
/// seven bits.
pub fn read_unsigned(buf: &[u8], pos: &mut usize) -> Result<usize, FstError> {
    let start = *pos;
    let mut b = next_byte(buf, pos)?;
    let mut val = (b & 0x7F) as usize;
    let mut len = 1;
    while b & 0x80 != 0 {
        len += 1;
        if len > MAX_LEN {
            return Err(FstError::BadVarint { offset: start });
        }
        val += 1;
        b = next_byte(buf, pos)?;
        val = (val << 7) + (b & 0x7F) as usize;
    }
    Ok(val)
}

/// Reads a signed (zig-zag) varint at `*pos`, advancing `*pos` past it.
pub fn read_signed(buf: &[u8], pos: &mut usize) -> Result<isize, FstError> {
    let v = read_unsigned(buf, pos)?;
    if v & 1 != 0 {
        Ok(-((v >> 1) as isize) - 1)
    } else {
        Ok((v >> 1) as isize)
    }
}

/// Appends the unsigned varint encoding of `v` to `out`.
pub fn write_unsigned(mut v: usize, out: &mut Vec<u8>) {
    let mut bytes = [0u8; MAX_LEN];
    let mut n = 1;
    bytes[0] = (v & 0x7F) as u8;
    v >>= 7;
    while v > 0 {
        v -= 1;
        bytes[n] = (v & 0x7F) as u8 | 0x80;
        n += 1;
        v >>= 7;
    }
    out.extend(bytes[..n].iter().rev());
}

/// Appends the signed (zig-zag) varint encoding of `v` to `out`.
pub fn write_signed(v: isize, out: &mut Vec<u8>) {
    let folded = if v < 0 {
        ((-(v + 1) as usize) << 1) | 1
    } else {
        (v as usize) << 1
    };
    write_unsigned(folded, out);
}

/// Number of bytes `write_unsigned` would produce for `v`.
pub fn unsigned_len(v: usize) -> usize {
    let mut out = Vec::new();
    write_unsigned(v, &mut out);
    out.len()
}

/// Number of bytes `write_signed` would produce for `v`.
pub fn signed_len(v: isize) -> usize {
    let mut out = Vec::new();
    write_signed(v, &mut out);
    out.len()
}
