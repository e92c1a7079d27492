// Automaton loading and execution.
//
// Execution is an iterative depth-first search with an explicit stack of
// speculative frames. Epsilon edges are always explored first; a FAIL
// transition pops the most recent choice point and rewinds input and
// output to it. The automatons are total over the byte alphabet, so a
// well-formed machine never fails out of the bottom (committed) frame.

use crate::backtrack::BacktrackState;
use crate::edge::{
    self, BYTE_EOF, BYTE_EPSILON, BYTE_FAIL, BYTE_IDENTITY, BYTE_LBRACKET, BYTE_RBRACKET,
};
use crate::format::{self, STATE_INITIAL};
use crate::{FstError, varint};

/// A compiled pFST automaton.
///
/// The backing buffer is immutable after construction; all per-run state
/// lives on the stack of the `run` call, so one `Fst` can be shared freely
/// across threads.
pub struct Fst {
    name: String,
    pfst: Vec<u8>,
    just_brackets: bool,
}

impl std::fmt::Debug for Fst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fst")
            .field("name", &self.name)
            .field("bytes", &self.pfst.len())
            .field("just_brackets", &self.just_brackets)
            .finish()
    }
}

/// What a single execution produced.
struct RunResult {
    output: Vec<u8>,
    brackets: Vec<usize>,
    /// Final output position (bytes, or codepoints when counting).
    out_pos: usize,
}

impl Fst {
    /// Compiles (validates and wraps) a pFST byte image.
    ///
    /// `just_brackets` marks bracketing machines; only those may be asked
    /// for span boundaries. Validation failures mean the compiled asset is
    /// corrupt and are not recoverable.
    pub fn compile(
        name: impl Into<String>,
        bytes: Vec<u8>,
        just_brackets: bool,
    ) -> Result<Self, FstError> {
        format::validate(&bytes)?;
        Ok(Self {
            name: name.into(),
            pfst: bytes,
            just_brackets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this machine partitions input rather than rewriting it.
    pub fn is_bracketing(&self) -> bool {
        self.just_brackets
    }

    /// Runs the automaton over `buf[start..end]` and returns the rewritten
    /// bytes.
    pub fn translate(&self, buf: &[u8], start: usize, end: usize) -> Result<Vec<u8>, FstError> {
        Ok(self.run(buf, start, end, false)?.output)
    }

    /// Like [`translate`](Self::translate) over a string range, returning
    /// a `String`.
    pub fn translate_str(&self, s: &str, start: usize, end: usize) -> Result<String, FstError> {
        String::from_utf8(self.translate(s.as_bytes(), start, end)?).map_err(|_| {
            FstError::OutputNotUtf8 {
                name: self.name.clone(),
            }
        })
    }

    /// Runs a bracketing machine over `buf[start..end]` and returns the
    /// span boundaries.
    ///
    /// The returned list is non-decreasing. With `count_codepoints` false
    /// the values are absolute byte offsets, starting with `start` and
    /// ending with `end`; with it true they are codepoint counts relative
    /// to `start` (UTF-8 continuation bytes do not advance the counter),
    /// starting with 0 and ending with the total count. Gaps alternate
    /// safe, unsafe, safe, ...
    pub fn bracket(
        &self,
        buf: &[u8],
        start: usize,
        end: usize,
        count_codepoints: bool,
    ) -> Result<Vec<usize>, FstError> {
        if !self.just_brackets {
            return Err(FstError::NotBracketing {
                name: self.name.clone(),
            });
        }
        let result = self.run(buf, start, end, count_codepoints)?;
        let mut offsets = Vec::with_capacity(result.brackets.len() + 2);
        offsets.push(if count_codepoints { 0 } else { start });
        offsets.extend(result.brackets);
        offsets.push(if count_codepoints { result.out_pos } else { end });
        Ok(offsets)
    }

    /// Debugging helper: the bracketed substrings of `s[start..end]`, in
    /// order, alternating safe and unsafe.
    pub fn split(&self, s: &str, start: usize, end: usize) -> Result<Vec<String>, FstError> {
        let bytes = s.as_bytes();
        let offsets = self.bracket(bytes, start, end, false)?;
        Ok(offsets
            .windows(2)
            .map(|w| String::from_utf8_lossy(&bytes[w[0]..w[1]]).into_owned())
            .collect())
    }

    /// The interpreter core.
    fn run(
        &self,
        buf: &[u8],
        start: usize,
        end: usize,
        count_codepoints: bool,
    ) -> Result<RunResult, FstError> {
        let pfst = &self.pfst[..];
        let mut state = STATE_INITIAL;
        let mut idx = start;
        let mut out_pos: usize = 0;
        let mut eps_skip: usize = 0;
        let mut stack = vec![BacktrackState::new(state, 0, out_pos, idx)];

        while state >= STATE_INITIAL {
            if state == STATE_INITIAL && stack.len() > 1 {
                // Back at the start state: the automaton is total, so no
                // later failure can rewind past this point. Commit all
                // speculative frames to bound stack growth.
                merge_frames(&mut stack);
            }

            let mut pos = state;
            let edge_width = varint::read_unsigned(pfst, &mut pos)?;
            let n_edges = varint::read_unsigned(pfst, &mut pos)?;
            let edge0 = pos;
            let block_end = edge_width
                .checked_mul(n_edges)
                .and_then(|len| edge0.checked_add(len))
                .ok_or(FstError::BadState { offset: state })?;
            if block_end > pfst.len() {
                return Err(FstError::Truncated { offset: state });
            }
            if n_edges > 0 && edge_width < 3 {
                // Two fixed bytes plus at least one varint byte per edge.
                return Err(FstError::BadState { offset: state });
            }

            // Epsilon edges sort first; explore the next untried one
            // eagerly but speculatively.
            if eps_skip < n_edges && pfst[edge0 + eps_skip * edge_width] == BYTE_EPSILON {
                let e = edge::decode(pfst, edge0 + eps_skip * edge_width, edge_width)?;
                if eps_skip + 1 < n_edges {
                    stack.push(BacktrackState::new(state, eps_skip + 1, out_pos, idx));
                }
                apply_output(
                    e.output,
                    None,
                    self.just_brackets,
                    count_codepoints,
                    start,
                    &mut out_pos,
                    &mut stack,
                );
                state = e.target;
                eps_skip = 0;
                continue;
            }

            // Consume one byte (or the EOF pseudo-byte) and binary-search
            // for the rightmost edge whose input byte is <= it. Edges
            // partition the byte space: one edge covers the whole range up
            // to the next edge's input byte.
            let byte = if idx < end { buf[idx] } else { BYTE_EOF };
            let mut lo = eps_skip;
            let mut hi = n_edges;
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if pfst[edge0 + mid * edge_width] <= byte {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }

            let found = if lo > eps_skip {
                Some(edge::decode(pfst, edge0 + (lo - 1) * edge_width, edge_width)?)
            } else {
                None
            };

            match found {
                Some(e) if e.output != BYTE_FAIL => {
                    if idx < end {
                        idx += 1;
                    }
                    apply_output(
                        e.output,
                        Some(byte),
                        self.just_brackets,
                        count_codepoints,
                        start,
                        &mut out_pos,
                        &mut stack,
                    );
                    state = e.target;
                    eps_skip = 0;
                }
                _ => {
                    // FAIL: rewind to the most recent choice point. The
                    // bottom frame is the committed result; popping it
                    // would mean the automaton is not total.
                    if stack.len() < 2 {
                        return Err(FstError::StackUnderflow {
                            name: self.name.clone(),
                        });
                    }
                    let f = stack.pop().ok_or(FstError::StackUnderflow {
                        name: self.name.clone(),
                    })?;
                    state = f.eps_state;
                    eps_skip = f.eps_skip;
                    out_pos = f.out_pos;
                    idx = f.input_index;
                }
            }
        }

        // Accepted: everything still on the stack is part of the result.
        merge_frames(&mut stack);
        let committed = stack.pop().ok_or(FstError::StackUnderflow {
            name: self.name.clone(),
        })?;
        Ok(RunResult {
            output: committed.partial_output,
            brackets: committed.partial_brackets,
            out_pos,
        })
    }
}

/// Collapses the stack into its bottom (committed) frame.
fn merge_frames(stack: &mut Vec<BacktrackState>) {
    let mut rest = stack.split_off(1);
    for f in &mut rest {
        stack[0].absorb(f);
    }
}

/// Interprets an edge's output byte.
///
/// `consumed` is the input byte the edge matched, or `None` for an epsilon
/// move. Bracket markers are only meaningful for bracketing machines and
/// record the current output position instead of emitting anything.
fn apply_output(
    output: u8,
    consumed: Option<u8>,
    just_brackets: bool,
    count_codepoints: bool,
    start: usize,
    out_pos: &mut usize,
    stack: &mut [BacktrackState],
) {
    let top = match stack.last_mut() {
        Some(t) => t,
        None => return,
    };
    match output {
        BYTE_EPSILON => {}
        BYTE_LBRACKET | BYTE_RBRACKET if just_brackets => {
            let mark = if count_codepoints {
                *out_pos
            } else {
                start + *out_pos
            };
            top.partial_brackets.push(mark);
        }
        BYTE_LBRACKET | BYTE_RBRACKET => {}
        BYTE_IDENTITY => {
            if let Some(b) = consumed {
                emit(b, count_codepoints, out_pos, top);
            }
        }
        b => emit(b, count_codepoints, out_pos, top),
    }
}

#[inline]
fn emit(b: u8, count_codepoints: bool, out_pos: &mut usize, top: &mut BacktrackState) {
    top.partial_output.push(b);
    if count_codepoints {
        // Count Unicode scalar values: UTF-8 continuation bytes do not
        // start a new codepoint.
        if !(0x80..=0xBF).contains(&b) {
            *out_pos += 1;
        }
    } else {
        *out_pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FstBuilder, Target};

    /// Identity over printable bytes, accepting at end of input.
    fn identity_fst() -> Fst {
        let mut b = FstBuilder::new();
        let s0 = 0;
        b.add_edge(s0, 0x01, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
        Fst::compile("identity", b.build(), false).unwrap()
    }

    /// Rewrites 'a' to 'b', everything else unchanged.
    fn a_to_b_fst() -> Fst {
        let mut b = FstBuilder::new();
        let s0 = 0;
        b.add_edge(s0, 0x01, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, b'a', b'b', Target::State(s0));
        b.add_edge(s0, b'a' + 1, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
        Fst::compile("a-to-b", b.build(), false).unwrap()
    }

    /// Epsilon path that emits '!' and rewrites 'x' to 'X', with an
    /// explicit FAIL edge for everything above 'x' so the epsilon path
    /// must be abandoned for other bytes.
    fn speculative_fst() -> Fst {
        let mut b = FstBuilder::new();
        let s0 = 0;
        let s1 = b.add_state();
        b.add_edge(s0, BYTE_EPSILON, b'!', Target::State(s1));
        b.add_edge(s0, 0x01, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
        b.add_edge(s1, b'x', b'X', Target::State(s0));
        b.add_edge(s1, b'x' + 1, BYTE_FAIL, Target::State(s0));
        Fst::compile("speculative", b.build(), false).unwrap()
    }

    /// Bracketing machine that marks every 'u' as an unsafe span.
    fn bracket_u_fst() -> Fst {
        let mut b = FstBuilder::new();
        let s0 = 0;
        let s1 = b.add_state();
        let s2 = b.add_state();
        b.add_edge(s0, 0x01, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, b'u', BYTE_LBRACKET, Target::State(s1));
        b.add_edge(s0, b'u' + 1, BYTE_IDENTITY, Target::State(s0));
        b.add_edge(s0, BYTE_EOF, BYTE_EPSILON, Target::Accept);
        b.add_edge(s1, BYTE_EPSILON, b'u', Target::State(s2));
        b.add_edge(s2, BYTE_EPSILON, BYTE_RBRACKET, Target::State(s0));
        Fst::compile("bracket-u", b.build(), true).unwrap()
    }

    #[test]
    fn identity_roundtrip() {
        let fst = identity_fst();
        let out = fst.translate_str("hello, world", 0, 12).unwrap();
        assert_eq!(out, "hello, world");
    }

    #[test]
    fn empty_input() {
        let fst = identity_fst();
        assert_eq!(fst.translate(b"", 0, 0).unwrap(), b"");
    }

    #[test]
    fn subrange_only() {
        let fst = a_to_b_fst();
        assert_eq!(fst.translate_str("xaax", 1, 3).unwrap(), "bb");
    }

    #[test]
    fn cat_converts_to_cbt() {
        let fst = a_to_b_fst();
        assert_eq!(fst.translate_str("cat", 0, 3).unwrap(), "cbt");
    }

    #[test]
    fn backtracking_discards_speculative_output() {
        let fst = speculative_fst();
        // 'x' goes through the epsilon path; 'y' forces a backtrack that
        // must throw away the speculatively emitted '!'.
        assert_eq!(fst.translate_str("xy", 0, 2).unwrap(), "!Xy");
        assert_eq!(fst.translate_str("yx", 0, 2).unwrap(), "y!X");
    }

    #[test]
    fn backtracking_matches_brute_force() {
        // Reference: each 'x' becomes "!X", every other byte is itself.
        let fst = speculative_fst();
        for input in ["", "x", "y", "xx", "xyx", "axbxc", "zzz"] {
            let expected: String = input
                .chars()
                .map(|c| if c == 'x' { "!X".to_string() } else { c.to_string() })
                .collect();
            assert_eq!(
                fst.translate_str(input, 0, input.len()).unwrap(),
                expected,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn bracket_offsets_are_monotonic_and_cover_range() {
        let fst = bracket_u_fst();
        let text = "au_u";
        let offsets = fst.bracket(text.as_bytes(), 0, text.len(), false).unwrap();
        assert_eq!(offsets, [0, 1, 2, 3, 4, 4]);
        for w in offsets.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert_eq!(*offsets.last().unwrap(), text.len());
    }

    #[test]
    fn bracket_empty_input() {
        let fst = bracket_u_fst();
        assert_eq!(fst.bracket(b"", 0, 0, false).unwrap(), [0, 0]);
        assert_eq!(fst.bracket(b"", 0, 0, true).unwrap(), [0, 0]);
    }

    #[test]
    fn bracket_counts_codepoints() {
        let fst = bracket_u_fst();
        // "éu" is three bytes but two codepoints.
        let text = "éu";
        let offsets = fst.bracket(text.as_bytes(), 0, text.len(), true).unwrap();
        assert_eq!(offsets, [0, 1, 2, 2]);
    }

    #[test]
    fn bracket_subrange_uses_absolute_byte_offsets() {
        let fst = bracket_u_fst();
        let text = "xxuax";
        let offsets = fst.bracket(text.as_bytes(), 2, 4, false).unwrap();
        assert_eq!(offsets, [2, 2, 3, 4]);
    }

    #[test]
    fn split_returns_alternating_substrings() {
        let fst = bracket_u_fst();
        let parts = fst.split("aub", 0, 3).unwrap();
        assert_eq!(parts, ["a", "u", "b"]);
    }

    #[test]
    fn bracket_requires_bracketing_machine() {
        let fst = a_to_b_fst();
        assert!(matches!(
            fst.bracket(b"cat", 0, 3, false),
            Err(FstError::NotBracketing { .. })
        ));
    }

    #[test]
    fn non_total_automaton_underflows() {
        // The identity machine covers 0x01.. only, so a NUL byte has no
        // matching edge and no choice point to rewind to.
        let fst = identity_fst();
        assert!(matches!(
            fst.translate(b"\0", 0, 1),
            Err(FstError::StackUnderflow { .. })
        ));
    }

    #[test]
    fn compile_rejects_corrupt_images() {
        assert!(matches!(
            Fst::compile("x", b"pFST".to_vec(), false),
            Err(FstError::TooShort { .. })
        ));
        let mut image = identity_fst().pfst.clone();
        image[3] = b'!';
        assert!(matches!(
            Fst::compile("x", image, false),
            Err(FstError::InvalidMagic)
        ));
    }
}
