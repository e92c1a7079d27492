// Assembler producing pFST byte images from a state/edge description.
//
// Used by tests and tooling to construct machines without a separate
// compiler toolchain. Layout is the inverse of the interpreter: edges are
// sorted by input byte, each state picks an edge width wide enough for its
// largest target varint, and inter-state offsets are resolved by fixpoint
// iteration (state sizes depend on offsets and vice versa).

use crate::format::{HEADER_SIZE, MAGIC, STATE_INITIAL};
use crate::varint;

/// Where an edge points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A state created with [`FstBuilder::add_state`] (state 0 is the
    /// initial state).
    State(usize),
    /// The EOF sentinel region: taking this edge terminates execution.
    Accept,
}

#[derive(Debug, Clone, Copy)]
struct EdgeSpec {
    input: u8,
    output: u8,
    target: Target,
}

#[derive(Debug, Default)]
struct StateSpec {
    edges: Vec<EdgeSpec>,
}

/// Builds a pFST image.
///
/// State 0 (the initial state) exists from the start; further states are
/// added with [`add_state`](Self::add_state). Edges may be added in any
/// order; they are sorted by input byte during [`build`](Self::build).
#[derive(Debug)]
pub struct FstBuilder {
    states: Vec<StateSpec>,
}

impl Default for FstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FstBuilder {
    pub fn new() -> Self {
        Self {
            states: vec![StateSpec::default()],
        }
    }

    /// Adds an empty state and returns its index.
    pub fn add_state(&mut self) -> usize {
        self.states.push(StateSpec::default());
        self.states.len() - 1
    }

    /// Adds an edge. `input` and `output` may be pseudo-bytes from
    /// [`crate::edge`].
    pub fn add_edge(&mut self, from: usize, input: u8, output: u8, target: Target) {
        self.states[from].edges.push(EdgeSpec {
            input,
            output,
            target,
        });
    }

    /// Assembles the image.
    pub fn build(mut self) -> Vec<u8> {
        for state in &mut self.states {
            state.edges.sort_by_key(|e| e.input);
        }

        let n = self.states.len();
        // Edge widths only ever grow between passes, so the sizes are
        // monotone and the offsets reach a fixpoint.
        let mut widths = vec![3usize; n];
        let mut offsets = self.guess_offsets(&widths);
        loop {
            for (i, state) in self.states.iter().enumerate() {
                widths[i] = self.state_width(state, offsets[i], widths[i], &offsets);
            }
            let next = self.guess_offsets(&widths);
            if next == offsets {
                break;
            }
            offsets = next;
        }

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&[0x00, 0x00]); // EOF sentinel state
        for (i, state) in self.states.iter().enumerate() {
            debug_assert_eq!(out.len(), offsets[i]);
            let w = widths[i];
            varint::write_unsigned(w, &mut out);
            varint::write_unsigned(state.edges.len(), &mut out);
            for (k, e) in state.edges.iter().enumerate() {
                let edge_end = offsets[i] + self.header_len(state, w) + (k + 1) * w;
                out.push(e.input);
                out.push(e.output);
                let before = out.len();
                varint::write_signed(self.delta(e.target, edge_end, &offsets), &mut out);
                // Pad the varint field to the edge width.
                out.resize(before + w - 2, 0x00);
            }
        }
        out
    }

    fn header_len(&self, state: &StateSpec, width: usize) -> usize {
        varint::unsigned_len(width) + varint::unsigned_len(state.edges.len())
    }

    fn target_offset(&self, target: Target, offsets: &[usize]) -> usize {
        match target {
            Target::State(i) => offsets[i],
            Target::Accept => HEADER_SIZE,
        }
    }

    fn delta(&self, target: Target, edge_end: usize, offsets: &[usize]) -> isize {
        self.target_offset(target, offsets) as isize - edge_end as isize
    }

    /// Smallest edge width (at least `min`) that fits every target varint
    /// of `state` placed at `offset`.
    fn state_width(
        &self,
        state: &StateSpec,
        offset: usize,
        min: usize,
        offsets: &[usize],
    ) -> usize {
        let mut w = min;
        loop {
            let hdr = self.header_len(state, w);
            let needed = state
                .edges
                .iter()
                .enumerate()
                .map(|(k, e)| {
                    let edge_end = offset + hdr + (k + 1) * w;
                    2 + varint::signed_len(self.delta(e.target, edge_end, offsets))
                })
                .max()
                .unwrap_or(w);
            if needed <= w {
                return w;
            }
            w = needed;
        }
    }

    fn guess_offsets(&self, widths: &[usize]) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.states.len());
        let mut at = STATE_INITIAL;
        for (state, &w) in self.states.iter().zip(widths) {
            offsets.push(at);
            at += self.header_len(state, w) + state.edges.len() * w;
        }
        offsets
    }
}
