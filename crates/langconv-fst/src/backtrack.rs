// Speculative execution frames for non-deterministic traversal.

/// One choice point on the execution stack.
///
/// A frame is pushed whenever an epsilon edge is taken while untried
/// alternatives remain in the same state. Output produced after the push
/// accumulates in this frame's buffers; if the speculative path fails, the
/// frame is popped, its buffers are dropped, and execution resumes at
/// `eps_state` with `eps_skip` alternatives skipped and the input cursor
/// rewound to `input_index`.
///
/// The bottom frame of the stack is the committed, non-speculative result.
/// Its positional fields are never restored from; only its buffers matter.
#[derive(Debug)]
pub struct BacktrackState {
    /// State offset to resume at after a failure.
    pub eps_state: usize,
    /// How many leading epsilon alternatives have already been tried
    /// in the resume state.
    pub eps_skip: usize,
    /// Output position (bytes, or codepoints when counting) at push time.
    pub out_pos: usize,
    /// Input cursor at push time.
    pub input_index: usize,
    /// Output bytes produced since this frame was pushed.
    pub partial_output: Vec<u8>,
    /// Bracket boundaries recorded since this frame was pushed.
    pub partial_brackets: Vec<usize>,
}

impl BacktrackState {
    pub fn new(eps_state: usize, eps_skip: usize, out_pos: usize, input_index: usize) -> Self {
        Self {
            eps_state,
            eps_skip,
            out_pos,
            input_index,
            partial_output: Vec::new(),
            partial_brackets: Vec::new(),
        }
    }

    /// Absorbs another frame's speculative output into this one.
    pub fn absorb(&mut self, other: &mut BacktrackState) {
        self.partial_output.append(&mut other.partial_output);
        self.partial_brackets.append(&mut other.partial_brackets);
    }
}
