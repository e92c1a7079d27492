//! pFST (packed finite-state transducer) engine.
//!
//! This crate loads and executes compiled pFST binary automatons, the
//! format used by MediaWiki's LanguageConverter to convert text between
//! orthographic variants of a language. An automaton either rewrites an
//! input byte range (a conversion machine) or partitions it into
//! alternating safe/unsafe spans (a bracketing machine).
//!
//! # Architecture
//!
//! - [`format`] -- Binary header parsing and validation
//! - [`varint`] -- Bounds-checked variable-length integer codec
//! - [`edge`] -- Edge layout and pseudo-byte constants
//! - [`backtrack`] -- Speculative execution frames
//! - [`fst`] -- Automaton loading and execution
//! - [`builder`] -- Assembler producing pFST images (tests and tooling)
//! - [`source`] -- Injectable named-byte-buffer loading

pub mod backtrack;
pub mod builder;
pub mod edge;
pub mod format;
pub mod fst;
pub mod source;
pub mod varint;

pub use fst::Fst;
pub use source::{DirSource, FstSource, MemorySource};

/// Error type for pFST loading and execution.
///
/// Every variant indicates either a corrupt or missing compiled asset or a
/// mis-compiled automaton; none of them is a recoverable runtime condition.
/// Callers should treat them as fatal integration defects rather than
/// downgrading them to soft errors.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("invalid magic header in pFST data")]
    InvalidMagic,
    #[error("pFST data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("truncated pFST data: read past end at offset {offset}")]
    Truncated { offset: usize },
    #[error("malformed varint at offset {offset}")]
    BadVarint { offset: usize },
    #[error("malformed state at offset {offset}")]
    BadState { offset: usize },
    #[error("edge target {target} out of bounds (resolved at offset {offset})")]
    BadTarget { offset: usize, target: isize },
    #[error("backtrack stack underflow in machine {name}: automaton is not total")]
    StackUnderflow { name: String },
    #[error("machine {name} is not a bracketing machine")]
    NotBracketing { name: String },
    #[error("machine {name} produced output that is not valid UTF-8")]
    OutputNotUtf8 { name: String },
    #[error("no machine named {name}")]
    MachineNotFound { name: String },
    #[error("failed to read machine {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
