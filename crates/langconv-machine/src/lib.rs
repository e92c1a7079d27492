//! Variant replacement machines.
//!
//! A replacement machine converts text between orthographic variants of
//! one base language and annotates the spans that cannot be converted
//! losslessly with round-trip metadata.
//!
//! - [`machine`] -- The [`ReplacementMachine`] contract and the
//!   bracket-count statistics type
//! - [`fst_machine`] -- The FST-backed engine
//! - [`null`] -- Identity machine for single-variant languages
//! - [`zh`] -- Chinese machine with a restricted code-pair table

pub mod fst_machine;
pub mod machine;
pub mod null;
pub mod zh;

pub use fst_machine::FstReplacementMachine;
pub use machine::{BracketResult, ReplacementMachine};
pub use null::NullReplacementMachine;
pub use zh::ZhReplacementMachine;

/// Error type for machine construction and conversion.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error(transparent)]
    Fst(#[from] langconv_fst::FstError),
    #[error("unsupported variant code: {0}")]
    UnknownCode(String),
    #[error("invalid code pair: dest={dest} invert={invert}")]
    InvalidCodePair { dest: String, invert: String },
    #[error(transparent)]
    Dom(#[from] langconv_core::DomError),
    #[error("failed to encode round-trip metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}
