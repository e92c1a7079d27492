// Chinese replacement machine.
//
// Chinese has many regional variants but conversion tables only exist
// toward the script-level codes, so the inverse side of a pair is
// restricted to `zh`, `zh-hans` or `zh-hant`. Compiling bracketing
// machines for every ordered pair of nine codes would waste most of the
// pairs anyway.

use langconv_core::{Document, Fragment};
use langconv_fst::FstSource;

use crate::fst_machine::FstReplacementMachine;
use crate::machine::{BracketResult, ReplacementMachine};
use crate::MachineError;

/// The variant codes of the Chinese machine, in registration order.
pub const ZH_CODES: [&str; 9] = [
    "zh", "zh-hans", "zh-hant", "zh-cn", "zh-hk", "zh-mo", "zh-my", "zh-sg", "zh-tw",
];

fn zh_pair_valid(dest: &str, invert: &str) -> bool {
    dest == invert || matches!(invert, "zh" | "zh-hans" | "zh-hant")
}

/// FST machine for Chinese with the restricted code-pair table.
#[derive(Debug)]
pub struct ZhReplacementMachine {
    inner: FstReplacementMachine,
}

impl ZhReplacementMachine {
    pub fn new<S: FstSource>(source: &S) -> Result<Self, MachineError> {
        Ok(Self {
            inner: FstReplacementMachine::with_pair_policy(source, "zh", &ZH_CODES, zh_pair_valid)?,
        })
    }

    pub fn count_brackets(
        &self,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<BracketResult, MachineError> {
        self.inner.count_brackets(text, dest, invert)
    }
}

impl ReplacementMachine for ZhReplacementMachine {
    fn codes(&self) -> &[String] {
        self.inner.codes()
    }

    fn is_valid_code_pair(&self, dest: &str, invert: &str) -> bool {
        zh_pair_valid(dest, invert)
    }

    fn convert(
        &self,
        doc: &mut Document,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<Fragment, MachineError> {
        self.inner.convert(doc, text, dest, invert)
    }
}
