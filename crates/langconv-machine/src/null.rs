// Identity machine for languages without variants.

use langconv_core::{Document, Fragment};

use crate::machine::ReplacementMachine;
use crate::MachineError;

/// A machine that never converts anything. Registered for base languages
/// that have exactly one variant, so callers can treat every language
/// uniformly.
#[derive(Debug)]
pub struct NullReplacementMachine {
    codes: Vec<String>,
}

impl NullReplacementMachine {
    pub fn new(base_language: &str) -> Self {
        Self {
            codes: vec![base_language.to_owned()],
        }
    }
}

impl ReplacementMachine for NullReplacementMachine {
    fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Only the (base, base) pair exists.
    fn is_valid_code_pair(&self, dest: &str, invert: &str) -> bool {
        dest == self.codes[0] && invert == self.codes[0]
    }

    fn convert(
        &self,
        doc: &mut Document,
        text: &str,
        _dest: &str,
        _invert: &str,
    ) -> Result<Fragment, MachineError> {
        let mut fragment = Fragment::new();
        fragment.append(doc.create_text_node(text));
        Ok(fragment)
    }
}
