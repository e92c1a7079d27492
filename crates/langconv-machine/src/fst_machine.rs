// FST-backed replacement machine.
//
// Owns one conversion automaton per destination code and one bracketing
// automaton per valid (destination, inverse) pair, all loaded once at
// construction. Everything afterwards is read-only.

use hashbrown::HashMap;

use langconv_core::variant::{VARIANT_ATTR, VARIANT_LANG_ATTR, VARIANT_TYPEOF};
use langconv_core::{Document, Fragment, VariantInfo};
use langconv_fst::{Fst, FstSource};

use crate::machine::{BracketResult, ReplacementMachine};
use crate::MachineError;

/// Conversion machine name for a destination code.
pub fn trans_name(code: &str) -> String {
    format!("trans-{code}")
}

/// Bracketing machine name for a (destination, inverse) pair; the
/// same-code case is spelled `noop`.
pub fn brack_name(dest: &str, invert: &str) -> String {
    if dest == invert {
        format!("brack-{dest}-noop")
    } else {
        format!("brack-{dest}-{invert}")
    }
}

/// A replacement machine driven by compiled pFST automatons.
pub struct FstReplacementMachine {
    base_language: String,
    codes: Vec<String>,
    converters: HashMap<String, Fst>,
    /// `bracketers[dest][invert]`; presence defines the loaded pair set.
    bracketers: HashMap<String, HashMap<String, Fst>>,
}

impl std::fmt::Debug for FstReplacementMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FstReplacementMachine")
            .field("base_language", &self.base_language)
            .field("codes", &self.codes)
            .finish()
    }
}

impl FstReplacementMachine {
    /// Loads machines for every code and every ordered code pair.
    pub fn new<S: FstSource>(
        source: &S,
        base_language: &str,
        codes: &[&str],
    ) -> Result<Self, MachineError> {
        Self::with_pair_policy(source, base_language, codes, |_, _| true)
    }

    /// Loads machines, restricting bracketing pairs to those accepted by
    /// `valid_pair`. Same-code pairs are always loaded (as `noop`
    /// machines) regardless of the policy.
    pub fn with_pair_policy<S, F>(
        source: &S,
        base_language: &str,
        codes: &[&str],
        valid_pair: F,
    ) -> Result<Self, MachineError>
    where
        S: FstSource,
        F: Fn(&str, &str) -> bool,
    {
        let mut converters = HashMap::new();
        let mut bracketers: HashMap<String, HashMap<String, Fst>> = HashMap::new();
        for &code in codes {
            let name = trans_name(code);
            converters.insert(
                code.to_owned(),
                Fst::compile(name.clone(), source.load_bytes(&name)?, false)?,
            );
            let per_invert = bracketers.entry(code.to_owned()).or_default();
            for &code2 in codes {
                if code != code2 && !valid_pair(code, code2) {
                    continue;
                }
                let name = brack_name(code, code2);
                per_invert.insert(
                    code2.to_owned(),
                    Fst::compile(name.clone(), source.load_bytes(&name)?, true)?,
                );
            }
        }
        Ok(Self {
            base_language: base_language.to_owned(),
            codes: codes.iter().map(|&c| c.to_owned()).collect(),
            converters,
            bracketers,
        })
    }

    pub fn base_language(&self) -> &str {
        &self.base_language
    }

    fn converter(&self, dest: &str) -> Result<&Fst, MachineError> {
        self.converters
            .get(dest)
            .ok_or_else(|| MachineError::UnknownCode(dest.to_owned()))
    }

    fn bracketer(&self, dest: &str, invert: &str) -> Result<&Fst, MachineError> {
        self.bracketers
            .get(dest)
            .and_then(|per| per.get(invert))
            .ok_or_else(|| MachineError::InvalidCodePair {
                dest: dest.to_owned(),
                invert: invert.to_owned(),
            })
    }

    /// Scores how well `invert` explains `text` as the original variant
    /// of a conversion to `dest`: the number of codepoints that would
    /// need round-trip markup, alongside the safe count and total.
    pub fn count_brackets(
        &self,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<BracketResult, MachineError> {
        let brackets = self
            .bracketer(dest, invert)?
            .bracket(text.as_bytes(), 0, text.len(), true)?;
        let mut safe = 0;
        let mut unsafe_count = 0;
        for i in 1..brackets.len() {
            let width = brackets[i] - brackets[i - 1];
            // Gaps alternate: safe first.
            if i % 2 == 1 {
                safe += width;
            } else {
                unsafe_count += width;
            }
        }
        Ok(BracketResult {
            safe,
            unsafe_count,
            length: brackets.last().copied().unwrap_or(0),
        })
    }

    /// Picks the registered code (other than `dest`) whose bracketing
    /// machine finds the fewest unsafe codepoints in `text`. Candidates
    /// are scanned in registration order and only a strictly lower score
    /// replaces the current best, so ties keep the earliest candidate.
    fn guess_invert_code(&self, text: &str, dest: &str) -> Result<Option<&str>, MachineError> {
        let mut best: Option<(usize, &str)> = None;
        for code in &self.codes {
            if code == dest {
                continue;
            }
            if self.bracketers.get(dest).is_none_or(|per| !per.contains_key(code)) {
                continue;
            }
            let result = self.count_brackets(text, dest, code)?;
            if best.is_none_or(|(score, _)| result.unsafe_count < score) {
                best = Some((result.unsafe_count, code));
            }
        }
        Ok(best.map(|(_, code)| code))
    }

    fn convert_impl(
        &self,
        doc: &mut Document,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<Fragment, MachineError> {
        let converter = self.converter(dest)?;
        let bytes = text.as_bytes();
        let brackets = self
            .bracketer(dest, invert)?
            .bracket(bytes, 0, bytes.len(), false)?;

        let mut fragment = Fragment::new();
        let mut i = 1;
        while i < brackets.len() {
            // Even gaps are safe: convert and emit plain text.
            let safe = converter.translate_str(text, brackets[i - 1], brackets[i])?;
            if !safe.is_empty() {
                let node = doc.create_text_node(&safe);
                fragment.append(node);
            }
            i += 1;
            if i < brackets.len() {
                // Odd gaps are unsafe: wrap with round-trip metadata.
                let (lo, hi) = (brackets[i - 1], brackets[i]);
                if hi > lo {
                    let original = String::from_utf8_lossy(&bytes[lo..hi]).into_owned();
                    let converted = converter.translate_str(text, lo, hi)?;
                    let (invert_code, guessed) = if dest == invert {
                        // No real inverse was supplied; infer the most
                        // plausible original variant for this span.
                        match self.guess_invert_code(&original, dest)? {
                            Some(code) => (code.to_owned(), true),
                            None => (invert.to_owned(), false),
                        }
                    } else {
                        (invert.to_owned(), false)
                    };

                    let span = doc.create_element("span");
                    doc.set_attribute(span, "typeof", VARIANT_TYPEOF)?;
                    if guessed {
                        doc.set_attribute(span, VARIANT_LANG_ATTR, &invert_code)?;
                    }
                    let info = VariantInfo::two_way(&invert_code, &original, dest, &converted);
                    doc.set_attribute(span, VARIANT_ATTR, &info.to_json()?)?;
                    let content = doc.create_text_node(&converted);
                    doc.append_child(span, content)?;
                    fragment.append(span);
                }
                i += 1;
            }
        }
        Ok(fragment)
    }
}

impl ReplacementMachine for FstReplacementMachine {
    fn codes(&self) -> &[String] {
        &self.codes
    }

    fn convert(
        &self,
        doc: &mut Document,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<Fragment, MachineError> {
        self.convert_impl(doc, text, dest, invert)
    }
}
