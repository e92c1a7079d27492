// The replacement machine contract.

use langconv_core::{Document, DomError, Fragment, NodeId};

use crate::MachineError;

/// Aggregate statistics from running a bracketing machine over a text:
/// how many codepoints could be converted losslessly (`safe`) versus how
/// many would need round-trip markup (`unsafe_count`) for a particular
/// guess about the text's original variant. Lower `unsafe_count` means a
/// better guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketResult {
    pub safe: usize,
    pub unsafe_count: usize,
    /// Total codepoints examined; always `safe + unsafe_count`.
    pub length: usize,
}

/// Converts text between variant codes of one base language.
///
/// Implementations are immutable after construction and safe to share
/// across threads behind `dyn` (the registry picks one machine per base
/// language at configuration time, so dynamic dispatch is off the hot
/// path).
pub trait ReplacementMachine {
    /// The variant codes this machine supports.
    fn codes(&self) -> &[String];

    /// Whether `(dest, invert)` is a meaningful conversion pair. The
    /// default accepts everything; policy machines restrict it.
    fn is_valid_code_pair(&self, _dest: &str, _invert: &str) -> bool {
        true
    }

    /// Converts `text` to `dest`, treating `invert` as the best guess for
    /// the text's original variant. Safe spans become plain text nodes;
    /// unsafe spans become wrapper elements carrying round-trip metadata.
    fn convert(
        &self,
        doc: &mut Document,
        text: &str,
        dest: &str,
        invert: &str,
    ) -> Result<Fragment, MachineError>;

    /// Converts the content of a text node and swaps the node for the
    /// resulting fragment, unless conversion was a no-op. Returns the
    /// node's original next sibling so callers can keep traversing.
    fn replace(
        &self,
        doc: &mut Document,
        node: NodeId,
        dest: &str,
        invert: &str,
    ) -> Result<Option<NodeId>, MachineError> {
        let text = doc.text(node).ok_or(DomError::NotText)?.to_owned();
        let next = doc.next_sibling(node);
        let fragment = self.convert(doc, &text, dest, invert)?;
        if !fragment_equals_text(doc, &fragment, &text) {
            doc.replace_with_fragment(node, fragment)?;
        }
        Ok(next)
    }
}

/// True when the fragment is just the input text again (a single
/// unchanged text node, or nothing at all for empty input).
fn fragment_equals_text(doc: &Document, fragment: &Fragment, text: &str) -> bool {
    match fragment.nodes() {
        [] => text.is_empty(),
        [single] => doc.text(*single) == Some(text),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shouting;

    impl ReplacementMachine for Shouting {
        fn codes(&self) -> &[String] {
            &[]
        }

        fn convert(
            &self,
            doc: &mut Document,
            text: &str,
            _dest: &str,
            _invert: &str,
        ) -> Result<Fragment, MachineError> {
            let mut f = Fragment::new();
            let n = doc.create_text_node(&text.to_uppercase());
            f.append(n);
            Ok(f)
        }
    }

    struct Identity;

    impl ReplacementMachine for Identity {
        fn codes(&self) -> &[String] {
            &[]
        }

        fn convert(
            &self,
            doc: &mut Document,
            text: &str,
            _dest: &str,
            _invert: &str,
        ) -> Result<Fragment, MachineError> {
            let mut f = Fragment::new();
            f.append(doc.create_text_node(text));
            Ok(f)
        }
    }

    fn doc_with_text(text: &str) -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t = doc.create_text_node(text);
        let sib = doc.create_element("b");
        doc.append_child(p, t).unwrap();
        doc.append_child(p, sib).unwrap();
        (doc, p, t, sib)
    }

    #[test]
    fn replace_swaps_changed_content() {
        let (mut doc, p, t, sib) = doc_with_text("abc");
        let next = Shouting.replace(&mut doc, t, "x", "x").unwrap();
        assert_eq!(next, Some(sib));
        assert_eq!(doc.serialize(p), "<p>ABC<b></b></p>");
        assert_eq!(doc.parent(t), None);
    }

    #[test]
    fn replace_skips_no_op_conversions() {
        let (mut doc, p, t, sib) = doc_with_text("abc");
        let next = Identity.replace(&mut doc, t, "x", "x").unwrap();
        assert_eq!(next, Some(sib));
        // The original node is still attached.
        assert_eq!(doc.children(p), [t, sib]);
    }

    #[test]
    fn replace_rejects_elements() {
        let (mut doc, _, _, sib) = doc_with_text("abc");
        assert!(matches!(
            Identity.replace(&mut doc, sib, "x", "x"),
            Err(MachineError::Dom(DomError::NotText))
        ));
    }

    #[test]
    fn default_code_pair_policy_accepts_everything() {
        assert!(Identity.is_valid_code_pair("a", "b"));
    }
}
