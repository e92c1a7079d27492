// Minimal arena document model.
//
// The replacement machines only need fragment construction (text nodes,
// elements, attributes, children) and one mutation: swapping a text node
// for a fragment. Nodes are indices into a flat arena, so ids are cheap
// to copy and there are no reference cycles to manage.

/// Error type for document mutations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node is not attached to a parent")]
    Detached,
    #[error("node is not a text node")]
    NotText,
    #[error("node is not an element")]
    NotElement,
}

/// Index of a node in its [`Document`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
enum NodeKind {
    Text(String),
    Element {
        name: String,
        /// Attribute order is preserved; duplicate names overwrite.
        attributes: Vec<(String, String)>,
    },
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered list of detached nodes, ready to be appended or spliced
/// into a document.
#[derive(Debug, Default)]
pub struct Fragment {
    nodes: Vec<NodeId>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a (detached) node to the fragment.
    pub fn append(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A document: an arena of nodes plus the builder operations the
/// conversion machines rely on.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a detached text node.
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_owned()))
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_owned(),
            attributes: Vec::new(),
        })
    }

    /// Sets an attribute, replacing any existing value for the same name.
    pub fn set_attribute(
        &mut self,
        el: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        match &mut self.nodes[el.0].kind {
            NodeKind::Element { attributes, .. } => {
                if let Some(slot) = attributes.iter_mut().find(|(n, _)| n == name) {
                    slot.1 = value.to_owned();
                } else {
                    attributes.push((name.to_owned(), value.to_owned()));
                }
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotElement),
        }
    }

    /// Appends `child` (which must be detached) to `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        match self.nodes[parent.0].kind {
            NodeKind::Element { .. } => {
                debug_assert!(self.nodes[child.0].parent.is_none());
                self.nodes[child.0].parent = Some(parent);
                self.nodes[parent.0].children.push(child);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotElement),
        }
    }

    /// The text of a text node, or `None` for elements.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element { .. } => None,
        }
    }

    /// The tag name of an element, or `None` for text nodes.
    pub fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// An attribute value, or `None` if absent or not an element.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The node immediately after `node` among its parent's children.
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let at = siblings.iter().position(|&c| c == node)?;
        siblings.get(at + 1).copied()
    }

    /// Replaces an attached node with the nodes of `fragment`, in place.
    ///
    /// The replaced node is detached (but stays in the arena). An empty
    /// fragment simply removes the node.
    pub fn replace_with_fragment(
        &mut self,
        node: NodeId,
        fragment: Fragment,
    ) -> Result<(), DomError> {
        let parent = self.nodes[node.0].parent.ok_or(DomError::Detached)?;
        let at = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or(DomError::Detached)?;
        for &n in fragment.nodes() {
            debug_assert!(self.nodes[n.0].parent.is_none());
            self.nodes[n.0].parent = Some(parent);
        }
        self.nodes[node.0].parent = None;
        self.nodes[parent.0]
            .children
            .splice(at..=at, fragment.nodes.iter().copied());
        Ok(())
    }

    /// Serializes a node to HTML-ish text (sufficient for the CLI and for
    /// tests; this is not a general-purpose HTML serializer).
    pub fn serialize(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(node, &mut out);
        out
    }

    /// Serializes a fragment's nodes in order.
    pub fn serialize_fragment(&self, fragment: &Fragment) -> String {
        let mut out = String::new();
        for &n in fragment.nodes() {
            self.serialize_into(n, &mut out);
        }
        out
    }

    fn serialize_into(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) => out.push_str(&escape_text(t)),
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (n, v) in attributes {
                    out.push(' ');
                    out.push_str(n);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                for &c in &self.nodes[node.0].children {
                    self.serialize_into(c, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_node_accessors() {
        let mut doc = Document::new();
        let t = doc.create_text_node("hi");
        assert_eq!(doc.text(t), Some("hi"));
        assert_eq!(doc.element_name(t), None);
        assert_eq!(doc.attribute(t, "x"), None);
        assert_eq!(doc.set_attribute(t, "x", "y"), Err(DomError::NotElement));
    }

    #[test]
    fn attributes_preserve_order_and_overwrite() {
        let mut doc = Document::new();
        let el = doc.create_element("span");
        doc.set_attribute(el, "b", "1").unwrap();
        doc.set_attribute(el, "a", "2").unwrap();
        doc.set_attribute(el, "b", "3").unwrap();
        assert_eq!(doc.attribute(el, "b"), Some("3"));
        assert_eq!(doc.serialize(el), "<span b=\"3\" a=\"2\"></span>");
    }

    #[test]
    fn append_and_siblings() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let a = doc.create_text_node("a");
        let b = doc.create_element("b");
        doc.append_child(p, a).unwrap();
        doc.append_child(p, b).unwrap();
        assert_eq!(doc.children(p), [a, b]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.parent(a), Some(p));
    }

    #[test]
    fn replace_with_fragment_splices_in_place() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let before = doc.create_text_node("x");
        let victim = doc.create_text_node("y");
        let after = doc.create_text_node("z");
        for n in [before, victim, after] {
            doc.append_child(p, n).unwrap();
        }

        let mut frag = Fragment::new();
        let r1 = doc.create_text_node("y1");
        let r2 = doc.create_element("span");
        frag.append(r1);
        frag.append(r2);
        doc.replace_with_fragment(victim, frag).unwrap();

        assert_eq!(doc.children(p), [before, r1, r2, after]);
        assert_eq!(doc.parent(victim), None);
        assert_eq!(doc.parent(r1), Some(p));
        assert_eq!(doc.serialize(p), "<p>xy1<span></span>z</p>");
    }

    #[test]
    fn replace_with_empty_fragment_removes_node() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let t = doc.create_text_node("gone");
        doc.append_child(p, t).unwrap();
        doc.replace_with_fragment(t, Fragment::new()).unwrap();
        assert!(doc.children(p).is_empty());
    }

    #[test]
    fn replace_detached_node_is_an_error() {
        let mut doc = Document::new();
        let t = doc.create_text_node("loose");
        assert_eq!(
            doc.replace_with_fragment(t, Fragment::new()),
            Err(DomError::Detached)
        );
    }

    #[test]
    fn serialization_escapes() {
        let mut doc = Document::new();
        let el = doc.create_element("span");
        doc.set_attribute(el, "data", "a\"b<c").unwrap();
        let t = doc.create_text_node("1 < 2 & 3 > 2");
        doc.append_child(el, t).unwrap();
        assert_eq!(
            doc.serialize(el),
            "<span data=\"a&quot;b&lt;c\">1 &lt; 2 &amp; 3 &gt; 2</span>"
        );
    }
}
