//! The document is the owner of the node tree.

use crate::node::arena::NodeArena;
use crate::node::{Node, NodeId, NodeKind};

/// A parsed document: an arena of nodes plus the id of the root Document
/// node. All tree mutation goes through the arena operations, which keep the
/// sibling/parent links consistent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    arena: NodeArena,
    root: NodeId,
    /// Quirks mode as derived from the doctype
    pub quirks: bool,
}

impl Document {
    /// Creates a document containing only the root Document node.
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.add_node(Node::new_document());
        Self {
            arena,
            root,
            quirks: false,
        }
    }

    /// The root Document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.node(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena.node_mut(id)
    }

    /// Adds a detached node to the document and returns its id.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.arena.add_node(node)
    }

    /// The child ids of `parent`, first to last.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.arena.children(parent)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.arena.append_child(parent, child);
    }

    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, old_child: Option<NodeId>) {
        self.arena.insert_before(parent, new_child, old_child);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.arena.remove_child(parent, child);
    }

    /// Detaches `child` from whatever parent it has, if any.
    pub fn detach(&mut self, child: NodeId) {
        self.arena.detach(child);
    }

    pub fn reparent_children(&mut self, dst: NodeId, src: NodeId) {
        self.arena.reparent_children(dst, src);
    }

    /// Returns a detached shallow copy of the node (not yet in the arena).
    pub fn clone_node(&self, id: NodeId) -> Node {
        self.arena.clone_node(id)
    }

    /// Finds the first element child of `parent` with the given name.
    pub fn find_element_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .into_iter()
            .find(|&id| self.node(id).kind == NodeKind::Element && self.node(id).data == name)
    }

    /// Concatenated text content of the subtree under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if node.kind == NodeKind::Text {
            out.push_str(&node.data);
        }
        for child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Verifies the structural tree invariants below `id`; for use in tests.
    #[doc(hidden)]
    pub fn assert_consistent(&self, id: NodeId) {
        self.arena.assert_consistent(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn new_document_has_root() {
        let doc = Document::new();
        assert_eq!(doc.node(doc.root()).kind, NodeKind::Document);
        assert!(!doc.quirks);
    }

    #[test]
    fn find_element_child() {
        let mut doc = Document::new();
        let html = doc.add_node(Node::new_element("html", vec![]));
        let head = doc.add_node(Node::new_element("head", vec![]));
        let body = doc.add_node(Node::new_element("body", vec![]));
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);

        assert_eq!(doc.find_element_child(html, "body"), Some(body));
        assert_eq!(doc.find_element_child(html, "div"), None);
        doc.assert_consistent(doc.root());
    }

    #[test]
    fn text_content_walks_subtree() {
        let mut doc = Document::new();
        let p = doc.add_node(Node::new_element("p", vec![]));
        let t1 = doc.add_node(Node::new_text("a"));
        let b = doc.add_node(Node::new_element("b", vec![]));
        let t2 = doc.add_node(Node::new_text("c"));
        doc.append_child(doc.root(), p);
        doc.append_child(p, t1);
        doc.append_child(p, b);
        doc.append_child(b, t2);

        assert_eq!(doc.text_content(p), "ac");
    }
}
