use crate::node::{Node, NodeId};

/// The node arena is the single source for nodes in a document (or fragment).
///
/// All tree structure lives in the per-node link ids; the arena itself is an
/// append-only vector. Misuse of the linking operations (attaching a node
/// that is already attached, removing a child from the wrong parent) is a
/// programming error and panics with a descriptive message rather than
/// corrupting the tree.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create a new NodeArena
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add the node to the arena and return its id
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// Get the node with the given id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get the node with the given id as a mutable reference
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes ever created in this arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The child ids of `parent`, first to last
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut child = self.node(parent).first_child;
        while let Some(id) = child {
            out.push(id);
            child = self.node(id).next;
        }
        out
    }

    /// Adds `child` as the last child of `parent`. The child must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.node(child).is_detached(),
            "append_child called for an attached child node"
        );

        let last = self.node(parent).last_child;
        match last {
            Some(last) => {
                self.node_mut(last).next = Some(child);
                self.node_mut(child).prev = Some(last);
            }
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Inserts `new_child` as a child of `parent`, immediately before
    /// `old_child` (or as the last child when `old_child` is None). The new
    /// child must be detached; `old_child` must be a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, old_child: Option<NodeId>) {
        assert!(
            self.node(new_child).is_detached(),
            "insert_before called for an attached child node"
        );

        let Some(old_child) = old_child else {
            self.append_child(parent, new_child);
            return;
        };
        assert_eq!(
            self.node(old_child).parent,
            Some(parent),
            "insert_before called for a non-child node"
        );

        let prev = self.node(old_child).prev;
        match prev {
            Some(prev) => {
                self.node_mut(prev).next = Some(new_child);
                self.node_mut(new_child).prev = Some(prev);
            }
            None => self.node_mut(parent).first_child = Some(new_child),
        }
        self.node_mut(old_child).prev = Some(new_child);
        self.node_mut(new_child).next = Some(old_child);
        self.node_mut(new_child).parent = Some(parent);
    }

    /// Detaches `child` from `parent`, clearing its parent and sibling links.
    /// The subtree below `child` stays intact.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        assert_eq!(
            self.node(child).parent,
            Some(parent),
            "remove_child called for a non-child node"
        );

        let (prev, next) = {
            let c = self.node(child);
            (c.prev, c.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let c = self.node_mut(child);
        c.parent = None;
        c.prev = None;
        c.next = None;
    }

    /// Detaches `child` from whatever parent it has, if any.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node(child).parent {
            self.remove_child(parent, child);
        }
    }

    /// Moves all children of `src` to the end of `dst`'s child list.
    pub fn reparent_children(&mut self, dst: NodeId, src: NodeId) {
        while let Some(child) = self.node(src).first_child {
            self.remove_child(src, child);
            self.append_child(dst, child);
        }
    }

    /// Returns a detached shallow copy of the node: same kind, atom, data,
    /// namespace and attributes, but no tree links. The copy is not yet in
    /// the arena.
    pub fn clone_node(&self, id: NodeId) -> Node {
        let node = self.node(id);
        Node {
            id: NodeId::default(),
            kind: node.kind,
            atom: node.atom,
            data: node.data.clone(),
            namespace: node.namespace,
            attrs: node.attrs.clone(),
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }

    /// Checks the structural invariants of the subtree under `root`:
    /// symmetric sibling links, consistent first/last pointers, every child
    /// seen exactly once in both traversal directions, and no cycles.
    /// Panics with a description on the first violation; for use in tests.
    #[doc(hidden)]
    pub fn assert_consistent(&self, root: NodeId) {
        let mut visited = vec![false; self.nodes.len()];
        self.assert_consistent_at(root, &mut visited);
    }

    fn assert_consistent_at(&self, id: NodeId, visited: &mut [bool]) {
        assert!(!visited[id.0], "node {id} appears twice in the tree");
        visited[id.0] = true;

        let node = self.node(id);
        assert_eq!(
            node.first_child.is_none(),
            node.last_child.is_none(),
            "node {id} has mismatched first/last child pointers"
        );
        if let Some(parent) = node.parent {
            assert_ne!(Some(parent), node.prev, "node {id} is its own parent's sibling");
            assert_ne!(Some(parent), node.next, "node {id} is its own parent's sibling");
        }

        // Forward traversal.
        let forward = self.children(id);
        for (i, &child) in forward.iter().enumerate() {
            let c = self.node(child);
            assert_eq!(c.parent, Some(id), "child {child} of {id} has wrong parent");
            let expect_prev = if i == 0 { None } else { Some(forward[i - 1]) };
            assert_eq!(c.prev, expect_prev, "child {child} of {id} has wrong prev");
            assert_ne!(Some(child), node.parent, "node {id} is a child of its own child");
        }

        // Backward traversal must see the same children, reversed.
        let mut backward = vec![];
        let mut child = node.last_child;
        while let Some(cid) = child {
            backward.push(cid);
            child = self.node(cid).prev;
        }
        backward.reverse();
        assert_eq!(forward, backward, "node {id} sibling list asymmetric");

        for &child in &forward {
            self.assert_consistent_at(child, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn element(arena: &mut NodeArena, name: &str) -> NodeId {
        arena.add_node(Node::new_element(name, vec![]))
    }

    #[test]
    fn add_and_get() {
        let mut arena = NodeArena::new();
        let id = element(&mut arena, "test");
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.node(id).data, "test");
        assert_eq!(arena.node(id).id, id);
    }

    #[test]
    fn append_child_links() {
        let mut arena = NodeArena::new();
        let parent = element(&mut arena, "parent");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");

        arena.append_child(parent, a);
        arena.append_child(parent, b);

        assert_eq!(arena.children(parent), vec![a, b]);
        assert_eq!(arena.node(a).next, Some(b));
        assert_eq!(arena.node(b).prev, Some(a));
        assert_eq!(arena.node(parent).first_child, Some(a));
        assert_eq!(arena.node(parent).last_child, Some(b));
        arena.assert_consistent(parent);
    }

    #[test]
    #[should_panic(expected = "attached child")]
    fn append_child_rejects_attached() {
        let mut arena = NodeArena::new();
        let p1 = element(&mut arena, "p1");
        let p2 = element(&mut arena, "p2");
        let child = element(&mut arena, "child");
        arena.append_child(p1, child);
        arena.append_child(p2, child);
    }

    #[test]
    fn insert_before_links() {
        let mut arena = NodeArena::new();
        let parent = element(&mut arena, "parent");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");

        arena.append_child(parent, a);
        arena.append_child(parent, c);
        arena.insert_before(parent, b, Some(c));

        assert_eq!(arena.children(parent), vec![a, b, c]);
        arena.assert_consistent(parent);

        let d = element(&mut arena, "d");
        arena.insert_before(parent, d, Some(a));
        assert_eq!(arena.children(parent), vec![d, a, b, c]);
        arena.assert_consistent(parent);

        let e = element(&mut arena, "e");
        arena.insert_before(parent, e, None);
        assert_eq!(arena.children(parent), vec![d, a, b, c, e]);
        arena.assert_consistent(parent);
    }

    #[test]
    fn remove_child_detaches_subtree() {
        let mut arena = NodeArena::new();
        let parent = element(&mut arena, "parent");
        let child = element(&mut arena, "child");
        let grandchild = element(&mut arena, "grandchild");
        let sibling = element(&mut arena, "sibling");

        arena.append_child(parent, child);
        arena.append_child(child, grandchild);
        arena.append_child(parent, sibling);

        arena.remove_child(parent, child);

        assert!(arena.node(child).is_detached());
        assert_eq!(arena.node(child).first_child, Some(grandchild));
        assert_eq!(arena.children(parent), vec![sibling]);
        arena.assert_consistent(parent);
    }

    #[test]
    #[should_panic(expected = "non-child")]
    fn remove_child_rejects_non_child() {
        let mut arena = NodeArena::new();
        let p1 = element(&mut arena, "p1");
        let p2 = element(&mut arena, "p2");
        let child = element(&mut arena, "child");
        arena.append_child(p1, child);
        arena.remove_child(p2, child);
    }

    #[test]
    fn reparent_children_moves_all() {
        let mut arena = NodeArena::new();
        let src = element(&mut arena, "src");
        let dst = element(&mut arena, "dst");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let existing = element(&mut arena, "existing");

        arena.append_child(src, a);
        arena.append_child(src, b);
        arena.append_child(dst, existing);

        arena.reparent_children(dst, src);

        assert_eq!(arena.children(src), vec![]);
        assert_eq!(arena.children(dst), vec![existing, a, b]);
        arena.assert_consistent(dst);
    }

    #[test]
    fn clone_node_is_detached_and_shallow() {
        let mut arena = NodeArena::new();
        let parent = element(&mut arena, "parent");
        let child = element(&mut arena, "child");
        arena.append_child(parent, child);

        let copy = arena.clone_node(parent);
        assert_eq!(copy.kind, NodeKind::Element);
        assert_eq!(copy.data, "parent");
        assert!(copy.is_detached());
        assert_eq!(copy.first_child, None);
        assert_eq!(copy.last_child, None);
    }
}
