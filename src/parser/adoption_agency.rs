//! The adoption agency algorithm: repair of misnested formatting elements.

use std::io::Read;

use crate::atom::{self, Atom};
use crate::parser::{ActiveElement, Html5Parser, Scope};

const ADOPTION_AGENCY_OUTER_LOOP_DEPTH: usize = 8;
const ADOPTION_AGENCY_INNER_LOOP_DEPTH: usize = 3;

impl<R: Read> Html5Parser<R> {
    /// "Any other end tag": pop the stack to the matching element, unless a
    /// special element intervenes.
    pub(crate) fn in_body_end_tag_other(&mut self, tag_atom: Atom, tag_name: &str) {
        for i in (0..self.open_elements.len()).rev() {
            let node = self.node(self.open_elements[i]);
            // Known tags compare by atom; unknown (custom) tags get the zero
            // atom and compare by name.
            if node.atom == tag_atom && (!tag_atom.is_unknown() || node.data == tag_name) {
                self.open_elements.truncate(i);
                break;
            }
            if node.is_special() {
                break;
            }
        }
    }

    /// The adoption agency algorithm: repairs misnested formatting elements
    /// such as `<b><i></b></i>`.
    pub(crate) fn in_body_end_tag_formatting(&mut self, tag_atom: Atom, tag_name: &str) {
        // Steps 1-2: the fast path. If the current node matches and is not in
        // the list of active formatting elements, just pop it.
        let current = self.top();
        if self.node(current).data == tag_name && self.active_formatting_elements_index(current).is_none() {
            self.open_elements.pop();
            return;
        }

        // Steps 3-5: the outer loop.
        for _ in 0..ADOPTION_AGENCY_OUTER_LOOP_DEPTH {
            // Step 6: find the formatting element, scanning back to the
            // nearest marker.
            let mut formatting_element = None;
            for j in (0..self.active_formatting_elements.len()).rev() {
                match self.active_formatting_elements[j] {
                    ActiveElement::Marker => break,
                    ActiveElement::Node(id) => {
                        if self.node(id).atom == tag_atom {
                            formatting_element = Some(id);
                            break;
                        }
                    }
                }
            }
            let Some(formatting_element) = formatting_element else {
                self.in_body_end_tag_other(tag_atom, tag_name);
                return;
            };

            // Step 7: ignore the tag if the formatting element is not on the
            // stack of open elements.
            let Some(fe_index) = self.open_elements.iter().position(|&id| id == formatting_element) else {
                self.parse_error("formatting element not on the stack of open elements");
                self.active_formatting_elements_remove(formatting_element);
                return;
            };

            // Step 8: ignore the tag if the formatting element is not in scope.
            if !self.element_in_scope(Scope::Default, &[tag_atom]) {
                self.parse_error("formatting element not in scope");
                return;
            }

            // Step 9 is a parse error that does not stop the algorithm.

            // Steps 10-11: find the furthest block, the nearest special
            // element deeper than the formatting element.
            let furthest_block = self.open_elements[fe_index..]
                .iter()
                .copied()
                .find(|&id| self.node(id).is_special());
            let Some(furthest_block) = furthest_block else {
                // No furthest block: pop everything down to and including the
                // formatting element and drop it from the list.
                while let Some(e) = self.open_elements.pop() {
                    if e == formatting_element {
                        break;
                    }
                }
                self.active_formatting_elements_remove(formatting_element);
                return;
            };

            // Steps 12-13: the common ancestor and the bookmark.
            let common_ancestor = self.open_elements[fe_index - 1];
            let mut bookmark = self
                .active_formatting_elements_index(formatting_element)
                .expect("formatting element left the active formatting list");

            // Step 14: the inner loop. Walk upward from the furthest block,
            // cloning intermediate formatting ancestors and chaining them
            // under a single last_node.
            let mut last_node = furthest_block;
            let mut node;
            let mut x = self
                .open_elements
                .iter()
                .position(|&id| id == furthest_block)
                .expect("furthest block left the open-elements stack");
            let mut inner_loop_counter = 0;
            loop {
                inner_loop_counter += 1;
                x -= 1;
                node = self.open_elements[x];
                // Step 14.4: done when we are back at the formatting element.
                if node == formatting_element {
                    break;
                }
                // Step 14.5: after three iterations, surplus entries drop out
                // of the active formatting list entirely.
                let node_formatting_index = self.active_formatting_elements_index(node);
                if inner_loop_counter > ADOPTION_AGENCY_INNER_LOOP_DEPTH {
                    if let Some(ni) = node_formatting_index {
                        self.active_formatting_elements.remove(ni);
                        // Removing below the bookmark shifts it down.
                        if ni <= bookmark {
                            bookmark -= 1;
                        }
                        continue;
                    }
                }
                // Step 14.6: nodes absent from the active formatting list
                // leave the stack of open elements.
                if node_formatting_index.is_none() {
                    self.open_elements.remove(x);
                    continue;
                }
                // Step 14.7: clone the node and splice the clone into both
                // lists in its place.
                let clone = self.doc.clone_node(node);
                let clone_id = self.doc.add_node(clone);
                let formatting_pos = self.active_formatting_elements_index(node).expect("checked above");
                self.active_formatting_elements[formatting_pos] = ActiveElement::Node(clone_id);
                let stack_pos = self
                    .open_elements
                    .iter()
                    .position(|&id| id == node)
                    .expect("node left the open-elements stack");
                self.open_elements[stack_pos] = clone_id;
                node = clone_id;
                // Step 14.8: move the bookmark after the clone.
                if last_node == furthest_block {
                    bookmark = formatting_pos + 1;
                }
                // Step 14.9: reparent last_node under the clone.
                self.doc.detach(last_node);
                self.doc.append_child(node, last_node);
                // Step 14.10.
                last_node = node;
            }

            // Step 15: place last_node under the common ancestor, or foster
            // parent it when the common ancestor is a table-family element.
            self.doc.detach(last_node);
            match self.node(common_ancestor).atom {
                atom::TABLE | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TR => {
                    self.foster_parent(last_node);
                }
                _ => {
                    self.doc.append_child(common_ancestor, last_node);
                }
            }

            // Steps 16-18: clone the formatting element and move the furthest
            // block's children under the clone.
            let clone = self.doc.clone_node(formatting_element);
            let clone_id = self.doc.add_node(clone);
            self.doc.reparent_children(clone_id, furthest_block);
            self.doc.append_child(furthest_block, clone_id);

            // Step 19: fix up the list of active formatting elements.
            if let Some(old_loc) = self.active_formatting_elements_index(formatting_element) {
                if old_loc < bookmark {
                    // Move the bookmark with the rest of the list.
                    bookmark -= 1;
                }
            }
            self.active_formatting_elements_remove(formatting_element);
            self.active_formatting_elements.insert(bookmark, ActiveElement::Node(clone_id));

            // Step 20: fix up the stack of open elements.
            self.open_elements_remove(formatting_element);
            let fb_pos = self
                .open_elements
                .iter()
                .position(|&id| id == furthest_block)
                .expect("furthest block left the open-elements stack");
            self.open_elements.insert(fb_pos + 1, clone_id);
        }
    }

    /// Finds the nearest special element deeper in the stack than the given
    /// formatting element.
    #[cfg(test)]
    pub(crate) fn find_furthest_block(&self, formatting_element: crate::node::NodeId) -> Option<crate::node::NodeId> {
        let fe_index = self.open_elements.iter().position(|&id| id == formatting_element)?;
        self.open_elements[fe_index..]
            .iter()
            .copied()
            .find(|&id| self.node(id).is_special())
    }
}

/// Start and end tags this algorithm applies to.
pub(crate) fn is_formatting_tag(tag_atom: Atom) -> bool {
    matches!(
        tag_atom,
        atom::A
            | atom::B
            | atom::BIG
            | atom::CODE
            | atom::EM
            | atom::FONT
            | atom::I
            | atom::NOBR
            | atom::S
            | atom::SMALL
            | atom::STRIKE
            | atom::STRONG
            | atom::TT
            | atom::U
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::parser::Html5ParserOptions;

    fn parser_with_stack(names: &[&str]) -> Html5Parser<&'static [u8]> {
        let mut parser = Html5Parser::new(&b""[..], Html5ParserOptions::default());
        for name in names {
            let node = Node::new_element(name, vec![]);
            let id = parser.doc.add_node(node);
            let root = parser.doc.root();
            let parent = *parser.open_elements.last().unwrap_or(&root);
            parser.doc.append_child(parent, id);
            parser.open_elements.push(id);
        }
        parser
    }

    #[test]
    fn find_furthest_block_basic() {
        let mut parser = parser_with_stack(&["html", "body", "b", "p", "i"]);
        let b = parser.open_elements[2];
        let i = parser.open_elements[4];
        parser.active_formatting_elements.push(ActiveElement::Node(b));
        parser.active_formatting_elements.push(ActiveElement::Node(i));

        // The nearest special element deeper than <b> is <p>.
        assert_eq!(parser.find_furthest_block(b), Some(parser.open_elements[3]));
        // Nothing special deeper than <i>.
        assert_eq!(parser.find_furthest_block(i), None);
    }

    #[test]
    fn formatting_tags() {
        assert!(is_formatting_tag(atom::B));
        assert!(is_formatting_tag(atom::NOBR));
        assert!(!is_formatting_tag(atom::DIV));
        assert!(!is_formatting_tag(atom::SPAN));
    }
}
