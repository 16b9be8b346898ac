//! Serializes a document tree back to HTML.

use crate::atom;
use crate::document::Document;
use crate::entity::escape_into;
use crate::node::{NodeId, NodeKind};

impl Document {
    /// Renders the whole document to HTML.
    pub fn render(&self) -> String {
        self.render_node(self.root())
    }

    /// Renders the subtree under the given node to HTML.
    pub fn render_node(&self, node: NodeId) -> String {
        let mut w = Writer {
            buffer: String::new(),
        };
        w.write_node(self, node);
        w.buffer
    }
}

struct Writer {
    buffer: String,
}

impl Writer {
    fn write_node(&mut self, doc: &Document, id: NodeId) {
        let node = doc.node(id);
        match node.kind {
            NodeKind::Error | NodeKind::ScopeMarker => {}
            NodeKind::Document => {
                for child in doc.children(id) {
                    self.write_node(doc, child);
                }
            }
            NodeKind::Text => escape_into(&mut self.buffer, &node.data),
            NodeKind::Raw => self.buffer.push_str(&node.data),
            NodeKind::Comment => {
                self.buffer.push_str("<!--");
                self.buffer.push_str(&node.data);
                self.buffer.push_str("-->");
            }
            NodeKind::Doctype => {
                self.buffer.push_str("<!DOCTYPE ");
                self.buffer.push_str(&node.data);
                if let Some(public) = node.get_attribute("public") {
                    self.buffer.push_str(" PUBLIC \"");
                    self.buffer.push_str(public);
                    self.buffer.push('"');
                    if let Some(system) = node.get_attribute("system") {
                        self.buffer.push_str(" \"");
                        self.buffer.push_str(system);
                        self.buffer.push('"');
                    }
                } else if let Some(system) = node.get_attribute("system") {
                    self.buffer.push_str(" SYSTEM \"");
                    self.buffer.push_str(system);
                    self.buffer.push('"');
                }
                self.buffer.push('>');
            }
            NodeKind::Element => self.write_element(doc, id),
        }
    }

    fn write_element(&mut self, doc: &Document, id: NodeId) {
        let node = doc.node(id);
        self.buffer.push('<');
        self.buffer.push_str(&node.data);
        for attr in &node.attrs {
            self.buffer.push(' ');
            if !attr.namespace.is_empty() {
                self.buffer.push_str(&attr.namespace);
                self.buffer.push(':');
            }
            self.buffer.push_str(&attr.name);
            self.buffer.push_str("=\"");
            escape_into(&mut self.buffer, &attr.value);
            self.buffer.push('"');
        }

        if is_void_element(&node.data) {
            self.buffer.push_str("/>");
            return;
        }
        self.buffer.push('>');

        // A leading newline inside these elements would be dropped on
        // re-parse, so put one back in front of it.
        if matches!(node.atom, atom::PRE | atom::LISTING | atom::TEXTAREA) {
            if let Some(first) = node.first_child {
                let c = doc.node(first);
                if c.kind == NodeKind::Text && c.data.starts_with('\n') {
                    self.buffer.push('\n');
                }
            }
        }

        let raw = is_raw_text_element(&node.data);
        for child in doc.children(id) {
            if raw && doc.node(child).kind == NodeKind::Text {
                self.buffer.push_str(&doc.node(child).data);
            } else {
                self.write_node(doc, child);
            }
        }

        self.buffer.push_str("</");
        self.buffer.push_str(&node.data);
        self.buffer.push('>');
    }
}

/// Elements with no content model and no end tag.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text children are written without escaping.
fn is_raw_text_element(name: &str) -> bool {
    matches!(
        name,
        "iframe" | "noembed" | "noframes" | "noscript" | "plaintext" | "script" | "style" | "xmp"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::tokenizer::token::Attribute;

    #[test]
    fn renders_elements_and_text() {
        let mut doc = Document::new();
        let p = doc.add_node(Node::new_element("p", vec![Attribute::new("id", "x")]));
        let t = doc.add_node(Node::new_text("a < b"));
        doc.append_child(doc.root(), p);
        doc.append_child(p, t);

        assert_eq!(doc.render(), "<p id=\"x\">a &lt; b</p>");
    }

    #[test]
    fn renders_void_elements_self_closing() {
        let mut doc = Document::new();
        let br = doc.add_node(Node::new_element("br", vec![]));
        doc.append_child(doc.root(), br);
        assert_eq!(doc.render(), "<br/>");
    }

    #[test]
    fn escapes_attribute_values() {
        let mut doc = Document::new();
        let a = doc.add_node(Node::new_element(
            "a",
            vec![Attribute::new("href", "x&y\"z")],
        ));
        doc.append_child(doc.root(), a);
        assert_eq!(doc.render(), "<a href=\"x&amp;y&#34;z\"></a>");
    }

    #[test]
    fn raw_text_elements_are_not_escaped() {
        let mut doc = Document::new();
        let script = doc.add_node(Node::new_element("script", vec![]));
        let t = doc.add_node(Node::new_text("a < b && c"));
        doc.append_child(doc.root(), script);
        doc.append_child(script, t);
        assert_eq!(doc.render(), "<script>a < b && c</script>");
    }

    #[test]
    fn pre_gets_leading_newline_back() {
        let mut doc = Document::new();
        let pre = doc.add_node(Node::new_element("pre", vec![]));
        let t = doc.add_node(Node::new_text("\ntext"));
        doc.append_child(doc.root(), pre);
        doc.append_child(pre, t);
        // The parser dropped the first newline of the source; writing one
        // back keeps the re-parse stable.
        assert_eq!(doc.render(), "<pre>\n\ntext</pre>");
    }

    #[test]
    fn renders_comments_and_doctype() {
        let mut doc = Document::new();
        let dt = doc.add_node(Node::new_doctype("html"));
        let c = doc.add_node(Node::new_comment(" hi "));
        doc.append_child(doc.root(), dt);
        doc.append_child(doc.root(), c);
        assert_eq!(doc.render(), "<!DOCTYPE html><!-- hi -->");
    }

    #[test]
    fn renders_foreign_attribute_namespaces() {
        let mut doc = Document::new();
        let mut attr = Attribute::new("href", "#a");
        attr.namespace = "xlink".to_string();
        let use_el = doc.add_node(Node::new_element("use", vec![attr]));
        doc.append_child(doc.root(), use_el);
        assert_eq!(doc.render(), "<use xlink:href=\"#a\"></use>");
    }
}
