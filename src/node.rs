pub mod arena;

use derive_more::Display;

use crate::atom::{self, Atom};
use crate::tokenizer::token::Attribute;

/// Different types of nodes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Placeholder for an uninitialized or errored node
    #[default]
    Error,
    Text,
    Document,
    Element,
    Comment,
    Doctype,
    /// Verbatim markup that is rendered without escaping
    Raw,
    /// Sentinel separating groups in the active formatting elements list
    ScopeMarker,
}

/// Element namespace. The empty value implies XHTML, which is what the parser
/// produces for ordinary HTML elements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    #[default]
    None,
    Html,
    Math,
    Svg,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::None => "",
            Namespace::Html => "html",
            Namespace::Math => "math",
            Namespace::Svg => "svg",
        }
    }

    /// The empty namespace implies XHTML.
    pub fn is_html(self) -> bool {
        matches!(self, Namespace::None | Namespace::Html)
    }
}

/// Index of a node in its arena. The node with id 0 is the document root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn root() -> Self {
        NodeId(0)
    }
}

/// Node that resembles a DOM node
///
/// `data` holds the tag name for Element and Doctype nodes and the text for
/// Text, Comment and Raw nodes. `atom` is the interned code of the tag name
/// (the zero atom for names outside the known set). Tree structure is kept as
/// arena ids: a parent pointer, first/last child pointers and a doubly linked
/// sibling list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    /// ID of the node; 0 is always the root / document node
    pub id: NodeId,
    pub kind: NodeKind,
    pub atom: Atom,
    pub data: String,
    pub namespace: Namespace,
    /// Attributes, in source order, with duplicate keys already dropped
    pub attrs: Vec<Attribute>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl Node {
    /// Create a new document node
    pub fn new_document() -> Self {
        Node {
            kind: NodeKind::Document,
            ..Default::default()
        }
    }

    /// Create a new element node with the given name and attributes. The atom
    /// is derived from the name.
    pub fn new_element(name: &str, attrs: Vec<Attribute>) -> Self {
        Node {
            kind: NodeKind::Element,
            atom: Atom::lookup(name.as_bytes()),
            data: name.to_string(),
            attrs,
            ..Default::default()
        }
    }

    /// Create a new text node
    pub fn new_text(value: &str) -> Self {
        Node {
            kind: NodeKind::Text,
            data: value.to_string(),
            ..Default::default()
        }
    }

    /// Create a new comment node
    pub fn new_comment(value: &str) -> Self {
        Node {
            kind: NodeKind::Comment,
            data: value.to_string(),
            ..Default::default()
        }
    }

    /// Create a new doctype node; public/system identifiers go in `attrs`
    pub fn new_doctype(name: &str) -> Self {
        Node {
            kind: NodeKind::Doctype,
            data: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns true when this node and all its links are detached
    pub fn is_detached(&self) -> bool {
        self.parent.is_none() && self.prev.is_none() && self.next.is_none()
    }

    /// Get a reference to the attribute value, or None if it doesn't exist
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.namespace.is_empty() && attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Check if an attribute exists
    pub fn contains_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Returns true if the given node is a "special" element based on its
    /// namespace and name
    pub fn is_special(&self) -> bool {
        match self.namespace {
            Namespace::None | Namespace::Html => matches!(
                self.atom,
                atom::ADDRESS
                    | atom::APPLET
                    | atom::AREA
                    | atom::ARTICLE
                    | atom::ASIDE
                    | atom::BASE
                    | atom::BASEFONT
                    | atom::BGSOUND
                    | atom::BLOCKQUOTE
                    | atom::BODY
                    | atom::BR
                    | atom::BUTTON
                    | atom::CAPTION
                    | atom::CENTER
                    | atom::COL
                    | atom::COLGROUP
                    | atom::DD
                    | atom::DETAILS
                    | atom::DIR
                    | atom::DIV
                    | atom::DL
                    | atom::DT
                    | atom::EMBED
                    | atom::FIELDSET
                    | atom::FIGCAPTION
                    | atom::FIGURE
                    | atom::FOOTER
                    | atom::FORM
                    | atom::FRAME
                    | atom::FRAMESET
                    | atom::H1
                    | atom::H2
                    | atom::H3
                    | atom::H4
                    | atom::H5
                    | atom::H6
                    | atom::HEAD
                    | atom::HEADER
                    | atom::HGROUP
                    | atom::HR
                    | atom::HTML
                    | atom::IFRAME
                    | atom::IMG
                    | atom::INPUT
                    | atom::KEYGEN
                    | atom::LI
                    | atom::LINK
                    | atom::LISTING
                    | atom::MAIN
                    | atom::MARQUEE
                    | atom::MENU
                    | atom::META
                    | atom::NAV
                    | atom::NOEMBED
                    | atom::NOFRAMES
                    | atom::NOSCRIPT
                    | atom::OBJECT
                    | atom::OL
                    | atom::P
                    | atom::PARAM
                    | atom::PLAINTEXT
                    | atom::PRE
                    | atom::SCRIPT
                    | atom::SECTION
                    | atom::SELECT
                    | atom::SOURCE
                    | atom::STYLE
                    | atom::SUMMARY
                    | atom::TABLE
                    | atom::TBODY
                    | atom::TD
                    | atom::TEMPLATE
                    | atom::TEXTAREA
                    | atom::TFOOT
                    | atom::TH
                    | atom::THEAD
                    | atom::TITLE
                    | atom::TR
                    | atom::TRACK
                    | atom::UL
                    | atom::WBR
                    | atom::XMP
            ),
            Namespace::Math => SPECIAL_MATHML_ELEMENTS.contains(&self.data.as_str()),
            Namespace::Svg => SPECIAL_SVG_ELEMENTS.contains(&self.data.as_str()),
        }
    }
}

pub static SPECIAL_MATHML_ELEMENTS: [&str; 6] = ["mi", "mo", "mn", "ms", "mtext", "annotation-xml"];

pub static SPECIAL_SVG_ELEMENTS: [&str; 3] = ["foreignObject", "desc", "title"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let node = Node::new_document();
        assert_eq!(node.id, NodeId::root());
        assert_eq!(node.parent, None);
        assert_eq!(node.kind, NodeKind::Document);
        assert_eq!(node.data, "");
        assert_eq!(node.namespace, Namespace::None);
    }

    #[test]
    fn test_new_element() {
        let node = Node::new_element("div", vec![Attribute::new("id", "test")]);
        assert_eq!(node.kind, NodeKind::Element);
        assert_eq!(node.atom, atom::DIV);
        assert_eq!(node.data, "div");
        assert_eq!(node.get_attribute("id"), Some("test"));
        assert!(node.is_detached());
    }

    #[test]
    fn test_unknown_element_has_zero_atom() {
        let node = Node::new_element("tagfromthefuture", vec![]);
        assert!(node.atom.is_unknown());
        assert_eq!(node.data, "tagfromthefuture");
        assert!(!node.is_special());
    }

    #[test]
    fn test_is_special() {
        assert!(Node::new_element("div", vec![]).is_special());
        assert!(!Node::new_element("span", vec![]).is_special());
        assert!(!Node::new_element("b", vec![]).is_special());

        let mut node = Node::new_element("mi", vec![]);
        node.namespace = Namespace::Math;
        assert!(node.is_special());

        let mut node = Node::new_element("foreignObject", vec![]);
        node.namespace = Namespace::Svg;
        assert!(node.is_special());

        // An html-namespace "mi" is not special.
        assert!(!Node::new_element("mi", vec![]).is_special());
    }

    #[test]
    fn test_attributes() {
        let node = Node::new_element(
            "a",
            vec![
                Attribute::new("href", "x"),
                Attribute::new("title", "y"),
            ],
        );
        assert!(node.contains_attribute("href"));
        assert!(!node.contains_attribute("hreflang"));
        assert_eq!(node.get_attribute("title"), Some("y"));
        assert_eq!(node.get_attribute("missing"), None);
    }
}
