//! HTML5 tree construction
//!
//! The parser consumes tokens from the tokenizer and builds the document
//! tree, following the WHATWG tree-construction rules: an insertion-mode
//! state machine over a stack of open elements, a list of active formatting
//! elements, and the usual repair machinery (implied tags, foster parenting,
//! the adoption agency algorithm).
//!
//! Malformed input never fails the parse; everything is recovered locally and
//! recorded as a [`ParseError`]. Invariant violations inside the parser are
//! programming errors and panic with a descriptive message.

mod adoption_agency;
pub(crate) mod attr_replacements;
mod quirks;

use std::io::Read;

use log::warn;

use crate::atom::{self, Atom};
use crate::document::Document;
use crate::errors::{Error, ParseError, Result};
use crate::node::{Namespace, Node, NodeId, NodeKind};
use crate::parser::attr_replacements::{
    adjust_attribute_names, adjust_foreign_attributes, MATHML_ADJUSTMENTS,
    SVG_ADJUSTMENTS_ATTRIBUTES, SVG_ADJUSTMENTS_TAGS,
};
use crate::parser::quirks::parse_doctype;
use crate::tokenizer::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;

const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n', '\x0C'];
const WHITESPACE_OR_NUL: &[char] = &[' ', '\t', '\r', '\n', '\x0C', '\0'];

/// Insertion modes as defined in 13.2.4.1
#[derive(Debug, Copy, Clone, PartialEq)]
enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

/// Active formatting elements, which can be a regular node(id) or a marker
#[derive(Debug, PartialEq, Clone, Copy)]
enum ActiveElement {
    Node(NodeId),
    Marker,
}

/// Defines the scopes for element_in_scope
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Default,
    ListItem,
    Button,
    Table,
    TableRow,
    TableBody,
    Select,
}

/// Options for the parser
pub struct Html5ParserOptions {
    /// Scripting changes how <noscript> and friends build the tree; no
    /// scripts are ever executed.
    pub scripting_enabled: bool,
    /// Initial value of the frameset-ok flag
    pub frameset_ok: bool,
    /// Parse as a fragment even through the document entry point
    pub fragment: bool,
    /// Cap on the tokenizer's live buffer window; 0 means unbounded
    pub max_buf: usize,
}

impl Default for Html5ParserOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            frameset_ok: true,
            fragment: false,
            max_buf: 0,
        }
    }
}

/// The main parser object
pub struct Html5Parser<R: Read> {
    /// tokenizer object
    tokenizer: Tokenizer<R>,
    /// The document under construction; owner of all nodes
    doc: Document,
    /// Current token from the tokenizer
    tok: Token,
    /// Set between reading a self-closing tag and acknowledging it
    has_self_closing_token: bool,
    /// Stack of open elements
    open_elements: Vec<NodeId>,
    /// List of active formatting elements and markers
    active_formatting_elements: Vec<ActiveElement>,
    /// Current head element
    head: Option<NodeId>,
    /// Current form element (not nested)
    form: Option<NodeId>,
    /// If true, scripting is enabled
    scripting: bool,
    /// If true, we can still insert a frameset
    frameset_ok: bool,
    /// Foster parenting redirects insertions out of table internals
    foster_parenting: bool,
    /// Quirks mode, as derived from the doctype
    quirks: bool,
    /// Whether this is fragment parsing
    fragment: bool,
    /// Context element for fragment parsing
    context: Option<NodeId>,
    /// Current insertion mode
    insertion_mode: InsertionMode,
    /// Insertion mode to return to after the text mode completes
    original_insertion_mode: Option<InsertionMode>,
    /// Stack of template insertion modes
    template_insertion_mode: Vec<InsertionMode>,
    /// Recovered parse errors
    errors: Vec<ParseError>,
    /// Byte offset of the current token, for error reporting
    offset: usize,
}

impl<R: Read> Html5Parser<R> {
    /// Creates a parser over the given reader for whole-document parsing.
    pub fn new(reader: R, options: Html5ParserOptions) -> Self {
        let mut tokenizer = Tokenizer::new(reader);
        tokenizer.set_max_buf(options.max_buf);
        Self::init(tokenizer, options)
    }

    fn init(tokenizer: Tokenizer<R>, options: Html5ParserOptions) -> Self {
        Self {
            tokenizer,
            doc: Document::new(),
            tok: Token::default(),
            has_self_closing_token: false,
            open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head: None,
            form: None,
            scripting: options.scripting_enabled,
            frameset_ok: options.frameset_ok,
            foster_parenting: false,
            quirks: false,
            fragment: options.fragment,
            context: None,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_mode: Vec::new(),
            errors: Vec::new(),
            offset: 0,
        }
    }

    /// Parses the whole input into a document. The resulting tree always has
    /// html, head and body elements, even for empty input.
    pub fn parse(mut self) -> Result<Document> {
        self.run()?;
        self.doc.quirks = self.quirks;
        Ok(self.doc)
    }

    /// Parses the whole input, also returning the recovered parse errors.
    pub fn parse_with_errors(mut self) -> Result<(Document, Vec<ParseError>)> {
        self.run()?;
        self.doc.quirks = self.quirks;
        Ok((self.doc, self.errors))
    }

    /// Parses a fragment of HTML in the context of the given element, the way
    /// innerHTML does. Returns the document owning the nodes plus the ids of
    /// the parsed top-level nodes.
    ///
    /// Fails with [`Error::InconsistentNode`] when the context node is not an
    /// element or its atom disagrees with its name.
    pub fn parse_fragment(
        reader: R,
        context: Option<&Node>,
        options: Html5ParserOptions,
    ) -> Result<(Document, Vec<NodeId>)> {
        // https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments
        let mut context_tag = String::new();
        if let Some(node) = context {
            if node.kind != NodeKind::Element || node.atom != Atom::lookup(node.data.as_bytes()) {
                return Err(Error::InconsistentNode {
                    atom: node.atom,
                    data: node.data.clone(),
                });
            }
            context_tag = node.atom.as_str().to_string();
        }

        let foreign_context = context.is_some_and(|n| n.namespace != Namespace::None);
        let mut tokenizer = if foreign_context {
            Tokenizer::new(reader)
        } else {
            Tokenizer::new_fragment(reader, &context_tag)
        };
        tokenizer.set_max_buf(options.max_buf);

        let mut parser = Self::init(tokenizer, options);
        parser.fragment = true;

        // The context element joins the arena detached; only its own fields
        // carry over, never any caller-side links.
        let context_id = context.map(|node| {
            parser.doc.add_node(Node {
                kind: node.kind,
                atom: node.atom,
                data: node.data.clone(),
                namespace: node.namespace,
                attrs: node.attrs.clone(),
                ..Default::default()
            })
        });
        parser.context = context_id;

        let root = parser.doc.add_node(Node::new_element("html", vec![]));
        let doc_root = parser.doc.root();
        parser.doc.append_child(doc_root, root);
        parser.open_elements.push(root);

        if context.is_some_and(|n| n.atom == atom::TEMPLATE) {
            parser.template_insertion_mode.push(InsertionMode::InTemplate);
        }

        parser.reset_insertion_mode();

        // The form pointer picks up the nearest enclosing form, including the
        // context element itself.
        let mut n = context_id;
        while let Some(id) = n {
            let node = parser.doc.node(id);
            if node.kind == NodeKind::Element && node.atom == atom::FORM {
                parser.form = Some(id);
                break;
            }
            n = node.parent;
        }

        parser.run()?;

        let parent = if context_id.is_some() {
            root
        } else {
            parser.doc.root()
        };
        let mut result = vec![];
        for child in parser.doc.children(parent) {
            parser.doc.remove_child(parent, child);
            result.push(child);
        }
        Ok((parser.doc, result))
    }

    /// The parse errors recovered so far.
    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The main loop: tokenize and dispatch until the tokenizer reports the
    /// end of its input.
    fn run(&mut self) -> Result<()> {
        loop {
            // CDATA sections are only allowed in foreign content.
            let allow_cdata = self
                .open_elements
                .last()
                .is_some_and(|&n| self.doc.node(n).namespace != Namespace::None);
            self.tokenizer.set_allow_cdata(allow_cdata);

            self.tokenizer.next();
            let raw_len = self.tokenizer.raw().len();
            self.tok = self.tokenizer.token();
            self.offset += raw_len;
            if self.tok.kind == TokenKind::Error {
                match self.tokenizer.take_err() {
                    None | Some(Error::Eof) => {
                        self.parse_current_token();
                        return Ok(());
                    }
                    Some(e) => return Err(e),
                }
            }
            self.parse_current_token();
        }
    }

    /// Runs the current token through the dispatcher until a mode consumes it.
    fn parse_current_token(&mut self) {
        if self.tok.kind == TokenKind::SelfClosingTag {
            self.has_self_closing_token = true;
            self.tok.kind = TokenKind::StartTag;
        }

        let mut consumed = false;
        while !consumed {
            consumed = if self.in_foreign_content() {
                self.parse_foreign_content()
            } else {
                self.dispatch()
            };
        }

        if self.has_self_closing_token {
            self.parse_error("unacknowledged self-closing tag");
            self.has_self_closing_token = false;
        }
    }

    fn dispatch(&mut self) -> bool {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial(),
            InsertionMode::BeforeHtml => self.handle_before_html(),
            InsertionMode::BeforeHead => self.handle_before_head(),
            InsertionMode::InHead => self.handle_in_head(),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript(),
            InsertionMode::AfterHead => self.handle_after_head(),
            InsertionMode::InBody => self.handle_in_body(),
            InsertionMode::Text => self.handle_text(),
            InsertionMode::InTable => self.handle_in_table(),
            InsertionMode::InCaption => self.handle_in_caption(),
            InsertionMode::InColumnGroup => self.handle_in_column_group(),
            InsertionMode::InTableBody => self.handle_in_table_body(),
            InsertionMode::InRow => self.handle_in_row(),
            InsertionMode::InCell => self.handle_in_cell(),
            InsertionMode::InSelect => self.handle_in_select(),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table(),
            InsertionMode::InTemplate => self.handle_in_template(),
            InsertionMode::AfterBody => self.handle_after_body(),
            InsertionMode::InFrameset => self.handle_in_frameset(),
            InsertionMode::AfterFrameset => self.handle_after_frameset(),
            InsertionMode::AfterAfterBody => self.handle_after_after_body(),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset(),
        }
    }

    fn parse_error(&mut self, message: &str) {
        warn!("parse error at byte {}: {}", self.offset, message);
        self.errors.push(ParseError {
            message: message.to_string(),
            offset: self.offset,
        });
    }

    fn node(&self, id: NodeId) -> &Node {
        self.doc.node(id)
    }

    /// The current node: the top of the open-elements stack, or the document
    /// root when the stack is empty.
    fn top(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn open_elements_has(&self, tag: Atom) -> bool {
        self.open_elements.iter().any(|&id| self.node(id).atom == tag)
    }

    fn open_elements_remove(&mut self, id: NodeId) {
        if let Some(pos) = self.open_elements.iter().position(|&n| n == id) {
            self.open_elements.remove(pos);
        }
    }

    fn active_formatting_elements_index(&self, id: NodeId) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .position(|&e| e == ActiveElement::Node(id))
    }

    fn active_formatting_elements_remove(&mut self, id: NodeId) {
        if let Some(pos) = self.active_formatting_elements_index(id) {
            self.active_formatting_elements.remove(pos);
        }
    }

    /// Adds an already-created (detached) node at the current insertion
    /// point, honoring foster parenting, and opens it if it is an element.
    fn add_child_id(&mut self, id: NodeId) {
        if self.should_foster_parent() {
            self.foster_parent(id);
        } else {
            let top = self.top();
            self.doc.append_child(top, id);
        }
        if self.node(id).kind == NodeKind::Element {
            self.open_elements.push(id);
        }
    }

    fn add_child(&mut self, node: Node) -> NodeId {
        let id = self.doc.add_node(node);
        self.add_child_id(id);
        id
    }

    /// Whether the next node to be added should be foster parented.
    fn should_foster_parent(&self) -> bool {
        self.foster_parenting
            && matches!(
                self.node(self.top()).atom,
                atom::TABLE | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TR
            )
    }

    /// Adds a node according to the foster parenting rules: into an open
    /// template above the table, or immediately before the table.
    fn foster_parent(&mut self, n: NodeId) {
        let table_idx = (0..self.open_elements.len())
            .rev()
            .find(|&i| self.node(self.open_elements[i]).atom == atom::TABLE);
        let template_idx = (0..self.open_elements.len())
            .rev()
            .find(|&i| self.node(self.open_elements[i]).atom == atom::TEMPLATE);

        if let Some(j) = template_idx {
            if table_idx.map_or(true, |i| j > i) {
                let template = self.open_elements[j];
                self.doc.append_child(template, n);
                return;
            }
        }

        let table = table_idx.map(|i| self.open_elements[i]);
        let parent = match table {
            None => self.open_elements[0],
            Some(t) => match self.node(t).parent {
                Some(p) => p,
                // The table has no parent; insert below it in the stack.
                None => self.open_elements[table_idx.unwrap() - 1],
            },
        };

        let prev = match table {
            Some(t) => self.node(t).prev,
            None => self.node(parent).last_child,
        };
        if let Some(prev) = prev {
            if self.node(prev).kind == NodeKind::Text && self.node(n).kind == NodeKind::Text {
                let text = self.node(n).data.clone();
                self.doc.node_mut(prev).data.push_str(&text);
                return;
            }
        }

        let before = table.filter(|&t| self.node(t).parent == Some(parent));
        self.doc.insert_before(parent, n, before);
    }

    /// Adds text at the current insertion point, coalescing with an adjacent
    /// text sibling.
    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.should_foster_parent() {
            let id = self.doc.add_node(Node::new_text(text));
            self.foster_parent(id);
            return;
        }
        let top = self.top();
        if let Some(last) = self.node(top).last_child {
            if self.node(last).kind == NodeKind::Text {
                self.doc.node_mut(last).data.push_str(text);
                return;
            }
        }
        let id = self.doc.add_node(Node::new_text(text));
        self.add_child_id(id);
    }

    /// Adds an element based on the current token.
    fn add_element(&mut self) -> NodeId {
        self.add_child(Node {
            kind: NodeKind::Element,
            atom: self.tok.atom,
            data: self.tok.data.clone(),
            attrs: self.tok.attrs.clone(),
            ..Default::default()
        })
    }

    fn add_comment(&mut self, parent: NodeId) {
        let id = self.doc.add_node(Node::new_comment(&self.tok.data));
        self.doc.append_child(parent, id);
    }

    /// Adds an element and puts it on the list of active formatting elements,
    /// applying the Noah's Ark clause (at most three identical entries per
    /// marker group).
    fn add_formatting_element(&mut self) {
        let tag_atom = self.tok.atom;
        let attrs = self.tok.attrs.clone();
        self.add_element();

        let mut identical = 0;
        for i in (0..self.active_formatting_elements.len()).rev() {
            let ActiveElement::Node(id) = self.active_formatting_elements[i] else {
                break;
            };
            let n = self.node(id);
            if n.kind != NodeKind::Element
                || n.namespace != Namespace::None
                || n.atom != tag_atom
                || n.attrs.len() != attrs.len()
            {
                continue;
            }
            let all_match = n
                .attrs
                .iter()
                .all(|t0| attrs.iter().any(|t1| t0 == t1));
            if !all_match {
                continue;
            }
            identical += 1;
            if identical >= 3 {
                self.active_formatting_elements.remove(i);
            }
        }

        let top = self.top();
        self.active_formatting_elements.push(ActiveElement::Node(top));
    }

    /// Pops entries off the active formatting elements list up to and
    /// including the last marker.
    fn clear_active_formatting_elements(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if entry == ActiveElement::Marker {
                return;
            }
        }
    }

    /// Re-opens formatting elements that were implicitly closed, cloning each
    /// entry after the last marker or open element.
    fn reconstruct_active_formatting_elements(&mut self) {
        let Some(&entry) = self.active_formatting_elements.last() else {
            return;
        };
        if let ActiveElement::Node(n) = entry {
            if self.open_elements.contains(&n) {
                return;
            }
        } else {
            return;
        }

        let mut i = self.active_formatting_elements.len() as isize - 1;
        loop {
            match self.active_formatting_elements[i as usize] {
                ActiveElement::Marker => break,
                ActiveElement::Node(n) if self.open_elements.contains(&n) => break,
                ActiveElement::Node(_) => {}
            }
            if i == 0 {
                i = -1;
                break;
            }
            i -= 1;
        }

        loop {
            i += 1;
            let ActiveElement::Node(n) = self.active_formatting_elements[i as usize] else {
                panic!("bad parser state: marker in reconstruct range");
            };
            let clone = self.doc.clone_node(n);
            let id = self.add_child(clone);
            self.active_formatting_elements[i as usize] = ActiveElement::Node(id);
            if i as usize == self.active_formatting_elements.len() - 1 {
                break;
            }
        }
    }

    fn acknowledge_self_closing_tag(&mut self) {
        self.has_self_closing_token = false;
    }

    /// Walks the stack of open elements top-down, looking for the first match
    /// of `match_atoms` before a scope-stop element intervenes.
    fn index_of_element_in_scope(&self, scope: Scope, match_atoms: &[Atom]) -> Option<usize> {
        for i in (0..self.open_elements.len()).rev() {
            let node = self.node(self.open_elements[i]);
            let tag_atom = node.atom;
            if node.namespace == Namespace::None {
                if match_atoms.contains(&tag_atom) {
                    return Some(i);
                }
                match scope {
                    Scope::Default => {}
                    Scope::ListItem => {
                        if tag_atom == atom::OL || tag_atom == atom::UL {
                            return None;
                        }
                    }
                    Scope::Button => {
                        if tag_atom == atom::BUTTON {
                            return None;
                        }
                    }
                    Scope::Table => {
                        if matches!(tag_atom, atom::HTML | atom::TABLE | atom::TEMPLATE) {
                            return None;
                        }
                    }
                    Scope::TableRow => {
                        if matches!(tag_atom, atom::HTML | atom::TR | atom::TEMPLATE) {
                            return None;
                        }
                    }
                    Scope::TableBody => {
                        if matches!(
                            tag_atom,
                            atom::HTML | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TEMPLATE
                        ) {
                            return None;
                        }
                    }
                    Scope::Select => {
                        if !matches!(tag_atom, atom::OPTGROUP | atom::OPTION) {
                            return None;
                        }
                    }
                }
                if matches!(scope, Scope::Default | Scope::ListItem | Scope::Button)
                    && matches!(
                        tag_atom,
                        atom::APPLET
                            | atom::CAPTION
                            | atom::HTML
                            | atom::TABLE
                            | atom::TD
                            | atom::TH
                            | atom::MARQUEE
                            | atom::OBJECT
                            | atom::TEMPLATE
                    )
                {
                    return None;
                }
            } else if matches!(scope, Scope::Default | Scope::ListItem | Scope::Button) {
                // The MathML and SVG stop set always applies to these scopes.
                match node.namespace {
                    Namespace::Math => {
                        if matches!(
                            node.data.as_str(),
                            "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"
                        ) {
                            return None;
                        }
                    }
                    Namespace::Svg => {
                        if matches!(node.data.as_str(), "foreignObject" | "desc" | "title") {
                            return None;
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    fn element_in_scope(&self, scope: Scope, match_atoms: &[Atom]) -> bool {
        self.index_of_element_in_scope(scope, match_atoms).is_some()
    }

    /// Pops elements until one of `match_atoms` is popped (inclusive), if
    /// such an element is in the given scope. Returns whether anything popped.
    fn pop_until(&mut self, scope: Scope, match_atoms: &[Atom]) -> bool {
        if let Some(i) = self.index_of_element_in_scope(scope, match_atoms) {
            self.open_elements.truncate(i);
            return true;
        }
        false
    }

    /// Pops elements until the top of the stack is a context boundary for the
    /// given table scope.
    fn clear_stack_to_context(&mut self, scope: Scope) {
        for i in (0..self.open_elements.len()).rev() {
            let tag_atom = self.node(self.open_elements[i]).atom;
            let stop = match scope {
                Scope::Table => matches!(tag_atom, atom::HTML | atom::TABLE | atom::TEMPLATE),
                Scope::TableRow => matches!(tag_atom, atom::HTML | atom::TR | atom::TEMPLATE),
                Scope::TableBody => matches!(
                    tag_atom,
                    atom::HTML | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TEMPLATE
                ),
                _ => panic!("bad parser state: clear_stack_to_context {scope:?}"),
            };
            if stop {
                self.open_elements.truncate(i + 1);
                return;
            }
        }
    }

    /// Pops the implied end tags (dd, dt, li, optgroup, option, p, rb, rp,
    /// rt, rtc), except for any element whose name is in `exceptions`.
    fn generate_implied_end_tags(&mut self, exceptions: &[&str]) {
        let mut i = self.open_elements.len();
        while i > 0 {
            let node = self.node(self.open_elements[i - 1]);
            if node.kind != NodeKind::Element {
                break;
            }
            match node.atom {
                atom::DD
                | atom::DT
                | atom::LI
                | atom::OPTGROUP
                | atom::OPTION
                | atom::P
                | atom::RB
                | atom::RP
                | atom::RT
                | atom::RTC => {
                    if exceptions.contains(&node.data.as_str()) {
                        break;
                    }
                    i -= 1;
                }
                _ => break,
            }
        }
        self.open_elements.truncate(i);
    }

    /// Saves the insertion mode to return to when the text mode finishes.
    /// Setting it twice is a programming error.
    fn set_original_insertion_mode(&mut self) {
        if self.original_insertion_mode.is_some() {
            panic!("bad parser state: original_insertion_mode was set twice");
        }
        self.original_insertion_mode = Some(self.insertion_mode);
    }

    /// Sets the insertion mode appropriately from the stack of open elements
    /// (and the fragment context, if any).
    fn reset_insertion_mode(&mut self) {
        for i in (0..self.open_elements.len()).rev() {
            let mut n = self.open_elements[i];
            let last = i == 0;
            if last {
                if let Some(context) = self.context {
                    n = context;
                }
            }
            match self.node(n).atom {
                atom::SELECT => {
                    if !last {
                        let mut ancestor = n;
                        let first = self.open_elements[0];
                        while ancestor != first {
                            let idx = self
                                .open_elements
                                .iter()
                                .position(|&id| id == ancestor)
                                .expect("ancestor not on open-elements stack");
                            ancestor = self.open_elements[idx - 1];
                            match self.node(ancestor).atom {
                                atom::TEMPLATE => {
                                    self.insertion_mode = InsertionMode::InSelect;
                                    return;
                                }
                                atom::TABLE => {
                                    self.insertion_mode = InsertionMode::InSelectInTable;
                                    return;
                                }
                                _ => {}
                            }
                        }
                    }
                    self.insertion_mode = InsertionMode::InSelect;
                }
                atom::TD | atom::TH => self.insertion_mode = InsertionMode::InCell,
                atom::TR => self.insertion_mode = InsertionMode::InRow,
                atom::TBODY | atom::THEAD | atom::TFOOT => self.insertion_mode = InsertionMode::InTableBody,
                atom::CAPTION => self.insertion_mode = InsertionMode::InCaption,
                atom::COLGROUP => self.insertion_mode = InsertionMode::InColumnGroup,
                atom::TABLE => self.insertion_mode = InsertionMode::InTable,
                atom::TEMPLATE => {
                    if self.node(n).namespace != Namespace::None {
                        continue;
                    }
                    self.insertion_mode = *self
                        .template_insertion_mode
                        .last()
                        .expect("template on stack without template insertion mode");
                }
                atom::HEAD => self.insertion_mode = InsertionMode::InHead,
                atom::BODY => self.insertion_mode = InsertionMode::InBody,
                atom::FRAMESET => self.insertion_mode = InsertionMode::InFrameset,
                atom::HTML => {
                    self.insertion_mode = if self.head.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                }
                _ => {
                    if last {
                        self.insertion_mode = InsertionMode::InBody;
                        return;
                    }
                    continue;
                }
            }
            return;
        }
    }

    /// Runs a synthesized token through the parser, then restores the real
    /// current token.
    fn parse_implied_token(&mut self, kind: TokenKind, tag: Atom) {
        let real_token = std::mem::take(&mut self.tok);
        let self_closing = self.has_self_closing_token;
        self.tok = Token {
            kind,
            atom: tag,
            data: tag.as_str().to_string(),
            attrs: vec![],
        };
        self.has_self_closing_token = false;
        self.parse_current_token();
        self.tok = real_token;
        self.has_self_closing_token = self_closing;
    }

    /// Copies attributes of the current token onto `dst`, without replacing
    /// ones already present.
    fn copy_attributes(&mut self, dst: NodeId) {
        if self.tok.attrs.is_empty() {
            return;
        }
        for attr in self.tok.attrs.clone() {
            if !self.node(dst).attrs.iter().any(|a| a.name == attr.name) {
                self.doc.node_mut(dst).attrs.push(attr);
            }
        }
    }

    /// Enters the text mode for a generic raw text element like <style>.
    fn parse_generic_raw_text_element(&mut self) {
        self.add_element();
        self.original_insertion_mode = Some(self.insertion_mode);
        self.insertion_mode = InsertionMode::Text;
    }

    fn handle_initial(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                self.tok.data = self.tok.data.trim_start_matches(WHITESPACE).to_string();
                if self.tok.data.is_empty() {
                    // It was all whitespace, so ignore it.
                    return true;
                }
            }
            TokenKind::Comment => {
                let root = self.doc.root();
                self.add_comment(root);
                return true;
            }
            TokenKind::Doctype => {
                let (node, quirks) = parse_doctype(&self.tok.data);
                if quirks {
                    self.parse_error("quirky doctype");
                }
                let id = self.doc.add_node(node);
                let root = self.doc.root();
                self.doc.append_child(root, id);
                self.quirks = quirks;
                self.insertion_mode = InsertionMode::BeforeHtml;
                return true;
            }
            _ => {}
        }
        self.parse_error("expected doctype");
        self.quirks = true;
        self.insertion_mode = InsertionMode::BeforeHtml;
        false
    }

    fn handle_before_html(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            TokenKind::Text => {
                self.tok.data = self.tok.data.trim_start_matches(WHITESPACE).to_string();
                if self.tok.data.is_empty() {
                    return true;
                }
            }
            TokenKind::StartTag => {
                if self.tok.atom == atom::HTML {
                    self.add_element();
                    self.insertion_mode = InsertionMode::BeforeHead;
                    return true;
                }
            }
            TokenKind::EndTag => match self.tok.atom {
                atom::HEAD | atom::BODY | atom::HTML | atom::BR => {
                    self.parse_implied_token(TokenKind::StartTag, atom::HTML);
                    return false;
                }
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Comment => {
                let root = self.doc.root();
                self.add_comment(root);
                return true;
            }
            _ => {}
        }
        self.parse_implied_token(TokenKind::StartTag, atom::HTML);
        false
    }

    fn handle_before_head(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                self.tok.data = self.tok.data.trim_start_matches(WHITESPACE).to_string();
                if self.tok.data.is_empty() {
                    return true;
                }
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HEAD => {
                    self.add_element();
                    self.head = Some(self.top());
                    self.insertion_mode = InsertionMode::InHead;
                    return true;
                }
                atom::HTML => return self.handle_in_body(),
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::HEAD | atom::BODY | atom::HTML | atom::BR => {}
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            _ => {}
        }
        self.parse_implied_token(TokenKind::StartTag, atom::HEAD);
        false
    }

    fn handle_in_head(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                let data = std::mem::take(&mut self.tok.data);
                let rest = data.trim_start_matches(WHITESPACE);
                if rest.len() < data.len() {
                    // Add the initial whitespace to the current node.
                    let ws = &data[..data.len() - rest.len()];
                    self.add_text(ws);
                    if rest.is_empty() {
                        return true;
                    }
                }
                self.tok.data = rest.to_string();
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::BASE | atom::BASEFONT | atom::BGSOUND | atom::LINK | atom::META => {
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                    return true;
                }
                atom::NOSCRIPT => {
                    if self.scripting {
                        self.parse_generic_raw_text_element();
                        return true;
                    }
                    self.add_element();
                    self.insertion_mode = InsertionMode::InHeadNoscript;
                    // Don't let the tokenizer go into raw text mode when
                    // scripting is disabled.
                    self.tokenizer.next_is_not_raw_text();
                    return true;
                }
                atom::SCRIPT | atom::TITLE => {
                    self.add_element();
                    self.set_original_insertion_mode();
                    self.insertion_mode = InsertionMode::Text;
                    return true;
                }
                atom::NOFRAMES | atom::STYLE => {
                    self.parse_generic_raw_text_element();
                    return true;
                }
                atom::HEAD => {
                    // Ignore the token.
                    return true;
                }
                atom::TEMPLATE => {
                    self.add_element();
                    self.active_formatting_elements.push(ActiveElement::Marker);
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InTemplate;
                    self.template_insertion_mode.push(InsertionMode::InTemplate);
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::HEAD => {
                    self.open_elements.pop();
                    self.insertion_mode = InsertionMode::AfterHead;
                    return true;
                }
                atom::BODY | atom::HTML | atom::BR => {
                    self.parse_implied_token(TokenKind::EndTag, atom::HEAD);
                    return false;
                }
                atom::TEMPLATE => {
                    if !self.open_elements_has(atom::TEMPLATE) {
                        return true;
                    }
                    self.generate_implied_end_tags(&[]);
                    for i in (0..self.open_elements.len()).rev() {
                        let n = self.node(self.open_elements[i]);
                        if n.namespace == Namespace::None && n.atom == atom::TEMPLATE {
                            self.open_elements.truncate(i);
                            break;
                        }
                    }
                    self.clear_active_formatting_elements();
                    self.template_insertion_mode.pop();
                    self.reset_insertion_mode();
                    return true;
                }
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            _ => {}
        }
        self.parse_implied_token(TokenKind::EndTag, atom::HEAD);
        false
    }

    fn handle_in_head_noscript(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::BASEFONT
                | atom::BGSOUND
                | atom::LINK
                | atom::META
                | atom::NOFRAMES
                | atom::STYLE => return self.handle_in_head(),
                atom::HEAD | atom::NOSCRIPT => {
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::NOSCRIPT | atom::BR => {}
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Text => {
                if self.tok.data.trim_start_matches(WHITESPACE).is_empty() {
                    return self.handle_in_head();
                }
            }
            TokenKind::Comment => return self.handle_in_head(),
            _ => {}
        }
        self.open_elements.pop();
        if self.node(self.top()).atom != atom::HEAD {
            panic!("bad parser state: the new current node will be a head element");
        }
        self.insertion_mode = InsertionMode::InHead;
        self.tok.atom == atom::NOSCRIPT
    }

    fn handle_after_head(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                let data = std::mem::take(&mut self.tok.data);
                let rest = data.trim_start_matches(WHITESPACE);
                if rest.len() < data.len() {
                    let ws = &data[..data.len() - rest.len()];
                    self.add_text(ws);
                    if rest.is_empty() {
                        return true;
                    }
                }
                self.tok.data = rest.to_string();
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::BODY => {
                    self.add_element();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InBody;
                    return true;
                }
                atom::FRAMESET => {
                    self.add_element();
                    self.insertion_mode = InsertionMode::InFrameset;
                    return true;
                }
                atom::BASE
                | atom::BASEFONT
                | atom::BGSOUND
                | atom::LINK
                | atom::META
                | atom::NOFRAMES
                | atom::SCRIPT
                | atom::STYLE
                | atom::TEMPLATE
                | atom::TITLE => {
                    let head = self.head.expect("head element not created");
                    self.open_elements.push(head);
                    let consumed = self.handle_in_head();
                    self.open_elements_remove(head);
                    return consumed;
                }
                atom::HEAD => {
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::BODY | atom::HTML | atom::BR => {}
                atom::TEMPLATE => return self.handle_in_head(),
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            _ => {}
        }
        self.parse_implied_token(TokenKind::StartTag, atom::BODY);
        self.frameset_ok = true;
        false
    }

    fn handle_in_body(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                let mut d = std::mem::take(&mut self.tok.data);
                let n = self.top();
                if matches!(self.node(n).atom, atom::PRE | atom::LISTING)
                    && self.node(n).first_child.is_none()
                {
                    // Ignore a newline at the start of a <pre> block.
                    if let Some(rest) = d.strip_prefix('\r') {
                        d = rest.to_string();
                    }
                    if let Some(rest) = d.strip_prefix('\n') {
                        d = rest.to_string();
                    }
                }
                d = d.replace('\0', "");
                if d.is_empty() {
                    return true;
                }
                self.reconstruct_active_formatting_elements();
                self.add_text(&d);
                if self.frameset_ok && !d.trim_start_matches(WHITESPACE).is_empty() {
                    // There were non-whitespace characters inserted.
                    self.frameset_ok = false;
                }
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => {
                    if self.open_elements_has(atom::TEMPLATE) {
                        return true;
                    }
                    self.copy_attributes(self.open_elements[0]);
                }
                atom::BASE
                | atom::BASEFONT
                | atom::BGSOUND
                | atom::LINK
                | atom::META
                | atom::NOFRAMES
                | atom::SCRIPT
                | atom::STYLE
                | atom::TEMPLATE
                | atom::TITLE => {
                    return self.handle_in_head();
                }
                atom::BODY => {
                    if self.open_elements_has(atom::TEMPLATE) {
                        return true;
                    }
                    if self.open_elements.len() >= 2 {
                        let body = self.open_elements[1];
                        if self.node(body).kind == NodeKind::Element
                            && self.node(body).atom == atom::BODY
                        {
                            self.frameset_ok = false;
                            self.copy_attributes(body);
                        }
                    }
                }
                atom::FRAMESET => {
                    if !self.frameset_ok
                        || self.open_elements.len() < 2
                        || self.node(self.open_elements[1]).atom != atom::BODY
                    {
                        // Ignore the token.
                        return true;
                    }
                    let body = self.open_elements[1];
                    if self.node(body).parent.is_some() {
                        self.doc.detach(body);
                    }
                    self.open_elements.truncate(1);
                    self.add_element();
                    self.insertion_mode = InsertionMode::InFrameset;
                    return true;
                }
                atom::ADDRESS
                | atom::ARTICLE
                | atom::ASIDE
                | atom::BLOCKQUOTE
                | atom::CENTER
                | atom::DETAILS
                | atom::DIALOG
                | atom::DIR
                | atom::DIV
                | atom::DL
                | atom::FIELDSET
                | atom::FIGCAPTION
                | atom::FIGURE
                | atom::FOOTER
                | atom::HEADER
                | atom::HGROUP
                | atom::MAIN
                | atom::MENU
                | atom::NAV
                | atom::OL
                | atom::P
                | atom::SECTION
                | atom::SUMMARY
                | atom::UL => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                }
                atom::H1 | atom::H2 | atom::H3 | atom::H4 | atom::H5 | atom::H6 => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    if matches!(
                        self.node(self.top()).atom,
                        atom::H1 | atom::H2 | atom::H3 | atom::H4 | atom::H5 | atom::H6
                    ) {
                        self.open_elements.pop();
                    }
                    self.add_element();
                }
                atom::PRE | atom::LISTING => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                    // The newline, if any, is dealt with by the text case.
                    self.frameset_ok = false;
                }
                atom::FORM => {
                    if self.form.is_some() && !self.open_elements_has(atom::TEMPLATE) {
                        // Ignore the token.
                        return true;
                    }
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                    if !self.open_elements_has(atom::TEMPLATE) {
                        self.form = Some(self.top());
                    }
                }
                atom::LI => {
                    self.frameset_ok = false;
                    for i in (0..self.open_elements.len()).rev() {
                        let node = self.node(self.open_elements[i]);
                        match node.atom {
                            atom::LI => self.open_elements.truncate(i),
                            atom::ADDRESS | atom::DIV | atom::P => continue,
                            _ => {
                                if !node.is_special() {
                                    continue;
                                }
                            }
                        }
                        break;
                    }
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                }
                atom::DD | atom::DT => {
                    self.frameset_ok = false;
                    for i in (0..self.open_elements.len()).rev() {
                        let node = self.node(self.open_elements[i]);
                        match node.atom {
                            atom::DD | atom::DT => self.open_elements.truncate(i),
                            atom::ADDRESS | atom::DIV | atom::P => continue,
                            _ => {
                                if !node.is_special() {
                                    continue;
                                }
                            }
                        }
                        break;
                    }
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                }
                atom::PLAINTEXT => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                }
                atom::BUTTON => {
                    self.pop_until(Scope::Default, &[atom::BUTTON]);
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.frameset_ok = false;
                }
                atom::A => {
                    for i in (0..self.active_formatting_elements.len()).rev() {
                        let ActiveElement::Node(id) = self.active_formatting_elements[i] else {
                            break;
                        };
                        let n = self.node(id);
                        if n.kind == NodeKind::Element && n.atom == atom::A {
                            self.in_body_end_tag_formatting(atom::A, "a");
                            self.open_elements_remove(id);
                            self.active_formatting_elements_remove(id);
                            break;
                        }
                    }
                    self.reconstruct_active_formatting_elements();
                    self.add_formatting_element();
                }
                atom::B
                | atom::BIG
                | atom::CODE
                | atom::EM
                | atom::FONT
                | atom::I
                | atom::S
                | atom::SMALL
                | atom::STRIKE
                | atom::STRONG
                | atom::TT
                | atom::U => {
                    self.reconstruct_active_formatting_elements();
                    self.add_formatting_element();
                }
                atom::NOBR => {
                    self.reconstruct_active_formatting_elements();
                    if self.element_in_scope(Scope::Default, &[atom::NOBR]) {
                        self.in_body_end_tag_formatting(atom::NOBR, "nobr");
                        self.reconstruct_active_formatting_elements();
                    }
                    self.add_formatting_element();
                }
                atom::APPLET | atom::MARQUEE | atom::OBJECT => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.active_formatting_elements.push(ActiveElement::Marker);
                    self.frameset_ok = false;
                }
                atom::TABLE => {
                    if !self.quirks {
                        self.pop_until(Scope::Button, &[atom::P]);
                    }
                    self.add_element();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InTable;
                    return true;
                }
                atom::AREA
                | atom::BR
                | atom::EMBED
                | atom::IMG
                | atom::INPUT
                | atom::KEYGEN
                | atom::WBR => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                    if self.tok.atom == atom::INPUT {
                        for attr in &self.tok.attrs {
                            if attr.name == "type" && attr.value.eq_ignore_ascii_case("hidden") {
                                // Skip setting frameset_ok to false.
                                return true;
                            }
                        }
                    }
                    self.frameset_ok = false;
                }
                atom::PARAM | atom::SOURCE | atom::TRACK => {
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                }
                atom::HR => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                    self.frameset_ok = false;
                }
                atom::IMAGE => {
                    self.parse_error("image start tag rewritten to img");
                    self.tok.atom = atom::IMG;
                    self.tok.data = atom::IMG.as_str().to_string();
                    return false;
                }
                atom::TEXTAREA => {
                    self.add_element();
                    self.set_original_insertion_mode();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::Text;
                }
                atom::XMP => {
                    self.pop_until(Scope::Button, &[atom::P]);
                    self.reconstruct_active_formatting_elements();
                    self.frameset_ok = false;
                    self.parse_generic_raw_text_element();
                }
                atom::IFRAME => {
                    self.frameset_ok = false;
                    self.parse_generic_raw_text_element();
                }
                atom::NOEMBED => {
                    self.parse_generic_raw_text_element();
                }
                atom::NOSCRIPT => {
                    if self.scripting {
                        self.parse_generic_raw_text_element();
                        return true;
                    }
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    // Don't let the tokenizer go into raw text mode when
                    // scripting is disabled.
                    self.tokenizer.next_is_not_raw_text();
                }
                atom::SELECT => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InSelect;
                    return true;
                }
                atom::OPTGROUP | atom::OPTION => {
                    if self.node(self.top()).atom == atom::OPTION {
                        self.open_elements.pop();
                    }
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                }
                atom::RB | atom::RTC => {
                    if self.element_in_scope(Scope::Default, &[atom::RUBY]) {
                        self.generate_implied_end_tags(&[]);
                    }
                    self.add_element();
                }
                atom::RP | atom::RT => {
                    if self.element_in_scope(Scope::Default, &[atom::RUBY]) {
                        self.generate_implied_end_tags(&["rtc"]);
                    }
                    self.add_element();
                }
                atom::MATH | atom::SVG => {
                    self.reconstruct_active_formatting_elements();
                    let namespace = if self.tok.atom == atom::MATH {
                        adjust_attribute_names(&mut self.tok.attrs, &MATHML_ADJUSTMENTS);
                        Namespace::Math
                    } else {
                        adjust_attribute_names(&mut self.tok.attrs, &SVG_ADJUSTMENTS_ATTRIBUTES);
                        Namespace::Svg
                    };
                    adjust_foreign_attributes(&mut self.tok.attrs);
                    self.add_element();
                    let top = self.top();
                    self.doc.node_mut(top).namespace = namespace;
                    if self.has_self_closing_token {
                        self.open_elements.pop();
                        self.acknowledge_self_closing_tag();
                    }
                    return true;
                }
                atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::FRAME
                | atom::HEAD
                | atom::TBODY
                | atom::TD
                | atom::TFOOT
                | atom::TH
                | atom::THEAD
                | atom::TR => {
                    // Ignore the token.
                    self.parse_error("unexpected table-structure tag in body");
                }
                _ => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                }
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::BODY => {
                    if self.element_in_scope(Scope::Default, &[atom::BODY]) {
                        self.insertion_mode = InsertionMode::AfterBody;
                    }
                }
                atom::HTML => {
                    if self.element_in_scope(Scope::Default, &[atom::BODY]) {
                        self.parse_implied_token(TokenKind::EndTag, atom::BODY);
                        return false;
                    }
                    return true;
                }
                atom::ADDRESS
                | atom::ARTICLE
                | atom::ASIDE
                | atom::BLOCKQUOTE
                | atom::BUTTON
                | atom::CENTER
                | atom::DETAILS
                | atom::DIALOG
                | atom::DIR
                | atom::DIV
                | atom::DL
                | atom::FIELDSET
                | atom::FIGCAPTION
                | atom::FIGURE
                | atom::FOOTER
                | atom::HEADER
                | atom::HGROUP
                | atom::LISTING
                | atom::MAIN
                | atom::MENU
                | atom::NAV
                | atom::OL
                | atom::PRE
                | atom::SECTION
                | atom::SUMMARY
                | atom::UL => {
                    self.pop_until(Scope::Default, &[self.tok.atom]);
                }
                atom::FORM => {
                    if self.open_elements_has(atom::TEMPLATE) {
                        let Some(i) = self.index_of_element_in_scope(Scope::Default, &[atom::FORM])
                        else {
                            // Ignore the token.
                            return true;
                        };
                        self.generate_implied_end_tags(&[]);
                        if self.node(self.open_elements[i]).atom != atom::FORM {
                            // Ignore the token.
                            return true;
                        }
                        self.pop_until(Scope::Default, &[atom::FORM]);
                    } else {
                        let node = self.form.take();
                        let i = self.index_of_element_in_scope(Scope::Default, &[atom::FORM]);
                        let matches_form = match (node, i) {
                            (Some(node), Some(i)) => self.open_elements[i] == node,
                            _ => false,
                        };
                        if !matches_form {
                            // Ignore the token.
                            return true;
                        }
                        self.generate_implied_end_tags(&[]);
                        self.open_elements_remove(node.expect("checked above"));
                    }
                }
                atom::P => {
                    if !self.element_in_scope(Scope::Button, &[atom::P]) {
                        self.parse_implied_token(TokenKind::StartTag, atom::P);
                    }
                    self.pop_until(Scope::Button, &[atom::P]);
                }
                atom::LI => {
                    self.pop_until(Scope::ListItem, &[atom::LI]);
                }
                atom::DD | atom::DT => {
                    self.pop_until(Scope::Default, &[self.tok.atom]);
                }
                atom::H1 | atom::H2 | atom::H3 | atom::H4 | atom::H5 | atom::H6 => {
                    self.pop_until(
                        Scope::Default,
                        &[atom::H1, atom::H2, atom::H3, atom::H4, atom::H5, atom::H6],
                    );
                }
                t if adoption_agency::is_formatting_tag(t) => {
                    let tag_name = self.tok.data.clone();
                    self.in_body_end_tag_formatting(t, &tag_name);
                }
                atom::APPLET | atom::MARQUEE | atom::OBJECT => {
                    if self.pop_until(Scope::Default, &[self.tok.atom]) {
                        self.clear_active_formatting_elements();
                    }
                }
                atom::BR => {
                    self.parse_error("br end tag treated as start tag");
                    self.tok.kind = TokenKind::StartTag;
                    return false;
                }
                atom::TEMPLATE => {
                    return self.handle_in_head();
                }
                _ => {
                    let tag_atom = self.tok.atom;
                    let tag_name = self.tok.data.clone();
                    self.in_body_end_tag_other(tag_atom, &tag_name);
                }
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
            }
            TokenKind::Error => {
                if !self.template_insertion_mode.is_empty() {
                    self.insertion_mode = InsertionMode::InTemplate;
                    return false;
                }
                for &e in &self.open_elements {
                    match self.node(e).atom {
                        atom::DD
                        | atom::DT
                        | atom::LI
                        | atom::OPTGROUP
                        | atom::OPTION
                        | atom::P
                        | atom::RB
                        | atom::RP
                        | atom::RT
                        | atom::RTC
                        | atom::TBODY
                        | atom::TD
                        | atom::TFOOT
                        | atom::TH
                        | atom::THEAD
                        | atom::TR
                        | atom::BODY
                        | atom::HTML => {}
                        _ => return true,
                    }
                }
            }
            _ => {}
        }
        true
    }

    fn handle_text(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Error => {
                self.open_elements.pop();
            }
            TokenKind::Text => {
                let mut d = std::mem::take(&mut self.tok.data);
                let n = self.top();
                if self.node(n).atom == atom::TEXTAREA && self.node(n).first_child.is_none() {
                    // Ignore a newline at the start of a <textarea> block.
                    if let Some(rest) = d.strip_prefix('\r') {
                        d = rest.to_string();
                    }
                    if let Some(rest) = d.strip_prefix('\n') {
                        d = rest.to_string();
                    }
                }
                if d.is_empty() {
                    return true;
                }
                self.add_text(&d);
                return true;
            }
            TokenKind::EndTag => {
                self.open_elements.pop();
            }
            _ => {}
        }
        self.insertion_mode = self.original_insertion_mode.take().expect("original_insertion_mode not saved");
        self.tok.kind == TokenKind::EndTag
    }

    fn handle_in_table(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                self.tok.data = self.tok.data.replace('\0', "");
                if matches!(
                    self.node(self.top()).atom,
                    atom::TABLE | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TR
                ) && self.tok.data.trim_matches(WHITESPACE).is_empty()
                {
                    let data = std::mem::take(&mut self.tok.data);
                    self.add_text(&data);
                    return true;
                }
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::CAPTION => {
                    self.clear_stack_to_context(Scope::Table);
                    self.active_formatting_elements.push(ActiveElement::Marker);
                    self.add_element();
                    self.insertion_mode = InsertionMode::InCaption;
                    return true;
                }
                atom::COLGROUP => {
                    self.clear_stack_to_context(Scope::Table);
                    self.add_element();
                    self.insertion_mode = InsertionMode::InColumnGroup;
                    return true;
                }
                atom::COL => {
                    self.parse_implied_token(TokenKind::StartTag, atom::COLGROUP);
                    return false;
                }
                atom::TBODY | atom::TFOOT | atom::THEAD => {
                    self.clear_stack_to_context(Scope::Table);
                    self.add_element();
                    self.insertion_mode = InsertionMode::InTableBody;
                    return true;
                }
                atom::TD | atom::TH | atom::TR => {
                    self.parse_implied_token(TokenKind::StartTag, atom::TBODY);
                    return false;
                }
                atom::TABLE => {
                    if self.pop_until(Scope::Table, &[atom::TABLE]) {
                        self.reset_insertion_mode();
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::STYLE | atom::SCRIPT | atom::TEMPLATE => {
                    return self.handle_in_head();
                }
                atom::INPUT => {
                    let hidden = self
                        .tok
                        .attrs
                        .iter()
                        .any(|a| a.name == "type" && a.value.eq_ignore_ascii_case("hidden"));
                    if hidden {
                        self.add_element();
                        self.open_elements.pop();
                        return true;
                    }
                    // Otherwise drop down to the default action.
                }
                atom::FORM => {
                    if self.open_elements_has(atom::TEMPLATE) || self.form.is_some() {
                        // Ignore the token.
                        return true;
                    }
                    self.add_element();
                    self.form = self.open_elements.pop();
                }
                atom::SELECT => {
                    self.reconstruct_active_formatting_elements();
                    if matches!(
                        self.node(self.top()).atom,
                        atom::TABLE | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TR
                    ) {
                        self.foster_parenting = true;
                    }
                    self.add_element();
                    self.foster_parenting = false;
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InSelectInTable;
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::TABLE => {
                    if self.pop_until(Scope::Table, &[atom::TABLE]) {
                        self.reset_insertion_mode();
                        return true;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::BODY
                | atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::HTML
                | atom::TBODY
                | atom::TD
                | atom::TFOOT
                | atom::TH
                | atom::THEAD
                | atom::TR => {
                    // Ignore the token.
                    return true;
                }
                atom::TEMPLATE => {
                    return self.handle_in_head();
                }
                _ => {}
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            TokenKind::Error => {
                return self.handle_in_body();
            }
            _ => {}
        }

        // Anything else is foster parented through the in-body rules.
        self.foster_parenting = true;
        let consumed = self.handle_in_body();
        self.foster_parenting = false;
        consumed
    }

    fn handle_in_caption(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::StartTag => match self.tok.atom {
                atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::TBODY
                | atom::TD
                | atom::TFOOT
                | atom::THEAD
                | atom::TR => {
                    if !self.pop_until(Scope::Table, &[atom::CAPTION]) {
                        // Ignore the token.
                        return true;
                    }
                    self.clear_active_formatting_elements();
                    self.insertion_mode = InsertionMode::InTable;
                    return false;
                }
                atom::SELECT => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InSelectInTable;
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::CAPTION => {
                    if self.pop_until(Scope::Table, &[atom::CAPTION]) {
                        self.clear_active_formatting_elements();
                        self.insertion_mode = InsertionMode::InTable;
                    }
                    return true;
                }
                atom::TABLE => {
                    if !self.pop_until(Scope::Table, &[atom::CAPTION]) {
                        // Ignore the token.
                        return true;
                    }
                    self.clear_active_formatting_elements();
                    self.insertion_mode = InsertionMode::InTable;
                    return false;
                }
                atom::BODY
                | atom::COL
                | atom::COLGROUP
                | atom::HTML
                | atom::TBODY
                | atom::TD
                | atom::TFOOT
                | atom::TH
                | atom::THEAD
                | atom::TR => {
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            _ => {}
        }
        self.handle_in_body()
    }

    fn handle_in_column_group(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                let data = std::mem::take(&mut self.tok.data);
                let rest = data.trim_start_matches(WHITESPACE);
                if rest.len() < data.len() {
                    let ws = &data[..data.len() - rest.len()];
                    self.add_text(ws);
                    if rest.is_empty() {
                        return true;
                    }
                }
                self.tok.data = rest.to_string();
            }
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::COL => {
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                    return true;
                }
                atom::TEMPLATE => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::COLGROUP => {
                    if self.node(self.top()).atom == atom::COLGROUP {
                        self.open_elements.pop();
                        self.insertion_mode = InsertionMode::InTable;
                    }
                    return true;
                }
                atom::COL => {
                    // Ignore the token.
                    return true;
                }
                atom::TEMPLATE => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::Error => {
                return self.handle_in_body();
            }
            _ => {}
        }
        if self.node(self.top()).atom != atom::COLGROUP {
            return true;
        }
        self.open_elements.pop();
        self.insertion_mode = InsertionMode::InTable;
        false
    }

    fn handle_in_table_body(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::StartTag => match self.tok.atom {
                atom::TR => {
                    self.clear_stack_to_context(Scope::TableBody);
                    self.add_element();
                    self.insertion_mode = InsertionMode::InRow;
                    return true;
                }
                atom::TD | atom::TH => {
                    self.parse_implied_token(TokenKind::StartTag, atom::TR);
                    return false;
                }
                atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::TBODY
                | atom::TFOOT
                | atom::THEAD => {
                    if self.pop_until(Scope::Table, &[atom::TBODY, atom::THEAD, atom::TFOOT]) {
                        self.insertion_mode = InsertionMode::InTable;
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::TBODY | atom::TFOOT | atom::THEAD => {
                    if self.element_in_scope(Scope::Table, &[self.tok.atom]) {
                        self.clear_stack_to_context(Scope::TableBody);
                        self.open_elements.pop();
                        self.insertion_mode = InsertionMode::InTable;
                    }
                    return true;
                }
                atom::TABLE => {
                    if self.pop_until(Scope::Table, &[atom::TBODY, atom::THEAD, atom::TFOOT]) {
                        self.insertion_mode = InsertionMode::InTable;
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::BODY
                | atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::HTML
                | atom::TD
                | atom::TH
                | atom::TR => {
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
                return true;
            }
            _ => {}
        }
        self.handle_in_table()
    }

    fn handle_in_row(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::StartTag => match self.tok.atom {
                atom::TD | atom::TH => {
                    self.clear_stack_to_context(Scope::TableRow);
                    self.add_element();
                    self.active_formatting_elements.push(ActiveElement::Marker);
                    self.insertion_mode = InsertionMode::InCell;
                    return true;
                }
                atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::TBODY
                | atom::TFOOT
                | atom::THEAD
                | atom::TR => {
                    if self.pop_until(Scope::Table, &[atom::TR]) {
                        self.insertion_mode = InsertionMode::InTableBody;
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::TR => {
                    if self.pop_until(Scope::Table, &[atom::TR]) {
                        self.insertion_mode = InsertionMode::InTableBody;
                    }
                    return true;
                }
                atom::TABLE => {
                    if self.pop_until(Scope::Table, &[atom::TR]) {
                        self.insertion_mode = InsertionMode::InTableBody;
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::TBODY | atom::TFOOT | atom::THEAD => {
                    if self.element_in_scope(Scope::Table, &[self.tok.atom]) {
                        self.parse_implied_token(TokenKind::EndTag, atom::TR);
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::BODY
                | atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::HTML
                | atom::TD
                | atom::TH => {
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            _ => {}
        }
        self.handle_in_table()
    }

    fn handle_in_cell(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::StartTag => match self.tok.atom {
                atom::CAPTION
                | atom::COL
                | atom::COLGROUP
                | atom::TBODY
                | atom::TD
                | atom::TFOOT
                | atom::TH
                | atom::THEAD
                | atom::TR => {
                    if self.pop_until(Scope::Table, &[atom::TD, atom::TH]) {
                        // Close the cell and reprocess.
                        self.clear_active_formatting_elements();
                        self.insertion_mode = InsertionMode::InRow;
                        return false;
                    }
                    // Ignore the token.
                    return true;
                }
                atom::SELECT => {
                    self.reconstruct_active_formatting_elements();
                    self.add_element();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InSelectInTable;
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::TD | atom::TH => {
                    if !self.pop_until(Scope::Table, &[self.tok.atom]) {
                        // Ignore the token.
                        return true;
                    }
                    self.clear_active_formatting_elements();
                    self.insertion_mode = InsertionMode::InRow;
                    return true;
                }
                atom::BODY | atom::CAPTION | atom::COL | atom::COLGROUP | atom::HTML => {
                    // Ignore the token.
                    return true;
                }
                atom::TABLE | atom::TBODY | atom::TFOOT | atom::THEAD | atom::TR => {
                    if !self.element_in_scope(Scope::Table, &[self.tok.atom]) {
                        // Ignore the token.
                        return true;
                    }
                    // Close the cell and reprocess.
                    if self.pop_until(Scope::Table, &[atom::TD, atom::TH]) {
                        self.clear_active_formatting_elements();
                    }
                    self.insertion_mode = InsertionMode::InRow;
                    return false;
                }
                _ => {}
            },
            _ => {}
        }
        self.handle_in_body()
    }

    fn handle_in_select(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                let data = std::mem::take(&mut self.tok.data).replace('\0', "");
                self.add_text(&data);
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::OPTION => {
                    if self.node(self.top()).atom == atom::OPTION {
                        self.open_elements.pop();
                    }
                    self.add_element();
                }
                atom::OPTGROUP => {
                    if self.node(self.top()).atom == atom::OPTION {
                        self.open_elements.pop();
                    }
                    if self.node(self.top()).atom == atom::OPTGROUP {
                        self.open_elements.pop();
                    }
                    self.add_element();
                }
                atom::SELECT => {
                    if !self.pop_until(Scope::Select, &[atom::SELECT]) {
                        // Ignore the token.
                        return true;
                    }
                    self.reset_insertion_mode();
                }
                atom::INPUT | atom::KEYGEN | atom::TEXTAREA => {
                    if self.element_in_scope(Scope::Select, &[atom::SELECT]) {
                        self.parse_implied_token(TokenKind::EndTag, atom::SELECT);
                        return false;
                    }
                    // In order to properly ignore <textarea>, we need to
                    // change the tokenizer mode.
                    self.tokenizer.next_is_not_raw_text();
                    // Ignore the token.
                    return true;
                }
                atom::SCRIPT | atom::TEMPLATE => return self.handle_in_head(),
                atom::IFRAME
                | atom::NOEMBED
                | atom::NOFRAMES
                | atom::NOSCRIPT
                | atom::PLAINTEXT
                | atom::STYLE
                | atom::TITLE
                | atom::XMP => {
                    // Don't let the tokenizer go into raw text mode when
                    // there are raw tags to be ignored.
                    self.tokenizer.next_is_not_raw_text();
                    // Ignore the token.
                    return true;
                }
                _ => {}
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::OPTION => {
                    if self.node(self.top()).atom == atom::OPTION {
                        self.open_elements.pop();
                    }
                }
                atom::OPTGROUP => {
                    let mut i = self.open_elements.len() - 1;
                    if self.node(self.open_elements[i]).atom == atom::OPTION {
                        i -= 1;
                    }
                    if self.node(self.open_elements[i]).atom == atom::OPTGROUP {
                        self.open_elements.truncate(i);
                    }
                }
                atom::SELECT => {
                    if !self.pop_until(Scope::Select, &[atom::SELECT]) {
                        // Ignore the token.
                        return true;
                    }
                    self.reset_insertion_mode();
                }
                atom::TEMPLATE => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
            }
            TokenKind::Doctype => {
                // Ignore the token.
                return true;
            }
            TokenKind::Error => return self.handle_in_body(),
            _ => {}
        }
        true
    }

    fn handle_in_select_in_table(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::StartTag | TokenKind::EndTag => match self.tok.atom {
                atom::CAPTION
                | atom::TABLE
                | atom::TBODY
                | atom::TFOOT
                | atom::THEAD
                | atom::TR
                | atom::TD
                | atom::TH => {
                    if self.tok.kind == TokenKind::EndTag
                        && !self.element_in_scope(Scope::Table, &[self.tok.atom])
                    {
                        // Ignore the token.
                        return true;
                    }
                    // This also matches a foreign <select>, mimicking what
                    // the major engines do.
                    for i in (0..self.open_elements.len()).rev() {
                        if self.node(self.open_elements[i]).atom == atom::SELECT {
                            self.open_elements.truncate(i);
                            break;
                        }
                    }
                    self.reset_insertion_mode();
                    return false;
                }
                _ => {}
            },
            _ => {}
        }
        self.handle_in_select()
    }

    fn handle_in_template(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text | TokenKind::Comment | TokenKind::Doctype => {
                return self.handle_in_body();
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::BASE
                | atom::BASEFONT
                | atom::BGSOUND
                | atom::LINK
                | atom::META
                | atom::NOFRAMES
                | atom::SCRIPT
                | atom::STYLE
                | atom::TEMPLATE
                | atom::TITLE => return self.handle_in_head(),
                atom::CAPTION | atom::COLGROUP | atom::TBODY | atom::TFOOT | atom::THEAD => {
                    self.template_insertion_mode.pop();
                    self.template_insertion_mode.push(InsertionMode::InTable);
                    self.insertion_mode = InsertionMode::InTable;
                    return false;
                }
                atom::COL => {
                    self.template_insertion_mode.pop();
                    self.template_insertion_mode.push(InsertionMode::InColumnGroup);
                    self.insertion_mode = InsertionMode::InColumnGroup;
                    return false;
                }
                atom::TR => {
                    self.template_insertion_mode.pop();
                    self.template_insertion_mode.push(InsertionMode::InTableBody);
                    self.insertion_mode = InsertionMode::InTableBody;
                    return false;
                }
                atom::TD | atom::TH => {
                    self.template_insertion_mode.pop();
                    self.template_insertion_mode.push(InsertionMode::InRow);
                    self.insertion_mode = InsertionMode::InRow;
                    return false;
                }
                _ => {
                    self.template_insertion_mode.pop();
                    self.template_insertion_mode.push(InsertionMode::InBody);
                    self.insertion_mode = InsertionMode::InBody;
                    return false;
                }
            },
            TokenKind::EndTag => match self.tok.atom {
                atom::TEMPLATE => return self.handle_in_head(),
                _ => {
                    // Ignore the token.
                    return true;
                }
            },
            TokenKind::Error => {
                if !self.open_elements_has(atom::TEMPLATE) {
                    // Ignore the token.
                    return true;
                }
                self.parse_error("unexpected EOF inside template");
                self.generate_implied_end_tags(&[]);
                for i in (0..self.open_elements.len()).rev() {
                    let n = self.node(self.open_elements[i]);
                    if n.namespace == Namespace::None && n.atom == atom::TEMPLATE {
                        self.open_elements.truncate(i);
                        break;
                    }
                }
                self.clear_active_formatting_elements();
                self.template_insertion_mode.pop();
                self.reset_insertion_mode();
                return false;
            }
            _ => {}
        }
        false
    }

    fn handle_after_body(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Error => {
                // Stop parsing.
                return true;
            }
            TokenKind::Text => {
                if self.tok.data.trim_start_matches(WHITESPACE).is_empty() {
                    // It was all whitespace.
                    return self.handle_in_body();
                }
            }
            TokenKind::StartTag => {
                if self.tok.atom == atom::HTML {
                    return self.handle_in_body();
                }
            }
            TokenKind::EndTag => {
                if self.tok.atom == atom::HTML {
                    if !self.fragment {
                        self.insertion_mode = InsertionMode::AfterAfterBody;
                    }
                    return true;
                }
            }
            TokenKind::Comment => {
                // The comment is attached to the <html> element.
                if self.open_elements.is_empty() || self.node(self.open_elements[0]).atom != atom::HTML {
                    panic!("bad parser state: <html> element not found, in the after-body insertion mode");
                }
                let html = self.open_elements[0];
                self.add_comment(html);
                return true;
            }
            _ => {}
        }
        self.insertion_mode = InsertionMode::InBody;
        false
    }

    fn handle_in_frameset(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
            }
            TokenKind::Text => {
                // Only whitespace is kept.
                let ws: String = self
                    .tok
                    .data
                    .chars()
                    .filter(|c| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
                    .collect();
                self.add_text(&ws);
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::FRAMESET => {
                    self.add_element();
                }
                atom::FRAME => {
                    self.add_element();
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                }
                atom::NOFRAMES => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::EndTag => {
                if self.tok.atom == atom::FRAMESET && self.node(self.top()).atom != atom::HTML {
                    self.open_elements.pop();
                    if self.node(self.top()).atom != atom::FRAMESET {
                        self.insertion_mode = InsertionMode::AfterFrameset;
                        return true;
                    }
                }
            }
            _ => {
                // Ignore the token.
            }
        }
        true
    }

    fn handle_after_frameset(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
            }
            TokenKind::Text => {
                let ws: String = self
                    .tok
                    .data
                    .chars()
                    .filter(|c| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
                    .collect();
                self.add_text(&ws);
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::NOFRAMES => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::EndTag => {
                if self.tok.atom == atom::HTML {
                    self.insertion_mode = InsertionMode::AfterAfterFrameset;
                }
            }
            _ => {
                // Ignore the token.
            }
        }
        true
    }

    fn handle_after_after_body(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Error => {
                // Stop parsing.
                return true;
            }
            TokenKind::Text => {
                if self.tok.data.trim_start_matches(WHITESPACE).is_empty() {
                    return self.handle_in_body();
                }
            }
            TokenKind::StartTag => {
                if self.tok.atom == atom::HTML {
                    return self.handle_in_body();
                }
            }
            TokenKind::Comment => {
                let root = self.doc.root();
                self.add_comment(root);
                return true;
            }
            TokenKind::Doctype => {
                return self.handle_in_body();
            }
            _ => {}
        }
        self.insertion_mode = InsertionMode::InBody;
        false
    }

    fn handle_after_after_frameset(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Comment => {
                let root = self.doc.root();
                self.add_comment(root);
            }
            TokenKind::Text => {
                let ws: String = self
                    .tok
                    .data
                    .chars()
                    .filter(|c| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
                    .collect();
                if !ws.is_empty() {
                    self.tok.data = ws;
                    return self.handle_in_body();
                }
            }
            TokenKind::StartTag => match self.tok.atom {
                atom::HTML => return self.handle_in_body(),
                atom::NOFRAMES => return self.handle_in_head(),
                _ => {}
            },
            TokenKind::Doctype => return self.handle_in_body(),
            _ => {
                // Ignore the token.
            }
        }
        true
    }

    /// The adjusted current node: the context element when parsing a fragment
    /// with only the root on the stack, the top of the stack otherwise.
    fn adjusted_current_node(&self) -> Option<NodeId> {
        if self.open_elements.len() == 1 && self.fragment && self.context.is_some() {
            return self.context;
        }
        self.open_elements.last().copied()
    }

    /// Whether the token should be processed by the foreign-content rules
    /// rather than the current insertion mode.
    fn in_foreign_content(&self) -> bool {
        if self.open_elements.is_empty() {
            return false;
        }
        let Some(n) = self.adjusted_current_node() else {
            return false;
        };
        let node = self.node(n);
        if node.namespace == Namespace::None {
            return false;
        }
        if mathml_text_integration_point(node) {
            if self.tok.kind == TokenKind::StartTag
                && self.tok.atom != atom::MGLYPH
                && self.tok.atom != atom::MALIGNMARK
            {
                return false;
            }
            if self.tok.kind == TokenKind::Text {
                return false;
            }
        }
        if node.namespace == Namespace::Math
            && node.data == "annotation-xml"
            && self.tok.kind == TokenKind::StartTag
            && self.tok.atom == atom::SVG
        {
            return false;
        }
        if html_integration_point(node)
            && matches!(self.tok.kind, TokenKind::StartTag | TokenKind::Text)
        {
            return false;
        }
        if self.tok.kind == TokenKind::Error {
            return false;
        }
        true
    }

    fn parse_foreign_content(&mut self) -> bool {
        match self.tok.kind {
            TokenKind::Text => {
                if self.frameset_ok {
                    self.frameset_ok =
                        self.tok.data.trim_start_matches(WHITESPACE_OR_NUL).is_empty();
                }
                let data = std::mem::take(&mut self.tok.data).replace('\0', "\u{FFFD}");
                self.add_text(&data);
            }
            TokenKind::Comment => {
                let top = self.top();
                self.add_comment(top);
            }
            TokenKind::StartTag => {
                if !self.fragment {
                    let mut breakout = is_breakout_tag(&self.tok.data);
                    if self.tok.atom == atom::FONT {
                        breakout = self
                            .tok
                            .attrs
                            .iter()
                            .any(|a| matches!(a.name.as_str(), "color" | "face" | "size"));
                    }
                    if breakout {
                        self.parse_error("html tag breaks out of foreign content");
                        for i in (0..self.open_elements.len()).rev() {
                            let n = self.node(self.open_elements[i]);
                            if n.namespace == Namespace::None
                                || html_integration_point(n)
                                || mathml_text_integration_point(n)
                            {
                                self.open_elements.truncate(i + 1);
                                break;
                            }
                        }
                        return false;
                    }
                }
                let current = self
                    .adjusted_current_node()
                    .expect("foreign content with empty stack");
                let namespace = self.node(current).namespace;
                match namespace {
                    Namespace::Math => {
                        adjust_attribute_names(&mut self.tok.attrs, &MATHML_ADJUSTMENTS);
                    }
                    Namespace::Svg => {
                        // The tokenizer lower-cased the tag name, but SVG
                        // wants e.g. "foreignObject" with a capital 'O'.
                        if let Some(&adjusted) = SVG_ADJUSTMENTS_TAGS.get(self.tok.data.as_str()) {
                            self.tok.atom = Atom::lookup(adjusted.as_bytes());
                            self.tok.data = adjusted.to_string();
                        }
                        adjust_attribute_names(&mut self.tok.attrs, &SVG_ADJUSTMENTS_ATTRIBUTES);
                    }
                    _ => panic!("bad parser state: unexpected namespace"),
                }
                adjust_foreign_attributes(&mut self.tok.attrs);
                self.add_element();
                let top = self.top();
                self.doc.node_mut(top).namespace = namespace;
                if namespace != Namespace::None {
                    // Don't let the tokenizer go into raw text mode in
                    // foreign content (e.g. in an SVG <title> tag).
                    self.tokenizer.next_is_not_raw_text();
                }
                if self.has_self_closing_token {
                    self.open_elements.pop();
                    self.acknowledge_self_closing_tag();
                }
            }
            TokenKind::EndTag => {
                for i in (0..self.open_elements.len()).rev() {
                    if self.node(self.open_elements[i]).namespace == Namespace::None {
                        // An HTML element intervenes; use the current
                        // insertion mode instead.
                        return self.dispatch();
                    }
                    if self.node(self.open_elements[i]).data.eq_ignore_ascii_case(&self.tok.data) {
                        self.open_elements.truncate(i);
                        break;
                    }
                }
                return true;
            }
            _ => {
                // Ignore the token.
            }
        }
        true
    }
}

/// Returns true for the MathML text integration points.
fn mathml_text_integration_point(node: &Node) -> bool {
    node.namespace == Namespace::Math
        && matches!(node.data.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// Returns true for the HTML integration points.
fn html_integration_point(node: &Node) -> bool {
    if node.kind != NodeKind::Element {
        return false;
    }
    match node.namespace {
        Namespace::Math => {
            node.data == "annotation-xml"
                && node.attrs.iter().any(|attr| {
                    attr.name == "encoding"
                        && (attr.value.eq_ignore_ascii_case("text/html")
                            || attr.value.eq_ignore_ascii_case("application/xhtml+xml"))
                })
        }
        Namespace::Svg => matches!(node.data.as_str(), "desc" | "foreignObject" | "title"),
        _ => false,
    }
}

/// Start tags that break out of foreign content back into HTML.
fn is_breakout_tag(name: &str) -> bool {
    matches!(
        name,
        "b" | "big"
            | "blockquote"
            | "body"
            | "br"
            | "center"
            | "code"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "em"
            | "embed"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "hr"
            | "i"
            | "img"
            | "li"
            | "listing"
            | "menu"
            | "meta"
            | "nobr"
            | "ol"
            | "p"
            | "pre"
            | "ruby"
            | "s"
            | "small"
            | "span"
            | "strong"
            | "strike"
            | "sub"
            | "sup"
            | "table"
            | "tt"
            | "u"
            | "ul"
            | "var"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_with_stack(names: &[&str]) -> Html5Parser<&'static [u8]> {
        let mut parser = Html5Parser::new(&b""[..], Html5ParserOptions::default());
        for name in names {
            let id = parser.doc.add_node(Node::new_element(name, vec![]));
            let root = parser.doc.root();
            let parent = *parser.open_elements.last().unwrap_or(&root);
            parser.doc.append_child(parent, id);
            parser.open_elements.push(id);
        }
        parser
    }

    #[test]
    fn element_in_scope_stops_at_boundaries() {
        let parser = parser_with_stack(&["html", "body", "div", "button", "span"]);
        assert!(parser.element_in_scope(Scope::Default, &[atom::DIV]));
        // Button scope stops at the <button>.
        assert!(!parser.element_in_scope(Scope::Button, &[atom::DIV]));
        assert!(parser.element_in_scope(Scope::Button, &[atom::SPAN]));
    }

    #[test]
    fn table_scope_stops_at_table() {
        let parser = parser_with_stack(&["html", "body", "div", "table", "tbody", "tr"]);
        assert!(!parser.element_in_scope(Scope::Table, &[atom::DIV]));
        assert!(parser.element_in_scope(Scope::Table, &[atom::TBODY]));
    }

    #[test]
    fn foreign_elements_stop_default_scope() {
        let mut parser = parser_with_stack(&["html", "body", "p", "math", "mi"]);
        let math = parser.open_elements[3];
        let mi = parser.open_elements[4];
        parser.doc.node_mut(math).namespace = Namespace::Math;
        parser.doc.node_mut(mi).namespace = Namespace::Math;
        // The <p> is hidden behind the MathML text integration point.
        assert!(!parser.element_in_scope(Scope::Default, &[atom::P]));
    }

    #[test]
    fn pop_until_truncates_through_match() {
        let mut parser = parser_with_stack(&["html", "body", "p", "b", "i"]);
        assert!(parser.pop_until(Scope::Button, &[atom::P]));
        assert_eq!(parser.open_elements.len(), 2);
        assert_eq!(parser.node(*parser.open_elements.last().unwrap()).data, "body");
    }

    #[test]
    fn generate_implied_end_tags_respects_exceptions() {
        let mut parser = parser_with_stack(&["html", "body", "div", "p", "li", "dd"]);
        parser.generate_implied_end_tags(&[]);
        assert_eq!(parser.node(*parser.open_elements.last().unwrap()).data, "div");

        let mut parser = parser_with_stack(&["html", "body", "div", "p", "li"]);
        parser.generate_implied_end_tags(&["li"]);
        assert_eq!(parser.node(*parser.open_elements.last().unwrap()).data, "li");
    }

    #[test]
    fn clear_stack_to_table_context() {
        let mut parser = parser_with_stack(&["html", "body", "table", "tbody", "tr", "td"]);
        parser.clear_stack_to_context(Scope::TableRow);
        assert_eq!(parser.node(*parser.open_elements.last().unwrap()).data, "tr");

        parser.clear_stack_to_context(Scope::Table);
        assert_eq!(parser.node(*parser.open_elements.last().unwrap()).data, "table");
    }

    #[test]
    fn reset_insertion_mode_from_stack() {
        let mut parser = parser_with_stack(&["html", "body", "table", "tbody", "tr", "td"]);
        parser.reset_insertion_mode();
        assert_eq!(parser.insertion_mode, InsertionMode::InCell);

        let mut parser = parser_with_stack(&["html", "body", "table"]);
        parser.reset_insertion_mode();
        assert_eq!(parser.insertion_mode, InsertionMode::InTable);

        let mut parser = parser_with_stack(&["html"]);
        parser.reset_insertion_mode();
        assert_eq!(parser.insertion_mode, InsertionMode::BeforeHead);
    }

    #[test]
    fn reset_insertion_mode_select_in_table() {
        let mut parser = parser_with_stack(&["html", "body", "table", "select"]);
        parser.reset_insertion_mode();
        assert_eq!(parser.insertion_mode, InsertionMode::InSelectInTable);

        let mut parser = parser_with_stack(&["html", "body", "select"]);
        parser.reset_insertion_mode();
        assert_eq!(parser.insertion_mode, InsertionMode::InSelect);
    }

    #[test]
    fn foster_parent_inserts_before_table() {
        let mut parser = parser_with_stack(&["html", "body", "table"]);
        let table = parser.open_elements[2];
        let body = parser.open_elements[1];
        let text = parser.doc.add_node(Node::new_text("stray"));
        parser.foster_parent(text);

        let children = parser.doc.children(body);
        assert_eq!(children, vec![text, table]);
    }

    #[test]
    fn foster_parent_coalesces_text() {
        let mut parser = parser_with_stack(&["html", "body", "table"]);
        let body = parser.open_elements[1];
        let first = parser.doc.add_node(Node::new_text("a"));
        parser.foster_parent(first);
        let second = parser.doc.add_node(Node::new_text("b"));
        parser.foster_parent(second);

        let children = parser.doc.children(body);
        assert_eq!(children.len(), 2);
        assert_eq!(parser.doc.node(children[0]).data, "ab");
    }

    #[test]
    fn foster_parent_prefers_open_template() {
        // The template sits above the table on the stack of open elements.
        let mut parser = parser_with_stack(&["html", "body", "table", "template"]);
        let template = parser.open_elements[3];
        let text = parser.doc.add_node(Node::new_text("x"));
        parser.foster_parent(text);
        assert_eq!(parser.doc.children(template), vec![text]);
    }

    #[test]
    fn reconstruct_clones_closed_formatting_elements() {
        let mut parser = parser_with_stack(&["html", "body", "p"]);
        // A <b> that was closed but is still in the active formatting list.
        let b = parser.doc.add_node(Node::new_element("b", vec![]));
        parser.active_formatting_elements.push(ActiveElement::Node(b));

        parser.reconstruct_active_formatting_elements();

        let top = *parser.open_elements.last().unwrap();
        assert_eq!(parser.node(top).data, "b");
        assert_ne!(top, b, "reconstruct must clone, not reuse");
        assert_eq!(parser.active_formatting_elements.len(), 1);
        assert_eq!(parser.active_formatting_elements[0], ActiveElement::Node(top));
    }
}
