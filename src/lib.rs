//! HTML5 tokenizer and tree-construction parser
//!
//! The parser's job is to take a stream of bytes and turn it into a DOM
//! tree, the way the WHATWG HTML specification says a browser does it:
//! implied `<html>`, `<head>` and `<body>` elements are inserted, misnested
//! tags are repaired, and malformed input never fails the parse.
//!
//! ```
//! use html5tree::parse_str;
//!
//! let doc = parse_str("<p>Hello<p>world").expect("parse");
//! assert_eq!(
//!     doc.render(),
//!     "<html><head></head><body><p>Hello</p><p>world</p></body></html>",
//! );
//! ```
//!
//! The tokenizer can also be driven on its own through
//! [`tokenizer::Tokenizer`], which yields one token per call to `next()` and
//! guarantees that the concatenation of every token's raw bytes reproduces
//! the input.

pub mod atom;
pub mod document;
pub mod entity;
pub mod errors;
pub mod node;
pub mod parser;
pub mod tokenizer;
mod writer;

use std::io::Read;

pub use crate::document::Document;
pub use crate::entity::{escape_string, unescape_string};
pub use crate::errors::{Error, ParseError, Result};
pub use crate::node::{Namespace, Node, NodeId, NodeKind};
pub use crate::parser::{Html5Parser, Html5ParserOptions};
pub use crate::tokenizer::token::{Attribute, Token, TokenKind};
pub use crate::tokenizer::Tokenizer;

/// Parses HTML from the given reader into a document tree.
pub fn parse(reader: impl Read, options: Html5ParserOptions) -> Result<Document> {
    Html5Parser::new(reader, options).parse()
}

/// Parses an HTML string into a document tree with default options.
pub fn parse_str(html: &str) -> Result<Document> {
    parse(html.as_bytes(), Html5ParserOptions::default())
}

/// Parses a fragment of HTML in the context of the given element, the way
/// innerHTML does. Returns the document owning the parsed nodes plus the ids
/// of the fragment's top-level nodes.
pub fn parse_fragment(
    reader: impl Read,
    context: Option<&Node>,
    options: Html5ParserOptions,
) -> Result<(Document, Vec<NodeId>)> {
    Html5Parser::parse_fragment(reader, context, options)
}
