use crate::atom::Atom;

/// The different token types that can be emitted by the tokenizer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An error, typically the end of the input stream
    #[default]
    Error,
    /// A run of character data
    Text,
    /// A start tag like `<a>`
    StartTag,
    /// An end tag like `</a>`
    EndTag,
    /// A self-closing start tag like `<br/>`
    SelfClosingTag,
    /// A comment like `<!-- comment -->`
    Comment,
    /// A doctype like `<!DOCTYPE html>`
    Doctype,
}

/// A single key/value attribute, with an optional namespace for foreign
/// (xml:/xlink:/xmlns:) attributes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub namespace: String,
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            namespace: String::new(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// An owning token value as materialized by [`Tokenizer::token`].
///
/// `data` holds the unescaped text for Text/Comment tokens, the raw doctype
/// payload for Doctype tokens, and the lowercased tag name for tag tokens.
/// `atom` is the interned code of the tag name, or the zero atom for names
/// outside the known set.
///
/// [`Tokenizer::token`]: super::Tokenizer::token
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub atom: Atom,
    pub data: String,
    pub attrs: Vec<Attribute>,
}

impl Token {
    /// Returns true if this is a Text token that is empty or whitespace only
    pub fn is_empty_or_white(&self) -> bool {
        self.kind == TokenKind::Text
            && self.data.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
    }
}

// Each token can be displayed as a string, mostly for debugging
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            TokenKind::Error => write!(f, "EOF"),
            TokenKind::Text => write!(f, "Text[{}]", self.data),
            TokenKind::StartTag | TokenKind::SelfClosingTag => {
                let mut result = format!("<{}", self.data);
                for attr in &self.attrs {
                    result.push_str(&format!(" {}=\"{}\"", attr.name, attr.value));
                }
                if self.kind == TokenKind::SelfClosingTag {
                    result.push('/');
                }
                result.push('>');
                write!(f, "StartTag[{result}]")
            }
            TokenKind::EndTag => write!(f, "EndTag[</{}>]", self.data),
            TokenKind::Comment => write!(f, "Comment[<!--{}-->]", self.data),
            TokenKind::Doctype => write!(f, "Doctype[<!DOCTYPE {}>]", self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom;

    #[test]
    fn test_token_display() {
        let token = Token {
            kind: TokenKind::StartTag,
            atom: atom::A,
            data: "a".to_string(),
            attrs: vec![Attribute::new("href", "foo")],
        };
        assert_eq!(format!("{token}"), "StartTag[<a href=\"foo\">]");

        let token = Token {
            kind: TokenKind::EndTag,
            atom: atom::A,
            data: "a".to_string(),
            attrs: vec![],
        };
        assert_eq!(format!("{token}"), "EndTag[</a>]");

        let token = Token {
            kind: TokenKind::Comment,
            atom: Atom(0),
            data: " hi ".to_string(),
            attrs: vec![],
        };
        assert_eq!(format!("{token}"), "Comment[<!-- hi -->]");
    }

    #[test]
    fn test_is_empty_or_white() {
        let token = Token {
            kind: TokenKind::Text,
            data: " \t\n ".to_string(),
            ..Default::default()
        };
        assert!(token.is_empty_or_white());

        let token = Token {
            kind: TokenKind::Text,
            data: " x ".to_string(),
            ..Default::default()
        };
        assert!(!token.is_empty_or_white());
    }
}
