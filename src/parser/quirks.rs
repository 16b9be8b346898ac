//! Doctype parsing and the quirks-mode decision.

use crate::node::Node;
use crate::tokenizer::token::Attribute;

const WHITESPACE: &[char] = &[' ', '\t', '\n', '\x0C', '\r'];

/// Splits the raw doctype payload into a Doctype node (name lowercased,
/// public/system identifiers as attributes) and decides whether the document
/// is in quirks mode.
pub(crate) fn parse_doctype(data: &str) -> (Node, bool) {
    let mut quirks = false;

    let space = data
        .find(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r'))
        .unwrap_or(data.len());
    let name = &data[..space];
    // The comparison to "html" is case-sensitive; the stored name is lowercased.
    if name != "html" {
        quirks = true;
    }
    let mut node = Node::new_doctype(&name.to_lowercase());
    let mut rest = data[space..].trim_start_matches(WHITESPACE);

    if rest.len() < 6 || !rest.is_char_boundary(6) {
        // It can't start with "PUBLIC" or "SYSTEM"; ignore the remainder.
        return (node, quirks || !rest.is_empty());
    }

    let mut key = rest[..6].to_lowercase();
    rest = &rest[6..];
    while key == "public" || key == "system" {
        rest = rest.trim_start_matches(WHITESPACE);
        if rest.is_empty() {
            break;
        }
        let quote = rest.as_bytes()[0];
        if quote != b'"' && quote != b'\'' {
            break;
        }
        rest = &rest[1..];
        let id;
        match rest.find(quote as char) {
            Some(q) => {
                id = &rest[..q];
                rest = &rest[q + 1..];
            }
            None => {
                id = rest;
                rest = "";
            }
        }
        node.attrs.push(Attribute::new(&key, id));
        key = if key == "public" {
            "system".to_string()
        } else {
            String::new()
        };
    }

    if !key.is_empty() || !rest.is_empty() {
        quirks = true;
    } else if !node.attrs.is_empty() {
        if node.attrs[0].name == "public" {
            let public = node.attrs[0].value.to_lowercase();
            if QUIRKS_PUB_IDENTIFIER_EQ.contains(&public.as_str())
                || QUIRKS_PUB_IDENTIFIER_PREFIX
                    .iter()
                    .any(|&prefix| public.starts_with(prefix))
            {
                quirks = true;
            }
            // These two public identifiers only cause quirks mode when there
            // is no system identifier.
            if node.attrs.len() == 1
                && QUIRKS_PUB_IDENTIFIER_PREFIX_MISSING_SYS
                    .iter()
                    .any(|&prefix| public.starts_with(prefix))
            {
                quirks = true;
            }
        }
        if let Some(last) = node.attrs.last() {
            if last.name == "system"
                && QUIRKS_SYS_IDENTIFIER_EQ.contains(&last.value.to_lowercase().as_str())
            {
                quirks = true;
            }
        }
    }

    (node, quirks)
}

static QUIRKS_PUB_IDENTIFIER_EQ: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKS_PUB_IDENTIFIER_PREFIX: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKS_PUB_IDENTIFIER_PREFIX_MISSING_SYS: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

static QUIRKS_SYS_IDENTIFIER_EQ: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_html_doctype() {
        let (node, quirks) = parse_doctype("html");
        assert_eq!(node.data, "html");
        assert!(node.attrs.is_empty());
        assert!(!quirks);
    }

    #[test]
    fn name_is_lowercased_but_compared_case_sensitively() {
        let (node, quirks) = parse_doctype("HTML");
        assert_eq!(node.data, "html");
        assert!(quirks);
    }

    #[test]
    fn missing_name_is_quirky() {
        let (_, quirks) = parse_doctype("");
        assert!(quirks);
    }

    #[test]
    fn public_and_system_identifiers() {
        let (node, quirks) = parse_doctype(
            "html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"",
        );
        assert!(!quirks);
        assert_eq!(node.attrs.len(), 2);
        assert_eq!(node.attrs[0].name, "public");
        assert_eq!(node.attrs[0].value, "-//W3C//DTD XHTML 1.0 Strict//EN");
        assert_eq!(node.attrs[1].name, "system");
    }

    #[test]
    fn quirky_public_prefix() {
        let (_, quirks) = parse_doctype("html PUBLIC \"-//IETF//DTD HTML 2.0//EN\"");
        assert!(quirks);
    }

    #[test]
    fn html401_transitional_without_system_is_quirky() {
        let (_, quirks) =
            parse_doctype("html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\"");
        assert!(quirks);

        let (_, quirks) = parse_doctype(
            "html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \"http://www.w3.org/TR/html4/loose.dtd\"",
        );
        assert!(!quirks);
    }

    #[test]
    fn ibm_system_identifier_is_quirky() {
        let (_, quirks) = parse_doctype(
            "html SYSTEM \"http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd\"",
        );
        assert!(quirks);
    }

    #[test]
    fn trailing_garbage_is_quirky() {
        let (_, quirks) = parse_doctype("html bogus");
        assert!(quirks);
    }
}
