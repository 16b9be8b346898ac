//! End-to-end parsing fixtures: whole documents in, rendered trees out.

use html5tree::{
    parse, parse_fragment, parse_str, Error, Html5ParserOptions, Node, NodeKind,
};

#[test]
fn builds_implied_structure_and_closes_list_items() {
    let doc = parse_str("<p>Links:</p><ul><li><a href=\"foo\">Foo</a><li><a href=\"/bar/baz\">BarBaz</a></ul>")
        .expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head></head><body><p>Links:</p><ul>\
         <li><a href=\"foo\">Foo</a></li>\
         <li><a href=\"/bar/baz\">BarBaz</a></li>\
         </ul></body></html>"
    );
    doc.assert_consistent(doc.root());
}

#[test]
fn empty_input_still_yields_skeleton() {
    let doc = parse_str("").expect("parse");
    assert_eq!(doc.render(), "<html><head></head><body></body></html>");
    doc.assert_consistent(doc.root());
}

#[test]
fn doctype_is_preserved_and_sets_no_quirks() {
    let doc = parse_str("<!DOCTYPE html><p>x</p>").expect("parse");
    assert!(!doc.quirks);
    assert_eq!(
        doc.render(),
        "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>"
    );
}

#[test]
fn missing_doctype_sets_quirks() {
    let doc = parse_str("<p>x</p>").expect("parse");
    assert!(doc.quirks);
}

#[test]
fn adoption_agency_repairs_misnested_formatting() {
    let doc = parse_str("<p>1<b>2<i>3</b>4</i>5</p>").expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head></head><body><p>1<b>2<i>3</i></b><i>4</i>5</p></body></html>"
    );
    doc.assert_consistent(doc.root());
}

#[test]
fn foster_parenting_moves_text_out_of_tables() {
    let doc = parse_str("<table>foo<tr><td>bar</td></tr></table>").expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head></head><body>foo<table><tbody><tr><td>bar</td></tr></tbody></table></body></html>"
    );
    doc.assert_consistent(doc.root());
}

#[test]
fn table_cells_are_implied() {
    let doc = parse_str("<table><tr><td>a<td>b</table>").expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head></head><body><table><tbody><tr><td>a</td><td>b</td></tr></tbody></table></body></html>"
    );
}

#[test]
fn noscript_without_scripting_keeps_children_in_tree() {
    let options = Html5ParserOptions {
        scripting_enabled: false,
        ..Default::default()
    };
    let doc = parse(
        "<noscript><img src='frontpage.png'/></noscript><p><img src='doc.png'/></p>".as_bytes(),
        options,
    )
    .expect("parse");

    // The <img> inside <noscript> lands in <body>, not inside <noscript>.
    let html = doc.find_element_child(doc.root(), "html").expect("html");
    let body = doc.find_element_child(html, "body").expect("body");
    let body_children = doc.children(body);
    assert_eq!(body_children.len(), 2);

    let first = doc.node(body_children[0]);
    assert_eq!(first.data, "img");
    assert_eq!(first.get_attribute("src"), Some("frontpage.png"));

    let p = doc.node(body_children[1]);
    assert_eq!(p.data, "p");
    let p_children = doc.children(body_children[1]);
    assert_eq!(p_children.len(), 1);
    assert_eq!(doc.node(p_children[0]).get_attribute("src"), Some("doc.png"));
}

#[test]
fn noscript_with_scripting_is_raw_text() {
    let doc = parse_str("<noscript><img src='x'></noscript>").expect("parse");
    let html = doc.find_element_child(doc.root(), "html").expect("html");
    let head = doc.find_element_child(html, "head").expect("head");
    let noscript = doc.find_element_child(head, "noscript").expect("noscript");
    let children = doc.children(noscript);
    assert_eq!(children.len(), 1);
    assert_eq!(doc.node(children[0]).kind, NodeKind::Text);
    assert_eq!(doc.node(children[0]).data, "<img src='x'>");
}

#[test]
fn script_content_is_not_parsed() {
    let doc = parse_str("<script>if (a < b) { f(\"</p>\") } // </script><p>x</p>").expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head><script>if (a < b) { f(\"</p>\") } // </script></head>\
         <body><p>x</p></body></html>"
    );
}

#[test]
fn image_is_rewritten_to_img() {
    let doc = parse_str("<image src=x>").expect("parse");
    assert_eq!(
        doc.render(),
        "<html><head></head><body><img src=\"x\"/></body></html>"
    );
}

#[test]
fn svg_names_are_case_corrected() {
    let doc = parse_str("<svg><foreignobject><div>x</div></foreignobject></svg>").expect("parse");
    let html = doc.find_element_child(doc.root(), "html").expect("html");
    let body = doc.find_element_child(html, "body").expect("body");
    let svg = doc.find_element_child(body, "svg").expect("svg");
    let fo = doc.children(svg)[0];
    assert_eq!(doc.node(fo).data, "foreignObject");
    assert_eq!(doc.node(fo).namespace.as_str(), "svg");
    // The <div> is HTML again: foreignObject is an integration point.
    let div = doc.children(fo)[0];
    assert_eq!(doc.node(div).data, "div");
    assert_eq!(doc.node(div).namespace.as_str(), "");
}

#[test]
fn foreign_breakout_closes_svg() {
    let doc = parse_str("<svg><circle></circle><p>after").expect("parse");
    let html = doc.find_element_child(doc.root(), "html").expect("html");
    let body = doc.find_element_child(html, "body").expect("body");
    let children = doc.children(body);
    assert_eq!(doc.node(children[0]).data, "svg");
    assert_eq!(doc.node(children[1]).data, "p");
}

#[test]
fn fragment_in_body_context() {
    let context = Node::new_element("body", vec![]);
    let (doc, nodes) =
        parse_fragment("<p>Links:</p>".as_bytes(), Some(&context), Html5ParserOptions::default())
            .expect("parse");
    assert_eq!(nodes.len(), 1);
    let p = doc.node(nodes[0]);
    assert_eq!(p.kind, NodeKind::Element);
    assert_eq!(p.data, "p");
    assert_eq!(doc.text_content(nodes[0]), "Links:");
}

#[test]
fn fragment_in_raw_text_context() {
    let context = Node::new_element("title", vec![]);
    let (doc, nodes) =
        parse_fragment("<span>x</span>".as_bytes(), Some(&context), Html5ParserOptions::default())
            .expect("parse");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.node(nodes[0]).kind, NodeKind::Text);
    assert_eq!(doc.node(nodes[0]).data, "<span>x</span>");
}

#[test]
fn fragment_rejects_inconsistent_context_node() {
    // An atom that disagrees with the element name is a caller bug.
    let mut context = Node::new_element("table", vec![]);
    context.atom = html5tree::atom::FRAMESET;
    let err = parse_fragment("<p>x</p>".as_bytes(), Some(&context), Html5ParserOptions::default())
        .expect_err("must fail");
    assert!(matches!(err, Error::InconsistentNode { .. }), "{err:?}");
}

#[test]
fn fragment_without_context_parses_as_document_children() {
    let (doc, nodes) =
        parse_fragment("<p>x</p>".as_bytes(), None, Html5ParserOptions::default()).expect("parse");
    assert_eq!(nodes.len(), 1);
    assert_eq!(doc.node(nodes[0]).data, "html");
}

#[test]
fn max_buf_bounds_token_size() {
    let options = Html5ParserOptions {
        max_buf: 64,
        ..Default::default()
    };
    let big_text = format!("<p>{}</p>", "x".repeat(4096));
    let err = parse(big_text.as_bytes(), options).expect_err("must fail");
    assert!(matches!(err, Error::BufferExceeded), "{err:?}");

    // Many small tokens stay under the cap and parse fine.
    let options = Html5ParserOptions {
        max_buf: 64,
        ..Default::default()
    };
    let many_small = "<p>hello</p>".repeat(512);
    let doc = parse(many_small.as_bytes(), options).expect("parse");
    doc.assert_consistent(doc.root());
}

#[test]
fn trees_stay_consistent_on_hostile_input() {
    let inputs = [
        "<b><i></b></i>",
        "<a><p><a></a></p></a>",
        "<table><b><tr><td>aaa</td></tr>bbb</table>ccc",
        "<p id=a><p id=b><p id=c",
        "</div><div></p>",
        "<select><option><optgroup><option></select>",
        "<template><tr><td>x</td></tr></template>",
        "<math><mi>x</mi><annotation-xml encoding='text/html'><p>y</annotation-xml></math>",
        "<frameset><frame></frameset>",
        "<!doctype html><html><head></head><body><table><caption>z</table>",
    ];
    for input in inputs {
        let doc = parse_str(input).unwrap_or_else(|e| panic!("parse {input:?}: {e}"));
        doc.assert_consistent(doc.root());
    }
}

#[test]
fn attributes_survive_into_the_tree() {
    let doc = parse_str("<p CLASS=\"x\" data-a='1' checked>t</p>").expect("parse");
    let html = doc.find_element_child(doc.root(), "html").expect("html");
    let body = doc.find_element_child(html, "body").expect("body");
    let p = doc.find_element_child(body, "p").expect("p");
    let node = doc.node(p);
    assert_eq!(node.get_attribute("class"), Some("x"));
    assert_eq!(node.get_attribute("data-a"), Some("1"));
    assert_eq!(node.get_attribute("checked"), Some(""));
}

#[test]
fn parse_errors_are_recorded_not_fatal() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .init();
    let parser = html5tree::Html5Parser::new(&b"<p></nosuch></p>"[..], Html5ParserOptions::default());
    let (doc, errors) = parser.parse_with_errors().expect("parse");
    doc.assert_consistent(doc.root());
    // Missing doctype is recorded; the parse still succeeds.
    assert!(errors.iter().any(|e| e.message.contains("doctype")));
}

#[test]
fn comments_are_kept_in_place() {
    let doc = parse_str("<!--before--><p>x</p><!--after-->").expect("parse");
    let root_children = doc.children(doc.root());
    assert_eq!(doc.node(root_children[0]).kind, NodeKind::Comment);
    assert_eq!(doc.node(root_children[0]).data, "before");
    assert_eq!(
        doc.render(),
        "<!--before--><html><head></head><body><p>x</p><!--after--></body></html>"
    );
}
