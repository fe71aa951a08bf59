//! Tests for the markup reader and tree queries.

use quire_dom::markup::{decode_entities, parse};
use quire_dom::{DomTree, ElementData, NodeId, NodeType};

fn tags(dom: &DomTree, parent: NodeId) -> Vec<String> {
    dom.children(parent)
        .iter()
        .filter_map(|&c| dom.as_element(c).map(|e| e.tag_name.clone()))
        .collect()
}

/// The first element inside `<body>`.
fn first_in_body(dom: &DomTree) -> NodeId {
    dom.children(dom.body().unwrap())
        .iter()
        .copied()
        .find(|&c| dom.as_element(c).is_some())
        .unwrap()
}

#[test]
fn test_nested_elements_and_text() {
    let dom = parse("<div><p>one</p><p>two <b>three</b></p></div>");
    let div = first_in_body(&dom);
    assert_eq!(tags(&dom, div), vec!["p", "p"]);
    assert_eq!(dom.text_content(div), "onetwo three");
}

#[test]
fn test_attributes_quoted_and_bare() {
    let dom = parse(r#"<td colspan=2 rowspan='3' class="a b" hidden>x</td>"#);
    let td = dom.as_element(first_in_body(&dom)).unwrap();
    assert_eq!(td.integer_attr("colspan", 1), 2);
    assert_eq!(td.integer_attr("rowspan", 1), 3);
    assert_eq!(td.classes().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(td.attr("hidden"), Some(""));
}

#[test]
fn test_void_and_self_closing_elements() {
    let dom = parse("<p>a<br>b<img src=x.png/>c</p>");
    let p = first_in_body(&dom);
    assert_eq!(tags(&dom, p), vec!["br", "img"]);
    assert_eq!(dom.text_content(p), "abc");
}

#[test]
fn test_mismatched_end_tag_is_ignored() {
    let dom = parse("<div><span>x</i></span>y</div>");
    let div = first_in_body(&dom);
    assert_eq!(tags(&dom, div), vec!["span"]);
    assert_eq!(dom.text_content(div), "xy");
}

#[test]
fn test_style_is_raw_text() {
    let dom = parse("<style>p > a { color: red }</style><p>x</p>");
    assert_eq!(dom.style_sheets_text(), "p > a { color: red }");
    let html = dom.document_element().unwrap();
    assert_eq!(tags(&dom, NodeId::ROOT), vec!["html"]);
    assert_eq!(tags(&dom, html), vec!["head", "body"]);
    assert_eq!(tags(&dom, dom.children(html)[0]), vec!["style"]);
    assert_eq!(tags(&dom, dom.body().unwrap()), vec!["p"]);
}

// ---------------------------------------------------------------------------
// Implied document skeleton
// ---------------------------------------------------------------------------

#[test]
fn test_top_level_siblings_share_one_body() {
    let dom = parse("<div id=a></div>text<div id=b></div>");
    assert_eq!(tags(&dom, NodeId::ROOT), vec!["html"]);
    let body = dom.body().unwrap();
    assert_eq!(tags(&dom, body), vec!["div", "div"]);
    assert_eq!(dom.text_content(body), "text");
    assert_eq!(dom.parent(dom.element_by_id("b").unwrap()), Some(body));
}

#[test]
fn test_explicit_skeleton_is_not_duplicated() {
    let dom = parse(
        "<html lang=en> <head><title>t</title></head> <body class=x><p>a</p></body></html><p>b</p>",
    );
    let html = dom.document_element().unwrap();
    assert_eq!(dom.as_element(html).unwrap().attr("lang"), Some("en"));
    assert_eq!(tags(&dom, html), vec!["head", "body"]);
    let body = dom.body().unwrap();
    assert!(dom.as_element(body).unwrap().has_class("x"));
    assert_eq!(tags(&dom, body), vec!["p", "p"]);
    assert_eq!(dom.text_content(dom.children(html)[0]), "t");
}

#[test]
fn test_empty_source_still_has_body() {
    let dom = parse("");
    let html = dom.document_element().unwrap();
    assert_eq!(tags(&dom, html), vec!["head", "body"]);
    assert!(dom.children(dom.body().unwrap()).is_empty());
}

#[test]
fn test_comments_and_doctype() {
    let dom = parse("<!DOCTYPE html><!-- note --><p>x</p>");
    let kinds: Vec<bool> = dom
        .children(NodeId::ROOT)
        .iter()
        .map(|&c| matches!(dom.get(c).unwrap().node_type, NodeType::Comment(_)))
        .collect();
    assert_eq!(kinds, vec![true, false]);
}

#[test]
fn test_entities() {
    assert_eq!(decode_entities("a&amp;b&lt;&#65;&#x42;&nbsp;"), "a&b<AB\u{a0}");
    assert_eq!(decode_entities("fish & chips"), "fish & chips");
    assert_eq!(decode_entities("&unknown;"), "&unknown;");
}

#[test]
fn test_element_by_id_and_builders() {
    let mut dom = DomTree::new();
    let body = dom.append_element(NodeId::ROOT, ElementData::new("BODY"));
    let p = dom.append_element(body, ElementData::new("p").with_attr("ID", "intro"));
    let _ = dom.append_text(p, "hello");
    assert_eq!(dom.element_by_id("intro"), Some(p));
    assert_eq!(dom.as_element(body).unwrap().tag_name, "body");
    assert_eq!(dom.ancestors(p).collect::<Vec<_>>(), vec![body, NodeId::ROOT]);
}
