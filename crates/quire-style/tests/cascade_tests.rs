//! Integration tests for style resolution over whole documents.

use quire_dom::{DomTree, ElementData, NodeId};
use quire_style::content::{Content, ContentItem, CounterStyle};
use quire_style::keywords::{Float, WhiteSpace};
use quire_style::values::{LengthPercentageAuto, Size};
use quire_style::{Display, PseudoElement, RuleResolver, StyleResolver};

fn resolve(markup: &str, css: &str) -> (DomTree, RuleResolver) {
    let dom = quire_dom::markup::parse(markup);
    let resolver = RuleResolver::new(&dom, &[css]);
    (dom, resolver)
}

fn by_id(dom: &DomTree, id: &str) -> NodeId {
    dom.element_by_id(id).unwrap()
}

#[test]
fn test_css_variables_resolve_through_a_chain() {
    let (dom, resolver) = resolve(
        "<html></html>",
        "html { --var2: 10px; --var1: var(--var2); width: var(--var1) }",
    );
    let html = dom.document_element().unwrap();
    assert_eq!(resolver.style_for(html, None).unwrap().width, Size::Length(10.0));
}

#[test]
fn test_css_variable_cycle_falls_back_to_initial() {
    let (dom, resolver) = resolve(
        "<html></html>",
        "html { --var1: var(--var3); --var2: var(--var1); --var3: var(--var2); width: var(--var1) }",
    );
    let html = dom.document_element().unwrap();
    assert_eq!(resolver.style_for(html, None).unwrap().width, Size::Auto);
    assert!(resolver.warnings().iter().any(|w| w.contains("cycle")));
}

#[test]
fn test_variables_inherit_into_children() {
    let (dom, resolver) = resolve(
        r#"<html><body><div id="d"></div></body></html>"#,
        "html { --gap: 7px } #d { margin-top: var(--gap); margin-left: var(--missing, 3px) }",
    );
    let style = resolver.style_for(by_id(&dom, "d"), None).unwrap();
    assert_eq!(style.margin.top, LengthPercentageAuto::Length(7.0));
    assert_eq!(style.margin.left, LengthPercentageAuto::Length(3.0));
}

#[test]
fn test_ua_defaults_apply_by_tag() {
    let (dom, resolver) = resolve(
        r#"<html><head><title>t</title></head><body><pre id="p">x</pre><li id="l">y</li></body></html>"#,
        "",
    );
    let pre = resolver.style_for(by_id(&dom, "p"), None).unwrap();
    assert_eq!(pre.white_space, WhiteSpace::Pre);
    assert!(pre.display.is_block_level());
    let li = by_id(&dom, "l");
    assert!(resolver.style_for(li, None).unwrap().display.is_list_item());
    assert!(resolver.style_for(li, Some(PseudoElement::Marker)).is_some());

    let head = dom.children(dom.document_element().unwrap())[0];
    assert_eq!(resolver.style_for(head, None).unwrap().display, Display::None);
    let title = dom.children(head)[0];
    assert!(resolver.style_for(title, None).is_none());
}

#[test]
fn test_embedded_style_elements_come_before_author_sheets() {
    let (dom, resolver) = resolve(
        r#"<html><head><style>#d { width: 1px }</style></head><body><div id="d"></div></body></html>"#,
        "#d { width: 2px }",
    );
    assert_eq!(resolver.style_for(by_id(&dom, "d"), None).unwrap().width, Size::Length(2.0));
}

#[test]
fn test_footnote_pseudo_elements() {
    let (dom, resolver) = resolve(
        r#"<html><body><p>a<span id="n">note</span></p></body></html>"#,
        "#n { float: footnote }",
    );
    let note = by_id(&dom, "n");
    let style = resolver.style_for(note, None).unwrap();
    assert_eq!(style.float, Float::Footnote);
    assert!(style.display.is_block_level());
    let call = resolver.style_for(note, Some(PseudoElement::FootnoteCall)).unwrap();
    assert_eq!(
        call.content,
        Content::Items(vec![ContentItem::Counter {
            name: "footnote".into(),
            style: CounterStyle::Decimal,
        }])
    );
    assert!(resolver.style_for(note, Some(PseudoElement::FootnoteMarker)).is_some());
}

#[test]
fn test_important_style_attribute_beats_important_rule() {
    let (dom, resolver) = resolve(
        r#"<html><body><div id="d" style="width: 5px !important"></div></body></html>"#,
        "#d { width: 9px !important }",
    );
    assert_eq!(resolver.style_for(by_id(&dom, "d"), None).unwrap().width, Size::Length(5.0));
}

#[test]
fn test_built_tree_without_markup() {
    let mut dom = DomTree::new();
    let html = dom.append_element(NodeId::ROOT, ElementData::new("html"));
    let body = dom.append_element(html, ElementData::new("body"));
    let div = dom.append_element(body, ElementData::new("div").with_attr("class", "x y"));
    let resolver = RuleResolver::new(&dom, &[".x.y { height: 4px } body > .x { width: 3px }"]);
    let style = resolver.style_for(div, None).unwrap();
    assert_eq!(style.height, Size::Length(4.0));
    assert_eq!(style.width, Size::Length(3.0));
}
