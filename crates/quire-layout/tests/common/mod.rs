//! Shared helpers for layout integration tests.

#![allow(dead_code)]

use quire_dom::markup;
use quire_layout::{Document, LayoutBox, LayoutOptions, Page, layout};
use quire_style::RuleResolver;

/// Page rules most tests start from: a small page with no margins and no
/// body margin.
pub const BASE_CSS: &str = "@page { size: 100px 100px; margin: 0 } body { margin: 0 }";

/// Lay out `html` styled with `css`.
pub fn render(html: &str, css: &str) -> Document {
    let dom = markup::parse(html);
    let resolver = RuleResolver::new(&dom, &[css]);
    layout(&dom, &resolver, &LayoutOptions::default())
}

/// Lay out `html` with [`BASE_CSS`] followed by `css`.
pub fn render_small(html: &str, css: &str) -> Document {
    render(html, &format!("{BASE_CSS} {css}"))
}

/// The root element's fragment on `page`.
pub fn root(page: &Page) -> &LayoutBox {
    page.document_fragment().expect("page should hold the root element")
}

/// The first box with element id `id` on the first page.
pub fn by_id<'a>(document: &'a Document, id: &str) -> &'a LayoutBox {
    root(&document.pages[0])
        .find_by_id(id)
        .unwrap_or_else(|| panic!("no box with id {id}"))
}

/// Text laid out on every page, in page order.
pub fn page_texts(document: &Document) -> Vec<String> {
    document
        .pages
        .iter()
        .map(|p| p.document_fragment().map(LayoutBox::text).unwrap_or_default())
        .collect()
}
