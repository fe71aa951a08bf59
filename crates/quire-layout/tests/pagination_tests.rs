//! Integration tests for pagination, page rules, footnotes and margin boxes.

mod common;

use common::{page_texts, render, render_small, root};
use quire_layout::LayoutBox;
use quire_style::values::Color;

/// [§ 4.2 :nth()](https://www.w3.org/TR/css-page-3/#nth-selector)
#[test]
fn test_nth_pages_are_red() {
    let html = "<p></p><p class=b></p><p class=b></p><p class=b></p><p class=b></p>\
                <p class=b></p><p class=b></p><p class=b></p><p class=b></p><p class=b></p>";
    let document = render(
        html,
        "@page { size: 1px 1px } @page:nth(2n) { background: red } \
         @page { margin: 0 } html, body, p { margin: 0 } p { height: 1px } \
         .b { break-before: page }",
    );
    assert_eq!(document.pages.len(), 10);
    for (i, page) in document.pages.iter().enumerate() {
        let even = (i + 1) % 2 == 0;
        assert_eq!(page.background == Color::RED, even, "page {}", i + 1);
        assert_eq!((page.width, page.height), (1.0, 1.0));
    }
}

#[test]
fn test_lines_flow_over_pages() {
    let html = "<p>l1<br>l2<br>l3<br>l4<br>l5<br>l6<br>l7</p>";
    let document = render_small(
        html,
        "@page { size: 100px 30px } p { margin: 0; font-size: 10px; line-height: 10px; orphans: 1; widows: 1 }",
    );
    let texts = page_texts(&document);
    assert_eq!(texts, vec!["l1l2l3", "l4l5l6", "l7"]);
    let p = root(&document.pages[1]).find_by_tag("p")[0];
    assert!(!p.is_first_fragment);
    assert!(!p.is_last_fragment);
}

#[test]
fn test_widows_pull_lines_over() {
    let html = "<p>l1<br>l2<br>l3<br>l4</p>";
    let document = render_small(
        html,
        "@page { size: 100px 30px } p { margin: 0; font-size: 10px; line-height: 10px; orphans: 1; widows: 2 }",
    );
    assert_eq!(page_texts(&document), vec!["l1l2", "l3l4"]);
}

#[test]
fn test_break_inside_avoid_moves_block() {
    let document = render_small(
        "<div id=a></div><div id=b></div>",
        "#a { height: 80px } #b { height: 30px; break-inside: avoid }",
    );
    let second = root(&document.pages[1]);
    assert!(second.find_by_id("b").is_some());
    assert!(root(&document.pages[0]).find_by_id("b").is_none());
}

#[test]
fn test_right_break_inserts_blank_page() {
    let document = render_small(
        "<div>a</div><div class=r>b</div>",
        ".r { break-before: right } @page :blank { background: red }",
    );
    assert_eq!(document.pages.len(), 3);
    assert!(document.pages[1].page_type.blank);
    assert_eq!(document.pages[1].background, Color::RED);
    assert!(document.pages[1].document_fragment().is_none());
    assert_eq!(page_texts(&document)[2], "b");
}

#[test]
fn test_named_pages_change_size() {
    let document = render_small(
        "<div>a</div><div class=c>b</div><div class=c>c</div>",
        "@page wide { size: 200px 50px } .c { page: wide }",
    );
    assert_eq!(document.pages.len(), 2);
    assert_eq!(document.pages[0].width, 100.0);
    assert_eq!(document.pages[1].width, 200.0);
    assert_eq!(document.pages[1].page_type.name.as_deref(), Some("wide"));
    assert_eq!(page_texts(&document)[1], "bc");
}

#[test]
fn test_margin_boxes_count_pages() {
    let document = render(
        "<div>a</div><div class=b>b</div><div class=b>c</div>",
        "@page { size: 100px 100px; margin: 20px; \
           @bottom-center { content: counter(page) '/' counter(pages) } } \
         .b { break-before: page }",
    );
    let labels: Vec<String> = document
        .pages
        .iter()
        .map(|p| p.margin_boxes.iter().map(LayoutBox::text).collect())
        .collect();
    assert_eq!(labels, vec!["1/3", "2/3", "3/3"]);
    let bottom = &document.pages[0].margin_boxes[0];
    assert!(bottom.border_box_y() >= 80.0);
}

#[test]
fn test_fixed_box_on_every_page() {
    let document = render_small(
        "<div id=f></div><div>a</div><div class=b>b</div>",
        "#f { position: fixed; bottom: 0; height: 5px; width: 5px } .b { break-before: page }",
    );
    assert_eq!(document.pages.len(), 2);
    for page in &document.pages {
        let fixed: Vec<&LayoutBox> = page
            .all_boxes()
            .into_iter()
            .filter(|b| b.element_id.as_deref() == Some("f") && b.width == 5.0)
            .collect();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].border_box_y(), 95.0);
    }
}

// ---------------------------------------------------------------------------
// Footnotes
//
// [GCPM § 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
// ---------------------------------------------------------------------------

#[test]
fn test_footnote_goes_to_page_bottom() {
    let document = render_small(
        "<p>text<span class=fn>note</span></p>",
        "p { margin: 0 } body { font-size: 10px; line-height: 10px } .fn { float: footnote }",
    );
    assert_eq!(document.pages.len(), 1);
    let page = &document.pages[0];
    let area = page.footnote_area.as_ref().expect("a footnote area");
    assert!(area.text().contains("note"));
    assert!(area.text().starts_with("1."));
    assert_eq!(area.border_box_y() + area.border_height(), 100.0);

    let body = root(page).text();
    assert!(body.starts_with("text1"), "{body:?}");
    assert!(!body.contains("note"));
}

#[test]
fn test_footnotes_number_in_order() {
    let document = render_small(
        "<p>a<span class=fn>x</span> b<span class=fn>y</span></p>",
        ".fn { float: footnote }",
    );
    let area = document.pages[0].footnote_area.as_ref().expect("a footnote area");
    let text = area.text();
    let x = text.find("1.").unwrap_or(usize::MAX);
    let y = text.find("2.").unwrap_or(usize::MAX);
    assert!(x < y, "{text:?}");
}

#[test]
fn test_footnote_area_takes_room_from_flow() {
    let document = render_small(
        "<div class=l>1</div><div class=l>2<span class=fn>n</span></div><div class=l>3</div>",
        "body { font-size: 10px; line-height: 10px } \
         .l { height: 32px; break-inside: avoid } .fn { float: footnote }",
    );
    // Three 32px blocks fit a 100px page only without the 10px footnote.
    assert_eq!(document.pages.len(), 2);
    assert!(document.pages[0].footnote_area.is_some());
    assert_eq!(page_texts(&document)[1], "3");
}
