//! Integration tests for block, inline, flex, grid and table layout.

mod common;

use common::{by_id, render_small, root};

// ---------------------------------------------------------------------------
// Block layout
//
// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//
// "When two or more margins collapse, the resulting margin width is the
// maximum of the collapsing margins' widths."
// ---------------------------------------------------------------------------

#[test]
fn test_sibling_margins_collapse() {
    let document = render_small(
        "<div id=a></div><div id=b></div>",
        "div { height: 20px; margin: 10px }",
    );
    let a = by_id(&document, "a");
    let b = by_id(&document, "b");
    assert_eq!(a.border_box_y(), 10.0);
    let gap = b.border_box_y() - (a.border_box_y() + a.border_height());
    assert_eq!(gap, 10.0);
}

#[test]
fn test_auto_margins_center() {
    let document = render_small("<div id=a></div>", "#a { width: 40px; height: 1px; margin: 0 auto }");
    let a = by_id(&document, "a");
    assert_eq!(a.content_box_x(), 30.0);
    assert_eq!(a.margin.left, 30.0);
    assert_eq!(a.margin.right, 30.0);
}

#[test]
fn test_percentages_and_box_sizing() {
    let document = render_small(
        "<div id=a></div>",
        "#a { width: 50%; padding: 5px; border: 2px solid black; box-sizing: border-box; height: 1px }",
    );
    let a = by_id(&document, "a");
    assert_eq!(a.border_width(), 50.0);
    assert_eq!(a.width, 36.0);
}

#[test]
fn test_float_shortens_lines() {
    let document = render_small(
        "<div id=f></div><p id=p>aa</p>",
        "body { font-size: 10px; line-height: 10px } p { margin: 0 } \
         #f { float: left; width: 30px; height: 30px }",
    );
    let p = by_id(&document, "p");
    assert_eq!(p.position_y, 0.0);
    let line = p.lines()[0];
    assert_eq!(line.children[0].position_x, 30.0);
}

#[test]
fn test_clearance_moves_below_float() {
    let document = render_small(
        "<div id=f></div><div id=c></div>",
        "#f { float: left; width: 30px; height: 30px } #c { clear: both; height: 5px }",
    );
    assert_eq!(by_id(&document, "c").border_box_y(), 30.0);
}

#[test]
fn test_relative_offset_keeps_flow() {
    let document = render_small(
        "<div id=a></div><div id=b></div>",
        "div { height: 10px } #a { position: relative; top: 5px; left: 3px }",
    );
    let a = by_id(&document, "a");
    assert_eq!((a.border_box_x(), a.border_box_y()), (3.0, 5.0));
    assert_eq!(by_id(&document, "b").border_box_y(), 10.0);
}

#[test]
fn test_relative_offset_applies_to_flex_items() {
    let document = render_small(
        "<div id=f><div id=a></div><div id=b></div></div>",
        "#f { display: flex } #f div { width: 10px; height: 10px } \
         #b { position: relative; left: 2px; top: 1px }",
    );
    assert_eq!(by_id(&document, "a").border_box_x(), 0.0);
    let b = by_id(&document, "b");
    assert_eq!((b.border_box_x(), b.border_box_y()), (12.0, 1.0));
}

#[test]
fn test_absolute_box_in_positioned_ancestor() {
    let document = render_small(
        "<div id=cb><div id=abs></div></div>",
        "#cb { position: relative; margin-left: 10px; height: 50px } \
         #abs { position: absolute; right: 0; top: 4px; width: 20px; height: 20px }",
    );
    let abs = by_id(&document, "abs");
    assert_eq!(abs.border_box_x(), 80.0);
    assert_eq!(abs.border_box_y(), 4.0);
}

// ---------------------------------------------------------------------------
// Inline layout
// ---------------------------------------------------------------------------

#[test]
fn test_text_wraps_to_width() {
    let document = render_small(
        "<p id=p>aaa bbb ccc</p>",
        "p { margin: 0; width: 40px; font-size: 10px; line-height: 10px }",
    );
    let p = by_id(&document, "p");
    let lines: Vec<String> = p.lines().iter().map(|l| l.text().trim_end().to_string()).collect();
    assert_eq!(lines, vec!["aaa", "bbb", "ccc"]);
    assert_eq!(p.height, 30.0);
}

#[test]
fn test_center_aligned_line() {
    let document = render_small(
        "<p id=p>ab</p>",
        "p { margin: 0; text-align: center; font-size: 10px }",
    );
    let line = by_id(&document, "p").lines()[0];
    assert_eq!(line.children[0].position_x, 40.0);
}

#[test]
fn test_list_marker_sits_outside() {
    let document = render_small(
        "<ul><li id=i>x</li></ul>",
        "ul { margin: 0; padding-left: 30px; font-size: 10px }",
    );
    let item = by_id(&document, "i");
    let marker = item
        .descendants()
        .into_iter()
        .find(|b| b.outside_marker)
        .expect("an outside marker");
    assert!(marker.border_box_x() + marker.border_width() <= item.content_box_x());
    assert!(marker.text().contains('•'));
}

// ---------------------------------------------------------------------------
// Flex and grid
// ---------------------------------------------------------------------------

#[test]
fn test_flex_items_share_width() {
    let document = render_small(
        "<div id=f><div></div><div></div><div></div></div>",
        "#f { display: flex; width: 90px } #f div { flex: 1; height: 5px }",
    );
    let widths: Vec<f32> = by_id(&document, "f").children.iter().map(|c| c.width).collect();
    assert_eq!(widths, vec![30.0, 30.0, 30.0]);
}

#[test]
fn test_flex_wraps_lines() {
    let document = render_small(
        "<div id=f><div></div><div></div><div></div></div>",
        "#f { display: flex; flex-wrap: wrap; width: 50px } #f div { width: 20px; height: 5px }",
    );
    let f = by_id(&document, "f");
    let ys: Vec<f32> = f.children.iter().map(|c| c.position_y - f.content_box_y()).collect();
    assert_eq!(ys, vec![0.0, 0.0, 5.0]);
    assert_eq!(f.height, 10.0);
}

/// `auto` takes the content width, `1fr` the rest; the second row starts
/// below the first.
#[test]
fn test_grid_auto_and_fr_columns() {
    let document = render_small(
        "<article id=g><div>a</div><div>b</div><div>c</div><div>d</div></article>",
        "#g { display: grid; grid-template-columns: auto 1fr; width: 10px; \
              font-size: 2px; line-height: 1 }",
    );
    let grid = by_id(&document, "g");
    let x0 = grid.content_box_x();
    let y0 = grid.content_box_y();
    let cells: Vec<(f32, f32, f32)> = grid
        .children
        .iter()
        .map(|c| (c.position_x - x0, c.position_y - y0, c.width))
        .collect();
    let row_height = grid.children[0].margin_height();
    assert_eq!(row_height, 2.0);
    assert_eq!(
        cells,
        vec![(0.0, 0.0, 2.0), (2.0, 0.0, 8.0), (0.0, row_height, 2.0), (2.0, row_height, 8.0)]
    );
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[test]
fn test_fixed_table_columns_fill_width() {
    let document = render_small(
        "<table id=t><tr><td id=a>x</td><td id=b>y</td></tr></table>",
        "table { table-layout: fixed; width: 100px; border-spacing: 0 } \
         td { padding: 0 } #a { width: 30px }",
    );
    let a = by_id(&document, "a");
    let b = by_id(&document, "b");
    assert_eq!(a.border_width(), 30.0);
    assert_eq!(b.border_width(), 70.0);
    assert_eq!(a.border_width() + b.border_width(), by_id(&document, "t").border_width());
}

#[test]
fn test_misparented_cells_get_a_table() {
    let document = render_small(
        "<div id=d><span style='display: table-cell'>a</span><span style='display: table-cell'>b</span></div>",
        "",
    );
    let d = by_id(&document, "d");
    let wrapper = &d.children[0];
    assert!(wrapper.anonymous);
    assert_eq!(wrapper.text(), "ab");
}

// ---------------------------------------------------------------------------
// Styles reaching layout
// ---------------------------------------------------------------------------

#[test]
fn test_variables_resolve_through_chain() {
    let document = render_small(
        "",
        "html { --var2: 10px; --var1: var(--var2); width: var(--var1) }",
    );
    assert_eq!(root(&document.pages[0]).width, 10.0);
}

#[test]
fn test_variable_cycle_falls_back_to_initial() {
    let document = render_small(
        "",
        "html { --a: var(--b); --b: var(--a); width: var(--a) }",
    );
    assert_eq!(root(&document.pages[0]).width, 100.0);
}

#[test]
fn test_display_none_generates_nothing() {
    let document = render_small("<div id=a style='display: none'>x</div><div id=b>y</div>", "");
    let html = root(&document.pages[0]);
    assert!(html.find_by_id("a").is_none());
    assert_eq!(html.text(), "y");
}
