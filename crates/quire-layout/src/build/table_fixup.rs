//! Anonymous table objects.
//!
//! [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
//!
//! The layout of tables assumes the canonical structure: a wrapper holding
//! captions and a table, the table holding column groups, columns and row
//! groups, row groups holding rows and rows holding cells. Boxes missing
//! from a document are generated here, bottom up.

use std::sync::Arc;

use quire_style::display::{InnerDisplayType, InternalDisplay, OuterDisplayType};
use quire_style::{ComputedStyle, Display};

use crate::boxes::{BoxKind, LayoutBox};

use super::BoxIds;
use super::whitespace::is_collapsible_whitespace;

/// "A 'table-row-group', 'table-header-group', 'table-footer-group',
/// 'table-column', 'table-column-group', 'table-caption' or 'table-row'
/// box": everything that belongs directly in a table.
const fn is_proper_table_child(b: &LayoutBox) -> bool {
    matches!(
        b.kind,
        BoxKind::TableRowGroup
            | BoxKind::TableRow
            | BoxKind::TableColumnGroup
            | BoxKind::TableColumn
            | BoxKind::TableCaption
    )
}

/// Boxes that need a table around them.
const fn is_table_part(b: &LayoutBox) -> bool {
    is_proper_table_child(b) || matches!(b.kind, BoxKind::TableCell)
}

fn anonymous(parent: &ComputedStyle, kind: BoxKind, display: Display, children: Vec<LayoutBox>, ids: &mut BoxIds) -> LayoutBox {
    let mut b = LayoutBox::new(ids.allocate(), kind, Arc::new(parent.anonymous_child(display)));
    b.anonymous = true;
    b.page_name = children.first().and_then(|c| c.page_name.clone());
    b.children = children;
    b
}

/// Group consecutive children failing `keep` and hand each group to
/// `wrap`; children passing `keep` stay as they are.
fn wrap_runs(
    children: Vec<LayoutBox>,
    keep: impl Fn(&LayoutBox) -> bool,
    mut wrap: impl FnMut(Vec<LayoutBox>) -> LayoutBox,
) -> Vec<LayoutBox> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if keep(&child) {
            if !run.is_empty() {
                out.push(wrap(std::mem::take(&mut run)));
            }
            out.push(child);
        } else {
            run.push(child);
        }
    }
    if !run.is_empty() {
        out.push(wrap(run));
    }
    out
}

/// Rule 1: white space directly inside tables, row groups and rows is not
/// rendered.
fn drop_white_space(children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    children.into_iter().filter(|c| !is_collapsible_whitespace(c)).collect()
}

/// Children of a row: "If a child C of a 'table-row' box is not a
/// 'table-cell', then generate an anonymous 'table-cell' box around C and
/// all consecutive siblings of C that are not 'table-cell' boxes."
pub fn row_children(row: &ComputedStyle, children: Vec<LayoutBox>, ids: &mut BoxIds) -> Vec<LayoutBox> {
    wrap_runs(
        drop_white_space(children),
        |c| c.kind == BoxKind::TableCell,
        |run| {
            let display = Display::Internal(InternalDisplay::TableCell);
            anonymous(row, BoxKind::TableCell, display, run, ids)
        },
    )
}

/// An anonymous row around `run`, with cells as needed.
fn anonymous_row(parent: &ComputedStyle, run: Vec<LayoutBox>, ids: &mut BoxIds) -> LayoutBox {
    let display = Display::Internal(InternalDisplay::TableRow);
    let mut row = anonymous(parent, BoxKind::TableRow, display, Vec::new(), ids);
    let row_style = Arc::clone(&row.style);
    row.page_name = run.first().and_then(|c| c.page_name.clone());
    row.children = row_children(&row_style, run, ids);
    row
}

/// Children of a row group: runs of anything but rows go in an anonymous
/// row.
pub fn row_group_children(group: &ComputedStyle, children: Vec<LayoutBox>, ids: &mut BoxIds) -> Vec<LayoutBox> {
    wrap_runs(
        drop_white_space(children),
        |c| c.kind == BoxKind::TableRow,
        |run| anonymous_row(group, run, ids),
    )
}

/// [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
///
/// Turn a table box with its raw children into the table wrapper box. The
/// wrapper keeps the identity of the element and the properties that act
/// on the wrapper (position, float, margins, breaks); the table box keeps
/// the rest.
pub fn wrap_table(table: LayoutBox, ids: &mut BoxIds) -> LayoutBox {
    let mut table = table;
    let style = Arc::clone(&table.style);
    let children = drop_white_space(std::mem::take(&mut table.children));

    // STEP 1: Missing rows around non-table children.
    //
    // "If a child C of a 'table' or 'inline-table' box is not a proper
    // table child, then generate an anonymous 'table-row' box around C and
    // all consecutive siblings of C that are not proper table children."
    let children = wrap_runs(children, is_proper_table_child, |run| anonymous_row(&style, run, ids));

    // STEP 2: Captions go to the wrapper; columns stay; rows go in row
    // groups.
    let mut captions = Vec::new();
    let mut rest = Vec::new();
    for child in children {
        if child.kind == BoxKind::TableCaption {
            captions.push(child);
        } else {
            rest.push(child);
        }
    }
    table.children = wrap_runs(
        rest,
        |c| c.kind != BoxKind::TableRow,
        |run| {
            let display = Display::Internal(InternalDisplay::TableRowGroup);
            anonymous(&style, BoxKind::TableRowGroup, display, run, ids)
        },
    );

    // STEP 3: Split the styles.
    //
    // "The computed values of properties 'position', 'float', 'margin-*',
    // 'top', 'right', 'bottom', and 'left' on the table element are used on
    // the table wrapper box and not the table box; all other values of
    // non-inheritable properties are used on the table box and not the
    // table wrapper box."
    let initial = ComputedStyle::initial();
    let mut wrapper_style = (*style).clone();
    wrapper_style.width = initial.width;
    wrapper_style.height = initial.height;
    wrapper_style.min_width = initial.min_width;
    wrapper_style.min_height = initial.min_height;
    wrapper_style.max_width = initial.max_width;
    wrapper_style.max_height = initial.max_height;
    wrapper_style.padding = initial.padding.clone();
    wrapper_style.border = initial.border.clone();
    wrapper_style.background_color = initial.background_color;
    wrapper_style.overflow = initial.overflow;
    let mut table_style = (*style).clone();
    table_style.margin = initial.margin.clone();
    table_style.position = initial.position;
    table_style.float = initial.float;
    table_style.top = initial.top;
    table_style.right = initial.right;
    table_style.bottom = initial.bottom;
    table_style.left = initial.left;
    table_style.break_before = initial.break_before;
    table_style.break_after = initial.break_after;

    let mut wrapper = table.shell();
    wrapper.kind = BoxKind::TableWrapper;
    wrapper.style = Arc::new(wrapper_style);
    table.id = ids.allocate();
    table.tag = None;
    table.element_id = None;
    table.style = Arc::new(table_style);
    wrapper.children = captions;
    wrapper.children.push(table);
    wrapper
}

/// Rule 3: table parts whose parent is not a table get an anonymous table
/// ("inline-table" inside inline boxes) around each run of them.
/// White space between two table parts belongs to the run.
pub fn wrap_orphans(parent: &ComputedStyle, children: Vec<LayoutBox>, inline: bool, ids: &mut BoxIds) -> Vec<LayoutBox> {
    if !children.iter().any(is_table_part) {
        return children;
    }
    let outer = if inline {
        OuterDisplayType::Inline
    } else {
        OuterDisplayType::Block
    };
    let display = Display::Pair {
        outer,
        inner: InnerDisplayType::Table,
        list_item: false,
    };
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<LayoutBox> = Vec::new();
    let mut pending_space = Vec::new();
    for child in children {
        if is_table_part(&child) {
            // Space between two parts is dropped with the run.
            pending_space.clear();
            run.push(child);
        } else if !run.is_empty() && is_collapsible_whitespace(&child) {
            pending_space.push(child);
        } else {
            if !run.is_empty() {
                let table = anonymous(parent, BoxKind::Table, display, std::mem::take(&mut run), ids);
                out.push(wrap_table(table, ids));
            }
            out.append(&mut pending_space);
            out.push(child);
        }
    }
    if !run.is_empty() {
        let table = anonymous(parent, BoxKind::Table, display, run, ids);
        out.push(wrap_table(table, ids));
    }
    out.append(&mut pending_space);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::boxes::BoxId;

    fn part(kind: BoxKind, children: Vec<LayoutBox>) -> LayoutBox {
        let mut b = LayoutBox::new(BoxId(500), kind, Arc::new(ComputedStyle::initial()));
        b.children = children;
        b
    }

    fn text(s: &str) -> LayoutBox {
        part(BoxKind::Text(s.into()), vec![])
    }

    #[test]
    fn test_cell_in_block_gets_full_table() {
        let parent = ComputedStyle::initial();
        let out = wrap_orphans(
            &parent,
            vec![text("a"), part(BoxKind::TableCell, vec![]), text(" "), part(BoxKind::TableCell, vec![])],
            false,
            &mut BoxIds::new(),
        );
        assert_eq!(out.len(), 2);
        let wrapper = &out[1];
        assert_eq!(wrapper.kind, BoxKind::TableWrapper);
        assert!(wrapper.is_block_level());
        let table = &wrapper.children[0];
        assert_eq!(table.kind, BoxKind::Table);
        let group = &table.children[0];
        assert_eq!(group.kind, BoxKind::TableRowGroup);
        let row = &group.children[0];
        assert_eq!(row.kind, BoxKind::TableRow);
        assert_eq!(row.children.len(), 2);
    }

    #[test]
    fn test_table_keeps_captions_on_wrapper() {
        let table = part(
            BoxKind::Table,
            vec![
                text("\n  "),
                part(BoxKind::TableCaption, vec![text("c")]),
                part(BoxKind::TableRow, vec![part(BoxKind::TableCell, vec![])]),
                part(BoxKind::TableRow, vec![part(BoxKind::TableCell, vec![])]),
                part(BoxKind::TableRowGroup, vec![]),
            ],
        );
        let wrapper = wrap_table(table, &mut BoxIds::new());
        assert_eq!(wrapper.id, BoxId(500));
        let kinds: Vec<&BoxKind> = wrapper.children.iter().map(|c| &c.kind).collect();
        assert_eq!(kinds, vec![&BoxKind::TableCaption, &BoxKind::Table]);
        let table = &wrapper.children[1];
        assert_ne!(table.id, BoxId(500));
        assert_eq!(table.children.len(), 2);
        assert!(table.children[0].anonymous);
        assert_eq!(table.children[0].children.len(), 2);
    }

    #[test]
    fn test_text_in_row_gets_cell() {
        let style = ComputedStyle::initial();
        let out = row_children(&style, vec![text("x"), part(BoxKind::TableCell, vec![])], &mut BoxIds::new());
        assert_eq!(out.len(), 2);
        assert!(out[0].anonymous);
        assert_eq!(out[0].kind, BoxKind::TableCell);
    }
}
