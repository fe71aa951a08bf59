//! Anonymous block boxes and flex/grid items.
//!
//! [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)

use std::sync::Arc;

use quire_style::{ComputedStyle, Display};

use crate::boxes::{BoxKind, LayoutBox};

use super::BoxIds;
use super::whitespace::is_collapsible_whitespace;

/// An anonymous block holding `children`.
pub fn anonymous_block(
    parent: &ComputedStyle,
    page: Option<&str>,
    children: Vec<LayoutBox>,
    ids: &mut BoxIds,
) -> LayoutBox {
    let mut b = LayoutBox::new(ids.allocate(), BoxKind::Block, Arc::new(parent.anonymous_child(Display::block())));
    b.anonymous = true;
    b.page_name = page.map(str::to_owned);
    b.children = children;
    b
}

fn is_in_flow_block(b: &LayoutBox) -> bool {
    b.is_in_flow() && b.is_block_level()
}

fn contains_block(inline: &LayoutBox) -> bool {
    inline.children.iter().any(|c| {
        is_in_flow_block(c) || (c.kind == BoxKind::Inline && contains_block(c))
    })
}

/// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box". Parts after the first get fresh ids.
fn split_inline(inline: LayoutBox, ids: &mut BoxIds) -> Vec<LayoutBox> {
    let mut out = Vec::new();
    let mut current = inline.shell();
    current.is_last_fragment = false;
    for child in inline.children {
        if child.kind == BoxKind::Inline && contains_block(&child) {
            for part in split_inline(child, ids) {
                if is_in_flow_block(&part) {
                    out.push(next_part(&mut current, ids));
                    out.push(part);
                } else {
                    current.children.push(part);
                }
            }
        } else if is_in_flow_block(&child) {
            out.push(next_part(&mut current, ids));
            out.push(child);
        } else {
            current.children.push(child);
        }
    }
    current.is_last_fragment = true;
    out.push(current);
    out
}

/// Close the part of a split inline built so far and start the next one.
fn next_part(current: &mut LayoutBox, ids: &mut BoxIds) -> LayoutBox {
    let mut next = current.shell();
    next.id = ids.allocate();
    next.is_first_fragment = false;
    next.is_last_fragment = false;
    std::mem::replace(current, next)
}

/// A run of inline-level content between block-level siblings is wrapped
/// in an anonymous block, unless there is nothing in it to show.
fn flush_run(
    parent: &ComputedStyle,
    page: Option<&str>,
    run: &mut Vec<LayoutBox>,
    out: &mut Vec<LayoutBox>,
    ids: &mut BoxIds,
) {
    if run.is_empty() {
        return;
    }
    let run = std::mem::take(run);
    let visible = run.iter().any(|b| {
        b.is_in_flow() && !is_collapsible_whitespace(b) && !(b.kind == BoxKind::Inline && b.children.is_empty())
    });
    if visible {
        out.push(anonymous_block(parent, page, run, ids));
    } else {
        // "White space content that would subsequently be collapsed away
        // according to the 'white-space' property does not generate any
        // anonymous inline boxes."
        out.extend(run.into_iter().filter(|b| !b.is_in_flow()));
    }
}

/// Children of a block container styled `parent`: either all inline-level
/// or all block-level once inline runs are wrapped.
pub fn block_children(
    parent: &ComputedStyle,
    page: Option<&str>,
    children: Vec<LayoutBox>,
    ids: &mut BoxIds,
) -> Vec<LayoutBox> {
    // STEP 1: Break inlines around the blocks they contain.
    let mut split = Vec::with_capacity(children.len());
    for child in children {
        if child.kind == BoxKind::Inline && contains_block(&child) {
            split.extend(split_inline(child, ids));
        } else {
            split.push(child);
        }
    }
    if !split.iter().any(is_in_flow_block) {
        return split;
    }

    // STEP 2: Wrap the inline runs.
    let mut out = Vec::with_capacity(split.len());
    let mut run = Vec::new();
    for child in split {
        if is_in_flow_block(&child) {
            flush_run(parent, page, &mut run, &mut out, ids);
            out.push(child);
        } else {
            run.push(child);
        }
    }
    flush_run(parent, page, &mut run, &mut out, ids);
    out
}

/// [CSS Flexbox § 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
/// and [CSS Grid § 6 Grid Items](https://www.w3.org/TR/css-grid-1/#grid-items)
///
/// "Each in-flow child of a flex container becomes a flex item, and each
/// contiguous sequence of child text runs is wrapped in an anonymous block
/// container flex item. However, if the entire sequence of child text runs
/// contains only white space ... it is instead not rendered". Items are
/// blockified.
pub fn container_items(
    parent: &ComputedStyle,
    page: Option<&str>,
    children: Vec<LayoutBox>,
    ids: &mut BoxIds,
) -> Vec<LayoutBox> {
    let is_text_run = |b: &LayoutBox| {
        matches!(
            b.kind,
            BoxKind::Text(_) | BoxKind::PageText(_) | BoxKind::LineBreak | BoxKind::Leader(_)
        )
    };
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for mut child in children {
        if is_text_run(&child) {
            run.push(child);
            continue;
        }
        flush_text(parent, page, &mut run, &mut out, ids);
        if child.style.display.is_inline_level() {
            let mut style = (*child.style).clone();
            style.display = style.display.blockified();
            child.style = Arc::new(style);
        }
        if child.kind == BoxKind::Inline {
            child.kind = BoxKind::Block;
            child.children = block_children(&Arc::clone(&child.style), page, std::mem::take(&mut child.children), ids);
        }
        out.push(child);
    }
    flush_text(parent, page, &mut run, &mut out, ids);
    out
}

fn flush_text(
    parent: &ComputedStyle,
    page: Option<&str>,
    run: &mut Vec<LayoutBox>,
    out: &mut Vec<LayoutBox>,
    ids: &mut BoxIds,
) {
    if run.iter().all(is_collapsible_whitespace) {
        run.clear();
        return;
    }
    out.push(anonymous_block(parent, page, std::mem::take(run), ids));
}

/// Put an outside marker next to the first line of `container`.
///
/// [CSS Lists § 3.1](https://www.w3.org/TR/css-lists-3/#marker-pseudo) The
/// marker box is placed outside the principal box, beside its first line
/// box, which may sit in a nested block. A first child that holds no lines
/// (a table, flex or grid box) gets an anonymous line of its own.
pub fn insert_marker(container: &mut LayoutBox, marker: LayoutBox, ids: &mut BoxIds) {
    let first = container
        .children
        .iter()
        .enumerate()
        .find(|(_, c)| c.is_in_flow())
        .map(|(i, c)| (i, c.kind == BoxKind::Block, c.is_block_level()));
    match first {
        Some((i, true, true)) => {
            if let Some(child) = container.children.get_mut(i) {
                insert_marker(child, marker, ids);
            }
        }
        Some((i, false, true)) => {
            let style = Arc::clone(&container.style);
            let line = anonymous_block(&style, container.page_name.as_deref(), vec![marker], ids);
            container.children.insert(i, line);
        }
        _ => container.children.insert(0, marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::boxes::BoxId;

    fn styled(kind: BoxKind, display: Display, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = display;
        let mut b = LayoutBox::new(BoxId(900), kind, Arc::new(style));
        b.children = children;
        b
    }

    fn text(s: &str) -> LayoutBox {
        styled(BoxKind::Text(s.into()), Display::inline(), vec![])
    }

    fn block(children: Vec<LayoutBox>) -> LayoutBox {
        styled(BoxKind::Block, Display::block(), children)
    }

    #[test]
    fn test_inline_runs_wrapped_beside_blocks() {
        let parent = ComputedStyle::initial();
        let children = vec![text("a"), block(vec![]), text("  \n"), block(vec![]), text("b")];
        let out = block_children(&parent, None, children, &mut BoxIds::new());
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(LayoutBox::is_block_level));
        assert!(out[0].anonymous && out[3].anonymous);
        assert_eq!(out[3].text(), "b");
    }

    #[test]
    fn test_inline_split_around_block() {
        let parent = ComputedStyle::initial();
        let span = styled(BoxKind::Inline, Display::inline(), vec![text("a"), block(vec![text("b")]), text("c")]);
        let out = block_children(&parent, None, vec![span], &mut BoxIds::new());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text(), "a");
        assert_eq!(out[0].children[0].id, BoxId(900));
        assert!(!out[0].children[0].is_last_fragment);
        assert_eq!(out[1].text(), "b");
        assert_eq!(out[2].text(), "c");
        assert!(!out[2].children[0].is_first_fragment);
        assert_ne!(out[2].children[0].id, BoxId(900));
    }

    #[test]
    fn test_flex_items_blockified() {
        let parent = ComputedStyle::initial();
        let span = styled(BoxKind::Inline, Display::inline(), vec![text("x")]);
        let out = container_items(&parent, None, vec![text(" "), span, text("y")], &mut BoxIds::new());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, BoxKind::Block);
        assert!(out[0].style.display.is_block_level());
        assert!(out[1].anonymous);
    }

    #[test]
    fn test_marker_goes_to_first_line() {
        let inner = block(vec![text("a")]);
        let mut item = block(vec![inner]);
        let mut marker = styled(BoxKind::Inline, Display::inline(), vec![text("1. ")]);
        marker.outside_marker = true;
        insert_marker(&mut item, marker, &mut BoxIds::new());
        assert!(item.children[0].children[0].outside_marker);
    }
}
