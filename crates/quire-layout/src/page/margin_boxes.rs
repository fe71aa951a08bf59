//! Page-margin boxes.
//!
//! [§ 5.3 Page-Margin Boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
//!
//! Margin boxes are laid out once the page count is known, so their
//! `counter(pages)` is exact on every pass.

use std::sync::Arc;

use quire_style::content::{Content, ContentItem};
use quire_style::keywords::TextAlign;
use quire_style::page::{MarginBoxName, PageArea, PageType};
use quire_style::{ComputedStyle, Display, StyleResolver};

use crate::block::{Containing, WidthMode, border_edges, layout_detached, padding_edges};
use crate::boxes::{BoxId, BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::{EdgeSizes, Rect};
use crate::preferred;

/// Ids of margin boxes and their text, clear of the ids the builder hands
/// out.
const FIRST_ID: usize = usize::MAX - 64;

const TOP: [MarginBoxName; 3] = [MarginBoxName::TopLeft, MarginBoxName::TopCenter, MarginBoxName::TopRight];
const BOTTOM: [MarginBoxName; 3] = [
    MarginBoxName::BottomLeft,
    MarginBoxName::BottomCenter,
    MarginBoxName::BottomRight,
];
const LEFT: [MarginBoxName; 3] = [MarginBoxName::LeftTop, MarginBoxName::LeftMiddle, MarginBoxName::LeftBottom];
const RIGHT: [MarginBoxName; 3] = [
    MarginBoxName::RightTop,
    MarginBoxName::RightMiddle,
    MarginBoxName::RightBottom,
];

/// Text of a margin box's `content`, or `None` when the box is not
/// generated.
///
/// [§ 5.3.1](https://www.w3.org/TR/css-page-3/#margin-box-content) "As with
/// the ::before and ::after pseudo-elements, a specified content: normal on
/// a margin box computes to none", and such a box is not generated.
#[must_use]
pub fn content_text(content: &Content, page: usize, pages: usize) -> Option<String> {
    let Content::Items(items) = content else {
        return None;
    };
    let mut text = String::new();
    for item in items {
        match item {
            ContentItem::String(s) => text.push_str(s),
            ContentItem::Counter { name, style } | ContentItem::Counters { name, style, .. } => {
                let value = match name.as_str() {
                    "page" => page,
                    "pages" => pages,
                    _ => 0,
                };
                text.push_str(&style.format(i32::try_from(value).unwrap_or(i32::MAX)));
            }
            _ => {}
        }
    }
    Some(text)
}

/// Split a page edge between its three boxes: a center box takes its
/// preferred size and the sides share the rest evenly; without one, the
/// sides share the edge in proportion to their preferred sizes.
///
/// [§ 5.3.2 Margin Box Dimensions](https://www.w3.org/TR/css-page-3/#margin-dimension)
fn split_edge(available: f32, sizes: [Option<f32>; 3]) -> [(f32, f32); 3] {
    match sizes {
        [_, Some(center), _] => {
            let center = center.min(available).max(0.0);
            let side = (available - center) / 2.0;
            [(0.0, side), (side, center), (side + center, side)]
        }
        [Some(start), None, Some(end)] => {
            let total = start + end;
            let first = if total > 0.0 {
                available * start / total
            } else {
                available / 2.0
            };
            [(0.0, first), (first, 0.0), (first, available - first)]
        }
        [Some(_), None, None] => [(0.0, available), (available, 0.0), (available, 0.0)],
        [None, None, Some(_)] => [(0.0, 0.0), (0.0, 0.0), (0.0, available)],
        [None, None, None] => [(0.0, 0.0); 3],
    }
}

/// A generated margin box before layout.
struct Generated {
    name: MarginBoxName,
    b: LayoutBox,
}

fn generate(
    ctx: &mut LayoutContext<'_>,
    resolver: &dyn StyleResolver,
    page: &PageType,
    name: MarginBoxName,
    pages: usize,
) -> Option<Generated> {
    let style = resolver.page_style(page, PageArea::Margin(name));
    let text = content_text(&style.content, ctx.pages.number, pages)?;
    let mut style = (*style).clone();
    // [§ 5.3.1] The default text alignment follows the box's position.
    if style.text_align == TextAlign::Start {
        style.text_align = match name {
            MarginBoxName::TopLeft | MarginBoxName::BottomLeft => TextAlign::Left,
            MarginBoxName::TopRight | MarginBoxName::BottomRight => TextAlign::Right,
            _ => TextAlign::Center,
        };
    }
    let index = name as usize;
    let id = BoxId(FIRST_ID + index);
    let text_id = BoxId(FIRST_ID + 32 + index);
    let text_style = Arc::new(style.anonymous_child(Display::inline()));
    let mut b = LayoutBox::new(id, BoxKind::MarginBox(name), Arc::new(style));
    b.anonymous = true;
    let mut run = LayoutBox::new(text_id, BoxKind::Text(text), text_style);
    run.anonymous = true;
    b.children.push(run);
    ctx.forget_preferred(id);
    ctx.forget_preferred(text_id);
    Some(Generated { name, b })
}

/// Lay out `b` in `rect`, content centered vertically.
fn place(ctx: &mut LayoutContext<'_>, b: &LayoutBox, rect: Rect) -> LayoutBox {
    let style: &ComputedStyle = &b.style;
    let border = border_edges(style);
    let padding = padding_edges(style, rect.width);
    let content_height = (rect.height - border.vertical() - padding.vertical()).max(0.0);
    let cb = Containing {
        width: rect.width,
        height: Some(rect.height),
    };
    let width = (rect.width - border.horizontal() - padding.horizontal()).max(0.0);
    let mut fragment = layout_detached(ctx, b, cb, WidthMode::Definite(width), Some(content_height));
    let top = fragment.content_box_y();
    let used = fragment
        .children
        .iter()
        .map(|c| c.margin_box().bottom() - top)
        .fold(0.0_f32, f32::max);
    let dy = ((content_height - used) / 2.0).max(0.0);
    for child in &mut fragment.children {
        child.translate(0.0, dy);
    }
    fragment.place_border_box(rect.x, rect.y, EdgeSizes::ZERO);
    fragment
}

/// Lay out the margin boxes of a page of `size` with page margins
/// `margin`. `pages` is the page count of the document.
pub fn layout_margin_boxes(
    ctx: &mut LayoutContext<'_>,
    resolver: &dyn StyleResolver,
    page: &PageType,
    size: (f32, f32),
    margin: EdgeSizes,
    pages: usize,
) -> Vec<LayoutBox> {
    let (width, height) = size;
    let mut out = Vec::new();

    // STEP 1: Corners take the intersection of two margins.
    let corners = [
        (MarginBoxName::TopLeftCorner, Rect::new(0.0, 0.0, margin.left, margin.top)),
        (
            MarginBoxName::TopRightCorner,
            Rect::new(width - margin.right, 0.0, margin.right, margin.top),
        ),
        (
            MarginBoxName::BottomRightCorner,
            Rect::new(width - margin.right, height - margin.bottom, margin.right, margin.bottom),
        ),
        (
            MarginBoxName::BottomLeftCorner,
            Rect::new(0.0, height - margin.bottom, margin.left, margin.bottom),
        ),
    ];
    for (name, rect) in corners {
        if let Some(generated) = generate(ctx, resolver, page, name, pages) {
            out.push(place(ctx, &generated.b, rect));
        }
    }

    // STEP 2: Each edge is shared by three boxes.
    let inner_width = (width - margin.left - margin.right).max(0.0);
    let inner_height = (height - margin.top - margin.bottom).max(0.0);
    let edges = [
        (TOP, true, Rect::new(margin.left, 0.0, inner_width, margin.top)),
        (
            BOTTOM,
            true,
            Rect::new(margin.left, height - margin.bottom, inner_width, margin.bottom),
        ),
        (LEFT, false, Rect::new(0.0, margin.top, margin.left, inner_height)),
        (
            RIGHT,
            false,
            Rect::new(width - margin.right, margin.top, margin.right, inner_height),
        ),
    ];
    for (names, horizontal, edge) in edges {
        let generated: Vec<Option<Generated>> = names
            .iter()
            .map(|&name| generate(ctx, resolver, page, name, pages))
            .collect();
        let mut sizes = [None; 3];
        for (slot, g) in sizes.iter_mut().zip(&generated) {
            if let Some(g) = g {
                *slot = Some(if horizontal {
                    preferred::outer_widths(ctx, &g.b).1
                } else {
                    inner_height / 3.0
                });
            }
        }
        let available = if horizontal { edge.width } else { edge.height };
        let split = split_edge(available, sizes);
        for (g, (offset, extent)) in generated.into_iter().zip(split) {
            let Some(g) = g else { continue };
            let rect = if horizontal {
                Rect::new(edge.x + offset, edge.y, extent, edge.height)
            } else {
                Rect::new(edge.x, edge.y + offset, edge.width, extent)
            };
            #[cfg(feature = "layout-trace")]
            log::trace!("[MARGIN] {} at {:?}", g.name, rect);
            let _ = g.name;
            out.push(place(ctx, &g.b, rect));
        }
    }
    out
}
