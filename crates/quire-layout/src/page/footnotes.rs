//! Footnotes.
//!
//! [GCPM § 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
//!
//! Footnote bodies are taken out of flow by the builder. When a line calling
//! one is laid out, the body is laid out at the width of the footnote area
//! and stacked in it; the area grows up from the bottom of the page area and
//! the flow limit of the page rises with it. A body that does not fit goes
//! to the next page, unless `footnote-policy` moves the call there instead.

use std::sync::Arc;

use quire_style::ComputedStyle;
use quire_style::keywords::FootnotePolicy;

use crate::block::{Containing, WidthMode, border_edges, content_size, layout_detached, padding_edges};
use crate::boxes::{BoxId, BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::{EdgeSizes, Rect};
use crate::options::EPSILON;

/// Set up the footnote area of a new page from its `@footnote` style.
///
/// [GCPM § 2.3 The footnote area](https://www.w3.org/TR/css-gcpm-3/#footnote-area)
pub fn begin_page(ctx: &mut LayoutContext<'_>, style: Arc<ComputedStyle>, area: Rect) {
    let border = border_edges(&style);
    let padding = padding_edges(&style, area.width);
    let margin_top = style.margin.top.resolve_or_zero(area.width);
    let margin_bottom = style.margin.bottom.resolve_or_zero(area.width);
    let horizontal = border.horizontal()
        + padding.horizontal()
        + style.margin.left.resolve_or_zero(area.width)
        + style.margin.right.resolve_or_zero(area.width);
    let vertical = border.vertical() + padding.vertical();
    ctx.footnotes.width = (area.width - horizontal).max(0.0);
    ctx.footnotes.area_edges = vertical + margin_top + margin_bottom;
    ctx.footnotes.max_height = content_size(style.max_height, Some(area.height), &style, vertical);
    ctx.footnotes.area_style = Some(style);
}

/// Lay out footnote `index` into the area of the current page.
///
/// Returns false when the area now exceeds its `max-height`. Placing a
/// footnote that is already in the area does nothing and reports whether
/// the area fits.
pub fn place_footnote(ctx: &mut LayoutContext<'_>, index: usize) -> bool {
    if !ctx.footnotes.placed.iter().any(|(i, _)| *i == index) {
        let Some(body) = ctx.footnote_bodies.get(index).cloned() else {
            debug_assert!(false, "footnote {index} has no body");
            return true;
        };
        let cb = Containing {
            width: ctx.footnotes.width,
            height: None,
        };
        let mut fragment = layout_detached(ctx, &body, cb, WidthMode::Fill, None);
        fragment.translate(0.0, ctx.footnotes.content_height());
        ctx.footnotes.placed.push((index, fragment));
    }
    ctx.footnotes
        .max_height
        .is_none_or(|max| ctx.footnotes.content_height() <= max + EPSILON)
}

/// `footnote-policy` of footnote `index`.
#[must_use]
pub fn policy(ctx: &LayoutContext<'_>, index: usize) -> FootnotePolicy {
    ctx.footnote_bodies
        .get(index)
        .map_or(FootnotePolicy::Auto, |b| b.style.footnote_policy)
}

/// Move footnote `index` from the area of the current page to the next
/// page.
pub fn defer_footnote(ctx: &mut LayoutContext<'_>, index: usize) {
    if let Some(position) = ctx.footnotes.placed.iter().position(|(i, _)| *i == index) {
        let (_, removed) = ctx.footnotes.placed.remove(position);
        let height = removed.margin_height();
        for (_, later) in &mut ctx.footnotes.placed[position..] {
            later.translate(0.0, -height);
        }
    }
    if !ctx.footnotes.deferred.contains(&index) {
        ctx.footnotes.deferred.push(index);
    }
}

/// Place the footnotes carried over from the previous page, in order.
///
/// The first one stays even when it overflows the area: a footnote taller
/// than a page is cut by the page rather than carried forever.
pub fn place_carried(ctx: &mut LayoutContext<'_>, carried: &[usize]) {
    for (n, &index) in carried.iter().enumerate() {
        let within_max = place_footnote(ctx, index);
        let fits = ctx.page_area.bottom() - ctx.footnotes.reserved() >= ctx.page_area.y - EPSILON;
        if n > 0 && !(within_max && fits) {
            defer_footnote(ctx, index);
        }
    }
}

/// The footnote area of the current page, at the bottom of `area`, or
/// `None` when no footnote was placed.
pub fn footnote_area(ctx: &LayoutContext<'_>, area: Rect) -> Option<LayoutBox> {
    if ctx.footnotes.placed.is_empty() {
        return None;
    }
    let style = ctx
        .footnotes
        .area_style
        .clone()
        .unwrap_or_else(|| Arc::new(ComputedStyle::initial()));
    let mut b = LayoutBox::new(BoxId::FOOTNOTE_AREA, BoxKind::FootnoteArea, Arc::clone(&style));
    b.anonymous = true;
    b.border = border_edges(&style);
    b.padding = padding_edges(&style, area.width);
    b.margin = EdgeSizes {
        top: style.margin.top.resolve_or_zero(area.width),
        right: style.margin.right.resolve_or_zero(area.width),
        bottom: style.margin.bottom.resolve_or_zero(area.width),
        left: style.margin.left.resolve_or_zero(area.width),
    };
    b.width = ctx.footnotes.width;
    b.height = ctx.footnotes.content_height();
    b.position_x = area.x;
    b.position_y = area.bottom() - ctx.footnotes.reserved();
    let (dx, dy) = (b.content_box_x(), b.content_box_y());
    b.children = ctx
        .footnotes
        .placed
        .iter()
        .map(|(_, body)| {
            let mut body = body.clone();
            body.translate(dx, dy);
            body
        })
        .collect();
    Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::Display;
    use quire_style::values::Size;

    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn body(id: usize, height: f32) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.height = Size::Length(height);
        LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style))
    }

    fn area_style(max_height: Option<f32>) -> Arc<ComputedStyle> {
        let mut style = ComputedStyle::initial();
        if let Some(max) = max_height {
            style.max_height = Size::Length(max);
        }
        Arc::new(style)
    }

    #[test]
    fn test_place_is_idempotent_and_stacks() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        ctx.footnote_bodies = vec![body(1, 10.0), body(2, 15.0)];
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        ctx.begin_page(1, page);
        begin_page(&mut ctx, area_style(None), page);
        assert!(place_footnote(&mut ctx, 0));
        assert!(place_footnote(&mut ctx, 0));
        assert!(place_footnote(&mut ctx, 1));
        assert_eq!(ctx.footnotes.placed.len(), 2);
        assert_eq!(ctx.footnotes.placed[1].1.position_y, 10.0);
        assert_eq!(ctx.limit(100.0), 75.0);

        let area = footnote_area(&ctx, page).unwrap();
        assert_eq!((area.position_y, area.height), (75.0, 25.0));
        assert_eq!(area.children[1].position_y, 85.0);
    }

    #[test]
    fn test_max_height_defers() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        ctx.footnote_bodies = vec![body(1, 10.0), body(2, 15.0)];
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        ctx.begin_page(1, page);
        begin_page(&mut ctx, area_style(Some(20.0)), page);
        assert!(place_footnote(&mut ctx, 0));
        assert!(!place_footnote(&mut ctx, 1));
        defer_footnote(&mut ctx, 1);
        defer_footnote(&mut ctx, 1);
        assert_eq!(ctx.footnotes.deferred, vec![1]);
        assert_eq!(ctx.footnotes.content_height(), 10.0);
    }

    #[test]
    fn test_carried_footnote_overflows_alone() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        ctx.footnote_bodies = vec![body(1, 30.0), body(2, 10.0)];
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        ctx.begin_page(2, page);
        begin_page(&mut ctx, area_style(Some(20.0)), page);
        place_carried(&mut ctx, &[0, 1]);
        assert_eq!(ctx.footnotes.placed.len(), 1);
        assert_eq!(ctx.footnotes.deferred, vec![1]);
        assert_eq!(policy(&ctx, 0), FootnotePolicy::Auto);
    }
}
