//! Preferred widths.
//!
//! [CSS Intrinsic & Extrinsic Sizing § 5](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
//!
//! "The min-content size of a box in each axis is the size it would have if
//! it was a float given an auto size in that axis (and no minimum or
//! maximum size in that axis) and if its containing block was zero-sized in
//! that axis." The max-content size is the same with an infinitely large
//! containing block.
//!
//! Both are pure functions of the box subtree, cached per [`BoxId`] for one
//! layout pass.
//!
//! [`BoxId`]: crate::boxes::BoxId

use quire_style::keywords::BoxSizing;
use quire_style::values::Size;

use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::flex;
use crate::grid;
use crate::inline;
use crate::replaced;
use crate::table;

/// Min-content and max-content width of the content box of `b`.
pub fn content_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    if let Some(cached) = ctx.cached_preferred(b.id) {
        return cached;
    }
    let (min, max) = match b.kind {
        BoxKind::Replaced(_) => replaced::content_widths(b),
        BoxKind::Flex => flex::content_widths(ctx, b),
        BoxKind::Grid => grid::content_widths(ctx, b),
        BoxKind::TableWrapper => table::content_widths(ctx, b),
        _ if b.style.is_multicol() => multicol_widths(ctx, b),
        _ if b.children_are_inline() || b.kind == BoxKind::Inline => inline::content_widths(ctx, b),
        _ => block_widths(ctx, b),
    };
    // Zero or negative space never yields negative widths.
    let min = min.max(0.0);
    let widths = (min, max.max(min));
    ctx.cache_preferred(b.id, widths);
    widths
}

/// Min-content and max-content contribution of `b`: its margin box with
/// fixed sizes honored and percentages ignored.
///
/// [§ 5.1 Intrinsic Contributions](https://www.w3.org/TR/css-sizing-3/#contributions)
pub fn outer_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let style = &b.style;
    let border = style.border_widths();
    let edges = border.left
        + border.right
        + style.padding.left.fixed_or_zero()
        + style.padding.right.fixed_or_zero();
    let margins = style.margin.left.fixed_or_zero() + style.margin.right.fixed_or_zero();
    let as_content = |value: f32| match style.box_sizing {
        BoxSizing::BorderBox => (value - edges).max(0.0),
        BoxSizing::ContentBox => value,
    };

    let (mut min, mut max) = match (style.width, &b.kind) {
        (_, BoxKind::Replaced(_)) => content_widths(ctx, b),
        (Size::Length(w), _) => (as_content(w), as_content(w)),
        (Size::MinContent, _) => {
            let (min, _) = content_widths(ctx, b);
            (min, min)
        }
        (Size::MaxContent, _) => {
            let (_, max) = content_widths(ctx, b);
            (max, max)
        }
        _ => content_widths(ctx, b),
    };
    if let Size::Length(limit) = style.max_width {
        let limit = as_content(limit);
        min = min.min(limit);
        max = max.min(limit);
    }
    if let Size::Length(floor) = style.min_width {
        let floor = as_content(floor);
        min = min.max(floor);
        max = max.max(floor);
    }
    (min + edges + margins, max + edges + margins)
}

/// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "Then the shrink-to-fit width is: min(max(preferred minimum width,
/// available width), preferred width)."
pub fn shrink_to_fit(ctx: &mut LayoutContext<'_>, b: &LayoutBox, available: f32) -> f32 {
    let (min, max) = content_widths(ctx, b);
    min.max(available).min(max)
}

/// Block children: the widest child decides; floats in a row sit side by
/// side at max-content.
fn block_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let mut min: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut float_run: f32 = 0.0;
    for child in &b.children {
        if child.is_absolutely_positioned() {
            continue;
        }
        let (child_min, child_max) = outer_widths(ctx, child);
        min = min.max(child_min);
        if child.is_floated() {
            float_run += child_max;
            max = max.max(float_run);
        } else {
            float_run = 0.0;
            max = max.max(child_max);
        }
    }
    (min, max)
}

/// [CSS Multi-column § 3](https://www.w3.org/TR/css-multicol-1/#pseudo-algorithm)
fn multicol_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let (min, max) = block_widths(ctx, b);
    let count = b.style.column_count.unwrap_or(1).max(1) as f32;
    let gap = b.style.column_gap.map_or(b.style.font_size, |g| g.fixed_or_zero());
    let column = b.style.column_width.map_or(max, |w| w.max(min));
    (min.max(b.style.column_width.unwrap_or(0.0)), column.mul_add(count, gap * (count - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::ComputedStyle;
    use quire_style::keywords::Float;
    use quire_style::values::LengthPercentage;

    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn text_block(id: usize, text: &str) -> LayoutBox {
        let style = Arc::new(ComputedStyle::initial());
        let mut b = LayoutBox::new(BoxId(id), BoxKind::Block, Arc::clone(&style));
        b.children
            .push(LayoutBox::new(BoxId(id + 100), BoxKind::Text(text.into()), style));
        b
    }

    #[test]
    fn test_text_widths() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = text_block(1, "aa bbbb c");
        // 16px monospace: the longest word and the whole line.
        assert_eq!(content_widths(&mut ctx, &b), (64.0, 144.0));
        assert_eq!(shrink_to_fit(&mut ctx, &b, 100.0), 100.0);
        assert_eq!(shrink_to_fit(&mut ctx, &b, 10.0), 64.0);
    }

    #[test]
    fn test_outer_widths_add_fixed_edges() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut b = text_block(1, "ab");
        let mut style = ComputedStyle::initial();
        style.padding.left = LengthPercentage::Length(3.0);
        style.padding.right = LengthPercentage::Percent(50.0);
        b.style = Arc::new(style);
        assert_eq!(outer_widths(&mut ctx, &b), (35.0, 35.0));
    }

    #[test]
    fn test_floats_accumulate_in_max_content() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut float_style = ComputedStyle::initial();
        float_style.float = Float::Left;
        let mut a = text_block(2, "ab");
        a.style = Arc::new(float_style.clone());
        let mut b = text_block(3, "abc");
        b.style = Arc::new(float_style);
        let mut parent = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(ComputedStyle::initial()));
        parent.children = vec![a, b];
        assert_eq!(content_widths(&mut ctx, &parent), (48.0, 80.0));
    }
}
