//! Absolutely positioned boxes.
//!
//! [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
//! and [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
//!
//! Out-of-flow boxes leave a zero-size placeholder at their static position
//! and are queued on the [`LayoutContext`]. When the nearest positioned
//! ancestor finishes its fragment, the queued boxes whose placeholder it
//! contains are laid out against its padding box and hung under their
//! placeholder. Whatever is left at the end of a page, and every fixed box,
//! is resolved against the page area.
//!
//! Absolutely positioned boxes are laid out unfragmented.

use quire_style::keywords::Direction;

use crate::block::{Containing, WidthMode, border_edges, content_size, layout_detached, padding_edges};
use crate::boxes::{BoxId, BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::{EdgeSizes, Rect, clamp_size};
use crate::options::EPSILON;
use crate::preferred;
use crate::replaced;

/// The constraint equation of one axis:
/// start + margin-start + edges + size + margin-end + end = containing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Axis {
    start: Option<f32>,
    end: Option<f32>,
    size: Option<f32>,
    margin_start: Option<f32>,
    margin_end: Option<f32>,
    edges: f32,
    containing: f32,
    static_start: f32,
}

/// Used values of one axis: offset of the margin edge from the containing
/// block, content size and both margins.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Solved {
    offset: f32,
    size: f32,
    margin_start: f32,
    margin_end: f32,
}

/// Solve one axis. `end_wins` is set when the end offset is kept in the
/// over-constrained case (`direction: rtl` horizontally). `fit` gives the
/// content-based size for the space available.
fn solve(a: Axis, end_wins: bool, fit: &mut dyn FnMut(f32) -> f32) -> Solved {
    let cb = a.containing;

    // "If all three of 'left', 'width', and 'right' are 'auto': First set
    // any 'auto' values for 'margin-left' and 'margin-right' to 0. Then ...
    // set 'left' to the static position and apply rule number three below."
    if a.start.is_none() && a.size.is_none() && a.end.is_none() {
        let margin_start = a.margin_start.unwrap_or(0.0);
        let margin_end = a.margin_end.unwrap_or(0.0);
        let offset = a.static_start;
        let size = fit(cb - offset - margin_start - margin_end - a.edges);
        return Solved {
            offset,
            size,
            margin_start,
            margin_end,
        };
    }

    // "If none of the three is 'auto': If both 'margin-left' and
    // 'margin-right' are 'auto', solve the equation under the extra
    // constraint that the two margins get equal values, unless this would
    // make them negative".
    if let (Some(start), Some(size), Some(end)) = (a.start, a.size, a.end) {
        let slack = cb - start - end - size - a.edges;
        let (margin_start, margin_end, offset) = match (a.margin_start, a.margin_end) {
            (None, None) if slack < 0.0 => {
                if end_wins {
                    (slack, 0.0, start)
                } else {
                    (0.0, slack, start)
                }
            }
            (None, None) => (slack / 2.0, slack / 2.0, start),
            (None, Some(me)) => (slack - me, me, start),
            (Some(ms), None) => (ms, slack - ms, start),
            // "If the values are over-constrained, ignore the value for
            // 'left' (in case the 'direction' property of the containing
            // block is 'rtl') or 'right' (in case 'direction' is 'ltr')".
            (Some(ms), Some(me)) if end_wins => (ms, me, cb - end - me - size - a.edges - ms),
            (Some(ms), Some(me)) => (ms, me, start),
        };
        return Solved {
            offset,
            size,
            margin_start,
            margin_end,
        };
    }

    // "Otherwise, set 'auto' values for 'margin-left' and 'margin-right' to
    // 0, and pick the one of the following six rules that applies."
    let margin_start = a.margin_start.unwrap_or(0.0);
    let margin_end = a.margin_end.unwrap_or(0.0);
    let rest = |known: f32| cb - known - margin_start - margin_end - a.edges;
    let (offset, size) = match (a.start, a.size, a.end) {
        // RULE 1: "'left' and 'width' are 'auto' and 'right' is not 'auto',
        // then the width is shrink-to-fit. Then solve for 'left'"
        (None, None, Some(end)) => {
            let size = fit(rest(end));
            (rest(end) - size, size)
        }
        // RULE 2: "'left' and 'right' are 'auto' and 'width' is not 'auto',
        // then ... set 'left' to the static position."
        (None, Some(size), None) => (a.static_start, size),
        // RULE 3: "'width' and 'right' are 'auto' and 'left' is not 'auto',
        // then the width is shrink-to-fit."
        (Some(start), None, None) => (start, fit(rest(start))),
        // RULE 4: "'left' is 'auto', 'width' and 'right' are not 'auto',
        // then solve for 'left'"
        (None, Some(size), Some(end)) => (rest(end) - size, size),
        // RULE 5: "'width' is 'auto', 'left' and 'right' are not 'auto',
        // then solve for 'width'"
        (Some(start), None, Some(end)) => (start, rest(start + end).max(0.0)),
        // RULE 6: "'right' is 'auto', 'left' and 'width' are not 'auto',
        // then solve for 'right'"
        (Some(start), Some(size), None) => (start, size),
        (None, None, None) | (Some(_), Some(_), Some(_)) => (a.static_start, fit(rest(a.static_start))),
    };
    Solved {
        offset,
        size,
        margin_start,
        margin_end,
    }
}

/// Lay out the out-of-flow box `source` against the padding box `cb`, with
/// its static position at `static_position`.
pub fn layout_absolute(
    ctx: &mut LayoutContext<'_>,
    source: &LayoutBox,
    cb: Rect,
    static_position: (f32, f32),
) -> LayoutBox {
    let style = &source.style;
    let containing = Containing {
        width: cb.width,
        height: Some(cb.height),
    };
    let border = border_edges(style);
    let padding = padding_edges(style, cb.width);
    let h_edges = border.horizontal() + padding.horizontal();
    let v_edges = border.vertical() + padding.vertical();
    let replaced = matches!(source.kind, BoxKind::Replaced(_)).then(|| replaced::used_size(source, containing));

    // STEP 1: Horizontal position, width and margins.
    let horizontal = |size: Option<f32>| Axis {
        start: style.left.resolve(cb.width),
        end: style.right.resolve(cb.width),
        size,
        margin_start: style.margin.left.resolve(cb.width),
        margin_end: style.margin.right.resolve(cb.width),
        edges: h_edges,
        containing: cb.width,
        static_start: static_position.0 - cb.x,
    };
    let rtl = style.direction == Direction::Rtl;
    let width = replaced
        .map(|(w, _)| w)
        .or_else(|| content_size(style.width, Some(cb.width), style, h_edges));
    let mut h = solve(horizontal(width), rtl, &mut |available| {
        preferred::shrink_to_fit(ctx, source, available)
    });
    // [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    if replaced.is_none() {
        let min = content_size(style.min_width, Some(cb.width), style, h_edges).unwrap_or(0.0);
        let max = content_size(style.max_width, Some(cb.width), style, h_edges);
        let clamped = clamp_size(h.size, min, max).max(0.0);
        if (clamped - h.size).abs() > EPSILON {
            h = solve(horizontal(Some(clamped)), rtl, &mut |_| clamped);
        }
    }

    // STEP 2: Lay out the content at the used width.
    let top = style.top.resolve(cb.height);
    let bottom = style.bottom.resolve(cb.height);
    let margin_top = style.margin.top.resolve(cb.width);
    let margin_bottom = style.margin.bottom.resolve(cb.width);
    let height = replaced
        .map(|(_, h)| h)
        .or_else(|| content_size(style.height, Some(cb.height), style, v_edges));
    let imposed = height.or_else(|| match (top, bottom) {
        (Some(t), Some(b)) => Some(
            (cb.height - t - b - margin_top.unwrap_or(0.0) - margin_bottom.unwrap_or(0.0) - v_edges).max(0.0),
        ),
        _ => None,
    });
    let mut fragment = layout_detached(ctx, source, containing, WidthMode::Definite(h.size), imposed);

    // STEP 3: Vertical position, height and margins.
    //
    // [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    // "If all three of 'top', 'height', and 'bottom' are auto, set 'top' to
    // the static position and apply rule number three below."
    let content_height = fragment.height;
    let vertical = |size: Option<f32>| Axis {
        start: top,
        end: bottom,
        size,
        margin_start: margin_top,
        margin_end: margin_bottom,
        edges: v_edges,
        containing: cb.height,
        static_start: static_position.1 - cb.y,
    };
    let mut v = solve(vertical(height), false, &mut |_| content_height);
    if replaced.is_none() {
        let min = content_size(style.min_height, Some(cb.height), style, v_edges).unwrap_or(0.0);
        let max = content_size(style.max_height, Some(cb.height), style, v_edges);
        let clamped = clamp_size(v.size, min, max).max(0.0);
        if (clamped - v.size).abs() > EPSILON {
            v = solve(vertical(Some(clamped)), false, &mut |_| clamped);
        }
    }

    // STEP 4: Move the fragment into place.
    let border_x = cb.x + h.offset + h.margin_start;
    let border_y = cb.y + v.offset + v.margin_start;
    fragment.height = v.size;
    fragment.place_border_box(
        border_x,
        border_y,
        EdgeSizes {
            top: v.margin_start,
            right: h.margin_end,
            bottom: v.margin_end,
            left: h.margin_start,
        },
    );

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[ABSPOS] {:?} at ({border_x}, {border_y}) size {}x{}",
        source.id,
        fragment.width,
        fragment.height
    );

    fragment
}

fn find_placeholder(b: &mut LayoutBox, id: BoxId) -> Option<&mut LayoutBox> {
    if b.kind == BoxKind::AbsolutePlaceholder && b.id == id {
        return Some(b);
    }
    b.children.iter_mut().find_map(|c| find_placeholder(c, id))
}

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "the containing block is formed by the padding edge of the ancestor."
///
/// Lay out the boxes queued since `mark` whose placeholder lies inside
/// `fragment`, the fragment of a positioned box. Fixed boxes and boxes
/// placed elsewhere stay queued.
pub fn resolve_pending(ctx: &mut LayoutContext<'_>, fragment: &mut LayoutBox, mark: usize) {
    let cb = fragment.padding_box();
    let mut index = mark;
    while index < ctx.pending_absolutes.len() {
        let pending = &ctx.pending_absolutes[index];
        let id = pending.source.id;
        let static_position = match find_placeholder(fragment, id) {
            Some(p) if !pending.fixed => (p.position_x, p.position_y),
            _ => {
                index += 1;
                continue;
            }
        };
        let pending = ctx.pending_absolutes.remove(index);
        let laid = layout_absolute(ctx, &pending.source, cb, static_position);
        if let Some(placeholder) = find_placeholder(fragment, id) {
            placeholder.children.push(laid);
        }
    }
}

/// Resolve every box still queued at the end of a page against the page
/// area `area`, the initial containing block. Returns the fixed boxes of
/// the page, repeated ones included.
///
/// [§ 9.6.1 Fixed positioning](https://www.w3.org/TR/CSS2/visuren.html#fixed-positioning)
/// "For paged media, boxes with fixed positions are repeated on every
/// page."
pub fn resolve_at_page(ctx: &mut LayoutContext<'_>, content: &mut LayoutBox, area: Rect) -> Vec<LayoutBox> {
    let mut fixed = Vec::new();
    let mut seen: Vec<BoxId> = Vec::new();
    loop {
        let pending = std::mem::take(&mut ctx.pending_absolutes);
        if pending.is_empty() {
            break;
        }
        for p in pending {
            let id = p.source.id;
            let static_position =
                find_placeholder(content, id).map_or((area.x, area.y), |ph| (ph.position_x, ph.position_y));
            let laid = layout_absolute(ctx, &p.source, area, static_position);
            if p.fixed {
                seen.push(id);
                fixed.push(laid);
            } else if let Some(placeholder) = find_placeholder(content, id) {
                placeholder.children.push(laid);
            } else {
                content.children.push(laid);
            }
        }
    }
    let earlier: Vec<LayoutBox> = ctx
        .fixed_boxes
        .iter()
        .filter(|b| !seen.contains(&b.id))
        .cloned()
        .collect();
    for source in earlier {
        fixed.push(layout_absolute(ctx, &source, area, (area.x, area.y)));
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::ComputedStyle;
    use quire_style::Display;
    use quire_style::keywords::Position;
    use quire_style::values::{LengthPercentageAuto, Size};

    use crate::block::{Slot, layout_block_level};
    use crate::float::FloatContext;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::resume::FlowInput;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn axis(start: Option<f32>, size: Option<f32>, end: Option<f32>) -> Axis {
        Axis {
            start,
            end,
            size,
            margin_start: Some(0.0),
            margin_end: Some(0.0),
            edges: 0.0,
            containing: 100.0,
            static_start: 7.0,
        }
    }

    #[test]
    fn test_rules_for_auto_offsets() {
        let mut fit = |available: f32| available.min(30.0);
        // Rule 2: static position.
        assert_eq!(solve(axis(None, Some(20.0), None), false, &mut fit).offset, 7.0);
        // Rule 4: solve for the start.
        assert_eq!(solve(axis(None, Some(20.0), Some(10.0)), false, &mut fit).offset, 70.0);
        // Rule 5: solve for the size.
        assert_eq!(solve(axis(Some(10.0), None, Some(10.0)), false, &mut fit).size, 80.0);
        // Rule 1: shrink-to-fit against the end.
        let s = solve(axis(None, None, Some(10.0)), false, &mut fit);
        assert_eq!((s.offset, s.size), (60.0, 30.0));
    }

    #[test]
    fn test_auto_margins_center() {
        let a = Axis {
            margin_start: None,
            margin_end: None,
            ..axis(Some(0.0), Some(40.0), Some(0.0))
        };
        let s = solve(a, false, &mut |w| w);
        assert_eq!((s.margin_start, s.margin_end), (30.0, 30.0));
    }

    #[test]
    fn test_over_constrained_rtl_keeps_end() {
        let s = solve(axis(Some(10.0), Some(20.0), Some(30.0)), true, &mut |w| w);
        assert_eq!(s.offset, 50.0);
    }

    #[test]
    fn test_positioned_ancestor_is_containing_block() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);

        let mut abs_style = ComputedStyle::initial();
        abs_style.display = Display::block();
        abs_style.position = Position::Absolute;
        abs_style.top = LengthPercentageAuto::Length(10.0);
        abs_style.right = LengthPercentageAuto::Length(5.0);
        abs_style.width = Size::Length(30.0);
        abs_style.height = Size::Length(8.0);
        let abs = LayoutBox::new(BoxId(2), BoxKind::Block, Arc::new(abs_style));

        let mut parent_style = ComputedStyle::initial();
        parent_style.display = Display::block();
        parent_style.position = Position::Relative;
        parent_style.height = Size::Length(50.0);
        let mut parent = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(parent_style));
        parent.children.push(abs);

        let cb = Containing {
            width: 100.0,
            height: None,
        };
        let mut floats = FloatContext::new();
        let outcome = layout_block_level(&mut ctx, &parent, &Slot::new(0.0, 20.0, cb), FlowInput::unfragmented(), &mut floats);
        let fragment = outcome.result.fragment().cloned().unwrap();
        let placed = fragment
            .descendants()
            .into_iter()
            .find(|b| b.id == BoxId(2) && b.kind == BoxKind::Block)
            .cloned()
            .unwrap();
        assert_eq!((placed.position_x, placed.position_y), (65.0, 30.0));
        assert_eq!((placed.width, placed.height), (30.0, 8.0));
        assert!(ctx.pending_absolutes.is_empty());
    }
}
