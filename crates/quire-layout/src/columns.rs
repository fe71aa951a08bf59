//! Multi-column layout.
//!
//! [CSS Multi-column Layout Module Level 1](https://www.w3.org/TR/css-multicol-1/)
//!
//! The content of a multi-column container flows through column boxes of
//! equal width. Each column is a fragmentainer: the content is laid out
//! with the ordinary block machinery into one column box at a time, and the
//! resume point of a full column starts the next one. Elements with
//! `column-span: all` cut the content into runs laid out one after another.

use std::ops::Range;
use std::sync::Arc;

use quire_style::Display;
use quire_style::keywords::{BreakBetween, ColumnFill, ColumnSpan, Direction};

use crate::block::{BodyOutcome, Containing, Frame, Slot, WidthMode, layout_block_level};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::float::FloatContext;
use crate::options::{EPSILON, MAX_COLUMN_BALANCE_STEPS};
use crate::resume::{FlowInput, FlowOutcome, LayoutResult, ResumePoint};

/// Used column count and width.
///
/// [§ 3 The pseudo-algorithm](https://www.w3.org/TR/css-multicol-1/#pseudo-algorithm)
#[must_use]
pub fn column_geometry(count: Option<u32>, width: Option<f32>, gap: f32, available: f32) -> (usize, f32) {
    let available = available.max(0.0);
    let count = match (count, width) {
        // "(01) if ((column-width = auto) and (column-count != auto)) then
        // (02) N := column-count;"
        (Some(n), None) => n.max(1) as usize,
        // "(04) else if ((column-width != auto) and (column-count = auto))
        // then (05) N := max(1, floor((U + column-gap)/(column-width +
        // column-gap)));"
        (None, Some(w)) => fitting(w, gap, available),
        // "(07) else (08) N := min(column-count, max(1, floor((U +
        // column-gap)/(column-width + column-gap))));"
        (Some(n), Some(w)) => (n.max(1) as usize).min(fitting(w, gap, available)),
        (None, None) => 1,
    };
    // "(09) W := max(0, ((U + column-gap)/N - column-gap))"
    let width = ((available + gap) / count as f32 - gap).max(0.0);
    (count, width)
}

fn fitting(width: f32, gap: f32, available: f32) -> usize {
    let per = width + gap;
    if per <= 0.0 {
        return 1;
    }
    (((available + gap) / per).floor() as usize).max(1)
}

/// A stretch of the container's children: content flowing in columns, or
/// one spanning element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Columns(Range<usize>),
    Spanner(usize),
}

/// [§ 6 Spanning columns](https://www.w3.org/TR/css-multicol-1/#spanning-columns)
fn segments(b: &LayoutBox) -> Vec<Segment> {
    if b.children_are_inline() {
        return vec![Segment::Columns(0..b.children.len())];
    }
    let mut out = Vec::new();
    let mut start = 0;
    for (i, child) in b.children.iter().enumerate() {
        if child.style.column_span == ColumnSpan::All && child.is_in_flow() && child.is_block_level() {
            if start < i {
                out.push(Segment::Columns(start..i));
            }
            out.push(Segment::Spanner(i));
            start = i + 1;
        }
    }
    if start < b.children.len() {
        out.push(Segment::Columns(start..b.children.len()));
    }
    out
}

/// Where to start: the segment index and the resume point inside it, in
/// the segment's own terms.
fn start_of(segments: &[Segment], inline: bool, resume: Option<&ResumePoint>) -> (usize, Option<ResumePoint>) {
    let Some(resume) = resume else {
        return (0, None);
    };
    if inline {
        return (0, Some(resume.clone()));
    }
    let Some(index) = resume.child_index() else {
        return (0, None);
    };
    for (s, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Spanner(i) if *i == index => return (s, Some(resume.clone())),
            Segment::Columns(range) if range.contains(&index) => {
                let inner = ResumePoint::Child {
                    index: index - range.start,
                    inner: resume.inner().cloned().map(Box::new),
                };
                return (s, Some(inner));
            }
            _ => {}
        }
    }
    (segments.len(), None)
}

/// The box the content of a run is laid out in, once per column.
fn flow_box(b: &LayoutBox, range: Range<usize>) -> LayoutBox {
    let style = b.style.anonymous_child(Display::block());
    let mut flow = LayoutBox::new(b.id, BoxKind::Column, Arc::new(style));
    flow.children = b.children[range].to_vec();
    flow
}

/// One run of content spread over columns.
#[derive(Debug, Clone, Default)]
struct ColumnSet {
    columns: Vec<LayoutBox>,
    resume: Option<ResumePoint>,
    /// Height used below the run's top.
    height: f32,
    forced_page_break: Option<BreakBetween>,
}

/// Geometry shared by every column of a container.
#[derive(Debug, Clone, Copy)]
struct Layout {
    x: f32,
    content_width: f32,
    count: usize,
    width: f32,
    gap: f32,
    rtl: bool,
}

impl Layout {
    fn column_x(&self, i: usize) -> f32 {
        let offset = (self.width + self.gap) * i as f32;
        if self.rtl {
            self.x + self.content_width - offset - self.width
        } else {
            self.x + offset
        }
    }
}

/// Fill columns of `height` starting at `y` until the content ends or the
/// columns run out.
fn fill(
    ctx: &mut LayoutContext<'_>,
    flow: &LayoutBox,
    layout: &Layout,
    y: f32,
    height: f32,
    resume: Option<&ResumePoint>,
) -> ColumnSet {
    let mut set = ColumnSet::default();
    let mut resume = resume.cloned();
    ctx.column_depth += 1;
    for i in 0..layout.count {
        let cb = Containing {
            width: layout.width,
            height: None,
        };
        let slot = Slot {
            width: WidthMode::Definite(layout.width),
            ..Slot::new(layout.column_x(i), y, cb)
        };
        let input = FlowInput {
            bottom_space: y + height,
            resume: resume.as_ref(),
            ..FlowInput::unfragmented()
        };
        let outcome = layout_block_level(ctx, flow, &slot, input, &mut FloatContext::new());
        let forced = outcome.forced_break;
        let (fragment, next) = outcome.result.into_parts();
        let Some(mut column) = fragment else {
            break;
        };
        set.height = set.height.max(column.height);
        if height.is_finite() {
            column.height = height;
        }
        set.columns.push(column);
        resume = next;
        if resume.is_none() {
            break;
        }
        if let Some(between) = forced
            && between.forces_page()
        {
            set.forced_page_break = Some(between);
            break;
        }
    }
    ctx.column_depth -= 1;
    set.resume = resume;
    set
}

/// [§ 7.1 column-fill](https://www.w3.org/TR/css-multicol-1/#cf)
///
/// "balance: Balance content equally between columns, as far as possible."
///
/// The shortest column height that fits the content into the columns,
/// found by bisection between an even share of the single-column height
/// and `available`.
fn balanced_height(
    ctx: &mut LayoutContext<'_>,
    flow: &LayoutBox,
    layout: &Layout,
    y: f32,
    available: f32,
    resume: Option<&ResumePoint>,
) -> f32 {
    let checkpoint = ctx.checkpoint();
    let single = Layout { count: 1, ..*layout };
    let natural = fill(ctx, flow, &single, y, f32::INFINITY, resume).height;
    ctx.rollback(checkpoint);
    let mut hi = natural.min(available);
    let mut lo = (natural / layout.count as f32).min(hi);
    let fits = |ctx: &mut LayoutContext<'_>, height: f32| {
        let set = fill(ctx, flow, layout, y, height, resume);
        ctx.rollback(checkpoint);
        set.resume.is_none() && set.height <= height + EPSILON
    };
    if fits(ctx, lo) {
        return lo;
    }
    let mut steps = 0;
    while hi - lo > 0.5 {
        if steps == MAX_COLUMN_BALANCE_STEPS {
            ctx.warn("column balancing did not converge");
            break;
        }
        steps += 1;
        let mid = (lo + hi) / 2.0;
        if fits(ctx, mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    #[cfg(feature = "layout-trace")]
    log::trace!("[COLUMNS] balanced {:?} at {hi} after {steps} steps", flow.id);
    hi
}

/// Lay out a multi-column container.
pub fn layout_multicol(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot, input: FlowInput<'_>) -> FlowOutcome {
    let style = &b.style;

    // STEP 1: The container's own box.
    let frame = Frame::open(ctx, b, slot, &input);
    let content_width = frame.horizontal.width;

    // STEP 2: Column count and width.
    let gap = style
        .column_gap
        .map_or(style.font_size, |g| g.resolve(content_width))
        .max(0.0);
    let (count, width) = column_geometry(style.column_count, style.column_width, gap, content_width);
    let layout = Layout {
        x: frame.content_x,
        content_width,
        count,
        width,
        gap,
        rtl: style.direction == Direction::Rtl,
    };

    // STEP 3: Cut the content at spanning elements and find where this
    // fragment starts.
    let segments = segments(b);
    let inline = b.children_are_inline();
    let (first, mut resume) = start_of(&segments, inline, input.resume);
    let limit = frame.content_limit(ctx, &input);
    let bottom = frame.height.map_or(limit, |h| limit.min(frame.content_y + h));

    let mut body = BodyOutcome::default();
    let mut y = frame.content_y;
    let mut placed = false;
    for (s, segment) in segments.iter().enumerate().skip(first) {
        let inner = if s == first { resume.take() } else { None };
        match segment {
            Segment::Columns(range) => {
                // STEP 4: Spread a run over columns.
                let flow = flow_box(b, range.clone());
                let available = (bottom - y).max(0.0);
                // "In continuous contexts, this property does not have any
                // effect" for `auto`: columns are balanced.
                let balance = style.column_fill != ColumnFill::Auto || !bottom.is_finite();
                let height = if balance {
                    balanced_height(ctx, &flow, &layout, y, available, inner.as_ref())
                } else {
                    available
                };
                let set = fill(ctx, &flow, &layout, y, height, inner.as_ref());
                placed |= !set.columns.is_empty();
                y += if set.resume.is_some() || (!balance && frame.height.is_some()) {
                    height
                } else {
                    set.height.min(height)
                };
                body.children.extend(set.columns);
                if let Some(next) = set.resume {
                    body.resume = Some(if inline {
                        next
                    } else {
                        ResumePoint::Child {
                            index: range.start + next.child_index().unwrap_or(0),
                            inner: next.inner().cloned().map(Box::new),
                        }
                    });
                    body.forced_break = set.forced_page_break;
                    break;
                }
            }
            Segment::Spanner(index) => {
                // STEP 5: A spanning element takes the full width.
                let child = &b.children[*index];
                let cb = Containing {
                    width: content_width,
                    height: frame.height,
                };
                let child_input = FlowInput {
                    bottom_space: input.bottom_space,
                    reserved: input.reserved,
                    resume: inner.as_ref().and_then(ResumePoint::inner),
                    page_is_empty: input.page_is_empty && !placed,
                    adjoining_margins: Vec::new(),
                };
                let outcome = layout_block_level(
                    ctx,
                    child,
                    &Slot::new(frame.content_x, y, cb),
                    child_input,
                    &mut FloatContext::new(),
                );
                match outcome.result {
                    LayoutResult::Complete(fragment) => {
                        y = fragment.margin_box().bottom();
                        body.children.push(fragment);
                        placed = true;
                    }
                    LayoutResult::Partial(fragment, next) => {
                        body.children.push(fragment);
                        body.resume = Some(ResumePoint::inside_child(*index, next));
                        break;
                    }
                    LayoutResult::Pushed => {
                        if !placed && !input.page_is_empty {
                            return FlowOutcome::pushed();
                        }
                        body.resume = Some(ResumePoint::at_child(*index));
                        break;
                    }
                }
            }
        }
    }

    if !placed && body.resume.is_some() && !input.page_is_empty {
        return FlowOutcome::pushed();
    }
    body.baseline = body.children.first().and_then(|c| c.baseline);
    let content_height = y - frame.content_y;
    frame.close(ctx, b, slot, &input, content_height, body, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::ComputedStyle;
    use quire_style::values::{LengthPercentage, Size};

    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn block(id: usize, height: f32) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.height = Size::Length(height);
        LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style))
    }

    fn multicol(children: Vec<LayoutBox>, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.column_count = Some(2);
        style.column_gap = Some(LengthPercentage::Length(10.0));
        f(&mut style);
        let mut b = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(style));
        b.children = children;
        b
    }

    fn lay_out(b: &LayoutBox, input: FlowInput<'_>) -> FlowOutcome {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let cb = Containing {
            width: 110.0,
            height: None,
        };
        layout_block_level(&mut ctx, b, &Slot::new(0.0, 0.0, cb), input, &mut FloatContext::new())
    }

    fn columns_of(fragment: &LayoutBox) -> Vec<&LayoutBox> {
        fragment.children.iter().filter(|c| c.kind == BoxKind::Column).collect()
    }

    #[test]
    fn test_column_geometry() {
        assert_eq!(column_geometry(Some(3), None, 10.0, 110.0), (3, 30.0));
        assert_eq!(column_geometry(None, Some(40.0), 10.0, 100.0), (2, 45.0));
        assert_eq!(column_geometry(Some(4), Some(40.0), 10.0, 100.0), (2, 45.0));
        assert_eq!(column_geometry(None, Some(200.0), 10.0, 100.0), (1, 100.0));
    }

    #[test]
    fn test_balanced_columns_share_content() {
        let b = multicol((0..4).map(|i| block(10 + i, 10.0)).collect(), |_| {});
        let fragment = lay_out(&b, FlowInput::unfragmented()).result.fragment().cloned().unwrap();
        let columns = columns_of(&fragment);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].children.len(), 2);
        assert_eq!((columns[1].position_x, columns[1].width), (60.0, 50.0));
        assert_eq!(fragment.height, 20.0);
    }

    #[test]
    fn test_column_break_moves_to_next_column() {
        let second = {
            let mut b = block(11, 10.0);
            let mut style = (*b.style).clone();
            style.break_before = BreakBetween::Column;
            b.style = Arc::new(style);
            b
        };
        let b = multicol(vec![block(10, 10.0), second, block(12, 10.0)], |s| s.column_fill = ColumnFill::Auto);
        let input = FlowInput {
            bottom_space: 100.0,
            ..FlowInput::unfragmented()
        };
        let fragment = lay_out(&b, input).result.fragment().cloned().unwrap();
        let columns = columns_of(&fragment);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].children.len(), 1);
        assert_eq!(columns[1].children[0].id, BoxId(11));
    }

    #[test]
    fn test_columns_continue_on_next_page() {
        let b = multicol((0..6).map(|i| block(10 + i, 10.0)).collect(), |s| s.column_fill = ColumnFill::Auto);
        let input = FlowInput {
            bottom_space: 20.0,
            ..FlowInput::unfragmented()
        };
        let LayoutResult::Partial(first, resume) = lay_out(&b, input).result else {
            panic!("columns should break");
        };
        assert_eq!(resume, ResumePoint::at_child(4));
        assert_eq!(columns_of(&first).len(), 2);
    }

    #[test]
    fn test_spanner_splits_runs() {
        let mut spanner = block(20, 5.0);
        let mut style = (*spanner.style).clone();
        style.column_span = ColumnSpan::All;
        spanner.style = Arc::new(style);
        let mut children: Vec<LayoutBox> = (0..2).map(|i| block(10 + i, 10.0)).collect();
        children.push(spanner);
        children.extend((0..2).map(|i| block(12 + i, 10.0)));
        let b = multicol(children, |_| {});
        let fragment = lay_out(&b, FlowInput::unfragmented()).result.fragment().cloned().unwrap();
        let span = fragment.children.iter().find(|c| c.id == BoxId(20)).unwrap();
        assert_eq!((span.position_y, span.width), (10.0, 110.0));
        assert_eq!(columns_of(&fragment).len(), 4);
        assert_eq!(fragment.height, 25.0);
    }
}
