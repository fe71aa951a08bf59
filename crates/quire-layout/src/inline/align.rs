//! Building line boxes.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//! and [CSS Text § 7 Alignment and Justification](https://www.w3.org/TR/css-text-3/#justification)
//!
//! A line is assembled in three passes over the fragments of one
//! [`LineSpan`]: horizontal placement in logical order (mirrored afterwards
//! for right-to-left paragraphs), `text-align` and justification, then
//! `vertical-align` against a baseline at zero. The finished line box has
//! its top at zero; the caller moves it into place.

use std::slice;
use std::sync::Arc;

use quire_style::ComputedStyle;
use quire_style::PseudoElement;
use quire_style::keywords::{BoxDecorationBreak, Direction, TextAlign, TextAlignLast, TextJustify};
use quire_style::values::VerticalAlign;

use crate::block::{padding_edges, placeholder};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::EdgeSizes;
use crate::options::EPSILON;
use crate::text::SOFT_HYPHEN;

use super::items::{ItemKind, Paragraph};
use super::line_break::LineSpan;

/// Where and how one line is built.
#[derive(Debug, Clone)]
pub struct LineParams<'l> {
    /// The content of the line.
    pub span: LineSpan,
    /// Left edge of the space beside the floats.
    pub x: f32,
    /// Width of the space beside the floats.
    pub width: f32,
    /// `text-indent` of the first line, zero otherwise.
    pub indent: f32,
    /// The last line of the paragraph.
    pub last: bool,
    /// Left content edge of the block container.
    pub content_x: f32,
    /// Content width of the block container, the percentage basis.
    pub content_width: f32,
    /// Style shared by the line boxes of this paragraph.
    pub line_style: &'l Arc<ComputedStyle>,
}

/// A finished line box, top at zero.
#[derive(Debug, Clone)]
pub struct BuiltLine {
    /// The line box and its fragments.
    pub line: LayoutBox,
    /// [§ 4.1.1](https://www.w3.org/TR/css-inline-3/#invisible-line-boxes)
    /// "Line boxes that contain no text, no preserved white space, no inline
    /// boxes with non-zero margins, padding, or borders, and no other
    /// in-flow content must be treated as zero-height line boxes".
    pub phantom: bool,
    /// Footnotes whose call starts on this line.
    pub footnotes: Vec<usize>,
}

/// Assemble the line for `params.span`.
pub fn build_line(
    ctx: &mut LayoutContext<'_>,
    para: &Paragraph<'_>,
    parent: &LayoutBox,
    params: &LineParams<'_>,
) -> BuiltLine {
    let rtl = parent.style.direction == Direction::Rtl;
    let mut footnotes = Vec::new();
    let mut marker = None;
    let mut children = fragments(ctx, para, params, &mut footnotes, &mut marker);

    if params.span.hyphenated {
        append_hyphen(ctx, &mut children);
    }
    let phantom = marker.is_none() && is_phantom(&children);

    // STEP 1: Horizontal placement and alignment.
    let natural = place_horizontally(&mut children, 0.0);
    let mut free = params.width - params.indent - natural;
    let align = used_alignment(&parent.style, params.last || params.span.forced);
    let has_leaders = fill_leaders(ctx, &mut children, free.max(0.0));
    if free > EPSILON
        && (has_leaders || (align == Align::Justify && justify(&mut children, free, parent.style.text_justify)))
    {
        free = 0.0;
    }
    // [§ 7.1](https://www.w3.org/TR/css-text-3/#text-align-property)
    // "If (after justification, if any) the inline contents of a line box
    // are too long to fit within it, then the contents are start-aligned".
    let free = free.max(0.0);
    let offset = match align {
        Align::Left | Align::Justify => 0.0,
        Align::Right => free,
        Align::Center => free / 2.0,
    };
    let _ = place_horizontally(&mut children, params.x + params.indent + offset);
    if rtl {
        mirror(&mut children, 2.0f32.mul_add(params.x, params.width));
    }

    // STEP 2: Vertical alignment against a baseline at zero.
    //
    // [§ 10.8](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    // "The line box height is the distance between the uppermost box top
    // and the lowermost box bottom. (This includes the strut.)"
    let root = Metrics::of(ctx, &parent.style);
    let mut extents = Extents::EMPTY;
    if !phantom {
        extents.include(-root.above, root.below);
    }
    let mut deferred = Vec::new();
    align_boxes(ctx, &mut children, 0.0, &root, &mut extents, &mut deferred, &mut Vec::new());
    if extents.is_empty() {
        extents = Extents { top: 0.0, bottom: 0.0 };
    }

    // STEP 3: `top` and `bottom` align against the finished line.
    //
    // "The element is aligned so that the top of the aligned subtree is
    // aligned with the top of the line box."
    let (mut top, mut bottom) = (extents.top, extents.bottom);
    for d in &deferred {
        let height = d.extents.bottom - d.extents.top;
        if d.top {
            bottom = bottom.max(top + height);
        } else {
            top = top.min(bottom - height);
        }
    }
    for d in &deferred {
        let dy = if d.top {
            top - d.extents.top
        } else {
            bottom - d.extents.bottom
        };
        if let Some(b) = box_at_path(&mut children, &d.path) {
            b.translate(0.0, dy);
        }
    }

    // STEP 4: Outside marker, beside the first line at its baseline.
    if let Some(mut marker) = marker {
        let width = place_horizontally(slice::from_mut(&mut marker), 0.0);
        let x = if rtl {
            params.content_x + params.content_width
        } else {
            params.content_x - width
        };
        let _ = place_horizontally(slice::from_mut(&mut marker), x);
        let m = Metrics::of(ctx, &marker.style);
        // The marker hangs outside the line and does not grow it.
        let mut marker_extents = Extents::EMPTY;
        lay_inline(ctx, &mut marker, 0.0, &m, &mut marker_extents, &mut Vec::new(), &mut Vec::new());
        children.push(marker);
    }

    for child in &mut children {
        child.translate(0.0, -top);
    }
    let mut line = LayoutBox::new(parent.id, BoxKind::Line, Arc::clone(params.line_style));
    line.anonymous = true;
    line.position_x = params.x;
    line.width = params.width;
    line.height = if phantom { 0.0 } else { bottom - top };
    line.baseline = Some(-top);
    line.children = children;

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[LINE] {}..{} width={natural} height={} phantom={phantom}",
        params.span.start,
        params.span.end,
        line.height
    );

    BuiltLine {
        line,
        phantom,
        footnotes,
    }
}

/// Fragments of the items on the line, nested in their inline boxes.
fn fragments(
    ctx: &mut LayoutContext<'_>,
    para: &Paragraph<'_>,
    params: &LineParams<'_>,
    footnotes: &mut Vec<usize>,
    marker: &mut Option<LayoutBox>,
) -> Vec<LayoutBox> {
    let span = params.span;
    let (_, text_end) = para.hanging_space(span.end);
    let cb_width = params.content_width;

    // Inline boxes that started on an earlier line continue here.
    let mut stack: Vec<(LayoutBox, usize)> = para
        .open_at(span.start)
        .into_iter()
        .map(|index| {
            let mut b = para.items[index].source.shell();
            b.is_first_fragment = false;
            b.is_last_fragment = false;
            (b, index)
        })
        .collect();
    let mut top = Vec::new();

    for (index, item) in para.items.iter().enumerate() {
        if !para.line_includes(item, span.start, span.end) {
            continue;
        }
        let fragment = match &item.kind {
            ItemKind::Text(shaped) => {
                let start = span.start.max(item.start);
                let end = span.end.min(item.end).min(text_end);
                if end <= start {
                    continue;
                }
                let (from, to) = (start - item.start, end - item.start);
                let text: String = item.text[from..to]
                    .chars()
                    .filter(|&c| c != SOFT_HYPHEN && c != '\n')
                    .collect();
                let mut t = item.source.shell();
                t.kind = BoxKind::Text(text);
                t.width = shaped.width_between(from, to);
                t
            }
            ItemKind::Open(_) => {
                let mut b = item.source.shell();
                b.is_last_fragment = false;
                if b.pseudo == Some(PseudoElement::FootnoteCall)
                    && let Some(footnote) = b.footnote
                {
                    footnotes.push(footnote);
                }
                stack.push((b, index));
                continue;
            }
            ItemKind::Close(_) => {
                let matches = stack
                    .last()
                    .is_some_and(|(_, open)| para.items[*open].source.id == item.source.id);
                let Some((mut b, _)) = stack.pop().filter(|_| matches) else {
                    continue;
                };
                b.is_last_fragment = true;
                finish_inline(&mut b, cb_width);
                b
            }
            ItemKind::Atomic(fragment) => fragment.clone(),
            ItemKind::Break => {
                let mut b = item.source.shell();
                b.kind = BoxKind::LineBreak;
                b
            }
            ItemKind::Absolute => {
                ctx.register_absolute(item.source);
                placeholder(item.source, 0.0, 0.0)
            }
            ItemKind::Leader(_) => item.source.shell(),
            ItemKind::Marker => {
                *marker = Some(shape_marker(ctx, item.source));
                continue;
            }
            ItemKind::Float => continue,
        };
        push_fragment(&mut stack, &mut top, fragment);
    }
    while let Some((mut b, _)) = stack.pop() {
        b.is_last_fragment = false;
        finish_inline(&mut b, cb_width);
        push_fragment(&mut stack, &mut top, b);
    }
    top
}

fn push_fragment(stack: &mut [(LayoutBox, usize)], top: &mut Vec<LayoutBox>, fragment: LayoutBox) {
    match stack.last_mut() {
        Some((parent, _)) => parent.children.push(fragment),
        None => top.push(fragment),
    }
}

/// [§ 8.6](https://www.w3.org/TR/CSS2/box.html#bidi-box-model)
/// and [CSS Fragmentation § 5.4](https://www.w3.org/TR/css-break-3/#break-decoration)
///
/// Start-side edges go on the first fragment, end-side edges on the last;
/// `box-decoration-break: clone` puts both on every fragment. Vertical
/// margins of inline boxes have no effect.
fn finish_inline(b: &mut LayoutBox, cb_width: f32) {
    let style = &b.style;
    let border = style.border_widths();
    let padding = padding_edges(style, cb_width);
    let margin_left = style.margin.left.resolve_or_zero(cb_width);
    let margin_right = style.margin.right.resolve_or_zero(cb_width);
    let clone = style.box_decoration_break == BoxDecorationBreak::Clone;
    let start = b.is_first_fragment || clone;
    let end = b.is_last_fragment || clone;

    // Logical sides; right-to-left lines are mirrored afterwards.
    let (start_edges, end_edges) = if style.direction == Direction::Rtl {
        ((margin_right, border.right, padding.right), (margin_left, border.left, padding.left))
    } else {
        ((margin_left, border.left, padding.left), (margin_right, border.right, padding.right))
    };
    let pick = |on: bool, value: f32| if on { value } else { 0.0 };
    b.margin = EdgeSizes {
        top: 0.0,
        right: pick(end, end_edges.0),
        bottom: 0.0,
        left: pick(start, start_edges.0),
    };
    b.border = EdgeSizes {
        top: border.top,
        right: pick(end, end_edges.1),
        bottom: border.bottom,
        left: pick(start, start_edges.1),
    };
    b.padding = EdgeSizes {
        top: padding.top,
        right: pick(end, end_edges.2),
        bottom: padding.bottom,
        left: pick(start, start_edges.2),
    };
}

fn shape_marker(ctx: &LayoutContext<'_>, source: &LayoutBox) -> LayoutBox {
    let mut marker = source.shell();
    for child in &source.children {
        if let BoxKind::Text(text) = &child.kind {
            let mut t = child.shell();
            t.width = ctx.shaper.shape(text, &child.style).width();
            marker.children.push(t);
        }
    }
    marker
}

fn last_text_mut(boxes: &mut [LayoutBox]) -> Option<&mut LayoutBox> {
    for b in boxes.iter_mut().rev() {
        if matches!(b.kind, BoxKind::Text(_)) {
            return Some(b);
        }
        if b.kind == BoxKind::Inline
            && let Some(text) = last_text_mut(&mut b.children)
        {
            return Some(text);
        }
    }
    None
}

/// [CSS Text 4 § 6.1 'hyphenate-character'](https://www.w3.org/TR/css-text-4/#hyphenate-character)
fn append_hyphen(ctx: &LayoutContext<'_>, children: &mut [LayoutBox]) {
    let Some(text) = last_text_mut(children) else {
        return;
    };
    let style = Arc::clone(&text.style);
    let hyphen = &style.hyphenate_character;
    text.width += ctx.shaper.shape(hyphen, &style).width();
    if let BoxKind::Text(content) = &mut text.kind {
        content.push_str(hyphen);
    }
}

fn is_phantom(boxes: &[LayoutBox]) -> bool {
    boxes.iter().all(|b| match &b.kind {
        BoxKind::Text(text) => text.is_empty(),
        BoxKind::AbsolutePlaceholder => true,
        BoxKind::Inline => {
            b.margin.horizontal() + b.border.horizontal() + b.padding.horizontal() <= 0.0
                && is_phantom(&b.children)
        }
        _ => false,
    })
}

/// Lay `boxes` out left to right from `x`; returns the end edge.
fn place_horizontally(boxes: &mut [LayoutBox], x: f32) -> f32 {
    let mut x = x;
    for b in boxes {
        if b.kind == BoxKind::Inline {
            b.position_x = x;
            let inner = x + b.margin.left + b.border.left + b.padding.left;
            let end = place_horizontally(&mut b.children, inner);
            b.width = end - inner;
            x = end + b.padding.right + b.border.right + b.margin.right;
        } else {
            b.translate(x - b.position_x, 0.0);
            x += b.margin_width();
        }
    }
    x
}

/// Reflect every fragment around the middle of the line; `axis` is twice
/// the middle.
fn mirror(boxes: &mut [LayoutBox], axis: f32) {
    for b in boxes {
        let x = axis - (b.position_x + b.margin_width());
        if b.kind == BoxKind::Inline {
            b.position_x = x;
            std::mem::swap(&mut b.margin.left, &mut b.margin.right);
            std::mem::swap(&mut b.border.left, &mut b.border.right);
            std::mem::swap(&mut b.padding.left, &mut b.padding.right);
            mirror(&mut b.children, axis);
        } else {
            b.translate(x - b.position_x, 0.0);
        }
    }
}

/// Alignment in logical left-to-right terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    Justify,
}

/// [§ 7.2 'text-align-last'](https://www.w3.org/TR/css-text-3/#text-align-last-property)
///
/// "auto: Content on the affected line is aligned per text-align-all
/// unless text-align-all is set to justify, in which case it is
/// start-aligned."
fn used_alignment(style: &ComputedStyle, last: bool) -> Align {
    let rtl = style.direction == Direction::Rtl;
    let (left, right) = if rtl {
        (Align::Right, Align::Left)
    } else {
        (Align::Left, Align::Right)
    };
    let from_text_align = |align: TextAlign| match align {
        TextAlign::Start => Align::Left,
        TextAlign::End => Align::Right,
        TextAlign::Left => left,
        TextAlign::Right => right,
        TextAlign::Center => Align::Center,
        TextAlign::Justify | TextAlign::JustifyAll => Align::Justify,
    };
    if !last {
        return from_text_align(style.text_align);
    }
    match style.text_align_last {
        TextAlignLast::Auto => match style.text_align {
            TextAlign::Justify => Align::Left,
            other => from_text_align(other),
        },
        TextAlignLast::Start => Align::Left,
        TextAlignLast::End => Align::Right,
        TextAlignLast::Left => left,
        TextAlignLast::Right => right,
        TextAlignLast::Center => Align::Center,
        TextAlignLast::Justify => Align::Justify,
    }
}

fn collect_mut<'b>(boxes: &'b mut [LayoutBox], want: fn(&BoxKind) -> bool, out: &mut Vec<&'b mut LayoutBox>) {
    for b in boxes {
        if want(&b.kind) {
            out.push(b);
        } else if b.kind == BoxKind::Inline {
            collect_mut(&mut b.children, want, out);
        }
    }
}

/// [CSS GCPM § 4 Leaders](https://www.w3.org/TR/css-gcpm-3/#leaders)
///
/// "The leader() function ... expands to fill the available space on the
/// line". Free space is shared among the leaders of the line, each filled
/// with whole repetitions of its pattern.
fn fill_leaders(ctx: &LayoutContext<'_>, children: &mut [LayoutBox], free: f32) -> bool {
    let mut leaders = Vec::new();
    collect_mut(children, |k| matches!(k, BoxKind::Leader(_)), &mut leaders);
    if leaders.is_empty() {
        return false;
    }
    let share = free / leaders.len() as f32;
    for leader in leaders {
        let BoxKind::Leader(pattern) = &leader.kind else {
            continue;
        };
        let unit = ctx.shaper.shape(pattern, &leader.style).width();
        let count = if unit > 0.0 { (share / unit).floor() as usize } else { 0 };
        leader.kind = BoxKind::Leader(pattern.repeat(count));
        leader.width += share;
    }
    true
}

/// [§ 7.3 Justification](https://www.w3.org/TR/css-text-3/#justify-content)
///
/// Spreads `free` over the justification opportunities of the line:
/// word separators, or every character but the last for
/// `inter-character`.
fn justify(children: &mut [LayoutBox], free: f32, mode: TextJustify) -> bool {
    if mode == TextJustify::None {
        return false;
    }
    let mut texts = Vec::new();
    collect_mut(children, |k| matches!(k, BoxKind::Text(_)), &mut texts);
    let mut counts: Vec<usize> = texts
        .iter()
        .map(|t| match &t.kind {
            BoxKind::Text(text) if mode == TextJustify::InterCharacter => text.chars().count(),
            BoxKind::Text(text) => text.chars().filter(|c| matches!(c, ' ' | '\u{a0}')).count(),
            _ => 0,
        })
        .collect();
    if mode == TextJustify::InterCharacter
        && let Some(last) = counts.iter_mut().rev().find(|c| **c > 0)
    {
        *last -= 1;
    }
    let total: usize = counts.iter().sum();
    if total == 0 {
        return false;
    }
    let extra = free / total as f32;
    for (text, count) in texts.into_iter().zip(counts) {
        if count > 0 {
            text.justification = extra;
            text.width += extra * count as f32;
        }
    }
    true
}

#[derive(Debug, Clone, Copy)]
struct Metrics {
    ascent: f32,
    descent: f32,
    above: f32,
    below: f32,
    x_height: f32,
    font_size: f32,
    line_height: f32,
}

impl Metrics {
    fn of(ctx: &LayoutContext<'_>, style: &ComputedStyle) -> Self {
        let strut = ctx.shaper.strut(style);
        let (above, below) = strut.half_leading_extents();
        Self {
            ascent: strut.ascent,
            descent: strut.descent,
            above,
            below,
            x_height: strut.x_height,
            font_size: style.font_size,
            line_height: strut.line_height,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Extents {
    top: f32,
    bottom: f32,
}

impl Extents {
    const EMPTY: Self = Self {
        top: f32::INFINITY,
        bottom: f32::NEG_INFINITY,
    };

    fn include(&mut self, top: f32, bottom: f32) {
        self.top = self.top.min(top);
        self.bottom = self.bottom.max(bottom);
    }

    const fn is_empty(&self) -> bool {
        self.top > self.bottom
    }
}

/// A subtree aligned with `top` or `bottom`, laid out around its own
/// baseline at zero.
struct LineRelative {
    path: Vec<usize>,
    top: bool,
    extents: Extents,
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
///
/// Baseline of a box with `own` metrics aligned in a parent whose baseline
/// is at `baseline`.
fn baseline_shift(align: VerticalAlign, baseline: f32, parent: &Metrics, own: &Metrics) -> f32 {
    match align {
        VerticalAlign::Baseline | VerticalAlign::Top | VerticalAlign::Bottom => baseline,
        VerticalAlign::Sub => 0.2f32.mul_add(parent.font_size, baseline),
        VerticalAlign::Super => 0.5f32.mul_add(-parent.font_size, baseline),
        // "Align the top of the box with the top of the parent's content
        // area"
        VerticalAlign::TextTop => baseline - parent.ascent + own.ascent,
        VerticalAlign::TextBottom => baseline + parent.descent - own.descent,
        // "Align the vertical midpoint of the box with the baseline of the
        // parent box plus half the x-height of the parent."
        VerticalAlign::Middle => baseline - parent.x_height / 2.0 + (own.ascent - own.descent) / 2.0,
        VerticalAlign::Length(raise) => baseline - raise,
        VerticalAlign::Percent(percent) => baseline - percent / 100.0 * own.line_height,
    }
}

fn align_boxes(
    ctx: &LayoutContext<'_>,
    boxes: &mut [LayoutBox],
    baseline: f32,
    parent: &Metrics,
    extents: &mut Extents,
    deferred: &mut Vec<LineRelative>,
    path: &mut Vec<usize>,
) {
    for (index, b) in boxes.iter_mut().enumerate() {
        path.push(index);
        let align = b.style.vertical_align;
        let line_relative = matches!(align, VerticalAlign::Top | VerticalAlign::Bottom);
        let glyphs = matches!(b.kind, BoxKind::Text(_) | BoxKind::LineBreak | BoxKind::Leader(_));

        if glyphs {
            let m = Metrics::of(ctx, &b.style);
            b.position_y = baseline - m.ascent;
            b.height = m.ascent + m.descent;
            b.baseline = Some(baseline);
            extents.include(baseline - m.above, baseline + m.below);
        } else if b.kind == BoxKind::AbsolutePlaceholder {
            b.position_y = baseline - parent.above;
        } else if b.kind == BoxKind::Inline {
            let m = Metrics::of(ctx, &b.style);
            if line_relative {
                let mut own = Extents::EMPTY;
                lay_inline(ctx, b, 0.0, &m, &mut own, &mut Vec::new(), path);
                deferred.push(LineRelative {
                    path: path.clone(),
                    top: align == VerticalAlign::Top,
                    extents: own,
                });
            } else {
                let own_baseline = baseline_shift(align, baseline, parent, &m);
                lay_inline(ctx, b, own_baseline, &m, extents, deferred, path);
            }
        } else {
            // Atomic inlines align by their margin box and their baseline,
            // or their bottom margin edge when they have none.
            let height = b.margin_height();
            let own_baseline = b.baseline.map_or(height, |y| y - b.position_y);
            let strut = ctx.shaper.strut(&b.style);
            let m = Metrics {
                ascent: own_baseline,
                descent: height - own_baseline,
                above: own_baseline,
                below: height - own_baseline,
                x_height: strut.x_height,
                font_size: b.style.font_size,
                line_height: strut.line_height,
            };
            if line_relative {
                b.translate(0.0, -b.position_y);
                deferred.push(LineRelative {
                    path: path.clone(),
                    top: align == VerticalAlign::Top,
                    extents: Extents { top: 0.0, bottom: height },
                });
            } else {
                let top = baseline_shift(align, baseline, parent, &m) - own_baseline;
                b.translate(0.0, top - b.position_y);
                extents.include(top, top + height);
            }
        }
        let _ = path.pop();
    }
}

/// [§ 10.6.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-non-replaced)
///
/// "The height of the content area should be based on the font"; its
/// leading decides what it contributes to the line.
fn lay_inline(
    ctx: &LayoutContext<'_>,
    b: &mut LayoutBox,
    baseline: f32,
    m: &Metrics,
    extents: &mut Extents,
    deferred: &mut Vec<LineRelative>,
    path: &mut Vec<usize>,
) {
    b.position_y = baseline - m.ascent - b.border.top - b.padding.top;
    b.height = m.ascent + m.descent;
    b.baseline = Some(baseline);
    extents.include(baseline - m.above, baseline + m.below);
    align_boxes(ctx, &mut b.children, baseline, m, extents, deferred, path);
}

fn box_at_path<'b>(boxes: &'b mut [LayoutBox], path: &[usize]) -> Option<&'b mut LayoutBox> {
    let (&first, rest) = path.split_first()?;
    let b = boxes.get_mut(first)?;
    if rest.is_empty() {
        Some(b)
    } else {
        box_at_path(&mut b.children, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::keywords::TextAlign;
    use quire_style::values::LengthPercentage;

    use crate::block::Containing;
    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::inline::items::{Measure, flatten};
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn paragraph(style: ComputedStyle, children: Vec<LayoutBox>) -> LayoutBox {
        let mut b = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(style));
        b.children = children;
        b
    }

    fn text(id: usize, content: &str) -> LayoutBox {
        LayoutBox::new(BoxId(id), BoxKind::Text(content.into()), Arc::new(ComputedStyle::initial()))
    }

    fn build(ctx: &mut LayoutContext<'_>, parent: &LayoutBox, width: f32) -> BuiltLine {
        let cb = Containing { width, height: None };
        let para = flatten(ctx, parent, cb, Measure::Layout);
        let span = para.next_line(ctx, 0, width, 0.0);
        let line_style = Arc::new(ComputedStyle::initial());
        let params = LineParams {
            span,
            x: 0.0,
            width,
            indent: 0.0,
            last: span.end == para.text.len(),
            content_x: 0.0,
            content_width: width,
            line_style: &line_style,
        };
        build_line(ctx, &para, parent, &params)
    }

    #[test]
    fn test_line_height_from_strut() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let parent = paragraph(ComputedStyle::initial(), vec![text(2, "ab")]);
        let built = build(&mut ctx, &parent, 100.0);
        // 16px font, normal line height: ascent 12.8 plus descent 3.2.
        assert!(!built.phantom);
        assert!((built.line.height - 16.0).abs() < 1e-4);
        assert!((built.line.baseline.unwrap_or_default() - 12.8).abs() < 1e-4);
        let t = &built.line.children[0];
        assert_eq!(t.width, 32.0);
        assert!(t.position_y.abs() < 1e-4);
    }

    #[test]
    fn test_center_and_right_alignment() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.text_align = TextAlign::Center;
        let parent = paragraph(style.clone(), vec![text(2, "ab")]);
        assert_eq!(build(&mut ctx, &parent, 100.0).line.children[0].position_x, 34.0);

        style.text_align = TextAlign::Right;
        let parent = paragraph(style.clone(), vec![text(2, "ab")]);
        assert_eq!(build(&mut ctx, &parent, 100.0).line.children[0].position_x, 68.0);

        style.text_align = TextAlign::Start;
        style.direction = Direction::Rtl;
        let parent = paragraph(style, vec![text(2, "ab")]);
        assert_eq!(build(&mut ctx, &parent, 100.0).line.children[0].position_x, 68.0);
    }

    #[test]
    fn test_justify_spreads_spaces() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.text_align = TextAlign::Justify;
        let parent = paragraph(style, vec![text(2, "aa bb cc")]);
        let cb = Containing {
            width: 112.0,
            height: None,
        };
        let para = flatten(&mut ctx, &parent, cb, Measure::Layout);
        // "aa bb " fits 7 characters; the trailing space hangs.
        let span = para.next_line(&ctx, 0, 112.0, 0.0);
        let line_style = Arc::new(ComputedStyle::initial());
        let params = LineParams {
            span,
            x: 0.0,
            width: 112.0,
            indent: 0.0,
            last: false,
            content_x: 0.0,
            content_width: 112.0,
            line_style: &line_style,
        };
        let built = build_line(&mut ctx, &para, &parent, &params);
        let t = &built.line.children[0];
        assert_eq!(t.text(), "aa bb");
        // One space absorbs 112 - 80.
        assert_eq!(t.justification, 32.0);
        assert_eq!(t.width, 112.0);
    }

    #[test]
    fn test_split_inline_keeps_edges_on_ends() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut span_style = ComputedStyle::initial();
        span_style.padding.left = LengthPercentage::Length(5.0);
        span_style.padding.right = LengthPercentage::Length(7.0);
        let mut span = LayoutBox::new(BoxId(3), BoxKind::Inline, Arc::new(span_style));
        span.children.push(text(4, "aaa bbb"));
        let parent = paragraph(ComputedStyle::initial(), vec![span]);
        let cb = Containing {
            width: 80.0,
            height: None,
        };
        let para = flatten(&mut ctx, &parent, cb, Measure::Layout);
        let line_style = Arc::new(ComputedStyle::initial());
        let first = para.next_line(&ctx, 0, 80.0, 0.0);
        let second = para.next_line(&ctx, first.end, 80.0, 0.0);
        let mut fragments = Vec::new();
        for (span, last) in [(first, false), (second, true)] {
            let params = LineParams {
                span,
                x: 0.0,
                width: 80.0,
                indent: 0.0,
                last,
                content_x: 0.0,
                content_width: 80.0,
                line_style: &line_style,
            };
            let built = build_line(&mut ctx, &para, &parent, &params);
            fragments.push(built.line.children[0].clone());
        }
        assert!(fragments[0].is_first_fragment && !fragments[0].is_last_fragment);
        assert_eq!((fragments[0].padding.left, fragments[0].padding.right), (5.0, 0.0));
        assert!(!fragments[1].is_first_fragment && fragments[1].is_last_fragment);
        assert_eq!((fragments[1].padding.left, fragments[1].padding.right), (0.0, 7.0));
        assert_eq!(fragments[1].children[0].text(), "bbb");
    }

    #[test]
    fn test_empty_line_is_phantom() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let span = LayoutBox::new(BoxId(3), BoxKind::Inline, Arc::new(ComputedStyle::initial()));
        let parent = paragraph(ComputedStyle::initial(), vec![span]);
        let built = build(&mut ctx, &parent, 100.0);
        assert!(built.phantom);
        assert_eq!(built.line.height, 0.0);
    }
}
