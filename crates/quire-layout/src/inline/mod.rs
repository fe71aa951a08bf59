//! Inline formatting contexts.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! The inline content of a block container is flattened into a
//! [`Paragraph`], cut into lines, and each line is assembled into a line
//! box. Lines are stacked in the block's content box, shortened beside
//! floats, and the paragraph breaks between lines at the bottom of a page,
//! honoring `orphans` and `widows`.

mod align;
mod items;
mod line_break;

use std::iter::once;
use std::sync::Arc;

use quire_style::Display;
use quire_style::keywords::FootnotePolicy;

use crate::block::{BodyOutcome, Containing, ContentArea, FlowState};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::{Checkpoint, LayoutContext};
use crate::float::{FloatContext, layout_float};
use crate::options::EPSILON;
use crate::page::footnotes;
use crate::preferred;
use crate::resume::{FlowInput, ResumePoint};

use align::{BuiltLine, LineParams, build_line};
pub use items::{Item, ItemKind, Measure, Paragraph, flatten};
pub use line_break::LineSpan;

/// What to restore to when a line has to go to the next page.
struct LineSnapshot {
    pos: usize,
    children: usize,
    checkpoint: Checkpoint,
    floats: usize,
    placed_floats: usize,
    state: FlowState,
}

impl LineSnapshot {
    fn restore(
        &self,
        ctx: &mut LayoutContext<'_>,
        floats: &mut FloatContext,
        state: &mut FlowState,
        out: &mut BodyOutcome,
        placed_floats: &mut Vec<usize>,
    ) {
        ctx.rollback(self.checkpoint);
        floats.truncate(self.floats);
        state.clone_from(&self.state);
        out.children.truncate(self.children);
        placed_floats.truncate(self.placed_floats);
    }
}

/// Lay out the inline content of `parent` as line boxes in `area`.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
pub fn layout_inline_content(
    ctx: &mut LayoutContext<'_>,
    parent: &LayoutBox,
    area: &ContentArea,
    state: &mut FlowState,
    input: &FlowInput<'_>,
    floats: &mut FloatContext,
) -> BodyOutcome {
    let para = flatten(ctx, parent, area.cb, Measure::Layout);
    let len = para.text.len();
    let style = &parent.style;
    let strut = ctx.shaper.strut(style);
    let line_style = Arc::new(style.anonymous_child(Display::block()));
    // [§ 7.1 'text-indent'](https://www.w3.org/TR/css-text-3/#text-indent-property)
    // "Percentages: refers to block container's own inline-axis inner size"
    let text_indent = style.text_indent.resolve(area.width);
    let (left, right) = (area.x, area.x + area.width);

    let mut pos = match input.resume {
        Some(ResumePoint::Inline { item, offset }) => para.items.get(*item).map_or(len, |it| it.start + offset),
        _ => 0,
    };
    let mut out = BodyOutcome::default();
    let mut snapshots: Vec<LineSnapshot> = Vec::new();
    let mut placed_floats: Vec<usize> = Vec::new();
    let mut first = true;

    while pos < len || (first && len == 0) {
        first = false;
        let snapshot = LineSnapshot {
            pos,
            children: out.children.len(),
            checkpoint: ctx.checkpoint(),
            floats: floats.mark(),
            placed_floats: placed_floats.len(),
            state: state.clone(),
        };
        let page_is_empty = input.page_is_empty && !state.placed_content;
        let indent = if pos == 0 { text_indent } else { 0.0 };

        // STEP 1: Find the line and the space beside the floats, placing
        // the floats anchored on it.
        //
        // [§ 9.5.1 Rule 6](https://www.w3.org/TR/CSS2/visuren.html#float-position)
        // "The outer top of an element's floating box may not be higher
        // than the top of any line-box containing a box generated by an
        // element earlier in the source document."
        let mut y = state.next_y();
        let mut after_line: Vec<usize> = Vec::new();
        let mut float_overflow = false;
        let (span, band_x, band_width) = loop {
            let (band_x, band_width) = floats.available(y, strut.line_height, left, right);
            let span = para.next_line(ctx, pos, band_width, indent);
            if span.width > band_width + EPSILON
                && band_width + EPSILON < area.width
                && let Some(next) = floats.next_bottom_after(y)
            {
                y = next;
                continue;
            }
            let pending = para
                .items
                .iter()
                .enumerate()
                .find(|&(index, item)| {
                    matches!(item.kind, ItemKind::Float)
                        && !placed_floats.contains(&index)
                        && !after_line.contains(&index)
                        && para.line_includes(item, span.start, span.end)
                })
                .map(|(index, _)| index);
            let Some(index) = pending else {
                break (span, band_x, band_width);
            };
            let item = &para.items[index];
            let before = para.width_to(item.start) - para.width_to(span.start) + indent;
            let checkpoint = ctx.checkpoint();
            let mark = floats.mark();
            let fragment = layout_float(ctx, item.source, area.cb, y, left, right, floats);
            // A float that does not fit beside the content before it goes
            // below the line.
            if before > EPSILON && before + fragment.margin_width() > band_width + EPSILON {
                ctx.rollback(checkpoint);
                floats.truncate(mark);
                after_line.push(index);
                continue;
            }
            if !page_is_empty && fragment.margin_box().bottom() > ctx.flow_limit(input) + EPSILON {
                float_overflow = true;
            }
            placed_floats.push(index);
            out.children.push(fragment);
        };

        // STEP 2: Build the line and put it below the margins above.
        let params = LineParams {
            span,
            x: band_x,
            width: band_width,
            indent,
            last: span.end >= len,
            content_x: area.x,
            content_width: area.width,
            line_style: &line_style,
        };
        let BuiltLine {
            mut line,
            phantom,
            footnotes: calls,
        } = build_line(ctx, &para, parent, &params);
        let line_y = if phantom {
            state.next_y()
        } else {
            state.flush().max(y)
        };
        line.translate(0.0, line_y);
        let bottom = line_y + line.height;

        // STEP 3: Footnotes called on the line.
        //
        // [GCPM § 2.6 'footnote-policy'](https://www.w3.org/TR/css-gcpm-3/#footnote-policy)
        let mut break_here = float_overflow;
        for &index in &calls {
            let within_max = footnotes::place_footnote(ctx, index);
            if within_max && bottom <= ctx.flow_limit(input) + EPSILON {
                continue;
            }
            match footnotes::policy(ctx, index) {
                // "If a given footnote body cannot be placed on the current
                // page due to lack of space, the user agent introduces a
                // forced page break at the start of the line containing the
                // footnote reference."
                FootnotePolicy::Line if !page_is_empty => break_here = true,
                // "the user agent introduces a forced page break at the start
                // of the paragraph containing the footnote reference."
                FootnotePolicy::Block if !input.page_is_empty => {
                    out.pushed = true;
                    return out;
                }
                _ => footnotes::defer_footnote(ctx, index),
            }
        }

        // STEP 4: Break before a line that does not fit.
        if !phantom && !page_is_empty && (break_here || bottom > ctx.flow_limit(input) + EPSILON) {
            snapshot.restore(ctx, floats, state, &mut out, &mut placed_floats);
            break_between_lines(ctx, &para, parent, area, input, state, floats, &mut out, &snapshots, &mut placed_floats, pos);
            return out;
        }

        if !phantom {
            state.cursor = bottom;
            state.placed_content = true;
            snapshots.push(snapshot);
        }
        out.children.push(line);

        // STEP 5: Floats that did not fit on the line go below it.
        for index in after_line {
            let fragment = layout_float(ctx, para.items[index].source, area.cb, state.next_y().max(bottom), left, right, floats);
            placed_floats.push(index);
            out.children.push(fragment);
        }
        pos = span.end;
    }

    out.baseline = first_baseline(&out.children);
    out
}

fn first_baseline(children: &[LayoutBox]) -> Option<f32> {
    children
        .iter()
        .find(|c| c.kind == BoxKind::Line && c.height > 0.0)
        .and_then(|line| line.baseline)
}

/// The paragraph stops before the line at `pos`.
///
/// [CSS Fragmentation § 3.3 Breaks Between Lines: orphans, widows](https://www.w3.org/TR/css-break-3/#widows-orphans)
///
/// "The orphans property specifies the minimum number of line boxes in a
/// block container that must be left in a fragment before a fragmentation
/// break. The widows property specifies the minimum number of line boxes
/// of a block container that must be left in a fragment after a break."
/// Both are ignored when the fragment starts an empty page.
#[allow(clippy::too_many_arguments)]
fn break_between_lines(
    ctx: &mut LayoutContext<'_>,
    para: &Paragraph<'_>,
    parent: &LayoutBox,
    area: &ContentArea,
    input: &FlowInput<'_>,
    state: &mut FlowState,
    floats: &mut FloatContext,
    out: &mut BodyOutcome,
    snapshots: &[LineSnapshot],
    placed_floats: &mut Vec<usize>,
    pos: usize,
) {
    let placed = snapshots.len();
    let orphans = parent.style.orphans.max(1) as usize;
    let widows = parent.style.widows.max(1) as usize;
    if placed == 0 || (placed < orphans && !input.page_is_empty) {
        out.pushed = !input.page_is_empty;
        if !out.pushed {
            out.resume = Some(resume_point(para, pos));
        }
        return;
    }

    let remaining = para.count_lines(ctx, pos, area.width, widows);
    let mut keep = placed;
    if remaining < widows {
        let wanted = placed.saturating_sub(widows - remaining);
        if wanted >= orphans {
            keep = wanted;
        } else if !input.page_is_empty {
            out.pushed = true;
            return;
        }
    }
    let resume_at = match snapshots.get(keep) {
        Some(snapshot) if keep < placed => {
            snapshot.restore(ctx, floats, state, out, placed_floats);
            snapshot.pos
        }
        _ => pos,
    };

    #[cfg(feature = "layout-trace")]
    log::trace!("[INLINE] {:?} breaks after {keep} of {placed} lines at byte {resume_at}", parent.id);

    out.baseline = first_baseline(&out.children);
    out.resume = Some(resume_point(para, resume_at));
}

fn resume_point(para: &Paragraph<'_>, pos: usize) -> ResumePoint {
    let item = para.item_index_at(pos);
    let offset = para.items.get(item).map_or(0, |it| pos.saturating_sub(it.start));
    ResumePoint::Inline { item, offset }
}

/// Min-content and max-content width of inline content.
///
/// [CSS Sizing § 5.1](https://www.w3.org/TR/css-sizing-3/#min-content-inline-size)
/// "The min-content inline size of an inline formatting context is the
/// largest min-content contribution of its line-level content", taking
/// every soft wrap opportunity; the max-content size takes none.
pub fn content_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let cb = Containing {
        width: 0.0,
        height: None,
    };
    let indent = b.style.text_indent.fixed_or_zero();
    let min_para = flatten(ctx, b, cb, Measure::MinContent);
    let mut min = widest_line(ctx, &min_para, indent, false);
    let max_para = flatten(ctx, b, cb, Measure::MaxContent);
    let mut max = widest_line(ctx, &max_para, indent, true);

    // Floats sit beside the text at max-content.
    for item in max_para.items.iter().filter(|i| matches!(i.kind, ItemKind::Float)) {
        let (float_min, float_max) = preferred::outer_widths(ctx, item.source);
        min = min.max(float_min);
        max += float_max;
    }
    (min, max)
}

fn widest_line(ctx: &LayoutContext<'_>, para: &Paragraph<'_>, indent: f32, forced_only: bool) -> f32 {
    let len = para.text.len();
    let mut widest: f32 = 0.0;
    let mut start = 0;
    let ends = para
        .breaks
        .iter()
        .filter(|bp| !forced_only || bp.mandatory)
        .map(|bp| bp.offset)
        .chain(once(len));
    for end in ends {
        if end < start {
            continue;
        }
        let (hang, _) = para.hanging_space(end);
        let hyphen = if end < len && para.ends_with_soft_hyphen(end) {
            para.hyphen_width(ctx, end)
        } else {
            0.0
        };
        let first_line = if start == 0 { indent } else { 0.0 };
        widest = widest.max(para.width_to(end) - para.width_to(start) - hang + hyphen + first_line);
        start = end;
    }
    widest
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::ComputedStyle;
    use quire_style::keywords::Float;
    use quire_style::values::{LengthPercentage, Size};

    use crate::block::{Slot, layout_block_level};
    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::resume::{FlowOutcome, LayoutResult};
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn paragraph(style: ComputedStyle, text: &str) -> LayoutBox {
        let style = Arc::new(style);
        let mut b = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::clone(&style));
        b.children.push(LayoutBox::new(
            BoxId(2),
            BoxKind::Text(text.into()),
            Arc::new(ComputedStyle::inherit_from(&style)),
        ));
        b
    }

    fn run(b: &LayoutBox, width: f32, bottom: f32, page_is_empty: bool) -> FlowOutcome {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let cb = Containing { width, height: None };
        let input = FlowInput {
            bottom_space: bottom,
            page_is_empty,
            ..FlowInput::unfragmented()
        };
        let mut floats = FloatContext::new();
        layout_block_level(&mut ctx, b, &Slot::new(0.0, 0.0, cb), input, &mut floats)
    }

    fn line_texts(fragment: &LayoutBox) -> Vec<String> {
        fragment.lines().iter().map(|l| l.text()).collect()
    }

    #[test]
    fn test_lines_stack() {
        let b = paragraph(ComputedStyle::initial(), "aa bb cc dd ee");
        let outcome = run(&b, 80.0, f32::INFINITY, true);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(line_texts(&fragment), vec!["aa bb", "cc dd", "ee"]);
        assert_eq!(fragment.height, 48.0);
        let lines = fragment.lines();
        assert_eq!(lines[1].position_y, 16.0);
        assert_eq!(fragment.baseline, Some(12.8));
    }

    #[test]
    fn test_text_indent_shortens_first_line() {
        let mut style = ComputedStyle::initial();
        style.text_indent = LengthPercentage::Length(32.0);
        let b = paragraph(style, "aa bb cc");
        let outcome = run(&b, 96.0, f32::INFINITY, true);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(line_texts(&fragment), vec!["aa", "bb cc"]);
        assert_eq!(fragment.lines()[0].children[0].position_x, 32.0);
    }

    #[test]
    fn test_break_between_lines() {
        let b = paragraph(ComputedStyle::initial(), "aa bb cc dd ee ff gg hh");
        let outcome = run(&b, 80.0, 40.0, false);
        match outcome.result {
            LayoutResult::Partial(fragment, resume) => {
                assert_eq!(line_texts(&fragment), vec!["aa bb", "cc dd"]);
                assert_eq!(resume, ResumePoint::Inline { item: 0, offset: 12 });
            }
            other => panic!("expected a partial result, got {other:?}"),
        }
    }

    #[test]
    fn test_widows_pull_a_line_over() {
        let mut style = ComputedStyle::initial();
        style.orphans = 1;
        let b = paragraph(style, "aa bb cc dd ee ff");
        let outcome = run(&b, 80.0, 40.0, false);
        match outcome.result {
            LayoutResult::Partial(fragment, resume) => {
                assert_eq!(line_texts(&fragment), vec!["aa bb"]);
                assert_eq!(resume, ResumePoint::Inline { item: 0, offset: 6 });
            }
            other => panic!("expected a partial result, got {other:?}"),
        }
    }

    #[test]
    fn test_orphans_push_the_paragraph() {
        let b = paragraph(ComputedStyle::initial(), "aa bb cc dd ee ff");
        // Room for one line only on a page that already has content.
        let outcome = run(&b, 80.0, 20.0, false);
        assert!(matches!(outcome.result, LayoutResult::Pushed));
    }

    #[test]
    fn test_resume_continues_the_paragraph() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = paragraph(ComputedStyle::initial(), "aa bb cc dd ee ff");
        let resume = ResumePoint::Inline { item: 0, offset: 12 };
        let input = FlowInput {
            resume: Some(&resume),
            ..FlowInput::unfragmented()
        };
        let cb = Containing {
            width: 80.0,
            height: None,
        };
        let mut floats = FloatContext::new();
        let outcome = layout_block_level(&mut ctx, &b, &Slot::new(0.0, 0.0, cb), input, &mut floats);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(line_texts(&fragment), vec!["ee ff"]);
        assert!(!fragment.is_first_fragment);
    }

    #[test]
    fn test_lines_shorten_beside_float() {
        let mut float_style = ComputedStyle::initial();
        float_style.float = Float::Left;
        float_style.width = Size::Length(32.0);
        float_style.height = Size::Length(20.0);
        float_style.display = Display::block();
        let float = LayoutBox::new(BoxId(3), BoxKind::Block, Arc::new(float_style));
        let mut b = paragraph(ComputedStyle::initial(), "aa bb cc");
        b.children.insert(0, float);
        let outcome = run(&b, 80.0, f32::INFINITY, true);
        let fragment = outcome.result.fragment().cloned().unwrap();
        // Three characters fit beside the float for the first two lines.
        assert_eq!(line_texts(&fragment), vec!["aa", "bb", "cc"]);
        let lines = fragment.lines();
        assert_eq!(lines[0].position_x, 32.0);
        assert_eq!(lines[2].position_x, 0.0);
    }

    #[test]
    fn test_content_widths_with_indent() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.text_indent = LengthPercentage::Length(10.0);
        let b = paragraph(style, "abc de");
        assert_eq!(content_widths(&mut ctx, &b), (58.0, 106.0));
    }
}
