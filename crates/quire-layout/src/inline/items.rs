//! Flattening an inline formatting context into a paragraph.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! The inline-level descendants of a block container are laid out as one
//! run of text. Each [`Item`] covers a byte range of [`Paragraph::text`]:
//! text covers its characters, atomic inlines and leaders cover one
//! U+FFFC, inline box boundaries, floats and out-of-flow boxes cover
//! nothing.

use quire_style::keywords::{Hyphens, OverflowWrap, WhiteSpace, WordBreak};

use crate::block::{Containing, layout_atomic, padding_edges};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::EdgeSizes;
use crate::page;
use crate::preferred;
use crate::text::{BreakPoint, SOFT_HYPHEN, ShapedText};

/// Stands in for atomic inlines and leaders in the paragraph text.
pub const OBJECT_REPLACEMENT: char = '\u{fffc}';

/// What a paragraph is flattened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Line layout: atomic inlines are laid out.
    Layout,
    /// Min-content width: every soft wrap opportunity is taken.
    MinContent,
    /// Max-content width: only forced breaks are taken.
    MaxContent,
}

/// The flavor of an [`Item`].
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// A text run.
    Text(ShapedText),
    /// Start of an inline box, with its start-side margin, border and padding.
    Open(f32),
    /// End of an inline box, with its end-side margin, border and padding.
    Close(f32),
    /// An atomic inline, laid out at the origin.
    Atomic(LayoutBox),
    /// A forced line break (`<br>`).
    Break,
    /// A float anchored at this position.
    Float,
    /// An absolutely positioned box anchored at this position.
    Absolute,
    /// A `leader()`, expanding to fill the line.
    Leader(ShapedText),
    /// An outside list marker.
    Marker,
}

/// One piece of a paragraph.
#[derive(Debug, Clone)]
pub struct Item<'a> {
    /// What it is.
    pub kind: ItemKind,
    /// The box it comes from.
    pub source: &'a LayoutBox,
    /// First byte in the paragraph text.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
    /// Text of a text run; empty otherwise.
    pub text: String,
}

impl Item<'_> {
    /// Advance of the whole item.
    #[must_use]
    pub fn width(&self) -> f32 {
        match &self.kind {
            ItemKind::Text(shaped) => shaped.width(),
            ItemKind::Open(edge) | ItemKind::Close(edge) => *edge,
            ItemKind::Atomic(fragment) => fragment.margin_width(),
            ItemKind::Break
            | ItemKind::Float
            | ItemKind::Absolute
            | ItemKind::Leader(_)
            | ItemKind::Marker => 0.0,
        }
    }

    /// Advance of the bytes `start..end` of the paragraph, clipped to this
    /// item.
    #[must_use]
    pub fn width_between(&self, start: usize, end: usize) -> f32 {
        match &self.kind {
            ItemKind::Text(shaped) => {
                let from = start.clamp(self.start, self.end) - self.start;
                let to = end.clamp(self.start, self.end) - self.start;
                shaped.width_between(from, to)
            }
            _ if start <= self.start && end >= self.end => self.width(),
            _ => 0.0,
        }
    }

    /// Covers no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    const fn is_close(&self) -> bool {
        matches!(self.kind, ItemKind::Close(_))
    }
}

/// The inline content of one block container, as one run of text.
#[derive(Debug, Clone)]
pub struct Paragraph<'a> {
    /// Items in document order.
    pub items: Vec<Item<'a>>,
    /// The concatenated text.
    pub text: String,
    /// Break opportunities allowed by `white-space`, `word-break` and
    /// `hyphens`, sorted by offset.
    pub breaks: Vec<BreakPoint>,
}

/// Flatten the inline children of `parent`.
pub fn flatten<'a>(
    ctx: &mut LayoutContext<'_>,
    parent: &'a LayoutBox,
    cb: Containing,
    measure: Measure,
) -> Paragraph<'a> {
    let mut paragraph = Paragraph {
        items: Vec::new(),
        text: String::new(),
        breaks: Vec::new(),
    };
    if parent.kind == BoxKind::Inline {
        flatten_inline(ctx, parent, cb, measure, &mut paragraph);
    } else {
        flatten_children(ctx, &parent.children, cb, measure, &mut paragraph);
    }
    paragraph.breaks = paragraph.break_opportunities(ctx, measure);
    paragraph
}

fn flatten_children<'a>(
    ctx: &mut LayoutContext<'_>,
    children: &'a [LayoutBox],
    cb: Containing,
    measure: Measure,
    p: &mut Paragraph<'a>,
) {
    for child in children {
        match &child.kind {
            BoxKind::Text(text) => {
                let shaped = ctx.shaper.shape(text, &child.style);
                p.push(ItemKind::Text(shaped), child, text);
            }
            BoxKind::PageText(parts) => {
                let text = page::resolve_parts(ctx, parts);
                let shaped = ctx.shaper.shape(&text, &child.style);
                p.push(ItemKind::Text(shaped), child, &text);
            }
            BoxKind::LineBreak => p.push(ItemKind::Break, child, "\n"),
            BoxKind::Leader(pattern) => {
                let shaped = ctx.shaper.shape(pattern, &child.style);
                p.push(ItemKind::Leader(shaped), child, &OBJECT_REPLACEMENT.to_string());
            }
            _ if child.is_floated() => p.push(ItemKind::Float, child, ""),
            _ if child.is_absolutely_positioned() => p.push(ItemKind::Absolute, child, ""),
            BoxKind::Inline if child.outside_marker => {
                if measure == Measure::Layout {
                    p.push(ItemKind::Marker, child, "");
                }
            }
            BoxKind::Inline => flatten_inline(ctx, child, cb, measure, p),
            _ => {
                let fragment = match measure {
                    Measure::Layout => layout_atomic(ctx, child, cb),
                    Measure::MinContent | Measure::MaxContent => {
                        let (min, max) = preferred::outer_widths(ctx, child);
                        let mut shell = child.shell();
                        shell.width = if measure == Measure::MinContent { min } else { max };
                        shell
                    }
                };
                p.push(ItemKind::Atomic(fragment), child, &OBJECT_REPLACEMENT.to_string());
            }
        }
    }
}

fn flatten_inline<'a>(
    ctx: &mut LayoutContext<'_>,
    inline: &'a LayoutBox,
    cb: Containing,
    measure: Measure,
    p: &mut Paragraph<'a>,
) {
    let edges = inline_edges(inline, cb.width);
    p.push(ItemKind::Open(edges.left), inline, "");
    flatten_children(ctx, &inline.children, cb, measure, p);
    p.push(ItemKind::Close(edges.right), inline, "");
}

/// Horizontal margin, border and padding of an inline box on each side.
///
/// [§ 10.3.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-width)
/// "A computed value of 'auto' for 'margin-left' or 'margin-right' becomes
/// a used value of '0'."
#[must_use]
pub fn inline_edges(b: &LayoutBox, cb_width: f32) -> EdgeSizes {
    let style = &b.style;
    let border = style.border_widths();
    let padding = padding_edges(style, cb_width);
    EdgeSizes {
        top: 0.0,
        bottom: 0.0,
        left: style.margin.left.resolve_or_zero(cb_width) + border.left + padding.left,
        right: style.margin.right.resolve_or_zero(cb_width) + border.right + padding.right,
    }
}

impl<'a> Paragraph<'a> {
    fn push(&mut self, kind: ItemKind, source: &'a LayoutBox, text: &str) {
        let start = self.text.len();
        self.text.push_str(text);
        let text = if matches!(kind, ItemKind::Text(_)) {
            text.to_owned()
        } else {
            String::new()
        };
        self.items.push(Item {
            kind,
            source,
            start,
            end: self.text.len(),
            text,
        });
    }

    /// The item covering the byte at `offset`.
    #[must_use]
    pub fn item_at(&self, offset: usize) -> Option<&Item<'a>> {
        self.items
            .iter()
            .find(|item| !item.is_empty() && item.start <= offset && offset < item.end)
    }

    /// [§ 5 Line Breaking](https://www.w3.org/TR/css-text-3/#line-breaking)
    fn break_opportunities(&self, ctx: &LayoutContext<'_>, measure: Measure) -> Vec<BreakPoint> {
        // STEP 1: UAX #14 opportunities, kept where both sides may wrap.
        //
        // "If 'white-space' is set to 'pre' or 'nowrap', lines are only
        // broken at forced line breaks."
        let mut breaks: Vec<BreakPoint> = ctx
            .shaper
            .line_breaks(&self.text)
            .into_iter()
            .filter(|bp| bp.mandatory || self.may_wrap_at(bp.offset))
            .collect();

        // STEP 2: Breaks between any two clusters.
        //
        // [§ 5.2 'word-break'](https://www.w3.org/TR/css-text-3/#word-break-property)
        // "break-all: Breaking is allowed within 'words'."
        // [§ 5.5 'overflow-wrap'](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
        // "Soft wrap opportunities introduced by anywhere are considered
        // when calculating min-content intrinsic sizes."
        for item in &self.items {
            let ItemKind::Text(shaped) = &item.kind else {
                continue;
            };
            let style = &item.source.style;
            let anywhere = style.word_break == WordBreak::BreakAll
                || (measure == Measure::MinContent
                    && (style.overflow_wrap == OverflowWrap::Anywhere
                        || style.word_break == WordBreak::BreakWord));
            if !anywhere || !style.white_space.wraps() {
                continue;
            }
            breaks.extend(
                shaped
                    .boundaries(0, item.end - item.start)
                    .map(|o| item.start + o)
                    .filter(|&o| o < item.end)
                    .map(|offset| BreakPoint {
                        offset,
                        mandatory: false,
                    }),
            );
        }
        breaks.sort_by_key(|bp| (bp.offset, !bp.mandatory));
        breaks.dedup_by_key(|bp| bp.offset);

        // STEP 3: Soft hyphens only break under `hyphens: manual | auto`.
        //
        // [§ 5.4 'hyphens'](https://www.w3.org/TR/css-text-3/#hyphens-property)
        // "none: Words are not hyphenated, even if characters inside the
        // word explicitly define hyphenation opportunities."
        breaks.retain(|bp| {
            bp.mandatory
                || !self.text[..bp.offset].ends_with(SOFT_HYPHEN)
                || self
                    .item_at(bp.offset - SOFT_HYPHEN.len_utf8())
                    .is_some_and(|item| item.source.style.hyphens != Hyphens::None)
        });
        breaks
    }

    fn may_wrap_at(&self, offset: usize) -> bool {
        let wraps = |item: Option<&Item<'_>>| item.is_none_or(|i| i.source.style.white_space.wraps());
        offset > 0 && wraps(self.item_at(offset - 1)) && wraps(self.item_at(offset))
    }

    /// Advance from the start of the paragraph to `pos`.
    ///
    /// An inline box that ends at `pos` counts; one that starts there does
    /// not.
    #[must_use]
    pub fn width_to(&self, pos: usize) -> f32 {
        let mut width = 0.0;
        for item in &self.items {
            if item.is_empty() {
                if item.start < pos || (item.start == pos && item.is_close()) {
                    width += item.width();
                    continue;
                }
                break;
            }
            if item.end <= pos {
                width += item.width();
                continue;
            }
            if item.start < pos {
                width += item.width_between(item.start, pos);
            }
            break;
        }
        width
    }

    /// [§ 4.1.3 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
    ///
    /// "A sequence of collapsible spaces at the end of a line is removed";
    /// preserved spaces under `pre-wrap` hang. Returns the advance of the
    /// spaces before `end` that do not count for fitting, and where they
    /// start.
    #[must_use]
    pub fn hanging_space(&self, end: usize) -> (f32, usize) {
        let mut width = 0.0;
        let mut at = end;
        for item in self.items.iter().rev() {
            if item.start >= at {
                continue;
            }
            if item.is_empty() {
                continue;
            }
            let ItemKind::Text(shaped) = &item.kind else {
                break;
            };
            let white_space = item.source.style.white_space;
            if !(white_space.collapses_spaces() || white_space == WhiteSpace::PreWrap) {
                break;
            }
            let local_end = at.min(item.end) - item.start;
            let trimmed = item.text[..local_end].trim_end_matches(' ');
            width += shaped.width_between(trimmed.len(), local_end);
            at = item.start + trimmed.len();
            if !trimmed.is_empty() {
                break;
            }
        }
        (width, at)
    }

    /// The paragraph text before `offset` ends in a soft hyphen.
    #[must_use]
    pub fn ends_with_soft_hyphen(&self, offset: usize) -> bool {
        self.text[..offset].ends_with(SOFT_HYPHEN)
    }

    /// Zero-length items belong to the line before them when they close an
    /// inline box, to the line after them otherwise.
    #[must_use]
    pub fn line_includes(&self, item: &Item<'_>, start: usize, end: usize) -> bool {
        if !item.is_empty() {
            return item.start < end && item.end > start;
        }
        let p = item.start;
        (start < p && p < end)
            || (p == start && (!item.is_close() || start == 0))
            || (p == end && (item.is_close() || end == self.text.len()))
    }

    /// Indices of the inline boxes still open where a line starting at
    /// `start` begins.
    #[must_use]
    pub fn open_at(&self, start: usize) -> Vec<usize> {
        let mut stack: Vec<usize> = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let before = if item.is_empty() {
                item.start < start || (item.start == start && start > 0 && item.is_close())
            } else {
                item.start < start
            };
            if !before {
                continue;
            }
            match item.kind {
                ItemKind::Open(_) => stack.push(index),
                ItemKind::Close(_) => {
                    if let Some(pos) = stack
                        .iter()
                        .rposition(|&i| self.items[i].source.id == item.source.id)
                    {
                        stack.truncate(pos);
                    }
                }
                _ => {}
            }
        }
        stack
    }

    /// Index of the item a line starting at `pos` resumes in.
    #[must_use]
    pub fn item_index_at(&self, pos: usize) -> usize {
        self.items
            .iter()
            .position(|item| {
                if item.is_empty() {
                    item.start > pos || (item.start == pos && (pos == 0 || !item.is_close()))
                } else {
                    item.end > pos
                }
            })
            .unwrap_or(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::ComputedStyle;
    use quire_style::values::LengthPercentage;

    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn text(id: usize, text: &str, style: &Arc<ComputedStyle>) -> LayoutBox {
        LayoutBox::new(BoxId(id), BoxKind::Text(text.into()), Arc::clone(style))
    }

    fn block(children: Vec<LayoutBox>) -> LayoutBox {
        let mut b = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(ComputedStyle::initial()));
        b.children = children;
        b
    }

    const CB: Containing = Containing {
        width: 100.0,
        height: None,
    };

    #[test]
    fn test_flatten_offsets() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let style = Arc::new(ComputedStyle::initial());
        let mut span_style = ComputedStyle::initial();
        span_style.padding.left = LengthPercentage::Length(4.0);
        let mut span = LayoutBox::new(BoxId(3), BoxKind::Inline, Arc::new(span_style));
        span.children.push(text(4, "bc", &style));
        let parent = block(vec![text(2, "a ", &style), span]);

        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        assert_eq!(p.text, "a bc");
        assert_eq!(p.items.len(), 4);
        assert_eq!((p.items[1].start, p.items[1].end), (2, 2));
        assert_eq!(p.breaks.iter().map(|b| b.offset).collect::<Vec<_>>(), vec![2]);
        // The span's padding starts after the space.
        assert_eq!(p.width_to(2), 32.0);
        assert_eq!(p.width_to(3), 52.0);
        assert_eq!(p.width_to(4), 68.0);
        assert_eq!(p.hanging_space(2), (16.0, 1));
    }

    #[test]
    fn test_nowrap_suppresses_breaks() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut nowrap = ComputedStyle::initial();
        nowrap.white_space = WhiteSpace::Nowrap;
        let parent = block(vec![text(2, "a b c", &Arc::new(nowrap))]);
        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        assert!(p.breaks.is_empty());
    }

    #[test]
    fn test_break_all_adds_cluster_breaks() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.word_break = WordBreak::BreakAll;
        let parent = block(vec![text(2, "abc", &Arc::new(style))]);
        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        assert_eq!(p.breaks.iter().map(|b| b.offset).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_soft_hyphen_needs_hyphens() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.hyphens = Hyphens::None;
        let parent = block(vec![text(2, "ab\u{ad}cd", &Arc::new(style))]);
        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        assert!(p.breaks.is_empty());

        let parent = block(vec![text(2, "ab\u{ad}cd", &Arc::new(ComputedStyle::initial()))]);
        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        assert_eq!(p.breaks.len(), 1);
        assert!(p.ends_with_soft_hyphen(p.breaks[0].offset));
    }

    #[test]
    fn test_line_membership_of_boundaries() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let style = Arc::new(ComputedStyle::initial());
        let mut span = LayoutBox::new(BoxId(3), BoxKind::Inline, Arc::clone(&style));
        span.children.push(text(4, "bb ", &style));
        let parent = block(vec![span, text(5, "cc", &style)]);
        let p = flatten(&mut ctx, &parent, CB, Measure::Layout);
        // Items: open(0) "bb "(0..3) close(3) "cc"(3..5)
        let close = &p.items[2];
        assert!(p.line_includes(close, 0, 3));
        assert!(!p.line_includes(close, 3, 5));
        assert!(p.open_at(3).is_empty());
        assert_eq!(p.open_at(1), vec![0]);
        assert_eq!(p.item_index_at(3), 3);
    }
}
