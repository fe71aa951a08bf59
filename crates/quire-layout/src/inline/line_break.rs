//! Choosing where lines end.
//!
//! [CSS Text § 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! Lines are filled greedily: the last break opportunity that fits wins.
//! When none fits, a word is hyphenated (`hyphens: auto`), then broken
//! between clusters (`overflow-wrap`), and finally allowed to overflow.

use std::iter::once;

use quire_style::keywords::{Hyphens, OverflowWrap, WordBreak};

use crate::context::LayoutContext;
use crate::options::EPSILON;
use crate::text::{BreakPoint, SOFT_HYPHEN};

use super::items::{ItemKind, Paragraph};

/// One line's worth of the paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpan {
    /// First byte of the line.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
    /// The line ends in a hyphenation point and gets a hyphen.
    pub hyphenated: bool,
    /// The line ends in a forced break or at the end of the paragraph.
    pub forced: bool,
    /// Advance of the content, without hanging spaces, with the hyphen and
    /// the indent.
    pub width: f32,
}

impl Paragraph<'_> {
    /// Advance of `start..end` as a line: trailing collapsible spaces hang
    /// and a hyphen is added after a soft hyphen.
    fn line_width(&self, ctx: &LayoutContext<'_>, start: usize, end: usize, hyphenated: bool) -> f32 {
        let (hang, _) = self.hanging_space(end);
        let hyphen = if hyphenated { self.hyphen_width(ctx, end) } else { 0.0 };
        self.width_to(end) - self.width_to(start) - hang + hyphen
    }

    /// Advance of the hyphen inserted at `offset`.
    ///
    /// [§ 5.4 'hyphenate-character'](https://www.w3.org/TR/css-text-4/#hyphenate-character)
    #[must_use]
    pub fn hyphen_width(&self, ctx: &LayoutContext<'_>, offset: usize) -> f32 {
        self.item_at(offset.saturating_sub(1))
            .map_or(0.0, |item| {
                let style = &item.source.style;
                ctx.shaper.shape(&style.hyphenate_character, style).width()
            })
    }

    fn span(&self, ctx: &LayoutContext<'_>, start: usize, end: usize, forced: bool, indent: f32) -> LineSpan {
        let hyphenated = !forced && self.ends_with_soft_hyphen(end);
        LineSpan {
            start,
            end,
            hyphenated,
            forced,
            width: self.line_width(ctx, start, end, hyphenated) + indent,
        }
    }

    /// The longest line starting at `start` that fits in `available`.
    pub fn next_line(&self, ctx: &LayoutContext<'_>, start: usize, available: f32, indent: f32) -> LineSpan {
        let len = self.text.len();
        if start >= len {
            return self.span(ctx, start, len, true, indent);
        }
        let room = available - indent;
        let end_of_text = BreakPoint {
            offset: len,
            mandatory: true,
        };
        let mut fit: Option<BreakPoint> = None;
        let candidates = self
            .breaks
            .iter()
            .copied()
            .filter(|bp| bp.offset > start)
            .chain(once(end_of_text));
        for bp in candidates {
            let hyphenated = !bp.mandatory && self.ends_with_soft_hyphen(bp.offset);
            if self.line_width(ctx, start, bp.offset, hyphenated) <= room + EPSILON {
                if bp.mandatory {
                    return self.span(ctx, start, bp.offset, true, indent);
                }
                fit = Some(bp);
                continue;
            }

            // STEP 1: Hyphenate the word that overflows.
            let word_start = fit.map_or(start, |f| f.offset);
            if let Some(end) = self.hyphenate(ctx, start, word_start, bp.offset, room) {
                return LineSpan {
                    start,
                    end,
                    hyphenated: true,
                    forced: false,
                    width: self.line_width(ctx, start, end, true) + indent,
                };
            }
            // STEP 2: Otherwise the last opportunity that fit.
            if let Some(f) = fit {
                return self.span(ctx, start, f.offset, false, indent);
            }
            // STEP 3: Break inside the word.
            if let Some(end) = self.emergency_break(start, bp.offset, room) {
                return self.span(ctx, start, end, false, indent);
            }
            // STEP 4: Overflow.
            return self.span(ctx, start, bp.offset, bp.mandatory, indent);
        }
        self.span(ctx, start, len, true, indent)
    }

    /// [§ 5.4 Hyphenation](https://www.w3.org/TR/css-text-3/#hyphenation)
    ///
    /// Split the word `word_start..word_end` at the latest hyphenation point
    /// whose first part still fits.
    fn hyphenate(
        &self,
        ctx: &LayoutContext<'_>,
        line_start: usize,
        word_start: usize,
        word_end: usize,
        room: f32,
    ) -> Option<usize> {
        if !ctx.options.hyphenation {
            return None;
        }
        let item = self.item_at(word_start)?;
        let style = &item.source.style;
        if style.hyphens != Hyphens::Auto || !matches!(item.kind, ItemKind::Text(_)) {
            return None;
        }

        // [CSS Text 4 § 6.4 'hyphenate-limit-zone'](https://www.w3.org/TR/css-text-4/#hyphenate-size-limits)
        // "specifies the maximum amount of unfilled space (before
        // justification) that may be left in the line box before
        // hyphenation is triggered to pull part of a word from the next
        // line back up into the current line."
        if word_start > line_start {
            let unfilled = room - self.line_width(ctx, line_start, word_start, false);
            if unfilled <= style.hyphenate_limit_zone.resolve(room) {
                return None;
            }
        }

        let local_start = word_start - item.start;
        let local_end = word_end.min(item.end) - item.start;
        let word = item.text[local_start..local_end].trim_end();
        let (min_word, min_before, min_after) = style.hyphenate_limit_chars;
        let chars = word.chars().filter(|&c| c != SOFT_HYPHEN).count();
        if chars < min_word as usize {
            return None;
        }
        let mut points = ctx.hyphenator.hyphenate(word, style.lang.as_deref());
        points.sort_unstable();
        points.into_iter().rev().find_map(|point| {
            if point == 0 || point >= word.len() || !word.is_char_boundary(point) {
                return None;
            }
            let before = word[..point].chars().count();
            let after = word[point..].chars().count();
            if before < min_before as usize || after < min_after as usize {
                return None;
            }
            let end = word_start + point;
            (self.line_width(ctx, line_start, end, true) <= room + EPSILON).then_some(end)
        })
    }

    /// [§ 5.5 Overflow Wrapping](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
    ///
    /// "An otherwise unbreakable sequence of characters may be broken at an
    /// arbitrary point if there are no otherwise-acceptable break points in
    /// the line."
    fn emergency_break(&self, start: usize, end: usize, room: f32) -> Option<usize> {
        let mut best = None;
        let mut first = None;
        for item in &self.items {
            if item.end <= start || item.start >= end {
                continue;
            }
            let ItemKind::Text(shaped) = &item.kind else {
                continue;
            };
            let style = &item.source.style;
            let may_split = style.overflow_wrap != OverflowWrap::Normal
                || style.word_break == WordBreak::BreakWord;
            if !may_split || !style.white_space.wraps() {
                continue;
            }
            let from = start.max(item.start) - item.start;
            let to = end.min(item.end) - item.start;
            for offset in shaped.boundaries(from, to).map(|o| item.start + o) {
                if offset >= end {
                    break;
                }
                let _ = first.get_or_insert(offset);
                if self.width_to(offset) - self.width_to(start) <= room + EPSILON {
                    best = Some(offset);
                }
            }
        }
        best.or(first)
    }

    /// Number of lines from `start` at full `width`, up to `cap`.
    pub fn count_lines(&self, ctx: &LayoutContext<'_>, start: usize, width: f32, cap: usize) -> usize {
        let mut pos = start;
        let mut count = 0;
        while pos < self.text.len() && count < cap {
            let span = self.next_line(ctx, pos, width, 0.0);
            count += 1;
            if span.end <= pos {
                break;
            }
            pos = span.end;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::ComputedStyle;

    use crate::block::Containing;
    use crate::boxes::{BoxId, BoxKind, LayoutBox};
    use crate::image::NoImages;
    use crate::inline::items::{Measure, flatten};
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn paragraph_box(text: &str, style: ComputedStyle) -> LayoutBox {
        let style = Arc::new(style);
        let mut b = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::clone(&style));
        b.children
            .push(LayoutBox::new(BoxId(2), BoxKind::Text(text.into()), style));
        b
    }

    const CB: Containing = Containing {
        width: 100.0,
        height: None,
    };

    fn lines(ctx: &mut LayoutContext<'_>, b: &LayoutBox, width: f32) -> Vec<String> {
        let p = flatten(ctx, b, CB, Measure::Layout);
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < p.text.len() {
            let span = p.next_line(ctx, pos, width, 0.0);
            out.push(p.text[span.start..span.end].to_owned());
            pos = span.end;
        }
        out
    }

    #[test]
    fn test_greedy_fill() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = paragraph_box("aa bb cc dd", ComputedStyle::initial());
        // 5 characters per line; the trailing space hangs.
        assert_eq!(lines(&mut ctx, &b, 80.0), vec!["aa bb ", "cc dd"]);
    }

    #[test]
    fn test_long_word_overflows() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = paragraph_box("abcdefgh ij", ComputedStyle::initial());
        assert_eq!(lines(&mut ctx, &b, 48.0), vec!["abcdefgh ", "ij"]);
    }

    #[test]
    fn test_overflow_wrap_splits_words() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.overflow_wrap = OverflowWrap::BreakWord;
        let b = paragraph_box("abcdefgh", style);
        assert_eq!(lines(&mut ctx, &b, 48.0), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_soft_hyphen_break_adds_hyphen() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = paragraph_box("abc\u{ad}def", ComputedStyle::initial());
        let p = flatten(&mut ctx, &b, CB, Measure::Layout);
        let span = p.next_line(&ctx, 0, 64.0, 0.0);
        assert_eq!(span.end, 5);
        assert!(span.hyphenated);
        // "abc" plus the hyphen.
        assert_eq!(span.width, 64.0);
    }

    struct EveryTwo;

    impl crate::text::Hyphenator for EveryTwo {
        fn hyphenate(&self, word: &str, _lang: Option<&str>) -> Vec<usize> {
            (2..word.len()).step_by(2).collect()
        }
    }

    #[test]
    fn test_auto_hyphenation_uses_hyphenator() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &EveryTwo, &NoImages);
        let mut style = ComputedStyle::initial();
        style.hyphens = Hyphens::Auto;
        style.hyphenate_limit_chars = (0, 0, 0);
        let b = paragraph_box("xx abcdef", style);
        let p = flatten(&mut ctx, &b, CB, Measure::Layout);
        // Seven characters of room: "xx ab" plus the hyphen.
        let span = p.next_line(&ctx, 0, 112.0, 0.0);
        assert_eq!(&p.text[span.start..span.end], "xx ab");
        assert!(span.hyphenated);
        assert_eq!(span.width, 96.0);
    }

    #[test]
    fn test_limit_chars_blocks_short_words() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &EveryTwo, &NoImages);
        let mut style = ComputedStyle::initial();
        style.hyphens = Hyphens::Auto;
        let b = paragraph_box("xx abcd", style);
        let p = flatten(&mut ctx, &b, CB, Measure::Layout);
        let span = p.next_line(&ctx, 0, 96.0, 0.0);
        assert_eq!(span.end, 3);
        assert!(!span.hyphenated);
    }

    #[test]
    fn test_forced_break_ends_line() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut style = ComputedStyle::initial();
        style.white_space = quire_style::keywords::WhiteSpace::Pre;
        let b = paragraph_box("a b\ncd", style);
        let p = flatten(&mut ctx, &b, CB, Measure::Layout);
        let span = p.next_line(&ctx, 0, 1000.0, 0.0);
        assert_eq!(span.end, 4);
        assert!(span.forced);
        assert_eq!(p.count_lines(&ctx, 0, 1000.0, 10), 2);
    }
}
