//! Text measurement and hyphenation services.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! Layout never looks at glyphs. It asks a [`TextShaper`] for cluster
//! advances, break opportunities and vertical metrics, and a [`Hyphenator`]
//! for hyphenation points.

use unicode_linebreak::{BreakOpportunity, linebreaks};

use quire_style::ComputedStyle;

use crate::options::LayoutOptions;

/// Soft hyphen, U+00AD.
pub const SOFT_HYPHEN: char = '\u{ad}';

/// One cluster of shaped text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// Byte offset of the cluster's first character.
    pub offset: usize,
    /// Advance, spacing included.
    pub advance: f32,
}

/// A place where a line may end.
///
/// [UAX #14](https://www.unicode.org/reports/tr14/)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakPoint {
    /// Byte offset the next line would start at.
    pub offset: usize,
    /// The line must end here.
    pub mandatory: bool,
}

/// Shaped text: advances for substring arithmetic plus vertical metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedText {
    /// Clusters in logical order.
    pub clusters: Vec<Cluster>,
    /// Break opportunities inside the text.
    pub breaks: Vec<BreakPoint>,
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Height of lowercase letters, for `vertical-align: middle`.
    pub x_height: f32,
    prefix: Vec<f32>,
    len: usize,
}

impl ShapedText {
    /// Assemble shaped text; `len` is the byte length of the source.
    #[must_use]
    pub fn new(
        clusters: Vec<Cluster>,
        breaks: Vec<BreakPoint>,
        metrics: (f32, f32, f32),
        len: usize,
    ) -> Self {
        let mut prefix = Vec::with_capacity(clusters.len() + 1);
        let mut sum = 0.0;
        prefix.push(sum);
        for cluster in &clusters {
            sum += cluster.advance;
            prefix.push(sum);
        }
        Self {
            clusters,
            breaks,
            ascent: metrics.0,
            descent: metrics.1,
            x_height: metrics.2,
            prefix,
            len,
        }
    }

    /// Total advance.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Advance of the bytes `start..end`, both on cluster boundaries.
    #[must_use]
    pub fn width_between(&self, start: usize, end: usize) -> f32 {
        if end <= start {
            return 0.0;
        }
        self.prefix[self.cluster_index(end)] - self.prefix[self.cluster_index(start)]
    }

    /// Index of the first cluster starting at or after `offset`.
    #[must_use]
    pub fn cluster_index(&self, offset: usize) -> usize {
        if offset >= self.len {
            return self.clusters.len();
        }
        self.clusters.partition_point(|c| c.offset < offset)
    }

    /// Byte offsets of every cluster boundary after `start` up to `end`.
    pub fn boundaries(&self, start: usize, end: usize) -> impl Iterator<Item = usize> + '_ {
        self.clusters
            .iter()
            .map(|c| c.offset)
            .chain(std::iter::once(self.len))
            .filter(move |&o| o > start && o <= end)
    }
}

/// Ascent and descent of a box's first available font, plus its used
/// line height.
///
/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strut {
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Used `line-height`.
    pub line_height: f32,
    /// Height of lowercase letters.
    pub x_height: f32,
}

impl Strut {
    /// "Calculate L, the leading, as L = 'line-height' - AD ... Half the
    /// leading is added above A and the other half below D". Returns the
    /// distances above and below the baseline.
    #[must_use]
    pub fn half_leading_extents(&self) -> (f32, f32) {
        let leading = self.line_height - (self.ascent + self.descent);
        let above = self.ascent + leading / 2.0;
        (above, self.line_height - above)
    }
}

/// Measures text for layout.
pub trait TextShaper {
    /// Shape `text` in `style`. Advances include `letter-spacing` and
    /// `word-spacing`.
    fn shape(&self, text: &str, style: &ComputedStyle) -> ShapedText;

    /// Metrics of the first available font of `style`.
    fn strut(&self, style: &ComputedStyle) -> Strut;

    /// Break opportunities of a whole paragraph.
    fn line_breaks(&self, text: &str) -> Vec<BreakPoint> {
        uax14_breaks(text)
    }
}

/// [UAX #14 Unicode Line Breaking Algorithm](https://www.unicode.org/reports/tr14/)
///
/// Break opportunities from `unicode-linebreak`. The end-of-text break is
/// only kept when the text ends in a hard line break.
#[must_use]
pub fn uax14_breaks(text: &str) -> Vec<BreakPoint> {
    let ends_with_newline = text.ends_with(['\n', '\r', '\u{2028}', '\u{2029}']);
    linebreaks(text)
        .filter(|&(offset, _)| offset < text.len() || ends_with_newline)
        .map(|(offset, op)| BreakPoint {
            offset,
            mandatory: op == BreakOpportunity::Mandatory,
        })
        .collect()
}

/// A font where every character has the same advance.
///
/// Advances are `char_width_ratio` em, ascent and descent come from the
/// options, `line-height: normal` is ascent plus descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceShaper {
    char_width_ratio: f32,
    ascent_ratio: f32,
    descent_ratio: f32,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MonospaceShaper {
    /// A square font: 1em advances, 0.8em ascent, 0.2em descent.
    #[must_use]
    pub const fn new(char_width_ratio: f32) -> Self {
        Self {
            char_width_ratio,
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }

    /// The font described by `options`.
    #[must_use]
    pub const fn from_options(options: &LayoutOptions) -> Self {
        Self {
            char_width_ratio: options.char_width_ratio,
            ascent_ratio: options.ascent_ratio,
            descent_ratio: options.descent_ratio,
        }
    }

    fn char_advance(&self, c: char, font_size: f32) -> f32 {
        match c {
            '\n' | '\r' | SOFT_HYPHEN | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' => 0.0,
            '\u{300}'..='\u{36f}' => 0.0,
            '\t' => 8.0 * self.char_width_ratio * font_size,
            _ => self.char_width_ratio * font_size,
        }
    }
}

impl TextShaper for MonospaceShaper {
    fn shape(&self, text: &str, style: &ComputedStyle) -> ShapedText {
        let font_size = style.font_size;
        let clusters = text
            .char_indices()
            .map(|(offset, c)| {
                let mut advance = self.char_advance(c, font_size);
                // [§ 8.2 Tracking: the letter-spacing property](https://www.w3.org/TR/css-text-3/#letter-spacing-property)
                // "Letter-spacing must not be applied at the beginning or at
                // the end of a line": the trailing space is removed when the
                // line is finished.
                if advance > 0.0 {
                    advance += style.letter_spacing;
                }
                // [§ 8.1 Word Spacing](https://www.w3.org/TR/css-text-3/#word-spacing-property)
                if matches!(c, ' ' | '\u{a0}') {
                    advance += style.word_spacing;
                }
                Cluster { offset, advance }
            })
            .collect();
        let strut = self.strut(style);
        ShapedText::new(
            clusters,
            self.line_breaks(text),
            (strut.ascent, strut.descent, strut.x_height),
            text.len(),
        )
    }

    fn strut(&self, style: &ComputedStyle) -> Strut {
        let font_size = style.font_size;
        Strut {
            ascent: self.ascent_ratio * font_size,
            descent: self.descent_ratio * font_size,
            line_height: style
                .line_height
                .resolve(font_size, self.ascent_ratio + self.descent_ratio),
            x_height: 0.5 * font_size,
        }
    }
}

/// Finds hyphenation points in words.
///
/// [§ 5.4 Hyphenation](https://www.w3.org/TR/css-text-3/#hyphenation)
pub trait Hyphenator {
    /// Byte offsets inside `word` where it may be hyphenated.
    fn hyphenate(&self, word: &str, lang: Option<&str>) -> Vec<usize>;
}

/// Never hyphenates automatically.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHyphenation;

impl Hyphenator for NoHyphenation {
    fn hyphenate(&self, _word: &str, _lang: Option<&str>) -> Vec<usize> {
        Vec::new()
    }
}

/// Hyphenates only where the text carries soft hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftHyphenOnly;

impl Hyphenator for SoftHyphenOnly {
    fn hyphenate(&self, word: &str, _lang: Option<&str>) -> Vec<usize> {
        soft_hyphen_points(word)
    }
}

/// Offsets just after each soft hyphen of `word`.
#[must_use]
pub fn soft_hyphen_points(word: &str) -> Vec<usize> {
    word.char_indices()
        .filter(|&(_, c)| c == SOFT_HYPHEN)
        .map(|(i, c)| i + c.len_utf8())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(font_size: f32) -> ComputedStyle {
        let mut style = ComputedStyle::initial();
        style.font_size = font_size;
        style
    }

    #[test]
    fn test_monospace_advances() {
        let shaped = MonospaceShaper::default().shape("ab cd", &style(10.0));
        assert_eq!(shaped.width(), 50.0);
        assert_eq!(shaped.width_between(0, 2), 20.0);
        assert_eq!(shaped.width_between(3, 5), 20.0);
        assert_eq!(shaped.ascent, 8.0);
    }

    #[test]
    fn test_spacing_is_part_of_the_advance() {
        let mut s = style(10.0);
        s.letter_spacing = 1.0;
        s.word_spacing = 4.0;
        let shaped = MonospaceShaper::default().shape("a b", &s);
        assert_eq!(shaped.width(), 11.0 * 3.0 + 4.0);
    }

    #[test]
    fn test_breaks_exclude_end_of_text() {
        let breaks = uax14_breaks("ab cd");
        assert_eq!(breaks, vec![BreakPoint { offset: 3, mandatory: false }]);
        let breaks = uax14_breaks("ab\n");
        assert_eq!(breaks, vec![BreakPoint { offset: 3, mandatory: true }]);
    }

    #[test]
    fn test_strut_half_leading() {
        let mut s = style(10.0);
        s.line_height = quire_style::values::LineHeight::Length(20.0);
        let strut = MonospaceShaper::default().strut(&s);
        assert_eq!(strut.half_leading_extents(), (13.0, 7.0));
    }

    #[test]
    fn test_soft_hyphen_points() {
        assert_eq!(SoftHyphenOnly.hyphenate("hy\u{ad}phen", None), vec![4]);
        assert!(NoHyphenation.hyphenate("hyphen", None).is_empty());
    }
}
