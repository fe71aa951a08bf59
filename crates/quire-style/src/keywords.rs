//! Keyword-valued properties.
//!
//! Each enum parses from its CSS keyword with [`std::str::FromStr`] and
//! prints back with [`std::fmt::Display`], both derived with `strum`.

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow, then shifted by the offsets.
    Relative,
    /// Out of flow, placed against the nearest positioned ancestor.
    Absolute,
    /// Out of flow, placed against the page.
    Fixed,
    /// Laid out as `relative`.
    Sticky,
}

impl Position {
    /// `absolute` or `fixed`.
    #[must_use]
    pub const fn is_absolutely_positioned(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// Anything but `static`: establishes a containing block for absolutely
    /// positioned descendants.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position),
/// extended with `footnote` from
/// [GCPM § 2](https://www.w3.org/TR/css-gcpm-3/#footnotes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    /// In flow.
    #[default]
    None,
    /// Floats to the left edge.
    Left,
    /// Floats to the right edge.
    Right,
    /// Moved to the page footnote area.
    Footnote,
}

/// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Clear {
    /// No clearance.
    #[default]
    None,
    /// Below left floats.
    Left,
    /// Below right floats.
    Right,
    /// Below all floats.
    Both,
}

/// [§ 4.4 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    /// `width`/`height` size the content box.
    #[default]
    ContentBox,
    /// `width`/`height` size the border box.
    BorderBox,
}

/// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// Content may overflow.
    #[default]
    Visible,
    /// Clipped.
    Hidden,
    /// Clipped, no scroll container.
    Clip,
    /// Scrollable.
    Scroll,
    /// Scrollable when needed.
    Auto,
}

/// [§ 2.1 'direction'](https://www.w3.org/TR/css-writing-modes-4/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse spaces and newlines, wrap.
    #[default]
    Normal,
    /// Preserve everything, no wrapping.
    Pre,
    /// Collapse, no wrapping.
    Nowrap,
    /// Preserve, wrap.
    PreWrap,
    /// Collapse spaces, preserve newlines, wrap.
    PreLine,
    /// Preserve, wrap, preserved spaces take room at line ends.
    BreakSpaces,
}

impl WhiteSpace {
    /// Spaces and tabs collapse.
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Segment breaks are kept as forced line breaks.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine | Self::BreakSpaces)
    }

    /// Lines may wrap at soft break opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        !matches!(self, Self::Pre | Self::Nowrap)
    }
}

/// [§ 7.1 'text-align'](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    /// Start edge of the line.
    #[default]
    Start,
    /// End edge of the line.
    End,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Centered.
    Center,
    /// Justified, last line aligned per `text-align-last`.
    Justify,
    /// Justified, last line included.
    JustifyAll,
}

/// [§ 7.2 'text-align-last'](https://www.w3.org/TR/css-text-3/#text-align-last-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignLast {
    /// Follow `text-align`, `start` for justified text.
    #[default]
    Auto,
    /// Start edge.
    Start,
    /// End edge.
    End,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Centered.
    Center,
    /// Justified.
    Justify,
}

/// [§ 7.4 'text-justify'](https://www.w3.org/TR/css-text-3/#text-justify-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextJustify {
    /// Inter-word for this engine.
    #[default]
    Auto,
    /// No justification.
    None,
    /// Stretch word separators.
    InterWord,
    /// Stretch between typographic letter units.
    #[strum(serialize = "inter-character", serialize = "distribute")]
    InterCharacter,
}

/// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TextTransform {
    /// Unchanged.
    #[default]
    None,
    /// All upper case.
    Uppercase,
    /// All lower case.
    Lowercase,
    /// First letter of each word upper case.
    Capitalize,
}

/// [§ 5.5 'overflow-wrap'](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowWrap {
    /// Break only at allowed break points.
    #[default]
    Normal,
    /// Break inside words when nothing else fits; not counted for min-content.
    BreakWord,
    /// Break inside words when nothing else fits; counted for min-content.
    Anywhere,
}

/// [§ 5.2 'word-break'](https://www.w3.org/TR/css-text-3/#word-break-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum WordBreak {
    /// Customary rules.
    #[default]
    Normal,
    /// Break between any two letters.
    BreakAll,
    /// No breaks inside words.
    KeepAll,
    /// Legacy alias of `overflow-wrap: anywhere` with `normal`.
    BreakWord,
}

/// [§ 6.1 'hyphens'](https://www.w3.org/TR/css-text-3/#hyphens-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Hyphens {
    /// Never hyphenate, soft hyphens ignored.
    None,
    /// Hyphenate at soft hyphens only.
    #[default]
    Manual,
    /// Hyphenate with the hyphenation service.
    Auto,
}

/// [§ 3.2 'list-style-position'](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ListStylePosition {
    /// Marker is an inline box at the start of the first line.
    Inside,
    /// Marker sits outside the principal box.
    #[default]
    Outside,
}

/// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    /// Main axis is the inline axis.
    #[default]
    Row,
    /// Inline axis, reversed.
    RowReverse,
    /// Main axis is the block axis.
    Column,
    /// Block axis, reversed.
    ColumnReverse,
}

impl FlexDirection {
    /// Main axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Items run against the axis direction.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FlexWrap {
    /// Single line.
    #[default]
    Nowrap,
    /// Multi-line.
    Wrap,
    /// Multi-line, cross-start and cross-end swapped.
    WrapReverse,
}

/// Distribution of free space: `justify-content` and `align-content`.
///
/// [§ 5.3 Distributed Alignment](https://www.w3.org/TR/css-align-3/#distribution-values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ContentDistribution {
    /// `normal`, which behaves as `stretch` or `start` depending on context.
    #[default]
    Normal,
    /// Start edge.
    Start,
    /// End edge.
    End,
    /// Flex start edge.
    FlexStart,
    /// Flex end edge.
    FlexEnd,
    /// Centered.
    Center,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Space between items only.
    SpaceBetween,
    /// Half spaces at the edges.
    SpaceAround,
    /// Equal spaces everywhere.
    SpaceEvenly,
    /// Tracks/lines grow.
    Stretch,
}

/// Self/item alignment: `align-items`, `align-self`, `justify-items`,
/// `justify-self`.
///
/// [§ 4 Self-Alignment](https://www.w3.org/TR/css-align-3/#self-alignment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    /// Defer to the parent's `*-items` (only meaningful for `*-self`).
    Auto,
    /// `normal`
    #[default]
    Normal,
    /// Fill the area.
    Stretch,
    /// Start edge.
    Start,
    /// End edge.
    End,
    /// Flex start edge.
    FlexStart,
    /// Flex end edge.
    FlexEnd,
    /// The item's own start edge.
    SelfStart,
    /// The item's own end edge.
    SelfEnd,
    /// Centered.
    Center,
    /// First baselines aligned.
    Baseline,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

/// [§ 17.5.2 'table-layout'](https://www.w3.org/TR/CSS2/tables.html#width-layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum TableLayout {
    /// Content-based column widths.
    #[default]
    Auto,
    /// First-row column widths.
    Fixed,
}

/// [§ 17.6 'border-collapse'](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BorderCollapse {
    /// Each cell has its own borders, separated by `border-spacing`.
    #[default]
    Separate,
    /// Adjacent borders merge into one.
    Collapse,
}

/// [§ 17.4.1 'caption-side'](https://www.w3.org/TR/CSS2/tables.html#caption-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionSide {
    /// Above the table.
    #[default]
    Top,
    /// Below the table.
    Bottom,
}

/// [§ 7.1 'column-fill'](https://www.w3.org/TR/css-multicol-1/#cf)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnFill {
    /// Balance the last fragment.
    #[default]
    Balance,
    /// Fill columns sequentially.
    Auto,
    /// Balance every fragment.
    BalanceAll,
}

/// [§ 6.1 'column-span'](https://www.w3.org/TR/css-multicol-1/#column-span)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnSpan {
    /// Inside one column.
    #[default]
    None,
    /// Spans every column.
    All,
}

/// [§ 3.1 'break-before'/'break-after'](https://www.w3.org/TR/css-break-3/#break-between)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BreakBetween {
    /// Neither forced nor avoided.
    #[default]
    Auto,
    /// Avoid any break.
    Avoid,
    /// Avoid a page break.
    AvoidPage,
    /// Avoid a column break.
    AvoidColumn,
    /// Force a page break.
    Page,
    /// Force a column break.
    Column,
    /// Force one or two page breaks so the next page is a left page.
    Left,
    /// Force one or two page breaks so the next page is a right page.
    Right,
    /// Like `right` in left-to-right progression.
    Recto,
    /// Like `left` in left-to-right progression.
    Verso,
    /// Force a break in the innermost fragmentation context.
    Always,
}

impl BreakBetween {
    /// Forces a page break.
    #[must_use]
    pub const fn forces_page(self) -> bool {
        matches!(
            self,
            Self::Page | Self::Left | Self::Right | Self::Recto | Self::Verso | Self::Always
        )
    }

    /// Forces a break in a column context.
    #[must_use]
    pub const fn forces_column(self) -> bool {
        matches!(self, Self::Column | Self::Always) || self.forces_page()
    }

    /// Asks to avoid a page break.
    #[must_use]
    pub const fn avoids_page(self) -> bool {
        matches!(self, Self::Avoid | Self::AvoidPage)
    }

    /// Asks to avoid a column break.
    #[must_use]
    pub const fn avoids_column(self) -> bool {
        matches!(self, Self::Avoid | Self::AvoidColumn)
    }

    /// [§ 3.1 Forced breaks](https://www.w3.org/TR/css-break-3/#forced-breaks)
    ///
    /// Combine the values that apply at one break point: a forced value wins
    /// over an avoid value, which wins over `auto`; among forced page values
    /// the later one (the `break-before` of the next box) wins.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        if other.strength() >= self.strength() { other } else { self }
    }

    const fn strength(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Avoid | Self::AvoidPage | Self::AvoidColumn => 1,
            Self::Column => 2,
            _ => 3,
        }
    }
}

/// [§ 3.2 'break-inside'](https://www.w3.org/TR/css-break-3/#break-within)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BreakInside {
    /// May break inside.
    #[default]
    Auto,
    /// Avoid any break inside.
    Avoid,
    /// Avoid page breaks inside.
    AvoidPage,
    /// Avoid column breaks inside.
    AvoidColumn,
}

impl BreakInside {
    /// Asks to avoid a page break inside the box.
    #[must_use]
    pub const fn avoids_page(self) -> bool {
        matches!(self, Self::Avoid | Self::AvoidPage)
    }

    /// Asks to avoid a column break inside the box.
    #[must_use]
    pub const fn avoids_column(self) -> bool {
        matches!(self, Self::Avoid | Self::AvoidColumn)
    }
}

/// [§ 3 'box-decoration-break'](https://www.w3.org/TR/css-break-3/#break-decoration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BoxDecorationBreak {
    /// Borders and padding are not repeated at the split.
    #[default]
    Slice,
    /// Each fragment gets its own borders and padding.
    Clone,
}

/// [GCPM § 2.5 'footnote-display'](https://www.w3.org/TR/css-gcpm-3/#footnote-display)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FootnoteDisplay {
    /// Footnote body is a block.
    #[default]
    Block,
    /// Footnote body is inline.
    Inline,
    /// Inline when it fits on one line, block otherwise.
    Compact,
}

/// [GCPM § 2.6 'footnote-policy'](https://www.w3.org/TR/css-gcpm-3/#footnote-policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FootnotePolicy {
    /// Defer the footnote body to the next page when it does not fit.
    #[default]
    Auto,
    /// Move the line holding the call with the footnote.
    Line,
    /// Move the block holding the call with the footnote.
    Block,
}

/// [§ 4.1 'border-style'](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    /// No border; width computes to zero.
    #[default]
    None,
    /// No border, and wins every collapsed-border conflict.
    Hidden,
    /// Dots.
    Dotted,
    /// Dashes.
    Dashed,
    /// A single line.
    Solid,
    /// Two lines.
    Double,
    /// Carved.
    Groove,
    /// Raised.
    Ridge,
    /// Sunk box.
    Inset,
    /// Raised box.
    Outset,
}

impl BorderStyle {
    /// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
    ///
    /// "If border styles differ only in color, ... In order of preference:
    /// 'double', 'solid', 'dashed', 'dotted', 'ridge', 'outset', 'groove',
    /// and the lowest: 'inset'."
    #[must_use]
    pub const fn collapse_rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Inset => 1,
            Self::Groove => 2,
            Self::Outset => 3,
            Self::Ridge => 4,
            Self::Dotted => 5,
            Self::Dashed => 6,
            Self::Solid => 7,
            Self::Double => 8,
            Self::Hidden => 9,
        }
    }

    /// Styles that draw nothing.
    #[must_use]
    pub const fn is_invisible(self) -> bool {
        matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 3.3 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic face.
    Italic,
    /// Slanted face.
    Oblique,
}

/// [§ 11.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Painted.
    #[default]
    Visible,
    /// Takes room, not painted.
    Hidden,
    /// Like hidden; collapses table rows.
    Collapse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip_through_strum() {
        assert_eq!("pre-wrap".parse::<WhiteSpace>(), Ok(WhiteSpace::PreWrap));
        assert_eq!("JUSTIFY-ALL".parse::<TextAlign>(), Ok(TextAlign::JustifyAll));
        assert_eq!(BreakBetween::AvoidPage.to_string(), "avoid-page");
        assert_eq!("distribute".parse::<TextJustify>(), Ok(TextJustify::InterCharacter));
        assert!("sideways".parse::<Position>().is_err());
    }

    #[test]
    fn test_break_combination() {
        use BreakBetween::{Auto, Avoid, Left, Page};
        assert_eq!(Auto.combine(Avoid), Avoid);
        assert_eq!(Page.combine(Avoid), Page);
        assert_eq!(Page.combine(Left), Left);
        assert_eq!(Avoid.combine(Auto), Avoid);
    }

    #[test]
    fn test_collapse_rank_order() {
        assert!(BorderStyle::Hidden.collapse_rank() > BorderStyle::Double.collapse_rank());
        assert!(BorderStyle::Solid.collapse_rank() > BorderStyle::Dashed.collapse_rank());
        assert!(BorderStyle::Inset.collapse_rank() > BorderStyle::None.collapse_rank());
    }
}
