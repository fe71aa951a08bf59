//! The computed style record.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value as
//! defined in the "Computed Value" line of the property definition table,
//! generally absolutizing it in preparation for inheritance."
//!
//! Unlike a cascade-side record, every field here holds a value: declared,
//! inherited or initial. Layout reads these fields directly and never writes
//! back to them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::content::{Content, CounterStyle};
use crate::display::Display;
use crate::grid::{GridAreas, GridAutoFlow, GridLine, TrackList, TrackSize};
use crate::keywords::{
    Alignment, BorderCollapse, BoxDecorationBreak, BoxSizing, BreakBetween, BreakInside,
    CaptionSide, Clear, ColumnFill, ColumnSpan, ContentDistribution, Direction, FlexDirection,
    FlexWrap, Float, FontStyle, FootnoteDisplay, FootnotePolicy, Hyphens, ListStylePosition,
    Overflow, OverflowWrap, Position, TableLayout, TextAlign, TextAlignLast, TextJustify,
    TextTransform, Visibility, WhiteSpace, WordBreak,
};
use crate::page::PageSize;
use crate::values::{
    BorderSide, Color, DEFAULT_FONT_SIZE, LengthPercentage, LengthPercentageAuto, LineHeight,
    Sides, Size, VerticalAlign,
};

/// Computed values for one element, pseudo-element, anonymous box or page
/// context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    // Box generation
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: Display,
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Position,
    /// `top`
    pub top: LengthPercentageAuto,
    /// `right`
    pub right: LengthPercentageAuto,
    /// `bottom`
    pub bottom: LengthPercentageAuto,
    /// `left`
    pub left: LengthPercentageAuto,
    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: Float,
    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: Clear,
    /// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow: Overflow,
    /// `visibility`
    pub visibility: Visibility,

    // Box model
    /// [§ 4.4 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    pub box_sizing: BoxSizing,
    /// `width`
    pub width: Size,
    /// `height`
    pub height: Size,
    /// `min-width`; `auto` resolves to zero outside flex and grid items.
    pub min_width: Size,
    /// `min-height`
    pub min_height: Size,
    /// `max-width`; [`Size::Auto`] is `none`.
    pub max_width: Size,
    /// `max-height`; [`Size::Auto`] is `none`.
    pub max_height: Size,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: Sides<LengthPercentageAuto>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Sides<LengthPercentage>,
    /// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
    pub border: Sides<BorderSide>,
    /// [§ 3 'box-decoration-break'](https://www.w3.org/TR/css-break-3/#break-decoration)
    pub box_decoration_break: BoxDecorationBreak,

    // Color and background, opaque to layout.
    /// `color`
    pub color: Color,
    /// `background-color`
    pub background_color: Color,

    // Fonts
    /// Computed `font-size` in px.
    pub font_size: f32,
    /// `font-family`, as written.
    pub font_family: String,
    /// `font-weight`, 100 to 900.
    pub font_weight: u16,
    /// `font-style`
    pub font_style: FontStyle,
    /// `line-height`
    pub line_height: LineHeight,

    // Text
    /// `white-space`
    pub white_space: WhiteSpace,
    /// `text-align`
    pub text_align: TextAlign,
    /// `text-align-last`
    pub text_align_last: TextAlignLast,
    /// `text-justify`
    pub text_justify: TextJustify,
    /// `text-indent`
    pub text_indent: LengthPercentage,
    /// `text-transform`
    pub text_transform: TextTransform,
    /// `letter-spacing` in px, `normal` is zero.
    pub letter_spacing: f32,
    /// `word-spacing` in px, `normal` is zero.
    pub word_spacing: f32,
    /// `overflow-wrap`
    pub overflow_wrap: OverflowWrap,
    /// `word-break`
    pub word_break: WordBreak,
    /// `hyphens`
    pub hyphens: Hyphens,
    /// `hyphenate-character`
    pub hyphenate_character: String,
    /// `hyphenate-limit-chars`: word, before, after.
    pub hyphenate_limit_chars: (u32, u32, u32),
    /// `hyphenate-limit-zone`
    pub hyphenate_limit_zone: LengthPercentage,
    /// `direction`
    pub direction: Direction,
    /// `vertical-align`
    pub vertical_align: VerticalAlign,
    /// Content language, from the `lang` attribute.
    pub lang: Option<String>,

    // Generated content and lists
    /// `content`
    pub content: Content,
    /// `quotes`; `None` is `auto`.
    pub quotes: Option<Vec<(String, String)>>,
    /// `counter-reset`
    pub counter_reset: Vec<(String, i32)>,
    /// `counter-increment`
    pub counter_increment: Vec<(String, i32)>,
    /// `counter-set`
    pub counter_set: Vec<(String, i32)>,
    /// `list-style-type`
    pub list_style_type: CounterStyle,
    /// `list-style-position`
    pub list_style_position: ListStylePosition,

    // Flexbox
    /// `flex-direction`
    pub flex_direction: FlexDirection,
    /// `flex-wrap`
    pub flex_wrap: FlexWrap,
    /// `flex-grow`
    pub flex_grow: f32,
    /// `flex-shrink`
    pub flex_shrink: f32,
    /// `flex-basis`; [`Size::Auto`] is `auto`, [`Size::MaxContent`] is `content`.
    pub flex_basis: Size,
    /// `order`
    pub order: i32,
    /// `justify-content`
    pub justify_content: ContentDistribution,
    /// `align-content`
    pub align_content: ContentDistribution,
    /// `align-items`
    pub align_items: Alignment,
    /// `align-self`
    pub align_self: Alignment,
    /// `justify-items`
    pub justify_items: Alignment,
    /// `justify-self`
    pub justify_self: Alignment,
    /// `row-gap`; `None` is `normal`.
    pub row_gap: Option<LengthPercentage>,
    /// `column-gap`; `None` is `normal`.
    pub column_gap: Option<LengthPercentage>,

    // Grid
    /// `grid-template-columns`
    pub grid_template_columns: TrackList,
    /// `grid-template-rows`
    pub grid_template_rows: TrackList,
    /// `grid-template-areas`
    pub grid_template_areas: Option<GridAreas>,
    /// `grid-auto-columns`
    pub grid_auto_columns: Vec<TrackSize>,
    /// `grid-auto-rows`
    pub grid_auto_rows: Vec<TrackSize>,
    /// `grid-auto-flow`
    pub grid_auto_flow: GridAutoFlow,
    /// `grid-row-start`
    pub grid_row_start: GridLine,
    /// `grid-row-end`
    pub grid_row_end: GridLine,
    /// `grid-column-start`
    pub grid_column_start: GridLine,
    /// `grid-column-end`
    pub grid_column_end: GridLine,

    // Tables
    /// `table-layout`
    pub table_layout: TableLayout,
    /// `border-collapse`
    pub border_collapse: BorderCollapse,
    /// `border-spacing`: horizontal, vertical.
    pub border_spacing: (f32, f32),
    /// `caption-side`
    pub caption_side: CaptionSide,

    // Multi-column
    /// `column-count`; `None` is `auto`.
    pub column_count: Option<u32>,
    /// `column-width`; `None` is `auto`.
    pub column_width: Option<f32>,
    /// `column-fill`
    pub column_fill: ColumnFill,
    /// `column-span`
    pub column_span: ColumnSpan,

    // Fragmentation
    /// `break-before`
    pub break_before: BreakBetween,
    /// `break-after`
    pub break_after: BreakBetween,
    /// `break-inside`
    pub break_inside: BreakInside,
    /// `orphans`
    pub orphans: u32,
    /// `widows`
    pub widows: u32,
    /// [§ 3.2 'page'](https://www.w3.org/TR/css-page-3/#using-named-pages); `None` is `auto`.
    pub page: Option<String>,
    /// `size`, only meaningful in a page context.
    pub size: PageSize,

    // Footnotes
    /// `footnote-display`
    pub footnote_display: FootnoteDisplay,
    /// `footnote-policy`
    pub footnote_policy: FootnotePolicy,

    /// [§ 2 Defining Custom Properties](https://www.w3.org/TR/css-variables-1/#defining-variables)
    ///
    /// Resolved custom properties, inherited as a whole.
    pub custom_properties: BTreeMap<String, String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

impl ComputedStyle {
    /// [§ 7.1 Initial Values](https://www.w3.org/TR/css-cascade-4/#initial-values)
    ///
    /// The style of an element with no parent and no declarations.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            display: Display::inline(),
            position: Position::Static,
            top: LengthPercentageAuto::Auto,
            right: LengthPercentageAuto::Auto,
            bottom: LengthPercentageAuto::Auto,
            left: LengthPercentageAuto::Auto,
            float: Float::None,
            clear: Clear::None,
            overflow: Overflow::Visible,
            visibility: Visibility::Visible,
            box_sizing: BoxSizing::ContentBox,
            width: Size::Auto,
            height: Size::Auto,
            min_width: Size::Auto,
            min_height: Size::Auto,
            max_width: Size::Auto,
            max_height: Size::Auto,
            margin: Sides::all(LengthPercentageAuto::ZERO),
            padding: Sides::all(LengthPercentage::ZERO),
            border: Sides::all(BorderSide::default()),
            box_decoration_break: BoxDecorationBreak::Slice,
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            font_size: DEFAULT_FONT_SIZE,
            font_family: "serif".to_string(),
            font_weight: 400,
            font_style: FontStyle::Normal,
            line_height: LineHeight::Normal,
            white_space: WhiteSpace::Normal,
            text_align: TextAlign::Start,
            text_align_last: TextAlignLast::Auto,
            text_justify: TextJustify::Auto,
            text_indent: LengthPercentage::ZERO,
            text_transform: TextTransform::None,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            overflow_wrap: OverflowWrap::Normal,
            word_break: WordBreak::Normal,
            hyphens: Hyphens::Manual,
            hyphenate_character: "\u{2010}".to_string(),
            hyphenate_limit_chars: (5, 2, 2),
            hyphenate_limit_zone: LengthPercentage::ZERO,
            direction: Direction::Ltr,
            vertical_align: VerticalAlign::Baseline,
            lang: None,
            content: Content::Normal,
            quotes: None,
            counter_reset: Vec::new(),
            counter_increment: Vec::new(),
            counter_set: Vec::new(),
            list_style_type: CounterStyle::Disc,
            list_style_position: ListStylePosition::Outside,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Nowrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Size::Auto,
            order: 0,
            justify_content: ContentDistribution::Normal,
            align_content: ContentDistribution::Normal,
            align_items: Alignment::Normal,
            align_self: Alignment::Auto,
            justify_items: Alignment::Normal,
            justify_self: Alignment::Auto,
            row_gap: None,
            column_gap: None,
            grid_template_columns: TrackList::default(),
            grid_template_rows: TrackList::default(),
            grid_template_areas: None,
            grid_auto_columns: vec![TrackSize::AUTO],
            grid_auto_rows: vec![TrackSize::AUTO],
            grid_auto_flow: GridAutoFlow::default(),
            grid_row_start: GridLine::Auto,
            grid_row_end: GridLine::Auto,
            grid_column_start: GridLine::Auto,
            grid_column_end: GridLine::Auto,
            table_layout: TableLayout::Auto,
            border_collapse: BorderCollapse::Separate,
            border_spacing: (0.0, 0.0),
            caption_side: CaptionSide::Top,
            column_count: None,
            column_width: None,
            column_fill: ColumnFill::Balance,
            column_span: ColumnSpan::None,
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            orphans: 2,
            widows: 2,
            page: None,
            size: PageSize::Auto,
            footnote_display: FootnoteDisplay::Block,
            footnote_policy: FootnotePolicy::Auto,
            custom_properties: BTreeMap::new(),
        }
    }

    /// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "Inherited properties are propagated from parent to child": a fresh
    /// style carrying the parent's inherited properties and initial values
    /// for the rest.
    #[must_use]
    pub fn inherit_from(parent: &Self) -> Self {
        let mut style = Self::initial();
        for name in INHERITED_PROPERTIES {
            let _ = style.copy_property(name, parent);
        }
        style.custom_properties = parent.custom_properties.clone();
        style.lang = parent.lang.clone();
        style
    }

    /// Style of an anonymous box generated inside a box with this style.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box."
    #[must_use]
    pub fn anonymous_child(&self, display: Display) -> Self {
        let mut style = Self::inherit_from(self);
        style.display = display;
        style
    }

    /// Establishes a containing block for absolutely positioned descendants.
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        self.position.is_positioned()
    }

    /// Taken out of flow by `position`.
    #[must_use]
    pub const fn is_absolutely_positioned(&self) -> bool {
        self.position.is_absolutely_positioned()
    }

    /// Left or right float.
    #[must_use]
    pub fn is_floated(&self) -> bool {
        matches!(self.float, Float::Left | Float::Right)
    }

    /// Placed by normal flow.
    #[must_use]
    pub fn is_in_normal_flow(&self) -> bool {
        !self.is_floated() && !self.is_absolutely_positioned() && self.float != Float::Footnote
    }

    /// A multi-column container.
    #[must_use]
    pub const fn is_multicol(&self) -> bool {
        self.column_count.is_some() || self.column_width.is_some()
    }

    /// Used border widths, zero for invisible styles.
    #[must_use]
    pub const fn border_widths(&self) -> Sides<f32> {
        Sides {
            top: self.border.top.used_width(),
            right: self.border.right.used_width(),
            bottom: self.border.bottom.used_width(),
            left: self.border.left.used_width(),
        }
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    /// and [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// Adjustments applied once every declaration is in.
    pub fn fix_up(&mut self, is_root: bool) {
        if self.display == Display::None {
            return;
        }
        // "Otherwise, if 'position' has the value 'absolute' or 'fixed', the
        // box is absolutely positioned, the computed value of 'float' is
        // 'none', and display is set according to the table below."
        if self.is_absolutely_positioned() {
            self.float = Float::None;
            self.display = self.display.blockified();
        } else if self.float != Float::None || is_root {
            self.display = self.display.blockified();
        }
        if self.position == Position::Sticky {
            self.position = Position::Relative;
        }
    }

    /// Copy one longhand from `source`. Returns `false` for names that are
    /// not longhands this record carries.
    pub fn copy_property(&mut self, name: &str, source: &Self) -> bool {
        macro_rules! copy {
            ($($prop:literal => $($field:ident).+),* $(,)?) => {
                match name {
                    $($prop => self.$($field).+ = source.$($field).+.clone(),)*
                    _ => return false,
                }
            };
        }
        copy! {
            "display" => display,
            "position" => position,
            "top" => top,
            "right" => right,
            "bottom" => bottom,
            "left" => left,
            "float" => float,
            "clear" => clear,
            "overflow" => overflow,
            "visibility" => visibility,
            "box-sizing" => box_sizing,
            "width" => width,
            "height" => height,
            "min-width" => min_width,
            "min-height" => min_height,
            "max-width" => max_width,
            "max-height" => max_height,
            "margin-top" => margin.top,
            "margin-right" => margin.right,
            "margin-bottom" => margin.bottom,
            "margin-left" => margin.left,
            "padding-top" => padding.top,
            "padding-right" => padding.right,
            "padding-bottom" => padding.bottom,
            "padding-left" => padding.left,
            "border-top-width" => border.top.width,
            "border-right-width" => border.right.width,
            "border-bottom-width" => border.bottom.width,
            "border-left-width" => border.left.width,
            "border-top-style" => border.top.style,
            "border-right-style" => border.right.style,
            "border-bottom-style" => border.bottom.style,
            "border-left-style" => border.left.style,
            "border-top-color" => border.top.color,
            "border-right-color" => border.right.color,
            "border-bottom-color" => border.bottom.color,
            "border-left-color" => border.left.color,
            "box-decoration-break" => box_decoration_break,
            "color" => color,
            "background-color" => background_color,
            "font-size" => font_size,
            "font-family" => font_family,
            "font-weight" => font_weight,
            "font-style" => font_style,
            "line-height" => line_height,
            "white-space" => white_space,
            "text-align" => text_align,
            "text-align-last" => text_align_last,
            "text-justify" => text_justify,
            "text-indent" => text_indent,
            "text-transform" => text_transform,
            "letter-spacing" => letter_spacing,
            "word-spacing" => word_spacing,
            "overflow-wrap" => overflow_wrap,
            "word-break" => word_break,
            "hyphens" => hyphens,
            "hyphenate-character" => hyphenate_character,
            "hyphenate-limit-chars" => hyphenate_limit_chars,
            "hyphenate-limit-zone" => hyphenate_limit_zone,
            "direction" => direction,
            "vertical-align" => vertical_align,
            "content" => content,
            "quotes" => quotes,
            "counter-reset" => counter_reset,
            "counter-increment" => counter_increment,
            "counter-set" => counter_set,
            "list-style-type" => list_style_type,
            "list-style-position" => list_style_position,
            "flex-direction" => flex_direction,
            "flex-wrap" => flex_wrap,
            "flex-grow" => flex_grow,
            "flex-shrink" => flex_shrink,
            "flex-basis" => flex_basis,
            "order" => order,
            "justify-content" => justify_content,
            "align-content" => align_content,
            "align-items" => align_items,
            "align-self" => align_self,
            "justify-items" => justify_items,
            "justify-self" => justify_self,
            "row-gap" => row_gap,
            "column-gap" => column_gap,
            "grid-template-columns" => grid_template_columns,
            "grid-template-rows" => grid_template_rows,
            "grid-template-areas" => grid_template_areas,
            "grid-auto-columns" => grid_auto_columns,
            "grid-auto-rows" => grid_auto_rows,
            "grid-auto-flow" => grid_auto_flow,
            "grid-row-start" => grid_row_start,
            "grid-row-end" => grid_row_end,
            "grid-column-start" => grid_column_start,
            "grid-column-end" => grid_column_end,
            "table-layout" => table_layout,
            "border-collapse" => border_collapse,
            "border-spacing" => border_spacing,
            "caption-side" => caption_side,
            "column-count" => column_count,
            "column-width" => column_width,
            "column-fill" => column_fill,
            "column-span" => column_span,
            "break-before" => break_before,
            "break-after" => break_after,
            "break-inside" => break_inside,
            "orphans" => orphans,
            "widows" => widows,
            "page" => page,
            "size" => size,
            "footnote-display" => footnote_display,
            "footnote-policy" => footnote_policy,
        }
        true
    }
}

/// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// Longhands marked "Inherited: yes".
pub const INHERITED_PROPERTIES: &[&str] = &[
    "visibility",
    "color",
    "font-size",
    "font-family",
    "font-weight",
    "font-style",
    "line-height",
    "white-space",
    "text-align",
    "text-align-last",
    "text-justify",
    "text-indent",
    "text-transform",
    "letter-spacing",
    "word-spacing",
    "overflow-wrap",
    "word-break",
    "hyphens",
    "hyphenate-character",
    "hyphenate-limit-chars",
    "hyphenate-limit-zone",
    "direction",
    "quotes",
    "list-style-type",
    "list-style-position",
    "border-collapse",
    "border-spacing",
    "caption-side",
    "orphans",
    "widows",
];

/// True for a longhand with "Inherited: yes".
#[must_use]
pub fn is_inherited(name: &str) -> bool {
    INHERITED_PROPERTIES.contains(&name) || name.starts_with("--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_copies_only_inherited_properties() {
        let mut parent = ComputedStyle::initial();
        parent.font_size = 20.0;
        parent.width = Size::Length(100.0);
        parent.text_align = TextAlign::Center;
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.font_size, 20.0);
        assert_eq!(child.text_align, TextAlign::Center);
        assert_eq!(child.width, Size::Auto);
    }

    #[test]
    fn test_fix_up_blockifies_floats() {
        let mut style = ComputedStyle::initial();
        style.float = Float::Left;
        style.fix_up(false);
        assert!(style.display.is_block_level());

        let mut style = ComputedStyle::initial();
        style.position = Position::Absolute;
        style.float = Float::Right;
        style.fix_up(false);
        assert_eq!(style.float, Float::None);
        assert!(style.display.is_block_level());
    }

    #[test]
    fn test_every_inherited_property_is_copyable() {
        let source = ComputedStyle::initial();
        let mut target = ComputedStyle::initial();
        for name in INHERITED_PROPERTIES {
            assert!(target.copy_property(name, &source), "{name}");
        }
        assert!(!target.copy_property("not-a-property", &source));
    }
}
