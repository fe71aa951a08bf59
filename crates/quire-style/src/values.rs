//! Computed value types and the small value readers used by declarations.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! Lengths are resolved to CSS pixels when a style is computed. Percentages
//! survive until layout because their basis is the containing block.

use serde::Serialize;

use crate::keywords::BorderStyle;

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Everything needed to turn a specified length into pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueContext {
    /// Computed font size of the element, basis for `em`.
    pub font_size: f32,
    /// Computed font size of the parent, basis for `em` inside `font-size`.
    pub parent_font_size: f32,
    /// Computed font size of the root element, basis for `rem`.
    pub root_font_size: f32,
    /// Viewport width, basis for `vw`.
    pub viewport_width: f32,
    /// Viewport height, basis for `vh`.
    pub viewport_height: f32,
}

impl Default for ValueContext {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            parent_font_size: DEFAULT_FONT_SIZE,
            root_font_size: DEFAULT_FONT_SIZE,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

/// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
///
/// A `<length-percentage>` whose length part is already in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentage {
    /// Absolute length in px.
    Length(f32),
    /// Percentage of a basis known only at layout time.
    Percent(f32),
}

impl LengthPercentage {
    /// `0px`.
    pub const ZERO: Self = Self::Length(0.0);

    /// Resolve against `basis`.
    #[must_use]
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            Self::Length(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }

    /// Resolve against an optional basis; percentages of an indefinite basis
    /// are `None`.
    #[must_use]
    pub fn resolve_definite(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Length(px) => Some(px),
            Self::Percent(pct) => basis.map(|b| b * pct / 100.0),
        }
    }

    /// True for a percentage.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// The fixed part, percentages count as zero. Used by intrinsic sizing.
    #[must_use]
    pub const fn fixed_or_zero(self) -> f32 {
        match self {
            Self::Length(px) => px,
            Self::Percent(_) => 0.0,
        }
    }
}

/// A `<length-percentage> | auto` value such as a margin or an offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentageAuto {
    /// `auto`
    Auto,
    /// Absolute length in px.
    Length(f32),
    /// Percentage of the containing block.
    Percent(f32),
}

impl LengthPercentageAuto {
    /// `0px`.
    pub const ZERO: Self = Self::Length(0.0);

    /// True for `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against `basis`, `None` for `auto`.
    #[must_use]
    pub fn resolve(self, basis: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(px) => Some(px),
            Self::Percent(pct) => Some(basis * pct / 100.0),
        }
    }

    /// Resolve, treating `auto` as zero.
    #[must_use]
    pub fn resolve_or_zero(self, basis: f32) -> f32 {
        self.resolve(basis).unwrap_or(0.0)
    }

    /// The fixed part, `auto` and percentages count as zero.
    #[must_use]
    pub const fn fixed_or_zero(self) -> f32 {
        match self {
            Self::Length(px) => px,
            Self::Auto | Self::Percent(_) => 0.0,
        }
    }
}

impl From<LengthPercentage> for LengthPercentageAuto {
    fn from(value: LengthPercentage) -> Self {
        match value {
            LengthPercentage::Length(px) => Self::Length(px),
            LengthPercentage::Percent(p) => Self::Percent(p),
        }
    }
}

/// [§ 3 Sizing properties](https://www.w3.org/TR/css-sizing-3/#sizing-properties)
///
/// The value of `width`, `height` and their `min-`/`max-` variants. For the
/// `max-*` properties [`Size::Auto`] stands for `none`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Size {
    /// `auto` (or `none` for `max-*`).
    Auto,
    /// Absolute length in px.
    Length(f32),
    /// Percentage of the containing block.
    Percent(f32),
    /// `min-content`
    MinContent,
    /// `max-content`
    MaxContent,
    /// `fit-content`
    FitContent,
}

impl Size {
    /// True for `auto`/`none`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// True when the size depends on the box contents.
    #[must_use]
    pub const fn is_intrinsic(self) -> bool {
        matches!(self, Self::MinContent | Self::MaxContent | Self::FitContent)
    }

    /// Resolve a length or a percentage of a definite basis. Keywords and
    /// percentages of an indefinite basis give `None`.
    #[must_use]
    pub fn resolve(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Length(px) => Some(px),
            Self::Percent(pct) => basis.map(|b| b * pct / 100.0),
            _ => None,
        }
    }
}

/// An sRGB color with 8-bit channels.
///
/// [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True when nothing would be painted.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// Accepts 3, 4, 6 or 8 hex digits, with or without the leading `#`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?)),
            4 => Some(Self {
                r: digit(0)?,
                g: digit(1)?,
                b: digit(2)?,
                a: digit(3)?,
            }),
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self {
                r: pair(0)?,
                g: pair(2)?,
                b: pair(4)?,
                a: pair(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The basic color keywords plus a few common extended ones.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::RED,
            "lime" => Self::rgb(0, 255, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "olive" => Self::rgb(128, 128, 0),
            "purple" => Self::rgb(128, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "navy" => Self::rgb(0, 0, 128),
            "orange" => Self::rgb(255, 165, 0),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// Parse `#hex`, a keyword, `rgb()` or `rgba()`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        if let Some((name, args)) = split_function(value) {
            if !(name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba")) {
                return None;
            }
            let parts: Vec<&str> = args
                .split([',', ' ', '/'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 3 {
                return None;
            }
            let channel = |s: &str| -> Option<u8> {
                if let Some(pct) = s.strip_suffix('%') {
                    pct.parse::<f32>()
                        .ok()
                        .map(|p| (p.clamp(0.0, 100.0) * 2.55).round() as u8)
                } else {
                    s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8)
                }
            };
            let alpha = match parts.get(3) {
                Some(a) if a.ends_with('%') => channel(a)?,
                Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
                None => 255,
            };
            return Some(Self {
                r: channel(parts[0])?,
                g: channel(parts[1])?,
                b: channel(parts[2])?,
                a: alpha,
            });
        }
        Self::from_named(value)
    }
}

/// Per-side values in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sides<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on all four sides.
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "If there is only one component value, it applies to all sides. If
    /// there are two values, the top and bottom margins are set to the first
    /// value and the right and left margins are set to the second. If there
    /// are three values, the top is set to the first value, the left and right
    /// are set to the second, and the bottom is set to the third. If there are
    /// four values, they apply to the top, right, bottom, and left,
    /// respectively."
    pub fn from_shorthand(values: &[T]) -> Option<Self> {
        match *values {
            [a] => Some(Self::all(a)),
            [v, h] => Some(Self {
                top: v,
                right: h,
                bottom: v,
                left: h,
            }),
            [t, h, b] => Some(Self {
                top: t,
                right: h,
                bottom: b,
                left: h,
            }),
            [t, r, b, l] => Some(Self {
                top: t,
                right: r,
                bottom: b,
                left: l,
            }),
            _ => None,
        }
    }
}

/// [§ 4.2 'line-height'](https://www.w3.org/TR/css-inline-3/#line-height-property)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// "Determine the preferred line height automatically based on font
    /// metrics."
    #[default]
    Normal,
    /// A multiple of the element's font size. Inherited as the number.
    Number(f32),
    /// A fixed height in px; percentages compute to this.
    Length(f32),
}

impl LineHeight {
    /// The used line height for `font_size`, with `normal_ratio` taken from
    /// the font metrics for `normal`.
    #[must_use]
    pub fn resolve(self, font_size: f32, normal_ratio: f32) -> f32 {
        match self {
            Self::Normal => font_size * normal_ratio,
            Self::Number(n) => font_size * n,
            Self::Length(px) => px,
        }
    }

    /// Parse `normal | <number> | <length-percentage>`.
    #[must_use]
    pub fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("normal") {
            return Some(Self::Normal);
        }
        if let Some(n) = parse_number(value) {
            return (n >= 0.0).then_some(Self::Number(n));
        }
        match parse_length_percentage(value, ctx)? {
            LengthPercentage::Length(px) if px >= 0.0 => Some(Self::Length(px)),
            LengthPercentage::Percent(p) if p >= 0.0 => Some(Self::Length(ctx.font_size * p / 100.0)),
            _ => None,
        }
    }
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Lower the baseline of the box to the proper position for subscripts
    /// of the parent's box."
    Sub,
    /// "Raise the baseline of the box to the proper position for
    /// superscripts of the parent's box."
    Super,
    /// "Align the top of the box with the top of the parent's content area."
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content
    /// area."
    TextBottom,
    /// "Align the vertical midpoint of the box with the baseline of the
    /// parent box plus half the x-height of the parent."
    Middle,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line
    /// box."
    Bottom,
    /// Raise by a length (negative lowers).
    Length(f32),
    /// Raise by a percentage of the element's own line height.
    Percent(f32),
}

impl VerticalAlign {
    /// Parse a keyword or a `<length-percentage>`.
    #[must_use]
    pub fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        let lower = value.trim().to_ascii_lowercase();
        let keyword = match lower.as_str() {
            "baseline" => Self::Baseline,
            "sub" => Self::Sub,
            "super" => Self::Super,
            "text-top" => Self::TextTop,
            "text-bottom" => Self::TextBottom,
            "middle" => Self::Middle,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => {
                return match parse_length_percentage(value, ctx)? {
                    LengthPercentage::Length(px) => Some(Self::Length(px)),
                    LengthPercentage::Percent(p) => Some(Self::Percent(p)),
                };
            }
        };
        Some(keyword)
    }

    /// Aligned against the line box rather than the parent's baseline.
    #[must_use]
    pub const fn is_line_relative(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// One side of a border.
///
/// [§ 4 Borders](https://www.w3.org/TR/css-backgrounds-3/#borders)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSide {
    /// Computed width in px; zero whenever the style is `none` or `hidden`.
    pub width: f32,
    /// Line style.
    pub style: BorderStyle,
    /// Line color.
    pub color: Color,
}

impl Default for BorderSide {
    fn default() -> Self {
        // "Initial: medium", which only shows once a style is set.
        Self {
            width: BORDER_WIDTH_MEDIUM,
            style: BorderStyle::None,
            color: Color::BLACK,
        }
    }
}

impl BorderSide {
    /// The width layout uses.
    #[must_use]
    pub const fn used_width(&self) -> f32 {
        if self.style.is_invisible() { 0.0 } else { self.width }
    }
}

/// `thin`
pub const BORDER_WIDTH_THIN: f32 = 1.0;
/// `medium`
pub const BORDER_WIDTH_MEDIUM: f32 = 3.0;
/// `thick`
pub const BORDER_WIDTH_THICK: f32 = 5.0;

/// Parse a `<line-width>`: a non-negative length or `thin | medium | thick`.
#[must_use]
pub fn parse_line_width(value: &str, ctx: &ValueContext) -> Option<f32> {
    match value.trim().to_ascii_lowercase().as_str() {
        "thin" => Some(BORDER_WIDTH_THIN),
        "medium" => Some(BORDER_WIDTH_MEDIUM),
        "thick" => Some(BORDER_WIDTH_THICK),
        _ => parse_length(value, ctx).filter(|w| *w >= 0.0),
    }
}

/// Parse a `<length>` into pixels. Unitless zero is accepted.
#[must_use]
pub fn parse_length(value: &str, ctx: &ValueContext) -> Option<f32> {
    parse_length_with_em(value, ctx, ctx.font_size)
}

/// Parse a `<length>` where `em` resolves against `em_basis`; `font-size`
/// itself uses the parent font size.
#[must_use]
pub fn parse_length_with_em(value: &str, ctx: &ValueContext, em_basis: f32) -> Option<f32> {
    let value = value.trim();
    let split = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(value.len(), |(i, _)| i);
    let (number, unit) = value.split_at(split);
    let number: f32 = number.parse().ok()?;
    let px = match unit.to_ascii_lowercase().as_str() {
        "" if number == 0.0 => 0.0,
        "px" => number,
        "pt" => number * 4.0 / 3.0,
        "pc" => number * 16.0,
        "in" => number * 96.0,
        "cm" => number * 96.0 / 2.54,
        "mm" => number * 96.0 / 25.4,
        "q" => number * 96.0 / 101.6,
        "em" => number * em_basis,
        "rem" => number * ctx.root_font_size,
        "ex" => number * em_basis * 0.5,
        "ch" => number * em_basis,
        "vw" => number * ctx.viewport_width / 100.0,
        "vh" => number * ctx.viewport_height / 100.0,
        "vmin" => number * ctx.viewport_width.min(ctx.viewport_height) / 100.0,
        "vmax" => number * ctx.viewport_width.max(ctx.viewport_height) / 100.0,
        _ => return None,
    };
    px.is_finite().then_some(px)
}

/// Parse a plain `<number>`.
#[must_use]
pub fn parse_number(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok().filter(|n| n.is_finite())
}

/// Parse an `<integer>`.
#[must_use]
pub fn parse_integer(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

/// Parse a `<percentage>` into its number.
#[must_use]
pub fn parse_percentage(value: &str) -> Option<f32> {
    value.trim().strip_suffix('%').and_then(parse_number)
}

/// Parse a `<length-percentage>`.
#[must_use]
pub fn parse_length_percentage(value: &str, ctx: &ValueContext) -> Option<LengthPercentage> {
    parse_percentage(value)
        .map(LengthPercentage::Percent)
        .or_else(|| parse_length(value, ctx).map(LengthPercentage::Length))
}

/// Parse a `<length-percentage> | auto`.
#[must_use]
pub fn parse_length_percentage_auto(value: &str, ctx: &ValueContext) -> Option<LengthPercentageAuto> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Some(LengthPercentageAuto::Auto);
    }
    parse_length_percentage(value, ctx).map(LengthPercentageAuto::from)
}

/// Parse a sizing value. `none` is accepted as [`Size::Auto`] when
/// `allow_none` is set (the `max-*` properties).
#[must_use]
pub fn parse_size(value: &str, ctx: &ValueContext, allow_none: bool) -> Option<Size> {
    let keyword = value.trim().to_ascii_lowercase();
    match keyword.as_str() {
        "auto" if !allow_none => Some(Size::Auto),
        "none" if allow_none => Some(Size::Auto),
        "min-content" => Some(Size::MinContent),
        "max-content" => Some(Size::MaxContent),
        "fit-content" => Some(Size::FitContent),
        _ => match parse_length_percentage(value, ctx)? {
            LengthPercentage::Length(px) if px >= 0.0 => Some(Size::Length(px)),
            LengthPercentage::Percent(p) if p >= 0.0 => Some(Size::Percent(p)),
            _ => None,
        },
    }
}

/// Split `name(args)` into its parts; `None` when `value` is not a single
/// function call.
#[must_use]
pub fn split_function(value: &str) -> Option<(&str, &str)> {
    let value = value.trim();
    let open = value.find('(')?;
    if !value.ends_with(')') {
        return None;
    }
    let name = &value[..open];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }
    Some((name, &value[open + 1..value.len() - 1]))
}

/// Split a value on top-level whitespace, keeping function arguments,
/// bracketed line names and quoted strings together.
#[must_use]
pub fn split_components(value: &str) -> Vec<&str> {
    split_top_level(value, |c| c.is_whitespace())
}

/// Split a value on top-level commas.
#[must_use]
pub fn split_commas(value: &str) -> Vec<&str> {
    split_top_level(value, |c| c == ',')
}

fn split_top_level(value: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (i, c) in value.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            },
        }
        let separator = quote.is_none() && depth == 0 && is_separator(c);
        if separator {
            if let Some(s) = start.take() {
                parts.push(value[s..i].trim());
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(value[s..].trim());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Strip matching single or double quotes from a `<string>`.
#[must_use]
pub fn parse_string(value: &str) -> Option<String> {
    let value = value.trim();
    let quote = value.chars().next()?;
    if (quote == '"' || quote == '\'') && value.len() >= 2 && value.ends_with(quote) {
        let inner = &value[1..value.len() - 1];
        Some(unescape(inner))
    } else {
        None
    }
}

/// Resolve CSS escapes (`\A`, `\"`, `\2010`) inside a string.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 && chars.peek().is_some_and(char::is_ascii_hexdigit) {
            if let Some(h) = chars.next() {
                hex.push(h);
            }
        }
        if hex.is_empty() {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            if chars.peek() == Some(&' ') {
                let _ = chars.next();
            }
            let code = u32::from_str_radix(&hex, 16).unwrap_or(0xfffd);
            out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_units() {
        let ctx = ValueContext::default();
        assert_eq!(parse_length("12px", &ctx), Some(12.0));
        assert_eq!(parse_length("1in", &ctx), Some(96.0));
        assert_eq!(parse_length("3pt", &ctx), Some(4.0));
        assert_eq!(parse_length("0", &ctx), Some(0.0));
        assert_eq!(parse_length("5", &ctx), None);
        assert_eq!(parse_length("-2px", &ctx), Some(-2.0));
    }

    #[test]
    fn test_relative_units() {
        let ctx = ValueContext {
            font_size: 10.0,
            root_font_size: 20.0,
            ..ValueContext::default()
        };
        assert_eq!(parse_length("2em", &ctx), Some(20.0));
        assert_eq!(parse_length("2rem", &ctx), Some(40.0));
        assert_eq!(parse_length("50vw", &ctx), Some(400.0));
    }

    #[test]
    fn test_color_forms() {
        assert_eq!(Color::parse("#f00"), Some(Color::RED));
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::RED));
        assert_eq!(Color::parse("rgba(0,0,0,0)"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse("Lime"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(Color::parse("#ggg"), None);
    }

    #[test]
    fn test_split_components_keeps_functions() {
        assert_eq!(
            split_components("1px  repeat(2, 1fr) \"a b\""),
            vec!["1px", "repeat(2, 1fr)", "\"a b\""]
        );
        assert_eq!(split_commas("a, b(c, d), e"), vec!["a", "b(c, d)", "e"]);
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(parse_string("'a b'"), Some("a b".to_string()));
        assert_eq!(parse_string(r#""x\A y""#), Some("x\ny".to_string()));
        assert_eq!(parse_string("bare"), None);
    }

    #[test]
    fn test_line_height_percent_computes_to_length() {
        let ctx = ValueContext {
            font_size: 20.0,
            ..ValueContext::default()
        };
        assert_eq!(LineHeight::parse("150%", &ctx), Some(LineHeight::Length(30.0)));
        assert_eq!(LineHeight::parse("1.5", &ctx), Some(LineHeight::Number(1.5)));
        assert_eq!(LineHeight::Number(1.5).resolve(10.0, 1.0), 15.0);
    }

    #[test]
    fn test_shorthand_sides() {
        let sides = Sides::from_shorthand(&[1, 2, 3]).unwrap();
        assert_eq!((sides.top, sides.right, sides.bottom, sides.left), (1, 2, 3, 2));
        assert!(Sides::<i32>::from_shorthand(&[]).is_none());
    }
}
