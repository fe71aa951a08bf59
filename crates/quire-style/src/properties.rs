//! Declaration handling: shorthand expansion and longhand parsing.
//!
//! Values arrive as text with `var()` already substituted. Shorthands are
//! expanded into longhand text first, so `inherit` and friends work the same
//! way on both.

use std::str::FromStr;

use crate::computed::ComputedStyle;
use crate::content::{Content, CounterStyle, parse_counter_list, parse_quotes};
use crate::display::Display;
use crate::error::StyleError;
use crate::grid::{GridAreas, GridAutoFlow, GridLine, TrackList, parse_track_sizes};
use crate::keywords::{BorderStyle, BreakBetween, BreakInside};
use crate::page::PageSize;
use crate::values::{
    Color, LengthPercentage, LineHeight, Sides, Size, ValueContext, VerticalAlign, parse_integer,
    parse_length, parse_length_percentage, parse_length_percentage_auto, parse_length_with_em,
    parse_line_width, parse_number, parse_size, parse_string, split_commas, split_components,
};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// CSS-wide keywords.
///
/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideKeyword {
    /// `inherit`
    Inherit,
    /// `initial`
    Initial,
    /// `unset`
    Unset,
}

impl WideKeyword {
    /// Recognize a CSS-wide keyword value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inherit" => Some(Self::Inherit),
            "initial" => Some(Self::Initial),
            "unset" => Some(Self::Unset),
            _ => None,
        }
    }
}

fn keyword<T: FromStr>(property: &str, value: &str) -> Result<T, StyleError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| StyleError::invalid(property, value))
}

fn or_invalid<T>(property: &str, value: &str, parsed: Option<T>) -> Result<T, StyleError> {
    parsed.ok_or_else(|| StyleError::invalid(property, value))
}

/// Expand a shorthand into `(longhand, value)` pairs. Longhands come back
/// unchanged as a single pair.
///
/// # Errors
///
/// Returns [`StyleError::InvalidValue`] when the shorthand value cannot be
/// split into its longhands.
pub fn expand_shorthand(name: &str, value: &str) -> Result<Vec<(String, String)>, StyleError> {
    let invalid = || StyleError::invalid(name, value);
    let wide = WideKeyword::parse(value).is_some();
    let parts = split_components(value);
    let pairs = |names: &[&str], values: &[&str]| -> Vec<(String, String)> {
        names
            .iter()
            .zip(values)
            .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
            .collect()
    };
    let four_sides = |prefix: &str, suffix: &str| -> Result<Vec<(String, String)>, StyleError> {
        let names: Vec<String> = SIDES
            .iter()
            .map(|side| format!("{prefix}-{side}{suffix}"))
            .collect();
        if wide {
            return Ok(names.into_iter().map(|n| (n, value.to_string())).collect());
        }
        let sides = Sides::from_shorthand(&parts).ok_or_else(invalid)?;
        Ok(vec![
            (names[0].clone(), sides.top.to_string()),
            (names[1].clone(), sides.right.to_string()),
            (names[2].clone(), sides.bottom.to_string()),
            (names[3].clone(), sides.left.to_string()),
        ])
    };
    let expanded = match name {
        "margin" => four_sides("margin", "")?,
        "padding" => four_sides("padding", "")?,
        "border-width" => four_sides("border", "-width")?,
        "border-style" => four_sides("border", "-style")?,
        "border-color" => four_sides("border", "-color")?,
        "inset" => {
            let mut out = four_sides("inset", "")?;
            for (n, _) in &mut out {
                *n = n.trim_start_matches("inset-").to_string();
            }
            out
        }
        "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let sides: Vec<&str> = match name.strip_prefix("border-") {
                Some(side) => vec![side],
                None => SIDES.to_vec(),
            };
            let (width, style, color) = if wide {
                (value.to_string(), value.to_string(), value.to_string())
            } else {
                split_border(&parts).ok_or_else(invalid)?
            };
            sides
                .iter()
                .flat_map(|side| {
                    [
                        (format!("border-{side}-width"), width.clone()),
                        (format!("border-{side}-style"), style.clone()),
                        (format!("border-{side}-color"), color.clone()),
                    ]
                })
                .collect()
        }
        "flex" => {
            let names = ["flex-grow", "flex-shrink", "flex-basis"];
            if wide {
                pairs(&names, &[value, value, value])
            } else {
                let (grow, shrink, basis) = split_flex(&parts).ok_or_else(invalid)?;
                pairs(&names, &[grow.as_str(), shrink.as_str(), basis.as_str()])
            }
        }
        "flex-flow" => {
            let mut direction = "row";
            let mut wrap = "nowrap";
            if wide {
                direction = value;
                wrap = value;
            } else {
                for part in &parts {
                    let lower = part.to_ascii_lowercase();
                    if ["row", "row-reverse", "column", "column-reverse"].contains(&lower.as_str()) {
                        direction = *part;
                    } else if ["nowrap", "wrap", "wrap-reverse"].contains(&lower.as_str()) {
                        wrap = *part;
                    } else {
                        return Err(invalid());
                    }
                }
            }
            pairs(&["flex-direction", "flex-wrap"], &[direction, wrap])
        }
        "gap" | "grid-gap" => match parts.as_slice() {
            [both] => pairs(&["row-gap", "column-gap"], &[*both, *both]),
            [row, column] => pairs(&["row-gap", "column-gap"], &[*row, *column]),
            _ => return Err(invalid()),
        },
        "grid-row" | "grid-column" => {
            let (start, end) = match value.split_once('/') {
                Some((s, e)) => (s.trim().to_string(), e.trim().to_string()),
                None => (value.trim().to_string(), copy_named(value.trim(), wide, value)),
            };
            vec![(format!("{name}-start"), start), (format!("{name}-end"), end)]
        }
        "grid-area" => {
            let lines: Vec<String> = value.split('/').map(|s| s.trim().to_string()).collect();
            if lines.len() > 4 {
                return Err(invalid());
            }
            // row-start / column-start / row-end / column-end; a missing line
            // copies a named row-start (or column-start for the ends).
            let row_start = lines[0].clone();
            let column_start = lines.get(1).cloned().unwrap_or_else(|| copy_named(&row_start, wide, value));
            let row_end = lines.get(2).cloned().unwrap_or_else(|| copy_named(&row_start, wide, value));
            let column_end = lines
                .get(3)
                .cloned()
                .unwrap_or_else(|| copy_named(&column_start, wide, value));
            vec![
                ("grid-row-start".to_string(), row_start),
                ("grid-column-start".to_string(), column_start),
                ("grid-row-end".to_string(), row_end),
                ("grid-column-end".to_string(), column_end),
            ]
        }
        "grid-template" => {
            if wide || value.trim().eq_ignore_ascii_case("none") {
                let v = if wide { value } else { "none" };
                pairs(
                    &["grid-template-rows", "grid-template-columns", "grid-template-areas"],
                    &[v, v, v],
                )
            } else {
                let (rows, columns) = value.split_once('/').ok_or_else(invalid)?;
                pairs(
                    &["grid-template-rows", "grid-template-columns", "grid-template-areas"],
                    &[rows.trim(), columns.trim(), "none"],
                )
            }
        }
        "columns" => {
            let mut width = "auto";
            let mut count = "auto";
            if wide {
                width = value;
                count = value;
            } else {
                for part in &parts {
                    if parse_integer(part).is_some() {
                        count = *part;
                    } else if !part.eq_ignore_ascii_case("auto") {
                        width = *part;
                    }
                }
            }
            pairs(&["column-width", "column-count"], &[width, count])
        }
        "list-style" => {
            let mut out = Vec::new();
            for part in &parts {
                let lower = part.to_ascii_lowercase();
                if wide {
                    out.push(("list-style-type".to_string(), value.to_string()));
                    out.push(("list-style-position".to_string(), value.to_string()));
                    break;
                } else if lower == "inside" || lower == "outside" {
                    out.push(("list-style-position".to_string(), lower));
                } else if lower.parse::<CounterStyle>().is_ok() {
                    out.push(("list-style-type".to_string(), lower));
                }
            }
            out
        }
        // [§ 3.4 Page Break Aliases](https://www.w3.org/TR/css-break-3/#page-break-properties)
        "page-break-before" | "page-break-after" => {
            let longhand = name.trim_start_matches("page-").to_string();
            let mapped = match value.trim().to_ascii_lowercase().as_str() {
                "always" => "page".to_string(),
                other => other.to_string(),
            };
            vec![(longhand, mapped)]
        }
        "page-break-inside" => vec![("break-inside".to_string(), value.trim().to_string())],
        "word-wrap" => vec![("overflow-wrap".to_string(), value.trim().to_string())],
        "column-rule" | "column-rule-width" | "column-rule-style" | "column-rule-color" => Vec::new(),
        "background" => {
            // Only the color part matters here.
            let color = parts
                .iter()
                .find(|p| Color::parse(p).is_some())
                .map_or("transparent", |p| *p);
            vec![("background-color".to_string(), color.to_string())]
        }
        "font" => expand_font(&parts, value, wide).ok_or_else(invalid)?,
        _ => vec![(name.to_string(), value.to_string())],
    };
    Ok(expanded)
}

fn copy_named(start: &str, wide: bool, value: &str) -> String {
    if wide {
        value.to_string()
    } else if GridLine::parse(start).is_some_and(|l| matches!(l, GridLine::Named(..))) {
        start.to_string()
    } else {
        "auto".to_string()
    }
}

/// `border: <line-width> || <line-style> || <color>`
fn split_border(parts: &[&str]) -> Option<(String, String, String)> {
    let ctx = ValueContext::default();
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for part in parts {
        if width.is_none() && parse_line_width(part, &ctx).is_some() {
            width = Some((*part).to_string());
        } else if style.is_none() && part.parse::<BorderStyle>().is_ok() {
            style = Some((*part).to_string());
        } else if color.is_none() && Color::parse(part).is_some() {
            color = Some((*part).to_string());
        } else {
            return None;
        }
    }
    Some((
        width.unwrap_or_else(|| "medium".to_string()),
        style.unwrap_or_else(|| "none".to_string()),
        color.unwrap_or_else(|| "currentcolor".to_string()),
    ))
}

/// [§ 7.1.1 Basic Values of 'flex'](https://www.w3.org/TR/css-flexbox-1/#flex-common)
fn split_flex(parts: &[&str]) -> Option<(String, String, String)> {
    match parts {
        [one] => match one.to_ascii_lowercase().as_str() {
            "none" => Some(("0".into(), "0".into(), "auto".into())),
            "auto" => Some(("1".into(), "1".into(), "auto".into())),
            "initial" => Some(("0".into(), "1".into(), "auto".into())),
            _ => {
                if parse_number(one).is_some() {
                    // "flex: <positive-number>" is "flex: <number> 1 0".
                    Some(((*one).to_string(), "1".into(), "0px".into()))
                } else {
                    Some(("1".into(), "1".into(), (*one).to_string()))
                }
            }
        },
        [a, b] => {
            let grow = parse_number(a)?;
            if parse_number(b).is_some() {
                Some((grow.to_string(), (*b).to_string(), "0px".into()))
            } else {
                Some((grow.to_string(), "1".into(), (*b).to_string()))
            }
        }
        [a, b, c] => {
            let grow = parse_number(a)?;
            let shrink = parse_number(b)?;
            Some((grow.to_string(), shrink.to_string(), (*c).to_string()))
        }
        _ => None,
    }
}

/// `font: [style] [weight] size[/line-height] family`
fn expand_font(parts: &[&str], value: &str, wide: bool) -> Option<Vec<(String, String)>> {
    let names = ["font-style", "font-weight", "font-size", "line-height", "font-family"];
    if wide {
        return Some(names.iter().map(|n| ((*n).to_string(), value.to_string())).collect());
    }
    let mut style = "normal".to_string();
    let mut weight = "normal".to_string();
    let mut out = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let lower = part.to_ascii_lowercase();
        if lower == "italic" || lower == "oblique" {
            style = lower;
        } else if lower == "bold" || lower == "bolder" || lower == "lighter" || parse_integer(part).is_some() {
            weight = lower;
        } else if lower != "normal" {
            let (size, line_height) = match part.split_once('/') {
                Some((s, l)) => (s.to_string(), l.to_string()),
                None => ((*part).to_string(), "normal".to_string()),
            };
            let family = parts[i + 1..].join(" ");
            if family.is_empty() {
                return None;
            }
            out.push(("font-style".to_string(), style));
            out.push(("font-weight".to_string(), weight));
            out.push(("font-size".to_string(), size));
            out.push(("line-height".to_string(), line_height));
            out.push(("font-family".to_string(), family));
            return Some(out);
        }
    }
    None
}

impl ComputedStyle {
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    ///
    /// Compute `font-size` against the parent's font size.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidValue`] for unparseable or negative sizes.
    pub fn apply_font_size(&mut self, value: &str, ctx: &ValueContext) -> Result<(), StyleError> {
        let parent = ctx.parent_font_size;
        let size = match value.trim().to_ascii_lowercase().as_str() {
            "xx-small" => 9.0,
            "x-small" => 10.0,
            "small" => 13.0,
            "medium" => 16.0,
            "large" => 18.0,
            "x-large" => 24.0,
            "xx-large" => 32.0,
            "xxx-large" => 48.0,
            "smaller" => parent / 1.2,
            "larger" => parent * 1.2,
            _ => match parse_length_percentage(value, ctx) {
                Some(LengthPercentage::Percent(p)) => parent * p / 100.0,
                Some(LengthPercentage::Length(_)) => {
                    // "em" inside font-size refers to the parent's size.
                    or_invalid("font-size", value, parse_length_with_em(value, ctx, parent))?
                }
                None => return Err(StyleError::invalid("font-size", value)),
            },
        };
        if size < 0.0 {
            return Err(StyleError::invalid("font-size", value));
        }
        self.font_size = size;
        Ok(())
    }

    /// Parse and store one longhand.
    ///
    /// # Errors
    ///
    /// [`StyleError::UnknownProperty`] for names this engine does not know,
    /// [`StyleError::InvalidValue`] when the value does not parse. The style
    /// is left unchanged on error.
    #[allow(clippy::cognitive_complexity)]
    pub fn apply_longhand(&mut self, name: &str, value: &str, ctx: &ValueContext) -> Result<(), StyleError> {
        let v = value.trim();
        let lower = v.to_ascii_lowercase();
        let length = |value: &str| or_invalid(name, value, parse_length(value, ctx));
        let lp = |value: &str| or_invalid(name, value, parse_length_percentage(value, ctx));
        let lpa = |value: &str| or_invalid(name, value, parse_length_percentage_auto(value, ctx));
        let size = |value: &str, allow_none: bool| or_invalid(name, value, parse_size(value, ctx, allow_none));
        let non_negative_lp = |value: &str| match lp(value)? {
            LengthPercentage::Length(px) if px < 0.0 => Err(StyleError::invalid(name, value)),
            LengthPercentage::Percent(p) if p < 0.0 => Err(StyleError::invalid(name, value)),
            ok => Ok(ok),
        };
        let color = |value: &str, current: Color| {
            if value.trim().eq_ignore_ascii_case("currentcolor") {
                Ok(current)
            } else {
                or_invalid(name, value, Color::parse(value))
            }
        };

        match name {
            "display" => self.display = or_invalid(name, v, Display::parse(v))?,
            "position" => self.position = keyword(name, v)?,
            "top" => self.top = lpa(v)?,
            "right" => self.right = lpa(v)?,
            "bottom" => self.bottom = lpa(v)?,
            "left" => self.left = lpa(v)?,
            "float" => self.float = keyword(name, v)?,
            "clear" => self.clear = keyword(name, v)?,
            "overflow" => self.overflow = keyword(name, v)?,
            "visibility" => self.visibility = keyword(name, v)?,
            "box-sizing" => self.box_sizing = keyword(name, v)?,
            "width" => self.width = size(v, false)?,
            "height" => self.height = size(v, false)?,
            "min-width" => self.min_width = size(v, false)?,
            "min-height" => self.min_height = size(v, false)?,
            "max-width" => self.max_width = size(v, true)?,
            "max-height" => self.max_height = size(v, true)?,
            "margin-top" => self.margin.top = lpa(v)?,
            "margin-right" => self.margin.right = lpa(v)?,
            "margin-bottom" => self.margin.bottom = lpa(v)?,
            "margin-left" => self.margin.left = lpa(v)?,
            "padding-top" => self.padding.top = non_negative_lp(v)?,
            "padding-right" => self.padding.right = non_negative_lp(v)?,
            "padding-bottom" => self.padding.bottom = non_negative_lp(v)?,
            "padding-left" => self.padding.left = non_negative_lp(v)?,
            "border-top-width" => self.border.top.width = or_invalid(name, v, parse_line_width(v, ctx))?,
            "border-right-width" => self.border.right.width = or_invalid(name, v, parse_line_width(v, ctx))?,
            "border-bottom-width" => self.border.bottom.width = or_invalid(name, v, parse_line_width(v, ctx))?,
            "border-left-width" => self.border.left.width = or_invalid(name, v, parse_line_width(v, ctx))?,
            "border-top-style" => self.border.top.style = keyword(name, v)?,
            "border-right-style" => self.border.right.style = keyword(name, v)?,
            "border-bottom-style" => self.border.bottom.style = keyword(name, v)?,
            "border-left-style" => self.border.left.style = keyword(name, v)?,
            "border-top-color" => self.border.top.color = color(v, self.color)?,
            "border-right-color" => self.border.right.color = color(v, self.color)?,
            "border-bottom-color" => self.border.bottom.color = color(v, self.color)?,
            "border-left-color" => self.border.left.color = color(v, self.color)?,
            "box-decoration-break" => self.box_decoration_break = keyword(name, v)?,
            "color" => self.color = color(v, self.color)?,
            "background-color" => self.background_color = color(v, self.color)?,
            "font-size" => self.apply_font_size(v, ctx)?,
            "font-family" => self.font_family = v.to_string(),
            "font-weight" => {
                self.font_weight = match lower.as_str() {
                    "normal" => 400,
                    "bold" => 700,
                    "bolder" => (self.font_weight + 300).min(900),
                    "lighter" => self.font_weight.saturating_sub(300).max(100),
                    _ => parse_integer(v)
                        .filter(|w| (1..=1000).contains(w))
                        .and_then(|w| u16::try_from(w).ok())
                        .ok_or_else(|| StyleError::invalid(name, v))?,
                };
            }
            "font-style" => self.font_style = keyword(name, v)?,
            "line-height" => self.line_height = or_invalid(name, v, LineHeight::parse(v, ctx))?,
            "white-space" => self.white_space = keyword(name, v)?,
            "text-align" => self.text_align = keyword(name, v)?,
            "text-align-last" => self.text_align_last = keyword(name, v)?,
            "text-justify" => self.text_justify = keyword(name, v)?,
            "text-indent" => self.text_indent = lp(v)?,
            "text-transform" => self.text_transform = keyword(name, v)?,
            "letter-spacing" => {
                self.letter_spacing = if lower == "normal" { 0.0 } else { length(v)? };
            }
            "word-spacing" => {
                self.word_spacing = if lower == "normal" { 0.0 } else { length(v)? };
            }
            "overflow-wrap" => self.overflow_wrap = keyword(name, v)?,
            "word-break" => self.word_break = keyword(name, v)?,
            "hyphens" => self.hyphens = keyword(name, v)?,
            "hyphenate-character" => {
                self.hyphenate_character = if lower == "auto" {
                    "\u{2010}".to_string()
                } else {
                    or_invalid(name, v, parse_string(v))?
                };
            }
            "hyphenate-limit-chars" => {
                let numbers: Vec<Option<u32>> = split_components(v)
                    .into_iter()
                    .map(|p| {
                        if p.eq_ignore_ascii_case("auto") {
                            None
                        } else {
                            parse_integer(p).and_then(|n| u32::try_from(n).ok())
                        }
                    })
                    .collect();
                let pick = |i: usize, default: u32| numbers.get(i).copied().flatten().unwrap_or(default);
                self.hyphenate_limit_chars = match numbers.len() {
                    1 => (pick(0, 5), 2, 2),
                    2 => (pick(0, 5), pick(1, 2), pick(1, 2)),
                    3 => (pick(0, 5), pick(1, 2), pick(2, 2)),
                    _ => return Err(StyleError::invalid(name, v)),
                };
            }
            "hyphenate-limit-zone" => self.hyphenate_limit_zone = lp(v)?,
            "direction" => self.direction = keyword(name, v)?,
            "vertical-align" => self.vertical_align = or_invalid(name, v, VerticalAlign::parse(v, ctx))?,
            "content" => self.content = or_invalid(name, v, Content::parse(v))?,
            "quotes" => self.quotes = or_invalid(name, v, parse_quotes(v))?,
            "counter-reset" => self.counter_reset = or_invalid(name, v, parse_counter_list(v, 0))?,
            "counter-increment" => self.counter_increment = or_invalid(name, v, parse_counter_list(v, 1))?,
            "counter-set" => self.counter_set = or_invalid(name, v, parse_counter_list(v, 0))?,
            "list-style-type" => self.list_style_type = keyword(name, v)?,
            "list-style-position" => self.list_style_position = keyword(name, v)?,
            "flex-direction" => self.flex_direction = keyword(name, v)?,
            "flex-wrap" => self.flex_wrap = keyword(name, v)?,
            "flex-grow" => {
                self.flex_grow = or_invalid(name, v, parse_number(v).filter(|n| *n >= 0.0))?;
            }
            "flex-shrink" => {
                self.flex_shrink = or_invalid(name, v, parse_number(v).filter(|n| *n >= 0.0))?;
            }
            "flex-basis" => {
                self.flex_basis = if lower == "content" { Size::MaxContent } else { size(v, false)? };
            }
            "order" => self.order = or_invalid(name, v, parse_integer(v))?,
            "justify-content" => self.justify_content = keyword(name, v)?,
            "align-content" => self.align_content = keyword(name, v)?,
            "align-items" => self.align_items = keyword(name, v)?,
            "align-self" => self.align_self = keyword(name, v)?,
            "justify-items" => self.justify_items = keyword(name, v)?,
            "justify-self" => self.justify_self = keyword(name, v)?,
            "row-gap" => self.row_gap = if lower == "normal" { None } else { Some(non_negative_lp(v)?) },
            "column-gap" => {
                self.column_gap = if lower == "normal" { None } else { Some(non_negative_lp(v)?) };
            }
            "grid-template-columns" => {
                self.grid_template_columns = or_invalid(name, v, TrackList::parse(v, ctx))?;
            }
            "grid-template-rows" => self.grid_template_rows = or_invalid(name, v, TrackList::parse(v, ctx))?,
            "grid-template-areas" => self.grid_template_areas = or_invalid(name, v, GridAreas::parse(v))?,
            "grid-auto-columns" => self.grid_auto_columns = or_invalid(name, v, parse_track_sizes(v, ctx))?,
            "grid-auto-rows" => self.grid_auto_rows = or_invalid(name, v, parse_track_sizes(v, ctx))?,
            "grid-auto-flow" => self.grid_auto_flow = or_invalid(name, v, GridAutoFlow::parse(v))?,
            "grid-row-start" => self.grid_row_start = or_invalid(name, v, GridLine::parse(v))?,
            "grid-row-end" => self.grid_row_end = or_invalid(name, v, GridLine::parse(v))?,
            "grid-column-start" => self.grid_column_start = or_invalid(name, v, GridLine::parse(v))?,
            "grid-column-end" => self.grid_column_end = or_invalid(name, v, GridLine::parse(v))?,
            "table-layout" => self.table_layout = keyword(name, v)?,
            "border-collapse" => self.border_collapse = keyword(name, v)?,
            "border-spacing" => {
                let lengths = split_components(v)
                    .into_iter()
                    .map(|p| parse_length(p, ctx).filter(|l| *l >= 0.0))
                    .collect::<Option<Vec<_>>>();
                self.border_spacing = match lengths.as_deref() {
                    Some([both]) => (*both, *both),
                    Some([horizontal, vertical]) => (*horizontal, *vertical),
                    _ => return Err(StyleError::invalid(name, v)),
                };
            }
            "caption-side" => self.caption_side = keyword(name, v)?,
            "column-count" => {
                self.column_count = if lower == "auto" {
                    None
                } else {
                    Some(or_invalid(
                        name,
                        v,
                        parse_integer(v).filter(|n| *n > 0).and_then(|n| u32::try_from(n).ok()),
                    )?)
                };
            }
            "column-width" => {
                self.column_width = if lower == "auto" {
                    None
                } else {
                    Some(or_invalid(name, v, parse_length(v, ctx).filter(|w| *w >= 0.0))?)
                };
            }
            "column-fill" => self.column_fill = keyword(name, v)?,
            "column-span" => self.column_span = keyword(name, v)?,
            "break-before" => self.break_before = keyword::<BreakBetween>(name, v)?,
            "break-after" => self.break_after = keyword::<BreakBetween>(name, v)?,
            "break-inside" => self.break_inside = keyword::<BreakInside>(name, v)?,
            "orphans" => {
                self.orphans = or_invalid(name, v, parse_integer(v).filter(|n| *n > 0).and_then(|n| u32::try_from(n).ok()))?;
            }
            "widows" => {
                self.widows = or_invalid(name, v, parse_integer(v).filter(|n| *n > 0).and_then(|n| u32::try_from(n).ok()))?;
            }
            "page" => self.page = if lower == "auto" { None } else { Some(v.to_string()) },
            "size" => self.size = or_invalid(name, v, PageSize::parse(v, ctx))?,
            "footnote-display" => self.footnote_display = keyword(name, v)?,
            "footnote-policy" => self.footnote_policy = keyword(name, v)?,
            _ => return Err(StyleError::UnknownProperty(name.to_string())),
        }
        Ok(())
    }
}

/// Split a `font-family` list, mostly for diagnostics.
#[must_use]
pub fn font_families(value: &str) -> Vec<String> {
    split_commas(value)
        .into_iter()
        .map(|f| parse_string(f).unwrap_or_else(|| f.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::{FlexDirection, FlexWrap};
    use crate::values::LengthPercentageAuto;

    fn apply_all(style: &mut ComputedStyle, name: &str, value: &str) {
        let ctx = ValueContext::default();
        for (longhand, v) in expand_shorthand(name, value).unwrap() {
            style.apply_longhand(&longhand, &v, &ctx).unwrap();
        }
    }

    #[test]
    fn test_margin_shorthand() {
        let mut style = ComputedStyle::initial();
        apply_all(&mut style, "margin", "10px auto");
        assert_eq!(style.margin.top, LengthPercentageAuto::Length(10.0));
        assert_eq!(style.margin.left, LengthPercentageAuto::Auto);
        assert_eq!(style.margin.bottom, LengthPercentageAuto::Length(10.0));
    }

    #[test]
    fn test_border_shorthand() {
        let mut style = ComputedStyle::initial();
        apply_all(&mut style, "border", "2px solid red");
        assert_eq!(style.border.left.width, 2.0);
        assert_eq!(style.border.left.style, BorderStyle::Solid);
        assert_eq!(style.border.left.color, Color::RED);
        assert_eq!(style.border_widths().top, 2.0);

        apply_all(&mut style, "border-top", "none");
        assert_eq!(style.border_widths().top, 0.0);
    }

    #[test]
    fn test_flex_shorthand() {
        let mut style = ComputedStyle::initial();
        apply_all(&mut style, "flex", "1");
        assert_eq!((style.flex_grow, style.flex_shrink), (1.0, 1.0));
        assert_eq!(style.flex_basis, Size::Length(0.0));
        apply_all(&mut style, "flex", "none");
        assert_eq!((style.flex_grow, style.flex_shrink), (0.0, 0.0));
        assert_eq!(style.flex_basis, Size::Auto);
        apply_all(&mut style, "flex-flow", "column wrap");
        assert_eq!(style.flex_direction, FlexDirection::Column);
        assert_eq!(style.flex_wrap, FlexWrap::Wrap);
    }

    #[test]
    fn test_font_size_keywords_and_em() {
        let ctx = ValueContext {
            parent_font_size: 20.0,
            ..ValueContext::default()
        };
        let mut style = ComputedStyle::initial();
        style.apply_font_size("2em", &ctx).unwrap();
        assert_eq!(style.font_size, 40.0);
        style.apply_font_size("50%", &ctx).unwrap();
        assert_eq!(style.font_size, 10.0);
        assert!(style.apply_font_size("-1px", &ctx).is_err());
    }

    #[test]
    fn test_page_break_aliases() {
        assert_eq!(
            expand_shorthand("page-break-before", "always").unwrap(),
            vec![("break-before".to_string(), "page".to_string())]
        );
    }

    #[test]
    fn test_grid_area_copies_named_lines() {
        let pairs = expand_shorthand("grid-area", "main").unwrap();
        assert!(pairs.iter().all(|(_, v)| v == "main"));
        let pairs = expand_shorthand("grid-column", "1 / span 2").unwrap();
        assert_eq!(pairs[1], ("grid-column-end".to_string(), "span 2".to_string()));
    }

    #[test]
    fn test_unknown_and_invalid() {
        let ctx = ValueContext::default();
        let mut style = ComputedStyle::initial();
        assert!(matches!(
            style.apply_longhand("frobnicate", "1", &ctx),
            Err(StyleError::UnknownProperty(_))
        ));
        assert!(matches!(
            style.apply_longhand("width", "wide", &ctx),
            Err(StyleError::InvalidValue { .. })
        ));
        assert_eq!(style.width, Size::Auto);
    }
}
