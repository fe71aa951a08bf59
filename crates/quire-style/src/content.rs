//! Generated content: `content`, counters, quotes and counter styles.
//!
//! [CSS Generated Content Level 3](https://www.w3.org/TR/css-content-3/),
//! [CSS Lists Level 3](https://www.w3.org/TR/css-lists-3/),
//! [CSS Counter Styles Level 3](https://www.w3.org/TR/css-counter-styles-3/).

use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::values::{parse_integer, parse_string, split_commas, split_components, split_function};

/// [§ 6 Simple predefined counter styles](https://www.w3.org/TR/css-counter-styles-3/#simple-numeric)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum CounterStyle {
    /// 1, 2, 3
    #[default]
    Decimal,
    /// 01, 02, 03
    DecimalLeadingZero,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// a, b, c
    #[strum(serialize = "lower-alpha", serialize = "lower-latin")]
    LowerAlpha,
    /// A, B, C
    #[strum(serialize = "upper-alpha", serialize = "upper-latin")]
    UpperAlpha,
    /// α, β, γ
    LowerGreek,
    /// •
    Disc,
    /// ◦
    Circle,
    /// ▪
    Square,
    /// Nothing.
    None,
}

impl CounterStyle {
    /// Bullet-like styles ignore the counter value.
    #[must_use]
    pub const fn is_symbolic(self) -> bool {
        matches!(self, Self::Disc | Self::Circle | Self::Square | Self::None)
    }

    /// [§ 3.1 Counter algorithms](https://www.w3.org/TR/css-counter-styles-3/#counter-style-system)
    ///
    /// Render `value` in this style. Values outside a style's range fall back
    /// to decimal, as the counter-style fallback chain does.
    #[must_use]
    pub fn format(self, value: i32) -> String {
        match self {
            Self::Decimal => value.to_string(),
            Self::DecimalLeadingZero => {
                if (0..10).contains(&value) {
                    format!("0{value}")
                } else if (-9..0).contains(&value) {
                    format!("-0{}", -value)
                } else {
                    value.to_string()
                }
            }
            Self::LowerRoman => roman(value).map_or_else(|| value.to_string(), |r| r.to_lowercase()),
            Self::UpperRoman => roman(value).unwrap_or_else(|| value.to_string()),
            Self::LowerAlpha => alphabetic(value, &LATIN).unwrap_or_else(|| value.to_string()),
            Self::UpperAlpha => alphabetic(value, &LATIN)
                .map_or_else(|| value.to_string(), |s| s.to_uppercase()),
            Self::LowerGreek => alphabetic(value, &GREEK).unwrap_or_else(|| value.to_string()),
            Self::Disc => "\u{2022}".to_string(),
            Self::Circle => "\u{25e6}".to_string(),
            Self::Square => "\u{25aa}".to_string(),
            Self::None => String::new(),
        }
    }

    /// [§ 3.1.1 The `::marker` pseudo-element](https://www.w3.org/TR/css-lists-3/#content-property)
    ///
    /// The default marker string for a list item: the counter followed by a
    /// period for numeric styles, the symbol for bullets, then a space.
    #[must_use]
    pub fn marker_text(self, value: i32) -> String {
        match self {
            Self::None => String::new(),
            s if s.is_symbolic() => format!("{} ", s.format(value)),
            s => format!("{}. ", s.format(value)),
        }
    }
}

const LATIN: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

/// "additive" roman numerals for 1..=3999.
fn roman(value: i32) -> Option<String> {
    const TABLE: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..=3999).contains(&value) {
        return None;
    }
    let mut rest = value;
    let mut out = String::new();
    for (weight, symbol) in TABLE {
        while rest >= weight {
            out.push_str(symbol);
            rest -= weight;
        }
    }
    Some(out)
}

/// "alphabetic" system: a, b, ..., z, aa, ab, ...
fn alphabetic(value: i32, symbols: &[char]) -> Option<String> {
    if value < 1 {
        return None;
    }
    let base = symbols.len();
    let mut n = usize::try_from(value).ok()?;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(symbols[n % base]);
        n /= base;
    }
    Some(out.iter().rev().collect())
}

/// Where a `target-counter()` points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TargetUrl {
    /// `attr(name)`: read the URL from an attribute of the element.
    Attr(String),
    /// A literal `url()` or string.
    Literal(String),
}

/// [§ 1.1 'content'](https://www.w3.org/TR/css-content-3/#content-property)
/// component values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContentItem {
    /// A literal string.
    String(String),
    /// `counter(name, style)`
    Counter {
        /// Counter name.
        name: String,
        /// Counter style.
        style: CounterStyle,
    },
    /// `counters(name, separator, style)`
    Counters {
        /// Counter name.
        name: String,
        /// Joiner between nested instances.
        separator: String,
        /// Counter style.
        style: CounterStyle,
    },
    /// `attr(name)`
    Attr(String),
    /// `open-quote`
    OpenQuote,
    /// `close-quote`
    CloseQuote,
    /// `no-open-quote`
    NoOpenQuote,
    /// `no-close-quote`
    NoCloseQuote,
    /// [GCPM § 4 `leader()`](https://www.w3.org/TR/css-gcpm-3/#leaders): the
    /// pattern repeated to fill the rest of the line.
    Leader(String),
    /// [GCPM § 3 `target-counter()`](https://www.w3.org/TR/css-gcpm-3/#target-counter)
    TargetCounter {
        /// Link target.
        url: TargetUrl,
        /// Counter to read at the target (`page` in practice).
        name: String,
        /// Counter style.
        style: CounterStyle,
    },
    /// `url()`: an image.
    Url(String),
}

impl ContentItem {
    /// True for values that can only be known once pages are laid out.
    #[must_use]
    pub fn depends_on_pagination(&self) -> bool {
        match self {
            Self::Counter { name, .. } | Self::Counters { name, .. } => {
                name == "page" || name == "pages"
            }
            Self::TargetCounter { .. } => true,
            _ => false,
        }
    }
}

/// The computed `content` value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Content {
    /// `normal`: no generated content on `::before`/`::after`, the default
    /// marker on `::marker`.
    #[default]
    Normal,
    /// `none`
    None,
    /// A list of items.
    Items(Vec<ContentItem>),
}

impl Content {
    /// Parse a `content` value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("normal") {
            return Some(Self::Normal);
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Some(Self::None);
        }
        let items = split_components(trimmed)
            .into_iter()
            .map(parse_content_item)
            .collect::<Option<Vec<_>>>()?;
        (!items.is_empty()).then_some(Self::Items(items))
    }
}

fn parse_counter_style(value: Option<&&str>) -> Option<CounterStyle> {
    match value {
        Some(v) => v.trim().parse().ok(),
        None => Some(CounterStyle::Decimal),
    }
}

fn parse_content_item(token: &str) -> Option<ContentItem> {
    if let Some(s) = parse_string(token) {
        return Some(ContentItem::String(s));
    }
    match token.to_ascii_lowercase().as_str() {
        "open-quote" => return Some(ContentItem::OpenQuote),
        "close-quote" => return Some(ContentItem::CloseQuote),
        "no-open-quote" => return Some(ContentItem::NoOpenQuote),
        "no-close-quote" => return Some(ContentItem::NoCloseQuote),
        _ => {}
    }
    let (name, args) = split_function(token)?;
    let args = split_commas(args);
    match name.to_ascii_lowercase().as_str() {
        "counter" => Some(ContentItem::Counter {
            name: (*args.first()?).to_string(),
            style: parse_counter_style(args.get(1))?,
        }),
        "counters" => Some(ContentItem::Counters {
            name: (*args.first()?).to_string(),
            separator: parse_string(args.get(1)?)?,
            style: parse_counter_style(args.get(2))?,
        }),
        "attr" => Some(ContentItem::Attr(args.first()?.trim().to_ascii_lowercase())),
        "leader" => {
            let pattern = args.first()?.trim();
            let pattern = match pattern.to_ascii_lowercase().as_str() {
                "dotted" => ".".to_string(),
                "solid" => "_".to_string(),
                "space" => " ".to_string(),
                _ => parse_string(pattern)?,
            };
            Some(ContentItem::Leader(pattern))
        }
        "target-counter" => {
            let target = args.first()?.trim();
            let url = match split_function(target) {
                Some((f, inner)) if f.eq_ignore_ascii_case("attr") => {
                    TargetUrl::Attr(inner.trim().to_ascii_lowercase())
                }
                Some((f, inner)) if f.eq_ignore_ascii_case("url") => {
                    TargetUrl::Literal(parse_string(inner).unwrap_or_else(|| inner.trim().to_string()))
                }
                _ => TargetUrl::Literal(parse_string(target)?),
            };
            Some(ContentItem::TargetCounter {
                url,
                name: args.get(1)?.trim().to_string(),
                style: parse_counter_style(args.get(2))?,
            })
        }
        "url" => {
            let target = args.first()?.trim();
            Some(ContentItem::Url(parse_string(target).unwrap_or_else(|| target.to_string())))
        }
        _ => None,
    }
}

/// Parse `counter-reset`, `counter-increment` or `counter-set`.
///
/// [§ 2.1 Counter properties](https://www.w3.org/TR/css-lists-3/#counter-properties)
///
/// "`[ <counter-name> <integer>? ]+ | none`". A missing integer is
/// `default_value` (0 for reset/set, 1 for increment).
#[must_use]
pub fn parse_counter_list(value: &str, default_value: i32) -> Option<Vec<(String, i32)>> {
    let parts = split_components(value);
    if parts.len() == 1 && parts[0].eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }
    let mut out: Vec<(String, i32)> = Vec::new();
    for part in parts {
        if let Some(n) = parse_integer(part) {
            let last = out.last_mut()?;
            last.1 = n;
        } else if part.chars().next().is_some_and(|c| c.is_alphabetic() || c == '-' || c == '_') {
            out.push((part.to_string(), default_value));
        } else {
            return None;
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Parse `quotes`: `auto`, `none` or string pairs. `Some(None)` is `auto`.
#[must_use]
pub fn parse_quotes(value: &str) -> Option<Option<Vec<(String, String)>>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Some(None);
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return Some(Some(Vec::new()));
    }
    let strings = split_components(trimmed)
        .into_iter()
        .map(parse_string)
        .collect::<Option<Vec<_>>>()?;
    if strings.is_empty() || strings.len() % 2 != 0 {
        return None;
    }
    Some(Some(
        strings
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_styles() {
        assert_eq!(CounterStyle::UpperRoman.format(1994), "MCMXCIV");
        assert_eq!(CounterStyle::LowerAlpha.format(28), "ab");
        assert_eq!(CounterStyle::LowerAlpha.format(0), "0");
        assert_eq!(CounterStyle::DecimalLeadingZero.format(7), "07");
        assert_eq!(CounterStyle::LowerGreek.format(2), "β");
        assert_eq!(CounterStyle::Decimal.marker_text(3), "3. ");
        assert_eq!(CounterStyle::Disc.marker_text(3), "\u{2022} ");
    }

    #[test]
    fn test_content_parsing() {
        let content = Content::parse(r#""p. " counter(page) " of " counter(pages, upper-roman)"#);
        assert_eq!(
            content,
            Some(Content::Items(vec![
                ContentItem::String("p. ".into()),
                ContentItem::Counter {
                    name: "page".into(),
                    style: CounterStyle::Decimal
                },
                ContentItem::String(" of ".into()),
                ContentItem::Counter {
                    name: "pages".into(),
                    style: CounterStyle::UpperRoman
                },
            ]))
        );
        assert_eq!(Content::parse("leader(dotted)"), Some(Content::Items(vec![ContentItem::Leader(".".into())])));
        assert_eq!(Content::parse("bogus(1)"), None);
    }

    #[test]
    fn test_target_counter() {
        let content = Content::parse("target-counter(attr(href), page)").unwrap();
        let Content::Items(items) = content else {
            panic!("expected items");
        };
        assert!(items[0].depends_on_pagination());
        assert_eq!(
            items[0],
            ContentItem::TargetCounter {
                url: TargetUrl::Attr("href".into()),
                name: "page".into(),
                style: CounterStyle::Decimal
            }
        );
    }

    #[test]
    fn test_counter_lists() {
        assert_eq!(
            parse_counter_list("chapter section 2", 0),
            Some(vec![("chapter".into(), 0), ("section".into(), 2)])
        );
        assert_eq!(parse_counter_list("none", 1), Some(vec![]));
        assert_eq!(parse_counter_list("3", 1), None);
    }

    #[test]
    fn test_quotes() {
        assert_eq!(parse_quotes("auto"), Some(None));
        assert_eq!(
            parse_quotes(r#"'«' '»'"#),
            Some(Some(vec![("«".into(), "»".into())]))
        );
        assert_eq!(parse_quotes(r#"'a'"#), None);
    }
}
