//! Paged media: page types, `@page` selectors, page sizes and margin boxes.
//!
//! [CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/)

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::values::{ValueContext, parse_length, split_components};

/// Which spread side a page falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSide {
    /// Even pages in left-to-right progression.
    Left,
    /// Odd pages, the first page included.
    Right,
}

impl PageSide {
    /// Side of the page at zero-based `index`.
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Right } else { Self::Left }
    }
}

/// Everything `@page` selectors can match on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageType {
    /// Named page from the `page` property of the first box on the page.
    pub name: Option<String>,
    /// Zero-based page index in the document.
    pub index: usize,
    /// Spread side.
    pub side: PageSide,
    /// First page of the document.
    pub first: bool,
    /// Blank page inserted by a `left`/`right` break.
    pub blank: bool,
    /// Zero-based index among consecutive pages with the same name.
    pub group_index: usize,
}

impl PageType {
    /// A page at `index` with no name.
    #[must_use]
    pub const fn unnamed(index: usize) -> Self {
        Self {
            name: None,
            index,
            side: PageSide::for_index(index),
            first: index == 0,
            blank: false,
            group_index: index,
        }
    }
}

/// [§ 4.2 Page Selectors](https://www.w3.org/TR/css-page-3/#page-selectors)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PagePseudo {
    /// `:first`
    First,
    /// `:left`
    Left,
    /// `:right`
    Right,
    /// `:blank`
    Blank,
    /// `:nth(An+B [of <name>])`
    Nth {
        /// Step.
        a: i32,
        /// Offset.
        b: i32,
        /// Count inside a named page group.
        of: Option<String>,
    },
}

impl PagePseudo {
    fn matches(&self, page: &PageType) -> bool {
        match self {
            Self::First => page.first,
            Self::Left => page.side == PageSide::Left,
            Self::Right => page.side == PageSide::Right,
            Self::Blank => page.blank,
            Self::Nth { a, b, of } => {
                let position = match of {
                    Some(name) => {
                        if page.name.as_deref() != Some(name.as_str()) {
                            return false;
                        }
                        page.group_index + 1
                    }
                    None => page.index + 1,
                };
                nth_matches(*a, *b, i64::try_from(position).unwrap_or(i64::MAX))
            }
        }
    }
}

/// "An+B": true when some n >= 0 gives `position`.
fn nth_matches(a: i32, b: i32, position: i64) -> bool {
    let offset = position - i64::from(b);
    if a == 0 {
        return offset == 0;
    }
    offset % i64::from(a) == 0 && offset / i64::from(a) >= 0
}

/// Parse the inside of `:nth()`.
fn parse_nth(args: &str) -> Option<PagePseudo> {
    let (formula, of) = match args.split_once(" of ") {
        Some((f, name)) => (f, Some(name.trim().to_string())),
        None => (args, None),
    };
    let formula: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    let formula = formula.to_ascii_lowercase();
    let (a, b) = match formula.as_str() {
        "odd" => (2, 1),
        "even" => (2, 0),
        f => match f.split_once('n') {
            Some((a, b)) => {
                let a = match a {
                    "" | "+" => 1,
                    "-" => -1,
                    n => n.parse().ok()?,
                };
                let b = if b.is_empty() { 0 } else { b.parse().ok()? };
                (a, b)
            }
            None => (0, f.parse().ok()?),
        },
    };
    Some(PagePseudo::Nth { a, b, of })
}

/// An `@page` prelude: optional name plus pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PageSelector {
    /// Page name, or `None` to match every page.
    pub name: Option<String>,
    /// Pseudo-classes, all of which must match.
    pub pseudos: Vec<PagePseudo>,
}

impl PageSelector {
    /// Parse one selector such as `chapter:first` or `:nth(2n+1)`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, mut rest) = match text.find(':') {
            Some(i) => (&text[..i], &text[i..]),
            None => (text, ""),
        };
        let name = (!name.is_empty()).then(|| name.to_string());
        let mut pseudos = Vec::new();
        while let Some(after) = rest.strip_prefix(':') {
            let end = after.find(':').unwrap_or(after.len());
            let token = &after[..end];
            let lower = token.to_ascii_lowercase();
            let pseudo = match lower.as_str() {
                "first" => PagePseudo::First,
                "left" => PagePseudo::Left,
                "right" => PagePseudo::Right,
                "blank" => PagePseudo::Blank,
                _ => {
                    let args = lower.strip_prefix("nth(")?.strip_suffix(')')?;
                    parse_nth(args)?
                }
            };
            pseudos.push(pseudo);
            rest = &after[end..];
        }
        Some(Self { name, pseudos })
    }

    /// True when `page` is selected.
    #[must_use]
    pub fn matches(&self, page: &PageType) -> bool {
        if let Some(name) = &self.name
            && page.name.as_deref() != Some(name.as_str())
        {
            return false;
        }
        self.pseudos.iter().all(|p| p.matches(page))
    }

    /// [§ 4.3 Page selector specificity](https://www.w3.org/TR/css-page-3/#cascading-and-page-context)
    ///
    /// "A page selector's specificity is (f, g, h): f is 1 if a page name is
    /// present, g counts :first, :blank and :nth(), h counts :left and
    /// :right."
    #[must_use]
    pub fn specificity(&self) -> (u32, u32, u32) {
        let mut g = 0;
        let mut h = 0;
        for pseudo in &self.pseudos {
            match pseudo {
                PagePseudo::Left | PagePseudo::Right => h += 1,
                _ => g += 1,
            }
        }
        (u32::from(self.name.is_some()), g, h)
    }
}

/// [§ 7.1 Page size](https://www.w3.org/TR/css-page-3/#page-size-prop)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum PageSize {
    /// Use the configured default.
    #[default]
    Auto,
    /// Width and height in px.
    Explicit(f32, f32),
}

impl PageSize {
    /// Parse `auto | <length>{1,2} | <page-size> [portrait | landscape]`.
    #[must_use]
    pub fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        let parts = split_components(value);
        let lower: Vec<String> = parts.iter().map(|p| p.to_ascii_lowercase()).collect();
        if lower.len() == 1 && lower[0] == "auto" {
            return Some(Self::Auto);
        }
        let lengths: Option<Vec<f32>> = parts.iter().map(|p| parse_length(p, ctx)).collect();
        if let Some(lengths) = lengths {
            return match lengths.as_slice() {
                [side] if *side > 0.0 => Some(Self::Explicit(*side, *side)),
                [w, h] if *w > 0.0 && *h > 0.0 => Some(Self::Explicit(*w, *h)),
                _ => None,
            };
        }
        let mut named = None;
        let mut landscape = None;
        for word in &lower {
            match word.as_str() {
                "portrait" if landscape.is_none() => landscape = Some(false),
                "landscape" if landscape.is_none() => landscape = Some(true),
                w if named.is_none() => named = Some(named_page_size(w)?),
                _ => return None,
            }
        }
        // Orientation alone keeps the default size.
        let (w, h) = named.unwrap_or(A4);
        let (short, long) = (w.min(h), w.max(h));
        Some(if landscape == Some(true) {
            Self::Explicit(long, short)
        } else {
            Self::Explicit(short, long)
        })
    }
}

const MM: f32 = 96.0 / 25.4;
const INCH: f32 = 96.0;

/// A4 in px at 96dpi.
pub const A4: (f32, f32) = (210.0 * MM, 297.0 * MM);

/// [§ 7.2 Page size keywords](https://www.w3.org/TR/css-page-3/#typedef-page-size-page-size)
fn named_page_size(name: &str) -> Option<(f32, f32)> {
    let size = match name {
        "a5" => (148.0 * MM, 210.0 * MM),
        "a4" => A4,
        "a3" => (297.0 * MM, 420.0 * MM),
        "b5" => (176.0 * MM, 250.0 * MM),
        "b4" => (250.0 * MM, 353.0 * MM),
        "letter" => (8.5 * INCH, 11.0 * INCH),
        "legal" => (8.5 * INCH, 14.0 * INCH),
        "ledger" => (11.0 * INCH, 17.0 * INCH),
        _ => return None,
    };
    Some(size)
}

/// [§ 5.3 Page-Margin Boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum MarginBoxName {
    /// `@top-left-corner`
    TopLeftCorner,
    /// `@top-left`
    TopLeft,
    /// `@top-center`
    TopCenter,
    /// `@top-right`
    TopRight,
    /// `@top-right-corner`
    TopRightCorner,
    /// `@right-top`
    RightTop,
    /// `@right-middle`
    RightMiddle,
    /// `@right-bottom`
    RightBottom,
    /// `@bottom-right-corner`
    BottomRightCorner,
    /// `@bottom-right`
    BottomRight,
    /// `@bottom-center`
    BottomCenter,
    /// `@bottom-left`
    BottomLeft,
    /// `@bottom-left-corner`
    BottomLeftCorner,
    /// `@left-bottom`
    LeftBottom,
    /// `@left-middle`
    LeftMiddle,
    /// `@left-top`
    LeftTop,
}

/// Which page margin a margin box lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginEdge {
    /// Along the top margin, between the corners.
    Top,
    /// Along the right margin.
    Right,
    /// Along the bottom margin.
    Bottom,
    /// Along the left margin.
    Left,
    /// One of the four corners.
    Corner,
}

impl MarginBoxName {
    /// The margin this box lives in.
    #[must_use]
    pub const fn edge(self) -> MarginEdge {
        match self {
            Self::TopLeftCorner | Self::TopRightCorner | Self::BottomRightCorner | Self::BottomLeftCorner => {
                MarginEdge::Corner
            }
            Self::TopLeft | Self::TopCenter | Self::TopRight => MarginEdge::Top,
            Self::RightTop | Self::RightMiddle | Self::RightBottom => MarginEdge::Right,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => MarginEdge::Bottom,
            Self::LeftTop | Self::LeftMiddle | Self::LeftBottom => MarginEdge::Left,
        }
    }
}

/// The part of a page a page-context style is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageArea {
    /// The page box itself.
    Page,
    /// A page-margin box.
    Margin(MarginBoxName),
    /// [GCPM § 2.3 The footnote area](https://www.w3.org/TR/css-gcpm-3/#footnote-area)
    Footnote,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize) -> PageType {
        PageType::unnamed(index)
    }

    #[test]
    fn test_nth_even_pages() {
        let selector = PageSelector::parse(":nth(2n)").unwrap();
        let matched: Vec<usize> = (0..10).filter(|&i| selector.matches(&page(i))).map(|i| i + 1).collect();
        assert_eq!(matched, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_nth_offsets() {
        let selector = PageSelector::parse(":nth(-n+3)").unwrap();
        assert!(selector.matches(&page(2)));
        assert!(!selector.matches(&page(3)));
        let selector = PageSelector::parse(":nth(5)").unwrap();
        assert!(selector.matches(&page(4)));
        assert!(!selector.matches(&page(9)));
    }

    #[test]
    fn test_named_and_sides() {
        let selector = PageSelector::parse("chapter:left").unwrap();
        let mut p = page(1);
        assert!(!selector.matches(&p));
        p.name = Some("chapter".into());
        assert!(selector.matches(&p));
        assert_eq!(selector.specificity(), (1, 0, 1));
        assert_eq!(PageSelector::parse(":first").unwrap().specificity(), (0, 1, 0));
    }

    #[test]
    fn test_page_sizes() {
        let ctx = ValueContext::default();
        assert_eq!(PageSize::parse("1px 1px", &ctx), Some(PageSize::Explicit(1.0, 1.0)));
        assert_eq!(PageSize::parse("10px", &ctx), Some(PageSize::Explicit(10.0, 10.0)));
        assert_eq!(
            PageSize::parse("letter landscape", &ctx),
            Some(PageSize::Explicit(1056.0, 816.0))
        );
        assert!(PageSize::parse("huge", &ctx).is_none());
    }

    #[test]
    fn test_margin_box_names() {
        assert_eq!("top-center".parse::<MarginBoxName>(), Ok(MarginBoxName::TopCenter));
        assert_eq!(MarginBoxName::LeftMiddle.edge(), MarginEdge::Left);
        assert_eq!(MarginBoxName::TopLeftCorner.edge(), MarginEdge::Corner);
    }
}
