//! Grid template and placement values.
//!
//! [CSS Grid Layout Level 1](https://www.w3.org/TR/css-grid-1/)

use serde::Serialize;

use crate::values::{
    ValueContext, parse_integer, parse_length_percentage, parse_number, parse_string,
    split_commas, split_components, split_function, LengthPercentage,
};

/// [§ 7.2.1 Track Sizes](https://www.w3.org/TR/css-grid-1/#track-sizes)
///
/// One side of a track sizing function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TrackBreadth {
    /// Fixed length.
    Length(f32),
    /// Percentage of the grid container's content box.
    Percent(f32),
    /// `<flex>`: a share of the leftover space.
    Flex(f32),
    /// `min-content`
    MinContent,
    /// `max-content`
    MaxContent,
    /// `auto`
    Auto,
}

impl TrackBreadth {
    /// Length or percentage.
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Length(_) | Self::Percent(_))
    }

    /// Resolve a fixed breadth; percentages of an indefinite basis are `None`.
    #[must_use]
    pub fn resolve(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Length(px) => Some(px),
            Self::Percent(p) => basis.map(|b| b * p / 100.0),
            _ => None,
        }
    }

    fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        let lower = value.trim().to_ascii_lowercase();
        match lower.as_str() {
            "auto" => Some(Self::Auto),
            "min-content" => Some(Self::MinContent),
            "max-content" => Some(Self::MaxContent),
            _ => {
                if let Some(fr) = lower.strip_suffix("fr") {
                    return parse_number(fr).filter(|f| *f >= 0.0).map(Self::Flex);
                }
                match parse_length_percentage(value, ctx)? {
                    LengthPercentage::Length(px) if px >= 0.0 => Some(Self::Length(px)),
                    LengthPercentage::Percent(p) if p >= 0.0 => Some(Self::Percent(p)),
                    _ => None,
                }
            }
        }
    }
}

/// A track sizing function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TrackSize {
    /// A single breadth used as both minimum and maximum (a flexible
    /// breadth `Nfr` means `minmax(auto, Nfr)`).
    Breadth(TrackBreadth),
    /// `minmax(min, max)`
    MinMax(TrackBreadth, TrackBreadth),
    /// `fit-content(limit)`
    FitContent(LengthPercentage),
}

impl TrackSize {
    /// `auto`
    pub const AUTO: Self = Self::Breadth(TrackBreadth::Auto);

    /// [§ 11.1 Grid Sizing Algorithm](https://www.w3.org/TR/css-grid-1/#algo-terms)
    ///
    /// The min track sizing function.
    #[must_use]
    pub const fn min_function(self) -> TrackBreadth {
        match self {
            Self::Breadth(TrackBreadth::Flex(_)) | Self::FitContent(_) => TrackBreadth::Auto,
            Self::Breadth(b) | Self::MinMax(b, _) => b,
        }
    }

    /// The max track sizing function.
    #[must_use]
    pub const fn max_function(self) -> TrackBreadth {
        match self {
            Self::Breadth(b) | Self::MinMax(_, b) => b,
            Self::FitContent(_) => TrackBreadth::MaxContent,
        }
    }

    /// Flexible tracks have an `fr` max function.
    #[must_use]
    pub const fn flex_factor(self) -> Option<f32> {
        match self.max_function() {
            TrackBreadth::Flex(f) => Some(f),
            _ => None,
        }
    }

    fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        if let Some((name, args)) = split_function(value) {
            let args = split_commas(args);
            return match name.to_ascii_lowercase().as_str() {
                "minmax" if args.len() == 2 => {
                    let min = TrackBreadth::parse(args[0], ctx)?;
                    let max = TrackBreadth::parse(args[1], ctx)?;
                    // "A <flex> value is not allowed as the minimum."
                    if matches!(min, TrackBreadth::Flex(_)) {
                        return None;
                    }
                    Some(Self::MinMax(min, max))
                }
                "fit-content" if args.len() == 1 => {
                    parse_length_percentage(args[0], ctx).map(Self::FitContent)
                }
                _ => None,
            };
        }
        TrackBreadth::parse(value, ctx).map(Self::Breadth)
    }
}

/// [§ 7.2.3.1 Syntax of repeat()](https://www.w3.org/TR/css-grid-1/#repeat-syntax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepeatCount {
    /// A fixed number of repetitions.
    Count(u32),
    /// As many as fit; empty repetitions keep their size.
    AutoFill,
    /// As many as fit; empty repetitions collapse.
    AutoFit,
}

/// One entry of an explicit track list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrackListEntry {
    /// A single track, with the line names before it.
    Track {
        /// `[names]` immediately before this track.
        names: Vec<String>,
        /// Sizing function.
        size: TrackSize,
    },
    /// `repeat(count, tracks)`.
    Repeat {
        /// Repetitions.
        count: RepeatCount,
        /// Repeated tracks, each with its leading names.
        tracks: Vec<(Vec<String>, TrackSize)>,
        /// Names after the last repeated track.
        trailing_names: Vec<String>,
    },
    /// Line names after the last track.
    TrailingNames(Vec<String>),
}

/// `grid-template-columns`/`grid-template-rows`: `none` is an empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrackList {
    /// Entries in order.
    pub entries: Vec<TrackListEntry>,
}

impl TrackList {
    /// True for `none`.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.entries.is_empty()
    }

    /// [§ 7.2 Explicit Track Sizing](https://www.w3.org/TR/css-grid-1/#track-sizing)
    ///
    /// Parse `none` or a track list.
    #[must_use]
    pub fn parse(value: &str, ctx: &ValueContext) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("none") {
            return Some(Self::default());
        }
        let mut entries = Vec::new();
        let mut names: Vec<String> = Vec::new();
        for part in split_components(value) {
            if let Some(list) = parse_line_names(part) {
                names.extend(list);
                continue;
            }
            if let Some((fname, args)) = split_function(part)
                && fname.eq_ignore_ascii_case("repeat")
            {
                let (count_text, body) = args.split_once(',')?;
                let count = match count_text.trim().to_ascii_lowercase().as_str() {
                    "auto-fill" => RepeatCount::AutoFill,
                    "auto-fit" => RepeatCount::AutoFit,
                    n => RepeatCount::Count(n.parse::<u32>().ok().filter(|&n| n > 0)?),
                };
                if !names.is_empty() {
                    entries.push(TrackListEntry::TrailingNames(std::mem::take(&mut names)));
                }
                let mut tracks = Vec::new();
                let mut inner_names = Vec::new();
                for inner in split_components(body) {
                    if let Some(list) = parse_line_names(inner) {
                        inner_names.extend(list);
                    } else {
                        tracks.push((std::mem::take(&mut inner_names), TrackSize::parse(inner, ctx)?));
                    }
                }
                if tracks.is_empty() {
                    return None;
                }
                entries.push(TrackListEntry::Repeat {
                    count,
                    tracks,
                    trailing_names: inner_names,
                });
                continue;
            }
            entries.push(TrackListEntry::Track {
                names: std::mem::take(&mut names),
                size: TrackSize::parse(part, ctx)?,
            });
        }
        if !names.is_empty() {
            entries.push(TrackListEntry::TrailingNames(names));
        }
        (!entries.is_empty()).then_some(Self { entries })
    }
}

/// Parse a list of track sizes (`grid-auto-rows`/`grid-auto-columns`).
#[must_use]
pub fn parse_track_sizes(value: &str, ctx: &ValueContext) -> Option<Vec<TrackSize>> {
    let sizes = split_components(value)
        .into_iter()
        .map(|v| TrackSize::parse(v, ctx))
        .collect::<Option<Vec<_>>>()?;
    (!sizes.is_empty()).then_some(sizes)
}

fn parse_line_names(value: &str) -> Option<Vec<String>> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.split_ascii_whitespace().map(str::to_string).collect())
}

/// [§ 8.3 Line-based Placement](https://www.w3.org/TR/css-grid-1/#line-placement)
///
/// A `grid-row-start`-style value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum GridLine {
    /// Automatic placement.
    #[default]
    Auto,
    /// A line number, negative counts from the end.
    Number(i32),
    /// The nth line with this name (or area edge), 1 for the first.
    Named(String, i32),
    /// `span n`
    Span(u32),
    /// `span name`
    NamedSpan(String, u32),
}

impl GridLine {
    /// True for `auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// True for either span form.
    #[must_use]
    pub const fn is_span(&self) -> bool {
        matches!(self, Self::Span(_) | Self::NamedSpan(..))
    }

    /// Parse one line value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let parts = split_components(value);
        let lower: Vec<String> = parts.iter().map(|p| p.to_ascii_lowercase()).collect();
        match lower.as_slice() {
            [a] if a == "auto" => Some(Self::Auto),
            [n] if parse_integer(n).is_some() => {
                parse_integer(n).filter(|&n| n != 0).map(Self::Number)
            }
            [_] => Some(Self::Named(parts[0].to_string(), 1)),
            [s, n] if s == "span" => match parse_integer(n) {
                Some(n) if n > 0 => Some(Self::Span(n.unsigned_abs())),
                Some(_) => None,
                None => Some(Self::NamedSpan(parts[1].to_string(), 1)),
            },
            [a, b] => match (parse_integer(a), parse_integer(b)) {
                (Some(n), None) if n != 0 => Some(Self::Named(parts[1].to_string(), n)),
                (None, Some(n)) if n != 0 => Some(Self::Named(parts[0].to_string(), n)),
                _ => None,
            },
            [s, a, b] if s == "span" => match (parse_integer(a), parse_integer(b)) {
                (Some(n), None) if n > 0 => Some(Self::NamedSpan(parts[2].to_string(), n.unsigned_abs())),
                (None, Some(n)) if n > 0 => Some(Self::NamedSpan(parts[1].to_string(), n.unsigned_abs())),
                _ => None,
            },
            _ => None,
        }
    }
}

/// [§ 7.3 Named Areas](https://www.w3.org/TR/css-grid-1/#grid-template-areas-property)
///
/// Rows of cell tokens; `None` marks a `.` null cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GridAreas {
    /// One entry per row, all rows have the same length.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Zero-based line indices of a named area: rows then columns, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AreaLines {
    /// First row line.
    pub row_start: usize,
    /// Row line after the area.
    pub row_end: usize,
    /// First column line.
    pub column_start: usize,
    /// Column line after the area.
    pub column_end: usize,
}

impl GridAreas {
    /// Parse `none` or a list of strings. Non-rectangular areas and ragged
    /// rows make the whole value invalid.
    #[must_use]
    pub fn parse(value: &str) -> Option<Option<Self>> {
        if value.trim().eq_ignore_ascii_case("none") {
            return Some(None);
        }
        let mut rows = Vec::new();
        for part in split_components(value) {
            let row_text = parse_string(part)?;
            let row: Vec<Option<String>> = row_text
                .split_ascii_whitespace()
                .map(|t| (!t.chars().all(|c| c == '.')).then(|| t.to_string()))
                .collect();
            if row.is_empty() {
                return None;
            }
            rows.push(row);
        }
        let width = rows.first()?.len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let areas = Self { rows };
        for name in areas.names() {
            let lines = areas.area(&name)?;
            for r in lines.row_start..lines.row_end {
                for c in lines.column_start..lines.column_end {
                    if areas.rows[r][c].as_deref() != Some(name.as_str()) {
                        return None;
                    }
                }
            }
        }
        Some(Some(areas))
    }

    /// Column count.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Area names in first-appearance order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for cell in self.rows.iter().flatten().flatten() {
            if !names.contains(cell) {
                names.push(cell.clone());
            }
        }
        names
    }

    /// The bounding lines of the area called `name`.
    #[must_use]
    pub fn area(&self, name: &str) -> Option<AreaLines> {
        let mut bounds: Option<AreaLines> = None;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.as_deref() == Some(name) {
                    let b = bounds.get_or_insert(AreaLines {
                        row_start: r,
                        row_end: r + 1,
                        column_start: c,
                        column_end: c + 1,
                    });
                    b.row_start = b.row_start.min(r);
                    b.row_end = b.row_end.max(r + 1);
                    b.column_start = b.column_start.min(c);
                    b.column_end = b.column_end.max(c + 1);
                }
            }
        }
        bounds
    }
}

/// [§ 7.7 'grid-auto-flow'](https://www.w3.org/TR/css-grid-1/#grid-auto-flow-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GridAutoFlow {
    /// Fill columns first instead of rows.
    pub column: bool,
    /// Backfill holes.
    pub dense: bool,
}

impl GridAutoFlow {
    /// Parse `[ row | column ] || dense`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let mut flow = Self::default();
        let mut seen_axis = false;
        for word in value.split_ascii_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "row" if !seen_axis => seen_axis = true,
                "column" if !seen_axis => {
                    seen_axis = true;
                    flow.column = true;
                }
                "dense" if !flow.dense => flow.dense = true,
                _ => return None,
            }
        }
        (seen_axis || flow.dense).then_some(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_list_with_repeat_and_names() {
        let ctx = ValueContext::default();
        let list = TrackList::parse("[a] 100px repeat(2, 1fr) [b] minmax(10px, auto)", &ctx).unwrap();
        assert_eq!(list.entries.len(), 3);
        assert_eq!(
            list.entries[0],
            TrackListEntry::Track {
                names: vec!["a".into()],
                size: TrackSize::Breadth(TrackBreadth::Length(100.0))
            }
        );
        assert!(matches!(list.entries[1], TrackListEntry::Repeat { count: RepeatCount::Count(2), .. }));
        assert_eq!(
            list.entries[2],
            TrackListEntry::Track {
                names: vec!["b".into()],
                size: TrackSize::MinMax(TrackBreadth::Length(10.0), TrackBreadth::Auto)
            }
        );
    }

    #[test]
    fn test_flex_min_is_rejected() {
        let ctx = ValueContext::default();
        assert!(TrackList::parse("minmax(1fr, 10px)", &ctx).is_none());
        assert_eq!(TrackSize::Breadth(TrackBreadth::Flex(2.0)).flex_factor(), Some(2.0));
        assert_eq!(TrackSize::Breadth(TrackBreadth::Flex(2.0)).min_function(), TrackBreadth::Auto);
    }

    #[test]
    fn test_grid_lines() {
        assert_eq!(GridLine::parse("2"), Some(GridLine::Number(2)));
        assert_eq!(GridLine::parse("span 3"), Some(GridLine::Span(3)));
        assert_eq!(GridLine::parse("header"), Some(GridLine::Named("header".into(), 1)));
        assert_eq!(GridLine::parse("span main"), Some(GridLine::NamedSpan("main".into(), 1)));
        assert_eq!(GridLine::parse("0"), None);
    }

    #[test]
    fn test_areas() {
        let areas = GridAreas::parse(r#""head head" "nav main""#).unwrap().unwrap();
        assert_eq!(
            areas.area("head"),
            Some(AreaLines {
                row_start: 0,
                row_end: 1,
                column_start: 0,
                column_end: 2
            })
        );
        assert!(GridAreas::parse(r#""a b" "b a""#).is_none());
        assert!(GridAreas::parse(r#""a" "b c""#).is_none());
    }

    #[test]
    fn test_auto_flow() {
        assert_eq!(
            GridAutoFlow::parse("column dense"),
            Some(GridAutoFlow {
                column: true,
                dense: true
            })
        );
        assert_eq!(GridAutoFlow::parse("row row"), None);
    }
}
