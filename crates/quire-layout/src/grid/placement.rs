//! Explicit grid construction and item placement.
//!
//! [§ 7 Defining the Grid](https://www.w3.org/TR/css-grid-1/#grid-definition)
//! [§ 8 Placing Grid Items](https://www.w3.org/TR/css-grid-1/#placement)

use std::ops::Range;

use quire_style::grid::{GridAreas, GridAutoFlow, GridLine, RepeatCount, TrackBreadth, TrackList, TrackListEntry, TrackSize};

/// The explicit tracks of one axis and the names of their lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitAxis {
    /// Sizing function of each explicit track.
    pub tracks: Vec<TrackSize>,
    /// Names of each line, `tracks.len() + 1` entries.
    pub names: Vec<Vec<String>>,
}

/// Fixed size of a track for counting automatic repetitions, if it has one.
fn fixed_size(size: TrackSize, basis: Option<f32>) -> Option<f32> {
    // "treating each track as its max track sizing function if that is
    // definite or as its minimum track sizing function otherwise"
    size.max_function()
        .resolve(basis)
        .or_else(|| size.min_function().resolve(basis))
}

impl ExplicitAxis {
    /// [§ 7.2 Explicit Track Sizing](https://www.w3.org/TR/css-grid-1/#explicit-grids)
    ///
    /// Expand `repeat()` and collect line names.
    #[must_use]
    pub fn from_list(list: &TrackList, available: Option<f32>, gap: f32) -> Self {
        let mut axis = Self::default();
        let mut pending: Vec<String> = Vec::new();
        for entry in &list.entries {
            match entry {
                TrackListEntry::Track { names, size } => {
                    pending.extend(names.iter().cloned());
                    axis.names.push(std::mem::take(&mut pending));
                    axis.tracks.push(*size);
                }
                TrackListEntry::Repeat {
                    count,
                    tracks,
                    trailing_names,
                } => {
                    let repetitions = match count {
                        RepeatCount::Count(n) => *n as usize,
                        RepeatCount::AutoFill | RepeatCount::AutoFit => {
                            auto_repetitions(list, tracks, available, gap)
                        }
                    };
                    for _ in 0..repetitions {
                        for (names, size) in tracks {
                            pending.extend(names.iter().cloned());
                            axis.names.push(std::mem::take(&mut pending));
                            axis.tracks.push(*size);
                        }
                        pending.extend(trailing_names.iter().cloned());
                    }
                }
                TrackListEntry::TrailingNames(names) => pending.extend(names.iter().cloned()),
            }
        }
        axis.names.push(pending);
        axis
    }

    /// Number of explicit lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.tracks.len() + 1
    }

    /// Grow the explicit grid to `count` tracks, sizing new ones from the
    /// implicit track sizes.
    fn extend_to(&mut self, count: usize, implicit: &[TrackSize]) {
        while self.tracks.len() < count {
            let size = implicit_size(implicit, self.tracks.len());
            self.tracks.push(size);
            self.names.push(Vec::new());
        }
    }

    /// [§ 7.3 Named Areas](https://www.w3.org/TR/css-grid-1/#grid-template-areas-property)
    ///
    /// "for each named grid area foo, four implicitly-assigned line names are
    /// created: two named foo-start, naming the row-start and column-start
    /// lines of the named grid area, and two named foo-end".
    fn add_area_names(&mut self, areas: &GridAreas, rows: bool) {
        for name in areas.names() {
            let Some(lines) = areas.area(&name) else {
                continue;
            };
            let (start, end) = if rows {
                (lines.row_start, lines.row_end)
            } else {
                (lines.column_start, lines.column_end)
            };
            if let Some(line) = self.names.get_mut(start) {
                line.push(format!("{name}-start"));
            }
            if let Some(line) = self.names.get_mut(end) {
                line.push(format!("{name}-end"));
            }
        }
    }

    /// Line index of the `nth` line called `name`, counting from the end
    /// when `nth` is negative.
    fn find(&self, name: &str, nth: i32) -> Option<usize> {
        let matching: Vec<usize> = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, names)| names.iter().any(|n| n == name))
            .map(|(i, _)| i)
            .collect();
        let n = nth.unsigned_abs() as usize;
        if n == 0 || n > matching.len() {
            return None;
        }
        if nth > 0 {
            Some(matching[n - 1])
        } else {
            Some(matching[matching.len() - n])
        }
    }
}

/// [§ 7.2.3.2 Repeat-to-fill](https://www.w3.org/TR/css-grid-1/#auto-repeat)
///
/// "the number of repetitions is the largest possible positive integer that
/// does not cause the grid to overflow the content box of its grid
/// container".
fn auto_repetitions(list: &TrackList, repeated: &[(Vec<String>, TrackSize)], available: Option<f32>, gap: f32) -> usize {
    let Some(available) = available else {
        return 1;
    };
    let mut others = 0.0;
    let mut other_count = 0;
    for entry in &list.entries {
        if let TrackListEntry::Track { size, .. } = entry {
            others += fixed_size(*size, Some(available)).unwrap_or(0.0);
            other_count += 1;
        }
    }
    let per_repetition: f32 = repeated
        .iter()
        .map(|(_, size)| fixed_size(*size, Some(available)).unwrap_or(0.0))
        .sum::<f32>()
        + gap * repeated.len() as f32;
    if per_repetition <= 0.0 {
        return 1;
    }
    // Gaps sit between tracks, so one gap is added back to the space.
    let free = available - others - gap * other_count as f32 + gap;
    ((free / per_repetition).floor() as usize).max(1)
}

/// Implicit track `index` cycles through the `grid-auto-*` sizes.
#[must_use]
pub fn implicit_size(implicit: &[TrackSize], index: usize) -> TrackSize {
    if implicit.is_empty() {
        TrackSize::AUTO
    } else {
        implicit[index % implicit.len()]
    }
}

/// The explicit grid of a container: rows and columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitGrid {
    /// Row axis.
    pub rows: ExplicitAxis,
    /// Column axis.
    pub columns: ExplicitAxis,
}

impl ExplicitGrid {
    /// [§ 7.1 The Explicit Grid](https://www.w3.org/TR/css-grid-1/#explicit-grids)
    ///
    /// "The size of the explicit grid is determined by the larger of the
    /// number of rows/columns defined by grid-template-areas and the number
    /// of rows/columns sized by grid-template-rows/grid-template-columns."
    #[must_use]
    pub fn new(
        rows: &TrackList,
        columns: &TrackList,
        areas: Option<&GridAreas>,
        auto_rows: &[TrackSize],
        auto_columns: &[TrackSize],
        available: (Option<f32>, Option<f32>),
        gaps: (f32, f32),
    ) -> Self {
        let mut grid = Self {
            rows: ExplicitAxis::from_list(rows, available.1, gaps.1),
            columns: ExplicitAxis::from_list(columns, available.0, gaps.0),
        };
        if let Some(areas) = areas {
            grid.rows.extend_to(areas.rows.len(), auto_rows);
            grid.columns.extend_to(areas.column_count(), auto_columns);
            grid.rows.add_area_names(areas, true);
            grid.columns.add_area_names(areas, false);
        }
        grid
    }
}

/// Placement of an item on one axis before auto-placement.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AxisPlacement {
    Definite(Range<usize>),
    Auto(usize),
}

/// [§ 8.3 Line-based Placement](https://www.w3.org/TR/css-grid-1/#line-placement)
///
/// Resolve a line to a line index of the grid, counting implicit lines
/// before the explicit grid as negative.
fn resolve_line(axis: &ExplicitAxis, line: &GridLine, suffix: &str) -> Option<i64> {
    let explicit = axis.line_count() as i64;
    match line {
        // "If a negative integer is given, it instead counts in reverse,
        // starting from the end edge of the explicit grid."
        GridLine::Number(n) if *n > 0 => Some(i64::from(*n) - 1),
        GridLine::Number(n) if *n < 0 => Some(explicit + i64::from(*n)),
        GridLine::Named(name, nth) => {
            // "If there is a named line with the name '<custom-ident>-start'
            // (for grid-*-start) / '<custom-ident>-end' (for grid-*-end),
            // contributes the first such line to the grid item's placement."
            let nth = if *nth == 0 { 1 } else { *nth };
            if let Some(index) = axis.find(name, nth).or_else(|| axis.find(&format!("{name}-{suffix}"), nth)) {
                return Some(index as i64);
            }
            // "If not enough lines with that name exist, all implicit grid
            // lines on the side of the explicit grid corresponding to the
            // search direction are assumed to have that name".
            let found = axis.names.iter().filter(|n| n.iter().any(|n| n == name)).count() as i64;
            if nth > 0 {
                Some(explicit - 1 + i64::from(nth) - found)
            } else {
                Some(i64::from(nth) + found)
            }
        }
        _ => None,
    }
}

fn span_of(line: &GridLine) -> Option<usize> {
    match line {
        GridLine::Span(n) | GridLine::NamedSpan(_, n) => Some((*n).max(1) as usize),
        _ => None,
    }
}

/// Span from a definite line toward the other side, honoring named spans.
fn span_from(axis: &ExplicitAxis, line: &GridLine, from: i64, forward: bool) -> i64 {
    match line {
        GridLine::NamedSpan(name, n) => {
            let mut hits = 0;
            let mut index = from;
            let last = axis.line_count() as i64 - 1;
            while (forward && index < last) || (!forward && index > 0) {
                index += if forward { 1 } else { -1 };
                let named = usize::try_from(index)
                    .ok()
                    .and_then(|i| axis.names.get(i))
                    .is_some_and(|names| names.iter().any(|n| n == name));
                if named {
                    hits += 1;
                    if hits == *n {
                        return (index - from).abs();
                    }
                }
            }
            // Implicit lines beyond the grid carry every name.
            (index - from).abs() + i64::from(n - hits)
        }
        other => span_of(other).unwrap_or(1) as i64,
    }
}

/// Placement on one axis, with line indices shifted by `offset` so that
/// implicit lines before the explicit grid stay non-negative.
fn resolve_axis(axis: &ExplicitAxis, start: &GridLine, end: &GridLine) -> (Option<(i64, i64)>, usize) {
    let s = resolve_line(axis, start, "start");
    let e = resolve_line(axis, end, "end");
    let range = match (s, e) {
        // "If the placement for a grid item contains two lines, and the
        // start line is further end-ward than the end line, swap the two
        // lines. If the start line is equal to the end line, remove the end
        // line."
        (Some(s), Some(e)) if e > s => Some((s, e)),
        (Some(s), Some(e)) if s > e => Some((e, s)),
        (Some(s), Some(_)) => Some((s, s + 1)),
        (Some(s), None) => Some((s, s + span_from(axis, end, s, true))),
        (None, Some(e)) => Some((e - span_from(axis, start, e, false), e)),
        (None, None) => None,
    };
    // "If the placement contains two spans, remove the one contributed by
    // the end grid-placement property."
    let span = span_of(start).or_else(|| span_of(end)).unwrap_or(1);
    (range, span)
}

/// The grid area of a placed item, in track indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    /// Row tracks.
    pub rows: Range<usize>,
    /// Column tracks.
    pub columns: Range<usize>,
}

/// The placement properties of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lines {
    /// `grid-row-start`
    pub row_start: GridLine,
    /// `grid-row-end`
    pub row_end: GridLine,
    /// `grid-column-start`
    pub column_start: GridLine,
    /// `grid-column-end`
    pub column_end: GridLine,
}

/// Result of placing every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Area of each item, in the order given.
    pub areas: Vec<Area>,
    /// Implicit tracks added before the explicit rows.
    pub leading_rows: usize,
    /// Implicit tracks added before the explicit columns.
    pub leading_columns: usize,
    /// Total row tracks.
    pub row_count: usize,
    /// Total column tracks.
    pub column_count: usize,
}

/// Cells taken so far, indexed as `[major][minor]`.
struct Occupancy {
    minor: usize,
    cells: Vec<Vec<bool>>,
}

impl Occupancy {
    fn fits(&self, major: &Range<usize>, minor: &Range<usize>) -> bool {
        if minor.end > self.minor {
            return false;
        }
        major.clone().all(|m| {
            self.cells
                .get(m)
                .is_none_or(|row| minor.clone().all(|c| !row.get(c).copied().unwrap_or(false)))
        })
    }

    fn mark(&mut self, major: &Range<usize>, minor: &Range<usize>) {
        if self.cells.len() < major.end {
            self.cells.resize(major.end, Vec::new());
        }
        self.minor = self.minor.max(minor.end);
        for row in &mut self.cells[major.clone()] {
            if row.len() < minor.end {
                row.resize(minor.end, false);
            }
            for cell in &mut row[minor.clone()] {
                *cell = true;
            }
        }
    }
}

/// [§ 8.5 Grid Item Placement Algorithm](https://www.w3.org/TR/css-grid-1/#auto-placement-algo)
///
/// Place items given in order-modified document order.
#[must_use]
pub fn place_items(grid: &ExplicitGrid, items: &[Lines], flow: GridAutoFlow) -> Placement {
    // STEP 0: Resolve definite lines and find the implicit tracks needed
    // before the explicit grid.
    let resolved: Vec<_> = items
        .iter()
        .map(|lines| {
            (
                resolve_axis(&grid.rows, &lines.row_start, &lines.row_end),
                resolve_axis(&grid.columns, &lines.column_start, &lines.column_end),
            )
        })
        .collect();
    let before = |starts: &mut dyn Iterator<Item = i64>| starts.map(|s| (-s).max(0) as usize).max().unwrap_or(0);
    let leading_rows = before(&mut resolved.iter().filter_map(|(rows, _)| rows.0.map(|(s, _)| s)));
    let leading_columns = before(&mut resolved.iter().filter_map(|(_, columns)| columns.0.map(|(s, _)| s)));
    let to_range = |range: (i64, i64), shift: usize| -> Range<usize> {
        let start = (range.0 + shift as i64).max(0) as usize;
        let end = ((range.1 + shift as i64).max(0) as usize).max(start + 1);
        start..end
    };
    let placements: Vec<(AxisPlacement, AxisPlacement)> = resolved
        .iter()
        .map(|(rows, columns)| {
            let row = match rows.0 {
                Some(range) => AxisPlacement::Definite(to_range(range, leading_rows)),
                None => AxisPlacement::Auto(rows.1),
            };
            let column = match columns.0 {
                Some(range) => AxisPlacement::Definite(to_range(range, leading_columns)),
                None => AxisPlacement::Auto(columns.1),
            };
            (row, column)
        })
        .collect();

    // Work in major (the flow direction's track) and minor axes.
    let (major_explicit, minor_explicit) = if flow.column {
        (grid.columns.tracks.len() + leading_columns, grid.rows.tracks.len() + leading_rows)
    } else {
        (grid.rows.tracks.len() + leading_rows, grid.columns.tracks.len() + leading_columns)
    };
    let axes: Vec<(AxisPlacement, AxisPlacement)> = placements
        .into_iter()
        .map(|(row, column)| if flow.column { (column, row) } else { (row, column) })
        .collect();

    // "the number of columns in the implicit grid" is fixed before placing
    // auto items: the largest of the explicit count, definite column
    // positions and auto spans.
    let minor_count = axes
        .iter()
        .map(|(_, minor)| match minor {
            AxisPlacement::Definite(range) => range.end,
            AxisPlacement::Auto(span) => *span,
        })
        .fold(minor_explicit.max(1), usize::max);
    let mut occupancy = Occupancy {
        minor: minor_count,
        cells: Vec::new(),
    };
    let mut placed: Vec<Option<(Range<usize>, Range<usize>)>> = vec![None; axes.len()];

    // STEP 1: "Process the items locked to a given row." Items with both
    // axes definite go first.
    for (i, (major, minor)) in axes.iter().enumerate() {
        if let (AxisPlacement::Definite(major), AxisPlacement::Definite(minor)) = (major, minor) {
            occupancy.mark(major, minor);
            placed[i] = Some((major.clone(), minor.clone()));
        }
    }
    let mut row_cursors: Vec<usize> = Vec::new();
    for (i, (major, minor)) in axes.iter().enumerate() {
        let (AxisPlacement::Definite(major), AxisPlacement::Auto(span)) = (major, minor) else {
            continue;
        };
        // "Set the column-start line of its placement to the earliest
        // (smallest positive index) line index that ensures this item's grid
        // area will not overlap any occupied grid cells and that is past any
        // grid items previously placed in this row by this step."
        let mut column = if flow.dense {
            0
        } else {
            row_cursors.get(major.start).copied().unwrap_or(0)
        };
        let minor = loop {
            let minor = column..column + span;
            occupancy.minor = occupancy.minor.max(minor.end);
            if occupancy.fits(major, &minor) {
                break minor;
            }
            column += 1;
        };
        occupancy.mark(major, &minor);
        if row_cursors.len() <= major.start {
            row_cursors.resize(major.start + 1, 0);
        }
        row_cursors[major.start] = minor.end;
        placed[i] = Some((major.clone(), minor));
    }

    // STEP 4: "Position the remaining grid items." The cursor starts at the
    // start-most row and column.
    let mut cursor = (0_usize, 0_usize);
    for (i, (major, minor)) in axes.iter().enumerate() {
        if placed[i].is_some() {
            continue;
        }
        let AxisPlacement::Auto(major_span) = major else {
            continue;
        };
        if flow.dense {
            cursor = (0, 0);
        }
        let area = match minor {
            // "If the item has a definite column position: Set the column
            // position of the cursor to the grid item's column-start line. If
            // this is less than the previous column position of the cursor,
            // increment the row position by 1."
            AxisPlacement::Definite(minor) => {
                if minor.start < cursor.1 {
                    cursor.0 += 1;
                }
                cursor.1 = minor.start;
                while !occupancy.fits(&(cursor.0..cursor.0 + major_span), minor) {
                    cursor.0 += 1;
                }
                (cursor.0..cursor.0 + major_span, minor.clone())
            }
            // "If the item has an automatic grid position in both axes:
            // Increment the column position of the auto-placement cursor
            // until either this item's grid area does not overlap any occupied
            // grid cells, or the cursor's column position, plus the item's
            // column span, overflow the number of columns in the implicit
            // grid".
            AxisPlacement::Auto(minor_span) => loop {
                let major = cursor.0..cursor.0 + major_span;
                let minor = cursor.1..cursor.1 + minor_span;
                if occupancy.fits(&major, &minor) {
                    break (major, minor);
                }
                if minor.end >= occupancy.minor {
                    cursor = (cursor.0 + 1, 0);
                } else {
                    cursor.1 += 1;
                }
            },
        };
        occupancy.mark(&area.0, &area.1);
        cursor.1 = area.1.end;
        placed[i] = Some(area);
    }

    let major_count = placed
        .iter()
        .flatten()
        .map(|(major, _)| major.end)
        .fold(major_explicit, usize::max);
    let minor_total = occupancy.minor.max(minor_explicit);
    let areas: Vec<Area> = placed
        .into_iter()
        .map(|area| {
            let (major, minor) = area.unwrap_or((0..1, 0..1));
            if flow.column {
                Area { rows: minor, columns: major }
            } else {
                Area { rows: major, columns: minor }
            }
        })
        .collect();
    let (row_count, column_count) = if flow.column {
        (minor_total, major_count)
    } else {
        (major_count, minor_total)
    };

    #[cfg(feature = "layout-trace")]
    log::trace!("[GRID] placed {} items in {row_count}x{column_count} tracks", areas.len());

    Placement {
        areas,
        leading_rows,
        leading_columns,
        row_count,
        column_count,
    }
}

/// Sizing functions of every track of an axis: implicit tracks before the
/// explicit grid, the explicit tracks, then implicit tracks after it.
#[must_use]
pub fn track_sizes(axis: &ExplicitAxis, implicit: &[TrackSize], leading: usize, count: usize) -> Vec<TrackSize> {
    let mut sizes = Vec::with_capacity(count);
    // "If there are multiple track sizes, the pattern is repeated as
    // necessary"; before the explicit grid it repeats backwards.
    for i in 0..leading {
        let back = leading - i;
        let size = if implicit.is_empty() {
            TrackSize::AUTO
        } else {
            implicit[(implicit.len() - back % implicit.len()) % implicit.len()]
        };
        sizes.push(size);
    }
    sizes.extend(axis.tracks.iter().copied());
    let mut index = 0;
    while sizes.len() < count {
        sizes.push(implicit_size(implicit, index));
        index += 1;
    }
    sizes
}

/// Whether a track is sized by its content at all.
#[must_use]
pub const fn is_intrinsic(breadth: TrackBreadth) -> bool {
    matches!(breadth, TrackBreadth::MinContent | TrackBreadth::MaxContent | TrackBreadth::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(row: (GridLine, GridLine), column: (GridLine, GridLine)) -> Lines {
        Lines {
            row_start: row.0,
            row_end: row.1,
            column_start: column.0,
            column_end: column.1,
        }
    }

    fn auto() -> Lines {
        lines((GridLine::Auto, GridLine::Auto), (GridLine::Auto, GridLine::Auto))
    }

    fn fixed_list(count: usize) -> TrackList {
        TrackList {
            entries: (0..count)
                .map(|_| TrackListEntry::Track {
                    names: Vec::new(),
                    size: TrackSize::Breadth(TrackBreadth::Length(10.0)),
                })
                .collect(),
        }
    }

    fn grid(columns: usize) -> ExplicitGrid {
        ExplicitGrid::new(&TrackList::default(), &fixed_list(columns), None, &[], &[], (None, None), (0.0, 0.0))
    }

    #[test]
    fn test_auto_items_fill_rows() {
        let placement = place_items(&grid(2), &[auto(), auto(), auto()], GridAutoFlow::default());
        let areas: Vec<(usize, usize)> = placement.areas.iter().map(|a| (a.rows.start, a.columns.start)).collect();
        assert_eq!(areas, vec![(0, 0), (0, 1), (1, 0)]);
        assert_eq!((placement.row_count, placement.column_count), (2, 2));
    }

    #[test]
    fn test_definite_items_are_avoided() {
        let fixed = lines(
            (GridLine::Number(1), GridLine::Auto),
            (GridLine::Number(1), GridLine::Span(2)),
        );
        let placement = place_items(&grid(2), &[auto(), fixed], GridAutoFlow::default());
        assert_eq!(placement.areas[0], Area { rows: 1..2, columns: 0..1 });
        assert_eq!(placement.areas[1], Area { rows: 0..1, columns: 0..2 });
    }

    #[test]
    fn test_dense_backfills_holes() {
        let wide = lines((GridLine::Auto, GridLine::Auto), (GridLine::Span(2), GridLine::Auto));
        let items = [auto(), wide, auto()];
        let sparse = place_items(&grid(2), &items, GridAutoFlow::default());
        assert_eq!(sparse.areas[2], Area { rows: 2..3, columns: 0..1 });
        let dense = place_items(
            &grid(2),
            &items,
            GridAutoFlow {
                column: false,
                dense: true,
            },
        );
        assert_eq!(dense.areas[2], Area { rows: 0..1, columns: 1..2 });
    }

    #[test]
    fn test_column_flow() {
        let rows = fixed_list(2);
        let grid = ExplicitGrid::new(&rows, &TrackList::default(), None, &[], &[], (None, None), (0.0, 0.0));
        let flow = GridAutoFlow {
            column: true,
            dense: false,
        };
        let placement = place_items(&grid, &[auto(), auto(), auto()], flow);
        let areas: Vec<(usize, usize)> = placement.areas.iter().map(|a| (a.rows.start, a.columns.start)).collect();
        assert_eq!(areas, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn test_negative_lines_count_from_end() {
        let last = lines(
            (GridLine::Auto, GridLine::Auto),
            (GridLine::Number(-2), GridLine::Number(-1)),
        );
        let placement = place_items(&grid(3), &[last], GridAutoFlow::default());
        assert_eq!(placement.areas[0].columns, 2..3);
    }

    #[test]
    fn test_lines_before_explicit_grid_add_leading_tracks() {
        let before = lines(
            (GridLine::Auto, GridLine::Auto),
            (GridLine::Number(-5), GridLine::Span(1)),
        );
        let placement = place_items(&grid(2), &[before], GridAutoFlow::default());
        assert_eq!(placement.leading_columns, 2);
        assert_eq!(placement.areas[0].columns, 0..1);
        assert_eq!(placement.column_count, 4);
    }

    #[test]
    fn test_named_areas() {
        let areas = GridAreas {
            rows: vec![
                vec![Some("head".to_string()), Some("head".to_string())],
                vec![Some("side".to_string()), Some("main".to_string())],
            ],
        };
        let grid = ExplicitGrid::new(
            &TrackList::default(),
            &TrackList::default(),
            Some(&areas),
            &[],
            &[],
            (None, None),
            (0.0, 0.0),
        );
        let named = |name: &str| {
            lines(
                (GridLine::Named(name.to_string(), 1), GridLine::Named(name.to_string(), 1)),
                (GridLine::Named(name.to_string(), 1), GridLine::Named(name.to_string(), 1)),
            )
        };
        let placement = place_items(&grid, &[named("main"), named("head")], GridAutoFlow::default());
        assert_eq!(placement.areas[0], Area { rows: 1..2, columns: 1..2 });
        assert_eq!(placement.areas[1], Area { rows: 0..1, columns: 0..2 });
    }

    #[test]
    fn test_auto_fill_repetitions() {
        let list = TrackList {
            entries: vec![TrackListEntry::Repeat {
                count: RepeatCount::AutoFill,
                tracks: vec![(Vec::new(), TrackSize::Breadth(TrackBreadth::Length(30.0)))],
                trailing_names: Vec::new(),
            }],
        };
        let axis = ExplicitAxis::from_list(&list, Some(90.0), 5.0);
        assert_eq!(axis.tracks.len(), 2);
        assert_eq!(axis.names.len(), 3);
    }
}
