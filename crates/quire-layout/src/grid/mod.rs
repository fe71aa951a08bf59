//! Grid layout.
//!
//! [CSS Grid Layout Module Level 1](https://www.w3.org/TR/css-grid-1/)
//!
//! Items are placed on the grid, column tracks are sized from the items'
//! preferred widths and row tracks from their heights at those column
//! widths. Each item is then laid out in its grid area and aligned there.
//!
//! A grid breaks between rows where no item spans the break. A row that
//! does not fit on an empty fragmentainer is split: its items continue on
//! the next one, and the rows after it follow them.

mod placement;
mod tracks;

use std::ops::Range;

use quire_style::ComputedStyle;
use quire_style::grid::TrackSize;
use quire_style::keywords::{Alignment, ContentDistribution, Direction};
use quire_style::values::{LengthPercentageAuto, Size};

use crate::block::{
    BodyOutcome, Containing, Frame, Slot, WidthMode, height_bounds, layout_block_level, layout_detached, placeholder,
};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::flex::{distribute, gap};
use crate::float::FloatContext;
use crate::geometry::clamp_size;
use crate::options::EPSILON;
use crate::preferred;
use crate::resume::{FlowInput, FlowOutcome, LayoutResult, ResumePoint};

use placement::{Area, ExplicitGrid, Lines, Placement, place_items, track_sizes};
use tracks::{Contribution, Space, size_tracks};

impl Lines {
    /// The placement properties of a style.
    fn of(style: &ComputedStyle) -> Self {
        Self {
            row_start: style.grid_row_start.clone(),
            row_end: style.grid_row_end.clone(),
            column_start: style.grid_column_start.clone(),
            column_end: style.grid_column_end.clone(),
        }
    }
}

/// [§ 6.2 Grid Item Sizing](https://www.w3.org/TR/css-grid-1/#grid-item-sizing)
///
/// "normal: ... behaves as stretch for grid items without a preferred aspect
/// ratio, and start otherwise."
fn self_alignment(container: Alignment, own: Alignment, replaced: bool) -> Alignment {
    let align = if own == Alignment::Auto { container } else { own };
    match align {
        Alignment::Auto | Alignment::Normal if replaced => Alignment::Start,
        Alignment::Auto | Alignment::Normal => Alignment::Stretch,
        other => other,
    }
}

/// Offset of a box in `free` space: auto margins first, then the
/// alignment keyword.
///
/// [§ 6.4 Aligning with auto margins](https://www.w3.org/TR/css-align-3/#auto-margins)
fn align_offset(align: Alignment, free: f32, auto_start: bool, auto_end: bool) -> f32 {
    match (auto_start, auto_end) {
        (true, true) if free > 0.0 => free / 2.0,
        (true, false) if free > 0.0 => free,
        (false, true) => 0.0,
        _ => match align {
            Alignment::End | Alignment::FlexEnd | Alignment::SelfEnd | Alignment::Right => free,
            Alignment::Center => free / 2.0,
            _ => 0.0,
        },
    }
}

/// Start of each track, with `spacing` between tracks.
fn track_starts(sizes: &[f32], spacing: f32, offset: f32) -> Vec<f32> {
    let mut starts = Vec::with_capacity(sizes.len());
    let mut cursor = offset;
    for size in sizes {
        starts.push(cursor);
        cursor += size + spacing;
    }
    starts
}

/// Start and size of the area spanning `span`.
fn span_extent(sizes: &[f32], starts: &[f32], span: &Range<usize>) -> (f32, f32) {
    let start = starts.get(span.start).copied().unwrap_or(0.0);
    let last = span.end.saturating_sub(1).max(span.start);
    let end = starts.get(last).copied().unwrap_or(start) + sizes.get(last).copied().unwrap_or(0.0);
    (start, (end - start).max(0.0))
}

/// [§ 10.5 Aligning the Grid](https://www.w3.org/TR/css-grid-1/#grid-align)
///
/// Offset of the first track and extra spacing between tracks.
fn content_offsets(distribution: ContentDistribution, size: f32, tracks: &[f32], gap: f32) -> (f32, f32) {
    let used = tracks.iter().sum::<f32>() + gap * tracks.len().saturating_sub(1) as f32;
    distribute(distribution, size - used, tracks.len())
}

/// A placed item and how it sits in its area.
struct GridItem<'a> {
    source: &'a LayoutBox,
    /// Position in order-modified document order.
    index: usize,
    area: Area,
    justify: Alignment,
    align: Alignment,
}

impl GridItem<'_> {
    /// [§ 11.3 step 2](https://www.w3.org/TR/css-grid-1/#algo-overview)
    ///
    /// Width mode inside an area: stretched items fill it, others shrink to
    /// fit.
    fn width_mode(&self) -> WidthMode {
        let style = &self.source.style;
        let auto_margin = style.margin.left == LengthPercentageAuto::Auto || style.margin.right == LengthPercentageAuto::Auto;
        if self.justify == Alignment::Stretch && style.width == Size::Auto && !auto_margin {
            WidthMode::Fill
        } else {
            WidthMode::ShrinkToFit
        }
    }

    fn stretches_vertically(&self) -> bool {
        let style = &self.source.style;
        self.align == Alignment::Stretch
            && style.height == Size::Auto
            && style.margin.top != LengthPercentageAuto::Auto
            && style.margin.bottom != LengthPercentageAuto::Auto
    }
}

/// Resolved geometry of a grid for one layout.
struct Tracks {
    columns: Vec<f32>,
    column_starts: Vec<f32>,
    rows: Vec<f32>,
    row_starts: Vec<f32>,
    row_gap: f32,
}

impl Tracks {
    fn column_extent(&self, span: &Range<usize>) -> (f32, f32) {
        span_extent(&self.columns, &self.column_starts, span)
    }

    fn row_extent(&self, span: &Range<usize>) -> (f32, f32) {
        span_extent(&self.rows, &self.row_starts, span)
    }
}

/// Collect the in-flow items in order-modified document order and place
/// them.
fn place<'a>(b: &'a LayoutBox, width: Option<f32>, height: Option<f32>) -> (ExplicitGrid, Placement, Vec<&'a LayoutBox>) {
    let style = &b.style;
    let mut sources: Vec<&LayoutBox> = b.children.iter().filter(|c| !c.is_absolutely_positioned()).collect();
    // [§ 5.4 Reordered Grid Items](https://www.w3.org/TR/css-grid-1/#order-property)
    sources.sort_by_key(|c| c.style.order);
    let grid = ExplicitGrid::new(
        &style.grid_template_rows,
        &style.grid_template_columns,
        style.grid_template_areas.as_ref(),
        &style.grid_auto_rows,
        &style.grid_auto_columns,
        (width, height),
        (gap(style.column_gap, width), gap(style.row_gap, height)),
    );
    let lines: Vec<Lines> = sources.iter().map(|s| Lines::of(&s.style)).collect();
    let placement = place_items(&grid, &lines, style.grid_auto_flow);
    (grid, placement, sources)
}

/// Sizing functions of every column and row track.
fn all_track_sizes(
    style: &ComputedStyle,
    grid: &ExplicitGrid,
    placement: &Placement,
) -> (Vec<TrackSize>, Vec<TrackSize>) {
    (
        track_sizes(
            &grid.columns,
            &style.grid_auto_columns,
            placement.leading_columns,
            placement.column_count,
        ),
        track_sizes(&grid.rows, &style.grid_auto_rows, placement.leading_rows, placement.row_count),
    )
}

/// Rows that may be split from the rows after them: a break is possible
/// before row `r` when no item spans across that line.
fn bands(areas: &[Area], row_count: usize) -> Vec<Range<usize>> {
    let mut bands = Vec::new();
    let mut start = 0;
    for line in 1..=row_count {
        let crossed = areas.iter().any(|a| a.rows.start < line && line < a.rows.end);
        if !crossed {
            bands.push(start..line);
            start = line;
        }
    }
    bands
}

/// Lay out an item in its area at the origin.
fn lay_out_item(ctx: &mut LayoutContext<'_>, item: &GridItem<'_>, area: Containing) -> LayoutBox {
    let fragment = layout_detached(ctx, item.source, area, item.width_mode(), None);
    let Some(area_height) = area.height else {
        return fragment;
    };
    if !item.stretches_vertically() {
        return fragment;
    }
    // "stretch: ... the item's ... size is set so that the size of its
    // margin box is equal to the size of the alignment container".
    let margins = fragment.margin.vertical();
    let edges = fragment.border.vertical() + fragment.padding.vertical();
    let (min, max) = height_bounds(&item.source.style, Some(area_height), edges);
    let stretched = clamp_size(area_height - margins - edges, min, max).max(0.0);
    if (stretched - fragment.height).abs() <= EPSILON {
        return fragment;
    }
    let width = WidthMode::Definite(fragment.width);
    layout_detached(ctx, item.source, area, width, Some(stretched))
}

/// [§ 11 Grid Sizing](https://www.w3.org/TR/css-grid-1/#layout-algorithm)
///
/// Lay out one fragment of a grid container.
pub fn layout_grid(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot, input: FlowInput<'_>) -> FlowOutcome {
    let style = &b.style;
    let resuming = input.resume.is_some();
    let rtl = style.direction == Direction::Rtl;

    // STEP 1: Resolve the container's own box, as for a block.
    let frame = Frame::open(ctx, b, slot, &input);
    let width = frame.horizontal.width;
    let (content_x, content_y) = (frame.content_x, frame.content_y);
    let column_gap = gap(style.column_gap, Some(width));
    let row_gap = gap(style.row_gap, frame.height);

    // [§ 9 Absolute Positioning](https://www.w3.org/TR/css-grid-1/#abspos)
    let mut children = Vec::new();
    if !resuming {
        for child in b.children.iter().filter(|c| c.is_absolutely_positioned()) {
            children.push(placeholder(child, content_x, content_y));
            ctx.register_absolute(child);
        }
    }

    // STEP 2: Place the items.
    let (grid, placement, sources) = place(b, Some(width), frame.height);
    let (column_sizes, row_sizes) = all_track_sizes(style, &grid, &placement);
    let items: Vec<GridItem<'_>> = sources
        .iter()
        .zip(&placement.areas)
        .enumerate()
        .map(|(index, (source, area))| {
            let replaced = matches!(source.kind, BoxKind::Replaced(_));
            GridItem {
                source,
                index,
                area: area.clone(),
                justify: self_alignment(style.justify_items, source.style.justify_self, replaced),
                align: self_alignment(style.align_items, source.style.align_self, replaced),
            }
        })
        .collect();

    // STEP 3: Size the columns.
    //
    // [§ 11.3 step 1](https://www.w3.org/TR/css-grid-1/#algo-overview)
    // "First, the track sizing algorithm is used to resolve the sizes of the
    // grid columns."
    let column_contributions: Vec<Contribution> = items
        .iter()
        .map(|item| {
            let (min, max) = preferred::outer_widths(ctx, item.source);
            Contribution {
                span: item.area.columns.clone(),
                min,
                max,
            }
        })
        .collect();
    let stretch_columns = matches!(style.justify_content, ContentDistribution::Normal | ContentDistribution::Stretch);
    let columns = size_tracks(
        ctx,
        &column_sizes,
        &column_contributions,
        Space::Definite(width),
        column_gap,
        stretch_columns,
    );
    let (column_offset, column_spacing) = content_offsets(style.justify_content, width, &columns, column_gap);
    let column_starts = track_starts(&columns, column_gap + column_spacing, column_offset);

    // STEP 4: Size the rows from the items' heights at their column widths.
    //
    // "Next, the track sizing algorithm resolves the sizes of the grid rows."
    // Measuring lays items out; whatever they register is dropped.
    let checkpoint = ctx.checkpoint();
    let row_contributions: Vec<Contribution> = items
        .iter()
        .map(|item| {
            let (_, area_width) = span_extent(&columns, &column_starts, &item.area.columns);
            let area = Containing {
                width: area_width,
                height: None,
            };
            let fragment = layout_detached(ctx, item.source, area, item.width_mode(), None);
            let outer = fragment.margin_box().height;
            Contribution {
                span: item.area.rows.clone(),
                min: outer,
                max: outer,
            }
        })
        .collect();
    ctx.rollback(checkpoint);
    let stretch_rows = matches!(style.align_content, ContentDistribution::Normal | ContentDistribution::Stretch);
    let row_space = frame.height.map_or(Space::MaxContent, Space::Definite);
    let rows = size_tracks(ctx, &row_sizes, &row_contributions, row_space, row_gap, stretch_rows);
    let (row_offset, row_spacing) = match frame.height {
        Some(height) => content_offsets(style.align_content, height, &rows, row_gap),
        None => (0.0, 0.0),
    };
    let row_starts = track_starts(&rows, row_gap + row_spacing, row_offset);
    let tracks = Tracks {
        columns,
        column_starts,
        rows,
        row_starts,
        row_gap: row_gap + row_spacing,
    };

    // STEP 5: Lay out the items of each band of rows that fits.
    //
    // [§ 12 Fragmenting Grid Layout](https://www.w3.org/TR/css-grid-1/#pagination)
    let monolithic = frame.height.is_some();
    let limit = if monolithic {
        f32::INFINITY
    } else {
        frame.content_limit(ctx, &input)
    };
    let (start_row, carried) = match input.resume {
        Some(ResumePoint::GridRow { row, items }) => (*row, items.clone()),
        _ => (0, Vec::new()),
    };
    let place_item = |ctx: &mut LayoutContext<'_>, item: &GridItem<'_>, top: f32| -> LayoutBox {
        let (x, area_width) = tracks.column_extent(&item.area.columns);
        let (_, area_height) = tracks.row_extent(&item.area.rows);
        let area = Containing {
            width: area_width,
            height: Some(area_height),
        };
        let mut fragment = lay_out_item(ctx, item, area);
        let style = &item.source.style;
        let outer = fragment.margin_box();
        let dx = align_offset(
            item.justify,
            area_width - outer.width,
            style.margin.left == LengthPercentageAuto::Auto,
            style.margin.right == LengthPercentageAuto::Auto,
        );
        let dy = align_offset(
            item.align,
            area_height - outer.height,
            style.margin.top == LengthPercentageAuto::Auto,
            style.margin.bottom == LengthPercentageAuto::Auto,
        );
        // [§ 10.1](https://www.w3.org/TR/css-grid-1/#grid-align) Columns run
        // from the inline start edge.
        let left = if rtl { width - x - dx - outer.width } else { x + dx };
        let margin = fragment.margin;
        fragment.place_border_box(content_x + left + margin.left, top + dy + margin.top, margin);
        fragment
    };

    let mut placed: Vec<LayoutBox> = Vec::new();
    let mut y = content_y;
    let mut bottom = content_y;
    let mut resume: Option<ResumePoint> = None;
    let mut placed_rows = false;
    let mut first_band = start_row;

    // A row split on the previous fragment: its items continue at the top.
    if !carried.is_empty() {
        let mut still: Vec<(usize, ResumePoint)> = Vec::new();
        for (index, inner) in &carried {
            let Some(item) = items.get(*index) else {
                continue;
            };
            let (fragment, rest) = split_item(ctx, item, &tracks, (content_x, y), limit, Some(inner), rtl, width);
            bottom = bottom.max(fragment.margin_box().bottom());
            placed.push(fragment);
            if let Some(rest) = rest {
                still.push((*index, rest));
            }
        }
        placed_rows = true;
        if still.is_empty() {
            y = bottom + tracks.row_gap;
            first_band = start_row + 1;
        } else {
            resume = Some(ResumePoint::GridRow {
                row: start_row,
                items: still,
            });
        }
    }

    if resume.is_none() {
        for band in bands(&placement.areas, placement.row_count)
            .into_iter()
            .filter(|band| band.start >= first_band)
        {
            let (band_start, band_height) = tracks.row_extent(&band);
            let band_bottom = y + band_height;
            let band_items = items.iter().filter(|i| band.contains(&i.area.rows.start));

            if band_bottom > limit + EPSILON {
                if placed_rows || !input.page_is_empty {
                    if !placed_rows {
                        return FlowOutcome::pushed();
                    }
                    resume = Some(ResumePoint::GridRow {
                        row: band.start,
                        items: Vec::new(),
                    });
                    break;
                }
                // A single row taller than an empty fragmentainer is split.
                if band.len() == 1 {
                    let mut still = Vec::new();
                    for item in band_items {
                        let (fragment, rest) = split_item(ctx, item, &tracks, (content_x, y), limit, None, rtl, width);
                        bottom = bottom.max(fragment.margin_box().bottom());
                        placed.push(fragment);
                        if let Some(rest) = rest {
                            still.push((item.index, rest));
                        }
                    }
                    placed_rows = true;
                    if !still.is_empty() {
                        resume = Some(ResumePoint::GridRow {
                            row: band.start,
                            items: still,
                        });
                        break;
                    }
                    y = bottom.max(band_bottom) + tracks.row_gap;
                    continue;
                }
            }

            for item in band_items {
                let (row_top, _) = tracks.row_extent(&item.area.rows);
                placed.push(place_item(ctx, item, y + row_top - band_start));
            }
            placed_rows = true;
            bottom = bottom.max(band_bottom);
            y = band_bottom + tracks.row_gap;
        }
    }

    // STEP 6: Container height.
    //
    // [§ 11.3](https://www.w3.org/TR/css-grid-1/#algo-overview) The content
    // height of an auto-height grid is the sum of its rows and gaps.
    let content_height = if resuming || resume.is_some() {
        bottom - content_y
    } else {
        let rows = &tracks.rows;
        rows.iter().sum::<f32>() + row_gap * rows.len().saturating_sub(1) as f32
    };
    placed.sort_by_key(|f| items.iter().position(|i| i.source.id == f.id).unwrap_or(usize::MAX));
    children.extend(placed);
    // [§ 10.8 Grid Container Baselines](https://www.w3.org/TR/css-grid-1/#grid-baselines)
    let baseline = children
        .iter()
        .filter(|c| c.kind != BoxKind::AbsolutePlaceholder)
        .find_map(|c| c.baseline);

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[GRID] {:?} columns {:?} rows {:?} resume {:?}",
        b.id,
        tracks.columns,
        tracks.rows,
        resume
    );

    let body = BodyOutcome {
        children,
        resume,
        baseline,
        ..BodyOutcome::default()
    };
    frame.close(ctx, b, slot, &input, content_height, body, monolithic)
}

/// Lay out an item of a split row in normal flow at `y`, fragmented at the
/// fragmentainer's limit.
fn split_item(
    ctx: &mut LayoutContext<'_>,
    item: &GridItem<'_>,
    tracks: &Tracks,
    (content_x, y): (f32, f32),
    limit: f32,
    resume: Option<&ResumePoint>,
    rtl: bool,
    width: f32,
) -> (LayoutBox, Option<ResumePoint>) {
    let (x, area_width) = tracks.column_extent(&item.area.columns);
    let left = if rtl { width - x - area_width } else { x };
    let cb = Containing {
        width: area_width,
        height: None,
    };
    let slot = Slot {
        width: item.width_mode(),
        ..Slot::new(content_x + left, y, cb)
    };
    let item_input = FlowInput {
        bottom_space: limit,
        reserved: 0.0,
        resume,
        page_is_empty: true,
        adjoining_margins: Vec::new(),
    };
    let outcome = layout_block_level(ctx, item.source, &slot, item_input, &mut FloatContext::new());
    match outcome.result {
        LayoutResult::Complete(fragment) => (fragment, None),
        LayoutResult::Partial(fragment, rest) => (fragment, Some(rest)),
        LayoutResult::Pushed => (item.source.shell(), resume.cloned()),
    }
}

/// [§ 11.1 Grid Container Intrinsic Sizes](https://www.w3.org/TR/css-grid-1/#intrinsic-sizes)
///
/// "The max-content size (min-content size) of a grid container is the sum
/// of the grid container's track sizes (including gutters) in the
/// appropriate axis, when the grid is sized under a max-content constraint
/// (min-content constraint)."
pub fn content_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let style = &b.style;
    let (grid, placement, sources) = place(b, None, None);
    let (column_sizes, _) = all_track_sizes(style, &grid, &placement);
    let column_gap = gap(style.column_gap, None);
    let mut min_contributions = Vec::with_capacity(sources.len());
    let mut max_contributions = Vec::with_capacity(sources.len());
    for (source, area) in sources.iter().zip(&placement.areas) {
        let (min, max) = preferred::outer_widths(ctx, source);
        min_contributions.push(Contribution {
            span: area.columns.clone(),
            min,
            max: min,
        });
        max_contributions.push(Contribution {
            span: area.columns.clone(),
            min,
            max,
        });
    }
    let gaps = column_gap * column_sizes.len().saturating_sub(1) as f32;
    let min = size_tracks(ctx, &column_sizes, &min_contributions, Space::MinContent, column_gap, false);
    let max = size_tracks(ctx, &column_sizes, &max_contributions, Space::MaxContent, column_gap, false);
    (min.iter().sum::<f32>() + gaps, max.iter().sum::<f32>() + gaps)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::Display;
    use quire_style::grid::{GridLine, TrackBreadth, TrackList, TrackListEntry};
    use quire_style::values::LengthPercentage;

    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn list(sizes: &[TrackSize]) -> TrackList {
        TrackList {
            entries: sizes
                .iter()
                .map(|&size| TrackListEntry::Track {
                    names: Vec::new(),
                    size,
                })
                .collect(),
        }
    }

    const fn px(v: f32) -> TrackSize {
        TrackSize::Breadth(TrackBreadth::Length(v))
    }

    const fn fr(v: f32) -> TrackSize {
        TrackSize::Breadth(TrackBreadth::Flex(v))
    }

    fn item(id: usize, height: f32, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.height = Size::Length(height);
        f(&mut style);
        LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style))
    }

    fn container(children: Vec<LayoutBox>, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::grid();
        f(&mut style);
        let mut b = LayoutBox::new(BoxId(0), BoxKind::Grid, Arc::new(style));
        b.children = children;
        b
    }

    fn lay_out(b: &LayoutBox, width: f32, input: FlowInput<'_>) -> FlowOutcome {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let cb = Containing { width, height: None };
        layout_block_level(&mut ctx, b, &Slot::new(0.0, 0.0, cb), input, &mut FloatContext::new())
    }

    fn placed(b: &LayoutBox, width: f32) -> LayoutBox {
        lay_out(b, width, FlowInput::unfragmented()).result.fragment().cloned().unwrap()
    }

    fn rects(fragment: &LayoutBox) -> Vec<(f32, f32, f32, f32)> {
        fragment
            .children
            .iter()
            .map(|c| (c.position_x, c.position_y, c.width, c.height))
            .collect()
    }

    #[test]
    fn test_fixed_tracks_with_gaps() {
        let b = container(
            vec![item(1, 10.0, |_| {}), item(2, 20.0, |_| {}), item(3, 5.0, |_| {})],
            |s| {
                s.grid_template_columns = list(&[px(30.0), px(40.0)]);
                s.column_gap = Some(LengthPercentage::Length(5.0));
                s.row_gap = Some(LengthPercentage::Length(2.0));
            },
        );
        let fragment = placed(&b, 100.0);
        assert_eq!(
            rects(&fragment),
            vec![(0.0, 0.0, 30.0, 10.0), (35.0, 0.0, 40.0, 20.0), (0.0, 22.0, 30.0, 5.0)]
        );
        assert_eq!(fragment.height, 27.0);
    }

    #[test]
    fn test_fr_columns_share_free_space() {
        let b = container(vec![item(1, 10.0, |_| {}), item(2, 10.0, |_| {})], |s| {
            s.grid_template_columns = list(&[fr(1.0), fr(3.0)]);
        });
        let widths: Vec<f32> = placed(&b, 80.0).children.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![20.0, 60.0]);
    }

    #[test]
    fn test_explicit_placement_and_span() {
        let b = container(
            vec![
                item(1, 10.0, |s| {
                    s.grid_column_start = GridLine::Number(2);
                    s.grid_row_start = GridLine::Number(1);
                }),
                item(2, 10.0, |s| s.grid_column_start = GridLine::Span(2)),
            ],
            |s| s.grid_template_columns = list(&[px(20.0), px(30.0)]),
        );
        let fragment = placed(&b, 100.0);
        assert_eq!(rects(&fragment), vec![(20.0, 0.0, 30.0, 10.0), (0.0, 10.0, 50.0, 10.0)]);
    }

    #[test]
    fn test_self_alignment_in_area() {
        let b = container(
            vec![
                item(1, 10.0, |s| {
                    s.width = Size::Length(10.0);
                    s.justify_self = Alignment::Center;
                    s.align_self = Alignment::End;
                }),
                item(2, 30.0, |_| {}),
            ],
            |s| s.grid_template_columns = list(&[px(40.0), px(40.0)]),
        );
        let fragment = placed(&b, 80.0);
        assert_eq!(rects(&fragment)[0], (15.0, 20.0, 10.0, 10.0));
    }

    #[test]
    fn test_stretch_fills_row() {
        let b = container(
            vec![item(1, 30.0, |_| {}), item(2, 0.0, |s| s.height = Size::Auto)],
            |s| s.grid_template_columns = list(&[px(40.0), px(40.0)]),
        );
        let fragment = placed(&b, 80.0);
        assert_eq!(fragment.children[1].height, 30.0);
    }

    #[test]
    fn test_breaks_between_rows() {
        let b = container(
            vec![item(1, 20.0, |_| {}), item(2, 20.0, |_| {}), item(3, 20.0, |_| {})],
            |s| s.grid_template_columns = list(&[px(50.0)]),
        );
        let input = FlowInput {
            bottom_space: 50.0,
            ..FlowInput::unfragmented()
        };
        let LayoutResult::Partial(fragment, resume) = lay_out(&b, 50.0, input).result else {
            panic!("expected a partial fragment");
        };
        assert_eq!(fragment.children.len(), 2);
        assert_eq!(fragment.height, 40.0);
        assert_eq!(
            resume,
            ResumePoint::GridRow {
                row: 2,
                items: Vec::new()
            }
        );

        let input = FlowInput {
            resume: Some(&resume),
            ..FlowInput::unfragmented()
        };
        let rest = lay_out(&b, 50.0, input).result.fragment().cloned().unwrap();
        assert_eq!(rects(&rest), vec![(0.0, 0.0, 50.0, 20.0)]);
    }

    #[test]
    fn test_content_widths_sum_tracks() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = container(
            vec![
                item(1, 10.0, |s| s.width = Size::Length(25.0)),
                item(2, 10.0, |s| s.width = Size::Length(15.0)),
            ],
            |s| {
                s.grid_template_columns = list(&[TrackSize::AUTO, px(10.0)]);
                s.column_gap = Some(LengthPercentage::Length(5.0));
            },
        );
        assert_eq!(content_widths(&mut ctx, &b), (40.0, 40.0));
    }
}
