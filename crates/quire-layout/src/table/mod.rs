//! Table layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! The table wrapper box holds the captions and the table box. Column widths
//! come from the fixed algorithm (§ 17.5.2.1) or the automatic one
//! (§ 17.5.2.2), row heights from the cells laid out at those widths, with
//! row-spanning cells sized after the other rows.
//!
//! Tables break between rows. Rows joined by a row-spanning cell move
//! together, the header and footer groups repeat on every fragment, and a
//! row group with `break-inside: avoid` that would split is retried whole
//! on the next fragment.

mod borders;
mod structure;

use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

use quire_style::keywords::{BorderCollapse, BreakBetween, CaptionSide, Direction, TableLayout};
use quire_style::values::{Size, VerticalAlign};

use crate::block::{
    BodyOutcome, Containing, Frame, Slot, WidthMode, border_edges, break_inside_avoided, content_size, layout_detached,
    padding_edges, resolve_height,
};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::{EdgeSizes, clamp_size};
use crate::options::EPSILON;
use crate::preferred;
use crate::resume::{FlowInput, FlowOutcome, ResumePoint};

use borders::CollapsedBorders;
use structure::Structure;

/// Give `extra` more to `sizes` so they add up to at least `target`, in
/// proportion to `weights`, or evenly when the weights are all zero.
fn spread(sizes: &mut [f32], target: f32, weights: &[f32]) {
    let current: f32 = sizes.iter().sum();
    if sizes.is_empty() || target <= current + EPSILON {
        return;
    }
    let extra = target - current;
    let total: f32 = weights.iter().sum();
    let count = sizes.len() as f32;
    for (size, weight) in sizes.iter_mut().zip(weights) {
        *size += if total > 0.0 { extra * weight / total } else { extra / count };
    }
}

/// [§ 17.5.2.2](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
///
/// Column widths for `width` between the summed minimum and maximum column
/// widths: columns grow from their minimum toward their maximum in step,
/// and past the maximum in proportion to it.
fn distribute_columns(min: &[f32], max: &[f32], width: f32) -> Vec<f32> {
    let min_sum: f32 = min.iter().sum();
    let max_sum: f32 = max.iter().sum();
    if width >= max_sum {
        let mut widths = max.to_vec();
        spread(&mut widths, width, max);
        widths
    } else if width > min_sum && max_sum - min_sum > EPSILON {
        let t = (width - min_sum) / (max_sum - min_sum);
        min.iter().zip(max).map(|(lo, hi)| (hi - lo).mul_add(t, *lo)).collect()
    } else {
        min.to_vec()
    }
}

/// Cells aligned on the row baseline: every value but `top`, `middle` and
/// `bottom`.
///
/// [§ 17.5.3](https://www.w3.org/TR/CSS2/tables.html#height-layout) "sub,
/// super, text-top, text-bottom, <length>, <percentage>: These values do not
/// apply to cells; the cell is aligned at the baseline instead."
const fn baseline_aligned(align: VerticalAlign) -> bool {
    !matches!(align, VerticalAlign::Top | VerticalAlign::Middle | VerticalAlign::Bottom)
}

fn forces_break(ctx: &LayoutContext<'_>, between: BreakBetween) -> bool {
    between.forces_page() || (ctx.column_depth > 0 && between.forces_column())
}

/// Row heights and baselines, before fragmentation.
#[derive(Debug, Clone, PartialEq)]
struct RowMetrics {
    /// Height of each row.
    heights: Vec<f32>,
    /// Baseline of each row, below its top.
    baselines: Vec<Option<f32>>,
    /// Border-box height of each cell at its natural height, and its
    /// baseline below its border top.
    cells: Vec<(f32, f32)>,
}

/// A table box ready for layout: its grid, its cells with the border model
/// applied, and the spacing between cells.
struct Model<'a> {
    s: Structure<'a>,
    cells: Vec<Cow<'a, LayoutBox>>,
    border: EdgeSizes,
    padding: EdgeSizes,
    /// Horizontal and vertical `border-spacing`; zero when collapsing.
    spacing: (f32, f32),
}

impl<'a> Model<'a> {
    /// [§ 17.6 Borders](https://www.w3.org/TR/CSS2/tables.html#borders)
    fn new(table: &'a LayoutBox, cb_width: f32) -> Self {
        let s = Structure::new(table);
        let style = &table.style;
        if style.border_collapse == BorderCollapse::Collapse {
            // "In this model, ... the table has no padding" and cells own
            // half of each collapsed border.
            let collapsed = CollapsedBorders::resolve(&s);
            let cells = s
                .cells
                .iter()
                .map(|cell| {
                    let mut restyled = (*cell.source.style).clone();
                    restyled.border = collapsed.cell(cell);
                    let mut b = cell.source.clone();
                    b.style = Arc::new(restyled);
                    Cow::Owned(b)
                })
                .collect();
            Self {
                cells,
                border: collapsed.table_edges(),
                padding: EdgeSizes::ZERO,
                spacing: (0.0, 0.0),
                s,
            }
        } else {
            let cells = s.cells.iter().map(|cell| Cow::Borrowed(cell.source)).collect();
            Self {
                cells,
                border: border_edges(style),
                padding: padding_edges(style, cb_width),
                spacing: style.border_spacing,
                s,
            }
        }
    }

    fn edges(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.border.top + self.padding.top,
            right: self.border.right + self.padding.right,
            bottom: self.border.bottom + self.padding.bottom,
            left: self.border.left + self.padding.left,
        }
    }

    /// [§ 17.6.1](https://www.w3.org/TR/CSS2/tables.html#separated-borders)
    /// "The distance between the table border and the borders of the cells
    /// on the edge of the table is the table's padding for that side, plus
    /// the relevant border spacing distance."
    fn horizontal_spacing(&self) -> f32 {
        if self.s.column_count == 0 {
            0.0
        } else {
            self.spacing.0 * (self.s.column_count + 1) as f32
        }
    }

    fn vertical_spacing(&self) -> f32 {
        if self.s.rows.is_empty() {
            0.0
        } else {
            self.spacing.1 * (self.s.rows.len() + 1) as f32
        }
    }

    /// Width of a cell spanning `columns`.
    fn span_width(&self, widths: &[f32], columns: Range<usize>) -> f32 {
        let count = columns.len();
        widths[columns].iter().sum::<f32>() + self.spacing.0 * count.saturating_sub(1) as f32
    }

    /// Height of a cell spanning `rows`.
    fn span_height(&self, heights: &[f32], rows: Range<usize>) -> f32 {
        let count = rows.len();
        heights[rows].iter().sum::<f32>() + self.spacing.1 * count.saturating_sub(1) as f32
    }

    /// Min-content and max-content border-box width of a cell.
    fn cell_widths(ctx: &mut LayoutContext<'_>, cell: &LayoutBox) -> (f32, f32) {
        let edges = border_edges(&cell.style).horizontal() + padding_edges(&cell.style, 0.0).horizontal();
        let (min, max) = preferred::outer_widths(ctx, cell);
        // A fixed width never drops a cell below its content.
        let min = min.max(preferred::content_widths(ctx, cell).0 + edges);
        (min, max.max(min))
    }

    /// [§ 17.5.2.2](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
    ///
    /// "Calculate the minimum content width (MCW) of each cell ... For each
    /// column, determine a maximum and minimum column width from the cells
    /// that span only that column." Spanning cells then widen the columns
    /// they cover, narrowest spans first.
    fn column_bounds(&self, ctx: &mut LayoutContext<'_>) -> (Vec<f32>, Vec<f32>) {
        let count = self.s.column_count;
        let mut min = vec![0.0_f32; count];
        let mut max = vec![0.0_f32; count];
        for (i, source) in self.s.columns.iter().enumerate() {
            if let Some(Size::Length(width)) = source.column.map(|c| c.style.width) {
                min[i] = min[i].max(width);
                max[i] = max[i].max(width);
            }
        }
        let mut order: Vec<usize> = (0..self.s.cells.len()).collect();
        order.sort_by_key(|&i| self.s.cells[i].colspan);
        for i in order {
            let cell = &self.s.cells[i];
            let (cell_min, cell_max) = Self::cell_widths(ctx, &self.cells[i]);
            let span = cell.columns();
            if cell.colspan == 1 {
                min[cell.column] = min[cell.column].max(cell_min);
                max[cell.column] = max[cell.column].max(cell_max);
                continue;
            }
            let inner = self.spacing.0 * (cell.colspan - 1) as f32;
            let weights = max[span.clone()].to_vec();
            spread(&mut min[span.clone()], cell_min - inner, &weights);
            spread(&mut max[span], cell_max - inner, &weights);
        }
        for (lo, hi) in min.iter().zip(max.iter_mut()) {
            *hi = hi.max(*lo);
        }
        (min, max)
    }

    /// [§ 17.5.2.1 Fixed table layout](https://www.w3.org/TR/CSS2/tables.html#fixed-table-layout)
    ///
    /// "In the fixed table layout algorithm, the width of each column is
    /// determined as follows:
    /// 1. A column element with a value other than 'auto' for the 'width'
    ///    property sets the width for that column.
    /// 2. Otherwise, a cell in the first row with a value other than 'auto'
    ///    for the 'width' property determines the width for that column. If
    ///    the cell spans more than one column, the width is divided over the
    ///    columns.
    /// 3. Any remaining columns equally divide the remaining horizontal table
    ///    space (minus borders or cell spacing)."
    fn fixed_columns(&self, available: f32) -> Vec<f32> {
        let count = self.s.column_count;
        let mut widths: Vec<Option<f32>> = vec![None; count];
        for (i, source) in self.s.columns.iter().enumerate() {
            if let Some(col) = source.column.or(source.group) {
                widths[i] = content_size(col.style.width, Some(available), &col.style, 0.0);
            }
        }
        for (i, cell) in self.s.cells_in(0) {
            let span = cell.columns();
            if widths[span.clone()].iter().any(Option::is_some) {
                continue;
            }
            let style = &self.cells[i].style;
            let edges = border_edges(style).horizontal() + padding_edges(style, available).horizontal();
            if let Some(width) = content_size(style.width, Some(available), style, edges) {
                let each = (width + edges - self.spacing.0 * (cell.colspan - 1) as f32) / cell.colspan as f32;
                for slot in &mut widths[span] {
                    *slot = Some(each.max(0.0));
                }
            }
        }
        let fixed: f32 = widths.iter().flatten().sum();
        let autos = widths.iter().filter(|w| w.is_none()).count();
        let remaining = (available - fixed).max(0.0);
        let mut widths: Vec<f32> = widths
            .into_iter()
            .map(|w| w.unwrap_or(remaining / autos.max(1) as f32))
            .collect();
        // "If the table is wider than the columns, the extra space should be
        // distributed over the columns."
        if autos == 0 {
            let even = vec![1.0; count];
            spread(&mut widths, available, &even);
        }
        widths
    }

    /// The table's border-box width and its column widths.
    ///
    /// `imposed` is a border-box width decided by the parent's layout mode.
    fn widths(
        &self,
        ctx: &mut LayoutContext<'_>,
        cb_width: f32,
        available: f32,
        imposed: Option<f32>,
    ) -> (f32, Vec<f32>) {
        let style = &self.s.table.style;
        let edges = self.edges().horizontal();
        let spacing = self.horizontal_spacing();
        let specified = imposed
            .map(|w| (w - edges).max(0.0))
            .or_else(|| content_size(style.width, Some(cb_width), style, edges));

        if style.table_layout == TableLayout::Fixed
            && let Some(width) = specified
        {
            let columns = self.fixed_columns((width - spacing).max(0.0));
            let content = width.max(columns.iter().sum::<f32>() + spacing);
            return (content + edges, columns);
        }

        let (min, max) = self.column_bounds(ctx);
        let floor = min.iter().sum::<f32>() + spacing;
        let ceiling = max.iter().sum::<f32>() + spacing;
        // An auto-width table shrinks to fit.
        let content = specified.unwrap_or_else(|| (available - edges).min(ceiling));
        let min_width = content_size(style.min_width, Some(cb_width), style, edges).unwrap_or(0.0);
        let max_width = content_size(style.max_width, Some(cb_width), style, edges);
        let content = clamp_size(content, min_width, max_width).max(floor);
        let columns = distribute_columns(&min, &max, content - spacing);
        (content + edges, columns)
    }

    fn lay_out_cell(
        ctx: &mut LayoutContext<'_>,
        cell: &LayoutBox,
        width: f32,
        table_width: f32,
        height: Option<f32>,
    ) -> LayoutBox {
        let edges = border_edges(&cell.style).horizontal() + padding_edges(&cell.style, table_width).horizontal();
        let cb = Containing {
            width: table_width,
            height: None,
        };
        layout_detached(ctx, cell, cb, WidthMode::Definite((width - edges).max(0.0)), height)
    }

    /// [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
    ///
    /// "The height of a 'table-row' element's box is calculated once the user
    /// agent has all the cells in the row available: it is the maximum of
    /// the row's computed 'height', the computed 'height' of each cell in
    /// the row, and the minimum height (MIN) required by the cells."
    ///
    /// Cells are measured and thrown away; whatever they registered is
    /// dropped.
    fn measure_rows(&self, ctx: &mut LayoutContext<'_>, columns: &[f32], table_width: f32) -> RowMetrics {
        let checkpoint = ctx.checkpoint();
        let cells: Vec<(f32, f32)> = self
            .s
            .cells
            .iter()
            .zip(&self.cells)
            .map(|(cell, b)| {
                let width = self.span_width(columns, cell.columns());
                let fragment = Self::lay_out_cell(ctx, b, width, table_width, None);
                let top = fragment.border_box_y();
                // "If there is no such line box or table-row, the baseline is
                // the bottom of content edge of the cell box."
                let baseline = fragment
                    .baseline
                    .map_or(fragment.content_box_y() + fragment.height - top, |y| y - top);
                (fragment.border_height(), baseline)
            })
            .collect();
        ctx.rollback(checkpoint);

        let mut heights: Vec<f32> = self
            .s
            .rows
            .iter()
            .map(|row| resolve_height(&row.style, None, 0.0).unwrap_or(0.0))
            .collect();
        let mut baselines = vec![None; heights.len()];
        for (row, height) in heights.iter_mut().enumerate() {
            let single: Vec<usize> = self
                .s
                .cells_in(row)
                .filter(|(_, c)| c.rowspan == 1)
                .map(|(i, _)| i)
                .collect();
            let aligned = |i: &usize| baseline_aligned(self.cells[*i].style.vertical_align);
            let baseline = single.iter().filter(|i| aligned(i)).map(|&i| cells[i].1).reduce(f32::max);
            baselines[row] = baseline;
            for i in &single {
                let (cell_height, cell_baseline) = cells[*i];
                let need = match baseline {
                    Some(b) if aligned(i) => b - cell_baseline + cell_height,
                    _ => cell_height,
                };
                *height = height.max(need);
            }
        }

        // "A cell box spanning rows ... the rows are made taller so the
        // cell fits": the last spanned row takes the difference.
        let mut spanning: Vec<usize> = (0..self.s.cells.len()).filter(|&i| self.s.cells[i].rowspan > 1).collect();
        spanning.sort_by_key(|&i| self.s.cells[i].rowspan);
        for i in spanning {
            let rows = self.s.cells[i].rows();
            let have = self.span_height(&heights, rows.clone());
            if cells[i].0 > have {
                heights[rows.end - 1] += cells[i].0 - have;
            }
        }
        RowMetrics {
            heights,
            baselines,
            cells,
        }
    }

    /// Lay out a cell in its slot, stretched to the rows it spans, with its
    /// content aligned per `vertical-align`.
    fn place_cell(
        &self,
        ctx: &mut LayoutContext<'_>,
        index: usize,
        (x, y): (f32, f32),
        (width, height): (f32, f32),
        metrics: &RowMetrics,
        table_width: f32,
    ) -> LayoutBox {
        let cell = &self.s.cells[index];
        let b = &self.cells[index];
        let edges = border_edges(&b.style).vertical() + padding_edges(&b.style, table_width).vertical();
        let mut fragment = Self::lay_out_cell(ctx, b, width, table_width, Some((height - edges).max(0.0)));
        let (natural, baseline) = metrics.cells[index];
        let free = (height - natural).max(0.0);
        // [§ 17.5.3](https://www.w3.org/TR/CSS2/tables.html#height-layout)
        let dy = match b.style.vertical_align {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => free / 2.0,
            VerticalAlign::Bottom => free,
            _ => metrics.baselines[cell.row].map_or(0.0, |row| (row - baseline).clamp(0.0, free)),
        };
        if dy > 0.0 {
            for child in &mut fragment.children {
                child.translate(0.0, dy);
            }
            if let Some(line) = fragment.baseline.as_mut() {
                *line += dy;
            }
        }
        fragment.place_border_box(x, y, EdgeSizes::ZERO);
        fragment
    }
}

/// Lay out a caption across the wrapper below `y`.
fn place_caption(ctx: &mut LayoutContext<'_>, caption: &LayoutBox, x: f32, y: f32, width: f32) -> LayoutBox {
    let cb = Containing { width, height: None };
    let mut fragment = layout_detached(ctx, caption, cb, WidthMode::Fill, None);
    let margin = fragment.margin;
    fragment.place_border_box(x + margin.left, y + margin.top, margin);
    fragment
}

/// [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
///
/// Lay out a table wrapper box: its captions and its table.
pub fn layout_table(ctx: &mut LayoutContext<'_>, wrapper: &LayoutBox, slot: &Slot, input: FlowInput<'_>) -> FlowOutcome {
    let resuming = input.resume.is_some();
    debug_assert!(
        wrapper.children.iter().any(|c| c.kind == BoxKind::Table),
        "a table wrapper holds a table box"
    );
    let Some(table) = wrapper.children.iter().find(|c| c.kind == BoxKind::Table) else {
        let frame = Frame::open(ctx, wrapper, slot, &input);
        return frame.close(ctx, wrapper, slot, &input, 0.0, BodyOutcome::default(), true);
    };
    let style = &table.style;
    let cb_width = slot.cb.width;
    let rtl = style.direction == Direction::Rtl;

    // STEP 1: Build the grid and apply the border model.
    let model = Model::new(table, cb_width);
    let edges = model.edges();
    let (h_space, v_space) = model.spacing;

    // STEP 2: Table and column widths.
    //
    // [§ 17.4](https://www.w3.org/TR/CSS2/tables.html#model) "The computed
    // values of properties 'position', 'float', 'margin-*', 'top', 'right',
    // 'bottom', and 'left' on the table element are used on the table
    // wrapper box and not the table box".
    let margins =
        wrapper.style.margin.left.resolve_or_zero(cb_width) + wrapper.style.margin.right.resolve_or_zero(cb_width);
    let imposed = match slot.width {
        WidthMode::Definite(width) => Some(width),
        WidthMode::Fill | WidthMode::ShrinkToFit => None,
    };
    let (table_width, columns) = model.widths(ctx, cb_width, slot.available - margins, imposed);
    let table_content_width = (table_width - edges.horizontal()).max(0.0);
    let captions: Vec<&LayoutBox> = wrapper
        .children
        .iter()
        .filter(|c| c.kind == BoxKind::TableCaption)
        .collect();
    let mut wrapper_width = table_width;
    for caption in &captions {
        wrapper_width = wrapper_width.max(preferred::outer_widths(ctx, caption).0);
    }
    let wrapper_slot = Slot {
        width: WidthMode::Definite(wrapper_width),
        ..*slot
    };
    let frame = Frame::open(ctx, wrapper, &wrapper_slot, &input);

    // STEP 3: Captions above the table, on the first fragment only.
    //
    // [§ 17.4.1 Caption position and alignment](https://www.w3.org/TR/CSS2/tables.html#caption-position)
    let mut children = Vec::new();
    let mut y = frame.content_y;
    if !resuming {
        for caption in captions.iter().filter(|c| c.style.caption_side == CaptionSide::Top) {
            let fragment = place_caption(ctx, caption, frame.content_x, y, wrapper_width);
            y = fragment.margin_box().bottom();
            children.push(fragment);
        }
    }

    // STEP 4: Row heights.
    let mut metrics = model.measure_rows(ctx, &columns, table_content_width);
    let natural = metrics.heights.iter().sum::<f32>() + model.vertical_spacing();
    let specified_height = resolve_height(style, slot.cb.height, edges.vertical());
    // [§ 17.5.3](https://www.w3.org/TR/CSS2/tables.html#height-layout) Extra
    // height of the table goes to its body rows.
    if let Some(height) = specified_height
        && height > natural + EPSILON
        && !metrics.heights.is_empty()
    {
        let bodies: Vec<usize> = model
            .s
            .bodies()
            .into_iter()
            .flat_map(|g| model.s.groups[g].rows.clone())
            .collect();
        let targets = if bodies.is_empty() {
            (0..metrics.heights.len()).collect()
        } else {
            bodies
        };
        let each = (height - natural) / targets.len() as f32;
        for row in targets {
            metrics.heights[row] += each;
        }
    }

    // STEP 5: Choose the rows of this fragment.
    //
    // [§ 17.5.4 Fragmenting tables] Breaks fall between rows; the header
    // starts and the footer ends every fragment.
    let heights = &metrics.heights;
    let table_top = y;
    let content_top = table_top + edges.top;
    let mut cursor = if model.s.rows.is_empty() {
        content_top
    } else {
        content_top + v_space
    };
    let mut placed: Vec<(usize, f32)> = Vec::new();
    if let Some(header) = model.s.header() {
        for row in model.s.groups[header].rows.clone() {
            placed.push((row, cursor));
            cursor += heights[row] + v_space;
        }
    }
    let footer = model.s.footer();
    let footer_height: f32 = footer.map_or(0.0, |f| {
        model.s.groups[f].rows.clone().map(|row| heights[row] + v_space).sum()
    });
    let limit = frame.content_limit(ctx, &input) - edges.bottom - footer_height;
    let (start_body, start_row) = match input.resume {
        Some(ResumePoint::TableRow { group, row }) => (*group, *row),
        _ => (0, 0),
    };

    let bodies = model.s.bodies();
    let mut body_rows = 0;
    let mut resume = None;
    let mut forced_break = None;
    'groups: for (body, &g) in bodies.iter().enumerate().skip(start_body) {
        let group = &model.s.groups[g];
        let first = if body == start_body { start_row } else { 0 };
        let (group_mark, group_cursor, body_mark) = (placed.len(), cursor, body_rows);
        let mut row = group.rows.start + first;
        while row < group.rows.end {
            // [§ 3.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
            if body_rows > 0 {
                let previous = row - 1;
                let mut between = model.s.rows[previous].style.break_after;
                if row == group.rows.start {
                    let previous_group = &model.s.groups[model.s.row_groups[previous]];
                    between = between
                        .combine(previous_group.source.style.break_after)
                        .combine(group.source.style.break_before);
                }
                between = between.combine(model.s.rows[row].style.break_before);
                if forces_break(ctx, between) {
                    resume = Some(ResumePoint::TableRow {
                        group: body,
                        row: row - group.rows.start,
                    });
                    forced_break = Some(between);
                    break 'groups;
                }
            }

            // Rows joined by a spanning cell move together.
            let mut end = row + 1;
            while end < group.rows.end && !model.s.breakable_before(end) {
                end += 1;
            }
            let chunk = model.span_height(heights, row..end);
            let fits = cursor + chunk + v_space <= limit + EPSILON;
            if !fits && (body_rows > 0 || !input.page_is_empty) {
                if body_rows == 0 {
                    return FlowOutcome::pushed();
                }
                // [§ 3.2](https://www.w3.org/TR/css-break-3/#break-within)
                // A group that avoids breaks and started here moves on whole.
                let retry_group = first == 0
                    && body_mark > 0
                    && placed.len() > group_mark
                    && break_inside_avoided(ctx, &group.source.style);
                let resume_row = if retry_group {
                    placed.truncate(group_mark);
                    cursor = group_cursor;
                    0
                } else {
                    row - group.rows.start
                };
                resume = Some(ResumePoint::TableRow {
                    group: body,
                    row: resume_row,
                });
                break 'groups;
            }
            for r in row..end {
                placed.push((r, cursor));
                cursor += heights[r] + v_space;
                body_rows += 1;
            }
            row = end;
        }
    }
    if let Some(footer) = footer {
        for row in model.s.groups[footer].rows.clone() {
            placed.push((row, cursor));
            cursor += heights[row] + v_space;
        }
    }
    let complete = resume.is_none();

    // STEP 6: Build the table fragment: row groups, rows, cells.
    let content_x = frame.content_x + edges.left;
    let mut starts = Vec::with_capacity(columns.len());
    let mut x = h_space;
    for width in &columns {
        starts.push(x);
        x += width + h_space;
    }
    let column_x = |span: Range<usize>, width: f32| {
        let start = starts.get(span.start).copied().unwrap_or(0.0);
        if rtl {
            content_x + table_content_width - start - width
        } else {
            content_x + start
        }
    };
    let rows_width = model.span_width(&columns, 0..columns.len());

    let mut groups: Vec<LayoutBox> = Vec::new();
    let mut current: Option<usize> = None;
    for &(row, row_y) in &placed {
        let group_index = model.s.row_groups[row];
        if current != Some(group_index) {
            let mut group = model.s.groups[group_index].source.shell();
            group.position_x = content_x + h_space;
            group.position_y = row_y;
            group.width = rows_width;
            groups.push(group);
            current = Some(group_index);
        }
        let mut fragment = model.s.rows[row].shell();
        fragment.position_x = content_x + h_space;
        fragment.position_y = row_y;
        fragment.width = rows_width;
        fragment.height = heights[row];
        fragment.baseline = metrics.baselines[row].map(|b| row_y + b);
        let cells: Vec<usize> = model.s.cells_in(row).map(|(i, _)| i).collect();
        for i in cells {
            let cell = &model.s.cells[i];
            let width = model.span_width(&columns, cell.columns());
            let height = model.span_height(heights, cell.rows());
            let x = column_x(cell.columns(), width);
            let placed_cell = model.place_cell(ctx, i, (x, row_y), (width, height), &metrics, table_content_width);
            fragment.children.push(placed_cell);
        }
        if let Some(group) = groups.last_mut() {
            group.height = row_y + heights[row] - group.position_y;
            group.children.push(fragment);
        }
    }

    let mut table_fragment = table.shell();
    table_fragment.position_x = frame.content_x;
    table_fragment.position_y = table_top;
    table_fragment.width = table_content_width;
    table_fragment.height = if model.s.rows.is_empty() {
        specified_height.unwrap_or(0.0)
    } else {
        cursor - content_top
    };
    table_fragment.border = model.border;
    table_fragment.padding = model.padding;
    table_fragment.baseline = groups
        .iter()
        .flat_map(|g| &g.children)
        .find_map(|r| r.baseline);
    table_fragment.is_first_fragment = !resuming;
    table_fragment.is_last_fragment = complete;
    table_fragment.children = groups;
    let baseline = table_fragment.baseline;
    y = table_fragment.border_box_bottom();
    children.push(table_fragment);

    // STEP 7: Captions below the table, once it is complete.
    if complete {
        for caption in captions.iter().filter(|c| c.style.caption_side == CaptionSide::Bottom) {
            let fragment = place_caption(ctx, caption, frame.content_x, y, wrapper_width);
            y = fragment.margin_box().bottom();
            children.push(fragment);
        }
    }

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[TABLE] {:?} columns {:?} rows {:?} resume {:?}",
        wrapper.id,
        columns,
        heights,
        resume
    );

    let content_height = y - frame.content_y;
    let body = BodyOutcome {
        children,
        resume,
        forced_break,
        baseline,
        ..BodyOutcome::default()
    };
    frame.close(ctx, wrapper, &wrapper_slot, &input, content_height, body, false)
}

/// Min-content and max-content width of a table wrapper: the table's border
/// box, or the widest caption.
pub fn content_widths(ctx: &mut LayoutContext<'_>, wrapper: &LayoutBox) -> (f32, f32) {
    let Some(table) = wrapper.children.iter().find(|c| c.kind == BoxKind::Table) else {
        return (0.0, 0.0);
    };
    let model = Model::new(table, 0.0);
    let style = &table.style;
    let edges = model.edges().horizontal();
    let spacing = model.horizontal_spacing();
    let (min, max) = model.column_bounds(ctx);
    let floor = min.iter().sum::<f32>() + spacing;
    let mut widths = (floor, max.iter().sum::<f32>() + spacing);
    if let Size::Length(_) = style.width
        && let Some(width) = content_size(style.width, None, style, edges)
    {
        let width = if style.table_layout == TableLayout::Fixed {
            width
        } else {
            width.max(floor)
        };
        widths = (width, width);
    }
    let (mut min, mut max) = (widths.0 + edges, widths.1 + edges);
    for caption in wrapper.children.iter().filter(|c| c.kind == BoxKind::TableCaption) {
        let (caption_min, _) = preferred::outer_widths(ctx, caption);
        min = min.max(caption_min);
        max = max.max(caption_min);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::display::InternalDisplay;
    use quire_style::keywords::{BorderStyle, BreakInside};
    use quire_style::values::{BorderSide, Color, Sides};
    use quire_style::{ComputedStyle, Display};

    use crate::block::layout_block_level;
    use crate::boxes::BoxId;
    use crate::float::FloatContext;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::resume::LayoutResult;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn internal(id: usize, kind: BoxKind, display: InternalDisplay, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::Internal(display);
        let mut b = LayoutBox::new(BoxId(id), kind, Arc::new(style));
        b.children = children;
        b
    }

    fn sized(id: usize, width: f32, height: f32) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.width = Size::Length(width);
        style.height = Size::Length(height);
        LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style))
    }

    fn cell(id: usize, width: f32, height: f32) -> LayoutBox {
        internal(id, BoxKind::TableCell, InternalDisplay::TableCell, vec![sized(id + 100, width, height)])
    }

    fn styled(mut b: LayoutBox, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = (*b.style).clone();
        f(&mut style);
        b.style = Arc::new(style);
        b
    }

    fn row(id: usize, cells: Vec<LayoutBox>) -> LayoutBox {
        internal(id, BoxKind::TableRow, InternalDisplay::TableRow, cells)
    }

    fn body(id: usize, rows: Vec<LayoutBox>) -> LayoutBox {
        internal(id, BoxKind::TableRowGroup, InternalDisplay::TableRowGroup, rows)
    }

    fn wrapper(children: Vec<LayoutBox>, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::table();
        f(&mut style);
        let mut table = LayoutBox::new(BoxId(1), BoxKind::Table, Arc::new(style));
        table.children = children;
        let mut outer_style = ComputedStyle::initial();
        outer_style.display = Display::table();
        let mut b = LayoutBox::new(BoxId(0), BoxKind::TableWrapper, Arc::new(outer_style));
        b.children = vec![table];
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

    fn table_of(fragment: &LayoutBox) -> &LayoutBox {
        fragment.children.iter().find(|c| c.kind == BoxKind::Table).unwrap()
    }

    fn cells_of(fragment: &LayoutBox) -> Vec<&LayoutBox> {
        fragment
            .descendants()
            .into_iter()
            .filter(|b| b.kind == BoxKind::TableCell)
            .collect()
    }

    fn rows_of(fragment: &LayoutBox) -> Vec<&LayoutBox> {
        fragment
            .descendants()
            .into_iter()
            .filter(|b| b.kind == BoxKind::TableRow)
            .collect()
    }

    #[test]
    fn test_auto_columns_shrink_to_content() {
        let b = wrapper(
            vec![body(2, vec![row(3, vec![cell(4, 30.0, 10.0), cell(5, 50.0, 20.0)])])],
            |s| s.border_spacing = (2.0, 2.0),
        );
        let fragment = placed(&b, 500.0);
        assert_eq!(fragment.width, 86.0);
        let cells = cells_of(&fragment);
        assert_eq!((cells[0].position_x, cells[0].position_y, cells[0].width), (2.0, 2.0, 30.0));
        assert_eq!((cells[1].position_x, cells[1].width, cells[1].height), (34.0, 50.0, 20.0));
        // The shorter cell stretches to the row.
        assert_eq!(cells[0].height, 20.0);
        assert_eq!(table_of(&fragment).height, 24.0);
    }

    #[test]
    fn test_vertical_align_middle_offsets_content() {
        let short = styled(cell(4, 30.0, 10.0), |s| s.vertical_align = VerticalAlign::Middle);
        let b = wrapper(vec![body(2, vec![row(3, vec![short, cell(5, 50.0, 20.0)])])], |_| {});
        let fragment = placed(&b, 500.0);
        let cells = cells_of(&fragment);
        assert_eq!(cells[0].children[0].position_y, 5.0);
    }

    #[test]
    fn test_fixed_layout_columns_fill_the_table() {
        let first = styled(cell(4, 0.0, 10.0), |s| s.width = Size::Length(20.0));
        let b = wrapper(
            vec![body(2, vec![row(3, vec![first, cell(5, 0.0, 10.0), cell(6, 0.0, 10.0)])])],
            |s| {
                s.table_layout = TableLayout::Fixed;
                s.width = Size::Length(100.0);
                s.border_spacing = (5.0, 0.0);
            },
        );
        let fragment = placed(&b, 500.0);
        let widths: Vec<f32> = cells_of(&fragment).iter().map(|c| c.border_width()).collect();
        assert_eq!(widths, vec![20.0, 30.0, 30.0]);
        assert_eq!(widths.iter().sum::<f32>() + 20.0, table_of(&fragment).width);
    }

    #[test]
    fn test_collapsed_borders_are_shared() {
        let solid = |width| BorderSide {
            width,
            style: BorderStyle::Solid,
            color: Color::BLACK,
        };
        let bordered = |id| styled(cell(id, 10.0, 10.0), |s| s.border = Sides::all(solid(4.0)));
        let b = wrapper(vec![body(2, vec![row(3, vec![bordered(4), bordered(5)])])], |s| {
            s.border_collapse = BorderCollapse::Collapse;
            s.border = Sides::all(solid(2.0));
            s.border_spacing = (7.0, 7.0);
        });
        let fragment = placed(&b, 500.0);
        let table = table_of(&fragment);
        assert_eq!(table.border.left, 2.0);
        assert_eq!(fragment.width, 32.0);
        let cells = cells_of(&fragment);
        assert_eq!(cells[0].border.right, 2.0);
        assert_eq!(cells[1].position_x, 16.0);
    }

    #[test]
    fn test_rowspan_grows_last_spanned_row() {
        let mut tall = cell(4, 10.0, 50.0);
        tall.rowspan = 2;
        let b = wrapper(
            vec![body(
                2,
                vec![row(3, vec![tall, cell(5, 10.0, 10.0)]), row(6, vec![cell(7, 10.0, 10.0)])],
            )],
            |_| {},
        );
        let fragment = placed(&b, 500.0);
        let rows = rows_of(&fragment);
        assert_eq!((rows[1].position_y, rows[1].height), (10.0, 40.0));
        assert_eq!(cells_of(&fragment)[0].height, 50.0);
    }

    #[test]
    fn test_header_repeats_after_break() {
        let header = internal(
            2,
            BoxKind::TableRowGroup,
            InternalDisplay::TableHeaderGroup,
            vec![row(3, vec![cell(4, 10.0, 10.0)])],
        );
        let rows = (0..3).map(|i| row(10 + i * 2, vec![cell(11 + i * 2, 10.0, 10.0)])).collect();
        let b = wrapper(vec![header, body(5, rows)], |_| {});
        let input = FlowInput {
            bottom_space: 35.0,
            ..FlowInput::unfragmented()
        };
        let outcome = lay_out(&b, 100.0, input);
        let LayoutResult::Partial(first, resume) = outcome.result else {
            panic!("table should break");
        };
        assert_eq!(resume, ResumePoint::TableRow { group: 0, row: 2 });
        assert_eq!(rows_of(&first).len(), 3);

        let input = FlowInput {
            resume: Some(&resume),
            ..FlowInput::unfragmented()
        };
        let second = lay_out(&b, 100.0, input).result.fragment().cloned().unwrap();
        let rows = rows_of(&second);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, BoxId(3));
        assert_eq!((rows[1].id, rows[1].position_y), (BoxId(14), 10.0));
        assert!(!second.is_first_fragment);
    }

    #[test]
    fn test_avoiding_group_moves_whole() {
        let first = body(2, vec![row(3, vec![cell(4, 10.0, 10.0)])]);
        let second = styled(
            body(5, vec![row(6, vec![cell(7, 10.0, 10.0)]), row(8, vec![cell(9, 10.0, 10.0)])]),
            |s| s.break_inside = BreakInside::Avoid,
        );
        let b = wrapper(vec![first, second], |_| {});
        let input = FlowInput {
            bottom_space: 25.0,
            ..FlowInput::unfragmented()
        };
        let LayoutResult::Partial(fragment, resume) = lay_out(&b, 100.0, input).result else {
            panic!("table should break");
        };
        assert_eq!(resume, ResumePoint::TableRow { group: 1, row: 0 });
        assert_eq!(rows_of(&fragment).len(), 1);
    }

    #[test]
    fn test_pushed_when_no_row_fits_on_a_used_page() {
        let b = wrapper(vec![body(2, vec![row(3, vec![cell(4, 10.0, 30.0)])])], |_| {});
        let input = FlowInput {
            bottom_space: 20.0,
            page_is_empty: false,
            ..FlowInput::unfragmented()
        };
        assert!(matches!(lay_out(&b, 100.0, input).result, LayoutResult::Pushed));
    }

    #[test]
    fn test_content_widths_sum_columns() {
        let b = wrapper(
            vec![body(2, vec![row(3, vec![cell(4, 30.0, 10.0), cell(5, 50.0, 20.0)])])],
            |s| s.border_spacing = (2.0, 2.0),
        );
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        assert_eq!(content_widths(&mut ctx, &b), (86.0, 86.0));
    }

    #[test]
    fn test_spanning_cell_widens_columns() {
        let mut wide = cell(4, 60.0, 10.0);
        wide.colspan = 2;
        let (min, max) = (vec![10.0, 30.0], vec![10.0, 30.0]);
        let mut spread_min = min.clone();
        spread(&mut spread_min, 60.0, &max);
        assert_eq!(spread_min, vec![15.0, 45.0]);
        assert_eq!(distribute_columns(&min, &[20.0, 60.0], 50.0), vec![12.5, 37.5]);
        let b = wrapper(
            vec![body(2, vec![row(3, vec![wide]), row(5, vec![cell(6, 10.0, 10.0), cell(7, 30.0, 10.0)])])],
            |_| {},
        );
        let fragment = placed(&b, 500.0);
        let widths: Vec<f32> = cells_of(&fragment).iter().map(|c| c.border_width()).collect();
        assert_eq!(widths, vec![60.0, 15.0, 45.0]);
    }
}
