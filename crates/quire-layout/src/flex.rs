//! Flex layout.
//!
//! [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! Items are laid out unfragmented at the origin once their main size is
//! known, then moved into place. A row container breaks between its flex
//! lines and a single-line column container between its items; a container
//! with a definite height is monolithic.

use std::ops::Range;

use quire_style::ComputedStyle;
use quire_style::keywords::{Alignment, ContentDistribution, Direction, FlexWrap, Overflow};
use quire_style::values::{LengthPercentage, Size};

use crate::block::{
    BodyOutcome, Containing, Frame, Slot, WidthMode, border_edges, content_size, height_bounds, layout_detached,
    padding_edges, placeholder,
};
use crate::boxes::{BoxKind, LayoutBox};
use crate::context::LayoutContext;
use crate::geometry::{EdgeSizes, clamp_size};
use crate::options::{EPSILON, MAX_FLEX_FREEZE_ROUNDS};
use crate::preferred;
use crate::resume::{FlowInput, FlowOutcome, ResumePoint};

/// Margins of an item, `None` for `auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Margins {
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
    left: Option<f32>,
}

impl Margins {
    fn of(style: &ComputedStyle, cb_width: f32) -> Self {
        Self {
            top: style.margin.top.resolve(cb_width),
            right: style.margin.right.resolve(cb_width),
            bottom: style.margin.bottom.resolve(cb_width),
            left: style.margin.left.resolve(cb_width),
        }
    }
}

/// Per-item data collected during flex layout.
///
/// [§ 9.2 Line Length Determination](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
struct FlexItem<'a> {
    source: &'a LayoutBox,
    /// Position in order-modified document order.
    index: usize,
    /// [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    /// The flex base size.
    base: f32,
    /// "The hypothetical main size is the item's flex base size clamped
    /// according to its used min and max main sizes."
    hypothetical: f32,
    min: f32,
    max: Option<f32>,
    grow: f32,
    shrink: f32,
    /// The resolved target main size after § 9.7.
    target: f32,
    violation: f32,
    frozen: bool,
    align: Alignment,
    border: EdgeSizes,
    padding: EdgeSizes,
    margins: Margins,
    /// Cross content size the item was last laid out with.
    cross: Option<f32>,
    fragment: LayoutBox,
}

impl FlexItem<'_> {
    fn main_edges(&self, row: bool) -> f32 {
        if row {
            self.border.horizontal() + self.padding.horizontal()
        } else {
            self.border.vertical() + self.padding.vertical()
        }
    }

    fn cross_edges(&self, row: bool) -> f32 {
        self.main_edges(!row)
    }

    const fn main_margins(&self, row: bool) -> (Option<f32>, Option<f32>) {
        if row {
            (self.margins.left, self.margins.right)
        } else {
            (self.margins.top, self.margins.bottom)
        }
    }

    const fn cross_margins(&self, row: bool) -> (Option<f32>, Option<f32>) {
        self.main_margins(!row)
    }

    /// Border, padding and non-auto margins on the main axis.
    fn main_extra(&self, row: bool) -> f32 {
        let (start, end) = self.main_margins(row);
        self.main_edges(row) + start.unwrap_or(0.0) + end.unwrap_or(0.0)
    }

    fn outer_target(&self, row: bool) -> f32 {
        self.target + self.main_extra(row)
    }

    /// Outer cross size of the laid-out fragment, auto margins as zero.
    fn outer_cross(&self, row: bool) -> f32 {
        let (start, end) = self.cross_margins(row);
        let border = if row {
            self.fragment.border_height()
        } else {
            self.fragment.border_width()
        };
        border + start.unwrap_or(0.0) + end.unwrap_or(0.0)
    }

    /// Distance from the cross-start margin edge to the first baseline, for
    /// items aligned by baseline in a row container.
    fn baseline_offset(&self, row: bool) -> Option<f32> {
        if !row || self.align != Alignment::Baseline {
            return None;
        }
        let margin_top = self.margins.top.unwrap_or(0.0);
        Some(match self.fragment.baseline {
            Some(baseline) => margin_top + baseline - self.fragment.border_box_y(),
            // "If the item does not have a baseline in the necessary axis,
            // then one is synthesized from the flex item's border box."
            None => margin_top + self.fragment.border_height(),
        })
    }

    /// [§ 9.4 step 11](https://www.w3.org/TR/css-flexbox-1/#algo-stretch)
    ///
    /// "If a flex item has align-self: stretch, its computed cross size
    /// property is auto, and neither of its cross-axis margins are auto, the
    /// used outer cross size is the used cross size of its flex line."
    fn stretches(&self, row: bool) -> bool {
        let style = &self.source.style;
        let cross = if row { style.height } else { style.width };
        let (start, end) = self.cross_margins(row);
        self.align == Alignment::Stretch && cross == Size::Auto && start.is_some() && end.is_some()
    }

    /// Clamp a cross content size by the item's min and max cross sizes.
    fn clamp_cross(&self, row: bool, size: f32, cb: Containing) -> f32 {
        let style = &self.source.style;
        let edges = self.cross_edges(row);
        let (min, max) = if row {
            height_bounds(style, cb.height, edges)
        } else {
            (
                content_size(style.min_width, Some(cb.width), style, edges).unwrap_or(0.0),
                content_size(style.max_width, Some(cb.width), style, edges),
            )
        };
        clamp_size(size, min, max).max(0.0)
    }

    /// Lay the item out with its target main size and, when known, its
    /// cross content size.
    fn lay_out(&mut self, ctx: &mut LayoutContext<'_>, row: bool, cb: Containing, cross: Option<f32>) {
        self.cross = cross;
        self.fragment = if row {
            layout_detached(ctx, self.source, cb, WidthMode::Definite(self.target), cross)
        } else {
            let width = match cross {
                Some(width) => WidthMode::Definite(width),
                None => self.column_width(cb),
            };
            layout_detached(ctx, self.source, cb, width, Some(self.target))
        };
    }

    /// Width of an item in a column container before lines are known.
    fn column_width(&self, cb: Containing) -> WidthMode {
        if self.stretches(false) {
            let (start, end) = self.cross_margins(false);
            let stretched = cb.width - start.unwrap_or(0.0) - end.unwrap_or(0.0) - self.cross_edges(false);
            WidthMode::Definite(self.clamp_cross(false, stretched, cb))
        } else {
            WidthMode::ShrinkToFit
        }
    }
}

/// [§ 8.3 'align-self'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
///
/// "A value of auto for align-self computes to the value of align-items on
/// the element's parent". `normal` behaves as `stretch` for flex items.
fn item_alignment(container: &ComputedStyle, item: &ComputedStyle) -> Alignment {
    let align = if item.align_self == Alignment::Auto {
        container.align_items
    } else {
        item.align_self
    };
    match align {
        Alignment::Auto | Alignment::Normal => Alignment::Stretch,
        other => other,
    }
}

fn new_item<'a>(
    ctx: &mut LayoutContext<'_>,
    container: &ComputedStyle,
    source: &'a LayoutBox,
    index: usize,
    row: bool,
    cb: Containing,
    main_size: Option<f32>,
) -> FlexItem<'a> {
    let style = &source.style;
    let mut item = FlexItem {
        source,
        index,
        base: 0.0,
        hypothetical: 0.0,
        min: 0.0,
        max: None,
        grow: style.flex_grow,
        shrink: style.flex_shrink,
        target: 0.0,
        violation: 0.0,
        frozen: false,
        align: item_alignment(container, style),
        border: border_edges(style),
        padding: padding_edges(style, cb.width),
        margins: Margins::of(style, cb.width),
        cross: None,
        fragment: source.shell(),
    };
    let edges = item.main_edges(row);

    // [§ 9.2 step 3](https://www.w3.org/TR/css-flexbox-1/#algo-main-item)
    //
    // "If the item has a definite used flex basis, that's the flex base
    // size." A basis of auto uses the main size property; content sizing is
    // the fallback.
    let basis = match style.flex_basis {
        Size::Auto if row => style.width,
        Size::Auto => style.height,
        other => other,
    };
    item.base = match content_size(basis, main_size, style, edges) {
        Some(size) => size,
        None if row => {
            let (min, max) = preferred::content_widths(ctx, source);
            if basis == Size::MinContent { min } else { max }
        }
        None => {
            let width = item.column_width(cb);
            layout_detached(ctx, source, cb, width, None).height
        }
    };

    // [§ 4.5 Automatic Minimum Size of Flex Items](https://www.w3.org/TR/css-flexbox-1/#min-size-auto)
    //
    // "the content-based minimum size ... is the smaller of its specified
    // size suggestion and its content size suggestion if its specified size
    // suggestion exists".
    let (min_property, max_property) = if row {
        (style.min_width, style.max_width)
    } else {
        (style.min_height, style.max_height)
    };
    item.min = match content_size(min_property, main_size, style, edges) {
        Some(min) => min,
        None if row && min_property == Size::Auto && style.overflow == Overflow::Visible => {
            let content_min = preferred::content_widths(ctx, source).0;
            content_size(style.width, main_size, style, edges).map_or(content_min, |w| content_min.min(w))
        }
        None => 0.0,
    };
    item.max = content_size(max_property, main_size, style, edges);
    item.hypothetical = clamp_size(item.base, item.min, item.max).max(0.0);
    item
}

/// [§ 9.3 step 5](https://www.w3.org/TR/css-flexbox-1/#algo-line-break)
///
/// "Collect consecutive items one by one until the first time that the next
/// collected item would not fit into the flex container's inner main size".
fn collect_lines(items: &[FlexItem<'_>], row: bool, available: Option<f32>, gap: f32) -> Vec<Range<usize>> {
    let Some(available) = available else {
        return vec![0..items.len()];
    };
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0.0;
    for (i, item) in items.iter().enumerate() {
        let outer = item.hypothetical + item.main_extra(row);
        if i > start && used + gap + outer > available + EPSILON {
            lines.push(start..i);
            start = i;
            used = outer;
        } else if i > start {
            used += gap + outer;
        } else {
            used = outer;
        }
    }
    lines.push(start..items.len());
    lines
}

/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
fn resolve_flexible_lengths(ctx: &mut LayoutContext<'_>, items: &mut [FlexItem<'_>], row: bool, available: f32) {
    // STEP 1: "Determine the used flex factor."
    let hypothetical: f32 = items.iter().map(|i| i.hypothetical + i.main_extra(row)).sum();
    let growing = hypothetical < available;

    // STEP 2: "Size inflexible items."
    for item in items.iter_mut() {
        item.target = item.hypothetical;
        let factor = if growing { item.grow } else { item.shrink };
        item.frozen = factor == 0.0
            || (growing && item.base > item.hypothetical)
            || (!growing && item.base < item.hypothetical);
    }

    // STEP 3: "Calculate initial free space."
    let used = |items: &[FlexItem<'_>]| -> f32 {
        items
            .iter()
            .map(|i| if i.frozen { i.target } else { i.base } + i.main_extra(row))
            .sum()
    };
    let initial_free = available - used(items);

    // STEP 4: Loop until every item is frozen.
    let mut rounds = 0;
    while items.iter().any(|i| !i.frozen) {
        if rounds == MAX_FLEX_FREEZE_ROUNDS {
            ctx.warn("flex length resolution did not settle; keeping the last sizes");
            break;
        }
        rounds += 1;

        // 4b. "Calculate the remaining free space".
        let remaining = available - used(items);
        let factor_sum: f32 = items
            .iter()
            .filter(|i| !i.frozen)
            .map(|i| if growing { i.grow } else { i.shrink })
            .sum();
        // "If the sum of the unfrozen flex items' flex factors is less than
        // one, multiply the initial free space by this sum. If the magnitude
        // of this value is less than the magnitude of the remaining free
        // space, use this as the remaining free space."
        let free = if factor_sum < 1.0 {
            let scaled = initial_free * factor_sum;
            if scaled.abs() < remaining.abs() { scaled } else { remaining }
        } else {
            remaining
        };

        // 4c. "Distribute free space proportional to the flex factors."
        if growing {
            for item in items.iter_mut().filter(|i| !i.frozen) {
                item.target = if factor_sum > 0.0 {
                    (item.grow / factor_sum).mul_add(free, item.base)
                } else {
                    item.base
                };
            }
        } else {
            // "For every unfrozen item on the line, multiply its flex shrink
            // factor by its inner flex base size, and note this as its scaled
            // flex shrink factor."
            let scaled_sum: f32 = items
                .iter()
                .filter(|i| !i.frozen)
                .map(|i| i.shrink * i.base)
                .sum();
            for item in items.iter_mut().filter(|i| !i.frozen) {
                item.target = if scaled_sum > 0.0 {
                    free.abs().mul_add(-(item.shrink * item.base / scaled_sum), item.base)
                } else {
                    item.base
                };
            }
        }

        // 4d. "Fix min/max violations."
        let mut total_violation = 0.0;
        for item in items.iter_mut().filter(|i| !i.frozen) {
            let clamped = clamp_size(item.target, item.min, item.max).max(0.0);
            item.violation = clamped - item.target;
            total_violation += item.violation;
            item.target = clamped;
        }

        // 4e. "Freeze over-flexed items."
        //
        // "Zero: Freeze all items. Positive: Freeze all the items with min
        // violations. Negative: Freeze all the items with max violations."
        for item in items.iter_mut().filter(|i| !i.frozen) {
            item.frozen = if total_violation.abs() < EPSILON {
                true
            } else if total_violation > 0.0 {
                item.violation > 0.0
            } else {
                item.violation < 0.0
            };
        }
    }

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[FLEX] resolved {} items in {rounds} rounds: {:?}",
        items.len(),
        items.iter().map(|i| i.target).collect::<Vec<_>>()
    );
}

/// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
/// and [§ 8.4 'align-content'](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
///
/// Returns the offset of the first item and the extra space between items.
#[must_use]
pub fn distribute(distribution: ContentDistribution, free: f32, count: usize) -> (f32, f32) {
    if count == 0 {
        return (0.0, 0.0);
    }
    let n = count as f32;
    match distribution {
        ContentDistribution::End | ContentDistribution::FlexEnd | ContentDistribution::Right => (free, 0.0),
        ContentDistribution::Center => (free / 2.0, 0.0),
        // "If the leftover free-space is negative or there is only a single
        // flex item on the line, this value is identical to flex-start."
        ContentDistribution::SpaceBetween if count > 1 && free > 0.0 => (0.0, free / (n - 1.0)),
        // "If the leftover free-space is negative or there is only a single
        // flex item on the line, this value is identical to center."
        ContentDistribution::SpaceAround | ContentDistribution::SpaceEvenly if free < 0.0 => (free / 2.0, 0.0),
        ContentDistribution::SpaceAround => (free / n / 2.0, free / n),
        ContentDistribution::SpaceEvenly => (free / (n + 1.0), free / (n + 1.0)),
        _ => (0.0, 0.0),
    }
}

/// [§ 8 Gaps Between Boxes](https://www.w3.org/TR/css-align-3/#gaps)
///
/// Used `row-gap`/`column-gap`; `normal` is zero in flex and grid
/// containers.
#[must_use]
pub fn gap(value: Option<LengthPercentage>, basis: Option<f32>) -> f32 {
    value.map_or(0.0, |gap| gap.resolve_definite(basis).unwrap_or(0.0))
}

/// One piece a flex container may break after: a line, or an item of a
/// single-line column container.
struct Unit {
    items: Range<usize>,
    bottom: f32,
}

/// [§ 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
///
/// Lay out one fragment of a flex container.
pub fn layout_flex(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot, input: FlowInput<'_>) -> FlowOutcome {
    let style = &b.style;
    let resuming = input.resume.is_some();
    let row = style.flex_direction.is_row();
    let rtl = style.direction == Direction::Rtl;

    // STEP 1: Resolve the container's own box, as for a block.
    let frame = Frame::open(ctx, b, slot, &input);
    let (content_x, content_y) = (frame.content_x, frame.content_y);
    let width = frame.horizontal.width;
    let definite_height = frame.height;
    let (min_height, max_height) = (frame.min_height, frame.max_height);
    let cb = frame.containing();
    let main_size = if row { Some(width) } else { definite_height };
    let (main_gap, cross_gap) = if row {
        (gap(style.column_gap, Some(width)), gap(style.row_gap, definite_height))
    } else {
        (gap(style.row_gap, definite_height), gap(style.column_gap, Some(width)))
    };

    // STEP 2: Collect the items in order-modified document order.
    //
    // [§ 4.1 Absolutely-Positioned Flex Children](https://www.w3.org/TR/css-flexbox-1/#abspos-items)
    // "An absolutely-positioned child of a flex container does not
    // participate in flex layout."
    let mut children = Vec::new();
    if !resuming {
        for child in b.children.iter().filter(|c| c.is_absolutely_positioned()) {
            children.push(placeholder(child, content_x, content_y));
            ctx.register_absolute(child);
        }
    }
    let mut sources: Vec<&LayoutBox> = b.children.iter().filter(|c| !c.is_absolutely_positioned()).collect();
    sources.sort_by_key(|c| c.style.order);
    let start = input.resume.and_then(ResumePoint::child_index).unwrap_or(0).min(sources.len());
    let checkpoint = ctx.checkpoint();
    let mut items: Vec<FlexItem<'_>> = sources
        .iter()
        .enumerate()
        .skip(start)
        .map(|(index, source)| new_item(ctx, style, source, index, row, cb, main_size))
        .collect();

    // STEP 3: Collect items into flex lines and resolve their main sizes.
    let wrap = style.flex_wrap != FlexWrap::Nowrap;
    let lines = collect_lines(&items, row, main_size.filter(|_| wrap), main_gap);
    for line in &lines {
        let line_items = &mut items[line.clone()];
        let gaps = main_gap * line_items.len().saturating_sub(1) as f32;
        match main_size {
            Some(size) => resolve_flexible_lengths(ctx, line_items, row, size - gaps),
            None => {
                for item in line_items.iter_mut() {
                    item.target = item.hypothetical;
                }
            }
        }
    }
    let main_extent = main_size.unwrap_or_else(|| {
        lines
            .iter()
            .map(|line| {
                let line_items = &items[line.clone()];
                line_items.iter().map(|i| i.outer_target(row)).sum::<f32>()
                    + main_gap * line_items.len().saturating_sub(1) as f32
            })
            .fold(0.0, f32::max)
    });

    // STEP 4: Hypothetical cross sizes.
    //
    // [§ 9.4 step 7](https://www.w3.org/TR/css-flexbox-1/#algo-cross-item)
    // "Determine the hypothetical cross size of each item by performing
    // layout with the used main size and the available space".
    for item in &mut items {
        item.lay_out(ctx, row, cb, None);
    }

    // STEP 5: Cross size of each line.
    //
    // [§ 9.4 step 8](https://www.w3.org/TR/css-flexbox-1/#algo-cross-line)
    let mut line_cross: Vec<f32> = lines
        .iter()
        .map(|line| {
            let mut size: f32 = 0.0;
            let (mut above, mut below): (f32, f32) = (0.0, 0.0);
            for item in &items[line.clone()] {
                let outer = item.outer_cross(row);
                if let Some(offset) = item.baseline_offset(row) {
                    above = above.max(offset);
                    below = below.max(outer - offset);
                } else {
                    size = size.max(outer);
                }
            }
            size.max(above + below)
        })
        .collect();
    let cross_definite = if row { definite_height } else { Some(width) };
    // "If the flex container is single-line and has a definite cross size,
    // the cross size of the flex line is the flex container's inner cross
    // size." Otherwise it is clamped to the container's min and max.
    if !wrap && let Some(first) = line_cross.first_mut() {
        *first = match cross_definite {
            Some(size) => size,
            None if row => clamp_size(*first, min_height, max_height),
            None => *first,
        };
    }

    // STEP 6: Distribute free cross space among the lines.
    //
    // [§ 9.4 step 9](https://www.w3.org/TR/css-flexbox-1/#algo-line-stretch)
    let cross_gaps = cross_gap * lines.len().saturating_sub(1) as f32;
    let mut line_offset = 0.0;
    let mut line_spacing = 0.0;
    if wrap && let Some(cross) = cross_definite {
        let free = cross - line_cross.iter().sum::<f32>() - cross_gaps;
        match style.align_content {
            ContentDistribution::Normal | ContentDistribution::Stretch if free > 0.0 => {
                let share = free / line_cross.len() as f32;
                for size in &mut line_cross {
                    *size += share;
                }
            }
            distribution => {
                (line_offset, line_spacing) = distribute(distribution, free, line_cross.len());
            }
        }
    }
    let cross_extent = cross_definite.unwrap_or_else(|| line_cross.iter().sum::<f32>() + cross_gaps);

    // STEP 7: Stretch items to their line.
    for (line, &cross) in lines.iter().zip(&line_cross) {
        for item in &mut items[line.clone()] {
            if !item.stretches(row) {
                continue;
            }
            let (start, end) = item.cross_margins(row);
            let size = cross - start.unwrap_or(0.0) - end.unwrap_or(0.0) - item.cross_edges(row);
            let size = item.clamp_cross(row, size, cb);
            let current = if row { item.fragment.height } else { item.fragment.width };
            if (size - current).abs() > EPSILON {
                item.lay_out(ctx, row, cb, Some(size));
            }
        }
    }

    // STEP 8: Main-axis and cross-axis alignment, then placement.
    //
    // [§ 9.5 Main-Axis Alignment](https://www.w3.org/TR/css-flexbox-1/#main-alignment)
    // [§ 9.6 Cross-Axis Alignment](https://www.w3.org/TR/css-flexbox-1/#cross-alignment)
    let flip_main = if row {
        style.flex_direction.is_reverse() != rtl
    } else {
        style.flex_direction.is_reverse()
    };
    let flip_cross = (style.flex_wrap == FlexWrap::WrapReverse) != (!row && rtl);
    let justify = match style.justify_content {
        ContentDistribution::Normal | ContentDistribution::Stretch => ContentDistribution::FlexStart,
        other => other,
    };
    let mut units: Vec<Unit> = Vec::new();
    let mut cross_cursor = line_offset;
    for (line, &cross) in lines.iter().zip(&line_cross) {
        let line_items = &mut items[line.clone()];
        let count = line_items.len();
        let used: f32 =
            line_items.iter().map(|i| i.outer_target(row)).sum::<f32>() + main_gap * count.saturating_sub(1) as f32;
        let free = main_extent - used;
        let auto_margins: usize = line_items
            .iter()
            .map(|i| {
                let (start, end) = i.main_margins(row);
                usize::from(start.is_none()) + usize::from(end.is_none())
            })
            .sum();
        // "If the remaining free space is positive and at least one main-axis
        // margin on this line is auto, distribute the free space equally
        // among these margins."
        let auto_share = if auto_margins > 0 && free > 0.0 {
            free / auto_margins as f32
        } else {
            0.0
        };
        let (first, between) = if auto_margins > 0 && free > 0.0 {
            (0.0, 0.0)
        } else {
            distribute(justify, free, count)
        };
        let baseline = line_items.iter().filter_map(|i| i.baseline_offset(row)).fold(0.0, f32::max);

        let mut main_cursor = first;
        for item in line_items.iter_mut() {
            let (ms, me) = item.main_margins(row);
            let main_start = ms.unwrap_or(auto_share);
            let main_end = me.unwrap_or(auto_share);
            let outer_main = item.target + item.main_edges(row) + main_start + main_end;

            let outer_cross = item.outer_cross(row);
            let cross_free = cross - outer_cross;
            let (cs, ce) = item.cross_margins(row);
            // [§ 8.1 Aligning with auto margins](https://www.w3.org/TR/css-flexbox-1/#auto-margins)
            let (cross_start, cross_end, offset) = match (cs, ce) {
                (None, None) if cross_free > 0.0 => (cross_free / 2.0, cross_free / 2.0, 0.0),
                (None, Some(end)) if cross_free > 0.0 => (cross_free, end, 0.0),
                (Some(start), None) if cross_free > 0.0 => (start, cross_free, 0.0),
                (start, end) => {
                    let offset = match item.align {
                        Alignment::FlexEnd | Alignment::End | Alignment::SelfEnd => cross_free,
                        Alignment::Center => cross_free / 2.0,
                        Alignment::Baseline if row => baseline - item.baseline_offset(row).unwrap_or(0.0),
                        _ => 0.0,
                    };
                    (start.unwrap_or(0.0), end.unwrap_or(0.0), offset)
                }
            };
            let outer_cross = outer_cross - cs.unwrap_or(0.0) - ce.unwrap_or(0.0) + cross_start + cross_end;

            let mut main_pos = main_cursor;
            let mut cross_pos = cross_cursor + offset;
            let (mut main_margins, mut cross_margins) = ((main_start, main_end), (cross_start, cross_end));
            if flip_main {
                main_pos = main_extent - main_pos - outer_main;
                main_margins = (main_end, main_start);
            }
            if flip_cross {
                cross_pos = cross_extent - cross_pos - outer_cross;
                cross_margins = (cross_end, cross_start);
            }
            let (x, y, margin) = if row {
                (
                    main_pos,
                    cross_pos,
                    EdgeSizes {
                        top: cross_margins.0,
                        right: main_margins.1,
                        bottom: cross_margins.1,
                        left: main_margins.0,
                    },
                )
            } else {
                (
                    cross_pos,
                    main_pos,
                    EdgeSizes {
                        top: main_margins.0,
                        right: cross_margins.1,
                        bottom: main_margins.1,
                        left: cross_margins.0,
                    },
                )
            };
            item.fragment
                .place_border_box(content_x + x + margin.left, content_y + y + margin.top, margin);
            main_cursor += outer_main + between + main_gap;
        }
        cross_cursor += cross + line_spacing + cross_gap;
    }

    // STEP 9: Find where this fragment ends.
    //
    // [§ 10 Fragmenting Flex Layout](https://www.w3.org/TR/css-flexbox-1/#pagination)
    // "Fragmentation ... between flex lines" for multi-line row containers,
    // "between items" for single-line column containers.
    if row && !flip_cross {
        let mut top = content_y + line_offset;
        for (line, &cross) in lines.iter().zip(&line_cross) {
            units.push(Unit {
                items: line.clone(),
                bottom: top + cross,
            });
            top += cross + line_spacing + cross_gap;
        }
    } else if !row && !wrap && !flip_main {
        for (i, item) in items.iter().enumerate() {
            units.push(Unit {
                items: i..i + 1,
                bottom: item.fragment.margin_box().bottom(),
            });
        }
    } else if !items.is_empty() {
        let bottom = items
            .iter()
            .map(|i| i.fragment.margin_box().bottom())
            .fold(content_y, f32::max);
        units.push(Unit {
            items: 0..items.len(),
            bottom,
        });
    }
    let monolithic = definite_height.is_some();
    let limit = frame.content_limit(ctx, &input);
    let mut keep = units.len();
    if !monolithic && let Some(k) = units.iter().position(|u| u.bottom > limit + EPSILON) {
        keep = if k == 0 && input.page_is_empty { 1 } else { k };
        if keep == 0 {
            return FlowOutcome::pushed();
        }
    }
    let complete = keep == units.len();
    let kept_items = if keep == 0 { 0 } else { units[keep - 1].items.end };
    let resume = (!complete).then(|| ResumePoint::at_child(items[units[keep].items.start].index));
    if !complete {
        // Items past the break were laid out for sizing only: drop what
        // they registered and lay the kept items out again in place.
        ctx.rollback(checkpoint);
        for item in &mut items[..kept_items] {
            let border_box = item.fragment.border_box();
            let margin = item.fragment.margin;
            item.lay_out(ctx, row, cb, item.cross);
            item.fragment.place_border_box(border_box.x, border_box.y, margin);
        }
    }

    // STEP 10: Container height.
    //
    // [§ 9.9 Cross Size Determination](https://www.w3.org/TR/css-flexbox-1/#algo-cross-container)
    let content_height = match definite_height {
        Some(height) => height,
        None if !complete => units[keep - 1].bottom - content_y,
        None if row => cross_extent,
        None => main_extent,
    };
    children.extend(items.into_iter().take(kept_items).map(|i| i.fragment));
    // [§ 8.5 Flex Container Baselines](https://www.w3.org/TR/css-flexbox-1/#flex-baselines)
    let baseline = children
        .iter()
        .find(|c| c.kind != BoxKind::AbsolutePlaceholder)
        .and_then(|c| c.baseline);

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[FLEX] {:?} {} of {} units, content height {content_height} complete={complete}",
        b.id,
        keep,
        units.len()
    );

    let body = BodyOutcome {
        children,
        resume,
        baseline,
        ..BodyOutcome::default()
    };
    frame.close(ctx, b, slot, &input, content_height, body, monolithic || units.is_empty())
}

/// [§ 9.9.1 Flex Container Intrinsic Main Sizes](https://www.w3.org/TR/css-flexbox-1/#intrinsic-main-sizes)
pub fn content_widths(ctx: &mut LayoutContext<'_>, b: &LayoutBox) -> (f32, f32) {
    let style = &b.style;
    let row = style.flex_direction.is_row();
    let wrap = style.flex_wrap != FlexWrap::Nowrap;
    let mut min: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut count = 0;
    for child in b.children.iter().filter(|c| !c.is_absolutely_positioned()) {
        let (child_min, child_max) = preferred::outer_widths(ctx, child);
        if row {
            min = if wrap { min.max(child_min) } else { min + child_min };
            max += child_max;
        } else {
            min = min.max(child_min);
            max = max.max(child_max);
        }
        count += 1;
    }
    if row && count > 1 {
        let gaps = gap(style.column_gap, None) * (count - 1) as f32;
        max += gaps;
        if !wrap {
            min += gaps;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::Display;
    use quire_style::keywords::FlexDirection;

    use crate::block::layout_block_level;
    use crate::boxes::BoxId;
    use crate::float::FloatContext;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::resume::LayoutResult;
    use crate::text::{MonospaceShaper, NoHyphenation};

    fn item(id: usize, width: Size, height: Size, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        style.width = width;
        style.height = height;
        f(&mut style);
        LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style))
    }

    fn container(children: Vec<LayoutBox>, f: impl FnOnce(&mut ComputedStyle)) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::flex();
        f(&mut style);
        let mut b = LayoutBox::new(BoxId(0), BoxKind::Flex, Arc::new(style));
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
    fn test_equal_grow_from_zero_basis() {
        let grow = |s: &mut ComputedStyle| {
            s.flex_grow = 1.0;
            s.flex_basis = Size::Length(0.0);
        };
        let b = container(
            vec![
                item(1, Size::Auto, Size::Length(10.0), grow),
                item(2, Size::Auto, Size::Length(10.0), grow),
                item(3, Size::Auto, Size::Length(10.0), grow),
            ],
            |_| {},
        );
        let fragment = placed(&b, 90.0);
        assert_eq!(
            rects(&fragment),
            vec![(0.0, 0.0, 30.0, 10.0), (30.0, 0.0, 30.0, 10.0), (60.0, 0.0, 30.0, 10.0)]
        );
        assert_eq!(fragment.height, 10.0);
    }

    #[test]
    fn test_justify_center_and_reverse() {
        let b = container(
            vec![
                item(1, Size::Length(20.0), Size::Length(5.0), |_| {}),
                item(2, Size::Length(30.0), Size::Length(5.0), |_| {}),
            ],
            |s| s.justify_content = ContentDistribution::Center,
        );
        let xs: Vec<f32> = placed(&b, 100.0).children.iter().map(|c| c.position_x).collect();
        assert_eq!(xs, vec![25.0, 45.0]);

        let b = container(
            vec![
                item(1, Size::Length(20.0), Size::Length(5.0), |_| {}),
                item(2, Size::Length(30.0), Size::Length(5.0), |_| {}),
            ],
            |s| s.flex_direction = FlexDirection::RowReverse,
        );
        let xs: Vec<f32> = placed(&b, 100.0).children.iter().map(|c| c.position_x).collect();
        assert_eq!(xs, vec![80.0, 50.0]);
    }

    #[test]
    fn test_shrink_respects_min_width() {
        let b = container(
            vec![
                item(1, Size::Length(80.0), Size::Length(5.0), |s| s.min_width = Size::Length(70.0)),
                item(2, Size::Length(80.0), Size::Length(5.0), |_| {}),
            ],
            |_| {},
        );
        let widths: Vec<f32> = placed(&b, 100.0).children.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![70.0, 30.0]);
    }

    #[test]
    fn test_wrap_and_stretch() {
        let b = container(
            vec![
                item(1, Size::Length(40.0), Size::Length(20.0), |_| {}),
                item(2, Size::Length(40.0), Size::Auto, |_| {}),
                item(3, Size::Length(40.0), Size::Length(10.0), |_| {}),
            ],
            |s| s.flex_wrap = FlexWrap::Wrap,
        );
        let fragment = placed(&b, 100.0);
        assert_eq!(
            rects(&fragment),
            vec![(0.0, 0.0, 40.0, 20.0), (40.0, 0.0, 40.0, 20.0), (0.0, 20.0, 40.0, 10.0)]
        );
        assert_eq!(fragment.height, 30.0);
    }

    #[test]
    fn test_column_direction() {
        let b = container(
            vec![
                item(1, Size::Auto, Size::Length(10.0), |_| {}),
                item(2, Size::Length(30.0), Size::Length(20.0), |_| {}),
            ],
            |s| {
                s.flex_direction = FlexDirection::Column;
                s.align_items = Alignment::Center;
            },
        );
        let fragment = placed(&b, 100.0);
        assert_eq!(rects(&fragment)[1], (35.0, 10.0, 30.0, 20.0));
        assert_eq!(fragment.height, 30.0);
    }

    #[test]
    fn test_breaks_between_lines() {
        let b = container(
            vec![
                item(1, Size::Length(60.0), Size::Length(10.0), |_| {}),
                item(2, Size::Length(60.0), Size::Length(10.0), |_| {}),
                item(3, Size::Length(60.0), Size::Length(10.0), |_| {}),
            ],
            |s| s.flex_wrap = FlexWrap::Wrap,
        );
        let input = FlowInput {
            bottom_space: 25.0,
            ..FlowInput::unfragmented()
        };
        let outcome = lay_out(&b, 100.0, input);
        let LayoutResult::Partial(fragment, resume) = outcome.result else {
            panic!("expected a partial fragment");
        };
        assert_eq!(fragment.children.len(), 2);
        assert_eq!(fragment.height, 20.0);
        assert_eq!(resume, ResumePoint::at_child(2));

        let input = FlowInput {
            resume: Some(&resume),
            ..FlowInput::unfragmented()
        };
        let rest = lay_out(&b, 100.0, input).result.fragment().cloned().unwrap();
        assert_eq!(rest.children.len(), 1);
        assert_eq!(rest.children[0].id, BoxId(3));
    }

    #[test]
    fn test_content_widths_row() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let b = container(
            vec![
                item(1, Size::Length(20.0), Size::Auto, |_| {}),
                item(2, Size::Length(30.0), Size::Auto, |_| {}),
            ],
            |s| s.column_gap = Some(LengthPercentage::Length(5.0)),
        );
        assert_eq!(content_widths(&mut ctx, &b), (55.0, 55.0));
    }
}
