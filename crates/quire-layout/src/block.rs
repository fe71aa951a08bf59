//! Block formatting contexts.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a block
//! formatting context collapse."
//!
//! Every block-level layout call goes through [`layout_block_level`], which
//! dispatches on the box kind. Block containers are laid out here; their
//! inline content is handed to [`crate::inline`].
//!
//! Margins are carried as a chain: the cursor is the bottom of the last
//! content placed, and `pending` lists every margin adjoining it. A child
//! whose top margin may collapse receives the chain and settles it itself,
//! which is what lets collapsing reach through empty boxes and into first
//! children.

use quire_style::ComputedStyle;
use quire_style::keywords::{BoxDecorationBreak, BoxSizing, BreakBetween, Clear, Direction, Position};
use quire_style::values::{LengthPercentageAuto, Size};

use crate::absolute;
use crate::boxes::{BoxKind, LayoutBox};
use crate::columns;
use crate::context::{Checkpoint, LayoutContext};
use crate::flex;
use crate::float::{FloatContext, layout_float};
use crate::geometry::{EdgeSizes, clamp_size, collapse_margins};
use crate::grid;
use crate::inline;
use crate::options::{EPSILON, MAX_PAGE_RETRIES};
use crate::preferred;
use crate::replaced;
use crate::resume::{FlowInput, FlowOutcome, LayoutResult, ResumePoint};
use crate::table;

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// The parts of a containing block percentages resolve against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Containing {
    /// Content width of the containing block.
    pub width: f32,
    /// Content height, when it is definite.
    pub height: Option<f32>,
}

/// How the used width of a box is found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthMode {
    /// Normal flow: `auto` fills the available width.
    Fill,
    /// Floats, inline-blocks and absolutes: `auto` shrinks to fit.
    ShrinkToFit,
    /// The content width was decided by the parent's layout mode.
    Definite(f32),
}

/// Where a block-level box goes and what it may use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Left margin edge.
    pub x: f32,
    /// Top of the margin chain the box continues.
    pub y: f32,
    /// Containing block.
    pub cb: Containing,
    /// Width available to the margin box. Differs from `cb.width` beside
    /// floats.
    pub available: f32,
    /// Width resolution mode.
    pub width: WidthMode,
    /// Content height imposed by the parent's layout mode.
    pub height: Option<f32>,
}

impl Slot {
    /// A normal-flow slot spanning the containing block.
    #[must_use]
    pub const fn new(x: f32, y: f32, cb: Containing) -> Self {
        Self {
            x,
            y,
            cb,
            available: cb.width,
            width: WidthMode::Fill,
            height: None,
        }
    }
}

/// Used horizontal metrics of a block-level box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    /// Content width.
    pub width: f32,
    /// Used left margin.
    pub margin_left: f32,
    /// Used right margin.
    pub margin_right: f32,
    /// Border widths, all sides.
    pub border: EdgeSizes,
    /// Padding, all sides; percentages refer to the containing block width.
    pub padding: EdgeSizes,
}

/// Border widths of a style.
#[must_use]
pub fn border_edges(style: &ComputedStyle) -> EdgeSizes {
    EdgeSizes::from(style.border_widths())
}

/// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
///
/// "The percentage is calculated with respect to the width of the generated
/// box's containing block, even for 'padding-top' and 'padding-bottom'."
#[must_use]
pub fn padding_edges(style: &ComputedStyle, cb_width: f32) -> EdgeSizes {
    EdgeSizes {
        top: style.padding.top.resolve(cb_width),
        right: style.padding.right.resolve(cb_width),
        bottom: style.padding.bottom.resolve(cb_width),
        left: style.padding.left.resolve(cb_width),
    }
}

/// [§ 4 Box Sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
///
/// Resolve a sizing property to a content-box size. `edges` is the border
/// plus padding of that axis, subtracted for `box-sizing: border-box`.
#[must_use]
pub fn content_size(value: Size, basis: Option<f32>, style: &ComputedStyle, edges: f32) -> Option<f32> {
    value.resolve(basis).map(|v| match style.box_sizing {
        BoxSizing::BorderBox => (v - edges).max(0.0),
        BoxSizing::ContentBox => v,
    })
}

/// `height` as a content height, `None` for `auto` and percentages of an
/// indefinite containing block.
#[must_use]
pub fn resolve_height(style: &ComputedStyle, cb_height: Option<f32>, edges: f32) -> Option<f32> {
    content_size(style.height, cb_height, style, edges)
}

/// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
#[must_use]
pub fn height_bounds(style: &ComputedStyle, cb_height: Option<f32>, edges: f32) -> (f32, Option<f32>) {
    let min = content_size(style.min_height, cb_height, style, edges).unwrap_or(0.0);
    let max = content_size(style.max_height, cb_height, style, edges);
    (min, max)
}

/// A width given as a sizing keyword or a length, as a content width.
fn specified_width(
    ctx: &mut LayoutContext<'_>,
    b: &LayoutBox,
    value: Size,
    cb_width: f32,
    available: f32,
) -> Option<f32> {
    let edges = border_edges(&b.style).horizontal() + padding_edges(&b.style, cb_width).horizontal();
    match value {
        Size::MinContent => Some(preferred::content_widths(ctx, b).0),
        Size::MaxContent => Some(preferred::content_widths(ctx, b).1),
        Size::FitContent => Some(preferred::shrink_to_fit(ctx, b, available - edges)),
        other => content_size(other, Some(cb_width), &b.style, edges),
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
fn width_bounds(ctx: &mut LayoutContext<'_>, b: &LayoutBox, cb_width: f32, available: f32) -> (f32, Option<f32>) {
    let min = specified_width(ctx, b, b.style.min_width, cb_width, available).unwrap_or(0.0);
    let max = specified_width(ctx, b, b.style.max_width, cb_width, available);
    (min, max)
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// Calculate the used width and horizontal margins of a block-level box.
///
/// "The following constraints must hold among the used values of the other
/// properties:
///
/// 'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
pub fn resolve_width(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot) -> Horizontal {
    let style = &b.style;
    let cb_width = slot.cb.width;

    // STEP 1: Resolve border and padding.
    // [§ 8.4](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    let border = border_edges(style);
    let padding = padding_edges(style, cb_width);
    let edges = border.horizontal() + padding.horizontal();
    let margin_left = style.margin.left.resolve(cb_width);
    let margin_right = style.margin.right.resolve(cb_width);
    let fixed_margins = margin_left.unwrap_or(0.0) + margin_right.unwrap_or(0.0);

    // STEP 2: Find the tentative width.
    //
    // "If 'width' is set to 'auto', any other 'auto' values become '0' and
    // 'width' follows from the resulting equality."
    //
    // [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    // "If 'width' is computed as 'auto', the used value is the
    // 'shrink-to-fit' width."
    let specified = match slot.width {
        WidthMode::Definite(w) => Some(w),
        WidthMode::Fill | WidthMode::ShrinkToFit => {
            specified_width(ctx, b, style.width, cb_width, slot.available)
        }
    };
    let tentative = match (specified, slot.width) {
        (Some(w), _) => w,
        (None, WidthMode::ShrinkToFit) => {
            preferred::shrink_to_fit(ctx, b, slot.available - fixed_margins - edges)
        }
        (None, _) => slot.available - fixed_margins - edges,
    };

    // STEP 3: Apply min-width and max-width.
    // [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    //
    // "If the tentative used width is greater than 'max-width', the rules
    // above are applied again, but this time using the computed value of
    // 'max-width' as the computed value for 'width'."
    let width = if let WidthMode::Definite(w) = slot.width {
        w.max(0.0)
    } else {
        let (min, max) = width_bounds(ctx, b, cb_width, slot.available);
        clamp_size(tentative, min, max).max(0.0)
    };
    let auto_width = specified.is_none() && (width - tentative).abs() <= EPSILON;

    // STEP 4: Resolve auto margins.
    let (margin_left, margin_right) = if slot.width == WidthMode::ShrinkToFit || auto_width {
        // "If 'margin-left', or 'margin-right' are computed as 'auto', their
        // used value is '0'."
        (margin_left.unwrap_or(0.0), margin_right.unwrap_or(0.0))
    } else {
        resolve_auto_margins(style, slot.available, width + edges, margin_left, margin_right)
    };

    Horizontal {
        width,
        margin_left,
        margin_right,
        border,
        padding,
    }
}

/// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth) rules for a
/// box whose width is not `auto`.
fn resolve_auto_margins(
    style: &ComputedStyle,
    available: f32,
    border_box: f32,
    left: Option<f32>,
    right: Option<f32>,
) -> (f32, f32) {
    // RULE A: "If 'width' is not 'auto' and 'border-left-width' +
    // 'padding-left' + 'width' + 'padding-right' + 'border-right-width'
    // (plus any of 'margin-left' or 'margin-right' that are not 'auto') is
    // larger than the width of the containing block, then any 'auto' values
    // for 'margin-left' or 'margin-right' are, for the following rules,
    // treated as zero."
    let (left, right) = if border_box + left.unwrap_or(0.0) + right.unwrap_or(0.0) > available + EPSILON {
        (Some(left.unwrap_or(0.0)), Some(right.unwrap_or(0.0)))
    } else {
        (left, right)
    };
    let slack = available - border_box;
    match (left, right) {
        // RULE B: "If both 'margin-left' and 'margin-right' are 'auto', their
        // used values are equal. This horizontally centers the element with
        // respect to the edges of the containing block."
        (None, None) => (slack / 2.0, slack / 2.0),
        // RULE C: "If there is exactly one value specified as 'auto', its
        // used value follows from the equality."
        (None, Some(r)) => (slack - r, r),
        (Some(l), None) => (l, slack - l),
        // RULE D: "If all of the above have a computed value other than
        // 'auto', the values are said to be 'over-constrained' and one of
        // the used values will have to be different from its computed value.
        // If the 'direction' property of the containing block has the value
        // 'ltr', the specified value of 'margin-right' is ignored and the
        // value is calculated so as to make the equality true. If the value
        // of 'direction' is 'rtl', this happens to 'margin-left' instead."
        (Some(l), Some(r)) => match style.direction {
            Direction::Ltr => (l, slack - l),
            Direction::Rtl => (slack - r, r),
        },
    }
}

/// Lay out one block-level box for the current fragmentainer.
///
/// `floats` is the float context of the block formatting context the box
/// takes part in; boxes establishing their own context ignore it.
pub fn layout_block_level(
    ctx: &mut LayoutContext<'_>,
    b: &LayoutBox,
    slot: &Slot,
    input: FlowInput<'_>,
    floats: &mut FloatContext,
) -> FlowOutcome {
    let absolutes = ctx.pending_absolutes.len();
    let mut outcome = match b.kind {
        BoxKind::Flex => flex::layout_flex(ctx, b, slot, input),
        BoxKind::Grid => grid::layout_grid(ctx, b, slot, input),
        BoxKind::TableWrapper => table::layout_table(ctx, b, slot, input),
        BoxKind::Replaced(_) => layout_replaced(ctx, b, slot, &input),
        _ if b.style.is_multicol() && b.is_block_container() => columns::layout_multicol(ctx, b, slot, input),
        _ => layout_block_container(ctx, b, slot, input, floats),
    };

    // [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    // "If the element has 'position: absolute', the containing block is
    // established by the nearest ancestor with a 'position' other than
    // 'static'".
    if b.style.is_positioned() {
        match &mut outcome.result {
            LayoutResult::Complete(fragment) | LayoutResult::Partial(fragment, _) => {
                absolute::resolve_pending(ctx, fragment, absolutes);
            }
            LayoutResult::Pushed => {}
        }
    }
    outcome
}

/// Lay out an atomic inline-level box at the origin, shrink-to-fit and
/// unfragmented.
pub fn layout_atomic(ctx: &mut LayoutContext<'_>, b: &LayoutBox, cb: Containing) -> LayoutBox {
    layout_detached(ctx, b, cb, WidthMode::ShrinkToFit, None)
}

/// Lay out a box at the origin, unfragmented, with the width mode and the
/// content height its parent's layout mode decided. Flex items, grid items
/// and table cells are laid out this way and moved into place afterwards.
pub fn layout_detached(
    ctx: &mut LayoutContext<'_>,
    b: &LayoutBox,
    cb: Containing,
    width: WidthMode,
    height: Option<f32>,
) -> LayoutBox {
    let slot = Slot {
        width,
        height,
        ..Slot::new(0.0, 0.0, cb)
    };
    let mut floats = FloatContext::new();
    let outcome = layout_block_level(ctx, b, &slot, FlowInput::unfragmented(), &mut floats);
    match outcome.result {
        LayoutResult::Complete(fragment) | LayoutResult::Partial(fragment, _) => fragment,
        LayoutResult::Pushed => b.shell(),
    }
}

/// [§ 10.3.4 Block-level, replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#block-replaced-width)
///
/// "The used value of 'width' is determined as for inline replaced
/// elements. Then the rules for non-replaced block-level elements are
/// applied to determine the margins."
fn layout_replaced(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot, input: &FlowInput<'_>) -> FlowOutcome {
    let (width, height) = replaced::used_size(b, slot.cb);
    let resolved = Slot {
        width: WidthMode::Definite(width),
        height: Some(height),
        ..*slot
    };
    let mut h = resolve_width(ctx, b, &resolved);
    if slot.width == WidthMode::ShrinkToFit {
        h.margin_left = b.style.margin.left.resolve_or_zero(slot.cb.width);
        h.margin_right = b.style.margin.right.resolve_or_zero(slot.cb.width);
    }
    let margin_top = b.style.margin.top.resolve_or_zero(slot.cb.width);
    let margin_bottom = b.style.margin.bottom.resolve_or_zero(slot.cb.width);
    let border_top = slot.y + collapse_margins(&chain(&input.adjoining_margins, margin_top));

    let mut fragment = b.shell();
    fragment.position_x = slot.x;
    fragment.position_y = border_top - margin_top;
    fragment.width = width;
    fragment.height = height;
    fragment.margin = EdgeSizes {
        top: margin_top,
        right: h.margin_right,
        bottom: margin_bottom,
        left: h.margin_left,
    };
    fragment.border = h.border;
    fragment.padding = h.padding;

    // Replaced content is monolithic.
    if !input.page_is_empty && fragment.border_box_bottom() > ctx.flow_limit(input) + EPSILON {
        return FlowOutcome::pushed();
    }
    FlowOutcome::complete(fragment)
}

/// Margin state of the content laid out so far in a block container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowState {
    /// Bottom of the last content placed.
    pub cursor: f32,
    /// Margins adjoining the cursor, not yet settled.
    pub pending: Vec<f32>,
    /// Border top of the container, once content fixed it.
    pub first_top: Option<f32>,
    /// In-flow content has been placed in this fragment.
    pub placed_content: bool,
}

impl FlowState {
    /// Where the next content edge would be if the chain settled now.
    #[must_use]
    pub fn next_y(&self) -> f32 {
        self.cursor + collapse_margins(&self.pending)
    }

    /// Settle the margin chain: line boxes and clearance separate margins.
    pub fn flush(&mut self) -> f32 {
        let y = self.next_y();
        if self.first_top.is_none() {
            self.first_top = Some(y);
        }
        self.pending.clear();
        self.cursor = y;
        y
    }
}

/// The content box children are laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentArea {
    /// Left content edge.
    pub x: f32,
    /// Content width.
    pub width: f32,
    /// Containing block for the children.
    pub cb: Containing,
}

/// Children of one fragment of a block container.
#[derive(Debug, Clone, Default)]
pub struct BodyOutcome {
    /// Child fragments.
    pub children: Vec<LayoutBox>,
    /// Where the next fragment starts, when this one stopped early.
    pub resume: Option<ResumePoint>,
    /// Nothing could be placed: the whole container moves on.
    pub pushed: bool,
    /// The forced break that ended the fragment.
    pub forced_break: Option<BreakBetween>,
    /// Baseline of the first line.
    pub baseline: Option<f32>,
}

fn chain(adjoining: &[f32], margin: f32) -> Vec<f32> {
    let mut margins = adjoining.to_vec();
    margins.push(margin);
    margins
}

/// [§ 3.2 Breaks Within Boxes](https://www.w3.org/TR/css-break-3/#break-within)
///
/// "avoid: Avoid a break within the principal box."
#[must_use]
pub fn break_inside_avoided(ctx: &LayoutContext<'_>, style: &ComputedStyle) -> bool {
    style.break_inside.avoids_page() || (ctx.column_depth > 0 && style.break_inside.avoids_column())
}

/// The box of a container whose content another layout mode places: flex,
/// grid, table and multi-column containers open a frame, lay out their
/// content below `content_y`, and close it into a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Used width, margins and the full edges of the box.
    pub horizontal: Horizontal,
    /// Border of this fragment; the top is dropped on a sliced continuation.
    pub border: EdgeSizes,
    /// Padding of this fragment.
    pub padding: EdgeSizes,
    /// Used top margin, zero on continuations.
    pub margin_top: f32,
    /// Used bottom margin.
    pub margin_bottom: f32,
    /// Top border edge after margin collapsing.
    pub border_top: f32,
    /// Left content edge.
    pub content_x: f32,
    /// Top content edge.
    pub content_y: f32,
    /// Definite content height.
    pub height: Option<f32>,
    /// Used `min-height`.
    pub min_height: f32,
    /// Used `max-height`.
    pub max_height: Option<f32>,
    clone: bool,
    resuming: bool,
}

impl Frame {
    /// Resolve the container's own box, as for a block.
    pub fn open(ctx: &mut LayoutContext<'_>, b: &LayoutBox, slot: &Slot, input: &FlowInput<'_>) -> Self {
        let style = &b.style;
        let resuming = input.resume.is_some();
        let horizontal = resolve_width(ctx, b, slot);
        let clone = style.box_decoration_break == BoxDecorationBreak::Clone;
        let mut border = horizontal.border;
        let mut padding = horizontal.padding;
        if resuming && !clone {
            border.top = 0.0;
            padding.top = 0.0;
        }
        let margin_top = if resuming {
            0.0
        } else {
            style.margin.top.resolve_or_zero(slot.cb.width)
        };
        let vertical_edges = horizontal.border.vertical() + horizontal.padding.vertical();
        let height = slot
            .height
            .or_else(|| resolve_height(style, slot.cb.height, vertical_edges));
        let (min_height, max_height) = height_bounds(style, slot.cb.height, vertical_edges);
        let border_top = slot.y + collapse_margins(&chain(&input.adjoining_margins, margin_top));
        Self {
            horizontal,
            border,
            padding,
            margin_top,
            margin_bottom: style.margin.bottom.resolve_or_zero(slot.cb.width),
            border_top,
            content_x: slot.x + horizontal.margin_left + border.left + padding.left,
            content_y: border_top + border.top + padding.top,
            height,
            min_height,
            max_height,
            clone,
            resuming,
        }
    }

    /// Containing block for the content.
    #[must_use]
    pub const fn containing(&self) -> Containing {
        Containing {
            width: self.horizontal.width,
            height: self.height,
        }
    }

    /// Lowest content edge that still fits the fragmentainer with the bottom
    /// padding and border below it.
    #[must_use]
    pub fn content_limit(&self, ctx: &LayoutContext<'_>, input: &FlowInput<'_>) -> f32 {
        ctx.flow_limit(input) - self.horizontal.padding.bottom - self.horizontal.border.bottom
    }

    /// Build the fragment from the content laid out in this frame.
    ///
    /// A `monolithic` frame that does not fit moves on whole.
    pub fn close(
        mut self,
        ctx: &LayoutContext<'_>,
        b: &LayoutBox,
        slot: &Slot,
        input: &FlowInput<'_>,
        content_height: f32,
        body: BodyOutcome,
        monolithic: bool,
    ) -> FlowOutcome {
        if body.pushed {
            return FlowOutcome::pushed();
        }
        let complete = body.resume.is_none();
        let mut height = self.height.unwrap_or(content_height);
        if complete {
            height = clamp_size(height, self.min_height, self.max_height);
        }
        let height = height.max(0.0);
        if !input.page_is_empty {
            let bottom = self.content_y + height + self.padding.bottom + self.border.bottom;
            if complete && monolithic && bottom > ctx.flow_limit(input) + EPSILON {
                return FlowOutcome::pushed();
            }
            if !complete && break_inside_avoided(ctx, &b.style) {
                return FlowOutcome::pushed();
            }
        }
        if !complete && !self.clone {
            self.border.bottom = 0.0;
            self.padding.bottom = 0.0;
        }

        let mut fragment = b.shell();
        fragment.position_x = slot.x;
        fragment.position_y = self.border_top - self.margin_top;
        fragment.width = self.horizontal.width;
        fragment.height = height;
        fragment.margin = EdgeSizes {
            top: self.margin_top,
            right: self.horizontal.margin_right,
            bottom: if complete { self.margin_bottom } else { 0.0 },
            left: self.horizontal.margin_left,
        };
        fragment.border = self.border;
        fragment.padding = self.padding;
        fragment.children = body.children;
        fragment.baseline = body.baseline;
        fragment.is_first_fragment = !self.resuming;
        fragment.is_last_fragment = complete;

        FlowOutcome {
            result: match body.resume {
                None => LayoutResult::Complete(fragment),
                Some(resume) => LayoutResult::Partial(fragment, resume),
            },
            adjoining_margins: if complete { vec![self.margin_bottom] } else { Vec::new() },
            collapsing_through: false,
            forced_break: body.forced_break,
        }
    }
}

/// [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
///
/// Lay out a block container: resolve its width, lay out its children and
/// derive its height.
fn layout_block_container(
    ctx: &mut LayoutContext<'_>,
    b: &LayoutBox,
    slot: &Slot,
    input: FlowInput<'_>,
    floats: &mut FloatContext,
) -> FlowOutcome {
    let style = &b.style;
    let resuming = input.resume.is_some();

    // STEP 1: Calculate width and horizontal margins.
    let h = resolve_width(ctx, b, slot);

    // STEP 2: Resolve the vertical edges of this fragment.
    // [§ 3 'box-decoration-break'](https://www.w3.org/TR/css-break-3/#break-decoration)
    //
    // "slice: The effect is as though the element were rendered with no
    // breaks present, and then sliced by the breaks afterward."
    let clone = style.box_decoration_break == BoxDecorationBreak::Clone;
    let mut border = h.border;
    let mut padding = h.padding;
    if resuming && !clone {
        border.top = 0.0;
        padding.top = 0.0;
    }
    let margin_top = if resuming {
        0.0
    } else {
        style.margin.top.resolve_or_zero(slot.cb.width)
    };
    let margin_bottom = style.margin.bottom.resolve_or_zero(slot.cb.width);
    let vertical_edges = h.border.vertical() + h.padding.vertical();
    let specified_height = slot
        .height
        .or_else(|| resolve_height(style, slot.cb.height, vertical_edges));
    let (min_height, max_height) = height_bounds(style, slot.cb.height, vertical_edges);
    let bfc = b.establishes_bfc();

    // [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    //
    // "top margin of a box and top margin of its first in-flow child" are
    // adjoining when there is "no line boxes, no clearance, no padding and no
    // border" between them; "bottom margin of a last in-flow child and bottom
    // margin of its parent if the parent has 'auto' computed height".
    let collapse_top = !bfc && border.top == 0.0 && padding.top == 0.0 && !resuming;
    let collapse_bottom = !bfc
        && h.border.bottom == 0.0
        && h.padding.bottom == 0.0
        && specified_height.is_none()
        && min_height <= 0.0;

    // STEP 3: Start the margin chain.
    let mut state = if collapse_top {
        FlowState {
            cursor: slot.y,
            pending: chain(&input.adjoining_margins, margin_top),
            ..FlowState::default()
        }
    } else {
        let top = slot.y + collapse_margins(&chain(&input.adjoining_margins, margin_top));
        FlowState {
            cursor: top + border.top + padding.top,
            first_top: Some(top),
            ..FlowState::default()
        }
    };

    // STEP 4: Lay out the children.
    //
    // A box with a definite height is laid out whole and moved as one piece.
    let monolithic = specified_height.is_some();
    let child_input = FlowInput {
        bottom_space: if monolithic { f32::INFINITY } else { input.bottom_space },
        reserved: if monolithic {
            0.0
        } else {
            input.reserved + border.bottom + padding.bottom
        },
        resume: input.resume,
        page_is_empty: input.page_is_empty || monolithic,
        adjoining_margins: Vec::new(),
    };
    let area = ContentArea {
        x: slot.x + h.margin_left + border.left + padding.left,
        width: h.width,
        cb: Containing {
            width: h.width,
            height: specified_height,
        },
    };
    let mut own_floats = FloatContext::new();
    let floats = if bfc { &mut own_floats } else { floats };
    let body = if b.children_are_inline() {
        inline::layout_inline_content(ctx, b, &area, &mut state, &child_input, floats)
    } else {
        layout_block_children(ctx, b, &area, &mut state, &child_input, floats)
    };
    if body.pushed {
        return FlowOutcome::pushed();
    }
    let complete = body.resume.is_none();

    // STEP 5: Settle the top edge and find the content height.
    //
    // [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    // "the bottom edge of the bottom (possibly collapsed) margin of its last
    // in-flow child, if the child's bottom margin does not collapse with the
    // element's bottom margin".
    let border_top = state
        .first_top
        .unwrap_or_else(|| slot.y + collapse_margins(&state.pending));
    let content_top = border_top + border.top + padding.top;
    let mut content_bottom = if state.first_top.is_none() {
        content_top
    } else if collapse_bottom && complete {
        state.cursor
    } else {
        state.next_y()
    };

    // [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    if bfc
        && specified_height.is_none()
        && let Some(float_bottom) = floats.lowest_bottom()
    {
        content_bottom = content_bottom.max(float_bottom);
    }

    // STEP 6: Apply height, min-height and max-height.
    // [§ 10.7](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    let mut height = specified_height.unwrap_or_else(|| (content_bottom - content_top).max(0.0));
    if complete {
        height = clamp_size(height, min_height, max_height);
    }
    let height = height.max(0.0);

    // STEP 7: Decide whether this fragment may stay here.
    if !input.page_is_empty {
        let bottom = content_top + height + padding.bottom + border.bottom;
        if complete && (monolithic || !state.placed_content) && bottom > ctx.flow_limit(&input) + EPSILON {
            return FlowOutcome::pushed();
        }
        if !complete && break_inside_avoided(ctx, style) {
            return FlowOutcome::pushed();
        }
    }

    // STEP 8: Hand the margin chain back to the parent.
    let collapsing_through =
        collapse_top && collapse_bottom && complete && state.first_top.is_none() && height <= 0.0;
    let adjoining_margins = if !complete {
        Vec::new()
    } else if collapsing_through || collapse_bottom {
        chain(&state.pending, margin_bottom)
    } else {
        vec![margin_bottom]
    };

    if !complete && !clone {
        border.bottom = 0.0;
        padding.bottom = 0.0;
    }
    let mut fragment = b.shell();
    fragment.position_x = slot.x;
    fragment.position_y = border_top - margin_top;
    fragment.width = h.width;
    fragment.height = height;
    fragment.margin = EdgeSizes {
        top: margin_top,
        right: h.margin_right,
        bottom: if complete { margin_bottom } else { 0.0 },
        left: h.margin_left,
    };
    fragment.border = border;
    fragment.padding = padding;
    fragment.children = body.children;
    fragment.baseline = body.baseline;
    fragment.is_first_fragment = !resuming;
    fragment.is_last_fragment = complete;

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[BLOCK] {:?} {:?} at ({}, {}) {}x{} complete={complete}",
        b.id,
        b.tag,
        fragment.position_x,
        fragment.position_y,
        fragment.width,
        fragment.height
    );

    FlowOutcome {
        result: match body.resume {
            None => LayoutResult::Complete(fragment),
            Some(resume) => LayoutResult::Partial(fragment, resume),
        },
        adjoining_margins,
        collapsing_through,
        forced_break: body.forced_break,
    }
}

/// State before an in-flow child was placed, to break before it later.
#[derive(Debug, Clone)]
struct Snapshot {
    index: usize,
    children: usize,
    checkpoint: Checkpoint,
    floats: usize,
    state: FlowState,
    previous: Option<usize>,
}

impl Snapshot {
    fn restore(
        &self,
        ctx: &mut LayoutContext<'_>,
        floats: &mut FloatContext,
        state: &mut FlowState,
        children: &mut Vec<LayoutBox>,
    ) {
        children.truncate(self.children);
        ctx.rollback(self.checkpoint);
        floats.truncate(self.floats);
        *state = self.state.clone();
    }
}

/// Zero-size box left in the flow where an out-of-flow box was met.
#[must_use]
pub fn placeholder(source: &LayoutBox, x: f32, y: f32) -> LayoutBox {
    let mut p = source.shell();
    p.kind = BoxKind::AbsolutePlaceholder;
    p.position_x = x;
    p.position_y = y;
    p
}

/// [§ 4.4 Controlling Breaks](https://www.w3.org/TR/css-break-3/#break-propagation)
fn break_avoided(ctx: &LayoutContext<'_>, before: Option<&LayoutBox>, after: &LayoutBox) -> bool {
    let Some(before) = before else {
        return false;
    };
    let between = before.propagated_break_after().combine(after.propagated_break_before());
    between.avoids_page() || (ctx.column_depth > 0 && between.avoids_column())
}

/// Lay out the block-level children of a block container.
fn layout_block_children(
    ctx: &mut LayoutContext<'_>,
    parent: &LayoutBox,
    area: &ContentArea,
    state: &mut FlowState,
    input: &FlowInput<'_>,
    floats: &mut FloatContext,
) -> BodyOutcome {
    let start = input.resume.and_then(ResumePoint::child_index).unwrap_or(0);
    let mut out = BodyOutcome::default();
    let mut snapshots: Vec<Snapshot> = Vec::new();
    let mut previous: Option<usize> = None;
    let mut index = start;

    while index < parent.children.len() {
        let child = &parent.children[index];
        let resume = if index == start {
            input.resume.and_then(ResumePoint::inner)
        } else {
            None
        };
        let page_is_empty = input.page_is_empty && !state.placed_content;

        // STEP 1: Out-of-flow children.
        //
        // [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
        // "In the absolute positioning model, a box is removed from the
        // normal flow entirely".
        if child.is_absolutely_positioned() {
            out.children.push(placeholder(child, area.x, state.next_y()));
            ctx.register_absolute(child);
            index += 1;
            continue;
        }
        if child.is_floated() {
            let checkpoint = ctx.checkpoint();
            let mark = floats.mark();
            let fragment = layout_float(ctx, child, area.cb, state.next_y(), area.x, area.x + area.width, floats);
            if !page_is_empty && fragment.margin_box().bottom() > ctx.flow_limit(input) + EPSILON {
                ctx.rollback(checkpoint);
                floats.truncate(mark);
                out.resume = Some(ResumePoint::at_child(index));
                break;
            }
            out.children.push(fragment);
            index += 1;
            continue;
        }

        // STEP 2: Forced breaks between siblings.
        // [§ 3.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
        if let Some(prev) = previous.map(|i| &parent.children[i]) {
            let between = prev.propagated_break_after().combine(child.propagated_break_before());
            let forced = if ctx.column_depth > 0 {
                between.forces_column() || between.forces_page()
            } else {
                between.forces_page()
            };
            // [CSS Paged Media § 7 Using named pages](https://www.w3.org/TR/css-page-3/#using-named-pages)
            let page_change = ctx.column_depth == 0 && child.page_name != prev.page_name;
            if forced || page_change {
                out.forced_break = Some(if forced { between } else { BreakBetween::Page });
                out.resume = Some(ResumePoint::at_child(index));
                break;
            }
        }

        let snapshot = Snapshot {
            index,
            children: out.children.len(),
            checkpoint: ctx.checkpoint(),
            floats: floats.mark(),
            state: state.clone(),
            previous,
        };

        // STEP 3: Clearance.
        // [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
        //
        // "Computing the clearance of an element on which 'clear' is set is
        // done by first determining the hypothetical position of the
        // element's top border edge".
        let margin_top = if resume.is_some() {
            0.0
        } else {
            child.style.margin.top.resolve_or_zero(area.cb.width)
        };
        let mut y = state.cursor;
        let mut adjoining = state.pending.clone();
        if resume.is_none() && child.style.clear != Clear::None && !floats.is_empty() {
            let hypothetical = state.cursor + collapse_margins(&chain(&state.pending, margin_top));
            let cleared = floats.clear(child.style.clear, hypothetical);
            if cleared > hypothetical + EPSILON {
                let _ = state.flush();
                y = cleared - margin_top;
                adjoining.clear();
            }
        }

        // STEP 4: Boxes establishing a formatting context sit beside floats.
        //
        // "The border box of a table, a block-level replaced element, or an
        // element in the normal flow that establishes a new block formatting
        // context ... must not overlap the margin box of any floats in the
        // same block formatting context as the element itself."
        let (x, available) = if (child.establishes_bfc() || matches!(child.kind, BoxKind::Replaced(_)))
            && !floats.is_empty()
        {
            let top = y + collapse_margins(&chain(&adjoining, margin_top));
            let needed = fixed_outer_width(child, area.cb.width).max(EPSILON * 10.0);
            let (band_x, band_y, band_width) = floats.fit(top, needed, EPSILON, area.x, area.x + area.width);
            if band_y > top + EPSILON {
                let _ = state.flush();
                y = band_y - margin_top;
                adjoining.clear();
            }
            (band_x, band_width)
        } else {
            (area.x, area.width)
        };

        // STEP 5: Lay out the child.
        let slot = Slot {
            available,
            ..Slot::new(x, y, area.cb)
        };
        let child_input = FlowInput {
            bottom_space: input.bottom_space,
            reserved: input.reserved,
            resume,
            page_is_empty,
            adjoining_margins: adjoining,
        };
        let outcome = layout_block_level(ctx, child, &slot, child_input, floats);
        match outcome.result {
            LayoutResult::Complete(fragment) => {
                absorb(state, &fragment, outcome.adjoining_margins, outcome.collapsing_through);
                out.children.push(fragment);
                snapshots.push(snapshot);
                previous = Some(index);
                index += 1;
            }
            LayoutResult::Partial(fragment, inner) => {
                absorb(state, &fragment, outcome.adjoining_margins, outcome.collapsing_through);
                out.children.push(fragment);
                out.resume = Some(ResumePoint::inside_child(index, inner));
                out.forced_break = outcome.forced_break;
                break;
            }
            LayoutResult::Pushed => {
                snapshot.restore(ctx, floats, state, &mut out.children);

                // STEP 6: Honor break-before/after: avoid by breaking earlier.
                //
                // [§ 4.4](https://www.w3.org/TR/css-break-3/#unforced-breaks)
                // "If the above doesn't provide enough break opportunities,
                // ... Rule 1 may be violated" when no earlier break exists.
                let mut at = index;
                let mut at_previous = previous;
                let mut retries = 0;
                while break_avoided(ctx, at_previous.map(|i| &parent.children[i]), &parent.children[at]) {
                    let Some(earlier) = snapshots.pop() else {
                        break;
                    };
                    if !earlier.state.placed_content && input.page_is_empty {
                        break;
                    }
                    if retries == MAX_PAGE_RETRIES {
                        ctx.warn("break avoidance retry limit reached");
                        break;
                    }
                    retries += 1;
                    earlier.restore(ctx, floats, state, &mut out.children);
                    at = earlier.index;
                    at_previous = earlier.previous;
                }
                out.resume = Some(match resume {
                    Some(inner) if at == start => ResumePoint::inside_child(at, inner.clone()),
                    _ => ResumePoint::at_child(at),
                });
                break;
            }
        }
    }

    if out.resume.is_some() && !state.placed_content && !input.page_is_empty && out.forced_break.is_none() {
        out.pushed = true;
    }
    out.baseline = out
        .children
        .iter()
        .filter(|c| c.is_in_flow() && c.kind != BoxKind::AbsolutePlaceholder)
        .find_map(|c| c.baseline);
    out
}

/// Take a placed child into the margin state.
fn absorb(state: &mut FlowState, fragment: &LayoutBox, adjoining: Vec<f32>, collapsing_through: bool) {
    if !collapsing_through {
        if state.first_top.is_none() {
            state.first_top = Some(fragment.border_box_y());
        }
        state.cursor = fragment.border_box_bottom();
        state.placed_content = true;
    }
    state.pending = adjoining;
}

/// Margin-box width of a box with a fixed `width`, zero otherwise.
fn fixed_outer_width(b: &LayoutBox, cb_width: f32) -> f32 {
    let style = &b.style;
    let edges = border_edges(style).horizontal() + padding_edges(style, cb_width).horizontal();
    let margins = style.margin.left.resolve_or_zero(cb_width) + style.margin.right.resolve_or_zero(cb_width);
    match content_size(style.width, Some(cb_width), style, edges) {
        Some(width) => width + edges + margins,
        None => 0.0,
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow or floated,
/// it may be shifted relative to this position."
///
/// Applied to a finished fragment tree; `cb` is the containing block of `b`.
pub fn apply_relative_offsets(b: &mut LayoutBox, cb: Containing) {
    let inner = Containing {
        width: b.width,
        height: Some(b.height),
    };
    for child in &mut b.children {
        apply_relative_offsets(child, inner);
    }
    if !matches!(b.style.position, Position::Relative | Position::Sticky)
        || matches!(b.kind, BoxKind::Line | BoxKind::Text(_) | BoxKind::PageText(_))
    {
        return;
    }
    let style = &b.style;
    // "If neither 'left' nor 'right' is 'auto', the position is
    // over-constrained, and one of them has to be ignored. If the 'direction'
    // property of the containing block is 'ltr', the value of 'left' wins".
    let left = style.left.resolve(cb.width);
    let right = style.right.resolve(cb.width);
    let dx = match (left, right, style.direction) {
        (Some(_), Some(r), Direction::Rtl) => -r,
        (Some(l), _, _) => l,
        (None, Some(r), _) => -r,
        (None, None, _) => 0.0,
    };
    let vertical = |value: LengthPercentageAuto| match (value, cb.height) {
        (LengthPercentageAuto::Percent(_), None) => None,
        (value, basis) => value.resolve(basis.unwrap_or(0.0)),
    };
    let dy = match (vertical(style.top), vertical(style.bottom)) {
        (Some(t), _) => t,
        (None, Some(bottom)) => -bottom,
        (None, None) => 0.0,
    };
    if dx != 0.0 || dy != 0.0 {
        b.translate(dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::Display;
    use quire_style::values::LengthPercentage;

    use crate::boxes::BoxId;
    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    /// A block box; `display` is forced to `block` so the box never ends up
    /// in a line.
    fn block(id: usize, mut style: ComputedStyle, children: Vec<LayoutBox>) -> LayoutBox {
        style.display = Display::block();
        let mut b = LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style));
        b.children = children;
        b
    }

    fn sized(height: f32, margin: f32) -> ComputedStyle {
        let mut style = ComputedStyle::initial();
        style.height = Size::Length(height);
        style.margin.top = LengthPercentageAuto::Length(margin);
        style.margin.bottom = LengthPercentageAuto::Length(margin);
        style
    }

    fn run(root: &LayoutBox, width: f32, bottom: f32) -> FlowOutcome {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let cb = Containing { width, height: None };
        let input = FlowInput {
            bottom_space: bottom,
            ..FlowInput::unfragmented()
        };
        let mut floats = FloatContext::new();
        layout_block_level(&mut ctx, root, &Slot::new(0.0, 0.0, cb), input, &mut floats)
    }

    #[test]
    fn test_auto_margins_center() {
        let mut style = ComputedStyle::initial();
        style.width = Size::Length(40.0);
        style.margin.left = LengthPercentageAuto::Auto;
        style.margin.right = LengthPercentageAuto::Auto;
        let outcome = run(&block(1, style, vec![]), 100.0, f32::INFINITY);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(fragment.margin.left, 30.0);
        assert_eq!(fragment.margin.right, 30.0);
    }

    #[test]
    fn test_over_constrained_rtl_ignores_left_margin() {
        let mut style = ComputedStyle::initial();
        style.width = Size::Length(40.0);
        style.direction = Direction::Rtl;
        style.margin.left = LengthPercentageAuto::Length(5.0);
        style.margin.right = LengthPercentageAuto::Length(10.0);
        let outcome = run(&block(1, style, vec![]), 100.0, f32::INFINITY);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(fragment.margin.left, 50.0);
    }

    #[test]
    fn test_sibling_margins_collapse() {
        let root = block(
            0,
            ComputedStyle::initial(),
            vec![block(1, sized(20.0, 10.0), vec![]), block(2, sized(20.0, 10.0), vec![])],
        );
        let outcome = run(&root, 100.0, f32::INFINITY);
        let fragment = outcome.result.fragment().cloned().unwrap();
        let (a, b) = (&fragment.children[0], &fragment.children[1]);
        assert_eq!(b.border_box_y() - a.border_box_bottom(), 10.0);
        assert_eq!(fragment.height, 70.0);
    }

    #[test]
    fn test_first_child_margin_collapses_through_parent() {
        let mut parent_style = ComputedStyle::initial();
        parent_style.margin.top = LengthPercentageAuto::Length(5.0);
        let inner = block(2, parent_style, vec![block(3, sized(10.0, 12.0), vec![])]);
        let mut padded = ComputedStyle::initial();
        padded.padding.top = LengthPercentage::Length(1.0);
        let outer = block(1, padded, vec![inner]);
        let outcome = run(&outer, 100.0, f32::INFINITY);
        let fragment = outcome.result.fragment().cloned().unwrap();
        let inner = &fragment.children[0];
        assert_eq!(inner.border_box_y(), 13.0);
        assert_eq!(inner.children[0].border_box_y(), 13.0);
    }

    #[test]
    fn test_empty_box_collapses_through() {
        let root = block(
            0,
            ComputedStyle::initial(),
            vec![
                block(1, sized(20.0, 10.0), vec![]),
                block(2, ComputedStyle::initial(), vec![]),
                block(3, sized(20.0, 15.0), vec![]),
            ],
        );
        let outcome = run(&root, 100.0, f32::INFINITY);
        let fragment = outcome.result.fragment().cloned().unwrap();
        assert_eq!(fragment.children[2].border_box_y(), 30.0 + 15.0);
    }

    #[test]
    fn test_split_between_children() {
        let root = block(
            0,
            ComputedStyle::initial(),
            vec![
                block(1, sized(40.0, 0.0), vec![]),
                block(2, sized(40.0, 0.0), vec![]),
                block(3, sized(40.0, 0.0), vec![]),
            ],
        );
        let outcome = run(&root, 100.0, 100.0);
        match outcome.result {
            LayoutResult::Partial(fragment, resume) => {
                assert_eq!(fragment.children.len(), 2);
                assert_eq!(resume, ResumePoint::at_child(2));
                assert!(!fragment.is_last_fragment);
            }
            other => panic!("expected a partial result, got {other:?}"),
        }
    }

    #[test]
    fn test_relative_offset_moves_subtree() {
        let mut style = ComputedStyle::initial();
        style.position = Position::Relative;
        style.left = LengthPercentageAuto::Length(4.0);
        style.bottom = LengthPercentageAuto::Length(2.0);
        let mut b = block(1, style, vec![block(2, ComputedStyle::initial(), vec![])]);
        apply_relative_offsets(&mut b, Containing { width: 100.0, height: None });
        assert_eq!((b.position_x, b.position_y), (4.0, -2.0));
        assert_eq!(b.children[0].position_x, 4.0);
    }
}
