//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! "A floated box is shifted to the left or right until its outer edge touches
//! the containing block edge or the outer edge of another float."
//!
//! Floats are tracked per block formatting context in page coordinates, in
//! placement order, so a tentative layout can be undone with
//! [`FloatContext::truncate`].

use serde::Serialize;

use quire_style::keywords::{Clear, Float};

use crate::block::{Containing, Slot, WidthMode, layout_block_level};
use crate::boxes::LayoutBox;
use crate::context::LayoutContext;
use crate::geometry::Rect;
use crate::options::EPSILON;
use crate::resume::{FlowInput, LayoutResult};

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "The element generates a block box that is floated to the left" or "to
/// the right".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatSide {
    /// `float: left`
    Left,
    /// `float: right`
    Right,
}

impl FloatSide {
    /// Side for a computed `float`, `None` for non-floats.
    #[must_use]
    pub const fn of(float: Float) -> Option<Self> {
        match float {
            Float::Left => Some(Self::Left),
            Float::Right => Some(Self::Right),
            Float::None | Float::Footnote => None,
        }
    }
}

/// A single float that has been placed in the flow.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFloat {
    /// Which side this float is on.
    pub side: FloatSide,
    /// The margin box of the float, in page coordinates.
    pub margin_box: Rect,
}

/// Tracks placed floats within a block formatting context.
///
/// "Since a float is not in the flow, non-positioned block boxes created
/// before and after the float box flow vertically as if the float did not
/// exist. However, the current and subsequent line boxes created next to
/// the float are shortened as necessary to make room for the margin box
/// of the float."
#[derive(Debug, Clone, Default)]
pub struct FloatContext {
    floats: Vec<PlacedFloat>,
}

impl FloatContext {
    /// A context with no floats.
    #[must_use]
    pub const fn new() -> Self {
        Self { floats: Vec::new() }
    }

    /// Returns true if there are no placed floats in this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// Floats in placement order.
    #[must_use]
    pub fn floats(&self) -> &[PlacedFloat] {
        &self.floats
    }

    /// Number of floats placed so far, for [`Self::truncate`].
    #[must_use]
    pub fn mark(&self) -> usize {
        self.floats.len()
    }

    /// Forget every float placed after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.floats.truncate(mark);
    }

    /// Drop floats that end above `y`; used when a new page starts.
    pub fn forget_above(&mut self, y: f32) {
        self.floats.retain(|f| f.margin_box.bottom() > y);
    }

    /// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// "If the element has any floating descendants whose bottom margin edge
    /// is below the element's bottom content edge, then the height is
    /// increased to include those edges."
    #[must_use]
    pub fn lowest_bottom(&self) -> Option<f32> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .reduce(f32::max)
    }

    /// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a float of the given margin-box size at or below `y`, between
    /// the containing block edges `left` and `right`.
    pub fn place(&mut self, side: FloatSide, width: f32, height: f32, y: f32, left: f32, right: f32) -> Rect {
        // STEP 1: Start at the highest allowed position.
        // [§ 9.5.1 Rule 5](https://www.w3.org/TR/CSS2/visuren.html#float-position)
        //
        // "The outer top of a floating box may not be higher than the outer
        // top of any block or floated box generated by an element earlier in
        // the source document."
        let mut y = self
            .floats
            .iter()
            .map(|f| f.margin_box.y)
            .fold(y, f32::max);

        // STEP 2: Scan down past float bottoms until the float fits.
        // [§ 9.5.1 Rules 2, 3, 7](https://www.w3.org/TR/CSS2/visuren.html#float-position)
        let (band_left, band_width) = loop {
            let (band_left, band_width) = self.available(y, height, left, right);
            if band_width + EPSILON >= width || band_width + EPSILON >= right - left {
                break (band_left, band_width);
            }
            match self.next_bottom_after(y) {
                Some(next) => y = next,
                None => break (band_left, band_width),
            }
        };

        // STEP 3: Push against the edge.
        // [§ 9.5.1 Rule 9](https://www.w3.org/TR/CSS2/visuren.html#float-position)
        //
        // "A left-floating box must be put as far to the left as possible,
        // a right-floating box as far to the right as possible."
        let x = match side {
            FloatSide::Left => band_left,
            FloatSide::Right => band_left + band_width - width,
        };
        let rect = Rect::new(x, y, width, height);
        self.floats.push(PlacedFloat { side, margin_box: rect });
        rect
    }

    /// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// The lowest position at or below `y` clear of floats on the cleared
    /// sides.
    #[must_use]
    pub fn clear(&self, clear: Clear, y: f32) -> f32 {
        let clears = |side: FloatSide| match clear {
            Clear::None => false,
            Clear::Both => true,
            Clear::Left => side == FloatSide::Left,
            Clear::Right => side == FloatSide::Right,
        };
        self.floats
            .iter()
            .filter(|f| clears(f.side))
            .map(|f| f.margin_box.bottom())
            .fold(y, f32::max)
    }

    /// The band left free by floats overlapping `[y, y + height)`, clipped
    /// to `[left, right]`. Returns its left edge and width.
    #[must_use]
    pub fn available(&self, y: f32, height: f32, left: f32, right: f32) -> (f32, f32) {
        let band_bottom = y + height.max(EPSILON);
        let mut left_edge = left;
        let mut right_edge = right;
        for f in &self.floats {
            let r = &f.margin_box;
            // Zero-height floats take no room.
            if r.height <= 0.0 || r.y >= band_bottom || r.bottom() <= y {
                continue;
            }
            match f.side {
                FloatSide::Left => left_edge = left_edge.max(r.right()),
                FloatSide::Right => right_edge = right_edge.min(r.x),
            }
        }
        (left_edge, (right_edge - left_edge).max(0.0))
    }

    /// The first position at or below `y` where a box of `width` fits beside
    /// the floats, with the band found there.
    #[must_use]
    pub fn fit(&self, y: f32, width: f32, height: f32, left: f32, right: f32) -> (f32, f32, f32) {
        let mut y = y;
        loop {
            let (x, avail) = self.available(y, height, left, right);
            if avail + EPSILON >= width {
                return (x, y, avail);
            }
            match self.next_bottom_after(y) {
                Some(next) => y = next,
                None => return (x, y, avail),
            }
        }
    }

    /// The smallest float bottom strictly below `y`.
    #[must_use]
    pub fn next_bottom_after(&self, y: f32) -> Option<f32> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|&b| b > y + EPSILON)
            .reduce(f32::min)
    }
}

/// Lay out a floated box and place it at or below `y`.
///
/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
/// "If 'width' is computed as 'auto', the used value is the 'shrink-to-fit'
/// width."
///
/// Floats are laid out unfragmented. `left`/`right` are the content edges of
/// the containing block.
pub fn layout_float(
    ctx: &mut LayoutContext<'_>,
    float: &LayoutBox,
    cb: Containing,
    y: f32,
    left: f32,
    right: f32,
    floats: &mut FloatContext,
) -> LayoutBox {
    let side = FloatSide::of(float.style.float).unwrap_or(FloatSide::Left);
    let slot = Slot {
        x: 0.0,
        y: 0.0,
        cb,
        available: right - left,
        width: WidthMode::ShrinkToFit,
        height: None,
    };
    let mut inner = FloatContext::new();
    let outcome = layout_block_level(ctx, float, &slot, FlowInput::unfragmented(), &mut inner);
    let mut fragment = match outcome.result {
        LayoutResult::Complete(b) | LayoutResult::Partial(b, _) => b,
        LayoutResult::Pushed => float.shell(),
    };
    // The fragment was laid out with its border top at zero, so its margin
    // box starts at minus the top margin.
    let top = fragment.position_y;
    let rect = floats.place(side, fragment.margin_width(), fragment.margin_height(), y, left, right);
    fragment.translate(rect.x - fragment.position_x, rect.y - top);

    #[cfg(feature = "layout-trace")]
    log::trace!("[FLOAT] {side:?} float {:?} placed at {rect:?}", float.id);

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats_stack_side_by_side() {
        let mut floats = FloatContext::new();
        let a = floats.place(FloatSide::Left, 30.0, 10.0, 0.0, 0.0, 100.0);
        let b = floats.place(FloatSide::Left, 30.0, 10.0, 0.0, 0.0, 100.0);
        let c = floats.place(FloatSide::Right, 20.0, 5.0, 0.0, 0.0, 100.0);
        assert_eq!(a, Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(b, Rect::new(30.0, 0.0, 30.0, 10.0));
        assert_eq!(c, Rect::new(80.0, 0.0, 20.0, 5.0));
        assert_eq!(floats.available(0.0, 1.0, 0.0, 100.0), (60.0, 20.0));
        assert_eq!(floats.available(6.0, 1.0, 0.0, 100.0), (60.0, 40.0));
    }

    #[test]
    fn test_float_moves_below_when_too_wide() {
        let mut floats = FloatContext::new();
        let _ = floats.place(FloatSide::Left, 70.0, 10.0, 0.0, 0.0, 100.0);
        let b = floats.place(FloatSide::Right, 40.0, 10.0, 0.0, 0.0, 100.0);
        assert_eq!(b, Rect::new(60.0, 10.0, 40.0, 10.0));
    }

    #[test]
    fn test_clear_and_truncate() {
        let mut floats = FloatContext::new();
        let _ = floats.place(FloatSide::Left, 10.0, 15.0, 5.0, 0.0, 100.0);
        let mark = floats.mark();
        let _ = floats.place(FloatSide::Right, 10.0, 40.0, 5.0, 0.0, 100.0);
        assert_eq!(floats.clear(Clear::Left, 0.0), 20.0);
        assert_eq!(floats.clear(Clear::Both, 0.0), 45.0);
        floats.truncate(mark);
        assert_eq!(floats.clear(Clear::Both, 0.0), 20.0);
        assert_eq!(floats.lowest_bottom(), Some(20.0));
    }

    #[test]
    fn test_fit_finds_room_below() {
        let mut floats = FloatContext::new();
        let _ = floats.place(FloatSide::Left, 60.0, 10.0, 0.0, 0.0, 100.0);
        assert_eq!(floats.fit(0.0, 50.0, 5.0, 0.0, 100.0), (0.0, 10.0, 100.0));
        assert_eq!(floats.fit(0.0, 30.0, 5.0, 0.0, 100.0), (60.0, 0.0, 40.0));
    }
}
