//! Rectangles and edge sizes.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! All coordinates are in the page's coordinate space, origin at the top-left
//! corner of the page.

use serde::Serialize;

use quire_style::values::Sides;

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// A rectangle from its corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// The rectangle shrunk by `edges` on every side. Sizes never go below
    /// zero.
    #[must_use]
    pub fn inset(&self, edges: &EdgeSizes) -> Self {
        Self {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// No edges at all.
    pub const ZERO: Self = Self::uniform(0.0);

    /// The same size on all four sides.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl From<Sides<f32>> for EdgeSizes {
    fn from(sides: Sides<f32>) -> Self {
        Self {
            top: sides.top,
            right: sides.right,
            bottom: sides.bottom,
            left: sides.left,
        }
    }
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Clamp `value` between `min` and `max`. When the two conflict, `min` wins:
/// "If the resulting width is smaller than 'min-width', the rules above are
/// applied again, but this time using the value of 'min-width' as the
/// computed value for 'width'."
#[must_use]
pub fn clamp_size(value: f32, min: f32, max: Option<f32>) -> f32 {
    let capped = max.map_or(value, |m| value.min(m));
    capped.max(min)
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values of
/// the adjoining margins is deducted from zero."
#[must_use]
pub fn collapse_margins(margins: &[f32]) -> f32 {
    let positive = margins.iter().copied().filter(|m| *m > 0.0).fold(0.0_f32, f32::max);
    let negative = margins.iter().copied().filter(|m| *m < 0.0).fold(0.0_f32, f32::min);
    positive + negative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_positive_and_negative() {
        assert_eq!(collapse_margins(&[10.0, 10.0]), 10.0);
        assert_eq!(collapse_margins(&[20.0, -5.0, 3.0]), 15.0);
        assert_eq!(collapse_margins(&[-4.0, -9.0]), -9.0);
        assert_eq!(collapse_margins(&[]), 0.0);
    }

    #[test]
    fn test_min_wins_over_max() {
        assert_eq!(clamp_size(50.0, 0.0, Some(30.0)), 30.0);
        assert_eq!(clamp_size(50.0, 60.0, Some(30.0)), 60.0);
        assert_eq!(clamp_size(5.0, 0.0, None), 5.0);
    }

    #[test]
    fn test_inset_never_negative() {
        let rect = Rect::new(0.0, 0.0, 10.0, 4.0).inset(&EdgeSizes::uniform(3.0));
        assert_eq!(rect, Rect::new(3.0, 3.0, 4.0, 0.0));
    }
}
