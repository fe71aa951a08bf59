//! Sizing of replaced elements.
//!
//! [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
//! and [§ 10.6.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height).
//!
//! Content without any intrinsic size lays out as an empty box.

use quire_style::values::Size;

use crate::block::{Containing, border_edges, content_size, padding_edges};
use crate::boxes::{BoxKind, LayoutBox};
use crate::geometry::clamp_size;

/// Used content width and height of a replaced box.
#[must_use]
pub fn used_size(b: &LayoutBox, cb: Containing) -> (f32, f32) {
    let BoxKind::Replaced(content) = &b.kind else {
        return (0.0, 0.0);
    };
    let style = &b.style;
    let padding = padding_edges(style, cb.width);
    let border = border_edges(style);
    let h_edges = padding.horizontal() + border.horizontal();
    let v_edges = padding.vertical() + border.vertical();

    let ratio = content.intrinsic_ratio.or(match (content.intrinsic_width, content.intrinsic_height) {
        (Some(w), Some(h)) if h > 0.0 => Some(w / h),
        _ => None,
    });
    let width = content_size(style.width, Some(cb.width), style, h_edges);
    let height = content_size(style.height, cb.height, style, v_edges);

    // "If 'height' and 'width' both have computed values of 'auto' and the
    // element also has an intrinsic width, then that intrinsic width is the
    // used value of 'width'."
    //
    // "Otherwise, if 'width' has a computed value of 'auto', and the element
    // has an intrinsic ratio then the used value of 'width' is: (used
    // height) * (intrinsic ratio)".
    let (width, height, from_ratio) = match (width, height) {
        (Some(w), Some(h)) => (w, h, false),
        (Some(w), None) => match ratio {
            Some(r) if r > 0.0 => (w, w / r, true),
            _ => (w, content.intrinsic_height.unwrap_or(0.0), false),
        },
        (None, Some(h)) => match ratio {
            Some(r) => (h * r, h, false),
            None => (content.intrinsic_width.unwrap_or(0.0), h, false),
        },
        (None, None) => match (content.intrinsic_width, content.intrinsic_height, ratio) {
            (Some(w), Some(h), _) => (w, h, false),
            (Some(w), None, Some(r)) if r > 0.0 => (w, w / r, true),
            (None, Some(h), Some(r)) => (h * r, h, false),
            (w, h, _) => (w.unwrap_or(0.0), h.unwrap_or(0.0), false),
        },
    };

    // [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    let min_w = content_size(style.min_width, Some(cb.width), style, h_edges).unwrap_or(0.0);
    let max_w = content_size(style.max_width, Some(cb.width), style, h_edges);
    let min_h = content_size(style.min_height, cb.height, style, v_edges).unwrap_or(0.0);
    let max_h = content_size(style.max_height, cb.height, style, v_edges);
    let clamped_width = clamp_size(width, min_w, max_w);
    let height = match ratio {
        Some(r) if from_ratio && r > 0.0 && clamped_width != width => clamped_width / r,
        _ => height,
    };
    (clamped_width.max(0.0), clamp_size(height, min_h, max_h).max(0.0))
}

/// Min-content and max-content width of replaced content.
///
/// [§ 5.2.2](https://www.w3.org/TR/css-sizing-3/#replaced-percentage-min-contribution)
/// A percentage width makes the min-content contribution zero.
#[must_use]
pub fn content_widths(b: &LayoutBox) -> (f32, f32) {
    let (width, _) = used_size(
        b,
        Containing {
            width: 0.0,
            height: None,
        },
    );
    if matches!(b.style.width, Size::Percent(_)) {
        let natural = match &b.kind {
            BoxKind::Replaced(content) => content.intrinsic_width.unwrap_or(0.0),
            _ => 0.0,
        };
        (0.0, natural)
    } else {
        (width, width)
    }
}
