//! Layout configuration and iteration bounds.
//!
//! Every loop that could run away on pathological input has a named bound
//! here. Hitting a bound logs a warning and keeps the last computed result.

use quire_style::page::A4;

/// Upper bound on rounds of the flexible-lengths freeze loop.
///
/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
pub const MAX_FLEX_FREEZE_ROUNDS: usize = 32;

/// Upper bound on track-sizing passes when content-sized tracks and flexible
/// tracks disagree.
pub const MAX_GRID_TRACK_PASSES: usize = 4;

/// Upper bound on whole-document layout passes for page-dependent content.
pub const MAX_REPAGINATION_PASSES: usize = 3;

/// Upper bound on moving a break point earlier to honor `avoid` values.
pub const MAX_PAGE_RETRIES: usize = 8;

/// Upper bound on footnotes carried over to a following page.
pub const MAX_FOOTNOTE_REPORTS: usize = 64;

/// Upper bound on bisection steps when balancing columns.
pub const MAX_COLUMN_BALANCE_STEPS: usize = 16;

/// Element nesting depth that still gets boxes of its own. Deeper content
/// is flattened into text runs of the last box, which keeps every
/// recursive layout pass within the call stack.
pub const MAX_BOX_DEPTH: usize = 64;

/// Tolerance for comparing accumulated lengths.
pub const EPSILON: f32 = 1e-3;

/// Knobs for one layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Page size used when no `@page` rule sets `size`.
    pub default_page_size: (f32, f32),
    /// Stop paginating after this many pages.
    pub max_pages: usize,
    /// Layout passes allowed for `counter(pages)` and `target-counter()`.
    pub repagination_passes: usize,
    /// Honor `hyphens: auto` through the hyphenator.
    pub hyphenation: bool,
    /// Advance of one character of the bundled shaper, in em.
    pub char_width_ratio: f32,
    /// Ascent of the bundled shaper's font, in em.
    pub ascent_ratio: f32,
    /// Descent of the bundled shaper's font, in em.
    pub descent_ratio: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            default_page_size: A4,
            max_pages: 10_000,
            repagination_passes: MAX_REPAGINATION_PASSES,
            hyphenation: true,
            char_width_ratio: 1.0,
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }
}

impl LayoutOptions {
    /// Options with a fixed default page size.
    #[must_use]
    pub fn with_page_size(width: f32, height: f32) -> Self {
        Self {
            default_page_size: (width, height),
            ..Self::default()
        }
    }
}
