//! The per-document layout context.
//!
//! Everything a layout pass needs besides the box tree lives here: the
//! collaborators, the options, the warning sink, caches and the state of the
//! page being filled. A context is created for one document and one pass;
//! nothing is shared between documents.

use std::collections::HashMap;
use std::sync::Arc;

use quire_common::Diagnostics;
use quire_style::ComputedStyle;

use crate::boxes::{BoxId, LayoutBox};
use crate::geometry::Rect;
use crate::image::ImageProvider;
use crate::options::LayoutOptions;
use crate::resume::FlowInput;
use crate::text::{Hyphenator, TextShaper};

/// An absolutely positioned box waiting for its containing block.
///
/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
#[derive(Debug, Clone)]
pub struct PendingAbsolute {
    /// The box as built; its id is shared with its placeholder.
    pub source: LayoutBox,
    /// `position: fixed`: the page area is the containing block.
    pub fixed: bool,
}

/// Page numbers known to the current pass.
#[derive(Debug, Clone, Default)]
pub struct PageCounters {
    /// One-based number of the page being laid out.
    pub number: usize,
    /// Page count of the previous pass.
    pub total: Option<usize>,
    /// Anchor to page number, from the previous pass.
    pub previous_anchors: HashMap<String, usize>,
    /// Anchor to page number, for pages finished in this pass.
    pub anchors: HashMap<String, usize>,
}

impl PageCounters {
    /// Page number of `anchor`, preferring what this pass already knows.
    #[must_use]
    pub fn anchor_page(&self, anchor: &str) -> Option<usize> {
        self.anchors
            .get(anchor)
            .or_else(|| self.previous_anchors.get(anchor))
            .copied()
    }
}

/// Footnotes of the page being laid out.
///
/// [GCPM § 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
#[derive(Debug, Clone, Default)]
pub struct FootnoteState {
    /// `@footnote` style of the current page.
    pub area_style: Option<Arc<ComputedStyle>>,
    /// Content width of the footnote area.
    pub width: f32,
    /// Margins, borders and padding of the area, top plus bottom.
    pub area_edges: f32,
    /// Used `max-height` of the area.
    pub max_height: Option<f32>,
    /// Laid-out bodies, stacked from zero, with their footnote index.
    pub placed: Vec<(usize, LayoutBox)>,
    /// Footnotes called on this page that go to the next one.
    pub deferred: Vec<usize>,
}

impl FootnoteState {
    /// Sum of the placed bodies' margin heights.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.placed.iter().map(|(_, b)| b.margin_height()).sum()
    }

    /// Height the area takes at the bottom of the page, zero when empty.
    #[must_use]
    pub fn reserved(&self) -> f32 {
        if self.placed.is_empty() {
            0.0
        } else {
            self.area_edges + self.content_height()
        }
    }
}

/// State to return to when a tentative layout is thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    footnotes: usize,
    deferred: usize,
    absolutes: usize,
    fixed: usize,
}

/// Services and state for one layout pass over one document.
pub struct LayoutContext<'a> {
    /// Knobs for this run.
    pub options: &'a LayoutOptions,
    /// Text measurement.
    pub shaper: &'a dyn TextShaper,
    /// Automatic hyphenation.
    pub hyphenator: &'a dyn Hyphenator,
    /// Replaced content lookup.
    pub images: &'a dyn ImageProvider,
    /// Recoverable problems met so far.
    pub diagnostics: Diagnostics,
    /// Page numbers and anchors.
    pub pages: PageCounters,
    /// Footnotes of the current page.
    pub footnotes: FootnoteState,
    /// Footnote bodies from the builder, by footnote index.
    pub footnote_bodies: Vec<LayoutBox>,
    /// Absolutely positioned boxes whose containing block is still being
    /// laid out.
    pub pending_absolutes: Vec<PendingAbsolute>,
    /// Fixed boxes seen so far; repeated on every later page.
    pub fixed_boxes: Vec<LayoutBox>,
    /// Content area of the current page: the initial containing block.
    pub page_area: Rect,
    /// Some laid-out text depended on the page count or on anchors whose
    /// page was not known yet.
    pub needs_page_totals: bool,
    /// Nesting depth of multi-column containers being laid out.
    pub column_depth: usize,
    preferred_widths: HashMap<BoxId, (f32, f32)>,
}

impl<'a> LayoutContext<'a> {
    /// A context for one pass.
    #[must_use]
    pub fn new(
        options: &'a LayoutOptions,
        shaper: &'a dyn TextShaper,
        hyphenator: &'a dyn Hyphenator,
        images: &'a dyn ImageProvider,
    ) -> Self {
        Self {
            options,
            shaper,
            hyphenator,
            images,
            diagnostics: Diagnostics::new(),
            pages: PageCounters::default(),
            footnotes: FootnoteState::default(),
            footnote_bodies: Vec::new(),
            pending_absolutes: Vec::new(),
            fixed_boxes: Vec::new(),
            page_area: Rect::default(),
            needs_page_totals: false,
            column_depth: 0,
            preferred_widths: HashMap::new(),
        }
    }

    /// Record a recoverable problem.
    pub fn warn(&mut self, message: &str) {
        self.diagnostics.warn("layout", message);
    }

    /// Cached preferred widths of a box.
    #[must_use]
    pub fn cached_preferred(&self, id: BoxId) -> Option<(f32, f32)> {
        self.preferred_widths.get(&id).copied()
    }

    /// Remember the preferred widths of a box.
    pub fn cache_preferred(&mut self, id: BoxId, widths: (f32, f32)) {
        let _ = self.preferred_widths.insert(id, widths);
    }

    /// Forget the preferred widths of a box whose content changed.
    pub fn forget_preferred(&mut self, id: BoxId) {
        let _ = self.preferred_widths.remove(&id);
    }

    /// Drop everything cached; a new pass starts from scratch.
    pub fn clear_caches(&mut self) {
        self.preferred_widths.clear();
    }

    /// Start filling a new page.
    pub fn begin_page(&mut self, number: usize, page_area: Rect) {
        self.pages.number = number;
        self.page_area = page_area;
        self.footnotes.placed.clear();
        self.footnotes.deferred.clear();
    }

    /// The lowest coordinate in-flow content may reach: `bottom_space`,
    /// raised by the footnote area of the current page.
    #[must_use]
    pub fn limit(&self, bottom_space: f32) -> f32 {
        let reserved = self.footnotes.reserved();
        if reserved > 0.0 && bottom_space.is_finite() {
            bottom_space.min(self.page_area.bottom() - reserved)
        } else {
            bottom_space
        }
    }

    /// The lowest coordinate content laid out with `input` may reach.
    #[must_use]
    pub fn flow_limit(&self, input: &FlowInput<'_>) -> f32 {
        self.limit(input.bottom_space) - input.reserved
    }

    /// Take a checkpoint before a tentative layout.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            footnotes: self.footnotes.placed.len(),
            deferred: self.footnotes.deferred.len(),
            absolutes: self.pending_absolutes.len(),
            fixed: self.fixed_boxes.len(),
        }
    }

    /// Forget what happened since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.footnotes.placed.truncate(checkpoint.footnotes);
        self.footnotes.deferred.truncate(checkpoint.deferred);
        self.pending_absolutes.truncate(checkpoint.absolutes);
        self.fixed_boxes.truncate(checkpoint.fixed);
    }

    /// Queue an out-of-flow box; its placeholder carries the same id.
    ///
    /// Boxes laid out again for measurement register once.
    pub fn register_absolute(&mut self, source: &LayoutBox) {
        let fixed = source.style.position == quire_style::keywords::Position::Fixed;
        if fixed && !self.fixed_boxes.iter().any(|b| b.id == source.id) {
            self.fixed_boxes.push(source.clone());
        }
        if self.pending_absolutes.iter().any(|p| p.source.id == source.id) {
            return;
        }
        self.pending_absolutes.push(PendingAbsolute {
            source: source.clone(),
            fixed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::BoxKind;
    use crate::image::NoImages;
    use crate::text::{MonospaceShaper, NoHyphenation};

    #[test]
    fn test_rollback_forgets_tentative_state() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let body = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(ComputedStyle::initial()));
        let mark = ctx.checkpoint();
        ctx.footnotes.placed.push((0, body.clone()));
        ctx.register_absolute(&body);
        ctx.rollback(mark);
        assert!(ctx.footnotes.placed.is_empty());
        assert!(ctx.pending_absolutes.is_empty());
    }

    #[test]
    fn test_limit_reserves_footnote_area() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        ctx.begin_page(1, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(ctx.limit(90.0), 90.0);
        let mut body = LayoutBox::new(BoxId(1), BoxKind::Block, Arc::new(ComputedStyle::initial()));
        body.height = 20.0;
        ctx.footnotes.area_edges = 5.0;
        ctx.footnotes.placed.push((0, body));
        assert_eq!(ctx.limit(90.0), 75.0);
    }
}
