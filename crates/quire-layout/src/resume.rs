//! Layout results and resume points.
//!
//! [CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/)
//!
//! Laying out a box for one fragmentainer either consumes all of it or stops
//! partway. A stopped layout returns the fragment it produced and a
//! [`ResumePoint`] naming where the next fragment starts; the caller passes
//! that point back in when laying out the continuation.

use serde::Serialize;

use quire_style::keywords::BreakBetween;

use crate::boxes::LayoutBox;

/// Where the next fragment of a box starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResumePoint {
    /// Continue at child `index`, inside it at `inner` if given.
    Child {
        /// Index into the box's children (or its ordered items for flex).
        index: usize,
        /// Resume point inside that child.
        inner: Option<Box<ResumePoint>>,
    },
    /// Continue inline content at the `offset`-th byte of flattened item
    /// `item`.
    Inline {
        /// Item index in the flattened inline content.
        item: usize,
        /// Byte offset inside a text item.
        offset: usize,
    },
    /// Continue a table at a row.
    TableRow {
        /// Index among the body row groups.
        group: usize,
        /// Row index inside that group.
        row: usize,
    },
    /// Continue a grid at a row track.
    GridRow {
        /// Row track index.
        row: usize,
        /// Items of that row that were split, by position in
        /// order-modified document order, with where each continues. Items
        /// starting in the row and missing here were completed.
        items: Vec<(usize, ResumePoint)>,
    },
}

impl ResumePoint {
    /// Resume at the start of child `index`.
    #[must_use]
    pub const fn at_child(index: usize) -> Self {
        Self::Child { index, inner: None }
    }

    /// Resume inside child `index`.
    #[must_use]
    pub fn inside_child(index: usize, inner: Self) -> Self {
        Self::Child {
            index,
            inner: Some(Box::new(inner)),
        }
    }

    /// Index of the child this point starts at, when it names one.
    #[must_use]
    pub const fn child_index(&self) -> Option<usize> {
        match self {
            Self::Child { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Resume point inside the child this point starts at.
    #[must_use]
    pub fn inner(&self) -> Option<&Self> {
        match self {
            Self::Child { inner, .. } => inner.as_deref(),
            _ => None,
        }
    }
}

/// The outcome of laying out one box for one fragmentainer.
#[derive(Debug, Clone)]
pub enum LayoutResult {
    /// The whole remaining box fit.
    Complete(LayoutBox),
    /// Part of the box fit; the rest starts at the resume point.
    Partial(LayoutBox, ResumePoint),
    /// Nothing fit; the whole box moves to the next fragmentainer.
    Pushed,
}

impl LayoutResult {
    /// The produced fragment, if any.
    #[must_use]
    pub const fn fragment(&self) -> Option<&LayoutBox> {
        match self {
            Self::Complete(b) | Self::Partial(b, _) => Some(b),
            Self::Pushed => None,
        }
    }

    /// Split into fragment and resume point.
    #[must_use]
    pub fn into_parts(self) -> (Option<LayoutBox>, Option<ResumePoint>) {
        match self {
            Self::Complete(b) => (Some(b), None),
            Self::Partial(b, resume) => (Some(b), Some(resume)),
            Self::Pushed => (None, None),
        }
    }
}

/// Input to a block-level layout call in a fragmentation context.
#[derive(Debug, Clone)]
pub struct FlowInput<'r> {
    /// Page coordinate below which no border box may end.
    pub bottom_space: f32,
    /// Space above `bottom_space` taken by the bottom borders and padding
    /// of enclosing boxes.
    pub reserved: f32,
    /// Where to resume, for continuation fragments.
    pub resume: Option<&'r ResumePoint>,
    /// Nothing has been placed in this fragmentainer yet: the box must place
    /// something even if it overflows.
    pub page_is_empty: bool,
    /// Margins adjoining the box's top margin.
    pub adjoining_margins: Vec<f32>,
}

impl FlowInput<'_> {
    /// Layout with no fragmentation: everything fits.
    #[must_use]
    pub const fn unfragmented() -> Self {
        FlowInput {
            bottom_space: f32::INFINITY,
            reserved: 0.0,
            resume: None,
            page_is_empty: true,
            adjoining_margins: Vec::new(),
        }
    }
}

/// Result of a block-level layout call, with the margin state the parent
/// needs to keep collapsing.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    /// The fragment and where to continue.
    pub result: LayoutResult,
    /// Margins adjoining whatever follows this box.
    pub adjoining_margins: Vec<f32>,
    /// Top and bottom margins collapsed through the box.
    pub collapsing_through: bool,
    /// The forced break that ended the fragment, if one did.
    pub forced_break: Option<BreakBetween>,
}

impl FlowOutcome {
    /// A box that did not fit at all.
    #[must_use]
    pub const fn pushed() -> Self {
        Self {
            result: LayoutResult::Pushed,
            adjoining_margins: Vec::new(),
            collapsing_through: false,
            forced_break: None,
        }
    }

    /// A box laid out in one piece that does not take part in margin
    /// collapsing with what follows beyond its own bottom margin.
    #[must_use]
    pub fn complete(fragment: LayoutBox) -> Self {
        let bottom = fragment.margin.bottom;
        Self {
            result: LayoutResult::Complete(fragment),
            adjoining_margins: vec![bottom],
            collapsing_through: false,
            forced_break: None,
        }
    }
}
