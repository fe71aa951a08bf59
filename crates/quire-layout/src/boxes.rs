//! Layout box types.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! One [`LayoutBox`] type serves both trees: the builder produces boxes with
//! zero geometry, and every layout function returns fresh boxes with their
//! geometry filled in. Boxes are never mutated in place by a later fragment,
//! so a subtree can be laid out again for the next page or the next pass.

use std::sync::Arc;

use serde::Serialize;

use quire_dom::NodeId;
use quire_style::content::CounterStyle;
use quire_style::display::{InnerDisplayType, InternalDisplay};
use quire_style::keywords::{BreakBetween, Float, Overflow};
use quire_style::{ComputedStyle, MarginBoxName, PseudoElement};

use crate::geometry::{EdgeSizes, Rect};

/// Stable identity of a box across fragments and layout passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId(pub usize);

impl BoxId {
    /// The box of the root element.
    pub const ROOT: Self = Self(0);
    /// Page boxes.
    pub const PAGE: Self = Self(usize::MAX);
    /// Footnote areas.
    pub const FOOTNOTE_AREA: Self = Self(usize::MAX - 1);
}

/// Intrinsic dimensions of replaced content.
///
/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacedContent {
    /// Where the content came from.
    pub uri: String,
    /// Intrinsic width in px.
    pub intrinsic_width: Option<f32>,
    /// Intrinsic height in px.
    pub intrinsic_height: Option<f32>,
    /// Intrinsic width divided by intrinsic height.
    pub intrinsic_ratio: Option<f32>,
}

/// One piece of text that can only be produced once pages are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DynamicPart {
    /// Fixed text.
    Text(String),
    /// `counter(page)`
    Page(CounterStyle),
    /// `counter(pages)`
    Pages(CounterStyle),
    /// `target-counter(url, page)`: the page an anchor lands on.
    TargetPage {
        /// Anchor name without the leading `#`.
        anchor: String,
        /// Counter style.
        style: CounterStyle,
    },
}

/// The kind of a box: the layout mode it takes part in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoxKind {
    /// Block container: block-level boxes, inline-blocks, list items and the
    /// anonymous blocks wrapping inline runs.
    Block,
    /// Non-atomic inline box.
    Inline,
    /// Replaced element; block-level or inline-level per its `display`.
    Replaced(ReplacedContent),
    /// One line of an inline formatting context.
    Line,
    /// A run of text.
    Text(String),
    /// Text that depends on page numbers.
    PageText(Vec<DynamicPart>),
    /// Forced line break from `<br>`.
    LineBreak,
    /// [GCPM § 4 Leaders](https://www.w3.org/TR/css-gcpm-3/#leaders): the
    /// pattern repeated across the rest of the line.
    Leader(String),
    /// [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
    /// "the table generates a principal block container box called the table
    /// wrapper box that contains the table box itself and any caption boxes".
    TableWrapper,
    /// The table grid box.
    Table,
    /// `table-row-group`, `table-header-group` or `table-footer-group`.
    TableRowGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-column`
    TableColumn,
    /// `table-caption`
    TableCaption,
    /// Flex container.
    Flex,
    /// Grid container.
    Grid,
    /// One column of a multi-column container.
    Column,
    /// Where an absolutely positioned box sat in flow; holds the laid-out
    /// box as its only child once its containing block is known.
    AbsolutePlaceholder,
    /// The page box.
    Page,
    /// A page-margin box.
    MarginBox(MarginBoxName),
    /// The footnote area of a page.
    FootnoteArea,
}

/// A box in the formatting structure or in a laid-out fragment tree.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutBox {
    /// Stable identity; fragments of one box share it.
    pub id: BoxId,
    /// What kind of box this is.
    pub kind: BoxKind,
    /// Computed style; anonymous boxes carry an inherited style.
    #[serde(skip)]
    pub style: Arc<ComputedStyle>,
    /// Element this box was generated for.
    #[serde(skip)]
    pub node: Option<NodeId>,
    /// Tag name of that element.
    pub tag: Option<String>,
    /// `id` attribute of that element.
    pub element_id: Option<String>,
    /// Pseudo-element this box was generated for.
    pub pseudo: Option<PseudoElement>,
    /// Generated by the builder rather than by an element.
    pub anonymous: bool,

    /// Left margin edge.
    pub position_x: f32,
    /// Top margin edge.
    pub position_y: f32,
    /// Content width.
    pub width: f32,
    /// Content height.
    pub height: f32,
    /// Used margins.
    pub margin: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Used padding.
    pub padding: EdgeSizes,
    /// Baseline of the first line, in page coordinates.
    pub baseline: Option<f32>,

    /// Child boxes in order.
    pub children: Vec<LayoutBox>,
    /// This fragment starts the box.
    pub is_first_fragment: bool,
    /// This fragment ends the box.
    pub is_last_fragment: bool,

    /// `colspan`/`span` for cells and columns.
    pub colspan: usize,
    /// `rowspan` for cells.
    pub rowspan: usize,
    /// Footnote index of a `::footnote-call`.
    pub footnote: Option<usize>,
    /// Used named page (`page` resolved through ancestors).
    pub page_name: Option<String>,
    /// An outside `::marker`, positioned next to the first line.
    pub outside_marker: bool,
    /// Extra advance added to each justification opportunity of a text run.
    pub justification: f32,
}

impl LayoutBox {
    /// A box with no geometry and no children.
    #[must_use]
    pub fn new(id: BoxId, kind: BoxKind, style: Arc<ComputedStyle>) -> Self {
        Self {
            id,
            kind,
            style,
            node: None,
            tag: None,
            element_id: None,
            pseudo: None,
            anonymous: false,
            position_x: 0.0,
            position_y: 0.0,
            width: 0.0,
            height: 0.0,
            margin: EdgeSizes::ZERO,
            border: EdgeSizes::ZERO,
            padding: EdgeSizes::ZERO,
            baseline: None,
            children: Vec::new(),
            is_first_fragment: true,
            is_last_fragment: true,
            colspan: 1,
            rowspan: 1,
            footnote: None,
            page_name: None,
            outside_marker: false,
            justification: 0.0,
        }
    }

    /// A copy of this box without its children, ready to receive geometry.
    #[must_use]
    pub fn shell(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind.clone(),
            style: Arc::clone(&self.style),
            node: self.node,
            tag: self.tag.clone(),
            element_id: self.element_id.clone(),
            pseudo: self.pseudo,
            anonymous: self.anonymous,
            position_x: 0.0,
            position_y: 0.0,
            width: 0.0,
            height: 0.0,
            margin: EdgeSizes::ZERO,
            border: EdgeSizes::ZERO,
            padding: EdgeSizes::ZERO,
            baseline: None,
            children: Vec::new(),
            is_first_fragment: true,
            is_last_fragment: true,
            colspan: self.colspan,
            rowspan: self.rowspan,
            footnote: self.footnote,
            page_name: self.page_name.clone(),
            outside_marker: self.outside_marker,
            justification: 0.0,
        }
    }

    // [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
    //
    // "Each box has a content area and optional surrounding padding, border,
    // and margin areas."
    //
    // position_x/position_y name the top-left corner of the margin box;
    // width/height are the content box.

    /// Left content edge.
    #[must_use]
    pub fn content_box_x(&self) -> f32 {
        self.position_x + self.margin.left + self.border.left + self.padding.left
    }

    /// Top content edge.
    #[must_use]
    pub fn content_box_y(&self) -> f32 {
        self.position_y + self.margin.top + self.border.top + self.padding.top
    }

    /// Left padding edge.
    #[must_use]
    pub fn padding_box_x(&self) -> f32 {
        self.position_x + self.margin.left + self.border.left
    }

    /// Top padding edge.
    #[must_use]
    pub fn padding_box_y(&self) -> f32 {
        self.position_y + self.margin.top + self.border.top
    }

    /// Left border edge.
    #[must_use]
    pub fn border_box_x(&self) -> f32 {
        self.position_x + self.margin.left
    }

    /// Top border edge.
    #[must_use]
    pub fn border_box_y(&self) -> f32 {
        self.position_y + self.margin.top
    }

    /// Content plus horizontal padding.
    #[must_use]
    pub fn padding_width(&self) -> f32 {
        self.width + self.padding.horizontal()
    }

    /// Content plus vertical padding.
    #[must_use]
    pub fn padding_height(&self) -> f32 {
        self.height + self.padding.vertical()
    }

    /// Width of the border box.
    #[must_use]
    pub fn border_width(&self) -> f32 {
        self.padding_width() + self.border.horizontal()
    }

    /// Height of the border box.
    #[must_use]
    pub fn border_height(&self) -> f32 {
        self.padding_height() + self.border.vertical()
    }

    /// Width of the margin box.
    #[must_use]
    pub fn margin_width(&self) -> f32 {
        self.border_width() + self.margin.horizontal()
    }

    /// Height of the margin box.
    #[must_use]
    pub fn margin_height(&self) -> f32 {
        self.border_height() + self.margin.vertical()
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        Rect::new(self.position_x, self.position_y, self.margin_width(), self.margin_height())
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    #[must_use]
    pub fn border_box(&self) -> Rect {
        Rect::new(self.border_box_x(), self.border_box_y(), self.border_width(), self.border_height())
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        Rect::new(self.padding_box_x(), self.padding_box_y(), self.padding_width(), self.padding_height())
    }

    /// The content area.
    #[must_use]
    pub fn content_box(&self) -> Rect {
        Rect::new(self.content_box_x(), self.content_box_y(), self.width, self.height)
    }

    /// Bottom edge of the border box.
    #[must_use]
    pub fn border_box_bottom(&self) -> f32 {
        self.border_box_y() + self.border_height()
    }

    /// Move this box and everything inside it.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.position_x += dx;
        self.position_y += dy;
        if let Some(baseline) = self.baseline.as_mut() {
            *baseline += dy;
        }
        for child in &mut self.children {
            child.translate(dx, dy);
        }
    }

    /// Move the box so its border box starts at (`x`, `y`) and give it the
    /// used `margin`. Parents laying out children at the origin place them
    /// with this once their position is known.
    pub fn place_border_box(&mut self, x: f32, y: f32, margin: EdgeSizes) {
        self.translate(x - self.border_box_x(), y - self.border_box_y());
        self.margin = margin;
        self.position_x = x - margin.left;
        self.position_y = y - margin.top;
    }

    // Classification predicates. Box capabilities are questions about the
    // kind and the style rather than separate types.

    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        match self.kind {
            BoxKind::Block
            | BoxKind::Replaced(_)
            | BoxKind::Flex
            | BoxKind::Grid
            | BoxKind::TableWrapper => !self.style.display.is_inline_level(),
            BoxKind::Table | BoxKind::Column | BoxKind::FootnoteArea | BoxKind::Line => true,
            _ => false,
        }
    }

    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        match self.kind {
            BoxKind::Inline
            | BoxKind::Text(_)
            | BoxKind::PageText(_)
            | BoxKind::LineBreak
            | BoxKind::Leader(_) => true,
            BoxKind::Block
            | BoxKind::Replaced(_)
            | BoxKind::Flex
            | BoxKind::Grid
            | BoxKind::TableWrapper => self.style.display.is_inline_level(),
            _ => false,
        }
    }

    /// An inline-level box laid out as a unit: inline-block, inline
    /// replaced, inline-flex, inline-grid, inline-table.
    #[must_use]
    pub fn is_atomic_inline(&self) -> bool {
        self.is_inline_level()
            && matches!(
                self.kind,
                BoxKind::Block | BoxKind::Replaced(_) | BoxKind::Flex | BoxKind::Grid | BoxKind::TableWrapper
            )
    }

    /// Left or right float.
    #[must_use]
    pub fn is_floated(&self) -> bool {
        matches!(self.style.float, Float::Left | Float::Right) && !self.is_table_internal()
    }

    /// Taken out of flow by `position: absolute|fixed`.
    #[must_use]
    pub fn is_absolutely_positioned(&self) -> bool {
        self.style.is_absolutely_positioned() && !self.is_table_internal()
    }

    /// Placed by normal flow.
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !self.is_floated() && !self.is_absolutely_positioned()
    }

    /// Table-internal box: row group, row, cell, column (group) or caption.
    #[must_use]
    pub const fn is_table_internal(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::TableRowGroup
                | BoxKind::TableRow
                | BoxKind::TableCell
                | BoxKind::TableColumnGroup
                | BoxKind::TableColumn
                | BoxKind::TableCaption
                | BoxKind::Table
        )
    }

    /// Holds block-level or inline-level content laid out in flow.
    #[must_use]
    pub fn is_block_container(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::Block | BoxKind::TableCell | BoxKind::TableCaption | BoxKind::Column | BoxKind::MarginBox(_)
        )
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' (except
    /// when that value has been propagated to the viewport) establish new
    /// block formatting contexts for their contents."
    #[must_use]
    pub fn establishes_bfc(&self) -> bool {
        self.id == BoxId::ROOT
            || self.is_floated()
            || self.is_absolutely_positioned()
            || self.is_atomic_inline()
            || matches!(
                self.kind,
                BoxKind::TableCell | BoxKind::TableCaption | BoxKind::Column | BoxKind::MarginBox(_) | BoxKind::FootnoteArea
            )
            || self.style.overflow != Overflow::Visible
            || self.style.display.inner() == Some(InnerDisplayType::FlowRoot)
            || self.style.is_multicol()
    }

    /// The row group shown at the top of every table fragment.
    #[must_use]
    pub fn is_header_group(&self) -> bool {
        self.kind == BoxKind::TableRowGroup
            && self.style.display.internal() == Some(InternalDisplay::TableHeaderGroup)
    }

    /// The row group shown at the bottom of every table fragment.
    #[must_use]
    pub fn is_footer_group(&self) -> bool {
        self.kind == BoxKind::TableRowGroup
            && self.style.display.internal() == Some(InternalDisplay::TableFooterGroup)
    }

    /// True when every child is inline-level: the box holds an inline
    /// formatting context.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// "if a block container box has a block-level box inside it, then we
    /// force it to have only block-level boxes inside it."
    #[must_use]
    pub fn children_are_inline(&self) -> bool {
        let in_flow = || self.children.iter().filter(|c| c.is_in_flow());
        in_flow().any(Self::is_inline_level) && !in_flow().any(Self::is_block_level)
    }

    /// `break-before` of this box combined with the values propagated from
    /// its first in-flow child.
    ///
    /// [§ 3.1](https://www.w3.org/TR/css-break-3/#break-between)
    /// "Values of break-before and break-after on a box propagate to its
    /// first and last child respectively's parent break."
    #[must_use]
    pub fn propagated_break_before(&self) -> BreakBetween {
        let own = self.style.break_before;
        if !self.propagates_breaks() {
            return own;
        }
        match self.children.iter().find(|c| c.is_in_flow()) {
            Some(first) if first.is_block_level() => own.combine(first.propagated_break_before()),
            _ => own,
        }
    }

    /// `break-after` of this box combined with the values propagated from
    /// its last in-flow child.
    #[must_use]
    pub fn propagated_break_after(&self) -> BreakBetween {
        let own = self.style.break_after;
        if !self.propagates_breaks() {
            return own;
        }
        match self.children.iter().rev().find(|c| c.is_in_flow()) {
            Some(last) if last.is_block_level() => last.propagated_break_after().combine(own),
            _ => own,
        }
    }

    fn propagates_breaks(&self) -> bool {
        matches!(self.kind, BoxKind::Block | BoxKind::TableWrapper) && !self.style.is_multicol()
    }

    // Queries for painters and tests.

    /// Every box below this one, in tree order.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack: Vec<&Self> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// True for a box an element generates for itself: neither a
    /// pseudo-element box nor the placeholder marking where an out-of-flow
    /// box would have been.
    #[must_use]
    pub fn is_principal(&self) -> bool {
        self.pseudo.is_none() && self.kind != BoxKind::AbsolutePlaceholder
    }

    /// This box and its descendants generated for elements named `tag`.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Self> {
        std::iter::once(self)
            .chain(self.descendants())
            .filter(|b| b.is_principal() && b.tag.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// The first box, this one included, generated for the element with
    /// `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Self> {
        std::iter::once(self)
            .chain(self.descendants())
            .find(|b| b.is_principal() && b.element_id.as_deref() == Some(id))
    }

    /// Text of every text run inside this box, concatenated.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for b in std::iter::once(self).chain(self.descendants()) {
            match &b.kind {
                BoxKind::Text(text) | BoxKind::Leader(text) => out.push_str(text),
                _ => {}
            }
        }
        out
    }

    /// Lines directly or indirectly inside this box.
    #[must_use]
    pub fn lines(&self) -> Vec<&Self> {
        self.descendants().into_iter().filter(|b| b.kind == BoxKind::Line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(kind: BoxKind) -> LayoutBox {
        LayoutBox::new(BoxId(0), kind, Arc::new(ComputedStyle::initial()))
    }

    #[test]
    fn test_edges_add_up() {
        let mut b = boxed(BoxKind::Block);
        b.position_x = 1.0;
        b.position_y = 2.0;
        b.width = 10.0;
        b.height = 5.0;
        b.margin = EdgeSizes::uniform(1.0);
        b.border = EdgeSizes::uniform(2.0);
        b.padding = EdgeSizes::uniform(3.0);
        assert_eq!(b.content_box_x(), 7.0);
        assert_eq!(b.content_box_y(), 8.0);
        assert_eq!(b.border_width(), 20.0);
        assert_eq!(b.margin_height(), 17.0);
        assert_eq!(b.border_box(), Rect::new(2.0, 3.0, 20.0, 15.0));
    }

    #[test]
    fn test_translate_moves_subtree() {
        let mut parent = boxed(BoxKind::Block);
        let mut child = boxed(BoxKind::Text("a".into()));
        child.baseline = Some(4.0);
        parent.children.push(child);
        parent.translate(3.0, 5.0);
        assert_eq!(parent.children[0].position_x, 3.0);
        assert_eq!(parent.children[0].baseline, Some(9.0));
    }

    #[test]
    fn test_text_and_queries() {
        let mut parent = boxed(BoxKind::Block);
        parent.tag = Some("p".into());
        let mut span = boxed(BoxKind::Inline);
        span.element_id = Some("s".into());
        span.children.push(boxed(BoxKind::Text("hi".into())));
        parent.children.push(span);
        parent.children.push(boxed(BoxKind::Text(" there".into())));
        assert_eq!(parent.text(), "hi there");
        assert_eq!(parent.find_by_tag("P").len(), 1);
        assert!(parent.find_by_id("s").is_some());
        assert!(parent.children_are_inline());
    }

    #[test]
    fn test_queries_skip_out_of_flow_placeholders() {
        let mut root = boxed(BoxKind::Block);
        let mut placeholder = boxed(BoxKind::AbsolutePlaceholder);
        placeholder.element_id = Some("abs".into());
        placeholder.tag = Some("div".into());
        placeholder.position_x = 10.0;
        let mut positioned = boxed(BoxKind::Block);
        positioned.element_id = Some("abs".into());
        positioned.tag = Some("div".into());
        positioned.position_x = 80.0;
        placeholder.children.push(positioned);
        root.children.push(placeholder);

        let found = root.find_by_id("abs").unwrap();
        assert_eq!(found.kind, BoxKind::Block);
        assert_eq!(found.position_x, 80.0);
        assert_eq!(root.find_by_tag("div").len(), 1);
    }
}
