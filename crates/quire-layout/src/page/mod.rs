//! Pagination.
//!
//! [CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/)
//!
//! The root box is laid out once per page with the bottom of the page area
//! as the fragmentainer end. Each call returns the page's fragment and the
//! point where the next page resumes; the loop stops when nothing is left
//! and no footnote is still waiting for room.

pub mod breaks;
pub mod footnotes;
pub mod margin_boxes;

use std::sync::Arc;

use serde::Serialize;

use quire_style::keywords::BreakBetween;
use quire_style::page::{PageArea, PageSide, PageSize, PageType};
use quire_style::values::Color;
use quire_style::{ComputedStyle, StyleResolver};

use crate::absolute;
use crate::block::{Containing, Slot, apply_relative_offsets, border_edges, layout_block_level, padding_edges};
use crate::boxes::{BoxId, BoxKind, DynamicPart, LayoutBox};
use crate::context::LayoutContext;
use crate::float::FloatContext;
use crate::geometry::{EdgeSizes, Rect};
use crate::options::{MAX_FOOTNOTE_REPORTS, MAX_PAGE_RETRIES};
use crate::resume::{FlowInput, ResumePoint};

/// One laid-out page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// What `@page` selectors saw.
    pub page_type: PageType,
    /// Page box width.
    pub width: f32,
    /// Page box height.
    pub height: f32,
    /// Page margins.
    pub margin: EdgeSizes,
    /// Page box borders.
    pub border: EdgeSizes,
    /// Page box padding.
    pub padding: EdgeSizes,
    /// The page area, where the document flows.
    pub content: Rect,
    /// `background-color` of the page.
    pub background: Color,
    /// The page box: the root's fragment followed by the fixed boxes.
    pub root: LayoutBox,
    /// Generated page-margin boxes.
    pub margin_boxes: Vec<LayoutBox>,
    /// The footnote area, when footnotes landed on this page.
    pub footnote_area: Option<LayoutBox>,
    /// Page context style.
    #[serde(skip)]
    pub style: Arc<ComputedStyle>,
}

impl Page {
    /// The fragment of the root element, absent on blank pages.
    #[must_use]
    pub fn document_fragment(&self) -> Option<&LayoutBox> {
        self.root.children.first().filter(|b| b.id == BoxId::ROOT)
    }

    /// Every box of the page: the page box tree, margin boxes and the
    /// footnote area.
    #[must_use]
    pub fn all_boxes(&self) -> Vec<&LayoutBox> {
        let mut out = vec![&self.root];
        out.extend(self.root.descendants());
        for b in self.margin_boxes.iter().chain(self.footnote_area.as_ref()) {
            out.push(b);
            out.extend(b.descendants());
        }
        out
    }
}

/// Page box geometry from a page context style.
///
/// [§ 7 Page Size](https://www.w3.org/TR/css-page-3/#page-size) and
/// [§ 3.2 Page Margins](https://www.w3.org/TR/css-page-3/#page-margins):
/// percentages of horizontal margins resolve against the page width, of
/// vertical ones against the page height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page box width.
    pub width: f32,
    /// Page box height.
    pub height: f32,
    /// Margins.
    pub margin: EdgeSizes,
    /// Borders.
    pub border: EdgeSizes,
    /// Padding.
    pub padding: EdgeSizes,
    /// Page area.
    pub content: Rect,
}

impl PageGeometry {
    /// Geometry of a page styled `style`, `default_size` standing in for
    /// `size: auto`.
    #[must_use]
    pub fn resolve(style: &ComputedStyle, default_size: (f32, f32)) -> Self {
        let (width, height) = match style.size {
            PageSize::Auto => default_size,
            PageSize::Explicit(w, h) => (w, h),
        };
        let margin = EdgeSizes {
            top: style.margin.top.resolve_or_zero(height),
            right: style.margin.right.resolve_or_zero(width),
            bottom: style.margin.bottom.resolve_or_zero(height),
            left: style.margin.left.resolve_or_zero(width),
        };
        let border = border_edges(style);
        let padding = padding_edges(style, width);
        let outer = Rect::new(0.0, 0.0, width, height);
        let inner = outer.inset(&margin).inset(&border).inset(&padding);
        let content = Rect::new(inner.x, inner.y, inner.width.max(0.0), inner.height.max(0.0));
        Self {
            width,
            height,
            margin,
            border,
            padding,
            content,
        }
    }
}

/// Text of page-dependent content on the page being laid out.
///
/// `counter(pages)` and anchors not seen yet use what the previous pass
/// found, or a stand-in of the right shape on the first pass; either way
/// the document asks for another pass.
pub fn resolve_parts(ctx: &mut LayoutContext<'_>, parts: &[DynamicPart]) -> String {
    let number = i32::try_from(ctx.pages.number).unwrap_or(i32::MAX);
    let mut text = String::new();
    for part in parts {
        match part {
            DynamicPart::Text(s) => text.push_str(s),
            DynamicPart::Page(style) => text.push_str(&style.format(number)),
            DynamicPart::Pages(style) => {
                ctx.needs_page_totals = true;
                let total = ctx.pages.total.map_or(number, |t| i32::try_from(t).unwrap_or(i32::MAX));
                text.push_str(&style.format(total));
            }
            DynamicPart::TargetPage { anchor, style } => {
                ctx.needs_page_totals = true;
                match ctx.pages.anchor_page(anchor) {
                    Some(page) => text.push_str(&style.format(i32::try_from(page).unwrap_or(i32::MAX))),
                    None if ctx.pages.total.is_none() => text.push_str(&style.format(number)),
                    None => {}
                }
            }
        }
    }
    text
}

/// Record the page of every element with an `id` on the current page.
fn record_anchors(ctx: &mut LayoutContext<'_>, fragment: &LayoutBox) {
    let number = ctx.pages.number;
    for b in std::iter::once(fragment).chain(fragment.descendants()) {
        if let Some(id) = &b.element_id {
            let _ = ctx.pages.anchors.entry(id.clone()).or_insert(number);
        }
    }
}

fn page_box(style: &Arc<ComputedStyle>, geometry: &PageGeometry, children: Vec<LayoutBox>) -> LayoutBox {
    let mut b = LayoutBox::new(BoxId::PAGE, BoxKind::Page, Arc::clone(style));
    b.anonymous = true;
    b.margin = geometry.margin;
    b.border = geometry.border;
    b.padding = geometry.padding;
    b.width = geometry.content.width;
    b.height = geometry.content.height;
    b.children = children;
    b
}

/// Where the document stands between two pages.
#[derive(Debug, Default)]
struct Progress {
    resume: Option<ResumePoint>,
    finished: bool,
    forced_break: Option<BreakBetween>,
    carried: Vec<usize>,
    previous_name: Option<String>,
    group_index: usize,
    stalled: usize,
    reports: usize,
}

impl Progress {
    fn page_type(&mut self, root: &LayoutBox, index: usize, blank: bool) -> PageType {
        let name = if self.finished {
            self.previous_name.clone()
        } else {
            breaks::page_name_at(root, self.resume.as_ref())
        };
        // [§ 4.2 :nth()](https://www.w3.org/TR/css-page-3/#nth-selector)
        // Named page groups restart when the name changes.
        self.group_index = if index > 0 && name == self.previous_name {
            self.group_index + 1
        } else {
            0
        };
        self.previous_name.clone_from(&name);
        PageType {
            name,
            index,
            side: PageSide::for_index(index),
            first: index == 0,
            blank,
            group_index: self.group_index,
        }
    }
}

/// Lay out `root` page after page.
///
/// Margin boxes are added once every page exists, so `counter(pages)` in
/// them is exact.
pub fn paginate(ctx: &mut LayoutContext<'_>, resolver: &dyn StyleResolver, root: &LayoutBox) -> Vec<Page> {
    let mut pages: Vec<Page> = Vec::new();
    let mut progress = Progress::default();
    let direction = root.style.direction;

    loop {
        if pages.len() >= ctx.options.max_pages {
            ctx.warn(&format!("stopped after {} pages", ctx.options.max_pages));
            break;
        }
        let index = pages.len();

        // STEP 1: A `left`/`right` break landing on the wrong side inserts a
        // blank page.
        let between = if index == 0 {
            root.propagated_break_before()
        } else {
            progress.forced_break.unwrap_or(BreakBetween::Auto)
        };
        let blank = !progress.finished && breaks::needs_blank_page(between, direction, index);
        let page_type = progress.page_type(root, index, blank);
        let style = resolver.page_style(&page_type, PageArea::Page);
        let geometry = PageGeometry::resolve(&style, ctx.options.default_page_size);
        let area = geometry.content;

        ctx.begin_page(index + 1, area);
        footnotes::begin_page(ctx, resolver.page_style(&page_type, PageArea::Footnote), area);

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "[PAGE] {} name={:?} blank={} resume={:?}",
            index + 1,
            page_type.name,
            blank,
            progress.resume
        );

        if blank {
            pages.push(Page {
                page_type,
                width: geometry.width,
                height: geometry.height,
                margin: geometry.margin,
                border: geometry.border,
                padding: geometry.padding,
                content: area,
                background: style.background_color,
                root: page_box(&style, &geometry, Vec::new()),
                margin_boxes: Vec::new(),
                footnote_area: None,
                style,
            });
            progress.forced_break = None;
            continue;
        }

        // STEP 2: Footnotes carried from the previous page go first.
        let carried = std::mem::take(&mut progress.carried);
        footnotes::place_carried(ctx, &carried);

        // STEP 3: Lay out the document for this page.
        let mut children = Vec::new();
        if !progress.finished {
            let slot = Slot::new(
                area.x,
                area.y,
                Containing {
                    width: area.width,
                    height: Some(area.height),
                },
            );
            let input = FlowInput {
                bottom_space: area.bottom(),
                reserved: 0.0,
                resume: progress.resume.as_ref(),
                page_is_empty: true,
                adjoining_margins: Vec::new(),
            };
            let mut floats = FloatContext::new();
            let outcome = layout_block_level(ctx, root, &slot, input, &mut floats);
            let forced_break = outcome.forced_break;
            let (fragment, next) = outcome.result.into_parts();

            // A page that consumed nothing would repeat forever.
            if next.is_some() && next == progress.resume {
                progress.stalled += 1;
                if progress.stalled >= MAX_PAGE_RETRIES {
                    ctx.warn("layout made no progress; stopping pagination");
                    progress.resume = None;
                }
            } else {
                progress.stalled = 0;
                progress.resume = next;
            }
            progress.finished = progress.resume.is_none();
            progress.forced_break = forced_break;

            let mut fragment = fragment.unwrap_or_else(|| root.shell());
            let mut fixed = absolute::resolve_at_page(ctx, &mut fragment, area);
            let icb = Containing {
                width: area.width,
                height: Some(area.height),
            };
            apply_relative_offsets(&mut fragment, icb);
            for b in &mut fixed {
                apply_relative_offsets(b, icb);
            }
            record_anchors(ctx, &fragment);
            children.push(fragment);
            children.extend(fixed);
        } else {
            ctx.pending_absolutes.clear();
            let mut empty = root.shell();
            children.extend(absolute::resolve_at_page(ctx, &mut empty, area));
        }

        // STEP 4: The footnote area, and what did not fit in it.
        let footnote_area = footnotes::footnote_area(ctx, area);
        progress.carried.clone_from(&ctx.footnotes.deferred);
        if !progress.carried.is_empty() {
            progress.reports += 1;
            if progress.reports > MAX_FOOTNOTE_REPORTS {
                ctx.warn("footnotes kept overflowing; dropping the rest");
                progress.carried.clear();
            }
        }

        pages.push(Page {
            page_type,
            width: geometry.width,
            height: geometry.height,
            margin: geometry.margin,
            border: geometry.border,
            padding: geometry.padding,
            content: area,
            background: style.background_color,
            root: page_box(&style, &geometry, children),
            margin_boxes: Vec::new(),
            footnote_area,
            style,
        });

        if progress.finished && progress.carried.is_empty() {
            break;
        }
    }

    // STEP 5: Margin boxes, with the page count known.
    let total = pages.len();
    for page in &mut pages {
        ctx.pages.number = page.page_type.index + 1;
        page.margin_boxes = margin_boxes::layout_margin_boxes(
            ctx,
            resolver,
            &page.page_type,
            (page.width, page.height),
            page.margin,
            total,
        );
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_dom::NodeId;
    use quire_style::content::{CounterStyle, Content};
    use quire_style::sheet::PseudoElement;
    use quire_style::values::{LengthPercentageAuto, Size};
    use quire_style::{Display, MarginBoxName};

    use crate::image::NoImages;
    use crate::options::LayoutOptions;
    use crate::text::{MonospaceShaper, NoHyphenation};

    /// Pages of 100x100 with 10px margins and a footer on every page.
    struct SmallPages;

    impl StyleResolver for SmallPages {
        fn style_for(&self, _node: NodeId, _pseudo: Option<PseudoElement>) -> Option<Arc<ComputedStyle>> {
            None
        }

        fn page_style(&self, page: &PageType, area: PageArea) -> Arc<ComputedStyle> {
            let mut style = ComputedStyle::initial();
            match area {
                PageArea::Page => {
                    style.size = PageSize::Explicit(100.0, 100.0);
                    let margin = LengthPercentageAuto::Length(10.0);
                    style.margin.top = margin;
                    style.margin.right = margin;
                    style.margin.bottom = margin;
                    style.margin.left = margin;
                    if page.index % 2 == 1 {
                        style.background_color = Color::RED;
                    }
                }
                PageArea::Margin(MarginBoxName::BottomCenter) => {
                    style.content = Content::Items(vec![quire_style::content::ContentItem::Counter {
                        name: "pages".into(),
                        style: CounterStyle::Decimal,
                    }]);
                }
                _ => {}
            }
            Arc::new(style)
        }
    }

    fn block(id: usize, height: Option<f32>, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        if let Some(height) = height {
            style.height = Size::Length(height);
        }
        let mut b = LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style));
        b.children = children;
        b
    }

    #[test]
    fn test_geometry_from_margins() {
        let mut style = ComputedStyle::initial();
        style.margin.left = LengthPercentageAuto::Percent(10.0);
        style.margin.top = LengthPercentageAuto::Length(5.0);
        let geometry = PageGeometry::resolve(&style, (200.0, 100.0));
        assert_eq!(geometry.content, Rect::new(20.0, 5.0, 180.0, 95.0));
    }

    #[test]
    fn test_parts_use_previous_total() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        ctx.pages.number = 3;
        let parts = vec![
            DynamicPart::Page(CounterStyle::Decimal),
            DynamicPart::Text("/".into()),
            DynamicPart::Pages(CounterStyle::Decimal),
        ];
        assert_eq!(resolve_parts(&mut ctx, &parts), "3/3");
        assert!(ctx.needs_page_totals);
        ctx.pages.total = Some(7);
        assert_eq!(resolve_parts(&mut ctx, &parts), "3/7");

        let _ = ctx.pages.previous_anchors.insert("intro".into(), 2);
        let target = vec![DynamicPart::TargetPage {
            anchor: "intro".into(),
            style: CounterStyle::LowerRoman,
        }];
        assert_eq!(resolve_parts(&mut ctx, &target), "ii");
        let missing = vec![DynamicPart::TargetPage {
            anchor: "nowhere".into(),
            style: CounterStyle::Decimal,
        }];
        assert_eq!(resolve_parts(&mut ctx, &missing), "");
    }

    #[test]
    fn test_blocks_flow_onto_pages() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let root = block(
            0,
            None,
            vec![block(1, Some(50.0), vec![]), block(2, Some(50.0), vec![]), block(3, Some(10.0), vec![])],
        );
        let pages = paginate(&mut ctx, &SmallPages, &root);
        assert_eq!(pages.len(), 2);
        let second = pages[1].document_fragment().unwrap();
        assert_eq!(second.children[0].id, BoxId(2));
        assert_eq!(second.children[0].position_y, 10.0);
        assert_eq!(second.children[1].position_y, 60.0);
        assert!(!second.is_first_fragment);
        assert_eq!(pages[1].background, Color::RED);
        assert!(pages[0].background.is_transparent());

        let footer = &pages[0].margin_boxes[0];
        assert_eq!(footer.kind, BoxKind::MarginBox(MarginBoxName::BottomCenter));
        assert_eq!(footer.text(), "2");
        assert_eq!(footer.border_box_y(), 90.0);
    }

    #[test]
    fn test_left_break_on_first_page_inserts_blank() {
        let options = LayoutOptions::default();
        let shaper = MonospaceShaper::default();
        let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
        let mut first = block(1, Some(10.0), vec![]);
        Arc::make_mut(&mut first.style).break_before = BreakBetween::Left;
        let root = block(0, None, vec![first]);
        let pages = paginate(&mut ctx, &SmallPages, &root);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].page_type.blank);
        assert!(pages[0].document_fragment().is_none());
        assert_eq!(pages[1].page_type.side, PageSide::Left);
    }
}
