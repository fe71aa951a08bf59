//! Box tree construction, layout and pagination for the quire layout engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Formatting structure** ([§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - Principal boxes, anonymous block and inline boxes, anonymous table objects
//!   - White space processing and `text-transform`
//!   - Generated content, counters, quotes, list markers
//!   - `float: footnote` calls, markers and bodies
//!
//! - **Layout**
//!   - Block formatting contexts with margin collapsing, floats and clearance
//!   - Inline formatting contexts: line breaking, hyphenation, alignment, justification
//!   - Absolute, fixed and relative positioning
//!   - Flex ([CSS Flexbox Level 1](https://www.w3.org/TR/css-flexbox-1/))
//!   - Grid ([CSS Grid Level 1](https://www.w3.org/TR/css-grid-1/))
//!   - Tables ([§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html))
//!   - Multi-column ([CSS Multi-column Level 1](https://www.w3.org/TR/css-multicol-1/))
//!
//! - **Paged media** ([CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/))
//!   - Fragmentation with resume points and break properties
//!   - Page selectors, named pages, blank pages, page-margin boxes
//!   - Footnote areas ([GCPM § 2](https://www.w3.org/TR/css-gcpm-3/#footnotes))
//!   - Repagination for `counter(pages)` and `target-counter()`
//!
//! # Not Yet Implemented
//!
//! - Bidi reordering beyond mirroring whole lines
//! - Vertical writing modes
//! - `max-lines`
//!
//! # Example
//! ```
//! use quire_dom::markup;
//! use quire_layout::{LayoutOptions, layout};
//! use quire_style::RuleResolver;
//!
//! let dom = markup::parse("<p>Hello</p>");
//! let resolver = RuleResolver::new(&dom, &["@page { size: 100px 50px; margin: 0 }"]);
//! let document = layout(&dom, &resolver, &LayoutOptions::default());
//! assert_eq!(document.pages.len(), 1);
//! assert_eq!(document.pages[0].width, 100.0);
//! ```

use std::collections::HashMap;

use serde::Serialize;

use quire_common::Diagnostics;
use quire_dom::DomTree;
use quire_style::StyleResolver;

/// Absolute and fixed positioning per [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width).
pub mod absolute;
/// Block formatting contexts per [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting).
pub mod block;
/// Box tree types per [§ 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen).
pub mod boxes;
/// Box tree construction.
pub mod build;
/// Multi-column layout per [CSS Multi-column Level 1](https://www.w3.org/TR/css-multicol-1/).
pub mod columns;
/// The per-pass layout context.
pub mod context;
/// JSON dumps of laid-out documents.
pub mod debug;
/// Flex layout per [CSS Flexbox Level 1](https://www.w3.org/TR/css-flexbox-1/).
pub mod flex;
/// Floats per [§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats).
pub mod float;
/// Rectangles and edges.
pub mod geometry;
/// Grid layout per [CSS Grid Level 1](https://www.w3.org/TR/css-grid-1/).
pub mod grid;
/// Replaced content lookup.
pub mod image;
/// Inline formatting contexts per [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting).
pub mod inline;
/// Layout options and iteration bounds.
pub mod options;
/// Pagination per [CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/).
pub mod page;
/// Preferred widths per [CSS Sizing § 5](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes).
pub mod preferred;
/// Replaced element sizing per [§ 10.3.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width).
pub mod replaced;
/// Layout results and resume points per [CSS Fragmentation Level 3](https://www.w3.org/TR/css-break-3/).
pub mod resume;
/// Table layout per [§ 17](https://www.w3.org/TR/CSS2/tables.html).
pub mod table;
/// Text measurement and hyphenation.
pub mod text;

// Re-exports for convenience
pub use boxes::{BoxId, BoxKind, DynamicPart, LayoutBox, ReplacedContent};
pub use context::LayoutContext;
pub use geometry::{EdgeSizes, Rect};
pub use image::{ImageMap, ImageProvider, IntrinsicImage, NoImages};
pub use options::LayoutOptions;
pub use page::Page;
pub use text::{Hyphenator, MonospaceShaper, NoHyphenation, SoftHyphenOnly, TextShaper};

/// A laid-out document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Pages in order.
    pub pages: Vec<Page>,
    /// Recoverable problems met while styling and laying out, deduplicated.
    pub warnings: Vec<String>,
}

impl Document {
    /// Every box of every page carrying the element id `id`, first
    /// fragment first.
    #[must_use]
    pub fn fragments_of(&self, id: &str) -> Vec<&LayoutBox> {
        self.pages
            .iter()
            .flat_map(Page::all_boxes)
            .filter(|b| b.is_principal() && b.element_id.as_deref() == Some(id))
            .collect()
    }
}

/// Lay out `dom` with the bundled shaper, no automatic hyphenation and no
/// images.
#[must_use]
pub fn layout(dom: &DomTree, resolver: &dyn StyleResolver, options: &LayoutOptions) -> Document {
    let shaper = MonospaceShaper::from_options(options);
    layout_document(dom, resolver, options, &shaper, &NoHyphenation, &NoImages)
}

/// Build the box tree of `dom` and paginate it.
///
/// Page-dependent text (`counter(pages)`, `target-counter()`) is first laid
/// out with stand-in values. When any was used, the document is laid out
/// again with the page count and anchor pages of the previous pass, until
/// they stop changing or `options.repagination_passes` is reached; the last
/// pass wins either way.
#[must_use]
pub fn layout_document(
    dom: &DomTree,
    resolver: &dyn StyleResolver,
    options: &LayoutOptions,
    shaper: &dyn TextShaper,
    hyphenator: &dyn Hyphenator,
    images: &dyn ImageProvider,
) -> Document {
    // STEP 1: The box tree, built once for every pass.
    let mut diagnostics = Diagnostics::new();
    let built = build::build(dom, resolver, images, &mut diagnostics);

    // STEP 2: Paginate until page numbers settle.
    let passes = options.repagination_passes.max(1);
    let mut total: Option<usize> = None;
    let mut anchors: HashMap<String, usize> = HashMap::new();
    let mut pages = Vec::new();
    let mut layout_warnings = Diagnostics::new();
    for pass in 1..=passes {
        let mut ctx = LayoutContext::new(options, shaper, hyphenator, images);
        ctx.footnote_bodies.clone_from(&built.footnotes);
        ctx.pages.total = total;
        ctx.pages.previous_anchors = std::mem::take(&mut anchors);
        pages = page::paginate(&mut ctx, resolver, &built.root);

        let settled = !ctx.needs_page_totals
            || (total == Some(pages.len()) && ctx.pages.anchors == ctx.pages.previous_anchors);

        #[cfg(feature = "layout-trace")]
        log::trace!("[PASS] {pass}: {} pages, settled={settled}", pages.len());

        total = Some(pages.len());
        anchors = std::mem::take(&mut ctx.pages.anchors);
        layout_warnings = ctx.diagnostics;
        if settled {
            break;
        }
        if pass == passes {
            layout_warnings.warn(
                "layout",
                &format!("page numbers did not settle after {passes} passes"),
            );
        }
    }

    // STEP 3: Warnings from every stage, styles first.
    let mut warnings = Diagnostics::new();
    warnings.extend(resolver.warnings());
    warnings.merge(diagnostics);
    warnings.merge(layout_warnings);

    log::debug!("laid out {} pages", pages.len());
    Document {
        pages,
        warnings: warnings.into_messages(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_dom::markup;
    use quire_style::RuleResolver;

    fn run(html: &str, css: &str) -> Document {
        let dom = markup::parse(html);
        let resolver = RuleResolver::new(&dom, &[css]);
        layout(&dom, &resolver, &LayoutOptions::default())
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let document = run("", "@page { size: 100px 100px }");
        assert_eq!(document.pages.len(), 1);
        assert_eq!(document.pages[0].width, 100.0);
    }

    #[test]
    fn test_page_total_after_repagination() {
        let document = run(
            "<div>a</div><div class=b>b</div><div class=b>c</div>",
            "@page { size: 100px 100px; margin: 0 } \
             .b { break-before: page } \
             body { margin: 0 } \
             div::after { content: counter(pages) }",
        );
        assert_eq!(document.pages.len(), 3);
        let first = document.pages[0].document_fragment().map(LayoutBox::text).unwrap_or_default();
        assert!(first.contains("a3"), "{first:?}");
    }

    #[test]
    fn test_target_counter_reads_later_page() {
        let document = run(
            "<p><a href='#end'>x</a></p><p id=end class=b>end</p>",
            "@page { size: 100px 100px; margin: 0 } \
             body { margin: 0 } p { margin: 0 } \
             .b { break-before: page } \
             a::after { content: target-counter(attr(href), page) }",
        );
        assert_eq!(document.pages.len(), 2);
        let first = document.pages[0].document_fragment().map(LayoutBox::text).unwrap_or_default();
        assert!(first.contains("x2"), "{first:?}");
        assert_eq!(document.fragments_of("end").len(), 1);
    }

    #[test]
    fn test_style_warnings_are_tagged_once() {
        let document = run("<p>x</p>", "p { width: bogus }");
        let style: Vec<&String> = document.warnings.iter().filter(|w| w.contains("bogus")).collect();
        assert_eq!(style.len(), 1);
        assert!(style[0].starts_with("[style] "), "{style:?}");
        assert!(!style[0].contains("[style] [style]"));
    }

    #[test]
    fn test_deep_nesting_is_flattened() {
        let html = format!("{}deep{}", "<div>".repeat(300), "</div>".repeat(300));
        let document = run(&html, "");
        assert_eq!(document.pages.len(), 1);
        let text = document.pages[0].document_fragment().map(LayoutBox::text).unwrap_or_default();
        assert_eq!(text, "deep");
        assert!(document.warnings.iter().any(|w| w.contains("nested deeper")));
    }

    #[test]
    fn test_missing_image_is_a_warning() {
        let document = run("<img src=nowhere.png>", "");
        assert!(document.warnings.iter().any(|w| w.contains("nowhere.png")));
    }
}
