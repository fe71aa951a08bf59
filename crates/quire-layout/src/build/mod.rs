//! The formatting structure: from the styled document to the box tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! One walk over the document generates the principal box of every element,
//! the boxes of its pseudo-elements and a text run per text node, counting
//! as it goes. Each box is repaired as soon as its children are known
//! (anonymous table parts, anonymous blocks, flex and grid items); white
//! space is collapsed over the finished tree, where inline formatting
//! contexts are final.

mod anonymous;
mod counters;
mod generated;
mod table_fixup;
mod whitespace;

use std::sync::Arc;

use quire_common::Diagnostics;
use quire_dom::{DomTree, ElementData, NodeId, NodeType};
use quire_style::content::Content;
use quire_style::display::{InnerDisplayType, InternalDisplay, OuterDisplayType};
use quire_style::keywords::{Float, FootnoteDisplay, ListStylePosition};
use quire_style::{ComputedStyle, Display, PseudoElement, StyleResolver};

use crate::boxes::{BoxId, BoxKind, LayoutBox, ReplacedContent};
use crate::image::ImageProvider;
use crate::options::MAX_BOX_DEPTH;

use counters::{Counters, FOOTNOTE, LIST_ITEM, SiblingScope};

use whitespace::transform;

/// The box tree of a document and the footnote bodies taken out of it.
#[derive(Debug, Clone)]
pub struct BuiltDocument {
    /// Principal box of the root element, id [`BoxId::ROOT`].
    pub root: LayoutBox,
    /// `float: footnote` bodies; the index is the one their call carries.
    pub footnotes: Vec<LayoutBox>,
}

/// Hands out box ids in tree order.
#[derive(Debug)]
pub struct BoxIds {
    next: usize,
}

impl BoxIds {
    /// Ids after [`BoxId::ROOT`].
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// A fresh id.
    pub const fn allocate(&mut self) -> BoxId {
        let id = BoxId(self.next);
        self.next += 1;
        id
    }
}

impl Default for BoxIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the box tree of `dom`.
///
/// Problems in the document (unloadable images, unsupported generated
/// content) are warnings; the tree is always built.
pub fn build(
    dom: &DomTree,
    resolver: &dyn StyleResolver,
    images: &dyn ImageProvider,
    diagnostics: &mut Diagnostics,
) -> BuiltDocument {
    let mut builder = Builder {
        dom,
        resolver,
        images,
        diagnostics,
        ids: BoxIds::new(),
        counters: Counters::new(),
        quote_depth: 0,
        depth: 0,
        footnotes: Vec::new(),
    };
    let mut root = builder.build_root();
    let mut footnotes = std::mem::take(&mut builder.footnotes);
    collapse_white_space(&mut root, &mut builder.ids);
    for body in &mut footnotes {
        collapse_white_space(body, &mut builder.ids);
    }
    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[BUILD] {} boxes, {} footnotes",
        root.descendants().len() + 1,
        footnotes.len()
    );
    BuiltDocument { root, footnotes }
}

/// Collapse white space in every inline formatting context below `b`.
fn collapse_white_space(b: &mut LayoutBox, ids: &mut BoxIds) {
    if b.kind != BoxKind::Inline && b.children.iter().any(LayoutBox::is_inline_level) {
        whitespace::process_inline_content(&mut b.children, ids);
    }
    for child in &mut b.children {
        collapse_white_space(child, ids);
    }
}

/// Box kind for an element of `display`, before any repair.
///
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
fn kind_for(display: Display) -> BoxKind {
    match display {
        Display::Internal(role) => match role {
            InternalDisplay::TableRowGroup | InternalDisplay::TableHeaderGroup | InternalDisplay::TableFooterGroup => {
                BoxKind::TableRowGroup
            }
            InternalDisplay::TableRow => BoxKind::TableRow,
            InternalDisplay::TableCell => BoxKind::TableCell,
            InternalDisplay::TableColumnGroup => BoxKind::TableColumnGroup,
            InternalDisplay::TableColumn => BoxKind::TableColumn,
            InternalDisplay::TableCaption => BoxKind::TableCaption,
        },
        Display::Pair { outer, inner, .. } => match inner {
            InnerDisplayType::Flex => BoxKind::Flex,
            InnerDisplayType::Grid => BoxKind::Grid,
            InnerDisplayType::Table => BoxKind::Table,
            InnerDisplayType::Flow if outer == OuterDisplayType::Inline => BoxKind::Inline,
            InnerDisplayType::Flow | InnerDisplayType::FlowRoot => BoxKind::Block,
        },
        Display::None | Display::Contents => BoxKind::Inline,
    }
}

/// What an `<img>` turns into.
enum ImageOutcome {
    Loaded(ReplacedContent),
    Alt(String),
}

struct Builder<'a> {
    dom: &'a DomTree,
    resolver: &'a dyn StyleResolver,
    images: &'a dyn ImageProvider,
    diagnostics: &'a mut Diagnostics,
    ids: BoxIds,
    counters: Counters,
    quote_depth: usize,
    depth: usize,
    footnotes: Vec<LayoutBox>,
}

impl Builder<'_> {
    fn warn(&mut self, message: &str) {
        self.diagnostics.warn("build", message);
    }

    fn build_root(&mut self) -> LayoutBox {
        let root = self.dom.document_element();
        let dom = self.dom;
        let extra = dom
            .children(NodeId::ROOT)
            .iter()
            .filter(|&&id| dom.as_element(id).is_some())
            .count()
            .saturating_sub(1);
        if extra > 0 {
            self.warn(&format!("ignoring {extra} top-level element(s) after the document element"));
        }
        let style = root
            .and_then(|node| self.resolver.style_for(node, None))
            .filter(|style| style.display != Display::None);
        let (Some(node), Some(style)) = (root, style) else {
            let mut style = ComputedStyle::initial();
            style.display = Display::block();
            return LayoutBox::new(BoxId::ROOT, BoxKind::Block, Arc::new(style));
        };

        // [GCPM § 2.5](https://www.w3.org/TR/css-gcpm-3/#footnote-counters)
        // The footnote counter is in scope for the whole document.
        let mut scope = SiblingScope::default();
        self.counters.reset(&mut scope, FOOTNOTE, 0);

        let style = if matches!(style.display, Display::Contents) || style.float == Float::Footnote {
            let mut fixed = (*style).clone();
            fixed.display = Display::block();
            fixed.float = Float::None;
            Arc::new(fixed)
        } else {
            style
        };
        let mut root = self.element_box(node, style, &mut scope, None, BoxId::ROOT);
        if root.kind == BoxKind::Inline {
            root.kind = BoxKind::Block;
        }
        root
    }

    /// Boxes generated for one child node of an element styled `parent`.
    fn build_node(
        &mut self,
        node: NodeId,
        parent: &ComputedStyle,
        scope: &mut SiblingScope,
        page: Option<&str>,
    ) -> Vec<LayoutBox> {
        let dom = self.dom;
        let Some(dom_node) = dom.get(node) else {
            return Vec::new();
        };
        match &dom_node.node_type {
            NodeType::Text(text) => {
                let text = transform(text, parent.text_transform);
                if text.is_empty() {
                    return Vec::new();
                }
                vec![self.run_box(BoxKind::Text(text), parent, Some(node), page)]
            }
            NodeType::Element(_) => {
                let Some(style) = self.resolver.style_for(node, None) else {
                    return Vec::new();
                };
                match style.display {
                    Display::None => Vec::new(),
                    // [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#box-generation)
                    // "The element itself does not generate any boxes, but
                    // its children and pseudo-elements still generate boxes
                    // as normal."
                    Display::Contents => {
                        self.counters.apply(scope, &style);
                        let mut inner = SiblingScope::default();
                        let mut out = Vec::new();
                        out.extend(self.pseudo_box(node, PseudoElement::Before, &mut inner, page));
                        out.extend(self.child_boxes(node, &style, &mut inner, page));
                        out.extend(self.pseudo_box(node, PseudoElement::After, &mut inner, page));
                        self.counters.leave(inner);
                        out
                    }
                    _ if style.float == Float::Footnote => vec![self.footnote(node, &style, scope, page)],
                    _ => {
                        let id = self.ids.allocate();
                        vec![self.element_box(node, style, scope, page, id)]
                    }
                }
            }
            NodeType::Document | NodeType::Comment(_) => Vec::new(),
        }
    }

    /// Boxes for the children of `node`, styled `parent`.
    ///
    /// Below [`MAX_BOX_DEPTH`] nested elements each child collapses into a
    /// single text run instead.
    fn child_boxes(
        &mut self,
        node: NodeId,
        parent: &ComputedStyle,
        scope: &mut SiblingScope,
        page: Option<&str>,
    ) -> Vec<LayoutBox> {
        let dom = self.dom;
        let children = dom.children(node);
        if self.depth >= MAX_BOX_DEPTH {
            if !children.is_empty() {
                self.warn(&format!("content nested deeper than {MAX_BOX_DEPTH} elements is flattened to text"));
            }
            return children.iter().filter_map(|&child| self.flattened(child, parent, page)).collect();
        }
        self.depth += 1;
        let mut out = Vec::new();
        for &child in children {
            out.extend(self.build_node(child, parent, scope, page));
        }
        self.depth -= 1;
        out
    }

    /// The text of a whole subtree as one run inheriting from `parent`.
    fn flattened(&mut self, node: NodeId, parent: &ComputedStyle, page: Option<&str>) -> Option<LayoutBox> {
        let dom = self.dom;
        let text = match (dom.as_text(node), dom.as_element(node)) {
            (Some(text), _) => text.to_owned(),
            (None, Some(_)) => {
                let hidden = self
                    .resolver
                    .style_for(node, None)
                    .is_none_or(|style| style.display == Display::None);
                if hidden {
                    return None;
                }
                dom.text_content(node)
            }
            (None, None) => return None,
        };
        let text = transform(&text, parent.text_transform);
        if text.is_empty() {
            return None;
        }
        Some(self.run_box(BoxKind::Text(text), parent, Some(node), page))
    }

    /// An anonymous inline-level run inheriting from `parent`.
    fn run_box(&mut self, kind: BoxKind, parent: &ComputedStyle, node: Option<NodeId>, page: Option<&str>) -> LayoutBox {
        let mut b = LayoutBox::new(self.ids.allocate(), kind, Arc::new(parent.anonymous_child(Display::inline())));
        b.anonymous = true;
        b.node = node;
        b.page_name = page.map(str::to_owned);
        b
    }

    /// [HTML § 15.4.3 Images](https://html.spec.whatwg.org/multipage/rendering.html#images-3)
    fn image(&mut self, element: &ElementData) -> ImageOutcome {
        let uri = element.attr("src").unwrap_or_default();
        if let Some(image) = self.images.get_image(uri) {
            return ImageOutcome::Loaded(ReplacedContent {
                uri: uri.to_owned(),
                intrinsic_width: image.width,
                intrinsic_height: image.height,
                intrinsic_ratio: image.ratio,
            });
        }
        self.warn(&format!("image '{uri}' could not be loaded"));
        match element.attr("alt") {
            Some(alt) if !alt.is_empty() => ImageOutcome::Alt(alt.to_owned()),
            _ => ImageOutcome::Loaded(ReplacedContent {
                uri: uri.to_owned(),
                intrinsic_width: None,
                intrinsic_height: None,
                intrinsic_ratio: None,
            }),
        }
    }

    /// HTML attributes that act on the list-item counter.
    ///
    /// [HTML § 4.4.5 The ol element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-ol-element)
    /// and [§ 4.4.8 The li element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-li-element).
    fn list_attributes(&mut self, element: &ElementData, style: &ComputedStyle, scope: &mut SiblingScope) {
        let number = |name: &str| element.attr(name).and_then(|v| v.trim().parse::<i32>().ok());
        if element.tag_name == "ol"
            && style.counter_reset.iter().any(|(n, _)| n == LIST_ITEM)
            && let Some(start) = number("start")
        {
            self.counters.set(scope, LIST_ITEM, start.saturating_sub(1));
        }
        if style.display.is_list_item()
            && let Some(value) = number("value")
        {
            self.counters.set(scope, LIST_ITEM, value);
        }
    }

    /// The principal box of an element, its pseudo-elements and its
    /// descendants.
    fn element_box(
        &mut self,
        node: NodeId,
        style: Arc<ComputedStyle>,
        scope: &mut SiblingScope,
        parent_page: Option<&str>,
        id: BoxId,
    ) -> LayoutBox {
        let dom = self.dom;
        let element = dom.as_element(node);

        // STEP 1: Counters of the element itself.
        self.counters.apply(scope, &style);
        if let Some(element) = element {
            self.list_attributes(element, &style, scope);
        }

        // STEP 2: The box.
        //
        // [§ 3.2 Using named pages](https://www.w3.org/TR/css-page-3/#using-named-pages)
        // "auto: The used value of auto is the value specified on its
        // nearest ancestor with a non-auto value."
        let page = style.page.clone().or_else(|| parent_page.map(str::to_owned));
        let tag = element.map(|e| e.tag_name.as_str());
        let image = match element {
            Some(e) if e.tag_name == "img" => Some(self.image(e)),
            _ => None,
        };
        let kind = match (&image, tag) {
            (Some(ImageOutcome::Loaded(content)), _) => BoxKind::Replaced(content.clone()),
            (Some(ImageOutcome::Alt(_)), _) => BoxKind::Inline,
            (None, Some("br")) => BoxKind::LineBreak,
            _ => kind_for(style.display),
        };
        let mut b = LayoutBox::new(id, kind, Arc::clone(&style));
        b.node = Some(node);
        b.tag = tag.map(str::to_owned);
        b.element_id = element.and_then(ElementData::id).map(str::to_owned);
        b.page_name.clone_from(&page);
        if let Some(element) = element {
            let span = |name: &str| usize::try_from(element.integer_attr(name, 1)).unwrap_or(1).max(1);
            match b.kind {
                BoxKind::TableCell => {
                    b.colspan = span("colspan");
                    b.rowspan = span("rowspan");
                }
                BoxKind::TableColumn | BoxKind::TableColumnGroup => b.colspan = span("span"),
                _ => {}
            }
        }
        if matches!(b.kind, BoxKind::Replaced(_) | BoxKind::LineBreak) {
            return b;
        }
        if let Some(ImageOutcome::Alt(alt)) = image {
            let text = transform(&alt, style.text_transform);
            b.children.push(self.run_box(BoxKind::Text(text), &style, Some(node), page.as_deref()));
            return b;
        }

        // STEP 3: Children, ::marker, ::before and ::after.
        let mut inner = SiblingScope::default();
        let mut children = Vec::new();
        let marker = if style.display.is_list_item() {
            self.marker(node, &style, page.as_deref())
        } else {
            None
        };
        let outside = match marker {
            Some(marker) if marker.outside_marker && b.kind != BoxKind::Inline => Some(marker),
            Some(mut marker) => {
                marker.outside_marker = false;
                children.push(marker);
                None
            }
            None => None,
        };
        children.extend(self.pseudo_box(node, PseudoElement::Before, &mut inner, page.as_deref()));
        children.extend(self.child_boxes(node, &style, &mut inner, page.as_deref()));
        children.extend(self.pseudo_box(node, PseudoElement::After, &mut inner, page.as_deref()));
        self.counters.leave(inner);

        // STEP 4: Repair the structure below this box.
        let mut b = self.finish(b, children);
        if let Some(marker) = outside
            && b.kind == BoxKind::Block
        {
            anonymous::insert_marker(&mut b, marker, &mut self.ids);
        }
        b
    }

    /// Give `b` its `children`, adding the anonymous boxes its kind calls
    /// for.
    fn finish(&mut self, mut b: LayoutBox, children: Vec<LayoutBox>) -> LayoutBox {
        let ids = &mut self.ids;
        if b.kind == BoxKind::Table {
            b.children = children;
            return table_fixup::wrap_table(b, ids);
        }
        let style = Arc::clone(&b.style);
        let page = b.page_name.clone();
        b.children = match b.kind {
            BoxKind::TableRowGroup => table_fixup::row_group_children(&style, children, ids),
            BoxKind::TableRow => table_fixup::row_children(&style, children, ids),
            BoxKind::TableColumnGroup => children.into_iter().filter(|c| c.kind == BoxKind::TableColumn).collect(),
            BoxKind::TableColumn => Vec::new(),
            BoxKind::Inline => table_fixup::wrap_orphans(&style, children, true, ids),
            BoxKind::Flex | BoxKind::Grid => {
                let children = table_fixup::wrap_orphans(&style, children, false, ids);
                anonymous::container_items(&style, page.as_deref(), children, ids)
            }
            _ => {
                let children = table_fixup::wrap_orphans(&style, children, false, ids);
                anonymous::block_children(&style, page.as_deref(), children, ids)
            }
        };
        b
    }

    /// [GCPM § 2 Footnotes](https://www.w3.org/TR/css-gcpm-3/#footnotes)
    ///
    /// "An element with float: footnote ... is removed from the flow and a
    /// ::footnote-call pseudo-element is inserted in its place". The body
    /// goes to the footnote list; the call refers to it by index.
    fn footnote(
        &mut self,
        node: NodeId,
        style: &Arc<ComputedStyle>,
        scope: &mut SiblingScope,
        page: Option<&str>,
    ) -> LayoutBox {
        self.counters.increment(scope, FOOTNOTE, 1);
        let index = self.footnotes.len();
        let id = self.ids.allocate();

        // STEP 1: Reserve the index, so nested footnotes number after this
        // one.
        self.footnotes
            .push(LayoutBox::new(id, BoxKind::Block, Arc::clone(style)));

        // STEP 2: The body.
        //
        // [GCPM § 2.7 'footnote-display'](https://www.w3.org/TR/css-gcpm-3/#footnote-display)
        let mut body_style = (**style).clone();
        body_style.float = Float::None;
        body_style.display = match style.footnote_display {
            FootnoteDisplay::Inline => Display::inline(),
            FootnoteDisplay::Block | FootnoteDisplay::Compact => Display::block(),
        };
        let inline = body_style.display.is_inline_level();
        let body_style = Arc::new(body_style);
        let mut body = self.element_box(node, Arc::clone(&body_style), scope, page, id);
        if inline {
            body = anonymous::anonymous_block(&body_style, page, vec![body], &mut self.ids);
        }
        let mut marker_scope = SiblingScope::default();
        if let Some(marker) = self.pseudo_box(node, PseudoElement::FootnoteMarker, &mut marker_scope, page) {
            anonymous::insert_marker(&mut body, marker, &mut self.ids);
        }
        self.counters.leave(marker_scope);
        if let Some(slot) = self.footnotes.get_mut(index) {
            *slot = body;
        }

        // STEP 3: The call.
        let mut call_scope = SiblingScope::default();
        let call = self.pseudo_box(node, PseudoElement::FootnoteCall, &mut call_scope, page);
        self.counters.leave(call_scope);
        let mut call = call.unwrap_or_else(|| self.run_box(BoxKind::Inline, style, Some(node), page));
        call.kind = BoxKind::Inline;
        call.pseudo = Some(PseudoElement::FootnoteCall);
        call.footnote = Some(index);
        #[cfg(feature = "layout-trace")]
        log::trace!("[BUILD] footnote {index} called from {:?}", call.id);
        call
    }

    /// `::before`, `::after` and the footnote pseudo-elements.
    ///
    /// [CSS Pseudo § 4.1](https://www.w3.org/TR/css-pseudo-4/#generated-content)
    /// "if the computed value of content is none or normal, the
    /// pseudo-element does not generate a box."
    fn pseudo_box(
        &mut self,
        node: NodeId,
        pseudo: PseudoElement,
        scope: &mut SiblingScope,
        page: Option<&str>,
    ) -> Option<LayoutBox> {
        let style = self.resolver.style_for(node, Some(pseudo))?;
        let Content::Items(items) = &style.content else {
            return None;
        };
        if style.display == Display::None {
            return None;
        }
        self.counters.apply(scope, &style);
        let children = self.content_boxes(node, &style, items, page);
        let kind = if style.display.is_block_level() {
            BoxKind::Block
        } else {
            BoxKind::Inline
        };
        let mut b = LayoutBox::new(self.ids.allocate(), kind, Arc::clone(&style));
        b.node = Some(node);
        b.pseudo = Some(pseudo);
        b.page_name = page.map(str::to_owned);
        b.children = children;
        Some(b)
    }

    /// [CSS Lists § 3.1 The `::marker` pseudo-element](https://www.w3.org/TR/css-lists-3/#marker-pseudo)
    fn marker(&mut self, node: NodeId, item: &ComputedStyle, page: Option<&str>) -> Option<LayoutBox> {
        let style = self
            .resolver
            .style_for(node, Some(PseudoElement::Marker))
            .unwrap_or_else(|| Arc::new(item.anonymous_child(Display::inline())));
        let children = match &style.content {
            Content::None => return None,
            Content::Items(items) => self.content_boxes(node, &style, items, page),
            // "normal: ... the ::marker pseudo-element ... generates the
            // marker string specified by list-style-type".
            Content::Normal => {
                let value = self.counters.value(LIST_ITEM).unwrap_or(0);
                let text = transform(&item.list_style_type.marker_text(value), style.text_transform);
                if text.is_empty() {
                    return None;
                }
                vec![self.run_box(BoxKind::Text(text), &style, Some(node), page)]
            }
        };
        let mut b = LayoutBox::new(self.ids.allocate(), BoxKind::Inline, Arc::clone(&style));
        b.node = Some(node);
        b.pseudo = Some(PseudoElement::Marker);
        b.page_name = page.map(str::to_owned);
        b.children = children;
        b.outside_marker = item.list_style_position == ListStylePosition::Outside;
        Some(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_dom::markup;
    use quire_style::RuleResolver;

    use crate::image::{ImageMap, IntrinsicImage, NoImages};

    fn built(html: &str, css: &str) -> (BuiltDocument, Diagnostics) {
        let dom = markup::parse(html);
        let resolver = RuleResolver::new(&dom, &[css]);
        let mut diagnostics = Diagnostics::new();
        let doc = build(&dom, &resolver, &NoImages, &mut diagnostics);
        (doc, diagnostics)
    }

    fn body(doc: &BuiltDocument) -> &LayoutBox {
        doc.root.find_by_tag("body")[0]
    }

    #[test]
    fn test_root_gets_root_id() {
        let (doc, _) = built("<html><body><p>x</p></body></html>", "");
        assert_eq!(doc.root.id, BoxId::ROOT);
        assert_eq!(doc.root.kind, BoxKind::Block);
        let mut ids: Vec<BoxId> = doc.root.descendants().iter().map(|b| b.id).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_display_none_and_contents() {
        let (doc, _) = built(
            "<html><body><div id=gone>x</div><div id=spliced><p id=kept>y</p></div></body></html>",
            "#gone { display: none } #spliced { display: contents }",
        );
        assert!(doc.root.find_by_id("gone").is_none());
        assert!(doc.root.find_by_id("spliced").is_none());
        let body = body(&doc);
        assert_eq!(body.children[0].element_id.as_deref(), Some("kept"));
    }

    #[test]
    fn test_text_is_collapsed_and_transformed() {
        let (doc, _) = built(
            "<html><body><p>  hello   <b> big </b>  world </p></body></html>",
            "p { text-transform: uppercase }",
        );
        let p = doc.root.find_by_tag("p")[0];
        assert_eq!(p.text(), "HELLO BIG WORLD ");
    }

    #[test]
    fn test_list_markers_count() {
        let (doc, _) = built(
            "<html><body><ol start=3><li>a</li><li>b</li></ol><ul><li>c</li></ul></body></html>",
            "",
        );
        let items = doc.root.find_by_tag("li");
        let marker = |b: &LayoutBox| {
            b.descendants()
                .into_iter()
                .find(|d| d.pseudo == Some(PseudoElement::Marker))
                .map(|m| m.text())
        };
        assert_eq!(marker(items[0]).as_deref(), Some("3. "));
        assert_eq!(marker(items[1]).as_deref(), Some("4. "));
        assert_eq!(marker(items[2]).as_deref(), Some("\u{2022} "));
        let first = items[0].children.iter().find(|c| c.pseudo == Some(PseudoElement::Marker));
        assert!(first.is_some_and(|m| m.outside_marker));
    }

    #[test]
    fn test_nested_counters() {
        let (doc, _) = built(
            "<html><body><section><h2>a</h2><section><h2>b</h2><h2>c</h2></section></section></body></html>",
            "section { counter-reset: s } h2 { counter-increment: s } \
             h2::before { content: counters(s, '.') ' ' }",
        );
        let texts: Vec<String> = doc.root.find_by_tag("h2").iter().map(|h| h.text()).collect();
        assert_eq!(texts, vec!["1 a", "1.1 b", "1.2 c"]);
    }

    #[test]
    fn test_quotes_and_attr() {
        let (doc, _) = built(
            r#"<html><body><q title="t">x<q>y</q></q></body></html>"#,
            "q::before { content: open-quote attr(title) } q::after { content: close-quote }",
        );
        let body = body(&doc);
        assert_eq!(body.text(), "\u{201c}tx\u{2018}y\u{2019}\u{201d}");
    }

    #[test]
    fn test_page_counters_are_dynamic() {
        let (doc, _) = built(
            "<html><body><p>x</p></body></html>",
            "p::after { content: ' ' counter(page) '/' counter(pages) }",
        );
        let p = doc.root.find_by_tag("p")[0];
        let dynamic = p.descendants().into_iter().find(|b| matches!(b.kind, BoxKind::PageText(_)));
        assert!(dynamic.is_some());
    }

    #[test]
    fn test_footnotes_leave_calls() {
        let (doc, _) = built(
            "<html><body><p>a<span class=fn>one</span>b<span class=fn>two</span></p></body></html>",
            ".fn { float: footnote }",
        );
        assert_eq!(doc.footnotes.len(), 2);
        let calls: Vec<&LayoutBox> = doc
            .root
            .descendants()
            .into_iter()
            .filter(|b| b.pseudo == Some(PseudoElement::FootnoteCall))
            .collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].footnote, Some(1));
        assert_eq!(calls[1].text(), "2");
        assert_eq!(doc.footnotes[0].text(), "1. one");
        assert!(!doc.root.text().contains("one"));
    }

    #[test]
    fn test_images_and_line_breaks() {
        let dom = markup::parse(r#"<html><body><p><img src="a.png">x<br>y<img src="missing" alt="gone"></p></body></html>"#);
        let resolver = RuleResolver::new(&dom, &[]);
        let images = ImageMap::new().with("a.png", IntrinsicImage::sized(4.0, 2.0));
        let mut diagnostics = Diagnostics::new();
        let doc = build(&dom, &resolver, &images, &mut diagnostics);
        let p = doc.root.find_by_tag("p")[0];
        assert!(matches!(&p.children[0].kind, BoxKind::Replaced(c) if c.intrinsic_width == Some(4.0)));
        assert!(p.children.iter().any(|c| c.kind == BoxKind::LineBreak));
        assert!(p.text().ends_with("gone"));
        assert!(diagnostics.contains("missing"));
    }

    #[test]
    fn test_cell_spans_from_attributes() {
        let (doc, _) = built(
            "<html><body><table><tr><td colspan=2 rowspan=3>a</td></tr></table></body></html>",
            "",
        );
        let cell = doc.root.find_by_tag("td")[0];
        assert_eq!((cell.colspan, cell.rowspan), (2, 3));
    }

    #[test]
    fn test_parsed_siblings_all_reach_the_body() {
        let (doc, diagnostics) = built("<div id=a></div><div id=b></div>", "");
        let ids: Vec<_> = body(&doc).children.iter().map(|c| c.element_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("a"), Some("b")]);
        assert!(diagnostics.messages().is_empty());
    }

    #[test]
    fn test_extra_top_level_elements_warn() {
        let mut dom = DomTree::new();
        let _ = dom.append_element(NodeId::ROOT, ElementData::new("html"));
        let _ = dom.append_element(NodeId::ROOT, ElementData::new("div"));
        let resolver = RuleResolver::new(&dom, &[""]);
        let mut diagnostics = Diagnostics::new();
        let doc = build(&dom, &resolver, &NoImages, &mut diagnostics);
        assert_eq!(doc.root.tag.as_deref(), Some("html"));
        assert!(diagnostics.contains("top-level"));
    }
}
