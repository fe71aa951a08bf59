//! Style resolution for elements, pseudo-elements and page contexts.
//!
//! The layout engine only sees the [`StyleResolver`] trait. [`RuleResolver`]
//! is the bundled implementation: it matches the user-agent sheet, the
//! document's `<style>` elements, extra author sheets and `style` attributes,
//! then runs every element through [`compute_style`] once, top-down.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use quire_common::Diagnostics;
use quire_dom::{DomTree, NodeId};

use crate::cascade::{CascadeEnv, compute_style};
use crate::computed::ComputedStyle;
use crate::display::Display;
use crate::keywords::Float;
use crate::page::{PageArea, PageSelector, PageType};
use crate::sheet::{Declaration, PageRule, PseudoElement, Selector, Specificity, Stylesheet, parse_declarations};
use crate::ua_stylesheet::ua_stylesheet;

/// Where layout gets its styles from.
pub trait StyleResolver {
    /// Style of an element or one of its pseudo-elements. `None` for text
    /// nodes, for elements inside `display: none` subtrees and for
    /// pseudo-elements that were not generated.
    fn style_for(&self, node: NodeId, pseudo: Option<PseudoElement>) -> Option<Arc<ComputedStyle>>;

    /// Style of a page, one of its margin boxes, or its footnote area.
    fn page_style(&self, page: &PageType, area: PageArea) -> Arc<ComputedStyle>;

    /// Warnings raised while resolving styles, already tagged with their
    /// component and logged.
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

/// [§ 6.1 Cascade Origins](https://www.w3.org/TR/css-cascade-4/#cascading-origins)
///
/// Origin and importance folded into one rank, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    UserAgent,
    Author,
    StyleAttribute,
    AuthorImportant,
    StyleAttributeImportant,
    UserAgentImportant,
}

impl Precedence {
    const fn of(author: bool, attribute: bool, important: bool) -> Self {
        match (author, attribute, important) {
            (false, _, false) => Self::UserAgent,
            (false, _, true) => Self::UserAgentImportant,
            (true, false, false) => Self::Author,
            (true, false, true) => Self::AuthorImportant,
            (true, true, false) => Self::StyleAttribute,
            (true, true, true) => Self::StyleAttributeImportant,
        }
    }
}

struct Candidate<'a> {
    precedence: Precedence,
    specificity: Specificity,
    order: usize,
    declaration: &'a Declaration,
}

/// Sort matched declarations into application order.
fn into_declarations(mut candidates: Vec<Candidate<'_>>) -> Vec<Declaration> {
    candidates.sort_by_key(|c| (c.precedence, c.specificity, c.order));
    candidates.into_iter().map(|c| c.declaration.clone()).collect()
}

/// Resolver built from style sheets and a document.
pub struct RuleResolver {
    sheets: Vec<(bool, Stylesheet)>,
    styles: HashMap<(NodeId, Option<PseudoElement>), Arc<ComputedStyle>>,
    root_style: Arc<ComputedStyle>,
    env: CascadeEnv,
    page_cache: RefCell<HashMap<(Vec<usize>, PageArea), Arc<ComputedStyle>>>,
    diagnostics: RefCell<Diagnostics>,
}

impl RuleResolver {
    /// Resolve every element of `dom` against the user-agent sheet, the
    /// document's `<style>` elements and then `author` sheets, in that order.
    #[must_use]
    pub fn new(dom: &DomTree, author: &[&str]) -> Self {
        let mut diagnostics = Diagnostics::new();
        let mut sheets = vec![(false, ua_stylesheet().clone())];
        let embedded = dom.style_sheets_text();
        let texts = std::iter::once(embedded.as_str()).chain(author.iter().copied());
        for text in texts.filter(|t| !t.trim().is_empty()) {
            let sheet = Stylesheet::parse(text);
            for error in &sheet.errors {
                diagnostics.warn("css", &error.to_string());
            }
            sheets.push((true, sheet));
        }

        let mut resolver = Self {
            sheets,
            styles: HashMap::new(),
            root_style: Arc::new(ComputedStyle::initial()),
            env: CascadeEnv::default(),
            page_cache: RefCell::new(HashMap::new()),
            diagnostics: RefCell::new(Diagnostics::new()),
        };
        if let Some(root) = dom.document_element() {
            resolver.resolve_tree(dom, root, &mut diagnostics);
            if let Some(style) = resolver.styles.get(&(root, None)) {
                resolver.root_style = Arc::clone(style);
            }
        }
        resolver.diagnostics = RefCell::new(diagnostics);
        resolver
    }

    /// Every computed style, elements and pseudo-elements alike.
    pub fn computed_styles(&self) -> impl Iterator<Item = (NodeId, Option<PseudoElement>, &Arc<ComputedStyle>)> {
        self.styles.iter().map(|((node, pseudo), style)| (*node, *pseudo, style))
    }

    fn matched_declarations(&self, dom: &DomTree, node: NodeId, pseudo: Option<PseudoElement>) -> Vec<Declaration> {
        let mut candidates = Vec::new();
        let mut order = 0;
        for (author, sheet) in &self.sheets {
            for rule in &sheet.rules {
                let specificity = rule
                    .selectors
                    .iter()
                    .filter(|s| s.pseudo == pseudo && s.matches(dom, node))
                    .map(Selector::specificity)
                    .max();
                if let Some(specificity) = specificity {
                    for declaration in &rule.declarations {
                        candidates.push(Candidate {
                            precedence: Precedence::of(*author, false, declaration.important),
                            specificity,
                            order,
                            declaration,
                        });
                        order += 1;
                    }
                }
            }
        }
        let inline = if pseudo.is_none() {
            dom.as_element(node)
                .and_then(|e| e.attr("style"))
                .map(parse_declarations)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        for declaration in &inline {
            candidates.push(Candidate {
                precedence: Precedence::of(true, true, declaration.important),
                specificity: (0, 0, 0),
                order,
                declaration,
            });
            order += 1;
        }
        into_declarations(candidates)
    }

    /// Resolve `root` and every element below it, parents before children.
    /// Uses an explicit stack; nesting depth does not grow the call stack.
    fn resolve_tree(&mut self, dom: &DomTree, root: NodeId, diagnostics: &mut Diagnostics) {
        let mut stack: Vec<(NodeId, Option<Arc<ComputedStyle>>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let Some(style) = self.resolve_element(dom, node, parent.as_deref(), diagnostics) else {
                continue;
            };
            stack.extend(
                dom.children(node)
                    .iter()
                    .rev()
                    .map(|&child| (child, Some(Arc::clone(&style)))),
            );
        }
    }

    /// Style `node` and its pseudo-elements. Returns the style its children
    /// inherit from, or `None` when they generate nothing.
    fn resolve_element(
        &mut self,
        dom: &DomTree,
        node: NodeId,
        parent: Option<&ComputedStyle>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Arc<ComputedStyle>> {
        let element = dom.as_element(node)?;
        let declarations = self.matched_declarations(dom, node, None);
        let mut style = compute_style(&declarations, parent, parent.is_none(), &self.env, diagnostics);
        if let Some(lang) = element.attr("lang") {
            style.lang = Some(lang.to_string());
        }
        if parent.is_none() {
            self.env.root_font_size = style.font_size;
        }
        let display_none = style.display == Display::None;
        let style = Arc::new(style);
        let _ = self.styles.insert((node, None), Arc::clone(&style));
        if display_none {
            return None;
        }

        // Pseudo-elements hanging off this element.
        let mut pseudos = vec![PseudoElement::Before, PseudoElement::After];
        if style.display.is_list_item() {
            pseudos.push(PseudoElement::Marker);
        }
        if style.float == Float::Footnote {
            pseudos.extend([PseudoElement::FootnoteCall, PseudoElement::FootnoteMarker]);
        }
        for pseudo in pseudos {
            let declarations = self.matched_declarations(dom, node, Some(pseudo));
            let always = matches!(
                pseudo,
                PseudoElement::Marker | PseudoElement::FootnoteCall | PseudoElement::FootnoteMarker
            );
            if declarations.is_empty() && !always {
                continue;
            }
            let pseudo_style = compute_style(&declarations, Some(&*style), false, &self.env, diagnostics);
            let _ = self.styles.insert((node, Some(pseudo)), Arc::new(pseudo_style));
        }

        Some(style)
    }

    /// Indices into the flattened page rule list, in application order.
    fn matching_page_rules(&self, page: &PageType) -> Vec<usize> {
        let mut matched = Vec::new();
        let mut index = 0;
        for (author, sheet) in &self.sheets {
            for rule in &sheet.page_rules {
                let specificity = if rule.selectors.is_empty() {
                    Some((0, 0, 0))
                } else {
                    rule.selectors
                        .iter()
                        .filter(|s| s.matches(page))
                        .map(PageSelector::specificity)
                        .max()
                };
                if let Some(specificity) = specificity {
                    matched.push((*author, specificity, index));
                }
                index += 1;
            }
        }
        matched.sort_unstable();
        matched.into_iter().map(|(_, _, index)| index).collect()
    }

    fn page_rule_declarations(&self, rules: &[usize], area: PageArea) -> Vec<Declaration> {
        let all: Vec<(bool, &PageRule)> = self
            .sheets
            .iter()
            .flat_map(|(author, sheet)| sheet.page_rules.iter().map(move |r| (*author, r)))
            .collect();
        let mut candidates = Vec::new();
        for (order, &index) in rules.iter().enumerate() {
            let Some((author, rule)) = all.get(index) else { continue };
            let declarations: Vec<&Declaration> = match area {
                PageArea::Page => rule.declarations.iter().collect(),
                PageArea::Footnote => rule.footnote.iter().collect(),
                PageArea::Margin(name) => rule
                    .margin_boxes
                    .iter()
                    .filter(|(n, _)| *n == name)
                    .flat_map(|(_, d)| d.iter())
                    .collect(),
            };
            for declaration in declarations {
                candidates.push(Candidate {
                    precedence: Precedence::of(*author, false, declaration.important),
                    specificity: (0, 0, 0),
                    order,
                    declaration,
                });
            }
        }
        into_declarations(candidates)
    }
}

impl StyleResolver for RuleResolver {
    fn style_for(&self, node: NodeId, pseudo: Option<PseudoElement>) -> Option<Arc<ComputedStyle>> {
        self.styles.get(&(node, pseudo)).cloned()
    }

    /// [§ 3.2 Page Context](https://www.w3.org/TR/css-page-3/#page-context)
    ///
    /// Page boxes inherit from the root element; margin boxes and the
    /// footnote area inherit from their page.
    fn page_style(&self, page: &PageType, area: PageArea) -> Arc<ComputedStyle> {
        let rules = self.matching_page_rules(page);
        let key = (rules.clone(), area);
        if let Some(style) = self.page_cache.borrow().get(&key) {
            return Arc::clone(style);
        }
        let mut diagnostics = self.diagnostics.borrow_mut();
        let page_declarations = self.page_rule_declarations(&rules, PageArea::Page);
        let mut page_style = compute_style(
            &page_declarations,
            Some(&*self.root_style),
            false,
            &self.env,
            &mut diagnostics,
        );
        page_style.display = Display::block();
        let style = match area {
            PageArea::Page => page_style,
            PageArea::Margin(_) | PageArea::Footnote => {
                let declarations = self.page_rule_declarations(&rules, area);
                let mut style = compute_style(&declarations, Some(&page_style), false, &self.env, &mut diagnostics);
                style.display = Display::block();
                style
            }
        };
        let style = Arc::new(style);
        let _ = self.page_cache.borrow_mut().insert(key, Arc::clone(&style));
        style
    }

    fn warnings(&self) -> Vec<String> {
        self.diagnostics.borrow().messages().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Color, Size};

    #[test]
    fn test_specificity_and_attribute_order() {
        let dom = quire_dom::markup::parse(
            r#"<html><body><p id="a" class="c" style="width: 3px">x</p></body></html>"#,
        );
        let resolver = RuleResolver::new(&dom, &["#a { width: 1px; height: 1px } p.c { width: 2px; height: 2px }"]);
        let p = dom.element_by_id("a").unwrap();
        let style = resolver.style_for(p, None).unwrap();
        assert_eq!(style.width, Size::Length(3.0));
        assert_eq!(style.height, Size::Length(1.0));
    }

    #[test]
    fn test_pseudo_elements_only_when_matched() {
        let dom = quire_dom::markup::parse("<html><body><p id=a>x</p><p id=b>y</p></body></html>");
        let resolver = RuleResolver::new(&dom, &["#a::before { content: 'z' }"]);
        let a = dom.element_by_id("a").unwrap();
        let b = dom.element_by_id("b").unwrap();
        assert!(resolver.style_for(a, Some(PseudoElement::Before)).is_some());
        assert!(resolver.style_for(b, Some(PseudoElement::Before)).is_none());
    }

    #[test]
    fn test_page_context_cascade() {
        let dom = quire_dom::markup::parse("<html><body></body></html>");
        let resolver = RuleResolver::new(
            &dom,
            &["@page { background: blue } @page :nth(2n) { background: red; @top-center { content: 'x' } }"],
        );
        let first = resolver.page_style(&PageType::unnamed(0), PageArea::Page);
        let second = resolver.page_style(&PageType::unnamed(1), PageArea::Page);
        assert_eq!(first.background_color, Color::rgb(0, 0, 255));
        assert_eq!(second.background_color, Color::RED);
        let margin = resolver.page_style(
            &PageType::unnamed(1),
            PageArea::Margin(crate::page::MarginBoxName::TopCenter),
        );
        assert!(matches!(margin.content, crate::content::Content::Items(_)));
    }
}
