//! A small rule reader: style rules with simple selectors, `@page` rules
//! with nested margin boxes and `@footnote`, and `@media` unwrapping.
//!
//! [CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/) is out of scope
//! here; the reader splits on braces, semicolons and colons while respecting
//! strings and parentheses, which is enough for the documents this engine
//! is fed.

use quire_dom::{DomTree, NodeId};
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::error::StyleError;
use crate::page::{MarginBoxName, PageSelector};

/// One `name: value [!important]` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Property name, lower-cased unless it is a custom property.
    pub name: String,
    /// Value text, trimmed, without `!important`.
    pub value: String,
    /// `!important` was given.
    pub important: bool,
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
///
/// Read a declaration block body (or a `style` attribute). Entries without a
/// colon are dropped.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<Declaration> {
    split_top_level(text, ';')
        .into_iter()
        .filter_map(|chunk| {
            let (name, value) = chunk.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let name = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            let mut value = value.trim();
            let mut important = false;
            if let Some(bang) = value.rfind('!')
                && value[bang + 1..].trim().eq_ignore_ascii_case("important")
            {
                important = true;
                value = value[..bang].trim_end();
            }
            if value.is_empty() && !name.starts_with("--") {
                return None;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

/// Split on a separator outside strings, parentheses and braces.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '{' | '[' => depth += 1,
                ')' | '}' | ']' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

/// Pseudo-elements the resolver computes styles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoElement {
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `::marker`
    Marker,
    /// [GCPM § 2.4 `::footnote-call`](https://www.w3.org/TR/css-gcpm-3/#footnote-call)
    FootnoteCall,
    /// [GCPM § 2.4 `::footnote-marker`](https://www.w3.org/TR/css-gcpm-3/#footnote-marker)
    FootnoteMarker,
}

/// [§ 16.1 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
}

/// [§ 3.1 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// Type selector; `None` for `*` or no type.
    pub tag: Option<String>,
    /// `#id`
    pub id: Option<String>,
    /// `.class` list.
    pub classes: Vec<String>,
}

impl Compound {
    fn matches(&self, dom: &DomTree, node: NodeId) -> bool {
        let Some(element) = dom.as_element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && !element.tag_name.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.id() != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
    }
}

/// [§ 17 Calculating a selector's specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
pub type Specificity = (u32, u32, u32);

/// A complex selector: compounds joined by combinators, rightmost last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Compound selectors, left to right.
    pub compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
    pub combinators: Vec<Combinator>,
    /// Trailing pseudo-element.
    pub pseudo: Option<PseudoElement>,
}

impl Selector {
    /// Parse one complex selector; unsupported syntax gives `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let spaced = text.replace('>', " > ");
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending = None;
        let mut pseudo = None;
        for token in spaced.split_whitespace() {
            if pseudo.is_some() {
                // Nothing may follow a pseudo-element.
                return None;
            }
            if token == ">" {
                if compounds.is_empty() || pending.is_some() {
                    return None;
                }
                pending = Some(Combinator::Child);
                continue;
            }
            if !compounds.is_empty() {
                combinators.push(pending.take().unwrap_or(Combinator::Descendant));
            }
            let (compound, element_pseudo) = parse_compound(token)?;
            compounds.push(compound);
            pseudo = element_pseudo;
        }
        if compounds.is_empty() || pending.is_some() {
            return None;
        }
        Some(Self {
            compounds,
            combinators,
            pseudo,
        })
    }

    /// (ids, classes, types) with pseudo-elements counted as types.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let mut spec = (0, 0, u32::from(self.pseudo.is_some()));
        for compound in &self.compounds {
            spec.0 += u32::from(compound.id.is_some());
            spec.1 += u32::try_from(compound.classes.len()).unwrap_or(u32::MAX);
            spec.2 += u32::from(compound.tag.is_some());
        }
        spec
    }

    /// [§ 4 Selector matching](https://www.w3.org/TR/selectors-4/#match-against-element)
    ///
    /// Match right to left, backtracking over descendant combinators.
    #[must_use]
    pub fn matches(&self, dom: &DomTree, node: NodeId) -> bool {
        self.matches_at(dom, node, self.compounds.len() - 1)
    }

    fn matches_at(&self, dom: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(dom, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => dom
                .parent(node)
                .is_some_and(|parent| self.matches_at(dom, parent, index - 1)),
            Combinator::Descendant => dom
                .ancestors(node)
                .any(|ancestor| self.matches_at(dom, ancestor, index - 1)),
        }
    }
}

fn parse_compound(token: &str) -> Option<(Compound, Option<PseudoElement>)> {
    let mut compound = Compound::default();
    let mut pseudo = None;
    let (body, pseudo_text) = match token.find(':') {
        Some(i) => (&token[..i], Some(token[i..].trim_start_matches(':'))),
        None => (token, None),
    };
    if let Some(name) = pseudo_text {
        // Legacy single-colon forms are accepted for the CSS2 pseudo-elements.
        pseudo = Some(name.parse::<PseudoElement>().ok()?);
    }
    let mut rest = body;
    let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    match tag {
        "" | "*" => {}
        t if t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            compound.tag = Some(t.to_ascii_lowercase());
        }
        _ => return None,
    }
    rest = &rest[tag_end..];
    while let Some(first) = rest.chars().next() {
        let after = &rest[1..];
        let end = after.find(['.', '#']).unwrap_or(after.len());
        let name = &after[..end];
        if name.is_empty() {
            return None;
        }
        match first {
            '.' => compound.classes.push(name.to_string()),
            '#' => compound.id = Some(name.to_string()),
            _ => return None,
        }
        rest = &after[end..];
    }
    Some((compound, pseudo))
}

/// A style rule: selector list plus declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Selectors that parsed; the rule is dropped when none did.
    pub selectors: Vec<Selector>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// [§ 4 The `@page` rule](https://www.w3.org/TR/css-page-3/#at-page-rule)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageRule {
    /// Selector list; empty matches every page.
    pub selectors: Vec<PageSelector>,
    /// Declarations for the page context.
    pub declarations: Vec<Declaration>,
    /// Nested page-margin box rules.
    pub margin_boxes: Vec<(MarginBoxName, Vec<Declaration>)>,
    /// Nested `@footnote` declarations.
    pub footnote: Vec<Declaration>,
}

/// A parsed style sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<StyleRule>,
    /// `@page` rules in source order.
    pub page_rules: Vec<PageRule>,
    /// Problems met while reading; the offending rules were skipped.
    pub errors: Vec<StyleError>,
}

impl Stylesheet {
    /// Read a style sheet.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let mut sheet = Self::default();
        let text = strip_comments(css);
        sheet.read_rules(&text);
        sheet
    }

    fn read_rules(&mut self, text: &str) {
        let mut rest = text;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(at) = rest.strip_prefix('@') {
                let name_end = at
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(at.len());
                let name = at[..name_end].to_ascii_lowercase();
                let after_name = &at[name_end..];
                let semicolon = find_top_level(after_name, ';');
                let brace = find_top_level(after_name, '{');
                match (semicolon, brace) {
                    (Some(s), b) if b.is_none_or(|b| s < b) => {
                        // Statement at-rules (@import, @charset) carry nothing we use.
                        rest = &after_name[s + 1..];
                    }
                    (_, Some(b)) => {
                        let Some(close) = matching_brace(after_name, b) else {
                            self.errors.push(StyleError::MalformedRule(format!("@{name}")));
                            break;
                        };
                        let prelude = after_name[..b].trim();
                        let body = &after_name[b + 1..close];
                        match name.as_str() {
                            "media" => {
                                if media_applies(prelude) {
                                    self.read_rules(body);
                                }
                            }
                            "page" => self.read_page_rule(prelude, body),
                            _ => log::debug!("ignoring @{name} rule"),
                        }
                        rest = &after_name[close + 1..];
                    }
                    _ => {
                        self.errors.push(StyleError::MalformedRule(format!("@{name}")));
                        break;
                    }
                }
                continue;
            }
            let Some(open) = find_top_level(rest, '{') else {
                self.errors.push(StyleError::MalformedRule(short(rest)));
                break;
            };
            let Some(close) = matching_brace(rest, open) else {
                self.errors.push(StyleError::MalformedRule(short(rest)));
                break;
            };
            let prelude = rest[..open].trim();
            let body = &rest[open + 1..close];
            let selectors: Vec<Selector> = split_top_level(prelude, ',')
                .into_iter()
                .filter_map(|s| {
                    let parsed = Selector::parse(s.trim());
                    if parsed.is_none() {
                        self.errors.push(StyleError::MalformedRule(s.trim().to_string()));
                    }
                    parsed
                })
                .collect();
            if !selectors.is_empty() {
                self.rules.push(StyleRule {
                    selectors,
                    declarations: parse_declarations(body),
                });
            }
            rest = &rest[close + 1..];
        }
    }

    /// [§ 5 Page-Margin Boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
    fn read_page_rule(&mut self, prelude: &str, body: &str) {
        let mut rule = PageRule::default();
        for selector in split_top_level(prelude, ',') {
            match PageSelector::parse(selector) {
                Some(parsed) => rule.selectors.push(parsed),
                None => {
                    self.errors
                        .push(StyleError::MalformedRule(format!("@page {}", selector.trim())));
                    return;
                }
            }
        }
        let mut declarations = String::new();
        let mut rest = body;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            if let Some(at) = rest.strip_prefix('@') {
                let Some(open) = find_top_level(at, '{') else { break };
                let Some(close) = matching_brace(at, open) else { break };
                let name = at[..open].trim().to_ascii_lowercase();
                let nested = parse_declarations(&at[open + 1..close]);
                if name == "footnote" {
                    rule.footnote.extend(nested);
                } else if let Ok(margin_box) = name.parse::<MarginBoxName>() {
                    rule.margin_boxes.push((margin_box, nested));
                } else {
                    self.errors.push(StyleError::MalformedRule(format!("@{name}")));
                }
                rest = &at[close + 1..];
                continue;
            }
            let end = find_top_level(rest, ';').map_or(rest.len(), |i| i + 1);
            declarations.push_str(&rest[..end]);
            if !declarations.ends_with(';') {
                declarations.push(';');
            }
            rest = &rest[end..];
        }
        rule.declarations = parse_declarations(&declarations);
        self.page_rules.push(rule);
    }
}

/// `@media` queries this engine honors: print media.
fn media_applies(prelude: &str) -> bool {
    prelude.is_empty()
        || split_top_level(prelude, ',').iter().any(|q| {
            let q = q.trim().to_ascii_lowercase();
            let q = q.strip_prefix("only ").unwrap_or(&q);
            q.starts_with("print") || q.starts_with("all")
        })
}

fn short(text: &str) -> String {
    text.chars().take(40).collect::<String>().trim().to_string()
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// First occurrence of `target` outside strings, parentheses and braces.
fn find_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => {
                if c == target && depth == 0 {
                    return Some(i);
                }
                match c {
                    '"' | '\'' => quote = Some(c),
                    '(' | '{' => depth += 1,
                    ')' | '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
    }
    None
}

/// Index of the `}` closing the `{` at `open`.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for (i, c) in text[open..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}
