//! Generated content: the boxes of a `content` value.
//!
//! [CSS Generated Content § 1](https://www.w3.org/TR/css-content-3/#content-property)

use quire_dom::NodeId;
use quire_style::content::{ContentItem, TargetUrl};
use quire_style::ComputedStyle;

use crate::boxes::{BoxKind, DynamicPart, LayoutBox, ReplacedContent};

use super::{Builder, whitespace};

/// `quotes: auto` for every language.
const DEFAULT_QUOTES: [(&str, &str); 2] = [("\u{201c}", "\u{201d}"), ("\u{2018}", "\u{2019}")];

/// Append fixed text to a run of parts, merging with the previous piece.
fn push_text(parts: &mut Vec<DynamicPart>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(DynamicPart::Text(last)) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(DynamicPart::Text(text.to_owned()));
    }
}

impl Builder<'_> {
    /// [§ 1.2 Quotation marks](https://www.w3.org/TR/css-content-3/#quotes)
    ///
    /// "open-quote ... increments the nesting level"; "close-quote ... If
    /// the depth is 0, no mark is inserted". Levels past the last pair
    /// repeat it.
    fn quote(&mut self, style: &ComputedStyle, open: bool) -> String {
        if !open {
            if self.quote_depth == 0 {
                return String::new();
            }
            self.quote_depth -= 1;
        }
        let depth = self.quote_depth;
        if open {
            self.quote_depth += 1;
        }
        let pair = match &style.quotes {
            Some(pairs) => pairs
                .get(depth.min(pairs.len().saturating_sub(1)))
                .map(|(o, c)| (o.as_str(), c.as_str())),
            None => DEFAULT_QUOTES.get(depth.min(DEFAULT_QUOTES.len() - 1)).copied(),
        };
        pair.map(|(o, c)| if open { o } else { c }).unwrap_or_default().to_owned()
    }

    /// Close the current run of text into a box.
    fn flush_parts(
        &mut self,
        parts: &mut Vec<DynamicPart>,
        style: &ComputedStyle,
        node: NodeId,
        page: Option<&str>,
        out: &mut Vec<LayoutBox>,
    ) {
        if parts.is_empty() {
            return;
        }
        let parts = std::mem::take(parts);
        let kind = match parts.as_slice() {
            [DynamicPart::Text(text)] => BoxKind::Text(text.clone()),
            _ => BoxKind::PageText(parts),
        };
        out.push(self.run_box(kind, style, Some(node), page));
    }

    /// Inline content of a pseudo-element of `node` styled `style`.
    ///
    /// Counters read the values in scope at the pseudo-element; page
    /// counters and `target-counter()` stay symbolic until pages are laid
    /// out.
    pub(super) fn content_boxes(
        &mut self,
        node: NodeId,
        style: &ComputedStyle,
        items: &[ContentItem],
        page: Option<&str>,
    ) -> Vec<LayoutBox> {
        let dom = self.dom;
        let element = dom.as_element(node);
        let attr = |name: &str| element.and_then(|e| e.attr(name)).unwrap_or_default();
        let mut out = Vec::new();
        let mut parts = Vec::new();
        for item in items {
            let text = match item {
                ContentItem::String(s) => s.clone(),
                ContentItem::Counter { name, style: counter }
                | ContentItem::Counters {
                    name, style: counter, ..
                } if name == "page" => {
                    parts.push(DynamicPart::Page(*counter));
                    continue;
                }
                ContentItem::Counter { name, style: counter }
                | ContentItem::Counters {
                    name, style: counter, ..
                } if name == "pages" => {
                    parts.push(DynamicPart::Pages(*counter));
                    continue;
                }
                ContentItem::Counter { name, style: counter } => counter.format(self.counters.value(name).unwrap_or(0)),
                // [§ 4.5 Counter functions](https://www.w3.org/TR/css-lists-3/#counter-functions)
                // "If no counter of that name exists, the element
                // instantiates a new counter ... with a starting value of 0".
                ContentItem::Counters {
                    name,
                    separator,
                    style: counter,
                } => {
                    let values = self.counters.values(name);
                    if values.is_empty() {
                        counter.format(0)
                    } else {
                        values
                            .iter()
                            .map(|v| counter.format(*v))
                            .collect::<Vec<_>>()
                            .join(separator)
                    }
                }
                ContentItem::Attr(name) => attr(name).to_owned(),
                ContentItem::OpenQuote => self.quote(style, true),
                ContentItem::CloseQuote => self.quote(style, false),
                ContentItem::NoOpenQuote => {
                    self.quote_depth += 1;
                    continue;
                }
                ContentItem::NoCloseQuote => {
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                    continue;
                }
                ContentItem::Leader(pattern) => {
                    self.flush_parts(&mut parts, style, node, page, &mut out);
                    out.push(self.run_box(BoxKind::Leader(pattern.clone()), style, Some(node), page));
                    continue;
                }
                // [GCPM § 3.1](https://www.w3.org/TR/css-gcpm-3/#target-counter)
                ContentItem::TargetCounter {
                    url,
                    name,
                    style: counter,
                } => {
                    let target = match url {
                        TargetUrl::Attr(name) => attr(name),
                        TargetUrl::Literal(url) => url.as_str(),
                    };
                    let anchor = target.strip_prefix('#').unwrap_or(target).to_owned();
                    if name == "page" {
                        parts.push(DynamicPart::TargetPage {
                            anchor,
                            style: *counter,
                        });
                    } else {
                        self.warn(&format!("target-counter() of '{name}' is not supported"));
                    }
                    continue;
                }
                ContentItem::Url(uri) => {
                    self.flush_parts(&mut parts, style, node, page, &mut out);
                    match self.images.get_image(uri) {
                        Some(image) => {
                            let content = ReplacedContent {
                                uri: uri.clone(),
                                intrinsic_width: image.width,
                                intrinsic_height: image.height,
                                intrinsic_ratio: image.ratio,
                            };
                            out.push(self.run_box(BoxKind::Replaced(content), style, Some(node), page));
                        }
                        None => self.warn(&format!("image '{uri}' could not be loaded")),
                    }
                    continue;
                }
            };
            push_text(&mut parts, &whitespace::transform(&text, style.text_transform));
        }
        self.flush_parts(&mut parts, style, node, page, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parts_merge() {
        let mut parts = Vec::new();
        push_text(&mut parts, "a");
        push_text(&mut parts, "");
        push_text(&mut parts, "b");
        parts.push(DynamicPart::Page(quire_style::content::CounterStyle::Decimal));
        push_text(&mut parts, "c");
        assert_eq!(
            parts,
            vec![
                DynamicPart::Text("ab".into()),
                DynamicPart::Page(quire_style::content::CounterStyle::Decimal),
                DynamicPart::Text("c".into()),
            ]
        );
    }
}
