//! A small, permissive reader for HTML-like markup.
//!
//! It understands start and end tags with quoted or bare attributes, void
//! elements, comments, doctype declarations, character references and
//! raw-text `<style>`/`<script>` contents. Like the HTML tree builder it
//! always produces an `html` element holding a `head` and a `body`, creating
//! whichever the source leaves out: metadata elements seen before any
//! content go to the head, everything else goes to the body. There is no
//! foster parenting. Mismatched end tags close up to the nearest open
//! element of the same name and are otherwise ignored.

use crate::{DomTree, ElementData, NodeId, NodeType};

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that belong in `<head>` when they come before any content.
const HEAD_ELEMENTS: &[&str] = &["base", "link", "meta", "script", "style", "title"];

/// Elements whose contents are read verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Parse `source` into a new tree.
///
/// # Example
/// ```
/// let dom = quire_dom::markup::parse("<p class=a>Hi &amp; bye<br></p>");
/// let html = dom.document_element().unwrap();
/// assert_eq!(dom.as_element(html).unwrap().tag_name, "html");
/// let p = dom.children(dom.body().unwrap())[0];
/// assert_eq!(dom.as_element(p).unwrap().tag_name, "p");
/// assert_eq!(dom.text_content(p), "Hi & bye");
/// ```
#[must_use]
pub fn parse(source: &str) -> DomTree {
    let mut reader = Reader {
        src: source,
        pos: 0,
        tree: DomTree::new(),
        open: vec![NodeId::ROOT],
        text: String::new(),
        html: None,
        head: None,
        body: None,
    };
    reader.run();
    let _ = reader.body();
    reader.tree
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
    tree: DomTree,
    open: Vec<NodeId>,
    text: String,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn run(&mut self) {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.flush_text();
                let (body, end) = match rest[4..].find("-->") {
                    Some(i) => (rest[4..4 + i].to_string(), self.pos + 4 + i + 3),
                    None => (rest[4..].to_string(), self.src.len()),
                };
                let id = self.tree.alloc(NodeType::Comment(body));
                self.tree.append_child(self.current(), id);
                self.pos = end;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.flush_text();
                self.pos = rest.find('>').map_or(self.src.len(), |i| self.pos + i + 1);
            } else if rest.starts_with("</") {
                self.flush_text();
                self.end_tag();
            } else if rest.starts_with('<')
                && rest[1..].chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            {
                self.flush_text();
                self.start_tag();
            } else {
                let skip = rest.chars().next().map_or(1, char::len_utf8);
                let next = rest[skip..].find('<').map_or(self.src.len(), |i| self.pos + skip + i);
                let chunk = &self.src[self.pos..next];
                self.text.push_str(&decode_entities(chunk));
                self.pos = next;
            }
        }
        self.flush_text();
    }

    /// True while the insertion point is the document, `html` or `head`
    /// itself, before any body content.
    fn before_body(&self) -> bool {
        let current = Some(self.current());
        self.body.is_none()
            && (current == Some(NodeId::ROOT) || current == self.html || current == self.head)
    }

    /// The `html` element, created on first use.
    fn html(&mut self) -> NodeId {
        self.open_html(ElementData::new("html"))
    }

    fn open_html(&mut self, data: ElementData) -> NodeId {
        if let Some(id) = self.html {
            return id;
        }
        let id = self.tree.append_element(NodeId::ROOT, data);
        self.html = Some(id);
        self.open = vec![NodeId::ROOT, id];
        id
    }

    /// The `head` element, created on first use.
    fn head(&mut self) -> NodeId {
        if let Some(id) = self.head {
            return id;
        }
        let html = self.html();
        let id = self.tree.append_element(html, ElementData::new("head"));
        self.head = Some(id);
        id
    }

    /// The `body` element, created on first use. Opening it closes the head.
    fn body(&mut self) -> NodeId {
        self.open_body(ElementData::new("body"))
    }

    fn open_body(&mut self, data: ElementData) -> NodeId {
        if let Some(id) = self.body {
            return id;
        }
        let _ = self.head();
        let html = self.html();
        let id = self.tree.append_element(html, data);
        self.body = Some(id);
        self.open = vec![NodeId::ROOT, html, id];
        id
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let parent = if self.before_body() {
            // Whitespace between skeleton tags is dropped.
            if text.chars().all(|c| c.is_ascii_whitespace()) {
                return;
            }
            self.body()
        } else {
            self.current()
        };
        let _ = self.tree.append_text(parent, &text);
    }

    fn end_tag(&mut self) {
        let rest = self.rest();
        let close = rest.find('>').map_or(rest.len(), |i| i + 1);
        let name = rest[2..close.saturating_sub(1).max(2)].trim().to_ascii_lowercase();
        self.pos += close;
        // `html` and `body` stay open so trailing content still lands in the body.
        if name == "html" || name == "body" {
            return;
        }
        let matching = self.open.iter().rposition(|&id| {
            self.tree.as_element(id).is_some_and(|e| e.tag_name == name)
        });
        if let Some(index) = matching {
            self.open.truncate(index.max(1));
        }
    }

    fn start_tag(&mut self) {
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
            i += 1;
        }
        let mut data = ElementData::new(&self.src[self.pos + 1..i]);
        let mut self_closing = false;

        // Attributes.
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            if bytes[i] == b'>' {
                i += 1;
                break;
            }
            if bytes[i] == b'/' {
                self_closing = true;
                i += 1;
                continue;
            }
            let name_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let name = self.src[name_start..i].to_ascii_lowercase();
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = String::new();
            if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    let start = i + 1;
                    i = start;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    value = decode_entities(&self.src[start..i]);
                    i = (i + 1).min(bytes.len());
                } else {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_entities(&self.src[start..i]);
                }
            }
            if !name.is_empty() {
                let _ = data.attrs.entry(name).or_insert(value);
            }
        }
        self.pos = i;

        let tag = data.tag_name.clone();
        let parent = match tag.as_str() {
            "html" => {
                let _ = self.open_html(data);
                return;
            }
            "body" => {
                let _ = self.open_body(data);
                return;
            }
            "head" => {
                if self.head.is_none() && self.body.is_none() {
                    let html = self.html();
                    let id = self.tree.append_element(html, data);
                    self.head = Some(id);
                    self.open = vec![NodeId::ROOT, html, id];
                }
                return;
            }
            _ if !self.before_body() => self.current(),
            name if HEAD_ELEMENTS.contains(&name) => self.head(),
            _ => self.body(),
        };
        let id = self.tree.append_element(parent, data);
        if VOID_ELEMENTS.contains(&tag.as_str()) || self_closing {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let closing = format!("</{tag}");
            let rest = self.rest();
            let end = rest
                .to_ascii_lowercase()
                .find(&closing)
                .unwrap_or(rest.len());
            if end > 0 {
                let _ = self.tree.append_text(id, &rest[..end]);
            }
            self.pos += end;
            self.pos = self.rest().find('>').map_or(self.src.len(), |j| self.pos + j + 1);
            return;
        }
        self.open.push(id);
    }
}

/// Replace character references (`&amp;`, `&#160;`, `&#xAD;`, ...) in `text`.
/// Unknown references are kept literally.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some(semi) = rest.find(';').filter(|&s| s <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let name = &rest[1..semi];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            "shy" => Some('\u{ad}'),
            "zwsp" => Some('\u{200b}'),
            _ => name.strip_prefix('#').and_then(|num| {
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };
        if let Some(c) = decoded {
            out.push(c);
            rest = &rest[semi + 1..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}
