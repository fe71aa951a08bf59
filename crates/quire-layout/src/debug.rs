//! JSON dumps of laid-out documents.
//!
//! Pages, boxes and geometry serialize with `serde`; styles are left out.
//! Two layouts of the same input produce byte-identical dumps.

use serde_json::{Value, json};

use crate::Document;
use crate::boxes::LayoutBox;

/// The whole document as pretty-printed JSON.
#[must_use]
pub fn dump_pages(document: &Document) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
}

/// A smaller view of a box tree: kind, element, border box and children.
#[must_use]
pub fn outline(b: &LayoutBox) -> Value {
    let mut obj = serde_json::Map::new();
    let _ = obj.insert("kind".to_string(), json!(format!("{:?}", b.kind)));
    if let Some(tag) = &b.tag {
        let _ = obj.insert("tag".to_string(), json!(tag));
    }
    if let Some(id) = &b.element_id {
        let _ = obj.insert("id".to_string(), json!(id));
    }
    let _ = obj.insert(
        "rect".to_string(),
        json!([b.border_box_x(), b.border_box_y(), b.border_width(), b.border_height()]),
    );
    if !b.children.is_empty() {
        let children: Vec<Value> = b.children.iter().map(outline).collect();
        let _ = obj.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_dom::markup;
    use quire_style::RuleResolver;

    use crate::options::LayoutOptions;

    #[test]
    fn test_dump_is_deterministic() {
        let html = "<h1 id=t>Title</h1><p>Some text that wraps across a few lines.</p>";
        let css = "@page { size: 200px 300px }";
        let dom = markup::parse(html);
        let resolver = RuleResolver::new(&dom, &[css]);
        let first = dump_pages(&crate::layout(&dom, &resolver, &LayoutOptions::default()));
        let second = dump_pages(&crate::layout(&dom, &resolver, &LayoutOptions::default()));
        assert_eq!(first, second);
        let value: Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["pages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_outline_names_elements() {
        let dom = markup::parse("<div id=a>x</div>");
        let resolver = RuleResolver::new(&dom, &["@page { size: 100px 100px }"]);
        let document = crate::layout(&dom, &resolver, &LayoutOptions::default());
        let root = document.pages[0].document_fragment().unwrap();
        let tree = outline(root);
        assert!(tree.to_string().contains("\"id\":\"a\""));
    }
}
