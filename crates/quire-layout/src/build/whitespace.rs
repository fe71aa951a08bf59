//! White space processing and text transformation.
//!
//! [CSS Text § 4 White Space Processing](https://www.w3.org/TR/css-text-3/#white-space-processing)
//!
//! Phase I runs here, over each inline formatting context as a whole:
//! spaces collapse across element boundaries. Phase II (trimming at line
//! ends) belongs to line layout.

use std::sync::Arc;

use quire_style::keywords::{TextTransform, WhiteSpace};

use crate::boxes::{BoxKind, LayoutBox};

use super::BoxIds;

/// Columns between tab stops.
///
/// [§ 4.2 'tab-size'](https://www.w3.org/TR/css-text-3/#tab-size-property):
/// initial value 8.
const TAB_SIZE: usize = 8;

/// [§ 2.1 'text-transform'](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[must_use]
pub fn transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_owned(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        // "Puts the first typographic letter unit of each word, if
        // lowercase, in titlecase".
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut word_start = true;
            for c in text.chars() {
                if c.is_alphanumeric() {
                    if word_start {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                    word_start = false;
                } else {
                    out.push(c);
                    word_start = c.is_whitespace();
                }
            }
            out
        }
    }
}

/// Only document white space: nothing to show once collapsed.
#[must_use]
pub fn is_collapsible_whitespace(b: &LayoutBox) -> bool {
    match &b.kind {
        BoxKind::Text(text) => {
            b.style.white_space.collapses_spaces()
                && !b.style.white_space.preserves_newlines()
                && text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}'))
        }
        _ => false,
    }
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Collapse one text run. `after_space` carries whether the inline content
/// before it ends in a collapsible space (or starts the formatting
/// context), and is updated for the next run.
#[must_use]
pub fn collapse(text: &str, white_space: WhiteSpace, after_space: &mut bool) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    if !white_space.collapses_spaces() {
        // "Any collapsible space immediately following another collapsible
        // space ... is collapsed" applies only to collapsible spaces;
        // preserved tabs still expand to the next tab stop.
        let mut out = String::with_capacity(text.len());
        let mut column = 0;
        for c in text.chars() {
            match c {
                '\t' => {
                    let n = TAB_SIZE - column % TAB_SIZE;
                    out.extend(std::iter::repeat_n(' ', n));
                    column += n;
                }
                '\n' => {
                    out.push('\n');
                    column = 0;
                }
                _ => {
                    out.push(c);
                    column += 1;
                }
            }
        }
        *after_space = false;
        return out;
    }

    // "Any sequence of collapsible spaces and tabs immediately preceding or
    // following a segment break is removed." Segment breaks become spaces
    // unless preserved.
    let keep_newlines = white_space.preserves_newlines();
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        match c {
            ' ' | '\t' | '\u{c}' => pending_space = true,
            '\n' if keep_newlines => {
                pending_space = false;
                out.push('\n');
                *after_space = true;
            }
            '\n' => pending_space = true,
            _ => {
                if pending_space && !*after_space {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
                *after_space = false;
            }
        }
    }
    if pending_space && !*after_space {
        out.push(' ');
        *after_space = true;
    }
    out
}

/// Collapse white space through the inline content `children` of one block
/// container, splitting preserved segment breaks into forced line breaks.
/// Runs left empty are dropped.
pub fn process_inline_content(children: &mut Vec<LayoutBox>, ids: &mut BoxIds) {
    let mut after_space = true;
    process_runs(children, &mut after_space, ids);
}

fn process_runs(children: &mut Vec<LayoutBox>, after_space: &mut bool, ids: &mut BoxIds) {
    let mut out = Vec::with_capacity(children.len());
    for mut child in std::mem::take(children) {
        match &child.kind {
            BoxKind::Text(text) => {
                let collapsed = collapse(text, child.style.white_space, after_space);
                split_lines(child, &collapsed, &mut out, ids);
            }
            BoxKind::Inline => {
                process_runs(&mut child.children, after_space, ids);
                out.push(child);
            }
            BoxKind::LineBreak => {
                *after_space = true;
                out.push(child);
            }
            BoxKind::PageText(_) | BoxKind::Leader(_) => {
                *after_space = false;
                out.push(child);
            }
            _ if !child.is_in_flow() => out.push(child),
            _ => {
                *after_space = false;
                out.push(child);
            }
        }
    }
    *children = out;
}

/// Push `text` as runs of `source`, with a line break box for each
/// preserved newline.
fn split_lines(source: LayoutBox, text: &str, out: &mut Vec<LayoutBox>, ids: &mut BoxIds) {
    if !text.contains('\n') {
        if !text.is_empty() {
            let mut run = source;
            run.kind = BoxKind::Text(text.to_owned());
            out.push(run);
        }
        return;
    }
    let mut first = true;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let mut br = LayoutBox::new(ids.allocate(), BoxKind::LineBreak, Arc::clone(&source.style));
            br.anonymous = true;
            br.node = source.node;
            br.page_name.clone_from(&source.page_name);
            out.push(br);
        }
        if line.is_empty() {
            continue;
        }
        let mut run = if first {
            first = false;
            source.shell()
        } else {
            let mut run = source.shell();
            run.id = ids.allocate();
            run
        };
        run.kind = BoxKind::Text(line.to_owned());
        out.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quire_style::ComputedStyle;

    use crate::boxes::BoxId;

    #[test]
    fn test_spaces_collapse_across_runs() {
        let mut after = true;
        assert_eq!(collapse("  Hello \n  ", WhiteSpace::Normal, &mut after), "Hello ");
        assert_eq!(collapse(" world", WhiteSpace::Normal, &mut after), "world");
        assert!(!after);
    }

    #[test]
    fn test_pre_line_keeps_breaks() {
        let mut after = true;
        assert_eq!(collapse("a  \n   b", WhiteSpace::PreLine, &mut after), "a\nb");
    }

    #[test]
    fn test_pre_expands_tabs() {
        let mut after = true;
        assert_eq!(collapse("ab\tc", WhiteSpace::Pre, &mut after), "ab      c");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(transform("hello big-world", TextTransform::Capitalize), "Hello Big-world");
        assert_eq!(transform("Straße", TextTransform::Uppercase), "STRASSE");
    }

    #[test]
    fn test_preserved_newlines_become_breaks() {
        let mut style = ComputedStyle::initial();
        style.white_space = WhiteSpace::Pre;
        let text = LayoutBox::new(BoxId(100), BoxKind::Text("a\n\nb".into()), Arc::new(style));
        let mut children = vec![text];
        process_inline_content(&mut children, &mut BoxIds::new());
        let kinds: Vec<&BoxKind> = children.iter().map(|c| &c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &BoxKind::Text("a".into()),
                &BoxKind::LineBreak,
                &BoxKind::LineBreak,
                &BoxKind::Text("b".into())
            ]
        );
        assert_eq!(children[0].id, BoxId(100));
        assert_ne!(children[3].id, BoxId(100));
    }
}
