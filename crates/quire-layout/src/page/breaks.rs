//! Page progression: the side and name of the next page.
//!
//! [§ 3.3 Page-based breaks](https://www.w3.org/TR/css-page-3/#page-based-breaks)
//! and [§ 3.2 Using named pages](https://www.w3.org/TR/css-page-3/#using-named-pages)

use quire_style::PageSide;
use quire_style::keywords::{BreakBetween, Direction};

use crate::boxes::LayoutBox;
use crate::resume::ResumePoint;

/// The side a forced break asks the next page to be on.
///
/// [§ 3.1 'break-before'](https://www.w3.org/TR/css-break-3/#break-between)
/// "recto: ... a right page in a left-to-right page progression and a left
/// page in a right-to-left page progression."
#[must_use]
pub const fn required_side(between: BreakBetween, direction: Direction) -> Option<PageSide> {
    let rtl = matches!(direction, Direction::Rtl);
    match between {
        BreakBetween::Left => Some(PageSide::Left),
        BreakBetween::Right => Some(PageSide::Right),
        BreakBetween::Recto if rtl => Some(PageSide::Left),
        BreakBetween::Recto => Some(PageSide::Right),
        BreakBetween::Verso if rtl => Some(PageSide::Right),
        BreakBetween::Verso => Some(PageSide::Left),
        _ => None,
    }
}

/// The page at zero-based `index` must be blank: `between` wants the
/// content after it on the other side.
///
/// "Force one or two page breaks after the principal box so that the next
/// page is formatted as a left page."
#[must_use]
pub fn needs_blank_page(between: BreakBetween, direction: Direction, index: usize) -> bool {
    required_side(between, direction).is_some_and(|side| side != PageSide::for_index(index))
}

/// Used page name of the first box that will be placed when layout of
/// `root` continues at `resume`.
///
/// [§ 3.3](https://www.w3.org/TR/css-page-3/#page-based-breaks)
/// The start page value of a box is that of its first in-flow child, so the
/// deepest box starting the page decides.
#[must_use]
pub fn page_name_at(root: &LayoutBox, resume: Option<&ResumePoint>) -> Option<String> {
    let mut current = root;
    let mut resume = resume;
    loop {
        let next = match resume {
            Some(ResumePoint::Child { index, inner }) => {
                resume = inner.as_deref();
                current.children.get(*index)
            }
            Some(_) => None,
            None => current.children.iter().find(|c| c.is_in_flow()),
        };
        match next {
            Some(child) if child.is_block_level() => current = child,
            _ => return current.page_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use quire_style::{ComputedStyle, Display};

    use crate::boxes::{BoxId, BoxKind};

    fn named(id: usize, name: Option<&str>, children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::initial();
        style.display = Display::block();
        let mut b = LayoutBox::new(BoxId(id), BoxKind::Block, Arc::new(style));
        b.page_name = name.map(str::to_string);
        b.children = children;
        b
    }

    #[test]
    fn test_blank_page_for_sides() {
        assert!(needs_blank_page(BreakBetween::Right, Direction::Ltr, 1));
        assert!(!needs_blank_page(BreakBetween::Right, Direction::Ltr, 2));
        assert!(needs_blank_page(BreakBetween::Verso, Direction::Ltr, 2));
        assert!(!needs_blank_page(BreakBetween::Verso, Direction::Rtl, 2));
        assert!(!needs_blank_page(BreakBetween::Page, Direction::Ltr, 1));
    }

    #[test]
    fn test_page_name_follows_resume_path() {
        let root = named(
            0,
            None,
            vec![
                named(1, None, vec![]),
                named(2, Some("chapter"), vec![named(3, Some("wide"), vec![])]),
            ],
        );
        assert_eq!(page_name_at(&root, None), None);
        assert_eq!(page_name_at(&root, Some(&ResumePoint::at_child(1))).as_deref(), Some("wide"));
        let inside = ResumePoint::inside_child(1, ResumePoint::Inline { item: 0, offset: 0 });
        assert_eq!(page_name_at(&root, Some(&inside)).as_deref(), Some("chapter"));
    }
}
