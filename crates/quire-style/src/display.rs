//! The `display` property.
//!
//! [CSS Display Level 3](https://www.w3.org/TR/css-display-3/)

use serde::Serialize;

/// [§ 2.1 Outer display roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display
/// type, which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OuterDisplayType {
    /// "The element generates a box that is block-level when placed in flow
    /// layout."
    Block,
    /// "The element generates a box that is inline-level when placed in flow
    /// layout."
    Inline,
}

/// [§ 2.2 Inner display layout models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// "The `<display-inside>` keywords specify the element's inner display type,
/// which defines the type of formatting context that lays out its contents."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout."
    Flow,
    /// "The element generates a block container box, and lays out its
    /// contents using flow layout. It always establishes a new block
    /// formatting context for its contents."
    FlowRoot,
    /// [CSS 2.1 § 17](https://www.w3.org/TR/CSS2/tables.html)
    Table,
    /// [CSS Flexbox § 3](https://www.w3.org/TR/css-flexbox-1/#flex-containers)
    Flex,
    /// [CSS Grid § 5](https://www.w3.org/TR/css-grid-1/#grid-containers)
    Grid,
}

/// [§ 2.4 Layout-internal display types](https://www.w3.org/TR/css-display-3/#layout-specific-display)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InternalDisplay {
    /// `table-row-group`
    TableRowGroup,
    /// `table-header-group`
    TableHeaderGroup,
    /// `table-footer-group`
    TableFooterGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-column`
    TableColumn,
    /// `table-caption`
    TableCaption,
}

impl InternalDisplay {
    /// A row group of any kind.
    #[must_use]
    pub const fn is_row_group(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup | Self::TableHeaderGroup | Self::TableFooterGroup
        )
    }

    /// Column or column group.
    #[must_use]
    pub const fn is_column_like(self) -> bool {
        matches!(self, Self::TableColumn | Self::TableColumnGroup)
    }
}

/// A computed `display` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// No box at all.
    None,
    /// The element's children take its place.
    Contents,
    /// An outer/inner pair, optionally generating a `::marker`.
    Pair {
        /// Role in the parent's flow.
        outer: OuterDisplayType,
        /// Formatting context for the children.
        inner: InnerDisplayType,
        /// `list-item` was given.
        list_item: bool,
    },
    /// A table-internal role.
    Internal(InternalDisplay),
}

impl Default for Display {
    fn default() -> Self {
        Self::inline()
    }
}

impl Display {
    /// `block`
    #[must_use]
    pub const fn block() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Flow)
    }

    /// `inline`
    #[must_use]
    pub const fn inline() -> Self {
        Self::pair(OuterDisplayType::Inline, InnerDisplayType::Flow)
    }

    /// `inline-block`
    #[must_use]
    pub const fn inline_block() -> Self {
        Self::pair(OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
    }

    /// `flex`
    #[must_use]
    pub const fn flex() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Flex)
    }

    /// `grid`
    #[must_use]
    pub const fn grid() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Grid)
    }

    /// `table`
    #[must_use]
    pub const fn table() -> Self {
        Self::pair(OuterDisplayType::Block, InnerDisplayType::Table)
    }

    const fn pair(outer: OuterDisplayType, inner: InnerDisplayType) -> Self {
        Self::Pair {
            outer,
            inner,
            list_item: false,
        }
    }

    /// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Parse a keyword or a multi-keyword value. Unknown values give `None`;
    /// the caller keeps the previous value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let words: Vec<String> = value
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        let single = match words.as_slice() {
            [w] => Some(w.as_str()),
            _ => None,
        };
        let legacy = match single {
            Some("none") => Some(Self::None),
            Some("contents") => Some(Self::Contents),
            Some("inline-block") => Some(Self::inline_block()),
            Some("inline-flex") => Some(Self::pair(OuterDisplayType::Inline, InnerDisplayType::Flex)),
            Some("inline-grid") => Some(Self::pair(OuterDisplayType::Inline, InnerDisplayType::Grid)),
            Some("inline-table") => Some(Self::pair(OuterDisplayType::Inline, InnerDisplayType::Table)),
            Some("table-row-group") => Some(Self::Internal(InternalDisplay::TableRowGroup)),
            Some("table-header-group") => Some(Self::Internal(InternalDisplay::TableHeaderGroup)),
            Some("table-footer-group") => Some(Self::Internal(InternalDisplay::TableFooterGroup)),
            Some("table-row") => Some(Self::Internal(InternalDisplay::TableRow)),
            Some("table-cell") => Some(Self::Internal(InternalDisplay::TableCell)),
            Some("table-column-group") => Some(Self::Internal(InternalDisplay::TableColumnGroup)),
            Some("table-column") => Some(Self::Internal(InternalDisplay::TableColumn)),
            Some("table-caption") => Some(Self::Internal(InternalDisplay::TableCaption)),
            _ => None,
        };
        if legacy.is_some() {
            return legacy;
        }

        // Multi-keyword syntax: [ <display-outside> || <display-inside> ] && list-item?
        let mut outer = None;
        let mut inner = None;
        let mut list_item = false;
        for word in &words {
            match word.as_str() {
                "block" if outer.is_none() => outer = Some(OuterDisplayType::Block),
                "inline" if outer.is_none() => outer = Some(OuterDisplayType::Inline),
                "flow" if inner.is_none() => inner = Some(InnerDisplayType::Flow),
                "flow-root" if inner.is_none() => inner = Some(InnerDisplayType::FlowRoot),
                "table" if inner.is_none() => inner = Some(InnerDisplayType::Table),
                "flex" if inner.is_none() => inner = Some(InnerDisplayType::Flex),
                "grid" if inner.is_none() => inner = Some(InnerDisplayType::Grid),
                "list-item" if !list_item => list_item = true,
                _ => return None,
            }
        }
        if outer.is_none() && inner.is_none() && !list_item {
            return None;
        }
        // "If a <display-outside> value is specified but <display-inside> is
        // omitted, the element's inner display type defaults to flow. If a
        // <display-inside> value is specified but <display-outside> is
        // omitted, the element's outer display type defaults to block—except
        // for ruby, which defaults to inline."
        Some(Self::Pair {
            outer: outer.unwrap_or(OuterDisplayType::Block),
            inner: inner.unwrap_or(InnerDisplayType::Flow),
            list_item,
        })
    }

    /// Outer display type, `None` for `none`, `contents` and internal values.
    #[must_use]
    pub const fn outer(self) -> Option<OuterDisplayType> {
        match self {
            Self::Pair { outer, .. } => Some(outer),
            _ => None,
        }
    }

    /// Inner display type, `None` for `none`, `contents` and internal values.
    #[must_use]
    pub const fn inner(self) -> Option<InnerDisplayType> {
        match self {
            Self::Pair { inner, .. } => Some(inner),
            _ => None,
        }
    }

    /// Block-level in flow layout.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Pair {
                outer: OuterDisplayType::Block,
                ..
            }
        )
    }

    /// Inline-level in flow layout.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(
            self,
            Self::Pair {
                outer: OuterDisplayType::Inline,
                ..
            }
        )
    }

    /// `inline` itself: a non-atomic inline box.
    #[must_use]
    pub const fn is_inline_flow(self) -> bool {
        matches!(
            self,
            Self::Pair {
                outer: OuterDisplayType::Inline,
                inner: InnerDisplayType::Flow,
                ..
            }
        )
    }

    /// `list-item` was given.
    #[must_use]
    pub const fn is_list_item(self) -> bool {
        matches!(self, Self::Pair { list_item: true, .. })
    }

    /// A table-internal role, if any.
    #[must_use]
    pub const fn internal(self) -> Option<InternalDisplay> {
        match self {
            Self::Internal(role) => Some(role),
            _ => None,
        }
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "Some layout effects require blockification or inlinification of the
    /// box type ... the element's display is set to a block-level
    /// equivalent". Applied to floats, absolutely positioned boxes, the root
    /// and flex/grid items.
    #[must_use]
    pub const fn blockified(self) -> Self {
        match self {
            Self::Pair {
                inner, list_item, ..
            } => {
                let inner = match inner {
                    InnerDisplayType::FlowRoot => InnerDisplayType::Flow,
                    other => other,
                };
                Self::Pair {
                    outer: OuterDisplayType::Block,
                    inner,
                    list_item,
                }
            }
            Self::Internal(_) => Self::block(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_keywords() {
        assert_eq!(Display::parse("inline-block"), Some(Display::inline_block()));
        assert_eq!(Display::parse("none"), Some(Display::None));
        assert_eq!(
            Display::parse("table-cell"),
            Some(Display::Internal(InternalDisplay::TableCell))
        );
    }

    #[test]
    fn test_multi_keyword_values() {
        assert_eq!(
            Display::parse("list-item"),
            Some(Display::Pair {
                outer: OuterDisplayType::Block,
                inner: InnerDisplayType::Flow,
                list_item: true
            })
        );
        assert_eq!(Display::parse("inline flex").and_then(Display::inner), Some(InnerDisplayType::Flex));
        assert_eq!(Display::parse("block block"), None);
        assert_eq!(Display::parse("sideways"), None);
    }

    #[test]
    fn test_blockification() {
        assert_eq!(Display::inline_block().blockified(), Display::block());
        assert_eq!(
            Display::parse("inline-flex").map(Display::blockified),
            Some(Display::flex())
        );
        assert_eq!(
            Display::Internal(InternalDisplay::TableRow).blockified(),
            Display::block()
        );
    }
}
