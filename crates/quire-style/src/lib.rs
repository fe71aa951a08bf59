//! Computed styles for the quire layout engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Computed values** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - Lengths in px, em, rem, ex, ch, vw, vh, pt, pc, in, cm, mm, q and percentages
//!   - Colors, borders, line heights, vertical alignment
//!   - Grid track lists, placements and template areas
//!   - Generated content, counters and quotes
//!
//! - **Declarations**
//!   - Shorthand expansion (margin, padding, border, flex, grid, columns, font, ...)
//!   - CSS-wide keywords `inherit`, `initial`, `unset`
//!   - Custom properties and `var()` with cycle detection
//!     ([CSS Variables Level 1](https://www.w3.org/TR/css-variables-1/))
//!
//! - **Rules**
//!   - Type, class, ID and universal selectors with descendant and child combinators
//!   - `::before`, `::after`, `::marker`, `::footnote-call`, `::footnote-marker`
//!   - `@page` with page selectors, page-margin boxes and `@footnote`
//!   - `@media print` unwrapping
//!
//! - **Resolution**
//!   - The [`StyleResolver`] trait consumed by layout
//!   - [`RuleResolver`], resolving a whole document up front
//!
//! # Not Yet Implemented
//!
//! - Full CSS syntax (escapes, nested blocks other than `@page`)
//! - Attribute selectors, sibling combinators and pseudo-classes
//! - `calc()`

/// The cascade proper: from declarations to a computed style.
pub mod cascade;
/// The computed style record.
pub mod computed;
/// `content`, counters and counter styles.
pub mod content;
/// The `display` property.
pub mod display;
/// Errors raised while reading declarations.
pub mod error;
/// Grid template and placement values.
pub mod grid;
/// Keyword-valued properties.
pub mod keywords;
/// Page types, page selectors and margin boxes.
pub mod page;
/// Shorthand expansion and longhand parsing.
pub mod properties;
/// The [`StyleResolver`] trait and the bundled rule-based resolver.
pub mod resolver;
/// Style sheets, selectors and declarations.
pub mod sheet;
/// The default style sheet.
pub mod ua_stylesheet;
/// Lengths, colors and the other value types.
pub mod values;
/// Custom properties and `var()`.
pub mod variables;

pub use cascade::{CascadeEnv, compute_style};
pub use computed::ComputedStyle;
pub use display::Display;
pub use error::StyleError;
pub use page::{MarginBoxName, PageArea, PageSide, PageType};
pub use resolver::{RuleResolver, StyleResolver};
pub use sheet::{Declaration, PseudoElement, Stylesheet};
