//! Common utilities for the quire layout engine.
//!
//! This crate provides shared infrastructure used by the style and layout crates:
//! - **Diagnostics** - deduplicated warnings collected per document

pub mod warning;

pub use warning::Diagnostics;
