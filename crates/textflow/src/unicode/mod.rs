//! Unicode utilities for textflow.
//!
//! Grapheme segmentation, break tables, character classes and
//! language/script helpers. Offsets are always character offsets.

pub mod breaks;
pub mod graphemes;
pub mod language;
pub mod properties;

pub use breaks::{BreakOppo, compute_break_opportunities};
pub use graphemes::{grapheme_boundaries, grapheme_clusters};
pub use language::Language;
pub use unicode_script::Script;
