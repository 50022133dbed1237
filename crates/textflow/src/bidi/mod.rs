//! Bidirectional (BiDi) text support built on `unicode-bidi`.
//!
//! - Paragraph direction resolution and per-character embedding levels
//! - Visual reordering of runs from their levels

pub mod levels;
pub mod reorder;

pub use levels::{BidiResolver, Direction, EmbeddingLevels, ParagraphDir, UnicodeBidi};
pub use reorder::visual_order;
