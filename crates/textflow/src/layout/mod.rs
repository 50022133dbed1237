//! Line layout engine.
//!
//! - Fits runs into lines at break opportunities
//! - Ellipsizes, reorders and justifies each line
//! - Hands positioned glyphs to a renderer

mod ellipsize;
pub mod engine;
pub mod line;
pub mod options;
mod postprocess;
pub mod render;

pub use engine::Layout;
pub use line::{GlyphRun, GlyphRunFlags, LayoutLine, LineFlags};
pub use options::{
    Align, Ellipsize, IndentMode, LayoutOptions, TextJustify, TextOrientation, WrapMode,
    WritingMode,
};
pub use render::{GlyphPos, Rect};
