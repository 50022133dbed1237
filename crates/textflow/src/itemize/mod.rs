//! Run itemizer.
//!
//! Splits a paragraph into [`TextRun`]s of uniform script, language, font,
//! embedding level, direction, orientation and shaping eligibility.

pub mod attrs;
pub mod run;
pub mod runs_info;
mod scanners;

pub use attrs::AttrMap;
pub use run::{Color, GlyphOrient, ItemizeOptions, OrientPolicy, RunDir, RunFlags, TextRun};
pub use runs_info::RunsInfo;
