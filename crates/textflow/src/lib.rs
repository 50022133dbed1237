//! textflow: paragraph itemization and line layout.
//!
//! - Itemizer: splits a character buffer into runs of uniform script,
//!   bidi level, orientation and shaping eligibility
//! - Layout: breaks the runs into lines one at a time, with alignment,
//!   justification, ellipsization, tabs and letter spacing
//! - Shaping contract: the [`Shaper`] trait the layout talks to, plus a
//!   harfrust backend and a fixed-advance one for tests
//!
//! All offsets are character offsets into the buffer handed to
//! [`RunsInfo::build`].

pub mod bidi;
pub mod error;
pub mod font;
pub mod itemize;
pub mod layout;
pub mod shaping;
pub mod unicode;

pub use error::{Error, Result};
pub use font::{FontDescriptor, FontFace, FontRegistry, FontResolver};
pub use itemize::{Color, GlyphOrient, ItemizeOptions, OrientPolicy, RunDir, RunsInfo, TextRun};
pub use layout::{GlyphPos, Layout, LayoutLine, LayoutOptions, Rect};
pub use shaping::{FontExtents, GlyphString, HbShaper, ShapeRequest, Shaper, SimpleShaper};
pub use unicode::{BreakOppo, compute_break_opportunities};
