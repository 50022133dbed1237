//! Shaping contract and backends.
//!
//! The layout engine only talks to [`Shaper`]. Two backends ship with
//! the crate: [`SimpleShaper`] with fixed advances and [`HbShaper`] on
//! top of harfrust.

pub mod glyph_string;
pub mod hb;
pub mod shaper;
pub mod simple;

pub use glyph_string::{Cluster, GlyphId, GlyphString, INVALID_GLYPH, ShapedGlyph};
pub use hb::HbShaper;
pub use shaper::{FontExtents, ShapeRequest, Shaper};
pub use simple::SimpleShaper;
