use std::path::Path;
use std::sync::Arc;

use swash::{FontRef, Metrics};

use crate::error::{Error, Result};
use crate::font::FontMetrics;

/// Loaded font face backed by a font file (TTF/OTF).
///
/// Owns the font bytes and exposes the metrics and per-character
/// advances the shaper needs. Glyph rasterization is left to callers.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Arc<[u8]>,
    /// Face index within a collection.
    index: u32,
    offset: u32,
    key: swash::CacheKey,
    metrics: FontMetrics,
}

impl FontFace {
    /// Create a font face from raw bytes and a face index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: u32) -> Result<Self> {
        let font = FontRef::from_index(&data, index as usize).ok_or(Error::InvalidFont)?;
        let metrics = Self::metrics_from_swash(&font);
        let (offset, key) = (font.offset, font.key);
        Ok(Self {
            data,
            index,
            offset,
            key,
            metrics,
        })
    }

    pub fn from_vec(data: Vec<u8>, index: u32) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    pub fn from_path(path: impl AsRef<Path>, index: u32) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data, index)
    }

    /// Raw font bytes, shared with the harfrust shaper.
    pub fn as_bytes(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    fn as_swash_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn metrics_from_swash(font: &FontRef<'_>) -> FontMetrics {
        let Metrics {
            units_per_em,
            ascent,
            descent,
            leading,
            is_monospace,
            ..
        } = font.metrics(&[]);

        FontMetrics {
            ascent,
            descent,
            line_gap: leading,
            units_per_em,
            is_monospace,
        }
    }

    /// Font metrics in font units.
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Advance of `ch` in pixels at `font_size`, or `None` when the font
    /// has no glyph for it.
    pub fn advance_of(&self, ch: char, font_size: f32) -> Option<f32> {
        let font = self.as_swash_ref();
        let glyph = font.charmap().map(ch);
        if glyph == 0 {
            return None;
        }
        Some(font.glyph_metrics(&[]).scale(font_size).advance_width(glyph))
    }
}
