/// Font-level metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    pub line_gap: f32,
    pub units_per_em: u16,
    pub is_monospace: bool,
}

impl FontMetrics {
    /// Pixels per font unit at `font_size` px per em.
    pub fn scale(&self, font_size: f32) -> f32 {
        if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        }
    }

    pub fn scale_to_pixels(&self, font_size: f32) -> ScaledFontMetrics {
        let scale = self.scale(font_size);
        ScaledFontMetrics {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_gap: self.line_gap * scale,
            font_size,
        }
    }
}

/// Font metrics in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScaledFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub font_size: f32,
}

impl ScaledFontMetrics {
    /// Whole-pixel line height (ascent + descent + line gap, rounded up).
    pub fn line_height(&self) -> i32 {
        (self.ascent + self.descent + self.line_gap).ceil() as i32
    }
}
