use harfrust::{
    Direction as HbDirection,
    FontRef as HbFontRef,
    Language as HbLanguage,
    Script as HbScript,
    ShaperData,
    ShaperInstance,
    Tag as HbTag,
    UnicodeBuffer as HbUnicodeBuffer,
};

use hashbrown::HashMap;

use crate::font::{FontDescriptor, FontFace};
use crate::itemize::TextRun;
use crate::unicode::graphemes::CharIndexMap;

use super::{FontExtents, GlyphId, GlyphString, ShapeRequest, ShapedGlyph, Shaper};

/// Shaper built on harfrust (pure-Rust HarfBuzz port) at one pixel size.
///
/// Runs whose font name was registered with [`HbShaper::with_face`] use
/// that face; everything else uses the default face. Handles kerning,
/// ligatures, mark positioning and right-to-left runs. Vertical advances
/// are not produced; vertical runs are shaped horizontally and rotated by
/// the renderer.
pub struct HbShaper {
    face: FontFace,
    faces: HashMap<String, FontFace>,
    font_size: f32,
}

impl HbShaper {
    pub fn new(face: FontFace, font_size: f32) -> Self {
        Self {
            face,
            faces: HashMap::new(),
            font_size,
        }
    }

    /// Shape text in the font named `font` with `face`.
    pub fn with_face(mut self, font: impl Into<String>, face: FontFace) -> Self {
        self.faces.insert(font.into(), face);
        self
    }

    /// The default face.
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// The face used for `font`.
    pub fn face_for(&self, font: &FontDescriptor) -> &FontFace {
        self.faces.get(&font.name).unwrap_or(&self.face)
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

impl Shaper for HbShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<GlyphString> {
        let face = self.face_for(request.font);
        let font_data = face.as_bytes();
        let font_ref = HbFontRef::from_index(&font_data, face.index()).ok()?;

        let data = ShaperData::new(&font_ref);
        let instance =
            ShaperInstance::from_variations(&font_ref, core::iter::empty::<harfrust::Variation>());
        let shaper = data
            .shaper(&font_ref)
            .instance(Some(&instance))
            .point_size(None)
            .build();

        // Clusters come back as byte offsets into this string.
        let map = CharIndexMap::new(request.chars);
        let mut buffer = HbUnicodeBuffer::new();
        buffer.push_str(map.as_str());
        buffer.set_direction(if request.is_rtl() {
            HbDirection::RightToLeft
        } else {
            HbDirection::LeftToRight
        });
        let tag: [u8; 4] = request
            .run
            .script
            .short_name()
            .as_bytes()
            .try_into()
            .unwrap_or(*b"Zyyy");
        if let Some(script) = HbScript::from_iso15924_tag(HbTag::new(&tag)) {
            buffer.set_script(script);
        }
        if let Ok(language) = request.run.lang.as_str().parse::<HbLanguage>() {
            buffer.set_language(language);
        }
        buffer.guess_segment_properties();

        let glyph_buffer = shaper.shape(buffer, &[]);
        let scale = face.metrics().scale(self.font_size);
        let height = face.metrics().scale_to_pixels(self.font_size).line_height();

        let infos = glyph_buffer.glyph_infos();
        let positions = glyph_buffer.glyph_positions();
        let mut glyphs = GlyphString::with_capacity(infos.len());
        let mut prev_cluster = None;
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let cluster = map.char_offset(info.cluster as usize);
            let glyph = ShapedGlyph {
                glyph: info.glyph_id as GlyphId,
                x_off: (pos.x_offset as f32 * scale).round() as i32,
                y_off: -(pos.y_offset as f32 * scale).round() as i32,
                width: (pos.x_advance as f32 * scale).round() as i32,
                height,
                is_cluster_start: prev_cluster != Some(cluster),
            };
            prev_cluster = Some(cluster);
            glyphs.push(glyph, cluster);
        }
        Some(glyphs)
    }

    fn extents(&self, _run: &TextRun, font: &FontDescriptor) -> FontExtents {
        let face = self.face_for(font);
        let metrics = face.metrics().scale_to_pixels(self.font_size);
        let fallback = (self.font_size / 2.0).round() as i32;
        let space = face
            .advance_of(' ', self.font_size)
            .map(|w| w.round() as i32)
            .unwrap_or(fallback);
        FontExtents {
            height: metrics.line_height(),
            fallback_advance: fallback,
            space_advance: space,
        }
    }
}
