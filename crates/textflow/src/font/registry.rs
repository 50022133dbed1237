use std::path::PathBuf;

use hashbrown::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::font::FontFace;
use crate::itemize::GlyphOrient;

/// Capabilities of a logical font, as far as itemization cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Logical name the font was registered under.
    pub name: String,
    /// The font converts text through Unicode.
    pub unicode: bool,
    /// The font renders multi-byte (complex-script) text.
    pub multibyte: bool,
    /// Glyphs can be drawn rotated.
    pub rotatable: bool,
    /// Orientation the font renders in; used when `Auto` is requested.
    pub rotation: GlyphOrient,
    /// Backing file and face index, if any.
    pub source: Option<(PathBuf, u32)>,
}

impl FontDescriptor {
    /// A scalable Unicode font.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unicode: true,
            multibyte: true,
            rotatable: true,
            rotation: GlyphOrient::Upright,
            source: None,
        }
    }

    /// A bitmap-style font that cannot be rotated.
    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            rotatable: false,
            ..Self::new(name)
        }
    }

    pub fn with_rotation(mut self, rotation: GlyphOrient) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, index: u32) -> Self {
        self.source = Some((path.into(), index));
        self
    }

    /// Check the font can render text in `orient`.
    pub fn check_orientation(&self, orient: GlyphOrient) -> Result<()> {
        if self.multibyte && !self.unicode {
            return Err(Error::FontOrientationMismatch {
                font: self.name.clone(),
                reason: "multi-byte font without Unicode conversion",
            });
        }
        if orient.is_rotated() && !self.rotatable {
            return Err(Error::FontOrientationMismatch {
                font: self.name.clone(),
                reason: "rotated orientation requested for a non-rotatable font",
            });
        }
        Ok(())
    }
}

/// Resolves logical font names.
pub trait FontResolver {
    fn resolve(&self, name: &str) -> Option<FontDescriptor>;
}

impl<F> FontResolver for F
where
    F: Fn(&str) -> Option<FontDescriptor>,
{
    fn resolve(&self, name: &str) -> Option<FontDescriptor> {
        self(name)
    }
}

/// In-memory registry of logical font names.
///
/// Names are matched case-insensitively.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: HashMap<String, FontDescriptor>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Register `font` under its name, replacing any previous entry.
    pub fn register(&mut self, font: FontDescriptor) {
        self.fonts.insert(font.name.to_lowercase(), font);
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Register every family found in the system font database.
    ///
    /// Families already registered are kept. Returns the number of
    /// families added.
    pub fn load_system_fonts(&mut self) -> usize {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut added = 0;
        for face in db.faces() {
            let path = match &face.source {
                fontdb::Source::File(path) => path.clone(),
                _ => continue,
            };
            for (family, _) in &face.families {
                let key = family.to_lowercase();
                if self.fonts.contains_key(&key) {
                    continue;
                }
                let font = FontDescriptor::new(family.clone()).with_source(path.clone(), face.index);
                self.fonts.insert(key, font);
                added += 1;
            }
        }
        debug!(added, total = self.fonts.len(), "loaded system font families");
        added
    }

    /// Load the face backing the font registered as `name`.
    pub fn load_face(&self, name: &str) -> Result<FontFace> {
        let font = self
            .resolve(name)
            .ok_or_else(|| Error::UnknownFont(name.to_string()))?;
        match &font.source {
            Some((path, index)) => FontFace::from_path(path, *index),
            None => Err(Error::UnknownFont(name.to_string())),
        }
    }
}

impl FontResolver for FontRegistry {
    fn resolve(&self, name: &str) -> Option<FontDescriptor> {
        self.fonts.get(&name.to_lowercase()).cloned()
    }
}
