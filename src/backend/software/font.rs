//! Font storage and glyph outlining for the software context.
//!
//! Text is rendered by converting glyph outlines into a [`Path`],
//! so filled and stroked text go through the same rasterizer
//! as every other shape.

use glam::{vec2, Vec2};
use owned_ttf_parser::{AsFaceRef, Face, OutlineBuilder, OwnedFace};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::{Font, Path, TextMetrics};

slotmap::new_key_type! {
    /// Unique ID of a font in a [`FontStore`].
    pub struct FontId;
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to parse font as TTF/OTF font data")]
    Malformed,
}

/// Stores the font faces available to text drawing.
///
/// Faces are looked up by the family of the current [`Font`]. A family
/// with no registered face falls back to the first face loaded.
#[derive(Default)]
pub struct FontStore {
    faces: SlotMap<FontId, OwnedFace>,
    families: FxHashMap<String, FontId>,
    fallback: Option<FontId>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a TTF/OTF font and registers it under `family`.
    pub fn load(
        &mut self,
        family: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<FontId, FontError> {
        let face = OwnedFace::from_vec(data.into(), 0).map_err(|_| FontError::Malformed)?;
        let family = family.into();
        let id = self.faces.insert(face);
        log::info!("Loaded font '{}'", family);
        self.families.insert(family, id);
        self.fallback.get_or_insert(id);
        Ok(id)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Finds the face used to draw text in `family`.
    pub fn query(&self, family: &str) -> Option<FontId> {
        self.families.get(family).copied().or(self.fallback)
    }

    pub fn face(&self, id: FontId) -> Option<&Face<'_>> {
        self.faces.get(id).map(|face| face.as_face_ref())
    }

    pub(super) fn measure(&self, font: &Font, text: &str) -> TextMetrics {
        match self.query(&font.family).and_then(|id| self.face(id)) {
            Some(face) => {
                let scale = font_scale(face, font.size);
                TextMetrics {
                    width: advance_width(face, text) * scale,
                    font_ascent: f32::from(face.ascender()) * scale,
                    font_descent: -f32::from(face.descender()) * scale,
                }
            }
            None => TextMetrics::default(),
        }
    }

    /// Appends the outlines of `text` to `path`, with the baseline origin at
    /// `origin` and glyphs squeezed horizontally by `x_scale`.
    pub(super) fn outline(&self, font: &Font, text: &str, origin: Vec2, x_scale: f32, path: &mut Path) {
        let face = match self.query(&font.family).and_then(|id| self.face(id)) {
            Some(face) => face,
            None => return,
        };
        let scale = font_scale(face, font.size);
        let mut pen = origin;
        for c in text.chars() {
            let glyph = match face.glyph_index(c) {
                Some(glyph) => glyph,
                None => continue,
            };
            let mut builder = GlyphOutliner {
                path: &mut *path,
                origin: pen,
                scale: vec2(scale * x_scale, -scale),
            };
            face.outline_glyph(glyph, &mut builder);
            let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            pen.x += f32::from(advance) * scale * x_scale;
        }
    }
}

fn font_scale(face: &Face<'_>, size: f32) -> f32 {
    size / f32::from(face.units_per_em().max(1))
}

fn advance_width(face: &Face<'_>, text: &str) -> f32 {
    text.chars()
        .filter_map(|c| face.glyph_index(c))
        .map(|glyph| f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)))
        .sum()
}

/// Writes glyph outlines, given in font units with y up, into a path.
struct GlyphOutliner<'a> {
    path: &'a mut Path,
    origin: Vec2,
    scale: Vec2,
}

impl GlyphOutliner<'_> {
    fn point(&self, x: f32, y: f32) -> Vec2 {
        self.origin + vec2(x, y) * self.scale
    }
}

impl OutlineBuilder for GlyphOutliner<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let control = self.point(x1, y1);
        let end = self.point(x, y);
        self.path.quad_to(control, end);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let control1 = self.point(x1, y1);
        let control2 = self.point(x2, y2);
        let end = self.point(x, y);
        self.path.cubic_to(control1, control2, end);
    }

    fn close(&mut self) {
        self.path.close();
    }
}
