//! Font book: the set of font faces available to a raster render.
//!
//! Fonts are loaded by the caller before rendering and handed to the surface
//! explicitly; there is no process-wide font cache. A `FontBook` is cheap to
//! clone (faces are reference counted) and can be shared across threads for
//! batch rendering.
//!
//! Resolution follows CSS loosely: the family list is tried in order, a face
//! with the requested slant is preferred, then the nearest weight wins. If no
//! listed family is loaded the default family (or the first registered face)
//! is used, so text still renders in *some* font.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale};

use crate::error::CertaError;
use crate::style::FontStyle;
use crate::surface::FontSpec;

/// One loaded face.
#[derive(Clone)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub font: FontArc,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// A face chosen for a [`FontSpec`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFace<'a> {
    pub face: &'a FontFace,
    /// The request is slanted but the face is upright; shear when drawing.
    pub synthetic_italic: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
    default_family: Option<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn add(&mut self, family: impl Into<String>, weight: u16, style: FontStyle, font: FontArc) {
        self.faces.push(FontFace {
            family: family.into(),
            weight,
            style,
            font,
        });
    }

    /// Register a face from TTF/OTF bytes.
    pub fn add_bytes(
        &mut self,
        family: impl Into<String>,
        weight: u16,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> Result<(), CertaError> {
        let family = family.into();
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CertaError::Font(format!("failed to parse font '{}': {}", family, e)))?;
        log::debug!("registered font '{}' weight {} {}", family, weight, style);
        self.add(family, weight, style, font);
        Ok(())
    }

    /// Register a face from a font file on disk.
    pub fn load_file(
        &mut self,
        family: impl Into<String>,
        weight: u16,
        style: FontStyle,
        path: impl AsRef<Path>,
    ) -> Result<(), CertaError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.add_bytes(family, weight, style, bytes)
    }

    /// Family used when none of a request's families is loaded.
    pub fn set_default_family(&mut self, family: impl Into<String>) {
        self.default_family = Some(family.into());
    }

    pub fn resolve(&self, spec: &FontSpec) -> Option<ResolvedFace<'_>> {
        let face = family_names(&spec.family)
            .find_map(|name| self.best_in_family(name, spec))
            .or_else(|| {
                let fallback = self
                    .default_family
                    .as_deref()
                    .or_else(|| self.faces.first().map(|f| f.family.as_str()))?;
                self.best_in_family(fallback, spec)
            })?;

        Some(ResolvedFace {
            face,
            synthetic_italic: spec.style.is_slanted() && !face.style.is_slanted(),
        })
    }

    fn best_in_family(&self, family: &str, spec: &FontSpec) -> Option<&FontFace> {
        self.faces
            .iter()
            .filter(|f| f.family.eq_ignore_ascii_case(family))
            .min_by_key(|f| {
                let slant_miss = u32::from(f.style.is_slanted() != spec.style.is_slanted());
                let weight_diff = u32::from(f.weight.abs_diff(spec.weight));
                (slant_miss, weight_diff)
            })
    }
}

/// Names in a CSS family list, unquoted.
fn family_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
}

/// Scale that makes one em of `font` span `size` pixels.
///
/// `ab_glyph` scales by ascent-to-descent height; CSS font sizes are in ems.
pub fn em_scale(font: &FontArc, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(size * font.height_unscaled() / upem),
        _ => PxScale::from(size),
    }
}
