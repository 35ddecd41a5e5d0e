//! # Drawing Surfaces
//!
//! The layout engine and compositor never touch pixels directly. They talk
//! to a [`Surface`]: a minimal 2D drawing API (set font, measure, fill text,
//! fill rect, draw image) that can be backed by a software rasterizer, a
//! vector recorder, or any native graphics library.
//!
//! | Surface | Output |
//! |---------|--------|
//! | [`RasterSurface`] | RGBA image (PNG via [`RasterSurface::encode_png`]) |
//! | [`RecordingSurface`] | List of [`DrawOp`]s with deterministic metrics |
//!
//! ## Text coordinates
//!
//! `fill_text` positions text by its alphabetic baseline. Alignment is
//! relative to `x`: left text starts at `x`, centered text is centered on
//! it, right text ends at it.

pub mod raster;
pub mod record;

pub use raster::RasterSurface;
pub use record::{DrawOp, RecordingSurface};

use image::RgbaImage;
use serde::Serialize;

use crate::color::Color;
use crate::error::SurfaceError;
use crate::geometry::{ClipShape, Point, Rect};
use crate::style::{FontStyle, TextAlign};

/// A concrete font request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    /// CSS-style family list, e.g. `"Montserrat, sans-serif"`.
    pub family: String,
    /// Numeric weight, 100..=900.
    pub weight: u16,
    pub style: FontStyle,
    /// Em size in pixels.
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            weight: 400,
            style: FontStyle::Normal,
            size: 16.0,
        }
    }
}

/// Measured extent of a string in the current font.
///
/// `ascent` and `descent` are distances above and below the baseline, both
/// positive for a well-behaved font. A surface that cannot produce real
/// metrics (font not loaded) reports zero or NaN; callers apply the
/// fallback in [`crate::text::metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Text measurement against the current font.
pub trait TextMeasurer {
    fn set_font(&mut self, font: &FontSpec);

    fn measure_text(&self, text: &str) -> TextMetrics;
}

/// Options for [`Surface::draw_image`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDrawOptions {
    /// Clip region in unrotated layer space.
    pub clip: Option<ClipShape>,
    /// 0..1, multiplied into the image's alpha.
    pub opacity: f32,
    /// Degrees clockwise around `pivot`.
    pub rotation: f32,
    pub pivot: Point,
}

impl Default for ImageDrawOptions {
    fn default() -> Self {
        Self {
            clip: None,
            opacity: 1.0,
            rotation: 0.0,
            pivot: Point::default(),
        }
    }
}

/// A 2D drawing target.
pub trait Surface: TextMeasurer {
    /// Pixel size of the render target.
    fn size(&self) -> (u32, u32);

    /// Draw `text` in the current font with its baseline at `y`.
    fn fill_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        align: TextAlign,
    ) -> Result<(), SurfaceError>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), SurfaceError>;

    /// Draw `image` scaled into `dest`, then clipped, faded and rotated
    /// according to `options`.
    fn draw_image(
        &mut self,
        image: &RgbaImage,
        dest: Rect,
        options: &ImageDrawOptions,
    ) -> Result<(), SurfaceError>;
}

/// Left edge of a run of `width` pixels aligned at `x`.
pub fn aligned_start(x: f32, width: f32, align: TextAlign) -> f32 {
    match align.effective() {
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
        _ => x,
    }
}
