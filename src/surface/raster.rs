//! Software raster surface.
//!
//! Draws onto an RGBA buffer with straight-alpha source-over compositing.
//! Glyphs are rasterized with `ab_glyph` (anti-aliased coverage, like the
//! TTF path of a preview renderer); images are bilinearly resampled per
//! destination pixel, which makes clip shapes and rotation a matter of
//! inverse-mapping each pixel back into layer space.

use std::io::Cursor;

use ab_glyph::{Font, ScaleFont, point};
use image::{ImageFormat, Rgba, RgbaImage};

use super::{FontSpec, ImageDrawOptions, Surface, TextMeasurer, TextMetrics, aligned_start};
use crate::color::Color;
use crate::error::{CertaError, SurfaceError};
use crate::fonts::{FontBook, ResolvedFace, em_scale};
use crate::geometry::{Point, Rect};
use crate::style::TextAlign;

/// Horizontal shear for synthesized italics (x offset per pixel above baseline).
const SYNTHETIC_ITALIC_SHEAR: f32 = 0.2;

/// Average advance, in ems, assumed when no font face is available.
const MISSING_FONT_ADVANCE_EM: f32 = 0.6;

pub struct RasterSurface<'f> {
    canvas: RgbaImage,
    fonts: &'f FontBook,
    font: FontSpec,
}

impl<'f> RasterSurface<'f> {
    /// Create a surface filled with `background`.
    pub fn new(width: u32, height: u32, fonts: &'f FontBook, background: Color) -> Self {
        let bg = Rgba([background.r, background.g, background.b, background.a]);
        Self {
            canvas: RgbaImage::from_pixel(width, height, bg),
            fonts,
            font: FontSpec::default(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    /// Encode the current canvas as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, CertaError> {
        let mut out = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| CertaError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    fn face(&self) -> Option<ResolvedFace<'f>> {
        self.fonts.resolve(&self.font)
    }

    /// Blend `color` at `coverage` into the pixel at (x, y), ignoring out-of-bounds.
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.canvas.width() as i64 || y >= self.canvas.height() as i64 {
            return;
        }
        let src = [
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0),
        ];
        let dst = self.canvas.get_pixel_mut(x as u32, y as u32);
        *dst = blend_over(*dst, src);
    }
}

/// Source-over with straight alpha. `src` channels are 0..1.
fn blend_over(dst: Rgba<u8>, src: [f32; 4]) -> Rgba<u8> {
    let sa = src[3];
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let dc = dst[i] as f32 / 255.0;
        let c = (src[i] * sa + dc * da * (1.0 - sa)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Bilinear sample at continuous image coordinates (pixel centers at +0.5).
fn sample_bilinear(img: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let w = img.width() as i64;
    let h = img.height() as i64;
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let px = |x: i64, y: i64| -> [f32; 4] {
        let p = img.get_pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    };
    let (a, b, c, d) = (px(x0, y0), px(x0 + 1, y0), px(x0, y0 + 1), px(x0 + 1, y0 + 1));

    let mut out = [0.0f32; 4];
    for i in 0..4 {
        let top = a[i] + (b[i] - a[i]) * tx;
        let bottom = c[i] + (d[i] - c[i]) * tx;
        out[i] = (top + (bottom - top) * ty) / 255.0;
    }
    out
}

impl TextMeasurer for RasterSurface<'_> {
    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        let size = self.font.size;
        let Some(resolved) = self.face() else {
            return TextMetrics {
                width: text.chars().count() as f32 * size * MISSING_FONT_ADVANCE_EM,
                ascent: 0.0,
                descent: 0.0,
            };
        };

        let font = &resolved.face.font;
        let scaled = font.as_scaled(em_scale(font, size));
        let mut width = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }

        TextMetrics {
            width,
            ascent: scaled.ascent(),
            descent: -scaled.descent(),
        }
    }
}

impl Surface for RasterSurface<'_> {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        align: TextAlign,
    ) -> Result<(), SurfaceError> {
        if text.is_empty() || color.a == 0 {
            return Ok(());
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(SurfaceError::InvalidGeometry(format!(
                "text position ({}, {})",
                x, y
            )));
        }
        let Some(resolved) = self.face() else {
            log::debug!("no font face for '{}', text not drawn", self.font.family);
            return Ok(());
        };

        let width = self.measure_text(text).width;
        let start_x = aligned_start(x, width, align);

        let font = resolved.face.font.clone();
        let scale = em_scale(&font, self.font.size);
        let scaled = font.as_scaled(scale);
        let shear = if resolved.synthetic_italic {
            SYNTHETIC_ITALIC_SHEAR
        } else {
            0.0
        };

        let mut caret = start_x;
        let mut prev = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, y));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let mut coverage_px = Vec::new();
            outlined.draw(|gx, gy, coverage| {
                coverage_px.push((gx, gy, coverage));
            });
            for (gx, gy, coverage) in coverage_px {
                let py = bounds.min.y + gy as f32;
                let offset = (y - py) * shear;
                let px = (bounds.min.x + gx as f32 + offset).floor() as i64;
                self.blend(px, py.floor() as i64, color, coverage);
            }
        }
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), SurfaceError> {
        if !rect.is_drawable() {
            return Ok(());
        }
        let (w, h) = self.size();
        let x0 = rect.x.round().max(0.0) as i64;
        let y0 = rect.y.round().max(0.0) as i64;
        // Always cover at least one row so hairline decorations stay visible.
        let x1 = (rect.right().round() as i64).max(x0 + 1).min(w as i64);
        let y1 = (rect.bottom().round() as i64).max(y0 + 1).min(h as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        dest: Rect,
        options: &ImageDrawOptions,
    ) -> Result<(), SurfaceError> {
        if !dest.is_drawable() {
            return Err(SurfaceError::InvalidGeometry(format!("destination {:?}", dest)));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(SurfaceError::InvalidGeometry("empty image".into()));
        }
        let opacity = if options.opacity.is_finite() {
            options.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if opacity == 0.0 {
            return Ok(());
        }

        let rotation = if options.rotation.is_finite() {
            options.rotation
        } else {
            0.0
        };
        let bounds = dest.rotated_bounds(options.pivot, rotation);
        let (w, h) = self.size();
        let x0 = bounds.x.floor().max(0.0) as i64;
        let y0 = bounds.y.floor().max(0.0) as i64;
        let x1 = (bounds.right().ceil() as i64).min(w as i64);
        let y1 = (bounds.bottom().ceil() as i64).min(h as i64);

        let sx = image.width() as f32 / dest.width;
        let sy = image.height() as f32 / dest.height;

        for py in y0..y1 {
            for px in x0..x1 {
                // Map the pixel center back into unrotated layer space.
                let local = Point::new(px as f32 + 0.5, py as f32 + 0.5)
                    .rotated(options.pivot, -rotation);
                if !dest.contains(local) {
                    continue;
                }
                if let Some(clip) = &options.clip
                    && !clip.contains(local)
                {
                    continue;
                }
                let mut src = sample_bilinear(image, (local.x - dest.x) * sx, (local.y - dest.y) * sy);
                src[3] *= opacity;
                let dst = self.canvas.get_pixel_mut(px as u32, py as u32);
                *dst = blend_over(*dst, src);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ClipShape;

    fn surface(fonts: &FontBook) -> RasterSurface<'_> {
        RasterSurface::new(20, 20, fonts, Color::WHITE)
    }

    #[test]
    fn test_blend_over_opaque_and_half() {
        let white = Rgba([255, 255, 255, 255]);
        assert_eq!(blend_over(white, [0.0, 0.0, 0.0, 1.0]), Rgba([0, 0, 0, 255]));
        assert_eq!(blend_over(white, [0.0, 0.0, 0.0, 0.5]), Rgba([128, 128, 128, 255]));
        assert_eq!(blend_over(white, [0.0, 0.0, 0.0, 0.0]), white);
    }

    #[test]
    fn test_fill_rect() {
        let fonts = FontBook::new();
        let mut s = surface(&fonts);
        s.fill_rect(Rect::new(2.0, 2.0, 4.0, 3.0), Color::BLACK).unwrap();
        assert_eq!(s.image().get_pixel(3, 3), &Rgba([0, 0, 0, 255]));
        assert_eq!(s.image().get_pixel(7, 3), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_image_scaled_and_clipped() {
        let fonts = FontBook::new();
        let mut s = surface(&fonts);
        let red = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        let dest = Rect::new(0.0, 0.0, 20.0, 20.0);
        let options = ImageDrawOptions {
            clip: Some(ClipShape::Circle {
                center: dest.center(),
                radius: 10.0,
            }),
            ..Default::default()
        };
        s.draw_image(&red, dest, &options).unwrap();
        assert_eq!(s.image().get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(s.image().get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_image_opacity() {
        let fonts = FontBook::new();
        let mut s = surface(&fonts);
        let black = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let options = ImageDrawOptions {
            opacity: 0.5,
            ..Default::default()
        };
        s.draw_image(&black, Rect::new(0.0, 0.0, 20.0, 20.0), &options).unwrap();
        assert_eq!(s.image().get_pixel(5, 5), &Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_draw_image_rotated_quarter_turn() {
        let fonts = FontBook::new();
        let mut s = surface(&fonts);
        // Left half red, right half blue.
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let dest = Rect::new(0.0, 0.0, 20.0, 20.0);
        let options = ImageDrawOptions {
            rotation: 90.0,
            pivot: dest.center(),
            ..Default::default()
        };
        s.draw_image(&img, dest, &options).unwrap();
        // After a clockwise quarter turn the left half ends up on top.
        assert_eq!(s.image().get_pixel(10, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(s.image().get_pixel(10, 18), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_missing_font_measures_heuristically_and_draws_nothing() {
        let fonts = FontBook::new();
        let mut s = surface(&fonts);
        s.set_font(&FontSpec {
            size: 10.0,
            ..Default::default()
        });
        let m = s.measure_text("abc");
        assert_eq!(m.width, 18.0);
        assert_eq!(m.ascent, 0.0);
        s.fill_text("abc", 0.0, 10.0, Color::BLACK, TextAlign::Left).unwrap();
        assert!(s.image().pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_encode_png_signature() {
        let fonts = FontBook::new();
        let png = surface(&fonts).encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
