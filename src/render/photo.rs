//! Photo layer geometry: crop, fit mode and mask.
//!
//! All of it reduces to one [`Surface::draw_image`] call: the (cropped)
//! source, a destination rect derived from the fit mode, and a clip shape
//! from the mask (or the layer frame when the fit mode overflows it).

use std::borrow::Cow;

use image::RgbaImage;
use image::imageops;

use crate::error::SurfaceError;
use crate::geometry::{ClipShape, Point, Rect};
use crate::surface::{ImageDrawOptions, Surface};
use crate::template::{CropRect, FitMode, MaskConfig, MaskKind, PhotoLayerConfig};

/// Corner radius of a rounded-rect mask without an explicit radius, as a
/// fraction of the frame's shorter side.
pub const DEFAULT_MASK_RADIUS: f32 = 0.1;

/// Cut `crop` (fractions of the source size) out of `image`.
///
/// A crop that leaves no pixels is ignored.
pub fn crop_image<'a>(image: &'a RgbaImage, crop: &CropRect) -> Cow<'a, RgbaImage> {
    let (w, h) = image.dimensions();
    let frac = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

    let x0 = (frac(crop.x) * w as f32).round() as u32;
    let y0 = (frac(crop.y) * h as f32).round() as u32;
    let x1 = (frac(crop.x + crop.width) * w as f32).round() as u32;
    let y1 = (frac(crop.y + crop.height) * h as f32).round() as u32;

    if x1 <= x0 || y1 <= y0 {
        log::debug!("empty crop {:?} ignored", crop);
        return Cow::Borrowed(image);
    }
    if (x0, y0, x1, y1) == (0, 0, w, h) {
        return Cow::Borrowed(image);
    }
    Cow::Owned(imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image())
}

/// Destination of a `src_w × src_h` image in `frame`, and the clip needed
/// to keep it inside the frame.
///
/// `native_scale` converts source pixels to target pixels for
/// [`FitMode::None`].
pub fn fit_rect(frame: Rect, src_w: f32, src_h: f32, mode: FitMode, native_scale: f32) -> (Rect, Option<Rect>) {
    if !(src_w > 0.0 && src_h > 0.0) {
        return (frame, None);
    }
    let centered = |scale: f32| {
        let w = src_w * scale;
        let h = src_h * scale;
        Rect::new(
            frame.x + (frame.width - w) / 2.0,
            frame.y + (frame.height - h) / 2.0,
            w,
            h,
        )
    };
    match mode {
        FitMode::Fill => (frame, None),
        FitMode::Contain => (centered((frame.width / src_w).min(frame.height / src_h)), None),
        FitMode::Cover => (
            centered((frame.width / src_w).max(frame.height / src_h)),
            Some(frame),
        ),
        FitMode::None => {
            let scale = if native_scale.is_finite() && native_scale > 0.0 {
                native_scale
            } else {
                1.0
            };
            (
                Rect::new(frame.x, frame.y, src_w * scale, src_h * scale),
                Some(frame),
            )
        }
    }
}

/// Clip shape of a mask over `frame`. Polygon points are fractions of the frame.
pub fn mask_clip(mask: &MaskConfig, frame: Rect) -> Option<ClipShape> {
    let center = frame.center();
    match mask.kind {
        MaskKind::None => None,
        MaskKind::Circle => Some(ClipShape::Circle {
            center,
            radius: frame.width.min(frame.height) / 2.0,
        }),
        MaskKind::Ellipse => Some(ClipShape::Ellipse {
            center,
            rx: frame.width / 2.0,
            ry: frame.height / 2.0,
        }),
        MaskKind::RoundedRect => {
            let fraction = mask
                .radius
                .filter(|r| r.is_finite() && *r >= 0.0)
                .unwrap_or(DEFAULT_MASK_RADIUS);
            Some(ClipShape::RoundedRect {
                rect: frame,
                radius: fraction * frame.width.min(frame.height),
            })
        }
        MaskKind::Polygon => {
            if mask.points.len() < 3 {
                log::debug!("polygon mask with {} points ignored", mask.points.len());
                return None;
            }
            let points = mask
                .points
                .iter()
                .map(|p| Point::new(frame.x + p.x * frame.width, frame.y + p.y * frame.height))
                .collect();
            Some(ClipShape::Polygon { points })
        }
    }
}

/// Draw `image` for `layer` into `frame` on `surface`.
pub fn draw_photo<S>(
    surface: &mut S,
    layer: &PhotoLayerConfig,
    frame: Rect,
    image: &RgbaImage,
    native_scale: f32,
) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
{
    let source = match &layer.crop {
        Some(crop) => crop_image(image, crop),
        None => Cow::Borrowed(image),
    };
    let (src_w, src_h) = source.dimensions();
    let (dest, frame_clip) = fit_rect(frame, src_w as f32, src_h as f32, layer.fit_mode, native_scale);

    let clip = layer
        .mask
        .as_ref()
        .and_then(|mask| mask_clip(mask, frame))
        .or(frame_clip.map(ClipShape::Rect));

    let options = ImageDrawOptions {
        clip,
        opacity: if layer.opacity.is_finite() {
            layer.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        },
        rotation: if layer.rotation.is_finite() { layer.rotation } else { 0.0 },
        pivot: frame.center(),
    };
    surface.draw_image(&source, dest, &options)
}
