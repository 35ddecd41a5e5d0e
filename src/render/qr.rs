//! QR code layers: placeholder substitution and matrix rasterization.

use image::{Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::color::Color;
use crate::template::ErrorCorrectionLevel;

/// Replace every `{{KEY}}` in `data` with `lookup(KEY)`.
///
/// Keys are trimmed. Tokens with no value are removed so no `{{...}}` ends
/// up encoded in a QR code. Substituted values are not scanned again.
pub fn substitute_placeholders<'v, F>(data: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(data.len());
    let mut rest = data;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..open]);
        let key = rest[open + 2..open + 2 + close].trim();
        match lookup(key) {
            Some(value) => out.push_str(value),
            None => log::warn!("no value for placeholder '{{{{{}}}}}', removed", key),
        }
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    out
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}

/// Colors and quiet zone of a rendered code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrStyle {
    pub dark: Color,
    pub light: Color,
    /// Quiet zone width in modules.
    pub margin: u32,
}

/// Upper bound on the side of a rasterized code, in pixels.
pub const MAX_QR_SIDE: u32 = 8192;

/// Rasterize `data` with at least `min_size` pixels per side.
///
/// Modules are whole pixels, so the image is drawn downscaled slightly
/// rather than blurred up from one pixel per module. The quiet zone is
/// capped at the code's own width and the side at [`MAX_QR_SIDE`].
pub fn qr_image(
    data: &str,
    level: ErrorCorrectionLevel,
    style: &QrStyle,
    min_size: f32,
) -> Result<RgbaImage, qrcode::types::QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level(level))?;
    let modules = code.width() as u32;
    let margin = style.margin.min(modules);
    if margin < style.margin {
        log::warn!("QR margin {} capped at {} modules", style.margin, margin);
    }
    let total = modules + 2 * margin;

    let wanted = if min_size.is_finite() { min_size.max(1.0) } else { 1.0 };
    let max_module_px = (MAX_QR_SIDE / total).max(1);
    let module_px = ((wanted / total as f32).ceil() as u32).clamp(1, max_module_px);
    let side = total * module_px;

    let dark = Rgba([style.dark.r, style.dark.g, style.dark.b, style.dark.a]);
    let light = Rgba([style.light.r, style.light.g, style.light.b, style.light.a]);
    let mut img = RgbaImage::from_pixel(side, side, light);

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            let x0 = (qx + margin) * module_px;
            let y0 = (qy + margin) * module_px;
            for y in y0..y0 + module_px {
                for x in x0..x0 + module_px {
                    img.put_pixel(x, y, dark);
                }
            }
        }
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> QrStyle {
        QrStyle {
            dark: Color::BLACK,
            light: Color::WHITE,
            margin: 1,
        }
    }

    #[test]
    fn test_certificate_url_substitution() {
        let out = substitute_placeholders("https://x/{{CERTIFICATE_URL}}", |key| {
            (key == "CERTIFICATE_URL").then_some("verify/abc-123")
        });
        assert_eq!(out, "https://x/verify/abc-123");
    }

    #[test]
    fn test_unknown_placeholders_are_removed() {
        let out = substitute_placeholders("a{{ MISSING }}b{{ID}}c", |key| (key == "ID").then_some("7"));
        assert_eq!(out, "ab7c");
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = substitute_placeholders("{{A}}", |_| Some("{{B}}"));
        assert_eq!(out, "{{B}}");
    }

    #[test]
    fn test_unterminated_token_is_kept() {
        assert_eq!(substitute_placeholders("x{{y", |_| None), "x{{y");
        assert_eq!(substitute_placeholders("", |_| None), "");
    }

    #[test]
    fn test_qr_image_size_and_finder_pattern() {
        let img = qr_image("https://example.invalid", ErrorCorrectionLevel::M, &style(), 100.0).unwrap();
        let side = img.width();
        assert_eq!(side, img.height());
        assert!(side >= 100);

        let code = QrCode::with_error_correction_level(b"https://example.invalid", EcLevel::M).unwrap();
        let module_px = side / (code.width() as u32 + 2);
        // Quiet zone is light; the finder pattern starts one module in.
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        let finder = module_px + module_px / 2;
        assert_eq!(img.get_pixel(finder, finder), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_huge_margin_and_size_are_bounded() {
        let wide = QrStyle {
            margin: 3_000_000_000,
            ..style()
        };
        // Version 1 is 21 modules; the margin is capped at 21 on each side.
        let img = qr_image("x", ErrorCorrectionLevel::L, &wide, 100.0).unwrap();
        assert_eq!(img.dimensions(), (126, 126));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));

        let img = qr_image("x", ErrorCorrectionLevel::L, &style(), f32::MAX).unwrap();
        assert!(img.width() <= MAX_QR_SIDE);
    }

    #[test]
    fn test_custom_colors() {
        let style = QrStyle {
            dark: Color::rgb(0, 0, 128),
            light: Color::TRANSPARENT,
            margin: 0,
        };
        let img = qr_image("x", ErrorCorrectionLevel::L, &style, 21.0).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 128, 255]));
    }
}
