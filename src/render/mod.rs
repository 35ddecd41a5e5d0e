//! # Layer Compositor
//!
//! Draws one side of a certificate template onto a [`Surface`].
//!
//! ```text
//! TemplateLayoutConfig ──► layers(mode) ──► resolve % against the target
//!          │                                     │
//!   FieldValues, ImageStore                      ▼
//!                                  text ─► text::draw_block
//!                                  photo ─► photo::draw_photo
//!                                  qr ─► qr::qr_image + draw_image
//! ```
//!
//! Layers are painted back to front: image layers below `zIndex` 100, the
//! text layers, then image layers at or above 100. Percent fields resolve
//! against the surface size, so the same template renders at any
//! resolution. Font sizes, wrap widths and letter spacing are authored in
//! reference-canvas pixels and scaled by [`RenderOptions::scale_factor`].
//!
//! ## Example
//!
//! ```
//! use certa::render::{FieldValues, ImageStore, Renderer};
//! use certa::surface::RecordingSurface;
//! use certa::template::{RenderMode, TemplateLayoutConfig};
//!
//! let config = TemplateLayoutConfig::from_json(r#"{
//!     "certificate": {"textLayers": [{"id": "name", "xPercent": 0.5, "yPercent": 0.5}]},
//!     "canvas": {"width": 1000, "height": 700}
//! }"#).unwrap();
//! let images = ImageStore::new();
//! let fields = FieldValues::new().with_text("name", "Andi Budi");
//!
//! let mut surface = RecordingSurface::new(1000, 700);
//! let report = Renderer::new(&config, &images)
//!     .render(RenderMode::Certificate, &fields, &mut surface)
//!     .unwrap();
//!
//! assert_eq!(report.drawn, vec!["name".to_string()]);
//! assert_eq!(surface.texts()[0].0, "Andi Budi");
//! ```

pub mod fields;
pub mod images;
pub mod photo;
pub mod qr;

pub use fields::{CERTIFICATE_URL, FieldValue, FieldValues};
pub use images::ImageStore;

use std::collections::HashSet;

use image::RgbaImage;
use rayon::prelude::*;

use crate::color::Color;
use crate::error::CertaError;
use crate::fonts::FontBook;
use crate::geometry::{Point, Rect};
use crate::style::parse_font_weight;
use crate::surface::{FontSpec, ImageDrawOptions, RasterSurface, Surface};
use crate::template::{
    Layer, PhotoLayerConfig, PixelResolver, QrCodeLayerConfig, RenderMode, TemplateLayoutConfig,
    TextLayerConfig,
};
use crate::text::draw::DEFAULT_LINE_HEIGHT;
use crate::text::{TextBlock, TextContent, TextStyle, draw_block};

/// Per-render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Multiplier for reference-pixel sizes. Defaults to target width over
    /// reference canvas width.
    pub scale_factor: Option<f32>,
    /// Template belongs to the compact small-font family (affects the
    /// vertical micro-adjustment).
    pub compact_layout: bool,
    /// Only layers with these ids are drawn, when set.
    pub layer_filter: Option<HashSet<String>>,
    /// Fill color of raster output.
    pub background: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale_factor: None,
            compact_layout: false,
            layer_filter: None,
            background: Color::WHITE,
        }
    }
}

impl RenderOptions {
    pub fn with_scale_factor(mut self, scale: f32) -> Self {
        self.scale_factor = Some(scale);
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact_layout = compact;
        self
    }

    pub fn with_layer_filter<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_filter = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// What a render drew and skipped, by layer id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub drawn: Vec<String>,
    pub skipped: Vec<String>,
}

enum Outcome {
    Drawn,
    Skipped,
}

/// Renders layouts of one template.
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    config: &'a TemplateLayoutConfig,
    images: &'a ImageStore,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a TemplateLayoutConfig, images: &'a ImageStore) -> Self {
        Self {
            config,
            images,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Draw `mode`'s layers onto `surface`.
    ///
    /// Missing fonts, images and values degrade the output; only an image
    /// that fails to decode, a QR payload that cannot be encoded, or a
    /// surface failure is an error, and it names the layer.
    pub fn render<S>(&self, mode: RenderMode, fields: &FieldValues, surface: &mut S) -> Result<RenderReport, CertaError>
    where
        S: Surface + ?Sized,
    {
        let mut report = RenderReport::default();
        if self.config.layer_set(mode).is_none() {
            log::warn!("template has no {:?} layer set, nothing to draw", mode);
            return Ok(report);
        }

        let (width, height) = surface.size();
        let resolver = PixelResolver::new(width as f32, height as f32, self.config.canvas);
        let scale = self
            .options
            .scale_factor
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or_else(|| resolver.width_scale());
        log::debug!("rendering {:?} at {}x{} (scale {:.3})", mode, width, height, scale);

        for layer in self.config.layers(mode) {
            let id = layer.id();
            if let Some(filter) = &self.options.layer_filter
                && !filter.contains(id)
            {
                log::debug!("layer '{}': not in the layer filter", id);
                report.skipped.push(id.to_string());
                continue;
            }
            if !layer.is_visible() {
                log::debug!("layer '{}': hidden", id);
                report.skipped.push(id.to_string());
                continue;
            }

            let outcome = match layer {
                Layer::Text(l) => self.draw_text(l, fields, &resolver, scale, surface)?,
                Layer::Photo(l) => self.draw_photo(l, fields, &resolver, scale, surface)?,
                Layer::QrCode(l) => self.draw_qr(l, fields, &resolver, surface)?,
            };
            match outcome {
                Outcome::Drawn => report.drawn.push(id.to_string()),
                Outcome::Skipped => report.skipped.push(id.to_string()),
            }
        }
        Ok(report)
    }

    /// Render onto a fresh raster surface.
    pub fn render_image(
        &self,
        mode: RenderMode,
        fields: &FieldValues,
        fonts: &FontBook,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, CertaError> {
        let mut surface = RasterSurface::new(width, height, fonts, self.options.background);
        self.render(mode, fields, &mut surface)?;
        Ok(surface.into_image())
    }

    /// Render onto a fresh raster surface and encode it as PNG.
    pub fn render_png(
        &self,
        mode: RenderMode,
        fields: &FieldValues,
        fonts: &FontBook,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, CertaError> {
        let mut surface = RasterSurface::new(width, height, fonts, self.options.background);
        self.render(mode, fields, &mut surface)?;
        surface.encode_png()
    }

    /// Render one PNG per field map in parallel.
    ///
    /// Results keep the input order; a failed certificate does not affect
    /// the others.
    pub fn render_batch(
        &self,
        mode: RenderMode,
        batch: &[FieldValues],
        fonts: &FontBook,
        width: u32,
        height: u32,
    ) -> Vec<Result<Vec<u8>, CertaError>> {
        batch
            .par_iter()
            .map(|fields| self.render_png(mode, fields, fonts, width, height))
            .collect()
    }

    fn draw_text<S>(
        &self,
        layer: &TextLayerConfig,
        fields: &FieldValues,
        resolver: &PixelResolver,
        scale: f32,
        surface: &mut S,
    ) -> Result<Outcome, CertaError>
    where
        S: Surface + ?Sized,
    {
        let external = if layer.use_default_text {
            None
        } else {
            fields.text(&layer.id)
        };

        // Stored rich text always takes the span path, even as a single
        // span, so its slant never comes from the layer.
        let rich = layer.stored_rich_text();
        let content = match (external, rich) {
            (Some(value), _) => TextContent::Plain(value),
            (None, Some(text)) => TextContent::Rich {
                text,
                scale_factor: scale,
            },
            (None, None) => TextContent::Plain(layer.default_text.as_deref().unwrap_or("")),
        };

        if content.plain_text().trim().is_empty() {
            log::debug!("layer '{}': empty value", layer.id);
            return Ok(Outcome::Skipped);
        }

        let style = TextStyle {
            font: FontSpec {
                family: layer.font_family.clone(),
                weight: parse_font_weight(&layer.font_weight),
                style: layer.font_style.unwrap_or_default(),
                size: layer.font_size * scale,
            },
            color: Color::parse_or_black(&layer.color),
            align: layer.text_align.unwrap_or_default(),
            line_height: layer.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
            letter_spacing: layer
                .letter_spacing
                .filter(|s| s.is_finite())
                .map(|s| s * scale)
                .unwrap_or(0.0),
            max_width: layer.max_width.map(|w| w * scale),
            decoration: layer.text_decoration.unwrap_or_default(),
        };
        let anchor = Point::new(
            resolver.x(layer.x_percent, layer.x),
            resolver.y(layer.y_percent, layer.y),
        );

        let mut block = TextBlock::new(&layer.id, anchor, style, content);
        block.band_size = layer.font_size;
        block.compact_layout = self.options.compact_layout;

        draw_block(surface, &block).map_err(|e| CertaError::surface(&layer.id, e))?;
        Ok(Outcome::Drawn)
    }

    fn draw_photo<S>(
        &self,
        layer: &PhotoLayerConfig,
        fields: &FieldValues,
        resolver: &PixelResolver,
        scale: f32,
        surface: &mut S,
    ) -> Result<Outcome, CertaError>
    where
        S: Surface + ?Sized,
    {
        let src = fields.image_src(&layer.id).unwrap_or(&layer.src);
        if src.is_empty() {
            log::debug!("layer '{}': no image source", layer.id);
            return Ok(Outcome::Skipped);
        }
        let Some(image) = self.images.image(&layer.id, src)? else {
            log::warn!("layer '{}': image '{}' was not fetched, skipped", layer.id, src);
            return Ok(Outcome::Skipped);
        };

        let frame = Rect::new(
            resolver.x(layer.x_percent, layer.x),
            resolver.y(layer.y_percent, layer.y),
            resolver.x(layer.width_percent, layer.width),
            resolver.y(layer.height_percent, layer.height),
        );
        if !frame.is_drawable() {
            log::debug!("layer '{}': empty frame {:?}", layer.id, frame);
            return Ok(Outcome::Skipped);
        }

        photo::draw_photo(surface, layer, frame, &image, scale)
            .map_err(|e| CertaError::surface(&layer.id, e))?;
        Ok(Outcome::Drawn)
    }

    fn draw_qr<S>(
        &self,
        layer: &QrCodeLayerConfig,
        fields: &FieldValues,
        resolver: &PixelResolver,
        surface: &mut S,
    ) -> Result<Outcome, CertaError>
    where
        S: Surface + ?Sized,
    {
        let data = qr::substitute_placeholders(&layer.qr_data, |key| fields.placeholder(key));
        if data.trim().is_empty() {
            log::debug!("layer '{}': empty QR data", layer.id);
            return Ok(Outcome::Skipped);
        }

        let mut dest = Rect::new(
            resolver.x(layer.x_percent, layer.x),
            resolver.y(layer.y_percent, layer.y),
            resolver.x(layer.width_percent, layer.width),
            resolver.y(layer.height_percent, layer.height),
        );
        if !dest.is_drawable() {
            log::debug!("layer '{}': empty frame {:?}", layer.id, dest);
            return Ok(Outcome::Skipped);
        }
        if layer.maintain_aspect_ratio {
            dest = square_in(dest);
        }

        let style = qr::QrStyle {
            dark: Color::parse_or_black(&layer.dark_color),
            light: Color::parse(&layer.light_color).unwrap_or(Color::WHITE),
            margin: layer.margin,
        };
        let image = qr::qr_image(
            &data,
            layer.error_correction_level,
            &style,
            dest.width.max(dest.height),
        )
        .map_err(|e| CertaError::QrCode {
            layer_id: layer.id.clone(),
            reason: e.to_string(),
        })?;

        let options = ImageDrawOptions {
            clip: None,
            opacity: if layer.opacity.is_finite() {
                layer.opacity.clamp(0.0, 1.0)
            } else {
                1.0
            },
            rotation: if layer.rotation.is_finite() { layer.rotation } else { 0.0 },
            pivot: dest.center(),
        };
        surface
            .draw_image(&image, dest, &options)
            .map_err(|e| CertaError::surface(&layer.id, e))?;
        Ok(Outcome::Drawn)
    }
}

/// Largest square centered in `rect`.
fn square_in(rect: Rect) -> Rect {
    let side = rect.width.min(rect.height);
    Rect::new(
        rect.x + (rect.width - side) / 2.0,
        rect.y + (rect.height - side) / 2.0,
        side,
        side,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontStyle;
    use crate::surface::{DrawOp, RecordingSurface};

    fn config(json: &str) -> TemplateLayoutConfig {
        TemplateLayoutConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_square_in() {
        assert_eq!(square_in(Rect::new(0.0, 0.0, 100.0, 60.0)), Rect::new(20.0, 0.0, 60.0, 60.0));
    }

    #[test]
    fn test_single_span_rich_text_does_not_inherit_layer_slant() {
        let cfg = config(
            r#"{"certificate": {"textLayers": [
                {"id": "title", "fontStyle": "italic", "xPercent": 0.5, "yPercent": 0.5,
                 "richText": [{"text": "Hello"}]}
            ]}, "canvas": {"width": 400, "height": 200}}"#,
        );
        let images = ImageStore::new();
        let mut s = RecordingSurface::new(400, 200);
        Renderer::new(&cfg, &images)
            .render(RenderMode::Certificate, &FieldValues::new(), &mut s)
            .unwrap();

        let mut font = None;
        let mut drawn_with = None;
        for op in s.ops() {
            match op {
                DrawOp::SetFont(f) => font = Some(f.style),
                DrawOp::FillText { text, .. } if text == "Hello" => drawn_with = font,
                _ => {}
            }
        }
        assert_eq!(drawn_with, Some(FontStyle::Normal));
    }

    #[test]
    fn test_plain_value_keeps_layer_slant() {
        let cfg = config(
            r#"{"certificate": {"textLayers": [
                {"id": "name", "fontStyle": "italic", "richText": [{"text": "Nama"}]}
            ]}}"#,
        );
        let images = ImageStore::new();
        let fields = FieldValues::new().with_text("name", "Andi");
        let mut s = RecordingSurface::new(400, 200);
        Renderer::new(&cfg, &images)
            .render(RenderMode::Certificate, &fields, &mut s)
            .unwrap();
        assert!(matches!(&s.ops()[0], DrawOp::SetFont(f) if f.style == FontStyle::Italic));
        assert_eq!(s.texts()[0].0, "Andi");
    }

    #[test]
    fn test_external_value_wins_unless_default_text_forced() {
        let cfg = config(
            r#"{"certificate": {"textLayers": [
                {"id": "name", "defaultText": "Nama Peserta", "xPercent": 0.5, "yPercent": 0.5},
                {"id": "title", "defaultText": "SERTIFIKAT", "useDefaultText": true}
            ]}, "canvas": {"width": 800, "height": 600}}"#,
        );
        let images = ImageStore::new();
        let fields = FieldValues::new()
            .with_text("name", "Andi")
            .with_text("title", "ignored");
        let mut s = RecordingSurface::new(800, 600);
        Renderer::new(&cfg, &images)
            .render(RenderMode::Certificate, &fields, &mut s)
            .unwrap();
        let texts: Vec<&str> = s.texts().iter().map(|t| t.0).collect();
        assert_eq!(texts, vec!["Andi", "SERTIFIKAT"]);
    }

    #[test]
    fn test_scale_applies_to_font_size() {
        let cfg = config(
            r#"{"certificate": {"textLayers": [{"id": "title", "defaultText": "Hi", "fontSize": 30}]},
                "canvas": {"width": 500, "height": 500}}"#,
        );
        let images = ImageStore::new();
        let mut s = RecordingSurface::new(1000, 1000);
        Renderer::new(&cfg, &images)
            .render(RenderMode::Certificate, &FieldValues::new(), &mut s)
            .unwrap();
        assert!(matches!(&s.ops()[0], DrawOp::SetFont(f) if f.size == 60.0));
    }

    #[test]
    fn test_layer_filter_and_visibility() {
        let cfg = config(
            r#"{"certificate": {"textLayers": [
                {"id": "a", "defaultText": "A"},
                {"id": "b", "defaultText": "B"},
                {"id": "c", "defaultText": "C", "visible": false},
                {"id": "d", "defaultText": "  "}
            ]}}"#,
        );
        let images = ImageStore::new();
        let renderer = Renderer::new(&cfg, &images)
            .with_options(RenderOptions::default().with_layer_filter(["a", "c", "d"]));
        let mut s = RecordingSurface::new(100, 100);
        let report = renderer
            .render(RenderMode::Certificate, &FieldValues::new(), &mut s)
            .unwrap();
        assert_eq!(report.drawn, vec!["a"]);
        assert_eq!(report.skipped, vec!["b", "c", "d"]);
    }
}
