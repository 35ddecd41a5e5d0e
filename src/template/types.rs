//! Layer config types for the template layout model.
//!
//! All types derive `Serialize + Deserialize` in the camelCase JSON shape the
//! template editor persists, so a stored layout deserializes directly.
//!
//! Positions come in two forms: a fraction of the canvas (`xPercent`, 0..1)
//! and an absolute pixel value on the reference canvas (`x`). The fraction is
//! primary; the pixel value is only used when the fraction is absent.

use serde::{Deserialize, Serialize};

use crate::rich_text::{RichText, SpanStyle};
use crate::style::{FontStyle, TextAlign, TextDecoration, keyword_enum};

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    16.0
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_font_weight() -> String {
    "normal".to_string()
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_qr_dark() -> String {
    "#000000".to_string()
}

fn default_qr_light() -> String {
    "#ffffff".to_string()
}

fn default_qr_margin() -> u32 {
    1
}

/// Reference resolution all percentages were authored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    /// A4 landscape at 96 DPI.
    fn default() -> Self {
        Self {
            width: 1123.0,
            height: 794.0,
        }
    }
}

// ============================================================================
// TEXT LAYERS
// ============================================================================

/// A positioned text field on the certificate.
///
/// `id` doubles as the semantic field key (`name`, `certificate_no`,
/// `issue_date`, or a custom id) used to look up the value to render, and
/// selects a few layer-specific layout rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayerConfig {
    pub id: String,
    /// Anchor x in reference pixels (fallback for `x_percent`).
    #[serde(default)]
    pub x: f32,
    /// Anchor y in reference pixels (fallback for `y_percent`).
    #[serde(default)]
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f32>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    /// Extra advance after each character, in reference pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    /// Line height multiplier (default 1.2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Wrap width in reference pixels; unset or ≤ 0 means no wrapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<RichText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_text: Option<String>,
    /// Render the layer's own text even when a field value is supplied.
    #[serde(default)]
    pub use_default_text: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl TextLayerConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            x_percent: None,
            y_percent: None,
            font_size: default_font_size(),
            color: default_text_color(),
            font_weight: default_font_weight(),
            font_family: default_font_family(),
            font_style: None,
            text_decoration: None,
            letter_spacing: None,
            line_height: None,
            max_width: None,
            text_align: None,
            rich_text: None,
            default_text: None,
            use_default_text: false,
            visible: true,
        }
    }

    /// The layer's defaults expressed as a span style.
    pub fn base_style(&self) -> SpanStyle {
        SpanStyle {
            font_weight: Some(self.font_weight.clone()),
            font_family: Some(self.font_family.clone()),
            font_size: Some(self.font_size),
            color: Some(self.color.clone()),
            text_align: self.text_align,
            font_style: None,
        }
    }

    /// Stored rich text with at least one non-empty span.
    pub fn stored_rich_text(&self) -> Option<&RichText> {
        self.rich_text.as_ref().filter(|rich| !rich.is_empty())
    }

    /// The layer's own content: `rich_text`, else synthesized from `default_text`.
    pub fn own_rich_text(&self) -> RichText {
        match self.stored_rich_text() {
            Some(rich) => rich.clone(),
            None => RichText::from_plain(self.default_text.as_deref().unwrap_or(""), &self.base_style()),
        }
    }
}

// ============================================================================
// PHOTO LAYERS
// ============================================================================

keyword_enum! {
    /// What a photo layer depicts. Informational; rendering is identical.
    pub enum PhotoKind {
        Photo => ["photo"],
        Logo => ["logo"],
        Signature => ["signature"],
        Decoration => ["decoration"],
    }
    default = Photo;
}

keyword_enum! {
    /// How source pixels map into the destination rect.
    pub enum FitMode {
        /// Letterbox, preserving aspect ratio.
        Contain => ["contain"],
        /// Fill the rect, cropping the overflow.
        Cover => ["cover"],
        /// Stretch to the rect.
        Fill => ["fill"],
        /// Native size, anchored top-left, clipped to the rect.
        None => ["none"],
    }
    default = Contain;
}

keyword_enum! {
    /// Clip shape applied before drawing a photo.
    pub enum MaskKind {
        None => ["none"],
        Circle => ["circle"],
        Ellipse => ["ellipse"],
        RoundedRect => ["roundedRect", "rounded-rect", "rounded_rect", "rounded"],
        Polygon => ["polygon"],
    }
    default = None;
}

/// Source crop, as fractions (0..1) of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A polygon vertex as fractions (0..1) of the layer rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    #[serde(rename = "type", default)]
    pub kind: MaskKind,
    /// Corner radius for `roundedRect`, as a fraction of the shorter side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Vertices for `polygon`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<MaskPoint>,
}

/// An image placed on the certificate (photo, logo, signature, decoration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoLayerConfig {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: PhotoKind,
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_percent: Option<f32>,
    /// ≥ 100 paints above text, < 100 below.
    #[serde(default)]
    pub z_index: i32,
    #[serde(default)]
    pub fit_mode: FitMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<MaskConfig>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Degrees, -180..180, around the rect center.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_true")]
    pub maintain_aspect_ratio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<f32>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl PhotoLayerConfig {
    pub fn new(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: PhotoKind::Photo,
            src: src.into(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            x_percent: None,
            y_percent: None,
            width_percent: None,
            height_percent: None,
            z_index: 0,
            fit_mode: FitMode::Contain,
            crop: None,
            mask: None,
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio: true,
            original_width: None,
            original_height: None,
            visible: true,
        }
    }
}

// ============================================================================
// QR CODE LAYERS
// ============================================================================

keyword_enum! {
    /// QR error correction level.
    pub enum ErrorCorrectionLevel {
        L => ["l", "low"],
        M => ["m", "medium"],
        Q => ["q", "quartile"],
        H => ["h", "high"],
    }
    default = M;
}

/// A QR code whose payload may reference per-certificate placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeLayerConfig {
    pub id: String,
    /// Payload; `{{CERTIFICATE_URL}}` and other `{{KEY}}` tokens are substituted.
    #[serde(default)]
    pub qr_data: String,
    #[serde(default)]
    pub error_correction_level: ErrorCorrectionLevel,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_percent: Option<f32>,
    #[serde(default = "default_qr_dark")]
    pub dark_color: String,
    #[serde(default = "default_qr_light")]
    pub light_color: String,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_true")]
    pub maintain_aspect_ratio: bool,
    /// Quiet zone, in modules.
    #[serde(default = "default_qr_margin")]
    pub margin: u32,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl QrCodeLayerConfig {
    pub fn new(id: impl Into<String>, qr_data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            qr_data: qr_data.into(),
            error_correction_level: ErrorCorrectionLevel::M,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            x_percent: None,
            y_percent: None,
            width_percent: None,
            height_percent: None,
            dark_color: default_qr_dark(),
            light_color: default_qr_light(),
            z_index: 0,
            opacity: 1.0,
            rotation: 0.0,
            maintain_aspect_ratio: true,
            margin: default_qr_margin(),
            visible: true,
        }
    }
}

// ============================================================================
// LAYER SETS
// ============================================================================

/// The layers of one side (certificate or score) of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSet {
    #[serde(default)]
    pub text_layers: Vec<TextLayerConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_layers: Vec<PhotoLayerConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qr_layers: Vec<QrCodeLayerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::TextSpan;

    #[test]
    fn test_text_layer_defaults_from_json() {
        let layer: TextLayerConfig =
            serde_json::from_str(r#"{"id":"name","xPercent":0.5,"yPercent":0.4,"fontSize":32}"#)
                .unwrap();
        assert!(layer.visible);
        assert!(!layer.use_default_text);
        assert_eq!(layer.x_percent, Some(0.5));
        assert_eq!(layer.font_size, 32.0);
        assert_eq!(layer.color, "#000000");
        assert_eq!(layer.text_align, None);
    }

    #[test]
    fn test_own_rich_text_synthesized_from_default_text() {
        let mut layer = TextLayerConfig::new("title");
        layer.default_text = Some("Sertifikat".into());
        layer.font_weight = "bold".into();
        let rich = layer.own_rich_text();
        assert_eq!(rich.to_plain(), "Sertifikat");
        assert_eq!(rich.spans()[0].style.font_weight.as_deref(), Some("bold"));

        let empty = TextLayerConfig::new("blank").own_rich_text();
        assert_eq!(empty.to_plain(), "");

        layer.rich_text = Some(RichText::new(vec![TextSpan::new("", SpanStyle::default())]));
        assert_eq!(layer.stored_rich_text(), None);
        assert_eq!(layer.own_rich_text().to_plain(), "Sertifikat");
    }

    #[test]
    fn test_photo_layer_json() {
        let json = r#"{
            "id": "member_photo",
            "type": "photo",
            "src": "photos/andi.png",
            "xPercent": 0.1, "yPercent": 0.2, "widthPercent": 0.15, "heightPercent": 0.2,
            "zIndex": 120,
            "fitMode": "cover",
            "mask": {"type": "circle"},
            "opacity": 0.9,
            "rotation": -5,
            "originalWidth": 400, "originalHeight": 500
        }"#;
        let layer: PhotoLayerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(layer.fit_mode, FitMode::Cover);
        assert_eq!(layer.mask.as_ref().map(|m| m.kind), Some(MaskKind::Circle));
        assert_eq!(layer.z_index, 120);
        assert!(layer.maintain_aspect_ratio);
    }

    #[test]
    fn test_unknown_enums_fall_back() {
        let layer: PhotoLayerConfig = serde_json::from_str(
            r#"{"id":"p","type":"hologram","fitMode":"zoom","mask":{"type":"star"}}"#,
        )
        .unwrap();
        assert_eq!(layer.kind, PhotoKind::Photo);
        assert_eq!(layer.fit_mode, FitMode::Contain);
        assert_eq!(layer.mask.map(|m| m.kind), Some(MaskKind::None));

        let qr: QrCodeLayerConfig =
            serde_json::from_str(r#"{"id":"qr","qrData":"x","errorCorrectionLevel":"Z"}"#).unwrap();
        assert_eq!(qr.error_correction_level, ErrorCorrectionLevel::M);
    }
}
