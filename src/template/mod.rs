//! # Template Layout Model
//!
//! A [`TemplateLayoutConfig`] describes one certificate template: the layers
//! of its certificate side, optionally a second "score" side, and the
//! reference canvas the layer coordinates were authored against.
//!
//! ```
//! use certa::template::{RenderMode, TemplateLayoutConfig};
//!
//! let config = TemplateLayoutConfig::from_json(r#"{
//!     "certificate": {"textLayers": [{"id": "name", "xPercent": 0.5, "yPercent": 0.45}]},
//!     "canvas": {"width": 1123, "height": 794},
//!     "version": "1.0"
//! }"#).unwrap();
//!
//! assert_eq!(config.layers(RenderMode::Certificate).len(), 1);
//! assert!(config.layers(RenderMode::Score).is_empty());
//! ```
//!
//! Config values are immutable for the duration of a render; the renderer
//! never modifies them. Editing helpers such as
//! [`PhotoLayerConfig::with_width`] return new values.

pub mod resize;
pub mod types;

pub use types::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CertaError;

/// Which side of a dual-sided template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Certificate,
    Score,
}

impl std::str::FromStr for RenderMode {
    type Err = CertaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "certificate" | "front" => Ok(RenderMode::Certificate),
            "score" | "back" => Ok(RenderMode::Score),
            other => Err(CertaError::Config(format!("unknown render mode '{}'", other))),
        }
    }
}

/// Custom deserializer for `version`: accepts a string or a number.
fn deserialize_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VersionValue {
        Text(String),
        Number(serde_json::Number),
    }

    let opt: Option<VersionValue> = Option::deserialize(deserializer)?;
    Ok(match opt {
        None => String::new(),
        Some(VersionValue::Text(s)) => s,
        Some(VersionValue::Number(n)) => n.to_string(),
    })
}

/// Full layout of a certificate template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLayoutConfig {
    pub certificate: LayerSet,
    /// Present only for dual-sided templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<LayerSet>,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default, deserialize_with = "deserialize_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl TemplateLayoutConfig {
    /// Parse a layout from its persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self, CertaError> {
        let config: Self = serde_json::from_str(json)?;
        if !(config.canvas.width > 0.0 && config.canvas.height > 0.0) {
            return Err(CertaError::Config(format!(
                "canvas must have a positive size, got {}x{}",
                config.canvas.width, config.canvas.height
            )));
        }
        Ok(config)
    }

    /// The layer set for `mode`, if the template has one.
    pub fn layer_set(&self, mode: RenderMode) -> Option<&LayerSet> {
        match mode {
            RenderMode::Certificate => Some(&self.certificate),
            RenderMode::Score => self.score.as_ref(),
        }
    }

    pub fn is_dual_sided(&self) -> bool {
        self.score.is_some()
    }

    /// All layers of `mode` in paint order.
    ///
    /// Photo and QR layers with `zIndex < 100` paint first, then text layers
    /// in config order, then photo and QR layers with `zIndex >= 100`. Within
    /// each group layers are ordered by `zIndex`, ties keeping config order.
    pub fn layers(&self, mode: RenderMode) -> Vec<Layer<'_>> {
        let Some(set) = self.layer_set(mode) else {
            return Vec::new();
        };

        let mut layers: Vec<Layer<'_>> = Vec::with_capacity(
            set.photo_layers.len() + set.qr_layers.len() + set.text_layers.len(),
        );
        layers.extend(set.photo_layers.iter().map(Layer::Photo));
        layers.extend(set.qr_layers.iter().map(Layer::QrCode));
        layers.extend(set.text_layers.iter().map(Layer::Text));

        layers.sort_by_key(|l| l.paint_key());
        layers
    }
}

/// Z-index at and above which image layers paint over text.
pub const TEXT_Z_INDEX: i32 = 100;

/// One layer of a template, borrowed from its config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer<'a> {
    Text(&'a TextLayerConfig),
    Photo(&'a PhotoLayerConfig),
    QrCode(&'a QrCodeLayerConfig),
}

impl Layer<'_> {
    pub fn id(&self) -> &str {
        match self {
            Layer::Text(l) => &l.id,
            Layer::Photo(l) => &l.id,
            Layer::QrCode(l) => &l.id,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Layer::Text(l) => l.visible,
            Layer::Photo(l) => l.visible,
            Layer::QrCode(l) => l.visible,
        }
    }

    /// Effective z-index; text layers sit at [`TEXT_Z_INDEX`].
    pub fn z_index(&self) -> i32 {
        match self {
            Layer::Text(_) => TEXT_Z_INDEX,
            Layer::Photo(l) => l.z_index,
            Layer::QrCode(l) => l.z_index,
        }
    }

    fn paint_key(&self) -> (u8, i32) {
        match self {
            Layer::Text(_) => (1, TEXT_Z_INDEX),
            _ if self.z_index() < TEXT_Z_INDEX => (0, self.z_index()),
            _ => (2, self.z_index()),
        }
    }
}

/// Resolves percentage and reference-pixel coordinates against a render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelResolver {
    pub target_width: f32,
    pub target_height: f32,
    pub reference: CanvasConfig,
}

impl PixelResolver {
    pub fn new(target_width: f32, target_height: f32, reference: CanvasConfig) -> Self {
        Self {
            target_width,
            target_height,
            reference,
        }
    }

    /// Ratio of target width to reference width (1.0 if the reference is degenerate).
    pub fn width_scale(&self) -> f32 {
        ratio(self.target_width, self.reference.width)
    }

    pub fn height_scale(&self) -> f32 {
        ratio(self.target_height, self.reference.height)
    }

    /// Horizontal coordinate or length: `percent * target_width`, else the
    /// reference-pixel value rescaled to the target.
    pub fn x(&self, percent: Option<f32>, px: f32) -> f32 {
        match percent.filter(|p| p.is_finite()) {
            Some(p) => p * self.target_width,
            None => px * self.width_scale(),
        }
    }

    pub fn y(&self, percent: Option<f32>, px: f32) -> f32 {
        match percent.filter(|p| p.is_finite()) {
            Some(p) => p * self.target_height,
            None => px * self.height_scale(),
        }
    }
}

fn ratio(target: f32, reference: f32) -> f32 {
    if reference > 0.0 && reference.is_finite() && target.is_finite() {
        target / reference
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dual_sided() -> TemplateLayoutConfig {
        let json = r#"{
            "certificate": {
                "textLayers": [
                    {"id": "name", "xPercent": 0.5, "yPercent": 0.5},
                    {"id": "certificate_no", "x": 100, "y": 50}
                ],
                "photoLayers": [
                    {"id": "frame", "src": "frame.png", "zIndex": 150},
                    {"id": "background", "src": "bg.png", "zIndex": 0},
                    {"id": "logo", "src": "logo.png", "zIndex": 10}
                ],
                "qrLayers": [{"id": "qr", "qrData": "{{CERTIFICATE_URL}}", "zIndex": 100}]
            },
            "score": {
                "textLayers": [{"id": "name"}, {"id": "nilai_1"}]
            },
            "canvas": {"width": 1000, "height": 500},
            "version": 3,
            "lastSavedAt": "2024-05-01T08:30:00Z"
        }"#;
        TemplateLayoutConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_parse_dual_sided() {
        let config = dual_sided();
        assert!(config.is_dual_sided());
        assert_eq!(config.version, "3");
        assert!(config.last_saved_at.is_some());
        assert_eq!(config.layer_set(RenderMode::Score).unwrap().text_layers.len(), 2);
    }

    #[test]
    fn test_paint_order() {
        let config = dual_sided();
        let layers = config.layers(RenderMode::Certificate);
        let ids: Vec<&str> = layers
            .iter()
            .map(|l| l.id())
            .collect();
        assert_eq!(
            ids,
            vec!["background", "logo", "name", "certificate_no", "qr", "frame"]
        );
    }

    #[test]
    fn test_missing_score_side_has_no_layers() {
        let mut config = dual_sided();
        config.score = None;
        assert!(config.layers(RenderMode::Score).is_empty());
    }

    #[test]
    fn test_rejects_degenerate_canvas() {
        let err = TemplateLayoutConfig::from_json(
            r#"{"certificate": {"textLayers": []}, "canvas": {"width": 0, "height": 10}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CertaError::Config(_)));
    }

    #[test]
    fn test_resolver_prefers_percent() {
        let resolver = PixelResolver::new(2000.0, 1000.0, CanvasConfig { width: 1000.0, height: 500.0 });
        assert_eq!(resolver.x(Some(0.25), 999.0), 500.0);
        assert_eq!(resolver.x(None, 100.0), 200.0);
        assert_eq!(resolver.y(None, 50.0), 100.0);
        assert_eq!(resolver.y(Some(f32::NAN), 50.0), 100.0);
        assert_eq!(resolver.width_scale(), 2.0);
    }

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!("Score".parse::<RenderMode>().unwrap(), RenderMode::Score);
        assert!("both".parse::<RenderMode>().is_err());
    }
}
