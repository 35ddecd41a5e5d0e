//! Aspect-ratio-locked resizing of image layers.
//!
//! When a layer has `maintainAspectRatio` set and one dimension is edited, the
//! other is recomputed from the image's original proportions:
//!
//! ```text
//! new_other = edited * (original_other / original_edited)
//! ```
//!
//! Pixel and percentage fields are both updated so they stay in sync.

use super::types::{CanvasConfig, PhotoLayerConfig, QrCodeLayerConfig};

/// Recompute the locked dimension. Returns `None` when the original
/// proportions are unknown or degenerate.
pub fn locked_dimension(edited: f32, original_edited: f32, original_other: f32) -> Option<f32> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !edited.is_finite() || !valid(original_edited) || !valid(original_other) {
        return None;
    }
    Some(edited * (original_other / original_edited))
}

fn percent(px: f32, reference: f32) -> Option<f32> {
    (reference > 0.0).then(|| px / reference)
}

impl PhotoLayerConfig {
    /// Original (width, height), falling back to the current size.
    fn original_size(&self) -> (f32, f32) {
        match (self.original_width, self.original_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => (w, h),
            _ => (self.width, self.height),
        }
    }

    /// Copy of this layer with its width set to `width` reference pixels.
    pub fn with_width(&self, width: f32, canvas: &CanvasConfig) -> Self {
        let mut out = self.clone();
        out.width = width;
        out.width_percent = percent(width, canvas.width);
        if self.maintain_aspect_ratio {
            let (ow, oh) = self.original_size();
            if let Some(height) = locked_dimension(width, ow, oh) {
                out.height = height;
                out.height_percent = percent(height, canvas.height);
            }
        }
        out
    }

    /// Copy of this layer with its height set to `height` reference pixels.
    pub fn with_height(&self, height: f32, canvas: &CanvasConfig) -> Self {
        let mut out = self.clone();
        out.height = height;
        out.height_percent = percent(height, canvas.height);
        if self.maintain_aspect_ratio {
            let (ow, oh) = self.original_size();
            if let Some(width) = locked_dimension(height, oh, ow) {
                out.width = width;
                out.width_percent = percent(width, canvas.width);
            }
        }
        out
    }
}

impl QrCodeLayerConfig {
    /// Copy of this layer with its width set; a locked QR stays square.
    pub fn with_width(&self, width: f32, canvas: &CanvasConfig) -> Self {
        let mut out = self.clone();
        out.width = width;
        out.width_percent = percent(width, canvas.width);
        if self.maintain_aspect_ratio {
            out.height = width;
            out.height_percent = percent(width, canvas.height);
        }
        out
    }

    /// Copy of this layer with its height set; a locked QR stays square.
    pub fn with_height(&self, height: f32, canvas: &CanvasConfig) -> Self {
        let mut out = self.clone();
        out.height = height;
        out.height_percent = percent(height, canvas.height);
        if self.maintain_aspect_ratio {
            out.width = height;
            out.width_percent = percent(height, canvas.width);
        }
        out
    }
}
