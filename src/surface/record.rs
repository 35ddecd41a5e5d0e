//! Recording surface: captures draw calls instead of rasterizing.
//!
//! Measurement is deterministic: every char advances `advance_em * size`
//! pixels, and ascent/descent are fixed fractions of the em. This makes it
//! the surface of choice for layout tests and for inspecting what a render
//! would draw (`certa layout` prints the recorded ops as JSON).

use image::RgbaImage;
use serde::Serialize;

use super::{FontSpec, ImageDrawOptions, Surface, TextMeasurer, TextMetrics};
use crate::color::Color;
use crate::error::SurfaceError;
use crate::geometry::{ClipShape, Rect};
use crate::style::TextAlign;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    SetFont(FontSpec),
    FillText {
        text: String,
        x: f32,
        y: f32,
        color: Color,
        align: TextAlign,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    DrawImage {
        dest: Rect,
        image_width: u32,
        image_height: u32,
        opacity: f32,
        rotation: f32,
        clip: Option<ClipShape>,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    font: FontSpec,
    advance_em: f32,
    /// `None` simulates a font whose metrics are not available yet.
    metrics_em: Option<(f32, f32)>,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Surface with 0.6 em advances and 0.75/0.25 em ascent/descent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font: FontSpec::default(),
            advance_em: 0.6,
            metrics_em: Some((0.75, 0.25)),
            ops: Vec::new(),
        }
    }

    pub fn with_advance(mut self, advance_em: f32) -> Self {
        self.advance_em = advance_em;
        self
    }

    pub fn with_metrics(mut self, ascent_em: f32, descent_em: f32) -> Self {
        self.metrics_em = Some((ascent_em, descent_em));
        self
    }

    /// Report zero ascent/descent, as a surface does before its font loads.
    pub fn without_metrics(mut self) -> Self {
        self.metrics_em = None;
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Recorded `FillText` calls as `(text, x, y)`.
    pub fn texts(&self) -> Vec<(&str, f32, f32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, x, y, .. } => Some((text.as_str(), *x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasurer for RecordingSurface {
    fn set_font(&mut self, font: &FontSpec) {
        if self.font != *font {
            self.font = font.clone();
            self.ops.push(DrawOp::SetFont(font.clone()));
        }
    }

    fn measure_text(&self, text: &str) -> TextMetrics {
        let size = self.font.size;
        let (ascent, descent) = match self.metrics_em {
            Some((a, d)) => (a * size, d * size),
            None => (0.0, 0.0),
        };
        TextMetrics {
            width: text.chars().count() as f32 * self.advance_em * size,
            ascent,
            descent,
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
        align: TextAlign,
    ) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            color,
            align,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), SurfaceError> {
        self.ops.push(DrawOp::FillRect { rect, color });
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        dest: Rect,
        options: &ImageDrawOptions,
    ) -> Result<(), SurfaceError> {
        if !dest.is_drawable() {
            return Err(SurfaceError::InvalidGeometry(format!("{:?}", dest)));
        }
        self.ops.push(DrawOp::DrawImage {
            dest,
            image_width: image.width(),
            image_height: image.height(),
            opacity: options.opacity,
            rotation: options.rotation,
            clip: options.clip.clone(),
        });
        Ok(())
    }
}
