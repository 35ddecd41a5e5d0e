//! Text block layout and drawing.
//!
//! A text layer becomes a [`TextBlock`]: an anchor point, a resolved style
//! and its content. [`layout_block`] wraps it and places the lines; the
//! block is vertically centered on the anchor:
//!
//! ```text
//! L       = font_size * line_height
//! start_y = anchor.y - lines * L / 2
//! top(i)  = start_y + i * L + micro_y_offset
//! base(i) = top(i) + ascent
//! ```
//!
//! [`draw_block`] then issues the draw calls. Plain content is drawn one
//! line per call (one char per call when letter spacing is set). Rich
//! content is re-split per line into its spans, each drawn in its own font.

use super::adjust::micro_y_offset;
use super::metrics::{FontMetrics, resolve_metrics, spaced_width, text_width};
use super::wrap::{Line, wrap_layer_text};
use crate::color::Color;
use crate::error::SurfaceError;
use crate::geometry::{Point, Rect};
use crate::rich_text::{RichText, SpanStyle, TextSpan};
use crate::style::{FontStyle, TextAlign, TextDecoration, parse_font_weight};
use crate::surface::{FontSpec, Surface, TextMeasurer, aligned_start};

pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// Resolved, pixel-space style of a text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Base font; its size is the drawn size.
    pub font: FontSpec,
    pub color: Color,
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub letter_spacing: f32,
    /// Wrap width; `None` or ≤ 0 disables wrapping.
    pub max_width: Option<f32>,
    pub decoration: TextDecoration,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            color: Color::BLACK,
            align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
            letter_spacing: 0.0,
            max_width: None,
            decoration: TextDecoration::None,
        }
    }
}

/// What a block draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextContent<'a> {
    /// One string in the block's base style.
    Plain(&'a str),
    /// Styled spans. Span font sizes are reference sizes and get multiplied
    /// by `scale_factor`; spans without a size use the base font size.
    Rich {
        text: &'a RichText,
        scale_factor: f32,
    },
}

impl TextContent<'_> {
    pub fn plain_text(&self) -> String {
        match self {
            TextContent::Plain(s) => (*s).to_string(),
            TextContent::Rich { text, .. } => text.to_plain(),
        }
    }
}

/// A text layer ready to lay out.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock<'a> {
    pub layer_id: &'a str,
    pub anchor: Point,
    pub style: TextStyle,
    pub content: TextContent<'a>,
    /// Font size used to pick the micro-adjustment band.
    pub band_size: f32,
    pub compact_layout: bool,
}

impl<'a> TextBlock<'a> {
    pub fn new(layer_id: &'a str, anchor: Point, style: TextStyle, content: TextContent<'a>) -> Self {
        let band_size = style.font.size;
        Self {
            layer_id,
            anchor,
            style,
            content,
            band_size,
            compact_layout: false,
        }
    }
}

/// Placed lines of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<Line>,
    pub line_height_px: f32,
    /// Top of the first line before micro-adjustment.
    pub start_y: f32,
    pub y_offset: f32,
    pub metrics: FontMetrics,
    /// Single-line name text wider than the wrap width.
    pub overflowing: bool,
}

impl TextLayout {
    /// Top of line `i` before micro-adjustment.
    pub fn line_top(&self, i: usize) -> f32 {
        self.start_y + i as f32 * self.line_height_px
    }

    /// Top of line `i` as drawn.
    pub fn line_y(&self, i: usize) -> f32 {
        self.line_top(i) + self.y_offset
    }

    pub fn baseline(&self, i: usize) -> f32 {
        self.line_y(i) + self.metrics.ascent
    }
}

fn line_height_multiplier(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { DEFAULT_LINE_HEIGHT }
}

/// Wrap and vertically place `block` without drawing it.
pub fn layout_block<M>(measurer: &mut M, block: &TextBlock<'_>) -> TextLayout
where
    M: TextMeasurer + ?Sized,
{
    let style = &block.style;
    let font_size = style.font.size;
    measurer.set_font(&style.font);

    let text = block.content.plain_text();
    let wrapped = wrap_layer_text(
        &*measurer,
        block.layer_id,
        &text,
        style.max_width,
        style.letter_spacing,
    );

    let line_height_px = font_size * line_height_multiplier(style.line_height);
    let total_height = wrapped.lines.len() as f32 * line_height_px;
    let start_y = block.anchor.y - total_height / 2.0;

    let first = wrapped.lines.first().map(|l| l.text.as_str()).unwrap_or("");
    let metrics = resolve_metrics(&*measurer, first, font_size);

    TextLayout {
        lines: wrapped.lines,
        line_height_px,
        start_y,
        y_offset: micro_y_offset(block.layer_id, block.band_size, font_size, block.compact_layout),
        metrics,
        overflowing: wrapped.overflowing,
    }
}

/// Lay out and draw `block` onto `surface`.
pub fn draw_block<S>(surface: &mut S, block: &TextBlock<'_>) -> Result<TextLayout, SurfaceError>
where
    S: Surface + ?Sized,
{
    let layout = layout_block(surface, block);
    for (i, line) in layout.lines.iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        match block.content {
            TextContent::Plain(_) => draw_plain_line(surface, block, &layout, i, line)?,
            TextContent::Rich { text, scale_factor } => {
                let spans = text.slice(line.start, line.end);
                draw_rich_line(surface, block, &layout, i, &spans, scale_factor)?
            }
        }
    }
    Ok(layout)
}

/// Left shift applied to an overflowing name line.
fn overflow_shift(block: &TextBlock<'_>, layout: &TextLayout, line_width: f32) -> f32 {
    if !layout.overflowing {
        return 0.0;
    }
    let Some(max) = block.style.max_width else {
        return 0.0;
    };
    let overflow = line_width - max;
    if overflow <= 0.0 {
        return 0.0;
    }
    let shift = match block.style.align.effective() {
        TextAlign::Center => overflow / 2.0,
        _ => overflow,
    };
    log::debug!(
        "layer '{}': overflow {:.1}px, shifting left by {:.1}px",
        block.layer_id,
        overflow,
        shift
    );
    shift
}

fn draw_plain_line<S>(
    surface: &mut S,
    block: &TextBlock<'_>,
    layout: &TextLayout,
    i: usize,
    line: &Line,
) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
{
    let style = &block.style;
    let align = style.align.effective();
    let spacing = style.letter_spacing;
    let baseline = layout.baseline(i);

    let width = spaced_width(&*surface, &line.text, spacing);
    let x = block.anchor.x - overflow_shift(block, layout, width);
    let start = aligned_start(x, width, align);

    if spacing == 0.0 {
        surface.fill_text(&line.text, x, baseline, style.color, align)?;
    } else {
        draw_spaced(surface, &line.text, start, baseline, style.color, spacing)?;
    }

    draw_decoration(surface, style, start, layout.line_y(i), width)
}

/// Font for one span: span fields win, then the layer's. Slant never
/// inherits from the layer.
fn span_font(base: &FontSpec, span: &SpanStyle, scale_factor: f32) -> FontSpec {
    FontSpec {
        family: span.font_family.clone().unwrap_or_else(|| base.family.clone()),
        weight: span
            .font_weight
            .as_deref()
            .map(parse_font_weight)
            .unwrap_or(base.weight),
        style: span.font_style.unwrap_or(FontStyle::Normal),
        size: span
            .font_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s * scale_factor)
            .unwrap_or(base.size),
    }
}

fn draw_rich_line<S>(
    surface: &mut S,
    block: &TextBlock<'_>,
    layout: &TextLayout,
    i: usize,
    spans: &[TextSpan],
    scale_factor: f32,
) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
{
    let style = &block.style;
    let spacing = style.letter_spacing;

    let runs: Vec<(FontSpec, Color, &str)> = spans
        .iter()
        .map(|span| {
            let font = span_font(&style.font, &span.style, scale_factor);
            let color = span
                .style
                .color
                .as_deref()
                .and_then(Color::parse)
                .unwrap_or(style.color);
            (font, color, span.text.as_str())
        })
        .collect();

    let mut widths = Vec::with_capacity(runs.len());
    let mut chars = 0usize;
    for (font, _, text) in &runs {
        surface.set_font(font);
        widths.push(run_width(&*surface, text, spacing));
        chars += text.chars().count();
    }
    let width = widths.iter().sum::<f32>() + chars.saturating_sub(1) as f32 * spacing;

    let x = block.anchor.x - overflow_shift(block, layout, width);
    let start = aligned_start(x, width, style.align);
    let baseline = layout.baseline(i);

    let mut cursor = start;
    for ((font, color, text), run) in runs.iter().zip(widths) {
        surface.set_font(font);
        if spacing == 0.0 {
            surface.fill_text(text, cursor, baseline, *color, TextAlign::Left)?;
            cursor += run;
        } else {
            cursor = draw_spaced(surface, text, cursor, baseline, *color, spacing)?;
        }
    }

    surface.set_font(&style.font);
    draw_decoration(surface, style, start, layout.line_y(i), width)
}

/// Sum of char advances in the current font, spacing excluded.
fn run_width<S>(surface: &S, text: &str, spacing: f32) -> f32
where
    S: TextMeasurer + ?Sized,
{
    if spacing == 0.0 {
        return text_width(surface, text);
    }
    let mut buf = [0u8; 4];
    text.chars()
        .map(|ch| text_width(surface, ch.encode_utf8(&mut buf)))
        .sum()
}

/// Draw `text` one char at a time from `x`; returns the cursor after it.
fn draw_spaced<S>(
    surface: &mut S,
    text: &str,
    x: f32,
    baseline: f32,
    color: Color,
    spacing: f32,
) -> Result<f32, SurfaceError>
where
    S: Surface + ?Sized,
{
    let mut buf = [0u8; 4];
    let mut cursor = x;
    for ch in text.chars() {
        let glyph = ch.encode_utf8(&mut buf);
        surface.fill_text(glyph, cursor, baseline, color, TextAlign::Left)?;
        cursor += text_width(&*surface, glyph) + spacing;
    }
    Ok(cursor)
}

fn draw_decoration<S>(
    surface: &mut S,
    style: &TextStyle,
    start: f32,
    line_y: f32,
    width: f32,
) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
{
    let font_size = style.font.size;
    let thickness = (font_size / 16.0).max(1.0);
    let y = match style.decoration {
        TextDecoration::None => return Ok(()),
        TextDecoration::Underline => line_y + font_size,
        TextDecoration::LineThrough => line_y + font_size / 2.0,
        TextDecoration::Overline => line_y - thickness,
    };
    if width <= 0.0 {
        return Ok(());
    }
    surface.fill_rect(Rect::new(start, y, width, thickness), style.color)
}
