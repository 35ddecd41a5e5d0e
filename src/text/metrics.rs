//! Font metrics with a fallback for unreliable measurements.
//!
//! A surface whose font has not finished loading tends to report zero, NaN
//! or infinite ascent/descent. Those are replaced by an 80/20 split of the
//! font size so layout always has usable numbers.

use crate::surface::TextMeasurer;

pub const FALLBACK_ASCENT_RATIO: f32 = 0.8;
pub const FALLBACK_DESCENT_RATIO: f32 = 0.2;

/// Vertical metrics used to position a block of lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    /// The measured values were rejected and the 80/20 split used instead.
    pub fallback: bool,
}

impl FontMetrics {
    pub fn fallback(font_size: f32) -> Self {
        Self {
            ascent: font_size * FALLBACK_ASCENT_RATIO,
            descent: font_size * FALLBACK_DESCENT_RATIO,
            fallback: true,
        }
    }
}

fn usable(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Measure `sample` in the measurer's current font and validate the result.
pub fn resolve_metrics<M>(measurer: &M, sample: &str, font_size: f32) -> FontMetrics
where
    M: TextMeasurer + ?Sized,
{
    let measured = measurer.measure_text(sample);
    if usable(measured.ascent) && usable(measured.descent) {
        FontMetrics {
            ascent: measured.ascent,
            descent: measured.descent,
            fallback: false,
        }
    } else {
        log::warn!(
            "unusable font metrics (ascent {}, descent {}), using {}/{} split of {}px",
            measured.ascent,
            measured.descent,
            FALLBACK_ASCENT_RATIO,
            FALLBACK_DESCENT_RATIO,
            font_size
        );
        FontMetrics::fallback(font_size)
    }
}

/// Width of `text` in the current font; NaN and infinities become 0.
pub fn text_width<M>(measurer: &M, text: &str) -> f32
where
    M: TextMeasurer + ?Sized,
{
    finite_or_zero(measurer.measure_text(text).width)
}

/// Width of `text` drawn with `letter_spacing` extra pixels between chars.
///
/// With zero spacing this is the measured width of the whole string; with
/// spacing it is the sum of per-char widths plus `(chars - 1) * spacing`,
/// matching how spaced text is drawn one char at a time.
pub fn spaced_width<M>(measurer: &M, text: &str, letter_spacing: f32) -> f32
where
    M: TextMeasurer + ?Sized,
{
    if letter_spacing == 0.0 {
        return text_width(measurer, text);
    }
    let mut buf = [0u8; 4];
    let mut count = 0usize;
    let mut width = 0.0;
    for ch in text.chars() {
        width += text_width(measurer, ch.encode_utf8(&mut buf));
        count += 1;
    }
    width + count.saturating_sub(1) as f32 * letter_spacing
}

pub(crate) fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
