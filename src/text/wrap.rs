//! Greedy word wrapping.
//!
//! Text is split on single spaces and words are packed onto a line until
//! the next one would push it past `max_width`. A line that already holds
//! a word is never left empty, so a single over-long word overflows instead
//! of looping.
//!
//! The `name` layer is special: when the whole string, letter spacing
//! included, is wider than `max_width` it stays on one line and overflow is
//! corrected horizontally at draw time. A name that fits still goes through
//! normal wrapping.

use super::metrics::{spaced_width, text_width};
use crate::surface::TextMeasurer;

/// Layer id whose overflowing text is kept on one line.
pub const NAME_LAYER_ID: &str = "name";

/// One wrapped line: its text and char range in the source string.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Line {
    fn new(text: &str, start: usize) -> Self {
        Self {
            text: text.to_string(),
            start,
            end: start + text.chars().count(),
        }
    }
}

/// Result of wrapping a layer's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapped {
    pub lines: Vec<Line>,
    /// The name rule kept an over-wide string on a single line.
    pub overflowing: bool,
}

fn limit(max_width: Option<f32>) -> Option<f32> {
    max_width.filter(|w| w.is_finite() && *w > 0.0)
}

/// Wrap `text` for the layer `layer_id` in the measurer's current font.
///
/// `letter_spacing` only feeds the `name` overflow test, which must agree
/// with the width used for the overflow shift.
pub fn wrap_layer_text<M>(
    measurer: &M,
    layer_id: &str,
    text: &str,
    max_width: Option<f32>,
    letter_spacing: f32,
) -> Wrapped
where
    M: TextMeasurer + ?Sized,
{
    let Some(max) = limit(max_width) else {
        return Wrapped {
            lines: vec![Line::new(text, 0)],
            overflowing: false,
        };
    };

    if layer_id == NAME_LAYER_ID && spaced_width(measurer, text, letter_spacing) > max {
        log::debug!("layer '{}': text wider than {}px, kept on one line", layer_id, max);
        return Wrapped {
            lines: vec![Line::new(text, 0)],
            overflowing: true,
        };
    }

    Wrapped {
        lines: wrap_words(measurer, text, max),
        overflowing: false,
    }
}

/// Pack space-separated words into lines no wider than `max_width`.
pub fn wrap_words<M>(measurer: &M, text: &str, max_width: f32) -> Vec<Line>
where
    M: TextMeasurer + ?Sized,
{
    let mut words = text.split(' ');
    let first = words.next().unwrap_or_default();

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut current_start = 0usize;
    // Char offset of the next word.
    let mut offset = first.chars().count() + 1;

    for word in words {
        let candidate = format!("{} {}", current, word);
        if text_width(measurer, &candidate) > max_width && !current.is_empty() {
            lines.push(Line::new(&current, current_start));
            current = word.to_string();
            current_start = offset;
        } else {
            current = candidate;
        }
        offset += word.chars().count() + 1;
    }
    lines.push(Line::new(&current, current_start));
    lines
}
