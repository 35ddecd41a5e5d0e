//! # Rich Text Model
//!
//! A [`RichText`] is an ordered run of [`TextSpan`]s, each carrying optional
//! style overrides. Concatenating the span texts gives the layer's plain text.
//!
//! All character offsets in this module count Unicode scalar values (`char`s)
//! of the concatenated plain text, and ranges are half-open `[start, end)`.
//!
//! ```
//! use certa::rich_text::{RichText, SpanStyle};
//!
//! let bold = SpanStyle { font_weight: Some("bold".into()), ..Default::default() };
//! let text = RichText::from_plain("Hello World!!", &bold);
//! let red = SpanStyle { color: Some("#ff0000".into()), ..Default::default() };
//! let styled = text.apply_style(5, 9, &red);
//!
//! assert_eq!(styled.spans().len(), 3);
//! assert_eq!(styled.to_plain(), "Hello World!!");
//! ```

use serde::{Deserialize, Serialize};

use crate::style::{FontStyle, TextAlign};

/// Style overrides carried by a span. `None` means "inherit from the layer".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
}

impl SpanStyle {
    /// Overlay `other` on top of `self`: every field set in `other` wins.
    pub fn overlay(&self, other: &SpanStyle) -> SpanStyle {
        SpanStyle {
            font_weight: other.font_weight.clone().or_else(|| self.font_weight.clone()),
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            color: other.color.clone().or_else(|| self.color.clone()),
            text_align: other.text_align.or(self.text_align),
            font_style: other.font_style.or(self.font_style),
        }
    }

    /// Read one style field as a comparable value.
    pub fn get(&self, key: StyleKey) -> Option<StyleValue> {
        match key {
            StyleKey::FontWeight => self.font_weight.clone().map(StyleValue::Text),
            StyleKey::FontFamily => self.font_family.clone().map(StyleValue::Text),
            StyleKey::FontSize => self.font_size.map(StyleValue::Number),
            StyleKey::Color => self.color.clone().map(StyleValue::Text),
            StyleKey::TextAlign => self.text_align.map(StyleValue::Align),
            StyleKey::FontStyle => self.font_style.map(StyleValue::FontStyle),
        }
    }
}

/// A contiguous run of text with its own style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(flatten)]
    pub style: SpanStyle,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Style field selector for queries over a [`RichText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKey {
    FontWeight,
    FontFamily,
    FontSize,
    Color,
    TextAlign,
    FontStyle,
}

/// A single style field value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Text(String),
    Number(f32),
    Align(TextAlign),
    FontStyle(FontStyle),
}

/// Result of [`RichText::common_style_value`] when at least one span overlaps.
#[derive(Debug, Clone, PartialEq)]
pub enum CommonStyle {
    /// Every overlapping span has this value (or every one leaves it unset).
    Uniform(Option<StyleValue>),
    /// Overlapping spans disagree.
    Mixed,
}

/// Ordered sequence of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    spans: Vec<TextSpan>,
}

impl RichText {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Single-span rich text carrying `base` as its style.
    pub fn from_plain(text: &str, base: &SpanStyle) -> Self {
        Self {
            spans: vec![TextSpan::new(text, base.clone())],
        }
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn into_spans(self) -> Vec<TextSpan> {
        self.spans
    }

    /// Concatenation of span texts, in order.
    pub fn to_plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Length of the plain text in chars.
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(TextSpan::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Apply `style` to the char range `[start, end)`.
    ///
    /// Spans straddling a boundary are split; zero-length pieces are dropped
    /// and equal-styled neighbours merged. An empty (or inverted) range
    /// returns the text unchanged.
    pub fn apply_style(&self, start: usize, end: usize, style: &SpanStyle) -> RichText {
        if start >= end {
            return self.clone();
        }

        let mut out = Vec::with_capacity(self.spans.len() + 2);
        let mut offset = 0usize;

        for span in &self.spans {
            let len = span.char_len();
            let span_start = offset;
            let span_end = offset + len;
            offset = span_end;

            let overlap_start = span_start.max(start);
            let overlap_end = span_end.min(end);
            if overlap_start >= overlap_end {
                out.push(span.clone());
                continue;
            }

            let before = slice_chars(&span.text, 0, overlap_start - span_start);
            let middle = slice_chars(
                &span.text,
                overlap_start - span_start,
                overlap_end - span_start,
            );
            let after = slice_chars(&span.text, overlap_end - span_start, len);

            if !before.is_empty() {
                out.push(TextSpan::new(before, span.style.clone()));
            }
            out.push(TextSpan::new(middle, span.style.overlay(style)));
            if !after.is_empty() {
                out.push(TextSpan::new(after, span.style.clone()));
            }
        }

        RichText { spans: out }.merged()
    }

    /// Merge consecutive spans whose style fields are all equal.
    pub fn merged(&self) -> RichText {
        let mut out: Vec<TextSpan> = Vec::with_capacity(self.spans.len());
        for span in &self.spans {
            match out.last_mut() {
                Some(prev) if prev.style == span.style => prev.text.push_str(&span.text),
                _ => out.push(span.clone()),
            }
        }
        RichText { spans: out }
    }

    /// The spans overlapping `[start, end)`, trimmed to the range.
    ///
    /// Used by rendering to re-split a wrapped line into its styled pieces.
    pub fn slice(&self, start: usize, end: usize) -> Vec<TextSpan> {
        let mut out = Vec::new();
        if start >= end {
            return out;
        }
        let mut offset = 0usize;
        for span in &self.spans {
            let len = span.char_len();
            let span_start = offset;
            offset += len;

            let lo = span_start.max(start);
            let hi = offset.min(end);
            if lo < hi {
                out.push(TextSpan::new(
                    slice_chars(&span.text, lo - span_start, hi - span_start),
                    span.style.clone(),
                ));
            }
        }
        out
    }

    /// The value of `key` shared by all spans overlapping `[start, end)`.
    ///
    /// Returns `None` if the range is empty or no span overlaps it.
    pub fn common_style_value(&self, start: usize, end: usize, key: StyleKey) -> Option<CommonStyle> {
        if start >= end {
            return None;
        }
        let mut first: Option<Option<StyleValue>> = None;
        let mut offset = 0usize;
        for span in &self.spans {
            let len = span.char_len();
            let span_start = offset;
            offset += len;
            if span_start.max(start) >= offset.min(end) {
                continue;
            }
            let value = span.style.get(key);
            match &first {
                None => first = Some(value),
                Some(existing) if *existing != value => return Some(CommonStyle::Mixed),
                Some(_) => {}
            }
        }
        first.map(CommonStyle::Uniform)
    }

    /// True iff two or more distinct defined values of `key` exist.
    pub fn has_mixed_style(&self, key: StyleKey) -> bool {
        let mut seen: Option<StyleValue> = None;
        for value in self.spans.iter().filter_map(|s| s.style.get(key)) {
            match &seen {
                None => seen = Some(value),
                Some(existing) if *existing != value => return true,
                Some(_) => {}
            }
        }
        false
    }
}

/// Source of an active text selection, supplied by a UI adapter.
///
/// The core never reads UI selections itself; an editor implements this over
/// whatever its toolkit reports and hands the resulting offsets to
/// [`RichText::apply_style`].
pub trait SelectionSource {
    /// Full plain-text length of the container, in chars.
    fn container_len(&self) -> usize;

    /// Raw `(anchor, focus)` char offsets within the container, or `None`
    /// when nothing is selected or the selection lies outside it.
    fn selection(&self) -> Option<(usize, usize)>;
}

/// Normalized selection offsets relative to a container's plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

/// Resolve a selection to ordered plain-text offsets.
///
/// Returns `None` when there is no selection or either end falls outside the
/// container.
pub fn selection_offsets(source: &impl SelectionSource) -> Option<SelectionRange> {
    let (anchor, focus) = source.selection()?;
    let len = source.container_len();
    if anchor > len || focus > len {
        return None;
    }
    Some(SelectionRange {
        start: anchor.min(focus),
        end: anchor.max(focus),
    })
}

/// Substring by char offsets `[start, end)`, clamped to the string.
pub(crate) fn slice_chars(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}
