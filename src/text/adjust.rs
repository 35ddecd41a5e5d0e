//! Per-layer vertical micro-adjustment.
//!
//! A small downward offset added to every line of a layer, selected by the
//! layer id and font size band. The ratios are tuned against previously
//! issued certificates and must stay as they are.

use std::ops::RangeInclusive;

const SCORE_FIELD_RATIO: f32 = 0.087;
const COMPACT_SMALL_FONT_RATIO: f32 = 0.10;
const REFERENCE_FIELD_RATIO: f32 = 0.10;
const SMALL_FONT_RATIO: f32 = 0.40;

const SMALL_FONT_BAND: RangeInclusive<f32> = 16.0..=20.0;

/// Fields that hold a score or achievement.
fn is_score_field(layer_id: &str) -> bool {
    let id = layer_id.to_ascii_lowercase();
    id.contains("nilai") || id.contains("prestasi")
}

/// Offset ratio for a layer. `band_size` selects the band, usually the
/// font size as authored on the reference canvas.
pub fn micro_y_ratio(layer_id: &str, band_size: f32, compact_layout: bool) -> f32 {
    let small = SMALL_FONT_BAND.contains(&band_size);
    if is_score_field(layer_id) {
        SCORE_FIELD_RATIO
    } else if compact_layout && small {
        COMPACT_SMALL_FONT_RATIO
    } else if layer_id == "certificate_no" || layer_id == "issue_date" {
        REFERENCE_FIELD_RATIO
    } else if small {
        SMALL_FONT_RATIO
    } else {
        0.0
    }
}

/// Pixel offset for a layer drawn at `font_size`.
pub fn micro_y_offset(layer_id: &str, band_size: f32, font_size: f32, compact_layout: bool) -> f32 {
    micro_y_ratio(layer_id, band_size, compact_layout) * font_size
}
