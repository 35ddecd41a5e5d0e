//! # Text Layout Engine
//!
//! Turns a text layer into positioned draw calls.
//!
//! | Module | Role |
//! |--------|------|
//! | [`metrics`] | Ascent/descent with the 80/20 fallback, spacing-aware widths |
//! | [`wrap`] | Greedy word wrap and the single-line `name` rule |
//! | [`adjust`] | Per-layer vertical micro-adjustment |
//! | [`draw`] | Vertical centering, alignment, decorations, rich spans |
//!
//! Everything here is written against [`crate::surface::TextMeasurer`] and
//! [`crate::surface::Surface`], so the same layout runs on any backend.

pub mod adjust;
pub mod draw;
pub mod metrics;
pub mod wrap;

pub use draw::{TextBlock, TextContent, TextLayout, TextStyle, draw_block, layout_block};
pub use metrics::FontMetrics;
pub use wrap::{Line, NAME_LAYER_ID};
