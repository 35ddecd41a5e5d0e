//! # Certa - Certificate Layout & Rendering
//!
//! Certa draws certificates from a declarative template. It provides:
//!
//! - **Template model**: text, photo and QR layers in resolution-independent
//!   percentage coordinates, with an optional second "score" side
//! - **Rich text**: styled spans with range styling, merging and queries
//! - **Text layout**: greedy wrapping, vertical centering, letter spacing,
//!   decorations and the per-field micro-adjustments certificates rely on
//! - **Compositing**: z-ordered photo (fit, crop, mask, rotation) and QR layers
//! - **Surfaces**: a software rasterizer (PNG output) and a draw-op recorder
//!
//! ## Quick Start
//!
//! ```
//! use certa::{FontBook, Renderer, RenderMode, TemplateLayoutConfig};
//! use certa::render::{FieldValues, ImageStore};
//!
//! let config = TemplateLayoutConfig::from_json(r#"{
//!     "certificate": {
//!         "textLayers": [{"id": "name", "xPercent": 0.5, "yPercent": 0.45, "fontSize": 40,
//!                         "textAlign": "center", "maxWidth": 600}],
//!         "qrLayers": [{"id": "qr", "qrData": "{{CERTIFICATE_URL}}", "xPercent": 0.85,
//!                       "yPercent": 0.75, "widthPercent": 0.1, "heightPercent": 0.14}]
//!     },
//!     "canvas": {"width": 1123, "height": 794},
//!     "version": "1.0"
//! }"#)?;
//!
//! let fields = FieldValues::new()
//!     .with_text("name", "Andi Budi Chandra")
//!     .with_certificate_url("https://example.invalid/verify/123");
//!
//! // Fonts are loaded by the caller; an empty book still renders images and QR codes.
//! let fonts = FontBook::new();
//! let images = ImageStore::new();
//!
//! let png = Renderer::new(&config, &images)
//!     .render_png(RenderMode::Certificate, &fields, &fonts, 1123, 794)?;
//! assert_eq!(&png[1..4], b"PNG");
//! # Ok::<(), certa::CertaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Layout config model, aspect-ratio-locked resizing |
//! | [`rich_text`] | Styled spans and range operations |
//! | [`text`] | Wrapping, metrics fallback, vertical placement, drawing |
//! | [`render`] | Layer compositor, field values, image store, QR codes |
//! | [`surface`] | Drawing-surface traits, raster and recording surfaces |
//! | [`fonts`] | Font registry for the raster surface |
//! | [`error`] | Error types |

pub mod color;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod render;
pub mod rich_text;
pub mod style;
pub mod surface;
pub mod template;
pub mod text;

// Re-exports for convenience
pub use error::CertaError;
pub use fonts::FontBook;
pub use render::{RenderOptions, Renderer};
pub use template::{RenderMode, TemplateLayoutConfig};
