//! # Render Tests
//!
//! End-to-end renders of small templates through the public API.
//!
//! - **Recording tests** check draw order and geometry through `DrawOp`s.
//! - **Raster tests** check pixels of photo and QR layers, which do not
//!   depend on any font being installed.

use certa::geometry::{ClipShape, Rect};
use certa::render::{FieldValues, ImageStore, RenderOptions, Renderer};
use certa::surface::{DrawOp, RecordingSurface};
use certa::template::{RenderMode, TemplateLayoutConfig};
use certa::{CertaError, FontBook};
use image::{ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const TEMPLATE: &str = r#"{
    "certificate": {
        "textLayers": [
            {"id": "name", "xPercent": 0.5, "yPercent": 0.5, "fontSize": 20,
             "textAlign": "center", "maxWidth": 150},
            {"id": "certificate_no", "xPercent": 0.1, "yPercent": 0.9, "fontSize": 30,
             "defaultText": "NO. 000"}
        ],
        "photoLayers": [
            {"id": "frame", "src": "frame.png", "xPercent": 0, "yPercent": 0,
             "widthPercent": 1, "heightPercent": 1, "zIndex": 150, "fitMode": "fill"},
            {"id": "background", "src": "bg.png", "xPercent": 0, "yPercent": 0,
             "widthPercent": 1, "heightPercent": 1, "zIndex": 0, "fitMode": "stretch"}
        ],
        "qrLayers": [
            {"id": "qr", "qrData": "https://x/{{CERTIFICATE_URL}}", "xPercent": 0.8,
             "yPercent": 0.7, "widthPercent": 0.1, "heightPercent": 0.2, "zIndex": 100}
        ]
    },
    "score": {
        "textLayers": [
            {"id": "name", "xPercent": 0.25, "yPercent": 0.1, "fontSize": 24},
            {"id": "nilai_akhir", "xPercent": 0.5, "yPercent": 0.5, "fontSize": 18,
             "defaultText": "A"}
        ]
    },
    "canvas": {"width": 1000, "height": 500},
    "version": "2.1",
    "lastSavedAt": "2024-11-02T10:00:00Z"
}"#;

fn template() -> TemplateLayoutConfig {
    TemplateLayoutConfig::from_json(TEMPLATE).unwrap()
}

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn solid_png(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
    png(&RgbaImage::from_pixel(w, h, Rgba(color)))
}

fn images() -> ImageStore {
    let mut store = ImageStore::new();
    store.insert_encoded("bg.png", solid_png(4, 2, [240, 230, 200, 255]));
    // Transparent frame with an opaque border pixel row.
    let mut frame = RgbaImage::new(10, 5);
    for x in 0..10 {
        frame.put_pixel(x, 0, Rgba([200, 0, 0, 255]));
    }
    store.insert_decoded("frame.png", frame);
    store
}

fn fields() -> FieldValues {
    FieldValues::new()
        .with_text("name", "Andi Budi Chandra")
        .with_certificate_url("verify/abc")
}

fn op_kinds(ops: &[DrawOp]) -> Vec<&'static str> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::SetFont(_) => None,
            DrawOp::FillText { .. } => Some("text"),
            DrawOp::FillRect { .. } => Some("rect"),
            DrawOp::DrawImage { .. } => Some("image"),
        })
        .collect()
}

#[test]
fn test_certificate_paint_order() {
    let config = template();
    let store = images();
    let mut surface = RecordingSurface::new(1000, 500);
    let report = Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap();

    assert_eq!(
        report.drawn,
        vec!["background", "name", "certificate_no", "qr", "frame"]
    );
    assert_eq!(
        op_kinds(surface.ops()),
        vec!["image", "text", "text", "image", "image"]
    );
}

#[test]
fn test_name_overflow_stays_on_one_line() {
    let config = template();
    let store = images();
    let mut surface = RecordingSurface::new(1000, 500);
    Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap();

    // 17 chars at 12px = 204px against a 150px limit, centered: shift 27px.
    let (text, x, _) = surface.texts()[0];
    assert_eq!(text, "Andi Budi Chandra");
    let overflow = 17.0 * 0.6 * 20.0 - 150.0;
    assert!((x - (500.0 - overflow / 2.0)).abs() < 1e-3);
}

#[test]
fn test_percentages_follow_the_render_target() {
    let config = template();
    let store = images();
    let mut surface = RecordingSurface::new(2000, 1000);
    Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap();

    let qr = surface
        .ops()
        .iter()
        .find_map(|op| match op {
            DrawOp::DrawImage { dest, clip: None, .. } if dest.x > 1000.0 => Some(*dest),
            _ => None,
        })
        .unwrap();
    // 200 x 200 frame at (1600, 700), already square.
    assert_eq!(qr, Rect::new(1600.0, 700.0, 200.0, 200.0));

    let sizes: Vec<f32> = surface
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::SetFont(f) => Some(f.size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes.first(), Some(&40.0));
}

#[test]
fn test_score_side_has_independent_layers() {
    let config = template();
    let store = images();
    let mut surface = RecordingSurface::new(1000, 500);
    let report = Renderer::new(&config, &store)
        .render(RenderMode::Score, &fields(), &mut surface)
        .unwrap();

    assert_eq!(report.drawn, vec!["name", "nilai_akhir"]);
    let texts: Vec<(&str, f32)> = surface.texts().iter().map(|t| (t.0, t.1)).collect();
    assert_eq!(texts, vec![("Andi Budi Chandra", 250.0), ("A", 500.0)]);
}

#[test]
fn test_single_sided_template_renders_nothing_for_score() {
    let mut config = template();
    config.score = None;
    let store = images();
    let mut surface = RecordingSurface::new(1000, 500);
    let report = Renderer::new(&config, &store)
        .render(RenderMode::Score, &fields(), &mut surface)
        .unwrap();
    assert!(report.drawn.is_empty());
    assert!(surface.ops().is_empty());
}

#[test]
fn test_missing_image_is_skipped() {
    let config = template();
    let mut store = ImageStore::new();
    store.insert_encoded("bg.png", solid_png(1, 1, [0, 0, 0, 255]));
    let mut surface = RecordingSurface::new(1000, 500);
    let report = Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap();
    assert_eq!(report.skipped, vec!["frame"]);
}

#[test]
fn test_corrupt_image_fails_with_layer_id() {
    let config = template();
    let mut store = images();
    store.insert_encoded("frame.png", b"garbage".to_vec());
    let mut surface = RecordingSurface::new(1000, 500);
    let err = Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap_err();
    assert!(matches!(err, CertaError::ImageDecode { .. }));
    assert_eq!(err.layer_id(), Some("frame"));
}

#[test]
fn test_rich_text_layer_draws_each_span() {
    let config = TemplateLayoutConfig::from_json(
        r##"{
            "certificate": {"textLayers": [{
                "id": "description", "xPercent": 0.5, "yPercent": 0.5, "fontSize": 24,
                "textAlign": "center", "fontStyle": "italic",
                "richText": [
                    {"text": "Juara "},
                    {"text": "Satu", "fontWeight": "bold", "color": "#c00000"}
                ]
            }]},
            "canvas": {"width": 1000, "height": 500}
        }"##,
    )
    .unwrap();
    let store = ImageStore::new();
    let mut surface = RecordingSurface::new(1000, 500);
    Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &FieldValues::new(), &mut surface)
        .unwrap();

    let texts: Vec<(&str, f32)> = surface.texts().iter().map(|t| (t.0, t.1)).collect();
    // 10 chars at 14.4px = 144px wide, centered on 500.
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].0, "Juara ");
    assert!((texts[0].1 - 428.0).abs() < 1e-3);
    assert_eq!(texts[1].0, "Satu");
    assert!((texts[1].1 - (428.0 + 6.0 * 14.4)).abs() < 1e-3);
}

#[test]
fn test_raster_photo_with_circle_mask() {
    let config = TemplateLayoutConfig::from_json(
        r#"{
            "certificate": {"textLayers": [], "photoLayers": [{
                "id": "photo", "src": "member.png", "xPercent": 0.25, "yPercent": 0.25,
                "widthPercent": 0.5, "heightPercent": 0.5, "fitMode": "cover",
                "mask": {"type": "circle"}
            }]},
            "canvas": {"width": 100, "height": 100}
        }"#,
    )
    .unwrap();
    let mut store = ImageStore::new();
    store.insert_encoded("member.png", solid_png(8, 8, [0, 0, 255, 255]));
    let fonts = FontBook::new();

    let img = Renderer::new(&config, &store)
        .render_image(RenderMode::Certificate, &FieldValues::new(), &fonts, 100, 100)
        .unwrap();

    assert_eq!(img.get_pixel(50, 50), &Rgba([0, 0, 255, 255]));
    // Frame corner is outside the circle.
    assert_eq!(img.get_pixel(26, 26), &Rgba([255, 255, 255, 255]));
    assert_eq!(img.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
}

#[test]
fn test_raster_qr_layer() {
    let config = TemplateLayoutConfig::from_json(
        r##"{
            "certificate": {"textLayers": [], "qrLayers": [{
                "id": "qr", "qrData": "{{CERTIFICATE_URL}}", "xPercent": 0.1, "yPercent": 0.1,
                "widthPercent": 0.5, "heightPercent": 0.5, "darkColor": "#000000", "margin": 0
            }]},
            "canvas": {"width": 200, "height": 200}
        }"##,
    )
    .unwrap();
    let store = ImageStore::new();
    let fonts = FontBook::new();
    let fields = FieldValues::new().with_certificate_url("https://example.invalid/v/1");

    let img = Renderer::new(&config, &store)
        .with_options(RenderOptions::default().with_background(certa::color::Color::rgb(0, 255, 0)))
        .render_image(RenderMode::Certificate, &fields, &fonts, 200, 200)
        .unwrap();

    // Without a quiet zone the top-left module is the finder pattern corner.
    assert_eq!(img.get_pixel(21, 21), &Rgba([0, 0, 0, 255]));
    // Outside the layer the background shows.
    assert_eq!(img.get_pixel(5, 5), &Rgba([0, 255, 0, 255]));
    assert_eq!(img.get_pixel(150, 150), &Rgba([0, 255, 0, 255]));
}

#[test]
fn test_batch_isolates_failures() {
    let config = TemplateLayoutConfig::from_json(
        r#"{
            "certificate": {"textLayers": [{"id": "name"}], "photoLayers": [{
                "id": "photo", "src": "default.png", "widthPercent": 0.5, "heightPercent": 0.5
            }]},
            "canvas": {"width": 40, "height": 20}
        }"#,
    )
    .unwrap();
    let mut store = ImageStore::new();
    store.insert_encoded("default.png", solid_png(2, 2, [9, 9, 9, 255]));
    store.insert_encoded("broken.png", vec![1, 2, 3]);
    let fonts = FontBook::new();

    let batch = vec![
        FieldValues::new().with_text("name", "A"),
        FieldValues::new().with_text("name", "B").with_image("photo", "broken.png"),
        FieldValues::new().with_text("name", "C"),
    ];
    let results = Renderer::new(&config, &store).render_batch(RenderMode::Certificate, &batch, &fonts, 40, 20);

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().layer_id(), Some("photo"));
    assert!(results[2].is_ok());
}

#[test]
fn test_layer_filter_selects_shared_ids() {
    let config = template();
    let store = images();
    let mut surface = RecordingSurface::new(1000, 500);
    let report = Renderer::new(&config, &store)
        .with_options(RenderOptions::default().with_layer_filter(["name", "qr"]))
        .render(RenderMode::Certificate, &fields(), &mut surface)
        .unwrap();
    assert_eq!(report.drawn, vec!["name", "qr"]);
    assert_eq!(
        report.skipped,
        vec!["background", "certificate_no", "frame"]
    );
}

#[test]
fn test_cover_photo_clip_is_recorded() {
    let config = TemplateLayoutConfig::from_json(
        r#"{
            "certificate": {"textLayers": [], "photoLayers": [{
                "id": "photo", "src": "p.png", "x": 10, "y": 10, "width": 40, "height": 20,
                "fitMode": "cover"
            }]},
            "canvas": {"width": 100, "height": 100}
        }"#,
    )
    .unwrap();
    let mut store = ImageStore::new();
    store.insert_encoded("p.png", solid_png(10, 10, [1, 1, 1, 255]));
    let mut surface = RecordingSurface::new(100, 100);
    Renderer::new(&config, &store)
        .render(RenderMode::Certificate, &FieldValues::new(), &mut surface)
        .unwrap();

    let frame = Rect::new(10.0, 10.0, 40.0, 20.0);
    assert_eq!(
        surface.ops(),
        &[DrawOp::DrawImage {
            dest: Rect::new(10.0, 0.0, 40.0, 40.0),
            image_width: 10,
            image_height: 10,
            opacity: 1.0,
            rotation: 0.0,
            clip: Some(ClipShape::Rect(frame)),
        }]
    );
}
