use std::io::Cursor;

use super::*;
use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::gesture::input::PointerButton;
use crate::layout::catalog::LayoutCatalog;
use crate::render::export::InMemoryExportSink;

fn png(w: u32, h: u32, rgb: [u8; 3]) -> ImageSource {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageSource::from_bytes(buf)
}

fn layout(id: &str) -> Layout {
    LayoutCatalog::builtin().get(id).unwrap().clone()
}

fn session() -> CollageSession {
    CollageSession::new(SessionConfig {
        decode_threads: Some(2),
        ..SessionConfig::default()
    })
    .unwrap()
}

#[test]
fn new_session_is_empty_and_clean() {
    let s = session();
    assert!(s.layout().is_none());
    assert!(s.placed().is_empty());
    assert!(!s.is_dirty());
    assert!(s.surface().is_placeholder());
    assert_eq!(s.background().as_str(), "#ffffff");
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = SessionConfig {
        wheel_step: -1.0,
        ..SessionConfig::default()
    };
    assert!(CollageSession::new(cfg).is_err());
}

#[test]
fn render_without_layout_is_noop() {
    let mut s = session();
    s.set_background("#000");
    assert_eq!(s.render_if_dirty().unwrap(), Some(RenderOutcome::NoLayout));
    assert!(s.surface().is_placeholder());
    assert!(s.export_png().is_err());
}

#[test]
fn sources_are_clamped_to_slot_count() {
    let mut s = session();
    s.set_layout(layout("two-horizontal"));
    s.set_sources(vec![png(1, 1, [1, 1, 1]); 3]);
    assert_eq!(s.sources().len(), 2);
    assert_eq!(s.placed().len(), 2);

    s.add_sources([png(1, 1, [2, 2, 2])]);
    assert_eq!(s.sources().len(), 2);
}

#[test]
fn without_layout_sources_accumulate() {
    let mut s = session();
    s.add_sources(vec![png(1, 1, [1, 1, 1]); 5]);
    assert_eq!(s.sources().len(), 5);
    assert!(s.placed().is_empty());

    // Choosing a smaller layout keeps the list; only the first slots are placed.
    s.set_layout(layout("two-vertical"));
    assert_eq!(s.sources().len(), 5);
    assert_eq!(s.placed().len(), 2);
}

#[test]
fn rearranging_issues_fresh_ids_and_identity_transforms() {
    let mut s = session();
    s.set_layout(layout("four-grid"));
    s.set_sources(vec![png(2, 2, [9, 9, 9]); 2]);
    let first = s.placed()[0].id;
    s.update_position(first, TransformPatch::offset(30.0, 0.0));
    assert_eq!(s.transform(first).x, 30.0);

    s.set_layout(layout("two-vertical"));
    let second = s.placed()[0].id;
    assert_ne!(first, second);
    assert_eq!(s.transform(second), Transform::IDENTITY);
    assert_eq!(s.transform(first), Transform::IDENTITY);
}

#[test]
fn remove_source_shifts_later_photos_up() {
    let mut s = session();
    s.set_layout(layout("three-horizontal"));
    let a = png(1, 1, [1, 0, 0]);
    let b = png(1, 1, [0, 1, 0]);
    let c = png(1, 1, [0, 0, 1]);
    s.set_sources(vec![a.clone(), b, c.clone()]);

    assert!(s.remove_source(1).is_some());
    assert!(s.remove_source(7).is_none());
    assert_eq!(s.placed().len(), 2);
    assert_eq!(s.placed()[0].source, a);
    assert_eq!(s.placed()[1].source, c);
    assert_eq!(s.placed()[1].slot_index, 1);
}

#[test]
fn unknown_ids_are_ignored() {
    let mut s = session();
    s.set_layout(layout("single"));
    s.render_now().unwrap();
    s.update_position(PlacedImageId(999), TransformPatch::scale(2.0));
    assert!(!s.is_dirty());
    assert_eq!(s.transform(PlacedImageId(999)), Transform::IDENTITY);
}

#[test]
fn dirty_flag_coalesces_updates() {
    let mut s = session();
    s.set_layout(layout("single"));
    s.set_sources(vec![png(4, 4, [200, 0, 0])]);
    s.wait_for_bitmaps();
    let id = s.placed()[0].id;

    for i in 0..10 {
        s.update_position(id, TransformPatch::offset(f64::from(i), 0.0));
    }
    assert!(s.is_dirty());
    assert!(s.render_if_dirty().unwrap().is_some());
    assert!(!s.is_dirty());
    assert_eq!(s.render_if_dirty().unwrap(), None);
}

#[test]
fn decoded_bitmaps_show_up_after_wait() {
    let mut s = session();
    s.set_layout(layout("two-horizontal"));
    s.set_sources(vec![png(8, 8, [255, 0, 0]), png(8, 8, [0, 0, 255])]);
    s.wait_for_bitmaps();
    assert_eq!(s.pending_decodes(), 0);

    let outcome = s.render_if_dirty().unwrap();
    assert_eq!(
        outcome,
        Some(RenderOutcome::Painted {
            drawn: 2,
            skipped: 0
        })
    );
    assert_eq!(s.surface().pixel(270, 540), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(s.surface().pixel(810, 540), Some(Rgba8::opaque(0, 0, 255)));
}

#[test]
fn input_drives_transforms() {
    let mut s = session();
    s.set_layout(layout("four-grid"));
    s.set_sources(vec![png(2, 2, [0, 0, 0]); 4]);
    let mapping = DisplayMapping::identity(Canvas::new(1080, 1080));
    let target = s.placed()[3].id;

    s.handle_input(
        &InputEvent::PointerDown {
            position: Point::new(600.0, 600.0),
            button: PointerButton::Primary,
        },
        mapping,
    );
    assert_eq!(s.gesture_phase(), GesturePhase::Dragging);
    let effect = s.handle_input(
        &InputEvent::PointerMove {
            position: Point::new(650.0, 580.0),
        },
        mapping,
    );
    assert!(matches!(effect, GestureEffect::Update { id, .. } if id == target));
    assert_eq!(s.transform(target).x, 50.0);
    assert_eq!(s.transform(target).y, -20.0);

    s.handle_input(
        &InputEvent::Wheel {
            position: Point::new(600.0, 600.0),
            delta_y: 1.0,
        },
        mapping,
    );
    assert!((s.transform(target).scale - 0.9).abs() < 1e-9);

    // Rearranging drops the in-flight drag.
    s.set_background("#123");
    s.set_sources(vec![png(2, 2, [0, 0, 0]); 4]);
    assert_eq!(s.gesture_phase(), GesturePhase::Idle);
}

#[test]
fn export_to_sink_uses_thumbnail_name() {
    let mut s = session();
    s.set_layout(layout("single"));
    let mut sink = InMemoryExportSink::new();
    let name = s.export_to(&mut sink).unwrap();
    assert!(name.starts_with("thumbnail-") && name.ends_with(".png"));
    assert_eq!(sink.exports().len(), 1);
    assert_eq!(sink.exports()[0].0, name);

    let decoded = image::load_from_memory(&sink.exports()[0].1).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1080, 1080));
}

#[test]
fn reset_restores_defaults() {
    let mut s = session();
    s.set_layout(layout("four-grid"));
    s.set_sources(vec![png(2, 2, [5, 5, 5]); 4]);
    s.set_background("#000000");
    s.render_now().unwrap();

    s.reset();
    assert!(s.layout().is_none());
    assert!(s.sources().is_empty());
    assert!(s.placed().is_empty());
    assert_eq!(s.background().as_str(), "#ffffff");
    assert!(s.surface().is_placeholder());
    assert!(!s.is_dirty());
}
