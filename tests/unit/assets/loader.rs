use std::io::Cursor;

use super::*;
use crate::foundation::core::Rect;
use crate::scene::placement::ImageSource;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn placed(id: u64, bytes: Vec<u8>) -> PlacedImage {
    PlacedImage {
        id: PlacedImageId(id),
        source: ImageSource::from_bytes(bytes),
        slot_index: id as usize,
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
    }
}

#[test]
fn zero_threads_is_rejected() {
    assert!(ImageLoader::new(Some(0)).is_err());
}

#[test]
fn decodes_all_requested_ids() {
    let mut loader = ImageLoader::new(Some(2)).unwrap();
    let set = vec![placed(0, png(4, 3)), placed(1, png(2, 2))];
    assert_eq!(loader.request(&set), 2);

    let events = loader.wait();
    assert_eq!(events.len(), 2);
    assert_eq!(loader.pending_count(), 0);
    assert_eq!(loader.ready_count(), 2);

    let b0 = loader.bitmap(PlacedImageId(0)).unwrap();
    assert_eq!((b0.width(), b0.height()), (4, 3));
}

#[test]
fn one_failure_does_not_abort_the_rest() {
    let mut loader = ImageLoader::new(Some(2)).unwrap();
    let set = vec![
        placed(0, png(2, 2)),
        placed(1, b"garbage".to_vec()),
        placed(2, png(3, 3)),
    ];
    loader.request(&set);
    let events = loader.wait();

    assert!(events.contains(&LoadEvent::Ready(PlacedImageId(0))));
    assert!(events.contains(&LoadEvent::Ready(PlacedImageId(2))));
    assert!(events.iter().any(
        |e| matches!(e, LoadEvent::Failed { id, .. } if *id == PlacedImageId(1))
    ));
    assert!(loader.bitmap(PlacedImageId(1)).is_none());
    assert!(matches!(
        loader.state(PlacedImageId(1)),
        Some(LoadState::Failed(_))
    ));
}

#[test]
fn cached_ids_are_not_redecoded() {
    let mut loader = ImageLoader::new(Some(1)).unwrap();
    let set = vec![placed(0, png(2, 2))];
    loader.request(&set);
    loader.wait();

    let handle = loader.handle(PlacedImageId(0)).unwrap();
    assert!(loader.is_resolved(handle));

    // Same id with different bytes: cache is keyed by id, not content.
    let again = vec![placed(0, png(9, 9))];
    assert_eq!(loader.request(&again), 0);
    assert_eq!(loader.bitmap(PlacedImageId(0)).unwrap().width(), 2);
    assert_eq!(loader.handle(PlacedImageId(0)), Some(handle));
}

#[test]
fn evicted_ids_ignore_late_results() {
    let mut loader = ImageLoader::new(Some(1)).unwrap();
    loader.request(&[placed(0, png(2, 2))]);
    let old = loader.handle(PlacedImageId(0)).unwrap();

    // Evict, then request the same id again with a fresh ticket.
    loader.request(&[]);
    assert!(loader.state(PlacedImageId(0)).is_none());
    loader.request(&[placed(0, png(5, 5))]);
    let new = loader.handle(PlacedImageId(0)).unwrap();
    assert_ne!(old, new);

    loader.wait();
    assert!(!loader.is_resolved(old));
    assert!(loader.is_resolved(new));
    assert_eq!(loader.bitmap(PlacedImageId(0)).unwrap().width(), 5);
}

#[test]
fn poll_is_non_blocking_and_tolerates_partial_results() {
    let mut loader = ImageLoader::new(Some(1)).unwrap();
    assert!(loader.poll().is_empty());
    loader.request(&[placed(0, png(2, 2)), placed(1, png(2, 2))]);

    let mut seen = loader.poll().len();
    seen += loader.wait().len();
    assert_eq!(seen, 2);
    assert!(loader.poll().is_empty());
}

#[test]
fn hashmap_lookup_works_as_bitmap_source() {
    let mut map = HashMap::new();
    map.insert(
        PlacedImageId(7),
        Bitmap::from_rgba8(1, 1, vec![0, 0, 0, 255]).unwrap(),
    );
    assert!(map.bitmap(PlacedImageId(7)).is_some());
    assert!(map.bitmap(PlacedImageId(8)).is_none());
}
