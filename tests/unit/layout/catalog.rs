use super::*;

#[test]
fn builtin_has_all_stock_layouts_in_order() {
    let cat = LayoutCatalog::builtin();
    let ids: Vec<&str> = cat.iter().map(Layout::id).collect();
    assert_eq!(
        ids,
        vec![
            "single",
            "two-horizontal",
            "two-vertical",
            "three-horizontal",
            "three-vertical",
            "three-grid",
            "four-grid",
            "six-grid",
            "nine-grid",
        ]
    );
    for l in cat.iter() {
        assert_eq!(l.canvas(), Canvas::new(1080, 1080));
        l.validate().unwrap();
    }
}

#[test]
fn four_grid_is_four_540_quadrants() {
    let cat = LayoutCatalog::builtin();
    let l = cat.get("four-grid").unwrap();
    assert_eq!(
        l.slots(),
        &[
            Rect::new(0.0, 0.0, 540.0, 540.0),
            Rect::new(540.0, 0.0, 1080.0, 540.0),
            Rect::new(0.0, 540.0, 540.0, 1080.0),
            Rect::new(540.0, 540.0, 1080.0, 1080.0),
        ]
    );
}

#[test]
fn six_grid_cells_are_360_by_540() {
    let cat = LayoutCatalog::builtin();
    let l = cat.get("six-grid").unwrap();
    assert_eq!(l.slot_count(), 6);
    for s in l.slots() {
        assert_eq!(s.width(), 360.0);
        assert_eq!(s.height(), 540.0);
    }
    assert_eq!(l.slot(3), Some(Rect::new(0.0, 540.0, 360.0, 1080.0)));
}

#[test]
fn three_grid_left_column_is_full_height() {
    let cat = LayoutCatalog::builtin();
    let l = cat.get("three-grid").unwrap();
    assert_eq!(l.slot(0), Some(Rect::new(0.0, 0.0, 540.0, 1080.0)));
    assert_eq!(l.slot(2), Some(Rect::new(540.0, 540.0, 1080.0, 1080.0)));
}

#[test]
fn json_catalog_roundtrip_and_duplicate_ids() {
    let json = r#"[
        { "id": "a", "name": "A", "slots": 1, "canvasWidth": 10, "canvasHeight": 10,
          "positions": [ { "x": 0, "y": 0, "width": 10, "height": 10 } ] },
        { "id": "b", "name": "B", "slots": 2, "canvasWidth": 20, "canvasHeight": 10,
          "positions": [ { "x": 0, "y": 0, "width": 10, "height": 10 },
                         { "x": 10, "y": 0, "width": 10, "height": 10 } ] }
    ]"#;
    let cat = LayoutCatalog::from_json_str(json).unwrap();
    assert_eq!(cat.len(), 2);
    assert_eq!(cat.get("b").unwrap().slot_count(), 2);
    assert!(cat.get("c").is_none());

    let dup = json.replace("\"id\": \"b\"", "\"id\": \"a\"");
    let err = LayoutCatalog::from_json_str(&dup).unwrap_err();
    assert!(err.to_string().contains("duplicate layout id"));
}

#[test]
fn invalid_geometry_in_json_is_rejected() {
    let json = r#"[
        { "id": "bad", "name": "Bad", "slots": 1, "canvasWidth": 10, "canvasHeight": 10,
          "positions": [ { "x": 5, "y": 0, "width": 10, "height": 10 } ] }
    ]"#;
    assert!(matches!(
        LayoutCatalog::from_json_str(json),
        Err(CollageError::Serde(_))
    ));
}

#[test]
fn load_reports_missing_file() {
    let err = LayoutCatalog::load("definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("read layout catalog"));
}
