use super::*;

#[test]
fn builtin_frame_matches_design_canvas() {
    let frame = FrameGraphic::builtin().unwrap();
    let (w, h) = frame.size();
    assert_eq!(w as u32, Canvas::EXPORT.width);
    assert_eq!(h as u32, Canvas::EXPORT.height);
}

#[test]
fn photo_circle_dest_square() {
    let c = PhotoCircle::DEFAULT;
    assert_eq!(c.dest_size(), 600.0);
    assert_eq!(c.dest_rect(), Rect::new(240.0, 320.0, 840.0, 920.0));
}

#[test]
fn rasterize_leaves_photo_circle_transparent() {
    let frame = FrameGraphic::builtin().unwrap();
    let canvas = Canvas::new(108, 135).unwrap();
    let px = frame.rasterize(canvas).unwrap();
    assert_eq!(px.len(), 108 * 135 * 4);

    // Design (540, 500): inside the ring, clear of the grid lines.
    let idx = (50 * 108 + 54) * 4;
    assert_eq!(px[idx + 3], 0);

    // Top-left corner triangle is opaque red.
    assert_eq!(px[3], 255);
    assert!(px[0] > 200);
}

#[test]
fn invalid_svg_is_frame_load_error() {
    let err = FrameGraphic::from_svg_bytes(b"<svg").unwrap_err();
    assert!(matches!(err, FrameError::FrameLoad(_)));
}

#[test]
fn missing_frame_file_is_frame_load_error() {
    let err = FrameGraphic::from_path(Path::new("/nonexistent/frame.svg")).unwrap_err();
    assert!(matches!(err, FrameError::FrameLoad(_)));
}
