use super::*;

#[test]
fn all_zero_box_means_no_face() {
    assert!(BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_none());
    assert!(BoundingBox::new(0.2, 0.2, 0.3, 0.0).is_none());
    assert!(BoundingBox::new(0.2, f64::NAN, 0.3, 0.3).is_none());
    assert!(BoundingBox::new(0.4, 0.3, 0.2, 0.2).is_some());
}

#[test]
fn bbox_center_scales_to_pixels() {
    let b = BoundingBox::new(0.4, 0.3, 0.2, 0.2).unwrap();
    let c = b.center_px(1000.0, 1000.0);
    assert!((c.x - 500.0).abs() < 1e-9);
    assert!((c.y - 400.0).abs() < 1e-9);
}

#[test]
fn zoom_is_clamped_to_slider_range() {
    let v = ViewTransform::default();
    assert_eq!(v.with_zoom(0.5, 3.0).zoom, 1.0);
    assert_eq!(v.with_zoom(7.0, 3.0).zoom, 3.0);
    assert_eq!(v.with_zoom(2.25, 3.0).zoom, 2.25);
    assert_eq!(v.with_zoom(f64::INFINITY, 3.0).zoom, 1.0);
}

#[test]
fn non_finite_pan_is_ignored() {
    let v = ViewTransform::default().with_pan(Vec2::new(f64::NAN, 1.0));
    assert!(v.is_identity());
}

#[test]
fn new_raises_zoom_to_one_and_drops_non_finite_values() {
    assert_eq!(ViewTransform::new(0.0, Vec2::ZERO).zoom, 1.0);
    assert_eq!(ViewTransform::new(-2.0, Vec2::ZERO).zoom, 1.0);
    assert_eq!(ViewTransform::new(f64::NAN, Vec2::ZERO).zoom, 1.0);
    assert_eq!(ViewTransform::new(4.5, Vec2::ZERO).zoom, 4.5);
    assert!(ViewTransform::new(1.0, Vec2::new(f64::INFINITY, 0.0)).is_identity());

    let raw = ViewTransform {
        zoom: 0.0,
        pan: Vec2::new(5.0, f64::NAN),
    };
    assert!(raw.sanitized().is_identity());
}

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(432, 540).unwrap(), Canvas::PREVIEW);
}

#[test]
fn preview_scale_is_uniform() {
    let s = Canvas::PREVIEW.scale_from(Canvas::EXPORT);
    assert!((s.x - 0.4).abs() < 1e-12);
    assert!((s.y - 0.4).abs() < 1e-12);
}

#[test]
fn hex_background_parses_opaque() {
    let c = Rgba8::from_hex("#0A011A").unwrap();
    assert_eq!(c, Rgba8::opaque(0x0A, 0x01, 0x1A));
    assert_eq!(Rgba8::from_hex("ffffff80").unwrap().a, 0x80);
    assert!(Rgba8::from_hex("#12").is_err());
    assert!(Rgba8::from_hex("#zzzzzz").is_err());
}
