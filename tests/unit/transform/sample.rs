use kurbo::Vec2;

use super::*;

const DEST: f64 = 600.0;

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

fn identity() -> ViewTransform {
    ViewTransform::default()
}

#[test]
fn no_face_uses_centered_min_side_square() {
    let r = compute_sample_rect(1000.0, 800.0, None, &identity(), DEST);
    approx(r.sx, 100.0);
    approx(r.sy, 0.0);
    approx(r.s_width, 800.0);
    approx(r.s_height, 800.0);
}

#[test]
fn no_face_portrait_image_centers_vertically() {
    let r = compute_sample_rect(600.0, 900.0, None, &identity(), DEST);
    approx(r.sx, 0.0);
    approx(r.sy, 150.0);
    approx(r.s_width, 600.0);
}

#[test]
fn face_box_gets_square_with_margin() {
    let b = BoundingBox::new(0.4, 0.3, 0.2, 0.2).unwrap();
    let r = compute_sample_rect(1000.0, 1000.0, Some(&b), &identity(), DEST);
    approx(r.sx, 320.0);
    approx(r.sy, 220.0);
    approx(r.s_width, 360.0);
    approx(r.s_height, 360.0);
}

#[test]
fn face_box_on_non_square_image_uses_larger_pixel_side() {
    let b = BoundingBox::new(0.1, 0.1, 0.1, 0.3).unwrap();
    let r = compute_sample_rect(2000.0, 500.0, Some(&b), &identity(), DEST);
    // width 200px, height 150px -> 200 * 1.8
    approx(r.s_width, 360.0);
    approx(r.s_width, r.s_height);
    let (cx, cy) = r.center();
    approx(cx, 300.0);
    approx(cy, 125.0);
}

#[test]
fn zoom_two_halves_size_and_keeps_center() {
    let b = BoundingBox::new(0.25, 0.25, 0.5, 0.5).unwrap();
    let base = compute_sample_rect(800.0, 800.0, Some(&b), &identity(), DEST);
    let zoomed = compute_sample_rect(
        800.0,
        800.0,
        Some(&b),
        &ViewTransform::new(2.0, Vec2::ZERO),
        DEST,
    );
    approx(zoomed.s_width, base.s_width / 2.0);
    approx(zoomed.s_height, base.s_height / 2.0);
    let (bx, by) = base.center();
    let (zx, zy) = zoomed.center();
    approx(bx, zx);
    approx(by, zy);
}

#[test]
fn pan_shifts_by_fraction_of_sample_size() {
    let base = compute_sample_rect(1000.0, 800.0, None, &identity(), DEST);
    let panned = compute_sample_rect(
        1000.0,
        800.0,
        None,
        &ViewTransform::new(1.0, Vec2::new(60.0, -30.0)),
        DEST,
    );
    approx(panned.sx, base.sx - 60.0 * base.s_width / DEST);
    approx(panned.sy, base.sy + 30.0 * base.s_height / DEST);
    approx(panned.s_width, base.s_width);
}

#[test]
fn pan_distance_scales_with_zoomed_sample() {
    let view = ViewTransform::new(2.0, Vec2::new(60.0, 0.0));
    let unpanned = compute_sample_rect(1000.0, 800.0, None, &ViewTransform::new(2.0, Vec2::ZERO), DEST);
    let panned = compute_sample_rect(1000.0, 800.0, None, &view, DEST);
    // 400px sample at zoom 2: a 60px drag moves 40 source px.
    approx(unpanned.sx - panned.sx, 40.0);
}

#[test]
fn extreme_pan_is_not_clamped() {
    let r = compute_sample_rect(
        1000.0,
        800.0,
        None,
        &ViewTransform::new(1.0, Vec2::new(10_000.0, 0.0)),
        DEST,
    );
    assert!(r.sx < -10_000.0);
}

#[test]
fn visible_mapping_inside_image_covers_whole_dest() {
    let sample = compute_sample_rect(1000.0, 800.0, None, &identity(), DEST);
    let dest = Rect::new(240.0, 320.0, 840.0, 920.0);
    let m = visible_mapping(sample, 1000.0, 800.0, dest).unwrap();
    approx(m.dest.x0, dest.x0);
    approx(m.dest.y0, dest.y0);
    approx(m.dest.x1, dest.x1);
    approx(m.dest.y1, dest.y1);
    approx(m.source.width(), 800.0);
}

#[test]
fn visible_mapping_trims_out_of_bounds_part() {
    // Pan right by half the destination: left half of dest has no source pixels.
    let sample = compute_sample_rect(
        1000.0,
        1000.0,
        None,
        &ViewTransform::new(1.0, Vec2::new(300.0, 0.0)),
        DEST,
    );
    let dest = Rect::new(0.0, 0.0, 600.0, 600.0);
    let m = visible_mapping(sample, 1000.0, 1000.0, dest).unwrap();
    approx(m.source.x0, 0.0);
    approx(m.dest.x0, 300.0);
    approx(m.dest.x1, 600.0);
}

#[test]
fn visible_mapping_none_when_fully_outside() {
    let sample = SampleRect {
        sx: 2000.0,
        sy: 0.0,
        s_width: 100.0,
        s_height: 100.0,
    };
    assert!(visible_mapping(sample, 1000.0, 1000.0, Rect::new(0.0, 0.0, 600.0, 600.0)).is_none());
}

#[test]
fn degenerate_zoom_in_public_fields_samples_like_zoom_one() {
    let expected = compute_sample_rect(1000.0, 800.0, None, &identity(), DEST);
    for zoom in [0.0, -1.0, 0.5, f64::NAN, f64::INFINITY] {
        let view = ViewTransform {
            zoom,
            pan: Vec2::ZERO,
        };
        let r = compute_sample_rect(1000.0, 800.0, None, &view, DEST);
        assert_eq!(r, expected, "zoom {zoom}");
    }
}
