use super::*;

fn frame(width: u32, height: u32, px: [u8; 4]) -> RenderedFrame {
    RenderedFrame {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn png_roundtrips_dimensions_and_opaque_pixels() {
    let exported = encode_png(&frame(6, 4, [10, 1, 26, 255]), "game-on-photo.png").unwrap();
    assert_eq!(exported.file_name, "game-on-photo.png");
    assert_eq!(exported.mime_type, "image/png");

    let decoded = image::load_from_memory(&exported.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (6, 4));
    assert_eq!(decoded.get_pixel(3, 2).0, [10, 1, 26, 255]);
}

#[test]
fn png_stores_straight_alpha() {
    let exported = encode_png(&frame(1, 1, [64, 0, 0, 128]), "x.png").unwrap();
    let decoded = image::load_from_memory(&exported.bytes).unwrap().to_rgba8();
    let [r, _, _, a] = decoded.get_pixel(0, 0).0;
    assert_eq!(a, 128);
    assert!((i32::from(r) - 128).abs() <= 1);
}

#[test]
fn file_name_gets_png_extension() {
    let exported = encode_png(&frame(1, 1, [0, 0, 0, 255]), "portrait").unwrap();
    assert_eq!(exported.file_name, "portrait.png");
}

#[test]
fn file_name_with_path_is_rejected() {
    let err = encode_png(&frame(1, 1, [0, 0, 0, 255]), "../evil.png").unwrap_err();
    assert!(matches!(err, FrameError::Export(_)));
}

#[test]
fn short_buffer_is_export_error() {
    let mut f = frame(2, 2, [0, 0, 0, 255]);
    f.data.truncate(4);
    assert!(matches!(encode_png(&f, "a.png"), Err(FrameError::Export(_))));
}

#[test]
fn default_share_details_match_campaign() {
    let d = ShareDetails::default();
    assert_eq!(d.title, "GAME ON!");
    assert!(d.text.contains(&d.url));
}
