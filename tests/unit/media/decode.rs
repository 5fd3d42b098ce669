use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_garbage_fails() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn from_premul_checks_length() {
    assert!(PreparedImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(PreparedImage::from_premul_rgba8(0, 2, vec![]).is_err());
    let img = PreparedImage::solid(2, 3, [1, 2, 3, 255]).unwrap();
    assert_eq!(img.rgba8_premul.len(), 24);
    assert_eq!(&img.rgba8_premul[20..24], &[1, 2, 3, 255]);
}

#[test]
fn load_missing_file_fails() {
    let missing = std::env::temp_dir().join("slidesage-definitely-missing.png");
    assert!(load_image_file(&missing).is_err());
}
