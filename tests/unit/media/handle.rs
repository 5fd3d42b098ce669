use super::*;
use crate::foundation::core::Fps;

fn solid(v: u8) -> PreparedImage {
    PreparedImage::solid(4, 2, [v, v, v, 255]).unwrap()
}

#[test]
fn placeholder_is_default_and_has_no_image() {
    let h = MediaHandle::default();
    assert!(h.is_placeholder());
    assert!(h.image_at(1.0).is_none());
    assert_eq!(h.kind(), "placeholder");
}

#[test]
fn image_ignores_media_time() {
    let h = MediaHandle::image(solid(7));
    assert_eq!(h.image_at(0.0).unwrap().rgba8_premul[0], 7);
    assert_eq!(h.image_at(99.0).unwrap().rgba8_premul[0], 7);
    assert!(!h.transport().is_playing());
}

#[test]
fn video_samples_by_media_time_and_gets_playhead() {
    let clip = VideoClip::new(Fps::new(1, 1).unwrap(), vec![solid(1), solid(2)]).unwrap();
    let h = MediaHandle::video(clip);
    assert_eq!(h.image_at(0.2).unwrap().rgba8_premul[0], 1);
    assert_eq!(h.image_at(1.2).unwrap().rgba8_premul[0], 2);
    assert_eq!(h.image_at(2.2).unwrap().rgba8_premul[0], 1);

    let mut t = h.transport();
    t.play(5.0).unwrap();
    assert_eq!(t.position(6.0), 1.0);
}
