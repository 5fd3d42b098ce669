use super::*;

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_validates_and_reports_sizes() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());

    let c = Canvas::new(16, 9).unwrap();
    assert_eq!(c.rgba_len(), 16 * 9 * 4);
    assert_eq!(c.bounds(), Rect::new(0.0, 0.0, 16.0, 9.0));
}
