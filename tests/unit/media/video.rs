use super::*;

fn frame(v: u8) -> PreparedImage {
    PreparedImage::solid(2, 2, [v, v, v, 255]).unwrap()
}

#[test]
fn frame_at_loops() {
    let clip = VideoClip::new(Fps::new(2, 1).unwrap(), vec![frame(0), frame(1), frame(2)])
        .unwrap();
    assert_eq!(clip.duration_secs(), 1.5);
    assert_eq!(clip.frame_at(0.0).rgba8_premul[0], 0);
    assert_eq!(clip.frame_at(0.5).rgba8_premul[0], 1);
    assert_eq!(clip.frame_at(1.4).rgba8_premul[0], 2);
    assert_eq!(clip.frame_at(1.5).rgba8_premul[0], 0);
    assert_eq!(clip.frame_at(-3.0).rgba8_premul[0], 0);
    assert_eq!(clip.frame_at(f64::NAN).rgba8_premul[0], 0);
}

#[test]
fn clip_rejects_empty_and_mixed_sizes() {
    let fps = Fps::new(30, 1).unwrap();
    assert!(VideoClip::new(fps, vec![]).is_err());
    let odd = PreparedImage::solid(3, 2, [0, 0, 0, 255]).unwrap();
    assert!(VideoClip::new(fps, vec![frame(0), odd]).is_err());
}
