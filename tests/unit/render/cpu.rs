use super::*;
use crate::foundation::core::Fps;
use crate::media::handle::MediaHandle;
use crate::media::video::VideoClip;
use crate::render::SceneContent;
use crate::script::model::Speaker;

fn renderer(w: u32, h: u32) -> CpuRenderer {
    CpuRenderer::new(Canvas::new(w, h).unwrap(), RenderSettings::default()).unwrap()
}

fn content(media: MediaHandle, caption: &str) -> SceneContent {
    SceneContent {
        speaker: Speaker::Sage,
        caption: caption.to_string(),
        duration_secs: 6.0,
        media,
    }
}

fn view<'a>(scene: &'a SceneContent, index: usize, progress: f64, opacity: f64) -> FrameView<'a> {
    FrameView {
        title: "Photosynthesis",
        scene,
        scene_index: index,
        scene_count: 2,
        progress,
        opacity,
        media_time: 0.0,
        elapsed_secs: 0.0,
    }
}

fn assert_near(actual: [u8; 4], expected: [u8; 4], tol: u8) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(e) <= tol, "{actual:?} vs {expected:?}");
    }
}

#[test]
fn placeholder_fills_canvas_when_media_missing() {
    let mut r = renderer(200, 100);
    let scene = content(MediaHandle::Placeholder, "");
    let frame = r.render(&view(&scene, 0, 0.5, 1.0)).unwrap();
    assert_eq!((frame.width, frame.height), (200, 100));
    assert!(frame.premultiplied);
    assert_near(frame.pixel(100, 50).unwrap(), [30, 41, 59, 255], 1);
}

#[test]
fn cover_image_is_drawn_under_scrim() {
    let mut r = renderer(200, 100);
    let red = PreparedImage::solid(10, 10, [255, 0, 0, 255]).unwrap();
    let scene = content(MediaHandle::image(red), "");
    let frame = r.render(&view(&scene, 0, 0.5, 1.0)).unwrap();
    assert_near(frame.pixel(100, 50).unwrap(), [153, 0, 0, 255], 3);
    assert_near(frame.pixel(2, 2).unwrap(), [153, 0, 0, 255], 3);
}

#[test]
fn scene_opacity_fades_layers_but_not_chrome() {
    let mut r = renderer(200, 100);
    let scene = content(MediaHandle::Placeholder, "Plants make food");

    let hidden = r.render(&view(&scene, 1, 0.0, 0.0)).unwrap();
    assert_eq!(hidden.pixel(100, 50).unwrap(), [0, 0, 0, 255]);
    // Progress bar: scene 2 of 2 at progress 0 fills half of the track.
    assert_near(hidden.pixel(30, 96).unwrap(), [59, 130, 246, 255], 2);
    assert_near(hidden.pixel(150, 96).unwrap(), [77, 77, 77, 255], 2);

    let half = r.render(&view(&scene, 1, 0.0, 0.5)).unwrap();
    assert_near(half.pixel(100, 30).unwrap(), [15, 20, 29, 255], 3);
}

#[test]
fn caption_box_darkens_lower_third() {
    let mut r = renderer(200, 100);
    let with_caption = content(MediaHandle::Placeholder, "Plants make food");
    let frame = r.render(&view(&with_caption, 0, 0.0, 1.0)).unwrap();
    let above = frame.pixel(100, 30).unwrap();
    let inside = frame.pixel(100, 80).unwrap();
    assert!(inside[2] < above[2] / 2, "{inside:?} vs {above:?}");

    let empty = content(MediaHandle::Placeholder, "   ");
    let frame = r.render(&view(&empty, 0, 0.0, 1.0)).unwrap();
    assert_eq!(frame.pixel(100, 80), frame.pixel(100, 30));
}

#[test]
fn captions_can_be_disabled() {
    let settings = RenderSettings {
        show_captions: false,
        ..RenderSettings::default()
    };
    let mut r = CpuRenderer::new(Canvas::new(200, 100).unwrap(), settings).unwrap();
    let scene = content(MediaHandle::Placeholder, "Plants make food");
    let frame = r.render(&view(&scene, 0, 0.9, 1.0)).unwrap();
    assert_eq!(frame.pixel(100, 80), frame.pixel(100, 30));
}

#[test]
fn image_paint_is_cached_per_buffer() {
    let mut r = renderer(64, 64);
    let img = MediaHandle::image(PreparedImage::solid(4, 4, [0, 0, 255, 255]).unwrap());
    let scene = content(img, "");
    r.render(&view(&scene, 0, 0.1, 1.0)).unwrap();
    r.render(&view(&scene, 0, 0.2, 1.0)).unwrap();
    assert_eq!(r.image_cache.len(), 1);
    assert_eq!(r.lru.len(), 1);
}

#[test]
fn video_frames_are_evicted_by_byte_budget() {
    let frames = (0..10u8)
        .map(|i| PreparedImage::solid(4, 4, [i, 0, 0, 255]).unwrap())
        .collect();
    let clip = VideoClip::new(Fps::new(10, 1).unwrap(), frames).unwrap();
    let scene = content(MediaHandle::video(clip), "");
    let frame_bytes = 4 * 4 * 4;
    let mut r = renderer(64, 64).with_image_cache_budget(3 * frame_bytes);

    for i in 0..10 {
        let mut v = view(&scene, 0, 0.5, 1.0);
        v.media_time = f64::from(i) / 10.0 + 0.01;
        r.render(&v).unwrap();
        assert!(r.cached_image_bytes() <= 3 * frame_bytes);
    }
    assert_eq!(r.image_cache.len(), 3);
    assert_eq!(r.lru.len(), 3);

    let r = r.with_image_cache_budget(1);
    assert_eq!(r.image_cache.len(), 1);
    assert_eq!(r.cached_image_bytes(), frame_bytes);
}

#[test]
fn missing_font_file_is_an_error() {
    let settings = RenderSettings {
        font_path: Some("/definitely/missing/font.ttf".into()),
        ..RenderSettings::default()
    };
    assert!(CpuRenderer::new(Canvas::new(8, 8).unwrap(), settings).is_err());
}
