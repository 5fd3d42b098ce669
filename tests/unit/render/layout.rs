use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn cover_crops_wide_media_horizontally() {
    let r = cover_rect(canvas(100, 100), 200, 100).unwrap();
    assert_eq!(r, Rect::new(-50.0, 0.0, 150.0, 100.0));
}

#[test]
fn cover_crops_tall_media_vertically() {
    let r = cover_rect(canvas(160, 90), 90, 160).unwrap();
    let scale = 160.0 / 90.0;
    assert!((r.width() - 160.0).abs() < 1e-9);
    assert!((r.height() - 160.0 * scale).abs() < 1e-9);
    assert!((r.center().y - 45.0).abs() < 1e-9);
    assert!(r.y0 < 0.0 && r.y1 > 90.0);
}

#[test]
fn cover_never_letterboxes() {
    for (mw, mh) in [(1, 1), (640, 480), (30, 1000), (1920, 1080)] {
        let r = cover_rect(canvas(1280, 720), mw, mh).unwrap();
        assert!(r.x0 <= 0.0 && r.y0 <= 0.0);
        assert!(r.x1 >= 1280.0 - 1e-9 && r.y1 >= 720.0 - 1e-9);
    }
    assert!(cover_rect(canvas(10, 10), 0, 5).is_none());
}

#[test]
fn wrap_breaks_greedily() {
    let mut m = ApproxMeasure { em_advance: 1.0 };
    let lines = wrap_words("aa bb cc dd", 5.0, 1.0, &mut m);
    assert_eq!(lines, vec!["aa bb", "cc dd"]);
}

#[test]
fn wrap_keeps_long_word_whole() {
    let mut m = ApproxMeasure { em_advance: 1.0 };
    let lines = wrap_words("a chlorophyll b", 4.0, 1.0, &mut m);
    assert_eq!(lines, vec!["a", "chlorophyll", "b"]);
}

#[test]
fn wrap_empty_caption_has_no_lines() {
    let mut m = ApproxMeasure::default();
    assert!(wrap_words("", 100.0, 10.0, &mut m).is_empty());
    assert!(wrap_words("   \n ", 100.0, 10.0, &mut m).is_empty());
}

#[test]
fn caption_lines_stagger_in() {
    assert_eq!(caption_line_anim(0.1, 0).opacity, 0.0);
    assert_eq!(caption_line_anim(0.1, 0).y_offset, CAPTION_SLIDE_PX);

    let first = caption_line_anim(0.35, 0);
    let second = caption_line_anim(0.35, 1);
    assert!(first.opacity > second.opacity);

    let done = caption_line_anim(1.0, 3);
    assert_eq!(done.opacity, 1.0);
    assert_eq!(done.y_offset, 0.0);
}

#[test]
fn progress_fraction_is_monotonic_across_scenes() {
    let n = 3;
    let mut last = -1.0;
    for index in 0..n {
        for step in 0..=10 {
            let f = progress_fraction(index, step as f64 / 10.0, n);
            assert!(f >= last, "{f} < {last}");
            last = f;
        }
    }
    assert_eq!(last, 1.0);
    assert_eq!(progress_fraction(0, 0.5, 0), 0.0);
}

#[test]
fn chrome_matches_canvas_proportions() {
    let c = canvas(1000, 500);
    let l = ChromeLayout::for_canvas(c, CAPTION_WIDTH_FRACTION);
    assert_eq!(l.title_y, 25.0);
    assert_eq!(l.title_size, 40.0);
    assert_eq!(l.caption_size, 35.0);
    assert!((l.line_height - 49.0).abs() < 1e-9);
    assert_eq!(l.progress_track, Rect::new(100.0, 475.0, 900.0, 479.0));

    let b = l.caption_box(c, 2);
    assert_eq!(b.x0, 80.0);
    assert_eq!(b.x1, 920.0);
    assert!((b.center().y - 400.0).abs() < 1e-9);
    assert!((l.caption_line_center_y(2, 0) - 375.5).abs() < 1e-9);
}

#[test]
fn counter_label_is_one_based() {
    assert_eq!(counter_label(1, 4, 5.9), "Scene 2/4 • 5s");
}
