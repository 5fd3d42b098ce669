use super::*;

#[test]
fn window_caps_at_half_second_and_half_scene() {
    let f = FadeEnvelope::default();
    assert_eq!(f.window_secs(8.0), 0.5);
    assert_eq!(f.window_secs(1.0), 0.5);
    assert_eq!(f.window_secs(0.6), 0.3);
    assert_eq!(f.window_secs(0.0), 0.0);
    assert_eq!(f.window_secs(f64::NAN), 0.0);
}

#[test]
fn envelope_ramps_up_holds_and_ramps_down() {
    let f = FadeEnvelope::default();
    let d = 10.0;
    assert_eq!(f.opacity_at(0.0, d), 0.0);
    assert!(f.opacity_at(0.01, d) > 0.0 && f.opacity_at(0.01, d) < 1.0);
    assert_eq!(f.opacity_at(0.5, d), 1.0);
    assert!(f.opacity_at(0.99, d) < 1.0);
    assert!(f.opacity_at(1.0, d).abs() < 1e-12);
}

#[test]
fn envelope_stays_in_unit_range_and_is_continuous() {
    let f = FadeEnvelope::default();
    for &d in &[0.2, 0.7, 1.0, 3.0, 12.5] {
        let steps = 2000;
        let mut prev = f.opacity_at(0.0, d);
        for i in 1..=steps {
            let p = f64::from(i) / f64::from(steps);
            let o = f.opacity_at(p, d);
            assert!((0.0..=1.0).contains(&o), "d={d} p={p} o={o}");
            assert!((o - prev).abs() < 0.05, "jump at d={d} p={p}: {prev} -> {o}");
            prev = o;
        }
    }
}

#[test]
fn short_scene_windows_meet_at_midpoint() {
    let f = FadeEnvelope::default();
    let d = 0.6;
    assert!((f.opacity_at(0.5, d) - 1.0).abs() < 1e-12);
    assert!(f.opacity_at(0.4, d) < 1.0);
    assert!(f.opacity_at(0.6, d) < 1.0);
    assert!(f.in_window(0.4, d));
    assert!(f.in_window(0.6, d));
}

#[test]
fn transition_window_flags() {
    let f = FadeEnvelope::default();
    assert!(f.in_window(0.0, 10.0));
    assert!(!f.in_window(0.5, 10.0));
    assert!(f.in_window(0.99, 10.0));
}
