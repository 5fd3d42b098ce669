use super::*;
use crate::script::fixtures::script_6_8_10;

#[test]
fn rejects_empty_and_non_positive_durations() {
    assert!(Timeline::new(&[]).is_err());
    assert!(Timeline::new(&[3.0, 0.0]).is_err());
    assert!(Timeline::new(&[3.0, -1.0]).is_err());
    assert!(Timeline::new(&[f64::INFINITY]).is_err());
    assert!(Timeline::new(&[f64::NAN]).is_err());
}

#[test]
fn total_is_sum_of_durations() {
    let lists: [&[f64]; 4] = [&[1.0], &[6.0, 8.0, 10.0], &[0.25, 0.5, 0.125], &[3.3; 6]];
    for d in lists {
        let t = Timeline::new(d).unwrap();
        let sum: f64 = d.iter().sum();
        assert!((t.total_duration() - sum).abs() < 1e-9);
        assert_eq!(t.len(), d.len());
    }
}

#[test]
fn starts_are_cumulative_and_monotonic() {
    let t = Timeline::new(&[6.0, 8.0, 10.0]).unwrap();
    let starts: Vec<f64> = t.spans().iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0.0, 6.0, 14.0]);
    assert_eq!(t.span(2).unwrap().end(), 24.0);
    assert!(t.span(3).is_none());
}

#[test]
fn scenario_6_8_10() {
    let t = Timeline::from_script(&script_6_8_10()).unwrap();
    assert_eq!(t.total_duration(), 24.0);

    let at6 = t.scene_at(6.0);
    assert_eq!(at6.index, 1);
    assert_eq!(at6.progress, 0.0);
    assert!(at6.in_transition);

    let near_end = t.scene_at(23.999);
    assert_eq!(near_end.index, 2);
    assert!((near_end.progress - 0.9999).abs() < 1e-9);

    let past = t.scene_at(100.0);
    assert_eq!(past.index, 2);
    assert_eq!(past.progress, 1.0);
}

#[test]
fn index_is_unique_containing_span() {
    let d = [3.0, 4.5, 0.75, 9.0];
    let t = Timeline::new(&d).unwrap();
    let mut x = 0.0;
    while x < t.total_duration() {
        let pos = t.scene_at(x);
        let span = t.span(pos.index).unwrap();
        assert!(span.start <= x && x < span.end(), "t={x} idx={}", pos.index);
        let owners = t
            .spans()
            .iter()
            .filter(|s| s.start <= x && x < s.end())
            .count();
        assert_eq!(owners, 1);
        x += 0.01;
    }
}

#[test]
fn past_end_clamps_for_any_epsilon() {
    let t = Timeline::new(&[2.0, 2.0]).unwrap();
    for eps in [0.0, 1e-9, 0.5, 1e6] {
        let pos = t.scene_at(t.total_duration() + eps);
        assert_eq!(pos.index, 1);
        assert_eq!(pos.progress, 1.0);
        assert!(!pos.in_transition);
    }
}

#[test]
fn negative_time_clamps_to_start() {
    let t = Timeline::new(&[2.0, 2.0]).unwrap();
    let pos = t.scene_at(-1.0);
    assert_eq!(pos.index, 0);
    assert_eq!(pos.progress, 0.0);
}

#[test]
fn opacity_for_uses_scene_duration() {
    let t = Timeline::new(&[6.0, 8.0]).unwrap();
    let mid = t.scene_at(10.0);
    assert_eq!(t.opacity_for(mid), 1.0);
    let start = t.scene_at(6.0);
    assert_eq!(t.opacity_for(start), 0.0);
}
