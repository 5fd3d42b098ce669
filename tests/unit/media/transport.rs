use super::*;

#[test]
fn playhead_accumulates_across_pauses() {
    let mut p = Playhead::new();
    assert!(!p.is_playing());
    p.play(1.0).unwrap();
    assert_eq!(p.position(3.0), 2.0);
    p.pause(3.0).unwrap();
    assert_eq!(p.position(10.0), 2.0);
    p.play(10.0).unwrap();
    assert_eq!(p.position(11.5), 3.5);
}

#[test]
fn pause_when_stopped_is_rejected() {
    let mut p = Playhead::new();
    assert_eq!(p.pause(0.0), Err(TransportError::NotPlaying));
}

#[test]
fn play_twice_keeps_anchor() {
    let mut p = Playhead::new();
    p.play(1.0).unwrap();
    p.play(2.0).unwrap();
    assert_eq!(p.position(3.0), 2.0);
}

#[test]
fn rewind_resets_position_and_keeps_state() {
    let mut p = Playhead::new();
    p.play(0.0).unwrap();
    p.rewind(4.0).unwrap();
    assert!(p.is_playing());
    assert_eq!(p.position(5.0), 1.0);

    p.pause(5.0).unwrap();
    p.rewind(6.0).unwrap();
    assert!(!p.is_playing());
    assert_eq!(p.position(9.0), 0.0);
}

#[test]
fn still_transport_never_moves() {
    let mut s = StillTransport;
    s.play(0.0).unwrap();
    s.pause(1.0).unwrap();
    assert_eq!(s.position(5.0), 0.0);
    assert!(!s.is_playing());
}
