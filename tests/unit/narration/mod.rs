use super::*;

#[test]
fn estimate_counts_whitespace_words() {
    assert_eq!(estimate_narration_secs("one two three four five", 2.5), 2.0);
    assert_eq!(estimate_narration_secs("  spaced\tout\nwords ", 1.0), 3.0);
}

#[test]
fn estimate_has_one_word_floor() {
    assert_eq!(estimate_narration_secs("", 2.5), 0.4);
    assert_eq!(estimate_narration_secs("   ", 2.5), 0.4);
}

#[test]
fn estimate_rejects_bad_rate() {
    assert_eq!(estimate_narration_secs("a b c d e", 0.0), 2.0);
    assert_eq!(estimate_narration_secs("a b c d e", f64::NAN), 2.0);
}

#[test]
fn voices_differ_by_pitch() {
    let student = VoiceHint::for_speaker(Speaker::Student);
    let sage = VoiceHint::for_speaker(Speaker::Sage);
    assert_eq!(student.pitch, 1.2);
    assert_eq!(sage.pitch, 0.8);
    assert_eq!(student.rate, sage.rate);
    assert_eq!(student.volume, 0.8);
}

#[test]
fn estimated_narrator_is_always_timed() {
    let mut n = EstimatedNarrator::new(2.0);
    let req = NarrationRequest {
        id: NarrationId(1),
        scene_index: 0,
        speaker: Speaker::Sage,
        text: "light becomes sugar".to_string(),
        voice: VoiceHint::for_speaker(Speaker::Sage),
    };
    assert_eq!(
        n.speak(&req).unwrap(),
        NarrationTicket::Timed { duration_secs: 1.5 }
    );
    n.cancel(NarrationId(1));
}
