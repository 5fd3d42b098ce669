use super::*;
use crate::script::fixtures::{scene, script_6_8_10};

#[test]
fn parses_camel_case_json() {
    let json = r#"{
        "title": "Gravity",
        "scenes": [
            {"speaker": "Student", "dialogue": "Why do apples fall?", "visualHint": "apple tree",
             "visualSearchQuery": "apple", "durationSec": 5},
            {"speaker": "Sage", "dialogue": "Mass pulls on mass.", "visualHint": "planet orbit",
             "visualSearchQuery": "planet", "durationSec": 7.5},
            {"speaker": "Student", "dialogue": "Even me and the Earth?", "visualHint": "person on globe",
             "visualSearchQuery": "earth", "durationSec": 4}
        ],
        "closing": "Everything attracts.",
        "ttsVoiceHints": {"student": "bright", "sage": "calm"}
    }"#;

    let script = Script::from_json_str(json).unwrap();
    assert_eq!(script.scenes.len(), 3);
    assert_eq!(script.scenes[1].speaker, Speaker::Sage);
    assert_eq!(script.durations(), vec![5.0, 7.5, 4.0]);
    assert_eq!(
        script.tts_voice_hints.as_ref().map(|h| h.sage.as_str()),
        Some("calm")
    );
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Script::from_json_str("{\"title\": 3}").unwrap_err();
    assert!(matches!(err, SlidesageError::Serde(_)));
}

#[test]
fn scene_count_is_bounded() {
    let mut s = script_6_8_10();
    s.scenes.truncate(2);
    assert!(s.validate().unwrap_err().to_string().contains("3..=6 scenes"));

    let mut s = script_6_8_10();
    let extra = s.scenes[0].clone();
    s.scenes.extend(std::iter::repeat_n(extra, 4));
    assert_eq!(s.scenes.len(), 7);
    assert!(s.validate().is_err());
}

#[test]
fn duration_bounds_are_inclusive() {
    let mut s = script_6_8_10();
    s.scenes[0].duration_sec = 3.0;
    s.scenes[1].duration_sec = 20.0;
    s.validate().unwrap();

    s.scenes[2].duration_sec = 2.9;
    let msg = s.validate().unwrap_err().to_string();
    assert!(msg.contains("scene 2"), "{msg}");

    s.scenes[2].duration_sec = f64::NAN;
    assert!(s.validate().is_err());
}

#[test]
fn text_lengths_are_checked_in_chars() {
    let mut sc = scene(Speaker::Sage, "Hi", 5.0);
    assert!(sc.validate().unwrap_err().to_string().contains("dialogue"));

    sc.dialogue = "é".repeat(300);
    sc.validate().unwrap();
    sc.dialogue.push('é');
    assert!(sc.validate().is_err());
}

#[test]
fn speaker_accents_differ() {
    assert_ne!(
        Speaker::Student.accent_rgba(),
        Speaker::Sage.accent_rgba()
    );
    assert_eq!(Speaker::Sage.label(), "Sage");
}

#[test]
fn reader_input_is_validated_on_parse() {
    let mut s = script_6_8_10();
    s.closing = "ok".to_string();
    let json = serde_json::to_string(&s).unwrap();
    let err = Script::from_reader(json.as_bytes()).unwrap_err();
    assert!(matches!(err, SlidesageError::Validation(_)));
    assert!(err.to_string().contains("closing"), "{err}");

    s.closing = "That's photosynthesis.".to_string();
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(Script::from_reader(json.as_bytes()).unwrap(), s);
}
