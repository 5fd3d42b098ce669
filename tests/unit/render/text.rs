use super::*;

fn font_from_env() -> Option<Vec<u8>> {
    let path = std::env::var_os("SLIDESAGE_FONT")?;
    std::fs::read(path).ok()
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = TextLayoutEngine::new(b"definitely not a font".to_vec()).unwrap_err();
    assert!(err.to_string().contains("no font families"));
}

#[test]
fn brush_from_array_keeps_channels() {
    assert_eq!(
        TextBrushRgba8::from_array([1, 2, 3, 4]),
        TextBrushRgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4
        }
    );
}

#[test]
fn measured_width_grows_with_text() {
    let Some(bytes) = font_from_env() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(bytes).unwrap();
    assert!(!engine.family_name().is_empty());
    let short = engine.measure("leaf", 24.0);
    let long = engine.measure("leaf leaf leaf", 24.0);
    assert!(short > 0.0);
    assert!(long > short);
    assert!(engine.layout_line("leaf", 0.0, TextBrushRgba8::default()).is_err());
}
